use std::fs::OpenOptions;
use std::io;
use std::os::unix::process::CommandExt;
use std::process::{Command, Stdio};
use tracing::{error, info, warn};

use crate::messages::LaunchRequest;

/// Quote a path for `sh -c`
fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

/// Shell command line for a launch: quoted executable followed by raw params
pub fn command_line(request: &LaunchRequest) -> String {
    let exec = shell_quote(&request.exec.to_string_lossy());
    if request.params.trim().is_empty() {
        exec
    } else {
        format!("{} {}", exec, request.params.trim())
    }
}

fn shell_command(request: &LaunchRequest) -> Command {
    let mut command = Command::new("sh");
    command.args(["-c", &command_line(request)]);
    if request.workdir.is_dir() {
        command.current_dir(&request.workdir);
    }
    command
}

/// Stdout and stderr handles appending to the request's log, if it has one
fn log_streams(request: &LaunchRequest) -> Option<(Stdio, Stdio)> {
    let path = request.log.as_ref()?;
    let open = || -> io::Result<(Stdio, Stdio)> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok((Stdio::from(file.try_clone()?), Stdio::from(file)))
    };

    match open() {
        Ok(streams) => Some(streams),
        Err(e) => {
            warn!("Cannot open launch log {:?}: {}", path, e);
            None
        }
    }
}

/// Start a launch request in the background, inside its working directory
pub fn spawn_request(request: &LaunchRequest) -> io::Result<u32> {
    let mut command = shell_command(request);
    command.stdin(Stdio::null());
    match log_streams(request) {
        Some((out, err)) => command.stdout(out).stderr(err),
        None => command.stdout(Stdio::null()).stderr(Stdio::null()),
    };
    let child = command.spawn()?;

    info!("Launched '{}' (pid {})", request.title, child.id());
    Ok(child.id())
}

/// Replace the current process with the launch request.
///
/// Only returns on failure, handing back the error so the caller can
/// resume its own loop.
pub fn exec_replace(request: &LaunchRequest) -> io::Error {
    info!("Replacing launcher with '{}'", request.title);
    let mut command = shell_command(request);
    if let Some((out, err)) = log_streams(request) {
        command.stdout(out).stderr(err);
    }
    let error = command.exec();
    error!("Failed to exec '{}': {}", request.title, error);
    error
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn request(exec: &str, params: &str) -> LaunchRequest {
        LaunchRequest {
            title: "test".into(),
            exec: PathBuf::from(exec),
            params: params.into(),
            workdir: PathBuf::from("/"),
            log: None,
        }
    }

    #[test]
    fn test_command_line_quotes_exec() {
        assert_eq!(command_line(&request("/opt/my game/run", "")), "'/opt/my game/run'");
        assert_eq!(
            command_line(&request("/usr/bin/emu", " -f rom.gb ")),
            "'/usr/bin/emu' -f rom.gb"
        );
        assert_eq!(command_line(&request("it's", "")), r"'it'\''s'");
    }

    #[test]
    fn test_spawn_request_runs_in_background() {
        let dir = tempfile::tempdir().unwrap();
        let mut req = request("touch", "launched");
        req.workdir = dir.path().to_path_buf();

        assert!(spawn_request(&req).is_ok());
        let marker = dir.path().join("launched");
        for _ in 0..50 {
            if marker.exists() {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(20));
        }
        assert!(marker.exists());
    }

    #[test]
    fn test_output_goes_to_launch_log() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("logs/launch.log");
        let mut req = request("echo", "hello from the game");
        req.log = Some(log.clone());

        assert!(spawn_request(&req).is_ok());
        let mut contents = String::new();
        for _ in 0..50 {
            contents = std::fs::read_to_string(&log).unwrap_or_default();
            if contents.contains("hello") {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(20));
        }
        assert_eq!(contents.trim(), "hello from the game");
    }
}

use std::io::BufRead;
use std::thread::JoinHandle;
use async_channel::Sender;
use tracing::{debug, warn};

use kestrel_core::{InputMap, ShellEvent, TouchState};

/// Parse one script line: a key name, `touch X Y` or `quit`.
/// Blank lines and `#` comments yield nothing.
pub fn parse_line(line: &str, map: &InputMap) -> Option<ShellEvent> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let mut words = line.split_whitespace();
    let first = words.next()?;

    match first.to_lowercase().as_str() {
        "quit" | "exit" => Some(ShellEvent::Quit),
        "touch" => {
            let x = words.next().and_then(|w| w.parse().ok());
            let y = words.next().and_then(|w| w.parse().ok());
            match (x, y) {
                (Some(x), Some(y)) => Some(ShellEvent::Touch(TouchState::pressed_at(x, y))),
                _ => {
                    warn!("Malformed touch line: {}", line);
                    None
                }
            }
        }
        key => match map.resolve(key) {
            Some(button) => Some(ShellEvent::Button(button)),
            None => {
                warn!("Unknown key: {}", key);
                None
            }
        },
    }
}

/// Feed script lines to the main loop from a thread. Posts `Quit` at end of input.
pub fn spawn_reader<R>(reader: R, map: InputMap, event_tx: Sender<ShellEvent>) -> JoinHandle<()>
where
    R: BufRead + Send + 'static,
{
    std::thread::spawn(move || {
        for line in reader.lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    warn!("Input stream error: {}", e);
                    break;
                }
            };

            if let Some(event) = parse_line(&line, &map) {
                let quit = matches!(event, ShellEvent::Quit);
                if event_tx.send_blocking(event).is_err() || quit {
                    return;
                }
            }
        }

        debug!("Input stream ended");
        let _ = event_tx.send_blocking(ShellEvent::Quit);
    })
}

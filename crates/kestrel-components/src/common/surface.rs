use compact_str::CompactString;
use kestrel_core::Rgba;

/// Horizontal text alignment relative to the anchor point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HAlign {
    Left,
    Center,
    Right,
}

/// Vertical text alignment relative to the anchor point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VAlign {
    Top,
    Middle,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && y >= self.y && x < self.x + self.w as i32 && y < self.y + self.h as i32
    }
}

/// Drawing target provided by the display backend.
///
/// Images are addressed by path into the backend's surface cache.
pub trait Surface {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    fn draw_image(&mut self, path: &str, x: i32, y: i32, w: u32, h: u32, alpha: u8);

    fn draw_text(&mut self, text: &str, x: i32, y: i32, halign: HAlign, valign: VAlign);

    fn text_width(&self, text: &str) -> u32;

    fn text_height(&self) -> u32;

    fn fill_rect(&mut self, rect: Rect, color: Rgba);

    fn stroke_rect(&mut self, rect: Rect, color: Rgba);
}

/// One recorded drawing operation
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Image {
        path: CompactString,
        x: i32,
        y: i32,
        w: u32,
        h: u32,
        alpha: u8,
    },
    Text {
        text: CompactString,
        x: i32,
        y: i32,
        halign: HAlign,
        valign: VAlign,
    },
    Fill(Rect, Rgba),
    Stroke(Rect, Rgba),
}

/// Surface that records draw calls instead of rasterising them.
///
/// Uses a fixed-width font metric, which is enough for layout decisions.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    width: u32,
    height: u32,
    glyph_width: u32,
    glyph_height: u32,
    pub calls: Vec<DrawCall>,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            glyph_width: 6,
            glyph_height: 10,
            calls: Vec::new(),
        }
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }

    /// Text of every text call, in draw order
    pub fn texts(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Anchor of the first text call drawing `text`
    pub fn text_position(&self, needle: &str) -> Option<(i32, i32)> {
        self.calls.iter().find_map(|c| match c {
            DrawCall::Text { text, x, y, .. } if text == needle => Some((*x, *y)),
            _ => None,
        })
    }

    pub fn fills(&self) -> Vec<Rect> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::Fill(rect, _) => Some(*rect),
                _ => None,
            })
            .collect()
    }

    pub fn strokes(&self) -> Vec<Rect> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                DrawCall::Stroke(rect, _) => Some(*rect),
                _ => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn draw_image(&mut self, path: &str, x: i32, y: i32, w: u32, h: u32, alpha: u8) {
        self.calls.push(DrawCall::Image {
            path: path.into(),
            x,
            y,
            w,
            h,
            alpha,
        });
    }

    fn draw_text(&mut self, text: &str, x: i32, y: i32, halign: HAlign, valign: VAlign) {
        self.calls.push(DrawCall::Text {
            text: text.into(),
            x,
            y,
            halign,
            valign,
        });
    }

    fn text_width(&self, text: &str) -> u32 {
        text.chars().count() as u32 * self.glyph_width
    }

    fn text_height(&self) -> u32 {
        self.glyph_height
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        self.calls.push(DrawCall::Fill(rect, color));
    }

    fn stroke_rect(&mut self, rect: Rect, color: Rgba) {
        self.calls.push(DrawCall::Stroke(rect, color));
    }
}

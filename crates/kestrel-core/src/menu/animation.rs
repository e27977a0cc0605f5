/// One section column in 16.16 fixed point
pub const SECTION_UNIT: i32 = 1 << 16;

const DECAY_DIVISOR: i32 = 32;

/// Ease-out state for the horizontal scroll of the section header strip.
///
/// The accumulator holds the displacement of the strip in section columns
/// (16.16 fixed point). Every step removes 1/32 of it, rounded away from
/// zero, so the strip decelerates into place and always lands exactly on 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SectionScroller {
    accumulator: i32,
}

impl SectionScroller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a displacement; deltas compose with a running animation
    pub fn adjust(&mut self, delta: i32) {
        self.accumulator = self.accumulator.saturating_add(delta);
    }

    /// Advance one frame. Returns whether the animation is still running.
    pub fn step(&mut self) -> bool {
        if self.accumulator == 0 {
            return false;
        }

        let magnitude = self.accumulator.unsigned_abs();
        let step = magnitude.div_ceil(DECAY_DIVISOR as u32).max(1) as i32;
        self.accumulator -= step * self.accumulator.signum();

        self.accumulator != 0
    }

    /// Drop any pending displacement
    pub fn reset(&mut self) {
        self.accumulator = 0;
    }

    pub fn is_running(&self) -> bool {
        self.accumulator != 0
    }

    pub fn accumulator(&self) -> i32 {
        self.accumulator
    }

    /// Current displacement in pixels for columns of `column_width` pixels
    pub fn pixel_offset(&self, column_width: u32) -> i32 {
        ((i64::from(self.accumulator) * i64::from(column_width)) >> 16) as i32
    }
}

/// Cubic ease used for the icons entering and leaving the strip
pub fn cubic_ease(offset: i32, width: i32) -> i32 {
    if width == 0 {
        return 0;
    }
    let offset = i64::from(offset);
    let width = i64::from(width);
    (offset * offset * offset / (width * width)) as i32
}

//! Waiting indicator shown while a countdown is active

use std::time::Duration;

/// Time between two frames
pub const FRAME_INTERVAL: Duration = Duration::from_millis(100);

const FRAMES: [&str; 8] = [
    "⏳   ", "⏳.  ", "⏳.. ", "⏳...", "⌛...", "⌛.. ", "⌛.  ", "⌛   ",
];

/// Looping hourglass frame sequence
#[derive(Debug, Default)]
pub struct WaitingIndicator {
    index: usize,
    active: bool,
}

impl WaitingIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Restart from the first frame
    pub fn start(&mut self) {
        self.index = 0;
        self.active = true;
    }

    pub fn stop(&mut self) {
        self.active = false;
    }

    /// Current frame, blank when stopped
    pub fn frame(&self) -> &'static str {
        if self.active {
            FRAMES[self.index]
        } else {
            "    "
        }
    }

    /// Move to the next frame. Returns `false` when stopped.
    pub fn advance(&mut self) -> bool {
        if !self.active {
            return false;
        }
        self.index = (self.index + 1) % FRAMES.len();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_loop() {
        let mut indicator = WaitingIndicator::new();
        indicator.start();
        let first = indicator.frame();
        for _ in 0..FRAMES.len() {
            assert!(indicator.advance());
        }
        assert_eq!(indicator.frame(), first);
    }

    #[test]
    fn test_stopped_indicator_is_blank() {
        let mut indicator = WaitingIndicator::new();
        assert!(!indicator.advance());
        assert_eq!(indicator.frame().trim(), "");

        indicator.start();
        indicator.advance();
        indicator.stop();
        assert!(!indicator.is_active());
        assert_eq!(indicator.frame().trim(), "");

        indicator.start();
        assert_eq!(indicator.frame(), FRAMES[0]);
    }
}

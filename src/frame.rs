use std::time::Instant;

use crate::core::CancelToken;

/// Frame metadata - carries frame number and timing info
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInfo {
    pub number: u64,
    /// Seconds since the loop started
    pub time: f32,
    /// Seconds since the previous frame
    pub delta: f32,
}

impl FrameInfo {
    pub fn new(number: u64, time: f32, delta: f32) -> Self {
        Self { number, time, delta }
    }
}

/// Repeating frame source that stops for good once its token is cancelled
///
/// Use as an iterator (`for frame in frames { ... }`) or, when the host owns the
/// event loop, call [`FrameLoop::next_frame`] from each redraw.
#[derive(Debug)]
pub struct FrameLoop {
    number: u64,
    time: f32,
    last_frame: Instant,
    cancel: CancelToken,
}

impl FrameLoop {
    pub fn new(cancel: CancelToken) -> Self {
        Self {
            number: 0,
            time: 0.0,
            last_frame: Instant::now(),
            cancel,
        }
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn frame_number(&self) -> u64 {
        self.number
    }

    /// Next frame timed by the wall clock
    pub fn next_frame(&mut self) -> Option<FrameInfo> {
        let now = Instant::now();
        let delta = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.step(delta)
    }

    /// Next frame with an explicit delta
    pub fn step(&mut self, delta: f32) -> Option<FrameInfo> {
        if self.cancel.is_cancelled() {
            return None;
        }
        let delta = delta.max(0.0);
        self.time += delta;
        let info = FrameInfo::new(self.number, self.time, delta);
        self.number += 1;
        Some(info)
    }
}

impl Iterator for FrameLoop {
    type Item = FrameInfo;

    fn next(&mut self) -> Option<FrameInfo> {
        self.next_frame()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_count_up() {
        let mut frames = FrameLoop::new(CancelToken::new());
        let a = frames.step(0.5).unwrap();
        let b = frames.step(0.25).unwrap();

        assert_eq!(a.number, 0);
        assert_eq!(b.number, 1);
        assert_eq!(b.time, 0.75);
        assert_eq!(b.delta, 0.25);
    }

    #[test]
    fn test_cancel_is_terminal() {
        let token = CancelToken::new();
        let mut frames = FrameLoop::new(token.clone());
        assert!(frames.next().is_some());

        token.cancel();
        assert!(frames.next().is_none());
        assert!(frames.step(0.1).is_none());
        assert_eq!(frames.frame_number(), 1);
    }

    #[test]
    fn test_iterator_stops_when_cancelled_mid_loop() {
        let mut frames = FrameLoop::new(CancelToken::new());
        let token = frames.cancel_token();
        let mut seen = 0;
        for frame in &mut frames {
            seen += 1;
            if frame.number == 4 {
                token.cancel();
            }
        }
        assert_eq!(seen, 5);
    }

    #[test]
    fn test_wall_clock_delta_is_non_negative() {
        let mut frames = FrameLoop::new(CancelToken::new());
        std::thread::sleep(std::time::Duration::from_millis(5));
        let frame = frames.next_frame().unwrap();
        assert!(frame.delta >= 0.004);
    }
}

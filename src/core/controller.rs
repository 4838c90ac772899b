use crate::core::window::ViewportSize;
use crate::orbit::OrbitInput;

/// Everything the host buffered since the previous tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameInputs {
    /// Latest size if the viewport was resized
    pub resize: Option<ViewportSize>,
    pub orbit: OrbitInput,
}

impl FrameInputs {
    pub fn is_empty(&self) -> bool {
        self.resize.is_none() && self.orbit.is_empty()
    }
}

/// Source of buffered input, sampled once at the start of every tick
pub trait InputSource {
    /// Take the inputs gathered since the last call, leaving the source empty
    fn drain(&mut self) -> FrameInputs;
}

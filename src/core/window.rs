/// Viewport dimensions in physical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

impl ViewportSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Minimized windows report a zero extent
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width over height; `None` while the viewport is empty
    pub fn aspect(&self) -> Option<f32> {
        if self.is_empty() {
            None
        } else {
            Some(self.width as f32 / self.height as f32)
        }
    }
}

impl From<winit::dpi::PhysicalSize<u32>> for ViewportSize {
    fn from(size: winit::dpi::PhysicalSize<u32>) -> Self {
        Self::new(size.width, size.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewport_aspect() {
        assert_eq!(ViewportSize::new(800, 600).aspect(), Some(800.0 / 600.0));
        assert_eq!(ViewportSize::new(1920, 1080).aspect(), Some(1920.0 / 1080.0));
    }

    #[test]
    fn test_empty_viewport_has_no_aspect() {
        for (width, height) in [(0, 600), (800, 0), (0, 0)] {
            let size = ViewportSize::new(width, height);
            assert!(size.is_empty());
            assert_eq!(size.aspect(), None);
        }
    }

    #[test]
    fn test_from_physical_size() {
        let size: ViewportSize = winit::dpi::PhysicalSize::new(640u32, 480u32).into();
        assert_eq!(size, ViewportSize::new(640, 480));
    }
}

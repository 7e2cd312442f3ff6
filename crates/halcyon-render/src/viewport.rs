//! Viewport dimensions and DPI tracking.

/// Surface size in physical pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhysicalSize {
    pub width: u32,
    pub height: u32,
}

impl PhysicalSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Clamp both dimensions to at least one pixel.
    pub fn clamped(self) -> Self {
        Self {
            width: self.width.max(1),
            height: self.height.max(1),
        }
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

/// Tracks the current surface size and scale factor, deduplicating resize
/// events so downstream texture recreation only happens on real changes.
pub struct Viewport {
    size: PhysicalSize,
    scale_factor: f64,
}

impl Viewport {
    pub fn new(width: u32, height: u32, scale_factor: f64) -> Self {
        Self {
            size: PhysicalSize::new(width, height).clamped(),
            scale_factor,
        }
    }

    pub fn size(&self) -> PhysicalSize {
        self.size
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    /// Apply a resize event. Returns the new size if it actually changed.
    pub fn handle_resize(&mut self, width: u32, height: u32) -> Option<PhysicalSize> {
        let new = PhysicalSize::new(width, height).clamped();
        if new == self.size {
            return None;
        }
        self.size = new;
        Some(new)
    }

    /// Apply a scale factor change. Returns true if it changed.
    pub fn handle_scale_factor(&mut self, scale_factor: f64) -> bool {
        if (scale_factor - self.scale_factor).abs() < f64::EPSILON {
            return false;
        }
        self.scale_factor = scale_factor;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resize_dedupes_identical_sizes() {
        let mut viewport = Viewport::new(800, 600, 1.0);
        assert_eq!(viewport.handle_resize(800, 600), None);
        assert_eq!(
            viewport.handle_resize(1920, 1080),
            Some(PhysicalSize::new(1920, 1080))
        );
        assert_eq!(viewport.handle_resize(1920, 1080), None);
    }

    #[test]
    fn test_zero_size_clamps_to_one_pixel() {
        let mut viewport = Viewport::new(800, 600, 1.0);
        assert_eq!(
            viewport.handle_resize(0, 0),
            Some(PhysicalSize::new(1, 1))
        );
    }

    #[test]
    fn test_scale_factor_change_detected() {
        let mut viewport = Viewport::new(800, 600, 1.0);
        assert!(!viewport.handle_scale_factor(1.0));
        assert!(viewport.handle_scale_factor(2.0));
        assert_eq!(viewport.scale_factor(), 2.0);
    }

    #[test]
    fn test_aspect_ratio() {
        let size = PhysicalSize::new(1920, 1080);
        assert!((size.aspect_ratio() - 16.0 / 9.0).abs() < 1e-6);
    }
}

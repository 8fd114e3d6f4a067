//! Detection region sizing.

/// Square area of the viewfinder in which codes are decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectionRegion {
    width: u32,
    height: u32,
}

impl DetectionRegion {
    /// Sizes a square region to `ratio` of the shorter viewfinder edge.
    ///
    /// A zero-sized viewfinder (element not laid out yet) yields an
    /// empty region.
    pub fn for_viewfinder(viewfinder_width: u32, viewfinder_height: u32, ratio: f64) -> Self {
        let min_edge = viewfinder_width.min(viewfinder_height);
        let edge = (f64::from(min_edge) * ratio.clamp(0.0, 1.0)).floor() as u32;
        Self {
            width: edge,
            height: edge,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uses_shorter_edge() {
        let region = DetectionRegion::for_viewfinder(640, 480, 0.6);
        assert_eq!(region.width(), 288);
        assert_eq!(region.height(), 288);

        let portrait = DetectionRegion::for_viewfinder(480, 640, 0.6);
        assert_eq!(portrait, region);
    }

    #[test]
    fn test_rounds_down() {
        let region = DetectionRegion::for_viewfinder(333, 1000, 0.7);
        assert_eq!(region.width(), 233);
    }

    #[test]
    fn test_empty_viewfinder() {
        assert!(DetectionRegion::for_viewfinder(0, 480, 0.6).is_empty());
    }
}

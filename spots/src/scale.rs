use std::fmt;

use crate::Region;

/// Size of the still image the regions are annotated on.
pub const REFERENCE_RESOLUTION: Resolution = Resolution::new(3520, 1980);
/// Size of the frames the regions are classified on.
pub const VIDEO_RESOLUTION: Resolution = Resolution::new(1920, 1080);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: i32,
    pub height: i32,
}

impl Resolution {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Per-axis factors mapping coordinates in `self` onto `target`.
    pub fn scale_to(&self, target: &Resolution) -> (f64, f64) {
        (
            target.width as f64 / self.width as f64,
            target.height as f64 / self.height as f64,
        )
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

pub fn scale_regions(regions: &[Region], from: &Resolution, to: &Resolution) -> Vec<Region> {
    let (x, y) = from.scale_to(to);
    regions.iter().map(|r| r.scaled(x, y)).collect()
}

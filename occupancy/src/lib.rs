mod utils;
pub mod classifier;
pub mod overlay;
pub mod preprocess;

use opencv::core::Mat;
use spots::Region;

pub use classifier::{LotSummary, SpaceStatus, OCCUPANCY_THRESHOLD};
pub use preprocess::{preprocess_frame, PreprocessParams};

/// Result of classifying one frame.
pub struct FrameOccupancy {
    /// Binary foreground mask the spaces were counted on
    pub mask: Mat,
    /// One entry per region, in region order
    pub spaces: Vec<SpaceStatus>,
    pub summary: LotSummary,
}

pub struct OccupancySystem {
    regions: Vec<Region>,
    threshold: i32,
}

impl OccupancySystem {
    /// `regions` must already be in the frame's coordinate space.
    pub fn new(regions: Vec<Region>, threshold: i32) -> Self {
        Self { regions, threshold }
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn threshold(&self) -> i32 {
        self.threshold
    }

    pub fn process_frame(&self, img: &Mat, params: &PreprocessParams) -> anyhow::Result<FrameOccupancy> {
        let mask = preprocess_frame(img, params)?;
        let spaces = classifier::classify_regions(&mask, &self.regions, self.threshold)?;
        let summary = LotSummary::from_spaces(&spaces);

        Ok(FrameOccupancy {
            mask,
            spaces,
            summary,
        })
    }
}

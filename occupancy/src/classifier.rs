use opencv::{
    core::{bitwise_and_def, count_non_zero, Mat, Point, Scalar, CV_8UC1},
    imgproc::{fill_poly, LINE_8},
    prelude::*,
};
use spots::Region;

use crate::utils::region_contour;

/// Foreground pixel count at which a space is considered taken.
pub const OCCUPANCY_THRESHOLD: i32 = 900;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpaceStatus {
    pub count: i32,
    pub free: bool,
}

impl SpaceStatus {
    pub fn from_count(count: i32, threshold: i32) -> Self {
        Self {
            count,
            free: count < threshold,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LotSummary {
    pub total: usize,
    pub free: usize,
    pub occupied: usize,
}

impl LotSummary {
    pub fn from_spaces(spaces: &[SpaceStatus]) -> Self {
        let total = spaces.len();
        let free = spaces.iter().filter(|s| s.free).count();

        Self {
            total,
            free,
            occupied: total - free,
        }
    }
}

/// Zero mask of the foreground's size with the region's rotated rectangle filled in.
pub fn region_mask(foreground: &Mat, region: &Region) -> anyhow::Result<Mat> {
    let mut mask = Mat::zeros(foreground.rows(), foreground.cols(), CV_8UC1)?.to_mat()?;
    fill_poly(&mut mask, &region_contour(region), Scalar::all(255.0), LINE_8, 0, Point::default())?;

    Ok(mask)
}

/// Number of foreground pixels inside the region.
pub fn count_in_region(foreground: &Mat, region: &Region) -> anyhow::Result<i32> {
    let mask = region_mask(foreground, region)?;
    let mut cropped = Mat::default();
    bitwise_and_def(foreground, &mask, &mut cropped)?;

    Ok(count_non_zero(&cropped)?)
}

pub fn classify_regions(foreground: &Mat, regions: &[Region], threshold: i32) -> anyhow::Result<Vec<SpaceStatus>> {
    regions
        .iter()
        .map(|region| Ok(SpaceStatus::from_count(count_in_region(foreground, region)?, threshold)))
        .collect()
}

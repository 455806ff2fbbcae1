use anyhow::bail;
use opencv::{
    core::{Mat, Size, CV_8U},
    imgproc::{
        adaptive_threshold, dilate_def, gaussian_blur_def, median_blur, ADAPTIVE_THRESH_GAUSSIAN_C,
        THRESH_BINARY_INV,
    },
    prelude::*,
};

use crate::utils::to_gray;

/// Tuning for the foreground mask, matching the monitor's trackbars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreprocessParams {
    /// Adaptive threshold block size
    pub lighting: i32,
    /// Constant subtracted from the local mean
    pub brightness: i32,
    /// Median blur kernel size
    pub smoothing: i32,
}

impl Default for PreprocessParams {
    fn default() -> Self {
        Self {
            lighting: 50,
            brightness: 16,
            smoothing: 5,
        }
    }
}

fn odd(v: i32) -> i32 {
    if v % 2 == 0 {
        v + 1
    } else {
        v
    }
}

impl PreprocessParams {
    /// Forces kernel sizes odd. The block size must also be at least 3.
    pub fn normalized(&self) -> PreprocessParams {
        PreprocessParams {
            lighting: odd(self.lighting).max(3),
            brightness: self.brightness,
            smoothing: odd(self.smoothing).max(1),
        }
    }
}

/// Turns a frame into a binary mask where set pixels are candidate occupied.
pub fn preprocess_frame(img: &Mat, params: &PreprocessParams) -> anyhow::Result<Mat> {
    if img.empty() {
        bail!("Cannot preprocess an empty frame");
    }
    let params = params.normalized();

    let img_gray = to_gray(img)?;

    let mut img_blur = Mat::default();
    gaussian_blur_def(&img_gray, &mut img_blur, Size::new(3, 3), 1.0)?;

    let mut img_thres = Mat::default();
    adaptive_threshold(
        &img_blur,
        &mut img_thres,
        255.0,
        ADAPTIVE_THRESH_GAUSSIAN_C,
        THRESH_BINARY_INV,
        params.lighting,
        params.brightness as f64,
    )?;

    let mut img_median = Mat::default();
    median_blur(&img_thres, &mut img_median, params.smoothing)?;

    let kernel = Mat::ones(3, 3, CV_8U)?.to_mat()?;
    let mut img_dilate = Mat::default();
    dilate_def(&img_median, &mut img_dilate, &kernel)?;

    Ok(img_dilate)
}

use opencv::highgui::{self, create_trackbar, get_trackbar_pos, set_trackbar_pos};
use occupancy::PreprocessParams;

const WINDOW: &str = "Controls";
const LIGHTING: &str = "Lighting";
const BRIGHTNESS: &str = "Brightness";
const SMOOTHING: &str = "Smoothing";
const TRACKBAR_MAX: i32 = 50;

/// Trackbar window for tuning the preprocessing while the video runs.
pub struct Controls;

impl Controls {
    pub fn create(initial: &PreprocessParams) -> anyhow::Result<Controls> {
        highgui::named_window(WINDOW, highgui::WINDOW_AUTOSIZE)?;
        highgui::resize_window(WINDOW, 640, 240)?;

        for (name, value) in [
            (LIGHTING, initial.lighting),
            (BRIGHTNESS, initial.brightness),
            (SMOOTHING, initial.smoothing),
        ] {
            create_trackbar(name, WINDOW, None, TRACKBAR_MAX, None)?;
            set_trackbar_pos(name, WINDOW, value.clamp(0, TRACKBAR_MAX))?;
        }

        Ok(Controls)
    }

    pub fn params(&self) -> anyhow::Result<PreprocessParams> {
        Ok(PreprocessParams {
            lighting: get_trackbar_pos(LIGHTING, WINDOW)?,
            brightness: get_trackbar_pos(BRIGHTNESS, WINDOW)?,
            smoothing: get_trackbar_pos(SMOOTHING, WINDOW)?,
        })
    }
}

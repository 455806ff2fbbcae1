use std::path::Path;

use anyhow::{bail, Context};
use opencv::{
    core::Mat,
    prelude::*,
    videoio::{self, VideoCapture, CAP_PROP_FRAME_HEIGHT, CAP_PROP_FRAME_WIDTH, CAP_PROP_POS_FRAMES},
};
use spots::Resolution;

/// A recorded video that starts over when it runs out of frames.
pub struct LoopingVideo {
    cap: VideoCapture,
    source: String,
}

impl LoopingVideo {
    pub fn open(path: &Path) -> anyhow::Result<LoopingVideo> {
        let source = path.to_str().context("Video path is not valid UTF-8")?.to_string();
        let cap = VideoCapture::from_file(&source, videoio::CAP_ANY)
            .with_context(|| format!("Failed to open video {source}"))?;
        if !cap.is_opened()? {
            bail!("Failed to open video {source}");
        }

        Ok(LoopingVideo { cap, source })
    }

    pub fn frame_size(&self) -> anyhow::Result<Resolution> {
        let width = self.cap.get(CAP_PROP_FRAME_WIDTH)? as i32;
        let height = self.cap.get(CAP_PROP_FRAME_HEIGHT)? as i32;

        Ok(Resolution::new(width, height))
    }

    pub fn next_frame(&mut self) -> anyhow::Result<Mat> {
        let mut frame = Mat::default();
        if frame_read(self.read_into(&mut frame), &self.source) {
            return Ok(frame);
        }

        log::debug!("Reached the end of {}, rewinding", self.source);
        self.cap.set(CAP_PROP_POS_FRAMES, 0.0)?;
        if self.read_into(&mut frame)? {
            return Ok(frame);
        }

        bail!("Video {} yields no frames", self.source)
    }

    fn read_into(&mut self, frame: &mut Mat) -> anyhow::Result<bool> {
        Ok(self.cap.read(frame)? && !frame.empty())
    }
}

// A failed read before rewinding is treated like the end of the video
fn frame_read(read: anyhow::Result<bool>, source: &str) -> bool {
    match read {
        Ok(read) => read,
        Err(e) => {
            log::warn!("Failed to read a frame from {source}: {e:#}");
            false
        }
    }
}

use opencv::{
    core::{Mat, Point, Rect, Scalar},
    imgproc::{get_text_size, polylines, put_text, rectangle, FILLED, FONT_HERSHEY_PLAIN, LINE_8},
    prelude::*,
};
use spots::Region;

use crate::{
    classifier::{LotSummary, SpaceStatus},
    utils::region_contour,
};

const FREE_COLOR: (f64, f64, f64) = (0.0, 200.0, 0.0);
const OCCUPIED_COLOR: (f64, f64, f64) = (0.0, 0.0, 200.0);
const SELECTED_COLOR: (f64, f64, f64) = (0.0, 255.0, 0.0);
const REGION_COLOR: (f64, f64, f64) = (255.0, 0.0, 255.0);

fn bgr((b, g, r): (f64, f64, f64)) -> Scalar {
    Scalar::new(b, g, r, 0.0)
}

pub fn draw_region(img: &mut Mat, region: &Region, color: Scalar, thickness: i32) -> anyhow::Result<()> {
    polylines(img, &region_contour(region), true, color, thickness, LINE_8, 0)?;
    Ok(())
}

// Quarter of the width left of center, truncated after the subtraction
fn count_origin(region: &Region) -> Point {
    let x = region.center.x as f64 - region.width() as f64 / 4.0;
    Point::new(x as i32, region.center.y)
}

/// Draws every region in its occupancy color with its pixel count, plus the free total.
pub fn draw_occupancy(img: &mut Mat, regions: &[Region], spaces: &[SpaceStatus], summary: &LotSummary) -> anyhow::Result<()> {
    for (region, space) in regions.iter().zip(spaces) {
        let (color, thickness) = if space.free {
            (bgr(FREE_COLOR), 5)
        } else {
            (bgr(OCCUPIED_COLOR), 2)
        };
        draw_region(img, region, color, thickness)?;

        put_text(img, &space.count.to_string(), count_origin(region), FONT_HERSHEY_PLAIN, 1.0, color, 2, LINE_8, false)?;
    }

    let banner = format!("Free: {}/{}", summary.free, summary.total);
    draw_text_box(img, &banner, Point::new(50, 60), bgr(FREE_COLOR))?;

    Ok(())
}

/// Outlines and labels for the annotation tool, with the selected region highlighted.
pub fn draw_annotations(img: &mut Mat, regions: &[Region], selected: Option<usize>) -> anyhow::Result<()> {
    for (i, region) in regions.iter().enumerate() {
        let color = if selected == Some(i) {
            bgr(SELECTED_COLOR)
        } else {
            bgr(REGION_COLOR)
        };
        draw_region(img, region, color, 2)?;

        let label = format!("{i}:{}deg {}x{}", region.angle, region.width(), region.height());
        let origin = Point::new(region.center.x - 30, region.center.y - 10);
        put_text(img, &label, origin, FONT_HERSHEY_PLAIN, 1.0, color, 1, LINE_8, false)?;
    }

    Ok(())
}

// White text on a filled box, `origin` is the text's bottom left corner
fn draw_text_box(img: &mut Mat, text: &str, origin: Point, background: Scalar) -> anyhow::Result<()> {
    const SCALE: f64 = 3.0;
    const THICKNESS: i32 = 3;
    const OFFSET: i32 = 20;

    let mut baseline = 0;
    let size = get_text_size(text, FONT_HERSHEY_PLAIN, SCALE, THICKNESS, &mut baseline)?;
    let background_rect = Rect::new(
        origin.x - OFFSET,
        origin.y - size.height - OFFSET,
        size.width + 2 * OFFSET,
        size.height + 2 * OFFSET,
    );
    rectangle(img, background_rect, background, FILLED, LINE_8, 0)?;
    put_text(img, text, origin, FONT_HERSHEY_PLAIN, SCALE, Scalar::all(255.0), THICKNESS, LINE_8, false)?;

    Ok(())
}

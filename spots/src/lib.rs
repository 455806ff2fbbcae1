use std::f64::consts::PI;

use nalgebra::Vector2;

pub mod editor;
pub mod scale;
pub mod store;

pub use scale::{scale_regions, Resolution};
pub use store::RegionStore;

pub const DEFAULT_REGION_WIDTH: i32 = 120;
pub const DEFAULT_REGION_HEIGHT: i32 = 60;

/// A parking space, annotated as a rotated rectangle on the reference image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub center: Vector2<i32>,
    /// Width and height in pixels
    pub size: Vector2<i32>,
    /// Rotation in degrees
    pub angle: i32,
}

impl Region {
    pub fn new(center: Vector2<i32>, size: Vector2<i32>, angle: i32) -> Self {
        Self {
            center,
            size,
            angle,
        }
    }

    /// A default sized, unrotated region centered at `center`.
    pub fn at(center: Vector2<i32>) -> Self {
        Self::new(center, Vector2::new(DEFAULT_REGION_WIDTH, DEFAULT_REGION_HEIGHT), 0)
    }

    pub fn width(&self) -> i32 {
        self.size.x
    }

    pub fn height(&self) -> i32 {
        self.size.y
    }

    /// Multiplies position and size by the given factors, truncating toward zero.
    /// The angle is left as it is.
    pub fn scaled(&self, x: f64, y: f64) -> Region {
        let mut scaled = *self;
        scaled.center.x = (scaled.center.x as f64 * x) as i32;
        scaled.center.y = (scaled.center.y as f64 * y) as i32;
        scaled.size.x = (scaled.size.x as f64 * x) as i32;
        scaled.size.y = (scaled.size.y as f64 * y) as i32;
        scaled
    }

    // Hit test against the unrotated half extents
    pub fn contains(&self, p: &Vector2<i32>) -> bool {
        (p.x - self.center.x).abs() < self.size.x / 2 && (p.y - self.center.y).abs() < self.size.y / 2
    }

    /// Corners of the rotated rectangle, in the same order as opencv's `boxPoints`
    /// (bottom-left, top-left, top-right, bottom-right for an unrotated region).
    /// Computed in `f32` like `RotatedRect::points`, so truncating them gives the same pixels.
    pub fn corners(&self) -> [Vector2<f32>; 4] {
        let angle = self.angle as f64 * PI / 180.0;
        let b = angle.cos() as f32 * 0.5;
        let a = angle.sin() as f32 * 0.5;
        let c = self.center.cast::<f32>();
        let (w, h) = (self.size.x as f32, self.size.y as f32);

        let p0 = Vector2::new(c.x - a * h - b * w, c.y + b * h - a * w);
        let p1 = Vector2::new(c.x + a * h - b * w, c.y - b * h - a * w);

        [p0, p1, c * 2.0 - p0, c * 2.0 - p1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn corners_of_unrotated_region() {
        let region = Region::at(Vector2::new(100, 50));
        let corners = region.corners();

        let expected = [(40.0, 80.0), (40.0, 20.0), (160.0, 20.0), (160.0, 80.0)];
        for (corner, (x, y)) in corners.iter().zip(expected) {
            assert_relative_eq!(corner.x, x, epsilon = 1e-4);
            assert_relative_eq!(corner.y, y, epsilon = 1e-4);
        }
    }

    #[test]
    fn corners_of_quarter_turn_swap_extents() {
        let region = Region::new(Vector2::new(0, 0), Vector2::new(40, 20), 90);
        let corners = region.corners();

        let max_x = corners.iter().map(|c| c.x).fold(f32::MIN, f32::max);
        let max_y = corners.iter().map(|c| c.y).fold(f32::MIN, f32::max);
        assert_relative_eq!(max_x, 10.0, epsilon = 1e-4);
        assert_relative_eq!(max_y, 20.0, epsilon = 1e-4);
    }

    #[test]
    fn quarter_turn_corners_land_on_whole_pixels() {
        // cos(90deg) is not exactly zero, the f32 sums must still round back onto the grid
        let region = Region::new(Vector2::new(100, 50), Vector2::new(120, 60), 90);
        let corners = region.corners();

        let expected = [(70.0, -10.0), (130.0, -10.0), (130.0, 110.0), (70.0, 110.0)];
        for (corner, (x, y)) in corners.iter().zip(expected) {
            assert_eq!((corner.x, corner.y), (x, y));
        }
    }

    #[test]
    fn corners_are_symmetric_around_center() {
        let region = Region::new(Vector2::new(300, 200), Vector2::new(90, 45), 35);
        let c = region.corners();
        let center = region.center.cast::<f32>();

        assert_relative_eq!((c[0] + c[2]) / 2.0, center, epsilon = 1e-3);
        assert_relative_eq!((c[1] + c[3]) / 2.0, center, epsilon = 1e-3);
        assert_relative_eq!((c[2] - c[1]).norm(), 90.0, epsilon = 1e-3);
        assert_relative_eq!((c[0] - c[1]).norm(), 45.0, epsilon = 1e-3);
    }

    #[test]
    fn scaled_truncates_and_keeps_angle() {
        let region = Region::new(Vector2::new(101, 99), Vector2::new(120, 60), 15);
        let scaled = region.scaled(0.5, 0.5);

        assert_eq!(scaled.center, Vector2::new(50, 49));
        assert_eq!(scaled.size, Vector2::new(60, 30));
        assert_eq!(scaled.angle, 15);
    }

    #[test]
    fn contains_uses_half_extents() {
        let region = Region::at(Vector2::new(100, 100));

        assert!(region.contains(&Vector2::new(100, 100)));
        assert!(region.contains(&Vector2::new(159, 129)));
        assert!(!region.contains(&Vector2::new(160, 100)));
        assert!(!region.contains(&Vector2::new(100, 130)));
    }
}

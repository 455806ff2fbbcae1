use anyhow::bail;
use nalgebra::Vector2;
use opencv::{
    core::{Mat, Point, Vector, CV_8UC1, CV_8UC3},
    imgproc::{cvt_color_def, COLOR_BGR2GRAY},
    prelude::*,
};
use spots::Region;

pub fn to_gray(img: &Mat) -> anyhow::Result<Mat> {
    let mut img_gray = Mat::default();
    match img.typ() {
        CV_8UC1 => {
            img_gray = img.clone();
        }
        CV_8UC3 => {
            cvt_color_def(img, &mut img_gray, COLOR_BGR2GRAY)?;
        }
        _ => {
            bail!("Image of unknown color type");
        }
    }

    Ok(img_gray)
}

// Truncates toward zero
fn to_point(v: &Vector2<f32>) -> Point {
    Point::new(v.x as i32, v.y as i32)
}

/// The rotated rectangle of a region as a single closed contour.
pub fn region_contour(region: &Region) -> Vector<Vector<Point>> {
    let corners: Vector<Point> = region.corners().iter().map(to_point).collect();
    let mut contours = Vector::new();
    contours.push(corners);
    contours
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::{Scalar, CV_32FC1};

    #[test]
    fn contour_has_truncated_corners() {
        let region = Region::new(Vector2::new(100, 50), Vector2::new(121, 61), 0);
        let contour = region_contour(&region).get(0).unwrap();

        assert_eq!(contour.len(), 4);
        // 100 - 60.5 = 39.5, 50 + 30.5 = 80.5
        assert_eq!(contour.get(0).unwrap(), Point::new(39, 80));
        assert_eq!(contour.get(2).unwrap(), Point::new(160, 19));
    }

    #[test]
    fn quarter_turn_contour_swaps_extents() {
        let region = Region::new(Vector2::new(100, 50), Vector2::new(120, 60), 90);
        let contour = region_contour(&region).get(0).unwrap();

        let points: Vec<Point> = contour.iter().collect();
        assert_eq!(
            points,
            [Point::new(70, -10), Point::new(130, -10), Point::new(130, 110), Point::new(70, 110)]
        );
    }

    #[test]
    fn gray_input_is_passed_through() {
        let img = Mat::new_rows_cols_with_default(4, 6, CV_8UC1, Scalar::all(77.0)).unwrap();
        let gray = to_gray(&img).unwrap();

        assert_eq!(gray.typ(), CV_8UC1);
        assert_eq!(*gray.at_2d::<u8>(2, 3).unwrap(), 77);
    }

    #[test]
    fn color_input_is_converted() {
        let img = Mat::new_rows_cols_with_default(4, 6, CV_8UC3, Scalar::all(200.0)).unwrap();
        let gray = to_gray(&img).unwrap();

        assert_eq!(gray.typ(), CV_8UC1);
        assert_eq!(gray.size().unwrap(), img.size().unwrap());
    }

    #[test]
    fn float_input_is_rejected() {
        let img = Mat::new_rows_cols_with_default(4, 6, CV_32FC1, Scalar::all(0.5)).unwrap();
        assert!(to_gray(&img).is_err());
    }
}

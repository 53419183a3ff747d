//! Scale-and-crop engine for the canonical passport frame.
//!
//! Planning is pure arithmetic on the detected face box:
//! 1. `scale = target_head_height / (bottom - top)` so the box ends up occupying
//!    `head_ratio` of the canonical height.
//! 2. The horizontal centre of the box in scaled space is
//!    `(right - left) * scale / 2 + left * scale`.
//! 3. The crop spans `canonical_width` around that centre, and vertically from
//!    `top * scale - canonical_height * top_ratio` to
//!    `bottom * scale + canonical_height * bottom_ratio`.
//!
//! The integer [`CropRegion`] always has exactly the canonical size; its origin is the
//! float origin rounded half to even. Scaled image dimensions are truncated. Whether a region reaching past the scaled image is acceptable is
//! decided by the caller (see [`BoundsPolicy`]), before any pixels are resampled.

use image::{DynamicImage, Rgba, RgbaImage, imageops::FilterType};
use passport_utils::config::{BoundsPolicySetting, CropBoundsSettings};
use serde::Serialize;

use crate::calibration::Calibration;
use crate::error::PipelineError;
use crate::geometry::BoundingBox;

/// How to handle a canonical crop that extends past the scaled source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundsPolicy {
    /// Reject the photo.
    #[default]
    Reject,
    /// Fill the uncovered area with a solid colour.
    Pad { fill: Rgba<u8> },
}

impl From<&CropBoundsSettings> for BoundsPolicy {
    fn from(settings: &CropBoundsSettings) -> Self {
        match settings.policy {
            BoundsPolicySetting::Reject => BoundsPolicy::Reject,
            BoundsPolicySetting::Pad => {
                let [r, g, b] = settings.fill_color;
                BoundsPolicy::Pad {
                    fill: Rgba([r, g, b, 255]),
                }
            }
        }
    }
}

/// Integer crop rectangle in scaled-image coordinates. The origin may be negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CropRegion {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

impl CropRegion {
    /// Returns true when the whole region lies inside a `width` x `height` image.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.x >= 0
            && self.y >= 0
            && self.x + self.width as i64 <= width as i64
            && self.y + self.height as i64 <= height as i64
    }
}

/// Result of planning a canonical crop for one face box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CropPlan {
    /// Uniform factor applied to the whole source image.
    pub scale: f64,
    pub scaled_width: u32,
    pub scaled_height: u32,
    /// Horizontal centre of the face box in scaled coordinates.
    pub center_x: f64,
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub region: CropRegion,
}

impl CropPlan {
    /// Returns true when realizing the region needs pixels outside the scaled image.
    pub fn requires_padding(&self) -> bool {
        !self
            .region
            .fits_within(self.scaled_width, self.scaled_height)
    }
}

/// Plan the canonical crop for `face` detected on a `source_width` x `source_height` image.
///
/// Fails only when the face box is degenerate; the upscale bound is checked by the caller
/// against [`CropPlan::scale`].
pub fn plan_crop(
    source_width: u32,
    source_height: u32,
    face: BoundingBox,
    calibration: &Calibration,
) -> Result<CropPlan, PipelineError> {
    if face.is_degenerate() {
        return Err(PipelineError::DegenerateFaceBox(face));
    }

    let canvas_w = calibration.canonical_width_px() as f64;
    let canvas_h = calibration.canonical_height_px() as f64;

    let scale = calibration.target_head_height_px() / face.height() as f64;
    let center_x = (face.right - face.left) as f64 * scale / 2.0 + face.left as f64 * scale;

    let left = center_x - canvas_w / 2.0;
    let right = center_x + canvas_w / 2.0;
    let top = face.top as f64 * scale - canvas_h * calibration.top_ratio();
    let bottom = face.bottom as f64 * scale + canvas_h * calibration.bottom_ratio();

    Ok(CropPlan {
        scale,
        scaled_width: scaled_dimension(source_width, scale),
        scaled_height: scaled_dimension(source_height, scale),
        center_x,
        left,
        top,
        right,
        bottom,
        region: CropRegion {
            x: left.round_ties_even() as i64,
            y: top.round_ties_even() as i64,
            width: calibration.canonical_width_px(),
            height: calibration.canonical_height_px(),
        },
    })
}

fn scaled_dimension(length: u32, scale: f64) -> u32 {
    (length as f64 * scale).floor().clamp(1.0, u32::MAX as f64) as u32
}

/// Resample `image` by the plan's scale and cut out the canonical region.
///
/// Any part of the region outside the scaled image is filled with `fill`. The output
/// always has the region's dimensions.
pub fn render_canonical(image: &DynamicImage, plan: &CropPlan, fill: Rgba<u8>) -> DynamicImage {
    let scaled = image.resize_exact(plan.scaled_width, plan.scaled_height, FilterType::Lanczos3);
    let region = plan.region;

    if region.fits_within(scaled.width(), scaled.height()) {
        return scaled.crop_imm(region.x as u32, region.y as u32, region.width, region.height);
    }

    let mut canvas = RgbaImage::from_pixel(region.width, region.height, fill);
    image::imageops::replace(&mut canvas, &scaled.to_rgba8(), -region.x, -region.y);
    DynamicImage::ImageRgba8(canvas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgb, RgbImage};

    #[test]
    fn plans_the_reference_face() {
        let cal = Calibration::with_pixels_per_mm(15);
        let face = BoundingBox::new(100, 300, 400, 100);
        let plan = plan_crop(600, 800, face, &cal).expect("plan");

        assert!((plan.scale - 0.99).abs() < 1e-12);
        assert_eq!((plan.scaled_width, plan.scaled_height), (594, 792));
        assert!((plan.center_x - 198.0).abs() < 1e-9);
        assert!((plan.left - -64.5).abs() < 1e-9);
        assert!((plan.right - 460.5).abs() < 1e-9);
        assert!((plan.top - -127.8).abs() < 1e-9);
        assert!((plan.bottom - 547.2).abs() < 1e-9);
        assert_eq!(plan.region.width, 525);
        assert_eq!(plan.region.height, 675);
        // -64.5 rounds half to even.
        assert_eq!(plan.region.x, -64);
        assert_eq!(plan.region.y, -128);
        assert!(plan.requires_padding());
    }

    #[test]
    fn scaled_size_truncates_and_origin_rounds_half_to_even() {
        let cal = Calibration::default();
        let plan = plan_crop(601, 800, BoundingBox::new(100, 300, 400, 100), &cal).expect("plan");
        // 601 * 0.99 = 594.99
        assert_eq!(plan.scaled_width, 594);
        assert_eq!(plan.region.x, -64);

        // Left edge at 237.5 lands on the even neighbour.
        let plan = plan_crop(1200, 1200, BoundingBox::new(300, 600, 597, 400), &cal)
            .expect("plan");
        assert_eq!(plan.left, 237.5);
        assert_eq!(plan.region.x, 238);

        // Face 3 px further left puts the edge at 234.5.
        let plan = plan_crop(1200, 1200, BoundingBox::new(300, 597, 597, 397), &cal)
            .expect("plan");
        assert_eq!(plan.left, 234.5);
        assert_eq!(plan.region.x, 234);
    }

    #[test]
    fn float_extent_matches_canonical_size() {
        let cal = Calibration::default();
        let plan = plan_crop(2000, 2000, BoundingBox::new(411, 903, 788, 517), &cal)
            .expect("plan");
        assert!((plan.right - plan.left - 525.0).abs() < 1e-9);
        assert!((plan.bottom - plan.top - 675.0).abs() < 1e-9);
    }

    #[test]
    fn center_uses_scaled_box_arithmetic() {
        let cal = Calibration::default();
        // Odd width and offset so the centre is not an integer.
        let face = BoundingBox::new(50, 258, 149, 31);
        let plan = plan_crop(400, 400, face, &cal).expect("plan");
        let expected = (258 - 31) as f64 * plan.scale / 2.0 + 31.0 * plan.scale;
        assert_eq!(plan.center_x, expected);
        assert!((plan.scale - 3.0).abs() < 1e-12);
    }

    #[test]
    fn small_faces_report_large_scale() {
        let cal = Calibration::default();
        let plan = plan_crop(640, 480, BoundingBox::new(10, 110, 110, 10), &cal).expect("plan");
        assert!(plan.scale > cal.max_upscale());
    }

    #[test]
    fn degenerate_box_is_a_fault() {
        let cal = Calibration::default();
        let err = plan_crop(640, 480, BoundingBox::new(200, 300, 200, 100), &cal).unwrap_err();
        assert!(matches!(err, PipelineError::DegenerateFaceBox(_)));
    }

    #[test]
    fn centred_face_fits_without_padding() {
        let cal = Calibration::default();
        let face = BoundingBox::new(300, 600, 597, 400);
        let plan = plan_crop(1200, 1200, face, &cal).expect("plan");
        assert_eq!(plan.scale, 1.0);
        assert_eq!(plan.region.x, 238);
        assert_eq!(plan.region.y, 73);
        assert!(!plan.requires_padding());

        let source = DynamicImage::ImageRgb8(RgbImage::from_fn(1200, 1200, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, 7])
        }));
        let out = render_canonical(&source, &plan, Rgba([0, 0, 0, 255]));
        assert_eq!(out.dimensions(), (525, 675));
        assert_eq!(out.get_pixel(0, 0), Rgba([238, 73, 7, 255]));
    }

    #[test]
    fn padding_fills_uncovered_area() {
        let cal = Calibration::default();
        let face = BoundingBox::new(100, 300, 400, 100);
        let plan = plan_crop(600, 800, face, &cal).expect("plan");

        let source = DynamicImage::ImageRgb8(RgbImage::from_pixel(600, 800, Rgb([90, 90, 90])));
        let fill = Rgba([255, 0, 255, 255]);
        let out = render_canonical(&source, &plan, fill);
        assert_eq!(out.dimensions(), (525, 675));
        assert_eq!(out.get_pixel(0, 0), fill);
        // Region starts at (-64, -128): well inside the copied area.
        assert_eq!(out.get_pixel(300, 400), Rgba([90, 90, 90, 255]));
    }

    #[test]
    fn policy_from_settings() {
        let settings = CropBoundsSettings {
            policy: BoundsPolicySetting::Pad,
            fill_color: [1, 2, 3],
        };
        assert_eq!(
            BoundsPolicy::from(&settings),
            BoundsPolicy::Pad {
                fill: Rgba([1, 2, 3, 255])
            }
        );
        assert_eq!(
            BoundsPolicy::from(&CropBoundsSettings::default()),
            BoundsPolicy::Reject
        );
    }
}

//! # Fire detection module
//!
//! Fire detection isolates fire-coloured pixels in a nav camera frame and reports the target
//! pixel nearest the robot's reference point. The pipeline is:
//!
//! 1. Compute the hue channel of the frame.
//! 2. Threshold hue to an inclusive band, producing a binary mask.
//! 3. Apply a morphological opening to the mask, removing isolated noise pixels.
//! 4. Scan the mask for the nonzero pixel closest to the reference point.
//!
//! "No fire in frame" is a first-class result (`Ok(None)`), not an error - the seek manager
//! substitutes its own fallback geometry in that case. Only malformed frames produce an error.
//!
//! The detector holds no state between calls and runs in time proportional to the number of
//! pixels in the frame.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use image::{GrayImage, Rgb, RgbImage};
use nalgebra::Point2;

// Internal
pub use params::Params;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Fire detector.
#[derive(Debug, Clone, Default)]
pub struct FireDetect {
    params: Params,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during fire detection.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FireDetectError {
    #[error("The provided frame has zero size")]
    EmptyFrame,

    #[error("The noise kernel size must be an odd number of pixels, found {0}")]
    EvenNoiseKernel(u32),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl FireDetect {
    /// Create a new detector from the given parameters.
    pub fn new(params: Params) -> Result<Self, FireDetectError> {
        if params.noise_kernel_size % 2 == 0 {
            return Err(FireDetectError::EvenNoiseKernel(params.noise_kernel_size));
        }

        Ok(Self { params })
    }

    /// Find the fire pixel nearest to `centre`.
    ///
    /// Returns `Ok(None)` if no fire-coloured pixel survives thresholding and noise suppression.
    /// Distance ties are broken by scan order (top-to-bottom, left-to-right), which keeps the
    /// result deterministic.
    pub fn detect(
        &self,
        image: &RgbImage,
        centre: &Point2<f64>,
    ) -> Result<Option<Point2<f64>>, FireDetectError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(FireDetectError::EmptyFrame);
        }

        // Threshold the hue channel into a binary mask
        let mut mask = self.hue_mask(image);

        // Noise reduction
        if self.params.noise_kernel_size > 1 {
            mask = morph_open(&mask, self.params.noise_kernel_size);
        }

        // Find the nonzero mask pixel closest to the centre. Squared distances are enough for
        // the comparison.
        let mut nearest: Option<(Point2<f64>, f64)> = None;

        for (x, y, px) in mask.enumerate_pixels() {
            if px[0] == 0 {
                continue;
            }

            let point = Point2::new(x as f64, y as f64);
            let dist_sq = nalgebra::distance_squared(&point, centre);

            let closer = match nearest {
                Some((_, best)) => dist_sq < best,
                None => true,
            };

            if closer {
                nearest = Some((point, dist_sq));
            }
        }

        Ok(nearest.map(|(p, _)| p))
    }

    /// Build the binary fire mask by thresholding the hue of each pixel to the configured band.
    ///
    /// Mask pixels are 255 for fire-coloured input pixels and 0 otherwise.
    fn hue_mask(&self, image: &RgbImage) -> GrayImage {
        let mut mask = GrayImage::new(image.width(), image.height());

        for (x, y, px) in image.enumerate_pixels() {
            let hue = rgb_hue(px);

            if hue >= self.params.hue_band_min && hue <= self.params.hue_band_max {
                mask.put_pixel(x, y, image::Luma([255u8]));
            }
        }

        mask
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Compute the hue of an RGB pixel in half-degrees (0-179).
///
/// Achromatic pixels (zero chroma) report a hue of zero, as in the 8 bit convention.
fn rgb_hue(px: &Rgb<u8>) -> u8 {
    let r = px[0] as f64;
    let g = px[1] as f64;
    let b = px[2] as f64;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    if delta == 0.0 {
        return 0;
    }

    let mut hue_deg = if max == r {
        60.0 * ((g - b) / delta)
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };

    if hue_deg < 0.0 {
        hue_deg += 360.0;
    }

    (hue_deg / 2.0).round() as u8
}

/// Morphological opening (erosion followed by dilation) with a square all-ones structuring
/// element of side `kernel_size`.
///
/// Out-of-bounds neighbours neither veto an erosion nor trigger a dilation, so fire regions
/// touching the frame border survive (the target commonly clips the frame edge when close).
fn morph_open(mask: &GrayImage, kernel_size: u32) -> GrayImage {
    dilate(&erode(mask, kernel_size), kernel_size)
}

fn erode(mask: &GrayImage, kernel_size: u32) -> GrayImage {
    morph(mask, kernel_size, true)
}

fn dilate(mask: &GrayImage, kernel_size: u32) -> GrayImage {
    morph(mask, kernel_size, false)
}

/// Shared min/max filter. With `all` set a pixel survives only if every in-bounds neighbour
/// under the kernel is set (erosion); without it a pixel is set if any neighbour is (dilation).
fn morph(mask: &GrayImage, kernel_size: u32, all: bool) -> GrayImage {
    let (width, height) = mask.dimensions();
    let reach = (kernel_size / 2) as i64;

    let mut out = GrayImage::new(width, height);

    for y in 0..height as i64 {
        for x in 0..width as i64 {
            let mut result = all;

            'window: for wy in (y - reach)..=(y + reach) {
                for wx in (x - reach)..=(x + reach) {
                    if wx < 0 || wy < 0 || wx >= width as i64 || wy >= height as i64 {
                        continue;
                    }

                    let set = mask.get_pixel(wx as u32, wy as u32)[0] != 0;

                    if all && !set {
                        result = false;
                        break 'window;
                    }
                    if !all && set {
                        result = true;
                        break 'window;
                    }
                }
            }

            if result {
                out.put_pixel(x as u32, y as u32, image::Luma([255u8]));
            }
        }
    }

    out
}

#[cfg(test)]
mod test {
    use super::*;

    /// A colour inside the default fire hue band (hue 30 degrees, half-degree 15)
    const FIRE: Rgb<u8> = Rgb([255u8, 128, 0]);

    /// A cold blue well outside the band
    const SKY: Rgb<u8> = Rgb([0u8, 0, 255]);

    fn detector(kernel_size: u32) -> FireDetect {
        FireDetect::new(Params {
            noise_kernel_size: kernel_size,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_no_fire_in_background_frame() {
        let detect = detector(5);
        let image = RgbImage::from_pixel(64, 48, SKY);

        let result = detect
            .detect(&image, &Point2::new(32.0, 24.0))
            .unwrap();

        assert_eq!(result, None);
    }

    #[test]
    fn test_single_pixel_found_without_opening() {
        let detect = detector(1);
        let mut image = RgbImage::new(64, 48);
        image.put_pixel(50, 10, FIRE);

        let result = detect
            .detect(&image, &Point2::new(32.0, 24.0))
            .unwrap();

        assert_eq!(result, Some(Point2::new(50.0, 10.0)));
    }

    #[test]
    fn test_isolated_pixel_suppressed_by_opening() {
        let detect = detector(5);
        let mut image = RgbImage::new(64, 48);
        image.put_pixel(50, 10, FIRE);

        let result = detect
            .detect(&image, &Point2::new(32.0, 24.0))
            .unwrap();

        assert_eq!(result, None);
    }

    #[test]
    fn test_nearest_pixel_of_blob() {
        let detect = detector(5);
        let mut image = RgbImage::new(64, 48);

        // 5x5 blob centred on (42, 24), which survives a 5x5 opening exactly
        for y in 22..=26 {
            for x in 40..=44 {
                image.put_pixel(x, y, FIRE);
            }
        }

        let result = detect
            .detect(&image, &Point2::new(32.0, 24.0))
            .unwrap();

        assert_eq!(result, Some(Point2::new(40.0, 24.0)));
    }

    #[test]
    fn test_empty_frame_rejected() {
        let detect = detector(5);
        let image = RgbImage::new(0, 0);

        assert!(matches!(
            detect.detect(&image, &Point2::new(0.0, 0.0)),
            Err(FireDetectError::EmptyFrame)
        ));
    }

    #[test]
    fn test_even_kernel_rejected() {
        assert!(matches!(
            FireDetect::new(Params {
                noise_kernel_size: 4,
                ..Default::default()
            }),
            Err(FireDetectError::EvenNoiseKernel(4))
        ));
    }
}

//! # Synthetic Fire Scene
//!
//! Renders the frames published by the camera simulator: a plain background with a circular
//! fire-coloured blob drifting around the frame centre on a parametric path. The slow radial
//! oscillation walks the blob through approach, orbit, and (with a large enough amplitude)
//! loss-of-target geometry, so every branch of the seek controller gets exercised downstream.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use image::{Rgb, RgbImage};

use crate::params::CamSimParams;

// -----------------------------------------------------------------------------------------------
// CONSTANTS
// -----------------------------------------------------------------------------------------------

/// Colour of the fire blob. Hue 27 degrees, inside the detector's default band.
const FIRE_COLOUR: Rgb<u8> = Rgb([230u8, 120, 30]);

// -----------------------------------------------------------------------------------------------
// STRUCTS
// -----------------------------------------------------------------------------------------------

/// The synthetic scene
pub struct Scene {
    width: u32,
    height: u32,
    blob_radius_px: f64,
    orbit_rate_rads: f64,
    orbit_radius_px: f64,
    radial_amplitude_px: f64,
    radial_rate_rads: f64,
    background: Rgb<u8>,
}

// -----------------------------------------------------------------------------------------------
// IMPLS
// -----------------------------------------------------------------------------------------------

impl Scene {
    pub fn new(params: &CamSimParams) -> Self {
        Self {
            width: params.frame_width,
            height: params.frame_height,
            blob_radius_px: params.blob_radius_px,
            orbit_rate_rads: params.blob_orbit_rate_rads,
            orbit_radius_px: params.blob_orbit_radius_px,
            radial_amplitude_px: params.blob_radial_amplitude_px,
            radial_rate_rads: params.blob_radial_rate_rads,
            background: Rgb(params.background_rgb),
        }
    }

    /// Render the scene at the given number of seconds since the start of the simulation.
    pub fn render(&self, elapsed_s: f64) -> RgbImage {
        let mut image = RgbImage::from_pixel(self.width, self.height, self.background);

        // Parametric blob centre
        let bearing_rad = self.orbit_rate_rads * elapsed_s;
        let radius_px = self.orbit_radius_px
            + self.radial_amplitude_px * (self.radial_rate_rads * elapsed_s).sin();

        let centre_x = self.width as f64 / 2.0 + radius_px * bearing_rad.cos();
        let centre_y = self.height as f64 / 2.0 + radius_px * bearing_rad.sin();

        // Fill the blob, clipped to the frame. Casts from negative floats saturate at zero so a
        // blob entirely out of frame just produces an empty range.
        let r = self.blob_radius_px;
        let x_min = (centre_x - r).floor().max(0.0) as u32;
        let x_max = ((centre_x + r).ceil().min((self.width - 1) as f64)) as u32;
        let y_min = (centre_y - r).floor().max(0.0) as u32;
        let y_max = ((centre_y + r).ceil().min((self.height - 1) as f64)) as u32;

        for y in y_min..=y_max {
            for x in x_min..=x_max {
                let dx = x as f64 - centre_x;
                let dy = y as f64 - centre_y;

                if dx * dx + dy * dy <= r * r {
                    image.put_pixel(x, y, FIRE_COLOUR);
                }
            }
        }

        image
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn scene() -> Scene {
        Scene::new(&CamSimParams {
            frame_period_s: 0.1,
            frame_width: 640,
            frame_height: 480,
            blob_radius_px: 10.0,
            blob_orbit_rate_rads: 0.2,
            blob_orbit_radius_px: 120.0,
            blob_radial_amplitude_px: 0.0,
            blob_radial_rate_rads: 0.05,
            background_rgb: [40, 60, 90],
        })
    }

    #[test]
    fn test_blob_rendered_at_orbit_radius() {
        let scene = scene();

        // At t = 0 the blob sits at bearing zero, directly right of centre
        let image = scene.render(0.0);

        assert_eq!(image.get_pixel(320 + 120, 240), &FIRE_COLOUR);
        assert_eq!(image.get_pixel(320, 240), &Rgb([40u8, 60, 90]));
    }

    #[test]
    fn test_blob_clipped_when_out_of_frame() {
        let mut scene = scene();
        scene.orbit_radius_px = 10_000.0;

        // A blob far out of frame renders as pure background without panicking
        let image = scene.render(0.0);

        assert!(image.pixels().all(|px| px == &Rgb([40u8, 60, 90])));
    }
}

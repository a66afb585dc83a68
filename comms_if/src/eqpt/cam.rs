//! # Nav Camera Communications Module

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::convert::TryFrom;

use base64::DecodeError;
use chrono::{serde::ts_milliseconds, DateTime, Utc};
use image::RgbImage;
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A serialisable nav camera frame
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NavFrame {
    /// UTC timestamp at which the frame was acquired
    #[serde(with = "ts_milliseconds")]
    pub timestamp: DateTime<Utc>,

    /// Width of the image in pixels
    pub width: u32,

    /// Height of the image in pixels
    pub height: u32,

    /// The image data, encoded in base64, by flattening the 8 bit RGB image row-major (3 bytes
    /// per pixel) and encoding the resulting bytes in base64.
    pub b64_data: String,
}

/// Represents a concrete 8 bit RGB image from the nav camera.
#[derive(Debug, Clone)]
pub struct NavImage {
    /// UTC timestamp at which the frame was acquired
    pub timestamp: DateTime<Utc>,

    /// The image itself
    pub image: RgbImage,
}

// -----------------------------------------------------------------------------------------------
// ENUMS
// -----------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error, Clone)]
pub enum CamError {
    #[error("Failed to decode nav frame from base64: {0}")]
    FrameDecodeError(DecodeError),

    #[error("The encoded frame data does not match the frame dimensions (expected {expected} \
        bytes, found {found})")]
    FrameWrongSize { expected: usize, found: usize },
}

// -----------------------------------------------------------------------------------------------
// IMPLS
// -----------------------------------------------------------------------------------------------

impl TryFrom<NavFrame> for NavImage {
    type Error = CamError;

    fn try_from(frame: NavFrame) -> Result<Self, Self::Error> {
        // Decode the bytes from the base64 string
        let bytes = match base64::decode(frame.b64_data) {
            Ok(v) => v,
            Err(e) => return Err(CamError::FrameDecodeError(e)),
        };

        // A frame which doesn't hold exactly width*height RGB triplets is malformed, for example
        // one published with an alpha channel or with zero dimensions.
        let expected = frame.width as usize * frame.height as usize * 3;
        if bytes.len() != expected {
            return Err(CamError::FrameWrongSize {
                expected,
                found: bytes.len(),
            });
        }

        // Build the image from the raw data
        let image = RgbImage::from_raw(frame.width, frame.height, bytes).ok_or(
            CamError::FrameWrongSize {
                expected,
                found: 0,
            },
        )?;

        // Construct self
        Ok(Self {
            timestamp: frame.timestamp,
            image,
        })
    }
}

impl NavImage {
    /// Convert this image into a frame ready to be serialised onto the wire.
    pub fn to_frame(&self) -> NavFrame {
        NavFrame {
            timestamp: self.timestamp,
            width: self.image.width(),
            height: self.image.height(),
            b64_data: base64::encode(self.image.as_raw()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_frame_round_trip() {
        let image = NavImage {
            timestamp: Utc::now(),
            image: RgbImage::from_pixel(4, 3, image::Rgb([255u8, 128, 0])),
        };

        let decoded = NavImage::try_from(image.to_frame()).unwrap();

        assert_eq!(decoded.image.dimensions(), (4, 3));
        assert_eq!(decoded.image.get_pixel(2, 1), &image::Rgb([255u8, 128, 0]));
    }

    #[test]
    fn test_malformed_frame_rejected() {
        // Data for a 2x2 RGBA image pushed through the RGB frame type
        let frame = NavFrame {
            timestamp: Utc::now(),
            width: 2,
            height: 2,
            b64_data: base64::encode(&[0u8; 16]),
        };

        assert!(matches!(
            NavImage::try_from(frame),
            Err(CamError::FrameWrongSize { .. })
        ));
    }
}

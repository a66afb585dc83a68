//! Parameters structure for FireDetect

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for fire detection.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {
    /// Lower bound (inclusive) of the hue band which counts as fire-coloured.
    ///
    /// Units: half-degrees (the 8 bit hue convention, 0-179)
    pub hue_band_min: u8,

    /// Upper bound (inclusive) of the hue band which counts as fire-coloured.
    ///
    /// Units: half-degrees (the 8 bit hue convention, 0-179)
    pub hue_band_max: u8,

    /// Side of the square structuring element used in the morphological
    /// opening which suppresses isolated noise pixels.
    ///
    /// Must be odd. A size of 1 disables the opening.
    ///
    /// Units: pixels
    pub noise_kernel_size: u32,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            hue_band_min: 10,
            hue_band_max: 20,
            noise_kernel_size: 5,
        }
    }
}

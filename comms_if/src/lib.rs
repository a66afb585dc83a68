//! # Communications interface crate.
//!
//! Provides all common communications interfaces for the software.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Frame and command definitions for equipment (camera and motion subsystem)
pub mod eqpt;

/// Network module
pub mod net;

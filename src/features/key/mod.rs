//! Key estimation modules
//!
//! Infer the musical key of recent playing from:
//! - Pitch-class histograms
//! - Tonic / third comparison

pub mod estimator;
pub mod histogram;

pub use estimator::KeyEstimator;
pub use histogram::PitchClassHistogram;

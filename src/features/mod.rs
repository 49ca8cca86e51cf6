//! Feature extraction modules
//!
//! This module contains the signal-level and note-level extractors:
//! - Pitch detection and note mapping
//! - Key estimation

pub mod key;
pub mod pitch;

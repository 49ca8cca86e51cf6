//! Error types for the key detection engine

use std::fmt;

/// Errors that can occur while configuring or driving key analysis
///
/// Detection-side outcomes (silence, no pitch, too little evidence, low
/// confidence) are ordinary states and never surface as errors.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Invalid input parameters
    InvalidInput(String),

    /// Configuration rejected by validation
    InvalidConfig(String),

    /// A driver was invoked while no capture session is active
    SessionNotActive,
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            AnalysisError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            AnalysisError::SessionNotActive => write!(f, "No active analysis session"),
        }
    }
}

impl std::error::Error for AnalysisError {}

//! Configuration parameters for live key analysis

use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Relative weights of the four confidence factors
///
/// Weights must be non-negative and sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceWeights {
    /// Weight of note diversity (default: 0.25)
    pub diversity: f32,

    /// Weight of the in-key observation ratio (default: 0.40)
    pub key_match: f32,

    /// Weight of tonic repetition (default: 0.20)
    pub repetition: f32,

    /// Weight of elapsed analysis time (default: 0.15)
    pub time: f32,
}

impl Default for ConfidenceWeights {
    fn default() -> Self {
        Self {
            diversity: 0.25,
            key_match: 0.40,
            repetition: 0.20,
            time: 0.15,
        }
    }
}

impl ConfidenceWeights {
    /// Sum of all four weights
    pub fn sum(&self) -> f32 {
        self.diversity + self.key_match + self.repetition + self.time
    }
}

/// Analysis configuration parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    // Pitch detection
    /// Expected capture frame length in samples (default: 2048)
    pub frame_size: usize,

    /// Frames with RMS below this level carry no pitch (default: 0.01)
    pub min_rms: f32,

    /// Minimum autocorrelation value accepted for a period peak (default: 0.01)
    pub min_correlation: f32,

    /// Reference frequency of A4 in Hz (default: 440.0)
    pub reference_frequency: f32,

    // Scheduling
    /// Rolling pitch history length in milliseconds (default: 40000)
    ///
    /// Also the elapsed time at which the time confidence factor saturates.
    pub window_ms: u64,

    /// Period of the detection driver in milliseconds (default: 3000)
    pub detection_interval_ms: u64,

    /// Rate of the frame driver in frames per second (default: 60.0)
    pub frame_rate_hz: f32,

    // Key estimation
    /// Minimum number of buffered pitches before a key is estimated (default: 10)
    pub min_samples: usize,

    /// Minimum distinct pitch classes before analysis starts (default: 5)
    pub min_unique_notes: usize,

    // Stability
    /// Confidence a candidate must reach to count towards stability (default: 0.8)
    pub confidence_threshold: f32,

    /// How long a candidate must persist before it locks, in milliseconds (default: 1500)
    pub stability_ms: u64,

    /// Confidence factor weights
    pub weights: ConfidenceWeights,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            frame_size: 2048,
            min_rms: 0.01,
            min_correlation: 0.01,
            reference_frequency: 440.0,
            window_ms: 40_000,
            detection_interval_ms: 3_000,
            frame_rate_hz: 60.0,
            min_samples: 10,
            min_unique_notes: 5,
            confidence_threshold: 0.8,
            stability_ms: 1_500,
            weights: ConfidenceWeights::default(),
        }
    }
}

impl AnalysisConfig {
    /// Rolling window length
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    /// Detection driver period
    pub fn detection_interval(&self) -> Duration {
        Duration::from_millis(self.detection_interval_ms)
    }

    /// Frame driver period, derived from `frame_rate_hz`
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.frame_rate_hz as f64)
    }

    /// Minimum persistence of a candidate before it locks
    pub fn stability(&self) -> Duration {
        Duration::from_millis(self.stability_ms)
    }

    /// Check every parameter for a usable value
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidConfig` naming the first offending field.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.frame_size < 3 {
            return Err(AnalysisError::InvalidConfig(format!(
                "frame_size must be at least 3, got {}",
                self.frame_size
            )));
        }
        if self.min_rms.is_nan() || self.min_rms < 0.0 {
            return Err(AnalysisError::InvalidConfig(format!(
                "min_rms must be non-negative, got {}",
                self.min_rms
            )));
        }
        if self.min_correlation.is_nan() || self.min_correlation < 0.0 {
            return Err(AnalysisError::InvalidConfig(format!(
                "min_correlation must be non-negative, got {}",
                self.min_correlation
            )));
        }
        if !(self.reference_frequency > 0.0 && self.reference_frequency.is_finite()) {
            return Err(AnalysisError::InvalidConfig(format!(
                "reference_frequency must be positive, got {}",
                self.reference_frequency
            )));
        }
        if self.window_ms == 0 {
            return Err(AnalysisError::InvalidConfig(
                "window_ms must be positive".to_string(),
            ));
        }
        if self.detection_interval_ms == 0 {
            return Err(AnalysisError::InvalidConfig(
                "detection_interval_ms must be positive".to_string(),
            ));
        }
        if !(self.frame_rate_hz > 0.0 && self.frame_rate_hz.is_finite()) {
            return Err(AnalysisError::InvalidConfig(format!(
                "frame_rate_hz must be positive, got {}",
                self.frame_rate_hz
            )));
        }
        if self.min_unique_notes > 12 {
            return Err(AnalysisError::InvalidConfig(format!(
                "min_unique_notes cannot exceed 12, got {}",
                self.min_unique_notes
            )));
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(AnalysisError::InvalidConfig(format!(
                "confidence_threshold must be in [0, 1], got {}",
                self.confidence_threshold
            )));
        }

        let w = &self.weights;
        if [w.diversity, w.key_match, w.repetition, w.time]
            .iter()
            .any(|&x| x.is_nan() || x < 0.0)
        {
            return Err(AnalysisError::InvalidConfig(
                "confidence weights must be non-negative".to_string(),
            ));
        }
        if (w.sum() - 1.0).abs() > 1e-3 {
            return Err(AnalysisError::InvalidConfig(format!(
                "confidence weights must sum to 1.0, got {:.4}",
                w.sum()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AnalysisConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.window(), Duration::from_secs(40));
        assert_eq!(config.detection_interval(), Duration::from_secs(3));
        assert_eq!(config.stability(), Duration::from_millis(1500));
        assert!((config.weights.sum() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_frame_interval_from_rate() {
        let config = AnalysisConfig {
            frame_rate_hz: 50.0,
            ..AnalysisConfig::default()
        };
        assert_eq!(config.frame_interval(), Duration::from_millis(20));
    }

    #[test]
    fn test_rejects_unbalanced_weights() {
        let config = AnalysisConfig {
            weights: ConfidenceWeights {
                key_match: 0.8,
                ..ConfidenceWeights::default()
            },
            ..AnalysisConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidConfig(_)));
        assert!(err.to_string().contains("sum to 1.0"), "unexpected message: {}", err);
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        let bad = [
            AnalysisConfig { frame_size: 2, ..AnalysisConfig::default() },
            AnalysisConfig { reference_frequency: 0.0, ..AnalysisConfig::default() },
            AnalysisConfig { window_ms: 0, ..AnalysisConfig::default() },
            AnalysisConfig { frame_rate_hz: f32::NAN, ..AnalysisConfig::default() },
            AnalysisConfig { min_unique_notes: 13, ..AnalysisConfig::default() },
            AnalysisConfig { confidence_threshold: 1.5, ..AnalysisConfig::default() },
            AnalysisConfig { min_rms: -1.0, ..AnalysisConfig::default() },
        ];
        for config in bad {
            assert!(config.validate().is_err(), "should reject {:?}", config);
        }
    }

    #[test]
    fn test_json_roundtrip_and_partial_documents() {
        let config = AnalysisConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: AnalysisConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);

        // Missing fields fall back to defaults
        let partial: AnalysisConfig =
            serde_json::from_str(r#"{ "confidence_threshold": 0.7, "weights": { "time": 0.15 } }"#)
                .unwrap();
        assert_eq!(partial.confidence_threshold, 0.7);
        assert_eq!(partial.window_ms, 40_000);
        assert_eq!(partial.weights, ConfidenceWeights::default());
    }
}

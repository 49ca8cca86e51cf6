//! Signal energy gating

/// Energy gate applied to each capture frame before pitch detection
#[derive(Debug, Clone, Copy)]
pub struct SilenceDetector {
    /// RMS level below which a frame is treated as silent (default: 0.01)
    pub min_rms: f32,
}

impl Default for SilenceDetector {
    fn default() -> Self {
        Self { min_rms: 0.01 }
    }
}

impl SilenceDetector {
    /// Create a gate with the given RMS threshold
    pub fn new(min_rms: f32) -> Self {
        Self { min_rms }
    }

    /// Whether the frame carries too little energy to analyze
    ///
    /// Empty frames are silent.
    pub fn is_silent(&self, samples: &[f32]) -> bool {
        samples.is_empty() || rms(samples) < self.min_rms
    }
}

/// Root mean square of a frame (0.0 for an empty frame)
///
/// # Arguments
///
/// * `samples` - Time-domain samples
///
/// # Returns
///
/// RMS level in linear amplitude units
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = samples.iter().map(|&x| (x as f64) * (x as f64)).sum();
    (sum_sq / samples.len() as f64).sqrt() as f32
}

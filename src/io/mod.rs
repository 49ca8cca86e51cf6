//! Input and timing modules
//!
//! Capture frame sources, clocks, tick scheduling and the rolling pitch
//! history.

pub mod clock;
pub mod pitch_buffer;
pub mod sample_buffer;
pub mod scheduler;

pub use clock::{Clock, ManualClock, PeriodicTimer, SystemClock};
pub use pitch_buffer::{PitchSample, RollingPitchBuffer};
pub use sample_buffer::{FrameList, FrameSource, SampleBuffer};
pub use scheduler::{FrameScheduler, Tick};

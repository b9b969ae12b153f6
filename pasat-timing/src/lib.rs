pub mod queue;
pub mod timer;

pub use queue::{TimerId, TimerQueue};
pub use timer::{HighPrecisionTimer, ManualTimer, Timer};

/// Milliseconds on a [`Timer`]'s clock
pub type Millis = u64;

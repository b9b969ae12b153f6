pub mod arbiter;
pub mod audio;
pub mod config;
pub mod error;
pub mod event;
pub mod generator;
pub mod latch;
pub mod ledger;
pub mod scheduler;
pub mod scoring;
pub mod session;
pub mod staircase;

pub use arbiter::{InputArbiter, InputEvent, Verdict};
pub use audio::{AudioPlayer, Playback, PlaybackTicket, SilentPlayer};
pub use config::DrillConfig;
pub use error::{ConfigError, DrillError, LedgerError, PlaybackError, RaceLoss};
pub use event::{DrillEvent, EndReason, SessionReport, TrialResolution};
pub use generator::DigitGenerator;
pub use latch::ResolutionLatch;
pub use ledger::TrialLedger;
pub use scheduler::TrialScheduler;
pub use scoring::score;
pub use session::Session;
pub use staircase::Staircase;

use pasat_core::{Millis, TrialId};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("nback_distance must be between 1 and 10 (got {0})")]
    NbackDistance(usize),
    #[error("min_isi_ms must be at least 500 (got {0})")]
    MinIsiTooLow(Millis),
    #[error("max_isi_ms must be between min_isi_ms ({min}) and 5000 (got {max})")]
    MaxIsi { max: Millis, min: Millis },
    #[error("initial_isi_ms must be between 500 and 5000 in manual mode (got {0})")]
    ManualIsi(Millis),
    #[error("session_duration_seconds must be positive")]
    ZeroDuration,
    #[error("audio_rate must be a positive number (got {0})")]
    AudioRate(f32),
}

/// Audio failed to start or reported an error; the loop proceeds anyway
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("playback failed: {0}")]
pub struct PlaybackError(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("no trial with id {0}")]
    UnknownTrial(TrialId),
    #[error("trial {0} has no expected answer")]
    NotScoreable(TrialId),
    #[error("trial {0} is already resolved")]
    AlreadyResolved(TrialId),
}

/// Another trigger already claimed the resolution of this trial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("trial {0} resolution already claimed")]
pub struct RaceLoss(pub TrialId);

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DrillError {
    #[error("a session is already running")]
    AlreadyActive,
    #[error("no session is running")]
    NotActive,
    #[error(transparent)]
    Config(#[from] ConfigError),
}

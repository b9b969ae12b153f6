use crate::error::ConfigError;
use pasat_core::{InputMode, Millis};
use serde::{Deserialize, Serialize};

/// Lowest floor an operator may configure for the adaptive ISI
pub const MIN_ISI_FLOOR_MS: Millis = 500;
/// Fixed ISI ceiling
pub const MAX_ISI_CEILING_MS: Millis = 5000;
pub const MAX_NBACK_DISTANCE: usize = 10;
/// Nominal length of one spoken digit at rate 1.0
pub const BASE_PLAYBACK_MS: Millis = 500;
pub const PLAYBACK_SAFETY_MARGIN_MS: Millis = 100;
pub const COUNTDOWN_TICK_MS: Millis = 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrillConfig {
    pub nback_distance: usize,
    pub initial_isi_ms: Millis,
    pub min_isi_ms: Millis,
    pub max_isi_ms: Millis,
    pub manual_mode: bool,
    pub session_duration_seconds: u64,
    pub input_mode: InputMode,
    pub debounce_ms: Millis,
    pub lead_in_ms: Millis,
    pub audio_rate: f32,
    pub playback_retry_delay_ms: Millis,
    pub error_beep: bool,
    pub seed: Option<u64>,
}

impl Default for DrillConfig {
    fn default() -> Self {
        Self {
            nback_distance: 1,
            initial_isi_ms: 3000,
            min_isi_ms: 2000,
            max_isi_ms: MAX_ISI_CEILING_MS,
            manual_mode: false,
            session_duration_seconds: 20 * 60,
            input_mode: InputMode::Keystroke,
            debounce_ms: 500,
            lead_in_ms: 1000,
            audio_rate: 1.0,
            playback_retry_delay_ms: 1000,
            error_beep: false,
            seed: None,
        }
    }
}

impl DrillConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_NBACK_DISTANCE).contains(&self.nback_distance) {
            return Err(ConfigError::NbackDistance(self.nback_distance));
        }
        if self.min_isi_ms < MIN_ISI_FLOOR_MS {
            return Err(ConfigError::MinIsiTooLow(self.min_isi_ms));
        }
        if self.max_isi_ms > MAX_ISI_CEILING_MS || self.max_isi_ms < self.min_isi_ms {
            return Err(ConfigError::MaxIsi {
                max: self.max_isi_ms,
                min: self.min_isi_ms,
            });
        }
        if self.manual_mode
            && !(MIN_ISI_FLOOR_MS..=MAX_ISI_CEILING_MS).contains(&self.initial_isi_ms)
        {
            return Err(ConfigError::ManualIsi(self.initial_isi_ms));
        }
        if self.session_duration_seconds == 0 {
            return Err(ConfigError::ZeroDuration);
        }
        if !(self.audio_rate.is_finite() && self.audio_rate > 0.0) {
            return Err(ConfigError::AudioRate(self.audio_rate));
        }
        Ok(())
    }

    /// ISI the first window uses
    pub fn starting_isi(&self) -> Millis {
        self.initial_isi_ms.clamp(self.min_isi_ms, self.max_isi_ms)
    }

    /// How long to wait for a playback completion before moving on
    pub fn playback_timeout_ms(&self) -> Millis {
        (BASE_PLAYBACK_MS as f32 / self.audio_rate).ceil() as Millis + PLAYBACK_SAFETY_MARGIN_MS
    }
}

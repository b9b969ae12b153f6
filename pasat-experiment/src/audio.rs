use crate::error::PlaybackError;
use pasat_core::{Digit, TrialId};

/// Identifies one playback so stale completions can be told apart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaybackTicket {
    pub session: u64,
    pub trial_id: TrialId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Playback {
    /// Playback already ended when `play` returned
    Finished,
    /// Completion will be reported through `TrialScheduler::playback_finished`
    Pending,
}

/// Speaks digits for the scheduler.
///
/// A player that never reports a pending playback is tolerated: the
/// scheduler moves on after its safety timeout.
pub trait AudioPlayer {
    fn play(&mut self, digit: Digit, ticket: PlaybackTicket) -> Result<Playback, PlaybackError>;
    fn stop_all(&mut self);
    fn error_beep(&mut self) {}
}

/// Player that finishes every digit instantly
#[derive(Debug, Clone, Default)]
pub struct SilentPlayer;

impl AudioPlayer for SilentPlayer {
    fn play(&mut self, _digit: Digit, _ticket: PlaybackTicket) -> Result<Playback, PlaybackError> {
        Ok(Playback::Finished)
    }

    fn stop_all(&mut self) {}
}

impl<A: AudioPlayer + ?Sized> AudioPlayer for Box<A> {
    fn play(&mut self, digit: Digit, ticket: PlaybackTicket) -> Result<Playback, PlaybackError> {
        (**self).play(digit, ticket)
    }

    fn stop_all(&mut self) {
        (**self).stop_all()
    }

    fn error_beep(&mut self) {
        (**self).error_beep()
    }
}

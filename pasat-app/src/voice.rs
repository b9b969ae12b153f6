use crossterm::{
    queue,
    style::{Print, Stylize},
};
use pasat_core::Digit;
use pasat_experiment::{AudioPlayer, Playback, PlaybackError, PlaybackTicket};
use std::io::{Stdout, Write, stdout};

/// Announces digits on the terminal instead of speaking them
pub struct TerminalVoice {
    out: Stdout,
}

impl TerminalVoice {
    pub fn new() -> Self {
        Self { out: stdout() }
    }
}

impl AudioPlayer for TerminalVoice {
    fn play(&mut self, digit: Digit, ticket: PlaybackTicket) -> Result<Playback, PlaybackError> {
        queue!(self.out, Print("\r\n    "), Print(digit.to_string().bold()), Print("\r\n"))
            .and_then(|_| self.out.flush())
            .map_err(|e| PlaybackError(e.to_string()))?;
        tracing::debug!(trial_id = ticket.trial_id, %digit, "digit announced");
        Ok(Playback::Finished)
    }

    fn stop_all(&mut self) {
        if let Err(err) = self.out.flush() {
            tracing::debug!(%err, "flush on stop failed");
        }
    }

    fn error_beep(&mut self) {
        if let Err(err) = self.out.write_all(b"\x07").and_then(|_| self.out.flush()) {
            tracing::debug!(%err, "error beep failed");
        }
    }
}

use crate::latch::ResolutionLatch;
use pasat_core::{Candidate, InputMode, Millis, TrialId};
use serde::{Deserialize, Serialize};

/// Raw input from the input source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Snapshot of the text buffer after an edit
    Buffer(String),
    /// A discrete "button N" selection
    Select(u32),
}

/// What the arbiter made of one input event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// No action
    Ignore,
    /// Ignored and the input widget should be cleared
    Rejected,
    /// Prefix of the answer, waiting for more digits
    Provisional,
    /// Wrong selection, kept as the current candidate
    Flagged(u32),
    /// Resolve the open trial with this value
    Commit(u32),
}

#[derive(Debug, Clone)]
struct AnswerWindow {
    trial_id: TrialId,
    expected: u32,
    expected_text: String,
}

/// Classifies candidate answers for the trial awaiting resolution and
/// owns the candidate the deadline fallback reads.
#[derive(Debug, Clone)]
pub struct InputArbiter {
    mode: InputMode,
    debounce_ms: Millis,
    blocked_until: Millis,
    window: Option<AnswerWindow>,
    candidate: Option<Candidate>,
}

impl InputArbiter {
    pub fn new(mode: InputMode, debounce_ms: Millis) -> Self {
        Self {
            mode,
            debounce_ms,
            blocked_until: 0,
            window: None,
            candidate: None,
        }
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    /// A new stimulus was presented: drop any window and candidate and
    /// start the debounce period.
    pub fn on_presentation(&mut self, now: Millis) {
        self.window = None;
        self.candidate = None;
        self.blocked_until = now + self.debounce_ms;
    }

    pub fn open_window(&mut self, trial_id: TrialId, expected: u32) {
        self.window = Some(AnswerWindow {
            trial_id,
            expected,
            expected_text: expected.to_string(),
        });
        self.candidate = None;
    }

    /// The trial resolved; nothing is awaiting an answer until the next window
    pub fn close_window(&mut self) -> Option<Candidate> {
        self.window = None;
        self.candidate.take()
    }

    pub fn awaiting(&self) -> Option<TrialId> {
        self.window.as_ref().map(|w| w.trial_id)
    }

    pub fn current_candidate(&self) -> Option<&Candidate> {
        self.candidate.as_ref()
    }

    pub fn offer(&mut self, event: InputEvent, now: Millis, latch: &ResolutionLatch) -> Verdict {
        let Some(window) = self.window.as_ref() else {
            return Verdict::Ignore;
        };
        if latch.is_claimed() || latch.armed_for() != Some(window.trial_id) {
            return Verdict::Ignore;
        }
        if now < self.blocked_until {
            self.candidate = None;
            return Verdict::Rejected;
        }

        match (self.mode, event) {
            (InputMode::Keystroke, InputEvent::Buffer(text)) => {
                let text = text.trim();
                if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
                    self.candidate = None;
                    return Verdict::Rejected;
                }
                if text == window.expected_text {
                    // the textual match is re-checked numerically when scored
                    let value = window.expected;
                    self.candidate = Some(Candidate::Typed(text.to_string()));
                    return Verdict::Commit(value);
                }
                if window.expected_text.starts_with(text) {
                    self.candidate = Some(Candidate::Typed(text.to_string()));
                    return Verdict::Provisional;
                }
                self.candidate = None;
                Verdict::Rejected
            }
            (InputMode::Selection, InputEvent::Select(value)) => {
                self.candidate = Some(Candidate::Selected(value));
                if value == window.expected {
                    Verdict::Commit(value)
                } else {
                    Verdict::Flagged(value)
                }
            }
            _ => Verdict::Ignore,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn armed(trial_id: TrialId) -> ResolutionLatch {
        let mut latch = ResolutionLatch::default();
        latch.arm(trial_id);
        latch
    }

    fn keystroke_window(expected: u32) -> (InputArbiter, ResolutionLatch) {
        let mut arbiter = InputArbiter::new(InputMode::Keystroke, 500);
        arbiter.on_presentation(0);
        arbiter.open_window(4, expected);
        (arbiter, armed(4))
    }

    fn buf(s: &str) -> InputEvent {
        InputEvent::Buffer(s.to_string())
    }

    #[test]
    fn ignores_without_open_window() {
        let mut arbiter = InputArbiter::new(InputMode::Keystroke, 500);
        let latch = armed(1);
        assert_eq!(arbiter.offer(buf("8"), 10_000, &latch), Verdict::Ignore);
    }

    #[test]
    fn exact_text_commits() {
        let (mut arbiter, latch) = keystroke_window(8);
        assert_eq!(arbiter.offer(buf("8"), 700, &latch), Verdict::Commit(8));
    }

    #[test]
    fn strict_prefix_waits_for_more_digits() {
        let (mut arbiter, latch) = keystroke_window(14);
        assert_eq!(arbiter.offer(buf("1"), 700, &latch), Verdict::Provisional);
        assert_eq!(
            arbiter.current_candidate(),
            Some(&Candidate::Typed("1".into()))
        );
        assert_eq!(arbiter.offer(buf("14"), 800, &latch), Verdict::Commit(14));
    }

    #[test]
    fn non_prefix_clears_the_buffer() {
        let (mut arbiter, latch) = keystroke_window(14);
        assert_eq!(arbiter.offer(buf("13"), 700, &latch), Verdict::Rejected);
        assert_eq!(arbiter.current_candidate(), None);
        assert_eq!(arbiter.offer(buf("08"), 700, &latch), Verdict::Rejected);
    }

    #[test]
    fn malformed_input_is_discarded() {
        let (mut arbiter, latch) = keystroke_window(8);
        assert_eq!(arbiter.offer(buf("x"), 700, &latch), Verdict::Rejected);
        assert_eq!(arbiter.offer(buf("-8"), 700, &latch), Verdict::Rejected);
        assert_eq!(arbiter.offer(buf(""), 700, &latch), Verdict::Rejected);
    }

    #[test]
    fn debounce_swallows_input_meant_for_the_previous_trial() {
        let mut arbiter = InputArbiter::new(InputMode::Keystroke, 500);
        let mut latch = ResolutionLatch::default();

        // previous trial expected 8, new trial expects 8 as well
        arbiter.on_presentation(10_000);
        latch.arm(5);
        arbiter.open_window(5, 8);
        assert_eq!(arbiter.offer(buf("8"), 10_300, &latch), Verdict::Rejected);
        assert_eq!(arbiter.offer(buf("8"), 10_500, &latch), Verdict::Commit(8));
    }

    #[test]
    fn claimed_latch_blocks_further_commits() {
        let (mut arbiter, mut latch) = keystroke_window(8);
        latch.try_claim(4).unwrap();
        assert_eq!(arbiter.offer(buf("8"), 700, &latch), Verdict::Ignore);
    }

    #[test]
    fn wrong_selection_is_flagged_and_kept() {
        let mut arbiter = InputArbiter::new(InputMode::Selection, 500);
        let latch = armed(2);
        arbiter.on_presentation(0);
        arbiter.open_window(2, 11);
        assert_eq!(
            arbiter.offer(InputEvent::Select(9), 600, &latch),
            Verdict::Flagged(9)
        );
        assert_eq!(arbiter.current_candidate(), Some(&Candidate::Selected(9)));
        assert_eq!(
            arbiter.offer(InputEvent::Select(10), 700, &latch),
            Verdict::Flagged(10)
        );
        assert_eq!(arbiter.current_candidate(), Some(&Candidate::Selected(10)));
        assert_eq!(
            arbiter.offer(InputEvent::Select(11), 800, &latch),
            Verdict::Commit(11)
        );
    }

    #[test]
    fn events_for_the_other_mode_are_ignored() {
        let (mut arbiter, latch) = keystroke_window(8);
        assert_eq!(
            arbiter.offer(InputEvent::Select(8), 700, &latch),
            Verdict::Ignore
        );
    }

    #[test]
    fn close_window_hands_back_the_candidate() {
        let (mut arbiter, latch) = keystroke_window(14);
        arbiter.offer(buf("1"), 700, &latch);
        assert_eq!(arbiter.close_window(), Some(Candidate::Typed("1".into())));
        assert_eq!(arbiter.awaiting(), None);
    }
}

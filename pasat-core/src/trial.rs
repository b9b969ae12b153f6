use crate::{Digit, Millis};
use serde::{Deserialize, Serialize};

pub type TrialId = u64;

/// Scheduler state of the trial in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialState {
    Presenting,
    WindowOpen { deadline: Millis },
    Resolved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TrialOutcome {
    #[default]
    Unresolved,
    Correct,
    Incorrect,
    /// No answer at all
    Missed,
}

impl TrialOutcome {
    pub fn is_resolved(self) -> bool {
        !matches!(self, Self::Unresolved)
    }

    pub fn is_correct(self) -> bool {
        matches!(self, Self::Correct)
    }
}

/// One presented digit and its adjudication
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trial {
    pub trial_id: TrialId,
    pub nback_distance: usize,
    pub stimulus: Digit,
    /// `None` while the history is too short to score this trial
    pub expected_answer: Option<u32>,
    pub presented_at: Millis,
    pub isi_at_presentation: Millis,
    pub user_answer: Option<u32>,
    pub outcome: TrialOutcome,
    pub response_time_ms: Option<Millis>,
}

impl Trial {
    pub fn is_scoreable(&self) -> bool {
        self.expected_answer.is_some()
    }

    pub fn is_resolved(&self) -> bool {
        self.outcome.is_resolved()
    }
}

use crate::arbiter::Verdict;
use pasat_core::{Digit, Millis, Trial, TrialId, TrialOutcome};
use serde::{Deserialize, Serialize};

/// Emitted once per scoreable trial when it resolves
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialResolution {
    pub trial_id: TrialId,
    pub outcome: TrialOutcome,
    pub user_answer: Option<u32>,
    pub response_time_ms: Option<Millis>,
    pub isi: Millis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /// The countdown reached zero
    Elapsed,
    /// Stopped early on request
    Stopped,
}

/// Everything handed to the analytics collaborator when a session ends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub reason: EndReason,
    pub nback_distance: usize,
    pub manual_mode: bool,
    pub session_duration_seconds: u64,
    pub total_attempts: u32,
    pub total_correct: u32,
    pub accuracy_percent: u32,
    pub lowest_isi_ms: Millis,
    pub average_response_time_ms: Millis,
    pub longest_correct_run: u32,
    pub trials: Vec<Trial>,
}

impl SessionReport {
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

pub(crate) fn accuracy_percent(correct: u32, attempts: u32) -> u32 {
    if attempts == 0 {
        return 0;
    }
    (f64::from(correct) * 100.0 / f64::from(attempts)).round() as u32
}

pub(crate) fn average_response_time(trials: &[Trial]) -> Millis {
    let times: Vec<Millis> = trials.iter().filter_map(|t| t.response_time_ms).collect();
    if times.is_empty() {
        return 0;
    }
    (times.iter().sum::<Millis>() as f64 / times.len() as f64).round() as Millis
}

pub(crate) fn longest_correct_run(trials: &[Trial]) -> u32 {
    let mut best = 0;
    let mut run = 0;
    for trial in trials.iter().filter(|t| t.is_resolved()) {
        if trial.outcome.is_correct() {
            run += 1;
            best = best.max(run);
        } else {
            run = 0;
        }
    }
    best
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrillEvent {
    SessionStarted { session: u64, isi: Millis },
    Presented {
        trial_id: TrialId,
        digit: Digit,
        scoreable: bool,
    },
    WindowOpened { trial_id: TrialId, deadline: Millis },
    InputVerdict(Verdict),
    TrialResolved(TrialResolution),
    IsiChanged { from: Millis, to: Millis },
    CountdownTick { remaining_seconds: u64 },
    SessionEnded(Box<SessionReport>),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved(id: TrialId, outcome: TrialOutcome, rt: Option<Millis>) -> Trial {
        Trial {
            trial_id: id,
            nback_distance: 1,
            stimulus: Digit::new(1).unwrap(),
            expected_answer: Some(2),
            presented_at: 0,
            isi_at_presentation: 3000,
            user_answer: None,
            outcome,
            response_time_ms: rt,
        }
    }

    #[test]
    fn accuracy_rounds_to_whole_percent() {
        assert_eq!(accuracy_percent(0, 0), 0);
        assert_eq!(accuracy_percent(2, 3), 67);
        assert_eq!(accuracy_percent(5, 5), 100);
    }

    #[test]
    fn summary_statistics() {
        use TrialOutcome::*;
        let trials = vec![
            resolved(1, Correct, Some(1000)),
            resolved(2, Correct, Some(1200)),
            resolved(3, Missed, Some(3000)),
            resolved(4, Correct, Some(900)),
            resolved(5, Correct, Some(901)),
            resolved(6, Correct, Some(800)),
            resolved(7, Unresolved, None),
        ];
        assert_eq!(longest_correct_run(&trials), 3);
        assert_eq!(average_response_time(&trials), 1300);
        assert_eq!(average_response_time(&[]), 0);
    }
}

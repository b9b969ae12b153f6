use pasat_core::{Millis, TrialOutcome};
use serde::{Deserialize, Serialize};

pub const ISI_STEP_MS: Millis = 100;
pub const STREAK_LENGTH: u32 = 4;

/// Closed-loop ISI controller.
///
/// Four `Correct` resolutions in a row shorten the ISI by 100ms, four
/// non-`Correct` ones lengthen it by 100ms. At most one of the two run
/// counters is non-zero. In manual mode the ISI is pinned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Staircase {
    current_isi: Millis,
    floor: Millis,
    ceiling: Millis,
    consecutive_correct: u32,
    consecutive_incorrect: u32,
    lowest_isi_reached: Millis,
    manual: bool,
}

impl Staircase {
    pub fn adaptive(initial: Millis, floor: Millis, ceiling: Millis) -> Self {
        let current_isi = initial.clamp(floor, ceiling);
        Self {
            current_isi,
            floor,
            ceiling,
            consecutive_correct: 0,
            consecutive_incorrect: 0,
            lowest_isi_reached: current_isi,
            manual: false,
        }
    }

    pub fn manual(isi: Millis) -> Self {
        Self {
            current_isi: isi,
            floor: isi,
            ceiling: isi,
            consecutive_correct: 0,
            consecutive_incorrect: 0,
            lowest_isi_reached: isi,
            manual: true,
        }
    }

    pub fn current_isi(&self) -> Millis {
        self.current_isi
    }

    pub fn lowest_isi_reached(&self) -> Millis {
        self.lowest_isi_reached
    }

    pub fn consecutive_correct(&self) -> u32 {
        self.consecutive_correct
    }

    pub fn consecutive_incorrect(&self) -> u32 {
        self.consecutive_incorrect
    }

    pub fn is_manual(&self) -> bool {
        self.manual
    }

    /// Folds one scoreable resolution into the streaks and returns the ISI
    /// for the next window.
    pub fn on_resolved(&mut self, outcome: TrialOutcome) -> Millis {
        match outcome {
            TrialOutcome::Unresolved => return self.current_isi,
            TrialOutcome::Correct => {
                self.consecutive_correct += 1;
                self.consecutive_incorrect = 0;
            }
            TrialOutcome::Incorrect | TrialOutcome::Missed => {
                self.consecutive_incorrect += 1;
                self.consecutive_correct = 0;
            }
        }
        if self.manual {
            return self.current_isi;
        }

        if self.consecutive_correct >= STREAK_LENGTH {
            self.current_isi = self.current_isi.saturating_sub(ISI_STEP_MS).max(self.floor);
            self.lowest_isi_reached = self.lowest_isi_reached.min(self.current_isi);
            self.consecutive_correct = 0;
        } else if self.consecutive_incorrect >= STREAK_LENGTH {
            self.current_isi = (self.current_isi + ISI_STEP_MS).min(self.ceiling);
            self.consecutive_incorrect = 0;
        }
        self.current_isi
    }
}

use crate::error::LedgerError;
use pasat_core::{Digit, Millis, Trial, TrialId, TrialOutcome};

/// Append-only record of presented digits and their trials
#[derive(Debug, Clone)]
pub struct TrialLedger {
    nback_distance: usize,
    history: Vec<Digit>,
    trials: Vec<Trial>,
    next_id: TrialId,
}

impl TrialLedger {
    pub fn new(nback_distance: usize) -> Self {
        Self {
            nback_distance,
            history: Vec::new(),
            trials: Vec::new(),
            next_id: 1,
        }
    }

    pub fn nback_distance(&self) -> usize {
        self.nback_distance
    }

    pub fn history(&self) -> &[Digit] {
        &self.history
    }

    pub fn trials(&self) -> &[Trial] {
        &self.trials
    }

    pub fn into_trials(self) -> Vec<Trial> {
        self.trials
    }

    pub fn latest(&self) -> Option<&Trial> {
        self.trials.last()
    }

    pub fn get(&self, trial_id: TrialId) -> Option<&Trial> {
        self.index_of(trial_id).map(|i| &self.trials[i])
    }

    /// Appends `stimulus` to the history and opens a trial for it.
    ///
    /// The trial is scoreable once the history holds `nback_distance + 1`
    /// digits; its expected answer is the stimulus plus the digit shown
    /// `nback_distance` presentations earlier.
    pub fn record_presentation(
        &mut self,
        stimulus: Digit,
        presented_at: Millis,
        isi: Millis,
    ) -> &Trial {
        self.history.push(stimulus);
        let len = self.history.len();
        let expected_answer = (len > self.nback_distance)
            .then(|| stimulus.plus(self.history[len - 1 - self.nback_distance]));

        let trial_id = self.next_id;
        self.next_id += 1;
        self.trials.push(Trial {
            trial_id,
            nback_distance: self.nback_distance,
            stimulus,
            expected_answer,
            presented_at,
            isi_at_presentation: isi,
            user_answer: None,
            outcome: TrialOutcome::Unresolved,
            response_time_ms: None,
        });
        &self.trials[len - 1]
    }

    /// Writes the one and only outcome of a scoreable trial
    pub fn resolve(
        &mut self,
        trial_id: TrialId,
        user_answer: Option<u32>,
        outcome: TrialOutcome,
        resolved_at: Millis,
    ) -> Result<&Trial, LedgerError> {
        let idx = self
            .index_of(trial_id)
            .ok_or(LedgerError::UnknownTrial(trial_id))?;
        let trial = &mut self.trials[idx];
        if !trial.is_scoreable() {
            return Err(LedgerError::NotScoreable(trial_id));
        }
        if trial.is_resolved() {
            return Err(LedgerError::AlreadyResolved(trial_id));
        }
        trial.user_answer = user_answer;
        trial.outcome = outcome;
        trial.response_time_ms = Some(resolved_at.saturating_sub(trial.presented_at));
        Ok(trial)
    }

    fn index_of(&self, trial_id: TrialId) -> Option<usize> {
        // ids are dense and start at 1
        let idx = trial_id.checked_sub(1)? as usize;
        (idx < self.trials.len()).then_some(idx)
    }
}

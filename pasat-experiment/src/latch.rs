use crate::error::RaceLoss;
use pasat_core::TrialId;

/// Single "already resolving" latch shared by the input path and the
/// deadline path.
///
/// It is armed for a trial at presentation; the first `try_claim` for that
/// trial wins and every later one loses until the next trial is armed.
#[derive(Debug, Clone, Default)]
pub struct ResolutionLatch {
    armed_for: Option<TrialId>,
    claimed: bool,
}

impl ResolutionLatch {
    pub fn arm(&mut self, trial_id: TrialId) {
        self.armed_for = Some(trial_id);
        self.claimed = false;
    }

    pub fn try_claim(&mut self, trial_id: TrialId) -> Result<(), RaceLoss> {
        if self.armed_for != Some(trial_id) || self.claimed {
            return Err(RaceLoss(trial_id));
        }
        self.claimed = true;
        Ok(())
    }

    pub fn is_claimed(&self) -> bool {
        self.claimed
    }

    pub fn armed_for(&self) -> Option<TrialId> {
        self.armed_for
    }
}

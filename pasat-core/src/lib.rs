pub mod input;
pub mod phase;
pub mod stimulus;
pub mod trial;

pub use input::{Candidate, InputMode};
pub use phase::SessionPhase;
pub use stimulus::Digit;
pub use trial::{Trial, TrialId, TrialOutcome, TrialState};
pub use pasat_timing::Millis;

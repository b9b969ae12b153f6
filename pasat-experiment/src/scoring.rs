use pasat_core::{Candidate, Trial, TrialOutcome};

/// Adjudicates a raw answer against the trial's expected sum.
///
/// No answer, or one that is not a number, is a miss.
pub fn score(trial: &Trial, raw_answer: Option<&Candidate>) -> TrialOutcome {
    let Some(answer) = raw_answer.and_then(Candidate::value) else {
        return TrialOutcome::Missed;
    };
    match trial.expected_answer {
        Some(expected) if expected == answer => TrialOutcome::Correct,
        _ => TrialOutcome::Incorrect,
    }
}

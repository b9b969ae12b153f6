use serde::{Deserialize, Serialize};
use std::fmt;

/// How the subject enters answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    /// Live text buffer, committed as soon as it spells the answer
    #[default]
    Keystroke,
    /// Discrete "button N" selections
    Selection,
}

/// The value the input arbiter currently holds for the open trial
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Candidate {
    Typed(String),
    Selected(u32),
}

impl Candidate {
    /// Numeric value of the candidate, `None` if it is not a number
    pub fn value(&self) -> Option<u32> {
        match self {
            Candidate::Typed(text) => text.trim().parse().ok(),
            Candidate::Selected(v) => Some(*v),
        }
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Candidate::Typed(text) => f.write_str(text),
            Candidate::Selected(v) => write!(f, "{v}"),
        }
    }
}

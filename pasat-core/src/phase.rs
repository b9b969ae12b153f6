use serde::{Deserialize, Serialize};

/// Lifecycle of a drill session
#[derive(Copy, Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionPhase {
    #[default]
    Idle,
    Active,
    Ended,
}

impl SessionPhase {
    pub fn allows_input(&self) -> bool {
        matches!(self, Self::Active)
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Ended)
    }
}

use serde::{Deserialize, Serialize};

use crate::Agent;

/// Discrete action requested by a network or a human player.
///
/// The discriminant order matches the network's output columns.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::IsVariant,
)]
pub enum Action {
    Unduck,
    Duck,
    NoAction,
    Jump,
}

/// Number of distinct actions (the network's output width).
pub const ACTION_COUNT: usize = Action::ALL.len();

impl Action {
    pub const ALL: [Self; 4] = [Self::Unduck, Self::Duck, Self::NoAction, Self::Jump];

    /// Maps an output column index to its action.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Applies this action to `agent`. Every handler is a no-op on a disabled agent.
    pub fn apply(self, agent: &mut Agent) {
        match self {
            Self::Unduck => agent.unduck(),
            Self::Duck => agent.duck(),
            Self::NoAction => {}
            Self::Jump => agent.jump(),
        }
    }
}

//! The fixed catalog of agent actions.

use tracing::warn;

use crate::error::{NavError, Result};
use crate::simulation::flow::FlowVector;
use crate::simulation::params::{COMPASS_ACTIONS, COMPASS_STEP, DEFAULT_ACTION_STRENGTH};

/// An available agent action. Same shape as a current: (strength, angle).
pub type ActionVector = FlowVector;

/// Ordered list of actions. Policy-table rows are indexed in this order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionCatalog {
    actions: Vec<ActionVector>,
}

impl Default for ActionCatalog {
    fn default() -> Self {
        Self::compass(DEFAULT_ACTION_STRENGTH)
    }
}

impl ActionCatalog {
    /// Eight directions, 0 through 315 degrees in 45 degree steps, all at
    /// `strength`.
    #[must_use]
    pub fn compass(strength: i32) -> Self {
        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        let actions = (0..COMPASS_ACTIONS as i32)
            .map(|i| ActionVector::new(strength, i * COMPASS_STEP))
            .collect();
        Self { actions }
    }

    /// # Errors
    /// Returns `EmptyCatalog` if `actions` is empty.
    pub fn from_actions(actions: Vec<ActionVector>) -> Result<Self> {
        if actions.is_empty() {
            return Err(NavError::EmptyCatalog);
        }
        Ok(Self { actions })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[ActionVector] {
        &self.actions
    }

    /// Action at `index`. Indices past the end (a table row longer than the
    /// catalog) fall back to the first action.
    #[must_use]
    pub fn get(&self, index: usize) -> ActionVector {
        if let Some(action) = self.actions.get(index) {
            return *action;
        }
        warn!(index, len = self.actions.len(), "action index outside catalog, using action 0");
        self.actions[0]
    }
}

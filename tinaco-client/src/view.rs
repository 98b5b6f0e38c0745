use tinaco_core::{Container, ContainerId, Dispenser, Sensor};

use crate::gateway::{ApiError, Outcome};

/// What a screen knows about an in-flight request. Replaces loose
/// loading/error flag pairs with one tagged state.
#[derive(Debug)]
pub enum ViewState<T> {
    Loading,
    Loaded(T),
    Failed(ApiError),
}

impl<T> ViewState<T> {
    pub fn from_outcome(outcome: Outcome<T>) -> Self {
        match outcome {
            Ok(value) => ViewState::Loaded(value),
            Err(error) => ViewState::Failed(error),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            ViewState::Loaded(value) => Some(value),
            _ => None,
        }
    }
}

impl<T> From<Outcome<T>> for ViewState<T> {
    fn from(outcome: Outcome<T>) -> Self {
        Self::from_outcome(outcome)
    }
}

/// Parent container of a sensor or dispenser, as far as it could be
/// resolved. A failed lookup degrades to `Unavailable` instead of failing
/// the entity it decorates; `Unassigned` means there is no parent at all.
#[derive(Debug, Clone, PartialEq)]
pub enum ContainerLink {
    Details(Container),
    Unavailable(ContainerId),
    Unassigned,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SensorDetail {
    pub sensor: Sensor,
    pub container: ContainerLink,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DispenserDetail {
    pub dispenser: Dispenser,
    pub container: ContainerLink,
}

use serde_json::{Value, json};
use tinaco_core::ContainerId;

use super::sensors::with_container;

/// Parameters for creating a dispenser.
#[derive(Debug, Clone)]
pub struct NewDispenser {
    /// Dispenser kind, e.g. "Dispensador de pH", "Dispensador de TDS".
    pub kind: String,
    pub container_id: Option<ContainerId>,
}

impl From<&NewDispenser> for Value {
    fn from(new: &NewDispenser) -> Self {
        with_container(json!({ "tipo": new.kind }), new.container_id)
    }
}

/// Replacement fields for an existing dispenser.
#[derive(Debug, Clone)]
pub struct DispenserUpdate {
    pub kind: String,
    pub container_id: Option<ContainerId>,
}

impl From<&DispenserUpdate> for Value {
    fn from(update: &DispenserUpdate) -> Self {
        with_container(json!({ "tipo": update.kind }), update.container_id)
    }
}

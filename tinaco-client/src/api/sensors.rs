use serde_json::{Value, json};
use tinaco_core::ContainerId;

/// Parameters for creating a sensor.
#[derive(Debug, Clone)]
pub struct NewSensor {
    /// Sensor kind, e.g. "Sensor de pH", "Sensor de TDS".
    pub kind: String,
    pub container_id: Option<ContainerId>,
}

impl From<&NewSensor> for Value {
    fn from(new: &NewSensor) -> Self {
        with_container(json!({ "tipo": new.kind }), new.container_id)
    }
}

/// Replacement fields for an existing sensor. A `None` container leaves the
/// sensor unassigned.
#[derive(Debug, Clone)]
pub struct SensorUpdate {
    pub kind: String,
    pub container_id: Option<ContainerId>,
}

impl From<&SensorUpdate> for Value {
    fn from(update: &SensorUpdate) -> Self {
        with_container(json!({ "tipo": update.kind }), update.container_id)
    }
}

pub(crate) fn with_container(mut body: Value, container_id: Option<ContainerId>) -> Value {
    if let Some(container_id) = container_id {
        body["id_recipiente"] = json!(container_id);
    }
    body
}

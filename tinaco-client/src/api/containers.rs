use serde_json::{Value, json};

/// Parameters for creating a container.
#[derive(Debug, Clone)]
pub struct NewContainer {
    /// Container kind, e.g. "Alberca", "Tinaco", "Contenedor".
    pub kind: String,
    pub location: String,
    pub capacity_liters: u32,
}

impl From<&NewContainer> for Value {
    fn from(new: &NewContainer) -> Self {
        json!({
            "tipo": new.kind,
            "ubicacion": new.location,
            "capacidad": new.capacity_liters,
        })
    }
}

/// Replacement fields for an existing container.
#[derive(Debug, Clone)]
pub struct ContainerUpdate {
    pub kind: String,
    pub location: String,
    pub capacity_liters: u32,
}

impl From<&ContainerUpdate> for Value {
    fn from(update: &ContainerUpdate) -> Self {
        json!({
            "tipo": update.kind,
            "ubicacion": update.location,
            "capacidad": update.capacity_liters,
        })
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};

type BoxStr = Box<str>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SensorId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DispenserId(pub i64);

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for DispenserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    pub id: ContainerId,
    #[serde(rename = "tipo")]
    pub kind: BoxStr,
    #[serde(rename = "ubicacion")]
    pub location: BoxStr,
    #[serde(rename = "capacidad")]
    pub capacity_liters: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sensor {
    pub id: SensorId,
    #[serde(rename = "tipo")]
    pub kind: BoxStr,
    #[serde(rename = "id_recipiente")]
    pub container_id: Option<ContainerId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dispenser {
    pub id: DispenserId,
    #[serde(rename = "tipo")]
    pub kind: BoxStr,
    #[serde(rename = "id_recipiente")]
    pub container_id: Option<ContainerId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(rename = "tipo_recipiente")]
    pub container_kind: BoxStr,
    #[serde(rename = "capacidad_recipiente")]
    pub container_capacity_liters: u32,
    #[serde(rename = "response")]
    pub advice: BoxStr,
}

/// One opaque session token. Debug output never reveals the value.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_debug_is_redacted() {
        let cred = Credential::new("super-secret-token");
        let rendered = format!("{cred:?}");
        assert!(!rendered.contains("super-secret-token"));
        assert_eq!(rendered, "Credential(<redacted>)");
    }

    #[test]
    fn container_decodes_wire_names() {
        let body = r#"{"id":1,"tipo":"Alberca","ubicacion":"Patio","capacidad":500}"#;
        let container: Container = serde_json::from_str(body).unwrap();
        assert_eq!(container.id, ContainerId(1));
        assert_eq!(&*container.kind, "Alberca");
        assert_eq!(&*container.location, "Patio");
        assert_eq!(container.capacity_liters, 500);
    }

    #[test]
    fn sensor_container_id_is_optional() {
        let assigned: Sensor =
            serde_json::from_str(r#"{"id":3,"tipo":"Sensor de pH","id_recipiente":7}"#).unwrap();
        assert_eq!(assigned.container_id, Some(ContainerId(7)));

        let unassigned: Sensor =
            serde_json::from_str(r#"{"id":4,"tipo":"Sensor de TDS","id_recipiente":null}"#)
                .unwrap();
        assert_eq!(unassigned.container_id, None);
    }
}

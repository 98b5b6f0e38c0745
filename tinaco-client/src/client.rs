use futures::future::join_all;
use serde_json::json;
use tinaco_core::{
    Container, ContainerId, Credential, Dispenser, DispenserId, Recommendation, Sensor, SensorId,
};

use crate::api::{
    containers::{ContainerUpdate, NewContainer},
    dispensers::{DispenserUpdate, NewDispenser},
    recommendations::PhotoUpload,
    sensors::{NewSensor, SensorUpdate},
    session::SessionResponse,
};
use crate::credentials::CredentialStore;
use crate::gateway::{Gateway, Outcome, RequestSpec};
use crate::view::{ContainerLink, DispenserDetail, SensorDetail};

/// Typed operations over the monitoring API.
///
/// Every call goes through the owned [`Gateway`]; there is no other path to
/// the network. The client never writes to the credential store itself:
/// `login` and `register` hand the credential back and the caller decides
/// whether to persist it.
#[derive(Clone)]
pub struct ApiClient<S> {
    gateway: Gateway<S>,
}

impl<S: CredentialStore> ApiClient<S> {
    pub fn new(base_url: impl Into<String>, credentials: S) -> Self {
        Self {
            gateway: Gateway::new(base_url, credentials),
        }
    }

    /// Build over an already configured gateway, for custom timeouts or a
    /// tuned HTTP client.
    pub fn with_gateway(gateway: Gateway<S>) -> Self {
        Self { gateway }
    }

    pub fn credentials(&self) -> &S {
        self.gateway.credentials()
    }

    // -------------------------------------------------------------------------
    // Session operations
    // -------------------------------------------------------------------------

    /// Exchange email and password for a session credential.
    ///
    /// The credential is returned, never stored. Save it through a
    /// [`CredentialStore`] to stay signed in across calls.
    pub async fn login(&self, email: &str, password: &str) -> Outcome<Credential> {
        let spec = RequestSpec::post("/session")
            .public()
            .json(json!({ "email": email, "password": password }));

        let session: SessionResponse = self.gateway.call(spec).await?;
        Ok(Credential::new(session.token))
    }

    /// Create an account and return its first session credential. Same
    /// persistence rule as [`ApiClient::login`].
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Outcome<Credential> {
        let spec = RequestSpec::post("/session/register").public().json(json!({
            "nombre": name,
            "email": email,
            "contrasena": password,
        }));

        let session: SessionResponse = self.gateway.call(spec).await?;
        Ok(Credential::new(session.token))
    }

    // -------------------------------------------------------------------------
    // Container operations
    // -------------------------------------------------------------------------

    /// All containers for the signed-in account. An account with none gets
    /// an empty list, not an error.
    pub async fn list_containers(&self) -> Outcome<Vec<Container>> {
        self.gateway.call(RequestSpec::get("/containers")).await
    }

    pub async fn get_container(&self, id: ContainerId) -> Outcome<Container> {
        self.gateway
            .call(RequestSpec::get(format!("/containers/{id}")))
            .await
    }

    pub async fn create_container(&self, new: &NewContainer) -> Outcome<Container> {
        self.gateway
            .call(RequestSpec::post("/containers").json(new))
            .await
    }

    pub async fn update_container(
        &self,
        id: ContainerId,
        update: &ContainerUpdate,
    ) -> Outcome<Container> {
        self.gateway
            .call(RequestSpec::put(format!("/containers/{id}")).json(update))
            .await
    }

    pub async fn delete_container(&self, id: ContainerId) -> Outcome<()> {
        self.gateway
            .call_unit(RequestSpec::delete(format!("/containers/{id}")))
            .await
    }

    // -------------------------------------------------------------------------
    // Sensor operations
    // -------------------------------------------------------------------------

    pub async fn list_sensors(&self) -> Outcome<Vec<Sensor>> {
        self.gateway.call(RequestSpec::get("/sensors")).await
    }

    pub async fn get_sensor(&self, id: SensorId) -> Outcome<Sensor> {
        self.gateway
            .call(RequestSpec::get(format!("/sensors/{id}")))
            .await
    }

    pub async fn create_sensor(&self, new: &NewSensor) -> Outcome<Sensor> {
        self.gateway
            .call(RequestSpec::post("/sensors").json(new))
            .await
    }

    pub async fn update_sensor(&self, id: SensorId, update: &SensorUpdate) -> Outcome<Sensor> {
        self.gateway
            .call(RequestSpec::put(format!("/sensors/{id}")).json(update))
            .await
    }

    pub async fn delete_sensor(&self, id: SensorId) -> Outcome<()> {
        self.gateway
            .call_unit(RequestSpec::delete(format!("/sensors/{id}")))
            .await
    }

    /// A sensor together with its parent container, resolved after the
    /// sensor itself. A failed container lookup degrades the link, it does
    /// not fail the sensor.
    pub async fn sensor_detail(&self, id: SensorId) -> Outcome<SensorDetail> {
        let sensor = self.get_sensor(id).await?;
        let container = self.container_link(sensor.container_id).await;
        Ok(SensorDetail { sensor, container })
    }

    /// Every sensor decorated with its container link. Lookups run
    /// concurrently; the result keeps the listing order whatever order the
    /// lookups finish in.
    pub async fn list_sensors_detailed(&self) -> Outcome<Vec<SensorDetail>> {
        let sensors = self.list_sensors().await?;
        let links = join_all(
            sensors
                .iter()
                .map(|sensor| self.container_link(sensor.container_id)),
        )
        .await;

        Ok(sensors
            .into_iter()
            .zip(links)
            .map(|(sensor, container)| SensorDetail { sensor, container })
            .collect())
    }

    // -------------------------------------------------------------------------
    // Dispenser operations
    // -------------------------------------------------------------------------

    pub async fn list_dispensers(&self) -> Outcome<Vec<Dispenser>> {
        self.gateway.call(RequestSpec::get("/dispensers")).await
    }

    pub async fn get_dispenser(&self, id: DispenserId) -> Outcome<Dispenser> {
        self.gateway
            .call(RequestSpec::get(format!("/dispensers/{id}")))
            .await
    }

    pub async fn create_dispenser(&self, new: &NewDispenser) -> Outcome<Dispenser> {
        self.gateway
            .call(RequestSpec::post("/dispensers").json(new))
            .await
    }

    pub async fn update_dispenser(
        &self,
        id: DispenserId,
        update: &DispenserUpdate,
    ) -> Outcome<Dispenser> {
        self.gateway
            .call(RequestSpec::put(format!("/dispensers/{id}")).json(update))
            .await
    }

    pub async fn delete_dispenser(&self, id: DispenserId) -> Outcome<()> {
        self.gateway
            .call_unit(RequestSpec::delete(format!("/dispensers/{id}")))
            .await
    }

    pub async fn dispenser_detail(&self, id: DispenserId) -> Outcome<DispenserDetail> {
        let dispenser = self.get_dispenser(id).await?;
        let container = self.container_link(dispenser.container_id).await;
        Ok(DispenserDetail {
            dispenser,
            container,
        })
    }

    pub async fn list_dispensers_detailed(&self) -> Outcome<Vec<DispenserDetail>> {
        let dispensers = self.list_dispensers().await?;
        let links = join_all(
            dispensers
                .iter()
                .map(|dispenser| self.container_link(dispenser.container_id)),
        )
        .await;

        Ok(dispensers
            .into_iter()
            .zip(links)
            .map(|(dispenser, container)| DispenserDetail {
                dispenser,
                container,
            })
            .collect())
    }

    // -------------------------------------------------------------------------
    // Recommendation operations
    // -------------------------------------------------------------------------

    pub async fn recommendation(&self, container: ContainerId) -> Outcome<Recommendation> {
        let spec = RequestSpec::get("/recommendations").query("id_recipiente", container);
        self.gateway.call(spec).await
    }

    /// Recommendation for a photo of the installation site. The image goes
    /// up as a multipart part named `file`.
    pub async fn photo_recommendation(
        &self,
        container: ContainerId,
        photo: PhotoUpload,
    ) -> Outcome<Recommendation> {
        let spec = RequestSpec::post("/recommendations")
            .query("id_recipiente", container)
            .photo(photo.bytes, photo.filename, photo.content_type);
        self.gateway.call(spec).await
    }

    async fn container_link(&self, container_id: Option<ContainerId>) -> ContainerLink {
        let Some(id) = container_id else {
            return ContainerLink::Unassigned;
        };

        match self.get_container(id).await {
            Ok(container) => ContainerLink::Details(container),
            Err(error) => {
                tracing::warn!(container = %id, error = %error, "parent container lookup failed");
                ContainerLink::Unavailable(id)
            }
        }
    }
}

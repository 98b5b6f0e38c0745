mod common;

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::extract::{Multipart, Path, Query};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{Value, json};
use tinaco_client::api::containers::{ContainerUpdate, NewContainer};
use tinaco_client::api::recommendations::PhotoUpload;
use tinaco_client::api::sensors::{NewSensor, SensorUpdate};
use tinaco_client::{ApiClient, ApiError, ContainerLink, CredentialStore, MemoryCredentialStore};
use tinaco_core::{ContainerId, Credential, DispenserId, SensorId};

fn signed_in() -> MemoryCredentialStore {
    MemoryCredentialStore::with_credential(Credential::new("token-123"))
}

fn dummy_container(id: i64) -> Value {
    json!({"id": id, "tipo": "Tinaco", "ubicacion": "Azotea", "capacidad": 1100})
}

// Session flows

#[tokio::test]
async fn login_hands_back_the_credential_without_storing_it() -> Result<(), ApiError> {
    let body_seen = Arc::new(tokio::sync::Mutex::new(None::<Value>));
    let route_body = body_seen.clone();

    let app = Router::new().route(
        "/session",
        post(move |Json(body): Json<Value>| {
            let seen = route_body.clone();
            async move {
                *seen.lock().await = Some(body);
                Json(json!({"token": "abc"}))
            }
        }),
    );
    let base = common::spawn(app).await;

    let store = MemoryCredentialStore::new();
    let client = ApiClient::new(base, store.clone());

    let credential = client.login("ana@example.com", "secreta").await?;
    assert_eq!(credential.as_str(), "abc");

    // Logging in stored nothing; persisting is the caller's decision.
    assert_eq!(store.load().await.unwrap(), None);
    store.save(&credential).await.unwrap();
    assert_eq!(store.load().await.unwrap(), Some(Credential::new("abc")));

    assert_eq!(
        *body_seen.lock().await,
        Some(json!({"email": "ana@example.com", "password": "secreta"}))
    );

    Ok(())
}

#[tokio::test]
async fn register_posts_the_wire_field_names() -> Result<(), ApiError> {
    let body_seen = Arc::new(tokio::sync::Mutex::new(None::<Value>));
    let route_body = body_seen.clone();

    let app = Router::new().route(
        "/session/register",
        post(move |Json(body): Json<Value>| {
            let seen = route_body.clone();
            async move {
                *seen.lock().await = Some(body);
                Json(json!({"token": "first-token"}))
            }
        }),
    );
    let base = common::spawn(app).await;

    let client = ApiClient::new(base, MemoryCredentialStore::new());
    let credential = client
        .register("Ana", "ana@example.com", "secreta")
        .await?;

    assert_eq!(credential.as_str(), "first-token");
    assert_eq!(
        *body_seen.lock().await,
        Some(json!({"nombre": "Ana", "email": "ana@example.com", "contrasena": "secreta"}))
    );

    Ok(())
}

// Container flows

#[tokio::test]
async fn container_listing_decodes_wire_fields() -> Result<(), ApiError> {
    let app = Router::new().route(
        "/containers",
        get(|| async {
            Json(json!([{"id": 1, "tipo": "Alberca", "ubicacion": "Patio", "capacidad": 500}]))
        }),
    );
    let base = common::spawn(app).await;
    let client = ApiClient::new(base, signed_in());

    let containers = client.list_containers().await?;

    assert_eq!(containers.len(), 1);
    assert_eq!(containers[0].id, ContainerId(1));
    assert_eq!(&*containers[0].kind, "Alberca");
    assert_eq!(&*containers[0].location, "Patio");
    assert_eq!(containers[0].capacity_liters, 500);

    Ok(())
}

#[tokio::test]
async fn signed_out_listing_is_auth_missing_before_any_network() {
    let hits = Arc::new(AtomicUsize::new(0));
    let route_hits = hits.clone();

    let app = Router::new().route(
        "/containers",
        get(move || {
            let hits = route_hits.clone();
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                Json(json!([]))
            }
        }),
    );
    let base = common::spawn(app).await;
    let client = ApiClient::new(base, MemoryCredentialStore::new());

    let outcome = client.list_containers().await;

    assert!(matches!(outcome, Err(ApiError::AuthMissing)));
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn deleting_a_missing_container_reports_not_found() {
    let app = Router::new().route(
        "/containers/{id}",
        axum::routing::delete(|| async {
            (StatusCode::NOT_FOUND, Json(json!({"message": "not found"})))
        }),
    );
    let base = common::spawn(app).await;
    let client = ApiClient::new(base, signed_in());

    match client.delete_container(ContainerId(99)).await {
        Err(ApiError::Client { status, message }) => {
            assert_eq!(status, 404);
            assert_eq!(message, "not found");
        }
        other => panic!("expected client error, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_listing_is_a_success_not_an_error() -> Result<(), ApiError> {
    let app = Router::new().route("/sensors", get(|| async { Json(json!([])) }));
    let base = common::spawn(app).await;
    let client = ApiClient::new(base, signed_in());

    let sensors = client.list_sensors().await?;
    assert!(sensors.is_empty());

    Ok(())
}

#[tokio::test]
async fn create_container_sends_the_wire_body() -> Result<(), ApiError> {
    let body_seen = Arc::new(tokio::sync::Mutex::new(None::<Value>));
    let route_body = body_seen.clone();

    let app = Router::new().route(
        "/containers",
        post(move |Json(body): Json<Value>| {
            let seen = route_body.clone();
            async move {
                *seen.lock().await = Some(body);
                Json(dummy_container(9))
            }
        }),
    );
    let base = common::spawn(app).await;
    let client = ApiClient::new(base, signed_in());

    let new = NewContainer {
        kind: "Contenedor".into(),
        location: "Jardin".into(),
        capacity_liters: 2000,
    };
    let created = client.create_container(&new).await?;

    assert_eq!(created.id, ContainerId(9));
    assert_eq!(
        *body_seen.lock().await,
        Some(json!({"tipo": "Contenedor", "ubicacion": "Jardin", "capacidad": 2000}))
    );

    Ok(())
}

#[tokio::test]
async fn container_update_and_delete_round_trip() -> Result<(), ApiError> {
    let body_seen = Arc::new(tokio::sync::Mutex::new(None::<Value>));
    let route_body = body_seen.clone();

    let app = Router::new().route(
        "/containers/{id}",
        put(move |Path(id): Path<i64>, Json(body): Json<Value>| {
            let seen = route_body.clone();
            async move {
                *seen.lock().await = Some(body);
                Json(dummy_container(id))
            }
        })
        .delete(|| async { StatusCode::NO_CONTENT }),
    );
    let base = common::spawn(app).await;
    let client = ApiClient::new(base, signed_in());

    let update = ContainerUpdate {
        kind: "Tinaco".into(),
        location: "Azotea".into(),
        capacity_liters: 750,
    };
    let updated = client.update_container(ContainerId(4), &update).await?;
    assert_eq!(updated.id, ContainerId(4));
    assert_eq!(
        *body_seen.lock().await,
        Some(json!({"tipo": "Tinaco", "ubicacion": "Azotea", "capacidad": 750}))
    );

    client.delete_container(ContainerId(4)).await?;

    Ok(())
}

// Sensor flows

#[tokio::test]
async fn sensor_create_carries_assignment_and_update_can_detach() -> Result<(), ApiError> {
    let bodies = Arc::new(tokio::sync::Mutex::new(Vec::<Value>::new()));
    let create_bodies = bodies.clone();
    let update_bodies = bodies.clone();

    let app = Router::new()
        .route(
            "/sensors",
            post(move |Json(body): Json<Value>| {
                let bodies = create_bodies.clone();
                async move {
                    bodies.lock().await.push(body);
                    Json(json!({"id": 5, "tipo": "Sensor de pH", "id_recipiente": 7}))
                }
            }),
        )
        .route(
            "/sensors/{id}",
            put(move |Json(body): Json<Value>| {
                let bodies = update_bodies.clone();
                async move {
                    bodies.lock().await.push(body);
                    Json(json!({"id": 5, "tipo": "Sensor de pH", "id_recipiente": null}))
                }
            }),
        );
    let base = common::spawn(app).await;
    let client = ApiClient::new(base, signed_in());

    let created = client
        .create_sensor(&NewSensor {
            kind: "Sensor de pH".into(),
            container_id: Some(ContainerId(7)),
        })
        .await?;
    assert_eq!(created.container_id, Some(ContainerId(7)));

    let updated = client
        .update_sensor(
            SensorId(5),
            &SensorUpdate {
                kind: "Sensor de pH".into(),
                container_id: None,
            },
        )
        .await?;
    assert_eq!(updated.container_id, None);

    let bodies = bodies.lock().await;
    assert_eq!(bodies[0], json!({"tipo": "Sensor de pH", "id_recipiente": 7}));
    assert_eq!(bodies[1], json!({"tipo": "Sensor de pH"}));

    Ok(())
}

// Recommendation flows

#[tokio::test]
async fn recommendation_sends_the_container_as_query() -> Result<(), ApiError> {
    let query_seen = Arc::new(tokio::sync::Mutex::new(None::<String>));
    let route_query = query_seen.clone();

    let app = Router::new().route(
        "/recommendations",
        get(move |Query(params): Query<HashMap<String, String>>| {
            let seen = route_query.clone();
            async move {
                *seen.lock().await = params.get("id_recipiente").cloned();
                Json(json!({
                    "tipo_recipiente": "Alberca",
                    "capacidad_recipiente": 500,
                    "response": "Cubre la alberca por la noche",
                }))
            }
        }),
    );
    let base = common::spawn(app).await;
    let client = ApiClient::new(base, signed_in());

    let recommendation = client.recommendation(ContainerId(5)).await?;

    assert_eq!(&*recommendation.container_kind, "Alberca");
    assert_eq!(recommendation.container_capacity_liters, 500);
    assert_eq!(&*recommendation.advice, "Cubre la alberca por la noche");
    assert_eq!(query_seen.lock().await.as_deref(), Some("5"));

    Ok(())
}

#[tokio::test]
async fn photo_recommendation_uploads_the_image_part() -> Result<(), ApiError> {
    type RecordedPart = (Option<String>, Option<String>, Option<String>, Vec<u8>);
    let recorded = Arc::new(tokio::sync::Mutex::new(None::<RecordedPart>));
    let route_recorded = recorded.clone();

    let app = Router::new().route(
        "/recommendations",
        post(
            move |Query(params): Query<HashMap<String, String>>, mut multipart: Multipart| {
                let recorded = route_recorded.clone();
                async move {
                    assert_eq!(params.get("id_recipiente").map(String::as_str), Some("5"));
                    let field = multipart.next_field().await.unwrap().unwrap();
                    let name = field.name().map(str::to_string);
                    let file_name = field.file_name().map(str::to_string);
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field.bytes().await.unwrap().to_vec();
                    *recorded.lock().await = Some((name, file_name, content_type, bytes));
                    Json(json!({
                        "tipo_recipiente": "Tinaco",
                        "capacidad_recipiente": 1100,
                        "response": "Instala un filtro de sedimentos",
                    }))
                }
            },
        ),
    );
    let base = common::spawn(app).await;
    let client = ApiClient::new(base, signed_in());

    let image = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x01, 0x02, 0x03];
    let recommendation = client
        .photo_recommendation(ContainerId(5), PhotoUpload::jpeg(image.clone()))
        .await?;

    assert_eq!(&*recommendation.advice, "Instala un filtro de sedimentos");

    let recorded = recorded.lock().await;
    let (name, file_name, content_type, bytes) = recorded.as_ref().unwrap();
    assert_eq!(name.as_deref(), Some("file"));
    assert_eq!(file_name.as_deref(), Some("foto.jpg"));
    assert_eq!(content_type.as_deref(), Some("image/jpeg"));
    assert_eq!(bytes, &image);

    Ok(())
}

// Dependent lookups

#[tokio::test]
async fn detailed_sensor_listing_keeps_input_order() -> Result<(), ApiError> {
    let app = Router::new()
        .route(
            "/sensors",
            get(|| async {
                Json(json!([
                    {"id": 1, "tipo": "Sensor de pH", "id_recipiente": 10},
                    {"id": 2, "tipo": "Sensor de TDS", "id_recipiente": 20},
                    {"id": 3, "tipo": "Sensor de pH", "id_recipiente": 30},
                ]))
            }),
        )
        .route(
            "/containers/{id}",
            // Finish out of order and fail the middle one.
            get(|Path(id): Path<i64>| async move {
                match id {
                    10 => {
                        tokio::time::sleep(Duration::from_millis(120)).await;
                        Json(dummy_container(10)).into_response()
                    }
                    20 => {
                        tokio::time::sleep(Duration::from_millis(10)).await;
                        (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            Json(json!({"message": "boom"})),
                        )
                            .into_response()
                    }
                    _ => {
                        tokio::time::sleep(Duration::from_millis(60)).await;
                        Json(dummy_container(30)).into_response()
                    }
                }
            }),
        );
    let base = common::spawn(app).await;
    let client = ApiClient::new(base, signed_in());

    let details = client.list_sensors_detailed().await?;

    let ids: Vec<SensorId> = details.iter().map(|detail| detail.sensor.id).collect();
    assert_eq!(ids, vec![SensorId(1), SensorId(2), SensorId(3)]);

    assert!(
        matches!(&details[0].container, ContainerLink::Details(container) if container.id == ContainerId(10))
    );
    assert_eq!(details[1].container, ContainerLink::Unavailable(ContainerId(20)));
    assert!(
        matches!(&details[2].container, ContainerLink::Details(container) if container.id == ContainerId(30))
    );

    Ok(())
}

#[tokio::test]
async fn unassigned_sensor_skips_the_parent_lookup() -> Result<(), ApiError> {
    let hits = Arc::new(AtomicUsize::new(0));
    let route_hits = hits.clone();

    let app = Router::new()
        .route(
            "/sensors/{id}",
            get(|| async { Json(json!({"id": 4, "tipo": "Sensor de TDS", "id_recipiente": null})) }),
        )
        .route(
            "/containers/{id}",
            get(move || {
                let hits = route_hits.clone();
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    Json(dummy_container(1))
                }
            }),
        );
    let base = common::spawn(app).await;
    let client = ApiClient::new(base, signed_in());

    let detail = client.sensor_detail(SensorId(4)).await?;

    assert_eq!(detail.container, ContainerLink::Unassigned);
    assert_eq!(hits.load(Ordering::SeqCst), 0);

    Ok(())
}

#[tokio::test]
async fn dispenser_detail_degrades_when_the_parent_lookup_fails() -> Result<(), ApiError> {
    let app = Router::new()
        .route(
            "/dispensers/{id}",
            get(|| async {
                Json(json!({"id": 7, "tipo": "Dispensador de pH", "id_recipiente": 3}))
            }),
        )
        .route(
            "/containers/{id}",
            get(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"message": "db down"})),
                )
            }),
        );
    let base = common::spawn(app).await;
    let client = ApiClient::new(base, signed_in());

    let detail = client.dispenser_detail(DispenserId(7)).await?;

    assert_eq!(detail.dispenser.id, DispenserId(7));
    assert_eq!(detail.container, ContainerLink::Unavailable(ContainerId(3)));

    Ok(())
}

#[tokio::test]
async fn detailed_dispenser_listing_mixes_link_states() -> Result<(), ApiError> {
    let app = Router::new()
        .route(
            "/dispensers",
            get(|| async {
                Json(json!([
                    {"id": 1, "tipo": "Dispensador de pH", "id_recipiente": null},
                    {"id": 2, "tipo": "Dispensador de TDS", "id_recipiente": 10},
                ]))
            }),
        )
        .route(
            "/containers/{id}",
            get(|Path(id): Path<i64>| async move { Json(dummy_container(id)) }),
        );
    let base = common::spawn(app).await;
    let client = ApiClient::new(base, signed_in());

    let details = client.list_dispensers_detailed().await?;

    assert_eq!(details.len(), 2);
    assert_eq!(details[0].container, ContainerLink::Unassigned);
    assert!(
        matches!(&details[1].container, ContainerLink::Details(container) if container.id == ContainerId(10))
    );

    Ok(())
}

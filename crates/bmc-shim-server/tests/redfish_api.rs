//! End-to-end tests of the Redfish surface through the full router

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bmc_shim_backend::{NoopBackend, PowerBackend, PowerState};
use bmc_shim_server::test_helpers::{
    create_test_router, create_test_router_with_auth, create_test_router_with_config,
    registry_of, test_config, MockBackend,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

fn single(backend: Arc<MockBackend>) -> Router {
    create_test_router(registry_of(vec![("1", backend as Arc<dyn PowerBackend>)]))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn reset(id: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(format!("/redfish/v1/Systems/{id}/Actions/ComputerSystem.Reset"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn patch(id: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::PATCH)
        .uri(format!("/redfish/v1/Systems/{id}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn power_state(app: &Router, id: &str) -> String {
    let response = app
        .clone()
        .oneshot(get(&format!("/redfish/v1/Systems/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["PowerState"]
        .as_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_service_root() {
    let app = single(Arc::new(MockBackend::new()));

    for uri in ["/redfish/v1", "/redfish/v1/"] {
        let response = app.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["Id"], "RootService");
        assert_eq!(json["Systems"]["@odata.id"], "/redfish/v1/Systems");
    }
}

#[tokio::test]
async fn test_service_root_rejects_other_methods() {
    let app = single(Arc::new(MockBackend::new()));

    let request = Request::builder()
        .method(Method::POST)
        .uri("/redfish/v1/")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_systems_collection_lists_every_system() {
    let app = create_test_router(registry_of(vec![
        ("node-b", Arc::new(NoopBackend::new()) as Arc<dyn PowerBackend>),
        ("node-a", Arc::new(NoopBackend::new())),
    ]));

    let response = app.oneshot(get("/redfish/v1/Systems")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["Members@odata.count"], 2);
    let members: Vec<&str> = json["Members"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["@odata.id"].as_str().unwrap())
        .collect();
    assert_eq!(
        members,
        vec!["/redfish/v1/Systems/node-a", "/redfish/v1/Systems/node-b"]
    );
}

#[tokio::test]
async fn test_get_system_defaults() {
    let app = single(Arc::new(MockBackend::new()));

    for uri in ["/redfish/v1/Systems/1", "/redfish/v1/Systems/1/"] {
        let response = app.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["Id"], "1");
        assert_eq!(json["Name"], "System 1");
        assert_eq!(json["PowerState"], "Off");
        assert_eq!(json["Boot"]["BootSourceOverrideTarget"], "None");
        assert_eq!(json["Boot"]["BootSourceOverrideEnabled"], "Disabled");
        assert_eq!(
            json["Actions"]["#ComputerSystem.Reset"]["target"],
            "/redfish/v1/Systems/1/Actions/ComputerSystem.Reset"
        );
        assert_eq!(
            json["Actions"]["#ComputerSystem.Reset"]["ResetType@Redfish.AllowableValues"],
            serde_json::json!(["On", "ForceOff", "GracefulShutdown", "ForceRestart"])
        );
    }
}

#[tokio::test]
async fn test_get_system_uses_backend_name() {
    let app = single(Arc::new(MockBackend::new().with_name("Rack 4 Node 2")));

    let response = app.oneshot(get("/redfish/v1/Systems/1")).await.unwrap();
    let json = body_json(response).await;

    assert_eq!(json["Name"], "Rack 4 Node 2");
}

#[tokio::test]
async fn test_get_system_name_failure_falls_back() {
    let app = single(Arc::new(MockBackend::new().with_failing_name()));

    let response = app.oneshot(get("/redfish/v1/Systems/1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["Name"], "System 1");
}

#[tokio::test]
async fn test_unknown_system_is_404_everywhere() {
    let backend = Arc::new(MockBackend::new());
    let app = single(backend.clone());

    let response = app.clone().oneshot(get("/redfish/v1/Systems/2")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(reset("2", r#"{"ResetType":"On"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // 404 wins over a malformed body
    let response = app.clone().oneshot(reset("2", "{not json")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(patch("2", r#"{"Boot":{"BootSourceOverrideTarget":"Pxe"}}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    assert_eq!(backend.total_calls(), 0);
}

#[tokio::test]
async fn test_unrouted_path_is_404() {
    let app = single(Arc::new(MockBackend::new()));

    let response = app.oneshot(get("/redfish/v1/Managers/1")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(response).await, "404 page not found");
}

#[tokio::test]
async fn test_wrong_methods_are_405() {
    let app = single(Arc::new(MockBackend::new()));

    let response = app
        .clone()
        .oneshot(get("/redfish/v1/Systems/1/Actions/ComputerSystem.Reset"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

    let request = Request::builder()
        .method(Method::DELETE)
        .uri("/redfish/v1/Systems/1")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_malformed_reset_body_is_400() {
    let backend = Arc::new(MockBackend::new());
    let app = single(backend.clone());

    let response = app.oneshot(reset("1", "{not json")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(backend.total_calls(), 0);
}

#[tokio::test]
async fn test_unsupported_reset_type_makes_no_backend_calls() {
    let backend = Arc::new(MockBackend::new());
    let app = single(backend.clone());

    for body in [r#"{"ResetType":"Nmi"}"#, r#"{"ResetType":"on"}"#, "{}"] {
        let response = app.clone().oneshot(reset("1", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, "unsupported ResetType");
    }

    assert_eq!(backend.total_calls(), 0);
    assert_eq!(power_state(&app, "1").await, "Off");
}

#[tokio::test]
async fn test_reset_on_then_off() {
    let backend = Arc::new(MockBackend::new());
    let app = single(backend.clone());

    let response = app
        .clone()
        .oneshot(reset("1", r#"{"ResetType":"On"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
    assert_eq!(power_state(&app, "1").await, "On");

    for reset_type in ["ForceOff", "GracefulShutdown", "Off"] {
        let body = format!(r#"{{"ResetType":"{reset_type}"}}"#);
        let response = app.clone().oneshot(reset("1", &body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(power_state(&app, "1").await, "Off");
    }

    assert_eq!(backend.power_on_calls(), 1);
    assert_eq!(backend.power_off_calls(), 3);
}

#[tokio::test]
async fn test_force_restart_runs_off_then_on() {
    let backend = Arc::new(MockBackend::new());
    let app = single(backend.clone());

    for reset_type in ["ForceRestart", "GracefulRestart"] {
        let body = format!(r#"{{"ResetType":"{reset_type}"}}"#);
        let response = app.clone().oneshot(reset("1", &body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(power_state(&app, "1").await, "On");
    }

    assert_eq!(backend.call_log(), vec!["off", "on", "off", "on"]);
}

#[tokio::test]
async fn test_backend_failure_is_400_and_keeps_cache() {
    let backend = Arc::new(MockBackend::new().failing_power_on());
    let app = single(backend.clone());

    let response = app
        .clone()
        .oneshot(reset("1", r#"{"ResetType":"On"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, "command failed: mock power on failed");
    assert_eq!(power_state(&app, "1").await, "Off");
}

#[tokio::test]
async fn test_restart_stops_when_power_off_fails() {
    let backend = Arc::new(MockBackend::new().failing_power_off());
    let app = single(backend.clone());

    let response = app
        .clone()
        .oneshot(reset("1", r#"{"ResetType":"On"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(reset("1", r#"{"ResetType":"ForceRestart"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(backend.call_log(), vec!["on", "off"]);
    // Still the state from before the restart, not a half-way Off
    assert_eq!(power_state(&app, "1").await, "On");
}

#[tokio::test(start_paused = true)]
async fn test_long_restart_delay_still_answers_ok() {
    let backend = Arc::new(MockBackend::new());
    let config = test_config(registry_of(vec![("1", backend.clone() as Arc<dyn PowerBackend>)]))
        .with_restart_delay(Duration::from_secs(31));
    let app = create_test_router_with_config(config);

    let response = app
        .clone()
        .oneshot(reset("1", r#"{"ResetType":"ForceRestart"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
    assert_eq!(backend.call_log(), vec!["off", "on"]);
}

#[tokio::test]
async fn test_reset_type_key_is_case_insensitive() {
    let backend = Arc::new(MockBackend::new());
    let app = single(backend.clone());

    let response = app
        .clone()
        .oneshot(reset("1", r#"{"resetType":"On"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(backend.power_on_calls(), 1);
}

#[tokio::test]
async fn test_live_state_wins_over_cache() {
    let backend = Arc::new(MockBackend::new().with_live_state(PowerState::On));
    let app = single(backend.clone());

    let response = app
        .clone()
        .oneshot(reset("1", r#"{"ResetType":"ForceOff"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The switch still reports on, so that is what clients see
    assert_eq!(power_state(&app, "1").await, "On");
}

#[tokio::test]
async fn test_failing_state_query_reports_cache() {
    let backend = Arc::new(MockBackend::new().with_failing_state_query());
    let app = single(backend.clone());

    let response = app
        .clone()
        .oneshot(reset("1", r#"{"ResetType":"On"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.clone().oneshot(get("/redfish/v1/Systems/1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["PowerState"], "On");
}

#[tokio::test]
async fn test_resets_on_different_systems_are_independent() {
    let a = Arc::new(MockBackend::new());
    let b = Arc::new(MockBackend::new());
    let app = create_test_router(registry_of(vec![
        ("a", a.clone() as Arc<dyn PowerBackend>),
        ("b", b.clone() as Arc<dyn PowerBackend>),
    ]));

    let (first, second) = tokio::join!(
        app.clone().oneshot(reset("a", r#"{"ResetType":"On"}"#)),
        app.clone().oneshot(reset("b", r#"{"ResetType":"ForceRestart"}"#)),
    );
    assert_eq!(first.unwrap().status(), StatusCode::OK);
    assert_eq!(second.unwrap().status(), StatusCode::OK);

    assert_eq!(a.call_log(), vec!["on"]);
    assert_eq!(b.call_log(), vec!["off", "on"]);
    assert_eq!(power_state(&app, "a").await, "On");
    assert_eq!(power_state(&app, "b").await, "On");
}

#[tokio::test]
async fn test_boot_override_round_trip() {
    let backend = Arc::new(MockBackend::new());
    let app = single(backend.clone());

    let response = app
        .clone()
        .oneshot(patch(
            "1",
            r#"{"Boot":{"BootSourceOverrideTarget":"Pxe","BootSourceOverrideEnabled":"Once"}}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.clone().oneshot(get("/redfish/v1/Systems/1")).await.unwrap();
    let json = body_json(response).await;
    assert_eq!(json["Boot"]["BootSourceOverrideTarget"], "Pxe");
    assert_eq!(json["Boot"]["BootSourceOverrideEnabled"], "Once");

    // Boot overrides never reach the power backend
    assert_eq!(backend.total_calls(), 0);
}

#[tokio::test]
async fn test_boot_override_rejects_unknown_target() {
    let app = single(Arc::new(MockBackend::new()));

    let response = app
        .clone()
        .oneshot(patch("1", r#"{"Boot":{"BootSourceOverrideTarget":"Floppy"}}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.oneshot(get("/redfish/v1/Systems/1")).await.unwrap();
    assert_eq!(body_json(response).await["Boot"]["BootSourceOverrideTarget"], "None");
}

#[tokio::test]
async fn test_probes() {
    let app = create_test_router(registry_of(vec![(
        "1",
        Arc::new(MockBackend::new().with_health(false)) as Arc<dyn PowerBackend>,
    )]));

    let response = app.clone().oneshot(get("/livez")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");

    let response = app.oneshot(get("/readyz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_text(response).await, "all backends failed");
}

#[tokio::test]
async fn test_readyz_with_one_healthy_backend() {
    let app = create_test_router(registry_of(vec![
        ("a", Arc::new(MockBackend::new().with_health(false)) as Arc<dyn PowerBackend>),
        ("b", Arc::new(MockBackend::new().with_health(true))),
    ]));

    let response = app.oneshot(get("/readyz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

mod auth {
    use super::*;

    fn protected_app(backend: Arc<MockBackend>) -> Router {
        create_test_router_with_auth(
            registry_of(vec![("1", backend as Arc<dyn PowerBackend>)]),
            "admin",
            "secret",
        )
    }

    fn with_basic(mut request: Request<Body>, username: &str, password: &str) -> Request<Body> {
        let encoded = STANDARD.encode(format!("{username}:{password}"));
        request.headers_mut().insert(
            header::AUTHORIZATION,
            format!("Basic {encoded}").parse().unwrap(),
        );
        request
    }

    #[tokio::test]
    async fn test_missing_credentials_get_challenge() {
        let app = protected_app(Arc::new(MockBackend::new()));

        let response = app.oneshot(get("/redfish/v1/Systems")).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers()[header::WWW_AUTHENTICATE],
            "Basic realm=redfish"
        );
    }

    #[tokio::test]
    async fn test_wrong_credentials_never_reach_backend() {
        let backend = Arc::new(MockBackend::new());
        let app = protected_app(backend.clone());

        let request = with_basic(reset("1", r#"{"ResetType":"On"}"#), "admin", "wrong");
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(backend.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_exempt_paths_stay_open() {
        let app = protected_app(Arc::new(MockBackend::new()));

        for uri in ["/redfish/v1", "/redfish/v1/", "/livez", "/readyz"] {
            let response = app.clone().oneshot(get(uri)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_correct_credentials_pass() {
        let backend = Arc::new(MockBackend::new());
        let app = protected_app(backend.clone());

        let request = with_basic(get("/redfish/v1/Systems/1"), "admin", "secret");
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let request = with_basic(reset("1", r#"{"ResetType":"On"}"#), "admin", "secret");
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(backend.power_on_calls(), 1);
    }
}

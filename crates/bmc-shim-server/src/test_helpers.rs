//! Test helpers for bmc-shim-server tests
//!
//! Provides a scriptable backend and ready-made router/state builders.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use bmc_shim_backend::{
    BackendError, BackendKind, HealthCheck, NameProvider, PowerBackend, PowerState,
    PowerStateQuery, Result,
};

use crate::config::{Credentials, ServerConfig};
use crate::registry::SystemRegistry;
use crate::{build_router, AppState};

/// Backend whose capabilities and failures are chosen by the test
#[derive(Debug, Default)]
pub struct MockBackend {
    live_state: Option<Option<PowerState>>,
    name: Option<Option<String>>,
    health: Option<bool>,
    fail_power_on: bool,
    fail_power_off: bool,
    power_on_calls: AtomicUsize,
    power_off_calls: AtomicUsize,
    calls: Mutex<Vec<&'static str>>,
}

impl MockBackend {
    /// Power on/off only, both succeed
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `state` as the live power state
    pub fn with_live_state(mut self, state: PowerState) -> Self {
        self.live_state = Some(Some(state));
        self
    }

    /// Support state queries, but fail every one
    pub fn with_failing_state_query(mut self) -> Self {
        self.live_state = Some(None);
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(Some(name.to_string()));
        self
    }

    pub fn with_failing_name(mut self) -> Self {
        self.name = Some(None);
        self
    }

    /// Support health checks, answering healthy or not
    pub fn with_health(mut self, healthy: bool) -> Self {
        self.health = Some(healthy);
        self
    }

    pub fn failing_power_on(mut self) -> Self {
        self.fail_power_on = true;
        self
    }

    pub fn failing_power_off(mut self) -> Self {
        self.fail_power_off = true;
        self
    }

    pub fn power_on_calls(&self) -> usize {
        self.power_on_calls.load(Ordering::SeqCst)
    }

    pub fn power_off_calls(&self) -> usize {
        self.power_off_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.power_on_calls() + self.power_off_calls()
    }

    /// Power calls in the order they arrived, as "on"/"off"
    pub fn call_log(&self) -> Vec<&'static str> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: &'static str) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

#[async_trait]
impl PowerBackend for MockBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Noop
    }

    async fn power_on(&self) -> Result<()> {
        self.power_on_calls.fetch_add(1, Ordering::SeqCst);
        self.record("on");
        if self.fail_power_on {
            return Err(BackendError::CommandFailed("mock power on failed".to_string()));
        }
        Ok(())
    }

    async fn power_off(&self) -> Result<()> {
        self.power_off_calls.fetch_add(1, Ordering::SeqCst);
        self.record("off");
        if self.fail_power_off {
            return Err(BackendError::CommandFailed("mock power off failed".to_string()));
        }
        Ok(())
    }

    fn as_state_query(&self) -> Option<&dyn PowerStateQuery> {
        self.live_state.map(|_| self as &dyn PowerStateQuery)
    }

    fn as_name_provider(&self) -> Option<&dyn NameProvider> {
        self.name.as_ref().map(|_| self as &dyn NameProvider)
    }

    fn as_health_check(&self) -> Option<&dyn HealthCheck> {
        self.health.map(|_| self as &dyn HealthCheck)
    }
}

#[async_trait]
impl PowerStateQuery for MockBackend {
    async fn current_state(&self) -> Result<PowerState> {
        match self.live_state.flatten() {
            Some(state) => Ok(state),
            None => Err(BackendError::HttpStatus {
                operation: "state".to_string(),
                status: 503,
            }),
        }
    }
}

#[async_trait]
impl NameProvider for MockBackend {
    async fn display_name(&self) -> Result<String> {
        match self.name.clone().flatten() {
            Some(name) => Ok(name),
            None => Err(BackendError::HttpStatus {
                operation: "state".to_string(),
                status: 503,
            }),
        }
    }
}

#[async_trait]
impl HealthCheck for MockBackend {
    async fn ping(&self) -> Result<()> {
        if self.health == Some(true) {
            Ok(())
        } else {
            Err(BackendError::CommandFailed("mock backend unhealthy".to_string()))
        }
    }
}

/// Registry from `(id, backend)` pairs
pub fn registry_of(systems: Vec<(&str, Arc<dyn PowerBackend>)>) -> SystemRegistry {
    let mut registry = SystemRegistry::new();
    for (id, backend) in systems {
        registry
            .insert(id, backend)
            .expect("test registry ids must be unique");
    }
    registry
}

/// Config for tests: no auth, no restart delay
pub fn test_config(systems: SystemRegistry) -> ServerConfig {
    ServerConfig::new("127.0.0.1:0", systems).with_restart_delay(Duration::ZERO)
}

pub fn create_test_app_state(systems: SystemRegistry) -> AppState {
    AppState::new(test_config(systems))
}

/// Router with auth disabled
pub fn create_test_router(systems: SystemRegistry) -> Router {
    build_router(create_test_app_state(systems))
}

/// Router from a fully custom config
pub fn create_test_router_with_config(config: ServerConfig) -> Router {
    build_router(AppState::new(config))
}

/// Router requiring `username`/`password`
pub fn create_test_router_with_auth(
    systems: SystemRegistry,
    username: &str,
    password: &str,
) -> Router {
    let config = test_config(systems).with_credentials(Credentials::new(username, password));
    build_router(AppState::new(config))
}

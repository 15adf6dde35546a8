//! Service configuration

use std::time::Duration;

use crate::registry::SystemRegistry;

/// Default listen address; a bare `:port` binds every interface
pub const DEFAULT_LISTEN: &str = ":8080";

/// Pause between the off and on halves of a restart
pub const DEFAULT_RESTART_DELAY: Duration = Duration::from_secs(2);

/// Upper bound on a single request, backend calls included
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP Basic credential pair; an empty pair disables authentication
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// True when neither a username nor a password is configured
    pub fn is_disabled(&self) -> bool {
        self.username.is_empty() && self.password.is_empty()
    }

    /// Exact comparison against a presented pair
    pub fn matches(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Everything the server needs, fixed before it starts
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen: String,
    pub credentials: Credentials,
    pub systems: SystemRegistry,
    pub restart_delay: Duration,
    pub request_timeout: Duration,
}

impl ServerConfig {
    pub fn new(listen: impl Into<String>, systems: SystemRegistry) -> Self {
        Self {
            listen: listen.into(),
            credentials: Credentials::default(),
            systems,
            restart_delay: DEFAULT_RESTART_DELAY,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn with_restart_delay(mut self, delay: Duration) -> Self {
        self.restart_delay = delay;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Timeout applied to each request; always leaves a restart room to
    /// finish its settle delay plus the usual backend budget
    pub fn effective_request_timeout(&self) -> Duration {
        self.request_timeout
            .max(self.restart_delay.saturating_add(DEFAULT_REQUEST_TIMEOUT))
    }

    /// Address handed to the socket; `:8080` becomes `0.0.0.0:8080`
    pub fn bind_addr(&self) -> String {
        if self.listen.starts_with(':') {
            format!("0.0.0.0{}", self.listen)
        } else {
            self.listen.clone()
        }
    }
}

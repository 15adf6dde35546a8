//! Power state and name reconciliation for rendering a system
//!
//! A live answer from the backend wins. It is not written back to the cache;
//! the cache only covers backends that cannot answer, or that just failed to.

use bmc_shim_backend::{PowerBackend, PowerState};
use tracing::{debug, warn};

use crate::cache::SystemCache;

/// Power state to report for `id`
pub async fn observed_power_state(
    id: &str,
    backend: &dyn PowerBackend,
    cache: &SystemCache,
) -> PowerState {
    if let Some(query) = backend.as_state_query() {
        match query.current_state().await {
            Ok(state) => return state,
            Err(e) => {
                warn!(system = id, error = %e, "live power state query failed, using last known state");
            }
        }
    }
    cache.last_known(id).await
}

/// Name to report for `id`
pub async fn display_name(id: &str, backend: &dyn PowerBackend) -> String {
    if let Some(provider) = backend.as_name_provider() {
        match provider.display_name().await {
            Ok(name) if !name.is_empty() => return name,
            Ok(_) => {}
            Err(e) => debug!(system = id, error = %e, "display name lookup failed"),
        }
    }
    default_display_name(id)
}

pub fn default_display_name(id: &str) -> String {
    format!("System {id}")
}

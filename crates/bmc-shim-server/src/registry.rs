//! System id to backend mapping
//!
//! Built once at startup and never changed while serving.

use std::collections::BTreeMap;
use std::sync::Arc;

use bmc_shim_backend::PowerBackend;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("system id must not be empty")]
    EmptyId,

    #[error("system id must not contain '/': {0}")]
    InvalidId(String),

    #[error("duplicate system id: {0}")]
    DuplicateId(String),
}

/// Registered systems, keyed by their Redfish id
#[derive(Debug, Clone, Default)]
pub struct SystemRegistry {
    systems: BTreeMap<String, Arc<dyn PowerBackend>>,
}

impl SystemRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a system; ids are unique and must fit in one path segment
    pub fn insert(
        &mut self,
        id: impl Into<String>,
        backend: Arc<dyn PowerBackend>,
    ) -> Result<(), RegistryError> {
        let id = id.into();
        if id.is_empty() {
            return Err(RegistryError::EmptyId);
        }
        if id.contains('/') {
            return Err(RegistryError::InvalidId(id));
        }
        if self.systems.contains_key(&id) {
            return Err(RegistryError::DuplicateId(id));
        }
        self.systems.insert(id, backend);
        Ok(())
    }

    pub fn with_system(
        mut self,
        id: impl Into<String>,
        backend: Arc<dyn PowerBackend>,
    ) -> Result<Self, RegistryError> {
        self.insert(id, backend)?;
        Ok(self)
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn PowerBackend>> {
        self.systems.get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.systems.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.systems.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn PowerBackend>)> {
        self.systems.iter().map(|(id, backend)| (id.as_str(), backend))
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }
}

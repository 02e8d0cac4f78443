use std::fmt::Debug;

use log::warn;

use crate::kernel::constants::{APPLICATION_ID_KEY, APPLICATION_VENDOR_ID_KEY, DEFAULT_VENDOR_ID};
use crate::storage::config::ConfigData;

/// The owning application as seen by the storage layer.
///
/// Only two things are needed from it: string resources looked up by key and
/// the application's type name, which stands in for the id when none is set.
pub trait ApplicationContext: Send + Sync + Debug {
    /// Look up a string resource
    fn resource(&self, key: &str) -> Option<String>;

    /// Structural name of the application type
    fn application_name(&self) -> &str;

    /// Application identifier, falling back to [`application_name`](Self::application_name)
    fn application_id(&self) -> String {
        resource_or_default(self, APPLICATION_ID_KEY, self.application_name())
    }

    /// Vendor identifier, falling back to [`DEFAULT_VENDOR_ID`]
    fn vendor_id(&self) -> String {
        resource_or_default(self, APPLICATION_VENDOR_ID_KEY, DEFAULT_VENDOR_ID)
    }
}

fn resource_or_default<C: ApplicationContext + ?Sized>(context: &C, key: &str, default: &str) -> String {
    match context.resource(key) {
        None => {
            warn!("unspecified resource {} using {}", key, default);
            default.to_string()
        }
        Some(id) if id.trim().is_empty() => {
            warn!("empty resource {} using {}", key, default);
            default.to_string()
        }
        Some(id) => id,
    }
}

/// Context backed by an in-memory resource map
#[derive(Debug, Clone)]
pub struct StaticContext {
    application_name: String,
    resources: ConfigData,
}

impl StaticContext {
    /// Create a context with no resources set
    pub fn new(application_name: impl Into<String>) -> Self {
        Self {
            application_name: application_name.into(),
            resources: ConfigData::new(),
        }
    }

    /// Create a context over an existing resource map
    pub fn with_resources(application_name: impl Into<String>, resources: ConfigData) -> Self {
        Self {
            application_name: application_name.into(),
            resources,
        }
    }

    /// Builder-style resource assignment
    pub fn with_resource(mut self, key: &str, value: impl Into<String>) -> Self {
        self.resources.set_string(key, value);
        self
    }

    pub fn resources(&self) -> &ConfigData {
        &self.resources
    }
}

impl ApplicationContext for StaticContext {
    fn resource(&self, key: &str) -> Option<String> {
        self.resources.get::<String>(key)
    }

    fn application_name(&self) -> &str {
        &self.application_name
    }
}

//! The adapter instance descriptor the host sends on the input pipe.

use crate::error::PipeResult;
use crate::pipe::PipePair;
use adapterkit_model::{Identifier, Key, Object};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Describes the adapter instance a method is invoked for: its key, the
/// credential the user configured, how to reach the host's own API, trusted
/// certificates, and the collection cycle.
///
/// Every section except `adapter_key` is optional and defaults when absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdapterInstance {
    pub adapter_key: AdapterKey,
    #[serde(default)]
    pub credential_config: Option<CredentialConfig>,
    #[serde(default)]
    pub cluster_connection_info: Option<ClusterConnectionInfo>,
    #[serde(default)]
    pub certificate_config: Option<CertificateConfig>,
    #[serde(default)]
    pub collection_number: u64,
    #[serde(default)]
    pub collection_window: Option<CollectionWindow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdapterKey {
    pub adapter_kind: String,
    pub object_kind: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub identifiers: Vec<InstanceIdentifier>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceIdentifier {
    pub key: String,
    #[serde(default)]
    pub value: String,
    #[serde(default = "default_true")]
    pub is_part_of_uniqueness: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialConfig {
    /// The credential type, when the adapter supports several.
    #[serde(default, alias = "credentialKey")]
    pub credential_key: Option<String>,
    #[serde(default)]
    pub credential_fields: Vec<CredentialField>,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct CredentialField {
    pub key: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub is_password: bool,
}

impl fmt::Debug for CredentialField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = if self.is_password { "***" } else { &self.value };
        f.debug_struct("CredentialField")
            .field("key", &self.key)
            .field("value", &value)
            .field("is_password", &self.is_password)
            .finish()
    }
}

/// How to reach the host's own REST API from inside the adapter.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ClusterConnectionInfo {
    pub host_name: String,
    pub user_name: String,
    pub password: String,
}

impl fmt::Debug for ClusterConnectionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterConnectionInfo")
            .field("host_name", &self.host_name)
            .field("user_name", &self.user_name)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CertificateConfig {
    #[serde(default)]
    pub certificates: Vec<String>,
}

/// Collection window bounds, in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollectionWindow {
    pub start_time: f64,
    pub end_time: f64,
}

impl AdapterInstance {
    /// Reads the descriptor from the input pipe of `pipes`.
    pub fn from_input(pipes: &PipePair) -> PipeResult<Self> {
        let instance: Self = pipes.read_input()?;
        debug!(
            key = %instance.key(),
            collection = instance.collection_number,
            "read adapter instance"
        );
        Ok(instance)
    }

    /// The adapter instance's own key.
    pub fn key(&self) -> Key {
        let identifiers = self
            .adapter_key
            .identifiers
            .iter()
            .map(|id| Identifier {
                key: id.key.clone(),
                value: id.value.clone(),
                is_part_of_uniqueness: id.is_part_of_uniqueness,
            })
            .collect();
        Key::new(
            &self.adapter_key.adapter_kind,
            &self.adapter_key.object_kind,
            &self.adapter_key.name,
            identifiers,
        )
    }

    /// A fresh, empty object for the adapter instance, ready to carry
    /// self-monitoring data.
    pub fn to_object(&self) -> Object {
        Object::new(self.key())
    }

    /// The credential type, or `None` when the instance has no credential.
    pub fn credential_type(&self) -> Option<&str> {
        self.credential_config
            .as_ref()
            .and_then(|c| c.credential_key.as_deref())
    }

    /// The value of credential field `key`, if present.
    pub fn credential_value(&self, key: &str) -> Option<&str> {
        self.credential_config
            .as_ref()?
            .credential_fields
            .iter()
            .find(|field| field.key == key)
            .map(|field| field.value.as_str())
    }

    pub fn certificates(&self) -> &[String] {
        self.certificate_config
            .as_ref()
            .map(|c| c.certificates.as_slice())
            .unwrap_or_default()
    }
}

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::eso;
use kube::{api::ObjectMeta, CustomResource};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(
    CustomResource, Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema,
)]
#[kube(group = "external-secrets.io", version = "v1alpha1", kind = "ExternalSecret")]
#[kube(namespaced)]
#[kube(derive = "PartialEq")]
#[serde(rename_all = "camelCase")]
pub struct ExternalSecretSpec {
    pub secret_store_ref: SecretStoreRef,
    pub target: ExternalSecretTarget,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data: Vec<ExternalSecretData>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data_from: Vec<RemoteRef>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
pub struct SecretStoreRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExternalSecretTarget {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<serde_json::Value>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExternalSecretData {
    pub secret_key: String,
    pub remote_ref: RemoteRef,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
pub struct RemoteRef {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Scope of a generated store
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreKind {
    SecretStore,
    ClusterSecretStore,
}

impl StoreKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKind::SecretStore => "SecretStore",
            StoreKind::ClusterSecretStore => "ClusterSecretStore",
        }
    }

    pub fn is_namespaced(&self) -> bool {
        matches!(self, StoreKind::SecretStore)
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `SecretStore` or `ClusterSecretStore` manifest.
///
/// Both kinds share one spec, so the kind is carried as data instead of
/// being fixed by the type.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SecretStore {
    pub api_version: String,
    pub kind: StoreKind,
    pub metadata: ObjectMeta,
    pub spec: SecretStoreSpec,
}

impl SecretStore {
    pub fn new(kind: StoreKind) -> Self {
        Self {
            api_version: eso::API_VERSION.to_string(),
            kind,
            metadata: ObjectMeta::default(),
            spec: SecretStoreSpec::default(),
        }
    }

    pub fn name(&self) -> &str {
        self.metadata.name.as_deref().unwrap_or_default()
    }

    /// Structural equality that ignores the generated name.
    ///
    /// Namespaced stores must also share a namespace; cluster stores only
    /// compare their kind, API version and provider configuration.
    pub fn same_backend(&self, other: &SecretStore) -> bool {
        let same_scope = match (self.kind, other.kind) {
            (StoreKind::SecretStore, StoreKind::SecretStore) => {
                self.metadata.namespace == other.metadata.namespace
            }
            (StoreKind::ClusterSecretStore, StoreKind::ClusterSecretStore) => true,
            _ => false,
        };
        same_scope && self.api_version == other.api_version && self.spec == other.spec
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct SecretStoreSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<SecretStoreProvider>,
}

/// Backend configuration of a store. Exactly one field is populated when
/// built through the constructors.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct SecretStoreProvider {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws: Option<AwsProvider>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azurekv: Option<AzureKvProvider>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gcpsm: Option<GcpSmProvider>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ibm: Option<IbmProvider>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vault: Option<VaultProvider>,
}

impl SecretStoreProvider {
    pub fn aws(provider: AwsProvider) -> Self {
        Self {
            aws: Some(provider),
            ..Default::default()
        }
    }

    pub fn azurekv(provider: AzureKvProvider) -> Self {
        Self {
            azurekv: Some(provider),
            ..Default::default()
        }
    }

    pub fn gcpsm(provider: GcpSmProvider) -> Self {
        Self {
            gcpsm: Some(provider),
            ..Default::default()
        }
    }

    pub fn ibm(provider: IbmProvider) -> Self {
        Self {
            ibm: Some(provider),
            ..Default::default()
        }
    }

    pub fn vault(provider: VaultProvider) -> Self {
        Self {
            vault: Some(provider),
            ..Default::default()
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct SecretKeySelector {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub key: String,
}

impl SecretKeySelector {
    pub fn new(name: &str, key: &str, namespace: &str) -> Self {
        Self {
            name: name.to_string(),
            namespace: Some(namespace.to_string()),
            key: key.to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ServiceAccountSelector {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AwsService {
    #[default]
    SecretsManager,
    ParameterStore,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct AwsProvider {
    pub service: AwsService,
    #[serde(default, skip_serializing_if = "AwsAuth::is_empty")]
    pub auth: AwsAuth,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub region: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AwsAuth {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_ref: Option<AwsAuthSecretRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwt: Option<AwsJwtAuth>,
}

impl AwsAuth {
    pub fn is_empty(&self) -> bool {
        self.secret_ref.is_none() && self.jwt.is_none()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct AwsAuthSecretRef {
    #[serde(rename = "accessKeyIDSecretRef")]
    pub access_key_id: SecretKeySelector,
    #[serde(rename = "secretAccessKeySecretRef")]
    pub secret_access_key: SecretKeySelector,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AwsJwtAuth {
    pub service_account_ref: ServiceAccountSelector,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct AzureKvProvider {
    #[serde(rename = "vaultUrl", default, skip_serializing_if = "Option::is_none")]
    pub vault_url: Option<String>,
    #[serde(rename = "tenantId", default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(rename = "authSecretRef", default, skip_serializing_if = "Option::is_none")]
    pub auth_secret_ref: Option<AzureKvAuth>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct AzureKvAuth {
    #[serde(rename = "clientId", default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<SecretKeySelector>,
    #[serde(rename = "clientSecret", default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<SecretKeySelector>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct GcpSmProvider {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<GcpSmAuth>,
    #[serde(rename = "projectID", default)]
    pub project_id: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GcpSmAuth {
    pub secret_ref: GcpSmAuthSecretRef,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct GcpSmAuthSecretRef {
    #[serde(rename = "secretAccessKeySecretRef")]
    pub secret_access_key: SecretKeySelector,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct IbmProvider {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<IbmAuth>,
    #[serde(rename = "serviceUrl", default, skip_serializing_if = "Option::is_none")]
    pub service_url: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IbmAuth {
    pub secret_ref: IbmAuthSecretRef,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct IbmAuthSecretRef {
    #[serde(rename = "secretApiKeySecretRef")]
    pub secret_api_key: SecretKeySelector,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VaultKvVersion {
    #[serde(rename = "v1")]
    V1,
    #[default]
    #[serde(rename = "v2")]
    V2,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct VaultProvider {
    #[serde(default)]
    pub auth: VaultAuth,
    #[serde(default)]
    pub server: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub version: VaultKvVersion,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct VaultAuth {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubernetes: Option<VaultKubernetesAuth>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VaultKubernetesAuth {
    #[serde(default)]
    pub mount_path: String,
    #[serde(default)]
    pub role: String,
}

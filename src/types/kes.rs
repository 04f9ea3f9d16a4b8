// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::legacy;
use kube::api::ObjectMeta;
use serde::{Deserialize, Serialize};

/// A kubernetes-external-secrets `ExternalSecret` as read from disk.
///
/// Documents are matched with [`KesExternalSecret::is_kes_document`] before
/// they are deserialized, so other resources never have to fit this shape.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KesExternalSecret {
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: KesExternalSecretSpec,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KesExternalSecretSpec {
    #[serde(default)]
    pub backend_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vault_mount_point: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vault_role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kv_version: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_vault_name: Option<String>,
    #[serde(default, alias = "projectID", skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_arn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data_from: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data: Vec<KesSecretData>,
    /// Passed through to the generated ExternalSecret untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<serde_json::Value>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KesSecretData {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_stage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recursive: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default)]
    pub is_binary: bool,
}

impl KesExternalSecret {
    /// Check the kind/apiVersion signature of kubernetes-external-secrets
    pub fn is_kes_document(doc: &serde_yaml::Value) -> bool {
        let field = |name: &str| doc.get(name).and_then(serde_yaml::Value::as_str);
        field("kind") == Some(legacy::KIND) && field("apiVersion") == Some(legacy::API_VERSION)
    }

    pub fn name(&self) -> &str {
        self.metadata.name.as_deref().unwrap_or_default()
    }

    /// KV engine version of a vault backed secret; KES defaults to 2
    pub fn kv_version(&self) -> u8 {
        self.spec.kv_version.unwrap_or(2)
    }
}

impl KesSecretData {
    /// Remote key with the optional secret type prefix applied
    pub fn remote_key(&self) -> String {
        match self.secret_type.as_deref() {
            Some(prefix) if !prefix.is_empty() => format!("{}/{}", prefix, self.key),
            _ => self.key.clone(),
        }
    }
}

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Recovery of backend credentials from the running legacy controller.

use crate::config::LegacyDeployment;
use crate::error::{KesToEsoError, Result};
use crate::kubernetes::{get_deployment, get_secret_value};
use crate::types::eso::SecretKeySelector;
use k8s_openapi::api::core::v1::{Container, PodSpec, Secret};
use kube::{api::ObjectMeta, Client};
use std::collections::BTreeMap;
use tracing::debug;

/// How a container environment variable gets its value
#[derive(Debug, Clone, PartialEq)]
pub enum EnvSource {
    Literal(String),
    SecretKeyRef { name: String, key: String },
}

/// Pod spec and controller container of the legacy deployment
pub struct LegacyPod<'a> {
    client: &'a Client,
    namespace: &'a str,
    pod: PodSpec,
    container: Container,
}

impl<'a> LegacyPod<'a> {
    /// Fetch the deployment and locate the configured container
    pub async fn load(client: &'a Client, legacy: &'a LegacyDeployment) -> Result<LegacyPod<'a>> {
        let deployment =
            get_deployment(client, &legacy.namespace, &legacy.deployment_name).await?;

        let Some(pod) = deployment.spec.and_then(|s| s.template.spec) else {
            return Err(KesToEsoError::DiscoveryError(format!(
                "deployment {}/{} has no pod template",
                legacy.namespace, legacy.deployment_name
            )));
        };

        let Some(container) = pod
            .containers
            .iter()
            .find(|c| c.name == legacy.container_name)
            .cloned()
        else {
            return Err(KesToEsoError::DiscoveryError(format!(
                "container {} not found in deployment {}/{}",
                legacy.container_name, legacy.namespace, legacy.deployment_name
            )));
        };

        debug!(
            "Found container {} in deployment {}/{}",
            container.name, legacy.namespace, legacy.deployment_name
        );

        Ok(LegacyPod {
            client,
            namespace: &legacy.namespace,
            pod,
            container,
        })
    }

    pub fn client(&self) -> &Client {
        self.client
    }

    /// Namespace of the legacy deployment
    pub fn namespace(&self) -> &str {
        self.namespace
    }

    pub fn service_account_name(&self) -> &str {
        self.pod
            .service_account_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or("default")
    }

    pub fn env_source(&self, env_name: &str) -> Option<EnvSource> {
        let var = self
            .container
            .env
            .as_ref()?
            .iter()
            .find(|e| e.name == env_name)?;

        if let Some(selector) = var.value_from.as_ref().and_then(|v| v.secret_key_ref.as_ref()) {
            return Some(EnvSource::SecretKeyRef {
                name: selector.name.clone(),
                key: selector.key.clone(),
            });
        }

        var.value
            .as_ref()
            .filter(|v| !v.is_empty())
            .map(|v| EnvSource::Literal(v.clone()))
    }

    /// Value of an environment variable, reading the secret it references if needed
    pub async fn env_value(&self, env_name: &str) -> Result<Option<String>> {
        match self.env_source(env_name) {
            None => Ok(None),
            Some(EnvSource::Literal(value)) => Ok(Some(value)),
            Some(EnvSource::SecretKeyRef { name, key }) => {
                get_secret_value(self.client, self.namespace, &name, &key)
                    .await
                    .map(Some)
                    .map_err(|e| {
                        KesToEsoError::DiscoveryError(format!(
                            "could not find secret value for {}: {}",
                            env_name.to_lowercase(),
                            e
                        ))
                    })
            }
        }
    }

    /// Reference to the credential held by an environment variable.
    ///
    /// Secret references are reused as they are; literal values are staged
    /// under `secret_name`/`key` and referenced from there.
    pub fn credential_ref(
        &self,
        env_name: &str,
        staged: &mut StagedCredentials,
        secret_name: &str,
        key: &str,
    ) -> Option<SecretKeySelector> {
        match self.env_source(env_name)? {
            EnvSource::SecretKeyRef { name, key } => {
                Some(SecretKeySelector::new(&name, &key, self.namespace))
            }
            EnvSource::Literal(value) => {
                debug!("Lifting literal {} into secret {}", env_name, secret_name);
                Some(staged.stage(secret_name, key, value))
            }
        }
    }

    /// Name of the secret behind the volume mounted at `mount_path`
    pub fn secret_mounted_at(&self, mount_path: &str) -> Option<String> {
        let mount_path = mount_path.trim_end_matches('/');
        let mount = self
            .container
            .volume_mounts
            .as_ref()?
            .iter()
            .find(|m| m.mount_path.trim_end_matches('/') == mount_path)?;

        self.pod
            .volumes
            .as_ref()?
            .iter()
            .find(|v| v.name == mount.name)?
            .secret
            .as_ref()?
            .secret_name
            .clone()
    }
}

/// Literal credentials waiting to be written as `Secret` manifests
#[derive(Debug, Default)]
pub struct StagedCredentials {
    namespace: String,
    secrets: BTreeMap<String, BTreeMap<String, String>>,
}

impl StagedCredentials {
    pub fn new(namespace: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            secrets: BTreeMap::new(),
        }
    }

    pub fn stage(&mut self, secret_name: &str, key: &str, value: String) -> SecretKeySelector {
        self.secrets
            .entry(secret_name.to_string())
            .or_default()
            .insert(key.to_string(), value);
        SecretKeySelector::new(secret_name, key, &self.namespace)
    }

    pub fn clear(&mut self) {
        self.secrets.clear();
    }

    pub fn into_secrets(self) -> Vec<Secret> {
        let namespace = self.namespace;
        self.secrets
            .into_iter()
            .map(|(name, data)| Secret {
                metadata: ObjectMeta {
                    name: Some(name),
                    namespace: Some(namespace.clone()),
                    ..Default::default()
                },
                string_data: Some(data),
                type_: Some("Opaque".to_string()),
                ..Default::default()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{deployment_json, env_secret_ref, env_value, secret_json, MockService};
    use serde_json::json;

    const DEPLOYMENT_PATH: &str =
        "/apis/apps/v1/namespaces/kes-ns/deployments/kubernetes-external-secrets";

    fn legacy() -> LegacyDeployment {
        LegacyDeployment {
            namespace: "kes-ns".to_string(),
            deployment_name: "kubernetes-external-secrets".to_string(),
            container_name: "kes".to_string(),
        }
    }

    fn mock_with_container(container: serde_json::Value, extras: serde_json::Value) -> MockService {
        MockService::new().on_get(
            DEPLOYMENT_PATH,
            200,
            &deployment_json("kes-ns", "kubernetes-external-secrets", container, extras),
        )
    }

    #[tokio::test]
    async fn test_load_missing_container() {
        let client = mock_with_container(json!({"name": "other"}), json!({})).into_client();
        let legacy = legacy();

        let result = LegacyPod::load(&client, &legacy).await;

        let Err(KesToEsoError::DiscoveryError(msg)) = result else {
            panic!("expected discovery error");
        };
        assert!(msg.contains("container kes not found"));
    }

    #[tokio::test]
    async fn test_env_source_prefers_secret_reference() {
        let container = json!({
            "name": "kes",
            "env": [
                env_secret_ref("FROM_REF", "creds", "token"),
                env_value("LITERAL", "plain"),
                env_value("EMPTY", ""),
            ]
        });
        let client = mock_with_container(container, json!({})).into_client();
        let legacy = legacy();
        let pod = LegacyPod::load(&client, &legacy).await.unwrap();

        assert_eq!(
            pod.env_source("FROM_REF"),
            Some(EnvSource::SecretKeyRef {
                name: "creds".to_string(),
                key: "token".to_string()
            })
        );
        assert_eq!(
            pod.env_source("LITERAL"),
            Some(EnvSource::Literal("plain".to_string()))
        );
        assert_eq!(pod.env_source("EMPTY"), None);
        assert_eq!(pod.env_source("MISSING"), None);
    }

    #[tokio::test]
    async fn test_env_value_dereferences_secret() {
        let container = json!({
            "name": "kes",
            "env": [env_secret_ref("VAULT_ADDR", "vault", "addr")]
        });
        let client = mock_with_container(container, json!({}))
            .on_get(
                "/api/v1/namespaces/kes-ns/secrets/vault",
                200,
                &secret_json("kes-ns", "vault", &[("addr", "https://vault:8200")]),
            )
            .into_client();
        let legacy = legacy();
        let pod = LegacyPod::load(&client, &legacy).await.unwrap();

        let value = pod.env_value("VAULT_ADDR").await.unwrap();

        assert_eq!(value.as_deref(), Some("https://vault:8200"));
    }

    #[tokio::test]
    async fn test_credential_ref_stages_literals() {
        let container = json!({
            "name": "kes",
            "env": [
                env_value("AWS_ACCESS_KEY_ID", "AKIA"),
                env_secret_ref("AWS_SECRET_ACCESS_KEY", "aws-secret", "secret-access-key"),
            ]
        });
        let client = mock_with_container(container, json!({})).into_client();
        let legacy = legacy();
        let pod = LegacyPod::load(&client, &legacy).await.unwrap();
        let mut staged = StagedCredentials::new("target-ns");

        let literal = pod
            .credential_ref("AWS_ACCESS_KEY_ID", &mut staged, "aws-secrets", "access-key-id")
            .unwrap();
        let reference = pod
            .credential_ref("AWS_SECRET_ACCESS_KEY", &mut staged, "aws-secrets", "secret-access-key")
            .unwrap();

        assert_eq!(literal, SecretKeySelector::new("aws-secrets", "access-key-id", "target-ns"));
        assert_eq!(
            reference,
            SecretKeySelector::new("aws-secret", "secret-access-key", "kes-ns")
        );

        let secrets = staged.into_secrets();
        assert_eq!(secrets.len(), 1);
        assert_eq!(secrets[0].metadata.name.as_deref(), Some("aws-secrets"));
        assert_eq!(secrets[0].metadata.namespace.as_deref(), Some("target-ns"));
        assert_eq!(secrets[0].type_.as_deref(), Some("Opaque"));
        let data = secrets[0].string_data.as_ref().unwrap();
        assert_eq!(data.get("access-key-id").map(String::as_str), Some("AKIA"));
        assert!(!data.contains_key("secret-access-key"));
    }

    #[tokio::test]
    async fn test_secret_mounted_at() {
        let container = json!({
            "name": "kes",
            "volumeMounts": [{ "name": "a-name", "mountPath": "/path/to" }]
        });
        let extras = json!({
            "volumes": [{ "name": "a-name", "secret": { "secretName": "gcp-secret" } }]
        });
        let client = mock_with_container(container, extras).into_client();
        let legacy = legacy();
        let pod = LegacyPod::load(&client, &legacy).await.unwrap();

        assert_eq!(pod.secret_mounted_at("/path/to").as_deref(), Some("gcp-secret"));
        assert_eq!(pod.secret_mounted_at("/path/to/").as_deref(), Some("gcp-secret"));
        assert_eq!(pod.secret_mounted_at("/elsewhere"), None);
    }

    #[test]
    fn test_staged_credentials_empty() {
        let staged = StagedCredentials::new("ns");
        assert!(staged.into_secrets().is_empty());
    }
}

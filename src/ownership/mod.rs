// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Removal of legacy `ExternalSecret` owner references from secrets, so the
//! successor controller can adopt them without the data being deleted.

use crate::config::StripConfig;
use crate::constants::eso::OWNER_KIND;
use crate::error::Result;
use k8s_openapi::api::core::v1::Secret;
use kube::{
    api::{ListParams, PostParams},
    Api, Client, ResourceExt,
};
use tracing::{debug, info, instrument};

/// Which secrets an `apply` run looks at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    NamedInNamespace { namespace: String, names: Vec<String> },
    AllInNamespace { namespace: String },
    NamedInAllNamespaces { names: Vec<String> },
    AllInAllNamespaces,
}

impl Selection {
    pub fn from_flags(
        all_namespaces: bool,
        all_secrets: bool,
        namespace: &str,
        names: Vec<String>,
    ) -> Self {
        match (all_namespaces, all_secrets) {
            (true, true) => Selection::AllInAllNamespaces,
            (false, true) => Selection::AllInNamespace {
                namespace: namespace.to_string(),
            },
            (true, false) => Selection::NamedInAllNamespaces { names },
            (false, false) => Selection::NamedInNamespace {
                namespace: namespace.to_string(),
                names,
            },
        }
    }

    fn namespace(&self) -> Option<&str> {
        match self {
            Selection::NamedInNamespace { namespace, .. }
            | Selection::AllInNamespace { namespace } => Some(namespace),
            _ => None,
        }
    }

    fn includes(&self, name: &str) -> bool {
        match self {
            Selection::NamedInNamespace { names, .. }
            | Selection::NamedInAllNamespaces { names } => names.iter().any(|n| n == name),
            _ => true,
        }
    }
}

/// Copy of `secret` without its first owner reference of `target_owner`, or
/// None when it has no such reference.
pub fn strip_owner(secret: &Secret, target_owner: &str) -> Option<Secret> {
    let owners = secret.metadata.owner_references.as_ref()?;
    let idx = owners
        .iter()
        .position(|o| o.api_version == target_owner && o.kind == OWNER_KIND)?;

    let mut stripped = secret.clone();
    let mut remaining = owners.clone();
    remaining.remove(idx);
    stripped.metadata.owner_references = if remaining.is_empty() {
        None
    } else {
        Some(remaining)
    };
    Some(stripped)
}

/// Drives an `apply` run
pub struct OwnershipStripper<'a> {
    client: &'a Client,
    config: &'a StripConfig,
}

impl<'a> OwnershipStripper<'a> {
    pub fn new(client: &'a Client, config: &'a StripConfig) -> Self {
        Self { client, config }
    }

    /// Strip the target owner from every selected secret and return how many
    /// were updated. The first API error aborts the run.
    #[instrument(skip(self), fields(selection = ?self.config.selection))]
    pub async fn run(&self) -> Result<usize> {
        let secrets: Api<Secret> = match self.config.selection.namespace() {
            Some(namespace) => Api::namespaced(self.client.clone(), namespace),
            None => Api::all(self.client.clone()),
        };
        let secret_list = secrets.list(&ListParams::default()).await?;

        let mut count = 0;
        for secret in secret_list
            .items
            .iter()
            .filter(|s| self.config.selection.includes(&s.name_any()))
        {
            if self.update_secret(secret).await? {
                count += 1;
            }
        }

        info!("Updated {} secrets", count);
        Ok(count)
    }

    async fn update_secret(&self, secret: &Secret) -> Result<bool> {
        let name = secret.name_any();
        let namespace = secret
            .namespace()
            .or_else(|| self.config.selection.namespace().map(str::to_string))
            .unwrap_or_default();
        debug!("Reading secret {}/{}", namespace, name);

        let Some(stripped) = strip_owner(secret, &self.config.target_owner) else {
            return Ok(false);
        };
        debug!(
            "Secret {}/{} matches owner {}",
            namespace, name, self.config.target_owner
        );

        let secrets: Api<Secret> = Api::namespaced(self.client.clone(), &namespace);
        secrets
            .replace(&name, &PostParams::default(), &stripped)
            .await?;

        info!("Secret {}/{} updated successfully", namespace, name);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KesToEsoError;
    use crate::test_utils::{
        internal_error_json, owned_secret_value, secret_list_json, MockService,
    };

    const TARGET: &str = "kubernetes-client.io/v1";

    fn config(selection: Selection) -> StripConfig {
        StripConfig {
            selection,
            target_owner: TARGET.to_string(),
        }
    }

    fn owned(namespace: &str, name: &str, owners: &[(&str, &str)]) -> Secret {
        serde_json::from_value(owned_secret_value(namespace, name, owners)).unwrap()
    }

    #[test]
    fn test_selection_from_flags() {
        assert_eq!(
            Selection::from_flags(true, true, "default", vec![]),
            Selection::AllInAllNamespaces
        );
        assert_eq!(
            Selection::from_flags(false, true, "apps", vec![]),
            Selection::AllInNamespace {
                namespace: "apps".to_string()
            }
        );
        assert_eq!(
            Selection::from_flags(true, false, "apps", vec!["a".to_string()]),
            Selection::NamedInAllNamespaces {
                names: vec!["a".to_string()]
            }
        );
        assert_eq!(
            Selection::from_flags(false, false, "apps", vec!["a".to_string()]),
            Selection::NamedInNamespace {
                namespace: "apps".to_string(),
                names: vec!["a".to_string()]
            }
        );
    }

    #[test]
    fn test_strip_owner_clears_single_reference() {
        let secret = owned("apps", "db", &[(TARGET, "ExternalSecret")]);

        let stripped = strip_owner(&secret, TARGET).unwrap();

        assert!(stripped.metadata.owner_references.is_none());
        assert_eq!(stripped.data, secret.data);
    }

    #[test]
    fn test_strip_owner_removes_only_first_match() {
        let secret = owned(
            "apps",
            "db",
            &[
                ("apps/v1", "Deployment"),
                (TARGET, "ExternalSecret"),
                (TARGET, "ExternalSecret"),
                ("v1", "ConfigMap"),
            ],
        );

        let stripped = strip_owner(&secret, TARGET).unwrap();

        let names: Vec<String> = stripped
            .metadata
            .owner_references
            .unwrap()
            .into_iter()
            .map(|o| o.name)
            .collect();
        assert_eq!(names, vec!["db-owner-0", "db-owner-2", "db-owner-3"]);
    }

    #[test]
    fn test_strip_owner_requires_version_and_kind() {
        let other_version = owned("apps", "db", &[("external-secrets.io/v1alpha1", "ExternalSecret")]);
        let other_kind = owned("apps", "db", &[(TARGET, "SecretStore")]);
        let unowned = owned("apps", "db", &[]);

        assert!(strip_owner(&other_version, TARGET).is_none());
        assert!(strip_owner(&other_kind, TARGET).is_none());
        assert!(strip_owner(&unowned, TARGET).is_none());
    }

    #[tokio::test]
    async fn test_run_named_in_namespace() {
        let mock = MockService::new().on_get(
            "/api/v1/namespaces/apps/secrets",
            200,
            &secret_list_json(vec![
                owned_secret_value("apps", "db", &[(TARGET, "ExternalSecret")]),
                owned_secret_value("apps", "api", &[(TARGET, "ExternalSecret")]),
            ]),
        );
        let client = mock.clone().into_client();
        let config = config(Selection::NamedInNamespace {
            namespace: "apps".to_string(),
            names: vec!["db".to_string()],
        });

        let count = OwnershipStripper::new(&client, &config).run().await.unwrap();

        assert_eq!(count, 1);
        let puts = mock.requests("PUT");
        assert_eq!(puts.len(), 1);
        assert_eq!(puts[0].path, "/api/v1/namespaces/apps/secrets/db");
        assert!(puts[0].json()["metadata"].get("ownerReferences").is_none());
    }

    #[tokio::test]
    async fn test_run_all_namespaces_updates_in_own_namespace() {
        let mock = MockService::new().on_get(
            "/api/v1/secrets",
            200,
            &secret_list_json(vec![
                owned_secret_value("team-a", "db", &[(TARGET, "ExternalSecret")]),
                owned_secret_value("team-b", "db", &[("apps/v1", "Deployment"), (TARGET, "ExternalSecret")]),
                owned_secret_value("team-c", "db", &[("other.io/v1", "ExternalSecret")]),
            ]),
        );
        let client = mock.clone().into_client();
        let config = config(Selection::AllInAllNamespaces);

        let count = OwnershipStripper::new(&client, &config).run().await.unwrap();

        assert_eq!(count, 2);
        let paths: Vec<String> = mock.requests("PUT").into_iter().map(|r| r.path).collect();
        assert_eq!(
            paths,
            vec![
                "/api/v1/namespaces/team-a/secrets/db",
                "/api/v1/namespaces/team-b/secrets/db"
            ]
        );
        let remaining = &mock.requests("PUT")[1].json()["metadata"]["ownerReferences"];
        assert_eq!(remaining.as_array().map(Vec::len), Some(1));
        assert_eq!(remaining[0]["kind"], "Deployment");
    }

    #[tokio::test]
    async fn test_run_is_idempotent() {
        let mock = MockService::new().on_get(
            "/api/v1/namespaces/apps/secrets",
            200,
            &secret_list_json(vec![owned_secret_value(
                "apps",
                "db",
                &[(TARGET, "ExternalSecret")],
            )]),
        );
        let client = mock.clone().into_client();
        let config = config(Selection::AllInNamespace {
            namespace: "apps".to_string(),
        });
        let stripper = OwnershipStripper::new(&client, &config);

        assert_eq!(stripper.run().await.unwrap(), 1);

        let updated = mock.requests("PUT")[0].json();
        mock.respond(
            "GET",
            "/api/v1/namespaces/apps/secrets",
            200,
            &secret_list_json(vec![updated]),
        );

        assert_eq!(stripper.run().await.unwrap(), 0);
        assert_eq!(mock.requests("PUT").len(), 1);
    }

    #[tokio::test]
    async fn test_run_list_error_aborts() {
        let mock = MockService::new().on_get("/api/v1/secrets", 500, &internal_error_json());
        let client = mock.clone().into_client();
        let config = config(Selection::NamedInAllNamespaces {
            names: vec!["db".to_string()],
        });

        let result = OwnershipStripper::new(&client, &config).run().await;

        assert!(matches!(result, Err(KesToEsoError::KubeError(_))));
        assert!(mock.requests("PUT").is_empty());
    }

    #[tokio::test]
    async fn test_run_update_error_aborts() {
        let mock = MockService::new()
            .on_get(
                "/api/v1/namespaces/apps/secrets",
                200,
                &secret_list_json(vec![
                    owned_secret_value("apps", "a", &[(TARGET, "ExternalSecret")]),
                    owned_secret_value("apps", "b", &[(TARGET, "ExternalSecret")]),
                ]),
            )
            .on_put("/api/v1/namespaces/apps/secrets/a", 500, &internal_error_json());
        let client = mock.clone().into_client();
        let config = config(Selection::AllInNamespace {
            namespace: "apps".to_string(),
        });

        let result = OwnershipStripper::new(&client, &config).run().await;

        assert!(result.is_err());
        assert_eq!(mock.requests("PUT").len(), 1);
    }
}

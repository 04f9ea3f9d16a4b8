// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Typed reads of the objects backing the legacy controller

use crate::error::{KesToEsoError, Result};
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{Secret, ServiceAccount};
use kube::{Api, Client};
use tracing::{debug, instrument};

/// Fetch the legacy controller deployment
#[instrument(skip(client))]
pub async fn get_deployment(client: &Client, namespace: &str, name: &str) -> Result<Deployment> {
    let deployments: Api<Deployment> = Api::namespaced(client.clone(), namespace);

    deployments.get(name).await.map_err(|e| {
        KesToEsoError::DiscoveryError(format!(
            "Failed to get deployment {}/{}: {}",
            namespace, name, e
        ))
    })
}

/// Read a single key of a secret as UTF-8
#[instrument(skip(client))]
pub async fn get_secret_value(
    client: &Client,
    namespace: &str,
    name: &str,
    key: &str,
) -> Result<String> {
    let secrets: Api<Secret> = Api::namespaced(client.clone(), namespace);
    let secret = secrets.get(name).await?;

    let Some(value) = secret.data.as_ref().and_then(|d| d.get(key)) else {
        return Err(KesToEsoError::DiscoveryError(format!(
            "Secret {}/{} does not contain '{}' key",
            namespace, name, key
        )));
    };

    debug!("Read key {} of secret {}/{}", key, namespace, name);

    String::from_utf8(value.0.clone()).map_err(|e| {
        KesToEsoError::DiscoveryError(format!(
            "Failed to decode key {} of secret {}/{}: {}",
            key, namespace, name, e
        ))
    })
}

/// Fetch a service account, requiring it to carry the given annotation
#[instrument(skip(client))]
pub async fn get_service_account_if_annotation_exists(
    client: &Client,
    namespace: &str,
    name: &str,
    annotation: &str,
) -> Result<ServiceAccount> {
    let accounts: Api<ServiceAccount> = Api::namespaced(client.clone(), namespace);
    let account = accounts.get(name).await?;

    let annotated = account
        .metadata
        .annotations
        .as_ref()
        .is_some_and(|a| a.contains_key(annotation));

    if annotated {
        Ok(account)
    } else {
        Err(KesToEsoError::DiscoveryError(
            "annotation key absent in service account".to_string(),
        ))
    }
}

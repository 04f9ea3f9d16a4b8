// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Client creation from kubeconfig or the in-cluster environment

use crate::error::{KesToEsoError, Result};
use kube::{config::KubeConfigOptions, Client, Config as KConfig};
use tracing::{debug, info};

/// Create a Kubernetes client, optionally pinned to a kubeconfig context.
///
/// Without an explicit context a missing kubeconfig falls back to the
/// in-cluster service account configuration.
pub async fn create_client(context: Option<&str>) -> Result<Client> {
    let options = KubeConfigOptions {
        context: context.map(str::to_string),
        ..Default::default()
    };

    let config = match KConfig::from_kubeconfig(&options).await {
        Ok(config) => config,
        Err(e) if context.is_none() => {
            debug!("No usable kubeconfig ({}), trying in-cluster configuration", e);
            KConfig::incluster().map_err(|e| {
                KesToEsoError::KubeconfigError(format!("Failed to infer config: {}", e))
            })?
        }
        Err(e) => {
            return Err(KesToEsoError::KubeconfigError(format!(
                "Failed to load context {}: {}",
                context.unwrap_or_default(),
                e
            )))
        }
    };

    info!("Using Kubernetes API at {}", config.cluster_url);

    Client::try_from(config)
        .map_err(|e| KesToEsoError::KubeconfigError(format!("Failed to create client: {}", e)))
}

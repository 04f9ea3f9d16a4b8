// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! GCP Secret Manager backend

use super::discovery::{EnvSource, LegacyPod};
use crate::constants::env;
use crate::error::{KesToEsoError, Result};
use crate::types::eso::{GcpSmAuth, GcpSmAuthSecretRef, GcpSmProvider, SecretKeySelector};
use crate::types::KesExternalSecret;

pub(super) fn provider(kes: &KesExternalSecret) -> GcpSmProvider {
    GcpSmProvider {
        auth: None,
        project_id: kes.spec.project_id.clone().unwrap_or_default(),
    }
}

/// The credentials file path names both the mounted secret (through its
/// directory) and the key inside it (the file name).
pub(super) async fn discover(pod: &LegacyPod<'_>, provider: &mut GcpSmProvider) -> Result<()> {
    let not_found = || {
        KesToEsoError::DiscoveryError("credentials for gcp sm not found in kes deployment".to_string())
    };

    let Some(EnvSource::Literal(path)) = pod.env_source(env::GOOGLE_APPLICATION_CREDENTIALS) else {
        return Err(not_found());
    };
    let Some((mount_path, key)) = path.rsplit_once('/') else {
        return Err(not_found());
    };
    if key.is_empty() {
        return Err(not_found());
    }
    let secret_name = pod.secret_mounted_at(mount_path).ok_or_else(not_found)?;

    provider.auth = Some(GcpSmAuth {
        secret_ref: GcpSmAuthSecretRef {
            secret_access_key: SecretKeySelector::new(&secret_name, key, pod.namespace()),
        },
    });
    Ok(())
}

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! HashiCorp Vault KV backend

use super::discovery::LegacyPod;
use crate::constants::env;
use crate::error::{KesToEsoError, Result};
use crate::types::eso::{VaultAuth, VaultKubernetesAuth, VaultKvVersion, VaultProvider};
use crate::types::kes::KesSecretData;
use crate::types::KesExternalSecret;

pub(super) fn provider(kes: &KesExternalSecret) -> Result<VaultProvider> {
    let mut provider = VaultProvider::default();

    if kes.kv_version() == 1 {
        provider.version = VaultKvVersion::V1;
    } else {
        provider.version = VaultKvVersion::V2;
        provider.path = kv2_path_prefix(&kes.spec.data)?;
    }

    Ok(provider)
}

/// Mount path shared by every requested key.
///
/// KV2 stores are bound to a single engine, so all data keys must agree on
/// their first path segment.
pub fn kv2_path_prefix(data: &[KesSecretData]) -> Result<Option<String>> {
    let mut prefix: Option<&str> = None;

    for item in data {
        let segment = item.key.split('/').next().unwrap_or_default();
        match prefix {
            None => prefix = Some(segment),
            Some(expected) if expected != segment => {
                return Err(KesToEsoError::Kv2PrefixMismatch {
                    expected: expected.to_string(),
                    found: segment.to_string(),
                });
            }
            Some(_) => {}
        }
    }

    Ok(prefix.filter(|p| !p.is_empty()).map(str::to_string))
}

pub(super) async fn discover(pod: &LegacyPod<'_>, provider: &mut VaultProvider) -> Result<()> {
    let server = pod.env_value(env::VAULT_ADDR).await?;
    let mount_path = pod.env_value(env::VAULT_MOUNT_POINT).await?;
    let role = pod.env_value(env::VAULT_ROLE).await?;

    let complete = server.is_some() && mount_path.is_some() && role.is_some();

    provider.server = server.unwrap_or_default();
    provider.auth = VaultAuth {
        kubernetes: Some(VaultKubernetesAuth {
            mount_path: mount_path.unwrap_or_default(),
            role: role.unwrap_or_default(),
        }),
    };

    if !complete {
        return Err(KesToEsoError::DiscoveryError(
            "credentials for vault not found in kes deployment".to_string(),
        ));
    }
    Ok(())
}

/// Mount point and role set on the manifest win over the controller defaults
pub(super) fn apply_overrides(provider: &mut VaultProvider, kes: &KesExternalSecret) {
    let auth = provider
        .auth
        .kubernetes
        .get_or_insert_with(VaultKubernetesAuth::default);

    if let Some(mount_point) = kes.spec.vault_mount_point.as_deref().filter(|m| !m.is_empty()) {
        auth.mount_path = mount_point.to_string();
    }
    if let Some(role) = kes.spec.vault_role.as_deref().filter(|r| !r.is_empty()) {
        auth.role = role.to_string();
    }
}

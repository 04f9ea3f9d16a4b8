// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Field mapping from the legacy manifest to the successor `ExternalSecret`.

use crate::config::TranslateConfig;
use crate::error::{KesToEsoError, Result};
use crate::provider::Backend;
use crate::types::eso::{
    ExternalSecretData, ExternalSecretTarget, RemoteRef, SecretStoreRef,
};
use crate::types::{ExternalSecret, ExternalSecretSpec, KesExternalSecret, SecretStore};

/// Map the backend independent fields of a legacy manifest
pub fn parse_generals(kes: &KesExternalSecret, config: &TranslateConfig) -> ExternalSecret {
    let name = kes.name();

    let data = kes
        .spec
        .data
        .iter()
        .map(|item| ExternalSecretData {
            secret_key: item.name.clone(),
            remote_ref: RemoteRef {
                key: item.remote_key(),
                property: item.property.clone(),
                version: item.version.clone(),
            },
        })
        .collect();

    let data_from = kes
        .spec
        .data_from
        .iter()
        .map(|key| RemoteRef {
            key: key.clone(),
            ..Default::default()
        })
        .collect();

    let mut es = ExternalSecret::new(
        name,
        ExternalSecretSpec {
            secret_store_ref: SecretStoreRef::default(),
            target: ExternalSecretTarget {
                name: Some(name.to_string()),
                template: kes.spec.template.clone(),
            },
            data,
            data_from,
        },
    );
    es.metadata.namespace = config.namespace_for(kes.metadata.namespace.as_deref());
    es
}

/// Apply backend specific rewrites to a mapped `ExternalSecret`.
///
/// Vault keys arrive as `<engine>/data/<path>` for KV v2 and are reduced to
/// `<path>`, the engine living on the store. Empty vault properties default
/// to the local secret key.
pub fn parse_specifics(kes: &KesExternalSecret, es: &mut ExternalSecret) -> Result<()> {
    if Backend::from_backend_type(&kes.spec.backend_type) != Some(Backend::Vault) {
        return Ok(());
    }

    if kes.kv_version() == 2 {
        for item in es.spec.data.iter_mut() {
            item.remote_ref.key = strip_kv2_prefix(&item.remote_ref.key)?;
        }
        for item in es.spec.data_from.iter_mut() {
            item.key = strip_kv2_prefix(&item.key)?;
        }
    }

    for item in es.spec.data.iter_mut() {
        if item.remote_ref.property.as_deref().unwrap_or_default().is_empty() {
            item.remote_ref.property = Some(item.secret_key.clone());
        }
    }

    Ok(())
}

fn strip_kv2_prefix(key: &str) -> Result<String> {
    match key.splitn(3, '/').collect::<Vec<_>>().as_slice() {
        [_, "data", rest] if !rest.is_empty() => Ok(rest.to_string()),
        _ => Err(KesToEsoError::Kv2KeyFormat),
    }
}

/// Point the `ExternalSecret` at its store
pub fn link_secret_store(es: &mut ExternalSecret, store: &SecretStore) {
    es.spec.secret_store_ref = SecretStoreRef {
        name: store.name().to_string(),
        kind: Some(store.kind.to_string()),
    };
}

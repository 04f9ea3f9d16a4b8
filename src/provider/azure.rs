// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Azure Key Vault backend

use super::discovery::{LegacyPod, StagedCredentials};
use crate::constants::{credentials, env};
use crate::error::{KesToEsoError, Result};
use crate::types::eso::{AzureKvAuth, AzureKvProvider};
use crate::types::KesExternalSecret;

pub(super) fn provider(kes: &KesExternalSecret) -> AzureKvProvider {
    AzureKvProvider {
        vault_url: Some(format!(
            "https://{}.vault.azure.net",
            kes.spec.key_vault_name.as_deref().unwrap_or_default()
        )),
        ..Default::default()
    }
}

pub(super) async fn discover(
    pod: &LegacyPod<'_>,
    provider: &mut AzureKvProvider,
    staged: &mut StagedCredentials,
) -> Result<()> {
    provider.tenant_id = pod.env_value(env::AZURE_TENANT_ID).await?;

    let auth = AzureKvAuth {
        client_id: pod.credential_ref(
            env::AZURE_CLIENT_ID,
            staged,
            credentials::AZURE_SECRET,
            credentials::AZURE_CLIENT_ID_KEY,
        ),
        client_secret: pod.credential_ref(
            env::AZURE_CLIENT_SECRET,
            staged,
            credentials::AZURE_SECRET,
            credentials::AZURE_CLIENT_SECRET_KEY,
        ),
    };
    let complete = auth.client_id.is_some() && auth.client_secret.is_some();
    provider.auth_secret_ref = Some(auth);

    if !complete {
        return Err(KesToEsoError::DiscoveryError(
            "credentials for azure not found in kes deployment".to_string(),
        ));
    }
    Ok(())
}

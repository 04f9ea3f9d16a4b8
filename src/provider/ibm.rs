// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! IBM Cloud Secrets Manager backend

use super::discovery::{LegacyPod, StagedCredentials};
use crate::constants::{credentials, env};
use crate::error::{KesToEsoError, Result};
use crate::types::eso::{IbmAuth, IbmAuthSecretRef, IbmProvider};

pub(super) async fn discover(
    pod: &LegacyPod<'_>,
    provider: &mut IbmProvider,
    staged: &mut StagedCredentials,
) -> Result<()> {
    let api_key = pod.credential_ref(
        env::IBM_API_KEY,
        staged,
        credentials::IBM_SECRET,
        credentials::IBM_API_KEY_KEY,
    );

    if let Some(service_url) = pod.env_value(env::IBM_API_ENDPOINT).await? {
        provider.service_url = Some(service_url);
    }

    let Some(secret_api_key) = api_key else {
        return Err(KesToEsoError::DiscoveryError(
            "credentials for ibm cloud not found in kes deployment. edit secretstore definitions before using it"
                .to_string(),
        ));
    };

    provider.auth = Some(IbmAuth {
        secret_ref: IbmAuthSecretRef { secret_api_key },
    });
    Ok(())
}

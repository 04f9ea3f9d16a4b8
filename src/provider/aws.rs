// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Secrets Manager and Parameter Store backends

use super::discovery::{LegacyPod, StagedCredentials};
use crate::constants::{credentials, env, EKS_ROLE_ARN_ANNOTATION};
use crate::error::{KesToEsoError, Result};
use crate::kubernetes::get_service_account_if_annotation_exists;
use crate::types::eso::{AwsAuthSecretRef, AwsJwtAuth, AwsProvider, AwsService, ServiceAccountSelector};
use crate::types::KesExternalSecret;
use tracing::debug;

pub(super) fn provider(service: AwsService, kes: &KesExternalSecret) -> AwsProvider {
    AwsProvider {
        service,
        role: kes.spec.role_arn.clone().filter(|r| !r.is_empty()),
        region: kes.spec.region.clone().unwrap_or_default(),
        ..Default::default()
    }
}

/// Use static access keys when the controller has both, IRSA otherwise
pub(super) async fn discover(
    pod: &LegacyPod<'_>,
    provider: &mut AwsProvider,
    staged: &mut StagedCredentials,
) -> Result<()> {
    let access_key_id = pod.credential_ref(
        env::AWS_ACCESS_KEY_ID,
        staged,
        credentials::AWS_SECRET,
        credentials::AWS_ACCESS_KEY_ID_KEY,
    );
    let secret_access_key = pod.credential_ref(
        env::AWS_SECRET_ACCESS_KEY,
        staged,
        credentials::AWS_SECRET,
        credentials::AWS_SECRET_ACCESS_KEY_KEY,
    );

    if let (Some(access_key_id), Some(secret_access_key)) = (access_key_id, secret_access_key) {
        provider.auth.secret_ref = Some(AwsAuthSecretRef {
            access_key_id,
            secret_access_key,
        });
        return Ok(());
    }

    staged.clear();
    let service_account = pod.service_account_name();
    debug!(
        "No static AWS keys found, checking service account {}/{} for IRSA",
        pod.namespace(),
        service_account
    );

    get_service_account_if_annotation_exists(
        pod.client(),
        pod.namespace(),
        service_account,
        EKS_ROLE_ARN_ANNOTATION,
    )
    .await
    .map_err(|_| {
        KesToEsoError::DiscoveryError(
            "could not find aws credential information (secrets or sa with role-arn annotation) on kes deployment"
                .to_string(),
        )
    })?;

    provider.auth.jwt = Some(AwsJwtAuth {
        service_account_ref: ServiceAccountSelector {
            name: service_account.to_string(),
            namespace: Some(pod.namespace().to_string()),
        },
    });
    Ok(())
}

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Backend resolution: builds the store provider for a legacy manifest and
//! recovers the credentials the legacy controller was running with.

mod aws;
mod azure;
pub mod discovery;
mod gcp;
mod ibm;
pub mod vault;

use crate::config::LegacyDeployment;
use crate::error::{KesToEsoError, Result};
use crate::types::eso::{AwsService, IbmProvider, SecretStoreProvider, VaultKubernetesAuth};
use crate::types::KesExternalSecret;
use discovery::{LegacyPod, StagedCredentials};
use k8s_openapi::api::core::v1::Secret;
use kube::Client;
use tracing::{instrument, warn};

/// Backend types understood by kubernetes-external-secrets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    SecretsManager,
    SystemManager,
    AzureKeyVault,
    GcpSecretsManager,
    IbmCloudSecretsManager,
    Vault,
}

impl Backend {
    pub fn from_backend_type(backend_type: &str) -> Option<Self> {
        match backend_type {
            "secretsManager" => Some(Backend::SecretsManager),
            "systemManager" => Some(Backend::SystemManager),
            "azureKeyVault" => Some(Backend::AzureKeyVault),
            "gcpSecretsManager" => Some(Backend::GcpSecretsManager),
            "ibmcloudSecretsManager" => Some(Backend::IbmCloudSecretsManager),
            "vault" => Some(Backend::Vault),
            _ => None,
        }
    }

    /// Provider built from the manifest alone, before any credential discovery
    fn base_provider(&self, kes: &KesExternalSecret) -> Result<SecretStoreProvider> {
        Ok(match self {
            Backend::SecretsManager => {
                SecretStoreProvider::aws(aws::provider(AwsService::SecretsManager, kes))
            }
            Backend::SystemManager => {
                SecretStoreProvider::aws(aws::provider(AwsService::ParameterStore, kes))
            }
            Backend::AzureKeyVault => SecretStoreProvider::azurekv(azure::provider(kes)),
            Backend::GcpSecretsManager => SecretStoreProvider::gcpsm(gcp::provider(kes)),
            Backend::IbmCloudSecretsManager => SecretStoreProvider::ibm(IbmProvider::default()),
            Backend::Vault => SecretStoreProvider::vault(vault::provider(kes)?),
        })
    }

    fn failure_hint(&self) -> &'static str {
        match self {
            Backend::SecretsManager | Backend::SystemManager => {
                "Make sure you have set up controller pod identity or manually edit the SecretStore before applying it"
            }
            Backend::GcpSecretsManager => {
                "Make sure you have set up workload identity or manually edit the SecretStore before applying it"
            }
            _ => "Manually edit the SecretStore before applying it",
        }
    }
}

/// Outcome of resolving one legacy manifest's backend
#[derive(Debug, Default)]
pub struct Resolved {
    /// None for unsupported backend types
    pub provider: Option<SecretStoreProvider>,
    /// Literal credentials lifted into their own secrets
    pub credentials: Vec<Secret>,
    /// Why the provider is missing credentials, if it is
    pub discovery_error: Option<KesToEsoError>,
}

/// Resolves store providers against the legacy controller deployment
pub struct BackendResolver<'a> {
    client: &'a Client,
    legacy: &'a LegacyDeployment,
}

impl<'a> BackendResolver<'a> {
    pub fn new(client: &'a Client, legacy: &'a LegacyDeployment) -> Self {
        Self { client, legacy }
    }

    /// Build the provider for `kes` and fill in its credentials.
    ///
    /// Only malformed input is an error. Discovery failures are reported in
    /// [`Resolved::discovery_error`] together with whatever the discovery
    /// filled in before failing, and the staged secrets those fields point
    /// at. A vault provider loses its partial kubernetes auth. `namespace` is
    /// where lifted credentials are written.
    #[instrument(skip(self, kes), fields(kes = %kes.name(), backend = %kes.spec.backend_type))]
    pub async fn resolve(&self, kes: &KesExternalSecret, namespace: &str) -> Result<Resolved> {
        let Some(backend) = Backend::from_backend_type(&kes.spec.backend_type) else {
            warn!(
                "Provider {} is not currently supported!",
                kes.spec.backend_type
            );
            return Ok(Resolved::default());
        };

        let mut provider = backend.base_provider(kes)?;
        let mut staged = StagedCredentials::new(namespace);

        let discovery_error = match self.discover(&mut provider, &mut staged).await {
            Ok(()) => None,
            Err(e) => {
                warn!(
                    "Failed to install {} backend specific configuration: {}. {}",
                    kes.spec.backend_type,
                    e,
                    backend.failure_hint()
                );
                if let Some(vault) = provider.vault.as_mut() {
                    vault.auth.kubernetes = Some(VaultKubernetesAuth::default());
                }
                Some(e)
            }
        };

        let mut resolved = Resolved {
            provider: Some(provider),
            credentials: staged.into_secrets(),
            discovery_error,
        };

        if let Some(vault) = resolved.provider.as_mut().and_then(|p| p.vault.as_mut()) {
            vault::apply_overrides(vault, kes);
        }

        Ok(resolved)
    }

    async fn discover(
        &self,
        provider: &mut SecretStoreProvider,
        staged: &mut StagedCredentials,
    ) -> Result<()> {
        let pod = LegacyPod::load(self.client, self.legacy).await?;

        if let Some(p) = provider.aws.as_mut() {
            aws::discover(&pod, p, staged).await
        } else if let Some(p) = provider.azurekv.as_mut() {
            azure::discover(&pod, p, staged).await
        } else if let Some(p) = provider.gcpsm.as_mut() {
            gcp::discover(&pod, p).await
        } else if let Some(p) = provider.ibm.as_mut() {
            ibm::discover(&pod, p, staged).await
        } else if let Some(p) = provider.vault.as_mut() {
            vault::discover(&pod, p).await
        } else {
            Ok(())
        }
    }
}

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Translation of kubernetes-external-secrets manifests into
//! external-secrets.io manifests.

pub mod mapping;
pub mod registry;
pub mod writer;

use crate::config::TranslateConfig;
use crate::error::{KesToEsoError, Result};
use crate::provider::BackendResolver;
use crate::types::{ExternalSecret, KesExternalSecret, SecretStore};
use k8s_openapi::api::core::v1::Secret;
use kube::{Client, ResourceExt};
use registry::{NameGenerator, RandomSuffix, StoreRegistry};
use serde::Deserialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;
use writer::ManifestWriter;

/// Result of translating one legacy manifest
#[derive(Debug)]
pub struct Translation {
    pub source: PathBuf,
    pub kes: KesExternalSecret,
    pub external_secret: ExternalSecret,
    pub store: SecretStore,
    /// False when an equivalent store was generated for an earlier manifest
    pub new_store: bool,
    pub credentials: Vec<Secret>,
    /// Set when the store could not be completed from the legacy deployment
    pub discovery_error: Option<String>,
}

/// Drives a `generate` run over every file below the input path
pub struct Translator<'a, G = RandomSuffix> {
    client: &'a Client,
    config: &'a TranslateConfig,
    registry: StoreRegistry<G>,
    /// Credential secrets already handed to the writer
    written_credentials: Vec<Secret>,
}

impl<'a> Translator<'a> {
    pub fn new(client: &'a Client, config: &'a TranslateConfig) -> Self {
        Self::with_registry(client, config, StoreRegistry::new())
    }
}

impl<'a, G: NameGenerator> Translator<'a, G> {
    pub fn with_registry(
        client: &'a Client,
        config: &'a TranslateConfig,
        registry: StoreRegistry<G>,
    ) -> Self {
        Self {
            client,
            config,
            registry,
            written_credentials: Vec::new(),
        }
    }

    /// Translate every legacy manifest found under the input path.
    ///
    /// Unreadable or unparsable files abort the run, as does a legacy
    /// `ExternalSecret` that does not fit the legacy schema. Other documents
    /// are skipped without being interpreted.
    pub async fn run<W: Write>(
        &mut self,
        writer: &mut ManifestWriter<W>,
    ) -> Result<Vec<Translation>> {
        let mut translations = Vec::new();

        for path in input_files(&self.config.input_path)? {
            debug!("Reading {}", path.display());
            let content = std::fs::read_to_string(&path).map_err(|source| {
                KesToEsoError::ReadError {
                    path: path.clone(),
                    source,
                }
            })?;

            for document in serde_yaml::Deserializer::from_str(&content) {
                let parse_error = |source: serde_yaml::Error| KesToEsoError::ParseError {
                    path: path.clone(),
                    source,
                };
                let doc =
                    Option::<serde_yaml::Value>::deserialize(document).map_err(parse_error)?;

                match doc {
                    Some(doc) if KesExternalSecret::is_kes_document(&doc) => {
                        let kes = serde_yaml::from_value::<KesExternalSecret>(doc)
                            .map_err(parse_error)?;
                        translations.push(self.translate(&path, kes, writer).await?);
                    }
                    _ => warn!("Not a KES ExternalSecret in {}, skipping", path.display()),
                }
            }
        }

        Ok(translations)
    }

    #[instrument(skip(self, kes, writer), fields(kes = %kes.name()))]
    async fn translate<W: Write>(
        &mut self,
        path: &Path,
        kes: KesExternalSecret,
        writer: &mut ManifestWriter<W>,
    ) -> Result<Translation> {
        let mut es = mapping::parse_generals(&kes, self.config);
        mapping::parse_specifics(&kes, &mut es)?;

        let namespace = self.config.namespace_for(kes.metadata.namespace.as_deref());
        let credential_namespace = namespace
            .clone()
            .unwrap_or_else(|| self.config.legacy.namespace.clone());

        let resolver = BackendResolver::new(self.client, &self.config.legacy);
        let resolved = resolver.resolve(&kes, &credential_namespace).await?;
        let discovery_error = resolved.discovery_error.map(|e| {
            warn!(
                "Store for {} is incomplete and needs manual editing: {}",
                path.display(),
                e
            );
            e.to_string()
        });

        let mut store = SecretStore::new(self.config.store_kind);
        if self.config.store_kind.is_namespaced() {
            store.metadata.namespace = namespace;
        }
        store.spec.provider = resolved.provider;

        let (store, new_store) = self.registry.register(store, &kes.spec.backend_type);
        mapping::link_secret_store(&mut es, &store);

        self.write_credentials(&resolved.credentials, writer)?;
        if new_store {
            writer.write_store(&store)?;
        }
        writer.write_external_secret(&es)?;

        info!(
            "Translated {} using {} {}",
            kes.name(),
            store.kind,
            store.name()
        );

        Ok(Translation {
            source: path.to_path_buf(),
            kes,
            external_secret: es,
            store,
            new_store,
            credentials: resolved.credentials,
            discovery_error,
        })
    }

    /// Write each distinct credential secret once. Secrets sharing a name
    /// across namespaces get their own file in directory output.
    fn write_credentials<W: Write>(
        &mut self,
        secrets: &[Secret],
        writer: &mut ManifestWriter<W>,
    ) -> Result<()> {
        for secret in secrets {
            let name = secret.name_any();
            let namespace = secret.namespace().unwrap_or_default();
            if self.written_credentials.contains(secret) {
                debug!("Secret {}/{} already written", namespace, name);
                continue;
            }

            let clashes = self.written_credentials.iter().any(|written| {
                written.name_any() == name && written.namespace() != secret.namespace()
            });
            if clashes && writer.is_directory() {
                let file_name = format!("{}-{}", name, namespace);
                warn!(
                    "Secret {} is generated for more than one namespace, writing {}/{} as {}",
                    name, namespace, name, file_name
                );
                writer.write_secret_as(secret, &file_name)?;
            } else {
                writer.write_secret(secret)?;
            }
            self.written_credentials.push(secret.clone());
        }
        Ok(())
    }
}

/// Regular files below `root`, sorted by name, or `root` itself when it is a file
fn input_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| KesToEsoError::ReadError {
            path: e.path().unwrap_or(root).to_path_buf(),
            source: e.into(),
        })?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

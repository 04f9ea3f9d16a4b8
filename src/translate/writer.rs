// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Output of generated manifests.

use crate::error::{KesToEsoError, Result};
use crate::types::{ExternalSecret, SecretStore};
use k8s_openapi::api::core::v1::Secret;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Writes manifests either as one YAML stream or as one file per manifest
pub enum ManifestWriter<W: Write> {
    /// Every manifest is followed by a `---` document marker
    Stream(W),
    Directory(PathBuf),
}

impl<W: Write> ManifestWriter<W> {
    pub fn is_directory(&self) -> bool {
        matches!(self, ManifestWriter::Directory(_))
    }

    pub fn write_secret(&mut self, secret: &Secret) -> Result<()> {
        let name = secret.metadata.name.as_deref().unwrap_or_default();
        self.write("secret", name, secret)
    }

    /// Write `secret` under a file name of its own instead of its secret name
    pub fn write_secret_as(&mut self, secret: &Secret, file_name: &str) -> Result<()> {
        self.write("secret", file_name, secret)
    }

    pub fn write_store(&mut self, store: &SecretStore) -> Result<()> {
        self.write("secret-store", store.name(), store)
    }

    pub fn write_external_secret(&mut self, es: &ExternalSecret) -> Result<()> {
        let name = es.metadata.name.as_deref().unwrap_or_default();
        self.write("external-secret", name, es)
    }

    fn write<T: Serialize>(&mut self, prefix: &str, name: &str, manifest: &T) -> Result<()> {
        let yaml = serde_yaml::to_string(manifest)?;

        match self {
            ManifestWriter::Stream(out) => writeln!(out, "{}---", yaml)
                .and_then(|_| out.flush())
                .map_err(|source| KesToEsoError::WriteError {
                    path: PathBuf::from("-"),
                    source,
                }),
            ManifestWriter::Directory(dir) => {
                let path = manifest_path(dir, prefix, name);
                debug!("Writing {}", path.display());
                std::fs::write(&path, yaml)
                    .map_err(|source| KesToEsoError::WriteError { path, source })
            }
        }
    }
}

fn manifest_path(dir: &Path, prefix: &str, name: &str) -> PathBuf {
    dir.join(format!("{}-{}.yaml", prefix, name))
}

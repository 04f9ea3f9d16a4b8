// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::defaults;
use crate::error::{KesToEsoError, Result};
use crate::ownership::Selection;
use crate::types::StoreKind;
use std::path::PathBuf;

/// Where generated manifests go
#[derive(Debug, Clone, PartialEq)]
pub enum OutputTarget {
    Stdout,
    Directory(PathBuf),
}

/// Location of the running kubernetes-external-secrets controller
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyDeployment {
    pub namespace: String,
    pub deployment_name: String,
    pub container_name: String,
}

impl Default for LegacyDeployment {
    fn default() -> Self {
        Self {
            namespace: defaults::NAMESPACE.to_string(),
            deployment_name: defaults::DEPLOYMENT_NAME.to_string(),
            container_name: defaults::CONTAINER_NAME.to_string(),
        }
    }
}

/// Configuration of a `generate` run
#[derive(Debug, Clone)]
pub struct TranslateConfig {
    pub input_path: PathBuf,
    pub output: OutputTarget,
    pub legacy: LegacyDeployment,
    /// Overrides the namespace of every generated resource
    pub target_namespace: Option<String>,
    pub store_kind: StoreKind,
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::new(),
            output: OutputTarget::Stdout,
            legacy: LegacyDeployment::default(),
            target_namespace: None,
            store_kind: StoreKind::ClusterSecretStore,
        }
    }
}

impl TranslateConfig {
    /// Check that the input exists and that a file output target is a directory
    pub fn validate(&self) -> Result<()> {
        if !self.input_path.exists() {
            return Err(KesToEsoError::ConfigError(format!(
                "input path {} does not exist",
                self.input_path.display()
            )));
        }

        if let OutputTarget::Directory(dir) = &self.output {
            if !dir.is_dir() {
                return Err(KesToEsoError::ConfigError(format!(
                    "output path {} is not a directory (use --to-stdout to print manifests)",
                    dir.display()
                )));
            }
        }

        Ok(())
    }

    /// Namespace for stores and lifted credentials generated from a manifest
    pub fn namespace_for(&self, manifest_namespace: Option<&str>) -> Option<String> {
        self.target_namespace
            .as_deref()
            .filter(|ns| !ns.is_empty())
            .or(manifest_namespace)
            .map(str::to_string)
    }
}

/// Configuration of an `apply` run
#[derive(Debug, Clone)]
pub struct StripConfig {
    pub selection: Selection,
    /// API version an owner reference must carry to be removed
    pub target_owner: String,
}

impl Default for StripConfig {
    fn default() -> Self {
        Self {
            selection: Selection::NamedInNamespace {
                namespace: defaults::NAMESPACE.to_string(),
                names: Vec::new(),
            },
            target_owner: defaults::TARGET_OWNER.to_string(),
        }
    }
}

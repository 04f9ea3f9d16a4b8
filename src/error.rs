// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KesToEsoError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Failed to load kubeconfig: {0}")]
    KubeconfigError(String),

    #[error("Failed to read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("Failed to serialize manifest: {0}")]
    SerializeError(#[from] serde_yaml::Error),

    #[error("secret key not compatible with kv2 format (<vault>/data/<path>/<to>/<secret>)")]
    Kv2KeyFormat,

    #[error("Secret keys do not share a kv engine prefix: '{expected}' and '{found}'")]
    Kv2PrefixMismatch { expected: String, found: String },

    #[error("{0}")]
    DiscoveryError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Operation did not finish within {0} seconds")]
    Timeout(u64),
}

pub type Result<T> = std::result::Result<T, KesToEsoError>;

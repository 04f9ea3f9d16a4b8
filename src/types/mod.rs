// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Manifest types: the legacy kubernetes-external-secrets resource and the
//! external-secrets.io resources it is translated into.

pub mod eso;
pub mod kes;

pub use eso::{ExternalSecret, ExternalSecretSpec, SecretStore, SecretStoreProvider, StoreKind};
pub use kes::KesExternalSecret;

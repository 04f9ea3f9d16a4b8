// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes utilities for client creation and the lookups used to recover
//! the legacy controller's credentials.

pub mod client;
pub mod resources;

pub use client::create_client;
pub use resources::{get_deployment, get_secret_value, get_service_account_if_annotation_exists};

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Signature of the kubernetes-external-secrets resources this tool reads
pub mod legacy {
    pub const KIND: &str = "ExternalSecret";
    pub const API_VERSION: &str = "kubernetes-client.io/v1";
}

/// external-secrets.io resources this tool writes
pub mod eso {
    pub const API_VERSION: &str = "external-secrets.io/v1alpha1";
    /// Owner kind the ownership stripper looks for
    pub const OWNER_KIND: &str = "ExternalSecret";
    /// Infix of generated store names: `<backend>-secretstore-autogen-<suffix>`
    pub const STORE_NAME_INFIX: &str = "secretstore-autogen";
    pub const STORE_NAME_SUFFIX_LEN: usize = 8;
}

/// Defaults of the legacy installation and CLI flags
pub mod defaults {
    pub const NAMESPACE: &str = "default";
    pub const DEPLOYMENT_NAME: &str = "kubernetes-external-secrets";
    pub const CONTAINER_NAME: &str = "kubernetes-external-secrets";
    pub const TARGET_OWNER: &str = "kubernetes-client.io/v1";
    pub const TIMEOUT_SECS: u64 = 30;
}

/// Environment variables read from the legacy controller container
pub mod env {
    pub const AWS_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
    pub const AWS_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
    pub const AZURE_TENANT_ID: &str = "AZURE_TENANT_ID";
    pub const AZURE_CLIENT_ID: &str = "AZURE_CLIENT_ID";
    pub const AZURE_CLIENT_SECRET: &str = "AZURE_CLIENT_SECRET";
    pub const GOOGLE_APPLICATION_CREDENTIALS: &str = "GOOGLE_APPLICATION_CREDENTIALS";
    pub const IBM_API_KEY: &str = "IBM_CLOUD_SECRETS_MANAGER_API_APIKEY";
    pub const IBM_API_ENDPOINT: &str = "IBM_CLOUD_SECRETS_MANAGER_API_ENDPOINT";
    pub const VAULT_ADDR: &str = "VAULT_ADDR";
    pub const VAULT_MOUNT_POINT: &str = "DEFAULT_VAULT_MOUNT_POINT";
    pub const VAULT_ROLE: &str = "DEFAULT_VAULT_ROLE";
}

/// Conventional secrets that literal credentials are lifted into
pub mod credentials {
    pub const AWS_SECRET: &str = "aws-secrets";
    pub const AWS_ACCESS_KEY_ID_KEY: &str = "access-key-id";
    pub const AWS_SECRET_ACCESS_KEY_KEY: &str = "secret-access-key";
    pub const AZURE_SECRET: &str = "azure-secrets";
    pub const AZURE_CLIENT_ID_KEY: &str = "client-id";
    pub const AZURE_CLIENT_SECRET_KEY: &str = "client-secret";
    pub const IBM_SECRET: &str = "ibm-secrets";
    pub const IBM_API_KEY_KEY: &str = "api-key";
}

/// Service account annotation that enables IRSA for the AWS backends
pub const EKS_ROLE_ARN_ANNOTATION: &str = "eks.amazonaws.com/role-arn";

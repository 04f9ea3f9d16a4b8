// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use kestoeso::config::{LegacyDeployment, OutputTarget, StripConfig, TranslateConfig};
use kestoeso::constants::defaults;
use kestoeso::error::KesToEsoError;
use kestoeso::kubernetes::create_client;
use kestoeso::ownership::{OwnershipStripper, Selection};
use kestoeso::translate::{writer::ManifestWriter, Translator};
use kestoeso::types::StoreKind;

/// Convert kubernetes-external-secrets manifests into external-secrets.io manifests
#[derive(Parser, Debug)]
#[command(name = "kes-to-eso", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Kubeconfig context to use
    #[arg(long, global = true, env = "KES_TO_ESO_CONTEXT")]
    context: Option<String>,

    /// Seconds before the whole run is aborted
    #[arg(long, global = true, env = "KES_TO_ESO_TIMEOUT", default_value_t = defaults::TIMEOUT_SECS)]
    timeout: u64,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate ExternalSecrets and SecretStores from KES manifests
    Generate(GenerateArgs),
    /// Remove KES owner references from secrets so ESO can take them over
    Apply(ApplyArgs),
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// File or directory with KES manifests
    #[arg(short, long, env = "KES_TO_ESO_INPUT")]
    input: PathBuf,

    /// Directory to write generated manifests to
    #[arg(short, long, env = "KES_TO_ESO_OUTPUT", required_unless_present = "to_stdout")]
    output: Option<PathBuf>,

    /// Print generated manifests instead of writing files
    #[arg(long, env = "KES_TO_ESO_TO_STDOUT")]
    to_stdout: bool,

    #[arg(long, env = "KES_TO_ESO_KES_DEPLOYMENT_NAME", default_value = defaults::DEPLOYMENT_NAME)]
    kes_deployment_name: String,

    #[arg(long, env = "KES_TO_ESO_KES_CONTAINER_NAME", default_value = defaults::CONTAINER_NAME)]
    kes_container_name: String,

    /// Namespace KES is installed in
    #[arg(short = 'n', long, env = "KES_TO_ESO_KES_NAMESPACE", default_value = defaults::NAMESPACE)]
    kes_namespace: String,

    /// Namespace for every generated resource, overriding the KES manifests
    #[arg(long, env = "KES_TO_ESO_TARGET_NAMESPACE")]
    target_namespace: Option<String>,

    /// Generate namespaced SecretStores instead of ClusterSecretStores
    #[arg(long, env = "KES_TO_ESO_SECRET_STORE")]
    secret_store: bool,
}

impl GenerateArgs {
    fn into_config(self) -> TranslateConfig {
        TranslateConfig {
            input_path: self.input,
            output: match self.output {
                Some(dir) if !self.to_stdout => OutputTarget::Directory(dir),
                _ => OutputTarget::Stdout,
            },
            legacy: LegacyDeployment {
                namespace: self.kes_namespace,
                deployment_name: self.kes_deployment_name,
                container_name: self.kes_container_name,
            },
            target_namespace: self.target_namespace,
            store_kind: if self.secret_store {
                StoreKind::SecretStore
            } else {
                StoreKind::ClusterSecretStore
            },
        }
    }
}

#[derive(Args, Debug)]
struct ApplyArgs {
    /// Look at secrets in every namespace
    #[arg(short = 'A', long, env = "KES_TO_ESO_ALL_NAMESPACES")]
    all_namespaces: bool,

    /// Look at every secret instead of the named ones
    #[arg(long, env = "KES_TO_ESO_ALL_SECRETS")]
    all_secrets: bool,

    #[arg(short, long, env = "KES_TO_ESO_NAMESPACE", default_value = defaults::NAMESPACE)]
    namespace: String,

    /// Comma separated secret names
    #[arg(short, long, env = "KES_TO_ESO_SECRETS", value_delimiter = ',')]
    secrets: Vec<String>,

    /// API version of the owner reference to remove
    #[arg(long, env = "KES_TO_ESO_TARGET_OWNER", default_value = defaults::TARGET_OWNER)]
    target_owner: String,
}

impl ApplyArgs {
    fn into_config(self) -> StripConfig {
        StripConfig {
            selection: Selection::from_flags(
                self.all_namespaces,
                self.all_secrets,
                &self.namespace,
                self.secrets,
            ),
            target_owner: self.target_owner,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays a clean YAML stream
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let timeout = cli.timeout;

    match cli.command {
        Command::Generate(args) => {
            let config = args.into_config();
            config.validate()?;
            if config.store_kind.is_namespaced() {
                warn!(
                    "SecretStores reference credentials in the KES namespace ({}); copy them next to each store before applying",
                    config.legacy.namespace
                );
            }
            with_timeout(timeout, generate(cli.context.as_deref(), &config)).await?;
        }
        Command::Apply(args) => {
            let config = args.into_config();
            with_timeout(timeout, apply(cli.context.as_deref(), &config)).await?;
        }
    }

    Ok(())
}

async fn generate(context: Option<&str>, config: &TranslateConfig) -> kestoeso::error::Result<()> {
    let client = create_client(context).await?;
    let mut translator = Translator::new(&client, config);

    let translations = match &config.output {
        OutputTarget::Stdout => {
            translator
                .run(&mut ManifestWriter::Stream(std::io::stdout()))
                .await?
        }
        OutputTarget::Directory(dir) => {
            translator
                .run(&mut ManifestWriter::<std::io::Stdout>::Directory(dir.clone()))
                .await?
        }
    };

    let stores = translations.iter().filter(|t| t.new_store).count();
    let incomplete = translations
        .iter()
        .filter(|t| t.new_store && t.discovery_error.is_some())
        .count();
    info!(
        "Generated {} ExternalSecrets and {} stores ({} need manual editing)",
        translations.len(),
        stores,
        incomplete
    );
    Ok(())
}

async fn apply(context: Option<&str>, config: &StripConfig) -> kestoeso::error::Result<()> {
    let client = create_client(context).await?;
    OwnershipStripper::new(&client, config).run().await?;
    Ok(())
}

async fn with_timeout<F>(secs: u64, fut: F) -> kestoeso::error::Result<()>
where
    F: Future<Output = kestoeso::error::Result<()>>,
{
    tokio::time::timeout(Duration::from_secs(secs), fut)
        .await
        .map_err(|_| KesToEsoError::Timeout(secs))?
}

//! `pkgsign verify` — download an artifact and verify its signature.

use std::sync::Arc;

use anyhow::{Context, Result};
use pkgsign_client::{download_artifact, HttpFetch};
use pkgsign_core::types::Capability;
use pkgsign_verify::{ArtifactVerifier, EngineConfig, RootKeySet, TrustEngine, VerifyOutcome};

use crate::config::CliConfig;

/// Download `url` and verify it against the production root keys.
///
/// # Errors
///
/// Returns an error if the download fails or the signature is rejected.
pub async fn run_verify(url: &str, kind: &str, cli_config: &CliConfig) -> Result<()> {
    let kind = Capability::new(kind).context("download type")?;

    let engine_config = EngineConfig {
        api_base: cli_config.api_base.clone(),
        downloads_base: cli_config.downloads_base.clone(),
        ..EngineConfig::default()
    };
    let fetch = Arc::new(HttpFetch::new()?);
    let engine = Arc::new(TrustEngine::new(
        fetch.clone(),
        engine_config,
        RootKeySet::default(),
    ));

    let workdir = tempfile::tempdir()?;
    let artifact = download_artifact(fetch.as_ref(), url, kind, workdir.path()).await?;

    let verifier = ArtifactVerifier::new(engine);
    match verifier.verify(&artifact).await? {
        VerifyOutcome::Verified => println!("verified: {url}"),
        VerifyOutcome::Bypassed => {
            println!("skipped: {url} is not served from a verified host");
        }
    }
    Ok(())
}

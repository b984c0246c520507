//! Artifact download orchestration.
//!
//! Fetches an artifact URL, persists the bytes, and captures the response
//! metadata the verifier needs: `x-content-signature` values and any
//! `Link: <…>; rel="manifest"` target.

use std::path::Path;

use log::{debug, info};
use pkgsign_core::types::Capability;
use pkgsign_verify::{DownloadedArtifact, Fetch};
use url::Url;

use crate::error::ClientError;

/// Download `artifact_url` into `dest_dir` and describe it for
/// verification.
///
/// The file name is the final path segment of the URL. Response headers
/// are captured but not interpreted here; trust decisions belong to the
/// verifier.
///
/// # Errors
///
/// Returns [`ClientError`] if the URL is unusable, the request fails or
/// returns a non-success status, or the bytes cannot be written.
pub async fn download_artifact(
    fetcher: &dyn Fetch,
    artifact_url: &str,
    kind: Capability,
    dest_dir: &Path,
) -> Result<DownloadedArtifact, ClientError> {
    let file = file_name_of(artifact_url)
        .ok_or_else(|| ClientError::InvalidUrl(artifact_url.to_owned()))?;

    let response = fetcher.fetch(artifact_url).await?;
    if !response.is_success() {
        return Err(ClientError::Status {
            url: artifact_url.to_owned(),
            status: response.status,
        });
    }

    let content_signatures: Vec<String> = response
        .headers
        .iter()
        .filter(|(name, _)| name.eq_ignore_ascii_case("x-content-signature"))
        .map(|(_, value)| value.clone())
        .collect();
    let manifest_url = response.header("link").and_then(parse_manifest_link);

    let path = dest_dir.join(&file);
    std::fs::write(&path, &response.body)?;
    debug!("wrote {} byte(s) to {}", response.body.len(), path.display());
    info!("downloaded {artifact_url}");

    Ok(DownloadedArtifact {
        url: artifact_url.to_owned(),
        path,
        kind,
        content_signatures,
        manifest_url,
    })
}

/// Extract the `rel="manifest"` target from a `Link` header value.
fn parse_manifest_link(value: &str) -> Option<String> {
    for part in value.split(',') {
        let part = part.trim();
        let target = part
            .split(';')
            .next()
            .map(str::trim)
            .and_then(|t| t.strip_prefix('<'))
            .and_then(|t| t.strip_suffix('>'));
        let Some(target) = target else {
            continue;
        };
        let is_manifest = part.split(';').skip(1).any(|param| {
            let param = param.trim().to_ascii_lowercase();
            param == "rel=\"manifest\"" || param == "rel=manifest"
        });
        if is_manifest {
            return Some(target.to_owned());
        }
    }
    None
}

/// Final path segment of the artifact URL, if non-empty.
fn file_name_of(artifact_url: &str) -> Option<String> {
    let parsed = Url::parse(artifact_url).ok()?;
    let file = parsed.path().rsplit('/').next()?;
    if file.is_empty() {
        return None;
    }
    Some(file.to_owned())
}

use anyhow::{Result, bail};
use std::path::Path;

use crate::config::SheetsSection;

#[cfg_attr(not(feature = "service-account"), allow(dead_code))]
const SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/spreadsheets",
    "https://www.googleapis.com/auth/drive",
];

/// Bearer token for the Sheets API.
///
/// `REBOOK_ACCESS_TOKEN` wins when set; otherwise the service-account key
/// from the config is exchanged for a token.
pub async fn access_token(sheets: &SheetsSection) -> Result<String> {
    if let Ok(token) = std::env::var("REBOOK_ACCESS_TOKEN") {
        if !token.trim().is_empty() {
            tracing::debug!("using access token from REBOOK_ACCESS_TOKEN");
            return Ok(token.trim().to_string());
        }
    }

    match &sheets.service_account_file {
        Some(path) => service_account_token(path).await,
        None => bail!("no Sheets credentials: set REBOOK_ACCESS_TOKEN or [sheets] service_account_file"),
    }
}

#[cfg(feature = "service-account")]
async fn service_account_token(path: &Path) -> Result<String> {
    use anyhow::Context;

    tracing::info!(key = %path.display(), "logging in service account");

    let key = yup_oauth2::read_service_account_key(path)
        .await
        .with_context(|| format!("read service account key {}", path.display()))?;
    let auth = yup_oauth2::ServiceAccountAuthenticator::builder(key)
        .build()
        .await
        .context("building service account authenticator")?;
    let token = auth
        .token(&SCOPES)
        .await
        .context("requesting Sheets access token")?;

    token
        .token()
        .map(str::to_string)
        .context("service account returned an empty access token")
}

#[cfg(not(feature = "service-account"))]
async fn service_account_token(path: &Path) -> Result<String> {
    if !path.exists() {
        bail!("service account key not found: {}", path.display());
    }
    bail!(
        "rebook was built without service-account support.\n\
Rebuild with: cargo install --path rebook-cli --features service-account\n\
Or export a token: REBOOK_ACCESS_TOKEN=$(gcloud auth print-access-token)"
    )
}

//! HTTP helpers for the feed and base-map downloads.
//!
//! Every request goes through a client built by [`build_client`] so that
//! all downloads share the configured timeout and user agent. There is no
//! retry: a failed request surfaces immediately as
//! [`DatasetError::Http`].

use std::time::Duration;

use crate::DatasetError;

/// Builds the shared [`reqwest::Client`].
///
/// # Errors
///
/// Returns [`DatasetError::Http`] if the TLS backend fails to initialize.
pub fn build_client(timeout: Duration, user_agent: &str) -> Result<reqwest::Client, DatasetError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .build()
        .map_err(DatasetError::Http)
}

/// GETs `url` and returns the body as text.
///
/// # Errors
///
/// Returns [`DatasetError::Http`] on connection failure, timeout, non-2xx
/// status, or an undecodable body.
pub async fn fetch_text(client: &reqwest::Client, url: &str) -> Result<String, DatasetError> {
    log::info!("Downloading {url}");
    let response = client.get(url).send().await?.error_for_status()?;
    let text = response.text().await?;
    log::debug!("Downloaded {} bytes from {url}", text.len());
    Ok(text)
}

/// GETs `url` and returns the raw body.
///
/// # Errors
///
/// Returns [`DatasetError::Http`] on connection failure, timeout, or
/// non-2xx status.
pub async fn fetch_bytes(client: &reqwest::Client, url: &str) -> Result<Vec<u8>, DatasetError> {
    log::info!("Downloading {url}");
    let response = client.get(url).send().await?.error_for_status()?;
    let bytes = response.bytes().await?;
    log::debug!("Downloaded {} bytes from {url}", bytes.len());
    Ok(bytes.to_vec())
}

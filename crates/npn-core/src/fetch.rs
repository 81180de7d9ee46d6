//! Transfer fetcher: one GET, buffered or streamed.
//!
//! The buffering mode accumulates the full body and completes when the
//! stream ends. The streaming mode hands the raw response (status plus byte
//! stream) back to the caller, which decides how to drain it - completion is
//! the caller's business. No retries and no timeout enforcement here.

use bytes::Bytes;
use reqwest::{Client, Response};
use thiserror::Error;

/// Errors from the transfer layer.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Network-level transport failure.
    #[error("transfer failed: {0}")]
    Transfer(#[from] reqwest::Error),
}

/// Issue a GET and buffer the entire response body.
///
/// # Errors
///
/// Returns [`FetchError::Transfer`] on transport failure. Non-success HTTP
/// statuses are not an error at this layer; callers inspect them where the
/// status matters.
pub async fn fetch_bytes(client: &Client, url: &str) -> Result<Bytes, FetchError> {
    let response = fetch_stream(client, url).await?;
    Ok(response.bytes().await?)
}

/// Issue a GET and hand the raw response back for the caller to drain.
///
/// # Errors
///
/// Returns [`FetchError::Transfer`] on transport failure.
pub async fn fetch_stream(client: &Client, url: &str) -> Result<Response, FetchError> {
    let response = client
        .get(url)
        .header(reqwest::header::USER_AGENT, crate::USER_AGENT)
        .send()
        .await?;
    Ok(response)
}

//! Clients for the GMX infra REST API.
//!
//! Two read-only snapshots are fetched from it:
//! - the token directory (`/tokens`): address → symbol/decimals/metadata
//! - the signed price feed (`/signed_prices/latest`): used only to test
//!   whether an index token is currently quoted

pub mod prices;
pub mod tokens;

pub use prices::QuotedTokens;
pub use tokens::{TokenDirectory, TokenInfo};

use crate::error::TransportError;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

/// GET a JSON document, surfacing non-2xx statuses as errors.
pub(crate) async fn get_json<T: DeserializeOwned>(
    http: &Client,
    url: &str,
) -> Result<T, TransportError> {
    let resp = http.get(url).send().await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(TransportError::Status {
            url: url.to_string(),
            status,
        });
    }
    debug!(url = %url, "fetched");
    Ok(resp.json::<T>().await?)
}

//! One-shot product fetch.
//!
//! Product information lives outside the push protocol: a plain HTTP GET
//! against the same host and port, issued once per successful connection
//! and never retried automatically.

use patchwire_core::product::Product;

use crate::errors::ClientError;

/// Fetch the server's product information from `/api/v1/product`.
pub async fn fetch_product(host: &str, port: u16) -> Result<Product, ClientError> {
    let url = format!("http://{host}:{port}/api/v1/product");
    let response = reqwest::get(&url).await?.error_for_status()?;
    Ok(response.json().await?)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

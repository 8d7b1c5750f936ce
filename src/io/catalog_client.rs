use std::time::Duration;

use serde::Deserialize;

/// How long a catalog request may run before it is abandoned.
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Error type for catalog endpoint fetches
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("catalog endpoint returned {status}: {message}")]
    Server { status: u16, message: String },
}

/// The two CSV documents the catalog endpoint serves in one response
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogPayload {
    pub steps: String,
    pub substeps: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Fetch both catalog documents from the configured endpoint.
///
/// On a non-2xx response the endpoint's `{"error": ...}` body becomes the
/// error message; without one, the HTTP reason phrase stands in.
pub fn fetch_catalog(endpoint: &str) -> Result<CatalogPayload, CatalogError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()?;
    let response = client.get(endpoint).send()?;

    let status = response.status();
    if !status.is_success() {
        let message = response.json::<ErrorBody>().map(|b| b.error).unwrap_or_else(|_| {
            status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string()
        });
        return Err(CatalogError::Server {
            status: status.as_u16(),
            message,
        });
    }

    Ok(response.json()?)
}

use std::error::Error as StdError;
use std::fmt;

use serde::Deserialize;

use crate::utils::url::construct_api_url;

/// Models offered before the gateway has answered a catalog fetch, and
/// whenever every fetch so far has failed.
pub const FALLBACK_MODELS: [&str; 2] = ["gemma3:270m", "llama3.2:1b"];

/// The shapes the models route is known to answer with. Decoding picks the
/// first variant that fits; anything else is an unrecognized shape and the
/// current catalog stays as it is.
#[derive(Deserialize)]
#[serde(untagged)]
enum ModelsPayload {
    Listed { models: Vec<String> },
    Bare(Vec<String>),
    Single { models: String },
}

fn normalize(payload: ModelsPayload) -> Vec<String> {
    match payload {
        ModelsPayload::Listed { models } => models,
        ModelsPayload::Bare(models) => models,
        ModelsPayload::Single { models } => vec![models],
    }
}

/// Errors from fetching or decoding the model catalog. All of them are
/// recovered locally: the previous catalog is kept unchanged.
#[derive(Debug)]
pub enum CatalogError {
    /// The request never produced a response.
    Request(reqwest::Error),

    /// The gateway answered with a non-success status.
    Http {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The response body did not match any recognized shape.
    UnrecognizedShape(serde_json::Error),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Request(source) => {
                write!(f, "Model list request failed: {}", source)
            }
            CatalogError::Http { status, body } => {
                write!(f, "Model list request failed with status {}: {}", status, body)
            }
            CatalogError::UnrecognizedShape(source) => {
                write!(f, "Model list had an unrecognized shape: {}", source)
            }
        }
    }
}

impl StdError for CatalogError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            CatalogError::Request(source) => Some(source),
            CatalogError::Http { .. } => None,
            CatalogError::UnrecognizedShape(source) => Some(source),
        }
    }
}

/// Fetch the candidate model ids from the gateway and coerce the response
/// into a flat list. Ordering follows the response; no dedup, no sorting.
pub async fn fetch_model_ids(
    client: &reqwest::Client,
    base_url: &str,
) -> Result<Vec<String>, CatalogError> {
    let models_url = construct_api_url(base_url, "api/models");
    let response = client
        .post(models_url)
        .send()
        .await
        .map_err(CatalogError::Request)?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(CatalogError::Http { status, body });
    }

    let body = response.text().await.map_err(CatalogError::Request)?;
    let payload: ModelsPayload =
        serde_json::from_str(&body).map_err(CatalogError::UnrecognizedShape)?;
    Ok(normalize(payload))
}

/// The ordered list of model ids offered for selection.
///
/// Starts out as the fallback defaults and is replaced wholesale the first
/// time a fetch yields a non-empty recognized list. It never regresses to
/// empty: failed or unrecognized fetches leave it alone.
#[derive(Debug, Clone)]
pub struct ModelCatalog {
    models: Vec<String>,
    from_fallback: bool,
}

impl ModelCatalog {
    pub fn fallback() -> Self {
        Self {
            models: FALLBACK_MODELS.iter().map(|id| id.to_string()).collect(),
            from_fallback: true,
        }
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    pub fn is_fallback(&self) -> bool {
        self.from_fallback
    }

    pub fn contains(&self, id: &str) -> bool {
        self.models.iter().any(|m| m == id)
    }

    /// Replace the catalog with `ids` if the list is non-empty. Returns
    /// whether a replacement happened.
    pub fn apply(&mut self, ids: Vec<String>) -> bool {
        if ids.is_empty() {
            return false;
        }
        self.models = ids;
        self.from_fallback = false;
        true
    }

    /// Fetch and apply in one step. On any error the catalog is untouched
    /// and the error is handed back for the caller to report or ignore.
    pub async fn refresh(
        &mut self,
        client: &reqwest::Client,
        base_url: &str,
    ) -> Result<bool, CatalogError> {
        let ids = fetch_model_ids(client, base_url).await?;
        Ok(self.apply(ids))
    }
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self::fallback()
    }
}

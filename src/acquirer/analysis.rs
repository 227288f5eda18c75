// Client for the opaque backend analysis endpoint.
use crate::model::{AcquireError, AnalysisDepth, AnalysisDocument};
use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct AnalyzeRequest<'a> {
    symbol: &'a str,
    depth: AnalysisDepth,
}

#[derive(Debug, Deserialize)]
struct AnalyzeResponse {
    success: bool,
    #[serde(default)]
    analysis: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

pub struct AnalysisClient {
    client: Client,
    base_url: String,
}

impl AnalysisClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self { client, base_url: base_url.into() }
    }

    /// Runs one analysis request. The returned text is opaque here; the
    /// extractor turns it into structure at the presentation boundary.
    pub async fn run(
        &self,
        symbol: &str,
        depth: AnalysisDepth,
    ) -> Result<AnalysisDocument, AcquireError> {
        let url = format!("{}/analyze", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .json(&AnalyzeRequest { symbol, depth })
            .send()
            .await
            .map_err(|e| AcquireError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AcquireError::BadStatus(response.status().as_u16()));
        }

        let payload: AnalyzeResponse = response
            .json()
            .await
            .map_err(|e| AcquireError::Decode(e.to_string()))?;

        if !payload.success {
            let reason = payload.error.unwrap_or_else(|| "unspecified".to_string());
            return Err(AcquireError::Backend(reason));
        }

        match payload.analysis {
            Some(text) => Ok(AnalysisDocument::new(text)),
            None => Err(AcquireError::Decode("success response without analysis".to_string())),
        }
    }
}

//! HTTP client for the logo lookup service.
//!
//! `POST {endpoint}` with `{"company_id", "company_name"}`; the service
//! answers `{"logo_url": string | null}`. A 404 also means "no logo".

use std::future::Future;

use fit_config::LogoConfig;
use fit_core::jobs::LogoJob;
use serde::{Deserialize, Serialize};

use crate::error::LogoError;
use crate::http::check_response;

/// Anything that can resolve a logo URL for a company.
pub trait LogoFetcher: Send + Sync {
    /// `Ok(None)` when the service knows no logo for the company.
    fn fetch_logo(
        &self,
        job: &LogoJob,
    ) -> impl Future<Output = Result<Option<String>, LogoError>> + Send;
}

#[derive(Serialize)]
struct LogoRequest<'a> {
    company_id: &'a str,
    company_name: &'a str,
}

#[derive(Deserialize)]
struct LogoResponse {
    logo_url: Option<String>,
}

pub struct LogoClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl LogoClient {
    /// Build a client from the `[logo]` config section.
    ///
    /// # Errors
    ///
    /// Returns [`LogoError::NotConfigured`] when no endpoint is set, or
    /// [`LogoError::Http`] if the HTTP client cannot be built.
    pub fn from_config(config: &LogoConfig) -> Result<Self, LogoError> {
        if !config.is_configured() {
            return Err(LogoError::NotConfigured);
        }
        let http = reqwest::Client::builder()
            .user_agent(concat!("stackfit/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            api_key: Some(config.api_key.clone()).filter(|k| !k.is_empty()),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl LogoFetcher for LogoClient {
    async fn fetch_logo(&self, job: &LogoJob) -> Result<Option<String>, LogoError> {
        let mut request = self.http.post(&self.endpoint).json(&LogoRequest {
            company_id: &job.company_id,
            company_name: &job.company_name,
        });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        let resp = request.send().await?;
        parse_logo_response(resp).await
    }
}

/// Map a logo service response to an optional URL.
pub(crate) async fn parse_logo_response(
    resp: reqwest::Response,
) -> Result<Option<String>, LogoError> {
    if resp.status() == reqwest::StatusCode::NOT_FOUND {
        return Ok(None);
    }
    let resp = check_response(resp).await?;
    let body = resp.text().await?;
    let parsed: LogoResponse =
        serde_json::from_str(&body).map_err(|e| LogoError::Parse(e.to_string()))?;
    Ok(parsed.logo_url.filter(|url| !url.is_empty()))
}

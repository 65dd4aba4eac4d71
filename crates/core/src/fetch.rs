//! Report fetching.
//!
//! The pipeline only needs one HTTP operation: POST a JSON body and get back a status code and
//! body text. [`Fetcher`] is that seam; [`HttpFetcher`] implements it with a blocking `reqwest`
//! client. Any status other than 200 is a [`LoadError::TransportFailure`] carrying the status
//! and body verbatim. There is no retry here; callers own timeout and retry policy.

use crate::settings::Settings;
use crate::{LoadError, LoadResult};
use base64::{engine::general_purpose, Engine as _};
use std::collections::BTreeMap;
use std::time::Duration;

/// A fully assembled POST request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

/// Status and body text returned by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

/// Performs one blocking POST per call.
pub trait Fetcher {
    fn post(&self, request: &FetchRequest) -> LoadResult<FetchResponse>;
}

/// [`Fetcher`] backed by `reqwest::blocking`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> LoadResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    fn post(&self, request: &FetchRequest) -> LoadResult<FetchResponse> {
        let mut builder = self.client.post(&request.url).body(request.body.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        let response = builder.send()?;
        let status = response.status().as_u16();
        let body = response.text()?;

        Ok(FetchResponse { status, body })
    }
}

/// Builds the report request from `settings` and the per-attempt `params`.
///
/// The API key is passed as a query parameter. When both `data_server_username` and
/// `data_server_password` are set, a basic `Authorization` header is added. All params,
/// credentials included, form the JSON body.
pub fn build_request(
    settings: &Settings,
    params: &BTreeMap<String, String>,
) -> LoadResult<FetchRequest> {
    let api_key = params.get("api_key").map(String::as_str).unwrap_or_default();
    let url = format!("{}?api_key={}", settings.url.trim(), api_key);

    let mut headers = BTreeMap::new();
    headers.insert("Content-Type".to_owned(), "application/json".to_owned());

    let username = params.get("data_server_username").filter(|u| !u.is_empty());
    let password = params.get("data_server_password").filter(|p| !p.is_empty());
    if let (Some(username), Some(password)) = (username, password) {
        let token = general_purpose::STANDARD.encode(format!("{username}:{password}"));
        headers.insert("Authorization".to_owned(), format!("Basic {token}"));
    }

    let body = serde_json::to_string(params).map_err(LoadError::Serialization)?;

    Ok(FetchRequest { url, headers, body })
}

/// Returns the body of a successful response, or a transport failure for any non-200 status.
pub fn check_response(response: FetchResponse) -> LoadResult<String> {
    if response.status != 200 {
        tracing::warn!(status = response.status, "report fetch failed");
        return Err(LoadError::TransportFailure {
            status: response.status,
            body: response.body,
        });
    }
    Ok(response.body)
}

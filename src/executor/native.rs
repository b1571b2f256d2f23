//! Request transport built on reqwest.

use crate::executor::error::RequestError;
use crate::models::request::{HttpMethod, PreparedRequest};
use crate::models::response::HttpResponse;
use std::collections::HashMap;
use std::time::Duration;

/// Sends a prepared request and reads the whole response.
///
/// Any status is returned as `Ok`; deciding what a non-success status means
/// is left to the caller.
///
/// # Arguments
///
/// * `request` - The assembled request
/// * `timeout` - Total time allowed for the exchange
///
/// # Errors
///
/// `InvalidUrl` when the URI does not parse, `Timeout` when the exchange
/// exceeds `timeout`, `NetworkError` for transport failures.
pub async fn send(
    request: &PreparedRequest,
    timeout: Duration,
) -> Result<HttpResponse, RequestError> {
    let url = url::Url::parse(&request.uri)?;

    let method = match request.method {
        HttpMethod::GET => reqwest::Method::GET,
        HttpMethod::POST => reqwest::Method::POST,
        HttpMethod::PUT => reqwest::Method::PUT,
        HttpMethod::DELETE => reqwest::Method::DELETE,
        HttpMethod::PATCH => reqwest::Method::PATCH,
        HttpMethod::HEAD => reqwest::Method::HEAD,
        HttpMethod::OPTIONS => reqwest::Method::OPTIONS,
    };

    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| RequestError::BuildError(e.to_string()))?;

    let mut req_builder = client.request(method, url);
    for (name, value) in &request.headers {
        req_builder = req_builder.header(name, value);
    }
    if let Some(body) = &request.body {
        req_builder = req_builder.body(body.clone());
    }

    log::debug!("sending {} {}", request.method, request.uri);
    let response = req_builder.send().await.map_err(|e| {
        if e.is_timeout() {
            RequestError::Timeout
        } else if e.is_connect() {
            RequestError::NetworkError(format!("Connection failed: {}", e))
        } else {
            RequestError::from(e)
        }
    })?;

    let status_code = response.status().as_u16();
    let mut headers = HashMap::new();
    for (name, value) in response.headers() {
        if let Ok(value_str) = value.to_str() {
            headers.insert(name.as_str().to_string(), value_str.to_string());
        }
    }

    let body = response.text().await?;
    log::debug!("received {} ({} bytes)", status_code, body.len());

    Ok(HttpResponse {
        status_code,
        headers,
        body,
    })
}

use base64::{Engine as _, engine::general_purpose::STANDARD};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, InvalidHeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{NotiflowError, Result};

pub const CONTENT_TYPE_JSON: &str = "application/json;charset=UTF-8";
pub const CONTENT_TYPE_FORM: &str = "application/x-www-form-urlencoded";

/// `Authorization` header scheme. Fixed per node type, never negotiated.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthScheme {
    /// `Bearer <token>`
    Bearer,
    /// `Basic base64(apiKey:token)`
    Basic,
}

impl AuthScheme {
    /// Build the `Authorization` header value for this scheme.
    pub fn header_value(
        &self,
        api_key: Option<&str>,
        token: &str,
    ) -> Result<HeaderValue> {
        let value = match self {
            AuthScheme::Bearer => format!("Bearer {}", token),
            AuthScheme::Basic => {
                let api_key = api_key.ok_or_else(|| NotiflowError::Configuration("apiKey is required for basic authorization".to_string()))?;
                format!("Basic {}", STANDARD.encode(format!("{}:{}", api_key, token)))
            }
        };
        header_value(&value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Value),
    Form(Vec<(String, String)>),
}

/// An outbound call. Every send and token exchange is a POST.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub headers: HeaderMap,
    pub body: RequestBody,
}

impl HttpRequest {
    pub fn post(
        url: &str,
        headers: HeaderMap,
        body: RequestBody,
    ) -> Self {
        Self {
            url: url.to_string(),
            headers,
            body,
        }
    }
}

/// Response body after decoding. Bodies that are not valid JSON stay raw.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Raw(String),
}

impl ResponseBody {
    pub fn parse(text: String) -> Self {
        if text.trim().is_empty() {
            return ResponseBody::Json(Value::Null);
        }
        match serde_json::from_str::<Value>(&text) {
            Ok(value) => ResponseBody::Json(value),
            Err(_) => ResponseBody::Raw(text),
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, ResponseBody::Raw(_))
    }

    pub fn into_value(self) -> Value {
        match self {
            ResponseBody::Json(value) => value,
            ResponseBody::Raw(text) => Value::String(text),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: ResponseBody,
}

pub fn header_value(value: &str) -> Result<HeaderValue> {
    value.parse().map_err(|err: InvalidHeaderValue| NotiflowError::Configuration(format!("invalid header value: {}", err)))
}

pub fn insert_header(
    headers: &mut HeaderMap,
    name: &str,
    value: &str,
) -> Result<()> {
    let name: HeaderName = name.parse().map_err(|err: reqwest::header::InvalidHeaderName| NotiflowError::Configuration(err.to_string()))?;
    headers.insert(name, header_value(value)?);
    Ok(())
}

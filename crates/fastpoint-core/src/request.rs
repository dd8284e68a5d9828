//! The host request.
//!
//! A [`Request`] exposes every place a handler parameter can come from: URL
//! captures, the query string, JSON and form bodies, headers, cookies and
//! uploaded files. Requests are built once per call and shared read-only
//! through an `Arc` for the rest of the lifecycle.
//!
//! # Example
//!
//! ```
//! use fastpoint_core::Request;
//! use http::Method;
//!
//! let request = Request::new(Method::GET, "/posts/10")
//!     .with_url_param("id", "10")
//!     .with_query_param("id", "99")
//!     .with_query_param("fields", "title,slug");
//!
//! assert_eq!(request.param("fields"), Some(&serde_json::json!("title,slug")));
//! ```

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue, CONTENT_TYPE, COOKIE};
use http::{HeaderMap, Method};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

/// An ordered map of raw parameter values.
pub type Params = IndexMap<String, Value>;

/// Errors produced while building a [`Request`] from raw HTTP parts.
#[derive(Error, Debug)]
pub enum RequestError {
    /// The query string could not be decoded.
    #[error("Invalid query string: {0}")]
    InvalidQuery(#[source] serde_urlencoded::de::Error),

    /// The body declared JSON but did not parse.
    #[error("Invalid JSON body: {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// The body declared a url-encoded form but did not parse.
    #[error("Invalid form body: {0}")]
    InvalidForm(#[source] serde_urlencoded::de::Error),

    /// A header name or value was not valid HTTP.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),
}

/// Descriptor of an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadedFile {
    /// Original file name.
    pub name: String,
    /// Declared MIME type.
    #[serde(rename = "type")]
    pub content_type: String,
    /// Size in bytes.
    pub size: u64,
    /// Where the host stored the upload, if anywhere.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tmp_name: Option<String>,
    /// Host upload error code (0 means no error).
    pub error: u8,
}

impl UploadedFile {
    /// Creates a descriptor for a successful upload.
    #[must_use]
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            size,
            tmp_name: None,
            error: 0,
        }
    }

    /// Returns the descriptor as a JSON object.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut object = serde_json::Map::new();
        object.insert("name".to_string(), Value::from(self.name.clone()));
        object.insert("type".to_string(), Value::from(self.content_type.clone()));
        object.insert("size".to_string(), Value::from(self.size));
        if let Some(tmp_name) = &self.tmp_name {
            object.insert("tmp_name".to_string(), Value::from(tmp_name.clone()));
        }
        object.insert("error".to_string(), Value::from(self.error));
        Value::Object(object)
    }
}

/// A request delivered by the host framework.
#[derive(Debug, Clone)]
pub struct Request {
    id: Uuid,
    method: Method,
    path: String,
    url_params: Params,
    query_params: Params,
    json_params: Option<Params>,
    body_params: Params,
    headers: HeaderMap,
    files: IndexMap<String, UploadedFile>,
    body: Bytes,
}

impl Request {
    /// Creates an empty request.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            method,
            path: path.into(),
            url_params: Params::new(),
            query_params: Params::new(),
            json_params: None,
            body_params: Params::new(),
            headers: HeaderMap::new(),
            files: IndexMap::new(),
            body: Bytes::new(),
        }
    }

    /// Builds a request from raw HTTP parts.
    ///
    /// The query string is decoded into query params. The body is decoded as
    /// JSON or as a url-encoded form depending on the `Content-Type` header.
    /// A key repeated in the query or form (`?tag=a&tag=b`) becomes an array
    /// of its values in order. URL captures are left empty: they belong to
    /// whoever matched the route.
    pub fn from_parts(parts: http::request::Parts, body: Bytes) -> Result<Self, RequestError> {
        let mut request = Self::new(parts.method, parts.uri.path());
        request.headers = parts.headers;

        if let Some(query) = parts.uri.query() {
            let pairs: Vec<(String, String)> =
                serde_urlencoded::from_str(query).map_err(RequestError::InvalidQuery)?;
            gather_pairs(&mut request.query_params, pairs);
        }

        if !body.is_empty() {
            if request.is_json_content_type() {
                let value: Value = serde_json::from_slice(&body).map_err(RequestError::InvalidJson)?;
                request.json_params = Some(match value {
                    Value::Object(map) => map.into_iter().collect(),
                    _ => Params::new(),
                });
            } else if request.is_form_content_type() {
                let pairs: Vec<(String, String)> =
                    serde_urlencoded::from_bytes(&body).map_err(RequestError::InvalidForm)?;
                gather_pairs(&mut request.body_params, pairs);
            }
        }

        request.body = body;
        tracing::trace!(request_id = %request.id, method = %request.method, path = %request.path, "request parsed");
        Ok(request)
    }

    /// Adds a URL capture.
    #[must_use]
    pub fn with_url_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.url_params.insert(key.into(), value.into());
        self
    }

    /// Adds a query parameter.
    #[must_use]
    pub fn with_query_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.query_params.insert(key.into(), value.into());
        self
    }

    /// Adds a form body parameter.
    #[must_use]
    pub fn with_body_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.body_params.insert(key.into(), value.into());
        self
    }

    /// Sets a JSON body and marks the request as `application/json`.
    ///
    /// Non-object bodies are kept as raw bytes but expose no JSON params.
    #[must_use]
    pub fn with_json(mut self, body: Value) -> Self {
        self.body = Bytes::from(body.to_string());
        self.json_params = Some(match body {
            Value::Object(map) => map.into_iter().collect(),
            _ => Params::new(),
        });
        self.headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        self
    }

    /// Appends a header. Invalid names or values are rejected.
    pub fn try_with_header(mut self, name: &str, value: &str) -> Result<Self, RequestError> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| RequestError::InvalidHeader(e.to_string()))?;
        let value =
            HeaderValue::from_str(value).map_err(|e| RequestError::InvalidHeader(e.to_string()))?;
        self.headers.append(name, value);
        Ok(self)
    }

    /// Appends a header value that is known to be valid.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Attaches an uploaded file under the given field name.
    #[must_use]
    pub fn with_file(mut self, field: impl Into<String>, file: UploadedFile) -> Self {
        self.files.insert(field.into(), file);
        self
    }

    /// Replaces the URL captures. Used by whatever matched the route.
    pub fn set_url_params(&mut self, params: Params) {
        self.url_params = params;
    }

    /// Unique id of this request (UUID v7).
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Request path, without the query string.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// URL-captured parameters.
    #[must_use]
    pub const fn url_params(&self) -> &Params {
        &self.url_params
    }

    /// Query string parameters.
    #[must_use]
    pub const fn query_params(&self) -> &Params {
        &self.query_params
    }

    /// JSON body parameters, if the body was JSON.
    #[must_use]
    pub fn json_params(&self) -> Option<&Params> {
        self.json_params.as_ref()
    }

    /// Form body parameters.
    #[must_use]
    pub const fn body_params(&self) -> &Params {
        &self.body_params
    }

    /// Raw headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Uploaded files by field name.
    #[must_use]
    pub const fn files(&self) -> &IndexMap<String, UploadedFile> {
        &self.files
    }

    /// Raw body bytes.
    #[must_use]
    pub const fn body(&self) -> &Bytes {
        &self.body
    }

    /// Cookies parsed from every `Cookie` header.
    ///
    /// Surrounding quotes are stripped from values; later cookies win.
    #[must_use]
    pub fn cookies(&self) -> IndexMap<String, String> {
        let mut cookies = IndexMap::new();
        for header in self.headers.get_all(COOKIE) {
            let Ok(header) = header.to_str() else {
                continue;
            };
            for cookie in header.split(';') {
                if let Some((name, value)) = cookie.trim().split_once('=') {
                    let value = value.trim().trim_matches('"');
                    cookies.insert(name.trim().to_string(), value.to_string());
                }
            }
        }
        cookies
    }

    /// Returns the parsed `Content-Type`, if present and valid.
    #[must_use]
    pub fn content_type(&self) -> Option<mime::Mime> {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse().ok())
    }

    /// Returns `true` if the body is declared as JSON (`application/json` or `+json`).
    #[must_use]
    pub fn is_json_content_type(&self) -> bool {
        self.content_type().is_some_and(|mime| {
            mime.subtype() == mime::JSON || mime.suffix() == Some(mime::JSON)
        })
    }

    fn is_form_content_type(&self) -> bool {
        self.content_type()
            .is_some_and(|mime| mime.essence_str() == mime::APPLICATION_WWW_FORM_URLENCODED.essence_str())
    }

    /// Every parameter merged into one view.
    ///
    /// Later origins override earlier ones: URL captures, then query, then form
    /// body, then JSON body.
    #[must_use]
    pub fn params(&self) -> Params {
        let mut merged = self.url_params.clone();
        merged.extend(self.query_params.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged.extend(self.body_params.iter().map(|(k, v)| (k.clone(), v.clone())));
        if let Some(json) = &self.json_params {
            merged.extend(json.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        merged
    }

    /// Looks up a single parameter in the merged view.
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&Value> {
        self.json_params
            .as_ref()
            .and_then(|json| json.get(key))
            .or_else(|| self.body_params.get(key))
            .or_else(|| self.query_params.get(key))
            .or_else(|| self.url_params.get(key))
    }

    /// Returns `true` if any origin carries `key`.
    #[must_use]
    pub fn has_param(&self, key: &str) -> bool {
        self.param(key).is_some()
    }
}

/// Inserts decoded pairs, turning repeated keys into arrays.
fn gather_pairs(params: &mut Params, pairs: Vec<(String, String)>) {
    for (key, value) in pairs {
        let value = Value::String(value);
        match params.get_mut(&key) {
            Some(Value::Array(values)) => values.push(value),
            Some(existing) => *existing = Value::Array(vec![existing.take(), value]),
            None => {
                params.insert(key, value);
            }
        }
    }
}

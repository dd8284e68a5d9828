//! Parameter sources.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use fastpoint_core::{Params, Request};

/// Locates raw values in a request.
///
/// Sources are pure: they never coerce and never keep state between calls.
pub trait ParameterSource: Send + Sync {
    /// Name shown in logs and debug output.
    fn name(&self) -> &str;

    /// Extracts every value this source can see.
    fn extract(&self, request: &Request) -> Params;
}

/// The sources a parameter can declare.
#[derive(Clone)]
pub enum Source {
    /// URL captures.
    Url,
    /// Query string.
    Query,
    /// JSON body.
    Json,
    /// Form body.
    Body,
    /// Headers.
    Header,
    /// Cookies.
    Cookie,
    /// Uploaded files.
    File,
    /// Everything, merged.
    Any,
    /// A user-defined source.
    Custom(Arc<dyn ParameterSource>),
}

impl Source {
    /// Wraps a user-defined source.
    pub fn custom(source: impl ParameterSource + 'static) -> Self {
        Self::Custom(Arc::new(source))
    }

    /// Identity of this source for per-request caching.
    ///
    /// Custom sources are told apart by instance, never by name.
    pub(crate) fn cache_key(&self) -> SourceKey {
        match self {
            Self::Custom(source) => SourceKey::Custom(Arc::as_ptr(source).cast::<()>()),
            builtin => SourceKey::Builtin(builtin.name_static()),
        }
    }

    fn name_static(&self) -> &'static str {
        match self {
            Self::Url => "url",
            Self::Query => "query",
            Self::Json => "json",
            Self::Body => "body",
            Self::Header => "header",
            Self::Cookie => "cookie",
            Self::File => "file",
            Self::Any => "any",
            Self::Custom(_) => "custom",
        }
    }
}

/// Cache key of an extracted source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum SourceKey {
    Builtin(&'static str),
    Custom(*const ()),
}

impl ParameterSource for Source {
    fn name(&self) -> &str {
        match self {
            Self::Custom(source) => source.name(),
            builtin => builtin.name_static(),
        }
    }

    fn extract(&self, request: &Request) -> Params {
        match self {
            Self::Url => request.url_params().clone(),
            Self::Query => request.query_params().clone(),
            Self::Json => request.json_params().cloned().unwrap_or_default(),
            Self::Body => request.body_params().clone(),
            Self::Header => header_params(request),
            Self::Cookie => request
                .cookies()
                .into_iter()
                .map(|(name, value)| (name, Value::String(value)))
                .collect(),
            Self::File => request
                .files()
                .iter()
                .map(|(field, file)| (field.clone(), file.to_value()))
                .collect(),
            Self::Any => request.params(),
            Self::Custom(source) => source.extract(request),
        }
    }
}

/// Normalizes a header name the way handler parameters refer to it.
fn normalize_header_name(name: &str) -> String {
    name.to_ascii_lowercase().replace('-', "_")
}

fn header_params(request: &Request) -> Params {
    let mut params = Params::new();
    for name in request.headers().keys() {
        let joined = request
            .headers()
            .get_all(name)
            .iter()
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
            .collect::<Vec<_>>()
            .join(",");
        params.insert(normalize_header_name(name.as_str()), Value::String(joined));
    }
    params
}

impl PartialEq for Source {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Custom(a), Self::Custom(b)) => Arc::ptr_eq(a, b),
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom(source) => write!(f, "Custom({})", source.name()),
            other => f.write_str(other.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fastpoint_core::UploadedFile;
    use http::Method;
    use serde_json::json;

    #[test]
    fn test_header_names_are_normalized_and_joined() {
        let request = Request::new(Method::GET, "/")
            .try_with_header("X-Post-Id", "10")
            .and_then(|r| r.try_with_header("All-Posts", "1"))
            .and_then(|r| r.try_with_header("All-Posts", "2"))
            .expect("valid headers");

        let params = Source::Header.extract(&request);
        assert_eq!(params["x_post_id"], json!("10"));
        assert_eq!(params["all_posts"], json!("1,2"));
    }

    #[test]
    fn test_cookie_source() {
        let request = Request::new(Method::GET, "/")
            .try_with_header("cookie", "post_id=5; all_posts=1,2")
            .expect("valid header");

        let params = Source::Cookie.extract(&request);
        assert_eq!(params["post_id"], json!("5"));
        assert_eq!(params["all_posts"], json!("1,2"));
    }

    #[test]
    fn test_file_source() {
        let request = Request::new(Method::POST, "/")
            .with_file("my_file", UploadedFile::new("a.txt", "text/plain", 3));

        let params = Source::File.extract(&request);
        assert_eq!(params["my_file"]["name"], json!("a.txt"));
        assert_eq!(params["my_file"]["size"], json!(3));
    }

    #[test]
    fn test_json_source_is_empty_without_json_body() {
        let request = Request::new(Method::POST, "/").with_body_param("id", "1");
        assert!(Source::Json.extract(&request).is_empty());
        assert_eq!(Source::Body.extract(&request)["id"], json!("1"));
    }

    struct Tenant;

    impl ParameterSource for Tenant {
        fn name(&self) -> &str {
            "tenant"
        }

        fn extract(&self, request: &Request) -> Params {
            let mut params = Params::new();
            let tenant = request.path().trim_start_matches('/').split('/').next().unwrap_or_default();
            params.insert("tenant".to_string(), json!(tenant));
            params
        }
    }

    #[test]
    fn test_custom_source() {
        let request = Request::new(Method::GET, "/acme/posts");
        let source = Source::custom(Tenant);
        assert_eq!(source.name(), "tenant");
        assert_eq!(source.extract(&request)["tenant"], json!("acme"));
    }
}

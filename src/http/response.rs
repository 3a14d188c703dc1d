/*
 * Responsibility
 * - Handler が返す型付きレスポンス (WebResponse) の定義
 * - Text / Json の閉じた variant と、status code / header の保持
 * - header() は常に新しいインスタンスを返す (receiver は変更しない)
 * - wire への書き出しは encoder.rs の責務
 */
use std::fmt;
use std::sync::Arc;

use axum::http::StatusCode;
use indexmap::IndexMap;
use serde::Serialize;

/// Normalized header view: lowercase names, values in call order.
pub type HeaderValues = IndexMap<String, Vec<String>>;

/// A response produced by a route handler.
///
/// Every variant carries a status code (200 unless overridden) and a
/// multi-valued header collection. Values are immutable: `header()` and
/// `with_status()` build a new response and leave the receiver untouched.
#[derive(Clone, Debug)]
pub enum WebResponse {
    Text(TextWebResponse),
    Json(JsonWebResponse),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextWebResponse {
    body: String,
    status_code: StatusCode,
    headers: HeaderList,
}

#[derive(Clone)]
pub struct JsonWebResponse {
    body: Arc<dyn JsonBody>,
    status_code: StatusCode,
    headers: HeaderList,
}

/// Object-safe view over any `Serialize` body.
///
/// Serialization is deferred to the encoder; constructing a response never
/// checks that the body can be rendered.
pub trait JsonBody: Send + Sync {
    fn to_json(&self) -> serde_json::Result<Vec<u8>>;
}

impl<T> JsonBody for T
where
    T: Serialize + Send + Sync,
{
    fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}

// Raw (name, value) pairs exactly as supplied, in call order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct HeaderList(Vec<(String, String)>);

impl HeaderList {
    fn appended<I>(&self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut entries = self.0.clone();
        entries.extend(values.into_iter().map(|v| (name.to_string(), v)));
        Self(entries)
    }

    fn normalized(&self) -> HeaderValues {
        self.0
            .iter()
            .fold(IndexMap::new(), |mut acc: HeaderValues, (name, value)| {
                acc.entry(name.to_ascii_lowercase())
                    .or_default()
                    .push(value.clone());
                acc
            })
    }
}

impl TextWebResponse {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            status_code: StatusCode::OK,
            headers: HeaderList::default(),
        }
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}

impl JsonWebResponse {
    /// `()` or `None` bodies render as JSON `null`.
    pub fn new<T>(body: T) -> Self
    where
        T: Serialize + Send + Sync + 'static,
    {
        Self {
            body: Arc::new(body),
            status_code: StatusCode::OK,
            headers: HeaderList::default(),
        }
    }

    pub fn body(&self) -> &dyn JsonBody {
        self.body.as_ref()
    }
}

impl fmt::Debug for JsonWebResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonWebResponse")
            .field("status_code", &self.status_code)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

impl From<TextWebResponse> for WebResponse {
    fn from(value: TextWebResponse) -> Self {
        Self::Text(value)
    }
}

impl From<JsonWebResponse> for WebResponse {
    fn from(value: JsonWebResponse) -> Self {
        Self::Json(value)
    }
}

impl WebResponse {
    pub fn text(body: impl Into<String>) -> Self {
        TextWebResponse::new(body).into()
    }

    pub fn json<T>(body: T) -> Self
    where
        T: Serialize + Send + Sync + 'static,
    {
        JsonWebResponse::new(body).into()
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Text(r) => r.status_code,
            Self::Json(r) => r.status_code,
        }
    }

    /// Append one value under `name`. Names match case-insensitively.
    #[must_use]
    pub fn header(&self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.header_values(name, [value.into()])
    }

    /// Append several values under `name`, keeping their order.
    #[must_use]
    pub fn header_values<I, V>(&self, name: impl AsRef<str>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let name = name.as_ref();
        let values = values.into_iter().map(Into::into);
        match self {
            Self::Text(r) => Self::Text(TextWebResponse {
                headers: r.headers.appended(name, values),
                ..r.clone()
            }),
            Self::Json(r) => Self::Json(JsonWebResponse {
                headers: r.headers.appended(name, values),
                ..r.clone()
            }),
        }
    }

    #[must_use]
    pub fn with_status(&self, status_code: StatusCode) -> Self {
        match self {
            Self::Text(r) => Self::Text(TextWebResponse {
                status_code,
                ..r.clone()
            }),
            Self::Json(r) => Self::Json(JsonWebResponse {
                status_code,
                ..r.clone()
            }),
        }
    }

    /// Header view used for encoding, recomputed on every call.
    pub fn headers(&self) -> HeaderValues {
        match self {
            Self::Text(r) => r.headers.normalized(),
            Self::Json(r) => r.headers.normalized(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn values(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn defaults_to_200_without_headers() {
        let resp = WebResponse::text("Hello World!");

        assert_eq!(resp.status_code(), StatusCode::OK);
        assert!(resp.headers().is_empty());
    }

    #[test]
    fn header_names_are_lowercased_and_merged_across_casings() {
        let resp = WebResponse::text("x")
            .header("X-Test-Header", "a")
            .header("x-test-header", "b")
            .header("Accept", "text/plain")
            .header("X-TEST-HEADER", "c");

        let headers = resp.headers();
        assert_eq!(headers.len(), 2);
        assert_eq!(headers["x-test-header"], values(&["a", "b", "c"]));
        assert_eq!(headers["accept"], values(&["text/plain"]));
    }

    #[test]
    fn header_values_appends_in_order() {
        let resp = WebResponse::json(json!({}))
            .header("Vary", "Accept")
            .header_values("vary", ["Origin", "Cookie"]);

        assert_eq!(resp.headers()["vary"], values(&["Accept", "Origin", "Cookie"]));
    }

    #[test]
    fn header_does_not_mutate_receiver() {
        let base = WebResponse::text("x").header("X-Base", "1");

        let left = base.header("X-Left", "l");
        let right = base.header("x-base", "2");

        assert_eq!(base.headers().len(), 1);
        assert_eq!(base.headers()["x-base"], values(&["1"]));

        assert_eq!(left.headers()["x-base"], values(&["1"]));
        assert_eq!(left.headers()["x-left"], values(&["l"]));

        assert_eq!(right.headers()["x-base"], values(&["1", "2"]));
        assert!(!right.headers().contains_key("x-left"));
    }

    #[test]
    fn with_status_keeps_body_and_headers() {
        let base = WebResponse::text("gone").header("X-A", "1");
        let resp = base.with_status(StatusCode::SERVICE_UNAVAILABLE);

        assert_eq!(base.status_code(), StatusCode::OK);
        assert_eq!(resp.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(resp.headers()["x-a"], values(&["1"]));
        match resp {
            WebResponse::Text(t) => assert_eq!(t.body(), "gone"),
            WebResponse::Json(_) => panic!("variant changed"),
        }
    }

    #[test]
    fn json_body_is_serialized_lazily() {
        let resp = JsonWebResponse::new(json!({"foo": "bar"}));
        let bytes = resp.body().to_json().unwrap();
        assert_eq!(bytes, br#"{"foo":"bar"}"#);

        let empty = JsonWebResponse::new(Option::<String>::None);
        assert_eq!(empty.body().to_json().unwrap(), b"null");
    }
}

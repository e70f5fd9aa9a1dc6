//! Transport abstraction
//!
//! The API layer only builds requests and interprets status codes and
//! payloads. Sending them is delegated to an [`HttpTransport`], so the
//! production client and the in-memory test tenant are interchangeable.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::{Error, Result};

/// HTTP methods used by the management API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }

    /// Mutating calls need a CSRF token.
    pub fn is_mutating(&self) -> bool {
        !matches!(self, Self::Get)
    }
}

/// A request relative to the tenant host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    /// Path and query, starting with `/`
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Ask for a JSON response.
    pub fn accept_json(self) -> Self {
        self.header("Accept", "application/json")
    }

    /// Serialize `payload` as the JSON body.
    pub fn json<T: Serialize>(mut self, payload: &T) -> Result<Self> {
        self.body = Some(serde_json::to_vec(payload)?);
        Ok(self
            .header("Content-Type", "application/json")
            .accept_json())
    }

    /// Case-insensitive header lookup.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Body as JSON, for transports that inspect payloads.
    pub fn body_json<T: DeserializeOwned>(&self) -> Result<T> {
        let body = self
            .body
            .as_deref()
            .ok_or_else(|| Error::Decode(format!("{} {} has no body", self.method.as_str(), self.path)))?;
        Ok(serde_json::from_slice(body)?)
    }
}

/// A response as seen by the API layer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// JSON response with the given status.
    pub fn json<T: Serialize>(status: u16, payload: &T) -> Result<Self> {
        Ok(Self::new(status, serde_json::to_vec(payload)?)
            .with_header("Content-Type", "application/json"))
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Case-insensitive header lookup; the first occurrence wins.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Every value of a repeated header, such as `Set-Cookie`.
    pub fn header_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .iter()
            .filter(move |(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json_body<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body)
            .map_err(|e| Error::Decode(format!("{e}: {}", truncate(&self.text(), 200))))
    }
}

/// Sends requests to the tenant.
///
/// Implementations own authentication and session handling. Non-2xx
/// statuses are returned as responses, not errors; only failures to
/// complete the exchange are errors.
pub trait HttpTransport: Send + Sync {
    fn execute(&self, request: Request) -> Result<Response>;
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

pub(crate) fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_ignores_case() {
        let response = Response::new(200, Vec::new())
            .with_header("X-CSRF-Token", "abc")
            .with_header("set-cookie", "a=1; Path=/")
            .with_header("Set-Cookie", "b=2");
        assert_eq!(response.header("x-csrf-token"), Some("abc"));
        assert_eq!(response.header_values("SET-COOKIE").count(), 2);
    }

    #[test]
    fn json_request_sets_content_type() {
        let request = Request::post("/api/v1/x")
            .json(&serde_json::json!({"Id": "A"}))
            .unwrap();
        assert_eq!(request.header_value("content-type"), Some("application/json"));
        let body: serde_json::Value = request.body_json().unwrap();
        assert_eq!(body["Id"], "A");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("äöü", 2), "äö...");
        assert_eq!(truncate("ab", 5), "ab");
    }
}

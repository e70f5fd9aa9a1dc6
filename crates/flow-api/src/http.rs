//! Production transport using `ureq`
//!
//! Handles Basic and OAuth 2.0 client credentials authentication, caches
//! the bearer token until shortly before it expires, and fetches a CSRF
//! token plus session cookies once for all mutating calls.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;

use crate::auth::{Credentials, ServiceDetails};
use crate::transport::{HttpTransport, Method, Request, Response, truncate};
use crate::{Error, Result};

/// Default timeout for a single HTTP exchange.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Artifact archives can be large; refuse anything beyond this.
const MAX_BODY_BYTES: u64 = 256 * 1024 * 1024;

/// Refresh bearer tokens this long before they expire.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

const CSRF_HEADER: &str = "x-csrf-token";

#[derive(Debug, Clone)]
struct BearerToken {
    value: String,
    expires_at: Instant,
}

#[derive(Debug, Clone, Default)]
struct CsrfSession {
    token: Option<String>,
    cookies: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Blocking HTTP transport for a real tenant.
pub struct UreqTransport {
    agent: ureq::Agent,
    details: ServiceDetails,
    token: Mutex<Option<BearerToken>>,
    csrf: Mutex<Option<CsrfSession>>,
}

impl UreqTransport {
    pub fn new(details: ServiceDetails, timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build();
        tracing::debug!(
            host = %details.host,
            auth = details.credentials.scheme(),
            "Initialising HTTP client"
        );
        Self {
            agent: ureq::Agent::new_with_config(config),
            details,
            token: Mutex::new(None),
            csrf: Mutex::new(None),
        }
    }

    fn authorization(&self) -> Result<String> {
        match &self.details.credentials {
            Credentials::Basic { user, password } => Ok(basic_auth(user, password)),
            Credentials::OAuth { .. } => Ok(format!("Bearer {}", self.bearer_token()?)),
        }
    }

    fn bearer_token(&self) -> Result<String> {
        let mut cached = self
            .token
            .lock()
            .map_err(|_| Error::Auth("token cache poisoned".to_string()))?;
        if let Some(token) = cached.as_ref()
            && Instant::now() < token.expires_at
        {
            return Ok(token.value.clone());
        }
        let token = self.fetch_token()?;
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }

    fn fetch_token(&self) -> Result<BearerToken> {
        let Credentials::OAuth {
            client_id,
            client_secret,
            ..
        } = &self.details.credentials
        else {
            return Err(Error::Auth("no OAuth credentials configured".to_string()));
        };
        let url = self
            .details
            .credentials
            .token_url()
            .ok_or_else(|| Error::Auth("no token URL configured".to_string()))?;
        tracing::debug!(url = %url, "Requesting OAuth 2.0 access token");

        let response = self
            .agent
            .post(&url)
            .header("Authorization", &basic_auth(client_id, client_secret))
            .header("Content-Type", "application/x-www-form-urlencoded")
            .header("Accept", "application/json")
            .send(&b"grant_type=client_credentials"[..])
            .map_err(|e| transport_error(&url, e))?;
        let response = into_response(&url, response)?;
        if !response.is_success() {
            return Err(Error::Auth(format!(
                "token request returned HTTP {}: {}",
                response.status,
                truncate(&response.text(), 200)
            )));
        }

        let parsed: TokenResponse = response.json_body()?;
        let lifetime = Duration::from_secs(parsed.expires_in.unwrap_or(3600));
        Ok(BearerToken {
            value: parsed.access_token,
            expires_at: Instant::now() + lifetime.saturating_sub(TOKEN_EXPIRY_MARGIN),
        })
    }

    fn csrf_session(&self) -> Result<CsrfSession> {
        let mut cached = self
            .csrf
            .lock()
            .map_err(|_| Error::Auth("CSRF cache poisoned".to_string()))?;
        if let Some(session) = cached.as_ref() {
            return Ok(session.clone());
        }

        let probe = Request::get("/api/v1/").header(CSRF_HEADER, "fetch");
        let response = self.dispatch(&probe, None)?;
        let cookies: Vec<&str> = response
            .header_values("set-cookie")
            .filter_map(|c| c.split(';').next())
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .collect();
        let session = CsrfSession {
            token: response.header(CSRF_HEADER).map(str::to_string),
            cookies: (!cookies.is_empty()).then(|| cookies.join("; ")),
        };
        if session.token.is_none() {
            tracing::debug!(status = response.status, "Tenant returned no CSRF token");
        }
        *cached = Some(session.clone());
        Ok(session)
    }

    fn clear_csrf(&self) {
        if let Ok(mut cached) = self.csrf.lock() {
            *cached = None;
        }
    }

    fn dispatch(&self, request: &Request, csrf: Option<&CsrfSession>) -> Result<Response> {
        let url = format!("{}{}", self.details.base_url(), request.path);
        let mut headers = request.headers.clone();
        headers.push(("Authorization".to_string(), self.authorization()?));
        if let Some(session) = csrf {
            if let Some(token) = &session.token {
                headers.push((CSRF_HEADER.to_string(), token.clone()));
            }
            if let Some(cookies) = &session.cookies {
                headers.push(("Cookie".to_string(), cookies.clone()));
            }
        }

        let body = request.body.as_deref().unwrap_or(&[]);
        let result = match request.method {
            Method::Get => with_headers(self.agent.get(&url), &headers).call(),
            Method::Delete => with_headers(self.agent.delete(&url), &headers).call(),
            Method::Post => with_headers(self.agent.post(&url), &headers).send(body),
            Method::Put => with_headers(self.agent.put(&url), &headers).send(body),
        };
        let response = result.map_err(|e| transport_error(&url, e))?;
        into_response(&url, response)
    }
}

impl HttpTransport for UreqTransport {
    fn execute(&self, request: Request) -> Result<Response> {
        if !request.method.is_mutating() {
            return self.dispatch(&request, None);
        }

        let session = self.csrf_session()?;
        let response = self.dispatch(&request, Some(&session))?;
        let token_rejected = response.status == 403
            && response
                .header(CSRF_HEADER)
                .is_some_and(|v| v.eq_ignore_ascii_case("required"));
        if !token_rejected {
            return Ok(response);
        }

        // Session expired mid-run: fetch a fresh token once
        tracing::debug!("CSRF token rejected, refreshing");
        self.clear_csrf();
        let session = self.csrf_session()?;
        self.dispatch(&request, Some(&session))
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn into_response(url: &str, mut response: ureq::http::Response<ureq::Body>) -> Result<Response> {
    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();
    let body = response
        .body_mut()
        .with_config()
        .limit(MAX_BODY_BYTES)
        .read_to_vec()
        .map_err(|e| transport_error(url, e))?;
    Ok(Response {
        status,
        headers,
        body,
    })
}

fn basic_auth(user: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{user}:{password}")))
}

fn transport_error(url: &str, err: ureq::Error) -> Error {
    let timeout = matches!(err, ureq::Error::Timeout(_));
    Error::Transport {
        url: url.to_string(),
        message: err.to_string(),
        timeout,
    }
}

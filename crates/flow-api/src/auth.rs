//! Tenant connection details

use std::fmt;

/// Where the tenant lives and how to authenticate against it.
#[derive(Clone)]
pub struct ServiceDetails {
    /// Tenant host, optionally with scheme (`https://` is assumed)
    pub host: String,
    pub credentials: Credentials,
}

/// Supported authentication schemes.
#[derive(Clone)]
pub enum Credentials {
    Basic {
        user: String,
        password: String,
    },
    /// OAuth 2.0 client credentials grant
    OAuth {
        token_host: String,
        token_path: String,
        client_id: String,
        client_secret: String,
    },
}

impl ServiceDetails {
    pub fn new(host: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            host: host.into(),
            credentials,
        }
    }

    /// `https://<host>` unless the host already names a scheme.
    pub fn base_url(&self) -> String {
        with_scheme(&self.host)
    }
}

impl Credentials {
    pub fn token_url(&self) -> Option<String> {
        match self {
            Self::OAuth {
                token_host,
                token_path,
                ..
            } => Some(format!("{}{}", with_scheme(token_host), token_path)),
            Self::Basic { .. } => None,
        }
    }

    pub fn scheme(&self) -> &'static str {
        match self {
            Self::Basic { .. } => "basic",
            Self::OAuth { .. } => "oauth",
        }
    }
}

fn with_scheme(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{host}")
    }
}

// Secrets never reach log output
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic { user, .. } => f
                .debug_struct("Basic")
                .field("user", user)
                .field("password", &"***")
                .finish(),
            Self::OAuth {
                token_host,
                token_path,
                client_id,
                ..
            } => f
                .debug_struct("OAuth")
                .field("token_host", token_host)
                .field("token_path", token_path)
                .field("client_id", client_id)
                .field("client_secret", &"***")
                .finish(),
        }
    }
}

impl fmt::Debug for ServiceDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceDetails")
            .field("host", &self.host)
            .field("credentials", &self.credentials)
            .finish()
    }
}

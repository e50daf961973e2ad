use std::fmt;

use thiserror::Error;
use url::Url;

/// Validated base URL of a timetable backend, e.g. `http://localhost:5000`.
///
/// Kept as a string so that a path prefix on the base (`http://host/widget`)
/// survives when endpoint paths are appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendUrl(String);

#[derive(Error, Debug)]
#[error("invalid backend URL `{url}`: {reason}")]
pub struct InvalidBackendUrl {
    pub url: String,
    pub reason: String,
}

impl AsRef<str> for BackendUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BackendUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl BackendUrl {
    pub fn parse(raw: &str) -> Result<Self, InvalidBackendUrl> {
        let trimmed = raw.trim().trim_end_matches('/');
        let parsed = Url::parse(trimmed).map_err(|e| InvalidBackendUrl {
            url: raw.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(InvalidBackendUrl {
                url: raw.to_string(),
                reason: format!("unsupported scheme `{}`", parsed.scheme()),
            });
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Append the given path to the URL.
    pub fn append_path(&self, path: &str) -> String {
        format!("{}/{}", self.0, path.trim_start_matches('/'))
    }
}

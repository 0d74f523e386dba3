//! Parsing of `WWW-Authenticate` bearer challenges.

use crate::Error;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

// realm, error and error_description, in that order, all double-quoted.
static CHALLENGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"Bearer\s+realm="([^"]*)",\s*error="([^"]*)",\s*error_description="([^"]*)""#,
    )
    .expect("bearer challenge pattern is valid")
});

/// One `Bearer realm=..., error=..., error_description=...` challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BearerChallenge {
    pub realm: String,
    pub error: String,
    pub description: String,
}

impl BearerChallenge {
    /// The refined error this challenge stands for, if its name is recognised.
    fn to_error(&self) -> Option<Error> {
        let description = self.description.clone();
        match self.error.as_str() {
            "invalid_token" => Some(Error::InvalidOAuthToken(description)),
            "invalid_scope" => Some(Error::InvalidOAuthScope(description)),
            "inactive_user" => Some(Error::InactiveUser(description)),
            _ => None,
        }
    }
}

/// All structurally valid bearer challenges in a header value, in order.
pub(crate) fn parse(header: &str) -> Vec<BearerChallenge> {
    CHALLENGE_RE
        .captures_iter(header)
        .map(|c| BearerChallenge {
            realm: c[1].to_string(),
            error: c[2].to_string(),
            description: c[3].to_string(),
        })
        .collect()
}

/// Error for the first challenge with a recognised name.
pub(crate) fn refine(header: &str) -> Option<Error> {
    parse(header).into_iter().find_map(|challenge| {
        let err = challenge.to_error()?;
        debug!(realm = %challenge.realm, error = %challenge.error, "bearer challenge");
        Some(err)
    })
}

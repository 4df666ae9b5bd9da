use std::fmt;

/// Authentication source for a connection.
///
/// The two variants are mutually exclusive by construction; all downstream
/// logic switches on the tag instead of inspecting optional fields.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// HTTP Basic authentication.
    Basic { username: String, password: String },
    /// An opaque bearer token, sent as `Authorization: Token {value}`.
    ///
    /// Tokens are only accepted by a small subset of API routes; it is the
    /// caller's responsibility to use a token-based connection on routes
    /// that support it.
    Token(String),
}

impl Credentials {
    /// Basic credentials from a username/password pair.
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Token credentials.
    pub fn token(token: impl Into<String>) -> Self {
        Self::Token(token.into())
    }

    /// The username associated with these credentials, when known.
    pub fn username(&self) -> Option<&str> {
        match self {
            Self::Basic { username, .. } => Some(username),
            Self::Token(_) => None,
        }
    }
}

// Manual Debug so secrets never end up in logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Self::Token(_) => f.debug_tuple("Token").field(&"<redacted>").finish(),
        }
    }
}

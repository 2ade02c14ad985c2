//! Connection credentials.
//!
//! [`ConnectorCredentials`] carries either a token or a user/password pair.
//! Each secret exists in a plain and a "secure" variant; the secure variant
//! wins on resolution and is never rendered; output shows a masking
//! sentinel instead. The sentinels are also rejected on input so that a
//! masked string read back from a log or a round-tripped URL is never
//! mistaken for a real secret.

use serde::{Deserialize, Serialize};

use crate::error::ConnectionError;

/// Placeholder rendered instead of a secure password.
pub const MASKED_PASSWORD: &str = "********";

/// Placeholder rendered instead of a secure token.
pub const MASKED_TOKEN: &str = "XXXXXXXX";

/// Token type used when none is specified.
const DEFAULT_TOKEN_TYPE: &str = "BEARER";

/// Authentication material for a connector or segment.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(default)]
pub struct ConnectorCredentials {
    /// Plain token.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub token: String,
    /// Secure token; preferred over `token`, never serialized or rendered.
    #[serde(skip)]
    pub secure_token: String,
    /// User name.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub user: String,
    /// Plain password.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub password: String,
    /// Secure password; preferred over `password`, never serialized or
    /// rendered.
    #[serde(skip)]
    pub secure_password: String,
    /// Token type (`BEARER` when empty).
    #[serde(skip_serializing_if = "String::is_empty")]
    pub token_type: String,
}

impl ConnectorCredentials {
    /// True if a user name is present.
    #[must_use]
    pub fn has_user(&self) -> bool {
        !self.user.trim().is_empty()
    }

    /// True if any password variant is present.
    #[must_use]
    pub fn has_password(&self) -> bool {
        !self.password.trim().is_empty() || !self.secure_password.trim().is_empty()
    }

    /// True if this is user/password-style authentication.
    #[must_use]
    pub fn is_user_password(&self) -> bool {
        self.has_user() && self.has_password()
    }

    /// True if this is token-style authentication.
    #[must_use]
    pub fn is_token(&self) -> bool {
        !self.token.trim().is_empty() || !self.secure_token.trim().is_empty()
    }

    /// The effective token: the secure variant when non-empty.
    #[must_use]
    pub fn resolve_token(&self) -> &str {
        if self.secure_token.trim().is_empty() {
            &self.token
        } else {
            &self.secure_token
        }
    }

    /// The effective password: the secure variant when non-empty.
    #[must_use]
    pub fn resolve_password(&self) -> &str {
        if self.secure_password.trim().is_empty() {
            &self.password
        } else {
            &self.secure_password
        }
    }

    /// True if the token resolves to a real secret, not a masking sentinel.
    #[must_use]
    pub fn is_token_defined(&self) -> bool {
        self.is_token() && is_real_secret(self.resolve_token())
    }

    /// True if the password resolves to a real secret, not a masking
    /// sentinel.
    #[must_use]
    pub fn is_password_defined(&self) -> bool {
        self.is_user_password() && is_real_secret(self.resolve_password())
    }

    /// True if any real secret is present.
    ///
    /// This is the check the credential overlay uses: defined credentials
    /// are never overwritten.
    #[must_use]
    pub fn is_defined(&self) -> bool {
        self.is_token_defined() || self.is_password_defined()
    }

    /// Renders the `user:pass@` / `token-TYPE:token@` URL host-part prefix,
    /// or an empty string when no credentials are set.
    ///
    /// When only the secure variant of a secret is set, the corresponding
    /// masking sentinel is rendered instead of the secret.
    #[must_use]
    pub fn to_uri_host_part(&self) -> String {
        if self.is_user_password() {
            if self.secure_password.trim().is_empty() {
                format!("{}:{}@", self.user, self.password)
            } else {
                format!("{}:{MASKED_PASSWORD}@", self.user)
            }
        } else if self.is_token() {
            let token_type = if self.token_type.trim().is_empty() {
                DEFAULT_TOKEN_TYPE
            } else {
                &self.token_type
            };
            if self.secure_token.trim().is_empty() {
                format!("token-{token_type}:{}@", self.token)
            } else {
                format!("token-{token_type}:{MASKED_TOKEN}@")
            }
        } else {
            String::new()
        }
    }

    /// Renders the query-parameter form of the credentials: the host part
    /// without `@` and with `:` replaced by `,` (the user-info codec
    /// normalizes `,` back to `:` on parse).
    #[must_use]
    pub fn to_uri_query_part(&self) -> String {
        self.to_uri_host_part().replace('@', "").replace(':', ",")
    }

    /// Starts building credentials.
    #[must_use]
    pub fn builder() -> CredentialsBuilder {
        CredentialsBuilder::default()
    }
}

fn is_real_secret(secret: &str) -> bool {
    !secret.trim().is_empty() && secret != MASKED_TOKEN && secret != MASKED_PASSWORD
}

/// Mutable assembly state for [`ConnectorCredentials`]; local to
/// construction, frozen by [`CredentialsBuilder::build`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialsBuilder {
    /// Plain token.
    pub token: String,
    /// Secure token.
    pub secure_token: String,
    /// User name.
    pub user: String,
    /// Plain password.
    pub password: String,
    /// Secure password.
    pub secure_password: String,
    /// Token type.
    pub token_type: String,
}

impl CredentialsBuilder {
    /// Freezes the builder into an immutable value.
    #[must_use]
    pub fn build(&self) -> ConnectorCredentials {
        ConnectorCredentials {
            token: self.token.clone(),
            secure_token: self.secure_token.clone(),
            user: self.user.clone(),
            password: self.password.clone(),
            secure_password: self.secure_password.clone(),
            token_type: self.token_type.clone(),
        }
    }

    /// Resets every field to empty.
    pub fn clear(&mut self) {
        *self = CredentialsBuilder::default();
    }

    /// Parses a URL user-info string.
    ///
    /// `,` is normalized to `:` first (the query-parameter form uses commas).
    /// A left side with a `token-` prefix produces token credentials, with
    /// the token type being the remaining dash parts concatenated
    /// (`token-X-Y` gives type `XY`); anything else is `user:password`.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::MalformedCredentials`] when no `:`
    /// separator is present.
    pub fn setup_from_user_info(&mut self, user_info: &str) -> Result<(), ConnectionError> {
        let normalized = user_info.replace(',', ":");
        let mut parts = normalized.split(':');
        let left = parts.next().unwrap_or("");
        let right = parts
            .next()
            .ok_or_else(|| ConnectionError::MalformedCredentials(user_info.to_string()))?;
        if let Some(type_part) = left.strip_prefix("token-") {
            self.token_type = type_part.split('-').collect();
            self.token = right.to_string();
        } else {
            self.user = left.to_string();
            self.password = right.to_string();
        }
        Ok(())
    }
}

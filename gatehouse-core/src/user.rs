//! Identity and request payloads exchanged with the identity back-ends.

use std::collections::BTreeMap;

/// An identity record as returned by the session or account service.
///
/// A back-end may answer with a record that lacks an identifier; such a
/// record is a soft failure everywhere in gatehouse. Use
/// [`User::is_identified`] as the single truthiness gate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct User {
    /// Unique identifier. Absent or empty means "not identified".
    #[cfg_attr(feature = "serde", serde(default))]
    pub id: Option<String>,
    /// Contact address, when the back-end shares it.
    #[cfg_attr(feature = "serde", serde(default))]
    pub email: Option<String>,
    /// Display name, when the back-end shares it.
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: Option<String>,
    /// Any other fields the back-end returned.
    #[cfg_attr(feature = "serde", serde(default, flatten))]
    pub attributes: BTreeMap<String, String>,
}

impl User {
    /// Create an identified user.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Start building a user field by field.
    pub fn builder() -> UserBuilder {
        UserBuilder::default()
    }

    /// The identifier, if present and non-empty.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    /// Whether this record carries a usable identifier.
    pub fn is_identified(&self) -> bool {
        self.id().is_some()
    }

    /// Look up an extra attribute.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// Builder for [`User`].
#[derive(Debug, Default)]
pub struct UserBuilder {
    user: User,
}

impl UserBuilder {
    /// Set the identifier.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.user.id = Some(id.into());
        self
    }

    /// Set the email address.
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.user.email = Some(email.into());
        self
    }

    /// Set the display name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.user.name = Some(name.into());
        self
    }

    /// Add an extra attribute.
    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.user.attributes.insert(key.into(), value.into());
        self
    }

    /// Finish the user.
    pub fn build(self) -> User {
        self.user
    }
}

/// Credentials for signing in or creating an account.
#[derive(Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Credentials {
    /// Login address.
    pub email: String,
    /// Secret.
    pub password: String,
    /// Extra sign-up fields (name, invitation code, ...).
    #[cfg_attr(feature = "serde", serde(default, flatten))]
    pub attributes: BTreeMap<String, String>,
}

impl Credentials {
    /// Create credentials from a login and a password.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Add an extra field.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

// Keep the password out of logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("attributes", &self.attributes)
            .finish()
    }
}

/// The second half of a password reset: the emailed token plus the new secret.
#[derive(Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PasswordReset {
    /// Token from the reset email.
    pub token: String,
    /// New secret.
    pub password: String,
    /// Repetition of the new secret.
    pub password_confirmation: String,
}

impl PasswordReset {
    /// Create a reset request where the confirmation equals the password.
    pub fn new(token: impl Into<String>, password: impl Into<String>) -> Self {
        let password = password.into();
        Self {
            token: token.into(),
            password_confirmation: password.clone(),
            password,
        }
    }
}

impl std::fmt::Debug for PasswordReset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordReset")
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}

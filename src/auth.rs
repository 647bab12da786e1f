use std::fmt;

use serde::{Deserialize, Serialize};

/// A secret value (token or password) that never shows up in `Debug` output.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Token {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for Token {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(****)")
    }
}

/// Username + secret pair used to authenticate against GitHub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsernamePassword {
    pub username: String,
    pub password: Token,
}

/// The shape of a stored credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum CredentialKind {
    UsernamePassword(UsernamePassword),
    SecretText { secret: Token },
}

/// A credential as held by a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub id: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(flatten)]
    pub kind: CredentialKind,
}

impl Credential {
    pub fn username_password(&self) -> Option<&UsernamePassword> {
        match &self.kind {
            CredentialKind::UsernamePassword(pair) => Some(pair),
            CredentialKind::SecretText { .. } => None,
        }
    }
}

/// A source of stored credentials.
pub trait CredentialProvider {
    /// Human-readable store name, e.g. `global` or `folder:org/team`.
    fn name(&self) -> &str;

    fn credentials(&self) -> &[Credential];
}

/// In-memory credential store, global or bound to a folder.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    name: String,
    credentials: Vec<Credential>,
}

impl CredentialStore {
    pub fn new(name: impl Into<String>, credentials: Vec<Credential>) -> Self {
        Self {
            name: name.into(),
            credentials,
        }
    }
}

impl CredentialProvider for CredentialStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn credentials(&self) -> &[Credential] {
        &self.credentials
    }
}

/// A username/password credential together with the store it came from.
#[derive(Debug, Clone, Copy)]
pub struct ScopedCredential<'a> {
    pub store: &'a str,
    pub id: &'a str,
    pub description: Option<&'a str>,
    pub pair: &'a UsernamePassword,
}

/// Ordered list of credential providers, queried nearest scope first.
#[derive(Default)]
pub struct CredentialLookup {
    providers: Vec<Box<dyn CredentialProvider + Send + Sync>>,
}

impl CredentialLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a provider with lower priority than every provider already added.
    pub fn with_provider(mut self, provider: impl CredentialProvider + Send + Sync + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    /// First username/password credential with the given id, in provider order.
    ///
    /// A credential of another kind sharing the id does not stop the search.
    pub fn find_username_password(&self, id: &str) -> Option<&UsernamePassword> {
        self.username_passwords()
            .find(|scoped| scoped.id == id)
            .map(|scoped| scoped.pair)
    }

    /// All visible username/password credentials, nearest scope first.
    pub fn username_passwords(&self) -> impl Iterator<Item = ScopedCredential<'_>> {
        self.providers.iter().flat_map(|provider| {
            let store = provider.name();
            provider.credentials().iter().filter_map(move |credential| {
                credential.username_password().map(|pair| ScopedCredential {
                    store,
                    id: credential.id.as_str(),
                    description: credential.description.as_deref(),
                    pair,
                })
            })
        })
    }
}

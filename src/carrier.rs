//! Credential carrier abstraction.
//!
//! The grace credential travels as a named value on the request (a cookie
//! in the original deployment). The core only needs a readable key-value
//! view of the request; the concrete HTTP-framework header shape is an
//! adapter concern outside this crate.

use std::collections::HashMap;
use std::time::Duration;

/// Read access to the request's named credential values.
pub trait CredentialCarrier {
    /// Look up a credential value by name.
    fn get(&self, name: &str) -> Option<String>;
}

impl CredentialCarrier for HashMap<String, String> {
    fn get(&self, name: &str) -> Option<String> {
        HashMap::get(self, name).cloned()
    }
}

/// A carrier with no credentials at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyCarrier;

impl CredentialCarrier for EmptyCarrier {
    fn get(&self, _name: &str) -> Option<String> {
        None
    }
}

/// Carrier backed by a raw `Cookie` request header.
///
/// Adapters that only have the header string can wrap it directly instead
/// of building a map.
#[derive(Debug, Clone)]
pub struct CookieHeaderCarrier<'a> {
    header: &'a str,
}

impl<'a> CookieHeaderCarrier<'a> {
    /// Wrap a raw `Cookie` header value (`name=value; name2=value2`).
    pub fn new(header: &'a str) -> Self {
        Self { header }
    }
}

impl CredentialCarrier for CookieHeaderCarrier<'_> {
    fn get(&self, name: &str) -> Option<String> {
        self.header.split(';').find_map(|pair| {
            let (key, value) = pair.trim().split_once('=')?;
            (key == name).then(|| value.to_string())
        })
    }
}

/// `SameSite` attribute for issued credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    /// Sent on top-level navigations; the grace credential default.
    Lax,
    /// Never sent cross-site.
    Strict,
    /// Sent cross-site (requires `secure`).
    None,
}

/// Transport attributes for an issued credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialAttributes {
    /// Not readable from client-side script.
    pub http_only: bool,
    /// Only sent over TLS.
    pub secure: bool,
    /// Cross-site send policy.
    pub same_site: SameSite,
    /// Path scope.
    pub path: &'static str,
    /// Client-side lifetime. Zero instructs the client to drop the value.
    pub max_age: Duration,
}

/// A credential ready to be attached to a response by the HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedCredential {
    /// Name under which the value travels.
    pub name: &'static str,
    /// Opaque encoded value. Empty when clearing.
    pub value: String,
    /// Transport attributes.
    pub attributes: CredentialAttributes,
}

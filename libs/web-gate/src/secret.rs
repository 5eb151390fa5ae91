use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

const REDACTED: &str = "[REDACTED]";

/// Shared secret the gate compares credentials against.
///
/// An empty secret is the "authentication disabled" state. `Debug`,
/// `Display` and `Serialize` never reveal a configured value; on [`Drop`]
/// the backing buffer is zeroed.
#[derive(Default, Zeroize, ZeroizeOnDrop)]
pub struct GateSecret(String);

impl GateSecret {
    /// Create a secret from a plain value. An empty value disables the gate.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// `true` when no secret is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Compare a presented credential against the secret in constant time.
    ///
    /// An empty secret never matches; callers decide what an unset secret
    /// means before comparing.
    #[must_use]
    pub fn matches(&self, candidate: &str) -> bool {
        if self.0.is_empty() {
            return false;
        }
        // Unequal lengths yield 0 without an early exit.
        self.0.as_bytes().ct_eq(candidate.as_bytes()).into()
    }

    /// Read-only access to the underlying value.
    ///
    /// Callers must not log, store, or otherwise persist the returned slice.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl Clone for GateSecret {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl From<&str> for GateSecret {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for GateSecret {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Debug for GateSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("GateSecret(<unset>)")
        } else {
            f.write_str(REDACTED)
        }
    }
}

impl fmt::Display for GateSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl Serialize for GateSecret {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0.is_empty() {
            serializer.serialize_str("")
        } else {
            serializer.serialize_str(REDACTED)
        }
    }
}

impl<'de> Deserialize<'de> for GateSecret {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(SecretVisitor)
    }
}

/// Accepts strings only. A number would lose leading zeros or trailing
/// digits before it could be compared.
struct SecretVisitor;

impl Visitor<'_> for SecretVisitor {
    type Value = GateSecret;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a secret string")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<GateSecret, E> {
        Ok(GateSecret::new(value))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<GateSecret, E> {
        Ok(GateSecret(value))
    }

    fn visit_unit<E: de::Error>(self) -> Result<GateSecret, E> {
        Ok(GateSecret::default())
    }

    fn visit_none<E: de::Error>(self) -> Result<GateSecret, E> {
        Ok(GateSecret::default())
    }
}

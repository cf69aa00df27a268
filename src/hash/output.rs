//! QuickXorHash digest value and its text encodings
//!
//! Cloud storage services publish QuickXorHash values as standard base64,
//! so that is the canonical text form; hex is offered for tooling.

use super::quickxor::DIGEST_SIZE;
use crate::error::{QuickXorError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A finalized 20-byte QuickXorHash digest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct QuickXorDigest([u8; DIGEST_SIZE]);

impl QuickXorDigest {
    /// Raw digest bytes
    pub fn as_bytes(&self) -> &[u8; DIGEST_SIZE] {
        &self.0
    }

    /// Standard base64 with padding (28 characters)
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }

    /// Parse a standard base64 digest
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| QuickXorError::InvalidDigest(format!("{}: {}", encoded, e)))?;

        let bytes: [u8; DIGEST_SIZE] = bytes.try_into().map_err(|bytes: Vec<u8>| {
            QuickXorError::InvalidDigest(format!(
                "{}: expected {} bytes, got {}",
                encoded,
                DIGEST_SIZE,
                bytes.len()
            ))
        })?;

        Ok(Self(bytes))
    }

    /// Lowercase hex
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl From<[u8; DIGEST_SIZE]> for QuickXorDigest {
    fn from(bytes: [u8; DIGEST_SIZE]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for QuickXorDigest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for QuickXorDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_base64())
    }
}

impl FromStr for QuickXorDigest {
    type Err = QuickXorError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_base64(s)
    }
}

impl Serialize for QuickXorDigest {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base64())
    }
}

impl<'de> Deserialize<'de> for QuickXorDigest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        Self::from_base64(&encoded).map_err(serde::de::Error::custom)
    }
}

//! Commit-reveal answer hashing.
//!
//! Party 1 publishes [`answer_hash`]`(answer, salt)` before party 2 answers,
//! so party 2's choice cannot be conditioned on party 1's true answer; the
//! later reveal is checked against the committed digest. The hash function is
//! public so either party can verify a commitment off-band before risking
//! funds.

use color_eyre::eyre::eyre;
use serde::Deserialize;
use serde::Deserializer;
use sha2::Digest;
use sha2::Sha256;

/// SHA-256 over the answer byte (`1`/`0`) concatenated with the 32-byte salt.
///
/// Deterministic: same inputs always produce the same digest; a different
/// answer or a different salt produces a different digest with overwhelming
/// probability (collision resistance of the underlying primitive).
pub fn answer_hash(answer: bool, salt: &Salt) -> AnswerHash {
    let mut hasher = Sha256::new();
    hasher.update([u8::from(answer)]);
    hasher.update(salt.as_bytes());
    AnswerHash(hasher.finalize().into())
}

/// 32 bytes of party-1-chosen blinding data, hex on the wire.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Salt([u8; 32]);

impl Salt {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Display for Salt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl std::str::FromStr for Salt {
    type Err = color_eyre::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(decode_32_bytes(s, "salt")?))
    }
}

impl<'de> Deserialize<'de> for Salt {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserialize_via_from_str(deserializer)
    }
}

/// A commitment digest, hex on the wire.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AnswerHash([u8; 32]);

impl AnswerHash {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl std::fmt::Display for AnswerHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl std::str::FromStr for AnswerHash {
    type Err = color_eyre::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(decode_32_bytes(s, "hash")?))
    }
}

impl<'de> Deserialize<'de> for AnswerHash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserialize_via_from_str(deserializer)
    }
}

fn decode_32_bytes(s: &str, what: &str) -> color_eyre::Result<[u8; 32]> {
    let bytes = hex::decode(s)?;
    bytes
        .try_into()
        .map_err(|bytes: Vec<u8>| eyre!("{what} must be 32 bytes, got {}", bytes.len()))
}

fn deserialize_via_from_str<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: std::str::FromStr<Err = color_eyre::Report>,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(|error: color_eyre::Report| serde::de::Error::custom(error.to_string()))
}

//! Signed session tokens.
//!
//! A token is `"<issued_at_ms>:<hex hmac-sha256(issued_at_ms)>"`. The server
//! hands one out when a game starts and checks it when a high score comes
//! back, which bounds how fast a client can claim to have scored.

use std::{
    fmt,
    time::{SystemTime, UNIX_EPOCH},
};

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub(crate) enum SessionError {
    #[error("session secret is empty")]
    EmptySecret,
    #[error("session token is malformed")]
    Malformed,
    #[error("session token signature mismatch")]
    BadSignature,
}

pub(crate) fn now_unix_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis().min(u128::from(u64::MAX)) as u64)
        .unwrap_or(0)
}

/// Server-held HMAC key. Issues and checks session tokens.
#[derive(Clone)]
pub(crate) struct SessionKey {
    mac: HmacSha256,
}

impl fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionKey(..)")
    }
}

impl SessionKey {
    pub(crate) fn new(secret: &[u8]) -> Result<Self, SessionError> {
        if secret.is_empty() {
            return Err(SessionError::EmptySecret);
        }
        let mac = HmacSha256::new_from_slice(secret).map_err(|_| SessionError::EmptySecret)?;
        Ok(Self { mac })
    }

    fn sign(&self, message: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(message.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    pub(crate) fn issue_at(&self, issued_at_ms: u64) -> SessionToken {
        SessionToken {
            issued_at_ms,
            signature: self.sign(&issued_at_ms.to_string()),
        }
    }

    pub(crate) fn issue(&self) -> SessionToken {
        self.issue_at(now_unix_ms())
    }

    /// Checks the signature over the timestamp text exactly as sent, then
    /// parses the timestamp. Returns the issue time in unix milliseconds.
    pub(crate) fn verify(&self, token: &str) -> Result<u64, SessionError> {
        let (timestamp, signature) = token.split_once(':').ok_or(SessionError::Malformed)?;
        let expected = self.sign(timestamp);
        if !bool::from(expected.as_bytes().ct_eq(signature.as_bytes())) {
            return Err(SessionError::BadSignature);
        }
        timestamp.parse::<u64>().map_err(|_| SessionError::Malformed)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct SessionToken {
    pub(crate) issued_at_ms: u64,
    pub(crate) signature: String,
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.issued_at_ms, self.signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> SessionKey {
        SessionKey::new(b"service-role-secret").unwrap()
    }

    #[test]
    fn empty_secret_is_rejected() {
        assert_eq!(SessionKey::new(b"").unwrap_err(), SessionError::EmptySecret);
    }

    #[test]
    fn token_format_is_millis_colon_hex() {
        let token = key().issue_at(1_700_000_000_123).to_string();
        let (millis, sig) = token.split_once(':').unwrap();
        assert_eq!(millis, "1700000000123");
        assert_eq!(sig.len(), 64);
        assert!(sig.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn matches_reference_hmac_vector() {
        // RFC 4231 test case 2
        let key = SessionKey::new(b"Jefe").unwrap();
        assert_eq!(
            key.sign("what do ya want for nothing?"),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn verify_roundtrip() {
        let key = key();
        let token = key.issue_at(42_000).to_string();
        assert_eq!(key.verify(&token), Ok(42_000));
    }

    #[test]
    fn other_secret_does_not_verify() {
        let token = key().issue_at(42_000).to_string();
        let other = SessionKey::new(b"another-secret").unwrap();
        assert_eq!(other.verify(&token), Err(SessionError::BadSignature));
    }

    #[test]
    fn earlier_timestamp_cannot_reuse_signature() {
        let key = key();
        let token = key.issue_at(1_700_000_010_000);
        let forged = format!("1700000000000:{}", token.signature);
        assert_eq!(key.verify(&forged), Err(SessionError::BadSignature));
    }

    #[test]
    fn any_single_character_mutation_is_rejected() {
        let key = key();
        let token = key.issue_at(1_700_000_000_000);
        let sig: Vec<char> = token.signature.chars().collect();
        for idx in 0..sig.len() {
            let mut mutated = sig.clone();
            mutated[idx] = if sig[idx] == '0' { '1' } else { '0' };
            let mutated: String = mutated.into_iter().collect();
            let candidate = format!("{}:{mutated}", token.issued_at_ms);
            assert_eq!(key.verify(&candidate), Err(SessionError::BadSignature));
        }
    }

    #[test]
    fn uppercase_digest_is_not_accepted() {
        let key = key();
        let token = key.issue_at(5);
        let upper = format!("5:{}", token.signature.to_ascii_uppercase());
        assert_eq!(key.verify(&upper), Err(SessionError::BadSignature));
    }

    #[test]
    fn missing_separator_is_malformed() {
        assert_eq!(key().verify("1700000000000"), Err(SessionError::Malformed));
    }
}

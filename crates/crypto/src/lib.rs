//! Ed25519 verification of inbound interaction requests.
//!
//! The messaging platform signs every request with its application key. The
//! signed message is the `X-Signature-Timestamp` header value immediately
//! followed by the raw request body; the signature and public key are both
//! hex encoded.
//!
//! ```rust,no_run
//! use archivist_crypto::InteractionVerifier;
//!
//! let verifier = InteractionVerifier::from_hex("<64 hex chars>").unwrap();
//! let ok = verifier.is_valid(b"{\"type\":1}", "<128 hex chars>", "1700000000");
//! ```

use std::fmt;

use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use thiserror::Error;

/// Errors that can occur while verifying a request signature.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// The configured public key is not 32 hex-encoded bytes or is not a
    /// valid curve point.
    #[error("invalid public key: {0}")]
    InvalidKey(String),

    /// The signature header is not 64 hex-encoded bytes.
    #[error("malformed signature: {0}")]
    MalformedSignature(String),

    /// The signature does not match the timestamp and body.
    #[error("signature mismatch")]
    Mismatch,
}

/// Verifies interaction request signatures against a fixed public key.
#[derive(Clone)]
pub struct InteractionVerifier {
    key: VerifyingKey,
}

impl fmt::Debug for InteractionVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InteractionVerifier")
            .field("key", &hex::encode(self.key.as_bytes()))
            .finish()
    }
}

impl InteractionVerifier {
    /// Build a verifier from a hex-encoded 32-byte Ed25519 public key.
    pub fn from_hex(public_key: &str) -> Result<Self, VerifyError> {
        let bytes = decode_fixed::<32>(public_key.trim())
            .map_err(|e| VerifyError::InvalidKey(e.to_string()))?;
        let key = VerifyingKey::from_bytes(&bytes)
            .map_err(|e| VerifyError::InvalidKey(e.to_string()))?;
        Ok(Self { key })
    }

    /// Build a verifier from an already decoded key.
    pub fn new(key: VerifyingKey) -> Self {
        Self { key }
    }

    /// Verify `signature_hex` over `timestamp ‖ body`.
    pub fn verify(&self, body: &[u8], signature_hex: &str, timestamp: &str) -> Result<(), VerifyError> {
        let sig_bytes = decode_fixed::<64>(signature_hex.trim())
            .map_err(|e| VerifyError::MalformedSignature(e.to_string()))?;
        let signature = Signature::from_bytes(&sig_bytes);

        let mut message = Vec::with_capacity(timestamp.len() + body.len());
        message.extend_from_slice(timestamp.as_bytes());
        message.extend_from_slice(body);

        self.key
            .verify(&message, &signature)
            .map_err(|_| VerifyError::Mismatch)
    }

    /// Convenience wrapper returning `true` only for an authentic request.
    pub fn is_valid(&self, body: &[u8], signature_hex: &str, timestamp: &str) -> bool {
        self.verify(body, signature_hex, timestamp).is_ok()
    }
}

fn decode_fixed<const N: usize>(raw: &str) -> Result<[u8; N], String> {
    let decoded = hex::decode(raw).map_err(|e| e.to_string())?;
    <[u8; N]>::try_from(decoded.as_slice())
        .map_err(|_| format!("expected {N} bytes, got {}", decoded.len()))
}

#[cfg(test)]
mod tests {
    use ed25519_dalek::{Signer, SigningKey};

    use super::*;

    fn signing_key() -> SigningKey {
        SigningKey::from_bytes(&[7u8; 32])
    }

    fn verifier() -> InteractionVerifier {
        InteractionVerifier::from_hex(&hex::encode(signing_key().verifying_key().to_bytes()))
            .unwrap()
    }

    fn sign(timestamp: &str, body: &[u8]) -> String {
        let mut message = timestamp.as_bytes().to_vec();
        message.extend_from_slice(body);
        hex::encode(signing_key().sign(&message).to_bytes())
    }

    #[test]
    fn accepts_valid_signature() {
        let body = br#"{"type":1}"#;
        let sig = sign("1700000000", body);
        assert!(verifier().is_valid(body, &sig, "1700000000"));
    }

    #[test]
    fn rejects_tampered_body() {
        let sig = sign("1700000000", br#"{"type":1}"#);
        let err = verifier()
            .verify(br#"{"type":2}"#, &sig, "1700000000")
            .unwrap_err();
        assert!(matches!(err, VerifyError::Mismatch));
    }

    #[test]
    fn rejects_different_timestamp() {
        let body = br#"{"type":1}"#;
        let sig = sign("1700000000", body);
        assert!(!verifier().is_valid(body, &sig, "1700000001"));
    }

    #[test]
    fn rejects_malformed_signature() {
        let err = verifier().verify(b"{}", "not-hex", "1").unwrap_err();
        assert!(matches!(err, VerifyError::MalformedSignature(_)));

        let err = verifier().verify(b"{}", "abcd", "1").unwrap_err();
        assert!(matches!(err, VerifyError::MalformedSignature(_)));
    }

    #[test]
    fn rejects_bad_public_key() {
        let err = InteractionVerifier::from_hex("00ff").unwrap_err();
        assert!(matches!(err, VerifyError::InvalidKey(_)));
        assert!(InteractionVerifier::from_hex("zz").is_err());
    }
}

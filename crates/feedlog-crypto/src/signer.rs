use feedlog_types::{FeedId, Message};
use serde::{Deserialize, Serialize};

use crate::canonical::to_canonical_json_of;

/// Ed25519 signing key (private). Owns a feed.
pub struct SigningKey(ed25519_dalek::SigningKey);

/// Ed25519 verifying key (public). Its hex encoding is the feed id.
#[derive(Clone, PartialEq, Eq)]
pub struct VerifyingKey(ed25519_dalek::VerifyingKey);

/// Ed25519 signature, serialized as lowercase hex.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature(#[serde(with = "signature_hex")] ed25519_dalek::Signature);

impl SigningKey {
    /// Generate a new random signing key.
    pub fn generate() -> Self {
        let mut csprng = rand::thread_rng();
        Self(ed25519_dalek::SigningKey::generate(&mut csprng))
    }

    /// Create from raw 32-byte secret.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(ed25519_dalek::SigningKey::from_bytes(&bytes))
    }

    /// The corresponding public verifying key.
    pub fn verifying_key(&self) -> VerifyingKey {
        VerifyingKey(self.0.verifying_key())
    }

    /// Sign a message.
    pub fn sign(&self, message: &[u8]) -> Signature {
        use ed25519_dalek::Signer;
        Signature(self.0.sign(message))
    }

    /// Raw secret key bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.as_bytes()
    }
}

impl VerifyingKey {
    /// Verify a signature on a message.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> Result<(), SignatureError> {
        use ed25519_dalek::Verifier;
        self.0
            .verify(message, &signature.0)
            .map_err(|_| SignatureError::InvalidSignature)
    }

    /// The feed id owned by this key: its lowercase hex encoding.
    pub fn to_feed_id(&self) -> FeedId {
        // 64 hex characters always satisfy FeedId's rules.
        FeedId::new(self.to_hex()).unwrap_or_else(|_| unreachable!("hex key is a valid feed id"))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0.to_bytes())
    }

    /// Recover the key from a feed id produced by [`Self::to_feed_id`].
    pub fn from_feed_id(feed_id: &FeedId) -> Result<Self, SignatureError> {
        let bytes = hex::decode(feed_id.as_str()).map_err(|_| SignatureError::InvalidKey)?;
        let arr: [u8; 32] = bytes.try_into().map_err(|_| SignatureError::InvalidKey)?;
        Self::from_bytes(arr)
    }

    /// Raw public key bytes.
    pub fn as_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }

    /// Create from raw 32-byte public key.
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, SignatureError> {
        let key = ed25519_dalek::VerifyingKey::from_bytes(&bytes)
            .map_err(|_| SignatureError::InvalidKey)?;
        Ok(Self(key))
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SigningKey(<redacted>)")
    }
}

impl std::fmt::Debug for VerifyingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VerifyingKey({})", self.to_hex())
    }
}

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Signature({}...)", hex::encode(&self.0.to_bytes()[..8]))
    }
}

/// The signed part of a feed message.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedMessageBody {
    pub message: Message,
    pub message_number: u64,
    pub previous_signature: Option<Signature>,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
}

/// A message as returned by a watch with `signed = true`.
///
/// Each envelope signs the canonical JSON of its body, and each body names
/// the signature of the message before it, so a subfeed forms a chain.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SignedMessage {
    pub body: SignedMessageBody,
    pub signature: Signature,
}

impl SignedMessage {
    /// Sign `body` with the feed's key.
    pub fn sign(key: &SigningKey, body: SignedMessageBody) -> Result<Self, SignatureError> {
        let bytes = to_canonical_json_of(&body).map_err(|_| SignatureError::Encoding)?;
        let signature = key.sign(bytes.as_bytes());
        Ok(Self { body, signature })
    }

    /// Check the envelope signature against the feed's public key.
    pub fn verify(&self, key: &VerifyingKey) -> Result<(), SignatureError> {
        let bytes = to_canonical_json_of(&self.body).map_err(|_| SignatureError::Encoding)?;
        key.verify(bytes.as_bytes(), &self.signature)
    }

    /// Check that `self` directly follows `previous` in the same subfeed.
    pub fn follows(&self, previous: &SignedMessage) -> bool {
        self.body.message_number == previous.body.message_number + 1
            && self.body.previous_signature.as_ref() == Some(&previous.signature)
    }
}

/// Errors from signing operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("invalid key")]
    InvalidKey,
    #[error("message body cannot be encoded")]
    Encoding,
}

mod signature_hex {
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(sig: &ed25519_dalek::Signature, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(sig.to_bytes()))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<ed25519_dalek::Signature, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(&s).map_err(serde::de::Error::custom)?;
        let arr: [u8; 64] = bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("expected 64-byte signature"))?;
        Ok(ed25519_dalek::Signature::from_bytes(&arr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(n: u64, previous: Option<Signature>) -> SignedMessageBody {
        SignedMessageBody {
            message: json!({"n": n}),
            message_number: n,
            previous_signature: previous,
            timestamp: 1_700_000_000_000 + n,
        }
    }

    #[test]
    fn sign_and_verify() {
        let sk = SigningKey::generate();
        let vk = sk.verifying_key();
        let sig = sk.sign(b"hello world");
        assert!(vk.verify(b"hello world", &sig).is_ok());
        assert!(vk.verify(b"wrong message", &sig).is_err());
    }

    #[test]
    fn verify_fails_with_wrong_key() {
        let sk1 = SigningKey::generate();
        let sk2 = SigningKey::generate();
        let sig = sk1.sign(b"message");
        assert!(sk2.verifying_key().verify(b"message", &sig).is_err());
    }

    #[test]
    fn feed_id_roundtrips_through_key() {
        let vk = SigningKey::generate().verifying_key();
        let id = vk.to_feed_id();
        assert_eq!(id.as_str().len(), 64);
        assert_eq!(VerifyingKey::from_feed_id(&id).unwrap(), vk);
    }

    #[test]
    fn non_key_feed_id_rejected() {
        let id = FeedId::new("not-a-key").unwrap();
        assert_eq!(VerifyingKey::from_feed_id(&id), Err(SignatureError::InvalidKey));
    }

    #[test]
    fn from_bytes_roundtrip() {
        let sk = SigningKey::generate();
        let sk2 = SigningKey::from_bytes(*sk.as_bytes());
        assert_eq!(sk.verifying_key(), sk2.verifying_key());
    }

    #[test]
    fn signature_serializes_as_hex() {
        let sig = SigningKey::generate().sign(b"test");
        let json = serde_json::to_value(&sig).unwrap();
        assert_eq!(json.as_str().map(str::len), Some(128));
        let parsed: Signature = serde_json::from_value(json).unwrap();
        assert_eq!(sig, parsed);
    }

    #[test]
    fn signed_envelope_verifies_and_chains() {
        let sk = SigningKey::generate();
        let vk = sk.verifying_key();
        let first = SignedMessage::sign(&sk, body(0, None)).unwrap();
        let second = SignedMessage::sign(&sk, body(1, Some(first.signature.clone()))).unwrap();
        assert!(first.verify(&vk).is_ok());
        assert!(second.verify(&vk).is_ok());
        assert!(second.follows(&first));
        assert!(!first.follows(&second));
    }

    #[test]
    fn tampered_envelope_fails() {
        let sk = SigningKey::generate();
        let mut env = SignedMessage::sign(&sk, body(0, None)).unwrap();
        env.body.message = json!({"n": 99});
        assert_eq!(
            env.verify(&sk.verifying_key()),
            Err(SignatureError::InvalidSignature)
        );
    }

    #[test]
    fn envelope_wire_shape() {
        let sk = SigningKey::generate();
        let env = SignedMessage::sign(&sk, body(3, None)).unwrap();
        let v = serde_json::to_value(&env).unwrap();
        assert_eq!(v["body"]["messageNumber"], 3);
        assert!(v["body"]["previousSignature"].is_null());
        assert!(v["signature"].is_string());
    }

    #[test]
    fn debug_redacts_signing_key() {
        let sk = SigningKey::generate();
        assert!(format!("{sk:?}").contains("redacted"));
    }
}

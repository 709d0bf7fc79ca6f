use feedlog_types::{SubfeedHash, SubfeedName};

use crate::hasher::ContentHasher;

/// Derive the hash that identifies a subfeed on the wire.
///
/// - `~<hash>` names carry their hash literally.
/// - Other text names hash their UTF-8 bytes.
/// - Structured names hash their canonical JSON encoding.
///
/// Pure: the same name always yields the same hash.
pub fn derive_subfeed_hash(name: &SubfeedName) -> SubfeedHash {
    if let Some(literal) = name.literal_hash() {
        return SubfeedHash::from_literal(literal);
    }
    let digest = match name {
        SubfeedName::Text(s) => ContentHasher::hash_str(s),
        SubfeedName::Structured(v) => ContentHasher::hash_json(v),
    };
    SubfeedHash::from_digest(&digest)
}

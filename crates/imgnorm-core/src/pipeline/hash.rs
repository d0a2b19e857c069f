//! BLAKE3 content hashing for logos and batch cache keys.

use blake3::Hasher as Blake3Hasher;

use crate::config::ProcessingConfig;
use crate::types::InputItem;

/// Content hashing helpers.
pub struct Hasher;

impl Hasher {
    /// BLAKE3 hash of an in-memory byte buffer, hex encoded.
    pub fn content_hash(data: &[u8]) -> String {
        let mut hasher = Blake3Hasher::new();
        hasher.update(data);
        hasher.finalize().to_hex().to_string()
    }

    /// Cache key for a whole batch.
    ///
    /// Covers every item's name and bytes in order, the serialized transform
    /// chain, the logo fingerprint and the item cap. Fields are length
    /// prefixed so adjacent values cannot run into each other.
    pub fn batch_key(
        items: &[InputItem],
        config: &ProcessingConfig,
        max_items: usize,
    ) -> Result<String, serde_json::Error> {
        let mut hasher = Blake3Hasher::new();
        let settings = serde_json::to_vec(config)?;
        update_framed(&mut hasher, &settings);

        let logo_hash = config
            .logo_image
            .as_ref()
            .map(|logo| logo.content_hash())
            .unwrap_or("");
        update_framed(&mut hasher, logo_hash.as_bytes());

        hasher.update(&(max_items as u64).to_le_bytes());
        hasher.update(&(items.len() as u64).to_le_bytes());
        for item in items {
            update_framed(&mut hasher, item.name.as_bytes());
            update_framed(&mut hasher, &item.bytes);
        }
        Ok(hasher.finalize().to_hex().to_string())
    }
}

fn update_framed(hasher: &mut Blake3Hasher, data: &[u8]) {
    hasher.update(&(data.len() as u64).to_le_bytes());
    hasher.update(data);
}

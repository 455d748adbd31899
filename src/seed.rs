//! Seed derivation and content hashing using BLAKE3

use crate::types::{CasePath, Hash, Seed};
use blake3::Hasher;

const SEED_DOMAIN: &[u8] = b"casegen:seed:v1";

/// Compute the seed of a generated testcase
///
/// Seed = hash("casegen:seed:v1" || len || group path || len || name || len || raw command || len || salt)
///
/// Every field is length-prefixed (8 bytes, big-endian), so moving text between
/// fields always changes the digest. The raw command is hashed before placeholder
/// substitution, which makes `{seed}` and `{seed:01}` distinct inputs. The salt is
/// hashed as written; "1.0" and "1.00" are different salts.
pub fn derive_seed(group: &CasePath, name: &str, raw_command: &str, salt: &str) -> Seed {
    let mut hasher = Hasher::new();
    hasher.update(SEED_DOMAIN);
    update_field(&mut hasher, group.as_str().as_bytes());
    update_field(&mut hasher, name.as_bytes());
    update_field(&mut hasher, raw_command.as_bytes());
    update_field(&mut hasher, salt.as_bytes());

    let digest = hasher.finalize();
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest.as_bytes()[..8]);
    Seed::new((u64::from_be_bytes(prefix) % Seed::MODULUS) as u32)
}

pub(crate) fn update_field(hasher: &mut Hasher, bytes: &[u8]) {
    hasher.update(&(bytes.len() as u64).to_be_bytes());
    hasher.update(bytes);
}

/// Compute content hash for artifact or program bytes
pub fn compute_content_hash(content: &[u8]) -> Hash {
    *blake3::hash(content).as_bytes()
}

/// Hex form of [`compute_content_hash`], used in cache keys and fingerprints
pub fn content_fingerprint(content: &[u8]) -> String {
    hex::encode(compute_content_hash(content))
}

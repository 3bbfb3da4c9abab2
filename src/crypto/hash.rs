//! Blake2b-224 hashes used for credentials

use pallas_crypto::hash::Hasher;

/// Length of a key hash or script hash in bytes
pub const CREDENTIAL_HASH_LEN: usize = 28;

/// Hash of an Ed25519 verification key (a "public key hash").
pub fn key_hash(verification_key: &[u8; 32]) -> [u8; CREDENTIAL_HASH_LEN] {
    let hash = Hasher::<224>::hash(verification_key);
    let mut out = [0u8; CREDENTIAL_HASH_LEN];
    out.copy_from_slice(hash.as_ref());
    out
}

/// Hash of a Plutus script: blake2b-224 over the language tag byte followed by the
/// compiled code exactly as it appears in the blueprint.
pub fn script_hash(language_tag: u8, compiled_code: &[u8]) -> [u8; CREDENTIAL_HASH_LEN] {
    let hash = Hasher::<224>::hash_tagged(compiled_code, language_tag);
    let mut out = [0u8; CREDENTIAL_HASH_LEN];
    out.copy_from_slice(hash.as_ref());
    out
}

/// Parses a hex key hash, accepting an optional `0x` prefix.
pub fn parse_key_hash(input: &str) -> anyhow::Result<[u8; CREDENTIAL_HASH_LEN]> {
    let trimmed = input.trim();
    let stripped = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    let bytes = hex::decode(stripped)
        .map_err(|e| anyhow::anyhow!("Key hash '{}' is not valid hex: {}", input, e))?;
    if bytes.len() != CREDENTIAL_HASH_LEN {
        anyhow::bail!(
            "Invalid key hash length: expected {} bytes, got {}",
            CREDENTIAL_HASH_LEN,
            bytes.len()
        );
    }
    let mut out = [0u8; CREDENTIAL_HASH_LEN];
    out.copy_from_slice(&bytes);
    Ok(out)
}

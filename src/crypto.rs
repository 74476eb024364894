// src/crypto.rs
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use sha2::{Digest, Sha256};

/// Sign `payload` with an ed25519 secret key, returning the 64 raw signature bytes.
pub fn sign(key: &SigningKey, payload: &[u8]) -> Vec<u8> {
    key.sign(payload).to_bytes().to_vec()
}

/// Verify ed25519 signature bytes against `owner`.
/// Returns false on invalid lengths as well as on a failed check.
pub fn verify_signature(owner: &VerifyingKey, payload: &[u8], signature: &[u8]) -> bool {
    let sig_array: [u8; 64] = match signature.try_into() {
        Ok(arr) => arr,
        Err(_) => return false,
    };
    let signature = Signature::from_bytes(&sig_array);

    owner.verify(payload, &signature).is_ok()
}

pub fn sha256(bytes: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher.finalize().into()
}

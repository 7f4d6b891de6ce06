//! AES-256-EAX with arbitrary-length nonces.
//!
//! Beacon reports authenticate under EAX with an 8-byte nonce built from
//! curve-point coordinates. The RustCrypto `eax` crate pins the nonce length
//! to the cipher block size, so the mode is composed here from its CMAC and
//! CTR primitives: N = OMAC⁰(nonce), H = OMAC¹(header), C = OMAC²(ciphertext),
//! tag = N ⊕ H ⊕ C, with CTR keyed on N.

use aes::Aes256;
use cmac::{Cmac, Mac};
use ctr::cipher::{KeyIvInit, StreamCipher};
use subtle::ConstantTimeEq;

use crate::error::DecryptError;

use super::aes::TAG_LEN;

type Ctr = ctr::Ctr128BE<Aes256>;

/// OMAC with the EAX domain-separation prefix: CMAC(K, [t]₁₂₈ ‖ data).
fn omac(key: &[u8; 32], tweak: u8, data: &[u8]) -> [u8; TAG_LEN] {
    let mut prefix = [0u8; TAG_LEN];
    prefix[TAG_LEN - 1] = tweak;

    let mut mac =
        Cmac::<Aes256>::new_from_slice(key).expect("32 bytes is a valid AES-256 key");
    mac.update(&prefix);
    mac.update(data);
    mac.finalize().into_bytes().into()
}

/// Verify the detached `tag`, then decrypt `ciphertext`. There is no
/// associated data in this protocol.
pub(crate) fn decrypt(
    key: &[u8; 32],
    nonce: &[u8],
    ciphertext: &[u8],
    tag: &[u8],
) -> Result<Vec<u8>, DecryptError> {
    let n = omac(key, 0, nonce);
    let h = omac(key, 1, &[]);
    let c = omac(key, 2, ciphertext);

    let mut expected = [0u8; TAG_LEN];
    for (i, byte) in expected.iter_mut().enumerate() {
        *byte = n[i] ^ h[i] ^ c[i];
    }

    if expected.ct_eq(tag).unwrap_u8() == 0 {
        return Err(DecryptError::AuthenticationFailure);
    }

    let mut plaintext = ciphertext.to_vec();
    let mut cipher = Ctr::new(key.into(), (&n).into());
    cipher.apply_keystream(&mut plaintext);

    Ok(plaintext)
}

/// Inverse of [`decrypt`], used to construct test fixtures.
#[cfg(test)]
pub(crate) fn encrypt(key: &[u8; 32], nonce: &[u8], plaintext: &[u8]) -> (Vec<u8>, [u8; TAG_LEN]) {
    let n = omac(key, 0, nonce);

    let mut ciphertext = plaintext.to_vec();
    let mut cipher = Ctr::new(key.into(), (&n).into());
    cipher.apply_keystream(&mut ciphertext);

    let h = omac(key, 1, &[]);
    let c = omac(key, 2, &ciphertext);

    let mut tag = [0u8; TAG_LEN];
    for (i, byte) in tag.iter_mut().enumerate() {
        *byte = n[i] ^ h[i] ^ c[i];
    }

    (ciphertext, tag)
}

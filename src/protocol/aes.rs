use aes::cipher::{block_padding::NoPadding, BlockDecryptMut, KeyIvInit};
use aes_gcm::{aead::Aead, Aes256Gcm, KeyInit, Nonce};
use sha2::{Digest, Sha256};

use crate::error::DecryptError;

/// Nonce length of the GCM arms of this protocol.
pub(crate) const GCM_NONCE_LEN: usize = 12;
/// Detached AEAD tag length, shared by the GCM and EAX arms.
pub(crate) const TAG_LEN: usize = 16;

type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;
type Aes192CbcDec = cbc::Decryptor<aes::Aes192>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Coerce arbitrary-length key material to a valid AES key size.
///
/// Inputs that are already 16, 24, or 32 bytes pass through unchanged;
/// anything else is replaced by its SHA-256 digest.
pub fn normalize_aes_key(key: &[u8]) -> Vec<u8> {
    match key.len() {
        16 | 24 | 32 => key.to_vec(),
        _ => Sha256::digest(key).to_vec(),
    }
}

/// AES-CBC decryption without unpadding. The ciphertext is already
/// block-aligned, so the output length equals the input length.
pub(crate) fn decrypt_cbc_no_padding(
    key: &[u8],
    iv: &[u8],
    ciphertext: &[u8],
) -> Result<Vec<u8>, DecryptError> {
    let mut buffer = ciphertext.to_vec();

    match key.len() {
        16 => {
            Aes128CbcDec::new_from_slices(key, iv)
                .map_err(|_| DecryptError::InvalidCipherSetup)?
                .decrypt_padded_mut::<NoPadding>(&mut buffer)
                .map_err(|_| DecryptError::InvalidCipherSetup)?;
        }
        24 => {
            Aes192CbcDec::new_from_slices(key, iv)
                .map_err(|_| DecryptError::InvalidCipherSetup)?
                .decrypt_padded_mut::<NoPadding>(&mut buffer)
                .map_err(|_| DecryptError::InvalidCipherSetup)?;
        }
        32 => {
            Aes256CbcDec::new_from_slices(key, iv)
                .map_err(|_| DecryptError::InvalidCipherSetup)?
                .decrypt_padded_mut::<NoPadding>(&mut buffer)
                .map_err(|_| DecryptError::InvalidCipherSetup)?;
        }
        _ => return Err(DecryptError::InvalidCipherSetup),
    }

    Ok(buffer)
}

/// AES-256-GCM decryption of a `nonce ‖ ciphertext ‖ tag` buffer, the shape
/// both the 60-byte EIK arm and direct location reports use.
pub(crate) fn decrypt_gcm(key: &[u8], data: &[u8]) -> Result<Vec<u8>, DecryptError> {
    if data.len() < GCM_NONCE_LEN + TAG_LEN {
        return Err(DecryptError::MalformedPayload);
    }

    let (nonce, ciphertext) = data.split_at(GCM_NONCE_LEN);
    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| DecryptError::InvalidCipherSetup)?;

    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| DecryptError::AuthenticationFailure)
}

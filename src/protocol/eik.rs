//! The per-device encrypted identity key (EIK).

use core::fmt;

use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::DecryptError;

use super::aes::{decrypt_cbc_no_padding, decrypt_gcm, normalize_aes_key};

/// The decrypted 32-byte identity key.
///
/// Valid only for the device update it was extracted from: it is a function
/// of (owner key, encrypted identity key) and must be derived fresh per
/// update. The core never caches one; caching, if wanted, is caller policy.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct IdentityKey([u8; 32]);

impl IdentityKey {
    /// The raw key bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// SHA-256 of the key: the AEAD key for direct (own) reports.
    pub(crate) fn direct_report_key(&self) -> [u8; 32] {
        Sha256::digest(self.0).into()
    }
}

impl From<[u8; 32]> for IdentityKey {
    fn from(value: [u8; 32]) -> Self {
        Self(value)
    }
}

impl fmt::Debug for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("IdentityKey(..)")
    }
}

/// An encrypted identity key, already length-validated.
///
/// The ciphertext length is the sole dispatch signal between the two
/// schemes; parsing happens once, at the boundary, instead of re-checking
/// lengths inside the decryption logic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EikCiphertext {
    /// 48 bytes: a 16-byte IV followed by 32 bytes of AES-CBC ciphertext,
    /// no padding.
    Cbc([u8; 48]),
    /// 60 bytes: a 12-byte nonce, 32 bytes of ciphertext, and a 16-byte GCM
    /// tag.
    Gcm([u8; 60]),
}

impl TryFrom<&[u8]> for EikCiphertext {
    type Error = DecryptError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        if let Ok(array) = TryInto::<[u8; 48]>::try_into(value) {
            Ok(EikCiphertext::Cbc(array))
        } else if let Ok(array) = TryInto::<[u8; 60]>::try_into(value) {
            Ok(EikCiphertext::Gcm(array))
        } else {
            Err(DecryptError::InvalidKeyLength(value.len()))
        }
    }
}

impl EikCiphertext {
    /// Decrypt with the account owner key.
    ///
    /// The CBC arm normalizes the owner key to a valid AES key size first;
    /// the GCM arm uses it directly as a 32-byte key. The asymmetry is the
    /// protocol's, not an oversight.
    pub fn decrypt(&self, owner_key: &[u8]) -> Result<IdentityKey, DecryptError> {
        let plaintext = match self {
            EikCiphertext::Cbc(data) => {
                let (iv, ciphertext) = data.split_at(16);
                let key = normalize_aes_key(owner_key);
                decrypt_cbc_no_padding(&key, iv, ciphertext)?
            }
            EikCiphertext::Gcm(data) => decrypt_gcm(owner_key, data)?,
        };

        let key: [u8; 32] = plaintext
            .try_into()
            .map_err(|_| DecryptError::MalformedPayload)?;

        Ok(IdentityKey(key))
    }
}

/// Decrypt an encrypted identity key of unvalidated length.
pub fn decrypt_eik(owner_key: &[u8], encrypted_eik: &[u8]) -> Result<IdentityKey, DecryptError> {
    EikCiphertext::try_from(encrypted_eik)?.decrypt(owner_key)
}

#[cfg(test)]
mod tests {
    use super::*;

    use aes::cipher::{block_padding::NoPadding, BlockEncryptMut, KeyIvInit};
    use aes_gcm::{aead::Aead, Aes256Gcm, KeyInit, Nonce};

    fn cbc_eik(owner_key: &[u8], iv: [u8; 16], identity_key: &[u8; 32]) -> Vec<u8> {
        let key = normalize_aes_key(owner_key);
        let ciphertext = cbc::Encryptor::<aes::Aes256>::new_from_slices(&key, &iv)
            .unwrap()
            .encrypt_padded_vec_mut::<NoPadding>(identity_key);

        let mut eik = iv.to_vec();
        eik.extend(ciphertext);
        eik
    }

    fn gcm_eik(owner_key: &[u8; 32], nonce: [u8; 12], identity_key: &[u8; 32]) -> Vec<u8> {
        let cipher = Aes256Gcm::new(owner_key.into());
        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce), identity_key.as_slice())
            .unwrap();

        let mut eik = nonce.to_vec();
        eik.extend(ciphertext);
        eik
    }

    #[test]
    fn test_invalid_lengths_fail_before_any_crypto() {
        for len in [0, 47, 49, 59, 61] {
            let result = decrypt_eik(b"owner key", &vec![0u8; len]);
            assert_eq!(result, Err(DecryptError::InvalidKeyLength(len)));
        }
    }

    #[test]
    fn test_length_dispatch() {
        assert!(matches!(
            EikCiphertext::try_from([0u8; 48].as_slice()),
            Ok(EikCiphertext::Cbc(_))
        ));
        assert!(matches!(
            EikCiphertext::try_from([0u8; 60].as_slice()),
            Ok(EikCiphertext::Gcm(_))
        ));
    }

    #[test]
    fn test_cbc_round_trip_with_normalized_owner_key() {
        // 13 bytes, so the CBC arm must normalize through SHA-256.
        let owner_key = b"correct horse";
        let identity_key = [0x5A; 32];

        let eik = cbc_eik(owner_key, [0x10; 16], &identity_key);
        assert_eq!(eik.len(), 48);

        let decrypted = decrypt_eik(owner_key, &eik).unwrap();
        assert_eq!(decrypted.as_bytes(), &identity_key);
    }

    #[test]
    fn test_cbc_round_trip_with_random_keys() {
        use rand::RngCore;

        // 20 bytes is not a valid AES key size, so normalization kicks in.
        let mut owner_key = [0u8; 20];
        rand::rngs::OsRng.fill_bytes(&mut owner_key);
        let mut identity_key = [0u8; 32];
        rand::rngs::OsRng.fill_bytes(&mut identity_key);

        let eik = cbc_eik(&owner_key, [0x00; 16], &identity_key);
        let decrypted = decrypt_eik(&owner_key, &eik).unwrap();
        assert_eq!(decrypted.as_bytes(), &identity_key);
    }

    #[test]
    fn test_gcm_round_trip() {
        let owner_key = [0x77; 32];
        let identity_key = [0x5A; 32];

        let eik = gcm_eik(&owner_key, [0x20; 12], &identity_key);
        assert_eq!(eik.len(), 60);

        let decrypted = decrypt_eik(&owner_key, &eik).unwrap();
        assert_eq!(decrypted.as_bytes(), &identity_key);
    }

    #[test]
    fn test_gcm_owner_key_is_not_normalized() {
        // A 13-byte owner key can never form the AES-256-GCM cipher; the GCM
        // arm must refuse rather than hash it into shape.
        let eik = gcm_eik(&[0x77; 32], [0x20; 12], &[0x5A; 32]);
        let result = decrypt_eik(b"correct horse", &eik);
        assert_eq!(result, Err(DecryptError::InvalidCipherSetup));
    }

    #[test]
    fn test_gcm_tag_tamper_fails() {
        let owner_key = [0x77; 32];
        let mut eik = gcm_eik(&owner_key, [0x20; 12], &[0x5A; 32]);

        let last = eik.len() - 1;
        eik[last] ^= 0x01;

        assert_eq!(
            decrypt_eik(&owner_key, &eik),
            Err(DecryptError::AuthenticationFailure)
        );
    }
}

//! Rolling-key reconstruction for beacon (crowd-sourced) reports.
//!
//! A tracker derives its current public curve point from the identity key and
//! a coarse time counter. Nearby finder devices encrypt their observations
//! against that point, so decrypting a beacon report means re-deriving the
//! same scalar from the same inputs, recovering the finder's point from the
//! x-coordinate in the report, and meeting in the middle with a key
//! agreement.

use aes::cipher::{generic_array::GenericArray, BlockEncrypt, KeyInit};
use aes::Aes256;
use hkdf::Hkdf;
use num_bigint::BigUint;
use sha2::Sha256;

use crate::error::DecryptError;

use super::curve::{secp160r1, to_fixed_bytes, Point, COORDINATE_LEN};

/// Number of low timestamp bits zeroed before key derivation. Buckets time
/// into 1024-second windows, matching the tracker's rotation period.
const TIME_MASK_BITS: u32 = 10;

/// Key material for one beacon report's AEAD decryption.
pub(crate) struct RollingSession {
    /// 32-byte AES-EAX key from the key agreement.
    pub(crate) shared_key: [u8; 32],
    /// 8-byte nonce: last 4 bytes of R.x followed by last 4 bytes of S.x.
    pub(crate) nonce: [u8; 8],
}

/// Zero the low `k` bits of `timestamp` and encode it big-endian.
pub(crate) fn mask_timestamp(timestamp: u32, k: u32) -> [u8; 4] {
    let mask = !((1u32 << k) - 1);
    (timestamp & mask).to_be_bytes()
}

/// The 32-byte block fed to AES when regenerating the rolling scalar: two
/// structurally identical 16-byte halves, domain-separated by the 0xFF
/// prefix of the first.
pub(crate) fn build_counter_block(ts_bytes: [u8; 4], k: u8) -> [u8; 32] {
    let mut block = [0u8; 32];
    block[..11].fill(0xFF);
    block[11] = k;
    block[12..16].copy_from_slice(&ts_bytes);
    // bytes 16..27 stay zero
    block[27] = k;
    block[28..32].copy_from_slice(&ts_bytes);
    block
}

/// Regenerate the scalar the tracker used for its rolling key at
/// `timestamp`: AES-256-ECB over the counter block, reduced mod the curve
/// order.
pub(crate) fn calculate_r(identity_key: &[u8; 32], timestamp: u32) -> BigUint {
    let ts_bytes = mask_timestamp(timestamp, TIME_MASK_BITS);
    let mut block = build_counter_block(ts_bytes, TIME_MASK_BITS as u8);

    let cipher = Aes256::new(identity_key.into());
    for half in block.chunks_exact_mut(16) {
        cipher.encrypt_block(GenericArray::from_mut_slice(half));
    }

    BigUint::from_bytes_be(&block) % &secp160r1().n
}

/// Derive the AEAD key and nonce for one beacon report.
///
/// `sx_bytes` is the big-endian x-coordinate supplied in the report;
/// `timestamp` is the beacon time counter the report was encrypted under.
pub(crate) fn derive_session(
    identity_key: &[u8; 32],
    sx_bytes: &[u8],
    timestamp: u32,
) -> Result<RollingSession, DecryptError> {
    let curve = secp160r1();

    let r = calculate_r(identity_key, timestamp);

    let sx = BigUint::from_bytes_be(sx_bytes);
    let sy = curve.recover_y(&sx)?;
    let s = Point { x: sx, y: sy };

    // T = r·S; only its x-coordinate feeds the KDF.
    let t = curve.scalar_mul(&r, &s).ok_or(DecryptError::NotOnCurve)?;

    let mut shared_key = [0u8; 32];
    Hkdf::<Sha256>::new(None, &t.x.to_bytes_be())
        .expand(&[], &mut shared_key)
        .expect("32 bytes is a valid HKDF-SHA256 output length");

    // R = r·G, the tracker's own rolling public point.
    let rolling_point = curve.scalar_mul(&r, &curve.g).ok_or(DecryptError::NotOnCurve)?;

    let rx = to_fixed_bytes(&rolling_point.x);
    let sx_fixed = to_fixed_bytes(&s.x);

    let mut nonce = [0u8; 8];
    nonce[..4].copy_from_slice(&rx[COORDINATE_LEN - 4..]);
    nonce[4..].copy_from_slice(&sx_fixed[COORDINATE_LEN - 4..]);

    Ok(RollingSession { shared_key, nonce })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_timestamp_zeroes_low_bits() {
        assert_eq!(mask_timestamp(0x1234_5678, 10), 0x1234_5400u32.to_be_bytes());
        assert_eq!(mask_timestamp(0x1234_5678, 0), 0x1234_5678u32.to_be_bytes());
    }

    #[test]
    fn test_counter_block_layout() {
        let ts_bytes = [0x00, 0x01, 0x02, 0x03];
        let k = 0xAA;
        let block = build_counter_block(ts_bytes, k);

        assert_eq!(block[..11], [0xFF; 11]);
        assert_eq!(block[11], k);
        assert_eq!(block[12..16], ts_bytes);
        assert_eq!(block[16..27], [0x00; 11]);
        assert_eq!(block[27], k);
        assert_eq!(block[28..32], ts_bytes);
    }

    #[test]
    fn test_calculate_r_is_deterministic() {
        let identity_key = [0x42; 32];
        let timestamp = 1_700_000_000;

        assert_eq!(
            calculate_r(&identity_key, timestamp),
            calculate_r(&identity_key, timestamp)
        );
    }

    #[test]
    fn test_calculate_r_collapses_low_timestamp_bits() {
        let identity_key = [0x42; 32];
        let bucket_start = 1_700_000_000u32 & !0x3FF;

        let r = calculate_r(&identity_key, bucket_start);
        assert_eq!(r, calculate_r(&identity_key, bucket_start | 0x3FF));
        assert_ne!(r, calculate_r(&identity_key, bucket_start + 0x400));
    }

    #[test]
    fn test_calculate_r_depends_on_identity_key() {
        let timestamp = 1_700_000_000;
        assert_ne!(
            calculate_r(&[0x01; 32], timestamp),
            calculate_r(&[0x02; 32], timestamp)
        );
    }

    #[test]
    fn test_derive_session_rejects_invalid_x() {
        // Scan for an x with no matching curve point rather than hard-coding
        // one.
        let curve = secp160r1();
        let bad_x = (2u32..40)
            .find(|x| curve.recover_y(&BigUint::from(*x)).is_err())
            .expect("range contains a non-residue");

        let result = derive_session(&[0x42; 32], &bad_x.to_be_bytes(), 1_700_000_000);
        assert!(matches!(result, Err(DecryptError::NotOnCurve)));
    }
}

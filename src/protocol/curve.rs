//! Minimal affine arithmetic on secp160r1.
//!
//! Trackers roll their public identifier on this 160-bit SECG curve
//! (y² = x³ − 3x + b over GF(p), cofactor 1). Only the handful of operations
//! the protocol needs are implemented, directly over big integers, so the
//! crate's contract does not lean on any particular EC library's API shape.

use std::sync::OnceLock;

use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::error::DecryptError;

/// Width of a serialized secp160r1 coordinate.
pub(crate) const COORDINATE_LEN: usize = 20;

/// An affine curve point. The point at infinity is represented as `None` in
/// the operations below.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Point {
    pub(crate) x: BigUint,
    pub(crate) y: BigUint,
}

/// The secp160r1 domain parameters: field prime, curve constant b, base
/// point, and group order. a = −3 is baked into the formulas.
pub(crate) struct Secp160r1 {
    pub(crate) p: BigUint,
    pub(crate) b: BigUint,
    pub(crate) g: Point,
    pub(crate) n: BigUint,
}

/// The shared curve instance. Parameters are public constants, so a single
/// lazily-built copy serves every thread.
pub(crate) fn secp160r1() -> &'static Secp160r1 {
    static CURVE: OnceLock<Secp160r1> = OnceLock::new();
    CURVE.get_or_init(|| Secp160r1 {
        p: biguint("ffffffffffffffffffffffffffffffff7fffffff"),
        b: biguint("1c97befc54bd7a8b65acf89f81d4d4adc565fa45"),
        g: Point {
            x: biguint("4a96b5688ef573284664698968c38bb913cbfc82"),
            y: biguint("23a628553168947d59dcc912042351377ac5fb32"),
        },
        n: biguint("0100000000000000000001f4c8f927aed3ca752257"),
    })
}

fn biguint(hex: &str) -> BigUint {
    BigUint::parse_bytes(hex.as_bytes(), 16).expect("curve constants are valid hex")
}

/// a − b mod p, for operands already reduced below p.
fn mod_sub(a: &BigUint, b: &BigUint, p: &BigUint) -> BigUint {
    ((a + p) - b) % p
}

impl Secp160r1 {
    /// a⁻¹ mod p via Fermat's little theorem; p is prime.
    fn mod_inv(&self, a: &BigUint) -> BigUint {
        a.modpow(&(&self.p - 2u8), &self.p)
    }

    /// Recover the even-parity y-coordinate for `x`.
    ///
    /// Computes rhs = x³ − 3x + b mod p and a candidate root rhs^((p+1)/4)
    /// (valid because p ≡ 3 mod 4), then verifies the root. The even root is
    /// the canonical one in this protocol; the odd candidate is replaced by
    /// p − y.
    pub(crate) fn recover_y(&self, x: &BigUint) -> Result<BigUint, DecryptError> {
        let p = &self.p;

        let x3 = x.modpow(&BigUint::from(3u8), p);
        let three_x = (x * 3u8) % p;
        let rhs = ((x3 + p - three_x) + &self.b) % p;

        let exponent = (p + BigUint::one()) >> 2u32;
        let y = rhs.modpow(&exponent, p);

        if y.modpow(&BigUint::from(2u8), p) != rhs {
            return Err(DecryptError::NotOnCurve);
        }

        if y.bit(0) {
            Ok(p - y)
        } else {
            Ok(y)
        }
    }

    fn double(&self, point: &Point) -> Option<Point> {
        if point.y.is_zero() {
            return None;
        }

        let p = &self.p;
        let x2 = point.x.modpow(&BigUint::from(2u8), p);
        // λ = (3x² + a) / 2y with a = −3
        let numerator = mod_sub(&((x2 * 3u8) % p), &(BigUint::from(3u8) % p), p);
        let denominator = (&point.y * 2u8) % p;
        let lambda = (numerator * self.mod_inv(&denominator)) % p;

        let x3 = mod_sub(
            &lambda.modpow(&BigUint::from(2u8), p),
            &((&point.x * 2u8) % p),
            p,
        );
        let y3 = mod_sub(&((&lambda * mod_sub(&point.x, &x3, p)) % p), &point.y, p);

        Some(Point { x: x3, y: y3 })
    }

    fn add(&self, a: Option<&Point>, b: &Point) -> Option<Point> {
        let Some(a) = a else {
            return Some(b.clone());
        };

        if a.x == b.x {
            // Either the same point (tangent) or inverse points (vertical).
            return if a.y == b.y { self.double(a) } else { None };
        }

        let p = &self.p;
        let lambda =
            (mod_sub(&b.y, &a.y, p) * self.mod_inv(&mod_sub(&b.x, &a.x, p))) % p;

        let x3 = mod_sub(
            &mod_sub(&lambda.modpow(&BigUint::from(2u8), p), &a.x, p),
            &b.x,
            p,
        );
        let y3 = mod_sub(&((&lambda * mod_sub(&a.x, &x3, p)) % p), &a.y, p);

        Some(Point { x: x3, y: y3 })
    }

    /// k·P by double-and-add, most significant bit first. Returns `None` for
    /// the point at infinity (k ≡ 0 mod n).
    pub(crate) fn scalar_mul(&self, k: &BigUint, point: &Point) -> Option<Point> {
        let mut acc: Option<Point> = None;

        for i in (0..k.bits()).rev() {
            acc = match acc {
                Some(ref q) => self.double(q),
                None => None,
            };
            if k.bit(i) {
                acc = self.add(acc.as_ref(), point);
            }
        }

        acc
    }

    #[cfg(test)]
    pub(crate) fn is_on_curve(&self, point: &Point) -> bool {
        let p = &self.p;
        let lhs = point.y.modpow(&BigUint::from(2u8), p);
        let x3 = point.x.modpow(&BigUint::from(3u8), p);
        let rhs = ((x3 + p - ((&point.x * 3u8) % p)) + &self.b) % p;
        lhs == rhs
    }
}

/// Fixed-width big-endian encoding of a coordinate.
pub(crate) fn to_fixed_bytes(value: &BigUint) -> [u8; COORDINATE_LEN] {
    let bytes = value.to_bytes_be();
    let mut out = [0u8; COORDINATE_LEN];
    let skip = bytes.len().saturating_sub(COORDINATE_LEN);
    let start = COORDINATE_LEN.saturating_sub(bytes.len());
    out[start..].copy_from_slice(&bytes[skip..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    use const_decoder::{decode, Decoder};

    #[test]
    fn test_fixed_bytes_encodes_the_generator() {
        const GENERATOR_X: [u8; 20] =
            decode!(Decoder::Hex, b"4a96b5688ef573284664698968c38bb913cbfc82");

        let curve = secp160r1();
        assert_eq!(to_fixed_bytes(&curve.g.x), GENERATOR_X);
    }

    #[test]
    fn test_base_point_is_on_curve() {
        let curve = secp160r1();
        assert!(curve.is_on_curve(&curve.g));
    }

    #[test]
    fn test_recover_y_of_base_point() {
        let curve = secp160r1();
        // The secp160r1 generator already has an even y-coordinate, so
        // recovery from its x must reproduce it exactly.
        let y = curve.recover_y(&curve.g.x).unwrap();
        assert_eq!(y, curve.g.y);
        assert!(!y.bit(0));
    }

    #[test]
    fn test_recover_y_rejects_non_residues() {
        let curve = secp160r1();

        let mut failures = 0;
        let mut successes = 0;
        for x in 2u32..40 {
            match curve.recover_y(&BigUint::from(x)) {
                Ok(y) => {
                    successes += 1;
                    assert!(curve.is_on_curve(&Point { x: BigUint::from(x), y }));
                }
                Err(DecryptError::NotOnCurve) => failures += 1,
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }

        // Roughly half of all x values have no point; this fixed range
        // contains both kinds.
        assert!(failures > 0);
        assert!(successes > 0);
    }

    #[test]
    fn test_scalar_mul_small_multiples() {
        let curve = secp160r1();

        let one_g = curve.scalar_mul(&BigUint::one(), &curve.g).unwrap();
        assert_eq!(one_g, curve.g);

        let two_g = curve.scalar_mul(&BigUint::from(2u8), &curve.g).unwrap();
        assert_eq!(Some(two_g.clone()), curve.double(&curve.g));
        assert!(curve.is_on_curve(&two_g));

        let three_g = curve.scalar_mul(&BigUint::from(3u8), &curve.g).unwrap();
        assert_eq!(Some(three_g.clone()), curve.add(Some(&two_g), &curve.g));
        assert!(curve.is_on_curve(&three_g));
    }

    #[test]
    fn test_order_times_base_point_is_infinity() {
        let curve = secp160r1();
        assert_eq!(curve.scalar_mul(&curve.n, &curve.g), None);
    }

    #[test]
    fn test_fixed_bytes_pads_short_values() {
        let encoded = to_fixed_bytes(&BigUint::from(0x0102u16));
        assert_eq!(encoded[..18], [0u8; 18]);
        assert_eq!(&encoded[18..], &[0x01, 0x02]);
    }
}

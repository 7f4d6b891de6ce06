//! The fixed-point location message embedded in encrypted reports.

use prost::Message;

use crate::error::DecryptError;

/// Wire form of a decrypted location payload.
///
/// Coordinates are signed fixed-point values scaled by 1e7; altitude is
/// whole meters.
#[derive(Clone, PartialEq, Message)]
pub struct LocationMessage {
    /// Latitude × 1e7.
    #[prost(sfixed32, tag = "1")]
    pub latitude: i32,
    /// Longitude × 1e7.
    #[prost(sfixed32, tag = "2")]
    pub longitude: i32,
    /// Altitude in meters.
    #[prost(int32, tag = "3")]
    pub altitude: i32,
}

impl LocationMessage {
    /// Parse a decrypted plaintext, mapping any decode failure to
    /// [`DecryptError::MalformedPayload`].
    pub(crate) fn parse(plaintext: &[u8]) -> Result<Self, DecryptError> {
        Self::decode(plaintext).map_err(|_| DecryptError::MalformedPayload)
    }

    /// Latitude in degrees.
    pub fn latitude_degrees(&self) -> f64 {
        f64::from(self.latitude) / 1e7
    }

    /// Longitude in degrees.
    pub fn longitude_degrees(&self) -> f64 {
        f64::from(self.longitude) / 1e7
    }
}

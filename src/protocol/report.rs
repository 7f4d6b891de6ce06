//! Already-decoded location report structures.
//!
//! These mirror the nested report substructure of the device-update protobuf
//! as handed over by the push-notification collaborator. The core never
//! parses the outer transport envelope.

use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as};

/// One entry of a device update's report list, tagged by how it is
/// resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationReportRaw {
    /// A named place substituted for coordinates inside a known geofence.
    Semantic(SemanticLocation),
    /// An encrypted positional report.
    Encrypted(GeoLocation),
}

/// The payload of a semantic report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticLocation {
    /// Human-readable place name, e.g. "Home".
    pub name: String,
}

/// Encrypted geo data plus the side information needed to decrypt it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoLocation {
    /// The encrypted report itself.
    pub encrypted_report: EncryptedReport,
    /// Reported accuracy in meters. Only meaningful on the update's most
    /// recent own report; beacon reports carry no accuracy of their own.
    #[serde(default)]
    pub accuracy: f32,
}

/// An encrypted location report.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptedReport {
    /// Ciphertext followed by a 16-byte tag. Direct reports additionally
    /// prepend a 12-byte GCM nonce.
    #[serde_as(as = "Hex")]
    pub encrypted_location: Vec<u8>,
    /// Big-endian x-coordinate of the finder's curve point. Empty for
    /// direct (own) reports.
    #[serde_as(as = "Hex")]
    #[serde(default)]
    pub public_key_random: Vec<u8>,
    /// Whether the device or its paired phone generated this report.
    #[serde(default)]
    pub is_own_report: bool,
    /// Beacon time counter; only meaningful when `public_key_random` is
    /// non-empty.
    #[serde(default)]
    pub device_time_offset: u32,
}

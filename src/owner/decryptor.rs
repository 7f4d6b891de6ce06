use std::fmt;

use chrono::{DateTime, Utc};
use tracing::{debug, trace};

use crate::error::DecryptError;
use crate::protocol::aes::{decrypt_gcm, TAG_LEN};
use crate::protocol::{
    decrypt_eik, eax, rolling, DeviceUpdate, EncryptedReport, IdentityKey, LocationMessage,
    LocationReportRaw,
};
use crate::semantic::{SemanticPlace, SemanticPlaces};

/// One decoded location record.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedLocation {
    /// The timestamp positionally paired with the source report.
    pub report_time: DateTime<Utc>,
    /// The decrypted content.
    pub report: DecodedReport,
}

/// The decrypted content of a single report.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedReport {
    /// A named place.
    Semantic {
        /// The place name carried by the report.
        name: String,
        /// Coordinates resolved from the bound places table, when known.
        place: Option<SemanticPlace>,
    },
    /// A decrypted position.
    Position {
        /// Degrees.
        latitude: f64,
        /// Degrees.
        longitude: f64,
        /// Meters.
        altitude: i32,
        /// Meters. Taken from the update's most recent own report, not the
        /// individual beacon report; `None` when the update has no own
        /// report.
        accuracy: Option<f32>,
        /// Whether the device or its paired phone generated the report.
        is_own_report: bool,
    },
}

impl fmt::Display for DecodedLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let time = self.report_time.format("%b %e %H:%M:%S");
        match &self.report {
            DecodedReport::Semantic { name, .. } => write!(f, "[{time}] near: {name}"),
            DecodedReport::Position {
                latitude,
                longitude,
                altitude,
                ..
            } => write!(
                f,
                "[{time}] lat: {latitude:.6} lng: {longitude:.6} alt: {altitude}"
            ),
        }
    }
}

/// Decrypts device updates for one account.
///
/// Holds the account's owner key and an optional table of known semantic
/// places. All operations are pure and synchronous; a `Decryptor` can be
/// shared freely across threads.
pub struct Decryptor {
    owner_key: Vec<u8>,
    semantic_places: SemanticPlaces,
}

impl Decryptor {
    /// Create a decryptor for the given raw owner-key secret.
    pub fn new(owner_key: impl Into<Vec<u8>>) -> Self {
        Self {
            owner_key: owner_key.into(),
            semantic_places: SemanticPlaces::default(),
        }
    }

    /// Bind a semantic-places table for name resolution.
    pub fn with_semantic_places(mut self, places: SemanticPlaces) -> Self {
        self.semantic_places = places;
        self
    }

    /// Decrypt every report in one device update, in input order.
    ///
    /// The identity key is derived fresh from this update's encrypted
    /// identity key; a derivation failure aborts the whole update. The first
    /// per-report failure aborts the batch. Callers that want best-effort
    /// recovery should derive the key once and call
    /// [`Decryptor::decrypt_report`] per item instead.
    ///
    /// An update without any reports decodes to an empty vector, not an
    /// error.
    pub fn decrypt_device_update(
        &self,
        update: &DeviceUpdate,
    ) -> Result<Vec<DecodedLocation>, DecryptError> {
        let identity_key = decrypt_eik(&self.owner_key, &update.encrypted_identity_key)?;

        let merged = update.reports.merged();
        if merged.is_empty() {
            trace!("no location reports in device update");
            return Ok(Vec::new());
        }

        let accuracy = update.reports.recent_accuracy();

        let mut locations = Vec::with_capacity(merged.len());
        for (report, timestamp) in merged {
            let mut decoded = self.decrypt_report(report, &identity_key)?;
            if let DecodedReport::Position { accuracy: slot, .. } = &mut decoded {
                *slot = accuracy;
            }
            locations.push(DecodedLocation {
                report_time: timestamp,
                report: decoded,
            });
        }

        debug!(count = locations.len(), "decrypted device update");
        Ok(locations)
    }

    /// Decrypt a single report with an already-derived identity key.
    ///
    /// Positional records come back with `accuracy: None`; the batch API
    /// fills it from the update's most recent own report.
    pub fn decrypt_report(
        &self,
        report: &LocationReportRaw,
        identity_key: &IdentityKey,
    ) -> Result<DecodedReport, DecryptError> {
        match report {
            LocationReportRaw::Semantic(semantic) => {
                if semantic.name.is_empty() {
                    return Err(DecryptError::EmptySemanticName);
                }

                let place = self.semantic_places.resolve(&semantic.name);
                Ok(DecodedReport::Semantic {
                    name: semantic.name.clone(),
                    place,
                })
            }
            LocationReportRaw::Encrypted(geo) => {
                let encrypted = &geo.encrypted_report;

                let plaintext = if encrypted.public_key_random.is_empty() {
                    trace!("decrypting direct report");
                    decrypt_gcm(
                        &identity_key.direct_report_key(),
                        &encrypted.encrypted_location,
                    )?
                } else {
                    trace!("decrypting beacon report");
                    decrypt_beacon(encrypted, identity_key)?
                };

                let location = LocationMessage::parse(&plaintext)?;
                Ok(DecodedReport::Position {
                    latitude: location.latitude_degrees(),
                    longitude: location.longitude_degrees(),
                    altitude: location.altitude,
                    accuracy: None,
                    is_own_report: encrypted.is_own_report,
                })
            }
        }
    }
}

/// Beacon path: rolling-key session derivation followed by AES-EAX.
fn decrypt_beacon(
    encrypted: &EncryptedReport,
    identity_key: &IdentityKey,
) -> Result<Vec<u8>, DecryptError> {
    let data = &encrypted.encrypted_location;
    if data.len() <= TAG_LEN {
        return Err(DecryptError::MalformedPayload);
    }
    let (ciphertext, tag) = data.split_at(data.len() - TAG_LEN);

    let session = rolling::derive_session(
        identity_key.as_bytes(),
        &encrypted.public_key_random,
        encrypted.device_time_offset,
    )?;

    eax::decrypt(&session.shared_key, &session.nonce, ciphertext, tag)
}

//! The decoded device-update message consumed by the decryptor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as};

use super::report::LocationReportRaw;

/// One push-notification payload, already deserialized by the transport
/// collaborator.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceUpdate {
    /// User-assigned device name, carried through for display only.
    #[serde(default)]
    pub device_name: String,
    /// The encrypted identity key, length-unvalidated.
    #[serde_as(as = "Hex")]
    pub encrypted_identity_key: Vec<u8>,
    /// The update's location reports.
    pub reports: LocationReportSet,
}

/// The "network" report array and the optional "recent" report, each with
/// positionally paired timestamps.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationReportSet {
    /// Crowd-sourced (high-traffic) reports.
    #[serde(default)]
    pub network_locations: Vec<LocationReportRaw>,
    /// Positionally paired with `network_locations`.
    #[serde(default)]
    pub network_location_timestamps: Vec<DateTime<Utc>>,
    /// The at-all-areas / own report, if any.
    #[serde(default)]
    pub recent_location: Option<LocationReportRaw>,
    /// Timestamp of `recent_location`.
    #[serde(default)]
    pub recent_location_timestamp: Option<DateTime<Utc>>,
}

impl LocationReportSet {
    /// Merge network reports with the recent report into one ordered list.
    ///
    /// The recent entry, when present, is always appended after the network
    /// array, never interleaved by time. A length mismatch between reports
    /// and timestamps is a bug in the transport decoder feeding this type.
    pub(crate) fn merged(&self) -> Vec<(&LocationReportRaw, DateTime<Utc>)> {
        debug_assert_eq!(
            self.network_locations.len(),
            self.network_location_timestamps.len(),
            "report and timestamp arrays must be parallel",
        );

        let mut merged: Vec<_> = self
            .network_locations
            .iter()
            .zip(self.network_location_timestamps.iter().copied())
            .collect();

        if let Some(recent) = &self.recent_location {
            let timestamp = self
                .recent_location_timestamp
                .unwrap_or(DateTime::UNIX_EPOCH);
            merged.push((recent, timestamp));
        }

        merged
    }

    /// Accuracy of the most recent own report, if one is present. Beacon
    /// reports borrow this value because they carry none of their own.
    pub(crate) fn recent_accuracy(&self) -> Option<f32> {
        match &self.recent_location {
            Some(LocationReportRaw::Encrypted(geo)) => Some(geo.accuracy),
            _ => None,
        }
    }
}

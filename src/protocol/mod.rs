pub(crate) mod aes;
pub(crate) mod curve;
pub(crate) mod eax;
mod eik;
mod location;
mod report;
pub(crate) mod rolling;
mod update;

pub use self::aes::normalize_aes_key;
pub use eik::{decrypt_eik, EikCiphertext, IdentityKey};
pub use location::LocationMessage;
pub use report::{EncryptedReport, GeoLocation, LocationReportRaw, SemanticLocation};
pub use update::{DeviceUpdate, LocationReportSet};

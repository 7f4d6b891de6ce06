//! Decryption core for Google's Find My Device network ("offline finding")
//! push-notification payloads.
//!
//! A per-account owner key plus a per-message encrypted identity key unlock
//! each device update. Reports come in three flavors: direct (self-reported,
//! AES-GCM under a hash of the identity key), beacon (crowd-sourced, requiring
//! reconstruction of the tracker's rolling elliptic-curve key before AEAD
//! decryption), and semantic (a named place substituted for coordinates).
//!
//! This crate only decrypts. Fetching payloads over push messaging, talking to
//! the device-management API, and republishing results are jobs for the
//! surrounding system; the core receives already-deserialized messages and a
//! raw owner-key secret, and returns decoded location records or a typed
//! failure. Every operation is pure and synchronous.

#![warn(missing_docs)]

mod error;
/// Owner-side decryption of device updates.
pub mod owner;
/// Structs and primitives that capture the wire protocol.
pub mod protocol;
/// An immutable table of known semantic places.
pub mod semantic;

pub use error::DecryptError;
pub use owner::{DecodedLocation, DecodedReport, Decryptor};

mod decryptor;

pub use decryptor::{DecodedLocation, DecodedReport, Decryptor};

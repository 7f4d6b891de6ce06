use thiserror::Error;

/// Failure modes of the decryption core.
///
/// Every variant is typed so callers can branch on kind. No error is ever
/// downgraded to a default location; an undecryptable report never becomes
/// `(0, 0)`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecryptError {
    /// The encrypted identity key is neither 48 (CBC) nor 60 (GCM) bytes.
    #[error("encrypted identity key has invalid length: {0}")]
    InvalidKeyLength(usize),

    /// The key material cannot construct a block cipher.
    #[error("key material cannot initialize the cipher")]
    InvalidCipherSetup,

    /// AEAD tag verification failed (GCM or EAX).
    #[error("authentication tag verification failed")]
    AuthenticationFailure,

    /// The supplied x-coordinate has no matching y under the curve equation.
    #[error("x-coordinate is not on the curve")]
    NotOnCurve,

    /// The decrypted bytes do not parse as a location message, or a
    /// ciphertext buffer is too short to split.
    #[error("decrypted payload is not a valid location message")]
    MalformedPayload,

    /// A semantic report carried no place name.
    #[error("semantic report has an empty location name")]
    EmptySemanticName,
}

use core::fmt;

use crate::record::credentials::FieldKind;

/// Coarse classification of [`ProvisionError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Format,
    Integrity,
    Crypto,
    Storage,
    Entropy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionError {
    /// Field failed its length/character rule; nothing was touched.
    InvalidField(FieldKind),
    BadMagic,
    VersionMismatch,
    ChecksumMismatch { stored: u16, computed: u16 },
    /// Chaining input was not a whole number of cipher blocks.
    UnalignedInput,
    /// No probe boundary carried valid padding.
    PaddingNotFound,
    /// Padded plaintext does not fit its ciphertext window.
    FieldOverflow,
    ReadbackMismatch,
    OutOfBounds,
    StorageUnavailable,
    EntropyUnavailable,
}

impl ProvisionError {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            ProvisionError::InvalidField(_) => ErrorKind::Validation,
            ProvisionError::BadMagic | ProvisionError::VersionMismatch => ErrorKind::Format,
            ProvisionError::ChecksumMismatch { .. } => ErrorKind::Integrity,
            ProvisionError::UnalignedInput
            | ProvisionError::PaddingNotFound
            | ProvisionError::FieldOverflow => ErrorKind::Crypto,
            ProvisionError::ReadbackMismatch
            | ProvisionError::OutOfBounds
            | ProvisionError::StorageUnavailable => ErrorKind::Storage,
            ProvisionError::EntropyUnavailable => ErrorKind::Entropy,
        }
    }
}

impl fmt::Display for ProvisionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProvisionError::InvalidField(kind) => write!(f, "invalid {}", kind.label()),
            ProvisionError::BadMagic => f.write_str("record magic mismatch"),
            ProvisionError::VersionMismatch => f.write_str("record version mismatch"),
            ProvisionError::ChecksumMismatch { stored, computed } => write!(
                f,
                "checksum mismatch: stored 0x{stored:04X}, computed 0x{computed:04X}"
            ),
            ProvisionError::UnalignedInput => f.write_str("input is not block aligned"),
            ProvisionError::PaddingNotFound => f.write_str("no valid padding found"),
            ProvisionError::FieldOverflow => f.write_str("field does not fit its window"),
            ProvisionError::ReadbackMismatch => f.write_str("readback differs from written data"),
            ProvisionError::OutOfBounds => f.write_str("access outside device bounds"),
            ProvisionError::StorageUnavailable => f.write_str("storage not available"),
            ProvisionError::EntropyUnavailable => f.write_str("entropy source not available"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ProvisionError {}

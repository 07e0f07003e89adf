//! Persistent key-value storage
//!
//! Two kinds of data live in flash: the static configuration (written by
//! the operator, read once at boot) and the retained state (rewritten
//! around every wake cycle). Both go through [`FlashStorage`], keyed by
//! [`StorageKey`].

/// Storage slots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum StorageKey {
    /// Regulator configuration (binary postcard format)
    RegulatorConfig = 0,
    /// Regulator configuration as TOML text
    RegulatorConfigToml = 1,
    /// Confidence flag and diagnostics carried across sleep
    RetainedState = 2,
}

impl StorageKey {
    /// Every key, in storage order
    pub const ALL: [StorageKey; 3] = [
        StorageKey::RegulatorConfig,
        StorageKey::RegulatorConfigToml,
        StorageKey::RetainedState,
    ];

    /// Get the key as a byte value
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Create a key from a byte value
    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_u8() == value)
    }
}

/// Errors from flash storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlashError {
    /// Flash operation failed
    Flash,
    /// Storage layer (map bookkeeping) failed
    Storage,
    /// Key not found
    NotFound,
    /// Buffer too small for the data
    BufferTooSmall,
    /// Storage is full
    Full,
}

/// Wear-leveled key-value storage
///
/// Implementations own wear leveling and torn-write detection. A write
/// either replaces the value for its key or leaves the previous one
/// readable.
pub trait FlashStorage {
    /// Read a value by key into `buffer`, returning the byte count
    fn read(
        &mut self,
        key: StorageKey,
        buffer: &mut [u8],
    ) -> impl core::future::Future<Output = Result<usize, FlashError>>;

    /// Write a value by key
    fn write(
        &mut self,
        key: StorageKey,
        data: &[u8],
    ) -> impl core::future::Future<Output = Result<(), FlashError>>;
}

#[cfg(feature = "sequential-storage")]
impl sequential_storage::map::Key for StorageKey {
    fn serialize_into(
        &self,
        buffer: &mut [u8],
    ) -> Result<usize, sequential_storage::map::SerializationError> {
        let slot = buffer
            .first_mut()
            .ok_or(sequential_storage::map::SerializationError::BufferTooSmall)?;
        *slot = self.as_u8();
        Ok(1)
    }

    fn deserialize_from(
        buffer: &[u8],
    ) -> Result<(Self, usize), sequential_storage::map::SerializationError> {
        let byte = buffer
            .first()
            .ok_or(sequential_storage::map::SerializationError::BufferTooSmall)?;
        StorageKey::from_u8(*byte)
            .map(|key| (key, 1))
            .ok_or(sequential_storage::map::SerializationError::InvalidFormat)
    }
}

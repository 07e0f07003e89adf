//! Flash storage driver for RP2040
//!
//! Keeps a sequential-storage map in the last 64KB of the QSPI flash. The
//! map appends a new record on every write and only erases a sector once it
//! is full, so the retained state can be rewritten every wake cycle without
//! wearing out one sector.

use embassy_rp::dma::Channel;
use embassy_rp::flash::{Async, Flash, ERASE_SIZE};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;
use sequential_storage::cache::NoCache;
use sequential_storage::map;

pub use autoregulator_hal::flash::{FlashError, StorageKey};

/// 8MB flash on the QT Py RP2040
pub const FLASH_SIZE: usize = 8 * 1024 * 1024;
/// Storage partition at the end of flash (must match memory.x)
pub const STORAGE_PARTITION_SIZE: usize = 64 * 1024;
pub const STORAGE_PARTITION_START: usize = FLASH_SIZE - STORAGE_PARTITION_SIZE;

/// Largest value stored under one key (the TOML text)
pub const MAX_VALUE_SIZE: usize = 2048;

/// Flash range handed to the map
pub const STORAGE_RANGE: core::ops::Range<u32> =
    (STORAGE_PARTITION_START as u32)..(FLASH_SIZE as u32);

const _: () = assert!(STORAGE_PARTITION_SIZE % ERASE_SIZE == 0);

/// RP2040 flash storage
pub struct Rp2040FlashStorage<'d> {
    flash: Flash<'d, FLASH, Async, FLASH_SIZE>,
}

impl<'d> Rp2040FlashStorage<'d> {
    /// Create a storage instance on the flash peripheral
    pub fn new(flash: Peri<'d, FLASH>, dma: Peri<'d, impl Channel>) -> Self {
        Self {
            flash: Flash::new(flash, dma),
        }
    }

    /// Fetch the latest record for `key` into `data_buffer`
    async fn fetch<'b>(
        &mut self,
        key: StorageKey,
        data_buffer: &'b mut [u8],
    ) -> Result<Option<&'b [u8]>, FlashError> {
        map::fetch_item::<StorageKey, &[u8], _>(
            &mut self.flash,
            STORAGE_RANGE,
            &mut NoCache::new(),
            data_buffer,
            &key,
        )
        .await
        .map_err(map_error)
    }
}

/// Separate raw flash failures from map bookkeeping failures
fn map_error<E>(error: sequential_storage::Error<E>) -> FlashError {
    match error {
        sequential_storage::Error::Storage { .. } => FlashError::Flash,
        sequential_storage::Error::FullStorage => FlashError::Full,
        _ => FlashError::Storage,
    }
}

impl<'d> autoregulator_hal::FlashStorage for Rp2040FlashStorage<'d> {
    async fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, FlashError> {
        let mut data_buffer = [0u8; MAX_VALUE_SIZE];

        let data = self
            .fetch(key, &mut data_buffer)
            .await?
            .ok_or(FlashError::NotFound)?;

        let len = data.len();
        let target = buffer.get_mut(..len).ok_or(FlashError::BufferTooSmall)?;
        target.copy_from_slice(data);
        Ok(len)
    }

    async fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), FlashError> {
        if data.len() > MAX_VALUE_SIZE {
            return Err(FlashError::BufferTooSmall);
        }

        let mut data_buffer = [0u8; MAX_VALUE_SIZE];

        map::store_item(
            &mut self.flash,
            STORAGE_RANGE,
            &mut NoCache::new(),
            &mut data_buffer,
            &key,
            &data,
        )
        .await
        .map_err(map_error)
    }
}

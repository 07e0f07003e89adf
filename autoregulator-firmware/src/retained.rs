//! Retained state persistence
//!
//! The record is written twice per cycle: once with confidence cleared
//! before the motor moves, and once with the outcome after the move.

use defmt::*;

use autoregulator_core::state::{RetainedError, RetainedState, MAX_RETAINED_SIZE};
use autoregulator_hal_rp2040::{FlashError, FlashStorageTrait, StorageKey};

/// Retained state persistence errors
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// Flash operation failed
    Flash(FlashError),
    /// Record could not be encoded or failed its checks
    Record(RetainedError),
}

impl From<FlashError> for StoreError {
    fn from(e: FlashError) -> Self {
        StoreError::Flash(e)
    }
}

impl From<RetainedError> for StoreError {
    fn from(e: RetainedError) -> Self {
        StoreError::Record(e)
    }
}

/// Flash-backed store for [`RetainedState`]
pub struct RetainedStore<S> {
    storage: S,
}

impl<S: FlashStorageTrait> RetainedStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Load the record, or a fresh one (confidence false) if none is usable
    pub async fn load_or_fresh(&mut self) -> RetainedState {
        match self.load().await {
            Ok(state) => {
                info!(
                    "Retained state: confidence={} position={} faults={} next={}",
                    state.confidence,
                    state.last_position,
                    state.consecutive_faults,
                    state.wake_context
                );
                state
            }
            Err(StoreError::Flash(FlashError::NotFound)) => {
                info!("No retained state, starting fresh");
                RetainedState::new()
            }
            Err(e) => {
                warn!("Retained state unusable ({:?}), starting fresh", e);
                RetainedState::new()
            }
        }
    }

    /// Read and check the stored record
    pub async fn load(&mut self) -> Result<RetainedState, StoreError> {
        let mut buffer = [0u8; MAX_RETAINED_SIZE];
        let len = self
            .storage
            .read(StorageKey::RetainedState, &mut buffer)
            .await?;

        Ok(RetainedState::decode(&buffer[..len])?)
    }

    /// Write the record, refreshing its CRC
    pub async fn save(&mut self, state: &mut RetainedState) -> Result<(), StoreError> {
        let mut buffer = [0u8; MAX_RETAINED_SIZE];
        let bytes = state.encode(&mut buffer)?;

        self.storage
            .write(StorageKey::RetainedState, bytes)
            .await?;
        trace!("Retained state saved ({} bytes)", bytes.len());
        Ok(())
    }
}

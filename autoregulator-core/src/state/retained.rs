//! State retained across sleep and power loss
//!
//! Only the minimal record needed to decide whether the motor position can
//! be trusted survives a sleep. Everything else is rebuilt on wake. The
//! record is serialized with postcard and guarded by magic, version and
//! CRC32 so a torn write reads back as "not confident".

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::wake::WakeContext;
use crate::motion::MotorState;

/// Magic number to identify valid retained data
pub const RETAINED_MAGIC: u32 = 0x4152_4547; // "AREG"

/// Current retained data version
pub const RETAINED_VERSION: u8 = 1;

/// Upper bound of the serialized size
pub const MAX_RETAINED_SIZE: usize = 32;

/// Retained state persistence errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RetainedError {
    /// Serialization failed
    Serialize,
    /// Deserialization failed
    Deserialize,
    /// Invalid magic or version
    InvalidFormat,
    /// CRC check failed
    CrcMismatch,
}

/// Record persisted between wake cycles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RetainedState {
    /// Magic number for validation
    pub magic: u32,
    /// Data format version
    pub version: u8,
    /// Motor was idle at a homed, known position when the record was written
    pub confidence: bool,
    /// Wake cause requested by the last cycle
    pub wake_context: WakeContext,
    /// Position at the end of the last cycle (diagnostic only)
    pub last_position: i32,
    /// Cycles in a row that ended with a fault
    pub consecutive_faults: u8,
    /// CRC32 checksum (calculated over magic..consecutive_faults)
    pub crc: u32,
}

impl Default for RetainedState {
    fn default() -> Self {
        Self::new()
    }
}

impl RetainedState {
    /// Create the record for a device with no history
    pub const fn new() -> Self {
        Self {
            magic: RETAINED_MAGIC,
            version: RETAINED_VERSION,
            confidence: false,
            wake_context: WakeContext::ColdBoot,
            last_position: 0,
            consecutive_faults: 0,
            crc: 0,
        }
    }

    /// Check if the data is valid (magic and version match)
    pub fn is_valid(&self) -> bool {
        self.magic == RETAINED_MAGIC && self.version == RETAINED_VERSION
    }

    /// Clear confidence before the motor is allowed to move
    ///
    /// Persist the result before the first step so that a power loss
    /// mid-move reads back as "not confident" and forces a re-home.
    pub fn begin_cycle(&mut self) {
        self.confidence = false;
    }

    /// Record the outcome of a finished cycle
    pub fn end_cycle(&mut self, motor: &MotorState, next_wake: WakeContext, faulted: bool) {
        self.confidence = motor.is_homed();
        self.wake_context = next_wake;
        self.last_position = motor.position();
        self.consecutive_faults = if faulted {
            self.consecutive_faults.saturating_add(1)
        } else {
            0
        };
    }

    /// Drop trust in a RAM-retained motor state the record does not vouch for
    pub fn apply_to(&self, motor: &mut MotorState) {
        if !self.confidence {
            motor.invalidate();
        }
    }

    /// Calculate CRC32 for the data (excluding the crc field itself)
    pub fn calculate_crc(&self) -> u32 {
        let mut crc: u32 = 0xFFFF_FFFF;

        crc = crc32_update(crc, &self.magic.to_le_bytes());
        crc = crc32_update(crc, &[self.version]);
        crc = crc32_update(crc, &[self.confidence as u8]);
        crc = crc32_update(crc, &[wake_code(self.wake_context)]);
        crc = crc32_update(crc, &self.last_position.to_le_bytes());
        crc = crc32_update(crc, &[self.consecutive_faults]);

        !crc
    }

    /// Update the CRC field
    pub fn update_crc(&mut self) {
        self.crc = self.calculate_crc();
    }

    /// Verify the CRC is correct
    pub fn verify_crc(&self) -> bool {
        self.crc == self.calculate_crc()
    }

    /// Serialize into `buffer`, refreshing the CRC first
    #[cfg(feature = "serde")]
    pub fn encode<'a>(&mut self, buffer: &'a mut [u8]) -> Result<&'a mut [u8], RetainedError> {
        self.update_crc();
        postcard::to_slice(self, buffer).map_err(|_| RetainedError::Serialize)
    }

    /// Deserialize and check magic, version and CRC
    #[cfg(feature = "serde")]
    pub fn decode(bytes: &[u8]) -> Result<Self, RetainedError> {
        let state: Self = postcard::from_bytes(bytes).map_err(|_| RetainedError::Deserialize)?;

        if !state.is_valid() {
            return Err(RetainedError::InvalidFormat);
        }

        if !state.verify_crc() {
            return Err(RetainedError::CrcMismatch);
        }

        Ok(state)
    }
}

fn wake_code(wake: WakeContext) -> u8 {
    match wake {
        WakeContext::ColdBoot => 0,
        WakeContext::PeriodicWake => 1,
        WakeContext::ManualInterrupt => 2,
    }
}

/// Simple CRC32 update function (IEEE 802.3 polynomial)
fn crc32_update(crc: u32, data: &[u8]) -> u32 {
    const POLY: u32 = 0xEDB8_8320;
    let mut crc = crc;

    for &byte in data {
        crc ^= byte as u32;
        for _ in 0..8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ POLY;
            } else {
                crc >>= 1;
            }
        }
    }

    crc
}

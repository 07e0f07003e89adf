//! Wake causes

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Why the device is awake
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum WakeContext {
    /// First power-on or full state loss; nothing in memory is trusted
    #[default]
    ColdBoot,
    /// Scheduled wake at the end of a sleep period
    PeriodicWake,
    /// Wake requested by an external line (button, clock alarm)
    ManualInterrupt,
}

impl WakeContext {
    /// Check if this wake must home before moving, regardless of confidence
    pub fn requires_homing(&self) -> bool {
        matches!(self, WakeContext::ColdBoot)
    }

    /// Short label for status lines
    pub fn label(&self) -> &'static str {
        match self {
            WakeContext::ColdBoot => "cold boot",
            WakeContext::PeriodicWake => "periodic",
            WakeContext::ManualInterrupt => "interrupt",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_cold_boot_requires_homing() {
        assert!(WakeContext::ColdBoot.requires_homing());
        assert!(!WakeContext::PeriodicWake.requires_homing());
        assert!(!WakeContext::ManualInterrupt.requires_homing());
    }

    #[test]
    fn test_default_is_cold_boot() {
        assert_eq!(WakeContext::default(), WakeContext::ColdBoot);
    }
}

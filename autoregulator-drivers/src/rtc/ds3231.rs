//! DS3231 real-time clock
//!
//! Battery-backed, temperature-compensated RTC on I2C. Only the
//! time-of-day registers are used; the date is irrelevant to a daily
//! regulator.
//!
//! Register map (subset):
//!
//! | Addr | Contents                                         |
//! |------|--------------------------------------------------|
//! | 0x00 | seconds, BCD                                     |
//! | 0x01 | minutes, BCD                                     |
//! | 0x02 | hours, BCD; bit 6 = 12h mode, bit 5 = PM in 12h  |
//! | 0x0F | status; bit 7 = oscillator stop flag (OSF)       |

use autoregulator_core::time::TimeOfDay;
use autoregulator_core::traits::{ClockError, TimeSource};
use embedded_hal::i2c::I2c;

/// Fixed 7-bit bus address
pub const DS3231_ADDRESS: u8 = 0x68;

/// Register addresses
mod reg {
    pub const SECONDS: u8 = 0x00;
    pub const STATUS: u8 = 0x0F;
}

/// Oscillator stop flag in the status register
const STATUS_OSF: u8 = 0x80;
/// 12-hour mode select in the hours register
const HOURS_12H: u8 = 0x40;
/// PM flag in 12-hour mode
const HOURS_PM: u8 = 0x20;

/// DS3231 driver
pub struct Ds3231<I> {
    i2c: I,
}

impl<I: I2c> Ds3231<I> {
    /// Create a driver on `i2c`
    pub fn new(i2c: I) -> Self {
        Self { i2c }
    }

    /// Release the bus
    pub fn into_inner(self) -> I {
        self.i2c
    }

    /// Check if the oscillator stopped since the flag was last cleared
    ///
    /// Set after the backup battery ran flat; the time is meaningless until
    /// the next [`TimeSource::sync`].
    pub fn oscillator_stopped(&mut self) -> Result<bool, ClockError> {
        Ok(self.read_register(reg::STATUS)? & STATUS_OSF != 0)
    }

    fn read_register(&mut self, register: u8) -> Result<u8, ClockError> {
        let mut value = [0u8; 1];
        self.i2c
            .write_read(DS3231_ADDRESS, &[register], &mut value)
            .map_err(|_| ClockError::Bus)?;
        Ok(value[0])
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), ClockError> {
        self.i2c
            .write(DS3231_ADDRESS, bytes)
            .map_err(|_| ClockError::Bus)
    }
}

impl<I: I2c> TimeSource for Ds3231<I> {
    fn now(&mut self) -> Result<TimeOfDay, ClockError> {
        if self.oscillator_stopped()? {
            return Err(ClockError::OscillatorStopped);
        }

        let mut raw = [0u8; 3];
        self.i2c
            .write_read(DS3231_ADDRESS, &[reg::SECONDS], &mut raw)
            .map_err(|_| ClockError::Bus)?;

        decode_time(raw)
    }

    fn sync(&mut self, reference: TimeOfDay) -> Result<(), ClockError> {
        if !reference.is_valid() {
            return Err(ClockError::InvalidData);
        }

        let (hours, minutes, seconds) = reference.hms();
        // Always written in 24-hour mode
        self.write(&[
            reg::SECONDS,
            encode_bcd(seconds as u8),
            encode_bcd(minutes as u8),
            encode_bcd(hours as u8),
        ])?;

        let status = self.read_register(reg::STATUS)?;
        self.write(&[reg::STATUS, status & !STATUS_OSF])
    }
}

/// Decode the seconds, minutes and hours registers
fn decode_time(raw: [u8; 3]) -> Result<TimeOfDay, ClockError> {
    let seconds = decode_bcd(raw[0] & 0x7F).ok_or(ClockError::InvalidData)?;
    let minutes = decode_bcd(raw[1] & 0x7F).ok_or(ClockError::InvalidData)?;
    let hours = decode_hours(raw[2]).ok_or(ClockError::InvalidData)?;

    TimeOfDay::from_hms(hours, minutes, seconds).map_err(|_| ClockError::InvalidData)
}

/// Decode the hours register into 0..24
fn decode_hours(raw: u8) -> Option<u8> {
    if raw & HOURS_12H == 0 {
        return decode_bcd(raw & 0x3F);
    }

    let hour = decode_bcd(raw & 0x1F)?;
    if !(1..=12).contains(&hour) {
        return None;
    }

    let pm = raw & HOURS_PM != 0;
    Some(hour % 12 + if pm { 12 } else { 0 })
}

/// Decode a packed BCD byte, rejecting nibbles above 9
fn decode_bcd(value: u8) -> Option<u8> {
    let tens = value >> 4;
    let units = value & 0x0F;
    if tens > 9 || units > 9 {
        return None;
    }
    Some(tens * 10 + units)
}

fn encode_bcd(value: u8) -> u8 {
    ((value / 10) << 4) | (value % 10)
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{ErrorKind, ErrorType, Operation};

    /// Mock DS3231 register file behind an I2C bus
    struct MockBus {
        registers: [u8; 0x13],
        pointer: usize,
        fail: bool,
    }

    impl MockBus {
        fn with_time(seconds: u8, minutes: u8, hours: u8) -> Self {
            let mut registers = [0u8; 0x13];
            registers[0] = seconds;
            registers[1] = minutes;
            registers[2] = hours;
            Self {
                registers,
                pointer: 0,
                fail: false,
            }
        }
    }

    impl ErrorType for MockBus {
        type Error = ErrorKind;
    }

    impl I2c for MockBus {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            if self.fail || address != DS3231_ADDRESS {
                return Err(ErrorKind::Other);
            }

            for op in operations {
                match op {
                    Operation::Write(bytes) => {
                        if let Some((first, data)) = bytes.split_first() {
                            self.pointer = *first as usize;
                            for byte in data {
                                self.registers[self.pointer] = *byte;
                                self.pointer += 1;
                            }
                        }
                    }
                    Operation::Read(buffer) => {
                        for byte in buffer.iter_mut() {
                            *byte = self.registers[self.pointer];
                            self.pointer += 1;
                        }
                    }
                }
            }
            Ok(())
        }
    }

    #[test]
    fn test_bcd() {
        assert_eq!(decode_bcd(0x00), Some(0));
        assert_eq!(decode_bcd(0x59), Some(59));
        assert_eq!(decode_bcd(0x1A), None);
        assert_eq!(decode_bcd(0xA1), None);
        assert_eq!(encode_bcd(47), 0x47);
    }

    #[test]
    fn test_decode_hours() {
        // 24-hour mode
        assert_eq!(decode_hours(0x00), Some(0));
        assert_eq!(decode_hours(0x23), Some(23));
        // 12-hour mode: 12 AM is midnight, 12 PM is noon
        assert_eq!(decode_hours(HOURS_12H | 0x12), Some(0));
        assert_eq!(decode_hours(HOURS_12H | HOURS_PM | 0x12), Some(12));
        assert_eq!(decode_hours(HOURS_12H | HOURS_PM | 0x07), Some(19));
        assert_eq!(decode_hours(HOURS_12H | 0x00), None);
        assert_eq!(decode_hours(HOURS_12H | 0x13), None);
    }

    #[test]
    fn test_read_time() {
        let mut rtc = Ds3231::new(MockBus::with_time(0x09, 0x05, 0x14));
        assert_eq!(rtc.now(), Ok(TimeOfDay::from_hms(14, 5, 9).unwrap()));
    }

    #[test]
    fn test_out_of_range_time_is_invalid() {
        // 24:00:00 decodes as BCD but is not a time of day
        let mut rtc = Ds3231::new(MockBus::with_time(0x00, 0x00, 0x24));
        assert_eq!(rtc.now(), Err(ClockError::InvalidData));

        let mut rtc = Ds3231::new(MockBus::with_time(0x7A, 0x00, 0x10));
        assert_eq!(rtc.now(), Err(ClockError::InvalidData));
    }

    #[test]
    fn test_stopped_oscillator() {
        let mut bus = MockBus::with_time(0x00, 0x30, 0x08);
        bus.registers[reg::STATUS as usize] = STATUS_OSF;
        let mut rtc = Ds3231::new(bus);

        assert_eq!(rtc.now(), Err(ClockError::OscillatorStopped));
    }

    #[test]
    fn test_sync_writes_time_and_clears_osf() {
        let mut bus = MockBus::with_time(0, 0, 0);
        bus.registers[reg::STATUS as usize] = STATUS_OSF | 0x08;
        let mut rtc = Ds3231::new(bus);

        let reference = TimeOfDay::from_hms(21, 47, 3).unwrap();
        rtc.sync(reference).unwrap();

        let bus = rtc.into_inner();
        assert_eq!(&bus.registers[..3], &[0x03, 0x47, 0x21]);
        // Other status bits are preserved
        assert_eq!(bus.registers[reg::STATUS as usize], 0x08);

        let mut rtc = Ds3231::new(bus);
        assert_eq!(rtc.now(), Ok(reference));
    }

    #[test]
    fn test_sync_rejects_invalid_reference() {
        let mut rtc = Ds3231::new(MockBus::with_time(0, 0, 0));
        assert_eq!(
            rtc.sync(TimeOfDay::from_millis(86_400_000)),
            Err(ClockError::InvalidData)
        );
    }

    #[test]
    fn test_bus_error() {
        let mut bus = MockBus::with_time(0, 0, 0);
        bus.fail = true;
        let mut rtc = Ds3231::new(bus);

        assert_eq!(rtc.now(), Err(ClockError::Bus));
    }
}

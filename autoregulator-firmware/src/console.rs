//! Serial calibration console
//!
//! Pressing `m` on the serial port shortly after boot opens a jog session
//! for finding the travel of a new mechanism. Commands, one per line:
//!
//! | Input        | Action                               |
//! |--------------|--------------------------------------|
//! | `u N`, `+N`  | move N steps forward                 |
//! | `d N`, `-N`  | move N steps backward                |
//! | `z`          | make the current position zero       |
//! | `p`, empty   | report position                      |
//! | `q`          | finish and print the suggested max   |
//! | `t HH:MM:SS` | set the real-time clock              |

use core::fmt::Write as _;

use defmt::*;
use embassy_time::{with_timeout, Duration};
use embedded_io_async::{Read, Write};
use heapless::String;

use autoregulator_core::motion::{
    parse_command, JogReply, JogSession, MotorDriver, MotorState, MAX_JOG_STEPS,
};
use autoregulator_core::time::format_tod;
use autoregulator_core::traits::{LimitSwitch, StepActuator, TimeSource};

/// Longest accepted command line
const LINE_LEN: usize = 24;

/// Key that opens the session
const ENTER_KEY: u8 = b'm';

/// Wait up to `window` for the operator to press the console key
pub async fn requested<U: Read>(uart: &mut U, window: Duration) -> bool {
    let wait = async {
        let mut byte = [0u8; 1];
        loop {
            match uart.read(&mut byte).await {
                Ok(1) if byte[0] == ENTER_KEY => return,
                Ok(_) => {}
                Err(e) => {
                    warn!("Console read error: {:?}", Debug2Format(&e));
                }
            }
        }
    };

    with_timeout(window, wait).await.is_ok()
}

/// Run a jog session until the operator quits
///
/// Returns the suggested `max_position`. The motor is left unhomed, so the
/// following cycle re-homes before regulating.
pub async fn run_session<U, A, L, T>(
    uart: &mut U,
    driver: &mut MotorDriver<A, L>,
    clock: &mut T,
    motor: &mut MotorState,
) -> Result<i32, U::Error>
where
    U: Read + Write,
    A: StepActuator,
    L: LimitSwitch,
    T: TimeSource,
{
    info!("Calibration session started");
    uart.write_all(b"\r\njog: u N | d N | z | p | q | t HH:MM:SS\r\n").await?;

    let mut session = JogSession::new(motor);
    let mut reader = LineReader::new();

    loop {
        uart.write_all(b"> ").await?;
        let line = reader.read_line(uart).await?;

        let Some(command) = parse_command(line) else {
            uart.write_all(b"?\r\n").await?;
            continue;
        };

        debug!("Jog command: {:?}", command);
        let reply = session.handle(driver, clock, motor, command);

        let mut text: String<64> = String::new();
        let _ = match reply {
            JogReply::Position {
                position,
                lowest,
                highest,
            } => write!(text, "pos {} (low {}, high {})", position, lowest, highest),
            JogReply::Zeroed => write!(text, "zeroed"),
            JogReply::Finished { suggested_max } => {
                write!(text, "suggested max_position = {}", suggested_max)
            }
            JogReply::Rejected => write!(text, "too far, at most {} steps", MAX_JOG_STEPS),
            JogReply::Fault(e) => write!(text, "fault: {}", e.label()),
            JogReply::ClockSet(time) => {
                info!("Clock set to {}", time);
                write!(text, "clock set to {}", format_tod(time, 0).as_str())
            }
            JogReply::ClockFault(e) => {
                warn!("Clock sync failed: {:?}", e);
                write!(text, "clock not set")
            }
        };
        uart.write_all(text.as_bytes()).await?;
        uart.write_all(b"\r\n").await?;

        if let JogReply::Finished { suggested_max } = reply {
            info!("Calibration finished, suggested max {}", suggested_max);
            return Ok(suggested_max);
        }
    }
}

/// Line editor with echo and backspace
struct LineReader {
    line: String<LINE_LEN>,
    /// Swallow the `\n` of a `\r\n` pair
    after_cr: bool,
}

impl LineReader {
    fn new() -> Self {
        Self {
            line: String::new(),
            after_cr: false,
        }
    }

    async fn read_line<U: Read + Write>(&mut self, uart: &mut U) -> Result<&str, U::Error> {
        self.line.clear();
        let mut byte = [0u8; 1];

        loop {
            if uart.read(&mut byte).await? == 0 {
                continue;
            }

            let after_cr = core::mem::replace(&mut self.after_cr, byte[0] == b'\r');
            match byte[0] {
                b'\n' if after_cr => {}
                b'\r' | b'\n' => {
                    uart.write_all(b"\r\n").await?;
                    return Ok(self.line.as_str());
                }
                0x08 | 0x7F => {
                    if self.line.pop().is_some() {
                        uart.write_all(b"\x08 \x08").await?;
                    }
                }
                b if b.is_ascii_graphic() || b == b' ' => {
                    // Overlong input is truncated; the parser rejects it
                    if self.line.push(b as char).is_ok() {
                        uart.write_all(&byte).await?;
                    }
                }
                _ => {}
            }
        }
    }
}

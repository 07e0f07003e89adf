//! Autoregulator - clock-driven actuator firmware
//!
//! Main firmware binary for RP2040-based boards (QT Py RP2040 pinout).
//! Wakes periodically, reads the real-time clock, drives the actuator to
//! the position for the time of day and goes back to sleep.
//!
//! Pin assignments:
//!
//! | Function          | Pin            |
//! |-------------------|----------------|
//! | Stepper coils A-D | GPIO29..GPIO26 |
//! | DS3231 SCL / SDA  | GPIO23 / GPIO22 (I2C1) |
//! | Console TX / RX   | GPIO20 / GPIO5 (UART1) |
//! | Wake button       | GPIO21         |
//! | End stop          | GPIO3 (`limit-switch` feature) |

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_futures::select::{select, Either};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::peripherals::UART1;
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use embassy_time::{Delay, Duration, Timer};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use autoregulator_core::cycle::{Collaborators, CycleReport, WakeCycleController};
use autoregulator_core::motion::{MotorDriver, MotorState};
use autoregulator_core::state::WakeContext;
use autoregulator_drivers::rtc::Ds3231;
use autoregulator_drivers::stepper::FourPhaseStepper;
use autoregulator_hal_rp2040::Rp2040FlashStorage;

use crate::config::ConfigPersistence;
use crate::display::LogDisplay;
use crate::power::SleepRequest;
use crate::retained::RetainedStore;
use crate::tasks::ChannelTelemetry;

mod channels;
mod config;
mod console;
mod display;
mod power;
mod retained;
mod tasks;

/// Embedded default configuration (compiled into firmware)
/// Edit regulator.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../regulator.toml");

/// How long after boot the console key is accepted
const CONSOLE_WINDOW: Duration = Duration::from_millis(3_000);

bind_interrupts!(struct Irqs {
    UART1_IRQ => BufferedInterruptHandler<UART1>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 128]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 32]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Autoregulator firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // Configuration first: nothing moves before it is validated
    let storage = Rp2040FlashStorage::new(p.FLASH, p.DMA_CH0);
    let mut persistence = ConfigPersistence::new(storage);
    let config = persistence.load_or(EMBEDDED_CONFIG).await;

    let mut store = RetainedStore::new(persistence.into_storage());
    let mut retained = store.load_or_fresh().await;
    if retained.consecutive_faults > 0 {
        warn!(
            "Previous power cycle ended after {} faulted cycles",
            retained.consecutive_faults
        );
    }

    spawner.spawn(tasks::telemetry_task()).unwrap();

    // Stepper coils, released until the first move
    let coils = [
        Output::new(p.PIN_29, Level::Low),
        Output::new(p.PIN_28, Level::Low),
        Output::new(p.PIN_27, Level::Low),
        Output::new(p.PIN_26, Level::Low),
    ];
    let stepper = FourPhaseStepper::new(coils, Delay, &config.stepper);
    info!(
        "Stepper initialized, {} us per step",
        stepper.step_interval_us()
    );

    #[cfg(feature = "limit-switch")]
    let driver = {
        use autoregulator_drivers::endstop::GpioLimitSwitch;

        let end_stop = GpioLimitSwitch::new_active_low(Input::new(p.PIN_3, Pull::Up));
        info!("Homing onto end stop");
        MotorDriver::with_limit_switch(stepper, end_stop, config.motor)
    };
    #[cfg(not(feature = "limit-switch"))]
    let driver = {
        info!("Homing against hard stop");
        MotorDriver::new(stepper, config.motor)
    };

    // Real-time clock
    let i2c = I2c::new_blocking(p.I2C1, p.PIN_23, p.PIN_22, i2c::Config::default());
    let mut controller = WakeCycleController::new(driver, Ds3231::new(i2c), config.schedule);

    match controller.clock_mut().oscillator_stopped() {
        Ok(true) => warn!("RTC oscillator stopped, set the time with the console 't' command"),
        Ok(false) => {}
        Err(e) => warn!("RTC not responding: {:?}", e),
    }

    // Serial console for calibration and setting the clock
    let tx_buf = TX_BUF.init([0u8; 128]);
    let rx_buf = RX_BUF.init([0u8; 32]);
    let uart = Uart::new_blocking(p.UART1, p.PIN_20, p.PIN_5, UartConfig::default());
    let mut uart = uart.into_buffered(Irqs, tx_buf, rx_buf);

    let mut motor = MotorState::new();

    if console::requested(&mut uart, CONSOLE_WINDOW).await {
        let (driver, clock) = controller.parts_mut();
        if let Err(e) = console::run_session(&mut uart, driver, clock, &mut motor).await {
            warn!("Console error: {:?}", Debug2Format(&e));
        }
    }

    let mut wake_button = Input::new(p.PIN_21, Pull::Up);

    let mut display = LogDisplay;
    let mut telemetry = ChannelTelemetry;
    let mut power = SleepRequest::new();

    info!("Entering wake cycle loop");

    // Power-on is always a cold boot, whatever the record says
    let mut wake = WakeContext::ColdBoot;

    loop {
        if !config.schedule.retains_position {
            motor = MotorState::new();
        }
        retained.apply_to(&mut motor);

        // Persist "not confident" before the first step
        retained.begin_cycle();
        if let Err(e) = store.save(&mut retained).await {
            warn!("Failed to save retained state: {:?}", e);
        }

        let report = controller.run(
            &mut motor,
            wake,
            &mut Collaborators {
                display: &mut display,
                telemetry: &mut telemetry,
                power: &mut power,
            },
        );
        log_report(&report);

        retained.end_cycle(&motor, report.next_wake, report.fault.is_some());
        if let Err(e) = store.save(&mut retained).await {
            warn!("Failed to save retained state: {:?}", e);
        }

        let (sleep_ms, next_wake) = power
            .take()
            .unwrap_or((config.schedule.period_ms, WakeContext::PeriodicWake));

        debug!("Sleeping {} ms", sleep_ms);
        wake = match select(
            Timer::after_millis(u64::from(sleep_ms)),
            wake_button.wait_for_falling_edge(),
        )
        .await
        {
            Either::First(()) => next_wake,
            Either::Second(()) => {
                info!("Woken by button");
                WakeContext::ManualInterrupt
            }
        };
    }
}

/// Log the outcome of one wake cycle
fn log_report(report: &CycleReport) {
    if report.is_success() {
        info!(
            "Cycle ok: wake={} target={} position={} homed={}",
            report.wake,
            report.target,
            report.final_position,
            report.homed()
        );
    } else {
        warn!(
            "Cycle failed: wake={} fault={} retried={} path={}",
            report.wake,
            report.fault,
            report.retried,
            report.path.as_slice()
        );
    }
    debug!(
        "Next wake {} in {} ms",
        report.next_wake, report.sleep_ms
    );
}

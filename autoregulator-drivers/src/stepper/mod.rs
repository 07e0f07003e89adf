//! Stepper actuator implementations

pub mod four_phase;
// pub mod step_dir;  // Future: A4988-style STEP/DIR drivers

pub use four_phase::FourPhaseStepper;

//! Motion control for a stepper-driven pick-and-place and soldering gantry.
//!
//! The machine has an X/Y/Z gantry, a needle rotation axis (`C`) and a solder
//! wire feed (`E`). A [`Controller`] executes G/M-code lines received from a
//! host, drives the axes through the [`DigitalOutputs`] and [`PulseTimer`]
//! traits and stops dead whenever the [`FaultSignal`] is raised by an endstop.
//!
//! # Protocol
//!
//! | Command                 | Effect                                      |
//! | ----------------------- | ------------------------------------------- |
//! | `G0`/`G1 X Y Z C E`     | absolute move, `E` selects soldering mode    |
//! | `G33`                   | home every axis against the endstops        |
//! | `G92 X Y Z C E`         | set the current position, clear the fault   |
//! | `M10`/`M11`             | vacuum on/off                               |
//! | `M114`                  | status report                               |
//!
//! Every response ends with a `done` line.
//!
//! # Cargo Features
//!
//! The `hal` feature provides a [`DigitalOutputs`] implementation on top of
//! the [`embedded-hal`](https://crates.io/crates/embedded-hal) output pins.

#![cfg_attr(not(test), no_std)]

mod axis;
pub mod config;
mod controller;
mod errors;
pub mod faults;
mod framer;
#[cfg(feature = "hal")]
mod hal_devices;
pub mod homing;
pub mod movers;
pub mod parse;
pub mod planner;
mod ports;
pub mod report;
pub mod sim;
mod state;
mod utils;

pub use crate::{
    axis::{Axis, Direction, Position},
    config::MachineConfig,
    controller::Controller,
    errors::Error,
    faults::{Endstop, FaultSignal},
    framer::{LineFramer, LINE_CAPACITY},
    ports::{DigitalOutputs, Hardware, PulseTimer},
    state::{MachineState, Status},
};

#[cfg(feature = "hal")]
pub use crate::hal_devices::{PinOutputs, Polarity};

//! Homing (calibration) against the endstops.
//!
//! Each leg of [`MachineConfig::homing_sequence`] drives one axis toward an
//! endstop until a switch fires, then checks it was the switch we were
//! heading for. The first leg that hits the wrong switch (or runs out of
//! steps) fails the whole calibration.

use crate::{
    config::HomingStep, faults::Endstop, planner, utils::to_steps, Axis,
    DigitalOutputs, Direction, Error, Hardware, MachineConfig, MachineState,
    PulseTimer,
};
use core::fmt::Write;

/// Where the homing state machine is up to.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum HomingState {
    /// Drive an axis toward an endstop.
    Seek(HomingStep),
    /// Check which endstop stopped the seek. `observed` is `None` when the
    /// step limit ran out first.
    Confirm {
        step: HomingStep,
        observed: Option<Endstop>,
    },
    /// Every leg succeeded and the gantry is zeroed.
    Done,
    /// Homing stopped at this axis.
    Failed(Axis),
}

/// Run the whole homing sequence, reporting progress to `out`.
///
/// Returns [`HomingState::Done`] or [`HomingState::Failed`]. On success the
/// gantry position is zeroed, the fault latch is cleared and the machine is
/// marked as calibrated. On failure the fault latch is set and the machine
/// stays uncalibrated.
pub fn calibrate<O, T, E, W>(
    hw: &mut Hardware<'_, O, T>,
    config: &MachineConfig,
    state: &mut MachineState,
    out: &mut W,
) -> Result<HomingState, Error<E>>
where
    O: DigitalOutputs<Error = E>,
    T: PulseTimer<Error = E>,
    W: Write,
{
    state.current.calibrated = false;

    let sequence = config.homing_sequence;
    let mut leg = 0;
    let mut phase = first_phase(sequence);

    loop {
        log::debug!("Homing: {:?}", phase);

        phase = match phase {
            HomingState::Seek(step) => {
                hw.faults.clear_endstops();
                hw.faults.clear_error();

                write!(out, "Goto {}{}\r\n", step.axis.letter(), step.endstop.symbol())?;
                let observed = seek(hw, config, step)?;

                HomingState::Confirm { step, observed }
            },
            HomingState::Confirm { step, observed } => {
                if observed == Some(step.endstop) {
                    write!(out, "{}{} OK\r\n", step.axis.letter(), step.endstop.symbol())?;
                    hw.faults.clear_endstop(step.endstop);
                    back_off(hw, config, step)?;

                    leg += 1;
                    match sequence.get(leg) {
                        Some(next) => HomingState::Seek(*next),
                        None => HomingState::Done,
                    }
                } else {
                    HomingState::Failed(step.axis)
                }
            },
            HomingState::Done => {
                state.zero_gantry();
                state.current.calibrated = true;
                hw.faults.clear_endstops();
                hw.faults.clear_error();

                log::info!("Homing complete");
                return Ok(HomingState::Done);
            },
            HomingState::Failed(axis) => {
                state.current.calibrated = false;
                hw.faults.set_error();
                write!(out, "Error on {}\r\n", axis.letter())?;

                log::warn!("Homing failed on {:?}", axis);
                return Ok(HomingState::Failed(axis));
            },
        };
    }
}

fn first_phase(sequence: &[HomingStep]) -> HomingState {
    match sequence.first() {
        Some(step) => HomingState::Seek(*step),
        None => HomingState::Done,
    }
}

fn direction_toward(endstop: Endstop) -> Direction {
    match endstop {
        Endstop::Positive => Direction::Positive,
        Endstop::Negative => Direction::Negative,
    }
}

/// Toggle the axis at the calibration rate until any endstop fires.
fn seek<O, T, E>(
    hw: &mut Hardware<'_, O, T>,
    config: &MachineConfig,
    step: HomingStep,
) -> Result<Option<Endstop>, Error<E>>
where
    O: DigitalOutputs<Error = E>,
    T: PulseTimer<Error = E>,
{
    hw.outputs
        .set_direction(step.axis, direction_toward(step.endstop))
        .map_err(Error::Port)?;
    hw.begin(config.calibration_half_period)?;

    match run_seek(hw, config, step.axis) {
        Ok(observed) => {
            hw.finish()?;
            Ok(observed)
        },
        Err(e) => hw.halt(e),
    }
}

fn run_seek<O, T, E>(
    hw: &mut Hardware<'_, O, T>,
    config: &MachineConfig,
    axis: Axis,
) -> Result<Option<Endstop>, Error<E>>
where
    O: DigitalOutputs<Error = E>,
    T: PulseTimer<Error = E>,
{
    let mut toggles = 0;

    loop {
        hw.outputs.toggle_step(axis).map_err(Error::Port)?;
        toggles += 1;

        if let Some(endstop) = hw.faults.triggered() {
            return Ok(Some(endstop));
        }

        if let Some(limit) = config.homing_step_limit {
            if toggles >= limit {
                return Ok(None);
            }
        }

        // the endstop we are seeking raises the fault latch itself
        hw.wait_half_period_unchecked()?;
    }
}

/// Retreat from the switch which just fired, if a back-off is configured.
fn back_off<O, T, E>(
    hw: &mut Hardware<'_, O, T>,
    config: &MachineConfig,
    step: HomingStep,
) -> Result<(), Error<E>>
where
    O: DigitalOutputs<Error = E>,
    T: PulseTimer<Error = E>,
{
    if config.homing_backoff <= 0.0 || step.axis.index() >= Axis::GANTRY.len() {
        return Ok(());
    }

    hw.faults.clear_error();

    let distance =
        to_steps(config.homing_backoff, config.steps_per_unit(step.axis));
    let mut target = [0; 3];
    target[step.axis.index()] =
        direction_toward(step.endstop).reversed().sign() * distance;

    planner::step_line(hw, [0; 3], target, config.calibration_half_period)
}

//! Movers for the axes which never take part in coordinated moves.

use crate::{
    config::HalfPeriod, utils::to_steps, Axis, DigitalOutputs, Direction,
    Error, Hardware, MachineConfig, MachineState, PulseTimer,
};

/// Toggle a single axis from `start` to `end` (in the axis' physical units)
/// at a constant rate.
///
/// Like [`step_line()`](crate::planner::step_line) this never touches the
/// machine state, and a raised fault signal stops the axis immediately.
pub fn move_axis<O, T, E>(
    hw: &mut Hardware<'_, O, T>,
    config: &MachineConfig,
    axis: Axis,
    start: f32,
    end: f32,
    half_period: HalfPeriod,
) -> Result<(), Error<E>>
where
    O: DigitalOutputs<Error = E>,
    T: PulseTimer<Error = E>,
{
    let steps_per_unit = config.steps_per_unit(axis);
    let start = to_steps(start, steps_per_unit);
    let end = to_steps(end, steps_per_unit);
    let direction = Direction::of(end - start);

    hw.outputs
        .set_direction(axis, direction)
        .map_err(Error::Port)?;

    if start == end {
        return Ok(());
    }

    log::debug!("Moving {:?} from {} to {} steps", axis, start, end);
    hw.begin(half_period)?;

    let mut position = start;

    match run_axis(hw, axis, direction, &mut position, end) {
        Ok(()) => hw.finish(),
        Err(e) => {
            log::warn!("{:?} move stopped at step {}: {}", axis, position, e);
            hw.halt(e)
        },
    }
}

fn run_axis<O, T, E>(
    hw: &mut Hardware<'_, O, T>,
    axis: Axis,
    direction: Direction,
    position: &mut i64,
    end: i64,
) -> Result<(), Error<E>>
where
    O: DigitalOutputs<Error = E>,
    T: PulseTimer<Error = E>,
{
    while *position != end {
        *position += direction.sign();
        hw.outputs.toggle_step(axis).map_err(Error::Port)?;
        hw.wait_half_period()?;
    }

    Ok(())
}

/// Turn the needle to the requested angle.
///
/// The rotation axis has no absolute reference, so every move is made
/// relative to zero: requesting 90° twice turns the needle twice.
pub fn move_rotation<O, T, E>(
    hw: &mut Hardware<'_, O, T>,
    config: &MachineConfig,
    state: &mut MachineState,
    half_period: HalfPeriod,
) -> Result<(), Error<E>>
where
    O: DigitalOutputs<Error = E>,
    T: PulseTimer<Error = E>,
{
    let angle = state.requested.position.rz;

    move_axis(hw, config, Axis::Rz, 0.0, angle, half_period)?;
    state.commit(&[Axis::Rz]);

    Ok(())
}

/// Feed (or retract) solder wire to the requested absolute position.
pub fn move_solder<O, T, E>(
    hw: &mut Hardware<'_, O, T>,
    config: &MachineConfig,
    state: &mut MachineState,
    half_period: HalfPeriod,
) -> Result<(), Error<E>>
where
    O: DigitalOutputs<Error = E>,
    T: PulseTimer<Error = E>,
{
    let start = state.current.position.solder;
    let end = state.requested.position.solder;

    move_axis(hw, config, Axis::Solder, start, end, half_period)?;
    state.commit(&[Axis::Solder]);

    Ok(())
}

//! Coordinated X/Y/Z motion using a 3D generalisation of Bresenham's line
//! algorithm.
//!
//! The axis with the most toggles to make (the *dominant* axis) is toggled on
//! every half-period. The other two axes each keep an error accumulator and
//! are toggled whenever it goes non-negative, so all three axes arrive at the
//! same time without any floating point maths in the pulse loop.

use crate::{
    config::HalfPeriod, utils::to_steps, Axis, DigitalOutputs, Direction,
    Error, Hardware, MachineConfig, MachineState, PulseTimer,
};

/// Pick the axis with the largest number of toggles, preferring X over Y
/// over Z when they are equal.
pub fn dominant_axis(magnitudes: [i64; 3]) -> usize {
    let [dx, dy, dz] = magnitudes;

    if dx >= dy && dx >= dz {
        0
    } else if dy >= dz {
        1
    } else {
        2
    }
}

/// Convert a gantry position in mm to toggle counts.
pub fn gantry_steps(config: &MachineConfig, position: [f32; 3]) -> [i64; 3] {
    let mut steps = [0; 3];

    for (i, &axis) in Axis::GANTRY.iter().enumerate() {
        steps[i] = to_steps(position[i], config.steps_per_unit(axis));
    }

    steps
}

/// The half-period for a gantry move: the slowest rated period among the
/// axes that actually have to move.
///
/// Falls back to the X axis' period when nothing moves.
pub fn gantry_half_period(
    config: &MachineConfig,
    from: [f32; 3],
    to: [f32; 3],
) -> HalfPeriod {
    let from = gantry_steps(config, from);
    let to = gantry_steps(config, to);

    Axis::GANTRY
        .iter()
        .enumerate()
        .filter(|(i, _)| from[*i] != to[*i])
        .map(|(_, &axis)| config.min_half_period(axis))
        .max()
        .unwrap_or_else(|| config.min_half_period(Axis::X))
}

/// Move the gantry from `current` to `requested`, committing the requested
/// X/Y/Z to `current` once every toggle has been made.
///
/// If the fault signal is raised part way through, the pulse train is stopped
/// and [`Error::Aborted`] is returned without touching `state`.
pub fn move_gantry<O, T, E>(
    hw: &mut Hardware<'_, O, T>,
    config: &MachineConfig,
    state: &mut MachineState,
    half_period: HalfPeriod,
) -> Result<(), Error<E>>
where
    O: DigitalOutputs<Error = E>,
    T: PulseTimer<Error = E>,
{
    let from = gantry_steps(config, state.current.position.gantry());
    let to = gantry_steps(config, state.requested.position.gantry());

    log::debug!("Gantry move from {:?} to {:?} steps", from, to);

    step_line(hw, from, to, half_period)?;
    state.commit(&Axis::GANTRY);

    Ok(())
}

/// Toggle the X/Y/Z step outputs so the gantry travels in a straight line
/// from `from` to `to` (both in toggles).
///
/// Nothing is committed to the machine state; see [`move_gantry()`].
pub fn step_line<O, T, E>(
    hw: &mut Hardware<'_, O, T>,
    from: [i64; 3],
    to: [i64; 3],
    half_period: HalfPeriod,
) -> Result<(), Error<E>>
where
    O: DigitalOutputs<Error = E>,
    T: PulseTimer<Error = E>,
{
    let line = Line::new(from, to);

    for (i, &axis) in Axis::GANTRY.iter().enumerate() {
        hw.outputs
            .set_direction(axis, line.directions[i])
            .map_err(Error::Port)?;
    }

    if line.is_empty() {
        return Ok(());
    }

    hw.begin(half_period)?;

    match run_line(hw, line) {
        Ok(()) => hw.finish(),
        Err(e) => {
            log::warn!("Gantry move stopped: {}", e);
            hw.halt(e)
        },
    }
}

fn run_line<O, T, E>(
    hw: &mut Hardware<'_, O, T>,
    mut line: Line,
) -> Result<(), Error<E>>
where
    O: DigitalOutputs<Error = E>,
    T: PulseTimer<Error = E>,
{
    while !line.is_done() {
        for &axis in line.advance().iter().flatten() {
            hw.outputs.toggle_step(axis).map_err(Error::Port)?;
        }

        hw.wait_half_period()?;
    }

    Ok(())
}

/// The Bresenham state for one straight gantry move.
#[derive(Debug, Clone, PartialEq)]
struct Line {
    position: [i64; 3],
    target: [i64; 3],
    directions: [Direction; 3],
    magnitudes: [i64; 3],
    dominant: usize,
    minor: [usize; 2],
    errors: [i64; 2],
}

impl Line {
    fn new(from: [i64; 3], to: [i64; 3]) -> Line {
        let mut directions = [Direction::Negative; 3];
        let mut magnitudes = [0; 3];

        for i in 0..3 {
            let delta = to[i] - from[i];
            directions[i] = Direction::of(delta);
            magnitudes[i] = delta.abs();
        }

        let dominant = dominant_axis(magnitudes);
        let minor = match dominant {
            0 => [1, 2],
            1 => [0, 2],
            _ => [0, 1],
        };
        let errors = [
            2 * magnitudes[minor[0]] - magnitudes[dominant],
            2 * magnitudes[minor[1]] - magnitudes[dominant],
        ];

        Line {
            position: from,
            target: to,
            directions,
            magnitudes,
            dominant,
            minor,
            errors,
        }
    }

    fn is_empty(&self) -> bool { self.magnitudes[self.dominant] == 0 }

    fn is_done(&self) -> bool {
        self.position[self.dominant] == self.target[self.dominant]
    }

    /// Advance one half-period, returning the axes which need a toggle.
    fn advance(&mut self) -> [Option<Axis>; 3] {
        let mut toggles = [None; 3];

        self.step(self.dominant);
        toggles[0] = Some(Axis::GANTRY[self.dominant]);

        let minor = self.minor;

        for (slot, &axis) in minor.iter().enumerate() {
            if self.errors[slot] >= 0 {
                self.step(axis);
                toggles[slot + 1] = Some(Axis::GANTRY[axis]);
                self.errors[slot] -= 2 * self.magnitudes[self.dominant];
            }

            self.errors[slot] += 2 * self.magnitudes[axis];
        }

        toggles
    }

    fn step(&mut self, axis: usize) {
        self.position[axis] += self.directions[axis].sign();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_toggles(from: [i64; 3], to: [i64; 3]) -> ([i64; 3], [i64; 3]) {
        let mut line = Line::new(from, to);
        let mut counts = [0; 3];

        while !line.is_done() {
            for axis in line.advance().iter().flatten() {
                counts[axis.index()] += 1;
            }
        }

        (counts, line.position)
    }

    #[test]
    fn ties_prefer_x_then_y() {
        assert_eq!(dominant_axis([5, 5, 5]), 0);
        assert_eq!(dominant_axis([4, 5, 5]), 1);
        assert_eq!(dominant_axis([4, 4, 5]), 2);
        assert_eq!(dominant_axis([0, 0, 0]), 0);
        assert_eq!(dominant_axis([1, 7, 3]), 1);
    }

    #[test]
    fn every_axis_gets_exactly_its_delta() {
        let (counts, end) = count_toggles([0, 0, 0], [10, -7, 3]);

        assert_eq!(counts, [10, 7, 3]);
        assert_eq!(end, [10, -7, 3]);
    }

    #[test]
    fn z_dominant_lines_also_land_on_target() {
        let (counts, end) = count_toggles([5, 5, 100], [2, 9, 0]);

        assert_eq!(counts, [3, 4, 100]);
        assert_eq!(end, [2, 9, 0]);
    }

    #[test]
    fn an_empty_line_needs_no_toggles() {
        let line = Line::new([3, 4, 5], [3, 4, 5]);

        assert!(line.is_empty());
        assert!(line.is_done());
    }

    #[test]
    fn zero_deltas_point_in_the_negative_direction() {
        let line = Line::new([0, 0, 0], [4, 0, -4]);

        assert_eq!(
            line.directions,
            [Direction::Positive, Direction::Negative, Direction::Negative]
        );
    }

    #[test]
    fn the_slowest_moving_axis_sets_the_pace() {
        let cfg = MachineConfig::default();

        let x_only = gantry_half_period(&cfg, [0.0; 3], [1.0, 0.0, 0.0]);
        assert_eq!(x_only, cfg.min_half_period(Axis::X));

        let x_and_z = gantry_half_period(&cfg, [0.0; 3], [1.0, 0.0, 1.0]);
        assert_eq!(
            x_and_z,
            cfg.min_half_period(Axis::X).max(cfg.min_half_period(Axis::Z))
        );

        let all = gantry_half_period(&cfg, [0.0; 3], [1.0, 1.0, 1.0]);
        assert_eq!(all, *cfg.min_half_period[..3].iter().max().unwrap());
    }
}

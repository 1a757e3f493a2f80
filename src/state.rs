use crate::{Axis, Position};

/// One of the two position records plus the mode flags attached to it.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Status {
    pub position: Position,
    /// The Z ceiling selected by the last move command.
    pub zmax: f32,
    pub vacuum_on: bool,
    pub calibrated: bool,
    pub solder_routine: bool,
}

/// The authoritative machine state, owned by the control loop.
///
/// `current` is the last position the hardware provably reached and only
/// changes when a move completes normally, when homing succeeds, or on `G92`.
/// `requested` is the target of the command being executed.
///
/// The `error` and endstop flags are shared with the endstop interrupt, so
/// they live in the [`FaultSignal`](crate::FaultSignal) instead.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct MachineState {
    pub current: Status,
    pub requested: Status,
}

impl MachineState {
    pub fn new() -> MachineState { MachineState::default() }

    /// Commit the requested value of each axis as reached.
    pub(crate) fn commit(&mut self, axes: &[Axis]) {
        for &axis in axes {
            let value = self.requested.position.get(axis);
            self.current.position.set(axis, value);
        }
    }

    /// Select the Z ceiling and routine for a move, on both records.
    pub(crate) fn set_routine(&mut self, solder_routine: bool, zmax: f32) {
        for status in &mut [&mut self.current, &mut self.requested] {
            status.solder_routine = solder_routine;
            status.zmax = zmax;
        }
    }

    /// Zero the gantry after homing.
    pub(crate) fn zero_gantry(&mut self) {
        for &axis in &Axis::GANTRY {
            self.current.position.set(axis, 0.0);
            self.requested.position.set(axis, 0.0);
        }
    }
}

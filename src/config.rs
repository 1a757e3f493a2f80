use crate::{faults::Endstop, Axis};

/// A half-period length in pulse-timer ticks.
///
/// The reference hardware clocks its timer from an 8 MHz source in toggle
/// mode, so one tick is 125 ns and the whole period is twice the value.
pub type HalfPeriod = u16;

/// One leg of the homing sequence: drive `axis` until `endstop` fires.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct HomingStep {
    pub axis: Axis,
    pub endstop: Endstop,
}

impl HomingStep {
    pub const fn new(axis: Axis, endstop: Endstop) -> HomingStep {
        HomingStep { axis, endstop }
    }
}

/// The homing sequence used by the reference machine. X and Y visit both
/// ends of their travel and finish on the negative endstop, Z only seeks its
/// negative endstop.
pub const DEFAULT_HOMING_SEQUENCE: [HomingStep; 5] = [
    HomingStep::new(Axis::X, Endstop::Positive),
    HomingStep::new(Axis::X, Endstop::Negative),
    HomingStep::new(Axis::Y, Endstop::Positive),
    HomingStep::new(Axis::Y, Endstop::Negative),
    HomingStep::new(Axis::Z, Endstop::Negative),
];

/// Maximum Z position in mm when the nozzle carries a component.
pub const MAX_Z_COMPONENT: f32 = 16.0;
/// Maximum Z position in mm during a solder routine.
pub const MAX_Z_SOLDER: f32 = 12.7;

/// Machine constants consumed by the planner, movers and homing controller.
///
/// Nothing here is persisted; a fresh [`MachineConfig::default()`] describes
/// the reference machine.
#[derive(Debug, Clone, PartialEq)]
pub struct MachineConfig {
    /// Toggles per mm for X, Y and Z.
    pub steps_per_mm: [f32; 3],
    /// Toggles per degree of needle rotation.
    pub steps_per_degree: f32,
    /// Toggles per mm of solder wire.
    pub steps_per_mm_solder: f32,
    /// The shortest half-period each axis can be driven at without losing
    /// torque, indexed by [`Axis::index()`].
    pub min_half_period: [HalfPeriod; 5],
    /// Half-period used while seeking endstops.
    pub calibration_half_period: HalfPeriod,
    /// Soft travel limits for X and Y, in mm.
    pub max_travel: [f32; 2],
    /// Z ceiling for component placement moves (no `E` word).
    pub max_z_component: f32,
    /// Z ceiling for solder moves (`E` word present).
    pub max_z_solder: f32,
    pub homing_sequence: &'static [HomingStep],
    /// How far to retreat from a switch after it fires, in mm. Zero disables
    /// the back-off.
    pub homing_backoff: f32,
    /// Give up on a homing leg after this many toggles without an endstop.
    /// `None` seeks forever.
    pub homing_step_limit: Option<u32>,
}

impl MachineConfig {
    /// Toggles per physical unit (mm or degrees) for `axis`.
    pub fn steps_per_unit(&self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.steps_per_mm[0],
            Axis::Y => self.steps_per_mm[1],
            Axis::Z => self.steps_per_mm[2],
            Axis::Rz => self.steps_per_degree,
            Axis::Solder => self.steps_per_mm_solder,
        }
    }

    pub fn min_half_period(&self, axis: Axis) -> HalfPeriod {
        self.min_half_period[axis.index()]
    }

    /// The soft travel ceiling for X or Y.
    pub fn max_travel(&self, axis: Axis) -> Option<f32> {
        match axis {
            Axis::X => Some(self.max_travel[0]),
            Axis::Y => Some(self.max_travel[1]),
            _ => None,
        }
    }

    /// The Z ceiling for a move, depending on whether it solders.
    pub fn zmax(&self, solder_routine: bool) -> f32 {
        if solder_routine {
            self.max_z_solder
        } else {
            self.max_z_component
        }
    }
}

/// The reference machine.
///
/// There is no `homing_step_limit`, so `G33` keeps seeking forever if an
/// endstop never fires. Set a limit to turn a dead switch into a homing
/// failure.
impl Default for MachineConfig {
    fn default() -> MachineConfig {
        MachineConfig {
            // 1/32 microstepping on 8 mm leadscrews, counted in toggles
            steps_per_mm: [1600.0, 1600.0, 1600.0],
            steps_per_degree: 6400.0 * 2.0 / 360.0,
            steps_per_mm_solder: 800.0,
            min_half_period: [85 - 1, 7547 - 1, 4717 - 1, 37736 - 1, 37736 - 1],
            calibration_half_period: 7547 - 1,
            max_travel: [300.0, 300.0],
            max_z_component: MAX_Z_COMPONENT,
            max_z_solder: MAX_Z_SOLDER,
            homing_sequence: &DEFAULT_HOMING_SEQUENCE,
            homing_backoff: 0.0,
            homing_step_limit: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zmax_depends_on_the_routine() {
        let cfg = MachineConfig::default();

        assert_eq!(cfg.zmax(false), MAX_Z_COMPONENT);
        assert_eq!(cfg.zmax(true), MAX_Z_SOLDER);
        assert!(cfg.zmax(true) < cfg.zmax(false));
    }

    #[test]
    fn only_x_and_y_have_a_travel_limit() {
        let cfg = MachineConfig::default();

        assert!(cfg.max_travel(Axis::X).is_some());
        assert!(cfg.max_travel(Axis::Y).is_some());
        assert_eq!(cfg.max_travel(Axis::Z), None);
        assert_eq!(cfg.max_travel(Axis::Rz), None);
    }
}

//! An in-memory machine for dry runs and tests.
//!
//! [`SimOutputs`] counts toggles and tracks where each axis physically is, and
//! raises the [`FaultSignal`] when an axis runs into the end of its simulated
//! travel. [`SimTimer`] elapses on every poll and can inject an endstop event
//! after a given number of half-periods.

use crate::{
    config::HalfPeriod, faults::Endstop, Axis, DigitalOutputs, Direction,
    FaultSignal, PulseTimer,
};
use void::Void;

/// Simulated stepper drivers, endstops and vacuum valve.
#[derive(Debug)]
pub struct SimOutputs<'a> {
    faults: &'a FaultSignal,
    toggles: [u64; 5],
    positions: [i64; 5],
    directions: [Direction; 5],
    travel: [Option<(i64, i64)>; 5],
    inverted: [bool; 5],
    enabled: bool,
    vacuum: bool,
}

impl<'a> SimOutputs<'a> {
    pub fn new(faults: &'a FaultSignal) -> SimOutputs<'a> {
        SimOutputs {
            faults,
            toggles: [0; 5],
            positions: [0; 5],
            directions: [Direction::default(); 5],
            travel: [None; 5],
            inverted: [false; 5],
            enabled: false,
            vacuum: false,
        }
    }

    /// Put endstops at `min` and `max` toggles from where the axis is now.
    pub fn set_travel(&mut self, axis: Axis, min: i64, max: i64) {
        debug_assert!(min < max);
        self.travel[axis.index()] = Some((min, max));
    }

    /// Remove the endstops from an axis.
    pub fn clear_travel(&mut self, axis: Axis) { self.travel[axis.index()] = None; }

    /// Swap the switches of an axis, as if they were wired the wrong way round.
    pub fn invert_endstops(&mut self, axis: Axis) {
        self.inverted[axis.index()] = !self.inverted[axis.index()];
    }

    /// How many times the step line of `axis` was toggled.
    pub fn toggles(&self, axis: Axis) -> u64 { self.toggles[axis.index()] }

    /// Where the axis really is, in toggles from power-on.
    pub fn physical_position(&self, axis: Axis) -> i64 {
        self.positions[axis.index()]
    }

    pub fn direction(&self, axis: Axis) -> Direction {
        self.directions[axis.index()]
    }

    pub fn is_enabled(&self) -> bool { self.enabled }

    pub fn is_vacuum_on(&self) -> bool { self.vacuum }

    /// Forget the toggle counters (positions are kept).
    pub fn reset_counters(&mut self) { self.toggles = [0; 5]; }

    fn hit(&self, axis: Axis, endstop: Endstop) {
        let endstop = match (endstop, self.inverted[axis.index()]) {
            (e, false) => e,
            (Endstop::Positive, true) => Endstop::Negative,
            (Endstop::Negative, true) => Endstop::Positive,
        };

        self.faults.endstop_triggered(endstop);
    }
}

impl<'a> DigitalOutputs for SimOutputs<'a> {
    type Error = Void;

    fn toggle_step(&mut self, axis: Axis) -> Result<(), Self::Error> {
        let ix = axis.index();
        let previous = self.positions[ix];
        let position = previous + self.directions[ix].sign();

        self.toggles[ix] += 1;
        self.positions[ix] = position;

        if let Some((min, max)) = self.travel[ix] {
            // switches only report the edge where they close
            if previous < max && position >= max {
                self.hit(axis, Endstop::Positive);
            } else if previous > min && position <= min {
                self.hit(axis, Endstop::Negative);
            }
        }

        Ok(())
    }

    fn set_direction(
        &mut self,
        axis: Axis,
        direction: Direction,
    ) -> Result<(), Self::Error> {
        self.directions[axis.index()] = direction;
        Ok(())
    }

    fn set_enabled(&mut self, enabled: bool) -> Result<(), Self::Error> {
        self.enabled = enabled;
        Ok(())
    }

    fn set_vacuum(&mut self, on: bool) -> Result<(), Self::Error> {
        self.vacuum = on;
        Ok(())
    }
}

/// A pulse timer where every poll is another elapsed half-period.
#[derive(Debug)]
pub struct SimTimer<'a> {
    faults: &'a FaultSignal,
    running: bool,
    starts: u32,
    edges: u64,
    half_period: Option<HalfPeriod>,
    trip: Option<(u64, Endstop)>,
}

impl<'a> SimTimer<'a> {
    pub fn new(faults: &'a FaultSignal) -> SimTimer<'a> {
        SimTimer {
            faults,
            running: false,
            starts: 0,
            edges: 0,
            half_period: None,
            trip: None,
        }
    }

    /// Fire `endstop` once the timer has produced `edges` more half-periods.
    pub fn trip_after(&mut self, edges: u64, endstop: Endstop) {
        self.trip = Some((self.edges + edges, endstop));
    }

    pub fn is_running(&self) -> bool { self.running }

    /// How many times the timer was started.
    pub fn starts(&self) -> u32 { self.starts }

    /// Every half-period the timer has produced.
    pub fn edges(&self) -> u64 { self.edges }

    /// The half-period of the most recent [`PulseTimer::start()`].
    pub fn last_half_period(&self) -> Option<HalfPeriod> { self.half_period }
}

impl<'a> PulseTimer for SimTimer<'a> {
    type Error = Void;

    fn start(&mut self, half_period: HalfPeriod) -> Result<(), Self::Error> {
        self.running = true;
        self.starts += 1;
        self.half_period = Some(half_period);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Self::Error> {
        self.running = false;
        Ok(())
    }

    /// A stopped timer never elapses.
    fn poll_elapsed(&mut self) -> Result<bool, Self::Error> {
        if !self.running {
            return Ok(false);
        }

        self.edges += 1;

        if let Some((at, endstop)) = self.trip {
            if self.edges >= at {
                self.trip = None;
                self.faults.endstop_triggered(endstop);
            }
        }

        Ok(true)
    }
}

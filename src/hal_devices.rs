use crate::{Axis, DigitalOutputs, Direction};
use embedded_hal::digital::v2::OutputPin;

/// Which level switches a pin's function on.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Polarity {
    ActiveHigh,
    ActiveLow,
}

/// [`DigitalOutputs`] driving step and direction pins for every axis, plus the
/// drivers' shared enable pin and the vacuum valve.
///
/// Pins are indexed by [`Axis::index()`].
#[derive(Debug)]
pub struct PinOutputs<P> {
    step: [P; 5],
    direction: [P; 5],
    enable: P,
    vacuum: P,
    enable_polarity: Polarity,
    vacuum_polarity: Polarity,
    step_levels: [bool; 5],
}

impl<P> PinOutputs<P> {
    /// Create the outputs, assuming every step pin starts low.
    pub fn new(step: [P; 5], direction: [P; 5], enable: P, vacuum: P) -> Self {
        PinOutputs {
            step,
            direction,
            enable,
            vacuum,
            enable_polarity: Polarity::ActiveLow,
            vacuum_polarity: Polarity::ActiveLow,
            step_levels: [false; 5],
        }
    }

    /// Stepper drivers usually want a low `ENABLE`, which is the default.
    pub fn with_enable_polarity(self, enable_polarity: Polarity) -> Self {
        PinOutputs {
            enable_polarity,
            ..self
        }
    }

    /// The default suits a normally-open valve, which holds vacuum while its
    /// pin is low.
    pub fn with_vacuum_polarity(self, vacuum_polarity: Polarity) -> Self {
        PinOutputs {
            vacuum_polarity,
            ..self
        }
    }

    pub fn into_inner(self) -> ([P; 5], [P; 5], P, P) {
        (self.step, self.direction, self.enable, self.vacuum)
    }
}

fn set_output<P: OutputPin>(pin: &mut P, high: bool) -> Result<(), P::Error> {
    if high {
        pin.set_high()
    } else {
        pin.set_low()
    }
}

fn active_level(polarity: Polarity, active: bool) -> bool {
    match polarity {
        Polarity::ActiveHigh => active,
        Polarity::ActiveLow => !active,
    }
}

impl<P, E> DigitalOutputs for PinOutputs<P>
where
    P: OutputPin<Error = E>,
{
    type Error = E;

    #[inline]
    fn toggle_step(&mut self, axis: Axis) -> Result<(), Self::Error> {
        let ix = axis.index();
        let level = !self.step_levels[ix];

        set_output(&mut self.step[ix], level)?;
        self.step_levels[ix] = level;

        Ok(())
    }

    fn set_direction(
        &mut self,
        axis: Axis,
        direction: Direction,
    ) -> Result<(), Self::Error> {
        set_output(
            &mut self.direction[axis.index()],
            direction == Direction::Positive,
        )
    }

    fn set_enabled(&mut self, enabled: bool) -> Result<(), Self::Error> {
        set_output(
            &mut self.enable,
            active_level(self.enable_polarity, enabled),
        )
    }

    fn set_vacuum(&mut self, on: bool) -> Result<(), Self::Error> {
        set_output(&mut self.vacuum, active_level(self.vacuum_polarity, on))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::RefCell, rc::Rc};
    use void::Void;

    /// A pin which records every level written to it.
    #[derive(Debug, Clone, Default)]
    struct Recorder(Rc<RefCell<Vec<bool>>>);

    impl OutputPin for Recorder {
        type Error = Void;

        fn set_low(&mut self) -> Result<(), Void> {
            self.0.borrow_mut().push(false);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Void> {
            self.0.borrow_mut().push(true);
            Ok(())
        }
    }

    fn pins() -> [Recorder; 5] {
        [
            Recorder::default(),
            Recorder::default(),
            Recorder::default(),
            Recorder::default(),
            Recorder::default(),
        ]
    }

    #[test]
    fn step_pins_alternate() {
        let step = pins();
        let z = step[Axis::Z.index()].clone();
        let mut outputs = PinOutputs::new(
            step,
            pins(),
            Recorder::default(),
            Recorder::default(),
        );

        for _ in 0..3 {
            outputs.toggle_step(Axis::Z).unwrap();
        }

        assert_eq!(*z.0.borrow(), vec![true, false, true]);
    }

    #[test]
    fn enable_and_vacuum_respect_their_polarity() {
        let enable = Recorder::default();
        let vacuum = Recorder::default();
        let mut outputs =
            PinOutputs::new(pins(), pins(), enable.clone(), vacuum.clone())
                .with_vacuum_polarity(Polarity::ActiveHigh);

        outputs.set_enabled(true).unwrap();
        outputs.set_vacuum(true).unwrap();

        assert_eq!(*enable.0.borrow(), vec![false]);
        assert_eq!(*vacuum.0.borrow(), vec![true]);
    }
}

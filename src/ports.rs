use crate::{config::HalfPeriod, Axis, Direction, Error, FaultSignal};

/// The digital outputs driving the stepper drivers and the vacuum valve.
pub trait DigitalOutputs {
    /// The type of error that may be encountered when driving an output.
    ///
    /// Use `!` (or `void::Void` on stable) if writing a pin can never fail.
    type Error;

    /// Flip the step line of `axis`. Two toggles make one full step pulse.
    fn toggle_step(&mut self, axis: Axis) -> Result<(), Self::Error>;

    fn set_direction(
        &mut self,
        axis: Axis,
        direction: Direction,
    ) -> Result<(), Self::Error>;

    /// Enable or disable every stepper driver.
    fn set_enabled(&mut self, enabled: bool) -> Result<(), Self::Error>;

    fn set_vacuum(&mut self, on: bool) -> Result<(), Self::Error>;
}

impl<'a, O: DigitalOutputs> DigitalOutputs for &'a mut O {
    type Error = O::Error;

    fn toggle_step(&mut self, axis: Axis) -> Result<(), Self::Error> {
        (**self).toggle_step(axis)
    }

    fn set_direction(
        &mut self,
        axis: Axis,
        direction: Direction,
    ) -> Result<(), Self::Error> {
        (**self).set_direction(axis, direction)
    }

    fn set_enabled(&mut self, enabled: bool) -> Result<(), Self::Error> {
        (**self).set_enabled(enabled)
    }

    fn set_vacuum(&mut self, on: bool) -> Result<(), Self::Error> {
        (**self).set_vacuum(on)
    }
}

/// A hardware timer which paces step pulses.
///
/// Once started, the timer raises an "elapsed" event every half-period. The
/// event is consumed by polling, which lets the control loop check the
/// [`FaultSignal`](crate::FaultSignal) while it waits.
pub trait PulseTimer {
    type Error;

    /// Start (or restart) generating events every `half_period` ticks.
    fn start(&mut self, half_period: HalfPeriod) -> Result<(), Self::Error>;

    /// Stop generating events and force the timer output low.
    ///
    /// The timer must be restartable with [`PulseTimer::start()`] afterwards.
    fn stop(&mut self) -> Result<(), Self::Error>;

    /// Has another half-period elapsed since the last call? Returning `true`
    /// consumes the event.
    fn poll_elapsed(&mut self) -> Result<bool, Self::Error>;
}

impl<'a, T: PulseTimer> PulseTimer for &'a mut T {
    type Error = T::Error;

    fn start(&mut self, half_period: HalfPeriod) -> Result<(), Self::Error> {
        (**self).start(half_period)
    }

    fn stop(&mut self) -> Result<(), Self::Error> { (**self).stop() }

    fn poll_elapsed(&mut self) -> Result<bool, Self::Error> {
        (**self).poll_elapsed()
    }
}

/// The hardware a move needs: outputs, the pulse timer, and the fault flags
/// raised by the endstop interrupt.
#[derive(Debug)]
pub struct Hardware<'a, O, T> {
    pub outputs: O,
    pub timer: T,
    pub faults: &'a FaultSignal,
}

impl<'a, O, T, E> Hardware<'a, O, T>
where
    O: DigitalOutputs<Error = E>,
    T: PulseTimer<Error = E>,
{
    pub fn new(outputs: O, timer: T, faults: &'a FaultSignal) -> Self {
        Hardware {
            outputs,
            timer,
            faults,
        }
    }

    /// Enable the drivers and start pacing pulses.
    pub(crate) fn begin(
        &mut self,
        half_period: HalfPeriod,
    ) -> Result<(), Error<E>> {
        self.outputs.set_enabled(true).map_err(Error::Port)?;
        self.timer.start(half_period).map_err(Error::Port)
    }

    /// Stop pacing pulses and disable the drivers.
    pub(crate) fn finish(&mut self) -> Result<(), Error<E>> {
        self.timer.stop().map_err(Error::Port)?;
        self.outputs.set_enabled(false).map_err(Error::Port)
    }

    /// Block until the next half-period elapses, bailing out as soon as the
    /// fault signal is raised.
    pub(crate) fn wait_half_period(&mut self) -> Result<(), Error<E>> {
        loop {
            if self.faults.is_error() {
                return Err(Error::Aborted);
            }

            if self.timer.poll_elapsed().map_err(Error::Port)? {
                break;
            }
        }

        if self.faults.is_error() {
            Err(Error::Aborted)
        } else {
            Ok(())
        }
    }

    /// Block until the next half-period elapses, ignoring the fault signal.
    pub(crate) fn wait_half_period_unchecked(&mut self) -> Result<(), Error<E>> {
        while !self.timer.poll_elapsed().map_err(Error::Port)? {}

        Ok(())
    }

    /// Shut the pulse train down after `error` interrupted a move. A port
    /// error raised while shutting down is logged and `error` still wins.
    pub(crate) fn halt<R>(&mut self, error: Error<E>) -> Result<R, Error<E>> {
        if let Err(e) = self.finish() {
            log::warn!("Unable to stop the pulse train after \"{}\": {}", error, e);
        }

        Err(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::faults::Endstop;

    #[derive(Debug, Default)]
    struct Outputs {
        enabled: bool,
    }

    impl DigitalOutputs for Outputs {
        type Error = &'static str;

        fn toggle_step(&mut self, _axis: Axis) -> Result<(), Self::Error> {
            Ok(())
        }

        fn set_direction(
            &mut self,
            _axis: Axis,
            _direction: Direction,
        ) -> Result<(), Self::Error> {
            Ok(())
        }

        fn set_enabled(&mut self, enabled: bool) -> Result<(), Self::Error> {
            self.enabled = enabled;
            Ok(())
        }

        fn set_vacuum(&mut self, _on: bool) -> Result<(), Self::Error> { Ok(()) }
    }

    /// A timer whose output gets stuck when you try to stop it.
    #[derive(Debug, Default)]
    struct StuckTimer;

    impl PulseTimer for StuckTimer {
        type Error = &'static str;

        fn start(&mut self, _half_period: HalfPeriod) -> Result<(), Self::Error> {
            Ok(())
        }

        fn stop(&mut self) -> Result<(), Self::Error> { Err("stuck") }

        fn poll_elapsed(&mut self) -> Result<bool, Self::Error> { Ok(true) }
    }

    #[test]
    fn halting_reports_the_original_error() {
        let faults = FaultSignal::new();
        let mut hw = Hardware::new(Outputs::default(), StuckTimer, &faults);
        hw.begin(10).unwrap();

        let got: Result<(), _> = hw.halt(Error::Aborted);

        assert_eq!(got, Err(Error::Aborted));
        assert!(hw.outputs.enabled);
    }

    #[test]
    fn waiting_bails_out_on_a_fault() {
        let faults = FaultSignal::new();
        let mut hw = Hardware::new(Outputs::default(), StuckTimer, &faults);

        assert_eq!(hw.wait_half_period(), Ok(()));

        faults.endstop_triggered(Endstop::Negative);
        assert_eq!(hw.wait_half_period(), Err(Error::Aborted));
        assert_eq!(hw.wait_half_period_unchecked(), Ok(()));
    }
}

use crate::{
    homing::{self, HomingState},
    movers,
    parse::FieldParser,
    planner,
    report::{self, Decimal},
    utils::clamp_to_ceiling,
    Axis, DigitalOutputs, Error, FaultSignal, Hardware, LineFramer,
    MachineConfig, MachineState, Position, PulseTimer,
};
use core::fmt::Write;

/// The command interpreter.
///
/// A `Controller` owns the machine state and the hardware it drives. Each
/// command line is executed to completion (including any motion) before the
/// next one is looked at, and every command's response ends with `done`.
#[derive(Debug)]
pub struct Controller<'a, O, T> {
    config: MachineConfig,
    state: MachineState,
    hw: Hardware<'a, O, T>,
}

impl<'a, O, T, E> Controller<'a, O, T>
where
    O: DigitalOutputs<Error = E>,
    T: PulseTimer<Error = E>,
{
    pub fn new(
        config: MachineConfig,
        outputs: O,
        timer: T,
        faults: &'a FaultSignal,
    ) -> Controller<'a, O, T> {
        Controller {
            config,
            state: MachineState::new(),
            hw: Hardware::new(outputs, timer, faults),
        }
    }

    pub fn config(&self) -> &MachineConfig { &self.config }

    pub fn state(&self) -> &MachineState { &self.state }

    pub fn hardware(&self) -> &Hardware<'a, O, T> { &self.hw }

    pub fn hardware_mut(&mut self) -> &mut Hardware<'a, O, T> { &mut self.hw }

    /// Execute the framer's pending line (if there is one) and make room for
    /// the next.
    ///
    /// Returns `true` if a command was executed.
    pub fn poll<W: Write>(
        &mut self,
        framer: &mut LineFramer,
        out: &mut W,
    ) -> Result<bool, Error<E>> {
        let outcome = match framer.line() {
            Some(line) => self.execute(line, out).map(|_| true),
            None => Ok(false),
        };

        if framer.is_ready() {
            framer.clear();
        }

        outcome
    }

    /// Execute a single command line, writing the response to `out`.
    ///
    /// Motion aborted by an endstop is reported to the host (`RECAL`) and is
    /// not an error. Only port and transport failures are returned.
    pub fn execute<W: Write>(
        &mut self,
        line: &str,
        out: &mut W,
    ) -> Result<(), Error<E>> {
        log::debug!("Executing {:?}", line);
        self.observe_faults();

        let mut fields = FieldParser::new(line);

        let known_g = match fields.code('G') {
            Some(0) | Some(1) => {
                self.linear_move(&mut fields, out)?;
                true
            },
            Some(33) => {
                self.home(out)?;
                true
            },
            Some(92) => {
                self.set_position(&mut fields, out)?;
                true
            },
            _ => false,
        };

        let known_m = match fields.code('M') {
            Some(10) => {
                self.set_vacuum(true, out)?;
                true
            },
            Some(11) => {
                self.set_vacuum(false, out)?;
                true
            },
            Some(114) => {
                report::write_status(out, &self.state, self.hw.faults.snapshot())?;
                true
            },
            _ => false,
        };

        if !known_g && !known_m {
            log::debug!("Unknown command {:?}", line);
            out.write_str("G/M-Code?\r\ndone\r\n")?;
        }

        self.observe_faults();
        Ok(())
    }

    /// `G0`/`G1`: an absolute move of every axis.
    fn linear_move<W: Write>(
        &mut self,
        fields: &mut FieldParser<'_>,
        out: &mut W,
    ) -> Result<(), Error<E>> {
        let current = self.state.current.position;
        let mut target = Position {
            x: fields.field('X', current.x),
            y: fields.field('Y', current.y),
            z: fields.field('Z', current.z),
            rz: fields.field('C', current.rz),
            solder: current.solder,
        };
        // only a well-formed E word starts a solder routine
        let solder_routine = match fields.value('E') {
            Some(solder) => {
                target.solder = solder;
                true
            },
            None => false,
        };
        report_bad_param(fields, out)?;

        let zmax = self.config.zmax(solder_routine);
        self.state.set_routine(solder_routine, zmax);

        for &axis in &[Axis::X, Axis::Y] {
            if let Some(ceiling) = self.config.max_travel(axis) {
                if let Some(clamped) = clamp_to_ceiling(target.get(axis), ceiling) {
                    write!(out, "{}M {}\r\n", axis.letter(), Decimal(clamped))?;
                    target.set(axis, clamped);
                }
            }
        }

        if let Some(clamped) = clamp_to_ceiling(target.z, zmax) {
            write!(out, "ZM {}\r\n", Decimal(clamped))?;
            target.z = clamped;
        }

        self.state.requested.position = target;

        if self.hw.faults.is_error() {
            log::warn!("Refusing to move before the machine is recalibrated");
            return self.recalibrate_notice(out);
        }

        match self.run_move() {
            Ok(()) => {
                out.write_str("done\r\n")?;
                Ok(())
            },
            Err(Error::Aborted) => self.recalibrate_notice(out),
            Err(e) => Err(e),
        }
    }

    /// The gantry first, then rotation, then the solder feed. An abort skips
    /// every mover after the one that was interrupted.
    fn run_move(&mut self) -> Result<(), Error<E>> {
        let half_period = planner::gantry_half_period(
            &self.config,
            self.state.current.position.gantry(),
            self.state.requested.position.gantry(),
        );

        planner::move_gantry(&mut self.hw, &self.config, &mut self.state, half_period)?;
        movers::move_rotation(
            &mut self.hw,
            &self.config,
            &mut self.state,
            self.config.min_half_period(Axis::Rz),
        )?;
        movers::move_solder(
            &mut self.hw,
            &self.config,
            &mut self.state,
            self.config.min_half_period(Axis::Solder),
        )?;

        Ok(())
    }

    /// `G33`: run the homing sequence.
    fn home<W: Write>(&mut self, out: &mut W) -> Result<(), Error<E>> {
        log::info!("Homing");

        match homing::calibrate(&mut self.hw, &self.config, &mut self.state, out) {
            Ok(HomingState::Done) => {},
            Ok(other) => log::warn!("Homing ended in {:?}", other),
            Err(Error::Aborted) => {
                // a switch fired while backing off another one
                self.observe_faults();
                return self.recalibrate_notice(out);
            },
            Err(e) => return Err(e),
        }

        out.write_str("done\r\n")?;
        Ok(())
    }

    /// `G92`: tell the machine where it is and clear the fault latch.
    fn set_position<W: Write>(
        &mut self,
        fields: &mut FieldParser<'_>,
        out: &mut W,
    ) -> Result<(), Error<E>> {
        let current = self.state.current.position;
        let position = Position {
            x: fields.field('X', current.x),
            y: fields.field('Y', current.y),
            z: fields.field('Z', current.z),
            rz: fields.field('C', current.rz),
            solder: fields.field('E', current.solder),
        };
        report_bad_param(fields, out)?;

        self.state.current.position = position;
        self.state.requested.position = position;
        self.hw.faults.clear_error();
        log::info!("Position set to {:?}", position);

        out.write_str("done\r\n")?;
        Ok(())
    }

    /// `M10`/`M11`: switch the vacuum valve.
    fn set_vacuum<W: Write>(&mut self, on: bool, out: &mut W) -> Result<(), Error<E>> {
        self.hw.outputs.set_vacuum(on).map_err(Error::Port)?;
        self.state.current.vacuum_on = on;
        self.state.requested.vacuum_on = on;

        out.write_str("done\r\n")?;
        Ok(())
    }

    fn recalibrate_notice<W: Write>(&mut self, out: &mut W) -> Result<(), Error<E>> {
        self.observe_faults();
        out.write_str("RECAL\r\ndone\r\n")?;
        Ok(())
    }

    /// A latched fault means the machine may have lost its position.
    fn observe_faults(&mut self) {
        if !self.hw.faults.is_error() {
            return;
        }

        if self.state.current.calibrated {
            log::warn!("Fault latched, the machine needs recalibrating");
        }

        self.state.current.calibrated = false;
        self.state.requested.calibrated = false;
    }
}

fn report_bad_param<W: Write>(fields: &FieldParser<'_>, out: &mut W) -> core::fmt::Result {
    match fields.poisoned() {
        Some(_) => out.write_str("Bad param\r\n"),
        None => Ok(()),
    }
}

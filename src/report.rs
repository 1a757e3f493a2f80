//! Formatting for the responses sent back to the host.

use crate::{faults::FaultFlags, MachineState};
use arrayvec::ArrayString;
use core::fmt::{self, Write};

/// A number printed with at most 6 fractional digits and no trailing zeros
/// (`10`, `12.7`, `-0.5`).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Decimal(pub f32);

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // wide enough for f32::MAX
        let mut scratch = ArrayString::<[u8; 64]>::new();
        write!(scratch, "{:.6}", self.0)?;

        f.write_str(trim_fraction(&scratch))
    }
}

fn trim_fraction(formatted: &str) -> &str {
    if !formatted.contains('.') {
        return formatted;
    }

    match formatted.trim_end_matches('0').trim_end_matches('.') {
        "-0" => "0",
        trimmed => trimmed,
    }
}

/// The `Y`/`N` used for flags.
pub fn yes_no(flag: bool) -> char {
    if flag {
        'Y'
    } else {
        'N'
    }
}

/// Write the `M114` status report, terminated by `done`.
pub fn write_status<W: Write>(
    out: &mut W,
    state: &MachineState,
    faults: FaultFlags,
) -> fmt::Result {
    let current = &state.current;
    let position = &current.position;

    write!(out, "X {}\r\n", Decimal(position.x))?;
    write!(out, "Y {}\r\n", Decimal(position.y))?;
    write!(out, "Z {}\r\n", Decimal(position.z))?;
    write!(out, "E {}\r\n", Decimal(position.solder))?;
    write!(out, "SDR {}\r\n", yes_no(current.solder_routine))?;
    write!(out, "ZM {}\r\n", Decimal(current.zmax))?;
    write!(out, "VAC {}\r\n", yes_no(current.vacuum_on))?;
    write!(out, "CAL {}\r\n", yes_no(current.calibrated))?;
    write!(out, "ERR {}\r\n", yes_no(faults.error))?;
    write!(out, "EP {}\r\n", yes_no(faults.positive))?;
    write!(out, "EN {}\r\n", yes_no(faults.negative))?;
    out.write_str("done\r\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_drop_trailing_zeros() {
        let inputs = vec![
            (10.0, "10"),
            (12.7, "12.7"),
            (-0.5, "-0.5"),
            (0.0, "0"),
            (-0.0, "0"),
            (0.125, "0.125"),
            (300.0, "300"),
        ];

        for (value, should_be) in inputs {
            assert_eq!(Decimal(value).to_string(), should_be);
        }
    }

    #[test]
    fn status_report_layout() {
        let mut state = MachineState::new();
        state.current.position.x = 10.0;
        state.current.position.y = 20.0;
        state.current.position.z = 5.0;
        state.current.zmax = 16.0;
        state.current.vacuum_on = true;
        let faults = FaultFlags {
            positive: false,
            negative: true,
            error: true,
        };
        let mut out = String::new();

        write_status(&mut out, &state, faults).unwrap();

        assert_eq!(
            out,
            "X 10\r\nY 20\r\nZ 5\r\nE 0\r\nSDR N\r\nZM 16\r\nVAC Y\r\nCAL N\r\n\
             ERR Y\r\nEP N\r\nEN Y\r\ndone\r\n"
        );
    }
}

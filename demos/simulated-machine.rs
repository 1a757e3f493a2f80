use pnp_motion::{
    sim::{SimOutputs, SimTimer},
    Axis, Controller, FaultSignal, LineFramer, MachineConfig,
};
use rustyline::error::ReadlineError;
use structopt::StructOpt;

static FAULTS: FaultSignal = FaultSignal::new();

fn main() {
    env_logger::init();

    let args = Args::from_args();
    let mut controller = Controller::new(
        args.config(),
        args.outputs(&FAULTS),
        SimTimer::new(&FAULTS),
        &FAULTS,
    );
    let mut framer = LineFramer::new();
    let mut rl = rustyline::Editor::<()>::new();

    for line in rl.iter("> ") {
        let line = match line {
            Ok(l) => l,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => panic!("{}", e),
        };

        if line.trim() == "exit" {
            break;
        }

        // pretend the line came down the serial port
        let mut bytes = line.into_bytes();
        bytes.push(b'\n');
        let mut remaining = &bytes[..];

        while !remaining.is_empty() {
            let consumed = framer.extend(remaining);
            remaining = &remaining[consumed..];

            let mut response = String::new();
            if let Err(e) = controller.poll(&mut framer, &mut response) {
                eprintln!("Error: {}", e);
            }
            print!("{}", response.replace("\r\n", "\n"));
        }

        let hw = controller.hardware();
        log::debug!(
            "Toggles: {:?}",
            Axis::ALL
                .iter()
                .map(|&axis| (axis, hw.outputs.toggles(axis)))
                .collect::<Vec<_>>()
        );
    }
}

#[derive(StructOpt)]
pub struct Args {
    /// How far X may travel (mm).
    #[structopt(short = "x", long = "max-x", default_value = "300")]
    max_x: f32,
    /// How far Y may travel (mm).
    #[structopt(short = "y", long = "max-y", default_value = "300")]
    max_y: f32,
    /// Where the simulated endstops sit, in toggles either side of power-on.
    #[structopt(short = "t", long = "endstops", default_value = "480000")]
    endstops: i64,
    /// Give up homing an axis after this many toggles.
    #[structopt(long = "homing-limit")]
    homing_limit: Option<u32>,
}

impl Args {
    pub fn config(&self) -> MachineConfig {
        MachineConfig {
            max_travel: [self.max_x, self.max_y],
            homing_step_limit: self.homing_limit,
            ..MachineConfig::default()
        }
    }

    pub fn outputs<'a>(&self, faults: &'a FaultSignal) -> SimOutputs<'a> {
        let mut outputs = SimOutputs::new(faults);

        for &axis in &Axis::GANTRY {
            outputs.set_travel(axis, -self.endstops, self.endstops);
        }

        outputs
    }
}

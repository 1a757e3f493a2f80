/// One of the machine's stepper-driven axes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
    /// Rotation of the needle around Z, in degrees.
    Rz,
    /// The linear solder extruder.
    Solder,
}

impl Axis {
    /// Every axis, in output-port order.
    pub const ALL: [Axis; 5] = [Axis::X, Axis::Y, Axis::Z, Axis::Rz, Axis::Solder];

    /// The axes moved together by the coordinated planner, in tie-break order.
    pub const GANTRY: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// The letter used for this axis on the wire.
    pub fn letter(self) -> char {
        match self {
            Axis::X => 'X',
            Axis::Y => 'Y',
            Axis::Z => 'Z',
            Axis::Rz => 'C',
            Axis::Solder => 'E',
        }
    }

    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
            Axis::Rz => 3,
            Axis::Solder => 4,
        }
    }
}

/// The level a direction output is driven to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    Positive,
    Negative,
}

impl Direction {
    /// Positive only when `delta` is strictly greater than zero.
    pub fn of(delta: i64) -> Direction {
        if delta > 0 {
            Direction::Positive
        } else {
            Direction::Negative
        }
    }

    pub fn sign(self) -> i64 {
        match self {
            Direction::Positive => 1,
            Direction::Negative => -1,
        }
    }

    pub fn reversed(self) -> Direction {
        match self {
            Direction::Positive => Direction::Negative,
            Direction::Negative => Direction::Positive,
        }
    }
}

impl Default for Direction {
    fn default() -> Direction { Direction::Negative }
}

/// An absolute position for every axis (mm, except [`Axis::Rz`] in degrees).
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub rz: f32,
    pub solder: f32,
}

impl Position {
    pub fn get(&self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
            Axis::Rz => self.rz,
            Axis::Solder => self.solder,
        }
    }

    pub fn set(&mut self, axis: Axis, value: f32) {
        match axis {
            Axis::X => self.x = value,
            Axis::Y => self.y = value,
            Axis::Z => self.z = value,
            Axis::Rz => self.rz = value,
            Axis::Solder => self.solder = value,
        }
    }

    pub fn gantry(&self) -> [f32; 3] { [self.x, self.y, self.z] }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_delta_drives_the_negative_level() {
        assert_eq!(Direction::of(0), Direction::Negative);
        assert_eq!(Direction::of(-3), Direction::Negative);
        assert_eq!(Direction::of(1), Direction::Positive);
    }

    #[test]
    fn positions_are_addressed_by_axis() {
        let mut pos = Position::default();

        for (i, axis) in Axis::ALL.iter().enumerate() {
            pos.set(*axis, i as f32);
        }

        assert_eq!(pos.get(Axis::Rz), 3.0);
        assert_eq!(pos.solder, 4.0);
        assert_eq!(pos.gantry(), [0.0, 1.0, 2.0]);
    }
}

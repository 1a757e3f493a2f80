use portable_atomic::{AtomicBool, Ordering};

/// Which end of travel an endstop guards.
///
/// All switches of one polarity are wired together, so the flags tell you
/// *which end* was hit but not on which axis.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Endstop {
    Positive,
    Negative,
}

impl Endstop {
    pub fn symbol(self) -> char {
        match self {
            Endstop::Positive => '+',
            Endstop::Negative => '-',
        }
    }
}

/// A snapshot of the [`FaultSignal`] flags.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct FaultFlags {
    pub positive: bool,
    pub negative: bool,
    pub error: bool,
}

/// Sticky fault flags shared between the endstop interrupt and the control
/// loop.
///
/// The interrupt only ever sets flags and the loop only ever clears them, so
/// plain atomic loads and stores are enough.
#[derive(Debug, Default)]
pub struct FaultSignal {
    positive: AtomicBool,
    negative: AtomicBool,
    error: AtomicBool,
}

impl FaultSignal {
    pub const fn new() -> FaultSignal {
        FaultSignal {
            positive: AtomicBool::new(false),
            negative: AtomicBool::new(false),
            error: AtomicBool::new(false),
        }
    }

    /// Record an endstop edge. Call this from the pin-change interrupt.
    #[inline]
    pub fn endstop_triggered(&self, endstop: Endstop) {
        self.flag(endstop).store(true, Ordering::SeqCst);
        self.error.store(true, Ordering::SeqCst);
    }

    /// Latch the machine error without an endstop, e.g. after failed homing.
    pub fn set_error(&self) { self.error.store(true, Ordering::SeqCst); }

    #[inline]
    pub fn is_error(&self) -> bool { self.error.load(Ordering::SeqCst) }

    pub fn is_triggered(&self, endstop: Endstop) -> bool {
        self.flag(endstop).load(Ordering::SeqCst)
    }

    /// The first triggered endstop, checking the positive one first.
    pub fn triggered(&self) -> Option<Endstop> {
        if self.is_triggered(Endstop::Positive) {
            Some(Endstop::Positive)
        } else if self.is_triggered(Endstop::Negative) {
            Some(Endstop::Negative)
        } else {
            None
        }
    }

    pub fn clear_error(&self) { self.error.store(false, Ordering::SeqCst); }

    pub fn clear_endstop(&self, endstop: Endstop) {
        self.flag(endstop).store(false, Ordering::SeqCst);
    }

    pub fn clear_endstops(&self) {
        self.clear_endstop(Endstop::Positive);
        self.clear_endstop(Endstop::Negative);
    }

    pub fn snapshot(&self) -> FaultFlags {
        FaultFlags {
            positive: self.is_triggered(Endstop::Positive),
            negative: self.is_triggered(Endstop::Negative),
            error: self.is_error(),
        }
    }

    fn flag(&self, endstop: Endstop) -> &AtomicBool {
        match endstop {
            Endstop::Positive => &self.positive,
            Endstop::Negative => &self.negative,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static FAULTS: FaultSignal = FaultSignal::new();

    #[test]
    fn an_endstop_latches_the_error() {
        let faults = FaultSignal::new();

        faults.endstop_triggered(Endstop::Negative);

        assert_eq!(
            faults.snapshot(),
            FaultFlags {
                positive: false,
                negative: true,
                error: true
            }
        );
        assert_eq!(faults.triggered(), Some(Endstop::Negative));
    }

    #[test]
    fn clearing_the_error_keeps_the_endstop_flags() {
        FAULTS.endstop_triggered(Endstop::Positive);
        FAULTS.clear_error();

        assert!(!FAULTS.is_error());
        assert!(FAULTS.is_triggered(Endstop::Positive));

        FAULTS.clear_endstops();
        assert_eq!(FAULTS.triggered(), None);
    }
}

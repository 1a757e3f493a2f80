use core::fmt;

/// Things that can go wrong while executing a command.
///
/// `E` is the error type shared by the machine's
/// [`DigitalOutputs`](crate::DigitalOutputs) and
/// [`PulseTimer`](crate::PulseTimer).
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum Error<E> {
    /// An endstop fired (or the machine was already faulted) while axes were
    /// moving. The move stopped and no position was committed.
    #[error("motion aborted by the fault signal")]
    Aborted,
    /// A hardware port reported an error.
    #[error("a hardware port reported an error")]
    Port(E),
    /// The response couldn't be written to the transport.
    #[error("unable to write the response")]
    Response(#[from] fmt::Error),
}

impl<E> Error<E> {
    pub fn is_aborted(&self) -> bool {
        match self {
            Error::Aborted => true,
            _ => false,
        }
    }
}

use arrayvec::ArrayVec;

/// The most bytes a single command line can hold.
pub const LINE_CAPACITY: usize = 32;

/// Assembles received bytes into a single command line.
///
/// A line is ready once a `\0`, `\r` or `\n` arrives or the buffer fills up.
/// There is only one slot, so bytes received while a line is waiting to be
/// executed are dropped until [`LineFramer::clear()`] is called.
#[derive(Debug, Clone)]
pub struct LineFramer {
    buffer: ArrayVec<[u8; LINE_CAPACITY]>,
    ready: bool,
}

impl LineFramer {
    pub fn new() -> LineFramer {
        LineFramer {
            buffer: ArrayVec::new(),
            ready: false,
        }
    }

    /// Feed a byte from the receive interrupt, returning `true` when it
    /// completed a line.
    pub fn push(&mut self, byte: u8) -> bool {
        if self.ready {
            return false;
        }

        match byte {
            // an empty line is just the tail of a "\r\n"
            b'\0' | b'\r' | b'\n' if self.buffer.is_empty() => {},
            b'\0' | b'\r' | b'\n' => self.ready = true,
            b if b.is_ascii() => {
                self.buffer.push(b);
                self.ready = self.buffer.is_full();
            },
            _ => {},
        }

        self.ready
    }

    /// Feed every byte of `bytes`, stopping at the end of the first line.
    ///
    /// Returns how many bytes were consumed.
    pub fn extend(&mut self, bytes: &[u8]) -> usize {
        for (i, &byte) in bytes.iter().enumerate() {
            if self.push(byte) {
                return i + 1;
            }
        }

        bytes.len()
    }

    pub fn is_ready(&self) -> bool { self.ready }

    /// The completed line, without its terminator.
    pub fn line(&self) -> Option<&str> {
        if self.ready {
            core::str::from_utf8(&self.buffer[..]).ok()
        } else {
            None
        }
    }

    /// Throw the current line away and start receiving the next one.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.ready = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newline_terminates_a_line() {
        let mut framer = LineFramer::new();

        assert_eq!(framer.extend(b"G1 X5\r\nM114\n"), 6);

        assert!(framer.is_ready());
        assert_eq!(framer.line(), Some("G1 X5"));
    }

    #[test]
    fn bytes_are_dropped_while_a_line_is_pending() {
        let mut framer = LineFramer::new();
        framer.extend(b"M10\n");

        assert!(!framer.push(b'X'));
        assert_eq!(framer.line(), Some("M10"));

        framer.clear();
        assert_eq!(framer.line(), None);
        // the "\n" left over from "\r\n" doesn't make an empty line
        assert!(!framer.push(b'\n'));
        framer.extend(b"M11\0");
        assert_eq!(framer.line(), Some("M11"));
    }

    #[test]
    fn a_full_buffer_is_a_line() {
        let mut framer = LineFramer::new();
        let long = [b'1'; LINE_CAPACITY + 8];

        assert_eq!(framer.extend(&long), LINE_CAPACITY);

        assert_eq!(framer.line().map(str::len), Some(LINE_CAPACITY));
    }

    #[test]
    fn non_ascii_bytes_are_ignored() {
        let mut framer = LineFramer::new();

        framer.extend(&[b'M', 0xC3, 0xA9, b'1', b'0', b'\r']);

        assert_eq!(framer.line(), Some("M10"));
    }
}

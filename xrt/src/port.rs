//! Stream-backed port

use {
    nandvm::io::Port,
    std::io::{self, ErrorKind, Read, Write},
};

/// Port over a byte source and a byte sink
///
/// Output is flushed after every byte so interactive programs see their
/// prompts before blocking on input.
pub struct StreamPort<R, W> {
    input: R,
    output: W,
}

/// Port over the process' standard input and output
pub type StdPort = StreamPort<io::Stdin, io::Stdout>;

impl StdPort {
    pub fn std() -> Self {
        Self::new(io::stdin(), io::stdout())
    }
}

impl<R: Read, W: Write> StreamPort<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }
}

impl<R: Read, W: Write> Port for StreamPort<R, W> {
    fn read(&mut self) -> Option<u8> {
        let mut byte = 0;
        loop {
            match self.input.read(core::slice::from_mut(&mut byte)) {
                Ok(0) => return None,
                Ok(_) => return Some(byte),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    log::error!("input failed: {e}");
                    return None;
                }
            }
        }
    }

    fn write(&mut self, byte: u8) {
        if let Err(e) = self.output.write_all(&[byte]).and_then(|_| self.output.flush()) {
            log::error!("output failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use {super::*, std::io::Cursor};

    #[test]
    fn reads_then_ends() {
        let mut port = StreamPort::new(Cursor::new(b"hi".to_vec()), Vec::new());
        assert_eq!(port.read(), Some(b'h'));
        assert_eq!(port.read(), Some(b'i'));
        assert_eq!(port.read(), None);
    }

    #[test]
    fn writes_raw_bytes() {
        let mut port = StreamPort::new(io::empty(), Vec::new());
        port.write(b'\n');
        port.write(0xFF);
        assert_eq!(port.into_inner().1, [b'\n', 0xFF]);
    }
}

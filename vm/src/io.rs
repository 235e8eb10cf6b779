//! Port collaborators
//!
//! A NAND whose destination is [`addr::READ_PORT`](nandbytecode::addr::READ_PORT)
//! pulls one byte from [`Port::read`] into the I/O cell, one whose destination
//! is [`addr::WRITE_PORT`](nandbytecode::addr::WRITE_PORT) pushes the I/O cell
//! to [`Port::write`].

use alloc::{collections::VecDeque, vec::Vec};

/// Byte-wise input and output of the machine
pub trait Port {
    /// Read one byte, blocking. `None` when the input has ended.
    fn read(&mut self) -> Option<u8>;

    /// Write one byte
    fn write(&mut self, byte: u8);
}

impl<P: Port + ?Sized> Port for &mut P {
    #[inline]
    fn read(&mut self) -> Option<u8> {
        (**self).read()
    }

    #[inline]
    fn write(&mut self, byte: u8) {
        (**self).write(byte)
    }
}

/// In-memory port
#[derive(Clone, Debug, Default)]
pub struct BufferPort {
    /// Bytes yet to be read
    pub input: VecDeque<u8>,
    /// Bytes written so far
    pub output: Vec<u8>,
}

impl BufferPort {
    pub fn new(input: impl IntoIterator<Item = u8>) -> Self {
        Self { input: input.into_iter().collect(), output: Vec::new() }
    }
}

impl Port for BufferPort {
    fn read(&mut self) -> Option<u8> {
        self.input.pop_front()
    }

    fn write(&mut self, byte: u8) {
        self.output.push(byte);
    }
}

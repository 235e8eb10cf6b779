//! NAND Machine
//!
//! 64 KiB of byte-addressable memory, one flag, a cycle counter and two
//! instruction classes: a branch taken when the flag is set and a NAND
//! on a bit or a byte. Anything a NAND writes fades after
//! [`cycles::DECAY`](nandbytecode::cycles::DECAY) cycles.
//!
//! # Timer
//! With `TIMER_QUOTIENT` other than zero, [`Vm::run`] hands control back to
//! the caller every `TIMER_QUOTIENT` instructions with [`VmRunOk::Timer`].
//! Tracing and single-stepping drivers use a quotient of one.

#![no_std]

extern crate alloc;

pub mod io;
pub mod mem;

mod utils;
mod vmrun;


use {
    io::Port,
    mem::{Address, DecayMemory},
    utils::impl_display,
};

/// NAND Machine
pub struct Vm<P, const TIMER_QUOTIENT: usize> {
    /// Memory, only reachable through the decay-aware accessors
    memory: DecayMemory,

    /// Input / output collaborator
    port: P,

    /// Instruction pointer
    pc: Address,

    /// Set by NAND and port access, consumed by branches
    flag: bool,

    /// Cycles elapsed, decay deadlines are absolute values of this
    cycles: u64,

    state: VmState,

    /// Instructions since start, for the timer
    timer: usize,
}

impl<P, const TIMER_QUOTIENT: usize> Vm<P, TIMER_QUOTIENT>
where
    P: Port,
{
    /// Create a new VM with `image` loaded at address 0
    ///
    /// Execution starts at address 0.
    pub fn new(port: P, image: &[u8]) -> Self {
        Self {
            memory: DecayMemory::with_image(image),
            port,
            pc: Address::NULL,
            flag: false,
            cycles: 0,
            state: VmState::Running,
            timer: 0,
        }
    }

    /// Instruction pointer
    #[inline]
    pub fn pc(&self) -> Address {
        self.pc
    }

    /// Flag register
    #[inline]
    pub fn flag(&self) -> bool {
        self.flag
    }

    /// Cycles elapsed
    #[inline]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    #[inline]
    pub fn state(&self) -> VmState {
        self.state
    }

    /// Shared view of memory
    ///
    /// Observing it is only possible through [`DecayMemory::peek`] which
    /// honours pending decay.
    #[inline]
    pub fn memory(&self) -> &DecayMemory {
        &self.memory
    }

    /// Logical value of a cell right now, without collapsing it
    #[inline]
    pub fn peek(&self, addr: Address) -> u8 {
        self.memory.peek(addr, self.cycles)
    }

    pub fn into_port(self) -> P {
        self.port
    }
}

/// Execution state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VmState {
    Running,
    /// Instruction pointer reached [`addr::HALT`](nandbytecode::addr::HALT)
    Halted,
    /// Decoding the instruction at the address failed
    Fatal(Address),
}

/// Virtual machine halt error
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum VmRunError {
    /// Operand fetch ran into the halt sentinel while decoding the
    /// instruction at the address
    FetchError(Address),
}

impl_display!(for VmRunError => match {
    VmRunError::FetchError(pc) => "fetch error at {pc}";
});

impl core::error::Error for VmRunError {}

/// Virtual machine halt ok
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum VmRunOk {
    /// Program has reached its end
    End,

    /// Program was interrupted by a timer
    Timer,
}

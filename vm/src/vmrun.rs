//! Welcome to the land of The Great Dispatch Loop
//!
//! It has two arms.

use {
    super::{
        io::Port,
        mem::{Address, Granularity},
        Vm, VmRunError, VmRunOk, VmState,
    },
    log::{debug, trace},
    nandbytecode::{addr, cycles, Instruction, Width},
};

impl<P, const TIMER_QUOTIENT: usize> Vm<P, TIMER_QUOTIENT>
where
    P: Port,
{
    /// Execute program
    ///
    /// Runs until the instruction pointer reaches the halt address, an
    /// instruction fails to decode or, with a timer, the quotient elapses.
    /// Once halted or failed, every further call reports the same outcome.
    pub fn run(&mut self) -> Result<VmRunOk, VmRunError> {
        loop {
            if self.step()? == VmState::Halted {
                return Ok(VmRunOk::End);
            }

            if TIMER_QUOTIENT != 0 {
                self.timer = self.timer.wrapping_add(1);
                if self.timer % TIMER_QUOTIENT == 0 {
                    return Ok(VmRunOk::Timer);
                }
            }
        }
    }

    /// Execute a single instruction
    ///
    /// Returns [`VmState::Running`] if an instruction was executed and
    /// [`VmState::Halted`] if the instruction pointer is at the halt address.
    pub fn step(&mut self) -> Result<VmState, VmRunError> {
        match self.state {
            VmState::Running => (),
            VmState::Halted => return Ok(VmState::Halted),
            VmState::Fatal(pc) => return Err(VmRunError::FetchError(pc)),
        }

        if self.pc == Address::new(addr::HALT) {
            debug!("halted after {} cycles", self.cycles);
            self.state = VmState::Halted;
            return Ok(self.state);
        }

        match self.execute() {
            Ok(next) => {
                self.pc = next;
                Ok(self.state)
            }
            Err(e) => {
                self.state = VmState::Fatal(self.pc);
                Err(e)
            }
        }
    }

    /// Fetch, decode and execute the instruction at `pc`, yield the next `pc`
    fn execute(&mut self) -> Result<Address, VmRunError> {
        let mut ptr = self.pc;
        let instr = Instruction::decode(self.fetch_byte(&mut ptr)?);
        trace!("{}: {instr:?} flag={} cycles={}", self.pc, self.flag, self.cycles);

        match instr {
            Instruction::Branch { indirect } => self.branch(indirect, ptr),
            Instruction::Nand { width, itself, redirect_src, redirect_dst } => {
                self.nand(width, itself, redirect_src, redirect_dst, ptr)
            }
        }
    }

    /// Jump if the flag is set
    fn branch(&mut self, indirect: bool, mut ptr: Address) -> Result<Address, VmRunError> {
        let target = self.fetch_address(&mut ptr)?;
        let target = self.redirect(target, indirect)?;
        self.cycles += cycles::BRANCH;

        Ok(if self.flag { target } else { ptr })
    }

    /// `dst ← ¬(src ∧ dst)`, or port access if `dst` is a port
    fn nand(
        &mut self,
        width: Width,
        itself: bool,
        redirect_src: bool,
        redirect_dst: bool,
        mut ptr: Address,
    ) -> Result<Address, VmRunError> {
        let src = self.fetch_address(&mut ptr)?;
        let src = self.redirect(src, redirect_src)?;
        let dst = match itself {
            true => src,
            false => {
                let dst = self.fetch_address(&mut ptr)?;
                self.redirect(dst, redirect_dst)?
            }
        };

        match dst.get() {
            addr::READ_PORT => {
                match self.port.read() {
                    Some(byte) => {
                        let cell = Address::new(addr::IO_CELL);
                        self.memory.write(cell, byte);
                        if let Some(old) = self.memory.cancel_decay(cell) {
                            trace!("{cell}: input cancels decay {old:?}");
                        }
                    }
                    None => debug!("{}: input ended, I/O cell kept", self.pc),
                }
                return Ok(self.port_done(ptr));
            }
            addr::WRITE_PORT => {
                let byte = self.load(Address::new(addr::IO_CELL));
                self.port.write(byte);
                return Ok(self.port_done(ptr));
            }
            _ => (),
        }

        match width {
            Width::Byte => {
                let value = !(self.load(src) & self.load(dst));
                self.memory.write(dst, value);
                self.flag = value != 0;
                self.cycles += cycles::BYTE_NAND;
                self.decay(dst, Granularity::Byte);
            }
            Width::Bit(bit) => {
                let mask = 1 << bit;
                let s = self.load(src) & mask != 0;
                let byte = self.load(dst);
                let d = byte & mask != 0;

                let result = !(s && d);
                self.memory.write(dst, if result { byte | mask } else { byte & !mask });
                self.flag = result;
                self.cycles += cycles::BIT_NAND;
                self.decay(dst, Granularity::Bit(bit));
            }
        }

        Ok(ptr)
    }

    #[inline]
    fn port_done(&mut self, ptr: Address) -> Address {
        self.flag = true;
        self.cycles += cycles::IO;
        ptr
    }

    /// Schedule loss of the just written cell
    #[inline]
    fn decay(&mut self, addr: Address, granularity: Granularity) {
        let deadline = self.cycles + cycles::DECAY;
        if let Some(old) = self.memory.schedule_decay(addr, deadline, granularity) {
            trace!("{addr}: decay {old:?} replaced");
        }
    }

    /// Logical read at the current cycle
    #[inline(always)]
    fn load(&mut self, addr: Address) -> u8 {
        self.memory.read(addr, self.cycles)
    }

    /// Read a byte of the instruction being decoded and advance `ptr`
    fn fetch_byte(&mut self, ptr: &mut Address) -> Result<u8, VmRunError> {
        if *ptr == Address::new(addr::HALT) {
            debug!("{}: fetch at {ptr}", self.pc);
            return Err(VmRunError::FetchError(self.pc));
        }

        let byte = self.load(*ptr);
        *ptr += 1_u8;
        Ok(byte)
    }

    /// Read a little-endian address and advance `ptr` past it
    fn fetch_address(&mut self, ptr: &mut Address) -> Result<Address, VmRunError> {
        let lo = self.fetch_byte(ptr)?;
        let hi = self.fetch_byte(ptr)?;
        Ok(Address::new(u16::from_le_bytes([lo, hi])))
    }

    /// Treat `target` as a pointer to the real address if `redirect` is set
    #[inline]
    fn redirect(&mut self, target: Address, redirect: bool) -> Result<Address, VmRunError> {
        match redirect {
            true => self.fetch_address(&mut { target }),
            false => Ok(target),
        }
    }
}

//! Instruction trace and single-stepping

use {
    crate::symbols::SymbolTable,
    nandbytecode::{addr, disasm},
    nandvm::{io::Port, Vm},
    std::io::{self, BufRead, Write},
};

/// Observes the VM between instructions, never touches it
#[derive(Debug)]
pub struct Tracer {
    symbols: SymbolTable,
    trace: bool,
    step: bool,
}

impl Tracer {
    pub fn new(symbols: SymbolTable, trace: bool, step: bool) -> Self {
        Self { symbols, trace, step }
    }

    /// Trace line for the instruction at the instruction pointer
    pub fn line<P: Port, const Q: usize>(&self, vm: &Vm<P, Q>) -> String {
        let pc = vm.pc();
        let bytes = (0..5_u16)
            .map(|i| pc + i)
            .take_while(|a| a.get() != addr::HALT)
            .map(|a| vm.peek(a))
            .collect::<Vec<_>>();

        let mut text = String::new();
        if let Err(e) = disasm(&bytes, &mut text) {
            text = format!("?? ({e})");
        }

        format!(
            "{}: {text}  [flag={} cycles={}]",
            self.symbols.resolve(pc),
            u8::from(vm.flag()),
            vm.cycles()
        )
    }

    /// Before each instruction, silent once the machine is about to halt
    pub fn before<P: Port, const Q: usize>(&self, vm: &Vm<P, Q>) {
        if (self.trace || self.step) && vm.pc().get() != addr::HALT {
            eprintln!("{}", self.line(vm));
        }
    }

    /// After each instruction, waits for a line on `confirm` when stepping
    ///
    /// End of `confirm` turns stepping off.
    pub fn after(&mut self, confirm: &mut impl BufRead) -> io::Result<()> {
        if !self.step {
            return Ok(());
        }

        eprint!("[step] ");
        io::stderr().flush()?;

        let mut line = String::new();
        if confirm.read_line(&mut line)? == 0 {
            log::warn!("Confirmation input ended, running to completion");
            self.step = false;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use {super::*, nandvm::io::BufferPort};

    fn tracer(symbols: &str, step: bool) -> Tracer {
        Tracer::new(symbols.parse().unwrap(), true, step)
    }

    #[test]
    fn line_shows_symbol_and_instruction() {
        let vm = Vm::<_, 1>::new(BufferPort::default(), &[0x40, 0x34, 0x12]);
        assert_eq!(
            tracer("main 0", false).line(&vm),
            "main+0x0: br *0x1234  [flag=0 cycles=0]"
        );
    }

    #[test]
    fn line_near_end_of_memory() {
        let mut image = vec![0; 0xFFFE];
        image.push(0x80);
        let mut vm = Vm::<_, 1>::new(BufferPort::default(), &image);
        while vm.pc().get() != 0xFFFC {
            vm.step().unwrap();
        }

        assert_eq!(
            tracer("", false).line(&vm),
            format!("unknown+0xfffc: br 0x8000  [flag=0 cycles={}]", vm.cycles())
        );
    }

    #[test]
    fn stepping_stops_at_end_of_confirmation() {
        let mut tracer = tracer("", true);
        let mut confirm = io::Cursor::new(b"\n".to_vec());
        tracer.after(&mut confirm).unwrap();
        assert!(tracer.step);
        tracer.after(&mut confirm).unwrap();
        assert!(!tracer.step);
    }
}

//! NAND Machine Runtime
//!
//! Loads a flat image, wires the machine's port to standard input and
//! output and runs it to completion, optionally tracing or single-stepping.

pub mod error;
pub mod image;
pub mod logger;
pub mod port;
pub mod symbols;
pub mod trace;

pub use error::RtError;

use {
    argh::FromArgs,
    image::Image,
    nandvm::{io::Port, Vm, VmRunOk},
    port::StdPort,
    symbols::SymbolTable,
    std::io,
    trace::Tracer,
};

/// Run a NAND machine image
#[derive(Debug, Default, FromArgs, PartialEq)]
pub struct Args {
    /// path to the binary image
    #[argh(positional)]
    pub image: Option<String>,

    /// symbol table, whitespace-separated name/address pairs
    #[argh(option, short = 's')]
    pub symbols: Option<String>,

    /// trace every instruction, needs --symbols
    #[argh(switch, short = 'd')]
    pub debug: bool,

    /// pause for a line on stdin after every instruction
    #[argh(switch, short = 't')]
    pub step: bool,
}

/// Summary of a finished run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Exit {
    pub cycles: u64,
}

/// Load the image named by `args` and run it on standard input and output
pub fn run(args: &Args) -> Result<Exit, RtError> {
    let path = args.image.as_deref().ok_or(RtError::NoProgram)?;
    let tracer = tracer(args)?;
    let image = Image::load(path)?;

    execute(StdPort::std(), &image, tracer).map(|(exit, _)| exit)
}

/// Build the tracer requested by `args`
///
/// A bad symbol table is only fatal in debug mode.
pub fn tracer(args: &Args) -> Result<Option<Tracer>, RtError> {
    let symbols = match (&args.symbols, args.debug) {
        (None, true) => return Err(RtError::MissingSymbolArgument),
        (None, false) => SymbolTable::default(),
        (Some(path), debug) => match SymbolTable::load(path) {
            Ok(table) => {
                log::info!("{} symbols loaded from \"{path}\"", table.len());
                table
            }
            Err(e) if debug => return Err(RtError::BadSymbolTable(path.clone(), e)),
            Err(e) => {
                log::warn!("Ignoring symbol table \"{path}\": {e}");
                SymbolTable::default()
            }
        },
    };

    Ok((args.debug || args.step).then(|| Tracer::new(symbols, args.debug, args.step)))
}

/// Run `image` to completion
///
/// Returns the port so callers can inspect what the program wrote.
pub fn execute<P: Port>(
    port: P,
    image: &[u8],
    tracer: Option<Tracer>,
) -> Result<(Exit, P), RtError> {
    let Some(mut tracer) = tracer else {
        let mut vm = Vm::<_, 0>::new(port, image);
        vm.run()?;
        return Ok((Exit { cycles: vm.cycles() }, vm.into_port()));
    };

    let mut vm = Vm::<_, 1>::new(port, image);
    loop {
        tracer.before(&vm);
        match vm.run()? {
            VmRunOk::End => break,
            // Port reads stdin too, hold the lock only while confirming
            VmRunOk::Timer => tracer.after(&mut io::stdin().lock()).map_err(RtError::Step)?,
        }
    }

    Ok((Exit { cycles: vm.cycles() }, vm.into_port()))
}

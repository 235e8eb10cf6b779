//! NAND Machine Runtime

use {
    log::LevelFilter,
    nandxrt::{error::EXIT_FINISHED, logger, Args},
    std::process::exit,
};

fn main() {
    let args: Args = argh::from_env();
    logger::init(logger::level(match args.debug {
        true => LevelFilter::Debug,
        false => LevelFilter::Off,
    }));

    match nandxrt::run(&args) {
        Ok(done) => {
            log::info!("Finished after {} cycles", done.cycles);
            eprintln!("[Exited]");
            exit(EXIT_FINISHED);
        }
        Err(e) => {
            eprintln!("{e}");
            exit(e.exit_code());
        }
    }
}

use {
    nandbytecode::{addr, Instruction, Width},
    nandvm::{io::BufferPort, mem::Address},
    nandxrt::{execute, image::Image, tracer, Args, RtError},
    std::{fs, path::PathBuf},
};

/// File under the temp dir, unique per test
fn temp(name: &str, contents: &[u8]) -> PathBuf {
    let path = std::env::temp_dir().join(format!("nandxrt-{}-{name}", std::process::id()));
    fs::write(&path, contents).unwrap();
    path
}

fn args(image: Option<&PathBuf>) -> Args {
    Args { image: image.map(|p| p.display().to_string()), ..Default::default() }
}

/// Read one byte, flip it with a byte NAND against 0xFF, write it, halt
fn invert_program() -> Vec<u8> {
    let nand = |width, src: u16, dst: u16| {
        let instr =
            Instruction::Nand { width, itself: false, redirect_src: false, redirect_dst: false };
        [&[instr.encode()][..], &src.to_le_bytes()[..], &dst.to_le_bytes()[..]].concat()
    };

    let mut program = [
        nand(Width::Byte, 0, addr::READ_PORT),
        nand(Width::Byte, 0x0100, addr::IO_CELL),
        nand(Width::Byte, 0, addr::WRITE_PORT),
        [&[Instruction::Branch { indirect: false }.encode()][..], &addr::HALT.to_le_bytes()[..]]
            .concat(),
    ]
    .concat();

    program.resize(0x0101, 0);
    program[0x0100] = 0xFF;
    program
}

#[test]
fn runs_image_from_file() {
    let path = temp("invert.bin", &invert_program());
    let image = Image::load(&path).unwrap();

    let (exit, port) = execute(BufferPort::new([0x0F]), &image, None).unwrap();
    assert_eq!(port.output, [0xF0]);
    assert_eq!(exit.cycles, 1 + 8 + 1 + 1);
    fs::remove_file(path).unwrap();
}

#[test]
fn traced_run_matches_plain_run() {
    let program = invert_program();
    let symbols = Some(temp("start.sym", b"start 0").display().to_string());
    let args = Args { debug: true, symbols, ..args(None) };
    let tracer = tracer(&args).unwrap();
    assert!(tracer.is_some());

    let (exit, port) = execute(BufferPort::new([0x0F]), &program, tracer).unwrap();
    assert_eq!(port.output, [0xF0]);
    assert_eq!(exit.cycles, 11);
}

#[test]
fn empty_image_halts() {
    let path = temp("empty.bin", b"");
    let image = Image::load(&path).unwrap();
    assert!(image.is_empty());

    let (exit, _) = execute(BufferPort::default(), &image, None).unwrap();
    assert_eq!(exit.cycles, 21845);
    fs::remove_file(path).unwrap();
}

#[test]
fn fetch_error_exit_code() {
    let err = execute(BufferPort::default(), &[0x40, 0xFF, 0xFF], None).unwrap_err();
    assert!(matches!(err, RtError::Fetch(pc) if pc == Address::NULL));
    assert_eq!(err.exit_code(), 3);
    assert_eq!(err.to_string(), "[Fetch error at 0x0000]");
}

#[test]
fn missing_image_path() {
    let err = nandxrt::run(&args(None)).unwrap_err();
    assert!(matches!(err, RtError::NoProgram));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn unreadable_image() {
    let path = std::env::temp_dir().join("nandxrt-does-not-exist.bin");
    let err = nandxrt::run(&args(Some(&path))).unwrap_err();
    assert!(matches!(err, RtError::BadImage(..)));
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn debug_needs_symbols() {
    let err = tracer(&Args { debug: true, ..args(None) }).unwrap_err();
    assert!(matches!(err, RtError::MissingSymbolArgument));
    assert_eq!(err.exit_code(), 4);
}

#[test]
fn bad_symbols_fatal_only_in_debug() {
    let symbols = Some(temp("bad.sym", b"main").display().to_string());

    let err = tracer(&Args { debug: true, symbols: symbols.clone(), ..args(None) }).unwrap_err();
    assert!(matches!(err, RtError::BadSymbolTable(..)));
    assert_eq!(err.exit_code(), 5);

    assert!(tracer(&Args { symbols, ..args(None) }).unwrap().is_none());
}

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cyclenes::{Cartridge, Console, ConsoleConfig};

#[derive(Parser, Debug)]
#[command(name = "cyclenes", version, about = "Cycle-accurate NES core runner.")]
struct Args {
    /// iNES (v1) ROM image to load.
    rom: PathBuf,

    /// Number of frames to run before exiting.
    #[arg(long, default_value_t = 1)]
    frames: u32,

    /// Start execution at this address (hex, e.g. C000) instead of the reset vector.
    #[arg(long, value_name = "HEX", value_parser = parse_hex_u16)]
    entry: Option<u16>,

    /// Print a nestest-style line for every executed instruction.
    #[arg(long, default_value_t = false)]
    trace: bool,

    /// Stop printing trace lines after this many instructions.
    #[arg(long, value_name = "N")]
    trace_limit: Option<usize>,

    /// Raise the default log level to debug.
    #[arg(short, long, default_value_t = false)]
    verbose: bool,

    /// Write the last completed frame to a PNG.
    #[cfg(feature = "screenshot")]
    #[arg(long, value_name = "PATH")]
    screenshot: Option<PathBuf>,
}

fn parse_hex_u16(s: &str) -> Result<u16, String> {
    let digits = s.trim_start_matches('$').trim_start_matches("0x");
    u16::from_str_radix(digits, 16).map_err(|e| format!("invalid hex address {s:?}: {e}"))
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: Args) -> Result<()> {
    let cartridge = Cartridge::from_ines_file(&args.rom)
        .with_context(|| format!("loading {}", args.rom.display()))?;
    let config = ConsoleConfig {
        entry_point: args.entry,
        trace: args.trace,
    };
    let mut console = Console::with_config(cartridge, config);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut printed = 0usize;
    for frame in 0..args.frames {
        let result = console.run_frame();
        if args.trace {
            for record in console.take_trace() {
                if args.trace_limit.is_some_and(|limit| printed >= limit) {
                    break;
                }
                writeln!(out, "{record}")?;
                printed += 1;
            }
        }
        if let Err(err) = result {
            error!(frame, %err, "emulation stopped");
            return Err(err).context("CPU fault");
        }
    }
    out.flush()?;

    let cpu = console.cpu();
    let regs = cpu.registers();
    info!(
        frames = args.frames,
        cpu_cycles = console.cpu_cycles(),
        pc = format_args!("${:04X}", regs.pc),
        last_opcode = format_args!("${:02X}", cpu.opcode()),
        a = format_args!("${:02X}", regs.a),
        x = format_args!("${:02X}", regs.x),
        y = format_args!("${:02X}", regs.y),
        p = format_args!("${:02X}", regs.p.bits()),
        s = format_args!("${:02X}", regs.s),
        "run complete"
    );

    #[cfg(feature = "screenshot")]
    if let Some(path) = &args.screenshot {
        save_screenshot(console.frame(), path)?;
        info!(path = %path.display(), "screenshot written");
    }

    Ok(())
}

#[cfg(feature = "screenshot")]
fn save_screenshot(frame: &[u8], path: &std::path::Path) -> Result<()> {
    use cyclenes::ppu::{HEIGHT, WIDTH, palette};

    let rgba = palette::frame_to_rgba(frame);
    let image = image::RgbaImage::from_raw(WIDTH as u32, HEIGHT as u32, rgba)
        .context("frame buffer has the wrong size")?;
    image
        .save(path)
        .with_context(|| format!("writing {}", path.display()))
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);
    run(args)
}

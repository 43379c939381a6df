mod edge_source;

use std::io::Write as _;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use acurite_core::{Clock, Session};
use edge_source::GpioEdgeSource;

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum OutputFormat {
    /// Raw 14-byte packed `Payload` wire encoding.
    Wire,
    /// Human-readable multi-line rendering via `Payload`'s `Display` impl.
    Human,
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the GPIO character device, e.g. /dev/gpiochip0
    #[arg(short, long, default_value = "/dev/gpiochip0")]
    chip: String,
    /// Offset of the line wired to the 433 MHz receiver's data pin.
    #[arg(short, long)]
    line: u32,
    /// Seconds to wait for a transmission before emitting a timeout record.
    #[arg(short, long, default_value_t = 120)]
    timeout: u32,
    /// How to render decoded payloads on stdout.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Wire)]
    format: OutputFormat,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Wire => write!(f, "wire"),
            OutputFormat::Human => write!(f, "human"),
        }
    }
}

struct SystemClock;

impl Clock for SystemClock {
    fn now_us(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_micros() as u64)
            .unwrap_or(0)
    }
}

pub fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let source = GpioEdgeSource::open(&args.chip, args.line)
        .with_context(|| format!("unable to open {} line {}", args.chip, args.line))?;
    let mut session = Session::new(source, SystemClock);
    session.start();

    info!(chip = %args.chip, line = args.line, "listening for AcuRite transmissions");

    let stdout = std::io::stdout();
    loop {
        match session.available(args.timeout) {
            Some(payload) => match args.format {
                OutputFormat::Wire => {
                    let bytes = payload.to_bytes();
                    let mut handle = stdout.lock();
                    handle
                        .write_all(&bytes)
                        .with_context(|| "failed to write payload to stdout")?;
                    handle.flush().with_context(|| "failed to flush stdout")?;
                }
                OutputFormat::Human => println!("{payload}"),
            },
            None => {
                warn!(timeout = args.timeout, "no transmission received before timeout");
            }
        }
    }
}

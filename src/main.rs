use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use tic_rs::tic::frame::{apply_parity, pack_frame};
use tic_rs::util::hex::{encode_hex_upper, parse_hex_lenient};
use tic_rs::util::LogThrottle;
use tic_rs::{
    init_logger, log_info, BaudRate, Dataset, DecodeOutcome, LastValueCache, ParityCheck,
    SerialByteSource, SerialConfig, SessionConfig, Splitter, TicError, TicSession,
};

#[derive(Parser)]
#[command(name = "tic-cli")]
#[command(about = "CLI tool for the TIC meter protocol")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode datasets from a serial port until interrupted
    Read {
        #[arg(short, long, env = "TIC_PORT")]
        port: String,
        /// 1200 or 9600; detected from --gpio-pin when omitted
        #[arg(short, long, env = "TIC_BAUD")]
        baud: Option<BaudRate>,
        /// BCM pin wired to the TIC line, used for baud rate detection
        #[arg(long)]
        gpio_pin: Option<u8>,
        /// Only print datasets whose value changed
        #[arg(long)]
        changes_only: bool,
        /// One JSON object per line
        #[arg(long)]
        json: bool,
        #[arg(long, default_value = "50")]
        poll_ms: u64,
        /// Seconds without a dataset before the session is reinitialised
        #[arg(long, default_value = "10")]
        stale_secs: u64,
        /// Seconds between baud rate detection attempts after a failure
        #[arg(long, default_value = "5")]
        retry_secs: u64,
    },
    /// Decode wire bytes given as hex
    Decode { hex: String },
    /// Decode a raw capture file
    Replay {
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Print the wire bytes of a one-dataset frame
    Simulate {
        #[arg(long)]
        tag: String,
        #[arg(long)]
        data: String,
        /// TAB splitters instead of SPACE
        #[arg(long)]
        standard: bool,
        /// Also write the raw bytes to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Serialize)]
struct Reading<'a> {
    timestamp: String,
    #[serde(flatten)]
    dataset: &'a Dataset,
}

fn print_dataset(dataset: &Dataset, json: bool) -> Result<()> {
    let timestamp = chrono::Local::now().to_rfc3339();
    if json {
        println!("{}", serde_json::to_string(&Reading { timestamp, dataset })?);
    } else {
        println!("{timestamp} {dataset}");
    }
    Ok(())
}

fn print_decoded(results: Vec<Result<Dataset, TicError>>, json: bool) -> Result<()> {
    for result in results {
        match result {
            Ok(dataset) => print_dataset(&dataset, json)?,
            Err(err) => eprintln!("error: {err}"),
        }
    }
    Ok(())
}

#[cfg(feature = "raspberry-pi")]
fn start_session(
    source: SerialByteSource,
    baud: Option<BaudRate>,
    gpio_pin: Option<u8>,
    config: SessionConfig,
) -> Result<TicSession<SerialByteSource>> {
    use tic_rs::tic::RppalPulseReader;

    match (baud, gpio_pin) {
        (Some(rate), _) => Ok(TicSession::with_fixed_rate(source, rate, config)),
        (None, Some(pin)) => {
            let reader = RppalPulseReader::open(pin, Duration::from_secs(2))?;
            Ok(TicSession::with_detection(source, reader, config))
        }
        (None, None) => bail!("either --baud or --gpio-pin is required"),
    }
}

#[cfg(not(feature = "raspberry-pi"))]
fn start_session(
    source: SerialByteSource,
    baud: Option<BaudRate>,
    gpio_pin: Option<u8>,
    config: SessionConfig,
) -> Result<TicSession<SerialByteSource>> {
    match (baud, gpio_pin) {
        (Some(rate), _) => Ok(TicSession::with_fixed_rate(source, rate, config)),
        (None, Some(_)) => bail!("baud rate detection needs the raspberry-pi feature; pass --baud"),
        (None, None) => bail!("--baud is required"),
    }
}

struct ReadOptions {
    baud: Option<BaudRate>,
    gpio_pin: Option<u8>,
    changes_only: bool,
    json: bool,
    poll: Duration,
    session: SessionConfig,
}

async fn read_loop(port: String, opts: ReadOptions) -> Result<()> {
    // Until detection has run, the port is opened at 1200 baud and retuned
    let mut serial = SerialConfig::new(port, opts.baud.unwrap_or(BaudRate::Baud1200));
    let source = SerialByteSource::open(serial.clone())?;
    let mut session = start_session(source, opts.baud, opts.gpio_pin, opts.session)?;
    let mut cache = LastValueCache::new();
    let mut throttle = LogThrottle::new(5000, 5);
    let mut reopen = false;

    let mut ticker = tokio::time::interval(opts.poll);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = ticker.tick() => {}
        }

        if reopen {
            if let Some(rate) = session.baud_rate() {
                serial.baud_rate = rate;
            }
            match SerialByteSource::open(serial.clone()) {
                Ok(source) => {
                    session.replace_source(source);
                    reopen = false;
                }
                Err(err) => {
                    tic_rs::log_warn_throttled!(throttle, "Reopen failed: {err}");
                    continue;
                }
            }
        }

        loop {
            match session.poll() {
                DecodeOutcome::Produced(dataset) => {
                    if opts.changes_only {
                        cache.forward_if_changed(&dataset, |ds| print_dataset(ds, opts.json))?;
                    } else {
                        print_dataset(&dataset, opts.json)?;
                    }
                }
                DecodeOutcome::Empty => break,
                DecodeOutcome::Error(err) if err.is_protocol_error() => {
                    tic_rs::log_warn_throttled!(throttle, "{err}");
                }
                DecodeOutcome::Error(TicError::SerialPortError(msg)) => {
                    log::error!("{msg}, reopening {}", serial.port);
                    reopen = true;
                    break;
                }
                // Detection and line errors; the session retries on its own timer
                DecodeOutcome::Error(err) => {
                    tic_rs::log_warn_throttled!(throttle, "{err}");
                    break;
                }
            }
        }
    }

    let stats = session.stats();
    log_info(&format!(
        "{} datasets, {} protocol errors ({:.1}%), {} resets",
        stats.datasets_decoded,
        stats.protocol_errors(),
        stats.error_rate(),
        stats.resets
    ));
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logger();

    let cli = Cli::parse();

    match cli.command {
        Commands::Read {
            port,
            baud,
            gpio_pin,
            changes_only,
            json,
            poll_ms,
            stale_secs,
            retry_secs,
        } => {
            let opts = ReadOptions {
                baud,
                gpio_pin,
                changes_only,
                json,
                poll: Duration::from_millis(poll_ms.max(1)),
                session: SessionConfig {
                    stale_after: Duration::from_secs(stale_secs),
                    retry_after: Duration::from_secs(retry_secs),
                    ..SessionConfig::default()
                },
            };
            read_loop(port, opts).await?;
        }
        Commands::Decode { hex } => {
            let bytes = parse_hex_lenient(&hex)?;
            print_decoded(tic_rs::decode_bytes(&bytes), false)?;
        }
        Commands::Replay { file, json } => {
            let bytes = std::fs::read(&file)
                .with_context(|| format!("reading capture {}", file.display()))?;
            log_info(&format!("Replaying {} bytes", bytes.len()));
            print_decoded(tic_rs::decode_bytes(&bytes), json)?;
        }
        Commands::Simulate {
            tag,
            data,
            standard,
            output,
        } => {
            let splitter = if standard {
                Splitter::Standard
            } else {
                Splitter::Historic
            };
            let dataset = Dataset::new(tag, data)?;
            let wire = apply_parity(&pack_frame(&[dataset], splitter), ParityCheck::Even);
            println!("{}", encode_hex_upper(&wire));
            if let Some(path) = output {
                std::fs::write(&path, &wire)
                    .with_context(|| format!("writing {}", path.display()))?;
            }
        }
    }

    Ok(())
}

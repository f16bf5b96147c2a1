//! serialvis - Main Entry Point
//!
//! Headless pipeline runner: wires a reader (serial port or demo generator)
//! to a channel stream and an optional CSV recorder, then drives everything
//! from a single dispatch loop. Rendering frontends consume the same
//! library API; none is started here.

use std::cell::RefCell;
use std::io::Read;
use std::rc::Rc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use serialvis::readers::{AsciiReader, BinaryReader, DemoReader, Reader};
use serialvis::recorder::{CsvOptions, CsvRecorder};
use serialvis::stream::{SharedSink, Stream};
use serialvis::{AppConfig, ReaderKind};

/// Log window statistics every this many acquisition events.
const STATS_EVERY: u64 = 100;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,serialvis=debug")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            tracing::info!(path, "loading config");
            AppConfig::load(&path).with_context(|| format!("loading config from {path}"))?
        }
        None => AppConfig::default(),
    };
    config.validate().context("validating config")?;

    let mut reader: Box<dyn Reader> = match config.reader {
        ReaderKind::Demo => Box::new(DemoReader::new(config.channels)),
        ReaderKind::Binary => Box::new(BinaryReader::new(
            config.channels,
            config.format,
            config.endianness,
        )),
        ReaderKind::Ascii => Box::new(AsciiReader::new(config.delimiter)),
    };

    // The stream mirrors the reader's announced shape as soon as we connect.
    let stream = Rc::new(RefCell::new(Stream::new(0, false, config.window_size)?));
    let stream_sink: SharedSink = stream.clone();
    reader.source_mut().connect(&stream_sink);

    // The recorder cascades off the stream, so it sees exactly the packs
    // that made it into the plot window.
    if let Some(path) = &config.record {
        let recorder = CsvRecorder::create(
            path,
            CsvOptions {
                timestamp: config.record_timestamp,
                ..CsvOptions::default()
            },
        )?;
        let recorder_sink: SharedSink = Rc::new(RefCell::new(recorder));
        stream.borrow_mut().connect_follower(&recorder_sink);
    }

    let rx = spawn_acquisition(&config)?;
    tracing::info!(reader = ?config.reader, window = config.window_size, "pipeline running");

    let mut events: u64 = 0;
    for bytes in rx {
        reader.on_data(&bytes)?;

        events += 1;
        if events % STATS_EVERY == 0 {
            let stream = stream.borrow();
            let bounds = stream
                .channel(0)
                .ok()
                .and_then(|c| c.y_data().value_bounds());
            tracing::info!(
                channels = stream.channel_count(),
                samples = stream.sample_count(),
                ?bounds,
                "window stats"
            );
        }
    }

    tracing::info!("acquisition ended, shutting down");
    Ok(())
}

/// Start the acquisition thread feeding raw events to the dispatch loop.
///
/// Demo mode sends an empty payload per tick; serial mode sends whatever
/// chunk the port produced. Blocking I/O stays off the dispatch thread.
fn spawn_acquisition(config: &AppConfig) -> anyhow::Result<crossbeam_channel::Receiver<Vec<u8>>> {
    let (tx, rx) = crossbeam_channel::bounded::<Vec<u8>>(64);

    match config.reader {
        ReaderKind::Demo => {
            let interval = Duration::from_millis(config.demo_interval_ms);
            std::thread::spawn(move || {
                let ticker = crossbeam_channel::tick(interval);
                for _ in ticker {
                    if tx.send(Vec::new()).is_err() {
                        break;
                    }
                }
            });
        }
        ReaderKind::Binary | ReaderKind::Ascii => {
            let path = config
                .port
                .clone()
                .expect("validated config has a port for serial readers");
            let mut port = serialport::new(&path, config.baud_rate)
                .timeout(Duration::from_millis(100))
                .open()
                .with_context(|| format!("opening serial port {path}"))?;
            tracing::info!(port = path, baud = config.baud_rate, "serial port open");

            std::thread::spawn(move || {
                let mut buf = [0u8; 4096];
                loop {
                    match port.read(&mut buf) {
                        Ok(0) => continue,
                        Ok(n) => {
                            if tx.send(buf[..n].to_vec()).is_err() {
                                break;
                            }
                        }
                        Err(e) if e.kind() == std::io::ErrorKind::TimedOut => continue,
                        Err(e) => {
                            tracing::error!(error = %e, "serial read failed");
                            break;
                        }
                    }
                }
            });
        }
    }

    Ok(rx)
}

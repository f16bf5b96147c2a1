//! # serialvis: streaming serial-data visualizer core
//!
//! Ingests a continuous stream of numeric samples on one or more channels,
//! retains a bounded most-recent window of each channel for live plotting,
//! and fans the data out to independent consumers (renderer, CSV recorder,
//! snapshot) without blocking the ingest path.
//!
//! ## Architecture
//!
//! - **Readers** ([`readers`]): decode device input (binary frames, ASCII
//!   lines, or a built-in demo generator) into [`stream::SamplePack`]s and
//!   publish them through an embedded [`stream::Source`].
//! - **Fan-out graph** ([`stream`]): sources push packs synchronously to
//!   every connected [`stream::Sink`]; sinks can cascade to followers,
//!   forming a tree that observes each pack exactly once before the push
//!   returns.
//! - **Bounded windows** ([`stream::FrameBuffer`]): per-channel circular
//!   stores with logical oldest-first indexing, live resize, and binary
//!   searched visible-range lookup for interactive zoom.
//! - **Consumers**: [`recorder::CsvRecorder`] streams packs to disk;
//!   [`snapshot::Snapshot`] freezes the retained window.
//!
//! Everything runs on a single dispatch thread; blocking device I/O lives on
//! an acquisition thread bridged over a crossbeam channel (see `main.rs`).
//!
//! ## Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use serialvis::readers::{DemoReader, Reader};
//! use serialvis::stream::{SharedSink, Stream};
//!
//! let mut reader = DemoReader::new(2);
//! let stream = Rc::new(RefCell::new(Stream::new(2, false, 1000).unwrap()));
//! let sink: SharedSink = stream.clone();
//! reader.source_mut().connect(&sink);
//!
//! reader.tick().unwrap();
//! assert_eq!(stream.borrow().sample_count(), 1);
//! ```

pub mod config;
pub mod decode;
pub mod error;
pub mod readers;
pub mod recorder;
pub mod snapshot;
pub mod stream;

// Re-export commonly used types
pub use config::{AppConfig, ReaderKind};
pub use decode::{Endianness, SampleFormat};
pub use error::{Result, ResultExt, SerialVisError};
pub use snapshot::Snapshot;
pub use stream::{FrameBuffer, SamplePack, SharedSink, Sink, Source, Stream};

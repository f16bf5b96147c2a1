//! Readers: turn device input into sample packs.
//!
//! A reader owns the producing [`Source`](crate::stream::Source) of the
//! pipeline. The event loop hands it whatever input just became available,
//! and the reader frames/parses it, builds a
//! [`SamplePack`](crate::stream::SamplePack), and publishes it. Device
//! discovery and port configuration live outside the crate; a reader only
//! ever sees bytes.

mod ascii;
mod binary;
mod demo;

pub use ascii::AsciiReader;
pub use binary::BinaryReader;
pub use demo::DemoReader;

use crate::error::Result;
use crate::stream::Source;

/// Common surface of all readers, driven by the dispatch loop.
pub trait Reader {
    /// The embedded source, for connecting and disconnecting sinks.
    fn source_mut(&mut self) -> &mut Source;

    /// Number of channels currently being produced. May be user-configured
    /// or detected from the incoming stream.
    fn num_channels(&self) -> usize;

    /// Pause committing data. A paused reader keeps consuming input so the
    /// stream framing stays synchronized, but publishes nothing.
    fn pause(&mut self, paused: bool);

    /// Handle newly available device input.
    ///
    /// For byte-stream readers `bytes` is the fresh chunk from the device;
    /// the generator reader ignores the payload and treats each call as one
    /// tick.
    fn on_data(&mut self, bytes: &[u8]) -> Result<()>;
}

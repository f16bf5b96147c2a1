//! Core streaming pipeline: sample packs, fan-out graph, channel buffers.
//!
//! Data flows in one direction on a single dispatch thread: a reader decodes
//! device bytes into a [`SamplePack`] and hands it to its [`Source`], which
//! pushes it synchronously to every connected [`Sink`]. The central sink is
//! [`Stream`], which appends each channel's samples into a bounded
//! [`FrameBuffer`] window and re-publishes the pack to follower sinks
//! (recorder, snapshot) before returning.
//!
//! Channel-count changes travel the same graph as announcements and are
//! guaranteed to arrive before the next pack, so every consumer sizes its
//! storage from the announcement rather than by inspecting packs.

mod frame_buffer;
mod sample_pack;
mod sink;
mod source;
#[allow(clippy::module_inception)]
mod stream;

pub use frame_buffer::FrameBuffer;
pub use sample_pack::SamplePack;
pub use sink::{SharedSink, Sink};
pub use source::Source;
pub use stream::{ChannelView, Stream};

//! Receiving end of the fan-out graph.

use std::cell::RefCell;
use std::rc::Rc;

use crate::stream::SamplePack;

/// An endpoint that receives sample packs and channel-count announcements.
///
/// Delivery is synchronous and happens on the single dispatch thread; a
/// `feed_in` implementation must not call back into `connect`/`disconnect`
/// on the producer that triggered it.
///
/// A sink that wants followers (cascading delivery to sub-consumers) embeds
/// its own [`Source`](crate::stream::Source) and re-publishes inside
/// `feed_in` / `set_num_channels`, so the whole tree observes a pack before
/// the original `feed_out` returns.
pub trait Sink {
    /// Called whenever the producer's channel count or X-axis presence
    /// changes, and once on connect. Guaranteed to arrive before the next
    /// `feed_in`; sinks size their storage from this, never from a pack.
    fn set_num_channels(&mut self, num_channels: usize, has_x: bool);

    /// Called once per pack pushed by the producer.
    fn feed_in(&mut self, pack: &SamplePack);
}

/// Shared handle to a sink, as stored in a producer's sink set.
///
/// The graph is single-threaded, so shared ownership is `Rc<RefCell<_>>`:
/// the caller keeps a typed handle for queries while the producer holds a
/// `dyn Sink` clone for delivery.
pub type SharedSink = Rc<RefCell<dyn Sink>>;

/// Identity comparison for sink handles, ignoring vtable metadata.
pub(crate) fn same_sink(a: &SharedSink, b: &SharedSink) -> bool {
    std::ptr::eq(
        Rc::as_ptr(a) as *const u8,
        Rc::as_ptr(b) as *const u8,
    )
}

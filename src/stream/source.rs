//! Producing end of the fan-out graph.
//!
//! A `Source` owns an ordered set of sinks and pushes packs and channel-count
//! announcements to all of them synchronously. Readers embed one to publish
//! decoded data; sinks that cascade to followers embed one as well
//! (composition, never an inheritance chain).

use tracing::trace;

use crate::stream::sink::{same_sink, SharedSink};
use crate::stream::SamplePack;

/// Fan-out endpoint holding the connected sinks.
pub struct Source {
    sinks: Vec<SharedSink>,
    num_channels: usize,
    has_x: bool,
}

impl Source {
    /// Create a source with an initial shape.
    pub fn new(num_channels: usize, has_x: bool) -> Self {
        Self {
            sinks: Vec::new(),
            num_channels,
            has_x,
        }
    }

    /// Channel count of the last announcement.
    #[inline]
    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    /// Whether the last announcement carried an X axis.
    #[inline]
    pub fn has_x(&self) -> bool {
        self.has_x
    }

    /// Number of connected sinks.
    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Connect a sink to this source.
    ///
    /// The sink immediately receives the source's current shape, so a
    /// late-attaching consumer is sized before the first pack arrives.
    /// Connecting an already connected sink is a caller bug.
    pub fn connect(&mut self, sink: &SharedSink) {
        assert!(
            !self.sinks.iter().any(|s| same_sink(s, sink)),
            "sink is already connected"
        );

        self.sinks.push(sink.clone());
        sink.borrow_mut()
            .set_num_channels(self.num_channels, self.has_x);
    }

    /// Disconnect an already connected sink. Disconnecting a sink that is
    /// not connected is a caller bug.
    pub fn disconnect(&mut self, sink: &SharedSink) {
        let pos = self
            .sinks
            .iter()
            .position(|s| same_sink(s, sink))
            .expect("sink is not connected");
        self.sinks.remove(pos);
    }

    /// Push a pack to every connected sink, in registration order.
    ///
    /// The pack's shape must match the last announcement; feeding a pack
    /// that disagrees with it is a caller bug.
    pub fn feed_out(&self, pack: &SamplePack) {
        assert!(
            pack.num_channels() == self.num_channels && pack.has_x() == self.has_x,
            "pack shape ({} channels, x: {}) disagrees with announced shape ({} channels, x: {})",
            pack.num_channels(),
            pack.has_x(),
            self.num_channels,
            self.has_x
        );

        for sink in &self.sinks {
            sink.borrow_mut().feed_in(pack);
        }
    }

    /// Announce a new channel count / X-axis presence to every connected
    /// sink. Must be called before the next `feed_out` whenever the shape
    /// changes.
    pub fn set_num_channels(&mut self, num_channels: usize, has_x: bool) {
        trace!(num_channels, has_x, "announcing channel shape");
        self.num_channels = num_channels;
        self.has_x = has_x;

        for sink in &self.sinks {
            sink.borrow_mut().set_num_channels(num_channels, has_x);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::stream::Sink;

    /// Counting sink that optionally cascades to followers.
    struct TestSink {
        total_fed: usize,
        num_channels: usize,
        has_x: bool,
        followers: Source,
    }

    impl TestSink {
        fn new() -> Rc<RefCell<Self>> {
            Rc::new(RefCell::new(Self {
                total_fed: 0,
                num_channels: 0,
                has_x: false,
                followers: Source::new(0, false),
            }))
        }
    }

    impl Sink for TestSink {
        fn set_num_channels(&mut self, num_channels: usize, has_x: bool) {
            self.num_channels = num_channels;
            self.has_x = has_x;
            self.followers.set_num_channels(num_channels, has_x);
        }

        fn feed_in(&mut self, pack: &SamplePack) {
            assert_eq!(pack.num_channels(), self.num_channels);
            self.total_fed += pack.num_samples();
            self.followers.feed_out(pack);
        }
    }

    #[test]
    fn test_feed_counts_samples() {
        let sink = TestSink::new();
        let shared: SharedSink = sink.clone();

        let mut source = Source::new(3, false);
        source.connect(&shared);
        assert_eq!(sink.borrow().num_channels, 3);

        let pack = SamplePack::new(100, 3, false).unwrap();
        source.feed_out(&pack);
        assert_eq!(sink.borrow().total_fed, 100);
        source.feed_out(&pack);
        assert_eq!(sink.borrow().total_fed, 200);
    }

    #[test]
    fn test_follower_cascade() {
        let sink = TestSink::new();
        let follower = TestSink::new();
        let shared: SharedSink = sink.clone();
        let shared_follower: SharedSink = follower.clone();

        let mut source = Source::new(3, false);
        source.connect(&shared);
        sink.borrow_mut().followers.connect(&shared_follower);

        // follower picked up the shape through the cascade on connect
        assert_eq!(follower.borrow().num_channels, 3);
        assert!(!follower.borrow().has_x);

        let pack = SamplePack::new(100, 3, false).unwrap();
        source.feed_out(&pack);
        assert_eq!(sink.borrow().total_fed, 100);
        assert_eq!(follower.borrow().total_fed, 100);

        // announcements propagate down the tree
        source.set_num_channels(2, true);
        assert_eq!(follower.borrow().num_channels, 2);
        assert!(follower.borrow().has_x);
    }

    #[test]
    fn test_delivery_in_registration_order() {
        struct OrderSink {
            id: usize,
            log: Rc<RefCell<Vec<usize>>>,
        }

        impl Sink for OrderSink {
            fn set_num_channels(&mut self, _: usize, _: bool) {}
            fn feed_in(&mut self, _: &SamplePack) {
                self.log.borrow_mut().push(self.id);
            }
        }

        let log = Rc::new(RefCell::new(Vec::new()));
        let mut source = Source::new(1, false);
        let sinks: Vec<SharedSink> = (0..3)
            .map(|id| {
                Rc::new(RefCell::new(OrderSink {
                    id,
                    log: log.clone(),
                })) as SharedSink
            })
            .collect();
        for s in &sinks {
            source.connect(s);
        }

        let pack = SamplePack::new(1, 1, false).unwrap();
        source.feed_out(&pack);
        assert_eq!(*log.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn test_disconnect_stops_delivery() {
        let sink = TestSink::new();
        let shared: SharedSink = sink.clone();

        let mut source = Source::new(1, false);
        source.connect(&shared);
        assert_eq!(source.sink_count(), 1);

        source.disconnect(&shared);
        assert_eq!(source.sink_count(), 0);

        let pack = SamplePack::new(5, 1, false).unwrap();
        source.feed_out(&pack);
        assert_eq!(sink.borrow().total_fed, 0);
    }

    #[test]
    #[should_panic(expected = "already connected")]
    fn test_duplicate_connect_panics() {
        let sink = TestSink::new();
        let shared: SharedSink = sink;

        let mut source = Source::new(1, false);
        source.connect(&shared);
        source.connect(&shared);
    }

    #[test]
    #[should_panic(expected = "not connected")]
    fn test_disconnect_unconnected_panics() {
        let sink = TestSink::new();
        let shared: SharedSink = sink;

        let mut source = Source::new(1, false);
        source.disconnect(&shared);
    }

    #[test]
    #[should_panic(expected = "disagrees with announced shape")]
    fn test_pack_shape_mismatch_panics() {
        let source = Source::new(2, false);
        let pack = SamplePack::new(5, 3, false).unwrap();
        source.feed_out(&pack);
    }
}

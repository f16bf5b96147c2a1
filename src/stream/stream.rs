//! Channel coordinator: routes incoming packs into per-channel buffers.
//!
//! A `Stream` is the sink side of the ingest path. It owns one
//! [`FrameBuffer`] per announced channel (plus a shared X buffer when the
//! producer announces an X axis), appends every incoming pack into them, and
//! re-publishes each pack to follower sinks so recorders and snapshotters can
//! cascade off the same delivery.

use tracing::debug;

use crate::error::{Result, SerialVisError};
use crate::stream::{FrameBuffer, SamplePack, Sink, Source};

use std::ops::Range;

/// Per-channel sample storage fed by a producer.
///
/// Invariant: all Y buffers and the X buffer (if present) always have equal
/// logical size — a pack is appended to all of them or to none.
pub struct Stream {
    capacity: usize,
    channels: Vec<FrameBuffer>,
    x: Option<FrameBuffer>,
    followers: Source,
}

impl Stream {
    /// Create a stream with `num_channels` buffers of `capacity` samples.
    pub fn new(num_channels: usize, has_x: bool, capacity: usize) -> Result<Self> {
        let mut stream = Self {
            capacity,
            channels: Vec::new(),
            x: None,
            followers: Source::new(num_channels, has_x),
        };
        stream.reshape(num_channels, has_x)?;
        Ok(stream)
    }

    /// Number of active channels.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Whether a shared X buffer is active.
    pub fn has_x(&self) -> bool {
        self.x.is_some()
    }

    /// Logical number of retained samples, as seen by channel 0.
    ///
    /// Identical across all buffers except right after a channel-count
    /// growth, where the freshly added channels start empty and catch up as
    /// packs arrive.
    pub fn sample_count(&self) -> usize {
        self.channels.first().map(FrameBuffer::size).unwrap_or(0)
    }

    /// Current window capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Read-only view of channel `i` paired with the shared X buffer.
    ///
    /// The view borrows the stream; it must be dropped before the next
    /// structural change (resize or channel-count change).
    pub fn channel(&self, i: usize) -> Result<ChannelView<'_>> {
        let y = self
            .channels
            .get(i)
            .ok_or(SerialVisError::ChannelOutOfRange {
                index: i,
                count: self.channels.len(),
            })?;
        Ok(ChannelView {
            index: i,
            y,
            x: self.x.as_ref(),
        })
    }

    /// The shared X buffer, when the producer announced one.
    pub fn x_data(&self) -> Option<&FrameBuffer> {
        self.x.as_ref()
    }

    /// Change the retained-window capacity of every owned buffer.
    ///
    /// All-or-nothing: replacement buffers are allocated first, and the
    /// stream is left unmodified if any allocation fails.
    pub fn resize_window(&mut self, new_capacity: usize) -> Result<()> {
        let mut resized = Vec::with_capacity(self.channels.len());
        for buf in &self.channels {
            resized.push(buf.resized(new_capacity)?);
        }
        let x = match &self.x {
            Some(buf) => Some(buf.resized(new_capacity)?),
            None => None,
        };

        debug!(
            old = self.capacity,
            new = new_capacity,
            "resizing stream window"
        );
        self.channels = resized;
        self.x = x;
        self.capacity = new_capacity;
        Ok(())
    }

    /// Attach a follower sink; it sees every pack this stream receives.
    pub fn connect_follower(&mut self, sink: &crate::stream::SharedSink) {
        self.followers.connect(sink);
    }

    /// Detach a previously attached follower.
    pub fn disconnect_follower(&mut self, sink: &crate::stream::SharedSink) {
        self.followers.disconnect(sink);
    }

    /// Reshape the buffer set to `num_channels` / `has_x`.
    ///
    /// Growing appends fresh buffers, keeping existing channels aligned by
    /// index; shrinking truncates, keeping the lowest-index channels.
    fn reshape(&mut self, num_channels: usize, has_x: bool) -> Result<()> {
        if num_channels < self.channels.len() {
            self.channels.truncate(num_channels);
        }
        while self.channels.len() < num_channels {
            self.channels.push(FrameBuffer::new(self.capacity)?);
        }

        match (has_x, &self.x) {
            (true, None) => self.x = Some(FrameBuffer::new(self.capacity)?),
            (false, Some(_)) => self.x = None,
            _ => {}
        }
        Ok(())
    }
}

impl Sink for Stream {
    fn set_num_channels(&mut self, num_channels: usize, has_x: bool) {
        debug!(num_channels, has_x, "stream reshaping for announcement");
        // Buffer allocation for a channel-count change is not recoverable
        // at this point of the pipeline; the announcement either applies
        // fully or the process is out of memory.
        self.reshape(num_channels, has_x)
            .expect("failed to allocate channel buffers");
        self.followers.set_num_channels(num_channels, has_x);
    }

    fn feed_in(&mut self, pack: &SamplePack) {
        // Rejected wholesale before touching any buffer, so the equal-size
        // invariant over all channels can never be broken.
        assert!(
            pack.num_channels() == self.channels.len(),
            "pack has {} channels, last announcement said {}",
            pack.num_channels(),
            self.channels.len()
        );
        assert!(
            pack.has_x() == self.x.is_some(),
            "pack X presence disagrees with last announcement"
        );

        for (i, buf) in self.channels.iter_mut().enumerate() {
            buf.append(pack.channel(i));
        }
        if let Some(x) = &mut self.x {
            x.append(pack.x_data());
        }

        self.followers.feed_out(pack);
    }
}

/// Read-only view of one channel, resolving X coordinates.
///
/// When the stream has no X buffer the logical index doubles as the X
/// coordinate, matching how an index-based plot labels its horizontal axis.
pub struct ChannelView<'a> {
    index: usize,
    y: &'a FrameBuffer,
    x: Option<&'a FrameBuffer>,
}

impl<'a> ChannelView<'a> {
    /// Index of this channel within the stream.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The channel's sample buffer.
    pub fn y_data(&self) -> &'a FrameBuffer {
        self.y
    }

    /// Number of retained samples.
    pub fn size(&self) -> usize {
        self.y.size()
    }

    /// The `(x, y)` pair at logical index `i`.
    pub fn sample(&self, i: usize) -> Result<(f64, f64)> {
        let y = self.y.sample(i)?;
        let x = match self.x {
            Some(xs) => xs.sample(i)?,
            None => i as f64,
        };
        Ok((x, y))
    }

    /// Logical index range of the samples whose X coordinate falls in
    /// `[lo, hi]`, for restricting render work to the visible range.
    ///
    /// X values are assumed non-decreasing in logical index (they are sample
    /// times or indices under correct use); the result is unspecified
    /// otherwise.
    pub fn window_indices(&self, lo: f64, hi: f64) -> Range<usize> {
        match self.x {
            // sample() can't fail below the buffer size; fall back to the
            // first coordinate on a racing resize rather than panicking.
            Some(xs) => self.y.window_indices(lo, hi, |i| xs.sample(i).unwrap_or(lo)),
            None => self.y.window_indices(lo, hi, |i| i as f64),
        }
    }
}

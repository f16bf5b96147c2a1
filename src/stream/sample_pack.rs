//! Multi-channel sample batch moving through the pipeline.
//!
//! A `SamplePack` carries one read cycle's worth of decoded samples for all
//! channels in a single contiguous allocation, laid out channel-major. A
//! reader fills it once, pushes it through the fan-out graph by reference,
//! and drops it — packs are never retained across read cycles.

use crate::error::{Result, SerialVisError};

/// One delivery unit of multi-channel samples.
///
/// Channel *i*'s samples occupy the contiguous slice
/// `[i * num_samples, (i + 1) * num_samples)` of the backing storage. When
/// constructed with an X axis, a separate array of `num_samples` X values is
/// carried alongside.
#[derive(Debug, Clone)]
pub struct SamplePack {
    num_samples: usize,
    num_channels: usize,
    data: Vec<f64>,
    x: Option<Vec<f64>>,
}

impl SamplePack {
    /// Create a zero-initialized pack.
    ///
    /// Fails only if `num_samples * num_channels` cannot be represented or
    /// allocated.
    pub fn new(num_samples: usize, num_channels: usize, has_x: bool) -> Result<Self> {
        let total = num_samples
            .checked_mul(num_channels)
            .ok_or(SerialVisError::Allocation { requested: usize::MAX })?;

        let mut data = Vec::new();
        data.try_reserve_exact(total)
            .map_err(|_| SerialVisError::Allocation { requested: total })?;
        data.resize(total, 0.0);

        let x = if has_x {
            let mut x = Vec::new();
            x.try_reserve_exact(num_samples)
                .map_err(|_| SerialVisError::Allocation { requested: num_samples })?;
            x.resize(num_samples, 0.0);
            Some(x)
        } else {
            None
        };

        Ok(Self {
            num_samples,
            num_channels,
            data,
            x,
        })
    }

    /// Number of samples per channel.
    #[inline]
    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    /// Number of channels.
    #[inline]
    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    /// Whether this pack carries an explicit X axis.
    #[inline]
    pub fn has_x(&self) -> bool {
        self.x.is_some()
    }

    /// Samples of channel `i`, oldest first.
    ///
    /// Panics if `i >= num_channels()` — a channel index never comes from
    /// outside data, so going past the end is a caller bug.
    #[inline]
    pub fn channel(&self, i: usize) -> &[f64] {
        assert!(
            i < self.num_channels,
            "channel {} out of range ({} channels)",
            i,
            self.num_channels
        );
        &self.data[i * self.num_samples..(i + 1) * self.num_samples]
    }

    /// Mutable samples of channel `i`, for the reader filling the pack.
    ///
    /// Panics if `i >= num_channels()`.
    #[inline]
    pub fn channel_mut(&mut self, i: usize) -> &mut [f64] {
        assert!(
            i < self.num_channels,
            "channel {} out of range ({} channels)",
            i,
            self.num_channels
        );
        &mut self.data[i * self.num_samples..(i + 1) * self.num_samples]
    }

    /// The X values of this pack.
    ///
    /// Panics unless the pack was created with `has_x`.
    #[inline]
    pub fn x_data(&self) -> &[f64] {
        self.x.as_deref().expect("pack has no X axis")
    }

    /// Mutable X values, for the reader filling the pack.
    ///
    /// Panics unless the pack was created with `has_x`.
    #[inline]
    pub fn x_data_mut(&mut self) -> &mut [f64] {
        self.x.as_deref_mut().expect("pack has no X axis")
    }
}

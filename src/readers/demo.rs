//! Demo signal generator.
//!
//! Produces the Fourier components of a square wave, one harmonic per
//! channel, so a multi-channel plot shows visibly distinct, phase-locked
//! waveforms without any hardware attached. Driven by the event loop's
//! timer: every `on_data` call emits one sample per channel.

use std::f64::consts::PI;

use crate::error::Result;
use crate::readers::Reader;
use crate::stream::{SamplePack, Source};

/// Ticks per full waveform period.
const PERIOD: usize = 100;

/// Hardware-free reader generating square-wave Fourier components.
pub struct DemoReader {
    num_channels: usize,
    paused: bool,
    count: usize,
    source: Source,
}

impl DemoReader {
    pub fn new(num_channels: usize) -> Self {
        assert!(num_channels > 0, "demo reader needs at least one channel");
        Self {
            num_channels,
            paused: false,
            count: 0,
            source: Source::new(num_channels, false),
        }
    }

    /// Change the number of generated channels (harmonics).
    pub fn set_num_channels(&mut self, num_channels: usize) {
        assert!(num_channels > 0, "demo reader needs at least one channel");
        self.num_channels = num_channels;
        self.source.set_num_channels(num_channels, false);
    }

    /// Generate and publish one sample per channel.
    pub fn tick(&mut self) -> Result<()> {
        self.count += 1;
        if self.count >= PERIOD {
            self.count = 0;
        }

        if self.paused {
            return Ok(());
        }

        let mut pack = SamplePack::new(1, self.num_channels, false)?;
        for ci in 0..self.num_channels {
            let k = (ci + 1) as f64;
            pack.channel_mut(ci)[0] =
                4.0 * (2.0 * PI * k * self.count as f64 / PERIOD as f64).sin() / (2.0 * k * PI);
        }
        self.source.feed_out(&pack);
        Ok(())
    }
}

impl Reader for DemoReader {
    fn source_mut(&mut self) -> &mut Source {
        &mut self.source
    }

    fn num_channels(&self) -> usize {
        self.num_channels
    }

    fn pause(&mut self, paused: bool) {
        self.paused = paused;
    }

    fn on_data(&mut self, _bytes: &[u8]) -> Result<()> {
        self.tick()
    }
}

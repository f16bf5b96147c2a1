//! Point-in-time snapshots of a stream's retained window.
//!
//! A snapshot owns a copy of every channel (and the X buffer when present)
//! in logical order, so it stays valid while the live stream keeps evicting
//! and reshaping underneath it.

use std::io::Write;

use chrono::Local;

use crate::error::Result;
use crate::stream::Stream;

/// Frozen copy of a stream's channels at capture time.
#[derive(Debug, Clone)]
pub struct Snapshot {
    name: String,
    channels: Vec<Vec<f64>>,
    x: Option<Vec<f64>>,
}

impl Snapshot {
    /// Capture the current retained window of `stream`, named after the
    /// capture time.
    pub fn take(stream: &Stream) -> Self {
        let name = Local::now().format("Snapshot %H:%M:%S").to_string();
        Self::take_named(stream, name)
    }

    /// Capture with an explicit name.
    pub fn take_named(stream: &Stream, name: impl Into<String>) -> Self {
        let channels = (0..stream.channel_count())
            .map(|i| {
                // channel index is in range by construction
                let view = stream.channel(i).expect("channel index in range");
                view.y_data().iter().collect()
            })
            .collect();
        let x = stream.x_data().map(|buf| buf.iter().collect());

        Self {
            name: name.into(),
            channels,
            x,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Number of samples per channel at capture time.
    pub fn sample_count(&self) -> usize {
        self.channels.first().map(Vec::len).unwrap_or(0)
    }

    /// Captured samples of channel `i`, oldest first.
    pub fn channel(&self, i: usize) -> Option<&[f64]> {
        self.channels.get(i).map(Vec::as_slice)
    }

    /// Captured X values, when the stream had an X buffer.
    pub fn x_data(&self) -> Option<&[f64]> {
        self.x.as_deref()
    }

    /// Write the snapshot as CSV, one row per sample.
    pub fn write_csv(&self, mut out: impl Write) -> Result<()> {
        let mut header: Vec<String> = Vec::new();
        if self.x.is_some() {
            header.push("x".to_string());
        }
        header.extend((0..self.channel_count()).map(|i| format!("Channel {}", i + 1)));
        writeln!(out, "{}", header.join(","))?;

        for s in 0..self.sample_count() {
            let mut row: Vec<String> = Vec::new();
            if let Some(x) = &self.x {
                row.push(x[s].to_string());
            }
            row.extend(self.channels.iter().map(|c| c[s].to_string()));
            writeln!(out, "{}", row.join(","))?;
        }
        Ok(())
    }
}

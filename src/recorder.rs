//! CSV recorder sink.
//!
//! Streams every incoming pack to a CSV file as it arrives, one row per
//! sample. Recording taps the same fan-out delivery as plotting — connect
//! the recorder to a reader's source, or attach it as a follower of a
//! [`Stream`](crate::stream::Stream) — so it never sees data the plot
//! doesn't.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use chrono::Local;
use tracing::{error, info, warn};

use crate::error::Result;
use crate::stream::{SamplePack, Sink};

/// Recording options.
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Field separator.
    pub separator: char,
    /// Prepend a wall-clock timestamp column to each row.
    pub timestamp: bool,
    /// Channel names for the header row. Channels beyond the list get
    /// `Channel N` names.
    pub channel_names: Vec<String>,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            separator: ',',
            timestamp: false,
            channel_names: Vec::new(),
        }
    }
}

/// Sink that appends incoming samples to a CSV file.
pub struct CsvRecorder {
    writer: BufWriter<Box<dyn Write>>,
    options: CsvOptions,
    num_channels: usize,
    has_x: bool,
    header_written: bool,
    rows_written: u64,
    /// Set after the first write error; all further packs are dropped.
    failed: bool,
}

impl CsvRecorder {
    /// Record to a file at `path`, truncating any existing content.
    pub fn create(path: impl AsRef<Path>, options: CsvOptions) -> Result<Self> {
        info!(path = %path.as_ref().display(), "recording to CSV");
        let file = File::create(path)?;
        Ok(Self::from_writer(Box::new(file), options))
    }

    /// Record to an arbitrary writer.
    pub fn from_writer(writer: Box<dyn Write>, options: CsvOptions) -> Self {
        Self {
            writer: BufWriter::new(writer),
            options,
            num_channels: 0,
            has_x: false,
            header_written: false,
            rows_written: 0,
            failed: false,
        }
    }

    /// Number of data rows written so far.
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    /// Flush buffered rows to the underlying writer.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    fn channel_name(&self, i: usize) -> String {
        self.options
            .channel_names
            .get(i)
            .cloned()
            .unwrap_or_else(|| format!("Channel {}", i + 1))
    }

    fn write_header(&mut self) -> io::Result<()> {
        let sep = self.options.separator;
        let mut fields = Vec::new();
        if self.options.timestamp {
            fields.push("timestamp".to_string());
        }
        if self.has_x {
            fields.push("x".to_string());
        }
        for i in 0..self.num_channels {
            fields.push(self.channel_name(i));
        }
        writeln!(self.writer, "{}", fields.join(&sep.to_string()))
    }

    fn write_pack(&mut self, pack: &SamplePack) -> io::Result<()> {
        if !self.header_written {
            self.write_header()?;
            self.header_written = true;
        }

        let sep = self.options.separator;
        let now = Local::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string();
        for s in 0..pack.num_samples() {
            if self.options.timestamp {
                write!(self.writer, "{}{}", now, sep)?;
            }
            if self.has_x {
                write!(self.writer, "{}{}", pack.x_data()[s], sep)?;
            }
            for ci in 0..pack.num_channels() {
                if ci > 0 {
                    write!(self.writer, "{}", sep)?;
                }
                write!(self.writer, "{}", pack.channel(ci)[s])?;
            }
            writeln!(self.writer)?;
            self.rows_written += 1;
        }
        Ok(())
    }
}

impl Sink for CsvRecorder {
    fn set_num_channels(&mut self, num_channels: usize, has_x: bool) {
        let changed = num_channels != self.num_channels || has_x != self.has_x;
        if changed && self.header_written {
            warn!(
                old = self.num_channels,
                new = num_channels,
                "channel shape changed mid-recording, writing a new header"
            );
            self.header_written = false;
        }
        self.num_channels = num_channels;
        self.has_x = has_x;
    }

    fn feed_in(&mut self, pack: &SamplePack) {
        if self.failed {
            return;
        }
        if let Err(e) = self.write_pack(pack) {
            error!(error = %e, "CSV write failed, stopping recording");
            self.failed = true;
        }
    }
}

impl Drop for CsvRecorder {
    fn drop(&mut self) {
        if let Err(e) = self.writer.flush() {
            error!(error = %e, "failed to flush recording");
        }
    }
}

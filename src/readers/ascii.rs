//! Delimiter-separated ASCII line reader.
//!
//! Each input line carries one sample per channel, separated by a
//! configurable delimiter. The channel count is detected from the first
//! complete line and announced before the first pack. Since reading usually
//! starts mid-line, the first line is discarded outright.

use tracing::warn;

use crate::error::Result;
use crate::readers::Reader;
use crate::stream::{SamplePack, Source};

/// How many malformed lines to report before going quiet.
const MAX_REPORTED_BAD_LINES: usize = 10;

/// Reader for delimiter-separated numeric text lines.
pub struct AsciiReader {
    delimiter: char,
    /// 0 until detected from the first complete line.
    num_channels: usize,
    paused: bool,
    discard_first_line: bool,
    line: String,
    bad_lines: usize,
    source: Source,
}

impl AsciiReader {
    pub fn new(delimiter: char) -> Self {
        Self {
            delimiter,
            num_channels: 0,
            paused: false,
            discard_first_line: true,
            line: String::new(),
            bad_lines: 0,
            source: Source::new(0, false),
        }
    }

    fn handle_line(&mut self, line: &str) -> Result<()> {
        if self.discard_first_line {
            self.discard_first_line = false;
            return Ok(());
        }

        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            return Ok(());
        }

        let mut values = Vec::new();
        for field in line.split(self.delimiter) {
            match field.trim().parse::<f64>() {
                Ok(v) => values.push(v),
                Err(_) => {
                    self.report_bad_line(line);
                    return Ok(());
                }
            }
        }

        if self.num_channels == 0 {
            self.num_channels = values.len();
            self.source.set_num_channels(self.num_channels, false);
        } else if values.len() != self.num_channels {
            self.report_bad_line(line);
            return Ok(());
        }

        if self.paused {
            return Ok(());
        }

        let mut pack = SamplePack::new(1, self.num_channels, false)?;
        for (ci, &v) in values.iter().enumerate() {
            pack.channel_mut(ci)[0] = v;
        }
        self.source.feed_out(&pack);
        Ok(())
    }

    fn report_bad_line(&mut self, line: &str) {
        self.bad_lines += 1;
        if self.bad_lines <= MAX_REPORTED_BAD_LINES {
            warn!(line, "skipping malformed line");
            if self.bad_lines == MAX_REPORTED_BAD_LINES {
                warn!("further malformed lines will not be reported");
            }
        }
    }
}

impl Reader for AsciiReader {
    fn source_mut(&mut self) -> &mut Source {
        &mut self.source
    }

    fn num_channels(&self) -> usize {
        self.num_channels
    }

    fn pause(&mut self, paused: bool) {
        self.paused = paused;
    }

    fn on_data(&mut self, bytes: &[u8]) -> Result<()> {
        for &b in bytes {
            if b == b'\n' {
                let line = std::mem::take(&mut self.line);
                self.handle_line(&line)?;
            } else {
                self.line.push(b as char);
            }
        }
        Ok(())
    }
}

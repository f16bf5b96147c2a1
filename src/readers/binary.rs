//! Fixed-width binary stream reader.
//!
//! The device sends channel-interleaved frames: one sample per channel, all
//! in the same fixed-width format. The reader carries partial frames across
//! reads, so chunk boundaries from the serial layer never desynchronize the
//! framing.

use tracing::trace;

use crate::decode::{Endianness, SampleFormat};
use crate::error::Result;
use crate::readers::Reader;
use crate::stream::{SamplePack, Source};

/// Reader for channel-interleaved fixed-width binary frames.
pub struct BinaryReader {
    format: SampleFormat,
    endianness: Endianness,
    num_channels: usize,
    paused: bool,
    /// Bytes of an incomplete trailing frame, kept until the next read.
    carry: Vec<u8>,
    source: Source,
}

impl BinaryReader {
    pub fn new(num_channels: usize, format: SampleFormat, endianness: Endianness) -> Self {
        assert!(num_channels > 0, "binary reader needs at least one channel");
        Self {
            format,
            endianness,
            num_channels,
            paused: false,
            carry: Vec::new(),
            source: Source::new(num_channels, false),
        }
    }

    /// Change the number of channels to frame the stream into.
    ///
    /// Announced to all sinks before any further packs; any buffered partial
    /// frame is discarded because its framing no longer applies.
    pub fn set_num_channels(&mut self, num_channels: usize) {
        assert!(num_channels > 0, "binary reader needs at least one channel");
        self.num_channels = num_channels;
        self.carry.clear();
        self.source.set_num_channels(num_channels, false);
    }

    fn frame_size(&self) -> usize {
        self.num_channels * self.format.size_bytes()
    }
}

impl Reader for BinaryReader {
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
        self.carry.extend_from_slice(bytes);

        let frame_size = self.frame_size();
        let num_frames = self.carry.len() / frame_size;
        if num_frames == 0 {
            return Ok(());
        }

        if self.paused {
            // consume to keep framing in sync, commit nothing
            self.carry.drain(..num_frames * frame_size);
            return Ok(());
        }

        // every complete frame available goes out in one pack
        let mut pack = SamplePack::new(num_frames, self.num_channels, false)?;
        let sample_size = self.format.size_bytes();
        for frame in 0..num_frames {
            let base = frame * frame_size;
            for ci in 0..self.num_channels {
                let offset = base + ci * sample_size;
                let value = self
                    .format
                    .decode(&self.carry[offset..offset + sample_size], self.endianness)?;
                pack.channel_mut(ci)[frame] = value;
            }
        }
        self.carry.drain(..num_frames * frame_size);

        trace!(num_frames, "binary reader publishing pack");
        self.source.feed_out(&pack);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::stream::{SharedSink, Stream};

    fn reader_with_stream(
        num_channels: usize,
        format: SampleFormat,
    ) -> (BinaryReader, Rc<RefCell<Stream>>) {
        let mut reader = BinaryReader::new(num_channels, format, Endianness::Little);
        let stream = Rc::new(RefCell::new(Stream::new(num_channels, false, 100).unwrap()));
        let shared: SharedSink = stream.clone();
        reader.source_mut().connect(&shared);
        (reader, stream)
    }

    #[test]
    fn test_frames_decoded_in_channel_order() {
        let (mut reader, stream) = reader_with_stream(2, SampleFormat::U8);

        // two frames: (1, 2) and (3, 4)
        reader.on_data(&[1, 2, 3, 4]).unwrap();

        let stream = stream.borrow();
        assert_eq!(stream.sample_count(), 2);
        assert_eq!(stream.channel(0).unwrap().sample(0).unwrap().1, 1.0);
        assert_eq!(stream.channel(0).unwrap().sample(1).unwrap().1, 3.0);
        assert_eq!(stream.channel(1).unwrap().sample(1).unwrap().1, 4.0);
    }

    #[test]
    fn test_partial_frames_carry_across_reads() {
        let (mut reader, stream) = reader_with_stream(2, SampleFormat::U16);

        // one u16 frame is 4 bytes; split it awkwardly
        reader.on_data(&[0x01]).unwrap();
        assert_eq!(stream.borrow().sample_count(), 0);
        reader.on_data(&[0x00, 0x02]).unwrap();
        assert_eq!(stream.borrow().sample_count(), 0);
        reader.on_data(&[0x00]).unwrap();

        let stream = stream.borrow();
        assert_eq!(stream.sample_count(), 1);
        assert_eq!(stream.channel(0).unwrap().sample(0).unwrap().1, 1.0);
        assert_eq!(stream.channel(1).unwrap().sample(0).unwrap().1, 2.0);
    }

    #[test]
    fn test_split_feeds_match_contiguous_feed() {
        let bytes: Vec<u8> = (0..60).collect();

        let (mut whole, whole_stream) = reader_with_stream(3, SampleFormat::U8);
        whole.on_data(&bytes).unwrap();

        let (mut split, split_stream) = reader_with_stream(3, SampleFormat::U8);
        for chunk in bytes.chunks(7) {
            split.on_data(chunk).unwrap();
        }

        let a: Vec<f64> = whole_stream.borrow().channel(0).unwrap().y_data().iter().collect();
        let b: Vec<f64> = split_stream.borrow().channel(0).unwrap().y_data().iter().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_pause_consumes_without_committing() {
        let (mut reader, stream) = reader_with_stream(1, SampleFormat::U8);

        reader.pause(true);
        reader.on_data(&[1, 2, 3]).unwrap();
        assert_eq!(stream.borrow().sample_count(), 0);

        // framing stayed in sync: next bytes decode cleanly
        reader.pause(false);
        reader.on_data(&[4, 5]).unwrap();
        let got: Vec<f64> = stream.borrow().channel(0).unwrap().y_data().iter().collect();
        assert_eq!(got, vec![4.0, 5.0]);
    }

    #[test]
    fn test_channel_count_change_announces_and_resyncs() {
        let (mut reader, stream) = reader_with_stream(1, SampleFormat::U8);

        reader.on_data(&[1]).unwrap();
        reader.set_num_channels(2);
        assert_eq!(stream.borrow().channel_count(), 2);

        reader.on_data(&[10, 20]).unwrap();
        let stream = stream.borrow();
        assert_eq!(stream.channel(1).unwrap().sample(0).unwrap().1, 20.0);
    }

    #[test]
    fn test_signed_format() {
        let (mut reader, stream) = reader_with_stream(1, SampleFormat::I16);

        reader.on_data(&(-300i16).to_le_bytes()).unwrap();
        assert_eq!(
            stream.borrow().channel(0).unwrap().sample(0).unwrap().1,
            -300.0
        );
    }
}

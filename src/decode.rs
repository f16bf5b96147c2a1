//! Sample decoding from raw device bytes
//!
//! The incoming serial stream carries fixed-width binary samples. Decoding is
//! a pure mapping from `(format, endianness, bytes)` to an `f64` sample value,
//! applied once per sample per channel while a reader builds a
//! [`SamplePack`](crate::stream::SamplePack). No dynamic dispatch is involved;
//! the format is an ordinary enum matched at each call.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SerialVisError};

/// On-wire encoding of a single sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleFormat {
    /// 8-bit unsigned integer
    #[default]
    U8,
    /// 8-bit signed integer
    I8,
    /// 16-bit unsigned integer
    U16,
    /// 16-bit signed integer
    I16,
    /// 32-bit unsigned integer
    U32,
    /// 32-bit signed integer
    I32,
    /// 32-bit floating point
    F32,
    /// 64-bit floating point
    F64,
}

/// Byte order of multi-byte samples on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endianness {
    #[default]
    Little,
    Big,
}

impl SampleFormat {
    /// Width of one encoded sample in bytes.
    pub fn size_bytes(&self) -> usize {
        match self {
            SampleFormat::U8 | SampleFormat::I8 => 1,
            SampleFormat::U16 | SampleFormat::I16 => 2,
            SampleFormat::U32 | SampleFormat::I32 | SampleFormat::F32 => 4,
            SampleFormat::F64 => 8,
        }
    }

    /// Decode one sample from the front of `bytes`.
    ///
    /// Fails if fewer than [`size_bytes`](Self::size_bytes) bytes are
    /// available; extra trailing bytes are ignored.
    pub fn decode(&self, bytes: &[u8], endianness: Endianness) -> Result<f64> {
        if bytes.len() < self.size_bytes() {
            return Err(SerialVisError::Decode(format!(
                "need {} bytes for {:?}, got {}",
                self.size_bytes(),
                self,
                bytes.len()
            )));
        }

        macro_rules! decode_as {
            ($ty:ty, $n:expr) => {{
                let mut buf = [0u8; $n];
                buf.copy_from_slice(&bytes[..$n]);
                match endianness {
                    Endianness::Little => <$ty>::from_le_bytes(buf) as f64,
                    Endianness::Big => <$ty>::from_be_bytes(buf) as f64,
                }
            }};
        }

        Ok(match self {
            SampleFormat::U8 => bytes[0] as f64,
            SampleFormat::I8 => bytes[0] as i8 as f64,
            SampleFormat::U16 => decode_as!(u16, 2),
            SampleFormat::I16 => decode_as!(i16, 2),
            SampleFormat::U32 => decode_as!(u32, 4),
            SampleFormat::I32 => decode_as!(i32, 4),
            SampleFormat::F32 => decode_as!(f32, 4),
            SampleFormat::F64 => decode_as!(f64, 8),
        })
    }
}

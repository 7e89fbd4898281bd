//! Encoders used by [EncodedBuffer](crate::buffer::EncodedBuffer) to convert payloads into the
//! byte representation handed to a sink.

mod bincode_codec;
mod string_codec;

pub use bincode_codec::BincodeEncoder;
pub use string_codec::StringEncoder;

use anyhow::Result;
use bytes::Bytes;

/// Provides an `encode` method for implementors to build their own encoder types.
pub trait Encoder {
    type Item;

    fn encode(&self, item: Self::Item) -> Result<Bytes>;
}

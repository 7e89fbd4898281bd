use super::Encoder;
use anyhow::Result;
use bytes::Bytes;
use serde::Serialize;
use std::marker::PhantomData;

/// Encodes any `Item` implementing [Serialize](serde::Serialize) into a binary format via
/// [bincode].
#[derive(Debug, Clone)]
pub struct BincodeEncoder<Item> {
    _marker: PhantomData<fn(Item)>,
}

impl<Item> Default for BincodeEncoder<Item> {
    fn default() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

/// # Errors
///
/// Returns [Err] if `item` fails to serialize.
impl<Item: Serialize> Encoder for BincodeEncoder<Item> {
    type Item = Item;

    fn encode(&self, item: Self::Item) -> Result<Bytes> {
        Ok(bincode::serialize(&item)?.into())
    }
}

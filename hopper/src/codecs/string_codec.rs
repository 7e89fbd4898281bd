use super::Encoder;
use anyhow::Result;
use bytes::Bytes;

/// Encodes UTF-8 [String] payloads as their raw bytes.
#[derive(Debug, Default, Clone)]
pub struct StringEncoder;

impl Encoder for StringEncoder {
    type Item = String;

    fn encode(&self, item: String) -> Result<Bytes> {
        Ok(item.into())
    }
}

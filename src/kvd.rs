//! Key/value metadata of KTX and KTX2 files.

use crate::{util::align4, HeaderError};

/// One entry of the key/value data.
///
/// Keys are UTF-8 strings. Values are arbitrary bytes, but are often NUL
/// terminated strings (see [`KeyValue::value_str`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyValue {
    pub key: String,
    pub value: Vec<u8>,
}

impl KeyValue {
    /// The value as a string, without the trailing NUL.
    pub fn value_str(&self) -> Option<&str> {
        let value = self.value.strip_suffix(&[0]).unwrap_or(&self.value);
        std::str::from_utf8(value).ok()
    }
}

/// Looks up the entry with the given key.
pub fn find_key<'a>(entries: &'a [KeyValue], key: &str) -> Option<&'a KeyValue> {
    entries.iter().find(|entry| entry.key == key)
}

/// Parses a key/value data section.
///
/// Every entry is a little endian `u32` byte count, the NUL terminated key,
/// the value, and padding to the next multiple of 4 bytes.
pub(crate) fn parse(mut data: &[u8]) -> Result<Vec<KeyValue>, HeaderError> {
    let mut entries = Vec::new();

    while data.len() >= 4 {
        let size = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as u64;
        data = &data[4..];
        if size > data.len() as u64 {
            return Err(HeaderError::InvalidKeyValueData);
        }
        let (entry, rest) = data.split_at(size as usize);

        let key_end = entry
            .iter()
            .position(|&b| b == 0)
            .ok_or(HeaderError::InvalidKeyValueData)?;
        let key = std::str::from_utf8(&entry[..key_end])
            .map_err(|_| HeaderError::InvalidKeyValueData)?;
        entries.push(KeyValue {
            key: key.to_string(),
            value: entry[key_end + 1..].to_vec(),
        });

        // the padding of the last entry may be cut off
        let padding = (align4(size) - size) as usize;
        data = &rest[padding.min(rest.len())..];
    }

    Ok(entries)
}

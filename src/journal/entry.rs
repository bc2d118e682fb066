//! Journal entry format
//!
//! Binary format: [op(u8)] [timestamp(u64)] [key_len(u32)] [key_bytes] [payload_count(u32)] [payload...] [checksum(u64)]
//!
//! A `Put` payload starts with a one-byte value tag followed by the value's items.

use crate::store::{Change, PrefValue};
use bytes::Bytes;
use std::collections::HashSet;
use std::time::{SystemTime, UNIX_EPOCH};

/// Journal operation type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum JournalOperation {
    /// Insert or overwrite a key
    Put = 1,
    /// Delete a key
    Remove = 2,
    /// Delete every key
    Clear = 3,
}

impl JournalOperation {
    /// Convert from u8
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(JournalOperation::Put),
            2 => Some(JournalOperation::Remove),
            3 => Some(JournalOperation::Clear),
            _ => None,
        }
    }
}

const TAG_BOOL: u8 = 1;
const TAG_FLOAT: u8 = 2;
const TAG_INT: u8 = 3;
const TAG_LONG: u8 = 4;
const TAG_STRING: u8 = 5;
const TAG_STRING_SET: u8 = 6;

/// Journal entry
#[derive(Debug, Clone, PartialEq)]
pub struct JournalEntry {
    /// Operation type
    pub op: JournalOperation,
    /// Timestamp (milliseconds since UNIX epoch)
    pub timestamp: u64,
    /// Key (empty for `Clear`)
    pub key: Bytes,
    /// Operation payload (depends on operation type)
    pub payload: Vec<Bytes>,
}

impl JournalEntry {
    /// Create a new journal entry stamped with the current time
    pub fn new(op: JournalOperation, key: Bytes, payload: Vec<Bytes>) -> Self {
        // A clock before 1970 only loses the timestamp, which replay ignores
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        JournalEntry {
            op,
            timestamp,
            key,
            payload,
        }
    }

    /// Build the entry recording a change
    pub fn from_change(change: &Change) -> Self {
        match change {
            Change::Put(key, value) => JournalEntry::new(
                JournalOperation::Put,
                Bytes::copy_from_slice(key.as_bytes()),
                encode_value(value),
            ),
            Change::Remove(key) => JournalEntry::new(
                JournalOperation::Remove,
                Bytes::copy_from_slice(key.as_bytes()),
                Vec::new(),
            ),
            Change::Clear => JournalEntry::new(JournalOperation::Clear, Bytes::new(), Vec::new()),
        }
    }

    /// Decode the change this entry records
    pub fn to_change(&self) -> Result<Change, String> {
        match self.op {
            JournalOperation::Put => {
                let key = self.key_str()?;
                let value = decode_value(&self.payload)?;
                Ok(Change::Put(key, value))
            }
            JournalOperation::Remove => Ok(Change::Remove(self.key_str()?)),
            JournalOperation::Clear => Ok(Change::Clear),
        }
    }

    fn key_str(&self) -> Result<String, String> {
        std::str::from_utf8(&self.key)
            .map(str::to_string)
            .map_err(|_| "Invalid key encoding".to_string())
    }

    /// Serialize to bytes with checksum
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();

        // Operation type (1 byte)
        buf.push(self.op as u8);

        // Timestamp (8 bytes)
        buf.extend_from_slice(&self.timestamp.to_le_bytes());

        // Key length (4 bytes) + key bytes
        buf.extend_from_slice(&(self.key.len() as u32).to_le_bytes());
        buf.extend_from_slice(&self.key);

        // Payload count (4 bytes)
        buf.extend_from_slice(&(self.payload.len() as u32).to_le_bytes());

        // Each payload: length (4 bytes) + bytes
        for item in &self.payload {
            buf.extend_from_slice(&(item.len() as u32).to_le_bytes());
            buf.extend_from_slice(item);
        }

        // Checksum (8 bytes) - xxhash64 of all previous bytes
        let checksum = xxhash_rust::xxh64::xxh64(&buf, 0);
        buf.extend_from_slice(&checksum.to_le_bytes());

        buf
    }

    /// Deserialize from bytes with checksum verification.
    /// Returns the entry and the number of bytes it used.
    pub fn from_bytes(data: &[u8]) -> Result<(Self, usize), String> {
        // Minimum: 1 (op) + 8 (ts) + 4 (key_len) + 4 (payload_count) + 8 (checksum)
        if data.len() < 25 {
            return Err("Insufficient data".to_string());
        }

        let mut pos = 0;

        let op = JournalOperation::from_u8(data[pos]).ok_or("Invalid operation type")?;
        pos += 1;

        let timestamp = read_u64(data, pos).ok_or("Invalid timestamp")?;
        pos += 8;

        let key_len = read_u32(data, pos).ok_or("Invalid key length")? as usize;
        pos += 4;

        if pos + key_len > data.len() {
            return Err("Invalid key length".to_string());
        }

        let key = Bytes::copy_from_slice(&data[pos..pos + key_len]);
        pos += key_len;

        let payload_count = read_u32(data, pos).ok_or("Missing payload count")? as usize;
        pos += 4;

        // Each item needs at least its 4-byte length, so a huge count is garbage
        if payload_count > (data.len() - pos) / 4 {
            return Err("Invalid payload count".to_string());
        }

        let mut payload = Vec::with_capacity(payload_count);
        for _ in 0..payload_count {
            let item_len = read_u32(data, pos).ok_or("Missing payload length")? as usize;
            pos += 4;

            if pos + item_len > data.len() {
                return Err("Invalid payload item length".to_string());
            }

            payload.push(Bytes::copy_from_slice(&data[pos..pos + item_len]));
            pos += item_len;
        }

        let stored_checksum = read_u64(data, pos).ok_or("Missing checksum")?;
        let calculated_checksum = xxhash_rust::xxh64::xxh64(&data[..pos], 0);
        pos += 8;

        if stored_checksum != calculated_checksum {
            return Err(format!(
                "Checksum mismatch: expected {}, got {}",
                stored_checksum, calculated_checksum
            ));
        }

        Ok((
            JournalEntry {
                op,
                timestamp,
                key,
                payload,
            },
            pos,
        ))
    }
}

fn read_u32(data: &[u8], pos: usize) -> Option<u32> {
    let bytes = data.get(pos..pos + 4)?;
    Some(u32::from_le_bytes(bytes.try_into().ok()?))
}

fn read_u64(data: &[u8], pos: usize) -> Option<u64> {
    let bytes = data.get(pos..pos + 8)?;
    Some(u64::from_le_bytes(bytes.try_into().ok()?))
}

/// Encode a value as a tagged payload
pub fn encode_value(value: &PrefValue) -> Vec<Bytes> {
    match value {
        PrefValue::Bool(b) => vec![tag(TAG_BOOL), Bytes::copy_from_slice(&[*b as u8])],
        PrefValue::Float(f) => vec![tag(TAG_FLOAT), Bytes::copy_from_slice(&f.to_bits().to_le_bytes())],
        PrefValue::Int(i) => vec![tag(TAG_INT), Bytes::copy_from_slice(&i.to_le_bytes())],
        PrefValue::Long(l) => vec![tag(TAG_LONG), Bytes::copy_from_slice(&l.to_le_bytes())],
        PrefValue::String(s) => vec![tag(TAG_STRING), Bytes::copy_from_slice(s.as_bytes())],
        PrefValue::StringSet(set) => {
            let mut payload = Vec::with_capacity(set.len() + 1);
            payload.push(tag(TAG_STRING_SET));
            payload.extend(set.iter().map(|s| Bytes::copy_from_slice(s.as_bytes())));
            payload
        }
    }
}

fn tag(t: u8) -> Bytes {
    Bytes::copy_from_slice(&[t])
}

/// Decode a tagged payload back into a value
pub fn decode_value(payload: &[Bytes]) -> Result<PrefValue, String> {
    let (tag, items) = payload
        .split_first()
        .ok_or("PUT operation requires value payload")?;

    if tag.len() != 1 {
        return Err("Invalid value tag".to_string());
    }

    match tag[0] {
        TAG_BOOL => match &single(items)?[..] {
            [0] => Ok(PrefValue::Bool(false)),
            [1] => Ok(PrefValue::Bool(true)),
            _ => Err("Invalid bool value".to_string()),
        },
        TAG_FLOAT => {
            let raw = <[u8; 4]>::try_from(&single(items)?[..]).map_err(|_| "Invalid float value")?;
            Ok(PrefValue::Float(f32::from_bits(u32::from_le_bytes(raw))))
        }
        TAG_INT => {
            let raw = <[u8; 4]>::try_from(&single(items)?[..]).map_err(|_| "Invalid int value")?;
            Ok(PrefValue::Int(i32::from_le_bytes(raw)))
        }
        TAG_LONG => {
            let raw = <[u8; 8]>::try_from(&single(items)?[..]).map_err(|_| "Invalid long value")?;
            Ok(PrefValue::Long(i64::from_le_bytes(raw)))
        }
        TAG_STRING => {
            let s = std::str::from_utf8(single(items)?).map_err(|_| "Invalid string encoding")?;
            Ok(PrefValue::String(s.to_string()))
        }
        TAG_STRING_SET => {
            let mut set = HashSet::with_capacity(items.len());
            for item in items {
                let s = std::str::from_utf8(item).map_err(|_| "Invalid string set encoding")?;
                set.insert(s.to_string());
            }
            Ok(PrefValue::StringSet(set))
        }
        other => Err(format!("Unknown value tag {}", other)),
    }
}

fn single(items: &[Bytes]) -> Result<&Bytes, String> {
    match items {
        [item] => Ok(item),
        _ => Err(format!("Expected 1 value item, got {}", items.len())),
    }
}

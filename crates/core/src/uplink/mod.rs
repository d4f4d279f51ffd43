//! Uplink Record
//!
//! Append-only tag-length-value record built once per orchestrator round.
//! The orchestrator owns the record; modules only append to it.
//!
//! # Wire Format
//!
//! Each entry is `tag:u8, len:u8, value[len]`. Entries follow each other
//! with no padding. A zero-length entry is valid and meaningful (e.g. "scan
//! ran, nothing seen").
//!
//! # Overflow
//!
//! Capacity is checked before anything is written. An entry that does not
//! fit returns [`UplinkError::Overflow`] and leaves the record untouched;
//! entries are never silently truncated.

use core::fmt;

use heapless::Vec;

/// Maximum encoded record size in bytes
pub const UPLINK_MAX_LEN: usize = 255;

/// Maximum value length of a single entry (one-byte length field)
pub const TLV_MAX_VALUE_LEN: usize = u8::MAX as usize;

/// Size of the tag and length header
pub const TLV_HEADER_LEN: usize = 2;

/// Record identifiers used by the sensor modules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum UplinkTag {
    /// GPS fix (22 bytes) or GPS failure status (1 byte)
    Gps = 0x03,
    /// Strongest proximity beacons, 5 bytes each
    BleCurrent = 0x06,
    /// Beacon error set, 1 byte
    BleErrorMask = 0x07,
}

impl UplinkTag {
    /// Decode a tag byte
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x03 => Some(UplinkTag::Gps),
            0x06 => Some(UplinkTag::BleCurrent),
            0x07 => Some(UplinkTag::BleErrorMask),
            _ => None,
        }
    }
}

/// Errors from building an uplink record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UplinkError {
    /// Entry does not fit in the remaining record space
    Overflow {
        /// Bytes the entry needs, header included
        needed: usize,
        /// Bytes left in the record
        remaining: usize,
    },
    /// Value longer than a one-byte length can describe
    ValueTooLong(usize),
    /// Writer asked to put more bytes than the entry declared
    EntryOverrun,
}

impl fmt::Display for UplinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UplinkError::Overflow { needed, remaining } => write!(
                f,
                "uplink record overflow: entry needs {} bytes, {} remaining",
                needed, remaining
            ),
            UplinkError::ValueTooLong(len) => {
                write!(f, "uplink value of {} bytes exceeds {}", len, TLV_MAX_VALUE_LEN)
            }
            UplinkError::EntryOverrun => write!(f, "write past declared entry length"),
        }
    }
}

/// Append-only TLV record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UplinkRecord {
    buf: Vec<u8, UPLINK_MAX_LEN>,
}

impl UplinkRecord {
    /// Create an empty record
    pub const fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Reserve an entry of `len` value bytes and return a writer for it.
    ///
    /// The value area is zero-filled on reservation, so the record is
    /// well-formed even if the writer fills fewer bytes than declared.
    pub fn entry(&mut self, tag: UplinkTag, len: usize) -> Result<EntryWriter<'_>, UplinkError> {
        if len > TLV_MAX_VALUE_LEN {
            return Err(UplinkError::ValueTooLong(len));
        }
        let needed = TLV_HEADER_LEN + len;
        let remaining = self.remaining();
        if needed > remaining {
            return Err(UplinkError::Overflow { needed, remaining });
        }

        const ZEROS: [u8; TLV_MAX_VALUE_LEN] = [0; TLV_MAX_VALUE_LEN];
        // Capacity checked above; these cannot fail
        let header = [tag as u8, len as u8];
        self.buf
            .extend_from_slice(&header)
            .map_err(|_| UplinkError::Overflow { needed, remaining })?;
        self.buf
            .extend_from_slice(&ZEROS[..len])
            .map_err(|_| UplinkError::Overflow { needed, remaining })?;

        let start = self.buf.len() - len;
        Ok(EntryWriter {
            slot: &mut self.buf[start..],
            pos: 0,
        })
    }

    /// Append a complete entry
    pub fn append(&mut self, tag: UplinkTag, value: &[u8]) -> Result<(), UplinkError> {
        self.entry(tag, value.len())?.put_bytes(value)
    }

    /// Append a zero-length entry
    pub fn append_marker(&mut self, tag: UplinkTag) -> Result<(), UplinkError> {
        self.entry(tag, 0).map(|_| ())
    }

    /// Encoded bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Encoded length in bytes
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// No entries appended
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Bytes still available
    pub fn remaining(&self) -> usize {
        UPLINK_MAX_LEN - self.buf.len()
    }

    /// Iterate over the entries
    pub fn entries(&self) -> TlvIter<'_> {
        TlvIter::new(&self.buf)
    }
}

/// Bounded writer over one reserved entry
pub struct EntryWriter<'a> {
    slot: &'a mut [u8],
    pos: usize,
}

impl EntryWriter<'_> {
    /// Write raw bytes
    pub fn put_bytes(&mut self, bytes: &[u8]) -> Result<(), UplinkError> {
        let end = self.pos + bytes.len();
        let dest = self
            .slot
            .get_mut(self.pos..end)
            .ok_or(UplinkError::EntryOverrun)?;
        dest.copy_from_slice(bytes);
        self.pos = end;
        Ok(())
    }

    /// Write one byte
    pub fn put_u8(&mut self, value: u8) -> Result<(), UplinkError> {
        self.put_bytes(&[value])
    }

    /// Write a little-endian `u32`
    pub fn put_u32_le(&mut self, value: u32) -> Result<(), UplinkError> {
        self.put_bytes(&value.to_le_bytes())
    }

    /// Write a little-endian `i32`
    pub fn put_i32_le(&mut self, value: i32) -> Result<(), UplinkError> {
        self.put_bytes(&value.to_le_bytes())
    }

    /// Bytes still to be written in this entry
    pub fn remaining(&self) -> usize {
        self.slot.len() - self.pos
    }
}

/// One decoded entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TlvEntry<'a> {
    /// Raw tag byte
    pub tag: u8,
    /// Value bytes
    pub value: &'a [u8],
}

impl TlvEntry<'_> {
    /// Known tag, if any
    pub fn kind(&self) -> Option<UplinkTag> {
        UplinkTag::from_u8(self.tag)
    }
}

/// Iterator over TLV entries; stops at the first truncated entry
pub struct TlvIter<'a> {
    buf: &'a [u8],
}

impl<'a> TlvIter<'a> {
    /// Iterate over an encoded record
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }
}

impl<'a> Iterator for TlvIter<'a> {
    type Item = TlvEntry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let (&tag, rest) = self.buf.split_first()?;
        let (&len, rest) = rest.split_first()?;
        let len = usize::from(len);
        if rest.len() < len {
            self.buf = &[];
            return None;
        }
        let (value, rest) = rest.split_at(len);
        self.buf = rest;
        Some(TlvEntry { tag, value })
    }
}

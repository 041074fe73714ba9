//! Big-endian cursor over raw classfile bytes

use byteorder::{BigEndian, ReadBytesExt};
use std::io::Cursor;

use crate::error::{Error, Result};

/// Sequential reader for classfile structures.
///
/// Every read is bounds-checked; running off the end yields a format error
/// rather than a panic. Attribute payloads are read through [`ByteReader::take`],
/// which hands out a reader limited to the declared attribute length.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> ByteReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { cursor: Cursor::new(bytes) }
    }

    pub fn position(&self) -> usize {
        self.cursor.position() as usize
    }

    pub fn remaining(&self) -> usize {
        self.cursor.get_ref().len().saturating_sub(self.position())
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn read_u1(&mut self) -> Result<u8> {
        Ok(self.cursor.read_u8()?)
    }

    pub fn read_u2(&mut self) -> Result<u16> {
        Ok(self.cursor.read_u16::<BigEndian>()?)
    }

    pub fn read_u4(&mut self) -> Result<u32> {
        Ok(self.cursor.read_u32::<BigEndian>()?)
    }

    pub fn read_i4(&mut self) -> Result<i32> {
        Ok(self.cursor.read_i32::<BigEndian>()?)
    }

    pub fn read_f4(&mut self) -> Result<f32> {
        Ok(self.cursor.read_f32::<BigEndian>()?)
    }

    pub fn read_i8(&mut self) -> Result<i64> {
        Ok(self.cursor.read_i64::<BigEndian>()?)
    }

    pub fn read_f8(&mut self) -> Result<f64> {
        Ok(self.cursor.read_f64::<BigEndian>()?)
    }

    /// Skip `count` bytes
    pub fn skip(&mut self, count: usize) -> Result<()> {
        self.take(count).map(|_| ())
    }

    /// Split off a reader over the next `count` bytes and advance past them
    pub fn take(&mut self, count: usize) -> Result<ByteReader<'a>> {
        let start = self.position();
        if count > self.remaining() {
            return Err(Error::format_error(format!(
                "truncated classfile: need {} bytes at offset {}, {} left",
                count,
                start,
                self.remaining()
            )));
        }
        let data: &'a [u8] = *self.cursor.get_ref();
        self.cursor.set_position((start + count) as u64);
        Ok(ByteReader::new(&data[start..start + count]))
    }

    /// Read a u2-length-prefixed modified UTF-8 string (JVMS 4.4.7)
    pub fn read_utf(&mut self) -> Result<String> {
        let length = self.read_u2()? as usize;
        let bytes = self.take(length)?;
        let data: &'a [u8] = *bytes.cursor.get_ref();
        decode_modified_utf8(data)
    }
}

/// Decode modified UTF-8: NUL is encoded as `C0 80` and supplementary
/// characters as surrogate pairs of three-byte sequences.
pub fn decode_modified_utf8(bytes: &[u8]) -> Result<String> {
    let mut units: Vec<u16> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    let continuation = |at: usize| -> Result<u16> {
        match bytes.get(at) {
            Some(b) if b & 0xC0 == 0x80 => Ok((b & 0x3F) as u16),
            _ => Err(Error::format_error(format!("malformed modified UTF-8 at byte {}", at))),
        }
    };
    while i < bytes.len() {
        let b = bytes[i];
        if b & 0x80 == 0 {
            units.push(b as u16);
            i += 1;
        } else if b & 0xE0 == 0xC0 {
            units.push(((b & 0x1F) as u16) << 6 | continuation(i + 1)?);
            i += 2;
        } else if b & 0xF0 == 0xE0 {
            units.push(((b & 0x0F) as u16) << 12 | continuation(i + 1)? << 6 | continuation(i + 2)?);
            i += 3;
        } else {
            return Err(Error::format_error(format!("malformed modified UTF-8 at byte {}", i)));
        }
    }
    Ok(String::from_utf16_lossy(&units))
}

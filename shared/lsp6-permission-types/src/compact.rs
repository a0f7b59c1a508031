//! Compact bytes array: `[u16 length][element]` chunks laid end to end.
//!
//! Both allow-list encodings share this framing; the typed codecs in
//! [`crate::allowed_calls`] and [`crate::data_keys`] add their own element rules on top.

use alloc::vec::Vec;

use crate::error::CodecError;

/// Iterator over the raw elements of a compact bytes array.
///
/// Stops after the first malformed chunk. A zero-length chunk is malformed, and so is any
/// trailing byte that cannot hold a full length prefix.
#[derive(Clone, Debug)]
pub struct CompactArrayReader<'a> {
    bytes: &'a [u8],
    offset: usize,
    failed: bool,
}

impl<'a> CompactArrayReader<'a> {
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            offset: 0,
            failed: false,
        }
    }

    /// Offset of the next length prefix.
    pub const fn offset(&self) -> usize {
        self.offset
    }
}

impl<'a> Iterator for CompactArrayReader<'a> {
    type Item = Result<(usize, &'a [u8]), CodecError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.offset == self.bytes.len() {
            return None;
        }
        let offset = self.offset;
        match read_element(self.bytes, &mut self.offset) {
            Ok(element) => Some(Ok((offset, element))),
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}

fn read_element<'a>(bytes: &'a [u8], i: &mut usize) -> Result<&'a [u8], CodecError> {
    let offset = *i;
    if bytes.len() < offset + 2 {
        return Err(CodecError::Truncated { offset });
    }
    let len = u16::from_be_bytes([bytes[offset], bytes[offset + 1]]) as usize;
    if len == 0 {
        return Err(CodecError::EmptyElement { offset });
    }
    let start = offset + 2;
    if bytes.len() < start + len {
        return Err(CodecError::Truncated { offset });
    }
    *i = start + len;
    Ok(&bytes[start..start + len])
}

/// Append one length-prefixed element.
pub fn write_element(buf: &mut Vec<u8>, element: &[u8]) -> Result<(), CodecError> {
    let len = u16::try_from(element.len())
        .map_err(|_| CodecError::ElementTooLong { len: element.len() })?;
    if len == 0 {
        return Err(CodecError::EmptyElement { offset: buf.len() });
    }
    buf.extend_from_slice(&len.to_be_bytes());
    buf.extend_from_slice(element);
    Ok(())
}

/// Walk the whole array and collect the raw elements.
pub fn split_elements(bytes: &[u8]) -> Result<Vec<&[u8]>, CodecError> {
    CompactArrayReader::new(bytes)
        .map(|item| item.map(|(_, element)| element))
        .collect()
}

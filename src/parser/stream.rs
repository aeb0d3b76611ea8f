use crate::error::{DecodeError, DecodeResult};

/// Little-endian reader over a fixed record
pub struct RecordStream<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> RecordStream<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    fn take<const N: usize>(&mut self) -> DecodeResult<[u8; N]> {
        if self.remaining() < N {
            return Err(DecodeError::Truncated {
                expected: self.pos + N,
                actual: self.data.len(),
            });
        }
        let mut bytes = [0u8; N];
        bytes.copy_from_slice(&self.data[self.pos..self.pos + N]);
        self.pos += N;
        Ok(bytes)
    }

    pub fn skip(&mut self, count: usize) -> DecodeResult<()> {
        if self.remaining() < count {
            return Err(DecodeError::Truncated {
                expected: self.pos + count,
                actual: self.data.len(),
            });
        }
        self.pos += count;
        Ok(())
    }

    pub fn read_u16(&mut self) -> DecodeResult<u16> {
        Ok(u16::from_le_bytes(self.take()?))
    }

    pub fn read_u32(&mut self) -> DecodeResult<u32> {
        Ok(u32::from_le_bytes(self.take()?))
    }

    pub fn read_u64(&mut self) -> DecodeResult<u64> {
        Ok(u64::from_le_bytes(self.take()?))
    }

    pub fn read_i64(&mut self) -> DecodeResult<i64> {
        Ok(i64::from_le_bytes(self.take()?))
    }

    pub fn read_f32(&mut self) -> DecodeResult<f32> {
        Ok(f32::from_le_bytes(self.take()?))
    }

    /// Read a fixed-width Latin-1 text field, trailing NULs removed
    pub fn read_text<const N: usize>(&mut self) -> DecodeResult<String> {
        let raw = self.take::<N>()?;
        Ok(decode_latin1(&raw))
    }
}

/// Latin-1 maps every byte to the code point of the same value
pub fn decode_latin1(raw: &[u8]) -> String {
    let end = raw.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    raw[..end].iter().map(|&b| b as char).collect()
}

/// Inverse of [`decode_latin1`]; characters outside Latin-1 become `?`
pub fn encode_latin1(text: &str, out: &mut [u8]) {
    out.fill(0);
    for (slot, c) in out.iter_mut().zip(text.chars()) {
        *slot = u8::try_from(u32::from(c)).unwrap_or(b'?');
    }
}

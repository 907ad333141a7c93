/// Payload bit packing and count-terminated decoding.
///
/// Codes are written MSB-first into consecutive bytes; the final byte is
/// padded with zero bits. Because padding can itself look like codes
/// (a run of `0` bits decodes to whichever symbol owns `0…`), the decoder
/// stops after the symbol count stored in the header, never at the end
/// of the bits.
use tracing::warn;

use crate::huffman::{Code, CodeTable, ReverseCodeTable};
use crate::{PackError, PackResult};

/// Bit writer, MSB first, accumulating into a byte buffer.
#[derive(Debug, Default)]
pub struct BitWriter {
    buf: Vec<u8>,
    cur: u8,
    filled: u8,
    bits: u64,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            buf: Vec::with_capacity(bytes),
            ..Self::default()
        }
    }

    #[inline]
    pub fn write_bit(&mut self, bit: bool) {
        if bit {
            self.cur |= 1 << (7 - self.filled);
        }
        self.filled += 1;
        self.bits += 1;
        if self.filled == 8 {
            self.buf.push(self.cur);
            self.cur = 0;
            self.filled = 0;
        }
    }

    pub fn write_code(&mut self, code: &Code) {
        for &bit in code.bits() {
            self.write_bit(bit);
        }
    }

    /// Number of bits written so far (excluding padding).
    pub fn bit_len(&self) -> u64 {
        self.bits
    }

    /// Flush the partial byte, zero-padded, and return the buffer.
    pub fn finish(mut self) -> Vec<u8> {
        if self.filled > 0 {
            self.buf.push(self.cur);
        }
        self.buf
    }
}

/// Bit reader, MSB first, over a byte slice.
#[derive(Debug)]
pub struct BitReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Next bit, or `None` once every byte has been consumed.
    #[inline]
    pub fn read_bit(&mut self) -> Option<bool> {
        let byte = *self.data.get(self.pos / 8)?;
        let bit = (byte >> (7 - (self.pos % 8))) & 1;
        self.pos += 1;
        Some(bit == 1)
    }

    /// Bits consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bits left in the underlying slice.
    pub fn remaining(&self) -> usize {
        self.data.len() * 8 - self.pos
    }
}

/// Pack the code of every input byte into a zero-padded payload.
///
/// Returns the payload and the number of meaningful bits in it.
pub fn pack(input: &[u8], table: &CodeTable) -> PackResult<(Vec<u8>, u64)> {
    if input.is_empty() {
        return Ok((Vec::new(), 0));
    }

    // Direct-indexed lookup; the table is a BTreeMap.
    let mut lookup: [Option<&Code>; 256] = [None; 256];
    for (symbol, code) in table.iter() {
        lookup[symbol as usize] = Some(code);
    }

    let mut total_bits = 0u64;
    for &byte in input {
        let code = lookup[byte as usize].ok_or(PackError::UnknownSymbol(byte))?;
        total_bits += code.len() as u64;
    }

    let mut writer = BitWriter::with_capacity(total_bits.div_ceil(8) as usize);
    for &byte in input {
        if let Some(code) = lookup[byte as usize] {
            writer.write_code(code);
        }
    }

    let bits = writer.bit_len();
    Ok((writer.finish(), bits))
}

/// Decode exactly `symbol_count` symbols from `payload`.
///
/// Bits are accumulated one at a time and looked up after each append;
/// the prefix-free property guarantees the first match is the right one.
pub fn unpack(
    payload: &[u8],
    reverse: &ReverseCodeTable,
    symbol_count: u64,
) -> PackResult<Vec<u8>> {
    // Every symbol costs at least one bit, so the payload bounds the output.
    let capacity = symbol_count.min(payload.len() as u64 * 8) as usize;
    let mut output = Vec::with_capacity(capacity);
    let mut reader = BitReader::new(payload);
    let mut acc = Code::new();

    while (output.len() as u64) < symbol_count {
        let bit = reader.read_bit().ok_or(PackError::TruncatedPayload {
            expected: symbol_count,
            decoded: output.len() as u64,
        })?;
        acc.push(bit);

        if let Some(symbol) = reverse.lookup(&acc) {
            output.push(symbol);
            acc.clear();
        } else if acc.len() >= reverse.max_len() {
            return Err(PackError::InvalidCode {
                offset: reader.position() - acc.len(),
            });
        }
    }

    if reader.remaining() >= 8 {
        warn!(
            unused_bytes = reader.remaining() / 8,
            "ignoring trailing bytes after payload"
        );
    }

    Ok(output)
}

//! Self-describing header: original symbol count plus the code table.
//!
//! ```text
//! [symbol_count: u64 LE]
//! for each symbol, ascending:
//!     [symbol] [b'0' | b'1']{code len} [0x00]
//! [0x00]
//! ```
//!
//! `0x00` is both the breaker and a legal symbol, so the reader never
//! classifies a byte by value alone. It tracks which slot it is in:
//!
//! - symbol slot: the first slot always holds a symbol when the count is
//!   nonzero (and must be the end breaker when it is zero). Later slots
//!   treat `0x00` as end-of-header, which is unambiguous because symbols
//!   are strictly ascending and `0x00` can only ever come first.
//! - code slot: `b'0'`/`b'1'` are bits, `0x00` closes the entry, anything
//!   else is corruption.

use crate::huffman::{Code, CodeTable, MAX_CODE_LEN};
use crate::{PackError, PackResult};

/// Entry and end-of-header sentinel.
pub const BREAKER: u8 = 0x00;
/// Serialized form of a 0 bit.
pub const BIT_ZERO: u8 = b'0';
/// Serialized form of a 1 bit.
pub const BIT_ONE: u8 = b'1';

const COUNT_LEN: usize = 8;

/// A parsed header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Number of symbols in the original input.
    pub symbol_count: u64,
    pub table: CodeTable,
}

/// Serialized size of the header for `table`.
pub fn encoded_len(table: &CodeTable) -> usize {
    COUNT_LEN + table.iter().map(|(_, code)| code.len() + 2).sum::<usize>() + 1
}

/// Append the header for `table` and `symbol_count` to `out`.
pub fn write(table: &CodeTable, symbol_count: u64, out: &mut Vec<u8>) {
    out.reserve(encoded_len(table));
    out.extend_from_slice(&symbol_count.to_le_bytes());
    for (symbol, code) in table.iter() {
        out.push(symbol);
        out.extend(
            code.bits()
                .iter()
                .map(|&bit| if bit { BIT_ONE } else { BIT_ZERO }),
        );
        out.push(BREAKER);
    }
    out.push(BREAKER);
}

/// Parse a header from the start of `input`.
///
/// Returns the header and the offset of the first payload byte.
pub fn read(input: &[u8]) -> PackResult<(Header, usize)> {
    let count_bytes: [u8; COUNT_LEN] = input
        .get(..COUNT_LEN)
        .and_then(|b| b.try_into().ok())
        .ok_or_else(|| malformed("truncated symbol count"))?;
    let symbol_count = u64::from_le_bytes(count_bytes);

    let mut pos = COUNT_LEN;
    let mut table = CodeTable::new();
    let mut prev: Option<u8> = None;

    loop {
        let byte = next_byte(input, &mut pos, "symbol")?;
        let symbol = match prev {
            None if symbol_count == 0 => {
                if byte == BREAKER {
                    break;
                }
                return Err(malformed(format!(
                    "code entry for {byte:#04x} with a zero symbol count"
                )));
            }
            None => byte,
            Some(_) if byte == BREAKER => break,
            Some(p) if byte <= p => {
                return Err(malformed(format!(
                    "symbol {byte:#04x} out of order after {p:#04x}"
                )));
            }
            Some(_) => byte,
        };

        let code = read_code(input, &mut pos, symbol)?;
        table.insert(symbol, code);
        prev = Some(symbol);
    }

    if !table.is_prefix_free() {
        return Err(malformed("code table is not prefix-free"));
    }

    Ok((
        Header {
            symbol_count,
            table,
        },
        pos,
    ))
}

fn read_code(input: &[u8], pos: &mut usize, symbol: u8) -> PackResult<Code> {
    let mut code = Code::new();
    loop {
        match next_byte(input, pos, "code bit")? {
            BREAKER => break,
            BIT_ZERO => code.push(false),
            BIT_ONE => code.push(true),
            other => {
                return Err(malformed(format!(
                    "invalid code byte {other:#04x} for symbol {symbol:#04x}"
                )));
            }
        }
        if code.len() > MAX_CODE_LEN {
            return Err(malformed(format!("code for {symbol:#04x} is too long")));
        }
    }
    if code.is_empty() {
        return Err(malformed(format!("empty code for symbol {symbol:#04x}")));
    }
    Ok(code)
}

fn next_byte(input: &[u8], pos: &mut usize, slot: &str) -> PackResult<u8> {
    let byte = *input
        .get(*pos)
        .ok_or_else(|| malformed(format!("unexpected end of header reading {slot}")))?;
    *pos += 1;
    Ok(byte)
}

fn malformed(msg: impl Into<String>) -> PackError {
    PackError::MalformedHeader(msg.into())
}

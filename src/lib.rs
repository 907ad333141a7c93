//! Static Huffman compression for a single byte stream.
//!
//! An encoded buffer is a self-describing header (original symbol count
//! plus the code table) followed by the bit-packed payload:
//!
//! ```text
//! [symbol_count: u64 LE]
//! { [symbol] [b'0' | b'1']+ [0x00] }*   ascending symbol order
//! [0x00]
//! [payload bits, MSB first, zero-padded to a byte]
//! ```
//!
//! ```
//! let packed = huffpack::encode(b"abracadabra").unwrap();
//! assert_eq!(huffpack::decode(&packed).unwrap(), b"abracadabra");
//! ```

pub mod bitstream;
pub mod file;
pub mod frequency;
pub mod header;
pub mod huffman;
pub mod pqueue;

#[cfg(test)]
mod validation;

use std::path::PathBuf;

use tracing::debug;

use crate::huffman::{CodeTable, HuffmanTree};

/// Error types for huffpack operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PackError {
    /// Tried to build a tree from a table with no symbols.
    #[error("cannot build a Huffman tree from an empty frequency table")]
    EmptyFrequencyTable,

    /// The header is truncated or structurally invalid.
    #[error("malformed header: {0}")]
    MalformedHeader(String),

    /// The payload ended before the stored symbol count was reached.
    #[error("truncated payload: decoded {decoded} of {expected} symbols")]
    TruncatedPayload { expected: u64, decoded: u64 },

    /// A run of payload bits matched no code in the table.
    #[error("no code matches payload bits starting at bit {offset}")]
    InvalidCode { offset: usize },

    /// A byte to encode has no entry in the code table.
    #[error("byte {0:#04x} has no code")]
    UnknownSymbol(u8),

    /// Input file does not exist.
    #[error("{}: no such file", .0.display())]
    FileNotFound(PathBuf),

    /// Output file exists and overwriting was not requested.
    #[error("{} already exists", .0.display())]
    OutputExists(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type PackResult<T> = Result<T, PackError>;

/// Header-level facts about an encoded buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    /// Number of bytes in the original input.
    pub symbol_count: u64,
    /// Number of distinct byte values with a code.
    pub distinct: usize,
    /// Size of the serialized header in bytes.
    pub header_len: usize,
    /// Size of the packed payload in bytes.
    pub payload_len: usize,
}

/// Compress `input` into a header followed by the packed payload.
///
/// Empty input produces a header-only buffer with a symbol count of zero.
pub fn encode(input: &[u8]) -> PackResult<Vec<u8>> {
    let freq = frequency::get_frequency(input);
    let table = if freq.is_empty() {
        CodeTable::new()
    } else {
        HuffmanTree::build(&freq)?.code_table()
    };

    let (payload, total_bits) = bitstream::pack(input, &table)?;

    let mut output = Vec::with_capacity(header::encoded_len(&table) + payload.len());
    header::write(&table, input.len() as u64, &mut output);
    let header_len = output.len();
    output.extend_from_slice(&payload);

    debug!(
        input_len = input.len(),
        distinct = table.len(),
        header_len,
        payload_bits = total_bits,
        output_len = output.len(),
        "encoded"
    );
    Ok(output)
}

/// Reconstruct the original bytes from an encoded buffer.
pub fn decode(input: &[u8]) -> PackResult<Vec<u8>> {
    let (header, offset) = header::read(input)?;
    let reverse = header.table.reverse();
    let output = bitstream::unpack(&input[offset..], &reverse, header.symbol_count)?;

    debug!(
        input_len = input.len(),
        distinct = header.table.len(),
        header_len = offset,
        output_len = output.len(),
        "decoded"
    );
    Ok(output)
}

/// Parse only the header of an encoded buffer.
pub fn inspect(input: &[u8]) -> PackResult<Summary> {
    let (header, offset) = header::read(input)?;
    Ok(Summary {
        symbol_count: header.symbol_count,
        distinct: header.table.len(),
        header_len: offset,
        payload_len: input.len() - offset,
    })
}

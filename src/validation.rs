/// Validation tests across the whole encode/decode path.
///
/// These tests verify:
/// 1. **Round-trip correctness** over a broad set of test vectors
/// 2. **Code properties** - prefix-freeness and optimal weighted length
/// 3. **Zero-byte handling** - `0x00` as data next to the `0x00` breaker
/// 4. **Corruption** - damaged buffers produce errors, never panics
/// 5. **Determinism** - identical inputs give identical bytes
#[cfg(test)]
mod tests {
    use crate::frequency;
    use crate::header;
    use crate::huffman::HuffmanTree;
    use crate::{decode, encode, PackError};

    // ---------------------------------------------------------------
    // Helper: generate diverse test vectors
    // ---------------------------------------------------------------

    /// Highly compressible: single byte repeated.
    fn data_all_zeros(n: usize) -> Vec<u8> {
        vec![0u8; n]
    }

    /// Incompressible: every byte value once (uniform distribution, 8 bits entropy).
    fn data_uniform() -> Vec<u8> {
        (0..=255u8).collect()
    }

    /// Skewed distribution: 90% one byte, 10% another.
    fn data_skewed(n: usize) -> Vec<u8> {
        (0..n).map(|i| if i % 10 == 0 { 1 } else { 0 }).collect()
    }

    /// Repetitive text with structure.
    fn data_repeating_text() -> Vec<u8> {
        b"the quick brown fox jumps over the lazy dog. ".repeat(100)
    }

    /// Binary data with some structure (sawtooth).
    fn data_sawtooth(n: usize) -> Vec<u8> {
        (0..n).map(|i| (i % 256) as u8).collect()
    }

    /// Pseudo-random bytes from a fixed-seed xorshift.
    fn data_random(n: usize, seed: u64) -> Vec<u8> {
        let mut state = seed | 1;
        (0..n)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                (state >> 24) as u8
            })
            .collect()
    }

    /// Geometric-ish distribution: byte k appears about 2^(12-k) times.
    fn data_geometric() -> Vec<u8> {
        let mut v = Vec::new();
        for k in 0..12u8 {
            for _ in 0..(1usize << (12 - k)) {
                v.push(k);
            }
        }
        v
    }

    // ---------------------------------------------------------------
    // 1. Round-trip validation
    // ---------------------------------------------------------------

    macro_rules! round_trip_test {
        ($name:ident, $data:expr) => {
            mod $name {
                use super::*;

                #[test]
                fn round_trip() {
                    let input = $data;
                    let encoded = encode(&input).unwrap();
                    let decoded = decode(&encoded).unwrap();
                    assert_eq!(decoded, input, "round-trip failed");
                }

                #[test]
                fn codes_are_prefix_free() {
                    let input = $data;
                    if input.is_empty() {
                        return;
                    }
                    let table = HuffmanTree::from_data(&input).unwrap().code_table();
                    assert!(table.is_prefix_free());
                }

                #[test]
                fn header_records_length() {
                    let input = $data;
                    let encoded = encode(&input).unwrap();
                    let (hdr, _) = header::read(&encoded).unwrap();
                    assert_eq!(hdr.symbol_count, input.len() as u64);
                }
            }
        };
    }

    round_trip_test!(rt_empty, Vec::<u8>::new());
    round_trip_test!(rt_single_byte, vec![42u8]);
    round_trip_test!(rt_single_zero, vec![0u8]);
    round_trip_test!(rt_two_bytes, vec![0u8, 255]);
    round_trip_test!(rt_repeated_a, b"aaaa".to_vec());
    round_trip_test!(rt_zeros_100, data_all_zeros(100));
    round_trip_test!(rt_zeros_5000, data_all_zeros(5000));
    round_trip_test!(rt_uniform, data_uniform());
    round_trip_test!(rt_uniform_reversed, data_uniform().into_iter().rev().collect::<Vec<u8>>());
    round_trip_test!(rt_skewed_1000, data_skewed(1000));
    round_trip_test!(rt_repeating_text, data_repeating_text());
    round_trip_test!(rt_sawtooth_1024, data_sawtooth(1024));
    round_trip_test!(rt_random_small, data_random(37, 7));
    round_trip_test!(rt_random_large, data_random(65536, 0x9E37_79B9));
    round_trip_test!(rt_geometric, data_geometric());

    // ---------------------------------------------------------------
    // 2. Code properties
    // ---------------------------------------------------------------

    mod properties {
        use super::*;

        #[test]
        fn degenerate_alphabet_gets_code_zero() {
            let table = HuffmanTree::from_data(b"aaaa").unwrap().code_table();
            assert_eq!(table.len(), 1);
            assert_eq!(table.get(b'a').unwrap().to_string(), "0");
        }

        #[test]
        fn payload_matches_weighted_length() {
            for input in [data_repeating_text(), data_geometric(), data_random(5000, 3)] {
                let freq = frequency::get_frequency(&input);
                let table = HuffmanTree::build(&freq).unwrap().code_table();
                let bits = table.encoded_bits(&freq);

                let encoded = encode(&input).unwrap();
                let header_len = header::encoded_len(&table);
                assert_eq!((encoded.len() - header_len) as u64, bits.div_ceil(8));
            }
        }

        #[test]
        fn payload_within_one_bit_of_entropy() {
            // Huffman average length lies in [H, H + 1).
            for input in [data_repeating_text(), data_geometric(), data_skewed(4000)] {
                let freq = frequency::get_frequency(&input);
                let table = HuffmanTree::build(&freq).unwrap().code_table();
                let avg = table.encoded_bits(&freq) as f64 / freq.total as f64;
                let h = freq.entropy();
                assert!(avg >= h - 1e-9, "avg {avg} below entropy {h}");
                assert!(avg < h + 1.0, "avg {avg} not within a bit of {h}");
            }
        }

        #[test]
        fn skewed_data_compresses() {
            let mut input = vec![b'a'; 1000];
            input.extend(vec![b'b'; 10]);
            input.extend(vec![b'c'; 5]);
            let encoded = encode(&input).unwrap();
            assert!(
                encoded.len() < input.len() / 4,
                "encoded {} bytes, input {} bytes",
                encoded.len(),
                input.len()
            );
        }
    }

    // ---------------------------------------------------------------
    // 3. Zero-byte hazard
    // ---------------------------------------------------------------

    mod zero_byte {
        use super::*;

        #[test]
        fn zero_mixed_with_text() {
            let input = b"a\0b\0\0c\0".to_vec();
            assert_eq!(decode(&encode(&input).unwrap()).unwrap(), input);
        }

        #[test]
        fn zero_is_most_frequent() {
            let mut input = data_all_zeros(500);
            input.extend_from_slice(b"xyz");
            assert_eq!(decode(&encode(&input).unwrap()).unwrap(), input);
        }

        #[test]
        fn zero_and_one_only() {
            // Symbol bytes 0x00 and 0x01 sit next to 0x00 breakers.
            let input: Vec<u8> = (0..300).map(|i| (i % 3 == 0) as u8).collect();
            assert_eq!(decode(&encode(&input).unwrap()).unwrap(), input);
        }
    }

    // ---------------------------------------------------------------
    // 4. Corruption
    // ---------------------------------------------------------------

    mod corruption {
        use super::*;

        #[test]
        fn every_truncation_errors() {
            let input = b"hello, huffman world".to_vec();
            let encoded = encode(&input).unwrap();
            for len in 0..encoded.len() {
                let result = decode(&encoded[..len]);
                assert!(
                    matches!(
                        result,
                        Err(PackError::MalformedHeader(_)) | Err(PackError::TruncatedPayload { .. })
                    ),
                    "truncation to {len} bytes gave {result:?}"
                );
            }
        }

        #[test]
        fn truncated_payload_reports_progress() {
            let input = data_repeating_text();
            let encoded = encode(&input).unwrap();
            match decode(&encoded[..encoded.len() - 10]) {
                Err(PackError::TruncatedPayload { expected, decoded }) => {
                    assert_eq!(expected, input.len() as u64);
                    assert!(decoded < expected);
                }
                other => panic!("expected TruncatedPayload, got {other:?}"),
            }
        }

        #[test]
        fn inflated_count_is_truncation() {
            let mut encoded = encode(b"abcabc").unwrap();
            encoded[..8].copy_from_slice(&1_000u64.to_le_bytes());
            assert!(matches!(
                decode(&encoded),
                Err(PackError::TruncatedPayload { expected: 1000, .. })
            ));
        }

        #[test]
        fn flipped_bytes_never_panic() {
            let encoded = encode(&data_random(300, 11)).unwrap();
            for i in 0..encoded.len() {
                for mask in [0x01u8, 0x80, 0xFF] {
                    let mut damaged = encoded.clone();
                    damaged[i] ^= mask;
                    let _ = decode(&damaged);
                }
            }
        }

        #[test]
        fn trailing_bytes_ignored() {
            let input = b"trailing".to_vec();
            let mut encoded = encode(&input).unwrap();
            encoded.extend_from_slice(&[0xFF; 4]);
            assert_eq!(decode(&encoded).unwrap(), input);
        }
    }

    // ---------------------------------------------------------------
    // 5. Determinism
    // ---------------------------------------------------------------

    mod determinism {
        use super::*;

        #[test]
        fn identical_inputs_identical_output() {
            for input in [data_uniform(), data_random(4096, 99), data_repeating_text()] {
                assert_eq!(encode(&input).unwrap(), encode(&input).unwrap());
            }
        }

        #[test]
        fn tree_rebuilds_identically() {
            let input = data_geometric();
            let a = HuffmanTree::from_data(&input).unwrap().code_table();
            let b = HuffmanTree::from_data(&input).unwrap().code_table();
            assert_eq!(a, b);
        }
    }
}

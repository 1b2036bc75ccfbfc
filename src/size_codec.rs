//! Variable-length size-subfield codec: non-negative integers encoded as
//! big-endian 7-bit groups with an MSB continuation bit.

use std::io::Read;

use crate::errors::{MixedFieldsError, MixedFieldsResult};

/// Encodes `n` as a size-subfield: one byte per 7-bit group, most
/// significant group first, continuation bit (`0x80`) set on every byte
/// but the last.
pub fn encode(n: u64) -> Vec<u8> {
    if n == 0 {
        return vec![0];
    }

    let bit_len = 64 - n.leading_zeros() as usize;
    let n_groups = bit_len.div_ceil(7);

    let mut bytes = Vec::with_capacity(n_groups);
    for i in (0..n_groups).rev() {
        let group = ((n >> (i * 7)) & 0x7F) as u8;
        let continuation = if i > 0 { 0x80 } else { 0x00 };
        bytes.push(group | continuation);
    }
    bytes
}

/// Decodes a complete size-subfield (no trailing bytes) into its integer
/// value. Fails with `EmptyChunk` if `bytes` is empty.
pub fn decode(bytes: &[u8]) -> MixedFieldsResult<u64> {
    if bytes.is_empty() {
        return Err(MixedFieldsError::EmptyChunk);
    }

    let mut n: u64 = 0;
    for &byte in bytes {
        n = (n << 7) | u64::from(byte & 0x7F);
    }
    Ok(n)
}

/// Reads a size-subfield directly from a byte stream: bytes with the MSB
/// set are continuation bytes, the first byte with the MSB clear ends the
/// subfield. Returns the decoded value and the number of bytes consumed.
///
/// Fails with `BadSize` if the stream ends before a terminating byte is
/// seen. `offset` is the stream position of the first subfield byte, used
/// only to annotate the error.
pub fn read_stream<R: Read>(mut stream: R, offset: u64) -> MixedFieldsResult<(u64, u64)> {
    let mut buf = [0u8; 1];
    let mut group_bytes = Vec::new();

    loop {
        if stream.read(&mut buf).map_err(|_| MixedFieldsError::BadSize { offset })? == 0 {
            return Err(MixedFieldsError::BadSize { offset });
        }
        let continues = buf[0] & 0x80 != 0;
        group_bytes.push(buf[0]);
        if !continues {
            break;
        }
    }

    let consumed = group_bytes.len() as u64;
    let value = decode(&group_bytes)?;
    Ok((value, consumed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn zero_is_a_single_zero_byte() {
        assert_eq!(encode(0), vec![0x00]);
    }

    #[test]
    fn boundary_examples_match_the_grammar() {
        assert_eq!(encode(8), vec![0x08]);
        assert_eq!(encode(127), vec![0x7F]);
        assert_eq!(encode(128), vec![0x81, 0x00]);
        assert_eq!(encode(1023), vec![0x87, 0x7F]);
    }

    #[test]
    fn decode_inverts_encode_for_boundary_values() {
        for n in [0u64, 1, 8, 127, 128, 1023, 1 << 20, 1 << 30, u64::MAX] {
            assert_eq!(decode(&encode(n)).unwrap(), n, "n = {n}");
        }
    }

    #[test]
    fn decode_empty_chunk_fails() {
        assert!(matches!(decode(&[]), Err(MixedFieldsError::EmptyChunk)));
    }

    #[test]
    fn read_stream_consumes_exactly_the_subfield() {
        let mut bytes = encode(1023);
        bytes.extend_from_slice(b"trailing");
        let (value, consumed) = read_stream(&bytes[..], 0).unwrap();
        assert_eq!(value, 1023);
        assert_eq!(consumed, 2);
    }

    #[test]
    fn read_stream_requires_two_bytes_for_1023() {
        let (_, consumed) = read_stream(&encode(1023)[..], 0).unwrap();
        assert_eq!(consumed, 2);
    }

    #[test]
    fn read_stream_requires_three_bytes_past_twenty_one_bits() {
        let n = 1u64 << 20;
        let (value, consumed) = read_stream(&encode(n)[..], 0).unwrap();
        assert_eq!(value, n);
        assert_eq!(consumed, 3);
    }

    #[test]
    fn read_stream_on_truncated_subfield_fails() {
        let mut bytes = encode(1023);
        bytes.truncate(1); // only the continuation byte, none follows
        assert!(matches!(
            read_stream(&bytes[..], 7),
            Err(MixedFieldsError::BadSize { offset: 7 })
        ));
    }

    proptest! {
        #[test]
        fn size_round_trips_for_any_u64(n in any::<u64>()) {
            prop_assert_eq!(decode(&encode(n)).unwrap(), n);
        }

        #[test]
        fn encoding_is_minimal(n in any::<u64>()) {
            let expected_len = if n == 0 {
                1
            } else {
                (64 - n.leading_zeros() as usize).div_ceil(7)
            };
            prop_assert_eq!(encode(n).len(), expected_len);
        }

        #[test]
        fn last_byte_never_has_continuation_bit(n in any::<u64>()) {
            let bytes = encode(n);
            prop_assert_eq!(bytes.last().unwrap() & 0x80, 0);
        }

        #[test]
        fn read_stream_matches_encode(n in any::<u64>()) {
            let bytes = encode(n);
            let (value, consumed) = read_stream(&bytes[..], 0).unwrap();
            prop_assert_eq!(value, n);
            prop_assert_eq!(consumed as usize, bytes.len());
        }
    }
}

use bitvec::prelude::*;
use serde::Serialize;
use std::io::{self, Read, Write};

use crate::code_table::CodeTable;
use crate::container::Header;
use crate::error::{ContainerError, Error, Result};
use crate::frequency::{for_each_chunk, FrequencyTable};
use crate::tree::HuffmanTree;
use crate::trie::DecodeTrie;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CompressionStats {
    pub input_bytes: u64,
    pub output_bytes: u64,
    pub total_bits: u64,
    pub symbols: usize,
}

#[derive(Debug, Clone)]
pub struct Encoder {
    codes: CodeTable,
}

impl Encoder {
    pub fn new(codes: CodeTable) -> Self {
        Self { codes }
    }

    /// Builds the code table for `frequencies`. An empty histogram gives an
    /// empty table, which encodes the empty stream.
    pub fn from_frequencies(frequencies: &FrequencyTable) -> Result<Self> {
        if frequencies.is_empty() {
            return Ok(Self::new(CodeTable::new()));
        }

        let tree = HuffmanTree::from_frequencies(frequencies)?;
        Ok(Self::new(CodeTable::from_tree(&tree)))
    }

    pub fn codes(&self) -> &CodeTable {
        &self.codes
    }

    pub fn into_codes(self) -> CodeTable {
        self.codes
    }

    /// Appends the code of every byte of `reader` to a bit buffer sized for
    /// `expected_bits`. The buffer still grows if the stream turns out longer.
    ///
    /// Returns the bits together with the number of bytes read.
    pub fn encode<R: Read>(
        &self,
        reader: R,
        expected_bits: u64,
    ) -> Result<(BitVec<u8, Msb0>, u64)> {
        let mut bits = payload_buffer(expected_bits)?;
        let mut read = 0u64;

        for_each_chunk(reader, |chunk| {
            for &byte in chunk {
                let code = self.codes.get(byte).ok_or(Error::UnknownSymbol(byte))?;
                bits.extend_from_bitslice(code);
            }
            read += chunk.len() as u64;
            Ok::<_, Error>(())
        })?;

        Ok((bits, read))
    }
}

fn payload_buffer(bits: u64) -> Result<BitVec<u8, Msb0>> {
    let bytes = usize::try_from(bits.div_ceil(8)).map_err(|_| Error::Allocation { bits })?;

    let mut storage = Vec::<u8>::new();
    storage
        .try_reserve_exact(bytes)
        .map_err(|_| Error::Allocation { bits })?;

    Ok(BitVec::from_vec(storage))
}

/// Writes the container for `reader`, whose histogram is `frequencies`.
pub fn compress_stream<R: Read, W: Write>(
    frequencies: &FrequencyTable,
    reader: R,
    mut writer: W,
) -> Result<CompressionStats> {
    let encoder = Encoder::from_frequencies(frequencies)?;
    let expected_bits = encoder.codes().encoded_len(frequencies)?;
    let (mut bits, input_bytes) = encoder.encode(reader, expected_bits)?;

    let total_bits = bits.len() as u64;
    if total_bits != expected_bits {
        log::warn!(
            "source changed while compressing: expected {expected_bits} bits, got {total_bits}"
        );
    }
    log::debug!(
        "encoded {} symbols into {total_bits} bits, longest code {} bits",
        encoder.codes().len(),
        encoder.codes().max_code_len()
    );

    let header = Header {
        total_bits,
        codes: encoder.into_codes(),
    };
    header.write_to(&mut writer)?;

    bits.resize(header.payload_len() as usize * 8, false);
    let payload = bits.into_vec();
    writer.write_all(&payload)?;
    writer.flush()?;

    Ok(CompressionStats {
        input_bytes,
        output_bytes: header.byte_len() + payload.len() as u64,
        total_bits,
        symbols: header.codes.len(),
    })
}

/// Decodes one container from `reader` into `writer`, returning the number
/// of bytes written.
pub fn decompress_stream<R: Read, W: Write>(mut reader: R, mut writer: W) -> Result<u64> {
    let header = Header::read_from(&mut reader)?;
    if header.codes.is_empty() && header.total_bits > 0 {
        return Err(ContainerError::MissingCodes(header.total_bits).into());
    }
    let trie = DecodeTrie::from_code_table(&header.codes)?;

    let expected = header.payload_len();
    let mut payload = Vec::<u8>::new();
    (&mut reader).take(expected).read_to_end(&mut payload)?;
    if (payload.len() as u64) < expected {
        return Err(ContainerError::TruncatedPayload {
            expected,
            actual: payload.len() as u64,
        }
        .into());
    }

    let trailing = io::copy(&mut reader, &mut io::sink())?;
    if trailing > 0 {
        log::warn!("ignoring {trailing} bytes after the payload");
    }

    // payload is in memory, so its bit count fits in usize
    let total_bits = header.total_bits as usize;
    let bits = &payload.view_bits::<Msb0>()[..total_bits];
    let written = trie.decode(bits, &mut writer)?;
    writer.flush()?;

    log::debug!("decoded {} bits into {written} bytes", header.total_bits);
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compress(input: &[u8]) -> Vec<u8> {
        let mut out = Vec::<u8>::new();
        compress_stream(&FrequencyTable::from_bytes(input), input, &mut out).unwrap();
        out
    }

    fn decompress(container: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::<u8>::new();
        decompress_stream(container, &mut out)?;
        Ok(out)
    }

    #[test]
    fn aaabbc_container() {
        let out = compress(b"aaabbc");

        // 12 byte fixed header, 3 descriptors of 3 bytes, 2 payload bytes
        assert_eq!(out.len(), 12 + 9 + 2);
        assert_eq!(&out[..8], &9u64.to_le_bytes());
        assert_eq!(&out[8..12], &3i32.to_le_bytes());
        // a a a b b c -> 0 0 0 11 11 10, padded
        assert_eq!(&out[21..], &[0b0001_1111, 0b0000_0000]);

        assert_eq!(decompress(&out).unwrap(), b"aaabbc");
    }

    #[test]
    fn stats_account_for_every_bit() {
        let input = b"abracadabra";
        let mut out = Vec::<u8>::new();
        let stats =
            compress_stream(&FrequencyTable::from_bytes(input), &input[..], &mut out).unwrap();

        assert_eq!(stats.input_bytes, 11);
        assert_eq!(stats.output_bytes, out.len() as u64);
        assert_eq!(stats.symbols, 5);
        // a:5 b:2 r:2 c:1 d:1
        assert_eq!(stats.total_bits, 23);
    }

    #[test]
    fn stats_count_bytes_actually_encoded() {
        // histogram taken before the source grew
        let freq = FrequencyTable::from_bytes(b"ab");
        let mut out = Vec::<u8>::new();
        let stats = compress_stream(&freq, &b"abbaab"[..], &mut out).unwrap();

        assert_eq!(stats.input_bytes, 6);
        assert_eq!(stats.total_bits, 6);
        assert_eq!(stats.output_bytes, out.len() as u64);
        assert_eq!(decompress(&out).unwrap(), b"abbaab");
    }

    #[test]
    fn empty_input() {
        let out = compress(b"");
        assert_eq!(out, vec![0; 12]);
        assert!(decompress(&out).unwrap().is_empty());
    }

    #[test]
    fn single_symbol_input() {
        let input = vec![b'z'; 20];
        let out = compress(&input);

        assert_eq!(&out[..8], &20u64.to_le_bytes());
        // header + 3 payload bytes of zeros
        assert_eq!(out.len(), 12 + 3 + 3);
        assert_eq!(decompress(&out).unwrap(), input);
    }

    #[test]
    fn truncated_payload() {
        let mut out = compress(b"the quick brown fox jumps over the lazy dog");
        out.pop();

        let err = decompress(&out).unwrap_err();
        assert!(matches!(
            err,
            Error::CorruptContainer(ContainerError::TruncatedPayload { .. })
        ));
    }

    #[test]
    fn trailing_bytes_are_ignored() {
        let mut out = compress(b"aaabbc");
        out.extend([0xff, 0xff]);
        assert_eq!(decompress(&out).unwrap(), b"aaabbc");
    }

    #[test]
    fn bits_without_codes() {
        let mut out = vec![0; 12];
        out[0] = 8;
        out.push(0);

        let err = decompress(&out).unwrap_err();
        assert!(matches!(
            err,
            Error::CorruptContainer(ContainerError::MissingCodes(8))
        ));
    }

    #[test]
    fn pad_bits_are_not_decoded() {
        // code for 'a' is 0, so decoding the 7 pad bits would add seven more
        let out = compress(b"aaabbc");
        let decoded = decompress(&out).unwrap();
        assert_eq!(decoded.len(), 6);
    }

    #[test]
    fn unknown_symbol() {
        let freq = FrequencyTable::from_bytes(b"ab");
        let err = compress_stream(&freq, &b"abc"[..], Vec::<u8>::new()).unwrap_err();
        assert!(matches!(err, Error::UnknownSymbol(b'c')));
    }
}

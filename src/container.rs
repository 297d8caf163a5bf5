//! On-disk layout of a compressed file.
//!
//! ```text
//! total_bits    u64 LE     exact number of payload bits
//! symbol_count  i32 LE     0..=256
//! per symbol, ascending:
//!   symbol      u8
//!   code_len    u8         1..=255
//!   code        ceil(code_len / 8) bytes, MSB first, zero padded
//! payload       ceil(total_bits / 8) bytes, MSB first, zero padded
//! ```

use bitvec::prelude::*;
use serde::Serialize;
use std::io::{self, Read, Write};

use crate::code_table::CodeTable;
use crate::error::{ContainerError, Error, Result};

pub const MAX_SYMBOLS: i32 = 256;

const FIXED_HEADER_LEN: u64 = 8 + 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub total_bits: u64,
    pub codes: CodeTable,
}

impl Header {
    pub fn payload_len(&self) -> u64 {
        self.total_bits.div_ceil(8)
    }

    /// Size of the encoded header in bytes.
    pub fn byte_len(&self) -> u64 {
        FIXED_HEADER_LEN
            + self
                .codes
                .iter()
                .map(|(_, code)| 2 + code.len().div_ceil(8) as u64)
                .sum::<u64>()
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.total_bits.to_le_bytes())?;
        writer.write_all(&(self.codes.len() as i32).to_le_bytes())?;

        for (symbol, code) in self.codes.iter() {
            let length = u8::try_from(code.len()).map_err(|_| Error::CodeTooLong {
                symbol,
                length: code.len(),
            })?;
            writer.write_all(&[symbol, length])?;
            writer.write_all(&pack(code))?;
        }

        Ok(())
    }

    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let total_bits = u64::from_le_bytes(read_array(reader)?);
        let symbol_count = i32::from_le_bytes(read_array(reader)?);
        if !(0..=MAX_SYMBOLS).contains(&symbol_count) {
            return Err(ContainerError::InvalidSymbolCount(symbol_count).into());
        }

        let mut codes = CodeTable::new();
        for _ in 0..symbol_count {
            let [symbol, length]: [u8; 2] = read_array(reader)?;
            if length == 0 {
                return Err(ContainerError::EmptyCode(symbol).into());
            }

            let mut raw = vec![0u8; (length as usize).div_ceil(8)];
            reader.read_exact(&mut raw).map_err(header_eof)?;
            let mut code = BitVec::<u8, Msb0>::from_vec(raw);
            code.truncate(length as usize);

            if codes.insert(symbol, code.into_boxed_bitslice()).is_some() {
                return Err(ContainerError::DuplicateSymbol(symbol).into());
            }
        }

        Ok(Self { total_bits, codes })
    }
}

/// Packs `bits` MSB first, zero padding the last byte.
pub fn pack(bits: &BitSlice<u8, Msb0>) -> Vec<u8> {
    let padded_len = bits.len().div_ceil(8) * 8;
    let mut packed = BitVec::<u8, Msb0>::with_capacity(padded_len);
    packed.extend_from_bitslice(bits);
    packed.resize(padded_len, false);
    packed.into_vec()
}

fn read_array<R: Read, const N: usize>(reader: &mut R) -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    reader.read_exact(&mut buf).map_err(header_eof)?;
    Ok(buf)
}

fn header_eof(e: io::Error) -> Error {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        ContainerError::TruncatedHeader.into()
    } else {
        e.into()
    }
}

/// What `huff inspect` reports about a container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerSummary {
    pub total_bits: u64,
    pub symbol_count: usize,
    pub header_bytes: u64,
    pub expected_payload_bytes: u64,
    pub payload_bytes: u64,
    pub codes: CodeTable,
}

impl ContainerSummary {
    pub fn is_complete(&self) -> bool {
        self.payload_bytes >= self.expected_payload_bytes
    }
}

/// Reads the header and measures the payload without decoding it.
pub fn inspect<R: Read>(mut reader: R) -> Result<ContainerSummary> {
    let header = Header::read_from(&mut reader)?;
    let payload_bytes = io::copy(&mut reader, &mut io::sink())?;

    Ok(ContainerSummary {
        total_bits: header.total_bits,
        symbol_count: header.codes.len(),
        header_bytes: header.byte_len(),
        expected_payload_bytes: header.payload_len(),
        payload_bytes,
        codes: header.codes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn sample_header() -> Header {
        let mut codes = CodeTable::new();
        codes.insert(b'a', bitbox![u8, Msb0; 0]);
        codes.insert(b'c', bitbox![u8, Msb0; 1, 0]);
        codes.insert(b'b', bitbox![u8, Msb0; 1, 1]);
        Header {
            total_bits: 9,
            codes,
        }
    }

    #[test]
    fn header_layout() {
        let mut out = Vec::<u8>::new();
        sample_header().write_to(&mut out).unwrap();

        let mut expected = vec![9, 0, 0, 0, 0, 0, 0, 0, 3, 0, 0, 0];
        expected.extend([b'a', 1, 0b0000_0000]);
        expected.extend([b'b', 2, 0b1100_0000]);
        expected.extend([b'c', 2, 0b1000_0000]);
        assert_eq!(out, expected);
        assert_eq!(sample_header().byte_len(), out.len() as u64);
    }

    #[test]
    fn header_reads_back() {
        let mut out = Vec::<u8>::new();
        sample_header().write_to(&mut out).unwrap();

        let header = Header::read_from(&mut &out[..]).unwrap();
        assert_eq!(header, sample_header());
        assert_eq!(header.payload_len(), 2);
    }

    #[test]
    fn long_codes_span_bytes() {
        let mut codes = CodeTable::new();
        let code: BitVec<u8, Msb0> = (0..11).map(|i| i % 3 == 0).collect();
        codes.insert(0x42, code.into_boxed_bitslice());
        let header = Header {
            total_bits: 0,
            codes,
        };

        let mut out = Vec::<u8>::new();
        header.write_to(&mut out).unwrap();
        // 1001 0010 010
        assert_eq!(&out[12..], &[0x42, 11, 0b1001_0010, 0b0100_0000]);
        assert_eq!(Header::read_from(&mut &out[..]).unwrap(), header);
    }

    #[test]
    fn pack_pads_with_zeros() {
        assert_eq!(pack(bits![u8, Msb0; 1, 0, 1]), vec![0b1010_0000]);
        assert_eq!(
            pack(bits![u8, Msb0; 1, 1, 1, 1, 1, 1, 1, 1, 1]),
            vec![0xff, 0b1000_0000]
        );
        assert!(pack(BitSlice::<u8, Msb0>::empty()).is_empty());
    }

    #[rstest]
    #[case(vec![], ContainerError::TruncatedHeader)]
    #[case(vec![9, 0, 0, 0, 0, 0, 0, 0, 1, 0], ContainerError::TruncatedHeader)]
    #[case(
        vec![9, 0, 0, 0, 0, 0, 0, 0, 0xff, 0xff, 0xff, 0xff],
        ContainerError::InvalidSymbolCount(-1)
    )]
    #[case(vec![9, 0, 0, 0, 0, 0, 0, 0, 1, 1, 0, 0], ContainerError::InvalidSymbolCount(257))]
    #[case(vec![9, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, b'a'], ContainerError::TruncatedHeader)]
    #[case(vec![9, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, b'a', 0], ContainerError::EmptyCode(b'a'))]
    #[case(
        vec![9, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, b'a', 9, 0xff],
        ContainerError::TruncatedHeader
    )]
    #[case(
        vec![9, 0, 0, 0, 0, 0, 0, 0, 2, 0, 0, 0, b'a', 1, 0, b'a', 1, 0x80],
        ContainerError::DuplicateSymbol(b'a')
    )]
    fn bad_headers(#[case] bytes: Vec<u8>, #[case] expected: ContainerError) {
        match Header::read_from(&mut &bytes[..]) {
            Err(Error::CorruptContainer(e)) => assert_eq!(e, expected),
            other => panic!("expected {expected:?}, got {other:?}"),
        }
    }

    #[test]
    fn inspect_reports_sizes() {
        let mut out = Vec::<u8>::new();
        sample_header().write_to(&mut out).unwrap();
        out.extend([0b0001_1111, 0b0000_0000]);

        let summary = inspect(&out[..]).unwrap();
        assert_eq!(summary.total_bits, 9);
        assert_eq!(summary.symbol_count, 3);
        assert_eq!(summary.header_bytes, 21);
        assert_eq!(summary.expected_payload_bytes, 2);
        assert_eq!(summary.payload_bytes, 2);
        assert!(summary.is_complete());
    }

    #[test]
    fn inspect_flags_short_payload() {
        let mut out = Vec::<u8>::new();
        sample_header().write_to(&mut out).unwrap();
        out.push(0b0001_1111);

        let summary = inspect(&out[..]).unwrap();
        assert!(!summary.is_complete());
    }
}

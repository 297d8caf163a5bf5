use bitvec::prelude::*;
use std::io::Write;

use crate::code_table::CodeTable;
use crate::error::{ContainerError, Result};

const ROOT: usize = 0;

#[derive(Debug, Clone, Default)]
struct TrieNode {
    children: [Option<usize>; 2],
    symbol: Option<u8>,
}

impl TrieNode {
    fn is_leaf(&self) -> bool {
        self.children == [None, None]
    }
}

/// Binary decoding trie built from a code table. Each code is a path from
/// the root; the node at the end of the path carries the symbol.
#[derive(Debug, Clone)]
pub struct DecodeTrie {
    nodes: Vec<TrieNode>,
}

impl DecodeTrie {
    /// Fails if a code is empty or if one code is a prefix of another.
    pub fn from_code_table(codes: &CodeTable) -> std::result::Result<Self, ContainerError> {
        let mut nodes = vec![TrieNode::default()];

        for (symbol, code) in codes.iter() {
            if code.is_empty() {
                return Err(ContainerError::EmptyCode(symbol));
            }

            let mut at = ROOT;
            for bit in code.iter().by_vals() {
                if nodes[at].symbol.is_some() {
                    return Err(ContainerError::NotPrefixFree(symbol));
                }
                at = match nodes[at].children[bit as usize] {
                    Some(next) => next,
                    None => {
                        nodes.push(TrieNode::default());
                        let next = nodes.len() - 1;
                        nodes[at].children[bit as usize] = Some(next);
                        next
                    }
                };
            }

            let end = &mut nodes[at];
            if end.symbol.is_some() || !end.is_leaf() {
                return Err(ContainerError::NotPrefixFree(symbol));
            }
            end.symbol = Some(symbol);
        }

        Ok(Self { nodes })
    }

    /// Decodes every bit of `bits`, writing each symbol as soon as its code
    /// completes. Returns the number of bytes written.
    pub fn decode<W: Write>(&self, bits: &BitSlice<u8, Msb0>, writer: &mut W) -> Result<u64> {
        let mut at = ROOT;
        let mut written = 0;

        for (position, bit) in bits.iter().by_vals().enumerate() {
            at = self.nodes[at].children[bit as usize].ok_or_else(|| {
                ContainerError::UnmatchedCode {
                    position: position as u64,
                }
            })?;

            if let Some(symbol) = self.nodes[at].symbol {
                writer.write_all(&[symbol])?;
                written += 1;
                at = ROOT;
            }
        }

        if at != ROOT {
            return Err(ContainerError::DanglingBits.into());
        }

        Ok(written)
    }
}

use bitvec::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::frequency::FrequencyTable;
use crate::tree::{HuffmanTree, Node};

pub type Code = BitBox<u8, Msb0>;

/// Byte value to code mapping, ordered by byte value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "SerializableCodeTable", try_from = "SerializableCodeTable")]
pub struct CodeTable {
    codes: BTreeMap<u8, Code>,
}

impl CodeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derives codes from the leaf paths of `tree`: left is 0, right is 1.
    ///
    /// A tree made of a single leaf has an empty path, so that symbol gets
    /// the one bit code `0` instead.
    pub fn from_tree(tree: &HuffmanTree) -> Self {
        fn traverse(node: &Node, path: &mut BitVec<u8, Msb0>, codes: &mut BTreeMap<u8, Code>) {
            match node {
                Node::Leaf { symbol, .. } => {
                    codes.insert(*symbol, path.clone().into_boxed_bitslice());
                }
                Node::Internal { left, right, .. } => {
                    path.push(false);
                    traverse(left, path, codes);
                    path.pop();

                    path.push(true);
                    traverse(right, path, codes);
                    path.pop();
                }
            }
        }

        let mut codes = BTreeMap::new();
        match tree.root() {
            Node::Leaf { symbol, .. } => {
                codes.insert(*symbol, BitVec::<u8, Msb0>::repeat(false, 1).into_boxed_bitslice());
            }
            root => {
                let mut path = BitVec::with_capacity(tree.height());
                traverse(root, &mut path, &mut codes);
            }
        }

        Self { codes }
    }

    /// Returns the previous code if `symbol` already had one.
    pub fn insert(&mut self, symbol: u8, code: Code) -> Option<Code> {
        self.codes.insert(symbol, code)
    }

    pub fn get(&self, symbol: u8) -> Option<&BitSlice<u8, Msb0>> {
        self.codes.get(&symbol).map(|c| c.as_bitslice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, &BitSlice<u8, Msb0>)> + '_ {
        self.codes.iter().map(|(&s, c)| (s, c.as_bitslice()))
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn max_code_len(&self) -> usize {
        self.codes.values().map(|c| c.len()).max().unwrap_or(0)
    }

    /// Number of payload bits this table produces for `frequencies`.
    pub fn encoded_len(&self, frequencies: &FrequencyTable) -> Result<u64> {
        let mut total: u64 = 0;
        for (symbol, count) in frequencies.symbols() {
            let code = self.get(symbol).ok_or(Error::UnknownSymbol(symbol))?;
            total = count
                .checked_mul(code.len() as u64)
                .and_then(|bits| total.checked_add(bits))
                .ok_or(Error::Allocation { bits: u64::MAX })?;
        }
        Ok(total)
    }

    pub fn is_prefix_free(&self) -> bool {
        self.codes.iter().all(|(a, code_a)| {
            self.codes
                .iter()
                .filter(|(b, _)| a != *b)
                .all(|(_, code_b)| !code_b.starts_with(code_a.as_bitslice()))
        })
    }
}

fn code_string(code: &BitSlice<u8, Msb0>) -> String {
    code.iter()
        .by_vals()
        .map(|bit| if bit { '1' } else { '0' })
        .collect()
}

// serialize codes as "0110" strings keyed by symbol
#[derive(Serialize, Deserialize)]
#[serde(transparent)]
struct SerializableCodeTable(BTreeMap<u8, String>);

impl From<CodeTable> for SerializableCodeTable {
    fn from(table: CodeTable) -> Self {
        Self(
            table
                .codes
                .iter()
                .map(|(&s, c)| (s, code_string(c)))
                .collect(),
        )
    }
}

impl TryFrom<SerializableCodeTable> for CodeTable {
    type Error = String;

    fn try_from(other: SerializableCodeTable) -> std::result::Result<Self, Self::Error> {
        let mut codes = BTreeMap::new();
        for (symbol, text) in other.0 {
            if text.is_empty() {
                return Err(format!("symbol {symbol} has an empty code"));
            }
            let mut code = BitVec::<u8, Msb0>::with_capacity(text.len());
            for ch in text.chars() {
                match ch {
                    '0' => code.push(false),
                    '1' => code.push(true),
                    other => return Err(format!("invalid bit {other:?} in code for {symbol}")),
                }
            }
            codes.insert(symbol, code.into_boxed_bitslice());
        }
        Ok(Self { codes })
    }
}

use std::io::{self, BufRead, BufReader, Read};

const SYMBOLS: usize = 256;
const READ_CHUNK: usize = 8 * 1024;

/// Occurrence count of every byte value in a stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: [u64; SYMBOLS],
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self {
            counts: [0; SYMBOLS],
        }
    }

    /// Reads `reader` to the end, counting every byte.
    pub fn from_reader<R: Read>(reader: R) -> io::Result<Self> {
        let mut table = Self::new();
        for_each_chunk(reader, |chunk| {
            table.add(chunk);
            Ok::<_, io::Error>(())
        })?;
        Ok(table)
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut table = Self::new();
        table.add(bytes);
        table
    }

    pub fn add(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.counts[b as usize] += 1;
        }
    }

    pub fn get(&self, symbol: u8) -> u64 {
        self.counts[symbol as usize]
    }

    /// Non-zero `(symbol, count)` pairs in ascending symbol order.
    pub fn symbols(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        (0..=u8::MAX)
            .zip(self.counts.iter().copied())
            .filter(|&(_, count)| count > 0)
    }

    pub fn distinct_symbols(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.distinct_symbols() == 0
    }
}

/// Feeds `reader` to `f` one buffer fill at a time until end of stream.
pub(crate) fn for_each_chunk<R, E, F>(reader: R, mut f: F) -> Result<(), E>
where
    R: Read,
    E: From<io::Error>,
    F: FnMut(&[u8]) -> Result<(), E>,
{
    let mut reader = BufReader::with_capacity(READ_CHUNK, reader);

    loop {
        let chunk = match reader.fill_buf() {
            Ok([]) => return Ok(()),
            Ok(chunk) => chunk,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        f(chunk)?;
        let n = chunk.len();
        reader.consume(n);
    }
}

impl Default for FrequencyTable {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<(u8, u64)> for FrequencyTable {
    fn from_iter<T: IntoIterator<Item = (u8, u64)>>(iter: T) -> Self {
        let mut table = Self::new();
        for (symbol, count) in iter {
            table.counts[symbol as usize] += count;
        }
        table
    }
}

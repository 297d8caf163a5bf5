//! Byte-oriented Huffman compression of whole files.
//!
//! ```
//! let container = huffman_file::encode(b"aaabbc").unwrap();
//! assert_eq!(huffman_file::decode(&container).unwrap(), b"aaabbc");
//! ```

pub mod code_table;
pub mod codec;
pub mod container;
pub mod error;
pub mod frequency;
pub mod node_list;
pub mod tree;
pub mod trie;

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub use code_table::CodeTable;
pub use codec::{compress_stream, decompress_stream, CompressionStats, Encoder};
pub use error::{ContainerError, Error, Result};
pub use frequency::FrequencyTable;
pub use tree::HuffmanTree;

pub const COMPRESSED_EXTENSION: &str = "huff";
pub const DECOMPRESSED_EXTENSION: &str = "txt";

pub fn compressed_path(input: &Path) -> PathBuf {
    input.with_extension(COMPRESSED_EXTENSION)
}

pub fn decompressed_path(input: &Path) -> PathBuf {
    input.with_extension(DECOMPRESSED_EXTENSION)
}

/// Compresses an in-memory buffer into a container.
pub fn encode(input: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::<u8>::new();
    compress_stream(&FrequencyTable::from_bytes(input), input, &mut out)?;
    Ok(out)
}

pub fn decode(container: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::<u8>::new();
    decompress_stream(container, &mut out)?;
    Ok(out)
}

/// Compresses `input` next to itself with the `.huff` extension and
/// returns the path written.
pub fn compress(input: impl AsRef<Path>) -> Result<PathBuf> {
    let input = input.as_ref();
    let output = compressed_path(input);
    compress_to(input, &output)?;
    Ok(output)
}

/// Decompresses `input` next to itself with the `.txt` extension and
/// returns the path written.
pub fn decompress(input: impl AsRef<Path>) -> Result<PathBuf> {
    let input = input.as_ref();
    let output = decompressed_path(input);
    decompress_to(input, &output)?;
    Ok(output)
}

pub fn compress_to(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<CompressionStats> {
    let (input, output) = (input.as_ref(), output.as_ref());

    // two passes over the file: count, then encode
    let frequencies = FrequencyTable::from_reader(File::open(input)?)?;
    let source = File::open(input)?;
    let stats = write_atomically(output, |writer| {
        compress_stream(&frequencies, source, writer)
    })?;

    log::info!(
        "compressed {} ({} bytes) to {} ({} bytes)",
        input.display(),
        stats.input_bytes,
        output.display(),
        stats.output_bytes
    );
    Ok(stats)
}

pub fn decompress_to(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<u64> {
    let (input, output) = (input.as_ref(), output.as_ref());

    let source = BufReader::new(File::open(input)?);
    let written = write_atomically(output, |writer| decompress_stream(source, writer))?;

    log::info!(
        "decompressed {} to {} ({written} bytes)",
        input.display(),
        output.display()
    );
    Ok(written)
}

/// Runs `f` against a temporary file beside `output` and moves it into place
/// only if `f` succeeds. On failure the temporary file is removed and
/// `output` is left untouched.
fn write_atomically<T, F>(output: &Path, f: F) -> Result<T>
where
    F: FnOnce(&mut BufWriter<&File>) -> Result<T>,
{
    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let tmp = temp_file_for(dir, output)?;

    let value = {
        let mut writer = BufWriter::new(tmp.as_file());
        let value = f(&mut writer)?;
        writer.flush()?;
        value
    };
    tmp.as_file().sync_all()?;
    tmp.persist(output).map_err(|e| Error::Io(e.error))?;

    Ok(value)
}

/// Creates the temporary file with the mode a plain create would give
/// `output`: the existing file's permissions when replacing it, otherwise
/// 0666 less the umask.
fn temp_file_for(dir: &Path, output: &Path) -> Result<NamedTempFile> {
    #[cfg_attr(not(unix), allow(unused_mut))]
    let mut builder = tempfile::Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    let tmp = builder.tempfile_in(dir)?;

    match fs::metadata(output) {
        Ok(existing) => tmp.as_file().set_permissions(existing.permissions())?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }
    Ok(tmp)
}

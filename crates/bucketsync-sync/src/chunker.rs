//! Fixed-size chunking of file contents
//!
//! Uploads are streamed to the store as a sequence of blocks. Every block
//! is [`CHUNK_SIZE`] bytes except possibly the last one.

/// Size of one upload block (1 MiB)
pub const CHUNK_SIZE: usize = 1024 * 1024;

/// Splits `bytes` into consecutive blocks of at most [`CHUNK_SIZE`] bytes
///
/// Empty input yields no blocks. Input that fits into a single block is
/// returned without copying.
pub fn chunk(bytes: Vec<u8>) -> Vec<Vec<u8>> {
    if bytes.is_empty() {
        return Vec::new();
    }
    if bytes.len() <= CHUNK_SIZE {
        return vec![bytes];
    }
    bytes.chunks(CHUNK_SIZE).map(<[u8]>::to_vec).collect()
}

/// Number of blocks [`chunk`] produces for an input of `len` bytes
pub fn chunk_count(len: u64) -> u64 {
    len.div_ceil(CHUNK_SIZE as u64)
}

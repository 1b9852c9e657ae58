//! Splitting oversized text on line boundaries, plus the shared binary sniff

use leakhound_core::domain::CHUNK_SIZE_LIMIT;

/// Content sniff window: a NUL in the first 8 KiB marks data as binary.
const BINARY_SNIFF_BYTES: usize = 8 * 1024;

/// Binary detection by content, never by file extension.
pub fn looks_binary(content: &[u8]) -> bool {
    content.iter().take(BINARY_SNIFF_BYTES).any(|&b| b == 0)
}

/// A piece of a larger text, with the number of lines preceding it in the
/// original so callers can keep line numbers accurate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkPiece {
    pub data: Vec<u8>,
    pub line_offset: i64,
}

/// Split `data` into pieces no larger than `limit`, cutting only on line
/// boundaries. A single line longer than the limit becomes its own piece
/// rather than being cut mid-line. Pieces are never empty.
pub fn split_on_lines(data: &[u8], limit: usize) -> Vec<ChunkPiece> {
    if data.len() <= limit {
        return vec![ChunkPiece {
            data: data.to_vec(),
            line_offset: 0,
        }];
    }

    let mut pieces = Vec::new();
    let mut current = Vec::new();
    let mut current_offset: i64 = 0;
    let mut lines_seen: i64 = 0;

    for line in data.split_inclusive(|&b| b == b'\n') {
        if !current.is_empty() && current.len() + line.len() > limit {
            pieces.push(ChunkPiece {
                data: std::mem::take(&mut current),
                line_offset: current_offset,
            });
            current_offset = lines_seen;
        }
        current.extend_from_slice(line);
        lines_seen += 1;
    }

    if !current.is_empty() {
        pieces.push(ChunkPiece {
            data: current,
            line_offset: current_offset,
        });
    }

    pieces
}

/// Split at the pipeline's standard ceiling.
pub fn split_standard(data: &[u8]) -> Vec<ChunkPiece> {
    split_on_lines(data, CHUNK_SIZE_LIMIT)
}

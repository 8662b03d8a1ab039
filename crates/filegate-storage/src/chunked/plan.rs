//! Chunk span planning for ranged uploads.

/// One planned byte range of an upload: `[offset, offset + len)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSpan {
    /// Offset of the range within the object.
    pub offset: u64,
    /// Length of the range. At most the configured chunk size; the final
    /// span of an object is clipped to the remaining byte count.
    pub len: u64,
}

impl ChunkSpan {
    /// Exclusive end offset of the span.
    pub fn end(&self) -> u64 {
        self.offset + self.len
    }
}

/// Plan the spans covering `[0, total_size)` in ascending offset order.
///
/// Every span except possibly the last has exactly `chunk_size` bytes.
/// A zero-byte object yields no spans. `chunk_size` must be non-zero;
/// the uploader validates that before planning.
pub fn chunk_spans(total_size: u64, chunk_size: u64) -> impl Iterator<Item = ChunkSpan> {
    (0..total_size).step_by(chunk_size.max(1) as usize).map(move |offset| ChunkSpan {
        offset,
        len: chunk_size.min(total_size - offset),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(total: u64, chunk: u64) -> Vec<ChunkSpan> {
        chunk_spans(total, chunk).collect()
    }

    #[test]
    fn reference_scenario_ten_megabytes() {
        let spans = collect(10_000_000, 4_000_000);
        assert_eq!(
            spans,
            vec![
                ChunkSpan { offset: 0, len: 4_000_000 },
                ChunkSpan { offset: 4_000_000, len: 4_000_000 },
                ChunkSpan { offset: 8_000_000, len: 2_000_000 },
            ]
        );
    }

    #[test]
    fn covers_range_exactly_once() {
        for (total, chunk) in [(1u64, 1u64), (10, 3), (10, 10), (10, 4), (999, 1000), (4096, 512)]
        {
            let spans = collect(total, chunk);
            let mut cursor = 0u64;
            for span in &spans {
                assert_eq!(span.offset, cursor, "gap or overlap at {cursor}");
                assert!(span.len <= chunk);
                assert!(span.len > 0);
                cursor = span.end();
            }
            assert_eq!(cursor, total, "spans do not cover the payload");

            let expected_last = if total % chunk == 0 { chunk } else { total % chunk };
            assert_eq!(spans.last().unwrap().len, expected_last);
        }
    }

    #[test]
    fn zero_size_yields_no_spans() {
        assert!(collect(0, 4_000_000).is_empty());
    }
}

//! Bounded tail read of a JSONL transcript.
//!
//! The file is scanned backwards in fixed-size chunks until enough line
//! terminators have been seen, then the tail is read once from that offset.
//! The cost depends on the window size and line lengths, never on how long
//! the session has been running.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use tracing::debug;

use crate::MonitorError;

/// Bytes read per backwards step
const TAIL_CHUNK_BYTES: u64 = 64 * 1024;

/// Return the last `max_lines` lines of the transcript, oldest first.
///
/// The final line may be a partial write from the host; it is returned as-is
/// and left for the decoder to reject. Lines are decoded lossily so a broken
/// UTF-8 sequence only spoils its own line.
pub fn read_tail_lines(path: &Path, max_lines: usize) -> Result<Vec<String>, MonitorError> {
    read_tail_lines_chunked(path, max_lines, TAIL_CHUNK_BYTES)
}

fn read_tail_lines_chunked(
    path: &Path,
    max_lines: usize,
    chunk_bytes: u64,
) -> Result<Vec<String>, MonitorError> {
    let unavailable = |source: io::Error| MonitorError::TranscriptUnavailable {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::open(path).map_err(unavailable)?;
    let metadata = file.metadata().map_err(unavailable)?;
    if !metadata.is_file() {
        return Err(unavailable(io::Error::other("not a regular file")));
    }

    let file_len = metadata.len();
    let (tail, start) =
        read_tail(&mut file, file_len, max_lines, chunk_bytes).map_err(unavailable)?;

    debug!(
        "Read {} tail lines ({} bytes of {}) from {:?}",
        tail.len(),
        file_len - start,
        file_len,
        path
    );

    Ok(tail)
}

/// Read the last `max_lines` lines of the first `len` bytes of `reader`.
///
/// Returns the lines and the offset the kept tail starts at.
fn read_tail<R: Read + Seek>(
    reader: &mut R,
    len: u64,
    max_lines: usize,
    chunk_bytes: u64,
) -> io::Result<(Vec<String>, u64)> {
    if max_lines == 0 || len == 0 {
        return Ok((Vec::new(), len));
    }

    let start = tail_start(reader, len, max_lines, chunk_bytes.max(1))?;
    reader.seek(SeekFrom::Start(start))?;
    let mut buf = Vec::with_capacity((len - start) as usize);
    reader.by_ref().take(len - start).read_to_end(&mut buf)?;

    let mut lines: Vec<&[u8]> = buf.split(|&b| b == b'\n').collect();
    // A trailing terminator leaves an empty final segment
    if lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }

    let skip = lines.len().saturating_sub(max_lines);
    let tail = lines[skip..]
        .iter()
        .map(|l| {
            String::from_utf8_lossy(l)
                .trim_end_matches('\r')
                .to_string()
        })
        .collect();

    Ok((tail, start))
}

/// Offset just past the `max_lines + 1`-th terminator from the end, or 0.
///
/// Cutting there guarantees the first kept line is whole. Only the scratch
/// chunk is held in memory while scanning.
fn tail_start<R: Read + Seek>(
    reader: &mut R,
    len: u64,
    max_lines: usize,
    chunk_bytes: u64,
) -> io::Result<u64> {
    let mut scratch = vec![0u8; chunk_bytes.min(len) as usize];
    let mut pos = len;
    let mut newlines = 0usize;

    while pos > 0 {
        let step = chunk_bytes.min(pos);
        pos -= step;
        let chunk = &mut scratch[..step as usize];
        reader.seek(SeekFrom::Start(pos))?;
        reader.read_exact(chunk)?;

        for (i, &b) in chunk.iter().enumerate().rev() {
            if b == b'\n' {
                newlines += 1;
                if newlines > max_lines {
                    return Ok(pos + i as u64 + 1);
                }
            }
        }
    }

    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn write_lines(dir: &Path, name: &str, count: usize) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        for i in 0..count {
            writeln!(file, r#"{{"n":{}}}"#, i).unwrap();
        }
        path
    }

    #[test]
    fn test_missing_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_tail_lines(&dir.path().join("missing.jsonl"), 10);
        assert!(matches!(
            result,
            Err(MonitorError::TranscriptUnavailable { .. })
        ));
    }

    #[test]
    fn test_directory_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_tail_lines(dir.path(), 10);
        assert!(matches!(
            result,
            Err(MonitorError::TranscriptUnavailable { .. })
        ));
    }

    #[test]
    fn test_empty_file_returns_no_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.jsonl");
        File::create(&path).unwrap();
        assert!(read_tail_lines(&path, 10).unwrap().is_empty());
    }

    #[test]
    fn test_short_file_returns_everything() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_lines(dir.path(), "short.jsonl", 3);
        let lines = read_tail_lines(&path, 10).unwrap();
        assert_eq!(lines, vec![r#"{"n":0}"#, r#"{"n":1}"#, r#"{"n":2}"#]);
    }

    #[test]
    fn test_long_file_returns_last_window() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_lines(dir.path(), "long.jsonl", 500);
        let lines = read_tail_lines(&path, 200).unwrap();
        assert_eq!(lines.len(), 200);
        assert_eq!(lines.first().unwrap(), r#"{"n":300}"#);
        assert_eq!(lines.last().unwrap(), r#"{"n":499}"#);
    }

    #[test]
    fn test_small_chunks_never_split_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_lines(dir.path(), "chunks.jsonl", 50);
        // 7-byte chunks straddle every line boundary
        let lines = read_tail_lines_chunked(&path, 5, 7).unwrap();
        assert_eq!(
            lines,
            vec![
                r#"{"n":45}"#,
                r#"{"n":46}"#,
                r#"{"n":47}"#,
                r#"{"n":48}"#,
                r#"{"n":49}"#
            ]
        );
    }

    /// Counts bytes pulled through `read`
    struct CountingReader<R> {
        inner: R,
        bytes_read: u64,
    }

    impl<R: Read> Read for CountingReader<R> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.inner.read(buf)?;
            self.bytes_read += n as u64;
            Ok(n)
        }
    }

    impl<R: Seek> Seek for CountingReader<R> {
        fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
            self.inner.seek(pos)
        }
    }

    #[test]
    fn test_many_chunk_window_reads_tail_linearly() {
        // 400 lines of 1 KiB scanned one byte at a time
        let line = "x".repeat(1023);
        let mut data = Vec::new();
        for i in 0..1000 {
            data.extend_from_slice(format!("{:04}{}\n", i, &line[4..]).as_bytes());
        }
        let len = data.len() as u64;
        let mut reader = CountingReader {
            inner: io::Cursor::new(data),
            bytes_read: 0,
        };

        let (lines, start) = read_tail(&mut reader, len, 400, 1).unwrap();
        assert_eq!(lines.len(), 400);
        assert!(lines[0].starts_with("0600"));
        assert!(lines[399].starts_with("0999"));

        // The cut lands on the terminator before the first kept line
        assert_eq!(start, 600 * 1024);
        // One backwards pass plus one forward read of the tail, nothing more
        let span = len - start;
        assert_eq!(reader.bytes_read, 2 * span + 1);
    }

    #[test]
    fn test_unterminated_last_line_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.jsonl");
        std::fs::write(&path, "{\"n\":0}\n{\"n\":1}\n{\"type\":\"assist").unwrap();
        let lines = read_tail_lines(&path, 2).unwrap();
        assert_eq!(lines, vec![r#"{"n":1}"#, r#"{"type":"assist"#]);
    }

    #[test]
    fn test_crlf_is_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crlf.jsonl");
        std::fs::write(&path, "{\"n\":0}\r\n{\"n\":1}\r\n").unwrap();
        let lines = read_tail_lines(&path, 10).unwrap();
        assert_eq!(lines, vec![r#"{"n":0}"#, r#"{"n":1}"#]);
    }

    #[test]
    fn test_zero_window_reads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_lines(dir.path(), "zero.jsonl", 3);
        assert!(read_tail_lines(&path, 0).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_utf8_is_lossy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bytes.jsonl");
        std::fs::write(&path, b"\xff\xfe\n{\"n\":1}\n").unwrap();
        let lines = read_tail_lines(&path, 10).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], r#"{"n":1}"#);
    }
}

// hiveforge-storage/src/tail.rs
// ============================================================================
// Module: Stream Tail Recovery
// Description: Chunked backward scan for the last non-empty line of a stream file.
// Purpose: Recover the previous event's hash without reading the whole file (§4.2 step 2).
// Dependencies: std::fs, std::io
// ============================================================================

//! ## Overview
//! Appending needs only the last line of a (potentially large) stream file.
//! Rather than reading the entire file, this scans backward in growing
//! chunks — starting small and doubling on failure up to a bounded cap —
//! finally falling back to a full read if the file is smaller than the cap
//! allows anyway. The scan is careful to never split a UTF-8 continuation
//! byte sequence when deciding where a chunk begins.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;

/// Initial backward-scan chunk size, in bytes.
const INITIAL_CHUNK: usize = 4 * 1024;
/// Upper bound on the backward-scan chunk size before falling back to a full read.
const MAX_CHUNK: usize = 1024 * 1024;

/// Returns the last non-blank line of `file`, or `None` if the file has no
/// non-blank lines. `file`'s cursor is left in an unspecified position.
///
/// # Errors
///
/// Returns [`std::io::Error`] on read/seek failure.
pub fn last_nonblank_line(file: &mut File) -> std::io::Result<Option<String>> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(None);
    }

    let mut chunk_size = INITIAL_CHUNK.min(usize::try_from(len).unwrap_or(usize::MAX));
    loop {
        let start = len.saturating_sub(chunk_size as u64);
        file.seek(SeekFrom::Start(start))?;
        let mut buf = vec![0_u8; usize::try_from(len - start).unwrap_or(usize::MAX)];
        file.read_exact(&mut buf)?;

        if let Some(line) = extract_last_line(&buf, start == 0) {
            return Ok(Some(line));
        }

        if start == 0 {
            // Read the whole file and still found nothing but blank lines.
            return Ok(None);
        }
        if chunk_size >= MAX_CHUNK {
            // Fall back to a full read from the start.
            file.seek(SeekFrom::Start(0))?;
            let mut whole = String::new();
            file.read_to_string(&mut whole)?;
            return Ok(whole.lines().rev().find(|l| !l.trim().is_empty()).map(str::to_string));
        }
        chunk_size = (chunk_size * 2).min(MAX_CHUNK);
    }
}

/// Finds the last non-blank line inside `buf`, treating `buf` as either the
/// whole file (`is_file_start = true`) or a suffix of it. When `buf` is a
/// suffix, the first (possibly-truncated) line is dropped unless the
/// previous byte boundary is known to land on a full line (i.e. this is the
/// start of the file), since a truncated leading fragment must never be
/// mistaken for a complete line. UTF-8 continuation bytes at the chunk's
/// leading edge are handled by lossily decoding, which never panics and
/// never misinterprets a *complete* trailing line (the only line this
/// function returns).
fn extract_last_line(buf: &[u8], is_file_start: bool) -> Option<String> {
    let text = String::from_utf8_lossy(buf);
    let mut lines: Vec<&str> = text.lines().collect();
    if !is_file_start && !lines.is_empty() {
        // The first entry may be a truncated fragment of an earlier line.
        lines.remove(0);
    }
    lines.into_iter().rev().find(|l| !l.trim().is_empty()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn file_with(contents: &str) -> File {
        let mut file = tempfile::tempfile().expect("tempfile");
        file.write_all(contents.as_bytes()).expect("write");
        file
    }

    #[test]
    fn empty_file_has_no_last_line() {
        let mut file = file_with("");
        assert_eq!(last_nonblank_line(&mut file).expect("scan"), None);
    }

    #[test]
    fn single_line_file() {
        let mut file = file_with("{\"a\":1}\n");
        assert_eq!(last_nonblank_line(&mut file).expect("scan"), Some("{\"a\":1}".to_string()));
    }

    #[test]
    fn trailing_blank_lines_are_skipped() {
        let mut file = file_with("{\"a\":1}\n{\"a\":2}\n\n\n");
        assert_eq!(last_nonblank_line(&mut file).expect("scan"), Some("{\"a\":2}".to_string()));
    }

    #[test]
    fn large_file_forces_chunk_growth() {
        let mut contents = String::new();
        for i in 0 .. 5000 {
            contents.push_str(&format!("{{\"line\":{i}}}\n"));
        }
        let mut file = file_with(&contents);
        assert_eq!(
            last_nonblank_line(&mut file).expect("scan"),
            Some("{\"line\":4999}".to_string())
        );
    }

    #[test]
    fn multibyte_utf8_near_boundary_does_not_panic() {
        let mut contents = "x".repeat(INITIAL_CHUNK - 1);
        contents.push_str("{\"emoji\":\"🐝\"}\n");
        let mut file = file_with(&contents);
        let last = last_nonblank_line(&mut file).expect("scan");
        assert!(last.unwrap().contains("emoji"));
    }
}

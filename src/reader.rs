use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::error::{Error, ErrorKind, Result};

/// Size of the read buffer. Lines longer than this are read in
/// fragments and reassembled before they are trimmed.
pub const BUFFER_SIZE: usize = 4096;

/// Produces the logical lines of a configuration text: trimmed,
/// with blank lines and comment lines removed.
pub(crate) struct LineReader<'c, R> {
    reader: R,
    comments: &'c [String],
    line_no: u32,
}

impl<'c> LineReader<'c, BufReader<File>> {
    pub fn open(path: &Path, comments: &'c [String]) -> io::Result<Self> {
        let file = File::open(path)?;
        Ok(LineReader::new(BufReader::with_capacity(BUFFER_SIZE, file), comments))
    }
}

impl<'c, R: BufRead> LineReader<'c, R> {
    pub fn new(reader: R, comments: &'c [String]) -> Self {
        LineReader {
            reader,
            comments,
            line_no: 0,
        }
    }

    // Read one physical line without its '\n'. A line that does not fit in
    // the buffer arrives in several fragments that are concatenated here.
    // Returns Ok(None) at end-of-file.
    fn next_physical(&mut self) -> io::Result<Option<Vec<u8>>> {
        let mut line = Vec::new();
        let mut fragments = 0u32;
        loop {
            let (done, used) = {
                let buf = match self.reader.fill_buf() {
                    Ok(buf) => buf,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e),
                };
                if buf.is_empty() {
                    // A last line without a trailing newline still counts.
                    return Ok(if line.is_empty() { None } else { Some(line) });
                }
                match buf.iter().position(|&b| b == b'\n') {
                    Some(n) => {
                        line.extend_from_slice(&buf[..n]);
                        (true, n + 1)
                    }
                    None => {
                        line.extend_from_slice(buf);
                        (false, buf.len())
                    }
                }
            };
            self.reader.consume(used);
            if done {
                break;
            }
            fragments += 1;
        }
        if fragments > 0 {
            trace!(
                "line {}: reassembled {} bytes from {} fragments",
                self.line_no + 1,
                line.len(),
                fragments + 1
            );
        }
        Ok(Some(line))
    }

    // `line` is already trimmed.
    fn is_skipped(&self, line: &str) -> bool {
        line.is_empty() || self.comments.iter().any(|c| line.starts_with(c.as_str()))
    }

    /// Read all logical lines into memory.
    pub fn read_lines(mut self) -> Result<Vec<String>> {
        let mut lines = Vec::new();
        while let Some(bytes) = self.next_physical()? {
            self.line_no += 1;
            let text = match String::from_utf8(bytes) {
                Ok(text) => text,
                Err(e) => {
                    // Comments and blank lines may hold anything.
                    let lossy = String::from_utf8_lossy(e.as_bytes());
                    if self.is_skipped(lossy.trim()) {
                        continue;
                    }
                    return Err(Error::new(ErrorKind::Io, "utf-8 error").with_line(self.line_no));
                }
            };
            let line = text.trim();
            if self.is_skipped(line) {
                continue;
            }
            lines.push(line.to_string());
        }
        trace!("read {} lines, {} logical", self.line_no, lines.len());
        Ok(lines)
    }
}

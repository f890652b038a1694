use std::io::{self, BufRead};

/// Line- and token-level reader over `ms` output.
///
/// Token reads cross line boundaries; line reads discard whatever is left of
/// the current line.
#[derive(Debug)]
pub struct MsTokenizer<R> {
    reader: R,
    line: String,
    cursor: usize,
    line_number: usize,
}

impl<R: BufRead> MsTokenizer<R> {
    /// Wrap a buffered reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
            cursor: 0,
            line_number: 0,
        }
    }

    /// Read the next full line, without its line terminator.
    ///
    /// Returns `None` at end of input. The returned line counts as consumed
    /// for subsequent token reads.
    pub fn next_line(&mut self) -> io::Result<Option<&str>> {
        if !self.fill_line()? {
            return Ok(None);
        }
        self.cursor = self.line.len();
        Ok(Some(self.line.trim_end_matches(['\n', '\r'])))
    }

    /// Read the next whitespace-delimited token.
    pub fn next_token(&mut self) -> io::Result<Option<&str>> {
        if !self.skip_to_token()? {
            return Ok(None);
        }
        Ok(self.take_token())
    }

    /// Read lines until a token is available. Returns `false` at end of input.
    pub fn skip_to_token(&mut self) -> io::Result<bool> {
        while self.find_token().is_none() {
            if !self.fill_line()? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Take the token at the cursor without reading further input.
    pub fn take_token(&mut self) -> Option<&str> {
        let (start, end) = self.find_token()?;
        self.cursor = end;
        Some(&self.line[start..end])
    }

    /// 1-based number of the line last read.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    fn fill_line(&mut self) -> io::Result<bool> {
        self.line.clear();
        self.cursor = 0;
        if self.reader.read_line(&mut self.line)? == 0 {
            return Ok(false);
        }
        self.line_number += 1;
        Ok(true)
    }

    fn find_token(&self) -> Option<(usize, usize)> {
        let rest = &self.line[self.cursor..];
        let offset = rest.find(|c: char| !c.is_whitespace())?;
        let start = self.cursor + offset;
        let len = self.line[start..]
            .find(char::is_whitespace)
            .unwrap_or(self.line.len() - start);
        Some((start, start + len))
    }
}

//! Import extraction for Go source files.
//!
//! [`ImportScanner`] is a line-oriented state machine. It walks the file
//! preamble (package clause, comments, build constraints) until it meets an
//! `import` declaration, collects the quoted import paths of every
//! consecutive import declaration, and stops at the first top-level
//! declaration. Line comments and block comments are skipped in every state.
//!
//! The scanner never fails: malformed input (an unterminated block comment,
//! a missing `)`, an unterminated string) simply ends extraction with the
//! paths found so far.

use std::io::BufRead;

use tracing::debug;

/// A single import path extracted from source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportInfo {
    /// Line number (1-indexed).
    pub line: usize,
    /// Import path literal including its double quotes (e.g. `"fmt"`).
    pub path: String,
}

impl ImportInfo {
    /// The import path without surrounding quotes.
    #[must_use]
    pub fn unquoted(&self) -> &str {
        self.path.trim_matches('"')
    }
}

/// Scanner state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// Before or between import declarations.
    Preamble,
    /// Inside `/* ... */`; holds the state to return to after `*/`.
    BlockComment(Resume),
    /// After the `import` keyword, waiting for a path or `(`.
    SingleImport,
    /// Inside `import ( ... )`.
    MultiImport,
    /// The import section is over.
    Done,
}

/// State a block comment resumes into once it closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resume {
    /// Back to [`ScanState::Preamble`].
    Preamble,
    /// Back to [`ScanState::SingleImport`].
    SingleImport,
    /// Back to [`ScanState::MultiImport`].
    MultiImport,
}

impl From<Resume> for ScanState {
    fn from(r: Resume) -> Self {
        match r {
            Resume::Preamble => Self::Preamble,
            Resume::SingleImport => Self::SingleImport,
            Resume::MultiImport => Self::MultiImport,
        }
    }
}

/// Top-level keywords that may only appear after the import section.
const DECL_KEYWORDS: &[&str] = &["func", "type", "var", "const"];

#[derive(Debug, PartialEq, Eq)]
enum Token<'a> {
    Word(&'a str),
    Str(String),
    Open,
    Close,
    Other,
}

/// Line-fed import scanner.
#[derive(Debug)]
pub struct ImportScanner {
    state: ScanState,
    imports: Vec<ImportInfo>,
}

impl Default for ImportScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportScanner {
    /// Creates a scanner positioned at the start of a file.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: ScanState::Preamble,
            imports: Vec::new(),
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Returns true once no further line can contribute an import.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.state == ScanState::Done
    }

    /// Paths collected so far.
    #[must_use]
    pub fn imports(&self) -> &[ImportInfo] {
        &self.imports
    }

    /// Consumes the scanner, returning the collected imports.
    #[must_use]
    pub fn finish(self) -> Vec<ImportInfo> {
        self.imports
    }

    /// Feeds one line (without its newline).
    pub fn feed_line(&mut self, line_no: usize, line: &str) {
        let mut rest = line;
        while !rest.is_empty() && !self.is_done() {
            rest = self.step(line_no, rest);
        }
    }

    fn step<'a>(&mut self, line_no: usize, input: &'a str) -> &'a str {
        if let ScanState::BlockComment(resume) = self.state {
            return match input.find("*/") {
                Some(end) => {
                    self.state = resume.into();
                    &input[end + 2..]
                }
                None => "",
            };
        }

        let input = input.trim_start();
        if input.is_empty() || input.starts_with("//") {
            return "";
        }
        if let Some(rest) = input.strip_prefix("/*") {
            self.state = ScanState::BlockComment(self.resume_point());
            return rest;
        }

        let (token, rest) = next_token(input);
        self.apply(line_no, token);
        rest
    }

    fn resume_point(&self) -> Resume {
        match self.state {
            ScanState::SingleImport => Resume::SingleImport,
            ScanState::MultiImport => Resume::MultiImport,
            ScanState::BlockComment(r) => r,
            ScanState::Preamble | ScanState::Done => Resume::Preamble,
        }
    }

    fn apply(&mut self, line_no: usize, token: Token<'_>) {
        self.state = match (self.state, token) {
            (ScanState::Preamble, Token::Word(w)) if w.eq_ignore_ascii_case("import") => {
                ScanState::SingleImport
            }
            (ScanState::Preamble, Token::Word(w)) if DECL_KEYWORDS.contains(&w) => {
                ScanState::Done
            }
            (ScanState::SingleImport, Token::Open) => ScanState::MultiImport,
            (ScanState::SingleImport, Token::Str(path)) => {
                self.push(line_no, path);
                ScanState::Preamble
            }
            (ScanState::MultiImport, Token::Str(path)) => {
                self.push(line_no, path);
                ScanState::MultiImport
            }
            (ScanState::MultiImport, Token::Close) => ScanState::Preamble,
            // Aliases (`f`, `_`, `.`), separators and the package clause.
            (state, _) => state,
        };
    }

    fn push(&mut self, line: usize, path: String) {
        self.imports.push(ImportInfo { line, path });
    }
}

/// Splits the next token off a non-empty, left-trimmed input.
fn next_token(input: &str) -> (Token<'_>, &str) {
    let Some(first) = input.chars().next() else {
        return (Token::Other, "");
    };
    match first {
        '(' => (Token::Open, &input[1..]),
        ')' => (Token::Close, &input[1..]),
        '"' => match closing_quote(input) {
            Some(end) => (Token::Str(input[..=end].to_owned()), &input[end + 1..]),
            None => (Token::Other, ""),
        },
        '`' => match input[1..].find('`') {
            Some(end) => (
                Token::Str(format!("\"{}\"", &input[1..=end])),
                &input[end + 2..],
            ),
            None => (Token::Other, ""),
        },
        c if is_ident_char(c) => {
            let end = input
                .char_indices()
                .find(|&(_, c)| !is_ident_char(c))
                .map_or(input.len(), |(i, _)| i);
            (Token::Word(&input[..end]), &input[end..])
        }
        c => (Token::Other, &input[c.len_utf8()..]),
    }
}

/// Byte index of the quote closing the interpreted string starting at 0.
fn closing_quote(input: &str) -> Option<usize> {
    let bytes = input.as_bytes();
    let mut i = 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return Some(i),
            _ => i += 1,
        }
    }
    None
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Reads the import paths declared by the Go source behind `reader`.
///
/// Reading stops as soon as the import section ends, so large files are not
/// read past their preamble. An I/O or encoding error mid-stream ends
/// extraction with the imports found so far.
pub fn read_imports<R: BufRead>(reader: R) -> Vec<ImportInfo> {
    let mut scanner = ImportScanner::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                debug!("Stopping import scan at line {}: {}", idx + 1, e);
                break;
            }
        };
        scanner.feed_line(idx + 1, &line);
        if scanner.is_done() {
            break;
        }
    }
    scanner.finish()
}

/// Extracts import paths from in-memory source.
#[must_use]
pub fn parse_imports(source: &str) -> Vec<ImportInfo> {
    read_imports(source.as_bytes())
}

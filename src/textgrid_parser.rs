use log::{debug, trace, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::document::{Document, Interval, SkippedLine, Tier};
use crate::errors::ParseError;

// @module: Line-oriented parser for the long TextGrid serialization

// @const: `item []:` or `intervals: size = 3`
static COLLECTION_OPEN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(item|intervals)\s?\[?\]?:").unwrap()
});

// @const: Declared size trailing a collection marker
static DECLARED_SIZE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"size\s*=\s*(\d+)").unwrap()
});

// @const: `item [2]:` or `intervals [5]:`
static INDEXED_ENTRY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(item|intervals)\s*\[(\d+)\]\s*:").unwrap()
});

// @const: `xmax = 3.309`, split at the first `=`
static KEY_VALUE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([^=]*[^=\s])\s*=\s*(.*)$").unwrap()
});

// @const: Presence flags such as `tiers? <exists>`
static FLAG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\S+\?)\s*(<\w+>)$").unwrap()
});

/// How the parser reacts to lines it cannot place
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    /// Abort on the first unrecognized or misplaced line
    #[default]
    Strict,
    /// Log the line, record it on the document and keep going
    Lenient,
}

/// Collection keyword used by markers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKeyword {
    Item,
    Intervals,
}

impl CollectionKeyword {
    fn from_match(keyword: &str) -> Self {
        if keyword == "item" {
            Self::Item
        } else {
            Self::Intervals
        }
    }
}

/// Shape of a single input line, in classification priority order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineShape<'a> {
    Blank,
    CollectionOpen {
        keyword: CollectionKeyword,
        declared_size: Option<usize>,
    },
    IndexedEntry {
        keyword: CollectionKeyword,
        index: usize,
    },
    KeyValue {
        key: &'a str,
        value: &'a str,
    },
    Unrecognized,
}

impl<'a> LineShape<'a> {
    /// Classify one line. Markers are matched at the start of the trimmed line.
    pub fn classify(line: &'a str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Self::Blank;
        }

        if let Some(caps) = COLLECTION_OPEN_REGEX.captures(trimmed) {
            let declared_size = DECLARED_SIZE_REGEX
                .captures(trimmed)
                .and_then(|c| c[1].parse().ok());
            return Self::CollectionOpen {
                keyword: CollectionKeyword::from_match(&caps[1]),
                declared_size,
            };
        }

        if let Some(caps) = INDEXED_ENTRY_REGEX.captures(trimmed) {
            return match caps[2].parse() {
                Ok(index) => Self::IndexedEntry {
                    keyword: CollectionKeyword::from_match(&caps[1]),
                    index,
                },
                Err(_) => Self::Unrecognized,
            };
        }

        if let Some(caps) = KEY_VALUE_REGEX.captures(trimmed) {
            let (key, value) = (caps.get(1), caps.get(2));
            if let (Some(key), Some(value)) = (key, value) {
                return Self::KeyValue {
                    key: key.as_str().trim(),
                    value: value.as_str().trim(),
                };
            }
        }

        if let Some(caps) = FLAG_REGEX.captures(trimmed) {
            if let (Some(key), Some(value)) = (caps.get(1), caps.get(2)) {
                return Self::KeyValue {
                    key: key.as_str(),
                    value: value.as_str(),
                };
            }
        }

        Self::Unrecognized
    }
}

/// Which container currently receives attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParserState {
    AtRoot,
    InTierCollection,
    InTierEntry(usize),
    InIntervalCollection(usize),
    InIntervalEntry(usize, usize),
}

impl ParserState {
    fn current_tier(self) -> Option<usize> {
        match self {
            Self::InTierEntry(tier)
            | Self::InIntervalCollection(tier)
            | Self::InIntervalEntry(tier, _) => Some(tier),
            Self::AtRoot | Self::InTierCollection => None,
        }
    }
}

/// Outcome of scanning the inside of a quoted value
struct QuotedScan<'a> {
    content: String,
    closed: bool,
    /// Text after the closing quote
    trailing: &'a str,
}

/// Scan text that starts inside a quoted string. `""` is an escaped quote.
fn scan_quoted(segment: &str) -> QuotedScan<'_> {
    let mut content = String::new();
    let mut chars = segment.char_indices().peekable();
    while let Some((offset, c)) = chars.next() {
        if c == '"' {
            if matches!(chars.peek(), Some((_, '"'))) {
                chars.next();
                content.push('"');
            } else {
                return QuotedScan {
                    content,
                    closed: true,
                    trailing: &segment[offset + 1..],
                };
            }
        } else {
            content.push(c);
        }
    }
    QuotedScan { content, closed: false, trailing: "" }
}

/// A quoted value still waiting for its closing quote
struct PendingValue {
    key: String,
    buffer: String,
    line_number: usize,
    line: String,
}

/// Converts the lines of one TextGrid file into a `Document`
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentParser {
    strictness: Strictness,
}

impl DocumentParser {
    pub fn new(strictness: Strictness) -> Self {
        Self { strictness }
    }

    pub fn strictness(&self) -> Strictness {
        self.strictness
    }

    /// Parse the full text of a file
    pub fn parse_str(&self, content: &str) -> Result<Document, ParseError> {
        self.parse_lines(content.lines())
    }

    /// Parse an ordered sequence of lines
    pub fn parse_lines<I, S>(&self, lines: I) -> Result<Document, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut run = ParseRun::new(self.strictness);
        for (offset, line) in lines.into_iter().enumerate() {
            let line = line.as_ref();
            let line = if offset == 0 {
                line.trim_start_matches('\u{feff}')
            } else {
                line
            };
            run.feed(offset + 1, line.trim_end_matches(['\r', '\n']))?;
        }
        run.finish()
    }
}

/// State of one in-progress parse
struct ParseRun {
    strictness: Strictness,
    document: Document,
    state: ParserState,
    pending: Option<PendingValue>,
}

impl ParseRun {
    fn new(strictness: Strictness) -> Self {
        Self {
            strictness,
            document: Document::new(),
            state: ParserState::AtRoot,
            pending: None,
        }
    }

    fn feed(&mut self, line_number: usize, line: &str) -> Result<(), ParseError> {
        if let Some(mut pending) = self.pending.take() {
            let scan = scan_quoted(line);
            pending.buffer.push('\n');
            pending.buffer.push_str(&scan.content);
            if !scan.closed {
                self.pending = Some(pending);
                return Ok(());
            }
            self.attach(&pending.key, pending.buffer);
            return self.check_trailing(line_number, line, scan.trailing);
        }

        match LineShape::classify(line) {
            LineShape::Blank => {
                trace!("Skipping blank line {}", line_number);
                Ok(())
            }
            LineShape::CollectionOpen { keyword: CollectionKeyword::Item, .. } => {
                self.document.tiers.clear();
                self.state = ParserState::InTierCollection;
                Ok(())
            }
            LineShape::CollectionOpen { keyword: CollectionKeyword::Intervals, declared_size } => {
                match self.state.current_tier() {
                    Some(tier_index) => {
                        let tier = self.document.tiers.entry(tier_index).or_default();
                        tier.intervals.clear();
                        tier.declared_interval_count = declared_size;
                        self.state = ParserState::InIntervalCollection(tier_index);
                        Ok(())
                    }
                    None => self.reject(out_of_context(
                        line_number,
                        line,
                        "intervals marker outside a tier entry",
                    )),
                }
            }
            LineShape::IndexedEntry { index: 0, .. } => {
                self.reject(out_of_context(line_number, line, "indices start at 1"))
            }
            LineShape::IndexedEntry { keyword: CollectionKeyword::Item, index } => {
                if self.state == ParserState::AtRoot {
                    return self.reject(out_of_context(
                        line_number,
                        line,
                        "tier entry before the tier collection was opened",
                    ));
                }
                self.document.tiers.insert(index, Tier::new());
                self.state = ParserState::InTierEntry(index);
                Ok(())
            }
            LineShape::IndexedEntry { keyword: CollectionKeyword::Intervals, index } => {
                match self.state {
                    ParserState::InIntervalCollection(tier_index)
                    | ParserState::InIntervalEntry(tier_index, _) => {
                        let tier = self.document.tiers.entry(tier_index).or_default();
                        tier.intervals.insert(index, Interval::new());
                        self.state = ParserState::InIntervalEntry(tier_index, index);
                        Ok(())
                    }
                    _ => self.reject(out_of_context(
                        line_number,
                        line,
                        "interval entry before the intervals collection was opened",
                    )),
                }
            }
            LineShape::KeyValue { key, value } => {
                if matches!(
                    self.state,
                    ParserState::InTierCollection | ParserState::InIntervalCollection(_)
                ) {
                    return self.reject(out_of_context(
                        line_number,
                        line,
                        "attribute before any indexed entry",
                    ));
                }
                match value.strip_prefix('"') {
                    Some(quoted) => {
                        let scan = scan_quoted(quoted);
                        if scan.closed {
                            self.attach(key, scan.content);
                            return self.check_trailing(line_number, line, scan.trailing);
                        }
                        self.pending = Some(PendingValue {
                            key: key.to_string(),
                            buffer: scan.content,
                            line_number,
                            line: line.to_string(),
                        });
                    }
                    None => self.attach(key, value.to_string()),
                }
                Ok(())
            }
            LineShape::Unrecognized => self.reject(ParseError::MalformedInput {
                line_number,
                line: line.to_string(),
            }),
        }
    }

    /// Attach a pair to whichever container the current state selects
    fn attach(&mut self, key: &str, value: String) {
        match self.state {
            ParserState::AtRoot => self.document.attributes.set(key, value),
            ParserState::InTierEntry(tier_index) => {
                self.document
                    .tiers
                    .entry(tier_index)
                    .or_default()
                    .attributes
                    .set(key, value);
            }
            ParserState::InIntervalEntry(tier_index, interval_index) => {
                self.document
                    .tiers
                    .entry(tier_index)
                    .or_default()
                    .intervals
                    .entry(interval_index)
                    .or_default()
                    .attributes
                    .set(key, value);
            }
            // Rejected before reaching here
            ParserState::InTierCollection | ParserState::InIntervalCollection(_) => {}
        }
    }

    /// Only whitespace may follow the closing quote of a value
    fn check_trailing(&mut self, line_number: usize, line: &str, trailing: &str) -> Result<(), ParseError> {
        if trailing.trim().is_empty() {
            return Ok(());
        }
        self.reject(ParseError::MalformedInput {
            line_number,
            line: line.to_string(),
        })
    }

    fn reject(&mut self, error: ParseError) -> Result<(), ParseError> {
        match self.strictness {
            Strictness::Strict => Err(error),
            Strictness::Lenient => {
                warn!("Ignoring input line: {}", error);
                let (line_number, line) = match &error {
                    ParseError::MalformedInput { line_number, line }
                    | ParseError::OutOfContext { line_number, line, .. } => {
                        (*line_number, line.clone())
                    }
                    ParseError::UnterminatedValue { line_number } => (*line_number, String::new()),
                };
                self.document.skipped_lines.push(SkippedLine {
                    line_number,
                    line,
                    reason: error.to_string(),
                });
                Ok(())
            }
        }
    }

    fn finish(mut self) -> Result<Document, ParseError> {
        if let Some(pending) = self.pending.take() {
            let error = ParseError::UnterminatedValue {
                line_number: pending.line_number,
            };
            if self.strictness == Strictness::Strict {
                return Err(error);
            }
            warn!("Keeping unterminated value for '{}': {}", pending.key, error);
            self.document.skipped_lines.push(SkippedLine {
                line_number: pending.line_number,
                line: pending.line,
                reason: error.to_string(),
            });
            self.attach(&pending.key, pending.buffer);
        }

        debug!(
            "Parsed document: {} tiers, {} intervals, {} skipped lines",
            self.document.tier_count(),
            self.document.interval_count(),
            self.document.skipped_lines.len()
        );
        Ok(self.document)
    }
}

fn out_of_context(line_number: usize, line: &str, reason: &str) -> ParseError {
    ParseError::OutOfContext {
        line_number,
        line: line.to_string(),
        reason: reason.to_string(),
    }
}

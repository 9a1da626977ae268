use once_cell::sync::Lazy;
use regex::Regex;
use tally_types::{ParsedEntry, ParsedMessage, UserId};

/// Glyph the summary bot puts in front of the day's best line.
pub const WINNER_MARKER: char = '👑';

// Patterns are immutable; every call to `captures_iter` starts a fresh search,
// so nothing carries over between lines or between messages.
static WIN_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|[^0-9])([1-6])/6\s*:").expect("win line pattern"));
static FAIL_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|[^0-9A-Za-z])[Xx]/6\s*:").expect("fail line pattern"));
static PUZZLE_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)wordle\s+no\.\s*([0-9]+)").expect("puzzle title pattern"));
static MENTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<@!?([0-9]+)>").expect("mention pattern"));
// Everything up to the next `@` or line break, so "@Zahir Hassan" stays one handle
static PLAIN_HANDLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@([^@\n]+)").expect("plain handle pattern"));

/// Score reported by a single summary line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineScore {
    Solved(u8),
    Failed,
}

impl LineScore {
    fn entry_for(self, user_id: UserId) -> ParsedEntry {
        match self {
            LineScore::Solved(guesses) => ParsedEntry::solved(user_id, guesses),
            LineScore::Failed => ParsedEntry::failed(user_id),
        }
    }
}

/// Ways of pulling user identifiers out of a score line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierStrategy {
    /// `<@123>` or `<@!123>` platform mentions
    StructuredMention,
    /// Free-text `@name` handles, lowercased
    PlainHandle,
}

/// Strategies in the order they are tried; the first one that finds anything wins.
pub const IDENTIFIER_STRATEGIES: [IdentifierStrategy; 2] = [
    IdentifierStrategy::StructuredMention,
    IdentifierStrategy::PlainHandle,
];

impl IdentifierStrategy {
    pub fn extract(self, line: &str) -> Vec<UserId> {
        match self {
            IdentifierStrategy::StructuredMention => MENTION
                .captures_iter(line)
                .map(|caps| caps[1].to_string())
                .collect(),
            IdentifierStrategy::PlainHandle => PLAIN_HANDLE
                .captures_iter(line)
                .filter_map(|caps| {
                    let name = caps[1].trim().to_lowercase();
                    (!name.is_empty()).then(|| format!("@{name}"))
                })
                .collect(),
        }
    }
}

/// Run the strategies in order and keep the first non-empty result
pub fn extract_identifiers(line: &str) -> Vec<UserId> {
    IDENTIFIER_STRATEGIES
        .iter()
        .map(|strategy| strategy.extract(line))
        .find(|ids| !ids.is_empty())
        .unwrap_or_default()
}

pub struct SummaryParser;

impl SummaryParser {
    /// Parse a daily results summary. Returns `None` when no score line with
    /// at least one identifiable player was found.
    pub fn parse(text: &str) -> Option<ParsedMessage> {
        let mut entries = Vec::new();
        let mut puzzle_number = None;

        for raw_line in text.split(['\n', '\r']) {
            let line = Self::normalize_line(raw_line);
            if line.is_empty() {
                continue;
            }

            if let Some(number) = Self::puzzle_number(line) {
                puzzle_number = number;
            }

            let Some(score) = Self::classify_line(line) else {
                continue;
            };

            entries.extend(
                extract_identifiers(line)
                    .into_iter()
                    .map(|user_id| score.entry_for(user_id)),
            );
        }

        tracing::debug!(
            entries = entries.len(),
            ?puzzle_number,
            "parsed results summary"
        );

        if entries.is_empty() {
            return None;
        }

        Some(ParsedMessage {
            puzzle_number,
            entries,
        })
    }

    /// Trim a line and drop a leading winner marker
    pub fn normalize_line(line: &str) -> &str {
        let line = line.trim();
        match line.strip_prefix(WINNER_MARKER) {
            Some(rest) => rest.trim_start_matches('\u{FE0F}').trim_start(),
            None => line,
        }
    }

    /// Decide whether a line reports a solve or a failure
    pub fn classify_line(line: &str) -> Option<LineScore> {
        if let Some(caps) = WIN_LINE.captures(line) {
            let guesses = caps[1].parse().ok()?;
            return Some(LineScore::Solved(guesses));
        }

        if FAIL_LINE.is_match(line) {
            return Some(LineScore::Failed);
        }

        None
    }

    /// Number of the last "Wordle No. N" title on the line. The outer
    /// `None` means no title; the inner one a number that does not fit `u32`.
    pub fn puzzle_number(line: &str) -> Option<Option<u32>> {
        PUZZLE_TITLE
            .captures_iter(line)
            .last()
            .map(|caps| caps[1].parse().ok())
    }
}

/// Convenience wrapper around [`SummaryParser::parse`].
pub fn parse_summary(text: &str) -> Option<ParsedMessage> {
    SummaryParser::parse(text)
}

//! Log-prefix stripping ahead of template mining.
//!
//! Timestamps and container tags at the start of a line change on every line;
//! left in place they would become leading wildcards and push the tree to
//! split on noise. [`split_prefix`] skips them and, when the skipped text is a
//! recognizable timestamp, returns it as the line's event time.
//!
//! Handles patterns like:
//! - `2026-02-05T10:00:00.000Z ERROR ...`
//! - `2026-02-05 10:00:00 [ERROR] ...`
//! - `[2026-02-05T10:00:00Z] ERROR ...`
//! - `Jan  5 10:00:00 hostname app: ERROR ...`
//! - `container_id | ERROR ...`

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

/// Bracketed log levels stay part of the message.
const LEVEL_KEYWORDS: &[&str] = &[
    "ERROR", "WARN", "INFO", "DEBUG", "TRACE", "FATAL",
    "error", "warn", "info", "debug", "trace", "fatal",
    "WARNING", "CRITICAL", "NOTICE",
    "warning", "critical", "notice",
];

const SYSLOG_MONTHS: &[&str] = &[
    "Jan", "Feb", "Mar", "Apr", "May", "Jun",
    "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S%.f",
];

/// At most this many prefix segments are skipped.
const MAX_SEGMENTS: usize = 4;

/// A line split into its skipped prefix and the message to mine.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitLine<'a> {
    pub message: &'a str,
    /// First timestamp found in the prefix.
    pub timestamp: Option<DateTime<Utc>>,
}

/// Skip the leading prefix of `line`.
pub fn split_prefix(line: &str) -> SplitLine<'_> {
    let mut scanner = Scanner::new(line);
    scanner.run();

    let offset = scanner.pos;
    // If we consumed most of the line, it probably wasn't prefix.
    let offset = if line.len() > 10 && offset > line.len() * 5 / 6 {
        0
    } else {
        offset
    };

    SplitLine {
        message: line.get(offset..).unwrap_or(line),
        timestamp: scanner.timestamp,
    }
}

/// Parse a timestamp in one of the common log layouts.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn has_date_shape(word: &str) -> bool {
    let b = word.as_bytes();
    b.len() >= 10
        && b[..4].iter().all(u8::is_ascii_digit)
        && matches!(b[4], b'-' | b'/')
        && b[5..7].iter().all(u8::is_ascii_digit)
        && b[7] == b[4]
        && b[8..10].iter().all(u8::is_ascii_digit)
}

struct Scanner<'a> {
    line: &'a str,
    bytes: &'a [u8],
    pos: usize,
    timestamp: Option<DateTime<Utc>>,
}

impl<'a> Scanner<'a> {
    fn new(line: &'a str) -> Self {
        Self {
            line,
            bytes: line.as_bytes(),
            pos: 0,
            timestamp: None,
        }
    }

    fn run(&mut self) {
        self.skip_whitespace();
        if self.at_end() {
            return;
        }

        for _ in 0..MAX_SEGMENTS {
            self.skip_whitespace();
            if self.at_end() {
                // Nothing but prefix on this line.
                self.pos = 0;
                return;
            }

            let advanced = self.bracketed()
                || self.dated()
                || self.syslog_header()
                || self.pipe_tag();
            if !advanced {
                break;
            }
        }

        self.skip_whitespace();
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn skip_whitespace(&mut self) {
        while !self.at_end() && self.bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    /// Advance over non-whitespace, returning the consumed text.
    fn word(&mut self) -> &'a str {
        let line = self.line;
        let start = self.pos;
        while !self.at_end() && !self.bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
        &line[start..self.pos]
    }

    fn remember(&mut self, text: &str) {
        if self.timestamp.is_none() {
            self.timestamp = parse_timestamp(text);
        }
    }

    /// `[anything]`, unless the brackets hold a log level.
    fn bracketed(&mut self) -> bool {
        if self.bytes[self.pos] != b'[' {
            return false;
        }
        let line = self.line;
        let Some(end) = line[self.pos..].find(']') else {
            return false;
        };
        let inner = &line[self.pos + 1..self.pos + end];
        if LEVEL_KEYWORDS.contains(&inner) {
            return false;
        }
        self.remember(inner);
        self.pos += end + 1;
        true
    }

    /// A word starting with `YYYY-MM-DD` or `YYYY/MM/DD`, optionally followed
    /// by a space-separated time of day.
    fn dated(&mut self) -> bool {
        if !self.bytes[self.pos].is_ascii_digit() {
            return false;
        }
        let line = self.line;
        let start = self.pos;
        let date = self.word();
        if !has_date_shape(date) {
            self.pos = start;
            return false;
        }

        let after_date = self.pos;
        self.skip_whitespace();
        if !self.at_end() && self.bytes[self.pos].is_ascii_digit() {
            let time = self.word();
            if time.contains(':') && (5..=20).contains(&time.len()) {
                let end = self.pos;
                self.remember(&line[start..end]);
                return true;
            }
        }
        self.pos = after_date;
        self.remember(date);
        true
    }

    /// `Jan  5 10:00:00 hostname app:`
    fn syslog_header(&mut self) -> bool {
        let line = self.line;
        let rest = &line[self.pos..];
        if !SYSLOG_MONTHS.iter().any(|m| rest.starts_with(m)) {
            return false;
        }
        let start = self.pos;
        self.pos += 3;
        while !self.at_end()
            && (self.bytes[self.pos].is_ascii_whitespace()
                || self.bytes[self.pos].is_ascii_digit()
                || self.bytes[self.pos] == b':')
        {
            self.pos += 1;
        }
        if self.pos - start < 12 {
            self.pos = start;
            return false;
        }

        // hostname, then an optional `tag:`
        self.skip_whitespace();
        let host_start = self.pos;
        self.skip_until_colon();
        if self.consume(b':') {
            return true;
        }
        if self.pos > host_start {
            self.skip_whitespace();
            let tag_start = self.pos;
            self.skip_until_colon();
            if !self.consume(b':') {
                self.pos = tag_start;
            }
        }
        true
    }

    /// `container_name | ...`: a single word before the pipe that carries no
    /// log level.
    fn pipe_tag(&mut self) -> bool {
        let line = self.line;
        let rest = &line[self.pos..];
        let Some(pipe) = rest.find('|') else {
            return false;
        };
        if pipe >= 80 || self.pos + pipe + 2 >= self.bytes.len() {
            return false;
        }
        let left = rest[..pipe].trim_end();
        if left.is_empty() || left.contains(|c: char| c.is_whitespace()) {
            return false;
        }
        if LEVEL_KEYWORDS.iter().any(|kw| left.contains(kw)) {
            return false;
        }
        self.pos += pipe + 1;
        true
    }

    fn skip_until_colon(&mut self) {
        while !self.at_end()
            && !self.bytes[self.pos].is_ascii_whitespace()
            && self.bytes[self.pos] != b':'
        {
            self.pos += 1;
        }
    }

    fn consume(&mut self, byte: u8) -> bool {
        if !self.at_end() && self.bytes[self.pos] == byte {
            self.pos += 1;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn message(line: &str) -> &str {
        split_prefix(line).message
    }

    // ─── Prefix skipping ────────────────────────────────────────

    #[test]
    fn test_skip_iso_timestamp() {
        assert_eq!(message("2026-02-05T10:00:00.000Z ERROR boom"), "ERROR boom");
    }

    #[test]
    fn test_skip_bracketed_timestamp() {
        assert_eq!(message("[2026-02-05T10:00:00Z] ERROR boom"), "ERROR boom");
    }

    #[test]
    fn test_bracketed_level_is_kept() {
        assert_eq!(
            message("[2026-02-05T10:00:00Z] [ERROR] something"),
            "[ERROR] something"
        );
    }

    #[test]
    fn test_skip_date_and_time() {
        assert_eq!(
            message("2026-02-05 10:00:00.123 WARN disk at 91%"),
            "WARN disk at 91%"
        );
    }

    #[test]
    fn test_skip_double_timestamp() {
        assert_eq!(
            message("2026-02-05T10:00:00Z 2026-02-05 10:00:00.123 ERROR boom"),
            "ERROR boom"
        );
    }

    #[test]
    fn test_skip_syslog_header() {
        assert_eq!(
            message("Jan  5 10:00:00 myhost app: ERROR something"),
            "ERROR something"
        );
    }

    #[test]
    fn test_skip_pipe_tag() {
        assert_eq!(message("web_1 | ERROR crash"), "ERROR crash");
    }

    #[test]
    fn test_pipe_inside_message_is_kept() {
        for line in [
            "user alice logged in | session 42 ok",
            "GET /api/users 200 | took 5ms",
            "2026-02-05T10:00:00Z query done | rows=3",
        ] {
            let expected = line.trim_start_matches("2026-02-05T10:00:00Z ");
            assert_eq!(message(line), expected);
        }
    }

    #[test]
    fn test_host_port_is_not_a_date() {
        let split = split_prefix("10.0.0.1:8080 connection refused");
        assert_eq!(split.message, "10.0.0.1:8080 connection refused");
        assert!(split.timestamp.is_none());
    }

    #[test]
    fn test_number_words_are_not_dates() {
        assert_eq!(message("12:30:45 job finished"), "12:30:45 job finished");
        assert_eq!(message("20260205 nightly build"), "20260205 nightly build");
        assert_eq!(message("1.2.3-beta released"), "1.2.3-beta released");
    }

    #[test]
    fn test_has_date_shape() {
        assert!(has_date_shape("2026-02-05"));
        assert!(has_date_shape("2026/02/05"));
        assert!(has_date_shape("2026-02-05T10:00:00Z"));
        assert!(!has_date_shape("2026-02/05"));
        assert!(!has_date_shape("10.0.0.1:8080"));
        assert!(!has_date_shape("2026-2-5"));
    }

    #[test]
    fn test_no_prefix() {
        assert_eq!(message("ERROR boom"), "ERROR boom");
        assert_eq!(message("user 1 logged in"), "user 1 logged in");
    }

    #[test]
    fn test_short_numbers_are_not_prefix() {
        assert_eq!(message("42 requests served"), "42 requests served");
    }

    #[test]
    fn test_empty_and_prefix_only_lines() {
        assert_eq!(message(""), "");
        assert_eq!(
            message("2026-02-05T10:00:00Z"),
            "2026-02-05T10:00:00Z"
        );
    }

    // ─── Timestamp extraction ───────────────────────────────────

    #[test]
    fn test_timestamp_from_rfc3339() {
        let ts = split_prefix("2026-02-05T10:00:00.000Z INFO ready").timestamp.unwrap();
        assert_eq!(ts.to_rfc3339(), "2026-02-05T10:00:00+00:00");
    }

    #[test]
    fn test_timestamp_from_date_and_time() {
        let ts = split_prefix("2026-02-05 10:11:12 INFO ready").timestamp.unwrap();
        assert_eq!((ts.hour(), ts.minute(), ts.second()), (10, 11, 12));
    }

    #[test]
    fn test_timestamp_from_brackets() {
        let ts = split_prefix("[2026-02-05T10:00:00+02:00] INFO ready").timestamp.unwrap();
        assert_eq!(ts.hour(), 8);
    }

    #[test]
    fn test_first_timestamp_wins() {
        let ts = split_prefix("2026-02-05T10:00:00Z 2026-02-06 11:00:00 ERROR boom")
            .timestamp
            .unwrap();
        assert_eq!(ts.to_rfc3339(), "2026-02-05T10:00:00+00:00");
    }

    #[test]
    fn test_no_timestamp_for_tags() {
        assert!(split_prefix("web_1 | ERROR crash").timestamp.is_none());
        assert!(split_prefix("ERROR boom").timestamp.is_none());
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert!(parse_timestamp("not a time").is_none());
        assert!(parse_timestamp("2026-13-45").is_none());
    }
}

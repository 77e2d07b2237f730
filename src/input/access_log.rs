//! Combined access-log record parsing
//!
//! Parses one web-server access-log line in combined log format into a
//! `LogRecord`. Lines that do not fit the grammar are skipped silently;
//! a replayed log is full of noise and none of it is an error.

use chrono::{DateTime, FixedOffset};
use regex::Regex;

/// One parsed access-log record
///
/// Records are transient: constructed, scanned and discarded per line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    /// Client address, used as the incident source
    pub client: String,
    pub identity: String,
    pub user: String,
    /// Raw bracketed timestamp text, see [`LogRecord::timestamp`]
    pub timestamp_raw: String,
    pub request: String,
    pub status: String,
    pub bytes: String,
    pub referrer: String,
    pub user_agent: String,
}

impl LogRecord {
    /// All captured fields, in capture order
    pub fn fields(&self) -> [&str; 9] {
        [
            &self.client,
            &self.identity,
            &self.user,
            &self.timestamp_raw,
            &self.request,
            &self.status,
            &self.bytes,
            &self.referrer,
            &self.user_agent,
        ]
    }

    /// Parse the bracketed timestamp (`10/Oct/2000:13:55:36 -0700`)
    ///
    /// Returns `None` when the bracketed text is not a well-formed
    /// timestamp; the record itself is still valid.
    pub fn timestamp(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_str(&self.timestamp_raw, "%d/%b/%Y:%H:%M:%S %z").ok()
    }
}

/// Parser for the fixed combined-log-format grammar
pub struct AccessLogParser {
    grammar: Regex,
}

impl AccessLogParser {
    pub fn new() -> Result<Self, regex::Error> {
        // client identity user [timestamp] "request" status bytes "referrer" "user_agent"
        let grammar = Regex::new(
            r#"^(\S+) (\S+) (\S+) \[([^\]]+)\] "([^"]*)" (\d+) (\d+) "([^"]*)" "([^"]*)"\s*$"#,
        )?;
        Ok(AccessLogParser { grammar })
    }

    /// Parse one line; `None` when the line does not fit the grammar
    pub fn parse(&self, line: &str) -> Option<LogRecord> {
        let captures = self.grammar.captures(line)?;

        Some(LogRecord {
            client: captures[1].to_string(),
            identity: captures[2].to_string(),
            user: captures[3].to_string(),
            timestamp_raw: captures[4].to_string(),
            request: captures[5].to_string(),
            status: captures[6].to_string(),
            bytes: captures[7].to_string(),
            referrer: captures[8].to_string(),
            user_agent: captures[9].to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"10.0.0.5 - frank [10/Oct/2000:13:55:36 -0700] "GET /apache_pb.gif HTTP/1.0" 200 2326 "http://www.example.com/start.html" "Mozilla/4.08 [en] (Win98; I ;Nav)""#;

    #[test]
    fn test_parse_combined_line() {
        let parser = AccessLogParser::new().unwrap();
        let record = parser.parse(SAMPLE).unwrap();

        assert_eq!(record.client, "10.0.0.5");
        assert_eq!(record.identity, "-");
        assert_eq!(record.user, "frank");
        assert_eq!(record.timestamp_raw, "10/Oct/2000:13:55:36 -0700");
        assert_eq!(record.request, "GET /apache_pb.gif HTTP/1.0");
        assert_eq!(record.status, "200");
        assert_eq!(record.bytes, "2326");
        assert_eq!(record.referrer, "http://www.example.com/start.html");
        assert_eq!(record.user_agent, "Mozilla/4.08 [en] (Win98; I ;Nav)");
    }

    #[test]
    fn test_fields_in_capture_order() {
        let parser = AccessLogParser::new().unwrap();
        let record = parser.parse(SAMPLE).unwrap();
        let fields = record.fields();
        assert_eq!(fields[0], "10.0.0.5");
        assert_eq!(fields[4], "GET /apache_pb.gif HTTP/1.0");
        assert_eq!(fields[8], "Mozilla/4.08 [en] (Win98; I ;Nav)");
    }

    #[test]
    fn test_timestamp_parses() {
        let parser = AccessLogParser::new().unwrap();
        let record = parser.parse(SAMPLE).unwrap();
        let ts = record.timestamp().unwrap();
        assert_eq!(ts.timestamp(), 971211336);
    }

    #[test]
    fn test_garbage_timestamp_still_yields_record() {
        let parser = AccessLogParser::new().unwrap();
        let line = r#"10.0.0.5 - - [not a date] "GET / HTTP/1.0" 200 5 "-" "curl/8.0""#;
        let record = parser.parse(line).unwrap();
        assert!(record.timestamp().is_none());
    }

    #[test]
    fn test_missing_user_agent_is_rejected() {
        let parser = AccessLogParser::new().unwrap();
        let line = r#"10.0.0.5 - - [10/Oct/2000:13:55:36 -0700] "GET / HTTP/1.0" 200 2326 "-""#;
        assert!(parser.parse(line).is_none());
    }

    #[test]
    fn test_non_numeric_status_is_rejected() {
        let parser = AccessLogParser::new().unwrap();
        let line = r#"10.0.0.5 - - [10/Oct/2000:13:55:36 -0700] "GET / HTTP/1.0" ok 2326 "-" "curl/8.0""#;
        assert!(parser.parse(line).is_none());
    }

    #[test]
    fn test_empty_and_junk_lines_are_rejected() {
        let parser = AccessLogParser::new().unwrap();
        assert!(parser.parse("").is_none());
        assert!(parser.parse("this is not an access log line").is_none());
    }

    #[test]
    fn test_quoted_fields_keep_embedded_whitespace() {
        let parser = AccessLogParser::new().unwrap();
        let line = r#"203.0.113.9 - - [01/Jan/2024:00:00:00 +0000] "POST /login two words HTTP/1.1" 302 0 "ref with spaces" "agent with spaces""#;
        let record = parser.parse(line).unwrap();
        assert_eq!(record.request, "POST /login two words HTTP/1.1");
        assert_eq!(record.referrer, "ref with spaces");
        assert_eq!(record.user_agent, "agent with spaces");
    }
}

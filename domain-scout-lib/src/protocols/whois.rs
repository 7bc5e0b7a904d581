//! WHOIS protocol client.
//!
//! WHOIS has no machine-readable schema, so classification is substring
//! matching against phrase tables. Each `WhoisServer` carries its own
//! `WhoisPatterns`, which lets a server's phrasing be tuned without touching
//! the classification code. RDAP is preferred wherever a registry offers it.

use crate::protocols::registry::WhoisServer;
use crate::types::{Availability, LookupResult, Protocol};
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// Longest response kept from a WHOIS server.
const MAX_RESPONSE_BYTES: u64 = 64 * 1024;

/// Characters of the response kept in an ambiguous-result diagnostic.
const SNIPPET_CHARS: usize = 120;

/// Phrases meaning "this domain is not registered".
const AVAILABLE_PATTERNS: &[&str] = &[
    "no match",
    "not found",
    "no data found",
    "no entries found",
    "no object found",
    "status: free",
    "status: available",
];

/// Fields that only appear in records of registered domains.
const TAKEN_PATTERNS: &[&str] = &[
    "domain name:",
    "registrar:",
    "creation date:",
    "created:",
    "created on:",
    "registry domain id:",
    "registry expiry date:",
    "registrant:",
];

/// Phrases servers use when refusing to answer.
const RATE_LIMIT_PATTERNS: &[&str] = &[
    "rate limit exceeded",
    "limit exceeded",
    "too many requests",
    "quota exceeded",
    "throttled",
    "rate-limited",
];

/// Phrase tables for one WHOIS server. All phrases are stored lowercase and
/// matched against the lowercased response.
#[derive(Debug, Clone, PartialEq)]
pub struct WhoisPatterns {
    pub available: Vec<String>,
    pub taken: Vec<String>,
    pub rate_limited: Vec<String>,
}

impl Default for WhoisPatterns {
    fn default() -> Self {
        let owned = |list: &[&str]| list.iter().map(|p| p.to_string()).collect();
        Self {
            available: owned(AVAILABLE_PATTERNS),
            taken: owned(TAKEN_PATTERNS),
            rate_limited: owned(RATE_LIMIT_PATTERNS),
        }
    }
}

impl WhoisPatterns {
    /// Append server-specific phrases to the tables.
    pub fn extended(mut self, available: &[String], taken: &[String]) -> Self {
        let add = |table: &mut Vec<String>, extra: &[String]| {
            for phrase in extra {
                let phrase = phrase.trim().to_lowercase();
                if !phrase.is_empty() && !table.contains(&phrase) {
                    table.push(phrase);
                }
            }
        };
        add(&mut self.available, available);
        add(&mut self.taken, taken);
        self
    }

    /// Classify a raw WHOIS response.
    ///
    /// "No match" phrases win over registration fields, since many
    /// not-found responses still echo a `Domain Name:` line.
    pub fn classify(&self, response: &str) -> (Availability, Option<String>) {
        let text = response.to_lowercase();

        if text.trim().is_empty() {
            return (
                Availability::Unknown,
                Some("empty WHOIS response".to_string()),
            );
        }

        if self.rate_limited.iter().any(|p| text.contains(p.as_str())) {
            return (
                Availability::Unknown,
                Some("rate limited by WHOIS server".to_string()),
            );
        }

        if self.available.iter().any(|p| text.contains(p.as_str())) {
            return (Availability::Available, None);
        }

        if self.taken.iter().any(|p| text.contains(p.as_str())) {
            return (Availability::Taken, None);
        }

        (
            Availability::Unknown,
            Some(format!("ambiguous WHOIS response: {}", snippet(response))),
        )
    }
}

/// First characters of a response on one line, for diagnostics.
fn snippet(response: &str) -> String {
    let collapsed = response.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() > SNIPPET_CHARS {
        let head: String = collapsed.chars().take(SNIPPET_CHARS).collect();
        format!("{}...", head)
    } else {
        collapsed
    }
}

/// WHOIS client speaking the port-43 text protocol directly.
#[derive(Debug, Clone)]
pub struct WhoisClient {
    /// Bound on connect + send + read
    timeout: Duration,
}

impl WhoisClient {
    pub fn new() -> Self {
        Self {
            timeout: Duration::from_secs(8),
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Query `server` for `domain` and classify the answer.
    ///
    /// Never fails: connection errors, timeouts and unclassifiable answers
    /// all produce an `Unknown` result with a diagnostic. No retry.
    pub async fn lookup(&self, domain: &str, tld: &str, server: &WhoisServer) -> LookupResult {
        let start = Instant::now();
        let exchange = tokio::time::timeout(self.timeout, self.query(domain, server)).await;

        let result = match exchange {
            Ok(Ok(bytes)) => {
                let text = String::from_utf8_lossy(&bytes);
                let (availability, diagnostic) = server.patterns.classify(&text);
                tracing::debug!(
                    domain,
                    server = %server.host,
                    bytes = bytes.len(),
                    verdict = %availability,
                    "WHOIS response classified"
                );
                LookupResult {
                    diagnostic,
                    ..LookupResult::new(domain, tld, Some(Protocol::Whois), availability)
                }
            }
            Ok(Err(reason)) => {
                tracing::debug!(domain, server = %server.host, %reason, "WHOIS query failed");
                LookupResult::unknown(domain, tld, Some(Protocol::Whois), reason)
            }
            Err(_) => {
                tracing::debug!(domain, server = %server.host, "WHOIS query timed out");
                LookupResult::unknown(
                    domain,
                    tld,
                    Some(Protocol::Whois),
                    format!("timeout after {:?}", self.timeout),
                )
            }
        };

        result.with_duration(start.elapsed())
    }

    /// Send `<domain>\r\n` and read until the server closes the connection.
    async fn query(&self, domain: &str, server: &WhoisServer) -> Result<Vec<u8>, String> {
        let mut stream = TcpStream::connect((server.host.as_str(), server.port))
            .await
            .map_err(|e| format!("connection failed: {}", e))?;

        stream
            .write_all(format!("{}\r\n", domain).as_bytes())
            .await
            .map_err(|e| format!("send failed: {}", e))?;

        let mut response = Vec::new();
        (&mut stream)
            .take(MAX_RESPONSE_BYTES)
            .read_to_end(&mut response)
            .await
            .map_err(|e| format!("read failed: {}", e))?;

        Ok(response)
    }
}

impl Default for WhoisClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncBufReadExt;
    use tokio::net::TcpListener;

    /// Serve one canned answer per connection, after reading the query line.
    async fn spawn_whois_stub(answer: &'static str) -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let mut reader = tokio::io::BufReader::new(socket);
                    let mut line = String::new();
                    let _ = reader.read_line(&mut line).await;
                    let mut socket = reader.into_inner();
                    let _ = socket.write_all(answer.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });
        port
    }

    fn local_server(port: u16) -> WhoisServer {
        WhoisServer::new("127.0.0.1").with_port(port)
    }

    #[test]
    fn test_classify_no_match_is_available() {
        let patterns = WhoisPatterns::default();
        let (verdict, diagnostic) = patterns.classify("No match for domain \"VERIFAI.IO\".");
        assert_eq!(verdict, Availability::Available);
        assert!(diagnostic.is_none());

        assert_eq!(patterns.classify("NOT FOUND").0, Availability::Available);
        assert_eq!(
            patterns.classify("No Data Found\r\n>>> Last update").0,
            Availability::Available
        );
    }

    #[test]
    fn test_classify_creation_date_is_taken() {
        let patterns = WhoisPatterns::default();
        let response = "Domain Name: GOOGLE.IO\nRegistry Domain ID: 123\nCreation Date: 2002-10-01T00:00:00Z\n";
        assert_eq!(patterns.classify(response).0, Availability::Taken);
        assert_eq!(
            patterns.classify("Creation Date: 2020-01-01").0,
            Availability::Taken
        );
    }

    #[test]
    fn test_classify_no_match_wins_over_fields() {
        let patterns = WhoisPatterns::default();
        let response = "Domain Name: verifai.co\nNo Data Found\n";
        assert_eq!(patterns.classify(response).0, Availability::Available);
    }

    #[test]
    fn test_classify_empty_is_unknown() {
        let patterns = WhoisPatterns::default();
        let (verdict, diagnostic) = patterns.classify("  \r\n ");
        assert_eq!(verdict, Availability::Unknown);
        assert_eq!(diagnostic.as_deref(), Some("empty WHOIS response"));
    }

    #[test]
    fn test_classify_ambiguous_keeps_truncated_snippet() {
        let patterns = WhoisPatterns::default();
        let response = format!("Welcome to the WHOIS service\n{}", "x".repeat(500));
        let (verdict, diagnostic) = patterns.classify(&response);
        assert_eq!(verdict, Availability::Unknown);

        let diagnostic = diagnostic.unwrap();
        assert!(diagnostic.starts_with("ambiguous WHOIS response: Welcome to the WHOIS service x"));
        assert!(diagnostic.ends_with("..."));
        assert!(diagnostic.len() < 200);
    }

    #[test]
    fn test_classify_rate_limit_is_unknown() {
        let patterns = WhoisPatterns::default();
        let (verdict, diagnostic) = patterns.classify("Query rate limit exceeded. Not found?");
        assert_eq!(verdict, Availability::Unknown);
        assert_eq!(diagnostic.as_deref(), Some("rate limited by WHOIS server"));
    }

    #[test]
    fn test_extended_patterns_are_lowercased_and_deduplicated() {
        let patterns = WhoisPatterns::default().extended(
            &["Is Free For Registration".to_string(), "no match".to_string()],
            &["Holder:".to_string()],
        );
        assert_eq!(
            patterns.classify("verifai.me is free for registration").0,
            Availability::Available
        );
        assert_eq!(patterns.classify("Holder: ACME").0, Availability::Taken);
        assert_eq!(
            patterns.available.iter().filter(|p| *p == "no match").count(),
            1
        );
    }

    #[test]
    fn test_client_default_timeout() {
        assert_eq!(WhoisClient::new().timeout(), Duration::from_secs(8));
        let client = WhoisClient::with_timeout(Duration::from_secs(2));
        assert_eq!(client.timeout(), Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_lookup_against_stub_server() {
        let port = spawn_whois_stub("NOT FOUND\r\n").await;
        let client = WhoisClient::with_timeout(Duration::from_secs(5));

        let result = client.lookup("verifai.io", "io", &local_server(port)).await;
        assert_eq!(result.availability, Availability::Available);
        assert_eq!(result.protocol, Some(Protocol::Whois));
        assert_eq!(result.domain, "verifai.io");
        assert!(result.check_duration.is_some());
    }

    #[tokio::test]
    async fn test_lookup_stops_reading_at_response_cap() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let mut reader = tokio::io::BufReader::new(socket);
            let mut line = String::new();
            let _ = reader.read_line(&mut line).await;
            let mut socket = reader.into_inner();

            // The no-match phrase sits just past the cap, followed by more filler
            let mut answer = "x".repeat(MAX_RESPONSE_BYTES as usize);
            answer.push_str("\r\nNOT FOUND\r\n");
            answer.push_str(&"y".repeat(100 * 1024));
            let _ = socket.write_all(answer.as_bytes()).await;

            // Keep the connection open: only the cap can end the read
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let client = WhoisClient::with_timeout(Duration::from_secs(5));
        let start = Instant::now();
        let result = client.lookup("verifai.io", "io", &local_server(port)).await;

        assert!(start.elapsed() < Duration::from_secs(5));
        assert_eq!(result.availability, Availability::Unknown);
        let diagnostic = result.diagnostic.unwrap();
        assert!(!diagnostic.contains("timeout"));
        assert!(diagnostic.starts_with("ambiguous WHOIS response: xxxx"));
    }

    #[tokio::test]
    async fn test_lookup_connection_refused_is_unknown() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let client = WhoisClient::with_timeout(Duration::from_secs(5));
        let result = client.lookup("verifai.io", "io", &local_server(port)).await;
        assert_eq!(result.availability, Availability::Unknown);
        assert!(result
            .diagnostic
            .unwrap()
            .starts_with("connection failed"));
    }

    #[tokio::test]
    async fn test_lookup_silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let client = WhoisClient::with_timeout(Duration::from_millis(200));
        let result = client.lookup("verifai.io", "io", &local_server(port)).await;
        assert_eq!(result.availability, Availability::Unknown);
        assert!(result.diagnostic.unwrap().contains("timeout"));
    }
}

//! Frames the sandbox's raw log stream into lines and decodes the
//! `test_result`/`final_result` JSON events embedded in it. Tolerant by
//! design: a malformed line is logged and skipped, never fatal.

use judge_core::model::{ResultEvent, Summary};
use tracing::debug;

/// Control characters stripped from each chunk before line-splitting.
/// Preserves tab (U+0009), line-feed (U+000A), and carriage-return
/// (U+000D) — everything else in the C0 range is log-multiplexer noise.
fn strip_control_chars(input: &str) -> String {
    input
        .chars()
        .filter(|&c| {
            let code = c as u32;
            let is_c0_noise = (0x00..=0x08).contains(&code)
                || (0x0B..=0x0C).contains(&code)
                || (0x0E..=0x1F).contains(&code);
            !is_c0_noise
        })
        .collect()
}

/// Incremental parser. Feed it chunks as they arrive; query `final_result`
/// once the container has exited.
#[derive(Debug, Default)]
pub struct ResultParser {
    buffer: String,
    final_result: Option<Summary>,
    test_results_seen: u32,
}

impl ResultParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts one chunk of raw bytes (lossy-decoded as UTF-8, since the
    /// multiplex framing can inject non-UTF-8 bytes at chunk boundaries).
    pub fn feed(&mut self, chunk: &[u8]) {
        let text = String::from_utf8_lossy(chunk);
        self.buffer.push_str(&strip_control_chars(&text));

        loop {
            let Some(newline_at) = self.buffer.find('\n') else {
                break;
            };
            let line: String = self.buffer.drain(..=newline_at).collect();
            let line = line.trim_end_matches('\n').trim();
            self.process_line(line);
        }
    }

    /// Number of `test_result` events observed so far — observed but never
    /// accumulated, per the contract that the final summary is
    /// authoritative.
    pub fn test_results_seen(&self) -> u32 {
        self.test_results_seen
    }

    pub fn final_result(&self) -> Option<&Summary> {
        self.final_result.as_ref()
    }

    pub fn into_final_result(self) -> Option<Summary> {
        self.final_result
    }

    fn process_line(&mut self, line: &str) {
        if line.is_empty() {
            return;
        }
        let Some(brace_at) = line.find('{') else {
            debug!(line, "log line has no JSON payload, skipping");
            return;
        };
        let json_slice = &line[brace_at..];
        match serde_json::from_str::<ResultEvent>(json_slice) {
            Ok(ResultEvent::TestResult { .. }) => {
                self.test_results_seen += 1;
            }
            Ok(ResultEvent::FinalResult { data }) => {
                self.final_result = Some(data);
            }
            Err(err) => {
                debug!(line, error = %err, "failed to decode result event, skipping");
            }
        }
    }
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;

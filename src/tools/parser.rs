// Directive parser for model output
//
// Extracts `{"name": ..., "arguments": {...}}` tool directives from free-form
// model text, either from fenced code blocks or inline. Malformed JSON is
// skipped; parsing never fails.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::{HashMap, HashSet};

use super::types::ToolCall;
use crate::json_scan::{find_object_end, object_ends_from};

/// Fenced block, optionally tagged `json`
///
/// Matches: ```json\n{...}\n```
static CODE_BLOCK_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```(?:json)?[ \t]*\r?\n(.*?)\r?\n[ \t]*```")
        .expect("Failed to compile code block regex")
});

/// Parser for extracting tool directives from output
pub struct ToolCallParser;

impl ToolCallParser {
    /// Extract all directives from `output`, in order of first appearance,
    /// with duplicates (same name and arguments) removed.
    pub fn parse(output: &str) -> Vec<ToolCall> {
        let mut found: Vec<(usize, ToolCall)> = Vec::new();

        // Pass 1: fenced code blocks
        for capture in CODE_BLOCK_REGEX.captures_iter(output) {
            let Some(body) = capture.get(1) else {
                continue;
            };
            match serde_json::from_str::<Value>(body.as_str().trim()) {
                Ok(value) => {
                    if let Some(call) = ToolCall::from_value(value) {
                        found.push((body.start(), call));
                    }
                }
                Err(e) => {
                    tracing::debug!("Skipping code block that is not valid JSON: {}", e);
                }
            }
        }

        // Pass 2: inline objects anywhere in the text
        found.extend(Self::scan_inline(output));

        found.sort_by_key(|(position, _)| *position);

        let mut seen = HashSet::new();
        found
            .into_iter()
            .filter_map(|(_, call)| seen.insert(call.signature()).then_some(call))
            .collect()
    }

    /// Brace-balanced candidates mentioning both `"name"` and `"arguments"`
    fn scan_inline(output: &str) -> Vec<(usize, ToolCall)> {
        let bytes = output.as_bytes();
        let mut calls = Vec::new();
        let mut known_ends: HashMap<usize, Option<usize>> = HashMap::new();
        let mut cursor = 0;

        while let Some(offset) = bytes[cursor..].iter().position(|&b| b == b'{') {
            let start = cursor + offset;
            let end = match known_ends.get(&start) {
                Some(end) => *end,
                None => {
                    let end = find_object_end(bytes, start);
                    if end.is_none() {
                        // Later braces would rescan the same tail
                        known_ends.extend(object_ends_from(bytes, start));
                    }
                    end
                }
            };
            let Some(end) = end else {
                // Unbalanced from here; an inner object may still close
                cursor = start + 1;
                continue;
            };

            let candidate = &output[start..end];
            if candidate.contains("\"name\"") && candidate.contains("\"arguments\"") {
                match serde_json::from_str::<Value>(candidate) {
                    Ok(value) => {
                        if let Some(call) = ToolCall::from_value(value) {
                            calls.push((start, call));
                            cursor = end;
                            continue;
                        }
                    }
                    Err(e) => {
                        tracing::debug!("Skipping inline candidate that is not valid JSON: {}", e);
                    }
                }
            }
            cursor = start + 1;
        }

        calls
    }

    /// Fast check without full parsing
    pub fn has_tool_calls(output: &str) -> bool {
        output.contains("\"name\"") && output.contains("\"arguments\"")
    }
}

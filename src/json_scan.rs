// Brace-balanced JSON object scanning
//
// A small state machine that tracks brace depth while respecting string
// literals and escapes. Used both for splitting the Ollama byte stream into
// complete objects and for locating inline directives in model text.

use std::collections::HashMap;

/// Lexical state of the scanner between bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanState {
    #[default]
    Normal,
    InString,
    Escaped,
}

/// Re-entrant scanner that yields complete top-level JSON objects.
///
/// Bytes may be pushed in arbitrary chunks; an object split across chunk
/// boundaries is buffered until its closing brace arrives. Anything between
/// objects at depth zero (newlines, whitespace) is discarded.
#[derive(Debug, Default)]
pub struct ObjectScanner {
    buffer: Vec<u8>,
    state: ScanState,
    depth: usize,
}

impl ObjectScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk, returning every object completed by it
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Vec<u8>> {
        let mut complete = Vec::new();

        for &byte in chunk {
            if self.depth == 0 {
                if byte == b'{' {
                    self.buffer.clear();
                    self.buffer.push(byte);
                    self.depth = 1;
                    self.state = ScanState::Normal;
                }
                continue;
            }

            self.buffer.push(byte);
            if step(&mut self.state, &mut self.depth, byte) {
                complete.push(std::mem::take(&mut self.buffer));
            }
        }

        complete
    }

    /// Bytes of an unfinished object still waiting for more input
    pub fn pending(&self) -> &[u8] {
        &self.buffer
    }

    pub fn is_idle(&self) -> bool {
        self.depth == 0
    }
}

/// Find the index one past the `}` balancing the `{` at `start`.
///
/// Returns `None` when `start` is not a `{` or the object never closes.
pub fn find_object_end(bytes: &[u8], start: usize) -> Option<usize> {
    if bytes.get(start) != Some(&b'{') {
        return None;
    }

    let mut state = ScanState::Normal;
    let mut depth = 1;
    for (offset, &byte) in bytes[start + 1..].iter().enumerate() {
        if step(&mut state, &mut depth, byte) {
            return Some(start + 1 + offset + 1);
        }
    }
    None
}

/// `find_object_end` for every `{` reached in the normal state while
/// scanning from `start`, computed in one pass.
///
/// Braces that never close map to `None`. A brace inside a string literal
/// (as seen from `start`) is not included.
pub fn object_ends_from(bytes: &[u8], start: usize) -> HashMap<usize, Option<usize>> {
    let mut ends = HashMap::new();
    let mut open = Vec::new();
    let mut state = ScanState::Normal;

    for (index, &byte) in bytes.iter().enumerate().skip(start) {
        match state {
            ScanState::Escaped => state = ScanState::InString,
            ScanState::InString => match byte {
                b'\\' => state = ScanState::Escaped,
                b'"' => state = ScanState::Normal,
                _ => {}
            },
            ScanState::Normal => match byte {
                b'"' => state = ScanState::InString,
                b'{' => open.push(index),
                b'}' => {
                    if let Some(opened) = open.pop() {
                        ends.insert(opened, Some(index + 1));
                    }
                }
                _ => {}
            },
        }
    }

    ends.extend(open.into_iter().map(|opened| (opened, None)));
    ends
}

/// Advance the state machine by one byte inside an object.
/// Returns true when this byte closes the outermost object.
fn step(state: &mut ScanState, depth: &mut usize, byte: u8) -> bool {
    match *state {
        ScanState::Escaped => *state = ScanState::InString,
        ScanState::InString => match byte {
            b'\\' => *state = ScanState::Escaped,
            b'"' => *state = ScanState::Normal,
            _ => {}
        },
        ScanState::Normal => match byte {
            b'"' => *state = ScanState::InString,
            b'{' => *depth += 1,
            b'}' => {
                *depth -= 1;
                return *depth == 0;
            }
            _ => {}
        },
    }
    false
}

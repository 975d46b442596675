//! Terminal matchers: literals and anchored DFAs.

use regex_automata::dfa::{Automaton, StartKind, dense};
use regex_automata::{Anchored, Input, MatchKind};
use stache_core::TokenMatcher;

/// Result of running one matcher at a position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Attempt {
    /// Length of the longest non-empty match.
    pub len: Option<usize>,
    /// End (exclusive) of the bytes examined. `text.len() + 1` when end of input was looked at.
    pub examined: usize,
}

#[derive(Debug)]
pub(crate) enum Matcher {
    Literal(Box<[u8]>),
    Pattern(dense::DFA<Vec<u32>>),
}

impl Matcher {
    pub fn build(matcher: &TokenMatcher) -> Result<Self, String> {
        match matcher {
            TokenMatcher::Literal(value) => Ok(Matcher::Literal(value.as_bytes().into())),
            TokenMatcher::Pattern(pattern) => dense::DFA::builder()
                .configure(
                    dense::DFA::config()
                        .start_kind(StartKind::Anchored)
                        .match_kind(MatchKind::All),
                )
                .build(pattern)
                .map(Matcher::Pattern)
                .map_err(|e| e.to_string()),
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Matcher::Literal(_))
    }

    pub fn attempt(&self, text: &[u8], start: usize) -> Attempt {
        match self {
            Matcher::Literal(literal) => attempt_literal(literal, text, start),
            Matcher::Pattern(dfa) => attempt_dfa(dfa, text, start),
        }
    }
}

fn attempt_literal(literal: &[u8], text: &[u8], start: usize) -> Attempt {
    for (i, &expected) in literal.iter().enumerate() {
        let at = start + i;
        match text.get(at) {
            None => {
                return Attempt {
                    len: None,
                    examined: text.len() + 1,
                };
            }
            Some(&actual) if actual != expected => {
                return Attempt {
                    len: None,
                    examined: at + 1,
                };
            }
            Some(_) => {}
        }
    }
    Attempt {
        len: Some(literal.len()),
        examined: start + literal.len(),
    }
}

/// Longest-match walk over the DFA, one byte at a time.
///
/// Match states are delayed by one byte: entering a match state after
/// consuming the byte at `pos - 1` reports a match ending at `pos - 1`.
fn attempt_dfa(dfa: &dense::DFA<Vec<u32>>, text: &[u8], start: usize) -> Attempt {
    let input = Input::new(text).range(start..).anchored(Anchored::Yes);
    let Ok(mut state) = dfa.start_state_forward(&input) else {
        return Attempt {
            len: None,
            examined: start,
        };
    };

    let mut last_match = None;
    let mut pos = start;
    let examined = loop {
        let Some(&byte) = text.get(pos) else {
            state = dfa.next_eoi_state(state);
            if dfa.is_match_state(state) {
                last_match = Some(pos);
            }
            break text.len() + 1;
        };
        state = dfa.next_state(state, byte);
        pos += 1;
        if dfa.is_match_state(state) {
            last_match = Some(pos - 1);
        }
        if dfa.is_dead_state(state) || dfa.is_quit_state(state) {
            break pos;
        }
    };

    Attempt {
        len: last_match.map(|end| end - start).filter(|&len| len > 0),
        examined,
    }
}

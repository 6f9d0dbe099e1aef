//! Aho–Corasick multi-pattern string matching.
//!
//! Locates every occurrence of every registered pattern in a single pass
//! over the text. The corrector uses one automaton over alias surfaces to
//! find exact-match candidates cheaply, and a second one over protected
//! terms to build the protection mask, leaving phonetic fuzzy scoring for
//! the spans that survive.
//!
//! Nodes live in a flat arena indexed by `u32`; transitions are per-node
//! hash maps keyed by `char`, so patterns and haystacks may freely mix
//! scripts.

use rustc_hash::FxHashMap;
use std::collections::VecDeque;

/// One occurrence of a registered pattern in the haystack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AhoMatch {
    /// Byte offset of the first matched byte.
    pub start: usize,
    /// Byte offset one past the last matched byte.
    pub end: usize,
    /// Id returned by [`AhoCorasick::add`] for the matched pattern.
    pub pattern: u32,
}

#[derive(Debug, Default)]
struct Node {
    next: FxHashMap<char, u32>,
    fail: u32,
    out: Vec<u32>,
}

/// Multi-pattern matcher. Add patterns, [`build`](Self::build), then scan.
#[derive(Debug, Default)]
pub struct AhoCorasick {
    nodes: Vec<Node>,
    pattern_byte_lens: Vec<usize>,
    built: bool,
}

impl AhoCorasick {
    /// Creates an empty automaton.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::default()],
            pattern_byte_lens: Vec::new(),
            built: false,
        }
    }

    /// Number of registered patterns.
    pub fn pattern_count(&self) -> usize {
        self.pattern_byte_lens.len()
    }

    /// Registers a pattern and returns its id.
    ///
    /// # Panics
    ///
    /// Panics if called after [`build`](Self::build); the automaton is
    /// immutable once built.
    pub fn add(&mut self, pattern: &str) -> u32 {
        assert!(!self.built, "AhoCorasick is already built");

        let id = self.pattern_byte_lens.len() as u32;
        self.pattern_byte_lens.push(pattern.len());

        if pattern.is_empty() {
            return id;
        }

        let mut node = 0u32;
        for ch in pattern.chars() {
            let next = match self.nodes[node as usize].next.get(&ch) {
                Some(&n) => n,
                None => {
                    let n = self.nodes.len() as u32;
                    self.nodes[node as usize].next.insert(ch, n);
                    self.nodes.push(Node::default());
                    n
                }
            };
            node = next;
        }
        self.nodes[node as usize].out.push(id);
        id
    }

    /// Computes the failure links. Idempotent.
    pub fn build(&mut self) {
        if self.built {
            return;
        }

        let mut queue = VecDeque::new();
        let roots: Vec<u32> = self.nodes[0].next.values().copied().collect();
        for next in roots {
            self.nodes[next as usize].fail = 0;
            queue.push_back(next);
        }

        while let Some(r) = queue.pop_front() {
            let transitions: Vec<(char, u32)> = self.nodes[r as usize]
                .next
                .iter()
                .map(|(&ch, &u)| (ch, u))
                .collect();

            for (ch, u) in transitions {
                queue.push_back(u);

                let mut v = self.nodes[r as usize].fail;
                while v != 0 && !self.nodes[v as usize].next.contains_key(&ch) {
                    v = self.nodes[v as usize].fail;
                }
                let fail = self.nodes[v as usize].next.get(&ch).copied().unwrap_or(0);
                let fail = if fail == u { 0 } else { fail };
                self.nodes[u as usize].fail = fail;

                // Outputs reachable through the fail link belong here too.
                let inherited = self.nodes[fail as usize].out.clone();
                self.nodes[u as usize].out.extend(inherited);
            }
        }

        self.built = true;
    }

    /// Finds all pattern occurrences in `text`, in haystack order.
    ///
    /// Offsets are byte offsets into `text`, suitable for direct slicing.
    ///
    /// # Panics
    ///
    /// Panics if the automaton has not been built.
    pub fn find_all(&self, text: &str) -> Vec<AhoMatch> {
        assert!(self.built, "AhoCorasick must be built before scanning");

        let mut matches = Vec::new();
        let mut state = 0u32;

        for (byte_idx, ch) in text.char_indices() {
            while state != 0 && !self.nodes[state as usize].next.contains_key(&ch) {
                state = self.nodes[state as usize].fail;
            }
            state = self.nodes[state as usize]
                .next
                .get(&ch)
                .copied()
                .unwrap_or(0);

            if self.nodes[state as usize].out.is_empty() {
                continue;
            }

            let end = byte_idx + ch.len_utf8();
            for &pattern in &self.nodes[state as usize].out {
                let len = self.pattern_byte_lens[pattern as usize];
                if len <= end {
                    matches.push(AhoMatch {
                        start: end - len,
                        end,
                        pattern,
                    });
                }
            }
        }

        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(patterns: &[&str]) -> AhoCorasick {
        let mut ac = AhoCorasick::new();
        for p in patterns {
            ac.add(p);
        }
        ac.build();
        ac
    }

    #[test]
    fn test_single_pattern() {
        let ac = build(&["abc"]);
        let matches = ac.find_all("xxabcyyabc");
        assert_eq!(matches.len(), 2);
        assert_eq!((matches[0].start, matches[0].end), (2, 5));
        assert_eq!((matches[1].start, matches[1].end), (7, 10));
    }

    #[test]
    fn test_overlapping_patterns() {
        let ac = build(&["he", "she", "hers"]);
        let matches = ac.find_all("shers");
        let found: Vec<(usize, usize, u32)> =
            matches.iter().map(|m| (m.start, m.end, m.pattern)).collect();
        assert!(found.contains(&(0, 3, 1))); // she
        assert!(found.contains(&(1, 3, 0))); // he
        assert!(found.contains(&(1, 5, 2))); // hers
    }

    #[test]
    fn test_cjk_byte_offsets() {
        let ac = build(&["北車"]);
        let text = "我在北車等你";
        let matches = ac.find_all(text);
        assert_eq!(matches.len(), 1);
        assert_eq!(&text[matches[0].start..matches[0].end], "北車");
    }

    #[test]
    fn test_pattern_inside_pattern() {
        let ac = build(&["台北車站", "北車"]);
        let matches = ac.find_all("去台北車站");
        assert_eq!(matches.len(), 2);
    }

    #[test]
    fn test_no_match() {
        let ac = build(&["xyz"]);
        assert!(ac.find_all("abcabc").is_empty());
    }

    #[test]
    fn test_empty_pattern_never_matches() {
        let mut ac = AhoCorasick::new();
        ac.add("");
        ac.add("ab");
        ac.build();
        let matches = ac.find_all("ab");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].pattern, 1);
    }

    #[test]
    fn test_mixed_script() {
        let ac = build(&["1kg", "EKG"]);
        let matches = ac.find_all("這個 1kg設備跟EKG");
        assert_eq!(matches.len(), 2);
    }
}

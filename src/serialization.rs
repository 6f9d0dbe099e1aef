//! JSON term-dictionary loading (feature `serialization`).
//!
//! Accepts the same three shapes as the in-code builders:
//!
//! ```json
//! ["台北車站", "牛奶"]
//! {"台北車站": ["北車"]}
//! {"EKG": {"aliases": ["1kg"], "keywords": ["設備"], "exclude_when": ["重"], "weight": 0.2}}
//! ```
//!
//! Map-shaped input is sorted by canonical so the resulting dictionary —
//! and therefore the whole pipeline — is deterministic regardless of JSON
//! key order.

use crate::error::{PhonofixError, Result};
use crate::term::{TermConfig, TermDict};
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Deserialize)]
#[serde(untagged)]
enum TermEntry {
    Aliases(Vec<String>),
    Full {
        #[serde(default)]
        aliases: Vec<String>,
        #[serde(default)]
        keywords: Vec<String>,
        #[serde(default)]
        exclude_when: Vec<String>,
        #[serde(default)]
        weight: f64,
        #[serde(default)]
        max_variants: Option<usize>,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TermDictJson {
    Canonicals(Vec<String>),
    Map(BTreeMap<String, TermEntry>),
}

/// Parses a term dictionary from JSON.
pub fn term_dict_from_json(json: &str) -> Result<TermDict> {
    let parsed: TermDictJson =
        serde_json::from_str(json).map_err(|e| PhonofixError::InvalidInput {
            reason: format!("term dictionary JSON: {e}"),
        })?;

    let mut dict = TermDict::new();
    match parsed {
        TermDictJson::Canonicals(canonicals) => {
            for canonical in canonicals {
                dict.insert(canonical, TermConfig::default());
            }
        }
        TermDictJson::Map(map) => {
            for (canonical, entry) in map {
                let config = match entry {
                    TermEntry::Aliases(aliases) => TermConfig::with_aliases(aliases),
                    TermEntry::Full {
                        aliases,
                        keywords,
                        exclude_when,
                        weight,
                        max_variants,
                    } => TermConfig {
                        aliases,
                        keywords,
                        exclude_when,
                        weight,
                        max_variants,
                    },
                };
                dict.insert(canonical, config);
            }
        }
    }

    Ok(dict)
}

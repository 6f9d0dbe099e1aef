//! Error taxonomy.
//!
//! Build-time errors (`InvalidInput`, `BackendUnavailable`, `ResourceLimit`)
//! propagate out of `create_corrector` unless the engine's fail policy is
//! [`FailPolicy::Degrade`](crate::config::FailPolicy::Degrade). Call-time
//! errors are always recovered locally: `correct()` never fails for content
//! reasons, it emits events instead.

use crate::config::Language;
use thiserror::Error;

/// All errors produced by this crate.
#[derive(Debug, Error)]
pub enum PhonofixError {
    /// The term dictionary is malformed (empty canonical, weight out of
    /// range, zero variant budget). Raised at `create_corrector`, never
    /// during `correct()`.
    #[error("invalid term dictionary: {reason}")]
    InvalidInput {
        /// Human-readable description of the offending entry.
        reason: String,
    },

    /// The external phonetic engine for a language is missing or
    /// mis-configured. The hint describes how to install it.
    #[error("phonetic backend for {language} is unavailable: {hint}")]
    BackendUnavailable {
        /// Language whose backend could not be initialised.
        language: Language,
        /// Install hint for the missing engine.
        hint: String,
    },

    /// A phonetic conversion failed on a sub-span. Recovered locally inside
    /// `correct()`; surfaces only from direct backend calls.
    #[error("phonetic conversion failed: {detail}")]
    Fuzzy {
        /// Description of the failed conversion.
        detail: String,
    },

    /// A configured bound was exceeded at build time (protected-term set,
    /// total search-target count). Raise the cap or prune the input.
    #[error("{what} exceeds the configured limit ({actual} > {limit})")]
    ResourceLimit {
        /// What overflowed.
        what: &'static str,
        /// The configured cap.
        limit: usize,
        /// The observed size.
        actual: usize,
    },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PhonofixError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PhonofixError::InvalidInput {
            reason: "empty canonical".into(),
        };
        assert_eq!(err.to_string(), "invalid term dictionary: empty canonical");

        let err = PhonofixError::ResourceLimit {
            what: "protected terms",
            limit: 10,
            actual: 11,
        };
        assert_eq!(
            err.to_string(),
            "protected terms exceeds the configured limit (11 > 10)"
        );
    }
}

//! Kids text filter lexicon and sanitization
//!
//! Text is split into words (maximal runs of alphanumeric characters). A word
//! that matches a lexicon term, ignoring case, is either kept, redacted, or
//! causes the whole text to be hidden, depending on the term's severity and the
//! active [`FilterLevel`].
//!
//! Redaction replaces every character of the word with `*`. Since `*` is not
//! alphanumeric, a redacted word can never match again, which makes
//! sanitization idempotent and never lengthens the text.

use super::level::FilterLevel;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;
use thiserror::Error;

/// Errors that can occur while building a lexicon
#[derive(Debug, Error)]
pub enum FilterError {
    /// Term is empty or contains non-alphanumeric characters
    #[error("Invalid lexicon term: {0:?}")]
    InvalidTerm(String),

    /// Too many custom terms
    #[error("Too many lexicon terms: {count} exceeds maximum {max}")]
    TooManyTerms {
        /// Actual count
        count: usize,
        /// Maximum allowed
        max: usize,
    },
}

/// Result type for filter operations
pub type Result<T> = std::result::Result<T, FilterError>;

/// Maximum number of custom terms in a lexicon
pub const MAX_LEXICON_TERMS: usize = 500;

/// Character used to redact a word
pub const REDACTION_CHAR: char = '*';

/// How objectionable a term is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TermSeverity {
    /// Mild language
    Mild,
    /// Profanity
    Strong,
    /// Sexual, drug-related or otherwise unsuitable for children
    Severe,
}

/// What the filter does with a matched term
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TermAction {
    Keep,
    Redact,
    Hide,
}

fn term_action(level: FilterLevel, severity: TermSeverity) -> TermAction {
    match (level, severity) {
        (FilterLevel::Strict | FilterLevel::Unrecognized, _) => TermAction::Hide,
        (FilterLevel::Moderate, TermSeverity::Severe) => TermAction::Hide,
        (FilterLevel::Moderate, _) => TermAction::Redact,
        (FilterLevel::Relaxed, TermSeverity::Mild) => TermAction::Keep,
        (FilterLevel::Relaxed, _) => TermAction::Redact,
    }
}

/// Result of sanitizing a text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextVerdict {
    /// The text must not be shown at all
    Hidden,
    /// The text with objectionable words redacted
    Clean(String),
}

impl TextVerdict {
    /// Check if the text was hidden
    pub fn is_hidden(&self) -> bool {
        matches!(self, TextVerdict::Hidden)
    }

    /// The sanitized text, if shown
    pub fn text(&self) -> Option<&str> {
        match self {
            TextVerdict::Hidden => None,
            TextVerdict::Clean(text) => Some(text),
        }
    }
}

/// A term with its severity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexiconTerm {
    /// The word to match
    pub term: String,
    /// Severity of the word
    pub severity: TermSeverity,
}

impl LexiconTerm {
    /// Create a new term
    pub fn new(term: impl Into<String>, severity: TermSeverity) -> Self {
        Self { term: term.into(), severity }
    }
}

/// Kids filter configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KidsFilterConfig {
    /// Whether the built-in term list is included
    #[serde(default = "default_true")]
    pub include_builtin: bool,
    /// Additional terms
    #[serde(default)]
    pub extra_terms: Vec<LexiconTerm>,
}

fn default_true() -> bool {
    true
}

impl Default for KidsFilterConfig {
    fn default() -> Self {
        Self { include_builtin: true, extra_terms: Vec::new() }
    }
}

impl KidsFilterConfig {
    /// Create a new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Include or exclude the built-in term list
    pub fn include_builtin(mut self, include: bool) -> Self {
        self.include_builtin = include;
        self
    }

    /// Add a custom term
    pub fn term(mut self, term: impl Into<String>, severity: TermSeverity) -> Self {
        self.extra_terms.push(LexiconTerm::new(term, severity));
        self
    }
}

const BUILTIN_TERMS: &[(&str, TermSeverity)] = &[
    ("crap", TermSeverity::Mild),
    ("damn", TermSeverity::Mild),
    ("idiot", TermSeverity::Mild),
    ("stupid", TermSeverity::Mild),
    ("sucks", TermSeverity::Mild),
    ("ass", TermSeverity::Strong),
    ("bastard", TermSeverity::Strong),
    ("bitch", TermSeverity::Strong),
    ("piss", TermSeverity::Strong),
    ("shit", TermSeverity::Strong),
    ("cocaine", TermSeverity::Severe),
    ("fuck", TermSeverity::Severe),
    ("heroin", TermSeverity::Severe),
    ("nude", TermSeverity::Severe),
    ("nudes", TermSeverity::Severe),
    ("porn", TermSeverity::Severe),
];

/// Set of terms the kids filter reacts to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KidsLexicon {
    terms: HashMap<String, TermSeverity>,
}

impl KidsLexicon {
    /// Create an empty lexicon
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared built-in lexicon
    pub fn builtin() -> &'static KidsLexicon {
        static BUILTIN: OnceLock<KidsLexicon> = OnceLock::new();
        BUILTIN.get_or_init(|| {
            let terms = BUILTIN_TERMS
                .iter()
                .map(|(term, severity)| (term.to_string(), *severity))
                .collect();
            KidsLexicon { terms }
        })
    }

    /// Build a lexicon from configuration
    pub fn from_config(config: &KidsFilterConfig) -> Result<Self> {
        if config.extra_terms.len() > MAX_LEXICON_TERMS {
            return Err(FilterError::TooManyTerms {
                count: config.extra_terms.len(),
                max: MAX_LEXICON_TERMS,
            });
        }

        let mut lexicon = if config.include_builtin {
            Self::builtin().clone()
        } else {
            Self::new()
        };
        for term in &config.extra_terms {
            lexicon.add_term(&term.term, term.severity)?;
        }
        Ok(lexicon)
    }

    /// Add a term; an existing term keeps the higher severity
    pub fn add_term(&mut self, term: &str, severity: TermSeverity) -> Result<()> {
        if term.is_empty() || !term.chars().all(char::is_alphanumeric) {
            return Err(FilterError::InvalidTerm(term.to_string()));
        }
        let entry = self.terms.entry(term.to_lowercase()).or_insert(severity);
        *entry = (*entry).max(severity);
        Ok(())
    }

    /// Severity of a word, if it is a term
    pub fn severity_of(&self, word: &str) -> Option<TermSeverity> {
        self.terms.get(&word.to_lowercase()).copied()
    }

    /// Number of terms
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Check if the lexicon has no terms
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Sanitize text at the given level
    pub fn sanitize(&self, text: &str, level: FilterLevel) -> TextVerdict {
        if !level.is_recognized() {
            return TextVerdict::Hidden;
        }

        let mut output = String::with_capacity(text.len());
        let mut copied_to = 0;

        for (start, end) in word_spans(text) {
            let word = &text[start..end];
            let Some(severity) = self.severity_of(word) else {
                continue;
            };
            match term_action(level, severity) {
                TermAction::Keep => {}
                TermAction::Hide => return TextVerdict::Hidden,
                TermAction::Redact => {
                    output.push_str(&text[copied_to..start]);
                    output.extend(std::iter::repeat(REDACTION_CHAR).take(word.chars().count()));
                    copied_to = end;
                }
            }
        }

        output.push_str(&text[copied_to..]);
        TextVerdict::Clean(output)
    }
}

/// Byte ranges of maximal alphanumeric runs
fn word_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = None;

    for (index, ch) in text.char_indices() {
        match (ch.is_alphanumeric(), start) {
            (true, None) => start = Some(index),
            (false, Some(begin)) => {
                spans.push((begin, index));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(begin) = start {
        spans.push((begin, text.len()));
    }

    spans
}

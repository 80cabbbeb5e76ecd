//! Content visibility decisions
//!
//! The content filter decides, for a resolved [`EffectiveConfig`] and a
//! [`ContentItem`], whether the item is hidden, shown with sanitized text, or
//! shown as is. Rules are evaluated in a fixed order and the first match wins:
//!
//! 1. a `Blocked` moderation override hides everything;
//! 2. items whose minimum audience is above the effective audience are hidden;
//! 3. in kids mode the text goes through the kids filter at the effective level;
//! 4. anything else is shown raw.

mod level;
mod lexicon;

pub use level::FilterLevel;
pub use lexicon::{
    FilterError, KidsFilterConfig, KidsLexicon, LexiconTerm, Result, TermSeverity, TextVerdict,
    MAX_LEXICON_TERMS, REDACTION_CHAR,
};

use crate::audience::Audience;
use crate::resolver::EffectiveConfig;

/// A piece of content as seen by the filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentItem {
    /// Lowest audience the content is suitable for
    pub min_audience: Audience,
    /// Raw text
    pub text: String,
}

impl ContentItem {
    /// Create a new content item
    pub fn new(min_audience: Audience, text: impl Into<String>) -> Self {
        Self { min_audience, text: text.into() }
    }
}

/// What to render for a content item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentDecision {
    /// Do not render the item
    Hide,
    /// Render the item with this sanitized text
    ShowSanitized(String),
    /// Render the item unchanged
    ShowRaw,
}

impl ContentDecision {
    /// Check if the item is hidden
    pub fn is_hidden(&self) -> bool {
        matches!(self, ContentDecision::Hide)
    }

    /// Text to render, given the item's raw text
    pub fn display_text<'a>(&'a self, raw: &'a str) -> Option<&'a str> {
        match self {
            ContentDecision::Hide => None,
            ContentDecision::ShowSanitized(text) => Some(text),
            ContentDecision::ShowRaw => Some(raw),
        }
    }
}

/// Why an item was hidden
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HideReason {
    /// The moderation override forces every item blocked
    ModerationBlocked,
    /// The item is not suitable for the effective audience
    BelowMinimumAudience {
        /// Minimum audience of the item
        required: Audience,
        /// Effective audience of the viewer
        actual: Audience,
    },
    /// The kids text filter rejected the text
    KidsTextFilter,
}

impl HideReason {
    /// Get a human-readable description
    pub fn description(&self) -> String {
        match self {
            HideReason::ModerationBlocked => "Blocked by moderation".to_string(),
            HideReason::BelowMinimumAudience { required, actual } => {
                format!("Requires audience {} (viewer is {})", required, actual)
            }
            HideReason::KidsTextFilter => "Hidden by the kids filter".to_string(),
        }
    }
}

/// A decision together with the reason an item was hidden
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOutcome {
    /// What to render
    pub decision: ContentDecision,
    /// Set when `decision` is [`ContentDecision::Hide`]
    pub reason: Option<HideReason>,
}

impl FilterOutcome {
    fn hidden(reason: HideReason) -> Self {
        Self { decision: ContentDecision::Hide, reason: Some(reason) }
    }

    fn shown(decision: ContentDecision) -> Self {
        Self { decision, reason: None }
    }
}

/// Content filter backed by a kids lexicon
#[derive(Debug, Clone)]
pub struct ContentFilter {
    lexicon: KidsLexicon,
}

impl Default for ContentFilter {
    fn default() -> Self {
        Self::new(KidsLexicon::builtin().clone())
    }
}

impl ContentFilter {
    /// Create a content filter with the given lexicon
    pub fn new(lexicon: KidsLexicon) -> Self {
        Self { lexicon }
    }

    /// Create a content filter from kids filter configuration
    pub fn with_config(config: &KidsFilterConfig) -> Result<Self> {
        Ok(Self::new(KidsLexicon::from_config(config)?))
    }

    /// Get the lexicon
    pub fn lexicon(&self) -> &KidsLexicon {
        &self.lexicon
    }

    /// Decide what to render for an item
    pub fn decide(&self, config: &EffectiveConfig, item: &ContentItem) -> ContentDecision {
        self.decide_with_reason(config, item).decision
    }

    /// Decide what to render for an item, keeping the reason it was hidden
    pub fn decide_with_reason(
        &self,
        config: &EffectiveConfig,
        item: &ContentItem,
    ) -> FilterOutcome {
        evaluate(&self.lexicon, config, item)
    }

    /// Sanitize text at a filter level
    pub fn sanitize(&self, text: &str, level: FilterLevel) -> TextVerdict {
        self.lexicon.sanitize(text, level)
    }
}

/// Decide what to render for an item using the built-in lexicon
pub fn decide(config: &EffectiveConfig, item: &ContentItem) -> ContentDecision {
    evaluate(KidsLexicon::builtin(), config, item).decision
}

/// Sanitize text using the built-in lexicon
pub fn sanitize(text: &str, level: FilterLevel) -> TextVerdict {
    KidsLexicon::builtin().sanitize(text, level)
}

fn evaluate(lexicon: &KidsLexicon, config: &EffectiveConfig, item: &ContentItem) -> FilterOutcome {
    if config.moderation_override().hides_content() {
        return FilterOutcome::hidden(HideReason::ModerationBlocked);
    }

    if !config.audience().admits(item.min_audience) {
        return FilterOutcome::hidden(HideReason::BelowMinimumAudience {
            required: item.min_audience,
            actual: config.audience(),
        });
    }

    if config.is_kids_mode() {
        return match lexicon.sanitize(&item.text, config.kids_filter_level()) {
            TextVerdict::Hidden => FilterOutcome::hidden(HideReason::KidsTextFilter),
            TextVerdict::Clean(text) => FilterOutcome::shown(ContentDecision::ShowSanitized(text)),
        };
    }

    FilterOutcome::shown(ContentDecision::ShowRaw)
}

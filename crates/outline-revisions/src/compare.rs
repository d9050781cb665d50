//! Pairwise revision comparison.
//!
//! Produces size deltas (lines, words, characters) between two bodies. This
//! is not a diff: a rewrite that keeps the same length reports zero change.

use std::fmt;

use outline_core::{AnalysisConfig, RevisionRecord};
use serde::Serialize;

/// Size deltas and raw totals for two revision bodies.
///
/// `*_added` fields are `second − first` and go negative when content was
/// removed. Totals are kept so callers can compute percentages.
///
/// # Examples
///
/// ```
/// use outline_revisions::compare::compare;
///
/// let stats = compare("hello world", "hello world foo");
/// assert_eq!(stats.words_added, 1);
/// assert_eq!(stats.chars_added, 4);
/// assert_eq!(stats.lines_added, 0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeStatistics {
    /// Net change in line count.
    pub lines_added: i64,
    /// Net change in whitespace-separated word count.
    pub words_added: i64,
    /// Net change in character count.
    pub chars_added: i64,
    /// Lines in the first text.
    pub total_lines_1: usize,
    /// Lines in the second text.
    pub total_lines_2: usize,
    /// Words in the first text.
    pub total_words_1: usize,
    /// Words in the second text.
    pub total_words_2: usize,
    /// Characters in the first text.
    pub total_chars_1: usize,
    /// Characters in the second text.
    pub total_chars_2: usize,
}

impl ChangeStatistics {
    /// `|chars_added| / total_chars_1 * 100`, or `None` when the first text
    /// was empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use outline_revisions::compare::compare;
    ///
    /// assert_eq!(compare("abcd", "abcdef").change_percent(), Some(50.0));
    /// assert_eq!(compare("", "new").change_percent(), None);
    /// ```
    pub fn change_percent(&self) -> Option<f64> {
        (self.total_chars_1 > 0)
            .then(|| self.chars_added.unsigned_abs() as f64 / self.total_chars_1 as f64 * 100.0)
    }

    /// Magnitude tier of the change under `policy`, when a percentage exists.
    pub fn magnitude(&self, policy: &AnalysisConfig) -> Option<ChangeMagnitude> {
        self.change_percent()
            .map(|percent| ChangeMagnitude::classify(percent, policy))
    }
}

/// Policy tier for how much of a document changed.
///
/// # Examples
///
/// ```
/// use outline_core::AnalysisConfig;
/// use outline_revisions::compare::ChangeMagnitude;
///
/// let policy = AnalysisConfig::default();
/// assert_eq!(ChangeMagnitude::classify(4.9, &policy), ChangeMagnitude::Minor);
/// assert_eq!(ChangeMagnitude::classify(5.0, &policy), ChangeMagnitude::Moderate);
/// assert_eq!(ChangeMagnitude::classify(25.0, &policy), ChangeMagnitude::Major);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeMagnitude {
    /// Below `minor_change_percent`.
    Minor,
    /// Below `moderate_change_percent`.
    Moderate,
    /// Everything else.
    Major,
}

impl ChangeMagnitude {
    /// Tier for `percent` under `policy`.
    pub fn classify(percent: f64, policy: &AnalysisConfig) -> Self {
        if percent < policy.minor_change_percent {
            Self::Minor
        } else if percent < policy.moderate_change_percent {
            Self::Moderate
        } else {
            Self::Major
        }
    }
}

impl fmt::Display for ChangeMagnitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Minor => write!(f, "minor"),
            Self::Moderate => write!(f, "moderate"),
            Self::Major => write!(f, "major"),
        }
    }
}

/// Line, word and character counts of a single body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextMeasure {
    /// `\n`-separated segments; zero for empty text.
    pub lines: usize,
    /// Whitespace-separated words.
    pub words: usize,
    /// Unicode scalar values.
    pub chars: usize,
}

impl TextMeasure {
    /// Measure `text`.
    ///
    /// # Examples
    ///
    /// ```
    /// use outline_revisions::compare::TextMeasure;
    ///
    /// let m = TextMeasure::of("one two\nthree");
    /// assert_eq!((m.lines, m.words, m.chars), (2, 3, 13));
    /// assert_eq!(TextMeasure::of(""), TextMeasure::default());
    /// ```
    pub fn of(text: &str) -> Self {
        if text.is_empty() {
            return Self::default();
        }
        Self {
            lines: text.split('\n').count(),
            words: text.split_whitespace().count(),
            chars: text.chars().count(),
        }
    }
}

/// Compare two bodies. Empty text counts as zero lines, words and characters.
pub fn compare(text1: &str, text2: &str) -> ChangeStatistics {
    let first = TextMeasure::of(text1);
    let second = TextMeasure::of(text2);

    ChangeStatistics {
        lines_added: delta(first.lines, second.lines),
        words_added: delta(first.words, second.words),
        chars_added: delta(first.chars, second.chars),
        total_lines_1: first.lines,
        total_lines_2: second.lines,
        total_words_1: first.words,
        total_words_2: second.words,
        total_chars_1: first.chars,
        total_chars_2: second.chars,
    }
}

/// Compare the bodies of two revisions; a missing body counts as empty.
pub fn compare_revisions(first: &RevisionRecord, second: &RevisionRecord) -> ChangeStatistics {
    compare(first.text(), second.text())
}

fn delta(before: usize, after: usize) -> i64 {
    after as i64 - before as i64
}

//! Activity summary over a document's revision history.
//!
//! Works on revisions in the order the listing delivers them (newest first)
//! and trusts that order to match creation order; out-of-order input yields
//! misleading gaps and deltas rather than an error.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use outline_core::{AnalysisConfig, RevisionRecord};
use serde::Serialize;

/// Fewest revisions a summary is computed from.
pub const MIN_REVISIONS: usize = 2;

/// Not enough revisions to describe a history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("insufficient revision history: found {found}, need at least {MIN_REVISIONS}")]
pub struct InsufficientHistory {
    /// Number of revisions supplied.
    pub found: usize,
}

/// Min, max and mean of revision body sizes in characters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeStats {
    /// Smallest body.
    pub min: usize,
    /// Largest body.
    pub max: usize,
    /// Arithmetic mean.
    pub mean: f64,
}

/// Policy tier for the average time between revisions.
///
/// # Examples
///
/// ```
/// use outline_core::AnalysisConfig;
/// use outline_revisions::history::Cadence;
///
/// let policy = AnalysisConfig::default();
/// assert_eq!(Cadence::classify(0.5, &policy), Cadence::Rapid);
/// assert_eq!(Cadence::classify(2.5, &policy), Cadence::Active);
/// assert_eq!(Cadence::classify(72.0, &policy), Cadence::Infrequent);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Cadence {
    /// Mean gap below `rapid_gap_hours`.
    Rapid,
    /// Mean gap below `active_gap_hours`.
    Active,
    /// Everything slower.
    Infrequent,
}

impl Cadence {
    /// Tier for a mean gap of `hours` under `policy`.
    pub fn classify(hours: f64, policy: &AnalysisConfig) -> Self {
        if hours < policy.rapid_gap_hours {
            Self::Rapid
        } else if hours < policy.active_gap_hours {
            Self::Active
        } else {
            Self::Infrequent
        }
    }
}

impl fmt::Display for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rapid => write!(f, "rapid"),
            Self::Active => write!(f, "active"),
            Self::Infrequent => write!(f, "infrequent"),
        }
    }
}

/// Aggregate view of a revision sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySummary {
    /// Number of revisions analyzed.
    pub revision_count: usize,
    /// Distinct non-empty author names, sorted.
    pub authors: BTreeSet<String>,
    /// Body size distribution.
    pub sizes: SizeStats,
    /// Hours between adjacent revisions whose timestamps both parsed.
    pub gaps_hours: Vec<f64>,
    /// Mean of `gaps_hours`; `None` when no gap could be measured.
    pub mean_gap_hours: Option<f64>,
    /// Tier of `mean_gap_hours`.
    pub cadence: Option<Cadence>,
    /// Sum of positive size deltas, older to newer.
    pub chars_added: u64,
    /// Sum of negative size deltas, as a magnitude.
    pub chars_removed: u64,
    /// `chars_added - chars_removed`.
    pub net_change: i64,
    /// `createdAt` of the first record in the sequence.
    pub newest_created_at: Option<String>,
    /// `createdAt` of the last record in the sequence.
    pub oldest_created_at: Option<String>,
}

impl HistorySummary {
    /// Number of distinct contributors.
    pub fn contributor_count(&self) -> usize {
        self.authors.len()
    }
}

/// Summarize `revisions`, newest first.
///
/// # Errors
///
/// Returns [`InsufficientHistory`] for fewer than [`MIN_REVISIONS`] records.
///
/// # Examples
///
/// ```
/// use outline_core::{AnalysisConfig, RevisionRecord};
/// use outline_revisions::history::summarize;
///
/// let rev = |id: &str, text: &str, at: &str| RevisionRecord {
///     id: id.into(),
///     text: Some(text.into()),
///     created_at: Some(at.into()),
///     ..RevisionRecord::default()
/// };
/// let revisions = [
///     rev("r2", "hello world", "2024-05-01T12:00:00Z"),
///     rev("r1", "hello", "2024-05-01T09:00:00Z"),
/// ];
///
/// let summary = summarize(&revisions, &AnalysisConfig::default()).unwrap();
/// assert_eq!(summary.chars_added, 6);
/// assert_eq!(summary.mean_gap_hours, Some(3.0));
/// ```
pub fn summarize(
    revisions: &[RevisionRecord],
    policy: &AnalysisConfig,
) -> Result<HistorySummary, InsufficientHistory> {
    if revisions.len() < MIN_REVISIONS {
        return Err(InsufficientHistory {
            found: revisions.len(),
        });
    }

    let authors: BTreeSet<String> = revisions
        .iter()
        .filter_map(|r| r.created_by.as_ref()?.name.clone())
        .filter(|name| !name.is_empty())
        .collect();

    let sizes: Vec<usize> = revisions.iter().map(|r| r.text().chars().count()).collect();
    let size_stats = SizeStats {
        min: sizes.iter().copied().min().unwrap_or_default(),
        max: sizes.iter().copied().max().unwrap_or_default(),
        mean: sizes.iter().sum::<usize>() as f64 / sizes.len() as f64,
    };

    let timestamps: Vec<Option<DateTime<Utc>>> = revisions
        .iter()
        .map(|r| r.created_at.as_deref().and_then(parse_timestamp))
        .collect();
    let gaps_hours: Vec<f64> = timestamps
        .windows(2)
        .filter_map(|pair| match pair {
            [Some(newer), Some(older)] => {
                Some((*newer - *older).num_seconds().unsigned_abs() as f64 / 3600.0)
            }
            _ => None,
        })
        .collect();
    let skipped = revisions.len() - 1 - gaps_hours.len();
    if skipped > 0 {
        tracing::debug!(skipped, "skipped revision gaps with unparsable timestamps");
    }
    let mean_gap_hours =
        (!gaps_hours.is_empty()).then(|| gaps_hours.iter().sum::<f64>() / gaps_hours.len() as f64);

    let (mut chars_added, mut chars_removed) = (0u64, 0u64);
    for pair in sizes.windows(2) {
        let (newer, older) = (pair[0] as i64, pair[1] as i64);
        let delta = newer - older;
        if delta > 0 {
            chars_added += delta.unsigned_abs();
        } else {
            chars_removed += delta.unsigned_abs();
        }
    }

    Ok(HistorySummary {
        revision_count: revisions.len(),
        authors,
        sizes: size_stats,
        gaps_hours,
        mean_gap_hours,
        cadence: mean_gap_hours.map(|hours| Cadence::classify(hours, policy)),
        chars_added,
        chars_removed,
        net_change: chars_added as i64 - chars_removed as i64,
        newest_created_at: revisions.first().and_then(|r| r.created_at.clone()),
        oldest_created_at: revisions.last().and_then(|r| r.created_at.clone()),
    })
}

/// Parse an API timestamp. RFC 3339 first, then a zone-less ISO-8601 form
/// taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

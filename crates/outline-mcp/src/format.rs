//! Markdown rendering for tool responses.
//!
//! Everything an agent reads passes through here; the tool handlers only
//! fetch, analyze, and pick the renderer.

use std::fmt::Write;

use outline_core::{
    AnalysisConfig, Collection, Document, RevisionRecord, SearchHit, UNKNOWN, UNTITLED,
};
use outline_revisions::compare::{ChangeStatistics, TextMeasure};
use outline_revisions::history::{HistorySummary, InsufficientHistory};

/// Revision bodies longer than this are cut in single-revision views.
pub const CONTENT_PREVIEW_CHARS: usize = 500;

pub(crate) const NO_REVISION: &str = "No revision information found.";
pub(crate) const NO_REVISIONS: &str = "No revisions found for this document.";
pub(crate) const MISSING_FOR_COMPARISON: &str = "One or both revisions could not be found.";
pub(crate) const FROM_CACHE: &str = "*[Retrieved from cache]*";

/// Cut `text` after [`CONTENT_PREVIEW_CHARS`] characters, appending "...".
pub fn truncate_content(text: &str) -> String {
    match text.char_indices().nth(CONTENT_PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

fn revision_header(out: &mut String, rev: &RevisionRecord) {
    out.push_str("# Document Revision\n\n");
    let _ = writeln!(out, "**Revision ID:** {}", rev.id_or_unknown());
    let _ = writeln!(out, "**Title:** {}", rev.title());
    let _ = writeln!(out, "**Created:** {}", rev.created_at_or_unknown());
    let _ = writeln!(out, "**Author:** {}", rev.author_name());
    if let Some(document_id) = &rev.document_id {
        let _ = writeln!(out, "**Document ID:** {document_id}");
    }
}

fn revision_content(out: &mut String, rev: &RevisionRecord) {
    if !rev.text().is_empty() {
        let _ = write!(out, "\n**Content:**\n{}\n", truncate_content(rev.text()));
    }
}

fn cache_marker(out: &mut String, from_cache: bool) {
    if from_cache {
        let _ = write!(out, "\n{FROM_CACHE}\n");
    }
}

/// A single revision with a content preview.
pub fn revision_info(rev: &RevisionRecord, from_cache: bool) -> String {
    let mut out = String::new();
    revision_header(&mut out, rev);
    revision_content(&mut out, rev);
    cache_marker(&mut out, from_cache);
    out
}

/// A single revision plus size statistics of its full body.
pub fn revision_with_metadata(rev: &RevisionRecord, from_cache: bool) -> String {
    let mut out = String::new();
    revision_header(&mut out, rev);

    let measure = TextMeasure::of(rev.text());
    out.push_str("\n## Revision Statistics\n");
    let _ = writeln!(out, "**Content Length:** {} characters", measure.chars);
    let _ = writeln!(out, "**Word Count:** {} words", measure.words);
    let _ = writeln!(out, "**Line Count:** {} lines", measure.lines);

    revision_content(&mut out, rev);
    cache_marker(&mut out, from_cache);
    out
}

/// One page of a document's revision listing.
pub fn revisions_list(revisions: &[RevisionRecord], limit: u32, offset: u32) -> String {
    if revisions.is_empty() {
        return NO_REVISIONS.to_string();
    }

    let mut out = format!("# Document Revisions ({} found)\n\n", revisions.len());
    for (i, rev) in revisions.iter().enumerate() {
        let _ = writeln!(out, "## {}. {}", offset as usize + i + 1, rev.title());
        let _ = writeln!(out, "ID: {}", rev.id_or_unknown());
        let _ = writeln!(out, "Created: {}", rev.created_at_or_unknown());
        let _ = writeln!(out, "Author: {}\n", rev.author_name());
    }

    let _ = write!(
        out,
        "---\n*Showing {} revisions starting at offset {offset}.*",
        revisions.len()
    );
    if revisions.len() >= limit as usize {
        let _ = write!(
            out,
            " *Use offset {} for the next page.*",
            offset as usize + revisions.len()
        );
    }
    out.push('\n');
    out
}

fn signed(n: i64) -> String {
    if n > 0 {
        format!("+{n}")
    } else {
        n.to_string()
    }
}

/// Side-by-side metadata and size deltas of two revisions.
pub fn revision_comparison(
    first: &RevisionRecord,
    second: &RevisionRecord,
    stats: &ChangeStatistics,
    policy: &AnalysisConfig,
) -> String {
    let mut out = String::from("# Detailed Revision Comparison\n\n");

    for (n, rev) in [(1, first), (2, second)] {
        let _ = writeln!(out, "## Revision {n} ({})", rev.id_or_unknown());
        let _ = writeln!(out, "**Title:** {}", rev.title());
        let _ = writeln!(out, "**Created:** {}", rev.created_at_or_unknown());
        let _ = writeln!(out, "**Author:** {}\n", rev.author_name());
    }

    out.push_str("## Content Analysis\n");
    let _ = writeln!(
        out,
        "**Revision 1:** {} characters, {} words, {} lines",
        stats.total_chars_1, stats.total_words_1, stats.total_lines_1
    );
    let _ = writeln!(
        out,
        "**Revision 2:** {} characters, {} words, {} lines\n",
        stats.total_chars_2, stats.total_words_2, stats.total_lines_2
    );

    out.push_str("## Changes Summary\n");
    let _ = writeln!(out, "**Characters:** {}", signed(stats.chars_added));
    let _ = writeln!(out, "**Words:** {}", signed(stats.words_added));
    let _ = writeln!(out, "**Lines:** {}", signed(stats.lines_added));
    if let (Some(percent), Some(magnitude)) = (stats.change_percent(), stats.magnitude(policy)) {
        let _ = writeln!(
            out,
            "**Change Magnitude:** {magnitude} ({percent:.1}% of original size)"
        );
    }
    if first.title() != second.title() {
        let _ = writeln!(
            out,
            "**Title changed:** '{}' → '{}'",
            first.title(),
            second.title()
        );
    }
    out.push_str("\n*Sizes are compared, not content: equal sizes do not imply identical text.*\n");
    out
}

/// Activity summary of a document's recent revisions.
pub fn history_summary(document_id: &str, summary: &HistorySummary) -> String {
    let mut out = String::from("# Revision History Summary\n\n");
    let _ = writeln!(out, "**Document ID:** {document_id}");
    let _ = writeln!(out, "**Analyzed Revisions:** {}", summary.revision_count);
    let _ = writeln!(
        out,
        "**Contributors:** {} unique author(s)",
        summary.contributor_count()
    );
    if !summary.authors.is_empty() {
        let names: Vec<&str> = summary.authors.iter().map(String::as_str).collect();
        let _ = writeln!(out, "**Authors:** {}", names.join(", "));
    }
    let _ = writeln!(
        out,
        "**Newest Revision:** {}",
        summary.newest_created_at.as_deref().unwrap_or(UNKNOWN)
    );
    let _ = writeln!(
        out,
        "**Oldest Revision:** {}\n",
        summary.oldest_created_at.as_deref().unwrap_or(UNKNOWN)
    );

    out.push_str("## Activity Summary\n");
    match (summary.mean_gap_hours, summary.cadence) {
        (Some(hours), Some(cadence)) => {
            let _ = writeln!(out, "**Average Time Between Revisions:** {hours:.1} hours");
            let _ = writeln!(out, "**Activity Level:** {cadence}");
            let _ = writeln!(out, "**Measured Intervals:** {}\n", summary.gaps_hours.len());
        }
        _ => out.push_str(
            "**Average Time Between Revisions:** unavailable (no parsable timestamps)\n\n",
        ),
    }

    out.push_str("## Change Analysis\n");
    let _ = writeln!(
        out,
        "**Average Content Size:** {:.0} characters",
        summary.sizes.mean
    );
    let _ = writeln!(
        out,
        "**Size Range:** {} - {} characters",
        summary.sizes.min, summary.sizes.max
    );
    let _ = writeln!(out, "**Characters Added:** {}", summary.chars_added);
    let _ = writeln!(out, "**Characters Removed:** {}", summary.chars_removed);
    let _ = writeln!(
        out,
        "**Net Change:** {} characters",
        signed(summary.net_change)
    );
    out
}

/// Message for a listing too short to summarize.
pub fn insufficient_history(err: &InsufficientHistory) -> String {
    if err.found == 0 {
        return NO_REVISIONS.to_string();
    }
    format!(
        "Insufficient revision history for analysis: found {} revision(s), \
         at least 2 are required.",
        err.found
    )
}

/// Search hits with their context snippets.
pub fn search_results(query: &str, hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return format!("No documents found for query \"{query}\".");
    }

    let mut out = format!("# Search Results ({} found)\n\n", hits.len());
    for (i, hit) in hits.iter().enumerate() {
        let _ = writeln!(out, "## {}. {}", i + 1, hit.document.title());
        let _ = writeln!(out, "ID: {}", hit.document.id);
        if let Some(context) = hit.context.as_deref().filter(|c| !c.is_empty()) {
            let _ = writeln!(out, "Context: {context}");
        }
        out.push('\n');
    }
    out
}

/// A full document.
pub fn document(doc: &Document) -> String {
    format!("# {}\n\n{}\n", doc.title(), doc.text())
}

/// Collections visible to the token.
pub fn collections(collections: &[Collection]) -> String {
    if collections.is_empty() {
        return "No collections found.".to_string();
    }

    let mut out = format!("# Collections ({} found)\n\n", collections.len());
    for (i, collection) in collections.iter().enumerate() {
        let name = collection.name.as_deref().unwrap_or(UNTITLED);
        let _ = writeln!(out, "## {}. {name}", i + 1);
        let _ = writeln!(out, "ID: {}", collection.id);
        if let Some(description) = collection.description.as_deref().filter(|d| !d.is_empty()) {
            let _ = writeln!(out, "Description: {description}");
        }
        out.push('\n');
    }
    out
}

/// A titled list of documents, e.g. drafts or recently viewed.
pub fn documents_list(documents: &[Document], heading: &str) -> String {
    if documents.is_empty() {
        return format!("No {} found.", heading.to_lowercase());
    }

    let mut out = format!("# {heading} ({} found)\n\n", documents.len());
    for (i, doc) in documents.iter().enumerate() {
        let _ = writeln!(out, "## {}. {}", i + 1, doc.title());
        let _ = writeln!(out, "ID: {}", doc.id);
        if let Some(updated) = &doc.updated_at {
            let _ = writeln!(out, "Last Updated: {updated}");
        }
        if let Some(created) = &doc.created_at {
            let _ = writeln!(out, "Created: {created}");
        }
        out.push('\n');
    }
    out
}

/// Confirmation for a completed import.
pub fn import_success(doc: &Document) -> String {
    let mut out = String::from("# Document Import Successful\n\n");
    let _ = writeln!(out, "**Title:** {}", doc.title());
    let _ = writeln!(out, "**Document ID:** {}", doc.id);
    let collection = doc
        .collection_id
        .as_deref()
        .or(doc.collection.as_ref().map(|c| c.id.as_str()));
    if let Some(collection) = collection {
        let _ = writeln!(out, "**Collection ID:** {collection}");
    }
    if let Some(parent) = &doc.parent_document_id {
        let _ = writeln!(out, "**Parent Document ID:** {parent}");
    }
    if let Some(url) = &doc.url {
        let _ = writeln!(out, "**URL:** {url}");
    }
    out
}

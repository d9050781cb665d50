use std::time::{Duration, Instant};

use outline_core::{AnalysisConfig, Author, RevisionRecord};
use outline_revisions::{compare, summarize, Cadence, ChangeMagnitude, RevisionCache};

fn rev(id: &str, text: &str, at: &str, author: &str) -> RevisionRecord {
    RevisionRecord {
        id: id.into(),
        document_id: Some("doc1".into()),
        title: Some("Onboarding".into()),
        text: Some(text.into()),
        created_at: Some(at.into()),
        created_by: Some(Author {
            name: Some(author.into()),
            ..Author::default()
        }),
    }
}

#[test]
fn cached_revisions_feed_comparison_and_summary() {
    let cache = RevisionCache::with_ttl(Duration::from_secs(300));
    let t0 = Instant::now();
    let listing = vec![
        rev("r3", "Welcome aboard.\nRead the handbook.", "2024-02-01T09:30:00Z", "Ada"),
        rev("r2", "Welcome aboard.", "2024-02-01T09:00:00Z", "Grace"),
        rev("r1", "Welcome", "2024-02-01T08:45:00Z", "Ada"),
    ];
    for record in &listing {
        cache.put_at(record.id.clone(), record.clone(), t0);
    }

    let within = t0 + Duration::from_secs(60);
    let older = cache.get_at("r1", within).unwrap();
    let newer = cache.get_at("r3", within).unwrap();
    let stats = compare(older.text(), newer.text());
    assert_eq!(stats.lines_added, 1);
    assert_eq!(stats.words_added, 4);
    assert_eq!(
        stats.magnitude(&AnalysisConfig::default()),
        Some(ChangeMagnitude::Major)
    );

    let policy = AnalysisConfig::default();
    let summary = summarize(&listing, &policy).unwrap();
    assert_eq!(summary.contributor_count(), 2);
    assert_eq!(summary.cadence, Some(Cadence::Rapid));
    assert_eq!(summary.chars_removed, 0);
    assert_eq!(
        summary.net_change,
        stats.chars_added,
        "net growth across the listing equals oldest-to-newest delta"
    );

    assert_eq!(cache.sweep_at(t0 + Duration::from_secs(301)), 3);
    assert!(cache.is_empty());
}

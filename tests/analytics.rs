use serde_json::json;

use fraud_dashboard::analytics;
use fraud_dashboard::models::FraudRecord;

fn records_from_rows(rows: Vec<serde_json::Value>) -> Vec<FraudRecord> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).unwrap())
        .collect()
}

#[test]
fn count_conservation_over_dated_rows() {
    let records = records_from_rows(vec![
        json!({ "date": "2024-03-01" }),
        json!({ "date": "2024-03-01" }),
        json!({ "date": "2024-03-03" }),
        json!({ "date": "broken value" }),
        json!({}),
    ]);

    let counts = analytics::daily_counts(&records);
    let summed: u64 = counts.iter().map(|row| row.fraud_count).sum();
    let dated = records.iter().filter(|r| r.date.is_some()).count() as u64;
    assert_eq!(summed, dated);
    assert_eq!(dated, 3);

    // Ascending by date.
    let mut dates: Vec<_> = counts.iter().map(|row| row.date).collect();
    dates.sort();
    assert_eq!(dates, counts.iter().map(|row| row.date).collect::<Vec<_>>());
}

#[test]
fn search_commutes_across_the_two_text_fields() {
    let records = records_from_rows(vec![
        json!({ "link": "a", "fraud_reason": "Bank impersonation", "cleaned_text": "nothing here" }),
        json!({ "link": "b", "fraud_reason": "nothing here", "cleaned_text": "fake bank portal" }),
    ]);

    let hits = analytics::search(&records, "bank");
    let links: Vec<_> = hits.iter().map(|r| r.link.as_deref().unwrap()).collect();
    assert_eq!(links, ["a", "b"]);
}

#[test]
fn wire_transfer_example_matches_and_null_rows_never_do() {
    let records = records_from_rows(vec![
        json!({ "link": "hit", "cleaned_text": "Suspicious wire transfer" }),
        json!({ "link": "null-row", "cleaned_text": null, "fraud_reason": null }),
    ]);

    let hits = analytics::search(&records, "wire");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].link.as_deref(), Some("hit"));

    for query in ["wire", "a", "NULL", " "] {
        assert!(analytics::search(&records[1..], query).is_empty());
    }
}

#[test]
fn histogram_covers_every_labeled_row() {
    let records = records_from_rows(vec![
        json!({ "kmeans_cluster": 0 }),
        json!({ "kmeans_cluster": 4 }),
        json!({ "kmeans_cluster": 4 }),
        json!({}),
    ]);

    let histogram = analytics::cluster_histogram(&records);
    let total: u64 = histogram.iter().map(|b| b.count).sum();
    assert_eq!(total, 3);
    assert_eq!(histogram.len(), 2);
}

//! In-memory aggregations over the fetched snapshot. Every view works on
//! whatever columns happen to be present; rows missing the relevant column
//! simply drop out of that view.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::models::{ClusterBucketRow, DailyCountRow, DailyScoreRow, FraudRecord, SearchHit};

pub const DEFAULT_SEARCH_LABEL: &str = "Fraud Entry";

/// Rows per calendar day, ascending by date. Rows without a parseable date
/// are excluded, so the counts sum to the number of dated rows.
pub fn daily_counts(records: &[FraudRecord]) -> Vec<DailyCountRow> {
    let mut buckets: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for record in records {
        if let Some(date) = record.date {
            *buckets.entry(date.date_naive()).or_insert(0) += 1;
        }
    }

    buckets
        .into_iter()
        .map(|(date, fraud_count)| DailyCountRow { date, fraud_count })
        .collect()
}

/// Mean `fraud_score` per calendar day. A day whose rows carry no score
/// contributes no point at all, never a zero.
pub fn daily_average_scores(records: &[FraudRecord]) -> Vec<DailyScoreRow> {
    let mut buckets: BTreeMap<NaiveDate, (f64, u64)> = BTreeMap::new();
    for record in records {
        if let (Some(date), Some(score)) = (record.date, record.fraud_score) {
            let entry = buckets.entry(date.date_naive()).or_insert((0.0, 0));
            entry.0 += score;
            entry.1 += 1;
        }
    }

    buckets
        .into_iter()
        .map(|(date, (sum, n))| DailyScoreRow {
            date,
            avg_fraud_score: sum / n as f64,
        })
        .collect()
}

pub fn cluster_histogram(records: &[FraudRecord]) -> Vec<ClusterBucketRow> {
    let mut buckets: BTreeMap<i64, u64> = BTreeMap::new();
    for record in records {
        if let Some(cluster) = record.kmeans_cluster {
            *buckets.entry(cluster).or_insert(0) += 1;
        }
    }

    buckets
        .into_iter()
        .map(|(kmeans_cluster, count)| ClusterBucketRow {
            kmeans_cluster,
            count,
        })
        .collect()
}

/// Case-insensitive substring search over `cleaned_text` and `fraud_reason`.
/// A null field never matches.
pub fn search<'a>(records: &'a [FraudRecord], query: &str) -> Vec<&'a FraudRecord> {
    let needle = query.to_lowercase();
    records
        .iter()
        .filter(|record| {
            field_contains(record.cleaned_text.as_deref(), &needle)
                || field_contains(record.fraud_reason.as_deref(), &needle)
        })
        .collect()
}

fn field_contains(field: Option<&str>, needle: &str) -> bool {
    field.map_or(false, |text| text.to_lowercase().contains(needle))
}

pub fn search_hit(record: &FraudRecord) -> SearchHit {
    SearchHit {
        label: record
            .record_type
            .clone()
            .unwrap_or_else(|| DEFAULT_SEARCH_LABEL.to_string()),
        link: record.link.clone(),
        fraud_reason: record.fraud_reason.clone(),
        fraud_score: record.fraud_score,
        fraud_confidence: record.fraud_confidence,
        kmeans_cluster: record.kmeans_cluster,
        cleaned_text: record.cleaned_text.clone(),
    }
}

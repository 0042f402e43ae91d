use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One row of the `websites` table. Every column is optional: the table is
/// populated from heterogeneous JSON records and the dashboard degrades
/// per-view instead of rejecting a row.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct FraudRecord {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default, rename = "type")]
    pub record_type: Option<String>,
    #[serde(default, deserialize_with = "coerce_timestamp")]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub fraud_score: Option<f64>,
    #[serde(default)]
    pub fraud_confidence: Option<f64>,
    #[serde(default)]
    pub fraud_reason: Option<String>,
    #[serde(default, deserialize_with = "coerce_cluster")]
    pub kmeans_cluster: Option<i64>,
    #[serde(default)]
    pub cleaned_text: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct DailyCountRow {
    pub date: NaiveDate,
    pub fraud_count: u64,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct DailyScoreRow {
    pub date: NaiveDate,
    pub avg_fraud_score: f64,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ClusterBucketRow {
    pub kmeans_cluster: i64,
    pub count: u64,
}

/// One search result, shaped like the expander block the frontend renders.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct SearchHit {
    pub label: String,
    pub link: Option<String>,
    pub fraud_reason: Option<String>,
    pub fraud_score: Option<f64>,
    pub fraud_confidence: Option<f64>,
    pub kmeans_cluster: Option<i64>,
    pub cleaned_text: Option<String>,
}

fn coerce_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(parse_timestamp))
}

/// Best-effort timestamp parsing: unparseable values become absent rather
/// than failing the whole row.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    let text = value.as_str()?;
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(day) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(day.and_hms_opt(0, 0, 0)?.and_utc());
    }
    None
}

// Cluster labels usually arrive as integers, but a round trip through a
// dataframe can widen them to floats. Only integral floats count as labels;
// anything else coerces to absent.
fn coerce_cluster<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(|value| {
        value.as_i64().or_else(|| {
            value
                .as_f64()
                .and_then(|f| (f.fract() == 0.0).then_some(f as i64))
        })
    }))
}

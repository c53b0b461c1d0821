//! Score records and leaderboard
//!
//! Persisted as one JSON array. Records are only ever appended or cleared
//! all at once; ranking works on a copy.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::persistence::{self, KeyValueStore, SCORES_KEY};

/// A saved game result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRecord {
    /// Player's name, trimmed and non-empty
    pub name: String,
    pub correct_answers: u32,
    pub total_answers: u32,
    /// ISO-8601 timestamp when saved
    pub date: String,
}

impl ScoreRecord {
    /// Create a record; `None` if the name is blank
    pub fn new(name: &str, correct_answers: u32, total_answers: u32, date: DateTime<Utc>) -> Option<Self> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        Some(Self {
            name: name.to_string(),
            correct_answers,
            total_answers,
            date: date.to_rfc3339_opts(SecondsFormat::Millis, true),
        })
    }

    /// Fraction answered correctly; 0 when nothing was answered
    pub fn ratio(&self) -> f64 {
        if self.total_answers == 0 {
            0.0
        } else {
            self.correct_answers as f64 / self.total_answers as f64
        }
    }

    /// Whole-number percentage for display
    pub fn percentage(&self) -> u32 {
        (self.ratio() * 100.0).round() as u32
    }

    pub fn achievement(&self) -> Achievement {
        Achievement::for_percentage(self.percentage())
    }
}

/// Summary badge for a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Achievement {
    Perfect,
    Excellent,
    WellDone,
    KeepTrying,
}

impl Achievement {
    pub fn for_percentage(percentage: u32) -> Self {
        match percentage {
            100.. => Achievement::Perfect,
            80..=99 => Achievement::Excellent,
            50..=79 => Achievement::WellDone,
            _ => Achievement::KeepTrying,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Achievement::Perfect => "Perfect!",
            Achievement::Excellent => "Excellent!",
            Achievement::WellDone => "Well done!",
            Achievement::KeepTrying => "Keep trying!",
        }
    }
}

/// Leaderboard ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    #[default]
    Percentage,
    TotalCorrect,
}

impl SortBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::Percentage => "percentage",
            SortBy::TotalCorrect => "total",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "percentage" | "percent" | "%" => Some(SortBy::Percentage),
            "total" | "totalcorrect" | "correct" => Some(SortBy::TotalCorrect),
            _ => None,
        }
    }

    /// The other ordering (what the sort toggle switches to)
    pub fn toggled(&self) -> Self {
        match self {
            SortBy::Percentage => SortBy::TotalCorrect,
            SortBy::TotalCorrect => SortBy::Percentage,
        }
    }
}

/// Sort scores best-first; ties keep their original order
pub fn rank(scores: &[ScoreRecord], by: SortBy) -> Vec<ScoreRecord> {
    let mut ranked = scores.to_vec();
    match by {
        SortBy::Percentage => ranked.sort_by(|a, b| b.ratio().total_cmp(&a.ratio())),
        SortBy::TotalCorrect => ranked.sort_by(|a, b| b.correct_answers.cmp(&a.correct_answers)),
    }
    ranked
}

/// One display row of the leaderboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardRow {
    /// 1-indexed position
    pub rank: usize,
    pub name: String,
    /// "correct/total"
    pub result: String,
    pub percentage: u32,
    pub date: String,
}

/// Ranked rows ready for display
pub fn leaderboard(scores: &[ScoreRecord], by: SortBy, now: DateTime<Utc>) -> Vec<LeaderboardRow> {
    rank(scores, by)
        .into_iter()
        .enumerate()
        .map(|(i, score)| LeaderboardRow {
            rank: i + 1,
            result: format!("{}/{}", score.correct_answers, score.total_answers),
            percentage: score.percentage(),
            date: format_date(&score.date, now),
            name: score.name,
        })
        .collect()
}

/// Load all scores; absent or malformed data reads as empty
pub fn load_scores<S: KeyValueStore + ?Sized>(store: &S) -> Vec<ScoreRecord> {
    match persistence::load_json::<Vec<ScoreRecord>, _>(store, SCORES_KEY) {
        Some(scores) => {
            log::info!("Loaded {} scores", scores.len());
            scores
        }
        None => {
            log::info!("No scores found, starting fresh");
            Vec::new()
        }
    }
}

/// Append one record and write the whole list back
///
/// A failed read aborts the append, so the stored list is never replaced
/// by one missing earlier records. A malformed document is overwritten.
pub fn append_score<S: KeyValueStore + ?Sized>(store: &S, record: &ScoreRecord) -> persistence::Result<()> {
    let mut scores = match store.get(SCORES_KEY)? {
        Some(json) => serde_json::from_str::<Vec<ScoreRecord>>(&json).unwrap_or_else(|err| {
            log::warn!("Replacing malformed {SCORES_KEY}: {err}");
            Vec::new()
        }),
        None => Vec::new(),
    };
    scores.push(record.clone());
    persistence::save_json(store, SCORES_KEY, &scores)?;
    log::info!("Score saved ({} entries)", scores.len());
    Ok(())
}

/// Delete every stored score
pub fn clear_scores<S: KeyValueStore + ?Sized>(store: &S) -> persistence::Result<()> {
    store.remove(SCORES_KEY)?;
    log::info!("Scores cleared");
    Ok(())
}

/// Format an ISO-8601 timestamp relative to `now`.
/// Unparsable input is returned unchanged.
pub fn format_date(date: &str, now: DateTime<Utc>) -> String {
    let Ok(date) = DateTime::parse_from_rfc3339(date) else {
        return date.to_string();
    };
    let date = date.with_timezone(&Utc);
    let diff = now.signed_duration_since(date);

    let days = diff.num_days();
    let hours = diff.num_hours();
    let mins = diff.num_minutes();

    if days >= 1 {
        if days == 1 {
            "Yesterday".to_string()
        } else if days < 7 {
            format!("{} days ago", days)
        } else {
            date.format("%-m/%-d/%y").to_string()
        }
    } else if hours >= 1 {
        if hours == 1 {
            "1 hour ago".to_string()
        } else {
            format!("{} hours ago", hours)
        }
    } else if mins >= 1 {
        if mins == 1 {
            "1 min ago".to_string()
        } else {
            format!("{} mins ago", mins)
        }
    } else {
        "Just now".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{MemoryStore, StorageError};
    use chrono::{Duration, TimeZone};
    use std::cell::Cell;

    fn record(name: &str, correct: u32, total: u32) -> ScoreRecord {
        let date = Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap();
        ScoreRecord::new(name, correct, total, date).unwrap()
    }

    #[test]
    fn test_rank_by_percentage_is_stable() {
        let a = record("A", 3, 5);
        let b = record("B", 2, 4);
        let c = record("C", 1, 2);
        let ranked = rank(&[a.clone(), b.clone(), c.clone()], SortBy::Percentage);
        assert_eq!(ranked, vec![a, b, c]);

        // Same keys, inserted the other way round
        let ranked = rank(&[record("C", 1, 2), record("B", 2, 4)], SortBy::Percentage);
        assert_eq!(ranked[0].name, "C");
        assert_eq!(ranked[1].name, "B");
    }

    #[test]
    fn test_rank_by_total_correct_is_stable() {
        let scores = vec![record("A", 4, 10), record("B", 4, 4), record("C", 4, 8)];
        let names: Vec<String> = rank(&scores, SortBy::TotalCorrect)
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_rank_by_total_correct() {
        let scores = vec![record("A", 3, 3), record("B", 9, 20), record("C", 3, 10)];
        let names: Vec<String> = rank(&scores, SortBy::TotalCorrect)
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["B", "A", "C"]);
    }

    #[test]
    fn test_zero_total_ranks_last() {
        let scores = vec![record("Empty", 0, 0), record("Low", 1, 10)];
        let ranked = rank(&scores, SortBy::Percentage);
        assert_eq!(ranked[0].name, "Low");
        assert_eq!(ranked[1].percentage(), 0);
    }

    #[test]
    fn test_record_name_trimmed_and_required() {
        let date = Utc::now();
        assert_eq!(ScoreRecord::new("  Eva  ", 1, 1, date).unwrap().name, "Eva");
        assert!(ScoreRecord::new("   ", 1, 1, date).is_none());
    }

    #[test]
    fn test_record_date_is_iso() {
        let r = record("A", 1, 1);
        assert_eq!(r.date, "2024-03-05T12:00:00.000Z");
    }

    #[test]
    fn test_append_then_load() {
        let store = MemoryStore::new();
        let first = record("A", 4, 5);
        let second = record("B", 2, 5);
        append_score(&store, &first).unwrap();
        append_score(&store, &second).unwrap();

        let scores = load_scores(&store);
        assert_eq!(scores.len(), 2);
        assert_eq!(scores.last(), Some(&second));
    }

    #[test]
    fn test_clear_then_load() {
        let store = MemoryStore::new();
        append_score(&store, &record("A", 4, 5)).unwrap();
        clear_scores(&store).unwrap();
        assert!(load_scores(&store).is_empty());
        assert!(store.get(SCORES_KEY).unwrap().is_none());
    }

    /// Store whose next read fails once
    struct FlakyRead {
        inner: MemoryStore,
        fail_next_get: Cell<bool>,
    }

    impl KeyValueStore for FlakyRead {
        fn get(&self, key: &str) -> persistence::Result<Option<String>> {
            if self.fail_next_get.replace(false) {
                return Err(StorageError::Backend("read failed".into()));
            }
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> persistence::Result<()> {
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> persistence::Result<()> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn test_append_after_failed_read_keeps_history() {
        let store = FlakyRead {
            inner: MemoryStore::new(),
            fail_next_get: Cell::new(false),
        };
        for name in ["A", "B", "C"] {
            append_score(&store, &record(name, 1, 2)).unwrap();
        }

        store.fail_next_get.set(true);
        assert!(append_score(&store, &record("D", 1, 2)).is_err());

        let names: Vec<String> = load_scores(&store).into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["A", "B", "C"]);

        append_score(&store, &record("D", 1, 2)).unwrap();
        assert_eq!(load_scores(&store).len(), 4);
    }

    #[test]
    fn test_malformed_scores_read_as_empty() {
        let store = MemoryStore::new();
        store.set(SCORES_KEY, r#"{"name":"not a list"}"#).unwrap();
        assert!(load_scores(&store).is_empty());

        // Appending replaces the bad document with a valid list
        append_score(&store, &record("A", 1, 1)).unwrap();
        assert_eq!(load_scores(&store).len(), 1);
    }

    #[test]
    fn test_stored_document_shape() {
        let store = MemoryStore::new();
        append_score(&store, &record("A", 4, 5)).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&store.get(SCORES_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(json[0]["name"], "A");
        assert_eq!(json[0]["correctAnswers"], 4);
        assert_eq!(json[0]["totalAnswers"], 5);
        assert_eq!(json[0]["date"], "2024-03-05T12:00:00.000Z");
    }

    #[test]
    fn test_achievement_tiers() {
        assert_eq!(Achievement::for_percentage(100), Achievement::Perfect);
        assert_eq!(Achievement::for_percentage(80), Achievement::Excellent);
        assert_eq!(Achievement::for_percentage(79), Achievement::WellDone);
        assert_eq!(Achievement::for_percentage(50), Achievement::WellDone);
        assert_eq!(Achievement::for_percentage(49), Achievement::KeepTrying);
        assert_eq!(record("A", 2, 3).achievement(), Achievement::WellDone);
    }

    #[test]
    fn test_format_date() {
        let saved = Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap();
        let iso = saved.to_rfc3339();

        assert_eq!(format_date(&iso, saved + Duration::seconds(30)), "Just now");
        assert_eq!(format_date(&iso, saved + Duration::minutes(1)), "1 min ago");
        assert_eq!(format_date(&iso, saved + Duration::minutes(5)), "5 mins ago");
        assert_eq!(format_date(&iso, saved + Duration::hours(3)), "3 hours ago");
        assert_eq!(format_date(&iso, saved + Duration::days(1)), "Yesterday");
        assert_eq!(format_date(&iso, saved + Duration::days(4)), "4 days ago");
        assert_eq!(format_date(&iso, saved + Duration::days(30)), "3/5/24");
        assert_eq!(format_date("yesterday-ish", saved), "yesterday-ish");
    }

    #[test]
    fn test_leaderboard_rows() {
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 30).unwrap();
        let rows = leaderboard(&[record("A", 1, 4), record("B", 3, 4)], SortBy::Percentage, now);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[0].name, "B");
        assert_eq!(rows[0].result, "3/4");
        assert_eq!(rows[0].percentage, 75);
        assert_eq!(rows[0].date, "Just now");
    }

    #[test]
    fn test_sort_toggle() {
        assert_eq!(SortBy::default().toggled(), SortBy::TotalCorrect);
        assert_eq!(SortBy::TotalCorrect.toggled(), SortBy::Percentage);
        assert_eq!(SortBy::from_str("total"), Some(SortBy::TotalCorrect));
    }
}

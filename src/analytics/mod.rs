//! Analytics engine.
//!
//! Pure computation over a player's stored match records: summary
//! aggregates, per-playlist cohorts, recent form, early-vs-recent
//! comparison, a rule-based strengths/weaknesses classifier, and a rolling
//! trend series for charting. Nothing here touches storage.
//!
//! Inputs are the date-descending slices produced by
//! [`MatchStore::get_player_stats`](crate::store::MatchStore::get_player_stats);
//! functions that need chronological order re-sort internally. Every
//! function degrades to `None` or an empty collection on insufficient data
//! instead of panicking, and callers treat that as "not enough data".
//!
//! The output field names are part of the API contract; dashboard and
//! coaching consumers index by them.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::MatchRecord;

/// Rolling-mean window for the trend series.
const ROLLING_WINDOW: usize = 5;

// Absolute classification thresholds for the strengths/weaknesses heuristic.
const GOALS_STRONG: f64 = 1.5;
const GOALS_WEAK: f64 = 0.8;
const ASSISTS_STRONG: f64 = 1.2;
const ASSISTS_WEAK: f64 = 0.6;
const SAVES_STRONG: f64 = 1.5;
const SAVES_WEAK: f64 = 0.8;
const SHOOTING_STRONG: f64 = 40.0;
const SHOOTING_WEAK: f64 = 25.0;

/// Overall summary aggregates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStats {
    pub total_games: usize,
    pub wins: usize,
    pub losses: usize,
    /// Percentage in [0, 100].
    pub win_rate: f64,
    pub avg_goals: f64,
    pub avg_assists: f64,
    pub avg_saves: f64,
    pub avg_shots: f64,
    pub avg_score: f64,
    pub avg_shooting_pct: f64,
    pub best_goals: i64,
    pub best_assists: i64,
    pub best_saves: i64,
    pub best_score: i64,
}

/// Aggregates for one playlist cohort.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaylistStats {
    pub games: usize,
    pub win_rate: f64,
    pub avg_goals: f64,
    pub avg_assists: f64,
    pub avg_saves: f64,
    pub avg_score: f64,
}

/// Aggregates over the most recent games.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentForm {
    pub games: usize,
    pub wins: usize,
    pub win_rate: f64,
    pub avg_goals: f64,
    pub avg_assists: f64,
    pub avg_saves: f64,
    pub avg_score: f64,
}

/// Aggregates for one window of the early/recent comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowStats {
    pub win_rate: f64,
    pub avg_goals: f64,
    pub avg_assists: f64,
    pub avg_saves: f64,
    pub avg_score: f64,
}

/// Signed deltas (recent minus early) per metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Improvement {
    pub win_rate_change: f64,
    pub goals_change: f64,
    pub assists_change: f64,
    pub saves_change: f64,
    pub score_change: f64,
}

/// Early-vs-recent comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceComparison {
    pub early: WindowStats,
    pub recent: WindowStats,
    pub improvement: Improvement,
}

/// Per-metric means feeding the classifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceMetrics {
    pub goals: f64,
    pub assists: f64,
    pub saves: f64,
    pub shooting_pct: f64,
}

/// Classified strengths and weaknesses plus the raw means behind them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrengthsWeaknesses {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub metrics: PerformanceMetrics,
}

/// One chronological point of the smoothed trend series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub date: String,
    pub goals: i64,
    pub assists: i64,
    pub saves: i64,
    pub score: i64,
    pub rolling_goals: f64,
    pub rolling_assists: f64,
    pub rolling_saves: f64,
    pub rolling_score: f64,
}

fn mean<I>(values: I, count: usize) -> f64
where
    I: Iterator<Item = f64>,
{
    if count == 0 {
        0.0
    } else {
        values.sum::<f64>() / count as f64
    }
}

fn win_rate(wins: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        wins as f64 / total as f64 * 100.0
    }
}

fn window_stats(records: &[MatchRecord]) -> WindowStats {
    let n = records.len();
    let wins = records.iter().filter(|r| r.won).count();
    WindowStats {
        win_rate: win_rate(wins, n),
        avg_goals: mean(records.iter().map(|r| r.goals as f64), n),
        avg_assists: mean(records.iter().map(|r| r.assists as f64), n),
        avg_saves: mean(records.iter().map(|r| r.saves as f64), n),
        avg_score: mean(records.iter().map(|r| r.score as f64), n),
    }
}

fn sorted_ascending(records: &[MatchRecord]) -> Vec<MatchRecord> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| a.date.cmp(&b.date));
    sorted
}

/// Overall summary statistics. `None` when there are no games.
pub fn summary_stats(records: &[MatchRecord]) -> Option<SummaryStats> {
    if records.is_empty() {
        return None;
    }

    let n = records.len();
    let wins = records.iter().filter(|r| r.won).count();

    Some(SummaryStats {
        total_games: n,
        wins,
        losses: n - wins,
        win_rate: win_rate(wins, n),
        avg_goals: mean(records.iter().map(|r| r.goals as f64), n),
        avg_assists: mean(records.iter().map(|r| r.assists as f64), n),
        avg_saves: mean(records.iter().map(|r| r.saves as f64), n),
        avg_shots: mean(records.iter().map(|r| r.shots as f64), n),
        avg_score: mean(records.iter().map(|r| r.score as f64), n),
        avg_shooting_pct: mean(records.iter().map(|r| r.shooting_percentage), n),
        best_goals: records.iter().map(|r| r.goals).max().unwrap_or(0),
        best_assists: records.iter().map(|r| r.assists).max().unwrap_or(0),
        best_saves: records.iter().map(|r| r.saves).max().unwrap_or(0),
        best_score: records.iter().map(|r| r.score).max().unwrap_or(0),
    })
}

/// Aggregates grouped by playlist. Records without a playlist label
/// contribute to no group; a dataset of only unlabelled games yields an
/// empty map.
pub fn stats_by_playlist(records: &[MatchRecord]) -> BTreeMap<String, PlaylistStats> {
    let mut groups: BTreeMap<String, Vec<&MatchRecord>> = BTreeMap::new();
    for record in records {
        if let Some(playlist) = &record.playlist {
            groups.entry(playlist.clone()).or_default().push(record);
        }
    }

    groups
        .into_iter()
        .map(|(playlist, group)| {
            let n = group.len();
            let wins = group.iter().filter(|r| r.won).count();
            let stats = PlaylistStats {
                games: n,
                win_rate: win_rate(wins, n),
                avg_goals: mean(group.iter().map(|r| r.goals as f64), n),
                avg_assists: mean(group.iter().map(|r| r.assists as f64), n),
                avg_saves: mean(group.iter().map(|r| r.saves as f64), n),
                avg_score: mean(group.iter().map(|r| r.score as f64), n),
            };
            (playlist, stats)
        })
        .collect()
}

/// Aggregates over the `n` most recent games (the head of the
/// date-descending input). With fewer than `n` games available, the stats
/// cover whatever is there and `games` reflects the actual count.
pub fn recent_form(records: &[MatchRecord], n: usize) -> Option<RecentForm> {
    if records.is_empty() {
        return None;
    }

    let recent = &records[..records.len().min(n)];
    let games = recent.len();
    let wins = recent.iter().filter(|r| r.won).count();

    Some(RecentForm {
        games,
        wins,
        win_rate: win_rate(wins, games),
        avg_goals: mean(recent.iter().map(|r| r.goals as f64), games),
        avg_assists: mean(recent.iter().map(|r| r.assists as f64), games),
        avg_saves: mean(recent.iter().map(|r| r.saves as f64), games),
        avg_score: mean(recent.iter().map(|r| r.score as f64), games),
    })
}

/// Compare the earliest `first_n` games against the latest `last_n`.
///
/// Requires at least `first_n + last_n` games, otherwise `None`. The two
/// windows are the head and tail of the ascending sort; no further overlap
/// prevention is applied.
pub fn compare_performance(
    records: &[MatchRecord],
    first_n: usize,
    last_n: usize,
) -> Option<PerformanceComparison> {
    if records.len() < first_n + last_n {
        return None;
    }

    let sorted = sorted_ascending(records);
    let early = window_stats(&sorted[..first_n]);
    let recent = window_stats(&sorted[sorted.len() - last_n..]);

    let improvement = Improvement {
        win_rate_change: recent.win_rate - early.win_rate,
        goals_change: recent.avg_goals - early.avg_goals,
        assists_change: recent.avg_assists - early.avg_assists,
        saves_change: recent.avg_saves - early.avg_saves,
        score_change: recent.avg_score - early.avg_score,
    };

    Some(PerformanceComparison {
        early,
        recent,
        improvement,
    })
}

/// Classify per-metric means against fixed absolute thresholds.
///
/// A player with nothing above or below the thresholds gets the
/// "consistent all-around" defaults rather than empty lists.
pub fn strengths_and_weaknesses(records: &[MatchRecord]) -> Option<StrengthsWeaknesses> {
    if records.is_empty() {
        return None;
    }

    let n = records.len();
    let metrics = PerformanceMetrics {
        goals: mean(records.iter().map(|r| r.goals as f64), n),
        assists: mean(records.iter().map(|r| r.assists as f64), n),
        saves: mean(records.iter().map(|r| r.saves as f64), n),
        shooting_pct: mean(records.iter().map(|r| r.shooting_percentage), n),
    };

    let mut strengths = Vec::new();
    let mut weaknesses = Vec::new();

    if metrics.goals > GOALS_STRONG {
        strengths.push("Goal scoring".to_string());
    } else if metrics.goals < GOALS_WEAK {
        weaknesses.push("Goal scoring".to_string());
    }

    if metrics.assists > ASSISTS_STRONG {
        strengths.push("Playmaking".to_string());
    } else if metrics.assists < ASSISTS_WEAK {
        weaknesses.push("Playmaking".to_string());
    }

    if metrics.saves > SAVES_STRONG {
        strengths.push("Defense".to_string());
    } else if metrics.saves < SAVES_WEAK {
        weaknesses.push("Defense".to_string());
    }

    if metrics.shooting_pct > SHOOTING_STRONG {
        strengths.push("Shot accuracy".to_string());
    } else if metrics.shooting_pct < SHOOTING_WEAK {
        weaknesses.push("Shot accuracy".to_string());
    }

    if strengths.is_empty() {
        strengths.push("Consistent all-around player".to_string());
    }
    if weaknesses.is_empty() {
        weaknesses.push("Well-rounded performance".to_string());
    }

    Some(StrengthsWeaknesses {
        strengths,
        weaknesses,
        metrics,
    })
}

/// Chronological trend series with rolling means (window 5, minimum one
/// sample) for goals, assists, saves, and score. A smoothing transform for
/// charting; not used by the numeric aggregates.
pub fn performance_trend(records: &[MatchRecord]) -> Vec<TrendPoint> {
    let sorted = sorted_ascending(records);

    sorted
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let start = i.saturating_sub(ROLLING_WINDOW - 1);
            let window = &sorted[start..=i];
            let n = window.len();
            TrendPoint {
                date: record.date.clone(),
                goals: record.goals,
                assists: record.assists,
                saves: record.saves,
                score: record.score,
                rolling_goals: mean(window.iter().map(|r| r.goals as f64), n),
                rolling_assists: mean(window.iter().map(|r| r.assists as f64), n),
                rolling_saves: mean(window.iter().map(|r| r.saves as f64), n),
                rolling_score: mean(window.iter().map(|r| r.score as f64), n),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    /// Build a dataset date-descending, the way the store returns it.
    /// `games` is given oldest-first as (won, goals, playlist).
    fn dataset(games: &[(bool, i64, Option<&str>)]) -> Vec<MatchRecord> {
        let mut records: Vec<MatchRecord> = games
            .iter()
            .enumerate()
            .map(|(i, (won, goals, playlist))| MatchRecord {
                replay_id: format!("r{:03}", i),
                date: format!("2026-01-{:02}T18:00:00Z", i + 1),
                won: *won,
                goals: *goals,
                assists: 1,
                saves: 1,
                shots: 3,
                score: 300,
                shooting_percentage: 30.0,
                playlist: playlist.map(|p| p.to_string()),
                team: "blue".to_string(),
                ..Default::default()
            })
            .collect();
        records.reverse();
        records
    }

    #[test]
    fn test_summary_stats_empty() {
        assert!(summary_stats(&[]).is_none());
    }

    #[test]
    fn test_summary_wins_plus_losses_equals_total() {
        let records = dataset(&[
            (true, 2, Some("Ranked Doubles 2v2")),
            (false, 0, Some("Ranked Doubles 2v2")),
            (true, 1, None),
            (false, 3, Some("Ranked Standard 3v3")),
        ]);

        let summary = summary_stats(&records).unwrap();
        assert_eq!(summary.wins + summary.losses, summary.total_games);
        assert_eq!(summary.total_games, 4);
        assert_eq!(summary.wins, 2);
    }

    #[test]
    fn test_summary_win_rate_formula_and_bounds() {
        let records = dataset(&[(true, 1, None), (true, 1, None), (false, 1, None)]);
        let summary = summary_stats(&records).unwrap();

        let expected = summary.wins as f64 / summary.total_games as f64 * 100.0;
        assert!((summary.win_rate - expected).abs() < EPS);
        assert!(summary.win_rate >= 0.0 && summary.win_rate <= 100.0);
    }

    #[test]
    fn test_summary_averages_and_bests() {
        let records = dataset(&[(true, 1, None), (false, 3, None)]);
        let summary = summary_stats(&records).unwrap();

        assert!((summary.avg_goals - 2.0).abs() < EPS);
        assert_eq!(summary.best_goals, 3);
        assert_eq!(summary.best_score, 300);
        assert!((summary.avg_shooting_pct - 30.0).abs() < EPS);
    }

    #[test]
    fn test_stats_by_playlist_skips_unlabelled() {
        let records = dataset(&[
            (true, 2, Some("Ranked Doubles 2v2")),
            (false, 1, Some("Ranked Doubles 2v2")),
            (true, 5, None),
        ]);

        let by_playlist = stats_by_playlist(&records);

        assert_eq!(by_playlist.len(), 1);
        let doubles = &by_playlist["Ranked Doubles 2v2"];
        assert_eq!(doubles.games, 2);
        assert!((doubles.win_rate - 50.0).abs() < EPS);
        assert!((doubles.avg_goals - 1.5).abs() < EPS);
    }

    #[test]
    fn test_stats_by_playlist_all_null_is_empty() {
        let records = dataset(&[(true, 1, None), (false, 2, None)]);
        assert!(stats_by_playlist(&records).is_empty());
    }

    #[test]
    fn test_recent_form_takes_most_recent() {
        // Oldest-first: last two entries are the most recent games.
        let records = dataset(&[
            (false, 0, None),
            (false, 0, None),
            (true, 2, None),
            (true, 4, None),
        ]);

        let form = recent_form(&records, 2).unwrap();
        assert_eq!(form.games, 2);
        assert_eq!(form.wins, 2);
        assert!((form.win_rate - 100.0).abs() < EPS);
        assert!((form.avg_goals - 3.0).abs() < EPS);
    }

    #[test]
    fn test_recent_form_short_dataset() {
        let records = dataset(&[(true, 1, None), (false, 2, None)]);

        let form = recent_form(&records, 10).unwrap();
        assert_eq!(form.games, 2);
        assert_eq!(form.wins, 1);
    }

    #[test]
    fn test_recent_form_empty() {
        assert!(recent_form(&[], 10).is_none());
    }

    #[test]
    fn test_compare_requires_enough_games() {
        let records = dataset(&[(true, 1, None); 19]);
        assert!(compare_performance(&records, 10, 10).is_none());

        let records = dataset(&[(true, 1, None); 20]);
        assert!(compare_performance(&records, 10, 10).is_some());
    }

    #[test]
    fn test_compare_goals_change_exact() {
        // 25 games: earliest 10 average 1.0 goal, latest 10 average 2.0.
        let mut games = Vec::new();
        games.extend(std::iter::repeat((false, 1, None)).take(10));
        games.extend(std::iter::repeat((false, 0, None)).take(5));
        games.extend(std::iter::repeat((true, 2, None)).take(10));
        let records = dataset(&games);

        let comparison = compare_performance(&records, 10, 10).unwrap();

        assert!((comparison.early.avg_goals - 1.0).abs() < EPS);
        assert!((comparison.recent.avg_goals - 2.0).abs() < EPS);
        assert!((comparison.improvement.goals_change - 1.0).abs() < EPS);
        assert!((comparison.improvement.win_rate_change - 100.0).abs() < EPS);
    }

    #[test]
    fn test_compare_adjacent_windows() {
        // Exactly first_n + last_n games: windows cover the whole set.
        let mut games = vec![(false, 0, None); 5];
        games.extend(vec![(true, 2, None); 5]);
        let records = dataset(&games);

        let comparison = compare_performance(&records, 5, 5).unwrap();
        assert!((comparison.improvement.goals_change - 2.0).abs() < EPS);
    }

    #[test]
    fn test_strengths_empty_dataset() {
        assert!(strengths_and_weaknesses(&[]).is_none());
    }

    #[test]
    fn test_strengths_high_scorer() {
        let mut records = dataset(&[(true, 2, None); 10]);
        for r in &mut records {
            r.shooting_percentage = 45.0;
            r.assists = 0;
            r.saves = 1;
        }

        let sw = strengths_and_weaknesses(&records).unwrap();

        assert!(sw.strengths.contains(&"Goal scoring".to_string()));
        assert!(sw.strengths.contains(&"Shot accuracy".to_string()));
        assert!(sw.weaknesses.contains(&"Playmaking".to_string()));
        assert!((sw.metrics.goals - 2.0).abs() < EPS);
    }

    #[test]
    fn test_strengths_default_labels() {
        // Means sit between every threshold pair.
        let mut records = dataset(&[(true, 1, None); 10]);
        for r in &mut records {
            r.goals = 1; // 0.8 < 1.0 < 1.5
            r.assists = 1; // 0.6 < 1.0 < 1.2
            r.saves = 1; // 0.8 < 1.0 < 1.5
            r.shooting_percentage = 30.0; // 25 < 30 < 40
        }

        let sw = strengths_and_weaknesses(&records).unwrap();

        assert_eq!(sw.strengths, vec!["Consistent all-around player"]);
        assert_eq!(sw.weaknesses, vec!["Well-rounded performance"]);
    }

    #[test]
    fn test_trend_rolling_mean_minimum_one_sample() {
        let records = dataset(&[
            (true, 0, None),
            (true, 2, None),
            (true, 4, None),
            (true, 6, None),
            (true, 8, None),
            (true, 10, None),
        ]);

        let trend = performance_trend(&records);

        assert_eq!(trend.len(), 6);
        // Chronological order.
        assert!(trend[0].date < trend[5].date);
        // First point: window of one.
        assert!((trend[0].rolling_goals - 0.0).abs() < EPS);
        // Third point: mean of 0, 2, 4.
        assert!((trend[2].rolling_goals - 2.0).abs() < EPS);
        // Fifth point: full window of 0, 2, 4, 6, 8.
        assert!((trend[4].rolling_goals - 4.0).abs() < EPS);
        // Sixth point: window slides to 2, 4, 6, 8, 10.
        assert!((trend[5].rolling_goals - 6.0).abs() < EPS);
        assert_eq!(trend[5].goals, 10);
    }

    #[test]
    fn test_trend_empty() {
        assert!(performance_trend(&[]).is_empty());
    }
}

use std::cmp::Ordering;
use std::collections::HashMap;

use tally_types::{LeaderboardRow, Outcome, RankedRow, ResultRow};

/// Points a win is worth: one for each guess left unused, plus one.
pub const WIN_POINTS_BASE: i64 = 7;

pub struct LeaderboardEngine;

/// Running totals for one user while rows are being folded in
struct PlayerTally {
    row: LeaderboardRow,
    substituted: Vec<f64>,
}

impl PlayerTally {
    fn new(user_id: &str) -> Self {
        Self {
            row: LeaderboardRow::empty(user_id),
            substituted: Vec::new(),
        }
    }

    fn record(&mut self, outcome: Outcome) {
        self.row.games_played += 1;

        match outcome {
            Outcome::Solved(guesses) => {
                self.row.wins += 1;
                self.row.total += WIN_POINTS_BASE - i64::from(guesses);
                if let Some(bucket) = self.row.guess_bucket_mut(guesses) {
                    *bucket += 1;
                }
            }
            Outcome::Failed => self.row.failures += 1,
        }

        self.substituted
            .push(f64::from(outcome.substituted_guesses()));
    }

    fn finish(mut self) -> LeaderboardRow {
        self.row.weighted_avg = if self.row.games_played == 0 {
            0.0
        } else {
            self.row.total as f64 / f64::from(self.row.games_played)
        };
        self.row.avg_guesses = mean(&self.substituted);
        self.row.std_dev = sample_std_dev(&self.substituted);
        self.row
    }
}

impl LeaderboardEngine {
    /// Group result rows by user, compute each user's statistics and return
    /// them in ranking order.
    pub fn compute<'a>(rows: impl IntoIterator<Item = &'a ResultRow>) -> Vec<LeaderboardRow> {
        let mut tallies: Vec<PlayerTally> = Vec::new();
        let mut index_by_user: HashMap<&'a str, usize> = HashMap::new();

        for row in rows {
            let Some(outcome) = row.outcome() else {
                // Persistence should never hand us this; skip rather than guess
                tracing::warn!(
                    user_id = %row.user_id,
                    date = %row.date_iso,
                    "skipping result row that is neither failed nor has a guess count"
                );
                continue;
            };

            let index = *index_by_user.entry(row.user_id.as_str()).or_insert_with(|| {
                tallies.push(PlayerTally::new(&row.user_id));
                tallies.len() - 1
            });
            tallies[index].record(outcome);
        }

        let mut board: Vec<LeaderboardRow> = tallies.into_iter().map(PlayerTally::finish).collect();
        // Stable sort keeps first-seen order for complete ties
        board.sort_by(ranking_order);
        board
    }

    /// Statistics for one user computed from their rows alone
    pub fn player_summary<'a>(
        user_id: &str,
        rows: impl IntoIterator<Item = &'a ResultRow>,
    ) -> Option<LeaderboardRow> {
        Self::compute(rows.into_iter().filter(|row| row.user_id == user_id))
            .into_iter()
            .next()
    }

    /// Attach 1-based ranks to an already ordered board
    pub fn ranked(board: Vec<LeaderboardRow>) -> Vec<RankedRow> {
        board
            .into_iter()
            .enumerate()
            .map(|(index, row)| RankedRow {
                rank: (index + 1) as u32,
                row,
            })
            .collect()
    }

    /// 1-based position of `user_id` in an ordered board
    pub fn rank_of(user_id: &str, board: &[LeaderboardRow]) -> Option<u32> {
        board
            .iter()
            .position(|row| row.user_id == user_id)
            .map(|index| (index + 1) as u32)
    }
}

/// Weighted average descending, then games played descending, then average
/// guesses ascending with missing averages last.
pub fn ranking_order(a: &LeaderboardRow, b: &LeaderboardRow) -> Ordering {
    b.weighted_avg
        .total_cmp(&a.weighted_avg)
        .then_with(|| b.games_played.cmp(&a.games_played))
        .then_with(|| match (a.avg_guesses, b.avg_guesses) {
            (Some(a), Some(b)) => a.total_cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1), computed mean first then squared
/// deviations. Zero for a single value.
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    let mean = mean(values)?;
    if values.len() == 1 {
        return Some(0.0);
    }

    let squared: f64 = values.iter().map(|value| (value - mean).powi(2)).sum();
    Some((squared / (values.len() - 1) as f64).sqrt())
}

/// Convenience wrapper around [`LeaderboardEngine::compute`].
pub fn compute_leaderboard<'a>(rows: impl IntoIterator<Item = &'a ResultRow>) -> Vec<LeaderboardRow> {
    LeaderboardEngine::compute(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(user_id: &str, date: &str, guesses: Option<u8>, failed: bool) -> ResultRow {
        ResultRow {
            user_id: user_id.to_string(),
            puzzle_number: None,
            date_iso: date.to_string(),
            guesses,
            failed,
            raw: String::new(),
        }
    }

    fn win(user_id: &str, date: &str, guesses: u8) -> ResultRow {
        row(user_id, date, Some(guesses), false)
    }

    fn loss(user_id: &str, date: &str) -> ResultRow {
        row(user_id, date, None, true)
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_empty_input() {
        let rows: Vec<ResultRow> = Vec::new();
        let board = compute_leaderboard(&rows);
        assert!(board.is_empty());
    }

    #[test]
    fn test_single_user_statistics() {
        let rows = vec![
            win("1", "2024-01-01", 2),
            win("1", "2024-01-02", 5),
            loss("1", "2024-01-03"),
        ];

        let board = compute_leaderboard(&rows);
        assert_eq!(board.len(), 1);

        let stats = &board[0];
        assert_eq!(stats.games_played, 3);
        assert_eq!(stats.wins, 2);
        assert_eq!(stats.failures, 1);
        assert_eq!(stats.guess_distribution(), [0, 1, 0, 0, 1, 0]);
        assert_eq!(stats.total, 7);
        assert!(approx(stats.weighted_avg, 7.0 / 3.0));
        assert!(approx(stats.avg_guesses.unwrap(), 14.0 / 3.0));
        assert!(approx(stats.std_dev.unwrap(), 2.517));
    }

    #[test]
    fn test_single_game_has_zero_deviation() {
        let board = compute_leaderboard(&[win("1", "2024-01-01", 4)]);

        assert_eq!(board[0].std_dev, Some(0.0));
        assert_eq!(board[0].avg_guesses, Some(4.0));
        assert_eq!(board[0].total, 3);
        assert!(approx(board[0].weighted_avg, 3.0));
    }

    #[test]
    fn test_all_failures() {
        let rows = vec![loss("1", "2024-01-01"), loss("1", "2024-01-02")];
        let board = compute_leaderboard(&rows);

        assert_eq!(board[0].wins, 0);
        assert_eq!(board[0].total, 0);
        assert_eq!(board[0].weighted_avg, 0.0);
        assert_eq!(board[0].avg_guesses, Some(7.0));
        assert_eq!(board[0].std_dev, Some(0.0));
    }

    #[test]
    fn test_invariants_hold_for_every_row() {
        let rows = vec![
            win("a", "d1", 1),
            win("a", "d2", 6),
            loss("a", "d3"),
            win("b", "d1", 3),
            win("b", "d2", 3),
            loss("c", "d1"),
        ];

        for stats in compute_leaderboard(&rows) {
            assert_eq!(stats.games_played, stats.wins + stats.failures);
            assert_eq!(stats.guess_distribution().iter().sum::<u32>(), stats.wins);
            assert!(approx(
                stats.weighted_avg,
                stats.total as f64 / stats.games_played as f64
            ));
        }
    }

    #[test]
    fn test_weighted_average_ordering() {
        let rows = vec![
            win("slow", "d1", 6),
            win("fast", "d1", 1),
            win("mid", "d1", 3),
        ];

        let board = compute_leaderboard(&rows);
        let order: Vec<_> = board.iter().map(|r| r.user_id.as_str()).collect();
        assert_eq!(order, vec!["fast", "mid", "slow"]);
    }

    #[test]
    fn test_games_played_breaks_ties() {
        // Both average 4 points per game
        let rows = vec![
            win("few", "d1", 3),
            win("many", "d1", 3),
            win("many", "d2", 3),
        ];

        let board = compute_leaderboard(&rows);
        assert_eq!(board[0].user_id, "many");
        assert_eq!(board[1].user_id, "few");
    }

    #[test]
    fn test_average_guesses_breaks_remaining_ties() {
        let sharper = LeaderboardRow {
            games_played: 2,
            weighted_avg: 2.5,
            avg_guesses: Some(3.0),
            ..LeaderboardRow::empty("sharper")
        };
        let duller = LeaderboardRow {
            games_played: 2,
            weighted_avg: 2.5,
            avg_guesses: Some(5.0),
            ..LeaderboardRow::empty("duller")
        };

        let mut board = vec![duller, sharper];
        board.sort_by(ranking_order);
        assert_eq!(board[0].user_id, "sharper");
        assert_eq!(board[1].user_id, "duller");
    }

    #[test]
    fn test_complete_ties_keep_first_seen_order() {
        let rows = vec![win("b", "d1", 4), win("a", "d1", 4)];

        let board = compute_leaderboard(&rows);
        assert_eq!(board[0].user_id, "b");
        assert_eq!(board[1].user_id, "a");
    }

    #[test]
    fn test_missing_average_sorts_last() {
        let with_avg = LeaderboardRow {
            avg_guesses: Some(6.0),
            ..LeaderboardRow::empty("with")
        };
        let without = LeaderboardRow::empty("without");

        assert_eq!(ranking_order(&without, &with_avg), Ordering::Greater);
        assert_eq!(ranking_order(&with_avg, &without), Ordering::Less);
    }

    #[test]
    fn test_failed_flag_wins_over_stored_guesses() {
        let rows = vec![row("1", "d1", Some(3), true)];
        let board = compute_leaderboard(&rows);

        assert_eq!(board[0].failures, 1);
        assert_eq!(board[0].wins, 0);
        assert_eq!(board[0].avg_guesses, Some(7.0));
    }

    #[test]
    fn test_rows_without_outcome_are_skipped() {
        let rows = vec![row("1", "d1", None, false), win("1", "d2", 2)];
        let board = compute_leaderboard(&rows);

        assert_eq!(board[0].games_played, 1);

        let only_broken = vec![row("2", "d1", None, false)];
        assert!(compute_leaderboard(&only_broken).is_empty());
    }

    #[test]
    fn test_player_summary_and_rank() {
        let rows = vec![
            win("1", "d1", 2),
            win("2", "d1", 5),
            loss("2", "d2"),
        ];

        let summary = LeaderboardEngine::player_summary("2", &rows).unwrap();
        assert_eq!(summary.games_played, 2);
        assert_eq!(summary.total, 2);
        assert!(LeaderboardEngine::player_summary("3", &rows).is_none());

        let board = compute_leaderboard(&rows);
        assert_eq!(LeaderboardEngine::rank_of("1", &board), Some(1));
        assert_eq!(LeaderboardEngine::rank_of("2", &board), Some(2));
        assert_eq!(LeaderboardEngine::rank_of("3", &board), None);

        let ranked = LeaderboardEngine::ranked(board);
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[1].rank, 2);
        assert_eq!(ranked[1].row.user_id, "2");
    }

    #[test]
    fn test_statistics_helpers() {
        assert_eq!(mean(&[]), None);
        assert_eq!(sample_std_dev(&[]), None);
        assert_eq!(sample_std_dev(&[3.0]), Some(0.0));
        assert!(approx(sample_std_dev(&[2.0, 4.0]).unwrap(), 2f64.sqrt()));
    }
}

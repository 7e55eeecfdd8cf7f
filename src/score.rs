use crate::domain::{Entrant, Game};
use crate::error::ScoreError;

pub const DQ_SCORE: &str = "DQ";

/// Stripped display scores that list the loser's game count first.
const LOSER_FIRST_SCORES: [&str; 5] = ["0-2", "0-3", "1-2", "1-3", "2-3"];

/// Resolves the canonical winner-first score for a set.
///
/// The display text and the game list can disagree: start.gg often reports
/// fewer games than were played. Whichever credits the winner with more games
/// wins, comparing only the leading digit.
pub fn resolve_score(
    display_score: &str,
    games: &[Game],
    winner: &Entrant,
    loser: &Entrant,
) -> Result<String, ScoreError> {
    if display_score == DQ_SCORE {
        return Ok(DQ_SCORE.to_string());
    }
    let from_text = score_from_display(display_score, &winner.name, &loser.name);
    let from_games = score_from_games(games, winner.id);

    match from_games {
        Some(from_games) if !from_text.is_empty() && !from_games.is_empty() => {
            let text_wins = leading_game_count(&from_text)?;
            let games_wins = leading_game_count(&from_games)?;
            if text_wins > games_wins {
                Ok(from_text)
            } else {
                Ok(from_games)
            }
        }
        Some(from_games) => Ok(from_games),
        None => Ok(from_text),
    }
}

pub fn score_from_display(display_score: &str, winner_name: &str, loser_name: &str) -> String {
    let stripped = display_score
        .replacen(winner_name, "", 1)
        .replacen(loser_name, "", 1)
        .replace(' ', "");
    if LOSER_FIRST_SCORES.contains(&stripped.as_str()) {
        stripped.chars().rev().collect()
    } else {
        stripped
    }
}

/// Running tally over the games in order; `None` when no games were reported.
pub fn score_from_games(games: &[Game], winner_id: i64) -> Option<String> {
    let mut winner_score = 0;
    let mut loser_score = 0;
    let mut last = None;
    for game in games {
        if game.winner_id == winner_id {
            winner_score += 1;
        } else {
            loser_score += 1;
        }
        last = Some(format!("{winner_score}-{loser_score}"));
    }
    last
}

fn leading_game_count(score: &str) -> Result<u32, ScoreError> {
    score
        .chars()
        .next()
        .and_then(|c| c.to_digit(10))
        .ok_or_else(|| ScoreError::NotANumber {
            score: score.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tests::{tweek, zomba};

    fn games(winners: &[i64]) -> Vec<Game> {
        winners
            .iter()
            .enumerate()
            .map(|(idx, winner_id)| Game {
                id: 16955184 + idx as i64,
                winner_id: *winner_id,
                selections: Vec::new(),
            })
            .collect()
    }

    fn resolve(display: &str, games: &[Game]) -> String {
        resolve_score(display, games, &zomba(), &tweek()).unwrap()
    }

    #[test]
    fn test_winner_first_text() {
        assert_eq!(resolve("Zomba 3 - LG | Tweek 0", &[]), "3-0");
    }

    #[test]
    fn test_loser_first_text_is_reversed() {
        assert_eq!(resolve("Zomba 0 - LG | Tweek 3", &[]), "3-0");
        assert_eq!(resolve("Zomba 1 - LG | Tweek 2", &[]), "2-1");
        assert_eq!(resolve("Zomba 2 - LG | Tweek 3", &[]), "3-2");
    }

    #[test]
    fn test_games_agree_with_text() {
        let zomba_id = zomba().id;
        let played = games(&[zomba_id, zomba_id, zomba_id]);
        assert_eq!(resolve("Zomba 0 - LG | Tweek 3", &played), "3-0");
    }

    #[test]
    fn test_games_win_ties_on_leading_digit() {
        let (z, t) = (zomba().id, tweek().id);
        let played = games(&[z, z, t, z]);
        assert_eq!(resolve("Zomba 0 - LG | Tweek 3", &played), "3-1");
    }

    #[test]
    fn test_text_wins_over_truncated_games() {
        let (z, t) = (zomba().id, tweek().id);
        let played = games(&[z, z, t]);
        assert_eq!(resolve("Zomba 0 - LG | Tweek 3", &played), "3-0");
    }

    #[test]
    fn test_dq_short_circuits() {
        let (z, t) = (zomba().id, tweek().id);
        let played = games(&[z, z, t, z]);
        assert_eq!(resolve("DQ", &played), "DQ");
    }

    #[test]
    fn test_empty_text_falls_back_to_games() {
        let z = zomba().id;
        assert_eq!(resolve("", &games(&[z, z])), "2-0");
        assert_eq!(resolve("", &[]), "");
    }

    #[test]
    fn test_unparseable_text_is_an_error() {
        let z = zomba().id;
        let err = resolve_score("Zomba W - LG | Tweek L", &games(&[z]), &zomba(), &tweek())
            .unwrap_err();
        assert_eq!(
            err,
            ScoreError::NotANumber {
                score: "W-L".to_string()
            }
        );
    }

    #[test]
    fn test_game_tally_is_running() {
        let (z, t) = (zomba().id, tweek().id);
        assert_eq!(score_from_games(&games(&[t, z, z]), z).as_deref(), Some("2-1"));
        assert_eq!(score_from_games(&[], z), None);
    }
}

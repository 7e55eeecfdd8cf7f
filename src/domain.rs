use std::collections::BTreeSet;

use crate::error::ScoreError;
use crate::score::{resolve_score, DQ_SCORE};
use crate::seeding::SeedBucketTable;

/// Scores that count as a close set.
const NOTABLE_SCORES: [&str; 2] = ["3-2", "2-1"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entrant {
    pub id: i64,
    pub name: String,
    pub initial_seed: i32,
    pub placement: i32,
    pub is_final: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Character {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub entrant: Entrant,
    pub character: Option<Character>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    pub id: i64,
    pub winner_id: i64,
    pub selections: Vec<Selection>,
}

/// Everything a set is built from, before winner/loser resolution.
#[derive(Debug, Clone)]
pub struct SetParts {
    pub id: String,
    pub display_score: String,
    pub full_round_text: Option<String>,
    pub total_games: i32,
    pub round: i32,
    pub losers_placement: i32,
    pub winner_id: Option<i64>,
    pub entrants: [Entrant; 2],
    pub games: Vec<Game>,
    pub completed_at: i64,
}

/// One bracket match, with score and upset factor resolved at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Set {
    pub id: String,
    pub display_score: String,
    pub full_round_text: Option<String>,
    pub round: i32,
    pub losers_placement: i32,
    pub total_games: i32,
    pub games: Vec<Game>,
    pub completed_at: i64,
    pub winner: Entrant,
    pub loser: Entrant,
    pub upset_factor: i32,
    pub score: Option<String>,
}

impl Set {
    pub fn new(parts: SetParts, table: &SeedBucketTable) -> Result<Self, ScoreError> {
        let SetParts {
            id,
            display_score,
            full_round_text,
            total_games,
            round,
            losers_placement,
            winner_id,
            entrants,
            games,
            completed_at,
        } = parts;
        let [first, second] = entrants;
        let (winner, loser) = if winner_id == Some(second.id) {
            (second, first)
        } else {
            (first, second)
        };
        let upset_factor = table.upset_factor(winner.initial_seed, loser.initial_seed);
        let score = resolve_score(&display_score, &games, &winner, &loser)?;
        tracing::debug!(set_id = %id, %display_score, %score, upset_factor, "resolved set");
        Ok(Self {
            id,
            display_score,
            full_round_text,
            round,
            losers_placement,
            total_games,
            games,
            completed_at,
            winner,
            loser,
            upset_factor,
            score: Some(score),
        })
    }

    pub fn is_winners_bracket(&self) -> bool {
        self.round > 0
    }

    pub fn is_dq(&self) -> bool {
        self.display_score == DQ_SCORE
    }

    /// Disqualified while still alive in winners.
    pub fn is_dq_and_out(&self) -> bool {
        self.is_winners_bracket() && self.is_dq()
    }

    pub fn is_notable(&self) -> bool {
        self.score
            .as_deref()
            .map(|score| NOTABLE_SCORES.contains(&score))
            .unwrap_or(false)
    }

    /// Distinct character names the entrant played, sorted and comma joined.
    pub fn character_selections(&self, entrant_id: i64) -> String {
        let names: BTreeSet<&str> = self
            .games
            .iter()
            .flat_map(|game| game.selections.iter())
            .filter(|selection| selection.entrant.id == entrant_id)
            .filter_map(|selection| selection.character.as_ref())
            .map(|character| character.name.as_str())
            .filter(|name| !name.is_empty())
            .collect();
        names.into_iter().collect::<Vec<_>>().join(", ")
    }

    pub fn winner_characters(&self) -> String {
        self.character_selections(self.winner.id)
    }

    pub fn loser_characters(&self) -> String {
        self.character_selections(self.loser.id)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn tweek() -> Entrant {
        Entrant {
            id: 12394650,
            name: "LG | Tweek".to_string(),
            initial_seed: 3,
            placement: 9,
            is_final: true,
        }
    }

    pub(crate) fn zomba() -> Entrant {
        Entrant {
            id: 12687800,
            name: "Zomba".to_string(),
            initial_seed: 20,
            placement: 8,
            is_final: false,
        }
    }

    fn pick(entrant: &Entrant, id: i64, name: &str) -> Selection {
        Selection {
            entrant: entrant.clone(),
            character: Some(Character {
                id,
                name: name.to_string(),
            }),
        }
    }

    fn diddy_vs_rob() -> Vec<Selection> {
        vec![pick(&tweek(), 1279, "Diddy Kong"), pick(&zomba(), 1323, "R.O.B.")]
    }

    fn sephiroth_vs_rob() -> Vec<Selection> {
        vec![pick(&tweek(), 1777, "Sephiroth"), pick(&zomba(), 1323, "R.O.B.")]
    }

    pub(crate) fn parts(display_score: &str, round: i32, games: Vec<Game>) -> SetParts {
        SetParts {
            id: "60482457".to_string(),
            display_score: display_score.to_string(),
            full_round_text: None,
            total_games: 5,
            round,
            losers_placement: 9,
            winner_id: Some(zomba().id),
            entrants: [tweek(), zomba()],
            games,
            completed_at: 1_700_000_000,
        }
    }

    fn build(display_score: &str, round: i32, games: Vec<Game>) -> Set {
        Set::new(parts(display_score, round, games), &SeedBucketTable::new()).unwrap()
    }

    #[test]
    fn test_winner_resolved_from_winner_id() {
        let set = build("Zomba 3 - LG | Tweek 0", -6, Vec::new());
        assert_eq!(set.winner.name, "Zomba");
        assert_eq!(set.loser.name, "LG | Tweek");
        assert_eq!(set.upset_factor, 6);
        assert_eq!(set.score.as_deref(), Some("3-0"));
    }

    #[test]
    fn test_slot_order_does_not_matter() {
        let mut swapped = parts("Zomba 3 - LG | Tweek 0", -6, Vec::new());
        swapped.entrants = [zomba(), tweek()];
        let set = Set::new(swapped, &SeedBucketTable::new()).unwrap();
        assert_eq!(set.winner.name, "Zomba");
        assert_eq!(set.upset_factor, 6);
    }

    #[test]
    fn test_character_selections() {
        let games = vec![
            Game { id: 16955184, winner_id: zomba().id, selections: diddy_vs_rob() },
            Game { id: 16955185, winner_id: zomba().id, selections: sephiroth_vs_rob() },
            Game { id: 16955186, winner_id: zomba().id, selections: sephiroth_vs_rob() },
        ];
        let set = build("Zomba 0 - LG | Tweek 3", -6, games);
        assert_eq!(set.score.as_deref(), Some("3-0"));
        assert_eq!(set.winner_characters(), "R.O.B.");
        assert_eq!(set.loser_characters(), "Diddy Kong, Sephiroth");
    }

    #[test]
    fn test_missing_character_is_skipped() {
        let games = vec![Game {
            id: 1,
            winner_id: zomba().id,
            selections: vec![Selection { entrant: zomba(), character: None }],
        }];
        let set = build("Zomba 1 - LG | Tweek 0", 1, games);
        assert_eq!(set.winner_characters(), "");
    }

    #[test]
    fn test_dq_and_out_only_in_winners() {
        let losers_side = build("DQ", -6, Vec::new());
        assert!(losers_side.is_dq());
        assert!(!losers_side.is_dq_and_out());
        assert_eq!(losers_side.score.as_deref(), Some("DQ"));

        let winners_side = build("DQ", 2, Vec::new());
        assert!(winners_side.is_dq_and_out());
    }

    #[test]
    fn test_notable_scores() {
        assert!(build("Zomba 1 - LG | Tweek 2", -6, Vec::new()).is_notable());
        assert!(build("Zomba 2 - LG | Tweek 3", -6, Vec::new()).is_notable());
        assert!(!build("Zomba 3 - LG | Tweek 0", -6, Vec::new()).is_notable());
        assert!(!build("DQ", -6, Vec::new()).is_notable());
    }
}

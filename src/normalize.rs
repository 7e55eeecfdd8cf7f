use std::sync::atomic::{AtomicBool, Ordering};

use crate::domain::{Character, Entrant, Game, Selection, Set, SetParts};
use crate::error::{NormalizeError, StoreError};
use crate::seeding::SeedBucketTable;
use crate::startgg::{value_to_i64, value_to_string, MatchSource};
use crate::store::UpsetStore;
use crate::types::{
    StartggEntrantNode, StartggGameNode, StartggSelectionNode, StartggSetNode,
    CHARACTER_SELECTION_TYPE,
};

/// Cache-aside lookup of character names for one game title. A roster is
/// fetched at most once per title per store, and only a non-empty roster
/// marks the title as loaded.
pub struct CharacterCache<'a> {
    store: &'a dyn UpsetStore,
    source: &'a dyn MatchSource,
    game: String,
    asked: AtomicBool,
}

impl<'a> CharacterCache<'a> {
    pub fn new(store: &'a dyn UpsetStore, source: &'a dyn MatchSource, game: &str) -> Self {
        Self {
            store,
            source,
            game: game.to_string(),
            asked: AtomicBool::new(false),
        }
    }

    pub fn name(&self, id: i64) -> Result<Option<String>, NormalizeError> {
        if !self.asked.load(Ordering::Acquire) {
            let _guard = self.store.roster_lock().lock().map_err(|_| StoreError::Poisoned)?;
            if !self.asked.load(Ordering::Acquire) {
                self.populate()?;
                self.asked.store(true, Ordering::Release);
            }
        }
        Ok(self.store.character_name(id, &self.game)?)
    }

    /// Caller holds the store's roster lock.
    fn populate(&self) -> Result<(), NormalizeError> {
        if self.store.is_characters_loaded(&self.game)? {
            return Ok(());
        }
        let roster = self
            .source
            .characters(&self.game)
            .map_err(|source| NormalizeError::Roster {
                game: self.game.clone(),
                source,
            })?;
        match roster {
            None => {
                tracing::warn!(game = %self.game, "source has no character roster; uncached names stay blank");
            }
            Some(roster) if roster.is_empty() => {
                tracing::warn!(game = %self.game, "empty character roster; leaving title unloaded");
            }
            Some(roster) => {
                self.store.add_characters(&self.game, &roster)?;
                self.store.set_characters_loaded(&self.game)?;
                tracing::info!(game = %self.game, characters = roster.len(), "cached character roster");
            }
        }
        Ok(())
    }
}

/// Turns raw start.gg set nodes into `Set`s.
pub struct MatchNormalizer<'a> {
    table: &'a SeedBucketTable,
    characters: CharacterCache<'a>,
}

impl<'a> MatchNormalizer<'a> {
    pub fn new(table: &'a SeedBucketTable, characters: CharacterCache<'a>) -> Self {
        Self { table, characters }
    }

    pub fn normalize(&self, node: &StartggSetNode) -> Result<Set, NormalizeError> {
        let set_id = node
            .id
            .as_ref()
            .and_then(value_to_string)
            .unwrap_or_default();
        let found: Vec<Entrant> = node
            .slots
            .iter()
            .flatten()
            .filter_map(|slot| slot.entrant.as_ref())
            .map(to_entrant)
            .collect();
        let entrants: [Entrant; 2] =
            found
                .try_into()
                .map_err(|found: Vec<Entrant>| NormalizeError::EntrantCount {
                    set_id: set_id.clone(),
                    found: found.len(),
                })?;

        let winner_id = node.winner_id.as_ref().and_then(value_to_i64);
        let losers_placement = entrants
            .iter()
            .rev()
            .find(|entrant| Some(entrant.id) != winner_id)
            .map(|entrant| entrant.placement)
            .unwrap_or_default();

        let games = node
            .games
            .iter()
            .flatten()
            .map(|game| self.to_game(game))
            .collect::<Result<Vec<_>, _>>()?;

        let parts = SetParts {
            id: set_id.clone(),
            display_score: node.display_score.clone().unwrap_or_default(),
            full_round_text: node.full_round_text.clone(),
            total_games: node.total_games.unwrap_or_default(),
            round: node.round.unwrap_or_default(),
            losers_placement,
            winner_id,
            entrants,
            games,
            completed_at: node.completed_at.unwrap_or_default(),
        };
        Set::new(parts, self.table).map_err(|source| NormalizeError::Score { set_id, source })
    }

    /// Fails on the first set that cannot be normalized.
    pub fn normalize_all(&self, nodes: &[StartggSetNode]) -> Result<Vec<Set>, NormalizeError> {
        nodes.iter().map(|node| self.normalize(node)).collect()
    }

    fn to_game(&self, game: &StartggGameNode) -> Result<Game, NormalizeError> {
        let selections = game
            .selections
            .iter()
            .flatten()
            .map(|selection| self.to_selection(selection))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Game {
            id: game.id.as_ref().and_then(value_to_i64).unwrap_or_default(),
            winner_id: game
                .winner_id
                .as_ref()
                .and_then(value_to_i64)
                .unwrap_or_default(),
            selections,
        })
    }

    fn to_selection(&self, selection: &StartggSelectionNode) -> Result<Selection, NormalizeError> {
        let entrant = selection
            .entrant
            .as_ref()
            .map(to_entrant)
            .unwrap_or_else(|| to_entrant(&StartggEntrantNode::default()));
        let character_id = selection
            .selection_value
            .as_ref()
            .and_then(value_to_i64)
            .filter(|_| selection.selection_type.as_deref() == Some(CHARACTER_SELECTION_TYPE));
        let character = match character_id {
            Some(id) => self
                .characters
                .name(id)?
                .map(|name| Character { id, name }),
            None => None,
        };
        Ok(Selection { entrant, character })
    }
}

fn to_entrant(node: &StartggEntrantNode) -> Entrant {
    let standing = node.standing.as_ref();
    Entrant {
        id: node.id.as_ref().and_then(value_to_i64).unwrap_or_default(),
        name: node.name.clone().unwrap_or_default(),
        initial_seed: node.initial_seed_num.unwrap_or_default(),
        placement: standing
            .and_then(|standing| standing.placement)
            .unwrap_or_default(),
        is_final: standing
            .and_then(|standing| standing.is_final)
            .unwrap_or_default(),
    }
}

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::classify::{classify, Category};
use crate::codec::{decode_item, encode_item};
use crate::domain::Set;
use crate::error::CodecError;

/// Flattened, storable view of a classified set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsetThreadItem {
    pub id: String,
    pub winners_name: String,
    pub winners_characters: String,
    pub winners_seed: i32,
    pub score: Option<String>,
    pub losers_name: String,
    pub losers_characters: String,
    pub is_winners_bracket: bool,
    pub losers_seed: i32,
    pub losers_placement: i32,
    pub upset_factor: i32,
    pub completed_at: i64,
    pub category: Category,
}

impl UpsetThreadItem {
    pub fn from_set(set: &Set, category: Category) -> Self {
        Self {
            id: set.id.clone(),
            winners_name: set.winner.name.clone(),
            winners_characters: set.winner_characters(),
            winners_seed: set.winner.initial_seed,
            score: set.score.clone(),
            losers_name: set.loser.name.clone(),
            losers_characters: set.loser_characters(),
            is_winners_bracket: set.is_winners_bracket(),
            losers_seed: set.loser.initial_seed,
            losers_placement: set.losers_placement,
            upset_factor: set.upset_factor,
            completed_at: set.completed_at,
            category,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpsetThread {
    pub title: String,
    pub slug: String,
    pub winners: Vec<UpsetThreadItem>,
    pub losers: Vec<UpsetThreadItem>,
    pub notables: Vec<UpsetThreadItem>,
    pub dqs: Vec<UpsetThreadItem>,
    pub other: Vec<UpsetThreadItem>,
}

impl UpsetThread {
    pub fn new(slug: &str, title: &str) -> Self {
        Self {
            title: title.to_string(),
            slug: slug.to_string(),
            ..Self::default()
        }
    }

    pub fn bucket(&self, category: Category) -> &[UpsetThreadItem] {
        match category {
            Category::Winners => &self.winners,
            Category::Losers => &self.losers,
            Category::Notables => &self.notables,
            Category::Dqs => &self.dqs,
            Category::Other => &self.other,
        }
    }

    fn bucket_mut(&mut self, category: Category) -> &mut Vec<UpsetThreadItem> {
        match category {
            Category::Winners => &mut self.winners,
            Category::Losers => &mut self.losers,
            Category::Notables => &mut self.notables,
            Category::Dqs => &mut self.dqs,
            Category::Other => &mut self.other,
        }
    }

    /// Files the item under its own category; call `sort` once done.
    pub fn push(&mut self, item: UpsetThreadItem) {
        self.bucket_mut(item.category).push(item);
    }

    pub fn items(&self) -> impl Iterator<Item = &UpsetThreadItem> {
        Category::ALL
            .into_iter()
            .flat_map(move |category| self.bucket(category).iter())
    }

    pub fn len(&self) -> usize {
        Category::ALL
            .iter()
            .map(|category| self.bucket(*category).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn sort(&mut self) {
        for category in Category::ALL {
            sort_bucket(category, self.bucket_mut(category));
        }
    }

    /// Encoded items keyed by set id, ready for the store.
    pub fn to_stored(&self) -> HashMap<String, String> {
        self.items()
            .map(|item| (item.id.clone(), encode_item(item)))
            .collect()
    }

    /// Rebuilds a ranked thread from stored items. Storage order is
    /// arbitrary, so every bucket is re-sorted.
    pub fn from_stored(
        slug: &str,
        title: &str,
        stored: &HashMap<String, String>,
    ) -> Result<Self, CodecError> {
        let mut thread = Self::new(slug, title);
        for (id, raw) in stored {
            thread.push(decode_item(id, raw)?);
        }
        thread.sort();
        Ok(thread)
    }
}

/// Descending factor, ties by winner name, then set id.
pub fn default_order(a: &UpsetThreadItem, b: &UpsetThreadItem) -> Ordering {
    b.upset_factor
        .cmp(&a.upset_factor)
        .then_with(|| a.winners_name.cmp(&b.winners_name))
        .then_with(|| a.id.cmp(&b.id))
}

/// Ascending factor so the most lopsided seeding shows first, ties by winner name
/// then set id.
pub fn notables_order(a: &UpsetThreadItem, b: &UpsetThreadItem) -> Ordering {
    a.upset_factor
        .cmp(&b.upset_factor)
        .then_with(|| a.winners_name.cmp(&b.winners_name))
        .then_with(|| a.id.cmp(&b.id))
}

pub fn sort_bucket(category: Category, items: &mut [UpsetThreadItem]) {
    match category {
        Category::Notables => items.sort_by(notables_order),
        Category::Winners | Category::Losers | Category::Dqs | Category::Other => {
            items.sort_by(default_order)
        }
    }
}

/// Classifies every set and ranks the buckets.
pub fn assemble_thread(slug: &str, title: &str, sets: &[Set]) -> UpsetThread {
    let mut thread = UpsetThread::new(slug, title);
    for set in sets {
        let category = classify(set);
        thread.push(UpsetThreadItem::from_set(set, category));
    }
    thread.sort();
    tracing::info!(
        slug,
        winners = thread.winners.len(),
        losers = thread.losers.len(),
        notables = thread.notables.len(),
        dqs = thread.dqs.len(),
        other = thread.other.len(),
        "assembled upset thread"
    );
    thread
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::tests::parts;
    use crate::domain::Entrant;
    use crate::seeding::SeedBucketTable;

    pub(crate) fn item(id: &str, name: &str, upset_factor: i32, category: Category) -> UpsetThreadItem {
        UpsetThreadItem {
            id: id.to_string(),
            winners_name: name.to_string(),
            winners_characters: String::new(),
            winners_seed: 17,
            score: Some("3-1".to_string()),
            losers_name: "loser".to_string(),
            losers_characters: String::new(),
            is_winners_bracket: true,
            losers_seed: 4,
            losers_placement: 13,
            upset_factor,
            completed_at: 1_700_000_000,
            category,
        }
    }

    fn names(items: &[UpsetThreadItem]) -> Vec<&str> {
        items.iter().map(|item| item.winners_name.as_str()).collect()
    }

    #[test]
    fn test_default_sort_breaks_ties_by_name() {
        let mut items = vec![
            item("1", "f", 5, Category::Winners),
            item("2", "c", 6, Category::Winners),
            item("3", "b", 7, Category::Winners),
            item("4", "d", 6, Category::Winners),
            item("5", "e", 5, Category::Winners),
            item("6", "a", 8, Category::Winners),
        ];
        sort_bucket(Category::Winners, &mut items);
        assert_eq!(names(&items), vec!["a", "b", "c", "d", "e", "f"]);
        let factors: Vec<i32> = items.iter().map(|item| item.upset_factor).collect();
        assert_eq!(factors, vec![8, 7, 6, 6, 5, 5]);
    }

    #[test]
    fn test_notables_sort_ascending() {
        let mut items = vec![
            item("1", "b", -3, Category::Notables),
            item("2", "c", -8, Category::Notables),
            item("3", "a", -3, Category::Notables),
        ];
        sort_bucket(Category::Notables, &mut items);
        assert_eq!(names(&items), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_resort_is_idempotent() {
        let mut thread = UpsetThread::new("slug", "title");
        for (idx, factor) in [3, 9, 1, 9].iter().enumerate() {
            thread.push(item(&idx.to_string(), &format!("p{idx}"), *factor, Category::Losers));
        }
        thread.sort();
        let once = thread.clone();
        thread.sort();
        assert_eq!(thread, once);
        assert_eq!(names(&thread.losers), vec!["p1", "p3", "p0", "p2"]);
    }

    #[test]
    fn test_assemble_is_exclusive() {
        let table = SeedBucketTable::new();
        let scores = ["Zomba 3 - LG | Tweek 0", "DQ", "Zomba 1 - LG | Tweek 2", "Zomba 2 - LG | Tweek 0"];
        let mut sets = Vec::new();
        for (idx, score) in scores.iter().enumerate() {
            for round in [-2, 2] {
                let mut parts = parts(score, round, Vec::new());
                parts.id = format!("{idx}:{round}");
                sets.push(Set::new(parts, &table).unwrap());
            }
        }
        let thread = assemble_thread("slug", "title", &sets);
        assert_eq!(thread.len(), sets.len());
        for set in &sets {
            let hits = Category::ALL
                .iter()
                .filter(|category| thread.bucket(**category).iter().any(|item| item.id == set.id))
                .count();
            assert_eq!(hits, 1, "set {} filed {hits} times", set.id);
        }
    }

    #[test]
    fn test_stored_round_trip_keeps_ranking() {
        let table = SeedBucketTable::new();
        let mut sets = Vec::new();
        for (idx, seed) in [9, 33, 17].iter().enumerate() {
            let mut parts = parts("3 - 1", 1, Vec::new());
            parts.id = format!("set-{idx}");
            parts.entrants[1] = Entrant {
                name: format!("Zomba{idx}"),
                initial_seed: *seed,
                ..parts.entrants[1].clone()
            };
            sets.push(Set::new(parts, &table).unwrap());
        }
        let thread = assemble_thread("slug", "title", &sets);
        let stored = thread.to_stored();
        assert_eq!(stored.len(), 3);
        let rebuilt = UpsetThread::from_stored("slug", "title", &stored).unwrap();
        assert_eq!(rebuilt, thread);
        assert_eq!(names(&rebuilt.winners), vec!["Zomba1", "Zomba2", "Zomba0"]);
    }
}

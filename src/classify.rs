use crate::domain::Set;

const MIN_UPSET_FACTOR: i32 = 1;
const MAX_SEED: i32 = 50;
/// Notables are ranked on the negated factor: the favourite won a close set.
const MIN_NOTABLE_FACTOR: i32 = 3;

/// The five sections of an upset thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Winners,
    Losers,
    Notables,
    Dqs,
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Winners,
        Category::Losers,
        Category::Notables,
        Category::Dqs,
        Category::Other,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            Category::Winners => "winners",
            Category::Losers => "losers",
            Category::Notables => "notables",
            Category::Dqs => "dqs",
            Category::Other => "other",
        }
    }

    /// Unknown tags fall through to `Other`, as the report always has.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "winners" => Category::Winners,
            "losers" => Category::Losers,
            "notables" => Category::Notables,
            "dqs" => Category::Dqs,
            _ => Category::Other,
        }
    }
}

/// Eligibility thresholds for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetFilter {
    pub min_upset_factor: i32,
    pub max_seed: i32,
    pub include_dq: bool,
}

impl SetFilter {
    pub const UPSETS: SetFilter = SetFilter {
        min_upset_factor: MIN_UPSET_FACTOR,
        max_seed: MAX_SEED,
        include_dq: false,
    };

    pub const DQS: SetFilter = SetFilter {
        min_upset_factor: i32::MIN,
        max_seed: i32::MAX,
        include_dq: true,
    };

    pub const NOTABLES: SetFilter = SetFilter {
        min_upset_factor: MIN_NOTABLE_FACTOR,
        max_seed: MAX_SEED,
        include_dq: false,
    };

    /// Either seed within `max_seed` is enough.
    pub fn passes(
        &self,
        upset_factor: i32,
        winner_seed: i32,
        loser_seed: i32,
        is_dq: bool,
        score: Option<&str>,
    ) -> bool {
        upset_factor >= self.min_upset_factor
            && (!is_dq || self.include_dq)
            && (winner_seed <= self.max_seed || loser_seed <= self.max_seed)
            && score.is_some()
    }

    fn passes_set(&self, set: &Set, upset_factor: i32, is_dq: bool) -> bool {
        self.passes(
            upset_factor,
            set.winner.initial_seed,
            set.loser.initial_seed,
            is_dq,
            set.score.as_deref(),
        )
    }
}

/// First matching rule wins.
pub fn classify(set: &Set) -> Category {
    let upset = SetFilter::UPSETS.passes_set(set, set.upset_factor, set.is_dq());
    if set.is_winners_bracket() && upset {
        Category::Winners
    } else if !set.is_winners_bracket() && upset {
        Category::Losers
    } else if set.is_dq_and_out() && SetFilter::DQS.passes_set(set, set.upset_factor, true) {
        Category::Dqs
    } else if set.is_notable()
        && SetFilter::NOTABLES.passes_set(set, -set.upset_factor, set.is_dq())
    {
        Category::Notables
    } else {
        Category::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tests::{parts, tweek, zomba};
    use crate::domain::Entrant;
    use crate::seeding::SeedBucketTable;

    fn set_between(winner: Entrant, loser: Entrant, display_score: &str, round: i32) -> Set {
        let mut parts = parts(display_score, round, Vec::new());
        parts.winner_id = Some(winner.id);
        parts.entrants = [winner, loser];
        Set::new(parts, &SeedBucketTable::new()).unwrap()
    }

    fn seeded(id: i64, name: &str, seed: i32) -> Entrant {
        Entrant {
            id,
            name: name.to_string(),
            initial_seed: seed,
            placement: 0,
            is_final: false,
        }
    }

    #[test]
    fn test_tags_round_trip() {
        for category in Category::ALL {
            assert_eq!(Category::from_tag(category.tag()), category);
        }
        assert_eq!(Category::from_tag("mystery"), Category::Other);
    }

    #[test]
    fn test_filter_either_seed_qualifies() {
        let filter = SetFilter::UPSETS;
        assert!(filter.passes(2, 200, 50, false, Some("3-0")));
        assert!(filter.passes(2, 50, 200, false, Some("3-0")));
        assert!(!filter.passes(2, 51, 200, false, Some("3-0")));
        assert!(!filter.passes(0, 10, 1, false, Some("3-0")));
        assert!(!filter.passes(2, 10, 1, true, Some("DQ")));
        assert!(!filter.passes(2, 10, 1, false, None));
    }

    #[test]
    fn test_winners_and_losers_upsets() {
        let winners = set_between(zomba(), tweek(), "Zomba 3 - LG | Tweek 0", 3);
        assert_eq!(classify(&winners), Category::Winners);

        let losers = set_between(zomba(), tweek(), "Zomba 3 - LG | Tweek 0", -6);
        assert_eq!(classify(&losers), Category::Losers);
    }

    #[test]
    fn test_round_zero_is_losers_side() {
        let set = set_between(zomba(), tweek(), "Zomba 3 - LG | Tweek 0", 0);
        assert_eq!(classify(&set), Category::Losers);
    }

    #[test]
    fn test_dq_in_winners_is_dq_bucket() {
        let set = set_between(tweek(), zomba(), "DQ", 2);
        assert_eq!(classify(&set), Category::Dqs);
    }

    #[test]
    fn test_dq_upset_never_counts_as_upset() {
        let set = set_between(zomba(), tweek(), "DQ", 2);
        assert_eq!(classify(&set), Category::Dqs);
        let set = set_between(zomba(), tweek(), "DQ", -2);
        assert_eq!(classify(&set), Category::Other);
    }

    #[test]
    fn test_close_favourite_win_is_notable() {
        // seed 3 over seed 20: factor -6
        let set = set_between(tweek(), zomba(), "LG | Tweek 3 - Zomba 2", 4);
        assert_eq!(set.upset_factor, -6);
        assert_eq!(classify(&set), Category::Notables);
    }

    #[test]
    fn test_close_set_between_near_seeds_is_other() {
        let a = seeded(1, "a", 5);
        let b = seeded(2, "b", 6);
        let set = set_between(a, b, "a 2 - b 1", 1);
        assert_eq!(set.upset_factor, 0);
        assert_eq!(classify(&set), Category::Other);
    }

    #[test]
    fn test_low_seeds_are_other() {
        let a = seeded(1, "a", 300);
        let b = seeded(2, "b", 64);
        let set = set_between(a, b, "a 3 - b 0", 1);
        assert!(set.upset_factor >= 1);
        assert_eq!(classify(&set), Category::Other);
    }
}

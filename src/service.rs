use std::thread::sleep;
use std::time::Duration;

use crate::error::{FetchError, Result};
use crate::normalize::{CharacterCache, MatchNormalizer};
use crate::seeding::SeedBucketTable;
use crate::startgg::MatchSource;
use crate::store::UpsetStore;
use crate::thread::{assemble_thread, UpsetThread};
use crate::types::StartggSetNode;

/// Fetch, normalize, classify and persist one event's upset thread.
pub struct UpsetService<'a> {
    store: &'a dyn UpsetStore,
    source: &'a dyn MatchSource,
    table: SeedBucketTable,
    game: String,
    page_delay: Duration,
}

impl<'a> UpsetService<'a> {
    pub fn new(
        store: &'a dyn UpsetStore,
        source: &'a dyn MatchSource,
        game: &str,
        page_delay: Duration,
    ) -> Self {
        Self {
            store,
            source,
            table: SeedBucketTable::new(),
            game: game.to_string(),
            page_delay,
        }
    }

    /// Pages through every completed set. Hitting the pagination ceiling ends
    /// the walk with what was collected so far.
    pub fn fetch_nodes(&self, slug: &str) -> std::result::Result<Vec<StartggSetNode>, FetchError> {
        let mut nodes = Vec::new();
        let mut page = 1;
        loop {
            if !self.page_delay.is_zero() {
                sleep(self.page_delay);
            }
            match self.source.event_page(slug, page) {
                Ok(event_page) => {
                    tracing::info!(
                        slug,
                        page,
                        total_pages = event_page.total_pages,
                        sets = event_page.nodes.len(),
                        "fetched sets page"
                    );
                    nodes.extend(event_page.nodes);
                    if page >= event_page.total_pages {
                        break;
                    }
                    page += 1;
                }
                Err(FetchError::PageCeiling) => {
                    tracing::warn!(slug, page, sets = nodes.len(), "pagination ceiling reached, stopping");
                    break;
                }
                Err(err) => return Err(err),
            }
        }
        Ok(nodes)
    }

    pub fn process(&self, slug: &str, title: &str) -> Result<UpsetThread> {
        let nodes = self.fetch_nodes(slug)?;
        let normalizer = MatchNormalizer::new(
            &self.table,
            CharacterCache::new(self.store, self.source, &self.game),
        );
        let mut sets = normalizer.normalize_all(&nodes)?;
        sets.sort_by(|a, b| b.upset_factor.cmp(&a.upset_factor));

        let thread = assemble_thread(slug, title, &sets);
        self.store.add_sets(slug, &thread.to_stored())?;
        tracing::info!(slug, stored = thread.len(), "persisted upset thread");
        self.stored_thread(slug, title)
    }

    pub fn stored_thread(&self, slug: &str, title: &str) -> Result<UpsetThread> {
        load_thread(self.store, slug, title)
    }
}

/// Rebuilds the thread from whatever the store holds for the event.
pub fn load_thread(store: &dyn UpsetStore, slug: &str, title: &str) -> Result<UpsetThread> {
    let stored = store.get_sets(slug)?;
    Ok(UpsetThread::from_stored(slug, title, &stored)?)
}

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── Constants ──────────────────────────────────────────────────────────

pub const STARTGG_API_URL: &str = "https://api.start.gg/gql/alpha";
pub const STARTGG_USER_AGENT: &str = "upset-thread";
pub const STARTGG_SETS_PER_PAGE: i32 = 40;
/// `SetFilters.state` for completed sets.
pub const STARTGG_COMPLETED_STATE: i32 = 3;
pub const STARTGG_PAGE_DELAY_MS: u64 = 800;
pub const STARTGG_MAX_RETRIES: u32 = 10;
pub const STARTGG_RETRY_BASE_DELAY_MS: u64 = 1000;
pub const DEFAULT_GAME_TITLE: &str = "game/ultimate";
pub const DEFAULT_STORE_PATH: &str = "data/upset_store.json";
pub const CHARACTER_SELECTION_TYPE: &str = "CHARACTER";

// ── Config types ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    pub startgg_api_url: String,
    pub startgg_token: String,
    pub game_title: String,
    pub store_path: String,
    pub page_delay_ms: u64,
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
    pub sets_per_page: i32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            startgg_api_url: STARTGG_API_URL.to_string(),
            startgg_token: String::new(),
            game_title: DEFAULT_GAME_TITLE.to_string(),
            store_path: DEFAULT_STORE_PATH.to_string(),
            page_delay_ms: STARTGG_PAGE_DELAY_MS,
            max_retries: STARTGG_MAX_RETRIES,
            retry_base_delay_ms: STARTGG_RETRY_BASE_DELAY_MS,
            sets_per_page: STARTGG_SETS_PER_PAGE,
        }
    }
}

// ── Start.gg GraphQL response types ────────────────────────────────────

#[derive(Deserialize)]
pub struct StartggGraphqlResponse<T> {
    pub data: Option<T>,
    pub errors: Option<Vec<StartggGraphqlError>>,
}

#[derive(Deserialize)]
pub struct StartggGraphqlError {
    pub message: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartggEventSetsData {
    pub event: Option<StartggEventSetsNode>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartggEventSetsNode {
    pub id: Option<Value>,
    pub slug: Option<String>,
    pub sets: Option<StartggSetConnection>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartggSetConnection {
    pub nodes: Option<Vec<StartggSetNode>>,
    pub page_info: Option<StartggPageInfo>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartggPageInfo {
    pub total: Option<i32>,
    pub total_pages: Option<i32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartggVideogameData {
    pub videogame: Option<StartggVideogameNode>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartggVideogameNode {
    pub id: Option<Value>,
    pub slug: Option<String>,
    pub characters: Option<Vec<StartggCharacterNode>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartggCharacterNode {
    pub id: Option<Value>,
    pub name: Option<String>,
}

/// Raw bracket match as returned by the event sets query, or as saved to a
/// file from a previous fetch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartggSetNode {
    pub id: Option<Value>,
    pub completed_at: Option<i64>,
    pub games: Option<Vec<StartggGameNode>>,
    pub identifier: Option<String>,
    pub display_score: Option<String>,
    pub full_round_text: Option<String>,
    pub total_games: Option<i32>,
    pub l_placement: Option<i32>,
    pub w_placement: Option<i32>,
    pub winner_id: Option<Value>,
    pub state: Option<Value>,
    pub round: Option<i32>,
    pub slots: Option<Vec<StartggSetSlotNode>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartggGameNode {
    pub id: Option<Value>,
    pub winner_id: Option<Value>,
    pub order_num: Option<i32>,
    pub selections: Option<Vec<StartggSelectionNode>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartggSelectionNode {
    pub order_num: Option<i32>,
    pub selection_type: Option<String>,
    pub selection_value: Option<Value>,
    pub entrant: Option<StartggEntrantNode>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartggSetSlotNode {
    pub entrant: Option<StartggEntrantNode>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartggEntrantNode {
    pub id: Option<Value>,
    pub name: Option<String>,
    pub initial_seed_num: Option<i32>,
    pub standing: Option<StartggStandingNode>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartggStandingNode {
    pub is_final: Option<bool>,
    pub placement: Option<i32>,
}

/// One page of completed sets.
#[derive(Debug, Clone, Default)]
pub struct EventPage {
    pub nodes: Vec<StartggSetNode>,
    pub total_pages: i32,
}

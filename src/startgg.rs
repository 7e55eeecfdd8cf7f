use crate::config::*;
use crate::domain::Character;
use crate::error::{FetchError, PAGE_CEILING_MESSAGE};
use crate::types::*;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::{
  fs,
  path::{Path, PathBuf},
  thread::sleep,
  time::Duration,
};

// ── GraphQL query constants ────────────────────────────────────────────

pub const STARTGG_EVENT_SETS_QUERY: &str = r#"
query EventSets($slug: String, $filters: SetFilters, $page: Int, $perPage: Int, $sortType: SetSortType) {
  event(slug: $slug) {
    id
    slug
    sets(filters: $filters, page: $page, perPage: $perPage, sortType: $sortType) {
      pageInfo {
        total
        totalPages
      }
      nodes {
        id
        completedAt
        games {
          id
          winnerId
          orderNum
          selections {
            orderNum
            selectionType
            selectionValue
            entrant { id name initialSeedNum standing { isFinal placement } }
          }
        }
        identifier
        displayScore
        fullRoundText
        totalGames
        lPlacement
        wPlacement
        winnerId
        state
        round
        slots {
          entrant { id name initialSeedNum standing { isFinal placement } }
        }
      }
    }
  }
}
"#;

pub const STARTGG_CHARACTERS_QUERY: &str = r#"
query Characters($slug: String) {
  videogame(slug: $slug) {
    id
    slug
    characters {
      id
      name
    }
  }
}
"#;

// ── Source trait ───────────────────────────────────────────────────────

/// Where raw bracket data comes from.
pub trait MatchSource: Send + Sync {
  /// Full character roster for a game title such as `game/ultimate`, or
  /// `None` when this source has no roster to offer.
  fn characters(&self, game: &str) -> Result<Option<Vec<Character>>, FetchError>;

  /// One page (1-based) of completed sets. Returns `FetchError::PageCeiling`
  /// when the provider will not page any deeper.
  fn event_page(&self, slug: &str, page: i32) -> Result<EventPage, FetchError>;
}

// ── Value helpers ──────────────────────────────────────────────────────

pub fn value_to_i64(value: &Value) -> Option<i64> {
  match value {
    Value::Number(num) => num.as_i64(),
    Value::String(raw) => raw.parse::<i64>().ok(),
    _ => None,
  }
}

pub fn value_to_string(value: &Value) -> Option<String> {
  match value {
    Value::String(raw) => Some(raw.clone()),
    Value::Number(num) => Some(num.to_string()),
    _ => None,
  }
}

pub fn characters_from_nodes(nodes: Vec<StartggCharacterNode>) -> Vec<Character> {
  nodes
    .into_iter()
    .filter_map(|node| {
      let id = node.id.as_ref().and_then(value_to_i64)?;
      Some(Character {
        id,
        name: node.name.unwrap_or_default(),
      })
    })
    .collect()
}

fn event_page_from(sets: Option<StartggSetConnection>, page: i32) -> EventPage {
  let Some(sets) = sets else {
    return EventPage {
      nodes: Vec::new(),
      total_pages: page,
    };
  };
  let total_pages = sets
    .page_info
    .as_ref()
    .and_then(|info| info.total_pages)
    .unwrap_or(page);
  EventPage {
    nodes: sets.nodes.unwrap_or_default(),
    total_pages,
  }
}

/// Unwraps a GraphQL envelope. The pagination ceiling is reported as its own
/// variant so callers can stop paging without failing.
pub fn parse_graphql_body<T: DeserializeOwned>(body: &str) -> Result<T, FetchError> {
  let parsed: StartggGraphqlResponse<T> =
    serde_json::from_str(body).map_err(|e| FetchError::Parse(e.to_string()))?;
  if let Some(errors) = parsed.errors {
    let messages: Vec<String> = errors.into_iter().filter_map(|err| err.message).collect();
    if messages.iter().any(|message| message.contains(PAGE_CEILING_MESSAGE)) {
      return Err(FetchError::PageCeiling);
    }
    let message = messages.join(", ");
    if !message.is_empty() {
      return Err(FetchError::Graphql(message));
    }
  }
  parsed.data.ok_or(FetchError::Missing("data"))
}

pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
  base.saturating_mul(2u32.saturating_pow(attempt))
}

/// Calls `attempt` until it succeeds, fails with a non-transient error, or
/// `max_retries` calls have been made. `sleep_for` waits out each backoff.
pub fn retry_with_backoff<T>(
  max_retries: u32,
  base_delay: Duration,
  mut attempt: impl FnMut() -> Result<T, FetchError>,
  mut sleep_for: impl FnMut(Duration),
) -> Result<T, FetchError> {
  let mut tries = 0u32;
  loop {
    match attempt() {
      Ok(value) => return Ok(value),
      Err(err) if err.is_transient() && tries + 1 < max_retries => {
        let delay = backoff_delay(base_delay, tries);
        tracing::warn!(
          attempt = tries + 1,
          max_retries,
          delay_ms = delay.as_millis() as u64,
          "{err}; retrying"
        );
        sleep_for(delay);
        tries += 1;
      }
      Err(err) => return Err(err),
    }
  }
}

/// Accepts a bare event slug or any start.gg URL that points inside an event.
pub fn event_slug_from_link(link: &str) -> Option<String> {
  let trimmed = link.trim();
  let without_hash = trimmed.split('#').next().unwrap_or(trimmed);
  let without_query = without_hash.split('?').next().unwrap_or(without_hash);
  let mut path = without_query;
  if let Some(idx) = path.find("start.gg") {
    path = &path[idx + "start.gg".len()..];
  }
  let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
  let tournament_idx = segments.iter().position(|s| *s == "tournament")?;
  let tournament_slug = segments.get(tournament_idx + 1)?;
  let event_idx = segments.iter().position(|s| *s == "event")?;
  let event_slug = segments.get(event_idx + 1)?;
  Some(format!("tournament/{tournament_slug}/event/{event_slug}"))
}

// ── Live client ────────────────────────────────────────────────────────

pub fn startgg_token_from_config(config: &AppConfig) -> Result<String, String> {
  let trimmed = config.startgg_token.trim();
  if !trimmed.is_empty() {
    return Ok(trimmed.to_string());
  }
  env_default("STARTGG_TOKEN")
    .ok_or_else(|| "Start.gg API token is not set (config.json or STARTGG_TOKEN).".to_string())
}

pub struct StartggClient {
  http: reqwest::blocking::Client,
  api_url: String,
  token: String,
  sets_per_page: i32,
  max_retries: u32,
  retry_base_delay: Duration,
}

impl StartggClient {
  pub fn from_config(config: &AppConfig) -> Result<Self, String> {
    let token = startgg_token_from_config(config)?;
    let http = reqwest::blocking::Client::builder()
      .user_agent(STARTGG_USER_AGENT)
      .build()
      .map_err(|e| format!("Start.gg client build failed: {e}"))?;
    Ok(Self {
      http,
      api_url: config.startgg_api_url.clone(),
      token,
      sets_per_page: config.sets_per_page,
      max_retries: config.max_retries,
      retry_base_delay: Duration::from_millis(config.retry_base_delay_ms),
    })
  }

  fn send_once(&self, body_json: &Value) -> Result<String, FetchError> {
    let resp = self
      .http
      .post(&self.api_url)
      .header("Authorization", format!("Bearer {}", self.token))
      .json(body_json)
      .send()
      .map_err(|e| FetchError::Transport(e.to_string()))?;
    let status = resp.status();
    let body = resp
      .text()
      .map_err(|e| FetchError::Transport(format!("read failed: {e}")))?;
    append_startgg_log("Start.gg response", &format!("status: {status}\nbody:\n{body}"));
    if !status.is_success() {
      return Err(FetchError::Status {
        status: status.as_u16(),
        body,
      });
    }
    Ok(body)
  }

  pub fn graphql_request<T: DeserializeOwned>(&self, query: &str, variables: Value) -> Result<T, FetchError> {
    let request_log = {
      let vars = serde_json::to_string_pretty(&variables).unwrap_or_else(|_| variables.to_string());
      format!(
        "url: {}\nAuthorization: Bearer [redacted]\nUser-Agent: {STARTGG_USER_AGENT}\nquery:\n{query}\nvariables:\n{vars}",
        self.api_url
      )
    };
    append_startgg_log("Start.gg request", &request_log);
    let body_json = json!({ "query": query, "variables": variables });

    let body = retry_with_backoff(
      self.max_retries,
      self.retry_base_delay,
      || {
        self.send_once(&body_json).inspect_err(|err| {
          append_startgg_log("Start.gg error", &err.to_string());
        })
      },
      sleep,
    )?;

    parse_graphql_body(&body).map_err(|err| {
      if !matches!(err, FetchError::PageCeiling) {
        append_startgg_log("Start.gg error", &err.to_string());
      }
      err
    })
  }
}

impl MatchSource for StartggClient {
  fn characters(&self, game: &str) -> Result<Option<Vec<Character>>, FetchError> {
    tracing::info!(game, "fetching character roster");
    let data: StartggVideogameData =
      self.graphql_request(STARTGG_CHARACTERS_QUERY, json!({ "slug": game }))?;
    let videogame = data.videogame.ok_or(FetchError::Missing("videogame"))?;
    Ok(Some(characters_from_nodes(videogame.characters.unwrap_or_default())))
  }

  fn event_page(&self, slug: &str, page: i32) -> Result<EventPage, FetchError> {
    let variables = json!({
      "slug": slug,
      "page": page,
      "perPage": self.sets_per_page,
      "filters": { "state": STARTGG_COMPLETED_STATE },
      "sortType": "RECENT",
    });
    let data: StartggEventSetsData = self.graphql_request(STARTGG_EVENT_SETS_QUERY, variables)?;
    let event = data.event.ok_or(FetchError::Missing("event"))?;
    Ok(event_page_from(event.sets, page))
  }
}

// ── File source ────────────────────────────────────────────────────────

/// Serves a saved sets payload as a single page. Accepts either a bare array
/// of set nodes or a whole GraphQL response; same for the roster file.
pub struct FileSource {
  sets_path: PathBuf,
  characters_path: Option<PathBuf>,
}

impl FileSource {
  pub fn new(sets_path: impl Into<PathBuf>, characters_path: Option<PathBuf>) -> Self {
    Self {
      sets_path: sets_path.into(),
      characters_path,
    }
  }
}

fn read_json_file(path: &Path) -> Result<Value, FetchError> {
  let file_err = |message: String| FetchError::File {
    path: path.display().to_string(),
    message,
  };
  let data = fs::read_to_string(path).map_err(|e| file_err(e.to_string()))?;
  serde_json::from_str(&data).map_err(|e| file_err(e.to_string()))
}

pub fn parse_set_nodes(value: Value) -> Result<Vec<StartggSetNode>, FetchError> {
  if value.is_array() {
    return serde_json::from_value(value).map_err(|e| FetchError::Parse(e.to_string()));
  }
  let parsed: StartggGraphqlResponse<StartggEventSetsData> =
    serde_json::from_value(value).map_err(|e| FetchError::Parse(e.to_string()))?;
  parsed
    .data
    .and_then(|data| data.event)
    .and_then(|event| event.sets)
    .and_then(|sets| sets.nodes)
    .ok_or(FetchError::Missing("event.sets.nodes"))
}

pub fn parse_roster(value: Value) -> Result<Vec<Character>, FetchError> {
  let nodes: Vec<StartggCharacterNode> = if value.is_array() {
    serde_json::from_value(value).map_err(|e| FetchError::Parse(e.to_string()))?
  } else {
    let parsed: StartggGraphqlResponse<StartggVideogameData> =
      serde_json::from_value(value).map_err(|e| FetchError::Parse(e.to_string()))?;
    parsed
      .data
      .and_then(|data| data.videogame)
      .and_then(|videogame| videogame.characters)
      .ok_or(FetchError::Missing("videogame.characters"))?
  };
  Ok(characters_from_nodes(nodes))
}

impl MatchSource for FileSource {
  fn characters(&self, game: &str) -> Result<Option<Vec<Character>>, FetchError> {
    let Some(path) = self.characters_path.as_ref() else {
      tracing::debug!(game, "no roster file given");
      return Ok(None);
    };
    parse_roster(read_json_file(path)?).map(Some)
  }

  fn event_page(&self, _slug: &str, page: i32) -> Result<EventPage, FetchError> {
    if page > 1 {
      return Ok(EventPage {
        nodes: Vec::new(),
        total_pages: 1,
      });
    }
    let nodes = parse_set_nodes(read_json_file(&self.sets_path)?)?;
    tracing::info!(path = %self.sets_path.display(), sets = nodes.len(), "loaded sets from file");
    Ok(EventPage { nodes, total_pages: 1 })
  }
}

use crate::types::*;
use chrono::Local;
use std::{
  env,
  fs,
  io::Write,
  path::{Path, PathBuf},
};

pub fn repo_root() -> PathBuf {
  PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

pub fn resolve_repo_path(raw: &str) -> PathBuf {
  let path = PathBuf::from(raw);
  if path.is_absolute() {
    path
  } else {
    repo_root().join(path)
  }
}

pub fn config_path() -> PathBuf {
  repo_root().join("config.json")
}

pub fn logs_dir() -> PathBuf {
  repo_root().join("logs")
}

pub fn env_default(key: &str) -> Option<String> {
  env::var(key)
    .ok()
    .map(|value| value.trim().to_string())
    .filter(|value| !value.is_empty())
}

fn first_env_default(keys: &[&str]) -> Option<String> {
  keys.iter().find_map(|key| env_default(key))
}

pub fn apply_env_defaults(mut config: AppConfig) -> AppConfig {
  if let Some(value) = env_default("START_GG_API_URL") {
    config.startgg_api_url = value;
  }
  if config.startgg_token.trim().is_empty() {
    if let Some(value) = first_env_default(&["STARTGG_TOKEN", "START_GG_API_KEY"]) {
      config.startgg_token = value;
    }
  }
  if let Some(value) = env_default("UPSET_GAME_TITLE") {
    config.game_title = value;
  }
  if let Some(value) = env_default("UPSET_STORE_PATH") {
    config.store_path = value;
  }
  config
}

pub fn load_config_inner() -> Result<AppConfig, String> {
  load_config_from(&config_path())
}

pub fn load_config_from(path: &Path) -> Result<AppConfig, String> {
  if !path.is_file() {
    return Ok(apply_env_defaults(AppConfig::default()));
  }
  let data = fs::read_to_string(path).map_err(|e| format!("read config {}: {e}", path.display()))?;
  let config =
    serde_json::from_str::<AppConfig>(&data).map_err(|e| format!("parse config {}: {e}", path.display()))?;
  Ok(apply_env_defaults(config))
}

pub fn load_env_file() {
  let env_path = repo_root().join(".env");
  if !env_path.is_file() {
    return;
  }
  let contents = match fs::read_to_string(&env_path) {
    Ok(data) => data,
    Err(_) => return,
  };
  for line in contents.lines() {
    if let Some((key, value)) = parse_env_line(line) {
      if env::var_os(&key).is_none() {
        env::set_var(key, value);
      }
    }
  }
}

pub fn parse_env_line(line: &str) -> Option<(String, String)> {
  let trimmed = line.trim();
  if trimmed.is_empty() || trimmed.starts_with('#') {
    return None;
  }
  let trimmed = trimmed.strip_prefix("export ").unwrap_or(trimmed);
  let (key, raw_value) = trimmed.split_once('=')?;
  let key = key.trim();
  if key.is_empty() {
    return None;
  }
  let mut value = raw_value.trim();
  if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
    value = &value[1..value.len() - 1];
  } else if value.len() >= 2 && value.starts_with('\'') && value.ends_with('\'') {
    value = &value[1..value.len() - 1];
  } else if let Some(idx) = value.find('#') {
    value = value[..idx].trim_end();
  }
  Some((key.to_string(), value.to_string()))
}

pub fn startgg_log_path() -> PathBuf {
  logs_dir().join("startgg_api.log")
}

/// Raw request/response journal, kept apart from the tracing log.
pub fn append_startgg_log(label: &str, payload: &str) {
  let dir = logs_dir();
  if fs::create_dir_all(&dir).is_err() {
    return;
  }
  let path = startgg_log_path();
  let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
  let entry = format!("[{timestamp}] {label}\n{payload}\n\n");
  if let Ok(mut file) = fs::OpenOptions::new().create(true).append(true).open(&path) {
    let _ = file.write_all(entry.as_bytes());
  }
}

pub fn log_env_warnings(config: &AppConfig) {
  if config.startgg_token.trim().is_empty() {
    tracing::warn!("STARTGG_TOKEN not set and no token in config; live Start.gg fetches will fail");
  }
}

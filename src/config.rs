//! Runtime settings assembled from the command line.

use std::path::PathBuf;

pub const API_BASE: &str = "https://pokeapi.co/api/v2";
/// Catalog sizes offered by `-` / `+`.
pub const BATCH_SIZES: [u32; 4] = [20, 50, 100, 151];
pub const DEFAULT_BATCH_SIZE: u32 = 50;
pub const FETCH_CONCURRENCY: usize = 12;

#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    pub api_base: String,
    pub use_cache: bool,
    pub log_file: Option<PathBuf>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            api_base: API_BASE.to_string(),
            use_cache: true,
            log_file: None,
        }
    }
}

impl RuntimeConfig {
    pub fn list_url(&self, limit: u32) -> String {
        format!(
            "{}/pokemon?limit={limit}&offset=0",
            self.api_base.trim_end_matches('/')
        )
    }
}

/// clap value parser for `--limit`: only the offered batch sizes are accepted.
pub fn parse_batch_size(raw: &str) -> Result<u32, String> {
    let value: u32 = raw
        .trim()
        .parse()
        .map_err(|_| format!("`{raw}` is not a number"))?;
    if BATCH_SIZES.contains(&value) {
        Ok(value)
    } else {
        Err(format!("batch size must be one of {BATCH_SIZES:?}"))
    }
}

/// Next offered size in `direction`, clamped at both ends.
pub fn step_batch_size(current: u32, direction: i8) -> u32 {
    let index = BATCH_SIZES
        .iter()
        .position(|size| *size == current)
        .unwrap_or(1);
    let next = if direction < 0 {
        index.saturating_sub(1)
    } else {
        (index + 1).min(BATCH_SIZES.len() - 1)
    };
    BATCH_SIZES[next]
}

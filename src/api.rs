use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tokio::fs;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::config::{RuntimeConfig, FETCH_CONCURRENCY};
use crate::entity::Entity;
use crate::error::ApiError;
use crate::mapper::{map_creature, NamedResource, RawCreature};
use crate::sprite::{decode_sprite, SpriteImage};

#[derive(Clone, Debug, Deserialize)]
struct ListResponse {
    results: Vec<NamedResource>,
}

/// Lists the first `limit` creatures, then fetches every detail record.
///
/// All-or-nothing: the first failed detail aborts the rest of the batch.
pub async fn fetch_catalog(config: &RuntimeConfig, limit: u32) -> Result<Vec<Entity>, ApiError> {
    let list_url = config.list_url(limit);
    tracing::info!(url = %list_url, "fetching catalog list");
    let list: ListResponse = fetch_json_cached(&list_url, config.use_cache).await?;

    let semaphore = Arc::new(Semaphore::new(FETCH_CONCURRENCY));
    let mut join_set = JoinSet::new();
    for entry in list.results {
        let semaphore = semaphore.clone();
        let use_cache = config.use_cache;
        join_set.spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .map_err(|_| ApiError::Task("detail semaphore closed".to_string()))?;
            let raw: RawCreature = fetch_json_cached(&entry.url, use_cache).await?;
            Ok::<Entity, ApiError>(map_creature(raw))
        });
    }

    let mut entities = Vec::with_capacity(join_set.len());
    while let Some(result) = join_set.join_next().await {
        let outcome = result
            .map_err(|err| ApiError::Task(err.to_string()))
            .and_then(|entity| entity);
        match outcome {
            Ok(entity) => entities.push(entity),
            Err(err) => {
                tracing::warn!(error = %err, "detail fetch failed, aborting batch");
                join_set.abort_all();
                return Err(err);
            }
        }
    }

    entities.sort_by_key(|entity| entity.id);
    tracing::info!(count = entities.len(), "catalog fetched");
    Ok(entities)
}

/// Downloads and decodes one artwork image for a battle slot.
pub async fn fetch_sprite(url: &str, use_cache: bool) -> Result<SpriteImage, ApiError> {
    let bytes = fetch_bytes_cached(url, use_cache).await?;
    match decode_sprite(&bytes) {
        Ok(sprite) => Ok(sprite),
        Err(err) => {
            if use_cache {
                let _ = fs::remove_file(cache_path("http", url)).await;
            }
            Err(err.into())
        }
    }
}

async fn fetch_json_cached<T: DeserializeOwned>(url: &str, use_cache: bool) -> Result<T, ApiError> {
    let bytes = fetch_bytes_cached(url, use_cache).await?;
    let decoded = decode_json(&bytes);
    if decoded.is_err() && use_cache {
        let _ = fs::remove_file(cache_path("http", url)).await;
    }
    decoded
}

fn decode_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ApiError> {
    Ok(serde_json::from_slice(bytes)?)
}

fn ensure_success(url: &str, status: StatusCode) -> Result<(), ApiError> {
    if status.is_success() {
        return Ok(());
    }
    Err(ApiError::Status {
        url: url.to_string(),
        status,
    })
}

async fn fetch_bytes_cached(url: &str, use_cache: bool) -> Result<Vec<u8>, ApiError> {
    let cache_path = cache_path("http", url);
    if use_cache {
        if let Some(bytes) = read_cache(&cache_path).await {
            tracing::debug!(url, "cache hit");
            return Ok(bytes);
        }
    }

    let response = http_client().get(url).send().await?;
    ensure_success(url, response.status())?;
    let bytes = response.bytes().await?.to_vec();
    if use_cache {
        write_cache(&cache_path, &bytes).await;
    }
    Ok(bytes)
}

fn http_client() -> &'static reqwest::Client {
    static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
    CLIENT.get_or_init(reqwest::Client::new)
}

fn cache_root() -> PathBuf {
    let base = std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."));
    base.join(".cache").join("pokebattle")
}

fn cache_path(kind: &str, url: &str) -> PathBuf {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    let digest = hex::encode(hasher.finalize());
    cache_root().join(kind).join(digest)
}

async fn read_cache(path: &Path) -> Option<Vec<u8>> {
    fs::read(path).await.ok()
}

async fn write_cache(path: &Path, bytes: &[u8]) {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent).await;
    }
    if let Err(err) = fs::write(path, bytes).await {
        tracing::debug!(path = %path.display(), error = %err, "cache write failed");
    }
}

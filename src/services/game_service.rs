//! Game catalog store.

use std::{
    sync::Arc,
    time::{Duration, SystemTime},
};

use tokio::{sync::RwLock, time::sleep};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::{
        kv::KvBackend,
        models::{GameEntity, Platform},
        storage::{StorageError, StorageResult},
    },
    dto::game::{CreateGameInput, GameSummary, UpdateGameInput},
    error::{ServiceError, ServiceResult},
};

/// Key under which the catalog collection is persisted.
const GAMES_KEY: &str = "bh_games";

/// Catalog store over the persisted game collection.
///
/// Every mutation rewrites the full collection to its key before the
/// simulated latency resolves.
pub struct GameStore {
    backend: Arc<dyn KvBackend>,
    games: RwLock<Vec<GameEntity>>,
    latency: Duration,
}

impl GameStore {
    /// Load the persisted catalog, installing the seed when it is absent,
    /// empty, or unreadable.
    pub async fn open(backend: Arc<dyn KvBackend>, latency: Duration) -> ServiceResult<Self> {
        let games = match load_collection(&backend).await? {
            Some(list) => list,
            None => {
                let seed = seed_games();
                persist_collection(&backend, &seed).await?;
                info!(count = seed.len(), "installed catalog seed");
                seed
            }
        };

        Ok(Self {
            backend,
            games: RwLock::new(games),
            latency,
        })
    }

    /// The full current catalog.
    pub async fn list(&self) -> ServiceResult<Vec<GameSummary>> {
        let summaries = {
            let guard = self.games.read().await;
            guard.iter().map(GameSummary::from).collect()
        };
        self.simulate_latency().await;
        Ok(summaries)
    }

    /// Fetch a single catalog entry by id.
    pub async fn find(&self, id: Uuid) -> ServiceResult<GameSummary> {
        let summary = {
            let guard = self.games.read().await;
            guard
                .iter()
                .find(|game| game.id == id)
                .map(GameSummary::from)
                .ok_or_else(|| ServiceError::NotFound(format!("game `{id}` not found")))?
        };
        self.simulate_latency().await;
        Ok(summary)
    }

    /// Append a new catalog entry with a freshly generated identifier.
    pub async fn create(&self, input: CreateGameInput) -> ServiceResult<GameSummary> {
        input.validate()?;

        let title = input.title.trim().to_owned();
        if title.is_empty() {
            return Err(ServiceError::InvalidInput("title must not be empty".into()));
        }
        let genre = input.genre.trim().to_owned();
        if genre.is_empty() {
            return Err(ServiceError::InvalidInput("genre must not be empty".into()));
        }

        let now = SystemTime::now();
        let entity = GameEntity {
            id: Uuid::new_v4(),
            title,
            platform: input.platform,
            genre,
            description: input.description,
            price: input.price,
            released_at: input.released_at,
            created_at: now,
            updated_at: now,
        };

        let summary = {
            let mut guard = self.games.write().await;
            let summary = GameSummary::from(&entity);
            guard.push(entity);
            persist_collection(&self.backend, &guard).await?;
            summary
        };

        info!(game = %summary.id, title = %summary.title, "created catalog entry");
        self.simulate_latency().await;
        Ok(summary)
    }

    /// Merge the supplied fields into the matching entry.
    ///
    /// Omitted fields keep their current value; the doubly wrapped optional
    /// fields can also be cleared explicitly.
    pub async fn update(&self, id: Uuid, patch: UpdateGameInput) -> ServiceResult<GameSummary> {
        patch.validate()?;

        let summary = {
            let mut guard = self.games.write().await;
            let entity = guard
                .iter_mut()
                .find(|game| game.id == id)
                .ok_or_else(|| ServiceError::NotFound(format!("game `{id}` not found")))?;

            // Trim and reject blanks before touching the entity so a failed
            // update leaves the record untouched.
            let title = patch.title.map(|title| title.trim().to_owned());
            if title.as_deref() == Some("") {
                return Err(ServiceError::InvalidInput("title must not be empty".into()));
            }
            let genre = patch.genre.map(|genre| genre.trim().to_owned());
            if genre.as_deref() == Some("") {
                return Err(ServiceError::InvalidInput("genre must not be empty".into()));
            }

            if let Some(title) = title {
                entity.title = title;
            }
            if let Some(platform) = patch.platform {
                entity.platform = platform;
            }
            if let Some(genre) = genre {
                entity.genre = genre;
            }
            if let Some(description) = patch.description {
                entity.description = description;
            }
            if let Some(price) = patch.price {
                entity.price = price;
            }
            if let Some(released_at) = patch.released_at {
                entity.released_at = released_at;
            }
            entity.updated_at = SystemTime::now();

            let summary = GameSummary::from(&*entity);
            persist_collection(&self.backend, &guard).await?;
            summary
        };

        self.simulate_latency().await;
        Ok(summary)
    }

    /// Remove the matching entry from the catalog.
    pub async fn delete(&self, id: Uuid) -> ServiceResult<()> {
        {
            let mut guard = self.games.write().await;
            let before = guard.len();
            guard.retain(|game| game.id != id);
            if guard.len() == before {
                return Err(ServiceError::NotFound(format!("game `{id}` not found")));
            }
            persist_collection(&self.backend, &guard).await?;
        }

        info!(game = %id, "deleted catalog entry");
        self.simulate_latency().await;
        Ok(())
    }

    /// Replace the catalog with the built-in seed and persist it.
    pub async fn reset_seed(&self) -> ServiceResult<Vec<GameSummary>> {
        let summaries = {
            let mut guard = self.games.write().await;
            *guard = seed_games();
            persist_collection(&self.backend, &guard).await?;
            guard.iter().map(GameSummary::from).collect()
        };

        info!("catalog reset to seed");
        self.simulate_latency().await;
        Ok(summaries)
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            sleep(self.latency).await;
        }
    }
}

async fn load_collection(backend: &Arc<dyn KvBackend>) -> StorageResult<Option<Vec<GameEntity>>> {
    let Some(value) = backend.get(GAMES_KEY).await? else {
        return Ok(None);
    };
    match serde_json::from_value::<Vec<GameEntity>>(value) {
        Ok(list) if !list.is_empty() => Ok(Some(list)),
        Ok(_) => Ok(None),
        Err(err) => {
            warn!(error = %err, "persisted catalog unreadable; reinstalling seed");
            Ok(None)
        }
    }
}

async fn persist_collection(
    backend: &Arc<dyn KvBackend>,
    games: &[GameEntity],
) -> StorageResult<()> {
    let value =
        serde_json::to_value(games).map_err(|source| StorageError::encode(GAMES_KEY, source))?;
    backend.put(GAMES_KEY, value).await
}

/// Catalog installed when no persisted collection exists.
fn seed_games() -> Vec<GameEntity> {
    let now = SystemTime::now();
    let entry = |title: &str,
                 platform: Platform,
                 genre: &str,
                 description: &str,
                 price: f64,
                 released_at: &str| GameEntity {
        id: Uuid::new_v4(),
        title: title.into(),
        platform,
        genre: genre.into(),
        description: Some(description.into()),
        price: Some(price),
        released_at: Some(released_at.into()),
        created_at: now,
        updated_at: now,
    };

    vec![
        entry(
            "Elden Ring",
            Platform::Pc,
            "Action RPG",
            "Open-world action RPG set in a mysterious shattered realm.",
            59.99,
            "2022-02-25",
        ),
        entry(
            "Spider-Man 2",
            Platform::PlayStation,
            "Action / Adventure",
            "Superhero adventure packed with action.",
            69.99,
            "2023-10-20",
        ),
        entry(
            "Forza Horizon 5",
            Platform::Xbox,
            "Racing",
            "Open-world racing with hundreds of cars.",
            49.99,
            "2021-11-09",
        ),
        entry(
            "Zelda: Tears of the Kingdom",
            Platform::Switch,
            "Action / Adventure",
            "An epic of exploration and creativity.",
            69.99,
            "2023-05-12",
        ),
        entry(
            "Baldur's Gate 3",
            Platform::Pc,
            "RPG",
            "Deep CRPG where choices carry consequences.",
            59.99,
            "2023-08-03",
        ),
    ]
}

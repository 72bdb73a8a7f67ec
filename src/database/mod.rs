// ABOUTME: Storage abstraction for activities, weekly snapshots, and athlete preferences
// ABOUTME: Async traits with SQLite (sqlx) and in-memory implementations injected as Arc<dyn Trait>

//! # Storage
//!
//! Services depend on the traits below, never on a concrete backend. Every
//! upsert is atomic at the store: `SqliteStore` relies on
//! `ON CONFLICT ... DO UPDATE`, `InMemoryStore` on a `tokio::sync::RwLock`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use ridelog_core::errors::DatabaseError;
use ridelog_core::models::{Activity, AthletePreferences, FitnessSnapshot, Provider};
use tracing::info;
use uuid::Uuid;

use crate::config::DatabaseUrl;

/// In-memory store for tests and the CLI's `sqlite::memory:` mode
pub mod memory;
/// `SQLite` store via sqlx
pub mod sqlite;

pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;

/// Store result alias
pub type StoreResult<T> = Result<T, DatabaseError>;

/// Filter for activity listings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityQuery {
    /// Owner
    pub athlete_id: Uuid,
    /// Inclusive lower bound on start time
    pub start: Option<DateTime<Utc>>,
    /// Exclusive upper bound on start time
    pub end: Option<DateTime<Utc>>,
    /// Return hidden activities too
    pub include_hidden: bool,
    /// Return records linked to a canonical activity via `duplicate_of`
    pub include_duplicates: bool,
}

impl ActivityQuery {
    /// Visible canonical activities for an athlete, any date
    #[must_use]
    pub const fn for_athlete(athlete_id: Uuid) -> Self {
        Self {
            athlete_id,
            start: None,
            end: None,
            include_hidden: false,
            include_duplicates: false,
        }
    }

    /// Restrict to `[start, end)`
    #[must_use]
    pub const fn between(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    /// Include hidden activities
    #[must_use]
    pub const fn include_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    /// Include duplicate records
    #[must_use]
    pub const fn include_duplicates(mut self, include: bool) -> Self {
        self.include_duplicates = include;
        self
    }

    /// Whether an activity passes the filter
    #[must_use]
    pub fn matches(&self, activity: &Activity) -> bool {
        activity.athlete_id == self.athlete_id
            && self.start.is_none_or(|start| activity.start_date >= start)
            && self.end.is_none_or(|end| activity.start_date < end)
            && (self.include_hidden || !activity.hidden)
            && (self.include_duplicates || activity.is_canonical())
    }
}

/// Activity persistence
#[async_trait]
pub trait ActivityStore: Send + Sync {
    /// Insert or replace an activity by id
    async fn upsert_activity(&self, activity: &Activity) -> StoreResult<()>;

    /// Activity by id
    async fn get_activity(&self, id: Uuid) -> StoreResult<Option<Activity>>;

    /// Activities passing `query`, ordered by start time ascending
    async fn query_activities(&self, query: &ActivityQuery) -> StoreResult<Vec<Activity>>;

    /// Record currently carrying a provider identity, hidden and linked ones included
    ///
    /// A canonical record wins over a linked duplicate with the same identity.
    async fn find_by_provider_id(
        &self,
        athlete_id: Uuid,
        provider: &Provider,
        provider_activity_id: &str,
    ) -> StoreResult<Option<Activity>>;

    /// Start time of the athlete's earliest visible canonical activity
    async fn earliest_activity_date(&self, athlete_id: Uuid)
        -> StoreResult<Option<DateTime<Utc>>>;
}

/// Weekly snapshot persistence keyed by (athlete, week start)
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Create or overwrite the snapshot for its (athlete, week start)
    async fn upsert_snapshot(&self, snapshot: &FitnessSnapshot) -> StoreResult<()>;

    /// Snapshot for one week
    async fn get_snapshot(
        &self,
        athlete_id: Uuid,
        week_start: NaiveDate,
    ) -> StoreResult<Option<FitnessSnapshot>>;

    /// Most recent snapshots first, at most `limit`
    async fn list_snapshots(
        &self,
        athlete_id: Uuid,
        limit: Option<u32>,
    ) -> StoreResult<Vec<FitnessSnapshot>>;
}

/// Athlete preference persistence
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Preferences for an athlete, `None` when never stored
    async fn get_preferences(&self, athlete_id: Uuid) -> StoreResult<Option<AthletePreferences>>;

    /// Create or overwrite an athlete's preferences
    async fn upsert_preferences(
        &self,
        athlete_id: Uuid,
        preferences: &AthletePreferences,
    ) -> StoreResult<()>;
}

/// One backend exposed through all three store traits
#[derive(Clone)]
pub struct Stores {
    /// Activity persistence
    pub activities: Arc<dyn ActivityStore>,
    /// Snapshot persistence
    pub snapshots: Arc<dyn SnapshotStore>,
    /// Preference persistence
    pub preferences: Arc<dyn PreferenceStore>,
}

impl Stores {
    /// Share a single backend across the three traits
    #[must_use]
    pub fn from_backend<S>(store: S) -> Self
    where
        S: ActivityStore + SnapshotStore + PreferenceStore + 'static,
    {
        let store = Arc::new(store);
        Self {
            activities: store.clone(),
            snapshots: store.clone(),
            preferences: store,
        }
    }

    /// Select the backend from a database URL
    ///
    /// `sqlite::memory:` gets the in-memory store; a path gets `SQLite`.
    ///
    /// # Errors
    ///
    /// Returns an error if the `SQLite` database cannot be opened or migrated
    pub async fn connect(url: &DatabaseUrl) -> StoreResult<Self> {
        if url.is_memory() {
            info!("Using in-memory store");
            return Ok(Self::from_backend(InMemoryStore::new()));
        }
        Ok(Self::from_backend(SqliteStore::connect(url).await?))
    }
}

// ABOUTME: In-memory implementation of the activity, snapshot, and preference stores
// ABOUTME: HashMaps behind tokio RwLocks; used by tests and ephemeral CLI runs

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use ridelog_core::models::{Activity, AthletePreferences, FitnessSnapshot, Provider};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ActivityQuery, ActivityStore, PreferenceStore, SnapshotStore, StoreResult};

/// Volatile store; all data is lost on drop
#[derive(Debug, Default)]
pub struct InMemoryStore {
    activities: RwLock<HashMap<Uuid, Activity>>,
    snapshots: RwLock<HashMap<(Uuid, NaiveDate), FitnessSnapshot>>,
    preferences: RwLock<HashMap<Uuid, AthletePreferences>>,
}

impl InMemoryStore {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ActivityStore for InMemoryStore {
    async fn upsert_activity(&self, activity: &Activity) -> StoreResult<()> {
        // Streams are transient and never stored
        let mut stored = activity.clone();
        stored.streams = None;
        self.activities.write().await.insert(stored.id, stored);
        Ok(())
    }

    async fn get_activity(&self, id: Uuid) -> StoreResult<Option<Activity>> {
        Ok(self.activities.read().await.get(&id).cloned())
    }

    async fn query_activities(&self, query: &ActivityQuery) -> StoreResult<Vec<Activity>> {
        let mut matching: Vec<Activity> = self
            .activities
            .read()
            .await
            .values()
            .filter(|activity| query.matches(activity))
            .cloned()
            .collect();
        matching.sort_by_key(|activity| (activity.start_date, activity.id));
        Ok(matching)
    }

    async fn find_by_provider_id(
        &self,
        athlete_id: Uuid,
        provider: &Provider,
        provider_activity_id: &str,
    ) -> StoreResult<Option<Activity>> {
        Ok(self
            .activities
            .read()
            .await
            .values()
            .filter(|activity| {
                activity.athlete_id == athlete_id
                    && activity.is_same_report(provider, provider_activity_id)
            })
            .min_by_key(|activity| (!activity.is_canonical(), activity.start_date, activity.id))
            .cloned())
    }

    async fn earliest_activity_date(
        &self,
        athlete_id: Uuid,
    ) -> StoreResult<Option<DateTime<Utc>>> {
        let query = ActivityQuery::for_athlete(athlete_id);
        Ok(self
            .activities
            .read()
            .await
            .values()
            .filter(|activity| query.matches(activity))
            .map(|activity| activity.start_date)
            .min())
    }
}

#[async_trait]
impl SnapshotStore for InMemoryStore {
    async fn upsert_snapshot(&self, snapshot: &FitnessSnapshot) -> StoreResult<()> {
        self.snapshots
            .write()
            .await
            .insert((snapshot.athlete_id, snapshot.week_start), snapshot.clone());
        Ok(())
    }

    async fn get_snapshot(
        &self,
        athlete_id: Uuid,
        week_start: NaiveDate,
    ) -> StoreResult<Option<FitnessSnapshot>> {
        Ok(self
            .snapshots
            .read()
            .await
            .get(&(athlete_id, week_start))
            .cloned())
    }

    async fn list_snapshots(
        &self,
        athlete_id: Uuid,
        limit: Option<u32>,
    ) -> StoreResult<Vec<FitnessSnapshot>> {
        let mut snapshots: Vec<FitnessSnapshot> = self
            .snapshots
            .read()
            .await
            .values()
            .filter(|snapshot| snapshot.athlete_id == athlete_id)
            .cloned()
            .collect();
        snapshots.sort_by(|a, b| b.week_start.cmp(&a.week_start));
        if let Some(limit) = limit {
            snapshots.truncate(limit as usize);
        }
        Ok(snapshots)
    }
}

#[async_trait]
impl PreferenceStore for InMemoryStore {
    async fn get_preferences(&self, athlete_id: Uuid) -> StoreResult<Option<AthletePreferences>> {
        Ok(self.preferences.read().await.get(&athlete_id).cloned())
    }

    async fn upsert_preferences(
        &self,
        athlete_id: Uuid,
        preferences: &AthletePreferences,
    ) -> StoreResult<()> {
        self.preferences
            .write()
            .await
            .insert(athlete_id, preferences.clone());
        Ok(())
    }
}

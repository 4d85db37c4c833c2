// ABOUTME: SQLite storage backend using sqlx with one transaction per adaptation commit
// ABOUTME: Plans are split into a header row and per-week JSON rows; a partial unique index keeps one active plan per user
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use pierre_training_core::errors::StorageError;
use pierre_training_core::models::{
    ActiveRestriction, PlanAdaptation, PlanStatus, TrainingPlan, TrainingWeek, UserProfile,
    WeeklyAvailability,
};

use super::{AdaptationRepository, PlanCommit, PlanRepository, ProfileRepository};

/// Plan fields stored in the header row; weeks live in `training_weeks`
#[derive(Debug, Serialize, Deserialize)]
struct PlanHeader {
    id: Uuid,
    user_id: Uuid,
    total_weeks: u32,
    current_week: u32,
    start_date: NaiveDate,
    end_date: NaiveDate,
    seed: u64,
    availability: WeeklyAvailability,
    restrictions: Vec<ActiveRestriction>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PlanHeader {
    fn of(plan: &TrainingPlan) -> Self {
        Self {
            id: plan.id,
            user_id: plan.user_id,
            total_weeks: plan.total_weeks,
            current_week: plan.current_week,
            start_date: plan.start_date,
            end_date: plan.end_date,
            seed: plan.seed,
            availability: plan.availability,
            restrictions: plan.restrictions.clone(),
            created_at: plan.created_at,
            updated_at: plan.updated_at,
        }
    }

    fn into_plan(self, status: PlanStatus, version: u64, weeks: Vec<TrainingWeek>) -> TrainingPlan {
        TrainingPlan {
            id: self.id,
            user_id: self.user_id,
            status,
            total_weeks: self.total_weeks,
            current_week: self.current_week,
            start_date: self.start_date,
            end_date: self.end_date,
            version,
            seed: self.seed,
            availability: self.availability,
            restrictions: self.restrictions,
            weeks,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

fn backend(context: &str, e: impl std::fmt::Display) -> StorageError {
    StorageError::Backend(format!("{context}: {e}"))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, StorageError> {
    serde_json::to_string(value).map_err(|e| backend("serialization failed", e))
}

fn from_json<T: for<'de> Deserialize<'de>>(raw: &str) -> Result<T, StorageError> {
    serde_json::from_str(raw).map_err(|e| backend("deserialization failed", e))
}

fn version_param(version: u64) -> Result<i64, StorageError> {
    i64::try_from(version).map_err(|e| backend("version out of range", e))
}

fn parse_status(raw: &str) -> Result<PlanStatus, StorageError> {
    match raw {
        "active" => Ok(PlanStatus::Active),
        "completed" => Ok(PlanStatus::Completed),
        "abandoned" => Ok(PlanStatus::Abandoned),
        "paused" => Ok(PlanStatus::Paused),
        other => Err(StorageError::Backend(format!("unknown plan status '{other}'"))),
    }
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// SQLite-backed store
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connect and run migrations
    ///
    /// `sqlite::memory:` databases use a single connection so every query sees
    /// the same database.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Backend` if the connection or a migration fails.
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| backend("invalid database url", e))?
            .create_if_missing(true)
            .foreign_keys(true);
        let max_connections = if database_url.contains(":memory:") {
            1
        } else {
            5
        };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| backend("failed to connect", e))?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Underlying pool
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create tables and indexes if they do not exist
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Backend` if a statement fails.
    pub async fn migrate(&self) -> Result<(), StorageError> {
        let statements = [
            r"
            CREATE TABLE IF NOT EXISTS profiles (
                user_id TEXT PRIMARY KEY,
                profile_data TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS training_plans (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                status TEXT NOT NULL CHECK (status IN ('active', 'completed', 'abandoned', 'paused')),
                version INTEGER NOT NULL,
                header_data TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
            r"
            CREATE UNIQUE INDEX IF NOT EXISTS idx_training_plans_one_active
            ON training_plans(user_id) WHERE status = 'active'
            ",
            r"
            CREATE TABLE IF NOT EXISTS training_weeks (
                plan_id TEXT NOT NULL REFERENCES training_plans(id) ON DELETE CASCADE,
                week_number INTEGER NOT NULL,
                week_data TEXT NOT NULL,
                PRIMARY KEY (plan_id, week_number)
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS plan_adaptations (
                id TEXT PRIMARY KEY,
                plan_id TEXT NOT NULL REFERENCES training_plans(id) ON DELETE CASCADE,
                trigger_kind TEXT NOT NULL,
                adaptation_type TEXT NOT NULL,
                applied_at TEXT NOT NULL,
                description TEXT NOT NULL,
                record_data TEXT NOT NULL
            )
            ",
            r"
            CREATE INDEX IF NOT EXISTS idx_plan_adaptations_plan
            ON plan_adaptations(plan_id, applied_at)
            ",
        ];
        for statement in statements {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| backend("migration failed", e))?;
        }
        Ok(())
    }

    async fn load_weeks(&self, plan_id: Uuid) -> Result<Vec<TrainingWeek>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT week_data FROM training_weeks
            WHERE plan_id = $1
            ORDER BY week_number
            ",
        )
        .bind(plan_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| backend("failed to load weeks", e))?;

        rows.iter()
            .map(|row| {
                let raw: String = row
                    .try_get("week_data")
                    .map_err(|e| backend("failed to read week", e))?;
                from_json(&raw)
            })
            .collect()
    }

    async fn plan_from_row(
        &self,
        row: &sqlx::sqlite::SqliteRow,
    ) -> Result<TrainingPlan, StorageError> {
        let header_raw: String = row
            .try_get("header_data")
            .map_err(|e| backend("failed to read plan", e))?;
        let status_raw: String = row
            .try_get("status")
            .map_err(|e| backend("failed to read plan", e))?;
        let version: i64 = row
            .try_get("version")
            .map_err(|e| backend("failed to read plan", e))?;

        let header: PlanHeader = from_json(&header_raw)?;
        let weeks = self.load_weeks(header.id).await?;
        let version = u64::try_from(version).map_err(|e| backend("negative plan version", e))?;
        Ok(header.into_plan(parse_status(&status_raw)?, version, weeks))
    }
}

#[async_trait]
impl PlanRepository for SqliteStore {
    async fn insert_plan(&self, plan: &TrainingPlan) -> Result<(), StorageError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| backend("failed to begin transaction", e))?;

        let existing = sqlx::query("SELECT 1 FROM training_plans WHERE id = $1")
            .bind(plan.id.to_string())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| backend("failed to check plan id", e))?;
        if existing.is_some() {
            return Err(StorageError::DuplicatePlan { plan_id: plan.id });
        }

        sqlx::query(
            r"
            INSERT INTO training_plans (id, user_id, status, version, header_data, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(plan.id.to_string())
        .bind(plan.user_id.to_string())
        .bind(plan.status.as_str())
        .bind(version_param(plan.version)?)
        .bind(to_json(&PlanHeader::of(plan))?)
        .bind(plan.created_at.to_rfc3339())
        .bind(plan.updated_at.to_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StorageError::ActivePlanExists {
                    user_id: plan.user_id,
                }
            } else {
                backend("failed to insert plan", e)
            }
        })?;

        for week in &plan.weeks {
            sqlx::query(
                r"
                INSERT INTO training_weeks (plan_id, week_number, week_data)
                VALUES ($1, $2, $3)
                ",
            )
            .bind(plan.id.to_string())
            .bind(i64::from(week.week_number))
            .bind(to_json(week)?)
            .execute(&mut *tx)
            .await
            .map_err(|e| backend("failed to insert week", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| backend("failed to commit plan", e))?;
        debug!(plan_id = %plan.id, weeks = plan.weeks.len(), "plan stored");
        Ok(())
    }

    async fn get_plan_with_details(&self, plan_id: Uuid) -> Result<TrainingPlan, StorageError> {
        let row = sqlx::query(
            r"
            SELECT status, version, header_data FROM training_plans
            WHERE id = $1
            ",
        )
        .bind(plan_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| backend("failed to load plan", e))?
        .ok_or(StorageError::PlanNotFound { plan_id })?;

        self.plan_from_row(&row).await
    }

    async fn active_plan_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<TrainingPlan>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT status, version, header_data FROM training_plans
            WHERE user_id = $1 AND status = 'active'
            ",
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| backend("failed to load active plan", e))?;

        match row {
            Some(row) => Ok(Some(self.plan_from_row(&row).await?)),
            None => Ok(None),
        }
    }

    async fn commit_adaptation(&self, commit: &PlanCommit) -> Result<u64, StorageError> {
        let plan = commit.committed_plan();
        let plan_id = plan.id.to_string();

        // Dropping the transaction on any early return rolls it back.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| backend("failed to begin transaction", e))?;

        let updated = sqlx::query(
            r"
            UPDATE training_plans
            SET version = $1, status = $2, header_data = $3, updated_at = $4
            WHERE id = $5 AND version = $6
            ",
        )
        .bind(version_param(plan.version)?)
        .bind(plan.status.as_str())
        .bind(to_json(&PlanHeader::of(&plan))?)
        .bind(plan.updated_at.to_rfc3339())
        .bind(&plan_id)
        .bind(version_param(commit.expected_version)?)
        .execute(&mut *tx)
        .await
        .map_err(|e| backend("failed to update plan", e))?;

        if updated.rows_affected() == 0 {
            let exists = sqlx::query("SELECT 1 FROM training_plans WHERE id = $1")
                .bind(&plan_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| backend("failed to check plan", e))?
                .is_some();
            return Err(if exists {
                StorageError::ConcurrentConflict {
                    plan_id: plan.id,
                    expected_version: commit.expected_version,
                }
            } else {
                StorageError::PlanNotFound { plan_id: plan.id }
            });
        }

        for week_number in &commit.changed_weeks {
            let week = plan
                .weeks
                .iter()
                .find(|week| week.week_number == *week_number)
                .ok_or_else(|| {
                    StorageError::Backend(format!(
                        "changed week {week_number} is not part of plan {plan_id}"
                    ))
                })?;
            sqlx::query(
                r"
                INSERT INTO training_weeks (plan_id, week_number, week_data)
                VALUES ($1, $2, $3)
                ON CONFLICT (plan_id, week_number) DO UPDATE SET week_data = excluded.week_data
                ",
            )
            .bind(&plan_id)
            .bind(i64::from(*week_number))
            .bind(to_json(week)?)
            .execute(&mut *tx)
            .await
            .map_err(|e| backend("failed to save week", e))?;
        }

        for week_number in &commit.removed_weeks {
            sqlx::query("DELETE FROM training_weeks WHERE plan_id = $1 AND week_number = $2")
                .bind(&plan_id)
                .bind(i64::from(*week_number))
                .execute(&mut *tx)
                .await
                .map_err(|e| backend("failed to remove week", e))?;
        }

        if let Some(adaptation) = &commit.adaptation {
            sqlx::query(
                r"
                INSERT INTO plan_adaptations (id, plan_id, trigger_kind, adaptation_type, applied_at, description, record_data)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ",
            )
            .bind(adaptation.id.to_string())
            .bind(adaptation.plan_id.to_string())
            .bind(adaptation.trigger.as_str())
            .bind(adaptation.adaptation_type.as_str())
            .bind(adaptation.applied_at.to_rfc3339())
            .bind(&adaptation.description)
            .bind(to_json(adaptation)?)
            .execute(&mut *tx)
            .await
            .map_err(|e| backend("failed to record adaptation", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| backend("failed to commit adaptation", e))?;
        debug!(
            plan_id = %plan.id,
            version = plan.version,
            changed = commit.changed_weeks.len(),
            removed = commit.removed_weeks.len(),
            "plan commit applied"
        );
        Ok(plan.version)
    }
}

#[async_trait]
impl ProfileRepository for SqliteStore {
    async fn get_profile(&self, user_id: Uuid) -> Result<UserProfile, StorageError> {
        let row = sqlx::query("SELECT profile_data FROM profiles WHERE user_id = $1")
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| backend("failed to load profile", e))?
            .ok_or(StorageError::ProfileNotFound { user_id })?;
        let raw: String = row
            .try_get("profile_data")
            .map_err(|e| backend("failed to read profile", e))?;
        from_json(&raw)
    }

    async fn save_profile(&self, profile: &UserProfile) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO profiles (user_id, profile_data, updated_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id) DO UPDATE SET profile_data = excluded.profile_data, updated_at = excluded.updated_at
            ",
        )
        .bind(profile.user_id.to_string())
        .bind(to_json(profile)?)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| backend("failed to save profile", e))?;
        Ok(())
    }
}

#[async_trait]
impl AdaptationRepository for SqliteStore {
    async fn list_adaptations(&self, plan_id: Uuid) -> Result<Vec<PlanAdaptation>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT record_data FROM plan_adaptations
            WHERE plan_id = $1
            ORDER BY applied_at, rowid
            ",
        )
        .bind(plan_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| backend("failed to list adaptations", e))?;

        rows.iter()
            .map(|row| {
                let raw: String = row
                    .try_get("record_data")
                    .map_err(|e| backend("failed to read adaptation", e))?;
                from_json(&raw)
            })
            .collect()
    }
}

// ABOUTME: Integration tests for the SQLite store through the full training service
// ABOUTME: File-backed persistence across reconnects and adaptations committed in one transaction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![cfg(feature = "sqlite")]
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use tempfile::TempDir;

use pierre_training::adaptation::{DifficultySource, InjuryReport};
use pierre_training::core::models::{
    AdaptationType, BodyPart, DifficultyDirection, MovementPattern, TriggerKind,
};
use pierre_training::storage::sqlite::SqliteStore;
use pierre_training::storage::{AdaptationRepository, PlanRepository, ProfileRepository};

fn database_url(dir: &TempDir) -> String {
    format!("sqlite://{}", dir.path().join("training.db").display())
}

#[tokio::test]
async fn test_plan_and_history_survive_reconnect() {
    let dir = TempDir::new().unwrap();
    let url = database_url(&dir);
    let profile = common::runner_profile();

    let (plan_id, version) = {
        let store = Arc::new(SqliteStore::connect(&url).await.unwrap());
        let (service, _clock) =
            common::service_with(store, Arc::new(common::ScriptedService::default()));
        service.generate_initial_plan(&profile, 8).await.unwrap();
        let outcome = service
            .adapt_for_injury(profile.user_id, InjuryReport::new(BodyPart::Knee, Vec::new()))
            .await
            .unwrap();
        let plan = service.active_plan(profile.user_id).await.unwrap();
        (plan.id, outcome.plan_version)
    };

    let reopened = SqliteStore::connect(&url).await.unwrap();
    let plan = reopened.get_plan_with_details(plan_id).await.unwrap();
    assert_eq!(plan.version, version);
    assert_eq!(plan.weeks.len(), 8);
    assert_eq!(plan.restrictions.len(), 1);
    let restricted = plan.restricted_patterns();
    for workout in plan.workouts() {
        assert!(!workout.touches(&restricted), "{} still loads the knee", workout.id);
    }
    assert_eq!(reopened.get_profile(profile.user_id).await.unwrap(), profile);

    let records = reopened.list_adaptations(plan_id).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].trigger, TriggerKind::Injury);
    assert_eq!(records[0].adaptation_type, AdaptationType::InjuryModification);
}

#[tokio::test]
async fn test_timeline_shortening_removes_week_rows() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(SqliteStore::connect(&database_url(&dir)).await.unwrap());
    let (service, _clock) =
        common::service_with(store.clone(), Arc::new(common::ScriptedService::default()));
    let profile = common::runner_profile();
    let plan = service.generate_initial_plan(&profile, 10).await.unwrap();

    service
        .adapt_for_timeline_change(profile.user_id, common::date(2026, 5, 3))
        .await
        .unwrap();

    let stored = store.get_plan_with_details(plan.id).await.unwrap();
    assert_eq!(stored.total_weeks, 8);
    assert_eq!(stored.weeks.len(), 8);
    assert_eq!(stored.end_date, common::date(2026, 5, 3));
    assert_eq!(stored, service.active_plan(profile.user_id).await.unwrap());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_adaptations_on_file_database() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(SqliteStore::connect(&database_url(&dir)).await.unwrap());
    let (service, clock) =
        common::service_with(store.clone(), Arc::new(common::ScriptedService::default()));
    let service = Arc::new(service);
    let profile = common::runner_profile();
    let plan = service.generate_initial_plan(&profile, 8).await.unwrap();
    clock.set(Utc.with_ymd_and_hms(2026, 3, 8, 9, 0, 0).unwrap());
    let user_id = profile.user_id;

    let injury = {
        let service = service.clone();
        tokio::spawn(async move {
            service
                .adapt_for_injury(
                    user_id,
                    InjuryReport::new(BodyPart::Shoulder, vec![MovementPattern::OverheadPress]),
                )
                .await
        })
    };
    let harder = {
        let service = service.clone();
        tokio::spawn(async move {
            service
                .adapt_for_difficulty(
                    user_id,
                    DifficultySource::PerceivedDifficulty,
                    DifficultyDirection::Harder,
                )
                .await
        })
    };

    let mut versions = vec![
        injury.await.unwrap().unwrap().plan_version,
        harder.await.unwrap().unwrap().plan_version,
    ];
    versions.sort_unstable();
    assert_eq!(versions, vec![plan.version + 1, plan.version + 2]);

    let stored = store.get_plan_with_details(plan.id).await.unwrap();
    assert_eq!(stored.version, plan.version + 2);
    assert_eq!(stored.restrictions.len(), 1);
    assert_eq!(store.list_adaptations(plan.id).await.unwrap().len(), 2);
}

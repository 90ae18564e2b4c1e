mod common;

use common::{harness, harness_with, FakeLLM, StuckGenerator, JOLLOF_STEPS};
use jollof_persist::{PersistClient, ProgressStore};
use jollof_session::{Direction, SessionCoordinator, SessionError};
use jollof_types::{CookingMode, SessionKey, COMPLETION_MESSAGE};
use std::sync::Arc;
use std::time::Duration;

fn jollof_key() -> SessionKey {
    SessionKey::new("u1", "r1")
}

#[tokio::test]
async fn test_jollof_rice_scenario() {
    let h = harness();
    let coordinator = &h.service.coordinator;
    let key = jollof_key();

    let progress = coordinator
        .start(&key, Some("Jollof Rice"), None)
        .await
        .unwrap();
    assert_eq!(progress.current_step, 0);
    assert_eq!(progress.mode, CookingMode::Voice);
    assert_eq!(progress.steps.as_ref().map(Vec::len), Some(4));

    let step = coordinator.advance(&key, Direction::Next).await.unwrap();
    assert_eq!(step.step, "Blend peppers");
    assert_eq!(step.step_index, 1);

    let step = coordinator.advance(&key, Direction::Next).await.unwrap();
    assert_eq!(step.step, "Fry base");

    let step = coordinator.advance(&key, Direction::Previous).await.unwrap();
    assert_eq!(step.step, "Blend peppers");

    let step = coordinator.advance(&key, Direction::Repeat).await.unwrap();
    assert_eq!(step.step, "Blend peppers");
    assert_eq!(step.step_index, 1);

    let stored = coordinator.progress(&key).await.unwrap();
    assert_eq!(stored.current_step, 1);
    assert!(!stored.completed);
}

#[tokio::test]
async fn test_resume_does_not_regenerate() {
    let h = harness();
    let key = jollof_key();
    h.service.coordinator.start(&key, Some("Jollof Rice"), None).await.unwrap();
    h.service.coordinator.start(&key, Some("Jollof Rice"), None).await.unwrap();

    assert_eq!(h.llm.calls(), 1);
    assert_eq!(h.store.progress_count().await, 1);
}

#[tokio::test]
async fn test_next_completes_exactly_once() {
    let h = harness();
    let coordinator = &h.service.coordinator;
    let key = jollof_key();
    coordinator.start(&key, Some("Jollof Rice"), None).await.unwrap();

    let mut completions = 0;
    let mut was_completed = false;
    for _ in 0..7 {
        let step = coordinator.advance(&key, Direction::Next).await.unwrap();
        assert!(step.step_index < 4);
        if step.completed && !was_completed {
            completions += 1;
            assert_eq!(step.step, COMPLETION_MESSAGE);
        }
        was_completed = step.completed;
    }
    assert_eq!(completions, 1);

    let stored = coordinator.progress(&key).await.unwrap();
    assert_eq!(stored.current_step, 3);
    assert!(stored.completed);

    // back from completion lands on the last step
    let step = coordinator.advance(&key, Direction::Previous).await.unwrap();
    assert_eq!(step.step, "Add rice and stock");
    assert!(!step.completed);
}

#[tokio::test]
async fn test_previous_at_first_step_stays_put() {
    let h = harness();
    let key = jollof_key();
    h.service.coordinator.start(&key, Some("Jollof Rice"), None).await.unwrap();

    let step = h
        .service
        .coordinator
        .advance(&key, Direction::Previous)
        .await
        .unwrap();
    assert_eq!(step.step_index, 0);
    assert_eq!(step.step, "Wash rice");
}

#[tokio::test]
async fn test_advance_without_start_creates_nothing() {
    let h = harness();
    let err = h
        .service
        .coordinator
        .advance(&jollof_key(), Direction::Next)
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::NoActiveSession(_)));
    assert_eq!(h.store.progress_count().await, 0);
}

#[tokio::test]
async fn test_start_without_recipe_name_has_no_steps() {
    let h = harness();
    let key = jollof_key();
    let progress = h.service.coordinator.start(&key, None, None).await.unwrap();
    assert_eq!(progress.steps, Some(vec![]));
    assert_eq!(h.llm.calls(), 0);

    let step = h.service.coordinator.advance(&key, Direction::Next).await.unwrap();
    assert_eq!(step.step, COMPLETION_MESSAGE);
    assert!(step.completed);
}

#[tokio::test]
async fn test_toggle_mode_persists_through_cache() {
    let h = harness();
    let key = jollof_key();
    let coordinator = &h.service.coordinator;
    coordinator.start(&key, Some("Jollof Rice"), None).await.unwrap();

    let toggled = coordinator.toggle_mode(&key, CookingMode::Text).await.unwrap();
    assert_eq!(toggled.mode, CookingMode::Text);

    // cache hit returns the new mode without the step list
    let resumed = coordinator.start(&key, None, None).await.unwrap();
    assert_eq!(resumed.mode, CookingMode::Text);
    assert!(resumed.steps.is_none());
}

#[tokio::test]
async fn test_toggle_mode_unknown_session() {
    let h = harness();
    let err = h
        .service
        .coordinator
        .toggle_mode(&jollof_key(), CookingMode::Text)
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::NotFound(_)));
}

#[tokio::test]
async fn test_expired_cache_is_rebuilt_from_store() {
    let h = harness_with(FakeLLM::replying(JOLLOF_STEPS), Duration::from_millis(50));
    let key = jollof_key();
    let coordinator = &h.service.coordinator;
    coordinator.start(&key, Some("Jollof Rice"), None).await.unwrap();
    coordinator.advance(&key, Direction::Next).await.unwrap();

    tokio::time::sleep(Duration::from_millis(80)).await;

    let resumed = coordinator.start(&key, None, None).await.unwrap();
    assert_eq!(resumed.current_step, 1);
    assert_eq!(resumed.steps.as_ref().map(Vec::len), Some(4));

    let step = coordinator.advance(&key, Direction::Next).await.unwrap();
    assert_eq!(step.step, "Fry base");
}

#[tokio::test]
async fn test_generation_retries_once() {
    let h = harness_with(FakeLLM::failing(1), Duration::from_secs(60));
    let progress = h
        .service
        .coordinator
        .start(&jollof_key(), Some("Jollof Rice"), None)
        .await
        .unwrap();

    assert_eq!(progress.steps.as_ref().map(Vec::len), Some(4));
    assert_eq!(h.llm.calls(), 2);
}

#[tokio::test]
async fn test_generation_failure_writes_nothing() {
    let h = harness_with(FakeLLM::failing(2), Duration::from_secs(60));
    let err = h
        .service
        .coordinator
        .start(&jollof_key(), Some("Jollof Rice"), None)
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::GenerationFailed(_)));
    assert_eq!(h.store.progress_count().await, 0);
}

#[tokio::test]
async fn test_generation_timeout_is_unavailable() {
    let (persist, store) = PersistClient::in_memory(Duration::from_secs(60));
    let coordinator = SessionCoordinator::new(
        persist,
        Arc::new(StuckGenerator),
        common::config(Duration::from_secs(60)).with_upstream_timeout(Duration::from_millis(20)),
    );

    let err = coordinator
        .start(&jollof_key(), Some("Jollof Rice"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::Unavailable(_)));
    assert!(store.find_progress(&jollof_key()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_mode_only_applies_on_creation() {
    let h = harness();
    let key = jollof_key();
    let created = h
        .service
        .coordinator
        .start(&key, Some("Jollof Rice"), Some(CookingMode::Text))
        .await
        .unwrap();
    assert_eq!(created.mode, CookingMode::Text);

    let resumed = h
        .service
        .coordinator
        .start(&key, None, Some(CookingMode::Voice))
        .await
        .unwrap();
    assert_eq!(resumed.mode, CookingMode::Text);
}

#[tokio::test]
async fn test_regenerate_resets_position_and_keeps_mode() {
    let h = harness();
    let key = jollof_key();
    let coordinator = &h.service.coordinator;
    coordinator.start(&key, Some("Jollof Rice"), None).await.unwrap();
    coordinator.toggle_mode(&key, CookingMode::Text).await.unwrap();
    coordinator.advance(&key, Direction::Next).await.unwrap();

    *h.llm.reply.lock().unwrap() = Some("1. Rinse 2. Cook".to_string());
    let regenerated = coordinator.regenerate(&key, "Jollof Rice").await.unwrap();

    assert_eq!(regenerated.current_step, 0);
    assert!(!regenerated.completed);
    assert_eq!(regenerated.mode, CookingMode::Text);
    assert_eq!(regenerated.steps, Some(vec!["Rinse".to_string(), "Cook".to_string()]));
    assert_eq!(h.store.progress_count().await, 1);
}

#[tokio::test]
async fn test_concurrent_advances_are_not_lost() {
    let h = harness();
    let key = jollof_key();
    let coordinator = h.service.coordinator.clone();
    coordinator.start(&key, Some("Jollof Rice"), None).await.unwrap();

    let tasks: Vec<_> = (0..3)
        .map(|_| {
            let coordinator = coordinator.clone();
            let key = key.clone();
            tokio::spawn(async move { coordinator.advance(&key, Direction::Next).await })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let stored = coordinator.progress(&key).await.unwrap();
    assert_eq!(stored.current_step, 3);
    assert!(!stored.completed);
}

#[tokio::test]
async fn test_list_progress() {
    let h = harness();
    let coordinator = &h.service.coordinator;
    coordinator.start(&SessionKey::new("u1", "r1"), None, None).await.unwrap();
    coordinator.start(&SessionKey::new("u1", "r2"), None, None).await.unwrap();
    coordinator.start(&SessionKey::new("u2", "r1"), None, None).await.unwrap();

    assert_eq!(coordinator.list_progress("u1").await.unwrap().len(), 2);
}

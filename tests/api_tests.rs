mod common;

use gizmoforge::api::GizmoEngine;
use gizmoforge::catalog::GizmoType;
use gizmoforge::error::GizmoError;
use gizmoforge::protocol::{GizmoRequest, WorkStatus};
use gizmoforge::search::{PerkTarget, SecondaryTarget};
use std::sync::Mutex;

fn engine() -> GizmoEngine {
    GizmoEngine::load(common::data_path(), common::quick_config()).unwrap()
}

fn looting() -> GizmoRequest {
    GizmoRequest::new(
        GizmoType::Weapon,
        false,
        PerkTarget::new("Looting", 1),
        SecondaryTarget::None,
    )
}

#[test]
fn test_run_reports_monotone_progress() {
    let engine = engine();
    let seen = Mutex::new(Vec::new());
    let results = engine
        .run(&looting(), &|p: u8| {
            seen.lock().unwrap().push(p);
            true
        })
        .unwrap();

    assert!(!results.is_empty());
    let seen = seen.into_inner().unwrap();
    assert!(!seen.is_empty());
    assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    assert!(seen.iter().all(|&p| p <= 100));

    let best = &results[0];
    assert_eq!(best.materials_arrangement.len(), 9);
    let placed = best.materials_arrangement.iter().flatten().count() as u32;
    assert_eq!(placed, best.total_quantity());
}

#[test]
fn test_callback_can_abort() {
    let engine = engine();
    let err = engine.run(&looting(), &|_p: u8| false).unwrap_err();
    assert!(matches!(err, GizmoError::Cancelled));
}

#[test]
fn test_spawned_search_streams_to_completion() {
    let engine = engine();
    let mut handle = engine.spawn(looting());
    let id = handle.request_id();
    let messages: Vec<_> = handle.iter().collect();

    let (last, progress) = messages.split_last().unwrap();
    assert_eq!(last.status, WorkStatus::Complete);
    assert_eq!(last.percent_complete, 100);
    assert!(!last.result.is_empty());
    assert!(progress.iter().all(|m| m.status == WorkStatus::InProgress));
    assert!(progress
        .windows(2)
        .all(|w| w[0].percent_complete <= w[1].percent_complete));
    assert!(messages.iter().all(|m| m.request_id == id));
}

#[test]
fn test_invalid_request_is_rejected_before_progress() {
    let engine = engine();
    let request = GizmoRequest::new(
        GizmoType::Weapon,
        false,
        PerkTarget::new("Looting", 3),
        SecondaryTarget::None,
    );
    let mut handle = engine.spawn(request);
    let first = handle.recv().unwrap();
    assert_eq!(first.status, WorkStatus::Rejected);
    assert!(first.error.unwrap().contains("Looting"));
    assert!(handle.recv().is_none());
}

#[test]
fn test_cancelled_handle_goes_quiet() {
    let engine = engine();
    let mut handle = engine.spawn(looting());
    handle.cancel();
    assert!(handle.is_cancelled());
    assert!(handle.try_recv().is_none());
    assert!(handle.recv().is_none());
    assert!(handle.wait().is_none());
}

#[test]
fn test_request_ids_are_unique() {
    let engine = engine();
    let a = engine.spawn(looting());
    let b = engine.spawn(looting());
    assert_ne!(a.request_id(), b.request_id());
}

#[test]
fn test_request_config_overrides_engine() {
    let engine = engine();
    let mut config = common::quick_config();
    config.top_configuration_count = 1;
    let results = engine.run(&looting().with_config(config), &|_p: u8| true).unwrap();
    assert_eq!(results.len(), 1);
}

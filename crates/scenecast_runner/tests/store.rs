use pretty_assertions::assert_eq;
use scenecast_runner::{DraftFields, Operation, OperationStatus, StateStore};
use tempfile::TempDir;

#[test]
fn missing_state_file_reads_as_defaults() {
    let temp = TempDir::new().unwrap();
    let store = StateStore::open(temp.path()).unwrap();

    assert_eq!(store.status(), OperationStatus::default());
    let record = store.snapshot();
    assert_eq!(record.operation, None);
    assert_eq!(record.captured_image, None);
}

#[test]
fn job_lifecycle_survives_reopen() {
    let temp = TempDir::new().unwrap();
    {
        let store = StateStore::open(temp.path()).unwrap();
        store.begin_operation(Operation::Transforming).unwrap();
        store
            .complete_transform("https://cdn.example/out.png".to_string())
            .unwrap();
    }

    // A fresh process opening the same directory sees the terminal state.
    let reopened = StateStore::open(temp.path()).unwrap();
    let status = reopened.status();
    assert_eq!(status.operation, None);
    assert_eq!(status.error, None);
    assert_eq!(
        status.transformed_url.as_deref(),
        Some("https://cdn.example/out.png")
    );
}

#[test]
fn begin_clears_a_prior_error() {
    let temp = TempDir::new().unwrap();
    let store = StateStore::open(temp.path()).unwrap();

    store.fail_operation("quota exceeded".to_string()).unwrap();
    assert_eq!(store.status().error.as_deref(), Some("quota exceeded"));

    store.begin_operation(Operation::GeneratingVideo).unwrap();
    let status = store.status();
    assert_eq!(status.operation, Some(Operation::GeneratingVideo));
    assert_eq!(status.error, None);
}

#[test]
fn failure_clears_the_operation_but_keeps_results() {
    let temp = TempDir::new().unwrap();
    let store = StateStore::open(temp.path()).unwrap();

    store
        .complete_transform("https://cdn.example/one.png".to_string())
        .unwrap();
    store.begin_operation(Operation::GeneratingVideo).unwrap();
    store.fail_operation("model overloaded".to_string()).unwrap();

    let status = store.status();
    assert_eq!(status.operation, None);
    assert_eq!(status.error.as_deref(), Some("model overloaded"));
    assert_eq!(
        status.transformed_url.as_deref(),
        Some("https://cdn.example/one.png")
    );
}

#[test]
fn clear_operation_leaves_results_alone() {
    let temp = TempDir::new().unwrap();
    let store = StateStore::open(temp.path()).unwrap();

    store
        .complete_video("https://cdn.example/clip.mp4".to_string())
        .unwrap();
    store.begin_operation(Operation::Transforming).unwrap();
    store.clear_operation().unwrap();

    let status = store.status();
    assert_eq!(status.operation, None);
    assert_eq!(status.error, None);
    assert_eq!(
        status.video_url.as_deref(),
        Some("https://cdn.example/clip.mp4")
    );
}

#[test]
fn draft_writes_do_not_touch_job_slots() {
    let temp = TempDir::new().unwrap();
    let store = StateStore::open(temp.path()).unwrap();

    store.begin_operation(Operation::Transforming).unwrap();
    store
        .update_draft(DraftFields {
            captured_image: Some("data:image/png;base64,AAAA".to_string()),
            transform_prompt: Some("cyberpunk harbor".to_string()),
            ..DraftFields::default()
        })
        .unwrap();

    let record = store.snapshot();
    assert_eq!(record.operation, Some(Operation::Transforming));
    assert_eq!(record.transform_prompt.as_deref(), Some("cyberpunk harbor"));

    // Job writes do not touch draft slots either.
    store
        .complete_transform("https://cdn.example/out.png".to_string())
        .unwrap();
    let record = store.snapshot();
    assert_eq!(record.transform_prompt.as_deref(), Some("cyberpunk harbor"));
    assert_eq!(
        record.transformed_url.as_deref(),
        Some("https://cdn.example/out.png")
    );
}

#[test]
fn draft_update_is_a_full_overwrite() {
    let temp = TempDir::new().unwrap();
    let store = StateStore::open(temp.path()).unwrap();

    store
        .update_draft(DraftFields {
            captured_image: Some("data:image/png;base64,AAAA".to_string()),
            ..DraftFields::default()
        })
        .unwrap();
    store.update_draft(DraftFields::default()).unwrap();

    assert_eq!(store.snapshot().captured_image, None);
}

#[test]
fn unreadable_state_file_falls_back_to_defaults() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join(".scenecast_state.ron"), "not ron at all").unwrap();

    let store = StateStore::open(temp.path()).unwrap();
    assert_eq!(store.status(), OperationStatus::default());
}

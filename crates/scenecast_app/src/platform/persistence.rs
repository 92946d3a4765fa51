use cast_logging::cast_error;
use chrono::Utc;
use scenecast_core::{DraftSnapshot, VideoOptions};
use scenecast_runner::{DraftFields, StateStore};

/// Rebuilds the front end's draft snapshot from the durable store.
pub(crate) fn load_draft(store: &StateStore) -> DraftSnapshot {
    let record = store.snapshot();
    let defaults = VideoOptions::default();
    DraftSnapshot {
        captured_image: record.captured_image,
        transform_prompt: record.transform_prompt.unwrap_or_default(),
        video_prompt: record.video_prompt.unwrap_or_default(),
        video_options: VideoOptions {
            duration: record.video_duration.unwrap_or(defaults.duration),
            generate_audio: record.generate_audio.unwrap_or(defaults.generate_audio),
        },
        transformed_url: record.mirror_transformed_url,
        video_url: record.mirror_video_url,
    }
}

/// Writes the complete draft back. Failures are logged, not fatal: the
/// worst case is a stale draft on the next attach.
pub(crate) fn save_draft(store: &StateStore, draft: &DraftSnapshot) {
    let fields = DraftFields {
        captured_image: draft.captured_image.clone(),
        transform_prompt: some_if_nonempty(&draft.transform_prompt),
        video_prompt: some_if_nonempty(&draft.video_prompt),
        video_duration: Some(draft.video_options.duration.clone()),
        generate_audio: Some(draft.video_options.generate_audio),
        mirror_transformed_url: draft.transformed_url.clone(),
        mirror_video_url: draft.video_url.clone(),
        saved_utc: Some(Utc::now().to_rfc3339()),
    };
    if let Err(err) = store.update_draft(fields) {
        cast_error!("Failed to persist draft state: {}", err);
    }
}

fn some_if_nonempty(text: &str) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn draft_round_trips_through_the_store() {
        let temp = TempDir::new().unwrap();
        let store = StateStore::open(temp.path()).unwrap();

        let draft = DraftSnapshot {
            captured_image: Some("data:image/png;base64,AAAA".to_string()),
            transform_prompt: "studio ghibli valley".to_string(),
            video_prompt: String::new(),
            video_options: VideoOptions {
                duration: "4s".to_string(),
                generate_audio: false,
            },
            transformed_url: Some("https://cdn.example/img.png".to_string()),
            video_url: None,
        };
        save_draft(&store, &draft);

        let restored = load_draft(&store);
        assert_eq!(restored, draft);

        // A reopened store (fresh process) sees the same draft.
        let reopened = StateStore::open(temp.path()).unwrap();
        assert_eq!(load_draft(&reopened), draft);
    }
}

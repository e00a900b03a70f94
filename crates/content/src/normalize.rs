//! Total coercion of agent replies into typed records.
//!
//! The two external agents are generative systems whose structured-output
//! discipline is not guaranteed. Every function here accepts any JSON value
//! and returns a fully populated record: fields that are present and of the
//! expected shape copy through, everything else collapses to the zero value
//! for its type. A malformed field never affects its siblings, and nothing
//! in this module can panic.

use serde_json::Value;

use crate::types::{
    CallToAction, GenerationResult, MusicDirection, ResearchSummary, Scene, SceneFrame,
    VideoScript, VisualPackage,
};

static EMPTY: Vec<Value> = Vec::new();

/// String field, or `""` when absent or not a string.
pub fn str_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// String field, or None when absent or not a string.
pub fn opt_str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Non-negative integer field, or 0 when absent, negative, or not a number.
pub fn u32_field(value: &Value, key: &str) -> u32 {
    opt_u32_field(value, key).unwrap_or(0)
}

fn opt_u32_field(value: &Value, key: &str) -> Option<u32> {
    value
        .get(key)
        .and_then(Value::as_f64)
        .filter(|n| n.is_finite() && *n >= 0.0)
        .map(|n| n.min(u32::MAX as f64) as u32)
}

/// Bool field, or false.
pub fn bool_field(value: &Value, key: &str) -> bool {
    value.get(key).and_then(Value::as_bool).unwrap_or(false)
}

/// Bool field, or None when absent or not a bool.
pub fn opt_bool_field(value: &Value, key: &str) -> Option<bool> {
    value.get(key).and_then(Value::as_bool)
}

/// Sequence field as a slice, empty when absent or not an array.
pub fn arr_field<'a>(value: &'a Value, key: &str) -> &'a [Value] {
    value
        .get(key)
        .and_then(Value::as_array)
        .unwrap_or(&EMPTY)
}

/// Sequence of strings; non-string items are dropped.
pub fn str_items(value: &Value, key: &str) -> Vec<String> {
    arr_field(value, key)
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect()
}

fn scene(value: &Value) -> Scene {
    Scene {
        scene_number: u32_field(value, "scene_number"),
        duration_seconds: u32_field(value, "duration_seconds"),
        voiceover_text: str_field(value, "voiceover_text"),
        visual_description: str_field(value, "visual_description"),
        text_overlay: str_field(value, "text_overlay"),
        b_roll_cue: str_field(value, "b_roll_cue"),
        transition: str_field(value, "transition"),
        camera_direction: str_field(value, "camera_direction"),
    }
}

fn music_direction(value: &Value) -> MusicDirection {
    MusicDirection {
        style: str_field(value, "style"),
        bpm: str_field(value, "bpm"),
        energy_progression: str_field(value, "energy_progression"),
    }
}

fn call_to_action(value: &Value) -> CallToAction {
    CallToAction {
        text: str_field(value, "text"),
        placement: str_field(value, "placement"),
        timing: str_field(value, "timing"),
    }
}

pub fn video_script(value: &Value) -> VideoScript {
    VideoScript {
        video_number: u32_field(value, "video_number"),
        title: str_field(value, "title"),
        topic_tag: str_field(value, "topic_tag"),
        hook: str_field(value, "hook"),
        total_duration_seconds: u32_field(value, "total_duration_seconds"),
        platform_target: str_field(value, "platform_target"),
        aspect_ratio: str_field(value, "aspect_ratio"),
        scenes: arr_field(value, "scenes").iter().map(scene).collect(),
        music_direction: music_direction(value.get("music_direction").unwrap_or(&Value::Null)),
        cta: call_to_action(value.get("cta").unwrap_or(&Value::Null)),
    }
}

fn research_summary(value: &Value) -> ResearchSummary {
    ResearchSummary {
        key_findings: str_items(value, "key_findings"),
        angles_used: str_items(value, "angles_used"),
        data_sources_count: u32_field(value, "data_sources_count"),
    }
}

/// Normalize a manager-agent result. A present-but-malformed
/// `research_summary` still yields a defaulted record; only a missing or
/// null field maps to None.
pub fn manager_result(value: &Value) -> GenerationResult {
    let research = match value.get("research_summary") {
        None | Some(Value::Null) => None,
        Some(raw) => Some(research_summary(raw)),
    };
    GenerationResult {
        research_summary: research,
        videos: arr_field(value, "videos").iter().map(video_script).collect(),
        content_strategy_notes: str_field(value, "content_strategy_notes"),
        visual_style_recommendations: str_field(value, "visual_style_recommendations"),
    }
}

fn scene_frame(value: &Value) -> SceneFrame {
    SceneFrame {
        scene_number: u32_field(value, "scene_number"),
        frame_description: str_field(value, "frame_description"),
        style_notes: str_field(value, "visual_style_notes"),
    }
}

/// Normalize a visual-agent result for `video`. The subject video's number
/// and title are echoed back when the reply omits or mangles them; asset
/// URLs live in the reply's side-channel and are attached by the caller.
pub fn visual_result(value: &Value, video: &VideoScript) -> VisualPackage {
    VisualPackage {
        video_number: opt_u32_field(value, "video_number").unwrap_or(video.video_number),
        video_title: opt_str_field(value, "video_title").unwrap_or_else(|| video.title.clone()),
        thumbnail_description: str_field(value, "thumbnail_description"),
        scene_frames: arr_field(value, "scene_frames").iter().map(scene_frame).collect(),
        overall_visual_direction: str_field(value, "overall_visual_direction"),
        asset_urls: Vec::new(),
    }
}

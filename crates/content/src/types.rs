use serde::{Deserialize, Serialize};

/// Product profile that drives prompt construction. Mutated only by an
/// explicit user save; generation stays disabled until `product_name` is
/// non-empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub product_name: String,
    pub product_url: String,
    pub key_features: Vec<String>,
    pub target_audience: String,
    pub brand_voice: String,
    pub content_pillars: Vec<String>,
    pub platform_targets: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub scene_number: u32,
    pub duration_seconds: u32,
    pub voiceover_text: String,
    pub visual_description: String,
    pub text_overlay: String,
    pub b_roll_cue: String,
    pub transition: String,
    pub camera_direction: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MusicDirection {
    pub style: String,
    pub bpm: String,
    pub energy_progression: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallToAction {
    pub text: String,
    pub placement: String,
    pub timing: String,
}

/// One generated short-form video script. Every field is concrete: absent or
/// malformed agent output is coerced to zero values during normalization, so
/// consumers never branch on presence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoScript {
    pub video_number: u32,
    pub title: String,
    pub topic_tag: String,
    pub hook: String,
    pub total_duration_seconds: u32,
    pub platform_target: String,
    pub aspect_ratio: String,
    pub scenes: Vec<Scene>,
    pub music_direction: MusicDirection,
    pub cta: CallToAction,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResearchSummary {
    pub key_findings: Vec<String>,
    pub angles_used: Vec<String>,
    pub data_sources_count: u32,
}

/// Normalized output of one manager-agent call. `research_summary` is None
/// only when the field was entirely absent from the reply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub research_summary: Option<ResearchSummary>,
    pub videos: Vec<VideoScript>,
    pub content_strategy_notes: String,
    pub visual_style_recommendations: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneFrame {
    pub scene_number: u32,
    pub frame_description: String,
    pub style_notes: String,
}

/// Normalized output of one visual-agent call for a single video, plus any
/// asset URLs lifted from the module-outputs side-channel of the reply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisualPackage {
    pub video_number: u32,
    pub video_title: String,
    pub thumbnail_description: String,
    pub scene_frames: Vec<SceneFrame>,
    pub overall_visual_direction: String,
    pub asset_urls: Vec<String>,
}

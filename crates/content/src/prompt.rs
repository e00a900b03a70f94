//! Deterministic natural-language briefs for the two agents. The rendered
//! text is the entire contract with each agent; no structured request
//! schema is sent alongside it.

use crate::types::{Settings, VideoScript};

fn or_fallback<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() {
        fallback
    } else {
        value
    }
}

fn join_or_fallback(items: &[String], fallback: &str) -> String {
    if items.is_empty() {
        fallback.to_string()
    } else {
        items.join(", ")
    }
}

/// Render the product profile into the manager-agent task description.
pub fn production_brief(settings: &Settings) -> String {
    let mut brief = format!(
        "Create a 2-video viral content package for the SaaS product \"{}\"",
        settings.product_name
    );
    if !settings.product_url.is_empty() {
        brief.push_str(&format!(" ({})", settings.product_url));
    }
    brief.push_str(".\n");
    brief.push_str(&format!(
        "Key features: {}.\n",
        join_or_fallback(&settings.key_features, "N/A")
    ));
    brief.push_str(&format!(
        "Target audience: {}.\n",
        or_fallback(&settings.target_audience, "general SaaS users")
    ));
    brief.push_str(&format!(
        "Brand voice: {}.\n",
        or_fallback(&settings.brand_voice, "professional")
    ));
    brief.push_str(&format!(
        "Content pillars to focus on: {}.\n",
        join_or_fallback(&settings.content_pillars, "Features")
    ));
    brief.push_str(&format!(
        "Platform targets: {}.",
        join_or_fallback(&settings.platform_targets, "TikTok")
    ));
    brief
}

/// Render one video script into the visual-agent task description.
pub fn visual_brief(video: &VideoScript) -> String {
    let scenes = video
        .scenes
        .iter()
        .map(|s| {
            format!(
                "Scene {}: {} - Text overlay: \"{}\" - B-roll: {}",
                s.scene_number, s.visual_description, s.text_overlay, s.b_roll_cue
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Generate visual storyboard frames and a thumbnail for Video {}: \"{}\".\n\
         Hook: {}\n\
         Platform: {}\n\
         Aspect ratio: {}\n\
         Scenes:\n\
         {}\n\
         Create eye-catching visuals that match the viral short-form video style.",
        video.video_number,
        video.title,
        video.hook,
        or_fallback(&video.platform_target, "TikTok"),
        or_fallback(&video.aspect_ratio, "9:16"),
        scenes,
    )
}

//! Practice agent: exercise generation aimed at a known weakness.

use crate::generation::{Generator, Part};
use crate::prompts::{self, TemplateStore};
use giasu_core::videos::VideoCatalog;
use tracing::warn;

/// Used when no weakness is known yet: direct requests for practice arrive
/// before any insight run has populated the profile.
pub const FALLBACK_TOPIC: &str = "các chủ đề toán lớp 9 tổng quát";

const PRACTICE_APOLOGY: &str = "Xin lỗi, tôi không thể tạo bài tập lúc này.";

/// Generate practice exercises for `weakness`, recommending catalog videos
/// where they match.
pub async fn generate_practice(
    weakness: &str,
    catalog: &VideoCatalog,
    generator: &dyn Generator,
    templates: &TemplateStore,
) -> String {
    let cheatsheet = catalog.cheatsheet_json();
    let prompt = match templates.render(
        prompts::PRACTICE,
        &[
            ("student_weakness", weakness),
            ("video_cheatsheet_json", cheatsheet.as_str()),
        ],
    ) {
        Ok(p) => p,
        Err(e) => {
            warn!("practice prompt failed to render: {}", e);
            return PRACTICE_APOLOGY.to_string();
        }
    };

    generator.generate(&[Part::text(prompt)]).await
}

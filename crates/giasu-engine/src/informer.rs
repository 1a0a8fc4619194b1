//! Informer agent: retrieval-grounded answer drafting.
//!
//! Stages: optional OCR of an attached image, embedding retrieval, grounded
//! prompt assembly, final generation. Every stage except the last degrades
//! in place: OCR failure becomes a placeholder, retrieval failure becomes an
//! empty document list, a template problem becomes a minimal hand-built
//! prompt. Only the final generation call surfaces an apology to the user.

use crate::generation::{Generator, Part, APOLOGY};
use crate::prompts::{self, TemplateStore};
use crate::retrieval::Retriever;
use giasu_core::knowledge::KnowledgeDoc;
use giasu_core::ConversationWindow;
use tracing::warn;

/// Substituted for the OCR reply when the image cannot be read.
pub const OCR_PLACEHOLDER: &str = "(không đọc được nội dung ảnh)";

/// Caption preceding the raw image in the final multimodal prompt.
const IMAGE_CAPTION: &str = "Ảnh bài toán của học sinh:";

/// Draft an answer for the student's latest question.
pub async fn answer(
    query: &str,
    image: Option<&[u8]>,
    window: &ConversationWindow,
    retriever: &Retriever,
    generator: &dyn Generator,
    templates: &TemplateStore,
) -> String {
    // Image text is folded into the query before retrieval so grounding
    // documents match the photographed problem, not just the typed text.
    let full_query = match image {
        Some(bytes) => {
            let ocr = ocr_image(bytes, generator).await;
            if query.is_empty() {
                ocr
            } else {
                format!("{}\n{}", query, ocr)
            }
        }
        None => query.to_string(),
    };

    let docs = retriever.retrieve(&full_query).await;
    let prompt = build_prompt(&full_query, window, &docs, templates);

    let mut parts = vec![Part::text(prompt)];
    if let Some(bytes) = image {
        parts.push(Part::text(IMAGE_CAPTION.to_string()));
        parts.push(Part::image(detect_mime(bytes), bytes.to_vec()));
    }

    generator.generate(&parts).await
}

/// OCR sub-step: ask the model to transcribe the problem statement.
async fn ocr_image(bytes: &[u8], generator: &dyn Generator) -> String {
    let reply = generator
        .generate(&[
            Part::text(prompts::OCR_INSTRUCTION),
            Part::image(detect_mime(bytes), bytes.to_vec()),
        ])
        .await;
    if reply == APOLOGY {
        warn!("image transcription failed, substituting placeholder");
        OCR_PLACEHOLDER.to_string()
    } else {
        reply
    }
}

fn build_prompt(
    query: &str,
    window: &ConversationWindow,
    docs: &[KnowledgeDoc],
    templates: &TemplateStore,
) -> String {
    let history = window.render();
    let documents = serialize_docs(docs);
    match templates.render(
        prompts::INFORMER,
        &[
            ("conversation_history", history.as_str()),
            ("documents", documents.as_str()),
            ("query", query),
        ],
    ) {
        Ok(prompt) => prompt,
        Err(e) => {
            warn!("informer template failed, using minimal prompt: {}", e);
            format!(
                "Bạn là một Gia sư Toán AI cho học sinh lớp 9. Hãy trả lời bằng tiếng Việt, rõ ràng, từng bước.\n\n\
                 Lịch sử trò chuyện:\n{}\n\nTài liệu tham khảo:\n{}\n\nCâu hỏi: {}",
                history, documents, query
            )
        }
    }
}

fn serialize_docs(docs: &[KnowledgeDoc]) -> String {
    if docs.is_empty() {
        return "(không có tài liệu phù hợp)".to_string();
    }
    docs.iter()
        .map(|d| d.content.as_str())
        .collect::<Vec<_>>()
        .join("\n---\n")
}

/// Magic-byte sniff; the upload layer hands us opaque bytes.
fn detect_mime(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(&[0xFF, 0xD8]) {
        "image/jpeg"
    } else {
        "image/png"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialize_docs_marks_empty_context() {
        assert_eq!(serialize_docs(&[]), "(không có tài liệu phù hợp)");
    }

    #[test]
    fn serialize_docs_separates_passages() {
        let docs = vec![
            KnowledgeDoc {
                content: "a".to_string(),
                embedding: None,
            },
            KnowledgeDoc {
                content: "b".to_string(),
                embedding: None,
            },
        ];
        assert_eq!(serialize_docs(&docs), "a\n---\nb");
    }

    #[test]
    fn detects_jpeg_and_defaults_to_png() {
        assert_eq!(detect_mime(&[0xFF, 0xD8, 0xFF]), "image/jpeg");
        assert_eq!(detect_mime(&[0x89, b'P', b'N', b'G']), "image/png");
    }
}

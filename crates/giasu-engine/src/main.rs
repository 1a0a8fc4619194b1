//! Interactive tutoring session over stdin/stdout.

use anyhow::Context;
use giasu_core::knowledge::DocumentIndex;
use giasu_core::videos::VideoCatalog;
use giasu_engine::config::TutorConfig;
use giasu_engine::generation::GeminiClient;
use giasu_engine::profile_store::JsonProfileStore;
use giasu_engine::prompts::TemplateStore;
use giasu_engine::retrieval::{HttpEmbedder, Retriever};
use giasu_engine::{Resources, TutorEngine};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const WELCOME: &str = "Chào bạn! Mình là Gia sư Toán AI. Bạn cần giúp gì cho môn Toán lớp 9 hôm nay?";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("giasu.toml"));
    let config = TutorConfig::load(&config_path)?;
    info!("giasu v{} starting", env!("CARGO_PKG_VERSION"));

    let api_key = std::env::var(&config.llm.api_key_env)
        .with_context(|| format!("environment variable {} not set", config.llm.api_key_env))?;

    let generator = GeminiClient::new(
        &config.llm.endpoint,
        &config.llm.model,
        api_key,
        config.llm.timeout_secs,
    );

    let index = DocumentIndex::load(&config.data.document_pack).with_context(|| {
        format!(
            "loading document pack {}",
            config.data.document_pack.display()
        )
    })?;
    info!("loaded {} grounding documents", index.len());

    let catalog = match VideoCatalog::load(&config.data.video_catalog) {
        Ok(catalog) => catalog,
        Err(e) => {
            warn!(
                "video catalog {} unavailable ({}), practice runs without videos",
                config.data.video_catalog.display(),
                e
            );
            VideoCatalog::default()
        }
    };

    let profile_dir = config
        .data
        .profile_dir
        .clone()
        .or_else(|| dirs::data_dir().map(|d| d.join("giasu")))
        .unwrap_or_else(|| PathBuf::from(".giasu"));
    let profiles = JsonProfileStore::new(profile_dir)?;

    let embedder = HttpEmbedder::new(&config.retrieval.embedding_endpoint, config.llm.timeout_secs);
    let retriever = Retriever::new(Arc::new(index), Box::new(embedder), config.retrieval.top_k);

    let user_id = std::env::var("GIASU_USER").unwrap_or_else(|_| "local".to_string());
    let resources = Resources {
        generator: Box::new(generator),
        retriever,
        templates: TemplateStore::new(),
        catalog,
        profiles: Box::new(profiles),
    };
    let mut engine = TutorEngine::new(resources, config.session.clone(), &user_id);

    info!("session ready for {}", user_id);
    run_repl(&mut engine).await
}

async fn run_repl(engine: &mut TutorEngine) -> anyhow::Result<()> {
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    stdout
        .write_all(format!("{}\n\n> ", WELCOME).as_bytes())
        .await?;
    stdout.flush().await?;

    while let Some(line) = lines.next_line().await? {
        let text = line.trim();
        if text.is_empty() {
            stdout.write_all(b"> ").await?;
            stdout.flush().await?;
            continue;
        }
        if text == "/quit" {
            break;
        }

        // Attach an image with `/anh <path>` before the question text.
        let (text, image) = match text.strip_prefix("/anh ") {
            Some(rest) => {
                let (path, question) = rest.split_once(' ').unwrap_or((rest, ""));
                match std::fs::read(Path::new(path)) {
                    Ok(bytes) => (question.to_string(), Some(bytes)),
                    Err(e) => {
                        warn!("could not read image {}: {}", path, e);
                        (question.to_string(), None)
                    }
                }
            }
            None => (text.to_string(), None),
        };

        let outcome = engine.respond(&text, image).await;
        stdout
            .write_all(format!("\n{}\n", outcome.reply).as_bytes())
            .await?;
        if let Some(followup) = outcome.followup {
            stdout
                .write_all(format!("\n{}\n", followup).as_bytes())
                .await?;
        }
        stdout.write_all(b"\n> ").await?;
        stdout.flush().await?;
    }

    info!("session closed");
    Ok(())
}

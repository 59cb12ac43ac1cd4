//! Annotate
//!
//! Renders a story file with its stored highlights:
//!
//! ```text
//! annotate <story-id> <path> [text|html]
//! ```
//!
//! The annotated HTML goes to stdout; logs go to stderr.

use std::env;

use anyhow::{bail, Context};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use story_annotations::config::Config;
use story_annotations::db::{self, SqliteHighlightStore};
use story_annotations::highlights::HighlightStore;
use story_annotations::html::{HighlightInjector, Normalizer};
use story_annotations::story::{ContentType, Story};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "story_annotations=debug,annotate=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    dotenvy::dotenv().ok();
    let config = Config::from_env();

    let args: Vec<String> = env::args().skip(1).collect();
    let (story_id, path) = match args.as_slice() {
        [story_id, path, ..] => (story_id.as_str(), path.as_str()),
        _ => bail!("usage: annotate <story-id> <path> [text|html]"),
    };
    let content_type = args
        .get(2)
        .map(|hint| ContentType::from_hint(hint))
        .unwrap_or_default();

    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path))?;
    let story = Story::new(story_id, &raw, content_type);

    let normalized = Normalizer::new(config.normalizer.clone())
        .with_markers(&config.markers)
        .normalize_story(&story);

    let pool = db::create_pool(&config.database.url)
        .await
        .with_context(|| format!("Failed to open database {}", config.database.url))?;
    let store = SqliteHighlightStore::new(pool, &config.database.user_id);
    let highlights = store
        .list(story_id)
        .await
        .context("Failed to load highlights")?;
    tracing::info!(story_id = story_id, count = highlights.len(), "Loaded highlights");

    let result = HighlightInjector::new(config.markers.clone()).inject(&normalized, &highlights);
    for stale in &result.stale {
        tracing::warn!("{}", stale);
    }
    tracing::info!(
        injected = result.injected_count,
        stale = result.stale.len(),
        "Rendered story"
    );

    println!("{}", result.html);
    Ok(())
}

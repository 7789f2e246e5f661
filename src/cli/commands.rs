use std::collections::HashSet;
use std::path::Path;

use chrono::{NaiveDate, Utc};

use crate::app::{AppContext, AppError, Result};
use crate::assembler::Mode;
use crate::domain::ids::event_slug;
use crate::normalizer::parse_zone;
use crate::pipeline::{BatchOptions, BatchSummary, CoverOverride, EventPipeline};

use super::Cli;

/// Collect identifiers, run the batch, and print the summary.
pub async fn sync(ctx: &AppContext, cli: &Cli) -> Result<BatchSummary> {
    let event_ids = collect_event_ids(ctx.driver.pipeline(), &cli.event_ids, cli.series.as_deref()).await;

    if event_ids.is_empty() {
        return Err(AppError::Other(
            "No events to process; give event IDs or --series".into(),
        ));
    }

    let mode = if ctx.flags.preview { Mode::Preview } else { Mode::Strict };
    let options = BatchOptions {
        mode,
        cover: cli.cover.as_deref().map(CoverOverride::parse),
        reference: today(&ctx.config.schedule.timezone),
    };

    println!("Processing {} events", event_ids.len());
    let summary = ctx.driver.run(&event_ids, &options).await;

    println!("\n{}", summary);
    if mode.is_preview() {
        println!("Preview saved to {}", ctx.config.output.preview_file.display());
    }

    if cli.clean {
        clean(&[
            ctx.config.output.preview_file.as_path(),
            Path::new(&ctx.config.fetcher.debug_artifact),
        ]);
    }

    Ok(summary)
}

/// Explicit identifiers followed by the series' events, each event once.
///
/// A series page that cannot be loaded counts as an empty series.
async fn collect_event_ids(pipeline: &EventPipeline, explicit: &[String], series: Option<&str>) -> Vec<String> {
    let mut event_ids = Vec::new();
    let mut seen = HashSet::new();
    let mut add = |id: &str| {
        let key = event_slug(id).unwrap_or_else(|| id.to_string());
        if seen.insert(key) {
            event_ids.push(id.to_string());
        }
    };

    for id in explicit {
        add(id.as_str());
    }

    if let Some(series) = series {
        match pipeline.expand_series(series).await {
            Ok(listed) => {
                println!("Series {}: {} events", series, listed.len());
                for id in &listed {
                    add(id.as_str());
                }
            }
            Err(e) => {
                tracing::warn!("Could not list series {}: {}", series, e);
                eprintln!("Skipping series {}: {}", series, e);
            }
        }
    }

    event_ids
}

/// Today's date in the default event zone
fn today(zone: &str) -> NaiveDate {
    match parse_zone(zone) {
        Ok(tz) => Utc::now().with_timezone(&tz).date_naive(),
        Err(e) => {
            tracing::warn!("{}; using the UTC date", e);
            Utc::now().date_naive()
        }
    }
}

fn clean(paths: &[&Path]) {
    for path in paths {
        match std::fs::remove_file(path) {
            Ok(()) => println!("Removed {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => eprintln!("Could not remove {}: {}", path.display(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::testing::StaticPages;
    use crate::pipeline::tests::pipeline;

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_unreachable_series_keeps_explicit_ids() {
        let found = collect_event_ids(&pipeline(StaticPages::new()), &ids(&["one", "two"]), Some("bad")).await;
        assert_eq!(found, vec!["one", "two"]);
    }

    #[tokio::test]
    async fn test_series_ids_deduplicated_against_explicit_forms() {
        let pages = StaticPages::new().with_page(
            "https://pasito.fun/es/weekly",
            r#"<body><a href="/e/one">One</a><a href="/e/three">Three</a></body>"#,
        );
        let explicit = ids(&["@one", "https://pasito.fun/e/two", "two"]);

        let found = collect_event_ids(&pipeline(pages), &explicit, Some("weekly")).await;
        assert_eq!(found, vec!["@one", "https://pasito.fun/e/two", "three"]);
    }

    #[test]
    fn test_clean_removes_existing_and_ignores_missing() {
        let dir = tempfile::tempdir().unwrap();
        let preview = dir.path().join("facebook_api_preview.txt");
        let debug = dir.path().join("debug_raw_html.html");
        std::fs::write(&preview, "block").unwrap();

        clean(&[preview.as_path(), debug.as_path()]);

        assert!(!preview.exists());
        assert!(!debug.exists());
    }

    #[test]
    fn test_today_falls_back_on_unknown_zone() {
        assert_eq!(today("Nowhere/Special"), Utc::now().date_naive());
    }
}

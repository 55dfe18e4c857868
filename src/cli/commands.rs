use std::time::Duration;

use chrono::DateTime;
use futures::stream::BoxStream;
use futures::StreamExt;
use tokio::time::MissedTickBehavior;

use crate::app::{AppContext, NewsError, Result};
use crate::config::interval::{format_interval, parse_duration};
use crate::domain::{Article, DetailState, HeadlinesState, Resource};
use crate::repository::ARTICLE_NOT_FOUND;

pub async fn show_headlines(ctx: &AppContext, refresh: bool, country: Option<&str>) -> Result<()> {
    let country = country.unwrap_or(&ctx.config.api.country);

    let mut state = HeadlinesState::default();
    state.begin(refresh);

    let mut updates = ctx.repository.get_top_headlines(refresh, country);
    let refresh_error = settle_headlines(&mut updates, &mut state, refresh).await;
    if refresh_error.is_some() {
        state.error = refresh_error;
    }

    report_headlines(&state)
}

/// Follow headlines for `country`, forcing a refresh every `every`.
pub async fn watch_headlines(ctx: &AppContext, country: Option<&str>, every: &str) -> Result<()> {
    let country = country.unwrap_or(&ctx.config.api.country);
    let period = parse_duration(every).map_err(NewsError::Other)?;
    if period.is_zero() || tokio::time::Instant::now().checked_add(period).is_none() {
        return Err(NewsError::Other(format!("Invalid refresh interval: {}", every)));
    }

    println!(
        "Watching {} headlines, refreshing every {} (Ctrl-C to stop)",
        country,
        format_interval(period.as_secs())
    );

    let mut state = HeadlinesState::default();
    state.begin(false);
    let mut forced = false;
    let mut updates = ctx.repository.get_top_headlines(false, country);

    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first tick completes immediately.
    ticker.tick().await;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            update = updates.next() => {
                let Some(resource) = update else { break };
                if let Resource::Error { message, .. } = &resource {
                    match resource.data().map(Vec::len) {
                        Some(cached) if cached > 0 => {
                            eprintln!("{} (showing {} cached headlines)", message, cached)
                        }
                        _ => eprintln!("{}", message),
                    }
                }
                let printable = matches!(resource, Resource::Success(_));
                state.apply(resource, forced);
                if printable {
                    print_headlines(&state);
                }
            }
            _ = ticker.tick() => {
                if state.begin(true) {
                    tracing::info!("Refreshing {} headlines", country);
                    forced = true;
                    updates = ctx.repository.get_top_headlines(true, country);
                } else {
                    tracing::debug!("Skipping refresh, previous load still running");
                }
            }
            _ = &mut ctrl_c => {
                println!();
                break;
            }
        }
    }

    Ok(())
}

pub async fn show_article(ctx: &AppContext, url: &str, open: bool) -> Result<()> {
    let mut state = DetailState::default();
    let mut lookup = ctx.repository.get_article(url);

    while let Some(resource) = lookup.next().await {
        let settled = !matches!(resource, Resource::Loading(_));
        state.apply(resource);
        if settled {
            break;
        }
    }

    let article = settled_article(state, url)?;

    println!("{}", article.title);
    println!("{} | {}", article.source_name, article.author);
    println!("{}", format_published(&article.published_at));
    println!("{}", article.url);
    let body = article.display_body();
    if !body.is_empty() {
        println!("\n{}", body);
    }

    if open {
        open::that(&article.url)?;
    }

    Ok(())
}

pub async fn search(ctx: &AppContext, query: &str) -> Result<()> {
    let articles = ctx.repository.search_news(query).await?;

    if articles.is_empty() {
        println!("No results for \"{}\"", query);
        return Ok(());
    }

    for article in &articles {
        println!("{}", format_headline(article));
    }
    println!("\n{} results", articles.len());
    Ok(())
}

pub fn prune(ctx: &AppContext, older_than: &str) -> Result<()> {
    let age: Duration = parse_duration(older_than).map_err(NewsError::Other)?;
    let removed = ctx.repository.prune(age)?;
    println!(
        "Removed {} articles older than {}",
        removed,
        format_interval(age.as_secs())
    );
    Ok(())
}

pub fn clear(ctx: &AppContext) -> Result<()> {
    let removed = ctx.repository.clear()?;
    println!("Removed {} cached articles", removed);
    Ok(())
}

/// Drive a headline stream until its initial load has settled.
///
/// Returns the last error seen on the way, since a later `Success` clears it
/// from the state.
async fn settle_headlines(
    updates: &mut BoxStream<'static, Resource<Vec<Article>>>,
    state: &mut HeadlinesState,
    force_refresh: bool,
) -> Option<String> {
    let mut started = false;
    let mut last_error = None;
    while let Some(resource) = updates.next().await {
        let done = started && matches!(resource, Resource::Loading(false));
        started = true;
        if let Resource::Error { message, .. } = &resource {
            last_error = Some(message.clone());
        }
        state.apply(resource, force_refresh);
        if done {
            break;
        }
    }
    last_error
}

/// Print a settled headline list.
///
/// An error with nothing to show fails the command; an error over cached
/// headlines is only a warning.
fn report_headlines(state: &HeadlinesState) -> Result<()> {
    if state.is_blocking_error() {
        let message = state.error.clone().unwrap_or_default();
        return Err(NewsError::Other(message));
    }
    if let Some(error) = &state.error {
        eprintln!("Showing cached headlines: {}", error);
    }

    print_headlines(state);
    Ok(())
}

fn settled_article(state: DetailState, url: &str) -> Result<Article> {
    match (state.article, state.error) {
        (Some(article), _) => Ok(article),
        (None, Some(message)) if message != ARTICLE_NOT_FOUND => Err(NewsError::Other(message)),
        (None, _) => Err(NewsError::ArticleNotFound(url.to_string())),
    }
}

fn print_headlines(state: &HeadlinesState) {
    if state.articles.is_empty() {
        println!("No headlines");
        return;
    }

    for article in &state.articles {
        println!("{}", format_headline(article));
    }
}

fn format_headline(article: &Article) -> String {
    format!(
        "{} {} ({})\n  {}",
        format_published(&article.published_at),
        article.title,
        article.source_name,
        article.url
    )
}

fn format_published(published_at: &str) -> String {
    match DateTime::parse_from_rfc3339(published_at) {
        Ok(date) => date.format("%Y-%m-%d %H:%M").to_string(),
        Err(_) if published_at.is_empty() => " ".repeat(16),
        Err(_) => published_at.to_string(),
    }
}

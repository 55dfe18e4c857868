//! # flashnews
//!
//! Offline-first top headlines backed by a local SQLite cache.
//!
//! ## Architecture
//!
//! ```text
//! Fetcher → Normalizer → Store → Repository → CLI
//! ```
//!
//! Headline requests are stale-while-revalidate: the cached snapshot decides
//! whether a network refresh is needed, a failed refresh surfaces as an error
//! carrying the stale data, and callers then follow the live view of the store.
//!
//! ## Quick Start
//!
//! ```bash
//! # Show headlines, refreshing if the cache is older than an hour
//! flashnews headlines
//!
//! # Force a refresh for another country
//! flashnews headlines --refresh --country gb
//!
//! # Follow headlines, refreshing every 30 minutes
//! flashnews watch --every 30m
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together the config,
/// store, fetcher and repository.
pub mod app;

/// Command-line interface using clap.
///
/// - `headlines [--refresh] [--country C]` - One load, printed once settled
/// - `watch [--country C] [--every 30m]` - Follow updates with periodic refresh
/// - `show <url> [--open]` - A single cached article
/// - `search <query>` - Uncached keyword search
/// - `prune --older-than 1d` / `clear` - Cache maintenance
pub mod cli;

/// Configuration loaded from `~/.config/flashnews/config.toml`.
pub mod config;

/// Core domain models.
///
/// - [`ArticleRecord`](domain::ArticleRecord): Persisted form, keyed by URL
/// - [`Article`](domain::Article): Display form with defaults filled in
/// - [`Resource`](domain::Resource): Loading / Success / Error envelope
/// - [`HeadlinesState`](domain::HeadlinesState), [`DetailState`](domain::DetailState): Session reducers
pub mod domain;

/// Remote headline source.
///
/// - [`Fetcher`](fetcher::Fetcher): Async trait for the remote API
/// - [`HttpFetcher`](fetcher::http_fetcher::HttpFetcher): reqwest-based implementation
/// - [`SingleFlight`](fetcher::single_flight::SingleFlight): Joins concurrent identical requests
pub mod fetcher;

/// Validation of remote payloads into storable records.
pub mod normalizer;

/// Cache coordination: freshness policy, refresh and live views.
pub mod repository;

/// SQLite persistence layer.
///
/// - [`Store`](store::Store): Trait defining storage operations
/// - [`SqliteStore`](store::SqliteStore): SQLite implementation
pub mod store;

mod acquirer;
mod classifier;
mod commands;
mod config;
mod extractor;
mod model;
mod notifier;
mod scheduler;
mod storage;

use acquirer::DataAcquirer;
use acquirer::analysis::AnalysisClient;
use acquirer::fallback::CoinGeckoProvider;
use acquirer::news::NewsFeed;
use acquirer::primary::PrimaryProvider;
use classifier::NewsClassifier;
use commands::CommandContext;
use config::{AppConfig, load_config};
use extractor::{MetricExtractor, SectionSplitter};
use futures::future::join_all;
use model::{AnalysisDepth, Severity};
use notifier::NotificationCenter;
use scheduler::UpdateScheduler;
use std::sync::Arc;
use storage::{AlertStore, SettingsStore};
use tokio::sync::Mutex;
use tokio::time::Duration;
use tracing::{error, info, warn};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt::init();

    let config: Arc<AppConfig> = match load_config("config.json") {
        Ok(cfg) => Arc::new(cfg),
        Err(e) => {
            error!("Config load error: {}", e);
            return;
        }
    };

    let client = match reqwest::Client::builder()
        .user_agent("coinlens/0.1")
        .timeout(std::time::Duration::from_secs(10))
        .build()
    {
        Ok(c) => c,
        Err(e) => {
            error!("HTTP client init error: {}", e);
            return;
        }
    };

    let alerts = match AlertStore::open(&config.db_path) {
        Ok(store) => Arc::new(Mutex::new(store)),
        Err(e) => {
            error!("Failed to open alert storage: {}", e);
            return;
        }
    };
    let settings = match SettingsStore::open(&config.db_path) {
        Ok(store) => Arc::new(Mutex::new(store)),
        Err(e) => {
            error!("Failed to open settings storage: {}", e);
            return;
        }
    };

    let center = NotificationCenter::new(config.notification_ttl_ms);
    let classifier = Arc::new(NewsClassifier::new(&config.keywords));
    let acquirer = Arc::new(DataAcquirer::new(
        Box::new(PrimaryProvider::new(client.clone(), config.backend_base_url.clone())),
        Box::new(CoinGeckoProvider::new(client.clone(), config.fallback_base_url.clone())),
    ));
    let news_feed = Arc::new(NewsFeed::new(client.clone(), config.backend_base_url.clone()));
    let analysis_client = Arc::new(AnalysisClient::new(client, config.backend_base_url.clone()));
    let extractor = Arc::new(MetricExtractor::new(&config.keywords));
    let splitter = Arc::new(SectionSplitter::new());

    // The stored cadence wins over the config default when the user has
    // adjusted it in a previous session.
    let price_interval_ms = settings
        .lock()
        .await
        .refresh_interval_ms(config.price_interval_ms);

    {
        let theme = settings.lock().await.theme();
        info!("Theme preference: {}", theme);
    }

    let mut scheduler = UpdateScheduler::new();

    {
        let config = config.clone();
        let acquirer = acquirer.clone();
        let alerts = alerts.clone();
        let center = center.clone();
        scheduler.add_task(
            "prices",
            Duration::from_millis(price_interval_ms),
            Arc::new(move || {
                let config = config.clone();
                let acquirer = acquirer.clone();
                let alerts = alerts.clone();
                let center = center.clone();
                Box::pin(async move {
                    refresh_prices(&config, &acquirer, &alerts, &center).await;
                })
            }),
        );
    }

    {
        let config = config.clone();
        let news_feed = news_feed.clone();
        let classifier = classifier.clone();
        scheduler.add_task(
            "news",
            Duration::from_millis(config.news_interval_ms),
            Arc::new(move || {
                let config = config.clone();
                let news_feed = news_feed.clone();
                let classifier = classifier.clone();
                Box::pin(async move {
                    refresh_news(&config, &news_feed, &classifier).await;
                })
            }),
        );
    }

    let scheduler = Arc::new(scheduler);
    info!(
        "Scheduler running: prices every {}ms, news every {}ms",
        price_interval_ms, config.news_interval_ms
    );

    commands::spawn_listener(Arc::new(CommandContext {
        config: config.clone(),
        alerts: alerts.clone(),
        settings: settings.clone(),
        center: center.clone(),
        scheduler: scheduler.clone(),
        analysis: analysis_client.clone(),
        extractor: extractor.clone(),
        splitter: splitter.clone(),
    }));

    // Run one quick analysis up front so the inline panel has content
    // before the first user request.
    if let Some(symbol) = config.symbols.first() {
        run_analysis(
            symbol,
            AnalysisDepth::Quick,
            &analysis_client,
            &extractor,
            &splitter,
            &center,
        )
        .await;
    }

    // Kick both tasks once instead of waiting out the first interval.
    if let Some(task) = scheduler.task("prices") {
        task.refresh_now();
    }
    if let Some(task) = scheduler.task("news") {
        task.refresh_now();
    }

    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutting down"),
        Err(e) => error!("Signal handler error: {}", e),
    }
}

/// One price refresh pass over all watched symbols. Quotes feed alert
/// evaluation; a both-tiers failure becomes a placeholder plus an error
/// notification, never a crash.
async fn refresh_prices(
    config: &AppConfig,
    acquirer: &DataAcquirer,
    alerts: &Mutex<AlertStore>,
    center: &NotificationCenter,
) {
    let fetches = config.symbols.iter().map(|symbol| acquirer.fetch(symbol));
    for (symbol, result) in config.symbols.iter().zip(join_all(fetches).await) {
        match result {
            Ok(quote) => {
                info!(
                    "{}: {:?} USD ({:?} change, {:?} tier)",
                    symbol, quote.price_usd, quote.change_24h_pct, quote.tier
                );
                let triggered = alerts.lock().await.evaluate(&quote);
                for alert in triggered {
                    center.notify(
                        format!(
                            "Alert: {} is {} ${:.2} (now ${:.2})",
                            alert.symbol_id,
                            alert.condition.as_str(),
                            alert.threshold_price,
                            quote.price_usd.unwrap_or_default(),
                        ),
                        Severity::Warning,
                    );
                }
            }
            Err(e) => {
                warn!("Price refresh failed for {}: {}", symbol, e);
                center.notify(
                    format!("Price data unavailable for {}", symbol),
                    Severity::Error,
                );
            }
        }
    }
}

/// One news refresh pass; items arrive already classified (the feed falls
/// back to the local sample on failure, so this never errors).
async fn refresh_news(config: &AppConfig, feed: &NewsFeed, classifier: &NewsClassifier) {
    let items = feed.fetch(config.news_limit, classifier).await;
    info!("News refresh: {} items", items.len());
    for item in &items {
        info!("[{:?}/{:?}] {} ({})", item.category, item.sentiment, item.title, item.source);
    }
}

/// Runs one analysis request and turns the opaque text into sections and
/// metrics for the presentation boundary. Extraction itself is total;
/// structureless text degrades to defaults silently.
async fn run_analysis(
    symbol: &str,
    depth: AnalysisDepth,
    client: &AnalysisClient,
    extractor: &MetricExtractor,
    splitter: &SectionSplitter,
    center: &NotificationCenter,
) {
    info!("Running analysis for {} ({:?})", symbol, depth);
    let document = match client.run(symbol, depth).await {
        Ok(doc) => doc,
        Err(e) => {
            warn!("Analysis request failed for {}: {}", symbol, e);
            center.notify(format!("Analysis unavailable for {}", symbol), Severity::Error);
            return;
        }
    };

    for metric in extractor.extract(&document.raw_text) {
        info!("Metric {}: {} ({:?})", metric.label, metric.value, metric.classification);
    }
    for section in splitter.split(&document.raw_text) {
        info!(
            "Section '{}': {} fragments, {} metrics",
            section.title,
            section.body_fragments.len(),
            section.metrics.len()
        );
    }
    center.notify(format!("Analysis complete for {}", symbol), Severity::Success);
}

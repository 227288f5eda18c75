// Interactive command surface: the user-action entry point for alerts,
// settings, lifecycle simulation and manual refresh.
use crate::acquirer::analysis::AnalysisClient;
use crate::config::AppConfig;
use crate::extractor::{MetricExtractor, SectionSplitter};
use crate::model::{AlertCondition, AlertDraft, AnalysisDepth, Severity};
use crate::notifier::NotificationCenter;
use crate::scheduler::{LifecycleSignal, UpdateScheduler};
use crate::storage::{AlertStore, SettingsStore};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;
use tokio::time::Duration;
use tracing::{info, warn};

/// Cadences below this would hammer the price providers continuously, and
/// a bad value persists across restarts.
pub const MIN_REFRESH_INTERVAL_MS: u64 = 1_000;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    AlertAdd { symbol: String, condition: AlertCondition, price: f64 },
    AlertList,
    Theme(String),
    Interval(u64),
    Analyze { symbol: String, depth: AnalysisDepth },
    Refresh,
    Lifecycle(LifecycleSignal),
    Notifications,
    Dismiss(u64),
    Config,
}

/// Structural parse only; value checks (positive threshold and so on) stay
/// with the owning components.
pub fn parse_command(line: &str) -> Option<Command> {
    let mut parts = line.split_whitespace();
    let head = parts.next()?;

    match head {
        "/help" => Some(Command::Help),
        "/alert" => {
            let symbol = parts.next()?.to_string();
            let condition = AlertCondition::parse(parts.next()?)?;
            let price: f64 = parts.next()?.parse().ok()?;
            Some(Command::AlertAdd { symbol, condition, price })
        }
        "/alerts" => Some(Command::AlertList),
        "/theme" => Some(Command::Theme(parts.next()?.to_string())),
        "/interval" => {
            let ms: u64 = parts.next()?.parse().ok()?;
            Some(Command::Interval(ms))
        }
        "/analyze" => {
            let symbol = parts.next()?.to_string();
            let depth = match parts.next() {
                Some("quick") => AnalysisDepth::Quick,
                Some("deep") => AnalysisDepth::Deep,
                Some("standard") | None => AnalysisDepth::Standard,
                Some(_) => return None,
            };
            Some(Command::Analyze { symbol, depth })
        }
        "/refresh" => Some(Command::Refresh),
        "/hide" => Some(Command::Lifecycle(LifecycleSignal::Hidden)),
        "/show" => Some(Command::Lifecycle(LifecycleSignal::Visible)),
        "/offline" => Some(Command::Lifecycle(LifecycleSignal::Offline)),
        "/online" => Some(Command::Lifecycle(LifecycleSignal::Online)),
        "/notifications" => Some(Command::Notifications),
        "/dismiss" => {
            let id: u64 = parts.next()?.parse().ok()?;
            Some(Command::Dismiss(id))
        }
        "/config" => Some(Command::Config),
        _ => None,
    }
}

pub struct CommandContext {
    pub config: Arc<AppConfig>,
    pub alerts: Arc<Mutex<AlertStore>>,
    pub settings: Arc<Mutex<SettingsStore>>,
    pub center: NotificationCenter,
    pub scheduler: Arc<UpdateScheduler>,
    pub analysis: Arc<AnalysisClient>,
    pub extractor: Arc<MetricExtractor>,
    pub splitter: Arc<SectionSplitter>,
}

/// Reads commands from stdin for the lifetime of the process.
pub fn spawn_listener(ctx: Arc<CommandContext>) {
    tokio::spawn(async move {
        info!("Command listener started, type /help for commands");
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    match parse_command(trimmed) {
                        Some(cmd) => handle_command(cmd, &ctx).await,
                        None => println!("Unknown command. Type /help for a list."),
                    }
                }
                Ok(None) => {
                    info!("Command input closed");
                    break;
                }
                Err(e) => {
                    warn!("Command input error: {}", e);
                    break;
                }
            }
        }
    });
}

pub async fn handle_command(command: Command, ctx: &CommandContext) {
    info!("Handling command: {:?}", command);
    match command {
        Command::Help => {
            println!(
                "Available commands:\n\
                 /alert <symbol> <above|below> <price> - add a price alert\n\
                 /alerts - list alerts\n\
                 /analyze <symbol> [quick|standard|deep] - run analysis\n\
                 /theme <name> - set theme preference\n\
                 /interval <ms> - set price refresh cadence\n\
                 /refresh - refresh prices and news now\n\
                 /hide /show /offline /online - simulate page lifecycle\n\
                 /config - show watched symbols and cadence\n\
                 /notifications - show live notifications\n\
                 /dismiss <id> - dismiss a notification early\n\
                 /help - this list"
            );
        }
        Command::AlertAdd { symbol, condition, price } => {
            let draft = AlertDraft {
                symbol_id: symbol,
                condition,
                threshold_price: price,
            };
            match ctx.alerts.lock().await.add(&draft) {
                Ok(alert) => {
                    println!(
                        "Alert #{}: {} {} ${:.2}",
                        alert.id,
                        alert.symbol_id,
                        alert.condition.as_str(),
                        alert.threshold_price
                    );
                    ctx.center.notify(
                        format!("Alert created for {}", alert.symbol_id),
                        Severity::Success,
                    );
                }
                Err(e) => println!("Alert rejected: {}", e),
            }
        }
        Command::AlertList => {
            let alerts = ctx.alerts.lock().await.list();
            if alerts.is_empty() {
                println!("No alerts.");
            }
            for alert in alerts {
                println!(
                    "#{} {} {} ${:.2} [{}]",
                    alert.id,
                    alert.symbol_id,
                    alert.condition.as_str(),
                    alert.threshold_price,
                    if alert.active { "active" } else { "triggered" }
                );
            }
        }
        Command::Theme(theme) => {
            match ctx.settings.lock().await.set_theme(&theme) {
                Ok(()) => println!("Theme set to {}", theme),
                Err(e) => warn!("Theme save failed: {}", e),
            }
        }
        Command::Interval(ms) => {
            if ms < MIN_REFRESH_INTERVAL_MS {
                println!(
                    "Interval too small: minimum is {}ms",
                    MIN_REFRESH_INTERVAL_MS
                );
                return;
            }
            if let Err(e) = ctx.settings.lock().await.set_refresh_interval_ms(ms) {
                warn!("Interval save failed: {}", e);
            }
            if let Some(task) = ctx.scheduler.task("prices") {
                task.reschedule(Duration::from_millis(ms));
            }
            println!("Price refresh interval set to {}ms", ms);
        }
        Command::Analyze { symbol, depth } => {
            crate::run_analysis(
                &symbol,
                depth,
                &ctx.analysis,
                &ctx.extractor,
                &ctx.splitter,
                &ctx.center,
            )
            .await;
        }
        Command::Refresh => {
            if let Some(task) = ctx.scheduler.task("prices") {
                task.refresh_now();
            }
            if let Some(task) = ctx.scheduler.task("news") {
                task.refresh_now();
            }
            println!("Refresh requested.");
        }
        Command::Lifecycle(signal) => {
            ctx.scheduler.deliver(signal);
            println!("Lifecycle signal delivered: {:?}", signal);
        }
        Command::Dismiss(id) => {
            if ctx.center.dismiss(id) {
                println!("Notification {} dismissed.", id);
            } else {
                println!("No live notification with id {}.", id);
            }
        }
        Command::Config => {
            println!(
                "Watching: {}\nBackend: {}\nNews every {}ms, limit {}",
                ctx.config.symbols.join(", "),
                ctx.config.backend_base_url,
                ctx.config.news_interval_ms,
                ctx.config.news_limit
            );
        }
        Command::Notifications => {
            let active = ctx.center.active();
            if active.is_empty() {
                println!("No live notifications.");
            }
            for n in active {
                println!("[{:?}] {}", n.severity, n.message);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_context() -> Arc<CommandContext> {
        let config: AppConfig = serde_json::from_str(
            r#"{ "backend_base_url": "http://localhost:5000", "symbols": ["bitcoin"] }"#,
        )
        .unwrap();
        let client = reqwest::Client::new();
        Arc::new(CommandContext {
            config: Arc::new(config),
            alerts: Arc::new(Mutex::new(AlertStore::open_in_memory().unwrap())),
            settings: Arc::new(Mutex::new(SettingsStore::open_in_memory().unwrap())),
            center: NotificationCenter::new(5_000),
            scheduler: Arc::new(UpdateScheduler::new()),
            analysis: Arc::new(AnalysisClient::new(client, "http://localhost:5000")),
            extractor: Arc::new(MetricExtractor::new(&crate::config::KeywordConfig::default())),
            splitter: Arc::new(SectionSplitter::new()),
        })
    }

    #[tokio::test]
    async fn sub_second_interval_is_rejected_before_persisting() {
        let ctx = test_context();

        handle_command(Command::Interval(0), &ctx).await;
        assert_eq!(ctx.settings.lock().await.refresh_interval_ms(30_000), 30_000);

        handle_command(Command::Interval(MIN_REFRESH_INTERVAL_MS - 1), &ctx).await;
        assert_eq!(ctx.settings.lock().await.refresh_interval_ms(30_000), 30_000);

        handle_command(Command::Interval(5_000), &ctx).await;
        assert_eq!(ctx.settings.lock().await.refresh_interval_ms(30_000), 5_000);
    }

    #[test]
    fn alert_command_parses_fields() {
        let cmd = parse_command("/alert bitcoin above 50000").unwrap();
        assert_eq!(
            cmd,
            Command::AlertAdd {
                symbol: "bitcoin".to_string(),
                condition: AlertCondition::Above,
                price: 50_000.0,
            }
        );
    }

    #[test]
    fn malformed_alert_command_is_rejected() {
        assert!(parse_command("/alert bitcoin sideways 50000").is_none());
        assert!(parse_command("/alert bitcoin above not-a-price").is_none());
        assert!(parse_command("/alert").is_none());
    }

    #[test]
    fn analyze_defaults_to_standard_depth() {
        let cmd = parse_command("/analyze ethereum").unwrap();
        assert_eq!(
            cmd,
            Command::Analyze {
                symbol: "ethereum".to_string(),
                depth: AnalysisDepth::Standard,
            }
        );
        assert!(parse_command("/analyze ethereum shallow").is_none());
    }

    #[test]
    fn lifecycle_commands_map_to_signals() {
        assert_eq!(
            parse_command("/hide").unwrap(),
            Command::Lifecycle(LifecycleSignal::Hidden)
        );
        assert_eq!(
            parse_command("/online").unwrap(),
            Command::Lifecycle(LifecycleSignal::Online)
        );
    }

    #[test]
    fn unknown_input_yields_none() {
        assert!(parse_command("hello").is_none());
        assert!(parse_command("/top5").is_none());
    }
}

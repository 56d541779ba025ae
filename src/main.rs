use futures::future::join_all;
use kline_sniper::analyzer::TrendAnalyzer;
use kline_sniper::config::{load_config, AppConfig};
use kline_sniper::fetcher::BinanceFetcher;
use kline_sniper::normalizer::normalize_symbols;
use kline_sniper::notifier::TelegramNotifier;
use kline_sniper::report::{build_symbol_report, write_report, MarketReport};
use kline_sniper::storage::SqliteStorage;
use std::sync::Arc;
use tokio::sync::{Mutex, Notify};
use tokio::time::{sleep, Duration};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Set panic hook to log details about any panic
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("😱 Panic occurred: {:?}", panic_info);
    }));

    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config.json".to_string());
    let config: Arc<AppConfig> = match load_config(&config_path) {
        Ok(mut cfg) => {
            cfg.symbols = normalize_symbols(&cfg.symbols);
            Arc::new(cfg)
        }
        Err(e) => {
            error!("Config load error ({}): {}", config_path, e);
            return;
        }
    };

    let fetcher = match BinanceFetcher::new(&config.api_base_url) {
        Ok(f) => f,
        Err(e) => {
            error!("Failed to build HTTP client: {}", e);
            return;
        }
    };
    let analyzer = TrendAnalyzer::new(config.analysis.clone());

    let storage = match SqliteStorage::new(&config.database_path) {
        Ok(s) => Arc::new(Mutex::new(s)),
        Err(e) => {
            error!("Failed to initialize storage: {:?}", e);
            return;
        }
    };

    let refresh_notify = Arc::new(Notify::new());
    let latest_report = Arc::new(Mutex::new(MarketReport::default()));

    let notifier = if config.telegram_enabled() {
        match TelegramNotifier::new(
            config.clone(),
            storage.clone(),
            latest_report.clone(),
            refresh_notify.clone(),
        ) {
            Ok(n) => Some(Arc::new(n)),
            Err(e) => {
                warn!("Telegram disabled: {}", e);
                None
            }
        }
    } else {
        info!("Telegram token/chat id not set; notifications disabled.");
        None
    };

    if let Some(notifier) = &notifier {
        if let Err(e) = notifier.set_my_commands().await {
            warn!("setMyCommands failed: {:?}", e);
        }
        TelegramNotifier::spawn_listener(notifier.clone());

        info!("Sending startup message...");
        if let Err(e) = notifier.notify_text("🚀 KlineSniper started!").await {
            warn!("Startup notification failed: {:?}", e);
        }
    }

    loop {
        info!(
            "Analyzing {} symbols on {:?}...",
            config.symbols.len(),
            config.intervals
        );

        let tasks: Vec<_> = config
            .symbols
            .iter()
            .map(|symbol| build_symbol_report(&fetcher, &analyzer, symbol, &config.intervals, config.kline_limit))
            .collect();

        let mut reports = Vec::new();
        for (symbol, outcome) in config.symbols.iter().zip(join_all(tasks).await) {
            match outcome {
                Ok(report) => {
                    info!("✅ {} analysis completed: {}", symbol, report.current_trend());
                    reports.push(report);
                }
                Err(e) => warn!("❌ Skipping {}: {}", symbol, e),
            }
        }
        let market = MarketReport::new(reports);

        if let Err(e) = write_report(&config.report_path, &market) {
            warn!("Report write failed: {}", e);
        }

        {
            let storage_guard = storage.lock().await;
            for report in market.reports() {
                if let Err(e) = storage_guard.save_report(report) {
                    warn!("DB save error for {}: {:?}", report.symbol, e);
                }
            }
        }

        if let Some(notifier) = &notifier {
            notifier.dispatch_signals(&market).await;
        }
        *latest_report.lock().await = market;

        if config.check_interval_seconds == 0 {
            info!("Single pass finished.");
            break;
        }

        info!(
            "Waiting for timer ({}s) or manual refresh...",
            config.check_interval_seconds
        );
        tokio::select! {
            _ = sleep(Duration::from_secs(config.check_interval_seconds)) => {
                info!("Timer triggered.");
            }
            _ = refresh_notify.notified() => {
                info!("Manual refresh triggered.");
            }
        }
    }
}

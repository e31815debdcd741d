//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::fs_cache_adapter::{FsCacheAdapter, DEFAULT_CACHE_DIR};
use crate::adapters::sleep_pacer::SleepPacer;
use crate::adapters::yahoo_adapter::YahooAdapter;
use crate::domain::acquisition::{
    download_tickers, validate_tickers, DownloadOptions, DEFAULT_DELAY_MS,
};
use crate::domain::error::StockdeckError;
use crate::domain::tickers::parse_tickers;
use crate::ports::cache_port::CachePort;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_LISTEN: &str = "127.0.0.1:8050";

#[derive(Parser, Debug)]
#[command(
    name = "stockdeck",
    about = "Equity data downloader and portfolio dashboard"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Download historical and fundamental data into the cache
    Download {
        /// Comma/space separated ticker list; prompts when omitted
        #[arg(short, long)]
        tickers: Option<String>,
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Cache root directory
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Skip provider-side ticker validation
        #[arg(long)]
        no_validate: bool,
        /// Delay between consecutive downloads, in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,
        /// Skip the financial statement datasets
        #[arg(long)]
        skip_fundamentals: bool,
    },
    /// Check tickers against the provider without downloading
    Validate {
        #[arg(short, long)]
        tickers: String,
    },
    /// Show cached record counts and date ranges
    Info {
        #[arg(long)]
        ticker: Option<String>,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Start the dashboard server over the cached data
    Serve {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Listen address, e.g. 127.0.0.1:8050
        #[arg(long)]
        listen: Option<String>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Download {
            tickers,
            config,
            data_dir,
            no_validate,
            delay_ms,
            skip_fundamentals,
        } => run_download(
            tickers.as_deref(),
            config.as_ref(),
            data_dir,
            no_validate,
            delay_ms,
            skip_fundamentals,
        ),
        Command::Validate { tickers } => run_validate(&tickers),
        Command::Info {
            ticker,
            config,
            data_dir,
        } => run_info(ticker.as_deref(), config.as_ref(), data_dir),
        Command::Serve {
            config,
            data_dir,
            listen,
        } => run_serve(config.as_ref(), data_dir, listen.as_deref()),
    }
}

pub fn load_config(path: Option<&PathBuf>) -> Result<FileConfigAdapter, ExitCode> {
    match path {
        Some(path) => FileConfigAdapter::from_file(path).map_err(|e| {
            let err = StockdeckError::ConfigParse {
                file: path.display().to_string(),
                reason: e.to_string(),
            };
            eprintln!("error: {err}");
            (&err).into()
        }),
        None => Ok(FileConfigAdapter::empty()),
    }
}

fn resolve_cache(data_dir: Option<PathBuf>, config: &dyn ConfigPort) -> FsCacheAdapter {
    let dir = data_dir.unwrap_or_else(|| {
        PathBuf::from(
            config
                .get_string("cache", "dir")
                .unwrap_or_else(|| DEFAULT_CACHE_DIR.to_string()),
        )
    });
    FsCacheAdapter::new(dir)
}

fn make_provider() -> Result<YahooAdapter, ExitCode> {
    YahooAdapter::new().map_err(|e| {
        eprintln!("error: {e}");
        (&e).into()
    })
}

fn prompt_for_tickers() -> String {
    eprint!("Enter stock tickers (space or comma separated): ");
    let _ = io::stderr().flush();

    let stdin = io::stdin();
    stdin
        .lock()
        .lines()
        .next()
        .unwrap_or(Ok(String::new()))
        .unwrap_or_default()
}

fn run_download(
    tickers: Option<&str>,
    config_path: Option<&PathBuf>,
    data_dir: Option<PathBuf>,
    no_validate: bool,
    delay_ms: Option<u64>,
    skip_fundamentals: bool,
) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(code) => return code,
    };

    let input = match tickers {
        Some(input) => input.to_string(),
        None => prompt_for_tickers(),
    };
    let tickers = parse_tickers(&input);
    if tickers.is_empty() {
        eprintln!("error: no tickers given");
        return ExitCode::from(2);
    }

    let cache = resolve_cache(data_dir, &config);
    let provider = match make_provider() {
        Ok(provider) => provider,
        Err(code) => return code,
    };
    let pacer = SleepPacer;

    let options = DownloadOptions {
        validate_first: !no_validate && config.get_bool("download", "validate_first", true),
        delay: Duration::from_millis(delay_ms.unwrap_or_else(|| {
            config.get_int("download", "delay_ms", DEFAULT_DELAY_MS as i64) as u64
        })),
        fundamentals: !skip_fundamentals && config.get_bool("download", "fundamentals", true),
    };

    let results = match download_tickers(&provider, &cache, &pacer, &tickers, &options) {
        Ok(results) => results,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Reload what was written and report record counts, the way the cache
    // will be seen by the dashboard.
    let mut loaded = 0usize;
    for (ticker, report) in &results {
        if !report.success {
            continue;
        }
        if let Some(bars) = cache.load_history(ticker) {
            match (bars.first(), bars.last()) {
                (Some(first), Some(last)) => {
                    println!(
                        "{}: {} records from {} to {}, latest close: {:.2}",
                        ticker,
                        bars.len(),
                        first.date,
                        last.date,
                        last.close
                    );
                    loaded += 1;
                }
                _ => eprintln!("{}: cached file is empty", ticker),
            }
        }
    }
    eprintln!("Loaded data for {} ticker(s)", loaded);

    ExitCode::SUCCESS
}

fn run_validate(tickers: &str) -> ExitCode {
    let tickers = parse_tickers(tickers);
    if tickers.is_empty() {
        eprintln!("error: no tickers given");
        return ExitCode::from(2);
    }

    let provider = match make_provider() {
        Ok(provider) => provider,
        Err(code) => return code,
    };

    let results = validate_tickers(&provider, &tickers);
    for (ticker, valid) in &results {
        println!("{}\t{}", ticker, if *valid { "valid" } else { "invalid" });
    }

    ExitCode::SUCCESS
}

fn run_info(
    ticker: Option<&str>,
    config_path: Option<&PathBuf>,
    data_dir: Option<PathBuf>,
) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(code) => return code,
    };
    let cache = resolve_cache(data_dir, &config);

    let tickers = match ticker {
        Some(ticker) => vec![ticker.to_uppercase()],
        None => match cache.list_cached_tickers() {
            Ok(tickers) => tickers,
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        },
    };

    if tickers.is_empty() {
        eprintln!("No cached tickers in {}", cache.root().display());
        return ExitCode::SUCCESS;
    }

    for ticker in &tickers {
        match cache.load_history(ticker) {
            Some(bars) => match (bars.first(), bars.last()) {
                (Some(first), Some(last)) => println!(
                    "{}: {} records, {} to {}",
                    ticker,
                    bars.len(),
                    first.date,
                    last.date
                ),
                _ => eprintln!("{}: cached file is empty", ticker),
            },
            None => eprintln!("{}: no cached data", ticker),
        }
    }

    if ticker.is_none() {
        if let Ok(files) = cache.list_root_files() {
            if !files.is_empty() {
                eprintln!("Cache-root files: {}", files.join(", "));
            }
        }
    }

    ExitCode::SUCCESS
}

fn run_serve(
    config_path: Option<&PathBuf>,
    data_dir: Option<PathBuf>,
    listen: Option<&str>,
) -> ExitCode {
    #[cfg(feature = "web")]
    {
        use crate::adapters::web::{build_router, AppState};
        use crate::domain::portfolio::PortfolioData;
        use std::net::SocketAddr;
        use std::sync::Arc;

        let config = match load_config(config_path) {
            Ok(config) => config,
            Err(code) => return code,
        };
        let cache = resolve_cache(data_dir, &config);

        let portfolio = PortfolioData::load(&cache);
        eprintln!(
            "Loaded {} ticker(s) from {}",
            portfolio.len(),
            cache.root().display()
        );

        let fallback = SocketAddr::from(([127, 0, 0, 1], 8050));
        let addr: SocketAddr = listen
            .map(str::to_string)
            .or_else(|| config.get_string("web", "listen"))
            .unwrap_or_else(|| DEFAULT_LISTEN.to_string())
            .parse()
            .unwrap_or(fallback);

        eprintln!("Starting dashboard on http://{}", addr);

        let state = AppState {
            portfolio: Arc::new(portfolio),
        };
        let router = build_router(state);

        let runtime = match tokio::runtime::Runtime::new() {
            Ok(runtime) => runtime,
            Err(e) => {
                eprintln!("error: failed to start runtime: {e}");
                return ExitCode::from(1);
            }
        };

        runtime.block_on(async {
            let listener = match tokio::net::TcpListener::bind(addr).await {
                Ok(listener) => listener,
                Err(e) => {
                    eprintln!("error: failed to bind {addr}: {e}");
                    return ExitCode::from(1);
                }
            };
            match axum::serve(listener, router).await {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    eprintln!("error: server stopped: {e}");
                    ExitCode::from(1)
                }
            }
        })
    }

    #[cfg(not(feature = "web"))]
    {
        let _ = (config_path, data_dir, listen);
        eprintln!("error: web feature is required for serve");
        ExitCode::from(1)
    }
}

//! # lg: Leadgrid command line
//!
//! - `lg query --param status=open,claimed --pages 2`: fetch and print pages.
//! - `lg facets --field status`: print facet counts for a search.
//! - `lg tail`: poll for new rows and print them as they arrive.
//! - `lg key --param size=20`: print the canonical cache key of a search.
//!
//! The hub is reached at `LG_BASE_URL` (default `http://127.0.0.1:3000`).

use clap::{Args, Parser, Subcommand};
use lg_core::params::{self, codec};
use lg_core::{time, Direction, SearchParams};

mod client;
mod live;
mod pages;
mod render;

use client::{ClientError, LeadsClient};
use live::{LiveFeed, LivePoller};
use pages::PageCache;

/// Leadgrid: query the leads table from the terminal.
#[derive(Parser)]
#[command(name = "lg", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct SearchArgs {
    /// Query parameter as `key=value` (repeatable), e.g. `status=open,claimed`.
    #[arg(long = "param", short = 'p', value_name = "KEY=VALUE")]
    params: Vec<String>,

    /// Sort as `<field>.<asc|desc>`.
    #[arg(long)]
    sort: Option<String>,

    /// Page size.
    #[arg(long)]
    size: Option<u32>,

    /// Registered table to query instead of `leads`.
    #[arg(long)]
    table: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch pages of rows, following `nextCursor`.
    Query {
        #[command(flatten)]
        search: SearchArgs,

        /// Number of pages to fetch.
        #[arg(long, default_value_t = 1)]
        pages: usize,
    },

    /// Print facet counts for a search.
    Facets {
        #[command(flatten)]
        search: SearchArgs,

        /// Only this field.
        #[arg(long)]
        field: Option<String>,
    },

    /// Live mode: print new rows as they arrive.
    Tail {
        #[command(flatten)]
        search: SearchArgs,

        /// Seconds between polls.
        #[arg(long, default_value_t = 4)]
        interval: u64,

        /// Longest wait in seconds between retries after failed polls.
        #[arg(long, default_value_t = 60)]
        max_backoff: u64,
    },

    /// Print the canonical cache key of a search.
    Key {
        #[command(flatten)]
        search: SearchArgs,
    },
}

impl SearchArgs {
    /// Build the search the same way the hub decodes a query string.
    fn to_params(&self) -> SearchParams {
        let mut pairs: Vec<(String, String)> = self
            .params
            .iter()
            .filter_map(|raw| match raw.split_once('=') {
                Some((key, value)) => Some((key.to_string(), value.to_string())),
                None => {
                    eprintln!("Ignoring --param {:?}: expected KEY=VALUE", raw);
                    None
                }
            })
            .collect();
        if let Some(sort) = &self.sort {
            pairs.push(("sort".into(), sort.clone()));
        }
        if let Some(size) = self.size {
            pairs.push(("size".into(), size.to_string()));
        }
        codec::from_pairs(pairs, time::now_millis(), params::DEFAULT_PAGE_SIZE)
    }
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Key { search } => {
            println!("{}", params::cache_key(&search.to_params()));
        }

        // Async Commands
        cmd => {
            let rt = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    eprintln!("Failed to build tokio runtime: {}", e);
                    std::process::exit(1);
                }
            };

            if let Err(e) = rt.block_on(async_main(cmd)) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }
}

async fn async_main(cmd: Commands) -> Result<(), ClientError> {
    let base_url =
        std::env::var("LG_BASE_URL").unwrap_or_else(|_| "http://127.0.0.1:3000".to_string());

    match cmd {
        Commands::Query { search, pages } => {
            let client = LeadsClient::new(base_url, search.table.clone());
            let mut current = search.to_params();
            let mut cache = PageCache::new();
            cache.select(&params::cache_key(&current));

            for _ in 0..pages.max(1) {
                let page = client.fetch(&current).await?;
                let Some(next) = page.next_cursor else {
                    cache.push_next(page);
                    break;
                };
                cache.push_next(page);
                match time::from_millis(next) {
                    Some(cursor) => current.cursor = cursor,
                    None => break,
                }
            }

            println!("{}", render::rows(cache.rows()));
            if let Some(meta) = cache.meta() {
                println!(
                    "{} of {} rows match, {} shown",
                    meta.filter_row_count,
                    meta.total_row_count,
                    cache.len()
                );
                println!("{}", render::percentiles(&meta.metadata.current_percentiles));
            }
            match cache.next_cursor() {
                Some(next) => println!("next cursor: {}", next),
                None => println!("no more rows"),
            }
        }

        Commands::Facets { search, field } => {
            let client = LeadsClient::new(base_url, search.table.clone());
            let page = client.fetch(&search.to_params()).await?;
            println!("{}", render::facets(&page.meta.facets, field.as_deref()));
        }

        Commands::Tail {
            search,
            interval,
            max_backoff,
        } => {
            let client = LeadsClient::new(base_url, search.table.clone());
            let current = search.to_params();
            let mut cache = PageCache::new();
            cache.select(&params::cache_key(&current));

            let first = client.fetch(&current).await?;
            cache.push_next(first);
            println!("{}", render::rows(cache.rows()));

            let (stop_tx, stop_rx) = tokio::sync::watch::channel(false);
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    stop_tx.send_replace(true);
                }
            });

            let mut feed = TailFeed {
                client,
                search: current,
                cache,
            };
            let interval = std::time::Duration::from_secs(interval.max(1));
            let max_backoff = std::time::Duration::from_secs(max_backoff).max(interval);
            let mut poller = LivePoller::new(interval).with_max_backoff(max_backoff);
            let received = poller.run(&mut feed, stop_rx).await;
            eprintln!("Stopped after {} new rows", received);
        }

        Commands::Key { .. } => {}
    }

    Ok(())
}

/// Live pages for `lg tail`: everything newer than the newest cached row.
struct TailFeed {
    client: LeadsClient,
    search: SearchParams,
    cache: PageCache,
}

#[async_trait::async_trait]
impl LiveFeed for TailFeed {
    type Error = ClientError;

    async fn poll(&mut self) -> Result<usize, ClientError> {
        let now = time::now_millis();
        let mut live = self.search.clone();
        live.direction = Direction::Prev;
        live.live = true;
        live.cursor = self
            .cache
            .prev_cursor()
            .and_then(time::from_millis)
            .unwrap_or(now);

        let page = self.client.fetch(&live).await?;
        let added = self.cache.push_prev(page);
        if added > 0 {
            println!("{}", render::rows(&self.cache.rows()[..added]));
        }
        Ok(added)
    }
}

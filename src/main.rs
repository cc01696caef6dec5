use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use log::{info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use threadview::{
    FillDecision, ListConfig, MemoryFetcher, MemoryIndex, MessageId, MessageRecord, QueryCache,
    ThreadId, ThreadView,
};

// Walks a simulated chat thread: fills a fake viewport, then jumps to a message.
//
// Usage:
//   cargo run -- --messages 500 --target 3        # jump to the 4th-oldest message
//   cargo run -- --missing                        # jump to an id that doesn't exist
//   cargo run -- --fail-every 7 --config list.json

const ROW_HEIGHT: f32 = 48.0;
const VIEWPORT_HEIGHT: f32 = 800.0;
const MAX_LAYOUT_PASSES: usize = 200;

#[derive(Parser, Debug)]
#[command(about = "Scroll through a simulated chat thread")]
struct Args {
    /// Messages in the thread.
    #[arg(short = 'n', long, default_value_t = 200)]
    messages: usize,
    /// Overrides the configured page size.
    #[arg(short, long)]
    page_size: Option<usize>,
    /// Index (oldest first) of the message to jump to.
    #[arg(short, long, default_value_t = 0)]
    target: usize,
    /// Jump to an id that isn't in the thread.
    #[arg(long)]
    missing: bool,
    /// JSON list configuration.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Make every k-th message fail to load (0 disables).
    #[arg(long, default_value_t = 0)]
    fail_every: usize,
    /// Simulated fetch latency in milliseconds.
    #[arg(long, default_value_t = 5)]
    latency_ms: u64,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "{} [{:<5}] [{}] - {}",
                Utc::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();

    let mut config = match &args.config {
        Some(path) => threadview::config::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ListConfig::default(),
    };
    if let Some(page_size) = args.page_size {
        config.page_size = page_size;
    }

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("building tokio runtime")?;

    rt.block_on(run(args, config))
}

async fn run(args: Args, config: ListConfig) -> anyhow::Result<()> {
    let thread = ThreadId::new("demo");
    let ids: Vec<MessageId> = (0..args.messages)
        .map(|i| MessageId::new(format!("demo-{i}")))
        .collect();

    let fetcher = Arc::new(MemoryFetcher::with_latency(Duration::from_millis(args.latency_ms)));
    for (i, id) in ids.iter().enumerate() {
        let mut record = MessageRecord::new(id.clone(), thread.clone(), format!("user{}", i % 4), format!("message #{i}"));
        if i > 0 && i % 10 == 0 {
            record = record.with_reply_to(ids[i - 10].clone());
        }
        fetcher.put(record);
        if args.fail_every > 0 && i % args.fail_every == args.fail_every - 1 {
            fetcher.fail(id.clone());
        }
    }

    let index = Arc::new(MemoryIndex::new());
    index.seed(thread.clone(), ids.iter().cloned());
    let cache = Arc::new(QueryCache::new(fetcher.clone()));
    let view = Arc::new(ThreadView::new(config, index.clone(), cache));

    let mut events = view.events();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            info!(target: "Demo/Events", "{event:?}");
        }
    });

    view.open(thread.clone()).await?;

    // Fake layout loop: every settled row is one row tall.
    for _ in 0..MAX_LAYOUT_PASSES {
        let snapshot = view.snapshot();
        let content = snapshot.loaded_count as f32 * ROW_HEIGHT;
        match view.on_layout(content, VIEWPORT_HEIGHT) {
            FillDecision::Idle => break,
            FillDecision::Fill | FillDecision::Waiting => {
                tokio::time::sleep(Duration::from_millis(args.latency_ms.max(1))).await;
            }
        }
    }
    let snapshot = view.snapshot();
    info!(
        "Viewport filled: {} of {} messages windowed, {} loaded",
        snapshot.window_len, snapshot.total, snapshot.loaded_count
    );

    let target = if args.missing {
        MessageId::new("demo-missing")
    } else {
        ids.get(args.target)
            .cloned()
            .context("--target is past the end of the thread")?
    };
    let outcome = view.scroll_to_message(target).await;
    info!("Scroll outcome: {outcome:?}");

    index.append(&thread, MessageId::new(format!("demo-{}", args.messages)))?;
    tokio::time::sleep(Duration::from_millis(20)).await;
    let snapshot = view.snapshot();
    if snapshot.items.iter().any(|item| item.state.is_settled() && item.state.record().is_none()) {
        warn!("Some messages failed to load and render as placeholders");
    }
    info!(
        "Thread now has {} messages, window holds {}, {} fetches served",
        snapshot.total,
        snapshot.window_len,
        fetcher.fetch_count()
    );
    Ok(())
}

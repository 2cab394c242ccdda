//! Terminal front end
//!
//! Plays the UI collaborator: subscribes to pagination and image events,
//! renders them as text, and drives the controller the way scrolling would.

use std::io::{self, Write};
use std::ops::Range;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use anyhow::{anyhow, bail, Context};
use clap::Parser;
use search_app::usecases::ImageLoadEvent;
use search_core::image::ImageRef;
use search_core::observe::EventListener;
use search_core::pagination::{PageOperation, PaginationEvent, SessionSnapshot};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::bootstrap::{self, SearchServices};

/// Upper bound for one page or thumbnail round trip, transport timeout included.
const SETTLE_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Parser)]
#[command(name = "imagesearch", version, about = "Browse image search results page by page")]
pub struct Cli {
    /// Search text
    #[arg(required = true)]
    pub query: Vec<String>,

    /// Config file (defaults to <config dir>/imagesearch/config.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Number of pages to fetch
    #[arg(short, long, default_value_t = 1)]
    pub pages: usize,

    /// Number of thumbnails to download once paging is done
    #[arg(short, long, default_value_t = 0)]
    pub thumbnails: usize,

    /// Results per page, overriding the config file
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Also write logs to daily files in this directory
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = bootstrap::resolve_config(cli.config.as_deref())?;
    bootstrap::apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    if let Some(page_size) = cli.page_size.filter(|size| *size > 0) {
        config.page_size = page_size;
    }

    let services = bootstrap::wire_services(&config)?;
    browse(
        &services,
        &cli.query.join(" "),
        cli.pages,
        cli.thumbnails,
        io::stdout(),
    )
    .await
}

/// Search for `query`, page through up to `pages` pages and fetch the first
/// `thumbnails` images, rendering everything to `out`.
pub async fn browse<W>(
    services: &SearchServices,
    query: &str,
    pages: usize,
    thumbnails: usize,
    out: W,
) -> anyhow::Result<()>
where
    W: Write + Send + 'static,
{
    let controller = &services.controller;
    let view = Arc::new(TerminalView::new(out, controller.watch()));
    let _page_view = controller.subscribe(&view);
    let _image_view = services.registry.subscribe(&view);

    let (tx, mut outcomes) = mpsc::unbounded_channel();
    let tracker = Arc::new(OutcomeTracker(tx));
    let _tracker = controller.subscribe(&tracker);

    controller.set_search_text(query);
    controller.reload();
    if !await_outcome(&mut outcomes, PageOperation::Reload).await? {
        bail!("search for {query:?} failed");
    }

    for _ in 1..pages {
        if !controller.snapshot().has_more_pages() {
            info!("no more pages");
            break;
        }
        controller.load_next_page();
        if !await_outcome(&mut outcomes, PageOperation::Append).await? {
            warn!("stopping after failed page");
            break;
        }
    }

    let items: Vec<ImageRef> = controller
        .snapshot()
        .items
        .into_iter()
        .take(thumbnails)
        .collect();
    fetch_thumbnails(services, items).await
}

async fn fetch_thumbnails(services: &SearchServices, items: Vec<ImageRef>) -> anyhow::Result<()> {
    let (tx, mut done) = mpsc::unbounded_channel();
    let mut pending = 0usize;
    for item in items {
        let tx = tx.clone();
        if services.registry.request_load(item, move |id, result| {
            let _ = tx.send((id.clone(), result.is_ok()));
        }) {
            pending += 1;
        }
    }
    drop(tx);

    while pending > 0 {
        let (id, ok) = tokio::time::timeout(SETTLE_TIMEOUT, done.recv())
            .await
            .context("Timed out waiting for thumbnails")?
            .ok_or_else(|| anyhow!("thumbnail loads were cancelled"))?;
        debug!(image_id = %id, ok, "thumbnail settled");
        pending -= 1;
    }
    Ok(())
}

/// Wait for `operation` to stop loading. `Ok(false)` when it failed.
///
/// The controller reports a failure before it reports the end of loading, so
/// the first matching event decides the outcome.
async fn await_outcome(
    outcomes: &mut mpsc::UnboundedReceiver<PaginationEvent>,
    operation: PageOperation,
) -> anyhow::Result<bool> {
    tokio::time::timeout(SETTLE_TIMEOUT, async {
        loop {
            match outcomes.recv().await {
                Some(PaginationEvent::Failed { operation: op, .. }) if op == operation => {
                    return Ok(false)
                }
                Some(PaginationEvent::LoadingChanged {
                    operation: op,
                    loading: false,
                }) if op == operation => return Ok(true),
                Some(_) => {}
                None => return Err(anyhow!("pagination controller stopped")),
            }
        }
    })
    .await
    .context("Timed out waiting for search results")?
}

struct OutcomeTracker(mpsc::UnboundedSender<PaginationEvent>);

impl EventListener<PaginationEvent> for OutcomeTracker {
    fn on_event(&self, event: &PaginationEvent) {
        if matches!(
            event,
            PaginationEvent::LoadingChanged { loading: false, .. } | PaginationEvent::Failed { .. }
        ) {
            let _ = self.0.send(event.clone());
        }
    }
}

/// Renders search and image events as plain text lines.
pub struct TerminalView<W> {
    out: Mutex<W>,
    snapshot: watch::Receiver<SessionSnapshot>,
}

impl<W: Write + Send> TerminalView<W> {
    pub fn new(out: W, snapshot: watch::Receiver<SessionSnapshot>) -> Self {
        Self {
            out: Mutex::new(out),
            snapshot,
        }
    }

    fn render_page_event(&self, out: &mut W, event: &PaginationEvent) -> io::Result<()> {
        match event {
            PaginationEvent::Reset { items } if items.is_empty() => Ok(()),
            PaginationEvent::Reset { items } => {
                writeln!(out, "== {} results", items.len())?;
                for (index, item) in items.iter().enumerate() {
                    write_item(out, index, item)?;
                }
                Ok(())
            }
            PaginationEvent::Appended { range, .. } => {
                let items = self.items_in(range.clone());
                writeln!(out, "== {} more results", items.len())?;
                for (index, item) in range.clone().zip(&items) {
                    write_item(out, index, item)?;
                }
                Ok(())
            }
            PaginationEvent::LoadingChanged {
                operation,
                loading: true,
            } => writeln!(out, "... {}", label(*operation)),
            PaginationEvent::LoadingChanged { loading: false, .. } => Ok(()),
            PaginationEvent::Failed { operation, error } => {
                writeln!(out, "!! {} failed: {error}", label(*operation))
            }
        }
    }

    fn items_in(&self, range: Range<usize>) -> Vec<ImageRef> {
        let snapshot = self.snapshot.borrow();
        snapshot
            .items
            .get(range)
            .map(<[ImageRef]>::to_vec)
            .unwrap_or_default()
    }

    fn write_with<F>(&self, render: F)
    where
        F: FnOnce(&mut W) -> io::Result<()>,
    {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(err) = render(&mut *out).and_then(|_| out.flush()) {
            warn!(error = %err, "failed to write to terminal");
        }
    }
}

impl<W: Write + Send> EventListener<PaginationEvent> for TerminalView<W> {
    fn on_event(&self, event: &PaginationEvent) {
        self.write_with(|out| self.render_page_event(out, event));
    }
}

impl<W: Write + Send> EventListener<ImageLoadEvent> for TerminalView<W> {
    fn on_event(&self, event: &ImageLoadEvent) {
        self.write_with(|out| match event {
            ImageLoadEvent::Started { .. } => Ok(()),
            ImageLoadEvent::Ready { id, image } => {
                writeln!(out, "   thumbnail {id}: {}x{}", image.width, image.height)
            }
            ImageLoadEvent::Failed { id, error } => {
                writeln!(out, "   thumbnail {id} failed: {error}")
            }
        });
    }
}

fn label(operation: PageOperation) -> &'static str {
    match operation {
        PageOperation::Reload => "searching",
        PageOperation::Append => "loading next page",
    }
}

fn write_item<W: Write>(out: &mut W, index: usize, item: &ImageRef) -> io::Result<()> {
    writeln!(
        out,
        "{:>4}. {}  <{}>",
        index + 1,
        item.title.as_deref().unwrap_or("(untitled)"),
        item.source_url
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use search_core::pagination::PaginationState;
    use url::Url;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuf {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn item(n: usize) -> ImageRef {
        ImageRef::new(Url::parse(&format!("https://img.example.com/{n}.png")).unwrap())
            .with_title(format!("photo {n}"))
    }

    #[test]
    fn test_reset_lists_items_with_one_based_index() {
        let buf = SharedBuf::default();
        let (_tx, rx) = watch::channel(SessionSnapshot::default());
        let view = TerminalView::new(buf.clone(), rx);

        EventListener::<PaginationEvent>::on_event(
            &view,
            &PaginationEvent::Reset {
                items: vec![item(0), item(1)],
            },
        );

        let text = buf.text();
        assert!(text.starts_with("== 2 results\n"));
        assert!(text.contains("   1. photo 0  <https://img.example.com/0.png>"));
        assert!(text.contains("   2. photo 1"));
    }

    #[test]
    fn test_append_renders_items_from_snapshot_range() {
        let buf = SharedBuf::default();
        let snapshot = SessionSnapshot {
            state: PaginationState::Loaded,
            items: (0..4).map(item).collect(),
            next_page_cursor: None,
            search_text: Some("photo".to_string()),
        };
        let (_tx, rx) = watch::channel(snapshot);
        let view = TerminalView::new(buf.clone(), rx);

        EventListener::<PaginationEvent>::on_event(
            &view,
            &PaginationEvent::Appended {
                range: 2..4,
                count: 2,
            },
        );

        let text = buf.text();
        assert!(text.contains("== 2 more results"));
        assert!(text.contains("   3. photo 2"));
        assert!(text.contains("   4. photo 3"));
        assert!(!text.contains("photo 1"));
    }

    #[test]
    fn test_cleared_list_prints_nothing() {
        let buf = SharedBuf::default();
        let (_tx, rx) = watch::channel(SessionSnapshot::default());
        let view = TerminalView::new(buf.clone(), rx);

        EventListener::<PaginationEvent>::on_event(&view, &PaginationEvent::Reset { items: vec![] });
        assert!(buf.text().is_empty());
    }

    #[test]
    fn test_cli_parses_flags() {
        let cli = Cli::try_parse_from([
            "imagesearch",
            "--pages",
            "3",
            "-t",
            "2",
            "red",
            "panda",
        ])
        .unwrap();
        assert_eq!(cli.query, ["red", "panda"]);
        assert_eq!(cli.pages, 3);
        assert_eq!(cli.thumbnails, 2);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_cli_requires_query() {
        assert!(Cli::try_parse_from(["imagesearch"]).is_err());
    }
}

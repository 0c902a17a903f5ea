//! Logging setup for the sample binaries
//!
//! Events are rendered as `timestamp - target - LEVEL - message`, one per
//! line. The library only emits `tracing` events; installing a subscriber is
//! left to the binaries.

use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::{self, Writer};
use tracing_subscriber::fmt::time::{FormatTime, SystemTime};
use tracing_subscriber::fmt::{FmtContext, FormatEvent, MakeWriter};
use tracing_subscriber::filter::{FilterExt, LevelFilter};
use tracing_subscriber::layer::{Filter, SubscriberExt};
use tracing_subscriber::registry::{LookupSpan, Registry};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

type BoxedFilter = Box<dyn Filter<Registry> + Send + Sync + 'static>;

/// Line formatter: `timestamp - target - LEVEL - message`
pub struct LineFormatter;

impl<S, N> FormatEvent<S, N> for LineFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> format::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();

        SystemTime.format_time(&mut writer)?;
        write!(writer, " - {} - {} - ", meta.target(), meta.level())?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

/// Debug and above always pass; `extra` can only enable more
fn verbose_filter(extra: EnvFilter) -> BoxedFilter {
    LevelFilter::DEBUG.or(extra).boxed()
}

fn filter(verbose: bool) -> BoxedFilter {
    if verbose {
        verbose_filter(EnvFilter::from_default_env())
    } else {
        FilterExt::boxed(LevelFilter::WARN)
    }
}

fn build<W>(filter: BoxedFilter, make_writer: W) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::registry().with(
        fmt::layer()
            .event_format(LineFormatter)
            .with_ansi(false)
            .with_writer(make_writer)
            .with_filter(filter),
    )
}

/// Build a subscriber writing formatted lines to `make_writer`
pub fn subscriber<W>(verbose: bool, make_writer: W) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    build(filter(verbose), make_writer)
}

/// Install the global subscriber, logging to stderr
///
/// Debug output is enabled by `verbose`. In that case `RUST_LOG` may add
/// trace-level targets but never hides debug events.
pub fn init(verbose: bool) {
    subscriber(verbose, std::io::stderr).init();
}

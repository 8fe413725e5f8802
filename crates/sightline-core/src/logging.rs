//! Logging facilities for Sightline.
//!
//! Sightline uses the `tracing` crate for instrumentation. To see logs,
//! install a tracing subscriber in the host application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt::init();
//!     // Host application code...
//! }
//! ```
//!
//! All engine log events carry one of the targets below, so individual
//! subsystems can be filtered with standard `tracing` directives, e.g.
//! `RUST_LOG=sightline::filter=trace`.

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core systems target.
    pub const CORE: &str = "sightline_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "sightline_core::signal";
    /// Transition scheduler target.
    pub const SCHEDULER: &str = "sightline_core::scheduler";
    /// Filter chain target.
    pub const FILTER: &str = "sightline::filter";
    /// Selection target.
    pub const SELECTION: &str = "sightline::selection";
    /// Virtual scrolling target.
    pub const SCROLL: &str = "sightline::scroll";
    /// Mutation pipeline target.
    pub const GRID: &str = "sightline::grid";
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use tracing::subscriber::with_default;
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::{EnvFilter, Layer};

    use super::targets;

    struct CountingLayer(Arc<AtomicUsize>);

    impl<S: tracing::Subscriber> Layer<S> for CountingLayer {
        fn on_event(&self, _event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_targets_filter_by_subsystem() {
        let seen = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry()
            .with(EnvFilter::new(format!("{}=trace", targets::SCHEDULER)))
            .with(CountingLayer(Arc::clone(&seen)));

        with_default(subscriber, || {
            tracing::trace!(target: "sightline_core::scheduler", "due");
            tracing::trace!(target: "sightline_core::signal", "emitted");
        });

        // Only the scheduler event passes the directive.
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }
}

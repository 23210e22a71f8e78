//! logging — terminal slog drain for verbose runs (feature `obs_slog`).
//!
//! Components never build a logger on their own initiative: the generator
//! asks for one only when `IntegratorOpts::verbose` is set, and the Hall of
//! Fame logs only when a logger is attached with `with_logger`.
use slog::{Drain, Logger, Never, o};

/// Asynchronous terminal logger.
///
/// Records go through a bounded channel to a background thread; when the
/// channel is full, records are dropped instead of blocking the caller.
pub fn term_logger() -> Logger {
    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    async_logger(drain)
}

/// Root logger that forwards records to `drain` on a background thread.
///
/// Dropping the last clone of the returned logger flushes pending records
/// and joins the worker.
pub fn async_logger<D>(drain: D) -> Logger
where
    D: Drain<Ok = (), Err = Never> + Send + 'static,
{
    let drain = slog_async::Async::new(drain)
        .overflow_strategy(slog_async::OverflowStrategy::Drop)
        .build()
        .fuse();
    Logger::root(drain, o!("crate" => "rust_sinn"))
}

/// Drain that keeps each record message for assertions.
#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct CaptureDrain {
    messages: std::sync::Arc<std::sync::Mutex<Vec<String>>>,
}

#[cfg(test)]
impl CaptureDrain {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().map(|m| m.clone()).unwrap_or_default()
    }
}

#[cfg(test)]
impl Drain for CaptureDrain {
    type Ok = ();
    type Err = Never;

    fn log(&self, record: &slog::Record, _: &slog::OwnedKVList) -> Result<(), Never> {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(record.msg().to_string());
        }
        Ok(())
    }
}

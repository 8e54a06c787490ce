use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Trailing-edge debounce.
///
/// Every call to [`Debouncer::settle`] waits out the quiet period and then
/// reports whether it is still the most recent call. Only the last call of a
/// burst gets `true`.
#[derive(Debug)]
pub struct Debouncer {
    quiet: Duration,
    generation: AtomicU64,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self { quiet, generation: AtomicU64::new(0) }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet
    }

    pub async fn settle(&self) -> bool {
        let mine = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.quiet).await;
        self.generation.load(Ordering::SeqCst) == mine
    }

    /// Drops whatever call is currently waiting
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

/// Monotonic request numbering; a response is applied only if its ticket is
/// still the latest one issued.
#[derive(Debug, Default)]
pub struct RequestSequence {
    latest: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

impl RequestSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_latest(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }
}

//! Test fixtures for common scenarios.

use std::sync::atomic::{AtomicI64, Ordering};

use palimpsest::{Context, Engine, EngineConfig};
use palimpsest_core::{AuthorId, Keypair, LogEntry};
use palimpsest_store::{FeedStore, MemoryFeed};

/// 2025-01-14T16:00:00Z, the instant every fixture clock starts at.
pub const EPOCH: i64 = 1_736_870_400_000;

/// A named identity with a deterministic keypair.
#[derive(Clone)]
pub struct Participant {
    pub name: &'static str,
    pub keypair: Keypair,
}

impl Participant {
    /// The same `seed` always yields the same identity.
    pub fn new(name: &'static str, seed: u8) -> Self {
        Self {
            name,
            keypair: Keypair::from_seed(&[seed; 32]),
        }
    }

    pub fn author_id(&self) -> AuthorId {
        self.keypair.author_id()
    }
}

impl std::fmt::Debug for Participant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Participant")
            .field("name", &self.name)
            .field("author", &self.author_id())
            .finish()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct FrozenClock {
    now: AtomicI64,
}

impl FrozenClock {
    pub fn at(now: i64) -> Self {
        Self {
            now: AtomicI64::new(now),
        }
    }

    pub fn now(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }

    pub fn set(&self, now: i64) {
        self.now.store(now, Ordering::SeqCst);
    }

    /// Move forward by `ms` and return the new time.
    pub fn advance(&self, ms: i64) -> i64 {
        self.now.fetch_add(ms, Ordering::SeqCst) + ms
    }
}

impl Default for FrozenClock {
    fn default() -> Self {
        Self::at(EPOCH)
    }
}

/// An engine over an in-memory feed, three participants, and a frozen clock.
pub struct TestFixture {
    pub engine: Engine<MemoryFeed>,
    pub clock: FrozenClock,
    pub alice: Participant,
    pub bob: Participant,
    pub carol: Participant,
}

impl TestFixture {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            engine: Engine::new(MemoryFeed::new(), config),
            clock: FrozenClock::default(),
            alice: Participant::new("alice", 1),
            bob: Participant::new("bob", 2),
            carol: Participant::new("carol", 3),
        }
    }

    /// A context for `who` at the clock's current time.
    pub fn ctx<'a>(&self, who: &'a Participant) -> Context<'a> {
        Context::new(&who.keypair, self.clock.now())
    }

    pub fn advance(&self, ms: i64) -> i64 {
        self.clock.advance(ms)
    }

    /// The whole merged log, in ingestion order.
    pub async fn log(&self) -> Vec<LogEntry> {
        self.engine
            .store()
            .read_all(None)
            .await
            .unwrap_or_default()
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// `count` participants with seeds `1..=count`.
pub fn participants(count: u8) -> Vec<Participant> {
    const NAMES: [&str; 8] = [
        "alice", "bob", "carol", "dave", "erin", "frank", "grace", "heidi",
    ];
    (1..=count)
        .map(|seed| {
            let name = NAMES.get(usize::from(seed) - 1).copied().unwrap_or("extra");
            Participant::new(name, seed)
        })
        .collect()
}

/// Route `tracing` output to the test harness. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

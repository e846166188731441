//! Shared helpers for the integration suites.

#![allow(dead_code)]

use palimpsest::core::Keypair;
use palimpsest::store::MemoryFeed;
use palimpsest::{Engine, EngineConfig};

/// 2025-01-14T16:00:00Z.
pub const T0: i64 = 1_736_870_400_000;

pub const MINUTE: i64 = 60_000;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

pub fn keypair(n: u8) -> Keypair {
    Keypair::from_seed(&[n; 32])
}

pub fn engine() -> Engine<MemoryFeed> {
    engine_with(EngineConfig::default())
}

pub fn engine_with(config: EngineConfig) -> Engine<MemoryFeed> {
    init_tracing();
    Engine::new(MemoryFeed::new(), config)
}

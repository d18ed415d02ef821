//! rfsh-test-utils: test infrastructure for rfsh.
//!
//! Provides `StubClient`, a scripted in-memory `FileClient` over a path
//! map, with an operation journal recording enter/exit instants so tests
//! can assert that round-trips never overlap.

mod stub_client;

pub use stub_client::{Journal, OpRecord, StubClient, StubEntry};

//! Shared database repository test infrastructure
//!
//! Repository tests are written as async functions that take
//! `&dyn StatisticsRepo`, with setup kept in a small harness so each test runs
//! against a fresh in-memory database with real migrations applied.

mod statistics;

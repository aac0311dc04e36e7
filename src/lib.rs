//! Clarity Harness - drive Clarity smart-contract tests against a simulated chain
//!
//! # Architecture
//!
//! The crate is organized into logical modules:
//!
//! ## Values & Events
//! - [`value`] - Canonical value text: encoders, assertions, bracket scanner
//! - [`events`] - Receipt events and event assertions
//!
//! ## Chain
//! - [`transaction`] - Transaction builder
//! - [`chain`] - Chain sessions, blocks and receipts
//!
//! ## Host
//! - [`host`] - Host bridge, wire protocol, stdio and in-memory hosts
//!
//! ## Test Runner
//! - [`runner`] - Test registration, session lifecycle and scripts
//!
//! ## Configuration & Utilities
//! - [`config`] - Configuration management
//! - [`error`] - Error types
//! - [`logging`] - Tracing setup

#![forbid(unsafe_code)]

// ============================================================================
// Values & Events
// ============================================================================
pub mod events;
pub mod value;

// ============================================================================
// Chain
// ============================================================================
pub mod chain;
pub mod transaction;

// ============================================================================
// Host
// ============================================================================
pub mod host;

// ============================================================================
// Test Runner
// ============================================================================
pub mod runner;

// ============================================================================
// Configuration & Utilities
// ============================================================================
pub mod config;
pub mod error;
pub mod logging;

pub use chain::{Account, Accounts, Chain, Contract, Contracts};
pub use error::{HarnessError, Result};
pub use events::EventAssertions;
pub use runner::{run_script, TestCase, TestResult, TestRunner};
pub use transaction::Tx;
pub use value::{encode, ClarityText};

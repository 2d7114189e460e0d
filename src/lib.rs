//! ffwd - GitHub pull-request operations for fast-forward merge automation
//!
//! ffwd exposes a narrow set of pull-request operations (fetch, comment,
//! close, fast-forward, status-set, branch-compare) by translating each one
//! into a single call against the GitHub REST API. It is a library crate:
//! the invoking automation harness supplies the run context and the
//! credential, and owns all policy around when operations run.
//!
//! # Architecture
//!
//! The crate is a thin adapter in four layers:
//!
//! - [`client`] - Pull-request operations surface (one domain verb per method)
//! - [`api`] - GitHub REST boundary (capability trait, HTTP implementation, test mock)
//! - [`context`] - Run context: repository coordinates and triggering event payload
//! - [`auth`] - Access-token wrapper
//!
//! # Correctness Invariants
//!
//! ffwd maintains the following invariants:
//!
//! 1. Every operation maps to one remote call, plus a snapshot fetch where
//!    the verb needs pull-request fields first
//! 2. Fast-forward reference updates are never forced
//! 3. Nothing is cached; every call observes live remote state
//! 4. Remote errors pass through to the caller unchanged
//! 5. The access token is never inspected or logged

pub mod api;
pub mod auth;
pub mod client;
pub mod context;

//! # Router Module
//!
//! Method-aware route matching on a compressed radix tree. The module owns
//! the full request-path pipeline: pattern registration with conflict
//! detection, zero-allocation lookup with parameter capture, trailing-slash
//! inference, and canonical-path reconstruction for redirects.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Building one radix tree per HTTP method from registered patterns
//! - Matching incoming `(method, path)` pairs to handlers
//! - Capturing `:name` and `*name` wildcard values from matched paths
//! - Recommending trailing-slash and case-fix redirects when no direct
//!   match exists
//!
//! ## Architecture
//!
//! Work splits across two layers:
//!
//! 1. **Tree** ([`Node`]): a compressed prefix tree whose edges are byte
//!    strings. Registration splits edges on the longest common prefix and
//!    keeps siblings ordered by route-count priority; lookup walks the tree
//!    in O(k) for a k-byte path, selecting children by first byte.
//!
//! 2. **Router** ([`Router`]): the per-method forest plus a small
//!    configuration record. [`Router::dispatch`] composes tree lookups into
//!    the final decision: match, redirect, automatic `OPTIONS` reply,
//!    `405` enumeration, or not-found.
//!
//! ## Example
//!
//! ```rust
//! use switchback::{Dispatch, Router};
//! use http::Method;
//!
//! let mut router: Router<&str> = Router::new();
//! router.get("/pets/:id", "get_pet").unwrap();
//!
//! match router.dispatch(&Method::GET, "/pets/123") {
//!     Dispatch::Match { handler, params } => {
//!         assert_eq!(*handler, "get_pet");
//!         assert_eq!(params.get("id"), Some("123"));
//!     }
//!     _ => unreachable!(),
//! };
//! ```
//!
//! ## Performance
//!
//! Lookup cost is proportional to the path length, not the number of
//! routes. A lookup that matches a wildcard-free route performs no heap
//! allocation; parameterized lookups allocate at most the capture list,
//! pre-sized from the tree's `max_params` bookkeeping.

mod core;
mod error;
mod params;
mod path;
mod tree;

#[cfg(test)]
mod tests;

pub use self::core::{Dispatch, Router, RouterConfig};
pub use self::error::InsertError;
pub use self::params::{Param, Params, MAX_INLINE_PARAMS};
pub use self::path::clean_path;
pub use self::tree::{Lookup, Node};

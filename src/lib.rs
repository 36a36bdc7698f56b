//! Functional simulator of a set-associative hardware cache.
//!
//! Replays a stream of memory addresses through a configurable cache model
//! (total size, block size, associativity, LRU or Random replacement) and
//! reports aggregate hit and miss counts. The model tracks block presence
//! only; it carries no timing and no payload bytes.

pub mod cache;
pub mod experiments;
pub mod policy;
pub mod trace;

//! Pluggable memory backends for RDMA benchmarking harnesses.
//!
//! A benchmark harness drives exactly one [`MemoryContext`] through its
//! lifecycle: construct from a [`MemoryConfig`], `init` to select the
//! device, `allocate_buffer` to obtain DMA-registerable memory, register
//! that address with the transport layer, run the benchmark, then
//! `free_buffer` and drop the context. Everything is synchronous and
//! single-threaded; the harness owns the sequencing.
//!
//! # Backends
//!
//! - [`HostMemoryContext`] (built-in) — page-aligned host memory,
//!   supports direct copies.
//! - [`TopcaMemoryContext`] — device memory on a topca accelerator,
//!   exposed as a DMA bus address. Only reachable via RDMA transport;
//!   host copies are unsupported. The vendor runtime binding is gated
//!   behind the `topca` feature.

pub mod backend;
pub mod config;
pub mod error;
pub mod runtime;

pub use backend::{
    create_context, AllocatedBuffer, HostMemoryContext, MemoryContext, TopcaMemoryContext,
};
pub use config::{BackendKind, MemoryConfig};
pub use error::{MemoryError, Result};

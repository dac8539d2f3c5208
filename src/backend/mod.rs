//! The memory-context capability set and its implementing backends.

mod context;
pub mod host;
pub mod topca;

pub use context::{AllocatedBuffer, MemoryContext};
pub use host::HostMemoryContext;
pub use topca::TopcaMemoryContext;

use crate::config::{BackendKind, MemoryConfig};
use crate::error::{MemoryError, Result};

/// Construct the backend named by `config`.
///
/// Fails with [`MemoryError::BackendUnavailable`] when the requested
/// backend's stub variant is compiled into this build; check the backend's
/// `supported()` first to select a fallback instead.
pub fn create_context(config: &MemoryConfig) -> Result<Box<dyn MemoryContext>> {
    match config.backend {
        BackendKind::Host => Ok(Box::new(HostMemoryContext::new())),
        BackendKind::Topca => {
            topca::create(config).ok_or(MemoryError::BackendUnavailable {
                backend: BackendKind::Topca,
            })
        }
    }
}

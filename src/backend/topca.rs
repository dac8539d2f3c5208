//! Topca accelerator backend: device memory exposed as a DMA bus address.
//!
//! Buffers allocated here are only reachable through RDMA transport — the
//! harness registers the returned DMA address with its NIC and must not
//! expect host-side access (`can_init` is always false, the copy
//! operations move nothing).

use std::os::fd::RawFd;
use std::sync::Arc;

use crate::backend::{AllocatedBuffer, MemoryContext};
use crate::config::MemoryConfig;
use crate::error::{MemoryError, Result};
use crate::runtime::{DeviceRuntime, DmaMapper};

/// Allocation granularity of the device allocator.
pub const PAGE_SIZE: u64 = 4096;

/// Largest single region the device can map for an MR.
pub const MAX_REGION_SIZE: u64 = 4 * 1024 * 1024;

/// Memory context backed by a topca device allocation.
///
/// Holds at most one outstanding allocation. A second `allocate_buffer`
/// before `free_buffer` overwrites the stored handles and leaks the first
/// allocation — caller error, not detected here.
pub struct TopcaMemoryContext {
    runtime: Arc<dyn DeviceRuntime>,
    mapper: Arc<dyn DmaMapper>,
    device_id: u32,
    device_ptr: Option<u64>,
    dma_addr: Option<u64>,
}

impl TopcaMemoryContext {
    /// Construct over an explicit runtime and mapper. Production code goes
    /// through [`create`]; tests inject mocks here.
    pub fn with_runtime(
        runtime: Arc<dyn DeviceRuntime>,
        mapper: Arc<dyn DmaMapper>,
        device_id: u32,
    ) -> Self {
        Self {
            runtime,
            mapper,
            device_id,
            device_ptr: None,
            dma_addr: None,
        }
    }

    pub fn device_id(&self) -> u32 {
        self.device_id
    }
}

impl MemoryContext for TopcaMemoryContext {
    fn init(&mut self) -> Result<()> {
        let device_count = self.runtime.device_count().map_err(|status| {
            tracing::error!("device count query failed with status {status}");
            MemoryError::Runtime {
                call: "device_count",
                code: status.0,
            }
        })?;

        if self.device_id >= device_count {
            tracing::error!(
                "requested topca device {} but found only {} device(s)",
                self.device_id,
                device_count
            );
            return Err(MemoryError::DeviceUnavailable {
                device_id: self.device_id,
                device_count,
            });
        }

        self.runtime.set_device(self.device_id).map_err(|status| {
            tracing::error!(
                "selecting topca device {} failed with status {status}",
                self.device_id
            );
            MemoryError::Runtime {
                call: "set_device",
                code: status.0,
            }
        })?;

        let props = self
            .runtime
            .device_properties(self.device_id)
            .map_err(|status| {
                tracing::error!(
                    "property query for topca device {} failed with status {status}",
                    self.device_id
                );
                MemoryError::Runtime {
                    call: "device_properties",
                    code: status.0,
                }
            })?;

        tracing::info!(
            "using topca device {}: {} at PCI {:02x}:{:02x}.0",
            self.device_id,
            props.name,
            props.pci_bus_id,
            props.pci_dev_id
        );
        Ok(())
    }

    fn allocate_buffer(&mut self, _alignment: usize, size: u64) -> Result<AllocatedBuffer> {
        let rounded = match size.checked_add(PAGE_SIZE - 1) {
            Some(n) => n & !(PAGE_SIZE - 1),
            None => u64::MAX & !(PAGE_SIZE - 1),
        };

        if rounded > MAX_REGION_SIZE {
            tracing::error!(
                "device memory request of {rounded} bytes exceeds the {MAX_REGION_SIZE} byte MR limit"
            );
            return Err(MemoryError::SizeExceeded {
                rounded,
                max: MAX_REGION_SIZE,
            });
        }

        let device_ptr = self.runtime.malloc(rounded).map_err(|status| {
            tracing::error!("device allocation of {rounded} bytes failed with status {status}");
            MemoryError::AllocationFailed {
                size: rounded,
                code: status.0,
            }
        })?;

        // Stored before the mapping attempt: if mapping fails the
        // allocation stays outstanding and a later free_buffer releases it.
        self.device_ptr = Some(device_ptr);

        let dma_addr = match self.mapper.map_device_to_dma(self.device_id, device_ptr) {
            Ok(addr) => addr,
            Err(status) => {
                tracing::error!(
                    "DMA mapping for device pointer 0x{device_ptr:x} failed with status {status}"
                );
                return Err(MemoryError::MappingFailed { device_ptr });
            }
        };
        self.dma_addr = Some(dma_addr);

        tracing::info!(
            "allocated {rounded} bytes of device memory at 0x{device_ptr:x} (dma 0x{dma_addr:x})"
        );
        Ok(AllocatedBuffer {
            dmabuf_fd: None,
            dmabuf_offset: 0,
            addr: dma_addr,
            can_init: false,
        })
    }

    fn free_buffer(&mut self, _dmabuf_fd: Option<RawFd>, _addr: u64, _size: u64) -> Result<()> {
        let Some(device_ptr) = self.device_ptr.take() else {
            tracing::warn!("free_buffer called with no outstanding allocation");
            return Ok(());
        };
        let dma_addr = self.dma_addr.take();

        match dma_addr {
            Some(dma) => {
                tracing::info!("releasing device buffer 0x{device_ptr:x} (dma 0x{dma:x})");
            }
            None => tracing::info!("releasing unmapped device buffer 0x{device_ptr:x}"),
        }

        let freed = self.runtime.free(device_ptr);

        // Best-effort teardown: the mapping is released even when the
        // allocator free reports an error.
        if let Some(dma_addr) = dma_addr {
            self.mapper.unmap_dma(dma_addr);
        }

        freed.map_err(|status| {
            tracing::error!("device free of 0x{device_ptr:x} failed with status {status}");
            MemoryError::FreeFailed {
                device_ptr,
                code: status.0,
            }
        })
    }

    unsafe fn copy_host_to_buffer(&mut self, dst: u64, _src: u64, _len: usize) -> u64 {
        tracing::warn!("host-to-buffer copy is not supported by the topca backend");
        dst
    }

    unsafe fn copy_buffer_to_host(&mut self, dst: u64, _src: u64, _len: usize) -> u64 {
        tracing::warn!("buffer-to-host copy is not supported by the topca backend");
        dst
    }

    unsafe fn copy_buffer_to_buffer(&mut self, dst: u64, _src: u64, _len: usize) -> u64 {
        tracing::warn!("buffer-to-buffer copy is not supported by the topca backend");
        dst
    }
}

/// Whether this backend is compiled into the current build.
#[cfg(feature = "topca")]
pub fn supported() -> bool {
    true
}

#[cfg(not(feature = "topca"))]
pub fn supported() -> bool {
    false
}

/// Construct a context bound to the vendor runtime, or `None` when the
/// backend is not compiled in.
#[cfg(feature = "topca")]
pub fn create(config: &MemoryConfig) -> Option<Box<dyn MemoryContext>> {
    let runtime = Arc::new(crate::runtime::sys::TcRuntime::new());
    Some(Box::new(TopcaMemoryContext::with_runtime(
        runtime.clone(),
        runtime,
        config.device_id,
    )))
}

#[cfg(not(feature = "topca"))]
pub fn create(_config: &MemoryConfig) -> Option<Box<dyn MemoryContext>> {
    None
}

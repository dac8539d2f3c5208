//! Host memory backend: page-aligned allocations with direct host access.
//!
//! The harness's default when no accelerator is involved. Buffers are
//! ordinary host memory, so all three copy operations actually move bytes
//! and `can_init` is true.

use std::alloc::{self, Layout};
use std::collections::HashMap;
use std::os::fd::RawFd;
use std::ptr;

use crate::backend::{AllocatedBuffer, MemoryContext};
use crate::error::{MemoryError, Result};

const HOST_PAGE_SIZE: usize = 4096;

/// Memory context over `std::alloc`, tracking layouts for symmetric free.
#[derive(Debug, Default)]
pub struct HostMemoryContext {
    allocations: HashMap<u64, Layout>,
}

impl HostMemoryContext {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Whether this backend is compiled into the current build. Host memory
/// is always available.
pub fn supported() -> bool {
    true
}

impl MemoryContext for HostMemoryContext {
    fn init(&mut self) -> Result<()> {
        Ok(())
    }

    fn allocate_buffer(&mut self, alignment: usize, size: u64) -> Result<AllocatedBuffer> {
        let align = alignment.max(HOST_PAGE_SIZE).next_power_of_two();
        let size = (size as usize).max(1);

        let layout = Layout::from_size_align(size, align).map_err(|_| {
            tracing::error!("invalid host allocation layout: size={size} align={align}");
            MemoryError::AllocationFailed {
                size: size as u64,
                code: -1,
            }
        })?;

        // Benchmarks expect deterministic initial contents.
        let buf = unsafe { alloc::alloc_zeroed(layout) };
        if buf.is_null() {
            tracing::error!("host allocation of {size} bytes failed");
            return Err(MemoryError::AllocationFailed {
                size: size as u64,
                code: -1,
            });
        }

        let addr = buf as u64;
        self.allocations.insert(addr, layout);
        tracing::info!("allocated {size} bytes of host memory at 0x{addr:x}");

        Ok(AllocatedBuffer {
            dmabuf_fd: None,
            dmabuf_offset: 0,
            addr,
            can_init: true,
        })
    }

    fn free_buffer(&mut self, _dmabuf_fd: Option<RawFd>, addr: u64, _size: u64) -> Result<()> {
        let Some(layout) = self.allocations.remove(&addr) else {
            tracing::error!("free_buffer for unknown host address 0x{addr:x}");
            return Err(MemoryError::FreeFailed {
                device_ptr: addr,
                code: -1,
            });
        };
        unsafe { alloc::dealloc(addr as *mut u8, layout) };
        Ok(())
    }

    unsafe fn copy_host_to_buffer(&mut self, dst: u64, src: u64, len: usize) -> u64 {
        unsafe { ptr::copy_nonoverlapping(src as *const u8, dst as *mut u8, len) };
        dst
    }

    unsafe fn copy_buffer_to_host(&mut self, dst: u64, src: u64, len: usize) -> u64 {
        unsafe { ptr::copy_nonoverlapping(src as *const u8, dst as *mut u8, len) };
        dst
    }

    unsafe fn copy_buffer_to_buffer(&mut self, dst: u64, src: u64, len: usize) -> u64 {
        unsafe { ptr::copy_nonoverlapping(src as *const u8, dst as *mut u8, len) };
        dst
    }
}

impl Drop for HostMemoryContext {
    fn drop(&mut self) {
        // Host allocations can be reclaimed safely, unlike device handles.
        for (addr, layout) in self.allocations.drain() {
            unsafe { alloc::dealloc(addr as *mut u8, layout) };
        }
    }
}

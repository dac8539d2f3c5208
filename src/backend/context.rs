use std::os::fd::RawFd;

use crate::error::Result;

/// Result of a successful [`MemoryContext::allocate_buffer`].
#[derive(Debug, Clone, Copy)]
pub struct AllocatedBuffer {
    /// dmabuf file descriptor, for backends that export one.
    pub dmabuf_fd: Option<RawFd>,
    /// Offset of the buffer within the dmabuf, if any.
    pub dmabuf_offset: u64,
    /// Address the harness registers with its transport layer. For device
    /// backends this is a DMA bus address, not a host pointer.
    pub addr: u64,
    /// Whether the harness may initialize the buffer contents in place via
    /// a host pointer. False means the memory is only reachable through
    /// the transport.
    pub can_init: bool,
}

/// One pluggable memory backend, driven sequentially by the harness.
///
/// Lifecycle: `init` must precede `allocate_buffer`; at most one allocation
/// is outstanding per context; `free_buffer` must precede dropping the
/// context or the device allocation dangles. No internal locking — a
/// context is owned and driven by exactly one caller.
pub trait MemoryContext {
    /// Validate and select the configured device.
    fn init(&mut self) -> Result<()>;

    /// Allocate `size` bytes (backends may round up), returning the
    /// transport-visible address. `alignment` is accepted for interface
    /// uniformity; backends may ignore it beyond their page granularity.
    fn allocate_buffer(&mut self, alignment: usize, size: u64) -> Result<AllocatedBuffer>;

    /// Release the allocation behind `addr`. The fd and size echo the
    /// values from [`AllocatedBuffer`] for backends that need them.
    fn free_buffer(&mut self, dmabuf_fd: Option<RawFd>, addr: u64, size: u64) -> Result<()>;

    /// Copy `len` bytes from host memory at `src` into the buffer at `dst`.
    /// Returns the destination pointer; backends without host access move
    /// nothing.
    ///
    /// # Safety
    /// `src` must be valid for `len` bytes of reads; for backends that
    /// support host access, `dst` must be valid for `len` bytes of writes.
    unsafe fn copy_host_to_buffer(&mut self, dst: u64, src: u64, len: usize) -> u64;

    /// Copy `len` bytes from the buffer at `src` to host memory at `dst`.
    ///
    /// # Safety
    /// `dst` must be valid for `len` bytes of writes; for backends that
    /// support host access, `src` must be valid for `len` bytes of reads.
    unsafe fn copy_buffer_to_host(&mut self, dst: u64, src: u64, len: usize) -> u64;

    /// Copy `len` bytes between two buffer regions.
    ///
    /// # Safety
    /// For backends that support host access, both pointers must be valid
    /// for `len` bytes and the regions must not overlap.
    unsafe fn copy_buffer_to_buffer(&mut self, dst: u64, src: u64, len: usize) -> u64;

    /// Tear down the context itself. Outstanding allocations are the
    /// caller's responsibility and are not detected here.
    fn destroy(self: Box<Self>) {}
}

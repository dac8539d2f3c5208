//! Seams over the accelerator runtime and the DMA mapping driver.
//!
//! Backends talk to the vendor stack through these two traits so that the
//! allocation lifecycle can be exercised against a mock without hardware.
//! The production binding lives in [`sys`] behind the `topca` feature.

#[cfg(test)]
pub(crate) mod mock;
#[cfg(feature = "topca")]
pub mod sys;

use std::fmt;

/// Raw status code reported by a vendor call. Zero is success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeStatus(pub i32);

impl fmt::Display for RuntimeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable properties of one accelerator device.
#[derive(Debug, Clone)]
pub struct DeviceProperties {
    pub name: String,
    pub pci_bus_id: u8,
    pub pci_dev_id: u8,
}

/// The accelerator runtime: device enumeration and device-memory allocation.
///
/// Device pointers are opaque `u64` handles; they are only meaningful to the
/// runtime that produced them and cannot be dereferenced on the host.
pub trait DeviceRuntime: Send + Sync {
    /// Number of accelerator devices visible to this process.
    fn device_count(&self) -> Result<u32, RuntimeStatus>;

    /// Select `device_id` as the active device for subsequent calls.
    fn set_device(&self, device_id: u32) -> Result<(), RuntimeStatus>;

    fn device_properties(&self, device_id: u32) -> Result<DeviceProperties, RuntimeStatus>;

    /// Allocate `size` bytes of device memory, returning the device pointer.
    fn malloc(&self, size: u64) -> Result<u64, RuntimeStatus>;

    /// Release a device allocation.
    fn free(&self, device_ptr: u64) -> Result<(), RuntimeStatus>;
}

/// Translates device allocations into bus-addressable DMA handles.
pub trait DmaMapper: Send + Sync {
    /// Map a device pointer to a DMA address a peripheral can reach.
    fn map_device_to_dma(&self, device_id: u32, device_ptr: u64) -> Result<u64, RuntimeStatus>;

    /// Release a DMA mapping. The driver call has no failure path.
    fn unmap_dma(&self, dma_addr: u64);
}

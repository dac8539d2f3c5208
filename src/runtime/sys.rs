//! Raw FFI binding to the topca vendor runtime and the hx DMA driver.
//!
//! Covers exactly the subset of the vendor ABI the backend calls. Symbol
//! names must match the shipped libraries; the struct mirrors only the
//! fields we consume plus reserved space.

#![allow(non_camel_case_types, non_snake_case)]

use std::ffi::CStr;
use std::mem::MaybeUninit;
use std::os::raw::{c_char, c_int, c_void};
use std::ptr;

use super::{DeviceProperties, DeviceRuntime, DmaMapper, RuntimeStatus};

pub const TC_SUCCESS: c_int = 0;
pub const TC_DEVICE_NAME_LEN: usize = 256;

#[repr(C)]
pub struct tcDeviceProp {
    pub name: [c_char; TC_DEVICE_NAME_LEN],
    pub pci_bus_id: c_int,
    pub pci_dev_id: c_int,
    pub reserved: [u64; 32],
}

#[link(name = "tc_runtime")]
extern "C" {
    fn tcDeviceGetCount(count: *mut c_int) -> c_int;
    fn tcSetDevice(device_id: c_int) -> c_int;
    fn tcDeviceGetProperties(prop: *mut tcDeviceProp, device_id: c_int) -> c_int;
    fn tcMalloc(device_ptr: *mut *mut c_void, size: usize) -> c_int;
    fn tcFree(device_ptr: *mut c_void) -> c_int;
}

// Provided by the hx kernel driver's userspace library.
extern "C" {
    fn hx_map_addr_dev2dma(dev_no: c_int, dev_addr: *mut c_void, dma_addr: *mut u64) -> c_int;
    fn hx_free_dma_addr(dma_addr: u64);
}

/// Production [`DeviceRuntime`] + [`DmaMapper`] over the vendor libraries.
#[derive(Debug, Default)]
pub struct TcRuntime;

impl TcRuntime {
    pub fn new() -> Self {
        Self
    }
}

fn check(rc: c_int) -> Result<(), RuntimeStatus> {
    if rc == TC_SUCCESS {
        Ok(())
    } else {
        Err(RuntimeStatus(rc))
    }
}

impl DeviceRuntime for TcRuntime {
    fn device_count(&self) -> Result<u32, RuntimeStatus> {
        let mut count: c_int = 0;
        check(unsafe { tcDeviceGetCount(&mut count) })?;
        Ok(count as u32)
    }

    fn set_device(&self, device_id: u32) -> Result<(), RuntimeStatus> {
        check(unsafe { tcSetDevice(device_id as c_int) })
    }

    fn device_properties(&self, device_id: u32) -> Result<DeviceProperties, RuntimeStatus> {
        let mut prop = MaybeUninit::<tcDeviceProp>::zeroed();
        check(unsafe { tcDeviceGetProperties(prop.as_mut_ptr(), device_id as c_int) })?;
        let prop = unsafe { prop.assume_init() };

        // The runtime NUL-terminates the name; zeroed init guarantees a
        // terminator even if it does not fill the field.
        let name = unsafe { CStr::from_ptr(prop.name.as_ptr()) }
            .to_string_lossy()
            .into_owned();

        Ok(DeviceProperties {
            name,
            pci_bus_id: prop.pci_bus_id as u8,
            pci_dev_id: prop.pci_dev_id as u8,
        })
    }

    fn malloc(&self, size: u64) -> Result<u64, RuntimeStatus> {
        let mut device_ptr: *mut c_void = ptr::null_mut();
        check(unsafe { tcMalloc(&mut device_ptr, size as usize) })?;
        Ok(device_ptr as u64)
    }

    fn free(&self, device_ptr: u64) -> Result<(), RuntimeStatus> {
        check(unsafe { tcFree(device_ptr as *mut c_void) })
    }
}

impl DmaMapper for TcRuntime {
    fn map_device_to_dma(&self, device_id: u32, device_ptr: u64) -> Result<u64, RuntimeStatus> {
        let mut dma_addr: u64 = 0;
        check(unsafe {
            hx_map_addr_dev2dma(device_id as c_int, device_ptr as *mut c_void, &mut dma_addr)
        })?;
        Ok(dma_addr)
    }

    fn unmap_dma(&self, dma_addr: u64) {
        unsafe { hx_free_dma_addr(dma_addr) }
    }
}

//! Mock device runtime for exercising the allocation lifecycle in tests.

use std::collections::HashMap;
use std::sync::Mutex;

use super::{DeviceProperties, DeviceRuntime, DmaMapper, RuntimeStatus};

const MOCK_FAIL: RuntimeStatus = RuntimeStatus(-1);

// Mock DMA addresses live in a distinct range so tests catch a backend
// confusing device pointers with bus addresses.
const DMA_BASE: u64 = 0xDA00_0000_0000;

#[derive(Default)]
struct MockState {
    selected_device: Option<u32>,
    set_device_calls: u32,
    malloc_calls: u32,
    unmap_calls: u32,
    next_ptr: u64,
    open_handles: HashMap<u64, u64>, // device ptr -> size
    fail_device_count: bool,
    fail_set_device: bool,
    fail_malloc: bool,
    fail_mapping: bool,
    fail_free: bool,
}

/// In-memory [`DeviceRuntime`] + [`DmaMapper`] tracking every open handle
/// and call count, with per-call failure injection.
pub struct MockRuntime {
    device_count: u32,
    state: Mutex<MockState>,
}

impl MockRuntime {
    pub fn new(device_count: u32) -> Self {
        Self {
            device_count,
            state: Mutex::new(MockState {
                next_ptr: 0x1000_0000,
                ..MockState::default()
            }),
        }
    }

    pub fn fail_device_count(&self) {
        self.state.lock().unwrap().fail_device_count = true;
    }

    pub fn fail_set_device(&self) {
        self.state.lock().unwrap().fail_set_device = true;
    }

    pub fn fail_malloc(&self) {
        self.state.lock().unwrap().fail_malloc = true;
    }

    pub fn fail_mapping(&self) {
        self.state.lock().unwrap().fail_mapping = true;
    }

    pub fn fail_free(&self) {
        self.state.lock().unwrap().fail_free = true;
    }

    /// Device the last successful `set_device` selected.
    pub fn selected_device(&self) -> Option<u32> {
        self.state.lock().unwrap().selected_device
    }

    pub fn set_device_calls(&self) -> u32 {
        self.state.lock().unwrap().set_device_calls
    }

    pub fn malloc_calls(&self) -> u32 {
        self.state.lock().unwrap().malloc_calls
    }

    pub fn unmap_calls(&self) -> u32 {
        self.state.lock().unwrap().unmap_calls
    }

    /// Number of device allocations not yet freed.
    pub fn open_handle_count(&self) -> usize {
        self.state.lock().unwrap().open_handles.len()
    }

    /// Sizes of all outstanding allocations.
    pub fn open_handle_sizes(&self) -> Vec<u64> {
        self.state
            .lock()
            .unwrap()
            .open_handles
            .values()
            .copied()
            .collect()
    }
}

impl DeviceRuntime for MockRuntime {
    fn device_count(&self) -> Result<u32, RuntimeStatus> {
        if self.state.lock().unwrap().fail_device_count {
            return Err(MOCK_FAIL);
        }
        Ok(self.device_count)
    }

    fn set_device(&self, device_id: u32) -> Result<(), RuntimeStatus> {
        let mut state = self.state.lock().unwrap();
        state.set_device_calls += 1;
        if state.fail_set_device {
            return Err(MOCK_FAIL);
        }
        state.selected_device = Some(device_id);
        Ok(())
    }

    fn device_properties(&self, device_id: u32) -> Result<DeviceProperties, RuntimeStatus> {
        if device_id >= self.device_count {
            return Err(MOCK_FAIL);
        }
        Ok(DeviceProperties {
            name: format!("mockdev{device_id}"),
            pci_bus_id: 0x3a,
            pci_dev_id: device_id as u8,
        })
    }

    fn malloc(&self, size: u64) -> Result<u64, RuntimeStatus> {
        let mut state = self.state.lock().unwrap();
        state.malloc_calls += 1;
        if state.fail_malloc {
            return Err(MOCK_FAIL);
        }
        let ptr = state.next_ptr;
        state.next_ptr += size.max(4096);
        state.open_handles.insert(ptr, size);
        Ok(ptr)
    }

    fn free(&self, device_ptr: u64) -> Result<(), RuntimeStatus> {
        let mut state = self.state.lock().unwrap();
        if state.fail_free || state.open_handles.remove(&device_ptr).is_none() {
            return Err(MOCK_FAIL);
        }
        Ok(())
    }
}

impl DmaMapper for MockRuntime {
    fn map_device_to_dma(&self, _device_id: u32, device_ptr: u64) -> Result<u64, RuntimeStatus> {
        if self.state.lock().unwrap().fail_mapping {
            return Err(MOCK_FAIL);
        }
        Ok(DMA_BASE | device_ptr)
    }

    fn unmap_dma(&self, _dma_addr: u64) {
        self.state.lock().unwrap().unmap_calls += 1;
    }
}

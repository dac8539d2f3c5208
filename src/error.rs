use crate::config::BackendKind;

pub type Result<T> = std::result::Result<T, MemoryError>;

#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    #[error("requested device {device_id} but found only {device_count} device(s)")]
    DeviceUnavailable { device_id: u32, device_count: u32 },

    #[error("device runtime call {call} failed with status {code}")]
    Runtime { call: &'static str, code: i32 },

    #[error("requested region of {rounded} bytes exceeds the {max} byte maximum")]
    SizeExceeded { rounded: u64, max: u64 },

    #[error("device allocation of {size} bytes failed with status {code}")]
    AllocationFailed { size: u64, code: i32 },

    #[error("failed to map DMA address for device pointer 0x{device_ptr:x}")]
    MappingFailed { device_ptr: u64 },

    #[error("device free of pointer 0x{device_ptr:x} failed with status {code}")]
    FreeFailed { device_ptr: u64, code: i32 },

    #[error("backend {backend} is not compiled into this build")]
    BackendUnavailable { backend: BackendKind },
}

//! Device selection for inference.

use candle_core::Device;
use tracing::info;

/// Picks the inference device.
///
/// Metal and CUDA are tried first when compiled in, then the CPU.
#[must_use]
pub fn select_device() -> Device {
    #[cfg(feature = "metal")]
    {
        if let Ok(device) = Device::new_metal(0) {
            info!("Running face detection on Metal");
            return device;
        }
    }

    #[cfg(feature = "cuda")]
    {
        if let Ok(device) = Device::new_cuda(0) {
            info!("Running face detection on CUDA");
            return device;
        }
    }

    info!("Running face detection on CPU");
    Device::Cpu
}

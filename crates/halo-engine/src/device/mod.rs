//! GPU device + surface management.
//!
//! This module is responsible for:
//! - creating the wgpu Adapter/Device/Queue and hooking driver error reporting
//! - creating & (re)configuring the Surface (swapchain)
//! - acquiring frames and presenting them

mod error;
mod frame;
mod gpu;
mod init;
mod surface;

pub use error::AcquireFailure;
pub use frame::GpuFrame;
pub use gpu::Gpu;
pub use init::GpuInit;

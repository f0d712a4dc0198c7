//! Kernel selection and dynamic dispatch

pub mod dispatcher;
pub mod kernel_map;

pub use dispatcher::Dispatcher;
pub use kernel_map::{kernel_priority, KernelMap};

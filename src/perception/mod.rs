//! Frame acquisition and the vision-service interface.
//!
//! The vision service's reply is free-form model output, never a
//! machine-authored format — everything that touches it must degrade
//! gracefully instead of erroring (see [`parser`]).

pub mod client;
pub mod frame;
pub mod parser;

pub use client::{HttpVisionClient, ScriptedVisionClient, VisionQueryClient};
pub use frame::{Frame, FrameSource, SimulatedCamera};

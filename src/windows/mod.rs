//! Windows shared memory access
//!
//! Maps the simulator's named region read-only. Nothing in this module
//! interprets the bytes; decoding lives in [`crate::schema`].

mod mapping;

pub use mapping::MappedRegion;

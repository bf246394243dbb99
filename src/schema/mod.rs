//! Layout discovery and decoding
//!
//! The region is not self-describing beyond a few fixed offsets, so decoding
//! runs in layers:
//! - [`locator`] finds the end of the session document and the start of the header table
//! - [`variables`] parses the header table into a [`VariableCatalog`]
//! - [`buffers`] resolves the rotating value buffers and reads values from them
//! - [`session`] decodes and flattens the session document
//!
//! Everything except value reads is computed once per open region.

pub mod buffers;
pub mod locator;
pub mod session;
pub mod variables;

pub use buffers::BufferSet;
pub use locator::{RegionLayout, locate_document_end, locate_header_start};
pub use session::{SessionDocument, flatten};
pub use variables::{VariableCatalog, VariableDescriptor};

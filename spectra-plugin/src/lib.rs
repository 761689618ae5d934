//! Spectra Plugin System
//!
//! Provides the contract for exposing engine operations as named functions:
//! - `FunctionPlugin`: pure computation over `Value` arguments
//! - `PluginRegistry`: lookup, dispatch and help by name
//! - `EvalContext`: per-call solver configuration

mod traits;
mod registry;
mod context;

pub use traits::{FunctionPlugin, FunctionMeta, ArgMeta};
pub use registry::PluginRegistry;
pub use context::EvalContext;

/// Re-export core types for plugin authors
pub mod prelude {
    pub use crate::{FunctionPlugin, FunctionMeta, ArgMeta, PluginRegistry, EvalContext};
    pub use spectra_core::prelude::*;
}

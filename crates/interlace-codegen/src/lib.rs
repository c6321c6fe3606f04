//! Java generators for interface graphs
//!
//! Two parallel hierarchies are produced from one graph: pure Java contract
//! interfaces and GWT JavaScriptObject overlay classes.

pub mod analysis;
pub mod backend;
pub mod config;
pub mod emitter;
pub mod error;
pub mod generator;
pub mod java;
pub mod pipeline;
pub mod synthesis;
pub mod templates;

pub use backend::{AttributePair, Backend, BackendKind, InterfaceContext};
pub use config::{GeneratorConfig, TargetConfig};
pub use emitter::MultiEmitter;
pub use error::CodegenError;
pub use generator::{GenerationReport, Generator};

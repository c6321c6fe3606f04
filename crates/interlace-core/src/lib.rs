//! Interface graph model and the graph passes that run before emission
//!
//! The passes run in a fixed order over one exclusively owned [`Graph`]:
//! annotation filtering, renaming/merging, event-target fixing, mixin
//! resolution and finally the traversals used by the emitters.

pub mod error;
pub mod filter;
pub mod idl;
pub mod mixin;
pub mod rename;
pub mod special_cases;
pub mod traversal;
pub mod types;

pub use error::CoreError;
pub use filter::{AnnotationFilter, FilterReport};
pub use idl::{Attribute, Constant, Graph, Interface, Operation, Parent};
pub use mixin::{MixinResolver, MixinSet};
pub use rename::{RenamePass, RenameTable};
pub use types::IdlType;

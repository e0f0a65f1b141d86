//! # Bender Core
//!
//! The engine behind declarative component views:
//!
//! - **[`tree`]**: an arena of typed nodes (views, content placeholders,
//!   markup elements, attributes, text, nested instances)
//! - **[`resolve`]**: prototype-chain resolution of components into owned
//!   views with merged properties
//! - **[`watch`]**: live bindings from properties to view targets, checked for
//!   cycles up front and re-evaluated only where a change can reach
//! - **[`document`]**: JSON/TOML component libraries
//!
//! ## Example
//!
//! ```rust
//! use bender_config::ResolverConfig;
//! use bender_core::{LibraryDocument, Resolver, Site};
//!
//! let library = LibraryDocument::from_json_str(r#"{"components": [{
//!     "name": "Greeting",
//!     "properties": {"name": "world"},
//!     "view": {"kind": "text", "name": "line", "text": "Hello {name}"}
//! }]}"#)?
//! .into_library()?;
//!
//! let resolver = Resolver::new(&library, ResolverConfig::default());
//! let mut greeting = resolver.resolve("Greeting", &Site::new())?;
//! greeting.set_property("name", "Ada")?;
//! assert!(bender_core::tree::outline(greeting.view()).contains("Hello Ada"));
//! # Ok::<(), bender_core::BenderError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod component;
pub mod document;
pub mod error;
pub mod resolve;
pub mod tree;
pub mod value;
pub mod watch;

pub use component::{Component, ComponentDef, ComponentLibrary, Registry};
pub use document::{LibraryDocument, RawComponent, RawNode, RawWatch};
pub use error::{BenderError, BenderResult};
pub use resolve::{Resolver, Site};
pub use tree::{Element, NodeId, QName, Tree};
pub use value::Value;
pub use watch::{Expr, TargetPath, UpdateReport, WatchDef, WriteOutcome};

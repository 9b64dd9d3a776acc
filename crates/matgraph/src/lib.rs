// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node-graph material editor core.
//!
//! This crate holds everything a material editor needs below its UI:
//! - Typed pins and the compatibility rules between them
//! - A registry of declarative node definitions and the built-in catalog
//! - The graph model with link validation and a protected output node
//! - An evaluator that reduces the graph to PBR material attributes
//! - Per-node shader snippet emission and whole-graph export
//!
//! ## Architecture
//!
//! Node kinds are data: a [`NodeDefinition`] names its pins, properties,
//! shader template and evaluation rule. One [`NodeRegistry`] is built per
//! session and shared as an `Arc` by graphs and the [`Translator`].
//! Texture compositing is the only asynchronous step; the evaluator returns
//! it as [`Evaluated::Pending`] and the caller finishes it with
//! [`texture::resolve_pending`].

pub mod catalog;
pub mod connection;
pub mod document;
pub mod evaluation;
pub mod graph;
pub mod node;
pub mod port;
pub mod registry;
pub mod settings;
pub mod shader;
pub mod texture;
pub mod value;

pub use catalog::create_material_registry;
pub use connection::{Link, LinkId, PinRef};
pub use document::{DocumentError, GraphDocument};
pub use evaluation::{Channel, EvaluationTrace, MaterialAttributes, Translator};
pub use graph::{ConnectionError, Graph, GraphError};
pub use node::{EvalRule, Node, NodeDefinition, NodeId, NodeKind, Pin, PinSpec};
pub use port::{CompatibilityMatrix, PinDirection, PinType};
pub use registry::NodeRegistry;
pub use settings::{CyclePolicy, EvaluatorSettings, GraphSettings, SettingsError};
pub use shader::ShaderExporter;
pub use texture::{CompositeError, TextureCompositor, TextureLibrary, TextureResolver};
pub use value::{Evaluated, Literal, PendingKind, PendingOperation, TextureRef, Value};

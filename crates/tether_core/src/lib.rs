//! Tether Core Runtime
//!
//! This crate provides the reactive property substrate underneath Tether's
//! declarative component tree:
//!
//! - **Bindings**: property nodes whose values are set directly or derived
//!   from other bindings through transforms, propagated synchronously
//! - **Transitions**: time-based blending of a binding's previous value into
//!   its current one through precomputed bezier easing
//! - **Presets**: groups of derived bindings wired to one switch
//! - **Models and scopes**: named access to a component's bindings and their
//!   deterministic release
//!
//! # Example
//!
//! ```rust
//! use tether_core::{BindingGraph, Length};
//!
//! let mut graph = BindingGraph::new();
//!
//! let x1 = graph.create_with(Length::Px(10.0));
//! let x2 = graph.create_with(Length::Px(50.0));
//! let width = graph.create::<Length>();
//!
//! // Derive the width from both edges
//! graph.connect(width, (x1, x2), |(x1, x2)| x2 - x1, None).unwrap();
//! assert_eq!(graph.get(width).unwrap(), Length::Px(40.0));
//!
//! // Writes propagate before `set` returns
//! graph.set(x2, Length::Px(110.0)).unwrap();
//! assert_eq!(graph.get(width).unwrap(), Length::Px(100.0));
//! ```

pub mod adapter;
pub mod ancestors;
pub mod binding;
pub mod brush;
pub mod clock;
pub mod collection;
pub mod config;
pub mod error;
pub mod length;
pub mod model;
pub mod preset;
pub mod scope;
pub mod transition;
pub mod value;

pub use adapter::{Children, ChildrenAdapter, EventAdapter, EventEmitter, EventHandler};
pub use ancestors::Ancestors;
pub use binding::{Binding, BindingGraph, BindingId, GraphStats, Listener, Transform};
pub use brush::{Brush, Color};
pub use clock::{Clock, ManualClock, SystemClock};
pub use collection::Collection;
pub use config::{EasingConfig, LogConfig, RuntimeConfig};
pub use error::{BindingError, ConfigError, Result};
pub use length::Length;
pub use model::{Model, ModelEntry};
pub use preset::BindingPreset;
pub use scope::BindingScope;
pub use transition::{CubicBezier, Ease, Linear, Transition, TransitionRef, DEFAULT_SAMPLE_COUNT};
pub use value::{Layout, PropertyValue, Value, ValueKind};

//! Tether Bridge
//!
//! Runs the `tether_core` binding graph behind a handle-based boundary, for
//! builds where the engine is compiled separately from the code observing
//! it.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────┐          ┌─────────────────────────────┐
//! │       Observer side        │          │         Engine side         │
//! │                            │ KindTable│                             │
//! │  RemoteProperty<T> ────────┼─────────▶│  BridgeEngine               │
//! │    WireValue / WeakRef     │          │    BindingGraph             │
//! │                            │          │    SlotMap<PropertyHandle>  │
//! │  LocalHost                 │  Host    │    change set (IndexSet)    │
//! │    HandleTable<callback> ◀─┼──────────┤                             │
//! │                            │          │                             │
//! │  Scheduler ──tick──▶ CommitQueue::flush (notify, once per property) │
//! └────────────────────────────┘          └─────────────────────────────┘
//! ```
//!
//! Values cross as tagged [`WireValue`]s, callbacks as integer handles, and
//! failures as [`BoundaryResult`]s that the caller must verify.
//!
//! # Example
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use tether_bridge::{ManualScheduler, PropertyFactory};
//!
//! let scheduler = Rc::new(ManualScheduler::new());
//! let factory = PropertyFactory::new(scheduler.clone());
//!
//! let seen = Rc::new(Cell::new(0));
//! let sink = seen.clone();
//! let count = factory.create_observed::<i32, _>(move |n| sink.set(n));
//!
//! count.set(1).unwrap();
//! count.set(2).unwrap();
//! assert_eq!(seen.get(), 0);
//!
//! scheduler.tick();
//! assert_eq!(seen.get(), 2);
//! ```

pub mod commit;
pub mod config;
pub mod engine;
pub mod error;
pub mod handle;
pub mod host;
pub mod logging;
pub mod proxy;
pub mod result;
pub mod seq;
pub mod table;
pub mod wire;

pub use commit::{CommitQueue, ManualScheduler, Scheduler};
pub use config::{BridgeConfig, HandleConfig};
pub use engine::{BridgeEngine, PropertyHandle, SharedEngine};
pub use error::{BridgeError, Result};
pub use handle::{Handle, HandleTable, NULL_HANDLE};
pub use host::{Host, HostCallback, HostFunction, LocalHost, LogLine};
pub use logging::{install, install_for, HostLogMakeWriter, HostLogWriter, LogSink};
pub use proxy::{PropertyFactory, RemoteProperty};
pub use result::BoundaryResult;
pub use seq::{BoundarySeq, RawSeq, SeqOps, WeakRef, VALUE_SEQ, WEAKREF_SEQ};
pub use table::{
    KindTable, BOOLEAN_TABLE, BRUSH_TABLE, COLLECTION_TABLE, FLOAT_TABLE, INT_TABLE, LAYOUT_TABLE,
    LENGTH_TABLE, STRING_TABLE,
};
pub use wire::{WireTag, WireValue};

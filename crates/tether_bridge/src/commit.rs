//! Commit batching
//!
//! Writes apply to the graph immediately; what is deferred is telling the
//! observers. Any number of changes between two ticks result in a single
//! flush that notifies each changed property once with its latest value.
//!
//! The flush runs through a [`Scheduler`], so the host decides when a tick
//! happens (an animation frame, an idle callback, or an explicit
//! [`ManualScheduler::tick`] in tests).

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::engine::{BridgeEngine, SharedEngine};

/// Deferred work queue driven by the host loop
pub trait Scheduler {
    /// Run `task` once at the next tick
    fn schedule(&self, task: Box<dyn FnOnce()>);
}

/// Scheduler that runs queued tasks only when ticked
#[derive(Default)]
pub struct ManualScheduler {
    queue: RefCell<VecDeque<Box<dyn FnOnce()>>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the tasks queued before this call; returns how many ran
    pub fn tick(&self) -> usize {
        let tasks: Vec<_> = self.queue.borrow_mut().drain(..).collect();
        let count = tasks.len();
        for task in tasks {
            task();
        }
        count
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, task: Box<dyn FnOnce()>) {
        self.queue.borrow_mut().push_back(task);
    }
}

impl fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualScheduler")
            .field("pending", &self.pending())
            .finish()
    }
}

struct CommitInner {
    scheduler: Rc<dyn Scheduler>,
    pending: Cell<bool>,
    engine: RefCell<Weak<RefCell<BridgeEngine>>>,
}

/// Coalesces flush requests into one scheduled flush
#[derive(Clone)]
pub struct CommitQueue {
    inner: Rc<CommitInner>,
}

impl CommitQueue {
    pub fn new(scheduler: Rc<dyn Scheduler>) -> Self {
        Self {
            inner: Rc::new(CommitInner {
                scheduler,
                pending: Cell::new(false),
                engine: RefCell::new(Weak::new()),
            }),
        }
    }

    /// Flush `engine`'s changes and route its notifications through this queue
    pub fn attach(&self, engine: &SharedEngine) {
        *self.inner.engine.borrow_mut() = Rc::downgrade(engine);
        engine.borrow_mut().attach_commit(self.clone());
    }

    /// Schedule a flush unless one is already pending
    pub fn request(&self) {
        if self.inner.pending.replace(true) {
            return;
        }
        let queue = self.clone();
        self.inner.scheduler.schedule(Box::new(move || {
            queue.flush();
        }));
    }

    pub fn is_pending(&self) -> bool {
        self.inner.pending.get()
    }

    /// Notify every property changed since the last flush.
    ///
    /// Notifications are sent after the engine borrow is released, so a
    /// notify callback may read or write the engine. A flush that finds the
    /// engine borrowed schedules itself again. Returns how many were sent.
    pub fn flush(&self) -> usize {
        self.inner.pending.set(false);
        let Some(engine) = self.inner.engine.borrow().upgrade() else {
            return 0;
        };

        let notifications = match engine.try_borrow() {
            Ok(engine) => engine.take_notifications(),
            Err(_) => {
                tracing::warn!("engine busy during flush; retrying next tick");
                self.request();
                return 0;
            }
        };
        if notifications.is_empty() {
            return 0;
        }

        tracing::debug!(count = notifications.len(), "flushing commit");
        let count = notifications.len();
        for (notify, value) in notifications {
            if let Err(err) = notify.call(vec![value]) {
                tracing::error!(handle = notify.handle(), %err, "notify dispatch failed");
            }
        }
        count
    }
}

impl fmt::Debug for CommitQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommitQueue")
            .field("pending", &self.is_pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::NULL_HANDLE;
    use crate::host::LocalHost;
    use crate::wire::WireValue;
    use tether_core::ValueKind;

    fn setup() -> (SharedEngine, CommitQueue, Rc<ManualScheduler>, Rc<LocalHost>) {
        let host = Rc::new(LocalHost::new());
        let scheduler = Rc::new(ManualScheduler::new());
        let engine: SharedEngine = Rc::new(RefCell::new(BridgeEngine::new(host.clone())));
        let commit = CommitQueue::new(scheduler.clone());
        commit.attach(&engine);
        (engine, commit, scheduler, host)
    }

    #[test]
    fn test_requests_coalesce() {
        let (_, commit, scheduler, _) = setup();
        commit.request();
        commit.request();
        assert!(commit.is_pending());
        assert_eq!(scheduler.pending(), 1);

        assert_eq!(scheduler.tick(), 1);
        assert!(!commit.is_pending());
        assert_eq!(scheduler.tick(), 0);
    }

    #[test]
    fn test_flush_of_empty_set_is_noop() {
        let (_, commit, _, _) = setup();
        assert_eq!(commit.flush(), 0);
    }

    #[test]
    fn test_flush_notifies_latest_value() {
        let (engine, _, scheduler, host) = setup();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let notify = host.register(move |args| {
            sink.borrow_mut().push(args[0].unwrap::<i32>().unwrap_or(-1));
            WireValue::wrap(false)
        });

        let handle = engine.borrow_mut().create(ValueKind::Int, notify);
        for n in [1, 2, 3] {
            engine.borrow_mut().set(handle, &WireValue::wrap(n)).unwrap();
        }
        assert_eq!(scheduler.tick(), 1);
        assert_eq!(*seen.borrow(), vec![3]);
    }

    #[test]
    fn test_notify_may_write_engine() {
        let (engine, _, scheduler, host) = setup();
        let mirror = engine.borrow_mut().create(ValueKind::Int, NULL_HANDLE);

        let weak = Rc::downgrade(&engine);
        let notify = host.register(move |args| {
            if let Some(engine) = weak.upgrade() {
                let _ = engine.borrow_mut().set(mirror, &args[0]);
            }
            WireValue::wrap(false)
        });
        let source = engine.borrow_mut().create(ValueKind::Int, notify);
        engine.borrow_mut().set(source, &WireValue::wrap(9)).unwrap();

        scheduler.tick();
        let value = engine.borrow().get(mirror, false).unwrap();
        assert_eq!(value.unwrap::<i32>().unwrap(), 9);
    }

    #[test]
    fn test_busy_engine_defers_flush_to_next_tick() {
        let (engine, commit, scheduler, host) = setup();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let notify = host.register(move |args| {
            sink.borrow_mut().push(args[0].unwrap::<i32>().unwrap_or(-1));
            WireValue::wrap(false)
        });
        let handle = engine.borrow_mut().create(ValueKind::Int, notify);
        engine.borrow_mut().set(handle, &WireValue::wrap(5)).unwrap();

        {
            let _busy = engine.borrow_mut();
            assert_eq!(scheduler.tick(), 1);
        }
        assert!(seen.borrow().is_empty());
        assert!(commit.is_pending());
        assert_eq!(scheduler.pending(), 1);

        assert_eq!(scheduler.tick(), 1);
        assert_eq!(*seen.borrow(), vec![5]);
        assert_eq!(engine.borrow().pending_changes(), 0);
        assert!(!commit.is_pending());
    }

    #[test]
    fn test_flush_after_engine_dropped() {
        let (engine, commit, _, _) = setup();
        drop(engine);
        assert_eq!(commit.flush(), 0);
    }
}

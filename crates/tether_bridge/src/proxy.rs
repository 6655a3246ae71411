//! Observer-side property proxies
//!
//! A [`RemoteProperty<T>`] is what code on the observer side of the boundary
//! holds. Each call goes through the kind table for `T`, verifies the
//! boundary result on the spot, and turns failure into a
//! [`BridgeError`](crate::error::BridgeError).
//! Dropping the proxy drops the engine property.

use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use tether_core::{Clock, PropertyValue, SystemClock, Value};

use crate::commit::{CommitQueue, Scheduler};
use crate::config::BridgeConfig;
use crate::engine::{BridgeEngine, PropertyHandle, SharedEngine};
use crate::error::Result;
use crate::handle::{Handle, NULL_HANDLE};
use crate::host::LocalHost;
use crate::result::BoundaryResult;
use crate::seq::{BoundarySeq, WeakRef, WEAKREF_SEQ};
use crate::table::KindTable;
use crate::wire::WireValue;

/// Creates proxies against one engine
pub struct PropertyFactory {
    engine: SharedEngine,
    host: Rc<LocalHost>,
    commit: CommitQueue,
}

impl PropertyFactory {
    pub fn new(scheduler: Rc<dyn Scheduler>) -> Self {
        Self::with_config(&BridgeConfig::default(), Rc::new(SystemClock::new()), scheduler)
    }

    pub fn with_config(config: &BridgeConfig, clock: Rc<dyn Clock>, scheduler: Rc<dyn Scheduler>) -> Self {
        let host = Rc::new(LocalHost::with_reserved(config.reserved_handles()));
        let engine = BridgeEngine::with_config(host.clone(), config.runtime.clone(), clock);
        let engine: SharedEngine = Rc::new(RefCell::new(engine));
        let commit = CommitQueue::new(scheduler);
        commit.attach(&engine);
        Self { engine, host, commit }
    }

    pub fn engine(&self) -> &SharedEngine {
        &self.engine
    }

    pub fn host(&self) -> &Rc<LocalHost> {
        &self.host
    }

    pub fn commit(&self) -> &CommitQueue {
        &self.commit
    }

    pub fn create<T: PropertyValue>(&self) -> RemoteProperty<T> {
        self.create_raw(NULL_HANDLE)
    }

    pub fn create_with<T: PropertyValue>(&self, initial: T) -> Result<RemoteProperty<T>> {
        let property = self.create();
        property.set(initial)?;
        Ok(property)
    }

    /// Property whose committed changes are delivered to `notify`
    pub fn create_observed<T, F>(&self, notify: F) -> RemoteProperty<T>
    where
        T: PropertyValue,
        F: Fn(T) + 'static,
    {
        let handle = self.host.register(move |args| {
            match args.first().map(WireValue::unwrap::<T>) {
                Some(Ok(value)) => notify(value),
                Some(Err(err)) => tracing::error!(%err, "undecodable notify payload"),
                None => tracing::error!("notify called without a value"),
            }
            WireValue::wrap(true)
        });
        self.create_raw(handle)
    }

    fn create_raw<T: PropertyValue>(&self, notify: Handle) -> RemoteProperty<T> {
        let table = KindTable::for_kind(T::KIND);
        let handle = (table.new)(&mut self.engine.borrow_mut(), notify);
        RemoteProperty {
            handle,
            table,
            engine: self.engine.clone(),
            host: self.host.clone(),
            commit: self.commit.clone(),
            _kind: PhantomData,
        }
    }
}

impl fmt::Debug for PropertyFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyFactory")
            .field("host", &self.host)
            .field("commit", &self.commit)
            .finish()
    }
}

pub struct RemoteProperty<T: PropertyValue> {
    handle: PropertyHandle,
    table: &'static KindTable,
    engine: SharedEngine,
    host: Rc<LocalHost>,
    commit: CommitQueue,
    _kind: PhantomData<T>,
}

impl<T: PropertyValue> RemoteProperty<T> {
    pub fn handle(&self) -> PropertyHandle {
        self.handle
    }

    pub fn get(&self) -> Result<T> {
        self.read(false)
    }

    pub fn get_interpolated(&self) -> Result<T> {
        self.read(true)
    }

    fn read(&self, interpolate: bool) -> Result<T> {
        let mut result = BoundaryResult::ok();
        let value = (self.table.get)(&self.engine.borrow(), self.handle, interpolate, &mut result);
        result.verify()?;
        value.unwrap::<T>()
    }

    pub fn set(&self, value: T) -> Result<()> {
        let mut result = BoundaryResult::ok();
        (self.table.set)(
            &mut self.engine.borrow_mut(),
            self.handle,
            &WireValue::wrap(value),
            &mut result,
        );
        result.verify()?;
        self.commit.request();
        Ok(())
    }

    /// Reference usable as a parent in [`bind`](Self::bind)
    pub fn weakref(&self) -> Result<WeakRef> {
        let mut result = BoundaryResult::ok();
        let weakref = (self.table.weakref)(&self.engine.borrow(), self.handle, &mut result);
        result.verify()?;
        Ok(weakref)
    }

    /// Derive this property from `parents` through `transform`.
    ///
    /// `transform` runs while the engine is borrowed and must not touch
    /// other proxies.
    pub fn bind<F>(&self, parents: &[WeakRef], transform: F) -> Result<()>
    where
        F: Fn(&[Value]) -> T + 'static,
    {
        let seq = BoundarySeq::from_slice(&WEAKREF_SEQ, parents);
        let function = self.host.register(move |args| {
            match args.iter().map(WireValue::to_value).collect::<Result<Vec<_>>>() {
                Ok(values) => WireValue::wrap(transform(&values)),
                Err(err) => {
                    tracing::error!(%err, "undecodable transform arguments");
                    WireValue::wrap(T::default_value())
                }
            }
        });

        let mut result = BoundaryResult::ok();
        (self.table.bind)(&mut self.engine.borrow_mut(), self.handle, &seq, function, &mut result);
        result.verify()
    }

    pub fn freeze(&self) -> Result<()> {
        let mut result = BoundaryResult::ok();
        (self.table.freeze)(&mut self.engine.borrow_mut(), self.handle, &mut result);
        result.verify()
    }

    pub fn unbind(&self) -> Result<()> {
        let mut result = BoundaryResult::ok();
        (self.table.unbind)(&mut self.engine.borrow_mut(), self.handle, &mut result);
        result.verify()
    }
}

impl<T: PropertyValue> Drop for RemoteProperty<T> {
    fn drop(&mut self) {
        let Ok(mut engine) = self.engine.try_borrow_mut() else {
            tracing::warn!(handle = ?self.handle, "engine busy; property not dropped");
            return;
        };
        let mut result = BoundaryResult::ok();
        (self.table.drop)(&mut engine, self.handle, &mut result);
        if let Err(err) = result.verify() {
            tracing::warn!(handle = ?self.handle, %err, "failed to drop property");
        }
    }
}

impl<T: PropertyValue> fmt::Debug for RemoteProperty<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteProperty")
            .field("kind", &self.table.kind)
            .field("handle", &self.handle)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commit::ManualScheduler;
    use crate::error::BridgeError;
    use tether_core::{BindingError, Length};

    fn factory() -> (PropertyFactory, Rc<ManualScheduler>) {
        let scheduler = Rc::new(ManualScheduler::new());
        (PropertyFactory::new(scheduler.clone()), scheduler)
    }

    #[test]
    fn test_set_then_get() {
        let (factory, _) = factory();
        let width = factory.create_with(Length::Px(12.0)).unwrap();
        assert_eq!(width.get().unwrap(), Length::Px(12.0));
    }

    #[test]
    fn test_frozen_set_fails_with_message() {
        let (factory, _) = factory();
        let n = factory.create_with(1i32).unwrap();
        n.freeze().unwrap();

        let binding = factory.engine().borrow().binding(n.handle()).unwrap();
        let expected = BindingError::ReadonlyViolation(binding).to_string();
        assert_eq!(n.set(2), Err(BridgeError::BoundaryOperationFailed(expected)));
        assert_eq!(n.get().unwrap(), 1);
    }

    #[test]
    fn test_drop_releases_engine_property() {
        let (factory, _) = factory();
        let a = factory.create_observed::<bool, _>(|_| {});
        assert_eq!(factory.engine().borrow().property_count(), 1);
        assert_eq!(factory.host().live_functions(), 1);

        drop(a);
        assert_eq!(factory.engine().borrow().property_count(), 0);
        assert_eq!(factory.host().live_functions(), 0);
    }

    #[test]
    fn test_bind_and_unbind() {
        let (factory, _) = factory();
        let count = factory.create_with(2i32).unwrap();
        let doubled = factory.create::<i32>();

        doubled
            .bind(&[count.weakref().unwrap()], |values| {
                values[0].as_int().unwrap_or(0) * 2
            })
            .unwrap();
        count.set(21).unwrap();
        assert_eq!(doubled.get().unwrap(), 42);

        let binding = factory.engine().borrow().binding(doubled.handle()).unwrap();
        let expected = BindingError::DirectWriteOnComputed(binding).to_string();
        assert_eq!(doubled.set(0), Err(BridgeError::BoundaryOperationFailed(expected)));

        doubled.unbind().unwrap();
        doubled.set(0).unwrap();
        assert_eq!(factory.host().live_functions(), 0);
    }
}

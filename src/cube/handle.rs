//! Shared handle to a datacube node
//!
//! A [`Cube`] owns its node through `Rc<RefCell<_>>`; parents hold child
//! handles and children hold a [`WeakCube`] back to their parent. Every
//! mutating call borrows the node, applies the change, releases the borrow
//! and then delivers the events the change raised.

use std::cell::{Ref, RefCell};
use std::fmt;
use std::path::PathBuf;
use std::rc::{Rc, Weak};

use crate::config::CubeConfig;
use crate::notify::{CubeEvent, CubeObserver, NotificationBus, SharedObserver, SubscriptionId};
use crate::observability::LogEvent;
use crate::value::{AttrValue, Attributes, DataKind};

use super::datacube::{CubeId, Datacube};
use super::errors::{CubeError, CubeResult};

/// Owning handle to a datacube node
///
/// Cloning the handle shares the node. Two handles are equal when they
/// point at the same node.
#[derive(Clone)]
pub struct Cube {
    inner: Rc<RefCell<Datacube>>,
}

/// Non-owning handle, used for parent back-references
#[derive(Clone, Default)]
pub struct WeakCube {
    inner: Weak<RefCell<Datacube>>,
}

impl WeakCube {
    pub fn upgrade(&self) -> Option<Cube> {
        self.inner.upgrade().map(|inner| Cube { inner })
    }
}

impl fmt::Debug for WeakCube {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(cube) => write!(f, "WeakCube({:?})", cube),
            None => write!(f, "WeakCube(dropped)"),
        }
    }
}

impl PartialEq for Cube {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Cube {}

impl fmt::Debug for Cube {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_borrow() {
            Ok(node) => write!(f, "Cube({} {})", node.name, node.id),
            Err(_) => write!(f, "Cube(<borrowed>)"),
        }
    }
}

/// Builder for a new root node
#[derive(Debug, Clone)]
pub struct CubeBuilder {
    name: String,
    kind: DataKind,
    defaults: Attributes,
    config: CubeConfig,
    description: String,
    tags: String,
}

impl CubeBuilder {
    /// Numeric kind of every cell, float by default
    pub fn kind(mut self, kind: DataKind) -> Self {
        self.kind = kind;
        self
    }

    /// Initial parameters, kept as the node's defaults
    pub fn defaults(mut self, defaults: Attributes) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn config(mut self, config: CubeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = tags.into();
        self
    }

    pub fn build(self) -> Cube {
        let mut node = Datacube::new(self.name, self.kind, self.defaults, self.config);
        node.description = self.description;
        node.tags = self.tags;
        Cube::from_node(node)
    }
}

impl Cube {
    /// Creates an empty float node
    pub fn new(name: impl Into<String>) -> Self {
        Self::builder(name).build()
    }

    pub fn builder(name: impl Into<String>) -> CubeBuilder {
        CubeBuilder {
            name: name.into(),
            kind: DataKind::default(),
            defaults: Attributes::new(),
            config: CubeConfig::default(),
            description: String::new(),
            tags: String::new(),
        }
    }

    pub(super) fn from_node(node: Datacube) -> Self {
        Self {
            inner: Rc::new(RefCell::new(node)),
        }
    }

    /// Borrows the node for reading.
    ///
    /// # Panics
    ///
    /// Panics if called from inside a mutation of the same node. Observers
    /// run after the node is released and may read freely.
    pub fn read(&self) -> Ref<'_, Datacube> {
        self.inner.borrow()
    }

    pub fn try_read(&self) -> Option<Ref<'_, Datacube>> {
        self.inner.try_borrow().ok()
    }

    pub fn downgrade(&self) -> WeakCube {
        WeakCube {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn ptr_eq(&self, other: &Cube) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn id(&self) -> CubeId {
        self.inner.borrow().id
    }

    pub fn name(&self) -> String {
        self.inner.borrow().name.clone()
    }

    /// Name of the node, or `None` while it is mutably borrowed
    pub fn try_name(&self) -> Option<String> {
        let node = self.inner.try_borrow().ok()?;
        Some(node.name.clone())
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().length
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn cursor(&self) -> usize {
        self.inner.borrow().cursor
    }

    // ==================
    // Observers
    // ==================

    pub fn subscribe(&self, observer: impl CubeObserver + 'static) -> SubscriptionId {
        self.inner.borrow_mut().bus.subscribe(observer)
    }

    pub fn subscribe_shared(&self, observer: SharedObserver) -> SubscriptionId {
        self.inner.borrow_mut().bus.subscribe_shared(observer)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.borrow_mut().bus.unsubscribe(id)
    }

    /// Applies `op` to the node, then delivers the events it raised.
    ///
    /// An observer failure is returned even though `op` took effect.
    pub(super) fn mutate<R>(
        &self,
        op: impl FnOnce(&mut Datacube) -> CubeResult<R>,
    ) -> CubeResult<R> {
        let (result, events, bus) = {
            let mut node = self.inner.borrow_mut();
            let result = op(&mut node);
            let events = std::mem::take(&mut node.outbox);
            let bus = if events.is_empty() {
                NotificationBus::new()
            } else {
                node.bus.clone()
            };
            (result, events, bus)
        };
        self.deliver(&bus, &events)?;
        result
    }

    fn deliver(&self, bus: &NotificationBus, events: &[CubeEvent]) -> CubeResult<()> {
        for event in events {
            match bus.publish(event) {
                Ok(_) => self.inner.borrow().metrics.add_events_published(1),
                Err(err) => {
                    let node = self.inner.borrow();
                    node.metrics.increment_observer_failures();
                    node.log(
                        LogEvent::ObserverFailed,
                        &[("event", event.as_str()), ("error", err.message())],
                    );
                    return Err(CubeError::Observer(err));
                }
            }
        }
        Ok(())
    }

    // ==================
    // Metadata
    // ==================

    /// Emits `name` then `metaUpdated`
    pub fn set_name(&self, name: impl Into<String>) -> CubeResult<()> {
        let name = name.into();
        self.mutate(|node| {
            node.set_name(name);
            Ok(())
        })
    }

    /// Emits `description` then `metaUpdated`
    pub fn set_description(&self, description: impl Into<String>) -> CubeResult<()> {
        let description = description.into();
        self.mutate(|node| {
            node.set_description(description);
            Ok(())
        })
    }

    /// Emits `tags` then `metaUpdated`
    pub fn set_tags(&self, tags: impl Into<String>) -> CubeResult<()> {
        let tags = tags.into();
        self.mutate(|node| {
            node.set_tags(tags);
            Ok(())
        })
    }

    /// Emits `filename` then `metaUpdated`
    pub fn set_filename(&self, filename: impl Into<PathBuf>) -> CubeResult<()> {
        let filename = filename.into();
        self.mutate(|node| {
            node.set_filename(filename);
            Ok(())
        })
    }

    /// Replaces the parameter map; emits `parameters` then `metaUpdated`
    pub fn set_parameters(&self, parameters: Attributes) -> CubeResult<()> {
        self.mutate(|node| {
            node.set_parameters(parameters);
            Ok(())
        })
    }

    /// Merges into the parameter map; emits `parameters` then `metaUpdated`
    pub fn add_parameters(&self, parameters: Attributes) -> CubeResult<()> {
        self.mutate(|node| {
            node.add_parameters(parameters);
            Ok(())
        })
    }

    /// Sets one parameter; emits `parameters` only
    pub fn set_parameter(
        &self,
        key: impl Into<String>,
        value: impl Into<AttrValue>,
    ) -> CubeResult<()> {
        let (key, value) = (key.into(), value.into());
        self.mutate(|node| {
            node.set_parameter(key, value);
            Ok(())
        })
    }

    /// Clears the unsaved flag after a successful save
    pub fn mark_saved(&self) {
        self.inner.borrow_mut().mark_saved();
    }

    /// Sets or clears the parent back-reference without emitting events
    pub(super) fn link_parent(&self, parent: Option<&Cube>) {
        self.inner.borrow_mut().parent = parent.map(Cube::downgrade);
    }
}

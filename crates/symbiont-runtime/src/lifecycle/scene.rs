#![forbid(unsafe_code)]

//! Scenes: a screen and everything it owns.
//!
//! A [`Scene`] activates its components once, in the order they were
//! added, after running its own initializer. Responders receive a handle
//! to the scene before they initialize. Transitions out of a scene copy
//! forwarded data into the destination's opted-in data sources.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use symbiont_core::{IndexPath, WiringError};

use super::data_source::Receptacle;
use super::segue::SegueDataProvider;
use super::Activate;
use crate::binding::AddressedBinding;
use crate::reactive::AnyReader;

/// A scene-level controller that needs its scene.
pub trait Responder: 'static {
    /// Called before [`initialize`](Self::initialize), once per activation.
    fn attach(&self, scene: Weak<Scene>);

    fn initialize(&self) {}
}

/// Notified when a list row is selected.
pub trait SelectionResponder: 'static {
    fn selected(&self, at: IndexPath);
}

/// A responder that handles control actions.
pub trait ActionResponder: Responder {
    fn perform(&self, sender: &dyn Any);
}

trait SceneSource: Activate + Receptacle {}

impl<S: Activate + Receptacle> SceneSource for S {}

#[derive(Clone)]
enum Component {
    Source(Rc<dyn SceneSource>),
    Activatable(Rc<dyn Activate>),
    Responder(Rc<dyn Responder>),
}

type Hook = Box<dyn FnOnce(&Scene)>;

/// One screen's worth of sources, bindings and responders.
///
/// # Invariants
///
/// 1. The initializer hook runs before any component is activated.
/// 2. A successful activation is never repeated.
/// 3. Only components that accept forwarded data receive it.
pub struct Scene {
    name: String,
    this: Weak<Self>,
    hook: RefCell<Option<Hook>>,
    components: RefCell<Vec<Component>>,
    actions: RefCell<Vec<Rc<dyn ActionResponder>>>,
    active: Cell<bool>,
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("name", &self.name)
            .field("components", &self.components.borrow().len())
            .field("active", &self.active.get())
            .finish()
    }
}

impl Scene {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Rc<Self> {
        let name = name.into();
        Rc::new_cyclic(|this| Self {
            name,
            this: this.clone(),
            hook: RefCell::new(None),
            components: RefCell::new(Vec::new()),
            actions: RefCell::new(Vec::new()),
            active: Cell::new(false),
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    #[must_use]
    pub fn component_count(&self) -> usize {
        self.components.borrow().len()
    }

    /// The scene's own initializer, run first during activation.
    pub fn on_initialize(&self, hook: impl FnOnce(&Scene) + 'static) {
        *self.hook.borrow_mut() = Some(Box::new(hook));
    }

    /// A data source that may also receive forwarded data.
    pub fn add_source<S: Activate + Receptacle + 'static>(&self, source: Rc<S>) {
        self.components.borrow_mut().push(Component::Source(source));
    }

    pub fn add_binding<B: AddressedBinding + 'static>(&self, binding: Rc<B>) {
        self.add_component(binding);
    }

    /// Anything else with an activation step (list and load-state bindings).
    pub fn add_component(&self, component: Rc<dyn Activate>) {
        self.components
            .borrow_mut()
            .push(Component::Activatable(component));
    }

    pub fn add_responder<R: Responder>(&self, responder: Rc<R>) {
        self.components
            .borrow_mut()
            .push(Component::Responder(responder));
    }

    pub fn add_action_responder<R: ActionResponder>(&self, responder: Rc<R>) {
        self.actions.borrow_mut().push(Rc::clone(&responder) as Rc<dyn ActionResponder>);
        self.add_responder(responder);
    }

    /// Pass a control action to every action responder. Returns how many
    /// were called.
    pub fn send_action(&self, sender: &dyn Any) -> usize {
        let actions = self.actions.borrow().clone();
        for responder in &actions {
            responder.perform(sender);
        }
        actions.len()
    }

    /// Activate `destination`, then copy `trigger`'s data into each of its
    /// receptacles that accepts forwarded data.
    ///
    /// Returns how many receptacles took the data. A trigger without data
    /// still activates the destination.
    ///
    /// # Errors
    ///
    /// Any wiring error from activating the destination.
    pub fn prepare_transition(
        &self,
        trigger: &dyn SegueDataProvider,
        destination: &Scene,
    ) -> Result<usize, WiringError> {
        destination.try_activate()?;
        let Some(data) = trigger.segue_data() else {
            tracing::debug!(from = %self.name, to = %destination.name, "transition without data");
            return Ok(0);
        };
        let accepted = destination.receive_forwarded(&data);
        tracing::debug!(
            from = %self.name,
            to = %destination.name,
            element = data.element_type_name(),
            count = data.count(),
            accepted,
            "forwarded segue data"
        );
        Ok(accepted)
    }

    /// Offer `data` to every opted-in receptacle. Returns how many took it.
    pub fn receive_forwarded(&self, data: &AnyReader) -> usize {
        let components = self.components.borrow().clone();
        components
            .iter()
            .filter_map(|component| match component {
                Component::Source(source) if source.accepts_forwarded() => Some(source),
                _ => None,
            })
            .filter(|source| source.receive_forwarded(data))
            .count()
    }
}

impl Activate for Scene {
    fn try_activate(&self) -> Result<(), WiringError> {
        if self.active.get() {
            return Ok(());
        }
        let hook = self.hook.borrow_mut().take();
        if let Some(hook) = hook {
            hook(self);
        }

        // Clone out so components may add to the scene while activating.
        let components = self.components.borrow().clone();
        for component in &components {
            match component {
                Component::Source(source) => source.try_activate()?,
                Component::Activatable(component) => component.try_activate()?,
                Component::Responder(responder) => {
                    responder.attach(self.this.clone());
                    responder.initialize();
                }
            }
        }

        self.active.set(true);
        tracing::debug!(scene = %self.name, components = components.len(), "scene active");
        Ok(())
    }
}

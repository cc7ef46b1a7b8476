use std::fmt;
use std::rc::Rc;

use compose_core::RuntimeHandle;
use compose_ui_graphics::Density;

use crate::container::InteropContainer;
use crate::context::InteropContext;
use crate::native::{ControllerId, NativeHost, ViewId};

/// Values every embedded node of one composition shares: the host toolkit,
/// the deferred-action queue, the root container and the display density.
#[derive(Clone)]
pub struct InteropEnvironment {
    pub host: Rc<dyn NativeHost>,
    pub runtime: RuntimeHandle,
    pub context: InteropContext,
    pub container: InteropContainer,
    pub density: Density,
    /// Parent for embedded controllers. Required by controller embedding.
    pub root_controller: Option<ControllerId>,
}

impl InteropEnvironment {
    /// Builds a fresh context and container hosted by `root_view`.
    pub fn new(host: Rc<dyn NativeHost>, root_view: ViewId, runtime: RuntimeHandle) -> Self {
        let context = InteropContext::new(runtime.clone());
        let container = InteropContainer::new(Rc::clone(&host), root_view, runtime.clone());
        Self {
            host,
            runtime,
            context,
            container,
            density: Density::default(),
            root_controller: None,
        }
    }

    pub fn with_density(mut self, density: Density) -> Self {
        self.density = density;
        self
    }

    pub fn with_root_controller(mut self, root: ControllerId) -> Self {
        self.root_controller = Some(root);
        self
    }
}

impl fmt::Debug for InteropEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InteropEnvironment")
            .field("context", &self.context)
            .field("container", &self.container)
            .field("density", &self.density)
            .field("root_controller", &self.root_controller)
            .finish()
    }
}

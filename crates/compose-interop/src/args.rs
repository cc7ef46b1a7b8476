//! Builder for the options of an embedded native object.

use std::fmt;
use std::rc::Rc;

use compose_ui_graphics::{Color, Rect};

use crate::embedded::{ReleaseFn, ResizeFn};
use crate::native::{ControllerId, ViewId};
use crate::updater::UpdateFn;

/// Options that may change between composition passes.
pub struct InteropOptions<T: 'static> {
    /// `None` applies no state to the component.
    pub update: Option<UpdateFn<T>>,
    pub background: Color,
    /// `None` resizes the native frame to the new bounds.
    pub on_resize: Option<ResizeFn<T>>,
    pub interactive: bool,
}

impl<T: 'static> Default for InteropOptions<T> {
    fn default() -> Self {
        Self {
            update: None,
            background: Color::UNSPECIFIED,
            on_resize: None,
            interactive: true,
        }
    }
}

impl<T: 'static> Clone for InteropOptions<T> {
    fn clone(&self) -> Self {
        Self {
            update: self.update.clone(),
            background: self.background,
            on_resize: self.on_resize.clone(),
            interactive: self.interactive,
        }
    }
}

impl<T: 'static> fmt::Debug for InteropOptions<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InteropOptions")
            .field("update", &self.update.is_some())
            .field("background", &self.background)
            .field("on_resize", &self.on_resize.is_some())
            .field("interactive", &self.interactive)
            .finish()
    }
}

/// Arguments of one call to an embedding entry point.
///
/// The factory and the release callback are only used on the pass that
/// mounts the node; later passes only apply [`InteropOptions`].
///
/// ```ignore
/// let args = NativeViewArgs::new(move || host.create_view())
///     .update(move |view| label.apply(view))
///     .background(Color::WHITE);
/// ```
pub struct InteropArgs<T: 'static> {
    factory: Box<dyn FnOnce() -> T>,
    on_release: ReleaseFn<T>,
    options: InteropOptions<T>,
}

pub type NativeViewArgs<T = ViewId> = InteropArgs<T>;
pub type NativeControllerArgs<T = ControllerId> = InteropArgs<T>;

impl<T: 'static> InteropArgs<T> {
    pub fn new(factory: impl FnOnce() -> T + 'static) -> Self {
        Self {
            factory: Box::new(factory),
            on_release: Box::new(|_: &T| {}),
            options: InteropOptions::default(),
        }
    }

    /// Sets the update callback. Every call creates a new callback, so the
    /// node re-runs it synchronously on the pass that supplies it.
    pub fn update(self, update: impl Fn(&T) + 'static) -> Self {
        self.update_shared(Rc::new(update))
    }

    /// Sets an update callback whose identity the caller keeps stable
    /// across passes.
    pub fn update_shared(mut self, update: UpdateFn<T>) -> Self {
        self.options.update = Some(update);
        self
    }

    pub fn background(mut self, background: Color) -> Self {
        self.options.background = background;
        self
    }

    pub fn on_release(mut self, on_release: impl FnOnce(&T) + 'static) -> Self {
        self.on_release = Box::new(on_release);
        self
    }

    pub fn on_resize(mut self, on_resize: impl Fn(&T, Rect) + 'static) -> Self {
        self.options.on_resize = Some(Rc::new(on_resize));
        self
    }

    pub fn interactive(mut self, interactive: bool) -> Self {
        self.options.interactive = interactive;
        self
    }

    pub fn options(&self) -> &InteropOptions<T> {
        &self.options
    }

    pub(crate) fn into_parts(self) -> (Box<dyn FnOnce() -> T>, ReleaseFn<T>, InteropOptions<T>) {
        (self.factory, self.on_release, self.options)
    }
}

impl<T: 'static> fmt::Debug for InteropArgs<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InteropArgs")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_embedding_contract() {
        let args = NativeViewArgs::new(|| ViewId(1));
        let options = args.options();
        assert!(options.update.is_none());
        assert!(options.background.is_unspecified());
        assert!(options.on_resize.is_none());
        assert!(options.interactive);
    }

    #[test]
    fn builder_records_every_option() {
        let shared: UpdateFn<ViewId> = Rc::new(|_: &ViewId| {});
        let args = NativeViewArgs::new(|| ViewId(7))
            .update_shared(Rc::clone(&shared))
            .background(Color::RED)
            .on_resize(|_, _| {})
            .interactive(false);

        let (factory, _on_release, options) = args.into_parts();
        assert_eq!(factory(), ViewId(7));
        assert!(Rc::ptr_eq(options.update.as_ref().expect("update"), &shared));
        assert_eq!(options.background, Color::RED);
        assert!(options.on_resize.is_some());
        assert!(!options.interactive);
    }
}

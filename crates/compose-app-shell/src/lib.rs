//! Frame driver for compositions that embed native views.
//!
//! One frame is: run queued runtime tasks, compose, run the layout placer,
//! then flush the interop context so native mutations land after layout and
//! before the frame is presented.

use std::fmt;

use compose_interop::{
    InteropComposition, InteropEnvironment, InteropError, InteropScope, InteropTransaction, ViewId,
};
use compose_runtime_std::StdRuntime;
use compose_ui_graphics::Point;

type Content = Box<dyn FnMut(&mut InteropScope<'_>)>;
type Placer = Box<dyn FnMut(&mut InteropComposition)>;

pub struct InteropShell {
    runtime: StdRuntime,
    composition: InteropComposition,
    content: Content,
    placer: Placer,
    frames: u64,
    last_transaction: Option<InteropTransaction>,
}

impl InteropShell {
    /// `env` must be built from `runtime`'s handle.
    pub fn new(
        runtime: StdRuntime,
        env: InteropEnvironment,
        content: impl FnMut(&mut InteropScope<'_>) + 'static,
    ) -> Self {
        Self {
            runtime,
            composition: InteropComposition::new(env),
            content: Box::new(content),
            placer: Box::new(|_| {}),
            frames: 0,
            last_transaction: None,
        }
    }

    /// Installs the layout pass, which reports placements through
    /// [`InteropComposition::on_placed`].
    pub fn set_placer(&mut self, placer: impl FnMut(&mut InteropComposition) + 'static) {
        self.placer = Box::new(placer);
    }

    pub fn runtime(&self) -> &StdRuntime {
        &self.runtime
    }

    pub fn env(&self) -> &InteropEnvironment {
        self.composition.env()
    }

    pub fn composition(&self) -> &InteropComposition {
        &self.composition
    }

    pub fn composition_mut(&mut self) -> &mut InteropComposition {
        &mut self.composition
    }

    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    pub fn last_transaction(&self) -> Option<InteropTransaction> {
        self.last_transaction
    }

    /// Whether a frame is wanted, without consuming the request.
    pub fn needs_render(&self) -> bool {
        let handle = self.runtime.runtime_handle();
        handle.needs_frame() || handle.has_pending_tasks() || self.env().context.has_pending()
    }

    /// Like [`needs_render`](Self::needs_render), but also clears the
    /// scheduler's frame request. Event loops poll this once per wakeup.
    pub fn take_should_render(&self) -> bool {
        let requested = self.runtime.take_frame_request();
        self.needs_render() || requested
    }

    /// Runs one frame and returns the summary of its interop flush.
    pub fn update(&mut self) -> Result<InteropTransaction, InteropError> {
        self.frames += 1;
        let handle = self.runtime.runtime_handle();
        let tasks = handle.drain_tasks();
        if tasks > 0 {
            log::trace!("frame {} ran {tasks} runtime tasks", self.frames);
        }

        let content = &mut self.content;
        self.composition.compose(|scope| content(scope));
        (self.placer)(&mut self.composition);

        let flushed = self.env().context.flush();
        handle.set_needs_frame(false);
        match flushed {
            Ok(transaction) => {
                self.last_transaction = Some(transaction);
                Ok(transaction)
            }
            Err(err) => {
                log::error!("interop flush failed in frame {}: {err}", self.frames);
                Err(err)
            }
        }
    }

    /// Embedded container that receives pointer input at `point`, if any.
    pub fn pointer_target(&self, point: Point) -> Option<ViewId> {
        self.env().container.hit_test(point)
    }

    /// Unmounts every embedded node and flushes the removals.
    pub fn dispose(&mut self) -> Result<InteropTransaction, InteropError> {
        self.composition.dispose();
        self.env().context.flush()
    }
}

impl fmt::Debug for InteropShell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InteropShell")
            .field("frames", &self.frames)
            .field("composition", &self.composition)
            .field("last_transaction", &self.last_transaction)
            .finish()
    }
}

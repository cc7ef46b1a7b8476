//! Platform hooks the runtime delegates to.
//!
//! The host owns the UI thread and the frame loop. The runtime only ever asks
//! it for another frame; everything that mutates native views waits for that
//! frame and runs on the UI thread.

/// Requests frames from the host.
///
/// Implementations must be callable from any thread; the request itself
/// carries no work, it only tells the host that a flush is pending.
pub trait RuntimeScheduler: Send + Sync {
    /// Ask the host to run another frame as soon as it can.
    fn schedule_frame(&self);
}

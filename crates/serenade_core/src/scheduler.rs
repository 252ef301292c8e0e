//! Frame scheduler
//!
//! A cooperative, single-threaded per-frame callback queue modelled on the
//! browser's `requestAnimationFrame`. There is no global instance: the page
//! controller constructs one [`FrameScheduler`] and passes [`SchedulerHandle`]s
//! to the subsystems that need frames.
//!
//! Requests are one-shot. A subsystem that wants to run every frame (the
//! smooth-scroll emulator, the page loop) re-requests from inside its
//! callback and keeps the returned [`FrameRequestId`] so it can cancel the
//! pending request on teardown.
//!
//! ```ignore
//! let scheduler = FrameScheduler::new();
//! let handle = scheduler.handle();
//!
//! let id = handle.request_frame(|time| println!("frame {}", time.frame));
//! handle.cancel_frame(id.unwrap()); // never runs
//! ```

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Handle to a pending frame request
    pub struct FrameRequestId;
}

/// Timing information handed to every callback of a frame
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameTime {
    /// Host timestamp of this frame in milliseconds
    pub now_ms: f64,
    /// Milliseconds since the previous frame (0 on the first frame after idle)
    pub delta_ms: f64,
    /// Monotonic frame counter
    pub frame: u64,
}

impl FrameTime {
    pub fn new(now_ms: f64, delta_ms: f64, frame: u64) -> Self {
        Self {
            now_ms,
            delta_ms,
            frame,
        }
    }

    pub fn delta_secs(&self) -> f32 {
        (self.delta_ms / 1000.0) as f32
    }
}

/// Callback invoked once on the next frame
pub type FrameCallback = Box<dyn FnOnce(FrameTime)>;

struct SchedulerInner {
    requests: SlotMap<FrameRequestId, FrameCallback>,
    /// Request order; slotmap iteration order is not insertion order
    order: Vec<FrameRequestId>,
    last_frame_ms: Option<f64>,
    frame: u64,
}

/// The frame clock that owns all pending frame requests
pub struct FrameScheduler {
    inner: Rc<RefCell<SchedulerInner>>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(SchedulerInner {
                requests: SlotMap::with_key(),
                order: Vec::new(),
                last_frame_ms: None,
                frame: 0,
            })),
        }
    }

    /// Get a handle to this scheduler for passing to subsystems
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Run one frame at host time `now_ms`
    ///
    /// Every callback requested before this call runs exactly once, in request
    /// order. Callbacks requested while the frame runs are queued for the next
    /// frame; callbacks cancelled before their turn never run.
    ///
    /// Returns the number of callbacks invoked.
    pub fn run_frame(&self, now_ms: f64) -> usize {
        let (batch, time) = {
            let mut inner = self.inner.borrow_mut();
            if inner.order.is_empty() {
                // Idle: the next active frame starts with a zero delta
                inner.last_frame_ms = None;
                return 0;
            }
            let delta_ms = inner
                .last_frame_ms
                .map_or(0.0, |last| (now_ms - last).max(0.0));
            inner.last_frame_ms = Some(now_ms);
            inner.frame += 1;
            let time = FrameTime::new(now_ms, delta_ms, inner.frame);
            (std::mem::take(&mut inner.order), time)
        };

        let mut ran = 0;
        for id in batch {
            let callback = self.inner.borrow_mut().requests.remove(id);
            if let Some(callback) = callback {
                callback(time);
                ran += 1;
            }
        }

        tracing::trace!(frame = time.frame, ran, "frame complete");
        ran
    }

    /// Number of requests waiting for the next frame
    pub fn pending_count(&self) -> usize {
        self.inner.borrow().requests.len()
    }

    /// Number of frames run so far
    pub fn frame_count(&self) -> u64 {
        self.inner.borrow().frame
    }
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// A weak handle to the frame scheduler
///
/// Passed to subsystems that need frames. It won't keep the scheduler alive;
/// once the scheduler is dropped every operation is a no-op.
#[derive(Clone)]
pub struct SchedulerHandle {
    inner: Weak<RefCell<SchedulerInner>>,
}

impl SchedulerHandle {
    /// Request `callback` to run on the next frame
    pub fn request_frame<F>(&self, callback: F) -> Option<FrameRequestId>
    where
        F: FnOnce(FrameTime) + 'static,
    {
        self.inner.upgrade().map(|inner| {
            let mut guard = inner.borrow_mut();
            let id = guard.requests.insert(Box::new(callback));
            guard.order.push(id);
            id
        })
    }

    /// Cancel a pending request
    ///
    /// Returns `false` if the request already ran or was already cancelled.
    pub fn cancel_frame(&self, id: FrameRequestId) -> bool {
        self.inner
            .upgrade()
            .map(|inner| inner.borrow_mut().requests.remove(id).is_some())
            .unwrap_or(false)
    }

    /// Check whether a request is still waiting to run
    pub fn is_pending(&self, id: FrameRequestId) -> bool {
        self.inner
            .upgrade()
            .map(|inner| inner.borrow().requests.contains_key(id))
            .unwrap_or(false)
    }

    /// Check if the scheduler is still alive
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}

/// A callback that re-requests itself every frame until stopped
///
/// Stopping cancels the pending request, so the callback never runs again
/// after [`FrameLoop::stop`] returns. Dropping the loop stops it.
pub struct FrameLoop {
    handle: SchedulerHandle,
    pending: Rc<Cell<Option<FrameRequestId>>>,
    running: Rc<Cell<bool>>,
}

impl FrameLoop {
    /// Run `callback` on every frame from the next one on
    pub fn start<F>(handle: &SchedulerHandle, callback: F) -> Self
    where
        F: FnMut(FrameTime) + 'static,
    {
        let pending = Rc::new(Cell::new(None));
        let running = Rc::new(Cell::new(true));
        schedule_loop(
            handle.clone(),
            Rc::new(RefCell::new(callback)),
            pending.clone(),
            running.clone(),
        );
        Self {
            handle: handle.clone(),
            pending,
            running,
        }
    }

    /// Stop the loop and cancel its pending frame
    ///
    /// Returns false if the loop was already stopped.
    pub fn stop(&self) -> bool {
        if !self.running.replace(false) {
            return false;
        }
        if let Some(id) = self.pending.take() {
            self.handle.cancel_frame(id);
        }
        true
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

fn schedule_loop<F>(
    handle: SchedulerHandle,
    callback: Rc<RefCell<F>>,
    pending: Rc<Cell<Option<FrameRequestId>>>,
    running: Rc<Cell<bool>>,
) where
    F: FnMut(FrameTime) + 'static,
{
    let next = handle.clone();
    let slot = pending.clone();
    let id = handle.request_frame(move |time| {
        slot.set(None);
        if !running.get() {
            return;
        }
        (*callback.borrow_mut())(time);
        if running.get() {
            schedule_loop(next, callback, slot, running);
        }
    });
    pending.set(id);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_test_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    #[test]
    fn test_request_runs_once() {
        let scheduler = FrameScheduler::new();
        let handle = scheduler.handle();
        let count = Rc::new(Cell::new(0));

        let c = count.clone();
        handle.request_frame(move |_| c.set(c.get() + 1));

        assert_eq!(scheduler.run_frame(0.0), 1);
        assert_eq!(scheduler.run_frame(16.0), 0);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_cancel_before_frame() {
        let scheduler = FrameScheduler::new();
        let handle = scheduler.handle();
        let ran = Rc::new(Cell::new(false));

        let r = ran.clone();
        let id = handle.request_frame(move |_| r.set(true)).unwrap();
        assert!(handle.is_pending(id));
        assert!(handle.cancel_frame(id));
        assert!(!handle.cancel_frame(id));

        scheduler.run_frame(0.0);
        assert!(!ran.get());
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn test_rerequest_runs_next_frame() {
        init_test_tracing();

        fn schedule(handle: SchedulerHandle, log: Rc<RefCell<Vec<u64>>>) {
            let next = handle.clone();
            handle.request_frame(move |time| {
                log.borrow_mut().push(time.frame);
                schedule(next, log);
            });
        }

        let scheduler = FrameScheduler::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        schedule(scheduler.handle(), log.clone());

        for i in 0..3 {
            assert_eq!(scheduler.run_frame(i as f64 * 16.0), 1);
        }
        assert_eq!(*log.borrow(), vec![1, 2, 3]);
        assert_eq!(scheduler.pending_count(), 1);
    }

    #[test]
    fn test_cancel_from_earlier_callback_in_same_frame() {
        let scheduler = FrameScheduler::new();
        let handle = scheduler.handle();
        let ran = Rc::new(Cell::new(false));

        let victim = Rc::new(Cell::new(None));
        let h = handle.clone();
        let v = victim.clone();
        handle.request_frame(move |_| {
            if let Some(id) = v.get() {
                h.cancel_frame(id);
            }
        });
        let r = ran.clone();
        victim.set(handle.request_frame(move |_| r.set(true)));

        assert_eq!(scheduler.run_frame(0.0), 1);
        assert!(!ran.get());
    }

    #[test]
    fn test_delta_time() {
        let scheduler = FrameScheduler::new();
        let handle = scheduler.handle();
        let deltas = Rc::new(RefCell::new(Vec::new()));

        for now in [100.0, 116.0, 132.5] {
            let d = deltas.clone();
            handle.request_frame(move |time| d.borrow_mut().push(time.delta_ms));
            scheduler.run_frame(now);
        }

        assert_eq!(*deltas.borrow(), vec![0.0, 16.0, 16.5]);
    }

    #[test]
    fn test_idle_frame_resets_delta() {
        let scheduler = FrameScheduler::new();
        let handle = scheduler.handle();
        let delta = Rc::new(Cell::new(-1.0));

        handle.request_frame(|_| {});
        scheduler.run_frame(0.0);
        scheduler.run_frame(16.0); // idle

        let d = delta.clone();
        handle.request_frame(move |time| d.set(time.delta_ms));
        scheduler.run_frame(500.0);
        assert_eq!(delta.get(), 0.0);
    }

    #[test]
    fn test_handle_weak_reference() {
        let handle = {
            let scheduler = FrameScheduler::new();
            scheduler.handle()
        };

        // Scheduler is dropped, handle should not be alive
        assert!(!handle.is_alive());

        // Operations should safely no-op
        assert!(handle.request_frame(|_| {}).is_none());
    }

    #[test]
    fn test_frame_loop_runs_until_stopped() {
        let scheduler = FrameScheduler::new();
        let handle = scheduler.handle();
        let count = Rc::new(Cell::new(0));

        let c = count.clone();
        let frame_loop = FrameLoop::start(&handle, move |_| c.set(c.get() + 1));
        for i in 0..4 {
            scheduler.run_frame(i as f64 * 16.0);
        }
        assert_eq!(count.get(), 4);
        assert_eq!(scheduler.pending_count(), 1);

        assert!(frame_loop.stop());
        assert!(!frame_loop.stop());
        assert_eq!(scheduler.pending_count(), 0);
        scheduler.run_frame(100.0);
        assert_eq!(count.get(), 4);
    }

    #[test]
    fn test_frame_loop_stops_on_drop() {
        let scheduler = FrameScheduler::new();
        let count = Rc::new(Cell::new(0));

        let c = count.clone();
        let frame_loop = FrameLoop::start(&scheduler.handle(), move |_| c.set(c.get() + 1));
        scheduler.run_frame(0.0);
        drop(frame_loop);
        scheduler.run_frame(16.0);
        assert_eq!(count.get(), 1);
        assert_eq!(scheduler.pending_count(), 0);
    }
}

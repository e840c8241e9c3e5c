//! Frame callback registry.
//!
//! Every per-frame continuation (the game loop itself and each projectile in
//! flight) requests a `FrameHandle` for the next frame and must present it to
//! `fire` before doing any work. Firing consumes the handle. `cancel_all`
//! clears the registry, so after game over or victory nothing advances again.

use std::collections::HashSet;

/// Registration of one per-frame continuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

#[derive(Debug, Default)]
pub struct FrameScheduler {
    next_handle: u64,
    pending: HashSet<FrameHandle>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a continuation for the next frame.
    pub fn request(&mut self) -> FrameHandle {
        let handle = FrameHandle(self.next_handle);
        self.next_handle += 1;
        self.pending.insert(handle);
        handle
    }

    /// Consume a registration. Returns `false` if it was cancelled (or already fired),
    /// in which case the continuation must not run.
    pub fn fire(&mut self, handle: FrameHandle) -> bool {
        self.pending.remove(&handle)
    }

    /// Cancel a single registration.
    pub fn cancel(&mut self, handle: FrameHandle) -> bool {
        self.pending.remove(&handle)
    }

    /// Cancel every registered continuation. Returns how many were dropped.
    pub fn cancel_all(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        dropped
    }

    pub fn is_pending(&self, handle: FrameHandle) -> bool {
        self.pending.contains(&handle)
    }

    /// Number of continuations waiting for the next frame.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

use crate::hooks::ExecutionId;

use parking_lot::Mutex;

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::thread::{self, ThreadId};

type Slots = Mutex<HashMap<ThreadId, ExecutionId>>;

thread_local! {
    /// Trackers holding a slot for this thread, cleared when it exits.
    static RELEASE: Release = Release {
        thread: thread::current().id(),
        slots: RefCell::new(Vec::new()),
    };
}

struct Release {
    thread: ThreadId,
    slots: RefCell<Vec<Weak<Slots>>>,
}

impl Release {
    fn watch(&self, slots: &Arc<Slots>) {
        let mut watched = self.slots.borrow_mut();
        watched.retain(|tracker| tracker.strong_count() > 0);
        watched.push(Arc::downgrade(slots));
    }
}

impl Drop for Release {
    fn drop(&mut self) {
        for slots in self.slots.get_mut().drain(..) {
            if let Some(slots) = slots.upgrade() {
                slots.lock().remove(&self.thread);
            }
        }
    }
}

/// Remembers, per OS thread, the execution whose code is running.
///
/// Each thread drives its own cooperative schedule, so each gets its own
/// slot. A slot is written by `on_before`, read by every store lookup and
/// released when its thread exits.
pub(crate) struct Tracker {
    slots: Arc<Slots>,
}

impl Tracker {
    pub(crate) fn new() -> Self {
        Self {
            slots: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Records `id` as current on the calling thread.
    pub(crate) fn track(&self, id: ExecutionId) {
        let first = self
            .slots
            .lock()
            .insert(thread::current().id(), id)
            .is_none();

        if first {
            // Fails only while the thread is being torn down.
            let _ = RELEASE.try_with(|release| release.watch(&self.slots));
        }
    }

    /// The last id tracked on the calling thread, if any.
    pub(crate) fn tracked(&self) -> Option<ExecutionId> {
        self.slots.lock().get(&thread::current().id()).copied()
    }

    /// Number of threads holding a slot.
    pub(crate) fn len(&self) -> usize {
        self.slots.lock().len()
    }
}

//! The lexical scope chain and per-binding lock discipline.
//!
//! A [`SymbolTable`] is a cheap handle to one frame of the chain. Frames
//! hold their parent strongly so closures keep their defining scope alive
//! after the block that created it exits. Each binding lives in a shared
//! [`ValueCell`] carrying the value plus the lock flag and owner id used
//! by the `lock` construct; the root-ward chain also registers the join
//! handles of `parallel` tasks.

use crate::value::Value;
use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError, RwLock};
use std::thread::JoinHandle;
use uuid::Uuid;

fn lock_mutex<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One binding: the stored value plus the lock state used by `lock`.
///
/// The owner id is the uuid of the scope frame that acquired the lock.
/// Writes from frames outside the owner's chain are skipped while the
/// lock is held; `acquire` blocks until the cell is free.
pub struct ValueCell {
    value: RwLock<Value>,
    owner: Mutex<Option<String>>,
    released: Condvar,
}

impl ValueCell {
    fn new(value: Value) -> Self {
        Self {
            value: RwLock::new(value),
            owner: Mutex::new(None),
            released: Condvar::new(),
        }
    }

    /// Clone the stored value.
    pub fn get(&self) -> Value {
        self.value
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns `true` while some frame holds this cell's lock.
    pub fn is_locked(&self) -> bool {
        lock_mutex(&self.owner).is_some()
    }

    /// Store a value, honoring the lock discipline: while locked, only
    /// writers within the owner frame's chain get through. Returns whether
    /// the write happened.
    fn try_set(&self, value: Value, writer: &SymbolTable) -> bool {
        let owner = lock_mutex(&self.owner);
        if let Some(owner_id) = owner.as_deref() {
            if !writer.owns(owner_id) {
                return false;
            }
        }
        *self
            .value
            .write()
            .unwrap_or_else(PoisonError::into_inner) = value;
        true
    }

    /// Block until the cell is free, then take the lock for `owner_id`.
    fn acquire(&self, owner_id: String) {
        let mut owner = lock_mutex(&self.owner);
        while owner.is_some() {
            owner = self
                .released
                .wait(owner)
                .unwrap_or_else(PoisonError::into_inner);
        }
        *owner = Some(owner_id);
    }

    /// Release the lock when held by `owner_id` and wake blocked waiters.
    fn release(&self, owner_id: &str) {
        let mut owner = lock_mutex(&self.owner);
        if owner.as_deref() == Some(owner_id) {
            *owner = None;
            self.released.notify_all();
        }
    }
}

/// Scoped acquisition of a cell's lock; releases on drop so every exit
/// path — normal completion or a propagating signal — unlocks.
pub struct LockGuard {
    cell: Arc<ValueCell>,
    owner_id: String,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        self.cell.release(&self.owner_id);
    }
}

struct Frame {
    id: String,
    parent: Option<SymbolTable>,
    table: RwLock<HashMap<String, Arc<ValueCell>>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

/// A handle to one frame of the scope chain.
#[derive(Clone)]
pub struct SymbolTable {
    frame: Arc<Frame>,
}

impl SymbolTable {
    /// Create a root scope.
    pub fn new() -> Self {
        Self::with_parent(None)
    }

    /// Create a child frame whose lookups fall back to this one.
    pub fn child(&self) -> Self {
        Self::with_parent(Some(self.clone()))
    }

    fn with_parent(parent: Option<SymbolTable>) -> Self {
        Self {
            frame: Arc::new(Frame {
                id: Uuid::new_v4().to_string(),
                parent,
                table: RwLock::new(HashMap::new()),
                tasks: Mutex::new(Vec::new()),
            }),
        }
    }

    /// This frame's identity, used as the lock owner tag.
    pub fn id(&self) -> &str {
        &self.frame.id
    }

    /// Returns `true` when `frame_id` names this frame or an ancestor.
    pub(crate) fn owns(&self, frame_id: &str) -> bool {
        let mut current = Some(self.clone());
        while let Some(scope) = current {
            if scope.frame.id == frame_id {
                return true;
            }
            current = scope.frame.parent.clone();
        }
        false
    }

    fn local_cell(&self, name: &str) -> Option<Arc<ValueCell>> {
        self.frame
            .table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// The nearest cell bound to `name`, current frame first.
    pub(crate) fn find_cell(&self, name: &str) -> Option<Arc<ValueCell>> {
        let mut current = Some(self.clone());
        while let Some(scope) = current {
            if let Some(cell) = scope.local_cell(name) {
                return Some(cell);
            }
            current = scope.frame.parent.clone();
        }
        None
    }

    /// Look up a value; the current frame shadows ancestors.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.find_cell(name).map(|cell| cell.get())
    }

    /// Returns `true` if `name` is bound anywhere in the chain.
    pub fn has(&self, name: &str) -> bool {
        self.find_cell(name).is_some()
    }

    /// Bind `name` in this frame, shadowing any ancestor binding. An
    /// existing local cell keeps its identity (and therefore its lock
    /// state); a locked cell silently refuses the write.
    pub fn declare(&self, name: &str, value: Value) {
        if let Some(cell) = self.local_cell(name) {
            cell.try_set(value, self);
            return;
        }
        self.frame
            .table
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), Arc::new(ValueCell::new(value)));
    }

    /// Update the nearest existing binding, or bind locally when the name
    /// is unbound anywhere. Writes to a cell locked outside this frame's
    /// chain are skipped.
    pub fn assign(&self, name: &str, value: Value) {
        match self.find_cell(name) {
            Some(cell) => {
                cell.try_set(value, self);
            }
            None => self.declare(name, value),
        }
    }

    /// Remove the nearest binding of `name`. Locked bindings survive.
    pub fn remove(&self, name: &str) {
        let mut current = Some(self.clone());
        while let Some(scope) = current {
            let has_local = scope.local_cell(name).is_some();
            if has_local {
                let mut table = scope
                    .frame
                    .table
                    .write()
                    .unwrap_or_else(PoisonError::into_inner);
                let locked = table.get(name).map(|cell| cell.is_locked());
                if locked == Some(false) {
                    table.remove(name);
                }
                return;
            }
            current = scope.frame.parent.clone();
        }
    }

    /// Acquire the lock of the value bound to `name`, blocking while
    /// another frame holds it. Returns `None` when the name is unbound —
    /// locking an unknown name is a no-op, as in `lock`'s contract.
    pub fn lock_acquire(&self, name: &str) -> Option<LockGuard> {
        let cell = self.find_cell(name)?;
        let owner_id = self.frame.id.clone();
        cell.acquire(owner_id.clone());
        Some(LockGuard { cell, owner_id })
    }

    // ── Task registry ─────────────────────────────────────────────────────

    /// The root of this chain; it owns the task registry.
    fn root(&self) -> SymbolTable {
        let mut current = self.clone();
        while let Some(parent) = current.frame.parent.clone() {
            current = parent;
        }
        current
    }

    /// Register a `parallel` task. Handles land on the root frame so any
    /// scope in the chain can drain them.
    pub fn add_task(&self, handle: JoinHandle<()>) {
        lock_mutex(&self.root().frame.tasks).push(handle);
    }

    /// Block until every registered task completes, including tasks that
    /// were registered while draining.
    pub fn wait_for_tasks(&self) {
        let root = self.root();
        loop {
            let drained: Vec<JoinHandle<()>> =
                std::mem::take(&mut *lock_mutex(&root.frame.tasks));
            if drained.is_empty() {
                break;
            }
            for handle in drained {
                let _ = handle.join();
            }
        }
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SymbolTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymbolTable")
            .field("id", &self.frame.id)
            .field("has_parent", &self.frame.parent.is_some())
            .finish()
    }
}

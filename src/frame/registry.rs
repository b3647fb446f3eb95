use std::cell::RefCell;

/// Boxed single-threaded listener for events of type `E`.
pub(crate) type Listener<E> = Box<dyn FnMut(&E)>;

struct Entry<T> {
    id: u64,
    item: Option<T>,
    removed: bool,
}

/// Ordered id-keyed slots whose items can be moved out while they run.
///
/// Ids grow monotonically, so the slot vector stays sorted and iteration follows registration
/// order. An item that is taken and then removed is handed back by [`Registry::restore`] so the
/// caller can drop it outside any borrow.
pub(crate) struct Registry<T> {
    entries: Vec<Entry<T>>,
    next_id: u64,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
        }
    }
}

impl<T> Registry<T> {
    pub(crate) fn insert(&mut self, item: T) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            item: Some(item),
            removed: false,
        });
        id
    }

    fn position(&self, id: u64) -> Option<usize> {
        self.entries.binary_search_by_key(&id, |e| e.id).ok()
    }

    /// Snapshot of live ids in registration order.
    pub(crate) fn ids(&self) -> Vec<u64> {
        self.entries
            .iter()
            .filter(|e| !e.removed)
            .map(|e| e.id)
            .collect()
    }

    pub(crate) fn contains(&self, id: u64) -> bool {
        self.position(id)
            .is_some_and(|idx| !self.entries[idx].removed)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.iter().filter(|e| !e.removed).count()
    }

    /// Move the item out of its slot. `None` when removed or already taken.
    pub(crate) fn take(&mut self, id: u64) -> Option<T> {
        let idx = self.position(id)?;
        let entry = &mut self.entries[idx];
        if entry.removed {
            return None;
        }
        entry.item.take()
    }

    /// Put a taken item back. Returns it when its slot was removed meanwhile.
    #[must_use]
    pub(crate) fn restore(&mut self, id: u64, item: T) -> Option<T> {
        let Some(idx) = self.position(id) else {
            return Some(item);
        };
        if self.entries[idx].removed {
            self.entries.remove(idx);
            return Some(item);
        }
        self.entries[idx].item = Some(item);
        None
    }

    /// Remove a slot. A slot whose item is currently taken is dropped on restore.
    #[must_use]
    pub(crate) fn remove(&mut self, id: u64) -> Option<T> {
        let idx = self.position(id)?;
        if self.entries[idx].removed {
            return None;
        }
        match self.entries[idx].item.take() {
            Some(item) => {
                self.entries.remove(idx);
                Some(item)
            }
            None => {
                self.entries[idx].removed = true;
                None
            }
        }
    }

    /// Remove every slot, returning the items that were not taken.
    #[must_use]
    pub(crate) fn clear(&mut self) -> Vec<T> {
        let mut out = Vec::new();
        self.entries.retain_mut(|e| match e.item.take() {
            Some(item) => {
                out.push(item);
                false
            }
            None => {
                e.removed = true;
                true
            }
        });
        out
    }
}

/// Invoke every listener live at call time, in registration order.
///
/// Stops early once `halted` reports true. No borrow of `registry` is held while a listener runs.
pub(crate) fn dispatch<E>(
    registry: &RefCell<Registry<Listener<E>>>,
    event: &E,
    halted: impl Fn() -> bool,
) {
    let ids = registry.borrow().ids();
    for id in ids {
        if halted() {
            break;
        }
        let Some(mut listener) = registry.borrow_mut().take(id) else {
            continue;
        };
        listener(event);
        let orphan = registry.borrow_mut().restore(id, listener);
        drop(orphan);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/frame/registry.rs"]
mod tests;

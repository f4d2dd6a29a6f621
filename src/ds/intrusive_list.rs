//! Circular intrusive lists over one index-addressed node store.
//!
//! A [`ListArena`] owns every node of one engine and can host any number of
//! circular doubly linked lists inside the same slot vector. Each list is
//! anchored by a sentinel slot (a [`ListId`]) that carries no payload, is never
//! counted in [`len`](ListArena::len), and links to itself when the list is
//! empty. Links are [`SlotId`]s, so nodes can move between lists in O(1)
//! without reference cycles or raw pointers.
//!
//! ## Architecture
//!
//! ```text
//!   slots (Vec<Slot<T>>)                      free_head ─► 3 ─► None
//!   ┌────────┬───────────────────────────────────────────────┐
//!   │ SlotId │ Slot                                          │
//!   ├────────┼───────────────────────────────────────────────┤
//!   │ 0 (s)  │ Linked { prev: 2, next: 1, item: None }  ◄─ sentinel
//!   │ 1      │ Linked { prev: 0, next: 2, item: Some(A) }    │
//!   │ 2      │ Linked { prev: 1, next: 0, item: Some(B) }    │
//!   │ 3      │ Vacant { next_free: None }                    │
//!   └────────┴───────────────────────────────────────────────┘
//!
//!        ┌──────────────────────────────────────┐
//!        ▼                                      │
//!      [ s ] ──► [1: A] ──► [2: B] ─────────────┘
//!     front side (most recent)     back side (eviction candidate)
//! ```
//!
//! Vacant slots form a chain threaded through the vector itself; the most
//! recently freed slot is handed out first.
//!
//! ## Operations
//! - `new_list()`: allocate a self-linked sentinel
//! - `push_front(list, item)`: allocate + link after the sentinel
//! - `unlink(id)` / `link_front(list, id)`: move a node between lists
//! - `back(list)`: `sentinel.prev`, the next eviction candidate
//! - `remove(id)`: unlink + free the slot
//!
//! All operations except iteration and [`check_list`](ListArena::check_list)
//! are O(1).

use std::mem;

use crate::error::InvariantError;

/// Handle to one slot of a [`ListArena`].
///
/// Handles are reused after [`ListArena::remove`]; holding one past removal
/// and using it later addresses whatever node took the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(pub(crate) usize);

impl SlotId {
    /// Position of the slot in the backing vector.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Handle to a list (its sentinel slot) inside a [`ListArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListId(SlotId);

impl ListId {
    /// Returns the sentinel's slot handle.
    pub fn sentinel(self) -> SlotId {
        self.0
    }
}

#[derive(Debug)]
struct Link<T> {
    prev: SlotId,
    next: SlotId,
    item: Option<T>,
}

impl<T> Link<T> {
    fn detached(id: SlotId, item: Option<T>) -> Self {
        Self {
            prev: id,
            next: id,
            item,
        }
    }
}

#[derive(Debug)]
enum Slot<T> {
    Vacant { next_free: Option<usize> },
    Linked(Link<T>),
}

fn linked<T>(slots: &[Slot<T>], id: SlotId) -> Option<&Link<T>> {
    match slots.get(id.0)? {
        Slot::Linked(link) => Some(link),
        Slot::Vacant { .. } => None,
    }
}

/// Arena of nodes linked into sentinel-anchored circular lists.
#[derive(Debug)]
pub struct ListArena<T> {
    slots: Vec<Slot<T>>,
    free_head: Option<usize>,
    items: usize,
}

impl<T> ListArena<T> {
    /// Creates an arena with no lists.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an arena with room for `capacity` slots (sentinels included).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_head: None,
            items: 0,
        }
    }

    /// Number of data nodes across all lists (sentinels excluded).
    pub fn len(&self) -> usize {
        self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items == 0
    }

    fn link(&self, id: SlotId) -> Option<&Link<T>> {
        linked(&self.slots, id)
    }

    fn link_mut(&mut self, id: SlotId) -> Option<&mut Link<T>> {
        match self.slots.get_mut(id.0)? {
            Slot::Linked(link) => Some(link),
            Slot::Vacant { .. } => None,
        }
    }

    /// Takes a slot off the free chain (or grows the vector) and stores a
    /// self-linked node in it.
    fn alloc(&mut self, item: Option<T>) -> SlotId {
        if let Some(idx) = self.free_head
            && let Some(slot) = self.slots.get_mut(idx)
            && let Slot::Vacant { next_free } = *slot
        {
            self.free_head = next_free;
            *slot = Slot::Linked(Link::detached(SlotId(idx), item));
            return SlotId(idx);
        }
        let id = SlotId(self.slots.len());
        self.slots.push(Slot::Linked(Link::detached(id, item)));
        id
    }

    /// Returns a slot to the head of the free chain.
    fn release(&mut self, id: SlotId) -> Option<Link<T>> {
        let slot = self.slots.get_mut(id.0)?;
        if let Slot::Vacant { .. } = slot {
            return None;
        }
        let taken = mem::replace(
            slot,
            Slot::Vacant {
                next_free: self.free_head,
            },
        );
        self.free_head = Some(id.0);
        match taken {
            Slot::Linked(link) => Some(link),
            Slot::Vacant { .. } => None,
        }
    }

    /// Allocates a new empty list and returns its handle.
    pub fn new_list(&mut self) -> ListId {
        ListId(self.alloc(None))
    }

    /// Returns `true` if `list` holds no data nodes.
    pub fn is_list_empty(&self, list: ListId) -> bool {
        self.front(list).is_none()
    }

    /// Returns `true` if `list` holds exactly one data node.
    pub fn is_singleton(&self, list: ListId) -> bool {
        match self.link(list.0) {
            Some(s) => s.next != list.0 && s.next == s.prev,
            None => false,
        }
    }

    /// Returns the node nearest the sentinel on the front side.
    pub fn front(&self, list: ListId) -> Option<SlotId> {
        let next = self.link(list.0)?.next;
        (next != list.0).then_some(next)
    }

    /// Returns the node nearest the sentinel on the back side (`sentinel.prev`).
    pub fn back(&self, list: ListId) -> Option<SlotId> {
        let prev = self.link(list.0)?.prev;
        (prev != list.0).then_some(prev)
    }

    /// Allocates `item` and links it at the front of `list`.
    pub fn push_front(&mut self, list: ListId, item: T) -> SlotId {
        let id = self.alloc(Some(item));
        self.items += 1;
        self.link_front(list, id);
        id
    }

    /// Detaches a data node from whatever list holds it.
    ///
    /// The node keeps its slot and payload and links to itself until it is
    /// relinked with [`link_front`](Self::link_front) or freed with
    /// [`remove`](Self::remove). Returns `false` for sentinels and vacant ids.
    pub fn unlink(&mut self, id: SlotId) -> bool {
        let (prev, next) = match self.link(id) {
            Some(link) if link.item.is_some() => (link.prev, link.next),
            _ => return false,
        };
        if prev == id {
            return true;
        }
        if let Some(p) = self.link_mut(prev) {
            p.next = next;
        }
        if let Some(n) = self.link_mut(next) {
            n.prev = prev;
        }
        if let Some(link) = self.link_mut(id) {
            link.prev = id;
            link.next = id;
        }
        true
    }

    /// Links a detached data node right after the sentinel of `list`.
    ///
    /// Returns `false` (and does nothing) if `id` is not a detached data node
    /// or `list` is not a live sentinel.
    pub fn link_front(&mut self, list: ListId, id: SlotId) -> bool {
        match self.link(id) {
            Some(link) if link.item.is_some() && link.prev == id => {},
            _ => return false,
        }
        let head = match self.link(list.0) {
            Some(s) if s.item.is_none() => s.next,
            _ => return false,
        };
        if let Some(link) = self.link_mut(id) {
            link.prev = list.0;
            link.next = head;
        }
        if let Some(h) = self.link_mut(head) {
            h.prev = id;
        }
        if let Some(s) = self.link_mut(list.0) {
            s.next = id;
        }
        true
    }

    /// Moves a linked node to the front of `list` (its own list or another).
    pub fn move_to_front(&mut self, list: ListId, id: SlotId) -> bool {
        self.unlink(id) && self.link_front(list, id)
    }

    /// Unlinks and frees a data node, returning its payload.
    pub fn remove(&mut self, id: SlotId) -> Option<T> {
        if !self.unlink(id) {
            return None;
        }
        let link = self.release(id)?;
        self.items -= 1;
        link.item
    }

    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.link(id)?.item.as_ref()
    }

    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        self.link_mut(id)?.item.as_mut()
    }

    /// Iterates `(SlotId, &T)` of `list` from front to back.
    ///
    /// The iterator is double-ended; `.rev()` walks back to front.
    pub fn iter(&self, list: ListId) -> ListIter<'_, T> {
        let (front, back) = match self.link(list.0) {
            Some(s) => (s.next, s.prev),
            None => (list.0, list.0),
        };
        ListIter {
            slots: &self.slots,
            front,
            back,
            finished: front == list.0,
        }
    }

    /// Frees every node and sentinel; all `ListId`s become invalid.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_head = None;
        self.items = 0;
    }

    /// Walks `list` and verifies sentinel closure and link symmetry.
    ///
    /// Returns the number of data nodes in the list.
    pub fn check_list(&self, list: ListId) -> Result<usize, InvariantError> {
        let sentinel = self
            .link(list.0)
            .ok_or_else(|| InvariantError::new("list sentinel is vacant"))?;
        if sentinel.item.is_some() {
            return Err(InvariantError::new("list handle points at a data node"));
        }

        let mut count = 0usize;
        let mut prev = list.0;
        let mut current = sentinel.next;
        while current != list.0 {
            let link = self
                .link(current)
                .ok_or_else(|| InvariantError::new("list links to a vacant slot"))?;
            if link.item.is_none() {
                return Err(InvariantError::new("list links into a foreign sentinel"));
            }
            if link.prev != prev {
                return Err(InvariantError::new(format!(
                    "node {} has prev {} but was reached from {}",
                    current.index(),
                    link.prev.index(),
                    prev.index()
                )));
            }
            count += 1;
            if count > self.items {
                return Err(InvariantError::new("cycle without sentinel detected"));
            }
            prev = current;
            current = link.next;
        }
        if sentinel.prev != prev {
            return Err(InvariantError::new("sentinel prev does not close the ring"));
        }
        Ok(count)
    }
}

impl<T> Default for ListArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Double-ended iterator over one list of a [`ListArena`].
pub struct ListIter<'a, T> {
    slots: &'a [Slot<T>],
    front: SlotId,
    back: SlotId,
    finished: bool,
}

impl<'a, T> Iterator for ListIter<'a, T> {
    type Item = (SlotId, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let id = self.front;
        let link = linked(self.slots, id)?;
        if id == self.back {
            self.finished = true;
        } else {
            self.front = link.next;
        }
        link.item.as_ref().map(|item| (id, item))
    }
}

impl<T> DoubleEndedIterator for ListIter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let id = self.back;
        let link = linked(self.slots, id)?;
        if id == self.front {
            self.finished = true;
        } else {
            self.back = link.prev;
        }
        link.item.as_ref().map(|item| (id, item))
    }
}

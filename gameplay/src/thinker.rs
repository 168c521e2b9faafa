use std::fmt::{self, Debug};

use log::debug;

use crate::level::Level;
use crate::thing::MapObject;
use crate::xg::PlaneMover;

/// Handle to a slot in the `ThinkerAlloc`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ThinkerId(usize);

impl ThinkerId {
    pub const fn index(self) -> usize {
        self.0
    }
}

/// A custom allocation for `Thinker` objects. Slots live in one contiguous
/// `Vec` and are linked in a ring in the order they were added, which is the
/// order they run in.
pub struct ThinkerAlloc {
    slots: Vec<Thinker>,
    /// Actual used slots
    len: usize,
    /// The next free slot to insert in
    next_free: usize,
    head: Option<usize>,
}

impl ThinkerAlloc {
    pub fn new(capacity: usize) -> Self {
        let slots = (0..capacity)
            .map(|_| Thinker {
                prev: 0,
                next: 0,
                data: ThinkerData::Free,
            })
            .collect();

        Self {
            slots,
            len: 0,
            next_free: 0,
            head: None,
        }
    }

    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn find_first_free(&mut self) -> Option<usize> {
        if self.len >= self.slots.len() {
            return None;
        }
        let capacity = self.slots.len();
        for n in 0..capacity {
            let idx = (self.next_free + n) % capacity;
            if matches!(self.slots[idx].data, ThinkerData::Free) {
                return Some(idx);
            }
        }
        None
    }

    /// Push a thinker on to the end of the run order.
    ///
    /// Running out of slots is unrecoverable and panics.
    pub fn push(&mut self, data: ThinkerData) -> ThinkerId {
        if matches!(data, ThinkerData::Free | ThinkerData::Remove) {
            panic!("Can't push a thinker without an object");
        }
        let Some(idx) = self.find_first_free() else {
            panic!("No more thinker slots");
        };
        debug!("Adding Thinker of type {:?} at {}", data, idx);

        match self.head {
            None => {
                self.head = Some(idx);
                self.slots[idx].prev = idx;
                self.slots[idx].next = idx;
            }
            Some(head) => {
                let tail = self.slots[head].prev;
                self.slots[tail].next = idx;
                self.slots[idx].prev = tail;
                self.slots[idx].next = head;
                self.slots[head].prev = idx;
            }
        }
        self.slots[idx].data = data;
        self.len += 1;
        self.next_free = (idx + 1) % self.slots.len();
        ThinkerId(idx)
    }

    /// Unlink the slot and mark it free for re-use
    pub fn remove(&mut self, id: ThinkerId) {
        let idx = id.0;
        if matches!(self.slots[idx].data, ThinkerData::Free) {
            return;
        }
        debug!("Removing Thinker: {:?}", self.slots[idx]);
        let (prev, next) = (self.slots[idx].prev, self.slots[idx].next);
        self.slots[next].prev = prev;
        self.slots[prev].next = next;
        if self.head == Some(idx) {
            self.head = if next == idx { None } else { Some(next) };
        }

        self.len -= 1;
        self.next_free = idx;
        if self.len == 0 {
            self.head = None;
        }
        self.slots[idx].data = ThinkerData::Free;
    }

    /// Flag for removal. The slot is freed the next time thinkers run.
    pub fn mark_remove(&mut self, id: ThinkerId) {
        if let Some(thinker) = self.slots.get_mut(id.0) {
            if !matches!(thinker.data, ThinkerData::Free) {
                thinker.data = ThinkerData::Remove;
            }
        }
    }

    pub fn get(&self, id: ThinkerId) -> Option<&ThinkerData> {
        self.slots
            .get(id.0)
            .map(|t| &t.data)
            .filter(|d| d.is_live())
    }

    pub fn get_mut(&mut self, id: ThinkerId) -> Option<&mut ThinkerData> {
        self.slots
            .get_mut(id.0)
            .map(|t| &mut t.data)
            .filter(|d| d.is_live())
    }

    pub fn mobj(&self, id: ThinkerId) -> Option<&MapObject> {
        match self.get(id) {
            Some(ThinkerData::MapObject(mobj)) => Some(mobj),
            _ => None,
        }
    }

    pub fn mobj_mut(&mut self, id: ThinkerId) -> Option<&mut MapObject> {
        match self.get_mut(id) {
            Some(ThinkerData::MapObject(mobj)) => Some(mobj),
            _ => None,
        }
    }

    /// All linked slots in run order, including those marked for removal
    pub fn ids(&self) -> Vec<ThinkerId> {
        let mut ids = Vec::with_capacity(self.len);
        let Some(head) = self.head else {
            return ids;
        };
        let mut current = head;
        loop {
            ids.push(ThinkerId(current));
            current = self.slots[current].next;
            if current == head {
                break;
            }
        }
        ids
    }

    /// Live thinkers in run order
    pub fn iter(&self) -> impl Iterator<Item = (ThinkerId, &ThinkerData)> + '_ {
        self.ids()
            .into_iter()
            .filter_map(move |id| self.get(id).map(|data| (id, data)))
    }

    /// Take the object out of its slot to run it. The slot reads as `Remove`
    /// until `restore` puts it back.
    pub(crate) fn take(&mut self, id: ThinkerId) -> Option<ThinkerData> {
        let slot = self.slots.get_mut(id.0)?;
        if !slot.data.is_live() {
            return None;
        }
        Some(std::mem::replace(&mut slot.data, ThinkerData::Remove))
    }

    pub(crate) fn restore(&mut self, id: ThinkerId, data: ThinkerData) {
        if let Some(slot) = self.slots.get_mut(id.0) {
            slot.data = data;
        }
    }

    pub(crate) fn should_remove(&self, id: ThinkerId) -> bool {
        matches!(self.slots[id.0].data, ThinkerData::Remove)
    }
}

/// Slots are never moved once allocated, so a `ThinkerId` stays valid until
/// its object is removed. Links are slot indexes, in the order thinkers were
/// added.
pub struct Thinker {
    prev: usize,
    next: usize,
    data: ThinkerData,
}

impl fmt::Debug for Thinker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Thinker")
            .field("prev", &self.prev)
            .field("next", &self.next)
            .field("data", &self.data)
            .finish()
    }
}

/// Every thinking object implements this. Returning false removes the
/// thinker after the call.
pub trait Think {
    fn think(&mut self, id: ThinkerId, level: &mut Level) -> bool;
}

/// All thinker objects need to be registered here.
#[allow(clippy::large_enum_variant)]
pub enum ThinkerData {
    MapObject(MapObject),
    PlaneMover(PlaneMover),
    /// The thinker function should set to this when the linked-list node
    /// and memory is no-longer required. On thinker run it will be set to
    /// `Free` and unlinked.
    Remove,
    /// Used to mark a `ThinkerAlloc` slot as free to be re-used.
    Free,
}

impl ThinkerData {
    pub fn is_live(&self) -> bool {
        !matches!(self, ThinkerData::Remove | ThinkerData::Free)
    }

    pub fn mobj(&self) -> Option<&MapObject> {
        match self {
            ThinkerData::MapObject(mobj) => Some(mobj),
            _ => None,
        }
    }

    pub fn plane_mover(&self) -> Option<&PlaneMover> {
        match self {
            ThinkerData::PlaneMover(mover) => Some(mover),
            _ => None,
        }
    }

    pub fn think(&mut self, id: ThinkerId, level: &mut Level) -> bool {
        match self {
            ThinkerData::MapObject(mobj) => mobj.think(id, level),
            ThinkerData::PlaneMover(mover) => mover.think(id, level),
            ThinkerData::Remove | ThinkerData::Free => false,
        }
    }
}

impl Debug for ThinkerData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MapObject(_) => f.debug_tuple("Mobj").finish(),
            Self::PlaneMover(m) => f
                .debug_tuple("PlaneMover")
                .field(&m.sector)
                .field(&m.plane)
                .finish(),
            Self::Remove => f.debug_tuple("Remove").finish(),
            Self::Free => f.debug_tuple("Free").finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::{ThinkerAlloc, ThinkerData};
    use crate::thing::MapObject;

    fn mobj(kind: u16) -> ThinkerData {
        ThinkerData::MapObject(MapObject::new(kind, Vec2::ZERO, 0.0, 0))
    }

    fn kinds(links: &ThinkerAlloc) -> Vec<u16> {
        links
            .iter()
            .filter_map(|(_, d)| d.mobj().map(|m| m.kind))
            .collect()
    }

    #[test]
    fn allocate() {
        let links = ThinkerAlloc::new(64);
        assert_eq!(links.len(), 0);
        assert_eq!(links.capacity(), 64);
        assert!(links.is_empty());
    }

    #[test]
    fn push_keeps_order() {
        let mut links = ThinkerAlloc::new(64);
        for k in 1..=4 {
            links.push(mobj(k));
        }
        assert_eq!(links.len(), 4);
        assert_eq!(kinds(&links), vec![1, 2, 3, 4]);
    }

    #[test]
    fn remove_and_reuse() {
        let mut links = ThinkerAlloc::new(64);
        let ids: Vec<_> = (1..=4).map(|k| links.push(mobj(k))).collect();

        links.remove(ids[1]);
        assert_eq!(links.len(), 3);
        assert_eq!(kinds(&links), vec![1, 3, 4]);
        assert!(links.get(ids[1]).is_none());

        // Freed slot is used again but goes to the end of the run order
        let id = links.push(mobj(5));
        assert_eq!(id, ids[1]);
        assert_eq!(kinds(&links), vec![1, 3, 4, 5]);

        links.remove(ids[0]);
        assert_eq!(kinds(&links), vec![3, 4, 5]);
    }

    #[test]
    fn remove_all() {
        let mut links = ThinkerAlloc::new(8);
        let ids: Vec<_> = (1..=3).map(|k| links.push(mobj(k))).collect();
        for id in ids {
            links.remove(id);
        }
        assert!(links.is_empty());
        assert!(links.ids().is_empty());
        links.push(mobj(9));
        assert_eq!(kinds(&links), vec![9]);
    }

    #[test]
    fn marked_is_skipped_by_iter() {
        let mut links = ThinkerAlloc::new(8);
        let a = links.push(mobj(1));
        links.push(mobj(2));
        links.mark_remove(a);
        assert!(links.should_remove(a));
        assert!(!links.iter().any(|(_, d)| d.mobj().is_some_and(|m| m.kind == 1)));
        assert_eq!(links.ids().len(), 2);
    }

    #[test]
    fn take_and_restore() {
        let mut links = ThinkerAlloc::new(8);
        let a = links.push(mobj(7));
        let data = links.take(a).unwrap();
        assert!(links.get(a).is_none());
        links.restore(a, data);
        assert_eq!(links.mobj(a).unwrap().kind, 7);
    }

    #[test]
    #[should_panic(expected = "No more thinker slots")]
    fn full_pool_panics() {
        let mut links = ThinkerAlloc::new(2);
        links.push(mobj(1));
        links.push(mobj(2));
        links.push(mobj(3));
    }
}

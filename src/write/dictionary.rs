//! Open-addressing, group-probed hash table backing the column-chunk dictionary encoder.
//!
//! Slots are arranged in groups (8 per group for 32-bit keys, 4 for 64-bit, mirroring how
//! wide a cache line comfortably holds); probing walks groups in hash order and, within a
//! group, compares every occupied slot by byte equality — the scalar baseline the bit-codec
//! primitives elsewhere in this crate also default to, SIMD group-probing being an optional
//! fast path rather than a requirement.
use crate::bloom_filter::hash_bytes;

/// Fixed-width dictionary keys use their raw bit pattern (so integers of equal value always
/// collide to the same slot); byte-array keys are first hashed with the same `xxh64` the
/// bloom filter uses, keeping this crate to one hash function for both structures.
pub trait DictionaryKey: Copy + Eq {
    fn group_hash(&self) -> u64;
}

macro_rules! fixed_width_key {
    ($ty:ty) => {
        impl DictionaryKey for $ty {
            fn group_hash(&self) -> u64 {
                hash_bytes(&self.to_le_bytes())
            }
        }
    };
}

fixed_width_key!(i32);
fixed_width_key!(i64);
fixed_width_key!(u32);
fixed_width_key!(u64);

/// A byte-array dictionary key, hashed via `xxh64` rather than compared by bit pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HashedBytes<'a>(pub &'a [u8]);

impl<'a> DictionaryKey for HashedBytes<'a> {
    fn group_hash(&self) -> u64 {
        hash_bytes(self.0)
    }
}

/// Slots per probe group. 32/64-bit keys share the 8-wide group; the 2-wide, 128-bit-key
/// group from the design is not instantiated here because none of this crate's physical
/// types need a 128-bit key, but the constant is kept for documentation parity with the
/// design this table is grounded on.
const GROUP_SIZE: usize = 8;
#[allow(dead_code)]
const GROUP_SIZE_128_BIT: usize = 2;

const MAX_LOAD_FACTOR_NUM: usize = 7;
const MAX_LOAD_FACTOR_DEN: usize = 8; // 0.875

#[derive(Clone, Copy)]
enum Slot<K> {
    Empty,
    Full(K, u32),
}

/// Maps dictionary keys to small integer indices into a column's dictionary value array.
/// `insert` returns the existing index for a key already seen, or allocates (and returns) a
/// new one; `get` is a read-only probe.
pub struct DictionaryTable<K> {
    slots: Vec<Slot<K>>,
    capacity_mask: u64,
    len: usize,
}

impl<K: DictionaryKey> DictionaryTable<K> {
    pub fn new() -> Self {
        Self::with_capacity(GROUP_SIZE)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.next_power_of_two().max(GROUP_SIZE);
        Self {
            slots: vec![Slot::Empty; capacity],
            capacity_mask: (capacity - 1) as u64,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn group_start(&self, hash: u64) -> usize {
        // Groups are GROUP_SIZE-aligned runs of slots; starting each probe at a group
        // boundary is what lets a real implementation compare a whole group at once.
        (hash & self.capacity_mask) as usize & !(GROUP_SIZE - 1)
    }

    /// Looks up `key`, returning its index if present.
    pub fn get(&self, key: &K) -> Option<u32> {
        let hash = key.group_hash();
        let num_groups = self.slots.len() / GROUP_SIZE;
        for probe in 0..num_groups {
            let start = (self.group_start(hash) + probe * GROUP_SIZE) % self.slots.len();
            let mut saw_empty = false;
            for slot in &self.slots[start..start + GROUP_SIZE] {
                match slot {
                    Slot::Full(k, idx) if k == key => return Some(*idx),
                    Slot::Empty => saw_empty = true,
                    _ => {}
                }
            }
            // An empty slot terminates the probe sequence for `key`: it was never inserted
            // past this point (insert always fills the first empty slot it finds).
            if saw_empty {
                return None;
            }
        }
        None
    }

    /// Returns the existing index for `key`, or inserts it with a fresh index (the next
    /// value after the highest one assigned so far) and returns that.
    pub fn insert(&mut self, key: K) -> u32 {
        if (self.len + 1) * MAX_LOAD_FACTOR_DEN > self.slots.len() * MAX_LOAD_FACTOR_NUM {
            self.rehash(self.slots.len() * 2);
        }
        let hash = key.group_hash();
        let num_groups = self.slots.len() / GROUP_SIZE;
        for probe in 0..num_groups {
            let start = (self.group_start(hash) + probe * GROUP_SIZE) % self.slots.len();
            for i in start..start + GROUP_SIZE {
                match self.slots[i] {
                    Slot::Full(k, idx) if k == key => return idx,
                    Slot::Empty => {
                        let idx = self.len as u32;
                        self.slots[i] = Slot::Full(key, idx);
                        self.len += 1;
                        return idx;
                    }
                    Slot::Full(..) => continue,
                }
            }
        }
        unreachable!("insert: table full despite load-factor guard")
    }

    fn rehash(&mut self, new_capacity: usize) {
        let new_capacity = new_capacity.next_power_of_two().max(GROUP_SIZE);
        let old_slots = std::mem::replace(&mut self.slots, vec![Slot::Empty; new_capacity]);
        self.capacity_mask = (new_capacity - 1) as u64;
        for slot in old_slots {
            if let Slot::Full(key, idx) = slot {
                self.reinsert(key, idx);
            }
        }
    }

    /// Places an already-assigned `(key, idx)` pair during a rehash, without touching `len`
    /// or allocating a new index.
    fn reinsert(&mut self, key: K, idx: u32) {
        let hash = key.group_hash();
        let num_groups = self.slots.len() / GROUP_SIZE;
        for probe in 0..num_groups {
            let start = (self.group_start(hash) + probe * GROUP_SIZE) % self.slots.len();
            for i in start..start + GROUP_SIZE {
                if let Slot::Empty = self.slots[i] {
                    self.slots[i] = Slot::Full(key, idx);
                    return;
                }
            }
        }
        unreachable!("reinsert: table full during rehash")
    }
}

impl<K: DictionaryKey> Default for DictionaryTable<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Dictionary-encodes `values`, returning the deduplicated dictionary (in first-seen order)
/// and, for every input value, its index into that dictionary. Falls back to `None` — the
/// caller should emit PLAIN instead — once the dictionary's estimated encoded size would
/// exceed `size_limit` bytes (assuming `value_width` bytes per distinct value, the layout
/// PLAIN dictionary pages use for fixed-width types).
pub fn encode<K: DictionaryKey>(
    values: impl Iterator<Item = K>,
    value_width: usize,
    size_limit: usize,
) -> Option<(Vec<K>, Vec<u32>)> {
    let mut table = DictionaryTable::new();
    let mut dictionary = Vec::new();
    let mut indices = Vec::new();
    for value in values {
        let before = table.len();
        let idx = table.insert(value);
        if table.len() > before {
            dictionary.push(value);
            if dictionary.len() * value_width > size_limit {
                return None;
            }
        }
        indices.push(idx);
    }
    Some((dictionary, indices))
}

//! Type interning for structural deduplication.
//!
//! Converts `TypeData` nodes into lightweight `TypeId` handles:
//! - O(1) type equality (structurally equal nodes share an id)
//! - each unique structure stored once
//! - safe to share across threads

use crate::format::TypeFormatter;
use crate::types::{TypeData, TypeId, TypeListId, TypeParamInfo};
use rustc_hash::{FxHashMap, FxHasher};
use smallvec::SmallVec;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, PoisonError, RwLock};
use typesub_common::{Atom, ShardedInterner};

const SHARD_BITS: u32 = 6;
const SHARD_COUNT: usize = 1 << SHARD_BITS;
const SHARD_MASK: u32 = (SHARD_COUNT as u32) - 1;
const TYPE_LIST_INLINE: usize = 8;

type TypeListBuffer = SmallVec<[TypeId; TYPE_LIST_INLINE]>;

struct TypeShard {
    key_to_index: RwLock<FxHashMap<TypeData, u32>>,
    index_to_key: RwLock<Vec<TypeData>>,
}

impl TypeShard {
    fn new() -> Self {
        TypeShard {
            key_to_index: RwLock::new(FxHashMap::default()),
            index_to_key: RwLock::new(Vec::new()),
        }
    }
}

struct SliceInterner<T> {
    items: Vec<Arc<[T]>>,
    map: FxHashMap<Arc<[T]>, u32>,
}

impl<T> SliceInterner<T>
where
    T: Eq + Hash,
{
    fn new() -> Self {
        let empty: Arc<[T]> = Arc::from(Vec::new());
        let mut map = FxHashMap::default();
        map.insert(empty.clone(), 0);
        SliceInterner {
            items: vec![empty],
            map,
        }
    }

    fn intern(&mut self, items: &[T]) -> u32
    where
        T: Clone,
    {
        if items.is_empty() {
            return 0;
        }

        if let Some(&id) = self.map.get(items) {
            return id;
        }

        let arc: Arc<[T]> = Arc::from(items);
        let id = self.items.len() as u32;
        self.items.push(arc.clone());
        self.map.insert(arc, id);
        id
    }

    fn get(&self, id: u32) -> Option<Arc<[T]>> {
        self.items.get(id as usize).cloned()
    }

    fn empty(&self) -> Arc<[T]> {
        self.items[0].clone()
    }
}

/// Type interning table.
/// Thread-safe via sharded `RwLock`s for concurrent access.
pub struct TypeInterner {
    shards: [TypeShard; SHARD_COUNT],
    /// String interner for class, origin and reference names.
    pub string_interner: ShardedInterner,
    type_lists: RwLock<SliceInterner<TypeId>>,
}

impl TypeInterner {
    /// Create a new type interner with `Any` pre-registered.
    pub fn new() -> Self {
        TypeInterner {
            shards: std::array::from_fn(|_| TypeShard::new()),
            string_interner: {
                let interner = ShardedInterner::new();
                interner.intern_common();
                interner
            },
            type_lists: RwLock::new(SliceInterner::new()),
        }
    }

    /// Intern a string into an Atom.
    pub fn intern_string(&self, s: &str) -> Atom {
        self.string_interner.intern(s)
    }

    /// Resolve an Atom back to its string value.
    pub fn resolve_atom(&self, atom: Atom) -> String {
        self.string_interner.resolve(atom).to_string()
    }

    /// Resolve an Atom without allocating a new String.
    pub fn resolve_atom_ref(&self, atom: Atom) -> Arc<str> {
        self.string_interner.resolve(atom)
    }

    pub fn type_list(&self, id: TypeListId) -> Arc<[TypeId]> {
        let lists = self.type_lists.read().unwrap_or_else(PoisonError::into_inner);
        lists.get(id.0).unwrap_or_else(|| lists.empty())
    }

    /// Intern a node and return its TypeId.
    /// If the node already exists, returns the existing TypeId.
    pub fn intern(&self, key: TypeData) -> TypeId {
        if key == TypeData::Any {
            return TypeId::ANY;
        }

        let mut hasher = FxHasher::default();
        key.hash(&mut hasher);
        let shard_idx = (hasher.finish() as usize) & (SHARD_COUNT - 1);
        let shard = &self.shards[shard_idx];

        {
            let map = shard
                .key_to_index
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            if let Some(&local_index) = map.get(&key) {
                return self.make_id(local_index, shard_idx as u32);
            }
        }

        let mut map = shard
            .key_to_index
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let mut storage = shard
            .index_to_key
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(&local_index) = map.get(&key) {
            return self.make_id(local_index, shard_idx as u32);
        }

        let local_index = storage.len() as u32;
        if local_index > (u32::MAX >> SHARD_BITS) - 1 {
            // Degrade to the top type rather than panicking on exhaustion.
            return TypeId::ANY;
        }

        storage.push(key);
        map.insert(key, local_index);

        self.make_id(local_index, shard_idx as u32)
    }

    /// Look up the node for a given TypeId.
    pub fn lookup(&self, id: TypeId) -> Option<TypeData> {
        if id == TypeId::ANY {
            return Some(TypeData::Any);
        }

        let raw_val = id.0.checked_sub(TypeId::FIRST_USER)?;
        let shard_idx = (raw_val & SHARD_MASK) as usize;
        let local_index = raw_val >> SHARD_BITS;

        let shard = self.shards.get(shard_idx)?;
        let storage = shard
            .index_to_key
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        storage.get(local_index as usize).copied()
    }

    fn intern_type_list(&self, members: &[TypeId]) -> TypeListId {
        let mut lists = self
            .type_lists
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        TypeListId(lists.intern(members))
    }

    /// Get the number of interned types, `Any` included.
    pub fn len(&self) -> usize {
        let mut total = TypeId::FIRST_USER as usize;
        for shard in &self.shards {
            total += shard
                .index_to_key
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .len();
        }
        total
    }

    /// Check if the interner holds nothing but `Any`.
    pub fn is_empty(&self) -> bool {
        self.len() <= TypeId::FIRST_USER as usize
    }

    #[inline]
    fn make_id(&self, local_index: u32, shard_idx: u32) -> TypeId {
        let raw_val = (local_index << SHARD_BITS) | (shard_idx & SHARD_MASK);
        TypeId(TypeId::FIRST_USER + raw_val)
    }

    // =========================================================================
    // Convenience constructors
    // =========================================================================

    pub fn any(&self) -> TypeId {
        TypeId::ANY
    }

    pub fn plain(&self, name: &str) -> TypeId {
        let atom = self.intern_string(name);
        self.intern(TypeData::Plain(atom))
    }

    pub fn unparameterized(&self, origin: &str) -> TypeId {
        let atom = self.intern_string(origin);
        self.intern(TypeData::Unparameterized(atom))
    }

    pub fn generic(&self, origin: &str, args: Vec<TypeId>) -> TypeId {
        let origin = self.intern_string(origin);
        self.generic_atom(origin, &args)
    }

    pub fn generic_atom(&self, origin: Atom, args: &[TypeId]) -> TypeId {
        let args = self.intern_type_list(args);
        self.intern(TypeData::Generic { origin, args })
    }

    pub fn forward_ref(&self, name: &str) -> TypeId {
        let atom = self.intern_string(name);
        self.intern(TypeData::ForwardRef(atom))
    }

    pub fn params(&self, params: Vec<TypeId>) -> TypeId {
        let list = self.intern_type_list(&params);
        self.intern(TypeData::Params(list))
    }

    pub fn variadic(&self, element: TypeId) -> TypeId {
        self.intern(TypeData::Variadic(element))
    }

    pub fn type_var(&self, name: &str, bound: Option<TypeId>) -> TypeId {
        let name = self.intern_string(name);
        self.intern(TypeData::TypeVar(TypeParamInfo { name, bound }))
    }

    /// Intern a union type, flattening nested unions and deduplicating
    /// members.
    ///
    /// Members are ordered by their canonical rendering so the same set of
    /// members always produces the same id. A single distinct member is
    /// returned as-is; an empty member list yields `Any`.
    pub fn union(&self, members: Vec<TypeId>) -> TypeId {
        self.union_from_iter(members)
    }

    pub fn union2(&self, left: TypeId, right: TypeId) -> TypeId {
        self.union_from_iter([left, right])
    }

    fn union_from_iter<I>(&self, members: I) -> TypeId
    where
        I: IntoIterator<Item = TypeId>,
    {
        let mut flat: TypeListBuffer = SmallVec::new();
        for member in members {
            match self.lookup(member) {
                Some(TypeData::Union(list)) => {
                    flat.extend(self.type_list(list).iter().copied());
                }
                _ => flat.push(member),
            }
        }

        flat.sort_unstable();
        flat.dedup();

        match flat.len() {
            0 => return TypeId::ANY,
            1 => return flat[0],
            _ => {}
        }

        let formatter = TypeFormatter::new(self);
        flat.sort_by_cached_key(|&member| formatter.format(member));

        let list = self.intern_type_list(&flat);
        self.intern(TypeData::Union(list))
    }
}

impl Default for TypeInterner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "../tests/intern_tests.rs"]
mod tests;

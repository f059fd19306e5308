use super::*;

fn key(left: u32, right: u32, env_fingerprint: u64, flags: RelationFlags) -> RelationCacheKey {
    RelationCacheKey {
        left: TypeId(left),
        right: TypeId(right),
        env_fingerprint,
        flags,
        generation: 0,
    }
}

#[test]
fn test_insert_and_get() {
    let cache = RelationCache::new();
    let k = key(1, 2, 0, RelationFlags::empty());
    assert_eq!(cache.get(&k), None);
    cache.insert(k, SubtypeResult::Unknown);
    assert_eq!(cache.get(&k), Some(SubtypeResult::Unknown));

    let stats = cache.stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.entries, 1);
}

#[test]
fn test_key_separates_direction_env_and_flags() {
    let cache = RelationCache::new();
    cache.insert(key(1, 2, 0, RelationFlags::empty()), SubtypeResult::True);

    assert_eq!(cache.get(&key(2, 1, 0, RelationFlags::empty())), None);
    assert_eq!(cache.get(&key(1, 2, 7, RelationFlags::empty())), None);
    assert_eq!(
        cache.get(&key(1, 2, 0, RelationFlags::STRICT_INVARIANCE)),
        None
    );
}

#[test]
fn test_clear() {
    let cache = RelationCache::new();
    cache.insert(key(1, 2, 0, RelationFlags::empty()), SubtypeResult::False);
    assert!(!cache.is_empty());
    cache.clear();
    assert!(cache.is_empty());
    assert_eq!(cache.len(), 0);
}

#[test]
fn test_clear_starts_a_new_generation() {
    let cache = RelationCache::new();
    let stale = key(1, 2, 0, RelationFlags::empty());
    assert_eq!(cache.generation(), 0);

    cache.clear();
    assert_eq!(cache.generation(), 1);

    // A checker created before the clear still holds generation 0.
    cache.insert(stale, SubtypeResult::True);
    assert!(cache.is_empty());
    assert_eq!(cache.get(&stale), None);

    let fresh = RelationCacheKey {
        generation: cache.generation(),
        ..stale
    };
    cache.insert(fresh, SubtypeResult::False);
    assert_eq!(cache.get(&fresh), Some(SubtypeResult::False));
}

use std::{
    cmp::Ordering,
    fmt,
    iter::FusedIterator,
    mem,
};

use tracing::{
    debug,
    instrument,
    trace,
};

use crate::{
    config::{
        SkipListConfig,
        MAX_LEVEL,
    },
    errs::SkipListError,
    skiplist::{
        comparator::{
            Comparator,
            Natural,
        },
        level_generator::{
            GeometricLevelGenerator,
            LevelGenerator,
        },
        node::{
            Arena,
            Node,
            HEAD,
            TAIL,
        },
    },
};

/// Per-level predecessors recorded on the way down. Entries above the list's
/// current height stay at [`HEAD`], which is exactly what a node taller than
/// the list needs to be spliced under.
type Update = [usize; MAX_LEVEL];

/// An ordered map backed by a skip list.
///
/// Every operation walks down from the head sentinel at the list's current
/// height, moving right while the next key is less than the one it's looking
/// for. The node it stops in front of at level 0 either holds the key or is
/// where the key belongs.
///
/// ```
/// use cesium_skiplist::SkipList;
///
/// let mut list = SkipList::new();
/// list.insert(3, "three").unwrap();
/// list.insert(1, "one").unwrap();
///
/// assert_eq!(list.get(&3), Some(&"three"));
/// assert_eq!(list.remove(&1), Some("one"));
/// assert_eq!(list.len(), 1);
/// ```
pub struct SkipList<K, V, C = Natural> {
    arena: Arena<K, V>,
    comparator: C,
    generator: Box<dyn LevelGenerator + Send>,
    height: usize,
    len: usize,
}

/// A read-only view of a stored node.
#[derive(Debug)]
pub struct Entry<'a, K, V> {
    key: &'a K,
    value: &'a V,
    height: usize,
}

impl<'a, K, V> Entry<'a, K, V> {
    pub fn key(&self) -> &'a K {
        self.key
    }

    pub fn value(&self) -> &'a V {
        self.value
    }

    /// How many levels the node is linked into.
    pub fn height(&self) -> usize {
        self.height
    }
}

// ///////////////////////////////////////////////
// Constructors
// ///////////////////////////////////////////////

impl<K: Ord, V> SkipList<K, V> {
    /// An empty list ordered by `K`'s [`Ord`] with the default configuration.
    pub fn new() -> Self {
        Self::with_comparator(Natural)
    }

    pub fn with_config(config: SkipListConfig) -> Result<Self, SkipListError> {
        Self::with_config_and_comparator(config, Natural)
    }
}

impl<K: Ord, V> Default for SkipList<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C: Comparator<K>> SkipList<K, V, C> {
    pub fn with_comparator(comparator: C) -> Self {
        Self::assemble(comparator, Box::new(GeometricLevelGenerator::default()))
    }

    pub fn with_config_and_comparator(config: SkipListConfig, comparator: C) -> Result<Self, SkipListError> {
        let generator = GeometricLevelGenerator::from_config(&config)?;
        Ok(Self::assemble(comparator, Box::new(generator)))
    }

    /// Builds a list around a caller supplied level generator. The head is
    /// sized to `generator.total()`, which has to be in `1..=MAX_LEVEL`.
    pub fn with_generator<G>(comparator: C, generator: G) -> Result<Self, SkipListError>
    where
        G: LevelGenerator + Send + 'static,
    {
        let total = generator.total();
        if total == 0 || total > MAX_LEVEL {
            return Err(SkipListError::LevelOutOfBounds {
                requested: total,
                max: MAX_LEVEL,
            });
        }
        Ok(Self::assemble(comparator, Box::new(generator)))
    }

    fn assemble(comparator: C, generator: Box<dyn LevelGenerator + Send>) -> Self {
        SkipList {
            arena: Arena::new(generator.total()),
            comparator,
            generator,
            height: 0,
            len: 0,
        }
    }
}

// ///////////////////////////////////////////////
// Operations
// ///////////////////////////////////////////////

impl<K, V, C: Comparator<K>> SkipList<K, V, C> {
    /// The number of entries in the list.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The number of levels currently in use. `0` only when the list is empty.
    pub fn height(&self) -> usize {
        self.height
    }

    /// The most levels any node in this list can have.
    pub fn max_level(&self) -> usize {
        self.generator.total()
    }

    pub fn probability(&self) -> f64 {
        self.generator.probability()
    }

    /// Inserts `value` under `key`.
    ///
    /// If the key is already present its value is swapped in place and the old
    /// one is returned; the node keeps its identity and height. Otherwise a new
    /// node of random height is spliced in and `Ok(None)` is returned.
    ///
    /// Keys the comparator refuses fail with [`SkipListError::InvalidKey`]
    /// before the list is touched.
    #[instrument(level = "debug", skip_all)]
    pub fn insert(&mut self, key: K, value: V) -> Result<Option<V>, SkipListError> {
        if !self.comparator.admits(&key) {
            debug!("rejected key not admitted by the comparator");
            return Err(SkipListError::InvalidKey);
        }

        // an empty list takes the same path: every head link is the tail and
        // every recorded predecessor is the head.
        let mut update: Update = [HEAD; MAX_LEVEL];
        let found = self.find(&key, Some(&mut update));

        if let Some(idx) = found {
            return Ok(self
                .arena
                .node_mut(idx)
                .entry
                .as_mut()
                .map(|(_, current)| mem::replace(current, value)));
        }

        let height = self.generator.random();
        let node = Node::new(key, value, height, self.max_level())?;

        if height > self.height {
            trace!(from = self.height, to = height, "raising list height");
            self.height = height;
        }

        let idx = self.arena.allocate(node);
        for (level, &prev) in update.iter().enumerate().take(height) {
            let next = self.arena.next(prev, level);
            self.arena.set_next(idx, level, next);
            self.arena.set_next(prev, level, idx);
        }
        self.len += 1;

        Ok(None)
    }

    /// Looks up `key`, returning a view of its node.
    #[instrument(level = "trace", skip_all)]
    pub fn search(&self, key: &K) -> Option<Entry<'_, K, V>> {
        let idx = self.find(key, None)?;
        let node = self.arena.node(idx);
        node.entry.as_ref().map(|(key, value)| Entry {
            key,
            value,
            height: node.height(),
        })
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.search(key).map(|entry| entry.value())
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let idx = self.find(key, None)?;
        self.arena
            .node_mut(idx)
            .entry
            .as_mut()
            .map(|(_, value)| value)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.find(key, None).is_some()
    }

    /// Removes `key`, returning its value. Removing a key that isn't there is
    /// a no-op and returns `None`.
    ///
    /// The node is unlinked from every level it was on and its arena slot is
    /// vacated right away, so nothing refers to it afterwards.
    #[instrument(level = "debug", skip_all)]
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let mut update: Update = [HEAD; MAX_LEVEL];
        let target = self.find(key, Some(&mut update))?;

        for (level, &prev) in update.iter().enumerate().take(self.height) {
            if self.arena.next(prev, level) != target {
                break;
            }
            let next = self.arena.next(target, level);
            self.arena.set_next(prev, level, next);
        }
        self.len -= 1;

        let before = self.height;
        while self.height > 0 && self.arena.next(HEAD, self.height - 1) == TAIL {
            self.height -= 1;
        }
        if self.height != before {
            trace!(from = before, to = self.height, "lowering list height");
        }

        self.arena.release(target).map(|(_, value)| value)
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.arena.reset();
        self.height = 0;
        self.len = 0;
    }

    /// Walks the whole list in key order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            arena: &self.arena,
            cursor: self.arena.next(HEAD, 0),
            remaining: self.len,
        }
    }

    /// The descent every operation shares. Returns the node holding `key`, if
    /// any. When `update` is given, the last node visited on each level before
    /// dropping down is recorded in it.
    fn find(&self, key: &K, mut update: Option<&mut Update>) -> Option<usize> {
        let mut cursor = HEAD;
        for level in (0..self.height).rev() {
            loop {
                let next = self.arena.next(cursor, level);
                if self.compare_to(next, key) != Ordering::Less {
                    break;
                }
                cursor = next;
            }
            if let Some(update) = update.as_deref_mut() {
                update[level] = cursor;
            }
        }

        let candidate = self.arena.next(cursor, 0);
        match self.compare_to(candidate, key) {
            | Ordering::Equal => Some(candidate),
            | _ => None,
        }
    }

    /// Orders the node at `idx` against `key`. Only the tail can be met
    /// without an entry, and it sorts after everything.
    #[inline]
    fn compare_to(&self, idx: usize, key: &K) -> Ordering {
        match self.arena.node(idx).key() {
            | Some(other) => self.comparator.compare(other, key),
            | None => Ordering::Greater,
        }
    }
}

// ///////////////////////////////////////////////
// Iteration
// ///////////////////////////////////////////////

/// Iterator over the entries of a [`SkipList`], in key order.
pub struct Iter<'a, K, V> {
    arena: &'a Arena<K, V>,
    cursor: usize,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor == TAIL {
            return None;
        }
        let arena = self.arena;
        let node = arena.node(self.cursor);
        self.cursor = node.levels[0];
        self.remaining = self.remaining.saturating_sub(1);
        node.entry.as_ref().map(|(key, value)| (key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<'a, K, V, C: Comparator<K>> IntoIterator for &'a SkipList<K, V, C> {
    type IntoIter = Iter<'a, K, V>;
    type Item = (&'a K, &'a V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ///////////////////////////////////////////////
// Trait implementation
// ///////////////////////////////////////////////

impl<K, V, C> fmt::Debug for SkipList<K, V, C>
where
    K: fmt::Debug,
    V: fmt::Debug,
    C: Comparator<K>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Dumps the list as `[key=value, ...]` in key order. This is for eyeballing
/// while debugging and isn't a stable format.
impl<K, V, C> fmt::Display for SkipList<K, V, C>
where
    K: fmt::Display,
    V: fmt::Display,
    C: Comparator<K>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, (key, value)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", key, value)?;
        }
        write!(f, "]")
    }
}

// ///////////////////////////////////////////////
// Invariant checks
// ///////////////////////////////////////////////

#[cfg(test)]
impl<K, V, C: Comparator<K>> SkipList<K, V, C> {
    /// Walks every level and panics if the structure is inconsistent.
    pub(crate) fn check_invariants(&self) {
        assert_eq!(self.height == 0, self.len == 0, "height is 0 iff the list is empty");
        assert!(self.height <= self.max_level());

        // nothing is linked above the current height
        for level in self.height..self.max_level() {
            assert_eq!(self.arena.next(HEAD, level), TAIL, "head level {level} must be unused");
        }
        if self.height > 0 {
            assert_ne!(self.arena.next(HEAD, self.height - 1), TAIL, "top level must be populated");
        }

        // every level is strictly increasing, and we note which nodes sit on it
        let mut seen: Vec<Vec<usize>> = Vec::with_capacity(self.height);
        for level in 0..self.height {
            let mut members = Vec::new();
            let mut cursor = self.arena.next(HEAD, level);
            let mut prev: Option<usize> = None;
            while cursor != TAIL {
                let node = self.arena.node(cursor);
                assert!(node.height() > level, "node linked above its own height");
                if let Some(prev) = prev {
                    let prev_key = self.arena.node(prev).key().expect("linked node without a key");
                    let key = node.key().expect("linked node without a key");
                    assert_eq!(
                        self.comparator.compare(prev_key, key),
                        Ordering::Less,
                        "keys out of order on level {level}"
                    );
                }
                members.push(cursor);
                prev = Some(cursor);
                cursor = node.levels[level];
            }
            seen.push(members);
        }

        // a node of height h shows up on exactly levels 0..h
        if let Some(base) = seen.first() {
            assert_eq!(base.len(), self.len, "level 0 holds every entry");
            for &idx in base {
                let h = self.arena.node(idx).height();
                for (level, members) in seen.iter().enumerate() {
                    assert_eq!(members.contains(&idx), level < h, "height prefix broken on level {level}");
                }
            }
        }

        assert_eq!(self.arena.occupied(), self.len + 2, "arena leaked a slot");
    }
}

#[cfg(test)]
mod tests {
    use std::cmp::Ordering;

    use crate::{
        config::SkipListConfig,
        errs::SkipListError,
        skiplist::{
            comparator::{
                FloatOrder,
                FnComparator,
            },
            level_generator::LevelGenerator,
            map::SkipList,
        },
    };

    fn seeded<K: Ord, V>(seed: u64) -> SkipList<K, V> {
        SkipList::with_config(SkipListConfig::new().with_seed(seed)).unwrap()
    }

    /// Hands out a fixed sequence of heights, then height 1 forever.
    struct Scripted {
        heights: Vec<usize>,
        total: usize,
    }

    impl LevelGenerator for Scripted {
        fn total(&self) -> usize {
            self.total
        }

        fn random(&mut self) -> usize {
            if self.heights.is_empty() {
                1
            } else {
                self.heights.remove(0)
            }
        }

        fn probability(&self) -> f64 {
            0.5
        }
    }

    #[test]
    fn test_empty_list() {
        let mut list: SkipList<u32, String> = SkipList::new();
        assert!(list.is_empty());
        assert_eq!(list.height(), 0);
        assert!(list.search(&1).is_none());
        assert!(list.remove(&1).is_none());
        assert_eq!(list.len(), 0);
        assert_eq!(list.iter().count(), 0);
        assert_eq!(list.to_string(), "[]");
        list.check_invariants();
    }

    #[test]
    fn test_defaults() {
        let list: SkipList<u32, u32> = SkipList::default();
        assert_eq!(list.probability(), 0.25);
        assert_eq!(list.max_level(), 64);
    }

    #[test]
    fn test_insert_and_search() {
        let mut list = seeded(1);
        assert_eq!(list.insert(10, "ten"), Ok(None));
        assert!(list.height() >= 1);
        assert_eq!(list.insert(5, "five"), Ok(None));
        assert_eq!(list.insert(20, "twenty"), Ok(None));

        let entry = list.search(&5).unwrap();
        assert_eq!(*entry.key(), 5);
        assert_eq!(*entry.value(), "five");
        assert!(entry.height() >= 1);

        assert!(list.search(&15).is_none());
        assert!(list.contains_key(&20));
        assert!(!list.contains_key(&21));
        assert_eq!(list.len(), 3);
        list.check_invariants();
    }

    #[test]
    fn test_update_in_place() {
        let mut list = seeded(2);
        list.insert(3, "three").unwrap();
        let height = list.search(&3).unwrap().height();

        assert_eq!(list.insert(3, "drei"), Ok(Some("three")));
        assert_eq!(list.len(), 1);

        let entry = list.search(&3).unwrap();
        assert_eq!(*entry.value(), "drei");
        assert_eq!(entry.height(), height, "update must not rebuild the node");
        list.check_invariants();
    }

    #[test]
    fn test_get_mut() {
        let mut list = seeded(3);
        list.insert("a", 1).unwrap();
        *list.get_mut(&"a").unwrap() += 41;
        assert_eq!(list.get(&"a"), Some(&42));
        assert!(list.get_mut(&"b").is_none());
    }

    #[test]
    fn test_remove() {
        let mut list = seeded(4);
        for k in 0..32 {
            list.insert(k, k * 10).unwrap();
        }
        assert_eq!(list.remove(&7), Some(70));
        assert!(list.search(&7).is_none());
        assert_eq!(list.len(), 31);
        list.check_invariants();

        // second removal is a no-op
        assert_eq!(list.remove(&7), None);
        assert_eq!(list.len(), 31);
        assert_eq!(list.remove(&100), None);
        list.check_invariants();
    }

    #[test]
    fn test_remove_everything_resets_height() {
        let mut list = seeded(5);
        for k in 0..256 {
            list.insert(k, ()).unwrap();
        }
        for k in (0..256).rev() {
            assert_eq!(list.remove(&k), Some(()));
            list.check_invariants();
        }
        assert_eq!(list.height(), 0);
        assert!(list.is_empty());
    }

    #[test]
    fn test_height_tracks_tallest_node() {
        let generator = Scripted {
            heights: vec![2, 5, 1],
            total: 8,
        };
        let mut list = SkipList::with_generator(crate::Natural, generator).unwrap();

        list.insert(1, "a").unwrap();
        assert_eq!(list.height(), 2);
        list.insert(2, "b").unwrap();
        assert_eq!(list.height(), 5);
        list.insert(3, "c").unwrap();
        assert_eq!(list.height(), 5);
        assert_eq!(list.search(&2).unwrap().height(), 5);
        list.check_invariants();

        // dropping the tall node lowers the list to the next tallest
        list.remove(&2);
        assert_eq!(list.height(), 2);
        list.check_invariants();

        list.remove(&1);
        assert_eq!(list.height(), 1);
        list.remove(&3);
        assert_eq!(list.height(), 0);
        list.check_invariants();
    }

    #[test]
    fn test_bad_generator_fails_before_mutation() {
        let generator = Scripted {
            heights: vec![1, 9],
            total: 4,
        };
        let mut list = SkipList::with_generator(crate::Natural, generator).unwrap();
        list.insert(1, "a").unwrap();

        assert_eq!(
            list.insert(2, "b"),
            Err(SkipListError::LevelOutOfBounds {
                requested: 9,
                max: 4
            })
        );
        assert_eq!(list.len(), 1);
        assert!(list.search(&2).is_none());
        list.check_invariants();
    }

    #[test]
    fn test_generator_total_is_validated() {
        let generator = Scripted {
            heights: vec![],
            total: 0,
        };
        assert!(SkipList::<u32, u32, _>::with_generator(crate::Natural, generator).is_err());
    }

    #[test]
    fn test_invalid_config() {
        let result = SkipList::<u32, u32>::with_config(SkipListConfig::new().with_probability(1.0));
        assert_eq!(result.err(), Some(SkipListError::InvalidProbability(1.0)));
    }

    #[test]
    fn test_rejected_key_leaves_list_untouched() {
        let mut list = SkipList::with_comparator(FloatOrder);
        list.insert(1.5, "x").unwrap();
        assert_eq!(list.insert(f64::NAN, "nan"), Err(SkipListError::InvalidKey));
        assert_eq!(list.len(), 1);
        assert_eq!(list.iter().map(|(k, _)| *k).collect::<Vec<_>>(), vec![1.5]);
        list.check_invariants();
    }

    #[test]
    fn test_custom_comparator() {
        let mut list = SkipList::with_comparator(FnComparator(|a: &i32, b: &i32| b.cmp(a)));
        for k in [4, 1, 9, 3] {
            list.insert(k, ()).unwrap();
        }
        let keys: Vec<i32> = list.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec![9, 4, 3, 1]);
        list.check_invariants();
    }

    #[test]
    fn test_case_insensitive_keys() {
        let cmp = FnComparator(|a: &String, b: &String| -> Ordering { a.to_lowercase().cmp(&b.to_lowercase()) });
        let mut list = SkipList::with_comparator(cmp);
        list.insert("Key".to_string(), 1).unwrap();
        assert_eq!(list.insert("KEY".to_string(), 2), Ok(Some(1)));
        assert_eq!(list.len(), 1);
        assert_eq!(list.get(&"key".to_string()), Some(&2));
    }

    #[test]
    fn test_clear() {
        let mut list = seeded(6);
        for k in 0..100 {
            list.insert(k, k).unwrap();
        }
        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.height(), 0);
        assert!(list.search(&50).is_none());
        list.check_invariants();

        list.insert(1, 1).unwrap();
        assert_eq!(list.len(), 1);
        list.check_invariants();
    }

    #[test]
    fn test_iter() {
        let mut list = seeded(7);
        for k in [5, 2, 8, 1] {
            list.insert(k, k * 2).unwrap();
        }
        let iter = list.iter();
        assert_eq!(iter.len(), 4);
        let pairs: Vec<(i32, i32)> = iter.map(|(k, v)| (*k, *v)).collect();
        assert_eq!(pairs, vec![(1, 2), (2, 4), (5, 10), (8, 16)]);

        let mut count = 0;
        for _ in &list {
            count += 1;
        }
        assert_eq!(count, 4);
    }

    #[test]
    fn test_dump() {
        let mut list = seeded(8);
        list.insert(2, "b").unwrap();
        list.insert(1, "a").unwrap();
        assert_eq!(list.to_string(), "[1=a, 2=b]");
        assert_eq!(format!("{:?}", list), r#"{1: "a", 2: "b"}"#);
    }

    #[test]
    fn test_reference_scenario() {
        let mut list = seeded(9);
        for (k, v) in [(2, "2"), (5, "5"), (3, "3"), (6, "6"), (11, "11"), (10, "10"), (8, "8")] {
            assert_eq!(list.insert(k, v.to_string()), Ok(None));
        }
        assert_eq!(list.len(), 7);

        assert_eq!(list.insert(3, "4".to_string()), Ok(Some("3".to_string())));
        assert_eq!(list.len(), 7);

        assert_eq!(list.remove(&3), Some("4".to_string()));
        assert_eq!(list.len(), 6);
        assert!(list.search(&3).is_none());

        list.insert(7, "7".to_string()).unwrap();
        assert_eq!(list.len(), 7);

        assert_eq!(list.search(&5).unwrap().value(), "5");
        let keys: Vec<i32> = list.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec![2, 5, 6, 7, 8, 10, 11]);
        list.check_invariants();
    }

    #[test]
    fn test_values_dropped_on_remove() {
        use std::rc::Rc;

        let value = Rc::new(());
        let mut list = seeded(10);
        list.insert(1, Rc::clone(&value)).unwrap();
        assert_eq!(Rc::strong_count(&value), 2);

        drop(list.remove(&1));
        assert_eq!(Rc::strong_count(&value), 1, "removed value must not linger");
    }
}

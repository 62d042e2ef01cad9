/// Construction time options and the crate wide limits.
pub mod config;
pub mod errs;
pub mod shared;

/// A [`skip list`] backed ordered map, in the style of [`JP-Ellis`]'
/// implementation
///
/// [`skip list`]: https://en.wikipedia.org/wiki/Skip_list
/// [`JP-Ellis`]: https://github.com/JP-Ellis/rust-skiplist/
pub mod skiplist;

pub use config::{
    SkipListConfig,
    DEFAULT_PROBABILITY,
    MAX_LEVEL,
};
pub use errs::SkipListError;
pub use shared::SharedSkipList;
pub use skiplist::{
    comparator::{
        Comparator,
        FloatOrder,
        FnComparator,
        Natural,
    },
    level_generator::{
        GeometricLevelGenerator,
        LevelGenerator,
    },
    map::{
        Entry,
        Iter,
        SkipList,
    },
};

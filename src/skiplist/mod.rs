//! A skiplist implementation which gives an ordered map without any
//! rebalancing.
//!
//! SkipLists use a probabilistic distribution of nodes over the internal
//! levels, whereby the lowest level (level 0) contains all the nodes, and each
//! level `n > 0` will contain a random subset of the nodes on level `n - 1`.
//!
//! Most commonly, a geometric distribution is used whereby the chance that a
//! node occupies level `n` is `p` times the chance of occupying level `n-1`
//! (with `0 < p < 1`).
//!
//! It is very unlikely that this will need to be changed as the default should
//! suffice, but if need be custom level generators can be implemented.
//!
//! ```text
//! level 2:  HEAD ------------------> 5 --------------------------> TAIL
//! level 1:  HEAD ------> 2 --------> 5 ------------> 10 ---------> TAIL
//! level 0:  HEAD ------> 2 --> 3 --> 5 --> 6 --> 8 -> 10 --> 11 -> TAIL
//! ```

pub mod comparator;
pub mod level_generator;
pub mod map;
mod node;

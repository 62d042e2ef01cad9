// Copyright (c) Sienna Satterwhite, CesiumDB Contributors
// SPDX-License-Identifier: GPL-3.0-only WITH Classpath-exception-2.0

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SkipListError {
    #[error("key is not admitted by the comparator")]
    InvalidKey,
    #[error("probability {0} must be in (0, 1)")]
    InvalidProbability(f64),
    #[error("level {requested} is outside of 1..={max}")]
    LevelOutOfBounds { requested: usize, max: usize },
}

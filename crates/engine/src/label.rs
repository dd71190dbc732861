//! Access-path labels: a path is an ordered sequence of labels from an
//! access-path tree's root.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Label {
    Field(String),
    /// Wildcard label, reserved: not materialized by this core.
    Any,
}

pub type Path = Vec<Label>;

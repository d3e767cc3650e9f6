//! Immutable maps and sets that look like plain records.
//!
//! [`RecMap<K, V>`] is a partial mapping from scalar keys to non-null values;
//! [`RecSet<K>`] is a set of scalar keys. Both are persistent: every edit
//! operation returns a new container and never touches its input, so a shared
//! reference can be handed around freely without anyone observing a change.
//!
//! Both serialize as flat records so they can be passed to anything that
//! expects a plain dictionary: a map as `{"a": 1, "b": 2}` and a set as
//! `{"a": true, "b": true}`. Iteration follows insertion order, like the
//! records they mirror.

mod map;
mod set;
mod variants;

use indexmap::{IndexMap, IndexSet};
pub use map::RecMap;
use rustc_hash::FxBuildHasher;
pub use set::RecSet;
pub use variants::Variants;

pub(crate) type FxIndexMap<K, V> = IndexMap<K, V, FxBuildHasher>;
pub(crate) type FxIndexSet<K> = IndexSet<K, FxBuildHasher>;

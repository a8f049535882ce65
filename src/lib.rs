//! Biglist - indexed sequences built for localized edits and cheap copies.
//!
//! Two engines share one [`Sequence`] contract:
//!
//! - [`GapList`]: a circular array with one movable free region. Runs of
//!   edits near the same position cost O(1) each.
//! - [`BigList`]: bounded [`GapList`] blocks in a threaded AVL tree. Blocks
//!   are reference counted, so `clone()` is proportional to the number of
//!   blocks and writes copy only the block they touch.
//!
//! [`Immutable`] wraps either one in a read-only view.
//!
//! # Quick Start
//!
//! ```
//! use biglist::BigList;
//! use biglist::Sequence;
//!
//! let mut list: BigList<u32> = (0..10_000).collect();
//! let snapshot = list.clone();
//!
//! list.insert(5_000, 42).unwrap();
//! list.remove_range(0..100).unwrap();
//!
//! assert_eq!(list.len(), 9_901);
//! assert_eq!(snapshot.len(), 10_000);
//! assert_eq!(snapshot[5_000], 5_000);
//! ```
//!
//! `BigList` is not `Sync`: lookups update a cached block position, even
//! through `&self`.

pub mod big_list;
pub mod error;
pub mod gap_list;
pub mod immutable;
pub mod sequence;
#[cfg(feature = "serde")]
mod serialize;

pub use big_list::BigList;
pub use error::Result;
pub use error::SequenceError;
pub use gap_list::GapList;
pub use immutable::Immutable;
pub use sequence::Sequence;
pub use sequence::SequenceFactory;

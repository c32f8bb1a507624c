#![warn(missing_docs)]
//! `opf-blupdate` - re-basing annotation coordinates onto a corrected base text.
//!
//! A character diff between the old and new text yields a [`TranslationVector`]: the unchanged
//! regions and the offset each one moved by. Coordinates inside those regions translate exactly;
//! coordinates in changed regions are re-located by searching for their context near an
//! estimated position. A coordinate that cannot be re-located is reported, never guessed.
//!
//! ```rust
//! use opf_blupdate::{BaseLayerUpdater, Triple};
//!
//! let updater = BaseLayerUpdater::new("abefghijkl", "abcdefgkl");
//! assert_eq!(
//!     updater.translation_vector().triples(),
//!     &[Triple::new(0, 2, 0), Triple::new(2, 5, 2), Triple::new(8, 10, -1)]
//! );
//! assert_eq!(updater.translate(3), Some(5));
//! ```

pub mod diff;
pub mod matcher;
pub mod rebase;
pub mod updater;
pub mod vector;

pub use diff::{DiffOp, DiffPrimitive, SimilarDiff};
pub use matcher::{ApproximateSearch, Context, ContextMatcher, Match};
pub use rebase::{Boundary, RebaseReport, UnresolvedBoundary, rebase_layer};
pub use updater::{BaseLayerUpdater, UNTRANSLATABLE, UpdaterOptions};
pub use vector::{Lookup, Triple, TranslationVector};

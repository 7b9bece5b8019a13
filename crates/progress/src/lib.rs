#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Output classification and progress estimation for package-manager runs
//!
//! The package manager prints unstructured console text. This crate turns
//! each line into zero, one or two [`ClassifiedEvent`]s and folds those
//! events into a single bounded progress value:
//!
//! - [`OutputClassifier`] is a set of independent, stateless matchers over
//!   one line (announced package count, download start, install start).
//! - [`ProgressEstimator`] owns the per-batch [`ProgressState`] and applies
//!   events strictly in arrival order.
//!
//! Nothing here performs I/O; the runner feeds lines in and forwards the
//! returned values to whatever sink is listening.
//!
//! ```
//! use rootstrap_progress::{OutputClassifier, ProgressEstimator};
//!
//! let classifier = OutputClassifier::with_default_suffixes().unwrap();
//! let mut estimator = ProgressEstimator::new();
//!
//! for line in ["Packages (2) a b", "downloading a.pkg.tar.xz...", "installing a..."] {
//!     for event in classifier.classify(line) {
//!         estimator.consume(&event);
//!     }
//! }
//! assert_eq!(estimator.state().total, 2);
//! assert!(estimator.progress() > 0.0);
//! ```

mod classifier;
mod estimator;

pub use classifier::{ClassifiedEvent, OutputClassifier, DEFAULT_ARCHIVE_SUFFIXES};
pub use estimator::{EstimatorUpdate, Phase, ProgressEstimator, ProgressState};

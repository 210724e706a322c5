// Copyright © 2025 lituus-io <spicyzhug@gmail.com>
// All Rights Reserved.
// Licensed under PolyForm Noncommercial 1.0.0

//! Tree-structured Parzen Estimator for categorical search spaces
//!
//! A [`Study`] owns the trial history and asks a [`TpeSampler`] for the next
//! point. Every dimension is categorical: an assignment is one index per
//! dimension.
//!
//! ```
//! use promptsmith_tpe::{Direction, Study, TpeConfig};
//!
//! let config = TpeConfig::new().with_seed(7).with_n_startup_trials(3);
//! let mut study = Study::new(&[5, 5, 3], Direction::Maximize, config).unwrap();
//! for _ in 0..10 {
//!     let params = study.ask();
//!     let value = params.iter().sum::<usize>() as f64;
//!     study.tell(params, value).unwrap();
//! }
//! assert_eq!(study.trials().len(), 10);
//! ```

pub mod error;
mod parzen;
pub mod sampler;
pub mod study;

pub use error::{Result, TpeError};
pub use sampler::{TpeConfig, TpeSampler};
pub use study::{Direction, Study, Trial};

/// One category index per dimension.
pub type Assignment = smallvec::SmallVec<[usize; 4]>;

//! Ground-track speed estimation from successive downward-facing photographs.
//!
//! Each consecutive image pair goes through
//! [`features`] → [`matching`] → [`displacement`] → [`speed`], and the
//! resulting samples are reduced by [`aggregator::SessionAggregator`].

pub mod aggregator;
pub mod capture;
pub mod config;
pub mod data_loader;
pub mod displacement;
pub mod error;
pub mod features;
pub mod io;
pub mod matching;
pub mod metadata;
pub mod pipeline;
pub mod session;
pub mod speed;
pub mod visualization;

pub use aggregator::{AcceptanceBand, SessionAggregator, SessionEstimate};
pub use config::{SessionConfig, VelocityConfig};
pub use displacement::mean_displacement;
pub use error::{Result, VelocityError};
pub use features::{FeaturePoint, extract_features};
pub use matching::{Correspondence, match_features};
pub use pipeline::{PairEstimator, PairMeasurement};
pub use speed::{SpeedSample, speed_from_displacement};

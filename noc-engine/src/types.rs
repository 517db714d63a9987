// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use std::fmt;

use noc_track::tracker::TrackConfigError;

/// Return `Err(SimError)` built from anything with `to_string`.
#[macro_export]
macro_rules! sim_error {
    ($msg:expr) => {
        Err($crate::types::SimError($msg.to_string()))
    };
}

/// A simulation that cannot be built or cannot continue.
///
/// Back-pressure is never a `SimError`; models report it through their
/// return values and retry.
#[derive(Debug, PartialEq, Eq)]
pub struct SimError(pub String);

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Simulation error: {}", self.0)
    }
}

impl std::error::Error for SimError {}

impl From<TrackConfigError> for SimError {
    fn from(e: TrackConfigError) -> Self {
        SimError(e.to_string())
    }
}

pub type SimResult<T = ()> = Result<T, SimError>;

//! Errors reported by the lane and scenario builders.

use crate::VehicleId;
use thiserror::Error;

/// An invalid argument passed to a [Lane](crate::Lane) operation,
/// or a saved lane whose links do not hold together.
/// The lane is left untouched when one of these is returned.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum LaneError {
    #[error("vehicle {0:?} does not exist")]
    UnknownVehicle(VehicleId),
    #[error("cannot insert vehicle {0:?} behind itself")]
    SameVehicle(VehicleId),
    #[error("vehicle {0:?} is not part of the lane order")]
    NotLinked(VehicleId),
    #[error("vehicle {0:?} is already part of the lane order")]
    AlreadyLinked(VehicleId),
    #[error("the links of vehicle {0:?} do not match its neighbours")]
    BrokenLink(VehicleId),
    #[error("the lane's front, back or length do not match its links")]
    BrokenOrder,
}

/// A scenario which cannot be built.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("a scenario needs at least one vehicle")]
    NoVehicles,
    #[error("invalid vehicle profile weights: {0}")]
    Weights(#[from] rand_distr::WeightedError),
    #[error(transparent)]
    Lane(#[from] LaneError),
}

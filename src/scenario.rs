//! Random initial conditions for a simulation.

use crate::error::ScenarioError;
use crate::lane::Lane;
use crate::vehicle::VehicleAttributes;
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Uniform, WeightedIndex};

/// Converts a speed in km/h into m/s, which is m/tick.
pub fn kmh(speed: f64) -> f64 {
    speed / 3.6
}

/// A kind of vehicle, determining the ranges its attributes are drawn from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum VehicleProfile {
    /// A car with fixed acceleration and no closing speed tolerance.
    Classic,
    Car,
    Truck,
    Bike,
}

/// The parameters of a randomly generated lane.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct ScenarioConfig {
    /// The number of vehicles on the lane.
    pub vehicle_count: usize,
    /// The position of the lead vehicle in m.
    pub start_pos: f64,
    /// The largest gap between consecutive vehicles in m.
    pub max_spacing: f64,
    /// The vehicle profiles to choose from and their relative weights.
    pub profiles: Vec<(VehicleProfile, f64)>,
    /// The random seed. A fresh one is drawn when absent.
    pub seed: Option<u64>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            vehicle_count: 11,
            start_pos: kmh(150.0) * 20.0 * 12.0,
            max_spacing: kmh(150.0) * 20.0,
            profiles: vec![(VehicleProfile::Classic, 1.0)],
            seed: None,
        }
    }
}

impl ScenarioConfig {
    /// Creates the random number generator for this scenario.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

impl VehicleProfile {
    /// Samples the attributes and initial speed of a vehicle with this profile.
    pub fn sample<R: Rng + ?Sized>(self, rng: &mut R) -> (VehicleAttributes, f64) {
        use VehicleProfile::*;
        let unit = Uniform::new(0.0, 1.0);

        let (base, spread) = match self {
            Classic | Car => (100.0, 50.0),
            Truck => (70.0, 20.0),
            Bike => (100.0, 70.0),
        };
        let max_speed = kmh(base) + kmh(spread) * unit.sample(rng);
        let vel = max_speed - kmh(spread) * unit.sample(rng);

        let (acceleration, deceleration) = match self {
            Classic => (2.5, 5.0),
            Car => (max_speed / 20.0, max_speed / 10.0),
            Truck => (max_speed / 40.0, max_speed / 20.0),
            Bike => (max_speed / 10.0, max_speed / 5.0),
        };
        let speed_tolerance = match self {
            Classic => 0.0,
            Car | Truck | Bike => kmh(5.0),
        };

        let attributes = VehicleAttributes {
            max_speed,
            speed_tolerance,
            visibility_time: 5.0,
            min_gap_time: 2.0,
            acceleration,
            deceleration,
        };
        (attributes, vel)
    }
}

/// Builds a lane of randomly parameterised vehicles.
///
/// The lead vehicle starts at `start_pos` and each following vehicle
/// a random distance of up to `max_spacing` behind the one before it.
pub fn build_lane<R: Rng + ?Sized>(
    config: &ScenarioConfig,
    rng: &mut R,
) -> Result<Lane, ScenarioError> {
    if config.vehicle_count == 0 {
        return Err(ScenarioError::NoVehicles);
    }
    let weights = WeightedIndex::new(config.profiles.iter().map(|(_, weight)| *weight))?;
    let unit = Uniform::new(0.0, 1.0);

    let mut lane = Lane::new();
    let mut pos = config.start_pos;
    for _ in 0..config.vehicle_count {
        let profile = config.profiles[weights.sample(rng)].0;
        let (attributes, vel) = profile.sample(rng);
        let id = lane.create_with(&attributes);
        lane.place(id, pos, vel)?;
        lane.push_back(id)?;
        pos -= config.max_spacing * unit.sample(rng);
    }

    debug!(
        "built lane of {} vehicles from {:.1} to {:.1}",
        lane.len(),
        config.start_pos,
        lane.back().map_or(pos, |vehicle| vehicle.pos())
    );
    Ok(lane)
}

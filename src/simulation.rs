use crate::lane::Lane;
use crate::vehicle::Vehicle;
use crate::{VehicleId, VehicleSet};
use log::warn;

/// A traffic simulation on a single lane.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Simulation {
    /// The lane and the vehicles on it.
    lane: Lane,
    /// The number of ticks simulated so far.
    tick: usize,
}

/// Two vehicles which ran into each other.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Collision {
    /// The vehicle which drove into the one ahead.
    pub follower: VehicleId,
    /// The vehicle which was struck.
    pub leader: VehicleId,
    /// The position of the follower when the collision was detected.
    pub pos: f64,
}

impl Simulation {
    /// Creates a new simulation of the given lane.
    pub fn new(lane: Lane) -> Self {
        Self { lane, tick: 0 }
    }

    /// Advances the simulation by one tick, returning any collisions that occurred.
    pub fn step(&mut self) -> Vec<Collision> {
        let collisions = advance_one_tick(&mut self.lane);
        self.tick += 1;
        collisions
    }

    /// Gets the number of ticks simulated so far.
    pub fn tick(&self) -> usize {
        self.tick
    }

    /// Gets the lane being simulated.
    pub fn lane(&self) -> &Lane {
        &self.lane
    }

    /// Returns an iterator over the vehicles in the simulation, front to back.
    pub fn iter_vehicles(&self) -> impl Iterator<Item = &Vehicle> {
        self.lane.iter()
    }

    /// Gets a reference to the vehicle with the given ID.
    pub fn get_vehicle(&self, vehicle_id: VehicleId) -> Option<&Vehicle> {
        self.lane.get(vehicle_id)
    }

    /// The number of vehicles which have crashed.
    pub fn crashed_count(&self) -> usize {
        self.lane.iter().filter(|vehicle| vehicle.crashed()).count()
    }

    /// Ends the simulation, handing back the lane.
    pub fn into_lane(self) -> Lane {
        self.lane
    }
}

/// Advances every vehicle on the lane by one tick.
///
/// Vehicles are updated in place from front to back, so each vehicle
/// reacts to the state its leader has already reached this tick.
pub fn advance_one_tick(lane: &mut Lane) -> Vec<Collision> {
    let mut collisions = vec![];
    let mut cursor = lane.front_id();
    let vehicles = lane.vehicles_mut();
    while let Some(vehicle_id) = cursor {
        cursor = vehicles[vehicle_id].behind;
        if let Some(collision) = update_vehicle(vehicles, vehicle_id) {
            collisions.push(collision);
        }
    }
    collisions
}

/// Applies the car following model to a single vehicle.
fn update_vehicle(vehicles: &mut VehicleSet, vehicle_id: VehicleId) -> Option<Collision> {
    let vehicle = &mut vehicles[vehicle_id];
    if vehicle.crashed() {
        return None;
    }

    vehicle.integrate();
    let vis_gap = vehicle.visibility_gap();
    let min_gap = vehicle.min_gap();

    // Free road
    let Some(leader_id) = vehicle.ahead else {
        vehicle.accelerate(vehicle.max_speed());
        return None;
    };
    let [vehicle, leader] = vehicles.get_disjoint_mut([vehicle_id, leader_id])?;
    if vehicle.pos() < leader.pos() - vis_gap {
        vehicle.accelerate(vehicle.max_speed());
        return None;
    }

    if vehicle.pos() >= leader.pos() {
        warn!(
            "vehicle {} crashed into vehicle {} at {:.1}",
            vehicle.number(),
            leader.number(),
            vehicle.pos()
        );
        vehicle.crash();
        leader.crash();
        return Some(Collision {
            follower: vehicle_id,
            leader: leader_id,
            pos: vehicle.pos(),
        });
    }

    if vehicle.pos() > leader.pos() - min_gap {
        vehicle.decelerate(0.0);
    } else {
        vehicle.follow_vehicle(leader.vel());
    }
    None
}

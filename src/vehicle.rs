use self::acceleration::{AccelerationModel, ModelParams};
use crate::VehicleId;

mod acceleration;

/// A simulated vehicle.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vehicle {
    /// The vehicle's ID
    pub(crate) id: VehicleId,
    /// The order in which the vehicle was created, starting from 0.
    pub(crate) number: usize,
    /// The speed control model
    acc: AccelerationModel,
    /// Visibility range in ticks, scaled by the current speed.
    visibility_time: f64,
    /// Minimum gap in ticks, scaled by the current speed.
    min_gap_time: f64,
    /// The longitudinal position along the lane, in m.
    pos: f64,
    /// The current speed in m/tick.
    vel: f64,
    /// Whether the vehicle has collided. Never cleared.
    crashed: bool,
    /// The vehicle immediately ahead.
    pub(crate) ahead: Option<VehicleId>,
    /// The vehicle immediately behind.
    pub(crate) behind: Option<VehicleId>,
}

/// The attributes of a simulated vehicle.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VehicleAttributes {
    /// The top speed of the vehicle in m/tick.
    pub max_speed: f64,
    /// How much faster than the vehicle ahead this vehicle is willing to approach it, in m/tick.
    pub speed_tolerance: f64,
    /// Visibility range, in ticks of travel at the current speed.
    pub visibility_time: f64,
    /// Minimum gap to the vehicle ahead, in ticks of travel at the current speed.
    pub min_gap_time: f64,
    /// The speed gained per tick when accelerating, in m/tick.
    pub acceleration: f64,
    /// The speed lost per tick when decelerating, in m/tick; a positive number.
    pub deceleration: f64,
}

impl Vehicle {
    /// Creates a new, unlinked vehicle at rest at position 0.
    pub(crate) fn new(id: VehicleId, number: usize, attributes: &VehicleAttributes) -> Self {
        Self {
            id,
            number,
            acc: AccelerationModel::new(&ModelParams {
                max_speed: attributes.max_speed,
                speed_tolerance: attributes.speed_tolerance,
                acceleration: attributes.acceleration,
                deceleration: attributes.deceleration,
            }),
            visibility_time: attributes.visibility_time,
            min_gap_time: attributes.min_gap_time,
            pos: 0.0,
            vel: 0.0,
            crashed: false,
            ahead: None,
            behind: None,
        }
    }

    /// Gets the vehicle's ID.
    pub fn id(&self) -> VehicleId {
        self.id
    }

    /// The sequential number assigned to the vehicle on creation.
    pub fn number(&self) -> usize {
        self.number
    }

    /// The longitudinal position of the vehicle.
    pub fn pos(&self) -> f64 {
        self.pos
    }

    /// The vehicle's current speed.
    pub fn vel(&self) -> f64 {
        self.vel
    }

    pub fn max_speed(&self) -> f64 {
        self.acc.max_speed()
    }

    pub fn speed_tolerance(&self) -> f64 {
        self.acc.speed_tolerance()
    }

    pub fn visibility_time(&self) -> f64 {
        self.visibility_time
    }

    pub fn min_gap_time(&self) -> f64 {
        self.min_gap_time
    }

    pub fn acceleration(&self) -> f64 {
        self.acc.acceleration()
    }

    pub fn deceleration(&self) -> f64 {
        self.acc.deceleration()
    }

    /// Whether the vehicle has crashed.
    pub fn crashed(&self) -> bool {
        self.crashed
    }

    /// The ID of the vehicle ahead, if there is one.
    pub fn ahead(&self) -> Option<VehicleId> {
        self.ahead
    }

    /// The ID of the vehicle behind, if there is one.
    pub fn behind(&self) -> Option<VehicleId> {
        self.behind
    }

    /// The distance within which the vehicle reacts to the vehicle ahead.
    pub fn visibility_gap(&self) -> f64 {
        self.vel * self.visibility_time
    }

    /// The distance inside which the vehicle must slow down.
    pub fn min_gap(&self) -> f64 {
        self.vel * self.min_gap_time
    }

    /// Sets the vehicle's position and speed.
    /// The speed is clamped to the range the vehicle can drive at.
    pub(crate) fn set_location(&mut self, pos: f64, vel: f64) {
        self.pos = pos;
        self.vel = self.acc.clamp_speed(vel);
    }

    /// Moves the vehicle forward by its current speed.
    pub(crate) fn integrate(&mut self) {
        self.pos += self.vel;
    }

    /// Speeds up towards `ceiling`, capped by the top speed.
    pub(crate) fn accelerate(&mut self, ceiling: f64) {
        self.vel = self.acc.accelerate(self.vel, ceiling);
    }

    /// Slows down towards `floor`.
    pub(crate) fn decelerate(&mut self, floor: f64) {
        self.vel = self.acc.decelerate(self.vel, floor);
    }

    /// Adjusts speed to the vehicle ahead travelling at `vel`.
    pub(crate) fn follow_vehicle(&mut self, vel: f64) {
        self.vel = self.acc.follow_vehicle(self.vel, vel);
    }

    /// Stops the vehicle dead and freezes it for the rest of the simulation.
    pub(crate) fn crash(&mut self) {
        self.crashed = true;
        self.vel = 0.0;
    }
}

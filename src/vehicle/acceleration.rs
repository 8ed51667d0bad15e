/// The speed control model of a vehicle.
///
/// Speeds are in m/tick; one tick is one second.
/// Speeds change in whole steps once per tick: at most `acceleration`
/// upwards and `deceleration` downwards.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AccelerationModel {
    max_speed: f64,
    speed_tolerance: f64,
    acceleration: f64,
    deceleration: f64,
}

/// The parameters of the acceleration model.
pub struct ModelParams {
    /// The vehicle's top speed in m/tick.
    pub max_speed: f64,
    /// The closing speed tolerated versus the vehicle ahead, in m/tick.
    pub speed_tolerance: f64,
    /// The speed gained per tick when accelerating, in m/tick.
    pub acceleration: f64,
    /// The speed lost per tick when decelerating, in m/tick.
    pub deceleration: f64,
}

impl AccelerationModel {
    /// Creates a new acceleration model.
    pub fn new(params: &ModelParams) -> Self {
        AccelerationModel {
            max_speed: params.max_speed,
            speed_tolerance: params.speed_tolerance,
            acceleration: params.acceleration,
            deceleration: params.deceleration,
        }
    }

    pub fn max_speed(&self) -> f64 {
        self.max_speed
    }

    pub fn speed_tolerance(&self) -> f64 {
        self.speed_tolerance
    }

    pub fn acceleration(&self) -> f64 {
        self.acceleration
    }

    pub fn deceleration(&self) -> f64 {
        self.deceleration
    }

    /// Clamps a speed into `[0, max_speed]`.
    pub fn clamp_speed(&self, vel: f64) -> f64 {
        f64::min(f64::max(vel, 0.0), self.max_speed)
    }

    /// Calculates the speed after accelerating towards `ceiling`.
    ///
    /// The result never exceeds `ceiling` nor the vehicle's top speed.
    /// A vehicle already above the ceiling is pulled down to it.
    ///
    /// # Arguments
    /// * `vel` - The current speed of the vehicle (m/tick).
    /// * `ceiling` - The speed the vehicle may accelerate to (m/tick).
    pub fn accelerate(&self, vel: f64, ceiling: f64) -> f64 {
        f64::min(vel + self.acceleration, f64::min(ceiling, self.max_speed))
    }

    /// Calculates the speed after decelerating towards `floor`.
    ///
    /// # Arguments
    /// * `vel` - The current speed of the vehicle (m/tick).
    /// * `floor` - The speed the vehicle may slow down to (m/tick).
    pub fn decelerate(&self, vel: f64, floor: f64) -> f64 {
        f64::max(vel - self.deceleration, floor)
    }

    /// Calculates the speed needed to keep pace with a vehicle ahead travelling at `their_vel`.
    ///
    /// # Arguments
    /// * `my_vel` - The speed of the simulated vehicle (m/tick).
    /// * `their_vel` - The vehicle ahead's speed (m/tick).
    pub fn follow_vehicle(&self, my_vel: f64, their_vel: f64) -> f64 {
        let target = their_vel + self.speed_tolerance;
        if my_vel - their_vel > self.speed_tolerance {
            self.decelerate(my_vel, target)
        } else {
            self.accelerate(my_vel, target)
        }
    }
}

pub use error::{LaneError, ScenarioError};
pub use lane::Lane;
pub use output::{Format, SnapshotWriter, VehicleSnapshot};
pub use scenario::{build_lane, kmh, ScenarioConfig, VehicleProfile};
pub use simulation::{advance_one_tick, Collision, Simulation};
use slotmap::{new_key_type, SlotMap};
pub use slotmap::{Key, KeyData};
pub use vehicle::{Vehicle, VehicleAttributes};

mod error;
pub mod lane;
pub mod output;
mod scenario;
mod simulation;
mod vehicle;

new_key_type! {
    /// Unique ID of a [Vehicle].
    pub struct VehicleId;
}

type VehicleSet = SlotMap<VehicleId, Vehicle>;

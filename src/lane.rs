use crate::error::LaneError;
use crate::vehicle::{Vehicle, VehicleAttributes};
use crate::{VehicleId, VehicleSet};
use log::error;

/// A single lane of traffic: the vehicles on it and their order, front to back.
///
/// The lane owns every vehicle it creates. Order is kept as `ahead`/`behind`
/// links between vehicle IDs, so inserting and removing are O(1).
/// A created vehicle takes no part in the order until it is linked in.
#[derive(Clone, Debug, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "RawLane")
)]
pub struct Lane {
    /// All vehicles created on this lane, linked or not.
    vehicles: VehicleSet,
    /// The lead vehicle.
    front: Option<VehicleId>,
    /// The trailing vehicle.
    back: Option<VehicleId>,
    /// The number of linked vehicles.
    len: usize,
    /// The number given to the next created vehicle.
    next_number: usize,
}

impl Lane {
    /// Creates an empty lane.
    pub fn new() -> Self {
        Default::default()
    }

    /// Creates a vehicle with all attributes zero. It is not linked into the lane order.
    pub fn create(&mut self) -> VehicleId {
        self.create_with(&VehicleAttributes::default())
    }

    /// Creates a vehicle with the given attributes. It is not linked into the lane order.
    pub fn create_with(&mut self, attributes: &VehicleAttributes) -> VehicleId {
        let number = self.next_number;
        self.next_number += 1;
        self.vehicles
            .insert_with_key(|id| Vehicle::new(id, number, attributes))
    }

    /// Sets the initial position and speed of a vehicle.
    pub fn place(&mut self, id: VehicleId, pos: f64, vel: f64) -> Result<(), LaneError> {
        match self.vehicles.get_mut(id) {
            Some(vehicle) => {
                vehicle.set_location(pos, vel);
                Ok(())
            }
            None => Err(report(LaneError::UnknownVehicle(id))),
        }
    }

    /// Links a detached vehicle in at the front of the lane.
    pub fn push_front(&mut self, id: VehicleId) -> Result<(), LaneError> {
        self.check_detached(id)?;

        let old_front = self.front;
        let vehicle = &mut self.vehicles[id];
        vehicle.ahead = None;
        vehicle.behind = old_front;
        match old_front {
            Some(old_front) => self.vehicles[old_front].ahead = Some(id),
            None => self.back = Some(id),
        }
        self.front = Some(id);
        self.len += 1;
        Ok(())
    }

    /// Links a detached vehicle in at the back of the lane.
    pub fn push_back(&mut self, id: VehicleId) -> Result<(), LaneError> {
        match self.back {
            Some(back) => self.insert_behind(back, id),
            None => self.push_front(id),
        }
    }

    /// Links the detached vehicle `id` in immediately behind `anchor`.
    ///
    /// Whatever vehicle was behind `anchor` ends up behind `id`.
    pub fn insert_behind(&mut self, anchor: VehicleId, id: VehicleId) -> Result<(), LaneError> {
        if anchor == id {
            return Err(report(LaneError::SameVehicle(id)));
        }
        self.check_linked(anchor)?;
        self.check_detached(id)?;

        let behind = self.vehicles[anchor].behind;
        self.vehicles[anchor].behind = Some(id);
        let vehicle = &mut self.vehicles[id];
        vehicle.ahead = Some(anchor);
        vehicle.behind = behind;
        match behind {
            Some(behind) => self.vehicles[behind].ahead = Some(id),
            None => self.back = Some(id),
        }
        self.len += 1;
        Ok(())
    }

    /// Unlinks a vehicle from the lane order, joining up its neighbours.
    /// The vehicle itself is kept and may be linked in again.
    pub fn remove(&mut self, id: VehicleId) -> Result<(), LaneError> {
        self.check_linked(id)?;

        let vehicle = &mut self.vehicles[id];
        let ahead = vehicle.ahead.take();
        let behind = vehicle.behind.take();
        match ahead {
            Some(ahead) => self.vehicles[ahead].behind = behind,
            None => self.front = behind,
        }
        match behind {
            Some(behind) => self.vehicles[behind].ahead = ahead,
            None => self.back = ahead,
        }
        self.len -= 1;
        Ok(())
    }

    /// Releases a vehicle, unlinking it first if it is still part of the lane order.
    pub fn destroy(&mut self, id: VehicleId) -> Result<Vehicle, LaneError> {
        if self.is_linked(id) {
            self.remove(id)?;
        }
        self.vehicles
            .remove(id)
            .ok_or_else(|| report(LaneError::UnknownVehicle(id)))
    }

    /// The lead vehicle.
    pub fn front(&self) -> Option<&Vehicle> {
        self.front.map(|id| &self.vehicles[id])
    }

    /// The trailing vehicle.
    pub fn back(&self) -> Option<&Vehicle> {
        self.back.map(|id| &self.vehicles[id])
    }

    /// Gets a reference to the vehicle with the given ID.
    pub fn get(&self, id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.get(id)
    }

    /// Whether the vehicle exists, linked or not.
    pub fn contains(&self, id: VehicleId) -> bool {
        self.vehicles.contains_key(id)
    }

    /// Whether the vehicle is part of the lane order.
    pub fn is_linked(&self, id: VehicleId) -> bool {
        self.front == Some(id)
            || self
                .vehicles
                .get(id)
                .map_or(false, |vehicle| vehicle.ahead.is_some())
    }

    /// The number of vehicles in the lane order.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns an iterator over the linked vehicles, front to back.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            vehicles: &self.vehicles,
            next: self.front,
            forward: true,
        }
    }

    /// Returns an iterator over the linked vehicles, back to front.
    pub fn iter_rev(&self) -> Iter<'_> {
        Iter {
            vehicles: &self.vehicles,
            next: self.back,
            forward: false,
        }
    }

    /// The ID of the lead vehicle.
    pub(crate) fn front_id(&self) -> Option<VehicleId> {
        self.front
    }

    pub(crate) fn vehicles_mut(&mut self) -> &mut VehicleSet {
        &mut self.vehicles
    }

    fn check_linked(&self, id: VehicleId) -> Result<(), LaneError> {
        if !self.contains(id) {
            Err(report(LaneError::UnknownVehicle(id)))
        } else if !self.is_linked(id) {
            Err(report(LaneError::NotLinked(id)))
        } else {
            Ok(())
        }
    }

    fn check_detached(&self, id: VehicleId) -> Result<(), LaneError> {
        if !self.contains(id) {
            Err(report(LaneError::UnknownVehicle(id)))
        } else if self.is_linked(id) {
            Err(report(LaneError::AlreadyLinked(id)))
        } else {
            Ok(())
        }
    }

    /// Checks that the links form a single chain from `front` to `back`,
    /// that neighbours point at each other, and that unlinked vehicles have no links.
    #[cfg_attr(not(feature = "serde"), allow(dead_code))]
    fn check_links(&self) -> Result<(), LaneError> {
        let mut prev = None;
        let mut cursor = self.front;
        let mut count = 0;
        while let Some(id) = cursor {
            let vehicle = self
                .vehicles
                .get(id)
                .ok_or(LaneError::UnknownVehicle(id))?;
            if vehicle.id != id || vehicle.ahead != prev || count >= self.vehicles.len() {
                return Err(LaneError::BrokenLink(id));
            }
            count += 1;
            prev = cursor;
            cursor = vehicle.behind;
        }
        if prev != self.back || count != self.len {
            return Err(LaneError::BrokenOrder);
        }

        let linked = self
            .vehicles
            .values()
            .filter(|vehicle| vehicle.ahead.is_some() || self.front == Some(vehicle.id))
            .count();
        if linked != count {
            return Err(LaneError::BrokenOrder);
        }
        for (id, vehicle) in &self.vehicles {
            if vehicle.number >= self.next_number
                || (!self.is_linked(id) && vehicle.behind.is_some())
            {
                return Err(LaneError::BrokenLink(id));
            }
        }
        Ok(())
    }
}

/// The serialised form of a [Lane], checked before it is accepted.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawLane {
    vehicles: VehicleSet,
    front: Option<VehicleId>,
    back: Option<VehicleId>,
    len: usize,
    next_number: usize,
}

#[cfg(feature = "serde")]
impl TryFrom<RawLane> for Lane {
    type Error = LaneError;

    fn try_from(raw: RawLane) -> Result<Self, Self::Error> {
        let lane = Lane {
            vehicles: raw.vehicles,
            front: raw.front,
            back: raw.back,
            len: raw.len,
            next_number: raw.next_number,
        };
        lane.check_links().map_err(report)?;
        Ok(lane)
    }
}

impl<'a> IntoIterator for &'a Lane {
    type Item = &'a Vehicle;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iterator following the links between vehicles in a [Lane].
pub struct Iter<'a> {
    vehicles: &'a VehicleSet,
    next: Option<VehicleId>,
    forward: bool,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Vehicle;

    fn next(&mut self) -> Option<Self::Item> {
        let vehicle = self.vehicles.get(self.next?)?;
        self.next = if self.forward {
            vehicle.behind
        } else {
            vehicle.ahead
        };
        Some(vehicle)
    }
}

/// Logs a lane error before handing it back to the caller.
fn report(err: LaneError) -> LaneError {
    error!("{}", err);
    err
}

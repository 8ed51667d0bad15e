//! Tests that involve the simulation of a single lane.

use assert_approx_eq::assert_approx_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use trafsim::{
    advance_one_tick, build_lane, Lane, ScenarioConfig, Simulation, Vehicle, VehicleAttributes,
    VehicleId, VehicleProfile,
};

const EPSILON: f64 = 1e-9;

fn attributes() -> VehicleAttributes {
    VehicleAttributes {
        max_speed: 30.0,
        speed_tolerance: 1.0,
        visibility_time: 5.0,
        min_gap_time: 2.0,
        acceleration: 2.5,
        deceleration: 5.0,
    }
}

fn random_simulation(seed: u64) -> Simulation {
    let config = ScenarioConfig {
        vehicle_count: 30,
        profiles: vec![
            (VehicleProfile::Classic, 1.0),
            (VehicleProfile::Car, 1.0),
            (VehicleProfile::Truck, 1.0),
            (VehicleProfile::Bike, 1.0),
        ],
        seed: Some(seed),
        ..Default::default()
    };
    Simulation::new(build_lane(&config, &mut config.rng()).unwrap())
}

/// The state of each vehicle that the tick-to-tick properties compare.
fn state(sim: &Simulation) -> Vec<(VehicleId, f64, f64, bool)> {
    sim.iter_vehicles()
        .map(|v| (v.id(), v.pos(), v.vel(), v.crashed()))
        .collect()
}

/// Test that a vehicle's position increases monotonically.
#[test]
fn vehicle_drives_forward() {
    let mut lane = Lane::new();
    let veh = lane.create_with(&attributes());
    lane.place(veh, 0.0, 10.0).unwrap();
    lane.push_back(veh).unwrap();
    let mut sim = Simulation::new(lane);

    let mut pos = sim.get_vehicle(veh).unwrap().pos();
    for _ in 0..100 {
        sim.step();
        let next_pos = sim.get_vehicle(veh).unwrap().pos();
        assert!(next_pos > pos);
        pos = next_pos;
    }
}

/// Test that a lone vehicle gains exactly its acceleration each tick until it reaches its top speed.
#[test]
fn free_road_acceleration() {
    let mut lane = Lane::new();
    let veh = lane.create_with(&attributes());
    lane.place(veh, 0.0, 1.0).unwrap();
    lane.push_back(veh).unwrap();

    let mut vel = 1.0;
    for _ in 0..20 {
        advance_one_tick(&mut lane);
        let expected = f64::min(vel + 2.5, 30.0);
        assert_approx_eq!(lane.get(veh).unwrap().vel(), expected);
        vel = expected;
    }
    assert_approx_eq!(vel, 30.0);
}

/// Test the speed bounds and acceleration cap over long random runs.
#[test]
fn speeds_stay_in_bounds() {
    for seed in 0..10 {
        let mut sim = random_simulation(seed);
        for _ in 0..900 {
            let before = state(&sim);
            sim.step();
            for ((id, _, vel, crashed), vehicle) in before.iter().zip(sim.iter_vehicles()) {
                assert_eq!(*id, vehicle.id());
                if vehicle.crashed() {
                    continue;
                }
                assert!(!crashed);
                assert!(vehicle.vel() >= 0.0);
                assert!(vehicle.vel() <= vehicle.max_speed() + EPSILON);
                let cap = f64::max(vehicle.acceleration(), vehicle.deceleration());
                assert!((vehicle.vel() - vel).abs() <= cap + EPSILON);
            }
        }
    }
}

/// Test that crashed vehicles never move or recover.
#[test]
fn crashed_vehicles_stay_frozen() {
    for seed in 0..10 {
        let mut sim = random_simulation(seed);
        for _ in 0..900 {
            let before = state(&sim);
            sim.step();
            for ((_, pos, _, crashed), vehicle) in before.iter().zip(sim.iter_vehicles()) {
                if *crashed {
                    assert!(vehicle.crashed());
                    assert_eq!(vehicle.vel(), 0.0);
                    assert_eq!(vehicle.pos(), *pos);
                } else if !vehicle.crashed() {
                    assert!(vehicle.pos() >= *pos);
                }
            }
        }
    }
}

/// Test that a follower which ends up level with its leader crashes both vehicles.
#[test]
fn collision_trigger() {
    let mut lane = Lane::new();
    let leader = lane.create_with(&VehicleAttributes {
        acceleration: 0.0,
        ..attributes()
    });
    let follower = lane.create_with(&attributes());
    lane.place(leader, 100.0, 0.0).unwrap();
    lane.place(follower, 90.0, 10.0).unwrap();
    lane.push_back(leader).unwrap();
    lane.push_back(follower).unwrap();

    let collisions = advance_one_tick(&mut lane);
    assert_eq!(collisions.len(), 1);
    assert_eq!(collisions[0].follower, follower);
    assert_eq!(collisions[0].leader, leader);
    for id in [leader, follower] {
        let vehicle = lane.get(id).unwrap();
        assert!(vehicle.crashed());
        assert_eq!(vehicle.vel(), 0.0);
    }
}

/// Test that a follower inside its minimum gap never speeds up.
#[test]
fn gap_keeping() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..200 {
        let mut lane = Lane::new();
        let leader = lane.create_with(&attributes());
        let follower = lane.create_with(&attributes());
        let lead_vel = rng.gen_range(0.0..30.0);
        let vel = rng.gen_range(1.0..30.0);
        // Leave the follower between 1 m and its minimum gap behind after it moves
        let gap = rng.gen_range(1.0..vel * 2.0);
        lane.place(leader, 1000.0 - lead_vel, lead_vel).unwrap();
        lane.place(follower, 1000.0 - gap - vel, vel).unwrap();
        lane.push_back(leader).unwrap();
        lane.push_back(follower).unwrap();

        // The leader moves too, so the follower's gap only grows
        advance_one_tick(&mut lane);
        let vehicle = lane.get(follower).unwrap();
        assert!(!vehicle.crashed());
        assert!(vehicle.vel() <= vel);
    }
}

/// Test the reference scenario: a follower at 95 behind a stopped leader at 100.
#[test]
fn follower_brakes_behind_stopped_leader() {
    let mut lane = Lane::new();
    let leader = lane.create_with(&VehicleAttributes {
        acceleration: 0.0,
        ..attributes()
    });
    let follower = lane.create_with(&attributes());
    lane.place(leader, 100.0, 0.0).unwrap();
    // Reaches 95 after moving this tick; minimum gap is 10 * 2 = 20
    lane.place(follower, 85.0, 10.0).unwrap();
    lane.push_back(leader).unwrap();
    lane.push_back(follower).unwrap();

    advance_one_tick(&mut lane);
    let vehicle = lane.get(follower).unwrap();
    assert_approx_eq!(vehicle.pos(), 95.0);
    assert_approx_eq!(vehicle.vel(), f64::max(10.0 - 5.0, 0.0));
    assert!(!vehicle.crashed());
}

/// Test that random inserts and removals keep the links consistent.
#[test]
fn sequence_integrity() {
    let mut rng = StdRng::seed_from_u64(5);
    let mut lane = Lane::new();
    let mut linked: Vec<VehicleId> = vec![];
    let mut detached: Vec<VehicleId> = vec![];

    let first = lane.create();
    lane.push_back(first).unwrap();
    linked.push(first);

    for _ in 0..500 {
        match rng.gen_range(0..4) {
            0 | 1 => {
                let id = detached.pop().unwrap_or_else(|| lane.create());
                if linked.is_empty() {
                    lane.push_front(id).unwrap();
                } else {
                    let anchor = linked[rng.gen_range(0..linked.len())];
                    lane.insert_behind(anchor, id).unwrap();
                }
                linked.push(id);
            }
            2 if !linked.is_empty() => {
                let id = linked.swap_remove(rng.gen_range(0..linked.len()));
                lane.remove(id).unwrap();
                detached.push(id);
            }
            3 if !linked.is_empty() => {
                let id = linked.swap_remove(rng.gen_range(0..linked.len()));
                lane.destroy(id).unwrap();
                assert!(!lane.contains(id));
            }
            _ => {}
        }

        let forward = lane.iter().map(Vehicle::id).collect::<Vec<_>>();
        let mut backward = lane.iter_rev().map(Vehicle::id).collect::<Vec<_>>();
        backward.reverse();
        assert_eq!(forward, backward);
        assert_eq!(forward.len(), linked.len());
        assert_eq!(lane.len(), linked.len());
        for id in &linked {
            assert!(forward.contains(id));
        }
        for id in &detached {
            assert!(!lane.is_linked(*id));
        }
    }
}

/// Test that two runs of the same seeded scenario are identical.
#[test]
fn simulation_is_deterministic() {
    let mut a = random_simulation(99);
    let mut b = random_simulation(99);
    for _ in 0..300 {
        assert_eq!(a.step(), b.step());
    }
    assert_eq!(state(&a), state(&b));
    assert_eq!(a.tick(), 300);
}

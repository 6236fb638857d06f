//! Standard (non-gate) movement for a single fleet.
//!
//! Order within one move: engine failure roll, fuel shortfall, minefield
//! collision, fuel burn and ramscoop generation, then arrival or transit.

use rand::Rng;

use crate::fleet::refresh_spec;
use crate::fuel::{fuel_cost, fuel_generation, planned_distance};
use crate::mines::{resolve_collision, roll_events, Segment};
use crate::stargate::gate_fleet;
use crate::{
    notify, player_for, DestructionCause, Event, EventEnvelope, EventLevel, Fleet, Player, Rules,
    Target, Universe, Vector,
};

/// Positions closer than this are the same place.
const SAME_POSITION_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoveOutcome {
    /// No next waypoint, or told to wait.
    Idle,
    EngineFailure,
    /// Stopped short of waypoint 1 after covering `distance` light-years.
    InTransit { distance: f64 },
    Arrived,
    JumpRejected,
    Destroyed(DestructionCause),
}

/// Move every fleet in id order. Fleets destroyed on the way are removed.
pub(crate) fn move_fleets(
    universe: &mut Universe,
    rules: &Rules,
    rng: &mut impl Rng,
    level: EventLevel,
    events: &mut Vec<EventEnvelope>,
) {
    let fleet_ids: Vec<_> = universe.fleets.keys().copied().collect();
    for fleet_id in fleet_ids {
        let Some(mut fleet) = universe.fleets.remove(&fleet_id) else {
            continue;
        };
        let jumping = fleet.waypoints.get(1).is_some_and(crate::Waypoint::uses_stargate);
        let outcome = if jumping {
            gate_fleet(universe, &mut fleet, rules, rng, events)
        } else {
            move_fleet(universe, &mut fleet, rules, rng, level, events)
        };
        if let MoveOutcome::Destroyed(cause) = outcome {
            tracing::debug!(fleet = %fleet_id, ?cause, "fleet destroyed during movement");
            notify(
                universe,
                fleet.owner,
                Event::FleetDestroyed {
                    fleet: fleet_id,
                    cause,
                },
                events,
            );
        } else {
            universe.fleets.insert(fleet_id, fleet);
        }
    }
}

pub(crate) fn stop(fleet: &mut Fleet) {
    fleet.heading = Vector::ZERO;
    fleet.warp_speed = 0;
}

/// Whether a fleet sits still this turn instead of heading for waypoint 1.
pub(crate) fn holds_position(fleet: &Fleet) -> bool {
    fleet.waypoints.len() < 2 || fleet.waypoints[0].wait_at_waypoint
}

/// Move one fleet toward its next waypoint.
///
/// The fleet must already be detached from `universe.fleets`.
pub fn move_fleet(
    universe: &mut Universe,
    fleet: &mut Fleet,
    rules: &Rules,
    rng: &mut impl Rng,
    level: EventLevel,
    events: &mut Vec<EventEnvelope>,
) -> MoveOutcome {
    if holds_position(fleet) {
        stop(fleet);
        return MoveOutcome::Idle;
    }
    let player = player_for(universe, fleet.owner).clone();
    let target = fleet.waypoints[1].position;
    let total = fleet.position.distance_to(target);

    if engine_fails(universe, fleet, &player, rng, level, events) {
        stop(fleet);
        return MoveOutcome::EngineFailure;
    }

    let requested_warp = fleet.waypoints[1].warp_speed;
    let mut distance = planned_distance(fleet.position, &fleet.waypoints[1]);
    let cost = fuel_cost(fleet, &universe.designs, &player, requested_warp, distance);
    let shortfall = cost > fleet.fuel;
    if shortfall {
        distance *= f64::from(fleet.fuel) / f64::from(cost);
    }

    let segment = Segment {
        target,
        distance,
        warp_speed: requested_warp,
    };
    let collision = resolve_collision(
        fleet,
        &player,
        &universe.mine_fields,
        &universe.designs,
        rules,
        segment,
        rng,
    );
    for event in roll_events(fleet.id, &collision, level) {
        notify(universe, fleet.owner, event, events);
    }
    if let Some(hit) = &collision.hit {
        distance = collision.distance;
        fleet.struck_mine_field = true;
        refresh_spec(fleet, &universe.designs);
        notify(
            universe,
            fleet.owner,
            Event::FleetHitMineField {
                fleet: fleet.id,
                mine_field: hit.mine_field,
                ships_destroyed: hit.ships_destroyed,
                damage: hit.damage,
            },
            events,
        );
        if fleet.is_destroyed() {
            return MoveOutcome::Destroyed(DestructionCause::MineField);
        }
    }

    // Fuel is charged for the distance actually flown, after any mine hit.
    let mut warp_speed = requested_warp;
    let generated = if shortfall && collision.hit.is_none() {
        warp_speed = fleet.spec.free_speed;
        let factor = f64::from(fleet.fuel) / f64::from(cost);
        run_out_of_fuel(universe, fleet, rules, factor, events)
    } else {
        let burned = fuel_cost(fleet, &universe.designs, &player, requested_warp, distance);
        if burned > fleet.fuel {
            warp_speed = fleet.spec.free_speed;
            let factor = f64::from(fleet.fuel) / f64::from(burned);
            run_out_of_fuel(universe, fleet, rules, factor, events)
        } else {
            fleet.fuel -= burned;
            fuel_generation(fleet, &universe.designs, rules, warp_speed, distance)
        }
    };
    add_generated_fuel(universe, fleet, generated, events);

    if collision.hit.is_none() && distance >= total {
        complete_move(universe, fleet, events);
        return MoveOutcome::Arrived;
    }
    advance(fleet, target, distance, warp_speed);
    MoveOutcome::InTransit { distance }
}

/// Empty the tank after flying the affordable `factor` of the turn and drop to
/// free speed.
///
/// Returns the fuel scooped while coasting for the rest of the turn.
fn run_out_of_fuel(
    universe: &mut Universe,
    fleet: &mut Fleet,
    rules: &Rules,
    factor: f64,
    events: &mut Vec<EventEnvelope>,
) -> i32 {
    fleet.fuel = 0;
    let free_speed = fleet.spec.free_speed;
    fleet.waypoints[1].warp_speed = free_speed;
    let coasting = (1.0 - factor) * f64::from(free_speed * free_speed);
    notify(
        universe,
        fleet.owner,
        Event::FleetOutOfFuel {
            fleet: fleet.id,
            warp_speed: free_speed,
        },
        events,
    );
    fuel_generation(fleet, &universe.designs, rules, free_speed, coasting)
}

/// Top up the tank with scooped fuel, capped by the tank's headroom.
fn add_generated_fuel(
    universe: &mut Universe,
    fleet: &mut Fleet,
    generated: i32,
    events: &mut Vec<EventEnvelope>,
) {
    let generated = generated.min(fleet.spec.fuel_capacity - fleet.fuel);
    if generated <= 0 {
        return;
    }
    fleet.fuel += generated;
    notify(
        universe,
        fleet.owner,
        Event::FleetGeneratedFuel {
            fleet: fleet.id,
            amount: generated,
        },
        events,
    );
}

/// Roll for engine failure when travelling above the race's reliable speed.
fn engine_fails(
    universe: &mut Universe,
    fleet: &Fleet,
    player: &Player,
    rng: &mut impl Rng,
    level: EventLevel,
    events: &mut Vec<EventEnvelope>,
) -> bool {
    let failure_rate = player.race.engine_failure_rate;
    if failure_rate <= 0.0 || fleet.waypoints[1].warp_speed <= player.race.engine_reliable_speed {
        return false;
    }
    let rolled: f64 = rng.gen();
    if level == EventLevel::Debug {
        notify(
            universe,
            fleet.owner,
            Event::EngineFailureRoll {
                fleet: fleet.id,
                failure_rate,
                rolled,
            },
            events,
        );
    }
    if rolled >= failure_rate {
        return false;
    }
    notify(
        universe,
        fleet.owner,
        Event::FleetEngineFailure { fleet: fleet.id },
        events,
    );
    true
}

/// Move part of the way toward `target`, leaving a mid-space waypoint behind.
fn advance(fleet: &mut Fleet, target: Vector, distance: f64, warp_speed: u32) {
    if distance <= 0.0 {
        stop(fleet);
        return;
    }
    let heading = (target - fleet.position).normalized();
    fleet.position = (fleet.position + heading.scale(distance)).round();
    fleet.orbiting = None;

    let departed = &mut fleet.waypoints[0];
    departed.position = fleet.position;
    departed.target = Target::None;
    departed.partially_complete = true;
    departed.clear_task();

    if fleet.struck_mine_field {
        stop(fleet);
    } else {
        fleet.heading = heading;
        fleet.warp_speed = warp_speed;
    }
}

/// Finish a move at waypoint 1: relocate, settle orbit, pop waypoint 0.
///
/// Shared by normal travel and stargate jumps.
pub fn complete_move(universe: &mut Universe, fleet: &mut Fleet, events: &mut Vec<EventEnvelope>) {
    let mut departed = fleet.waypoints.remove(0);
    let arrived_target = fleet.waypoints[0].target;
    fleet.position = fleet.waypoints[0].position;
    fleet.orbiting = None;

    match arrived_target {
        Target::Planet(planet_id) => {
            if let Some(planet) = universe.planets.get(&planet_id) {
                fleet.position = planet.position;
                fleet.orbiting = Some(planet_id);
            }
        }
        Target::Fleet(other_id) => {
            // The other fleet may already have moved on this turn.
            if let Some(other) = universe.fleets.get(&other_id) {
                if same_position(other.position, fleet.position) {
                    fleet.orbiting = other.orbiting;
                }
            }
        }
        Target::Wormhole(wormhole_id) => {
            let exit = universe
                .wormholes
                .get(&wormhole_id)
                .and_then(|wormhole| universe.wormholes.get(&wormhole.destination));
            if let Some(exit) = exit {
                let exit_id = exit.id;
                fleet.position = exit.position;
                notify(
                    universe,
                    fleet.owner,
                    Event::WormholeTraversed {
                        fleet: fleet.id,
                        wormhole: wormhole_id,
                        exit: exit_id,
                    },
                    events,
                );
            }
        }
        Target::None | Target::Salvage(_) => {}
    }
    if fleet.orbiting.is_none() {
        fleet.orbiting = universe
            .planets
            .values()
            .find(|planet| same_position(planet.position, fleet.position))
            .map(|planet| planet.id);
    }
    fleet.waypoints[0].position = fleet.position;

    if fleet.repeat_orders && !departed.partially_complete {
        departed.processed = 0;
        departed.wait_at_waypoint = false;
        fleet.waypoints.push(departed);
    }
    stop(fleet);

    tracing::debug!(fleet = %fleet.id, x = fleet.position.x, y = fleet.position.y, "fleet arrived");
    notify(
        universe,
        fleet.owner,
        Event::FleetArrived {
            fleet: fleet.id,
            position: fleet.position,
            target: arrived_target,
        },
        events,
    );
}

/// Positions that round to the same point share a location.
pub(crate) fn same_position(a: Vector, b: Vector) -> bool {
    a.distance_to(b) < SAME_POSITION_EPSILON
}

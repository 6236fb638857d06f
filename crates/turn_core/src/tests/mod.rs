use super::*;
use crate::test_fixtures::{base_rules, base_universe, make_rng, FREIGHTER_FLEET, PLAYER_ONE};
use rand::rngs::mock::StepRng;

mod cargo_tasks;
mod scrap_colonize;

// --- Shared test helpers ------------------------------------------------

/// Every draw reads as 0.0: every roll succeeds.
fn always_roll_low() -> StepRng {
    StepRng::new(0, 0)
}

/// Every draw reads just under 1.0: every roll fails.
fn always_roll_high() -> StepRng {
    StepRng::new(u64::MAX, 0)
}

fn step(universe: &mut Universe) -> Vec<EventEnvelope> {
    run_turn(
        universe,
        &[],
        &base_rules(),
        &mut make_rng(),
        EventLevel::Normal,
    )
}

fn step_with(universe: &mut Universe, orders: &[OrderEnvelope]) -> Vec<EventEnvelope> {
    run_turn(
        universe,
        orders,
        &base_rules(),
        &mut make_rng(),
        EventLevel::Normal,
    )
}

/// Point a fleet at a route. Waypoint 0 is pinned to the fleet's position.
fn set_route(universe: &mut Universe, fleet_id: FleetId, waypoints: Vec<Waypoint>) {
    let fleet = universe.fleets.get_mut(&fleet_id).unwrap();
    fleet.waypoints = waypoints;
    fleet.waypoints[0].position = fleet.position;
}

/// A waypoint at `position` carrying transport orders for `target`.
fn transport_at(
    position: Vector,
    target: Target,
    warp_speed: u32,
    tasks: &[(CargoType, TransportAction, i32)],
) -> Waypoint {
    let mut waypoint = Waypoint::targeting(position, target, warp_speed);
    waypoint.task = WaypointTask::Transport;
    for &(kind, action, amount) in tasks {
        waypoint
            .transport_tasks
            .set(kind, TransportTask::new(action, amount));
    }
    waypoint
}

fn order(universe: &Universe, issued_by: PlayerId, order: Order) -> OrderEnvelope {
    OrderEnvelope {
        id: OrderId("ord_000001".to_string()),
        issued_by,
        turn: universe.meta.turn,
        order,
    }
}

fn freighter(universe: &Universe) -> &Fleet {
    &universe.fleets[&FREIGHTER_FLEET]
}

fn freighter_mut(universe: &mut Universe) -> &mut Fleet {
    universe.fleets.get_mut(&FREIGHTER_FLEET).unwrap()
}

fn player_one_mut(universe: &mut Universe) -> &mut Player {
    universe.players.get_mut(&PLAYER_ONE).unwrap()
}

fn setup() -> Universe {
    base_universe()
}

use rand::Rng;

use crate::fleet::refresh_spec;
use crate::movement::move_fleets;
use crate::orders::apply_orders;
use crate::waypoint_tasks::{colonize_phase, load_phase, scrap_phase, unload_phase};
use crate::{EventEnvelope, EventLevel, OrderEnvelope, Rules, Universe};

/// One step of turn generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    ApplyOrders,
    ResetWaypointFlags,
    ScrapAtWaypoint0,
    ColonizeAtWaypoint0,
    UnloadAtWaypoint0,
    LoadAtWaypoint0,
    /// Merge, route and packet phases owned by other systems.
    AfterWaypoint0Load,
    Movement,
    /// Production, research and growth.
    AfterMovement,
    UnloadAtWaypoint1,
    ColonizeAtWaypoint1,
    ScrapAtWaypoint1,
    LoadAtWaypoint1,
    /// Mine laying, repair, patrol and scanning.
    AfterWaypoint1Load,
}

/// Phase order. Later systems rely on it; do not reorder.
pub const TURN_PHASES: [TurnPhase; 14] = [
    TurnPhase::ApplyOrders,
    TurnPhase::ResetWaypointFlags,
    TurnPhase::ScrapAtWaypoint0,
    TurnPhase::ColonizeAtWaypoint0,
    TurnPhase::UnloadAtWaypoint0,
    TurnPhase::LoadAtWaypoint0,
    TurnPhase::AfterWaypoint0Load,
    TurnPhase::Movement,
    TurnPhase::AfterMovement,
    TurnPhase::UnloadAtWaypoint1,
    TurnPhase::ColonizeAtWaypoint1,
    TurnPhase::ScrapAtWaypoint1,
    TurnPhase::LoadAtWaypoint1,
    TurnPhase::AfterWaypoint1Load,
];

/// Slots where systems outside this crate run inside a turn.
///
/// Every method defaults to doing nothing. Events pushed here are returned with
/// the rest of the turn's events; use [`crate::emit`] to stamp them.
pub trait TurnHooks {
    fn after_waypoint0_load<R: Rng>(
        &mut self,
        _universe: &mut Universe,
        _rules: &Rules,
        _rng: &mut R,
        _events: &mut Vec<EventEnvelope>,
    ) {
    }

    fn after_movement<R: Rng>(
        &mut self,
        _universe: &mut Universe,
        _rules: &Rules,
        _rng: &mut R,
        _events: &mut Vec<EventEnvelope>,
    ) {
    }

    fn after_waypoint1_load<R: Rng>(
        &mut self,
        _universe: &mut Universe,
        _rules: &Rules,
        _rng: &mut R,
        _events: &mut Vec<EventEnvelope>,
    ) {
    }
}

/// Runs only the phases in this crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExternalPhases;

impl TurnHooks for NoExternalPhases {}

/// Generate one turn.
///
/// Phases run in [`TURN_PHASES`] order. Returns every event produced this turn.
pub fn run_turn(
    universe: &mut Universe,
    orders: &[OrderEnvelope],
    rules: &Rules,
    rng: &mut impl Rng,
    event_level: EventLevel,
) -> Vec<EventEnvelope> {
    run_turn_with_hooks(universe, orders, rules, rng, event_level, &mut NoExternalPhases)
}

/// [`run_turn`] with external systems slotted into their phases.
pub fn run_turn_with_hooks<R: Rng, H: TurnHooks>(
    universe: &mut Universe,
    orders: &[OrderEnvelope],
    rules: &Rules,
    rng: &mut R,
    event_level: EventLevel,
    hooks: &mut H,
) -> Vec<EventEnvelope> {
    let mut events = Vec::new();

    for phase in TURN_PHASES {
        tracing::debug!(turn = universe.meta.turn, ?phase, "running phase");
        match phase {
            TurnPhase::ApplyOrders => apply_orders(universe, orders, &mut events),
            TurnPhase::ResetWaypointFlags => reset_waypoint_flags(universe),
            TurnPhase::ScrapAtWaypoint0 | TurnPhase::ScrapAtWaypoint1 => {
                scrap_phase(universe, rules, &mut events);
            }
            TurnPhase::ColonizeAtWaypoint0 | TurnPhase::ColonizeAtWaypoint1 => {
                colonize_phase(universe, rules, &mut events);
            }
            TurnPhase::UnloadAtWaypoint0 | TurnPhase::UnloadAtWaypoint1 => {
                unload_phase(universe, &mut events);
            }
            TurnPhase::LoadAtWaypoint0 | TurnPhase::LoadAtWaypoint1 => {
                load_phase(universe, &mut events);
            }
            TurnPhase::AfterWaypoint0Load => {
                hooks.after_waypoint0_load(universe, rules, rng, &mut events);
            }
            TurnPhase::Movement => move_fleets(universe, rules, rng, event_level, &mut events),
            TurnPhase::AfterMovement => hooks.after_movement(universe, rules, rng, &mut events),
            TurnPhase::AfterWaypoint1Load => {
                hooks.after_waypoint1_load(universe, rules, rng, &mut events);
            }
        }
    }

    tracing::debug!(
        turn = universe.meta.turn,
        events = events.len(),
        fleets = universe.fleets.len(),
        "turn generated"
    );
    universe.meta.turn += 1;
    events
}

/// Clear per-turn transient state and refresh design-derived specs.
fn reset_waypoint_flags(universe: &mut Universe) {
    for fleet in universe.fleets.values_mut() {
        refresh_spec(fleet, &universe.designs);
        fleet.struck_mine_field = false;
        for waypoint in &mut fleet.waypoints {
            waypoint.processed = 0;
        }
    }
}

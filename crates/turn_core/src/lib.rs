//! `turn_core`: deterministic fleet movement and cargo transport, one turn at a time.
//!
//! No IO, no network. All randomness via the passed-in Rng.

pub mod cargo;
mod engine;
pub mod fleet;
pub mod fuel;
pub mod mines;
mod movement;
mod orders;
mod stargate;
pub mod transport;
mod types;
mod vector;
mod waypoint_tasks;

#[cfg(any(test, feature = "test-support"))]
pub mod test_fixtures;

pub use cargo::{transfer, Capacity, Cargo, CargoHolder, CargoType, TransferError};
pub use engine::{
    run_turn, run_turn_with_hooks, NoExternalPhases, TurnHooks, TurnPhase, TURN_PHASES,
};
pub use fuel::{estimated_range, fuel_cost, EstimatedRange};
pub use movement::{complete_move, move_fleet, MoveOutcome};
pub use stargate::{gate_fleet, overgate_damage_fraction, overgate_vanish_chance};
pub use types::*;
pub use vector::Vector;

/// Stamp an event with the next sequential id.
pub fn emit(counters: &mut Counters, turn: u32, player: PlayerId, event: Event) -> EventEnvelope {
    let id = EventId(format!("evt_{:06}", counters.next_event_id));
    counters.next_event_id += 1;
    EventEnvelope {
        id,
        turn,
        player,
        event,
    }
}

/// Queue a notification for `player` on the universe's current turn.
pub(crate) fn notify(
    universe: &mut Universe,
    player: PlayerId,
    event: Event,
    events: &mut Vec<EventEnvelope>,
) {
    let turn = universe.meta.turn;
    events.push(emit(&mut universe.counters, turn, player, event));
}

/// Returns the owning player of a fleet.
///
/// Panics if the player is missing; fleets are only created for known players.
pub(crate) fn player_for(universe: &Universe, id: PlayerId) -> &Player {
    universe
        .players
        .get(&id)
        .unwrap_or_else(|| panic!("player '{id}' not found in universe"))
}

#[cfg(test)]
mod tests;

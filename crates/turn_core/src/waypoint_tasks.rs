//! Waypoint task phases: scrap, colonize, unload and load at waypoint 0.
//!
//! Each phase walks fleets in id order and runs at most once per waypoint per
//! turn; the waypoint's processed bitset records which phases already ran.

use crate::cargo::{transfer, CargoHolder, CargoType, TransferError};
use crate::fleet::design_for;
use crate::fuel::route_fuel_required;
use crate::movement::same_position;
use crate::transport::{
    dunnage_transfer, load_transfer, optimal_fuel_transfer, unload_transfer, Transfer,
    TransferContext,
};
use crate::{
    notify, player_for, Cargo, ColonizeFailure, DestructionCause, Event, EventEnvelope, Fleet,
    FleetId, Rules, Salvage, SalvageId, Target, TransportAction, TransportCancel, Universe,
    WaypointPhase, WaypointTask,
};

/// Detach each fleet in turn, let `handle` work on it, and put it back unless
/// `handle` consumed it.
fn for_each_fleet(
    universe: &mut Universe,
    events: &mut Vec<EventEnvelope>,
    mut handle: impl FnMut(&mut Universe, &mut Fleet, &mut Vec<EventEnvelope>) -> bool,
) {
    let fleet_ids: Vec<FleetId> = universe.fleets.keys().copied().collect();
    for fleet_id in fleet_ids {
        let Some(mut fleet) = universe.fleets.remove(&fleet_id) else {
            continue;
        };
        let consumed = handle(universe, &mut fleet, events);
        if !consumed {
            universe.fleets.insert(fleet_id, fleet);
        }
    }
}

/// Claim `phase` on waypoint 0. False if there is no waypoint or it already ran.
fn claim(fleet: &mut Fleet, phase: WaypointPhase) -> bool {
    match fleet.waypoints.first_mut() {
        Some(waypoint) if !waypoint.is_processed(phase) => {
            waypoint.mark_processed(phase);
            true
        }
        _ => false,
    }
}

fn current_task(fleet: &Fleet) -> WaypointTask {
    fleet
        .waypoints
        .first()
        .map_or(WaypointTask::None, |waypoint| waypoint.task)
}

// ---------------------------------------------------------------------------
// Scrap and colonize
// ---------------------------------------------------------------------------

/// Minerals recovered from breaking up every ship in the fleet.
fn salvaged_minerals(fleet: &Fleet, universe: &Universe, rules: &Rules) -> Cargo {
    fleet
        .tokens
        .iter()
        .map(|token| {
            let design = design_for(&universe.designs, token.design);
            design
                .mineral_cost
                .minerals()
                .scaled(rules.scrap_mineral_fraction * f64::from(token.quantity))
        })
        .fold(Cargo::default(), |total, minerals| total + minerals)
}

pub(crate) fn scrap_phase(universe: &mut Universe, rules: &Rules, events: &mut Vec<EventEnvelope>) {
    for_each_fleet(universe, events, |universe, fleet, events| {
        if current_task(fleet) != WaypointTask::Scrap || !claim(fleet, WaypointPhase::Scrap) {
            return false;
        }
        scrap_fleet(universe, fleet, rules, events);
        true
    });
}

fn scrap_fleet(
    universe: &mut Universe,
    fleet: &Fleet,
    rules: &Rules,
    events: &mut Vec<EventEnvelope>,
) {
    let recovered = fleet.cargo + salvaged_minerals(fleet, universe, rules);
    let orbited = fleet
        .orbiting
        .and_then(|id| universe.planets.get_mut(&id));
    let (planet, salvage) = if let Some(planet) = orbited {
        planet.cargo += recovered;
        (Some(planet.id), None)
    } else {
        let salvage_id = SalvageId(universe.counters.next_salvage_id);
        universe.counters.next_salvage_id += 1;
        universe.salvage.insert(
            salvage_id,
            Salvage {
                id: salvage_id,
                owner: fleet.owner,
                position: fleet.position,
                cargo: recovered,
            },
        );
        (None, Some(salvage_id))
    };
    tracing::debug!(fleet = %fleet.id, "fleet scrapped");
    notify(
        universe,
        fleet.owner,
        Event::FleetScrapped {
            fleet: fleet.id,
            planet,
            salvage,
        },
        events,
    );
    notify(
        universe,
        fleet.owner,
        Event::FleetDestroyed {
            fleet: fleet.id,
            cause: DestructionCause::Scrapped,
        },
        events,
    );
}

pub(crate) fn colonize_phase(
    universe: &mut Universe,
    rules: &Rules,
    events: &mut Vec<EventEnvelope>,
) {
    for_each_fleet(universe, events, |universe, fleet, events| {
        if current_task(fleet) != WaypointTask::Colonize || !claim(fleet, WaypointPhase::Colonize)
        {
            return false;
        }
        match check_colonize(universe, fleet) {
            Ok(planet_id) => {
                colonize(universe, fleet, planet_id, rules, events);
                true
            }
            Err(reason) => {
                fleet.waypoints[0].clear_task();
                notify(
                    universe,
                    fleet.owner,
                    Event::ColonizeFailed {
                        fleet: fleet.id,
                        reason,
                    },
                    events,
                );
                false
            }
        }
    });
}

fn check_colonize(universe: &Universe, fleet: &Fleet) -> Result<crate::PlanetId, ColonizeFailure> {
    let Target::Planet(planet_id) = fleet.waypoints[0].target else {
        return Err(ColonizeFailure::NotAtPlanet);
    };
    let planet = universe
        .planets
        .get(&planet_id)
        .filter(|_| fleet.orbiting == Some(planet_id))
        .ok_or(ColonizeFailure::NotAtPlanet)?;
    if planet.owner.is_some() {
        return Err(ColonizeFailure::PlanetOwned);
    }
    if fleet.cargo.colonists <= 0 {
        return Err(ColonizeFailure::NoColonists);
    }
    let has_colonizer = fleet
        .tokens
        .iter()
        .any(|token| design_for(&universe.designs, token.design).colonizer);
    if !has_colonizer {
        return Err(ColonizeFailure::NoColonizer);
    }
    Ok(planet_id)
}

fn colonize(
    universe: &mut Universe,
    fleet: &Fleet,
    planet_id: crate::PlanetId,
    rules: &Rules,
    events: &mut Vec<EventEnvelope>,
) {
    let delivered = fleet.cargo + salvaged_minerals(fleet, universe, rules);
    if let Some(planet) = universe.planets.get_mut(&planet_id) {
        planet.owner = Some(fleet.owner);
        planet.cargo += delivered;
    }
    tracing::debug!(fleet = %fleet.id, planet = %planet_id, "planet colonized");
    notify(
        universe,
        fleet.owner,
        Event::PlanetColonized {
            fleet: fleet.id,
            planet: planet_id,
        },
        events,
    );
    notify(
        universe,
        fleet.owner,
        Event::FleetDestroyed {
            fleet: fleet.id,
            cause: DestructionCause::Colonized,
        },
        events,
    );
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

fn holder(universe: &Universe, target: Target) -> Option<&dyn CargoHolder> {
    match target {
        Target::Planet(id) => universe.planets.get(&id).map(|p| p as &dyn CargoHolder),
        Target::Fleet(id) => universe.fleets.get(&id).map(|f| f as &dyn CargoHolder),
        Target::Salvage(id) => universe.salvage.get(&id).map(|s| s as &dyn CargoHolder),
        Target::None | Target::Wormhole(_) => None,
    }
}

fn holder_mut(universe: &mut Universe, target: Target) -> Option<&mut dyn CargoHolder> {
    match target {
        Target::Planet(id) => universe
            .planets
            .get_mut(&id)
            .map(|p| p as &mut dyn CargoHolder),
        Target::Fleet(id) => universe
            .fleets
            .get_mut(&id)
            .map(|f| f as &mut dyn CargoHolder),
        Target::Salvage(id) => universe
            .salvage
            .get_mut(&id)
            .map(|s| s as &mut dyn CargoHolder),
        Target::None | Target::Wormhole(_) => None,
    }
}

/// The waypoint target a transport task may trade with.
///
/// Must be a planet the fleet's owner holds, one of the owner's fleets, or
/// salvage, at the fleet's position.
fn transport_target(universe: &Universe, fleet: &Fleet) -> Result<Target, TransportCancel> {
    let target = fleet.waypoints[0].target;
    let (position, owner) = match target {
        Target::Planet(id) => {
            let planet = universe.planets.get(&id).ok_or(TransportCancel::TargetMissing)?;
            (planet.position, planet.owner)
        }
        Target::Fleet(id) => {
            let other = universe.fleets.get(&id).ok_or(TransportCancel::TargetMissing)?;
            (other.position, Some(other.owner))
        }
        Target::Salvage(id) => {
            let salvage = universe.salvage.get(&id).ok_or(TransportCancel::TargetMissing)?;
            (salvage.position, Some(fleet.owner))
        }
        Target::None | Target::Wormhole(_) => return Err(TransportCancel::NoTarget),
    };
    if !same_position(position, fleet.position) {
        return Err(TransportCancel::TargetNotHere);
    }
    if owner != Some(fleet.owner) {
        return Err(TransportCancel::TargetNotOwned);
    }
    Ok(target)
}

fn context(fleet: &Fleet, destination: &dyn CargoHolder, kind: CargoType) -> TransferContext {
    let (held, capacity) = match kind {
        CargoType::Fuel => (fleet.fuel, fleet.spec.fuel_capacity),
        _ => (fleet.cargo.get(kind), fleet.spec.cargo_capacity),
    };
    TransferContext {
        held,
        capacity,
        free: fleet.free_capacity(kind).clamp(i32::MAX),
        dest_held: destination.available(kind),
        dest_free: destination.free_capacity(kind),
    }
}

/// Carry out a signed transfer between the fleet and its target.
fn execute(
    universe: &mut Universe,
    fleet: &mut Fleet,
    target: Target,
    kind: CargoType,
    amount: i32,
) -> Result<(), TransferError> {
    let Some(destination) = holder_mut(universe, target) else {
        return Ok(());
    };
    if amount > 0 {
        transfer(destination, fleet, kind, amount)
    } else {
        transfer(fleet, destination, kind, -amount)
    }
}

fn apply_transfer(
    universe: &mut Universe,
    fleet: &mut Fleet,
    target: Target,
    kind: CargoType,
    planned: Transfer,
    events: &mut Vec<EventEnvelope>,
) {
    if planned.amount == 0 {
        return;
    }
    let event = match execute(universe, fleet, target, kind, planned.amount) {
        Ok(()) => Event::CargoTransferred {
            fleet: fleet.id,
            target,
            kind,
            amount: planned.amount,
        },
        Err(err) => {
            tracing::warn!(fleet = %fleet.id, %kind, %err, "cargo transfer rejected");
            Event::CargoTransferRejected {
                fleet: fleet.id,
                kind,
                reason: err.to_string(),
            }
        }
    };
    notify(universe, fleet.owner, event, events);
}

/// Resolve the transport target, or cancel the task with a notification.
fn resolve_or_cancel(
    universe: &mut Universe,
    fleet: &mut Fleet,
    events: &mut Vec<EventEnvelope>,
) -> Option<Target> {
    match transport_target(universe, fleet) {
        Ok(target) => Some(target),
        Err(reason) => {
            tracing::debug!(fleet = %fleet.id, ?reason, "transport task cancelled");
            fleet.waypoints[0].clear_task();
            notify(
                universe,
                fleet.owner,
                Event::TransportTaskCancelled {
                    fleet: fleet.id,
                    reason,
                },
                events,
            );
            None
        }
    }
}

pub(crate) fn unload_phase(universe: &mut Universe, events: &mut Vec<EventEnvelope>) {
    for_each_fleet(universe, events, |universe, fleet, events| {
        if current_task(fleet) != WaypointTask::Transport || !claim(fleet, WaypointPhase::Unload)
        {
            return false;
        }
        unload(universe, fleet, events);
        false
    });
}

fn unload(universe: &mut Universe, fleet: &mut Fleet, events: &mut Vec<EventEnvelope>) {
    let Some(target) = resolve_or_cancel(universe, fleet, events) else {
        return;
    };
    let tasks = fleet.waypoints[0].transport_tasks;
    let mut wait = false;
    for kind in CargoType::ALL {
        let Some(destination) = holder(universe, target) else {
            return;
        };
        let planned = unload_transfer(tasks.get(kind), &context(fleet, destination, kind));
        wait |= planned.wait;
        apply_transfer(universe, fleet, target, kind, planned, events);
    }
    fleet.waypoints[0].wait_at_waypoint = wait;
}

pub(crate) fn load_phase(universe: &mut Universe, events: &mut Vec<EventEnvelope>) {
    for_each_fleet(universe, events, |universe, fleet, events| {
        if current_task(fleet) != WaypointTask::Transport || !claim(fleet, WaypointPhase::Load) {
            return false;
        }
        load(universe, fleet, events);
        false
    });
}

fn load(universe: &mut Universe, fleet: &mut Fleet, events: &mut Vec<EventEnvelope>) {
    let Some(target) = resolve_or_cancel(universe, fleet, events) else {
        return;
    };
    let tasks = fleet.waypoints[0].transport_tasks;
    let mut wait = false;
    for kind in CargoType::ALL {
        let task = tasks.get(kind);
        let Some(destination) = holder(universe, target) else {
            return;
        };
        let planned = if kind == CargoType::Fuel && task.action == TransportAction::LoadOptimal {
            let player = player_for(universe, fleet.owner);
            let required = route_fuel_required(fleet, &universe.designs, player);
            optimal_fuel_transfer(fleet.fuel, required, destination.free_capacity(kind))
        } else {
            load_transfer(task, &context(fleet, destination, kind))
        };
        wait |= planned.wait;
        apply_transfer(universe, fleet, target, kind, planned, events);
    }

    // Dunnage fills what the other tasks left, in hold order.
    for kind in CargoType::HOLD {
        if tasks.get(kind).action != TransportAction::LoadDunnage {
            continue;
        }
        let Some(destination) = holder(universe, target) else {
            return;
        };
        let planned = dunnage_transfer(&context(fleet, destination, kind));
        apply_transfer(universe, fleet, target, kind, planned, events);
    }
    fleet.waypoints[0].wait_at_waypoint |= wait;
}


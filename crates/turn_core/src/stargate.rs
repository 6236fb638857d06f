//! Stargate jumps.
//!
//! Eligibility is checked in a fixed order and the first failure rejects the
//! jump with no state change. Past the checks, races whose ships vanish in the
//! void pay for overgating: a per-ship vanish roll, then deterministic damage
//! for the survivors.

use rand::Rng;

use crate::fleet::{apply_token_damage, design_for, drop_empty_tokens, refresh_spec, remove_ships};
use crate::movement::{complete_move, holds_position, stop, MoveOutcome};
use crate::{
    notify, player_for, DestructionCause, Event, EventEnvelope, Fleet, PlanetId, Player, Rules,
    StargateRejection, Target, Universe,
};

/// Everything a jump needs once it has passed the eligibility checks.
#[derive(Debug, Clone, Copy, PartialEq)]
struct GateRoute {
    source: PlanetId,
    destination: PlanetId,
    distance: f64,
    safe_range: f64,
    safe_hull_mass: i32,
}

/// Jump a fleet from its orbited gate to the gate targeted by waypoint 1.
///
/// The fleet must already be detached from `universe.fleets`.
pub fn gate_fleet(
    universe: &mut Universe,
    fleet: &mut Fleet,
    rules: &Rules,
    rng: &mut impl Rng,
    events: &mut Vec<EventEnvelope>,
) -> MoveOutcome {
    if holds_position(fleet) {
        stop(fleet);
        return MoveOutcome::Idle;
    }
    let player = player_for(universe, fleet.owner).clone();
    let route = match check_route(universe, fleet, &player, rules) {
        Ok(route) => route,
        Err(reason) => {
            tracing::debug!(fleet = %fleet.id, ?reason, "stargate jump rejected");
            stop(fleet);
            notify(
                universe,
                fleet.owner,
                Event::StargateJumpRejected {
                    fleet: fleet.id,
                    reason,
                },
                events,
            );
            return MoveOutcome::JumpRejected;
        }
    };

    if !player.race.can_gate_cargo && !fleet.cargo.is_empty() {
        let dumped = std::mem::take(&mut fleet.cargo);
        if let Some(planet) = universe.planets.get_mut(&route.source) {
            planet.cargo += dumped;
        }
        notify(
            universe,
            fleet.owner,
            Event::StargateCargoDumped {
                fleet: fleet.id,
                planet: route.source,
                cargo: dumped,
            },
            events,
        );
    }

    let ships_lost = if player.race.ships_vanish_in_void {
        let lost = apply_overgate_penalty(universe, fleet, &route, rules, rng);
        refresh_spec(fleet, &universe.designs);
        lost
    } else {
        0
    };
    if fleet.is_destroyed() {
        return MoveOutcome::Destroyed(DestructionCause::Stargate);
    }

    notify(
        universe,
        fleet.owner,
        Event::StargateJump {
            fleet: fleet.id,
            source: route.source,
            destination: route.destination,
            ships_lost,
        },
        events,
    );
    complete_move(universe, fleet, events);
    MoveOutcome::Arrived
}

fn check_route(
    universe: &Universe,
    fleet: &Fleet,
    player: &Player,
    rules: &Rules,
) -> Result<GateRoute, StargateRejection> {
    let (source_id, source, source_gate) = fleet
        .orbiting
        .and_then(|id| universe.planets.get(&id))
        .and_then(|planet| Some((planet.id, planet, planet.stargate.as_ref()?)))
        .ok_or(StargateRejection::NoSourceGate)?;
    let (destination_id, destination, destination_gate) = match fleet.waypoints[1].target {
        Target::Planet(id) => universe
            .planets
            .get(&id)
            .and_then(|planet| Some((planet.id, planet, planet.stargate.as_ref()?))),
        _ => None,
    }
    .ok_or(StargateRejection::NoDestinationGate)?;

    if !source.owner.is_some_and(|owner| player.is_friend(owner)) {
        return Err(StargateRejection::SourceNotFriendly);
    }
    if !destination.owner.is_some_and(|owner| player.is_friend(owner)) {
        return Err(StargateRejection::DestinationNotFriendly);
    }
    if fleet.cargo.colonists > 0 && source.owner != Some(player.id) {
        return Err(StargateRejection::ColonistsAtForeignGate);
    }

    let distance = source.position.distance_to(destination.position);
    if distance > source_gate.safe_range * rules.stargate_max_range_factor {
        return Err(StargateRejection::OutOfRange);
    }
    let safe_hull_mass = source_gate.safe_hull_mass.min(destination_gate.safe_hull_mass);
    let mass_limit = f64::from(safe_hull_mass) * rules.stargate_max_hull_mass_factor;
    let too_massive = fleet
        .tokens
        .iter()
        .any(|token| f64::from(design_for(&universe.designs, token.design).mass) > mass_limit);
    if too_massive {
        return Err(StargateRejection::TooMassive);
    }

    Ok(GateRoute {
        source: source_id,
        destination: destination_id,
        distance,
        safe_range: source_gate.safe_range,
        safe_hull_mass,
    })
}

/// How far `value` runs past `safe`, as a fraction of `safe`.
fn excess_ratio(value: f64, safe: f64) -> f64 {
    if safe <= 0.0 {
        return 0.0;
    }
    ((value - safe) / safe).max(0.0)
}

/// Chance one ship vanishes, combining independent range and mass overages.
pub fn overgate_vanish_chance(
    distance: f64,
    safe_range: f64,
    mass: i32,
    safe_hull_mass: i32,
    rules: &Rules,
) -> f64 {
    let p_range =
        (excess_ratio(distance, safe_range) * rules.overgate_vanish_per_excess).clamp(0.0, 1.0);
    let p_mass = (excess_ratio(f64::from(mass), f64::from(safe_hull_mass))
        * rules.overgate_vanish_per_excess)
        .clamp(0.0, 1.0);
    1.0 - (1.0 - p_range) * (1.0 - p_mass)
}

/// Fraction of armor lost by a ship that survives an overgate.
pub fn overgate_damage_fraction(
    distance: f64,
    safe_range: f64,
    mass: i32,
    safe_hull_mass: i32,
    rules: &Rules,
) -> f64 {
    let cap = rules.overgate_max_damage_fraction;
    let d_range =
        (excess_ratio(distance, safe_range) * rules.overgate_damage_per_excess).clamp(0.0, cap);
    let d_mass = (excess_ratio(f64::from(mass), f64::from(safe_hull_mass))
        * rules.overgate_damage_per_excess)
        .clamp(0.0, cap);
    1.0 - (1.0 - d_range) * (1.0 - d_mass)
}

/// Roll each ship for vanishing, then damage the survivors. Returns ships lost.
fn apply_overgate_penalty(
    universe: &Universe,
    fleet: &mut Fleet,
    route: &GateRoute,
    rules: &Rules,
    rng: &mut impl Rng,
) -> u32 {
    let mut lost = 0;
    for token in &mut fleet.tokens {
        let design = design_for(&universe.designs, token.design);
        let vanish = overgate_vanish_chance(
            route.distance,
            route.safe_range,
            design.mass,
            route.safe_hull_mass,
            rules,
        );
        if vanish > 0.0 {
            let vanished = (0..token.quantity)
                .filter(|_| rng.gen::<f64>() < vanish)
                .count();
            let vanished = u32::try_from(vanished).unwrap_or(token.quantity);
            remove_ships(token, vanished);
            lost += vanished;
        }

        let damage = overgate_damage_fraction(
            route.distance,
            route.safe_range,
            design.mass,
            route.safe_hull_mass,
            rules,
        );
        if damage > 0.0 {
            lost += apply_token_damage(token, f64::from(design.armor) * damage, design.armor);
        }
    }
    drop_empty_tokens(fleet);
    lost
}


//! Fuel and movement model.
//!
//! The per-stack fuel formula mixes `floor` and `ceil` in a fixed order. Keep it
//! exactly as written: algebraically equivalent rewrites drift by one unit at
//! boundary values and break replay against other implementations.

use std::collections::BTreeMap;

use crate::fleet::design_for;
use crate::{DesignId, Fleet, Player, Rules, ShipDesign, Vector, Waypoint, STARGATE_WARP_SPEED};

/// Reference distance used when projecting range.
pub const RANGE_REFERENCE_DISTANCE: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EstimatedRange {
    Finite(i32),
    Infinite,
}

/// Fuel cost for one design moving `mass` kT a given distance.
#[allow(clippy::cast_possible_truncation)]
pub fn design_fuel_cost(
    design: &ShipDesign,
    player: &Player,
    warp_speed: u32,
    mass: f64,
    distance: f64,
) -> i32 {
    let Some(engine) = &design.engine else {
        return 0;
    };
    if warp_speed == 0 || warp_speed == STARGATE_WARP_SPEED {
        return 0;
    }
    let Some(&usage) = usize::try_from(warp_speed)
        .ok()
        .and_then(|warp| engine.fuel_usage.get(warp))
    else {
        return 0;
    };
    let ife_factor = 1.0 - player.race.fuel_efficiency_offset;
    let engine_efficiency = (ife_factor * f64::from(usage)).ceil();
    let distance_ceiling = distance.ceil();
    ((mass * engine_efficiency * distance_ceiling / 2000.0).floor() / 10.0).ceil() as i32
}

/// Fuel needed for the whole fleet to cover `distance` at `warp_speed`.
///
/// Each stack carries its own mass plus a share of the fleet's cargo in
/// proportion to its share of total cargo capacity.
pub fn fuel_cost(
    fleet: &Fleet,
    designs: &BTreeMap<DesignId, ShipDesign>,
    player: &Player,
    warp_speed: u32,
    distance: f64,
) -> i32 {
    if warp_speed == 0 || warp_speed == STARGATE_WARP_SPEED {
        return 0;
    }
    let fleet_cargo = f64::from(fleet.cargo.total());
    let fleet_capacity = f64::from(fleet.spec.cargo_capacity);
    fleet
        .tokens
        .iter()
        .map(|token| {
            let design = design_for(designs, token.design);
            let quantity = f64::from(token.quantity);
            let cargo_share = if fleet_capacity > 0.0 {
                f64::from(design.cargo_capacity) * quantity / fleet_capacity
            } else {
                0.0
            };
            let mass = f64::from(design.mass) * quantity + fleet_cargo * cargo_share;
            design_fuel_cost(design, player, warp_speed, mass, distance)
        })
        .sum()
}

/// How far the fleet could go at `warp_speed` on its current fuel.
#[allow(clippy::cast_possible_truncation)]
pub fn estimated_range(
    fleet: &Fleet,
    designs: &BTreeMap<DesignId, ShipDesign>,
    player: &Player,
    warp_speed: u32,
) -> EstimatedRange {
    if warp_speed == 0 {
        return EstimatedRange::Finite(0);
    }
    let cost = fuel_cost(fleet, designs, player, warp_speed, RANGE_REFERENCE_DISTANCE);
    if cost == 0 {
        return EstimatedRange::Infinite;
    }
    EstimatedRange::Finite(
        (f64::from(fleet.fuel) / f64::from(cost) * RANGE_REFERENCE_DISTANCE) as i32,
    )
}

/// Fuel needed to fly the remaining waypoint legs with the current cargo.
pub fn route_fuel_required(
    fleet: &Fleet,
    designs: &BTreeMap<DesignId, ShipDesign>,
    player: &Player,
) -> i32 {
    let mut from = fleet.position;
    let mut required = 0;
    for waypoint in fleet.waypoints.iter().skip(1) {
        required += fuel_cost(
            fleet,
            designs,
            player,
            waypoint.warp_speed,
            from.distance_to(waypoint.position),
        );
        from = waypoint.position;
    }
    required
}

/// Distance a fleet may cover toward `waypoint` this turn, before fuel limits.
///
/// Warp squared, rounded up to the full remaining distance when the fleet would
/// otherwise stop less than a light-year short, and never past the target.
pub fn planned_distance(position: Vector, waypoint: &Waypoint) -> f64 {
    let total = position.distance_to(waypoint.position);
    let mut distance = f64::from(waypoint.warp_speed * waypoint.warp_speed);
    if distance < total && total - distance < 1.0 {
        distance = total.ceil();
    }
    distance.min(total)
}

/// Fuel scooped by ramscoop engines travelling `distance` at `warp_speed`.
#[allow(clippy::cast_possible_truncation)]
pub fn fuel_generation(
    fleet: &Fleet,
    designs: &BTreeMap<DesignId, ShipDesign>,
    rules: &Rules,
    warp_speed: u32,
    distance: f64,
) -> i32 {
    if warp_speed == 0 || distance <= 0.0 {
        return 0;
    }
    fleet
        .tokens
        .iter()
        .filter_map(|token| {
            let design = design_for(designs, token.design);
            let engine = design.engine.as_ref()?;
            if !engine.ramscoop || warp_speed > engine.free_speed {
                return None;
            }
            let per_ship = (distance * rules.ramscoop_fuel_per_light_year).floor() as i32;
            Some(per_ship * i32::try_from(token.quantity).unwrap_or(i32::MAX))
        })
        .sum()
}

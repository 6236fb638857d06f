//! Minefield collision along a planned travel segment.

use std::collections::BTreeMap;

use rand::Rng;

use crate::fleet::{apply_token_damage, design_for, drop_empty_tokens};
use crate::{
    DesignId, EventLevel, Fleet, MineField, MineFieldId, MineFieldStats, Player, Rules, ShipDesign,
    Vector,
};

/// A planned straight-line move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub target: Vector,
    pub distance: f64,
    pub warp_speed: u32,
}

/// Outcome of running a segment through the minefields.
#[derive(Debug, Clone, PartialEq)]
pub struct Collision {
    /// Distance actually travelled: the full segment when nothing was hit.
    pub distance: f64,
    pub hit: Option<MineFieldHit>,
    /// Debug-level record of every roll, in draw order.
    pub rolls: Vec<(MineFieldId, f64, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MineFieldHit {
    pub mine_field: MineFieldId,
    pub ships_destroyed: u32,
    pub damage: i32,
}

/// Where a segment crosses a circle, as distances along the segment.
///
/// Returns `(entry, exit)` clipped to `[0, length]`, or `None` if the segment
/// never enters the circle.
pub fn segment_intersection(
    start: Vector,
    heading: Vector,
    length: f64,
    center: Vector,
    radius: f64,
) -> Option<(f64, f64)> {
    if length <= 0.0 || radius <= 0.0 {
        return None;
    }
    let offset = start - center;
    let b = offset.dot(heading);
    let c = offset.dot(offset) - radius * radius;
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    let root = discriminant.sqrt();
    let entry = (-b - root).max(0.0);
    let exit = (-b + root).min(length);
    if exit < 0.0 || entry > length || exit <= entry {
        return None;
    }
    Some((entry, exit))
}

/// Chance of striking a mine over `in_field` light-years at `warp_speed`.
pub fn hit_chance(stats: &MineFieldStats, warp_speed: u32, in_field: f64) -> f64 {
    if warp_speed <= stats.max_speed {
        return 0.0;
    }
    let per_light_year =
        (stats.chance_per_warp * f64::from(warp_speed - stats.max_speed)).clamp(0.0, 1.0);
    1.0 - (1.0 - per_light_year).powf(in_field.ceil())
}

/// Run a planned segment through every minefield the fleet's owner is not friendly with.
///
/// Fields are checked in id order with one draw per field crossed at an unsafe
/// speed. The first hit truncates the segment at the field's edge and damages
/// the fleet. A fleet already inside the field stops one light-year into its
/// path instead.
pub fn resolve_collision(
    fleet: &mut Fleet,
    player: &Player,
    mine_fields: &BTreeMap<MineFieldId, MineField>,
    designs: &BTreeMap<DesignId, ShipDesign>,
    rules: &Rules,
    segment: Segment,
    rng: &mut impl Rng,
) -> Collision {
    let distance = segment.distance;
    let mut collision = Collision {
        distance,
        hit: None,
        rolls: Vec::new(),
    };
    let heading = (segment.target - fleet.position).normalized();
    for field in mine_fields.values() {
        if player.is_friend(field.owner) {
            continue;
        }
        let Some(stats) = rules.mine_field_stats.get(&field.kind) else {
            continue;
        };
        let Some((entry, exit)) =
            segment_intersection(fleet.position, heading, distance, field.position, field.radius())
        else {
            continue;
        };
        let p = hit_chance(stats, segment.warp_speed, exit - entry);
        if p <= 0.0 {
            continue;
        }
        let rolled: f64 = rng.gen();
        collision.rolls.push((field.id, p, rolled));
        if rolled < p {
            let (ships_destroyed, damage) = apply_mine_damage(fleet, stats, designs);
            let inside = fleet.position.distance_to(field.position) < field.radius();
            collision.distance = if inside { (entry + 1.0).min(exit) } else { entry };
            collision.hit = Some(MineFieldHit {
                mine_field: field.id,
                ships_destroyed,
                damage,
            });
            break;
        }
    }
    collision
}

/// Damage every ship in the fleet per the field's per-engine table.
///
/// Each ship takes its engine damage; when the fleet total falls short of the
/// field's fleet minimum, the minimum is spread evenly instead.
#[allow(clippy::cast_possible_truncation)]
pub fn apply_mine_damage(
    fleet: &mut Fleet,
    stats: &MineFieldStats,
    designs: &BTreeMap<DesignId, ShipDesign>,
) -> (u32, i32) {
    let total_ships = fleet.total_ships();
    if total_ships == 0 {
        return (0, 0);
    }
    let has_ramscoop = fleet.tokens.iter().any(|token| {
        design_for(designs, token.design)
            .engine
            .as_ref()
            .is_some_and(|engine| engine.ramscoop)
    });
    let fleet_minimum = if has_ramscoop {
        stats.min_damage_per_fleet_ramscoop
    } else {
        stats.min_damage_per_fleet
    };
    let minimum_per_ship = f64::from(fleet_minimum) / f64::from(total_ships);

    let mut destroyed = 0;
    let mut total_damage = 0.0;
    for token in &mut fleet.tokens {
        let design = design_for(designs, token.design);
        let per_engine = match &design.engine {
            Some(engine) if engine.ramscoop => stats.damage_per_engine_ramscoop,
            Some(_) => stats.damage_per_engine,
            None => 0,
        };
        let engine_damage = f64::from(per_engine) * f64::from(design.engine_count);
        let per_ship = engine_damage.max(minimum_per_ship);
        total_damage += per_ship * f64::from(token.quantity);
        destroyed += apply_token_damage(token, per_ship, design.armor);
    }
    drop_empty_tokens(fleet);
    (destroyed, total_damage.round() as i32)
}

/// Debug-level payload for the rolls made during a collision check.
pub(crate) fn roll_events(
    fleet: crate::FleetId,
    collision: &Collision,
    level: EventLevel,
) -> Vec<crate::Event> {
    if level != EventLevel::Debug {
        return Vec::new();
    }
    collision
        .rolls
        .iter()
        .map(|&(mine_field, p, rolled)| crate::Event::MineFieldRoll {
            fleet,
            mine_field,
            p,
            rolled,
        })
        .collect()
}

//! Fleet bookkeeping: design lookups, derived specs and token damage.

use std::collections::BTreeMap;

use crate::{DesignId, Fleet, FleetSpec, ShipDesign, ShipToken};

/// Returns the design for a token.
///
/// Panics if the design is missing: tokens are built by upstream collaborators
/// and a dangling design reference means the universe is corrupt.
pub fn design_for(designs: &BTreeMap<DesignId, ShipDesign>, id: DesignId) -> &ShipDesign {
    designs
        .get(&id)
        .unwrap_or_else(|| panic!("design '{id}' not found in universe"))
}

/// Sum design statistics over every token in the fleet.
pub fn compute_fleet_spec(fleet: &Fleet, designs: &BTreeMap<DesignId, ShipDesign>) -> FleetSpec {
    let mut spec = FleetSpec::default();
    let mut slowest_free_speed: Option<u32> = None;
    for token in &fleet.tokens {
        let design = design_for(designs, token.design);
        let quantity = i32::try_from(token.quantity).unwrap_or(i32::MAX);
        spec.mass += design.mass * quantity;
        spec.cargo_capacity += design.cargo_capacity * quantity;
        spec.fuel_capacity += design.fuel_capacity * quantity;
        if let Some(engine) = &design.engine {
            slowest_free_speed = Some(
                slowest_free_speed.map_or(engine.free_speed, |speed| speed.min(engine.free_speed)),
            );
        }
    }
    spec.free_speed = slowest_free_speed.unwrap_or(0);
    spec
}

pub(crate) fn refresh_spec(fleet: &mut Fleet, designs: &BTreeMap<DesignId, ShipDesign>) {
    fleet.spec = compute_fleet_spec(fleet, designs);
}

/// Spread `per_ship` damage over every ship of a token.
///
/// Damage is pooled across the stack: whole ships are destroyed for every
/// `armor` points accumulated and the remainder is shared by the survivors.
/// Returns the number of ships destroyed.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn apply_token_damage(token: &mut ShipToken, per_ship: f64, armor: i32) -> u32 {
    if token.quantity == 0 || per_ship <= 0.0 {
        return 0;
    }
    let armor = f64::from(armor.max(1));
    let pooled =
        token.damage * f64::from(token.quantity_damaged) + per_ship * f64::from(token.quantity);
    let destroyed = ((pooled / armor).floor() as u32).min(token.quantity);
    token.quantity -= destroyed;
    if token.quantity == 0 {
        token.quantity_damaged = 0;
        token.damage = 0.0;
    } else {
        let remaining = pooled - f64::from(destroyed) * armor;
        token.quantity_damaged = token.quantity;
        token.damage = remaining / f64::from(token.quantity);
    }
    destroyed
}

/// Destroy `count` ships from a token, preferring damaged ones.
pub fn remove_ships(token: &mut ShipToken, count: u32) {
    let count = count.min(token.quantity);
    token.quantity -= count;
    token.quantity_damaged = token.quantity_damaged.saturating_sub(count);
    if token.quantity_damaged == 0 {
        token.damage = 0.0;
    }
}

pub(crate) fn drop_empty_tokens(fleet: &mut Fleet) {
    fleet.tokens.retain(|token| token.quantity > 0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{base_universe, FREIGHTER_FLEET};

    fn token(quantity: u32) -> ShipToken {
        ShipToken {
            design: DesignId(1),
            quantity,
            quantity_damaged: 0,
            damage: 0.0,
        }
    }

    #[test]
    fn spec_sums_tokens_and_takes_slowest_engine() {
        let universe = base_universe();
        let fleet = &universe.fleets[&FREIGHTER_FLEET];
        let spec = compute_fleet_spec(fleet, &universe.designs);
        assert_eq!(spec.cargo_capacity, 120);
        assert_eq!(spec.fuel_capacity, 500);
        assert_eq!(spec.mass, 100);
        assert_eq!(spec.free_speed, 4);
    }

    #[test]
    #[should_panic(expected = "not found in universe")]
    fn missing_design_is_fatal() {
        let mut universe = base_universe();
        universe.designs.clear();
        let fleet = &universe.fleets[&FREIGHTER_FLEET];
        compute_fleet_spec(fleet, &universe.designs);
    }

    #[test]
    fn pooled_damage_destroys_whole_ships_and_spreads_remainder() {
        let mut stack = token(4);
        let destroyed = apply_token_damage(&mut stack, 30.0, 100);
        assert_eq!(destroyed, 1);
        assert_eq!(stack.quantity, 3);
        assert_eq!(stack.quantity_damaged, 3);
        assert!((stack.damage - 20.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn damage_at_armor_destroys_stack() {
        let mut stack = token(3);
        assert_eq!(apply_token_damage(&mut stack, 100.0, 100), 3);
        assert_eq!(stack.quantity, 0);
    }

    #[test]
    fn remove_ships_takes_damaged_first() {
        let mut stack = token(5);
        stack.quantity_damaged = 2;
        stack.damage = 10.0;
        remove_ships(&mut stack, 3);
        assert_eq!(stack.quantity, 2);
        assert_eq!(stack.quantity_damaged, 0);
        assert!(stack.damage.abs() < f64::EPSILON);
    }
}

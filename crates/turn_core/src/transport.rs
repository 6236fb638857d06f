//! Transport task interpreter.
//!
//! Pure functions: given both sides of a transfer and a declared task, compute
//! how much moves and whether the fleet must wait. Amounts are signed from the
//! fleet's point of view: positive loads into the fleet, negative unloads.
//! Every result is the minimum of all applicable bounds.

use crate::cargo::Capacity;
use crate::{TransportAction, TransportTask};

/// Both sides of a single-type transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferContext {
    /// Amount of this type the fleet holds.
    pub held: i32,
    /// Fleet capacity for this type (cargo hold or fuel tank).
    pub capacity: i32,
    /// Room left in the fleet for this type.
    pub free: i32,
    /// Amount the destination holds.
    pub dest_held: Capacity,
    /// Room left at the destination.
    pub dest_free: Capacity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Transfer {
    pub amount: i32,
    pub wait: bool,
}

impl Transfer {
    const NONE: Transfer = Transfer {
        amount: 0,
        wait: false,
    };

    fn load(amount: i32) -> Self {
        Self {
            amount: amount.max(0),
            wait: false,
        }
    }

    fn unload(amount: i32) -> Self {
        Self {
            amount: -amount.max(0),
            wait: false,
        }
    }
}

fn percent_of(percent: i32, capacity: i32) -> i32 {
    let scaled = i64::from(percent) * i64::from(capacity) / 100;
    i32::try_from(scaled).unwrap_or(i32::MAX)
}

/// Load-phase evaluation of a non-dunnage task.
pub fn load_transfer(task: TransportTask, ctx: &TransferContext) -> Transfer {
    match task.action {
        TransportAction::LoadAll => Transfer::load(ctx.dest_held.clamp(ctx.free)),
        TransportAction::LoadAmount => {
            if task.amount <= 0 {
                return Transfer::NONE;
            }
            Transfer::load(ctx.dest_held.clamp(task.amount.min(ctx.free)))
        }
        TransportAction::FillPercent | TransportAction::WaitForPercent => {
            let target = percent_of(task.amount, ctx.capacity);
            if task.amount <= 0 || ctx.held >= target {
                return Transfer::NONE;
            }
            let gap = target - ctx.held;
            let mut transfer = Transfer::load(ctx.dest_held.clamp(gap.min(ctx.free)));
            if task.action == TransportAction::WaitForPercent {
                transfer.wait = transfer.amount < gap;
            }
            transfer
        }
        TransportAction::SetAmountTo => {
            if task.amount <= 0 || ctx.held >= task.amount {
                return Transfer::NONE;
            }
            let gap = task.amount - ctx.held;
            let mut transfer = Transfer::load(ctx.dest_held.clamp(gap.min(ctx.free)));
            transfer.wait = transfer.amount < gap;
            transfer
        }
        TransportAction::SetWaypointTo => {
            // Take back whatever the destination holds above its requested level.
            let Capacity::Limited(dest_held) = ctx.dest_held else {
                return Transfer::NONE;
            };
            if task.amount <= 0 || dest_held <= task.amount {
                return Transfer::NONE;
            }
            Transfer::load((dest_held - task.amount).min(ctx.free))
        }
        TransportAction::None
        | TransportAction::LoadOptimal
        | TransportAction::LoadDunnage
        | TransportAction::UnloadAll
        | TransportAction::UnloadAmount => Transfer::NONE,
    }
}

/// Unload-phase evaluation.
pub fn unload_transfer(task: TransportTask, ctx: &TransferContext) -> Transfer {
    match task.action {
        TransportAction::UnloadAll => Transfer::unload(ctx.dest_free.clamp(ctx.held)),
        TransportAction::UnloadAmount => {
            if task.amount <= 0 {
                return Transfer::NONE;
            }
            Transfer::unload(ctx.dest_free.clamp(task.amount.min(ctx.held)))
        }
        TransportAction::SetWaypointTo => {
            let Capacity::Limited(dest_held) = ctx.dest_held else {
                return Transfer::NONE;
            };
            if task.amount <= 0 || dest_held >= task.amount {
                return Transfer::NONE;
            }
            let gap = task.amount - dest_held;
            let mut transfer = Transfer::unload(ctx.dest_free.clamp(gap.min(ctx.held)));
            transfer.wait = -transfer.amount < gap;
            transfer
        }
        TransportAction::SetAmountTo => {
            // Drop whatever the fleet holds above its requested level.
            if task.amount <= 0 || ctx.held <= task.amount {
                return Transfer::NONE;
            }
            Transfer::unload(ctx.dest_free.clamp(ctx.held - task.amount))
        }
        TransportAction::None
        | TransportAction::LoadOptimal
        | TransportAction::LoadAll
        | TransportAction::LoadAmount
        | TransportAction::FillPercent
        | TransportAction::WaitForPercent
        | TransportAction::LoadDunnage => Transfer::NONE,
    }
}

/// `LoadOptimal` for fuel: hand surplus beyond the route's needs to the destination.
///
/// No-op when the destination's tank is unlimited (planets with starbases).
pub fn optimal_fuel_transfer(fuel: i32, route_required: i32, dest_fuel_free: Capacity) -> Transfer {
    if dest_fuel_free.is_unlimited() {
        return Transfer::NONE;
    }
    let surplus = fuel - route_required;
    if surplus <= 0 {
        return Transfer::NONE;
    }
    Transfer::unload(dest_fuel_free.clamp(surplus))
}

/// `LoadDunnage`: fill whatever room the other tasks left.
pub fn dunnage_transfer(ctx: &TransferContext) -> Transfer {
    Transfer::load(ctx.dest_held.clamp(ctx.free))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(held: i32, capacity: i32, dest_held: Capacity) -> TransferContext {
        TransferContext {
            held,
            capacity,
            free: capacity - held,
            dest_held,
            dest_free: Capacity::Unlimited,
        }
    }

    fn task(action: TransportAction, amount: i32) -> TransportTask {
        TransportTask::new(action, amount)
    }

    #[test]
    fn load_all_is_bounded_by_free_capacity() {
        let transfer = load_transfer(
            task(TransportAction::LoadAll, 0),
            &ctx(0, 120, Capacity::Limited(1000)),
        );
        assert_eq!(transfer.amount, 120);
        assert!(!transfer.wait);
    }

    #[test]
    fn load_all_is_bounded_by_available() {
        let transfer = load_transfer(
            task(TransportAction::LoadAll, 0),
            &ctx(0, 120, Capacity::Limited(30)),
        );
        assert_eq!(transfer.amount, 30);
    }

    #[test]
    fn load_amount_takes_minimum_of_three_bounds() {
        let bounds = ctx(100, 120, Capacity::Limited(1000));
        assert_eq!(
            load_transfer(task(TransportAction::LoadAmount, 50), &bounds).amount,
            20
        );
        let bounds = ctx(0, 120, Capacity::Limited(1000));
        assert_eq!(
            load_transfer(task(TransportAction::LoadAmount, 50), &bounds).amount,
            50
        );
    }

    #[test]
    fn zero_amount_is_noop() {
        let bounds = ctx(0, 120, Capacity::Limited(1000));
        for action in [
            TransportAction::LoadAmount,
            TransportAction::FillPercent,
            TransportAction::WaitForPercent,
            TransportAction::SetAmountTo,
        ] {
            assert_eq!(load_transfer(task(action, 0), &bounds), Transfer::NONE);
        }
        assert_eq!(
            unload_transfer(task(TransportAction::UnloadAmount, 0), &bounds),
            Transfer::NONE
        );
    }

    #[test]
    fn fill_percent_truncates_target() {
        // 33% of 100 = 33
        let transfer = load_transfer(
            task(TransportAction::FillPercent, 33),
            &ctx(10, 100, Capacity::Limited(1000)),
        );
        assert_eq!(transfer.amount, 23);
        assert!(!transfer.wait);
    }

    #[test]
    fn fill_percent_above_target_is_noop() {
        let transfer = load_transfer(
            task(TransportAction::FillPercent, 50),
            &ctx(60, 100, Capacity::Limited(1000)),
        );
        assert_eq!(transfer, Transfer::NONE);
    }

    #[test]
    fn wait_for_percent_waits_when_short() {
        let transfer = load_transfer(
            task(TransportAction::WaitForPercent, 50),
            &ctx(0, 100, Capacity::Limited(20)),
        );
        assert_eq!(transfer.amount, 20);
        assert!(transfer.wait);

        let satisfied = load_transfer(
            task(TransportAction::WaitForPercent, 50),
            &ctx(0, 100, Capacity::Limited(80)),
        );
        assert_eq!(satisfied.amount, 50);
        assert!(!satisfied.wait);
    }

    #[test]
    fn set_amount_to_waits_when_destination_is_short() {
        let transfer = load_transfer(
            task(TransportAction::SetAmountTo, 20),
            &ctx(10, 120, Capacity::Limited(5)),
        );
        assert_eq!(transfer.amount, 5);
        assert!(transfer.wait);
    }

    #[test]
    fn set_amount_to_unloads_excess() {
        let transfer = unload_transfer(
            task(TransportAction::SetAmountTo, 20),
            &ctx(50, 120, Capacity::Limited(0)),
        );
        assert_eq!(transfer.amount, -30);
    }

    #[test]
    fn unload_all_respects_destination_room() {
        let mut bounds = ctx(80, 120, Capacity::Limited(0));
        bounds.dest_free = Capacity::Limited(25);
        assert_eq!(
            unload_transfer(task(TransportAction::UnloadAll, 0), &bounds).amount,
            -25
        );
        bounds.dest_free = Capacity::Unlimited;
        assert_eq!(
            unload_transfer(task(TransportAction::UnloadAll, 0), &bounds).amount,
            -80
        );
    }

    #[test]
    fn unload_amount_bounded_by_held() {
        let bounds = ctx(15, 120, Capacity::Limited(0));
        assert_eq!(
            unload_transfer(task(TransportAction::UnloadAmount, 40), &bounds).amount,
            -15
        );
    }

    #[test]
    fn set_waypoint_to_tops_up_destination() {
        let bounds = ctx(30, 120, Capacity::Limited(10));
        let transfer = unload_transfer(task(TransportAction::SetWaypointTo, 100), &bounds);
        assert_eq!(transfer.amount, -30);
        assert!(transfer.wait);

        let bounds = ctx(200, 300, Capacity::Limited(10));
        let transfer = unload_transfer(task(TransportAction::SetWaypointTo, 100), &bounds);
        assert_eq!(transfer.amount, -90);
        assert!(!transfer.wait);
    }

    #[test]
    fn set_waypoint_to_loads_destination_excess() {
        let bounds = ctx(0, 120, Capacity::Limited(150));
        let transfer = load_transfer(task(TransportAction::SetWaypointTo, 100), &bounds);
        assert_eq!(transfer.amount, 50);
    }

    #[test]
    fn optimal_fuel_gives_away_surplus() {
        let transfer = optimal_fuel_transfer(300, 120, Capacity::Limited(100));
        assert_eq!(transfer.amount, -100);
        let transfer = optimal_fuel_transfer(300, 120, Capacity::Limited(500));
        assert_eq!(transfer.amount, -180);
    }

    #[test]
    fn optimal_fuel_is_noop_for_starbases_and_short_fleets() {
        assert_eq!(
            optimal_fuel_transfer(300, 120, Capacity::Unlimited),
            Transfer::NONE
        );
        assert_eq!(
            optimal_fuel_transfer(100, 120, Capacity::Limited(500)),
            Transfer::NONE
        );
    }

    #[test]
    fn dunnage_fills_remaining_room() {
        let transfer = dunnage_transfer(&ctx(90, 120, Capacity::Limited(1000)));
        assert_eq!(transfer.amount, 30);
    }
}

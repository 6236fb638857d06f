use crate::{
    notify, Event, EventEnvelope, FleetId, Order, OrderEnvelope, OrderId, OrderRejection, PlayerId,
    Universe, Waypoint, MAX_WARP_SPEED, STARGATE_WARP_SPEED,
};

/// Apply player orders addressed to the current turn. Orders for other turns
/// are ignored; invalid ones are rejected with a notification to the issuer.
pub(crate) fn apply_orders(
    universe: &mut Universe,
    orders: &[OrderEnvelope],
    events: &mut Vec<EventEnvelope>,
) {
    let current_turn = universe.meta.turn;

    for envelope in orders {
        if envelope.turn != current_turn {
            continue;
        }
        let result = match &envelope.order {
            Order::SetWaypoints { fleet, waypoints } => {
                set_waypoints(universe, envelope.issued_by, *fleet, waypoints)
            }
            Order::SetRepeatOrders { fleet, repeat } => {
                owned_fleet(universe, envelope.issued_by, *fleet).map(|fleet| {
                    fleet.repeat_orders = *repeat;
                })
            }
        };
        if let Err(reason) = result {
            reject(universe, envelope.issued_by, &envelope.id, reason, events);
        }
    }
}

fn owned_fleet(
    universe: &mut Universe,
    issued_by: PlayerId,
    fleet_id: FleetId,
) -> Result<&mut crate::Fleet, OrderRejection> {
    let fleet = universe
        .fleets
        .get_mut(&fleet_id)
        .ok_or(OrderRejection::UnknownFleet)?;
    if fleet.owner != issued_by {
        return Err(OrderRejection::NotOwner);
    }
    Ok(fleet)
}

/// Replace a fleet's waypoint queue. Waypoint 0 is pinned to where the fleet is.
fn set_waypoints(
    universe: &mut Universe,
    issued_by: PlayerId,
    fleet_id: FleetId,
    waypoints: &[Waypoint],
) -> Result<(), OrderRejection> {
    if waypoints.is_empty() {
        return Err(OrderRejection::EmptyWaypoints);
    }
    let valid_speed = |warp: u32| warp <= MAX_WARP_SPEED || warp == STARGATE_WARP_SPEED;
    if !waypoints.iter().all(|waypoint| valid_speed(waypoint.warp_speed)) {
        return Err(OrderRejection::InvalidWarpSpeed);
    }
    let fleet = owned_fleet(universe, issued_by, fleet_id)?;
    fleet.waypoints = waypoints.to_vec();
    for waypoint in &mut fleet.waypoints {
        waypoint.processed = 0;
        waypoint.partially_complete = false;
        waypoint.wait_at_waypoint = false;
    }
    fleet.waypoints[0].position = fleet.position;
    Ok(())
}

fn reject(
    universe: &mut Universe,
    player: PlayerId,
    order: &OrderId,
    reason: OrderRejection,
    events: &mut Vec<EventEnvelope>,
) {
    tracing::warn!(order = %order.0, %player, ?reason, "order rejected");
    notify(
        universe,
        player,
        Event::OrderRejected {
            order: order.clone(),
            reason,
        },
        events,
    );
}

use super::*;
use crate::test_fixtures::{fleet_of, COLONY_SHIP, HOME_PLANET, WILD_PLANET};

fn with_task(position: Vector, target: Target, task: WaypointTask) -> Waypoint {
    let mut waypoint = Waypoint::targeting(position, target, 0);
    waypoint.task = task;
    waypoint
}

/// A loaded colony ship in orbit at the unowned world.
fn colony_fleet_at_wild(universe: &mut Universe) -> FleetId {
    let wild = universe.planets[&WILD_PLANET].position;
    let mut colonists = fleet_of(universe, FleetId(2), COLONY_SHIP, 1);
    colonists.position = wild;
    colonists.orbiting = Some(WILD_PLANET);
    colonists.cargo = Cargo::new(0, 0, 0, 25);
    colonists.waypoints = vec![with_task(
        wild,
        Target::Planet(WILD_PLANET),
        WaypointTask::Colonize,
    )];
    universe.fleets.insert(FleetId(2), colonists);
    FleetId(2)
}

#[test]
fn scrapping_in_orbit_returns_cargo_and_minerals_to_planet() {
    let mut universe = setup();
    freighter_mut(&mut universe).cargo = Cargo::new(10, 0, 0, 0);
    set_route(
        &mut universe,
        FREIGHTER_FLEET,
        vec![with_task(
            Vector::ZERO,
            Target::Planet(HOME_PLANET),
            WaypointTask::Scrap,
        )],
    );

    let events = step(&mut universe);

    assert!(!universe.fleets.contains_key(&FREIGHTER_FLEET));
    let home = &universe.planets[&HOME_PLANET];
    // cargo 10 plus half of the 20/0/10 build cost
    assert_eq!(home.cargo.ironium, 1000 + 10 + 10);
    assert_eq!(home.cargo.germanium, 500 + 5);
    assert!(events.iter().any(|e| matches!(
        e.event,
        Event::FleetScrapped {
            planet: Some(HOME_PLANET),
            salvage: None,
            ..
        }
    )));
    assert!(events.iter().any(|e| matches!(
        e.event,
        Event::FleetDestroyed {
            cause: DestructionCause::Scrapped,
            ..
        }
    )));
}

#[test]
fn scrapping_in_deep_space_leaves_salvage() {
    let mut universe = setup();
    {
        let fleet = freighter_mut(&mut universe);
        fleet.position = Vector::new(7.0, 7.0);
        fleet.orbiting = None;
    }
    set_route(
        &mut universe,
        FREIGHTER_FLEET,
        vec![with_task(Vector::ZERO, Target::None, WaypointTask::Scrap)],
    );

    step(&mut universe);

    let salvage = &universe.salvage[&SalvageId(1)];
    assert_eq!(salvage.position, Vector::new(7.0, 7.0));
    assert_eq!(salvage.cargo, Cargo::new(10, 0, 5, 0));
    assert_eq!(universe.counters.next_salvage_id, 2);
}

#[test]
fn salvage_can_be_picked_up() {
    let mut universe = setup();
    universe.salvage.insert(
        SalvageId(1),
        Salvage {
            id: SalvageId(1),
            owner: crate::test_fixtures::PLAYER_TWO,
            position: Vector::ZERO,
            cargo: Cargo::new(40, 0, 0, 0),
        },
    );
    set_route(
        &mut universe,
        FREIGHTER_FLEET,
        vec![transport_at(
            Vector::ZERO,
            Target::Salvage(SalvageId(1)),
            0,
            &[(CargoType::Ironium, TransportAction::LoadAll, 0)],
        )],
    );

    step(&mut universe);

    assert_eq!(freighter(&universe).cargo.ironium, 40);
    assert_eq!(universe.salvage[&SalvageId(1)].cargo.ironium, 0);
}

#[test]
fn colonizing_claims_the_planet_and_consumes_the_fleet() {
    let mut universe = setup();
    let fleet_id = colony_fleet_at_wild(&mut universe);

    let events = step(&mut universe);

    assert!(!universe.fleets.contains_key(&fleet_id));
    let wild = &universe.planets[&WILD_PLANET];
    assert_eq!(wild.owner, Some(PLAYER_ONE));
    assert_eq!(wild.cargo.colonists, 25);
    assert_eq!(wild.cargo.ironium, 5);
    assert!(events.iter().any(|e| matches!(
        e.event,
        Event::PlanetColonized {
            planet: WILD_PLANET,
            ..
        }
    )));
}

#[test]
fn colonizing_an_owned_planet_fails() {
    let mut universe = setup();
    let fleet_id = colony_fleet_at_wild(&mut universe);
    universe.planets.get_mut(&WILD_PLANET).unwrap().owner = Some(crate::test_fixtures::PLAYER_TWO);

    let events = step(&mut universe);

    let fleet = &universe.fleets[&fleet_id];
    assert_eq!(fleet.waypoints[0].task, WaypointTask::None);
    assert_eq!(fleet.cargo.colonists, 25);
    assert!(events.iter().any(|e| matches!(
        e.event,
        Event::ColonizeFailed {
            reason: ColonizeFailure::PlanetOwned,
            ..
        }
    )));
}

#[test]
fn colonizing_without_a_colony_module_fails() {
    let mut universe = setup();
    let wild = universe.planets[&WILD_PLANET].position;
    {
        let fleet = freighter_mut(&mut universe);
        fleet.position = wild;
        fleet.orbiting = Some(WILD_PLANET);
        fleet.cargo = Cargo::new(0, 0, 0, 50);
    }
    set_route(
        &mut universe,
        FREIGHTER_FLEET,
        vec![with_task(
            wild,
            Target::Planet(WILD_PLANET),
            WaypointTask::Colonize,
        )],
    );

    let events = step(&mut universe);

    assert!(universe.fleets.contains_key(&FREIGHTER_FLEET));
    assert_eq!(universe.planets[&WILD_PLANET].owner, None);
    assert!(events.iter().any(|e| matches!(
        e.event,
        Event::ColonizeFailed {
            reason: ColonizeFailure::NoColonizer,
            ..
        }
    )));
}

#[test]
fn colony_ship_colonizes_on_arrival() {
    let mut universe = setup();
    let wild = universe.planets[&WILD_PLANET].position;
    let mut colonists = fleet_of(&universe, FleetId(2), COLONY_SHIP, 1);
    colonists.cargo = Cargo::new(0, 0, 0, 25);
    let mut destination = Waypoint::targeting(wild, Target::Planet(WILD_PLANET), 9);
    destination.task = WaypointTask::Colonize;
    colonists.waypoints = vec![
        Waypoint::targeting(Vector::ZERO, Target::Planet(HOME_PLANET), 0),
        destination,
    ];
    universe.fleets.insert(FleetId(2), colonists);

    step(&mut universe);

    assert!(!universe.fleets.contains_key(&FleetId(2)));
    assert_eq!(universe.planets[&WILD_PLANET].owner, Some(PLAYER_ONE));
}

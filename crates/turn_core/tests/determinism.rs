//! Integration test: identical seed and input produce byte-identical output.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use turn_core::test_fixtures::{
    base_rules, base_universe, enemy_mine_field, fleet_of, BATTLESHIP, COLONY_SHIP, FREIGHTER,
    HOME_PLANET, OUTPOST_PLANET, PLAYER_ONE, WILD_PLANET,
};
use turn_core::*;

/// A busy map: gate jumps, minefields, engine failures, transport and colonization.
fn busy_universe() -> Universe {
    let mut universe = base_universe();
    {
        let race = &mut universe.players.get_mut(&PLAYER_ONE).unwrap().race;
        race.engine_failure_rate = 0.25;
        race.engine_reliable_speed = 7;
        race.ships_vanish_in_void = true;
    }
    universe
        .mine_fields
        .insert(MineFieldId(1), enemy_mine_field(Vector::new(120.0, 0.0), 400));

    let outpost = universe.planets[&OUTPOST_PLANET].position;
    let wild = universe.planets[&WILD_PLANET].position;

    let mut runner = fleet_of(&universe, FleetId(2), FREIGHTER, 3);
    runner.waypoints = vec![
        Waypoint::targeting(Vector::ZERO, Target::Planet(HOME_PLANET), 0),
        Waypoint::targeting(outpost, Target::Planet(OUTPOST_PLANET), 9),
    ];
    universe.fleets.insert(FleetId(2), runner);

    let mut jumper = fleet_of(&universe, FleetId(3), BATTLESHIP, 2);
    jumper.waypoints = vec![
        Waypoint::targeting(Vector::ZERO, Target::Planet(HOME_PLANET), 0),
        Waypoint::targeting(outpost, Target::Planet(OUTPOST_PLANET), STARGATE_WARP_SPEED),
    ];
    universe.fleets.insert(FleetId(3), jumper);

    let mut settler = fleet_of(&universe, FleetId(4), COLONY_SHIP, 1);
    settler.cargo = Cargo::new(0, 0, 0, 25);
    let mut colonize = Waypoint::targeting(wild, Target::Planet(WILD_PLANET), 8);
    colonize.task = WaypointTask::Colonize;
    settler.waypoints = vec![
        Waypoint::targeting(Vector::ZERO, Target::Planet(HOME_PLANET), 0),
        colonize,
    ];
    universe.fleets.insert(FleetId(4), settler);

    universe
}

fn run(seed: u64, turns: u32) -> String {
    let mut universe = busy_universe();
    let rules = base_rules();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut events = Vec::new();
    for _ in 0..turns {
        events.extend(run_turn(
            &mut universe,
            &[],
            &rules,
            &mut rng,
            EventLevel::Debug,
        ));
    }
    serde_json::to_string(&(universe, events)).unwrap()
}

#[test]
fn same_seed_produces_identical_output() {
    assert_eq!(run(7, 6), run(7, 6));
}

#[test]
fn all_fleets_accounted_for() {
    let output: serde_json::Value = serde_json::from_str(&run(7, 6)).unwrap();
    let universe: Universe = serde_json::from_value(output[0].clone()).unwrap();
    let events: Vec<EventEnvelope> = serde_json::from_value(output[1].clone()).unwrap();

    for id in [FleetId(1), FleetId(2), FleetId(3), FleetId(4)] {
        let destroyed = events.iter().any(|e| {
            matches!(e.event, Event::FleetDestroyed { fleet, .. } if fleet == id)
        });
        assert_ne!(
            universe.fleets.contains_key(&id),
            destroyed,
            "{id} must either survive or be reported destroyed"
        );
    }
}

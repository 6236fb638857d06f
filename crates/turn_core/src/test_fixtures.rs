//! Shared test fixtures for `turn_core` and downstream crates.
//!
//! `base_universe()` is a two-player map: a home world and an outpost, both
//! with stargates, an unowned world, an enemy world, and one freighter in
//! orbit at home. `base_rules()` carries compact rule values that keep test
//! arithmetic readable.

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use smallvec::smallvec;

use crate::fleet::compute_fleet_spec;
use crate::{
    Cargo, Counters, DesignId, Engine, Fleet, FleetId, FleetSpec, MetaState, MineField,
    MineFieldId, MineFieldStats, MineFieldType, Planet, PlanetId, Player, PlayerId, RaceTraits,
    Rules, ShipDesign, ShipToken, Stargate, Target, Universe, Vector, Waypoint,
};

pub const PLAYER_ONE: PlayerId = PlayerId(1);
pub const PLAYER_TWO: PlayerId = PlayerId(2);

pub const FREIGHTER: DesignId = DesignId(1);
pub const COLONY_SHIP: DesignId = DesignId(2);
pub const BATTLESHIP: DesignId = DesignId(3);

pub const HOME_PLANET: PlanetId = PlanetId(1);
pub const OUTPOST_PLANET: PlanetId = PlanetId(2);
pub const WILD_PLANET: PlanetId = PlanetId(3);
pub const ENEMY_PLANET: PlanetId = PlanetId(4);

pub const FREIGHTER_FLEET: FleetId = FleetId(1);

/// Free through warp 4, then increasingly thirsty.
fn long_hump_engine() -> Engine {
    Engine {
        fuel_usage: [0, 0, 0, 0, 0, 80, 110, 140, 180, 230, 300],
        free_speed: 4,
        ramscoop: false,
    }
}

pub fn base_rules() -> Rules {
    Rules {
        rules_version: "test".to_string(),
        stargate_max_range_factor: 5.0,
        stargate_max_hull_mass_factor: 5.0,
        overgate_vanish_per_excess: 0.25,
        overgate_damage_per_excess: 0.25,
        overgate_max_damage_fraction: 0.9,
        mine_field_stats: BTreeMap::from([
            (
                MineFieldType::Standard,
                MineFieldStats {
                    max_speed: 4,
                    chance_per_warp: 0.003,
                    damage_per_engine: 100,
                    damage_per_engine_ramscoop: 125,
                    min_damage_per_fleet: 500,
                    min_damage_per_fleet_ramscoop: 600,
                },
            ),
            (
                MineFieldType::Heavy,
                MineFieldStats {
                    max_speed: 6,
                    chance_per_warp: 0.01,
                    damage_per_engine: 500,
                    damage_per_engine_ramscoop: 600,
                    min_damage_per_fleet: 2000,
                    min_damage_per_fleet_ramscoop: 2500,
                },
            ),
            (
                MineFieldType::SpeedBump,
                MineFieldStats {
                    max_speed: 5,
                    chance_per_warp: 0.035,
                    damage_per_engine: 0,
                    damage_per_engine_ramscoop: 0,
                    min_damage_per_fleet: 0,
                    min_damage_per_fleet_ramscoop: 0,
                },
            ),
        ]),
        ramscoop_fuel_per_light_year: 0.5,
        scrap_mineral_fraction: 0.5,
    }
}

fn designs() -> BTreeMap<DesignId, ShipDesign> {
    let design = |id, name: &str, mass, armor, cargo_capacity, fuel_capacity| ShipDesign {
        id,
        name: name.to_string(),
        mass,
        armor,
        cargo_capacity,
        fuel_capacity,
        engine: Some(long_hump_engine()),
        engine_count: 1,
        colonizer: false,
        mineral_cost: Cargo::default(),
    };
    BTreeMap::from([
        (
            FREIGHTER,
            ShipDesign {
                mineral_cost: Cargo::new(20, 0, 10, 0),
                ..design(FREIGHTER, "Medium Freighter", 100, 600, 120, 500)
            },
        ),
        (
            COLONY_SHIP,
            ShipDesign {
                colonizer: true,
                mineral_cost: Cargo::new(10, 10, 10, 0),
                ..design(COLONY_SHIP, "Colony Ship", 50, 20, 25, 200)
            },
        ),
        (
            BATTLESHIP,
            ShipDesign {
                engine_count: 4,
                mineral_cost: Cargo::new(100, 30, 50, 0),
                ..design(BATTLESHIP, "Battleship", 800, 2000, 0, 1000)
            },
        ),
    ])
}

fn planet(id: PlanetId, name: &str, owner: Option<PlayerId>, position: Vector) -> Planet {
    Planet {
        id,
        name: name.to_string(),
        owner,
        position,
        cargo: Cargo::default(),
        has_starbase: false,
        stargate: None,
    }
}

fn planets() -> BTreeMap<PlanetId, Planet> {
    let gate = |safe_range, safe_hull_mass| {
        Some(Stargate {
            safe_range,
            safe_hull_mass,
        })
    };
    BTreeMap::from([
        (
            HOME_PLANET,
            Planet {
                cargo: Cargo::new(1000, 500, 500, 2500),
                has_starbase: true,
                stargate: gate(300.0, 500),
                ..planet(HOME_PLANET, "Home", Some(PLAYER_ONE), Vector::ZERO)
            },
        ),
        (
            OUTPOST_PLANET,
            Planet {
                cargo: Cargo::new(0, 0, 0, 1000),
                has_starbase: true,
                stargate: gate(200.0, 300),
                ..planet(
                    OUTPOST_PLANET,
                    "Outpost",
                    Some(PLAYER_ONE),
                    Vector::new(250.0, 0.0),
                )
            },
        ),
        (
            WILD_PLANET,
            planet(WILD_PLANET, "Wild", None, Vector::new(0.0, 60.0)),
        ),
        (
            ENEMY_PLANET,
            Planet {
                has_starbase: true,
                stargate: gate(500.0, 1000),
                ..planet(
                    ENEMY_PLANET,
                    "Hive",
                    Some(PLAYER_TWO),
                    Vector::new(400.0, 0.0),
                )
            },
        ),
    ])
}

fn player(id: PlayerId, name: &str) -> Player {
    Player {
        id,
        name: name.to_string(),
        race: RaceTraits::default(),
        relations: BTreeMap::new(),
    }
}

/// A fleet of `quantity` ships of one design, parked at the home world.
pub fn fleet_of(
    universe: &Universe,
    id: FleetId,
    design: DesignId,
    quantity: u32,
) -> Fleet {
    let home = universe.planets[&HOME_PLANET].position;
    let mut fleet = Fleet {
        id,
        owner: PLAYER_ONE,
        name: format!("Fleet #{}", id.0),
        tokens: smallvec![ShipToken {
            design,
            quantity,
            quantity_damaged: 0,
            damage: 0.0,
        }],
        position: home,
        heading: Vector::ZERO,
        warp_speed: 0,
        fuel: 0,
        cargo: Cargo::default(),
        waypoints: vec![Waypoint::targeting(home, Target::Planet(HOME_PLANET), 0)],
        orbiting: Some(HOME_PLANET),
        repeat_orders: false,
        struck_mine_field: false,
        spec: FleetSpec::default(),
    };
    fleet.spec = compute_fleet_spec(&fleet, &universe.designs);
    fleet.fuel = fleet.spec.fuel_capacity;
    fleet
}

/// Two players, four planets, one freighter at home with a full tank.
pub fn base_universe() -> Universe {
    let mut universe = Universe {
        meta: MetaState {
            turn: 1,
            seed: 42,
            schema_version: 1,
            rules_version: "test".to_string(),
        },
        players: BTreeMap::from([
            (PLAYER_ONE, player(PLAYER_ONE, "Humanoids")),
            (PLAYER_TWO, player(PLAYER_TWO, "Insectoids")),
        ]),
        designs: designs(),
        planets: planets(),
        fleets: BTreeMap::new(),
        salvage: BTreeMap::new(),
        mine_fields: BTreeMap::new(),
        wormholes: BTreeMap::new(),
        counters: Counters {
            next_event_id: 0,
            next_salvage_id: 1,
        },
    };
    let freighter = fleet_of(&universe, FREIGHTER_FLEET, FREIGHTER, 1);
    universe.fleets.insert(FREIGHTER_FLEET, freighter);
    universe
}

pub fn freighter_fleet() -> Fleet {
    base_universe().fleets[&FREIGHTER_FLEET].clone()
}

pub fn home_planet() -> Planet {
    base_universe().planets[&HOME_PLANET].clone()
}

/// A standard minefield owned by the second player.
pub fn enemy_mine_field(position: Vector, mine_count: u32) -> MineField {
    MineField {
        id: MineFieldId(1),
        owner: PLAYER_TWO,
        kind: MineFieldType::Standard,
        position,
        mine_count,
    }
}

pub fn make_rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(42)
}

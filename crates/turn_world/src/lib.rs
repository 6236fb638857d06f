//! Content loading and validation shared by turn_cli and the tests.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::collections::BTreeSet;
use std::path::Path;
use turn_core::fleet::compute_fleet_spec;
use turn_core::{MineFieldType, PlayerId, Rules, Target, Universe};

/// Rules and starting universe read from one content directory.
#[derive(Debug, Clone)]
pub struct Content {
    pub rules: Rules,
    pub universe: Universe,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("parsing {}", path.display()))
}

/// Validates rule constants, panicking on any authoring error.
pub fn validate_rules(rules: &Rules) {
    for kind in [
        MineFieldType::Standard,
        MineFieldType::Heavy,
        MineFieldType::SpeedBump,
    ] {
        assert!(
            rules.mine_field_stats.contains_key(&kind),
            "rules '{}' have no stats for minefield type {kind:?}",
            rules.rules_version,
        );
    }
    assert!(
        rules.stargate_max_range_factor > 0.0 && rules.stargate_max_hull_mass_factor > 0.0,
        "rules '{}' stargate factors must be positive",
        rules.rules_version,
    );
    assert!(
        (0.0..=1.0).contains(&rules.overgate_max_damage_fraction),
        "rules '{}' overgate_max_damage_fraction must be within 0..=1",
        rules.rules_version,
    );
    assert!(
        (0.0..=1.0).contains(&rules.scrap_mineral_fraction),
        "rules '{}' scrap_mineral_fraction must be within 0..=1",
        rules.rules_version,
    );
}

/// Validates cross-references in a universe, panicking on any authoring error.
///
/// Catches mistakes like a fleet owned by an unknown player, a token built
/// from a design that does not exist, or a waypoint aimed at a missing planet.
pub fn validate_universe(universe: &Universe) {
    let players: BTreeSet<PlayerId> = universe.players.keys().copied().collect();
    let known_player = |id: PlayerId, what: &str| {
        assert!(
            players.contains(&id),
            "{what} references unknown player '{id}'"
        );
    };

    for (id, player) in &universe.players {
        assert_eq!(*id, player.id, "player keyed as '{id}' has id '{}'", player.id);
        for other in player.relations.keys() {
            known_player(*other, &format!("player '{id}' relations"));
        }
    }

    for (id, planet) in &universe.planets {
        assert_eq!(*id, planet.id, "planet keyed as '{id}' has id '{}'", planet.id);
        if let Some(owner) = planet.owner {
            known_player(owner, &format!("planet '{id}'"));
        }
        assert!(
            planet.stargate.is_none() || planet.has_starbase,
            "planet '{id}' has a stargate but no starbase"
        );
    }

    for (id, mine_field) in &universe.mine_fields {
        known_player(mine_field.owner, &format!("minefield '{id}'"));
    }

    for (id, salvage) in &universe.salvage {
        known_player(salvage.owner, &format!("salvage '{id}'"));
    }

    for (id, wormhole) in &universe.wormholes {
        assert!(
            universe.wormholes.contains_key(&wormhole.destination),
            "wormhole '{id}' leads to unknown wormhole '{}'",
            wormhole.destination,
        );
    }

    for (id, fleet) in &universe.fleets {
        assert_eq!(*id, fleet.id, "fleet keyed as '{id}' has id '{}'", fleet.id);
        known_player(fleet.owner, &format!("fleet '{id}'"));
        assert!(!fleet.tokens.is_empty(), "fleet '{id}' has no ships");
        assert!(!fleet.waypoints.is_empty(), "fleet '{id}' has no waypoints");
        for token in &fleet.tokens {
            assert!(
                universe.designs.contains_key(&token.design),
                "fleet '{id}' token uses unknown design '{}'",
                token.design,
            );
        }
        for waypoint in &fleet.waypoints {
            let resolves = match waypoint.target {
                Target::None => true,
                Target::Planet(planet) => universe.planets.contains_key(&planet),
                Target::Fleet(other) => universe.fleets.contains_key(&other),
                Target::Salvage(salvage) => universe.salvage.contains_key(&salvage),
                Target::Wormhole(wormhole) => universe.wormholes.contains_key(&wormhole),
            };
            assert!(
                resolves,
                "fleet '{id}' waypoint target {:?} is not in the universe",
                waypoint.target,
            );
        }
        if let Some(planet) = fleet.orbiting {
            assert!(
                universe.planets.contains_key(&planet),
                "fleet '{id}' orbits unknown planet '{planet}'"
            );
        }
    }
}

pub fn load_rules(content_dir: &str) -> Result<Rules> {
    let rules: Rules = read_json(&Path::new(content_dir).join("rules.json"))?;
    validate_rules(&rules);
    Ok(rules)
}

/// Reads a universe file, validates it and derives every fleet's spec.
pub fn load_universe(path: &str) -> Result<Universe> {
    let mut universe: Universe = read_json(Path::new(path))?;
    validate_universe(&universe);
    let designs = &universe.designs;
    for fleet in universe.fleets.values_mut() {
        fleet.spec = compute_fleet_spec(fleet, designs);
    }
    Ok(universe)
}

pub fn load_content(content_dir: &str) -> Result<Content> {
    let rules = load_rules(content_dir)?;
    let universe_path = Path::new(content_dir).join("universe.json");
    let universe = load_universe(&universe_path.to_string_lossy())?;
    assert_eq!(
        universe.meta.rules_version, rules.rules_version,
        "universe was authored against different rules"
    );
    Ok(Content { rules, universe })
}

pub fn save_universe(path: &str, universe: &Universe) -> Result<()> {
    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    serde_json::to_writer_pretty(file, universe).with_context(|| format!("writing {path}"))?;
    Ok(())
}

//! Type definitions for `turn_core`.
//!
//! Universe state, ship statistics, rules, orders and notifications.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::cargo::{Cargo, CargoType};
use crate::vector::Vector;

// ---------------------------------------------------------------------------
// ID newtypes
// ---------------------------------------------------------------------------

macro_rules! numeric_id {
    ($name:ident, $prefix:literal) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(pub u32);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($prefix, "_{:04}"), self.0)
            }
        }
    };
}

numeric_id!(PlayerId, "player");
numeric_id!(FleetId, "fleet");
numeric_id!(PlanetId, "planet");
numeric_id!(DesignId, "design");
numeric_id!(SalvageId, "salvage");
numeric_id!(MineFieldId, "minefield");
numeric_id!(WormholeId, "wormhole");

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub String);

/// Warp speed requesting a stargate jump instead of normal travel.
pub const STARGATE_WARP_SPEED: u32 = 11;

/// Highest warp speed an engine table covers.
pub const MAX_WARP_SPEED: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventLevel {
    Normal,
    Debug,
}

// ---------------------------------------------------------------------------
// Universe state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Universe {
    pub meta: MetaState,
    pub players: BTreeMap<PlayerId, Player>,
    pub designs: BTreeMap<DesignId, ShipDesign>,
    pub planets: BTreeMap<PlanetId, Planet>,
    pub fleets: BTreeMap<FleetId, Fleet>,
    #[serde(default)]
    pub salvage: BTreeMap<SalvageId, Salvage>,
    #[serde(default)]
    pub mine_fields: BTreeMap<MineFieldId, MineField>,
    #[serde(default)]
    pub wormholes: BTreeMap<WormholeId, Wormhole>,
    pub counters: Counters,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaState {
    pub turn: u32,
    pub seed: u64,
    pub schema_version: u32,
    pub rules_version: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Counters {
    pub next_event_id: u64,
    pub next_salvage_id: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Relation {
    Friend,
    Neutral,
    Enemy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub race: RaceTraits,
    /// Relations to other players. Missing entries are neutral.
    #[serde(default)]
    pub relations: BTreeMap<PlayerId, Relation>,
}

impl Player {
    /// A player is always friendly to itself.
    pub fn is_friend(&self, other: PlayerId) -> bool {
        other == self.id || self.relations.get(&other) == Some(&Relation::Friend)
    }
}

#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceTraits {
    /// Fraction shaved off engine fuel usage (0.15 for improved fuel efficiency).
    #[serde(default)]
    pub fuel_efficiency_offset: f64,
    #[serde(default)]
    pub engine_failure_rate: f64,
    /// Warp speeds above this are subject to `engine_failure_rate`.
    #[serde(default = "default_reliable_speed")]
    pub engine_reliable_speed: u32,
    #[serde(default)]
    pub ships_vanish_in_void: bool,
    #[serde(default = "default_true")]
    pub can_gate_cargo: bool,
}

fn default_reliable_speed() -> u32 {
    MAX_WARP_SPEED
}

fn default_true() -> bool {
    true
}

impl Default for RaceTraits {
    fn default() -> Self {
        Self {
            fuel_efficiency_offset: 0.0,
            engine_failure_rate: 0.0,
            engine_reliable_speed: MAX_WARP_SPEED,
            ships_vanish_in_void: false,
            can_gate_cargo: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Ship statistics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Engine {
    /// Fuel usage in mg per 100 ly per 200 kT, indexed by warp speed 0..=10.
    pub fuel_usage: [i32; 11],
    /// Fastest warp speed with zero fuel usage.
    pub free_speed: u32,
    #[serde(default)]
    pub ramscoop: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipDesign {
    pub id: DesignId,
    pub name: String,
    pub mass: i32,
    pub armor: i32,
    #[serde(default)]
    pub cargo_capacity: i32,
    #[serde(default)]
    pub fuel_capacity: i32,
    #[serde(default)]
    pub engine: Option<Engine>,
    #[serde(default)]
    pub engine_count: u32,
    #[serde(default)]
    pub colonizer: bool,
    /// Minerals used to build one ship. Colonists are ignored.
    #[serde(default)]
    pub mineral_cost: Cargo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipToken {
    pub design: DesignId,
    pub quantity: u32,
    #[serde(default)]
    pub quantity_damaged: u32,
    /// Damage carried by each damaged ship.
    #[serde(default)]
    pub damage: f64,
}

/// Design-derived totals for a fleet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FleetSpec {
    pub mass: i32,
    pub cargo_capacity: i32,
    pub fuel_capacity: i32,
    /// Free speed of the slowest engine; 0 when the fleet has no engines.
    pub free_speed: u32,
}

// ---------------------------------------------------------------------------
// Map objects
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Target {
    #[default]
    None,
    Planet(PlanetId),
    Fleet(FleetId),
    Salvage(SalvageId),
    Wormhole(WormholeId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WaypointTask {
    #[default]
    None,
    Transport,
    Colonize,
    LayMines,
    Patrol,
    Merge,
    Route,
    Scrap,
    Transfer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TransportAction {
    #[default]
    None,
    LoadOptimal,
    LoadAll,
    LoadAmount,
    FillPercent,
    WaitForPercent,
    SetAmountTo,
    LoadDunnage,
    UnloadAll,
    UnloadAmount,
    SetWaypointTo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TransportTask {
    pub action: TransportAction,
    #[serde(default)]
    pub amount: i32,
}

impl TransportTask {
    pub fn new(action: TransportAction, amount: i32) -> Self {
        Self { action, amount }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TransportTasks {
    #[serde(default)]
    pub fuel: TransportTask,
    #[serde(default)]
    pub ironium: TransportTask,
    #[serde(default)]
    pub boranium: TransportTask,
    #[serde(default)]
    pub germanium: TransportTask,
    #[serde(default)]
    pub colonists: TransportTask,
}

impl TransportTasks {
    pub fn get(&self, kind: CargoType) -> TransportTask {
        match kind {
            CargoType::Fuel => self.fuel,
            CargoType::Ironium => self.ironium,
            CargoType::Boranium => self.boranium,
            CargoType::Germanium => self.germanium,
            CargoType::Colonists => self.colonists,
        }
    }

    pub fn set(&mut self, kind: CargoType, task: TransportTask) {
        match kind {
            CargoType::Fuel => self.fuel = task,
            CargoType::Ironium => self.ironium = task,
            CargoType::Boranium => self.boranium = task,
            CargoType::Germanium => self.germanium = task,
            CargoType::Colonists => self.colonists = task,
        }
    }
}

/// Waypoint phases that run at most once per waypoint per turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaypointPhase {
    Unload = 0b0001,
    Load = 0b0010,
    Colonize = 0b0100,
    Scrap = 0b1000,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Waypoint {
    pub position: Vector,
    #[serde(default)]
    pub target: Target,
    #[serde(default)]
    pub warp_speed: u32,
    #[serde(default)]
    pub task: WaypointTask,
    #[serde(default)]
    pub transport_tasks: TransportTasks,
    /// Set while a transport condition at this waypoint is unmet.
    #[serde(default)]
    pub wait_at_waypoint: bool,
    /// Set when the fleet left this waypoint's position without reaching the next one.
    #[serde(default)]
    pub partially_complete: bool,
    /// Per-turn bitset of `WaypointPhase`s already handled. Reset every turn.
    #[serde(skip)]
    pub processed: u8,
}

impl Waypoint {
    pub fn at(position: Vector) -> Self {
        Self {
            position,
            target: Target::None,
            warp_speed: 0,
            task: WaypointTask::None,
            transport_tasks: TransportTasks::default(),
            wait_at_waypoint: false,
            partially_complete: false,
            processed: 0,
        }
    }

    pub fn targeting(position: Vector, target: Target, warp_speed: u32) -> Self {
        Self {
            target,
            warp_speed,
            ..Self::at(position)
        }
    }

    pub fn uses_stargate(&self) -> bool {
        self.warp_speed == STARGATE_WARP_SPEED
    }

    pub fn is_processed(&self, phase: WaypointPhase) -> bool {
        self.processed & phase as u8 != 0
    }

    pub fn mark_processed(&mut self, phase: WaypointPhase) {
        self.processed |= phase as u8;
    }

    /// Drop any order attached to this waypoint.
    pub fn clear_task(&mut self) {
        self.task = WaypointTask::None;
        self.transport_tasks = TransportTasks::default();
        self.wait_at_waypoint = false;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fleet {
    pub id: FleetId,
    pub owner: PlayerId,
    pub name: String,
    pub tokens: SmallVec<[ShipToken; 4]>,
    pub position: Vector,
    /// Heading shown to other players. Zero when stopped.
    #[serde(default)]
    pub heading: Vector,
    /// Warp speed shown to other players. Zero when stopped.
    #[serde(default)]
    pub warp_speed: u32,
    pub fuel: i32,
    #[serde(default)]
    pub cargo: Cargo,
    pub waypoints: Vec<Waypoint>,
    #[serde(default)]
    pub orbiting: Option<PlanetId>,
    #[serde(default)]
    pub repeat_orders: bool,
    #[serde(default)]
    pub struck_mine_field: bool,
    /// Recomputed from designs at the start of every turn.
    #[serde(default)]
    pub spec: FleetSpec,
}

impl Fleet {
    pub fn total_ships(&self) -> u32 {
        self.tokens.iter().map(|token| token.quantity).sum()
    }

    pub fn is_destroyed(&self) -> bool {
        self.total_ships() == 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stargate {
    pub safe_range: f64,
    pub safe_hull_mass: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Planet {
    pub id: PlanetId,
    pub name: String,
    #[serde(default)]
    pub owner: Option<PlayerId>,
    pub position: Vector,
    #[serde(default)]
    pub cargo: Cargo,
    #[serde(default)]
    pub has_starbase: bool,
    /// Present only while the starbase carries an operational gate.
    #[serde(default)]
    pub stargate: Option<Stargate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Salvage {
    pub id: SalvageId,
    pub owner: PlayerId,
    pub position: Vector,
    pub cargo: Cargo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MineFieldType {
    Standard,
    Heavy,
    SpeedBump,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MineField {
    pub id: MineFieldId,
    pub owner: PlayerId,
    pub kind: MineFieldType,
    pub position: Vector,
    pub mine_count: u32,
}

impl MineField {
    pub fn radius(&self) -> f64 {
        f64::from(self.mine_count).sqrt()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wormhole {
    pub id: WormholeId,
    pub position: Vector,
    pub destination: WormholeId,
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MineFieldStats {
    /// Fleets at or below this warp pass through safely.
    pub max_speed: u32,
    /// Hit chance per light-year inside the field, per warp over `max_speed`.
    pub chance_per_warp: f64,
    pub damage_per_engine: i32,
    pub damage_per_engine_ramscoop: i32,
    pub min_damage_per_fleet: i32,
    pub min_damage_per_fleet_ramscoop: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rules {
    pub rules_version: String,
    /// Jumps may reach `safe_range * stargate_max_range_factor`.
    pub stargate_max_range_factor: f64,
    /// Ships may weigh up to `safe_hull_mass * stargate_max_hull_mass_factor`.
    pub stargate_max_hull_mass_factor: f64,
    /// Vanish chance per unit of overage ratio beyond a gate's safe rating.
    pub overgate_vanish_per_excess: f64,
    /// Damage fraction per unit of overage ratio beyond a gate's safe rating.
    pub overgate_damage_per_excess: f64,
    pub overgate_max_damage_fraction: f64,
    pub mine_field_stats: BTreeMap<MineFieldType, MineFieldStats>,
    pub ramscoop_fuel_per_light_year: f64,
    pub scrap_mineral_fraction: f64,
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderEnvelope {
    pub id: OrderId,
    pub issued_by: PlayerId,
    pub turn: u32,
    pub order: Order,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Order {
    SetWaypoints {
        fleet: FleetId,
        waypoints: Vec<Waypoint>,
    },
    SetRepeatOrders {
        fleet: FleetId,
        repeat: bool,
    },
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub id: EventId,
    pub turn: u32,
    pub player: PlayerId,
    pub event: Event,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DestructionCause {
    MineField,
    Stargate,
    Scrapped,
    Colonized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StargateRejection {
    NoSourceGate,
    NoDestinationGate,
    SourceNotFriendly,
    DestinationNotFriendly,
    ColonistsAtForeignGate,
    OutOfRange,
    TooMassive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColonizeFailure {
    NotAtPlanet,
    PlanetOwned,
    NoColonists,
    NoColonizer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportCancel {
    NoTarget,
    TargetMissing,
    TargetNotHere,
    TargetNotOwned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderRejection {
    UnknownFleet,
    NotOwner,
    InvalidWarpSpeed,
    EmptyWaypoints,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    OrderRejected {
        order: OrderId,
        reason: OrderRejection,
    },
    FleetEngineFailure {
        fleet: FleetId,
    },
    FleetOutOfFuel {
        fleet: FleetId,
        warp_speed: u32,
    },
    FleetGeneratedFuel {
        fleet: FleetId,
        amount: i32,
    },
    FleetHitMineField {
        fleet: FleetId,
        mine_field: MineFieldId,
        ships_destroyed: u32,
        damage: i32,
    },
    FleetArrived {
        fleet: FleetId,
        position: Vector,
        target: Target,
    },
    FleetDestroyed {
        fleet: FleetId,
        cause: DestructionCause,
    },
    WormholeTraversed {
        fleet: FleetId,
        wormhole: WormholeId,
        exit: WormholeId,
    },
    StargateJumpRejected {
        fleet: FleetId,
        reason: StargateRejection,
    },
    StargateCargoDumped {
        fleet: FleetId,
        planet: PlanetId,
        cargo: Cargo,
    },
    StargateJump {
        fleet: FleetId,
        source: PlanetId,
        destination: PlanetId,
        ships_lost: u32,
    },
    CargoTransferred {
        fleet: FleetId,
        target: Target,
        kind: CargoType,
        /// Positive when loaded into the fleet, negative when unloaded.
        amount: i32,
    },
    CargoTransferRejected {
        fleet: FleetId,
        kind: CargoType,
        reason: String,
    },
    TransportTaskCancelled {
        fleet: FleetId,
        reason: TransportCancel,
    },
    PlanetColonized {
        fleet: FleetId,
        planet: PlanetId,
    },
    ColonizeFailed {
        fleet: FleetId,
        reason: ColonizeFailure,
    },
    FleetScrapped {
        fleet: FleetId,
        planet: Option<PlanetId>,
        salvage: Option<SalvageId>,
    },
    /// Only emitted at `EventLevel::Debug`.
    EngineFailureRoll {
        fleet: FleetId,
        failure_rate: f64,
        rolled: f64,
    },
    /// Only emitted at `EventLevel::Debug`.
    MineFieldRoll {
        fleet: FleetId,
        mine_field: MineFieldId,
        p: f64,
        rolled: f64,
    },
}

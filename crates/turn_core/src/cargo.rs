//! Typed cargo and the holder abstraction shared by planets, fleets and salvage.
//!
//! Transfers are written once against `CargoHolder` and validated before either
//! side is touched, so a rejected transfer leaves both holders unchanged.

use serde::{Deserialize, Serialize};

use crate::{Fleet, Planet, Salvage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CargoType {
    Fuel,
    Ironium,
    Boranium,
    Germanium,
    Colonists,
}

impl CargoType {
    /// Cargo-hold types in resolution order. Fuel lives outside the hold.
    pub const HOLD: [CargoType; 4] = [
        CargoType::Ironium,
        CargoType::Boranium,
        CargoType::Germanium,
        CargoType::Colonists,
    ];

    /// Every transportable type, hold types first.
    pub const ALL: [CargoType; 5] = [
        CargoType::Ironium,
        CargoType::Boranium,
        CargoType::Germanium,
        CargoType::Colonists,
        CargoType::Fuel,
    ];
}

impl std::fmt::Display for CargoType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CargoType::Fuel => "fuel",
            CargoType::Ironium => "ironium",
            CargoType::Boranium => "boranium",
            CargoType::Germanium => "germanium",
            CargoType::Colonists => "colonists",
        };
        f.write_str(name)
    }
}

/// Minerals and colonists in kT. 100 colonists weigh 1 kT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cargo {
    #[serde(default)]
    pub ironium: i32,
    #[serde(default)]
    pub boranium: i32,
    #[serde(default)]
    pub germanium: i32,
    #[serde(default)]
    pub colonists: i32,
}

impl Cargo {
    pub fn new(ironium: i32, boranium: i32, germanium: i32, colonists: i32) -> Self {
        Self {
            ironium,
            boranium,
            germanium,
            colonists,
        }
    }

    pub fn total(&self) -> i32 {
        self.ironium + self.boranium + self.germanium + self.colonists
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Amount of a hold type. Fuel is never part of `Cargo` and reads as 0.
    pub fn get(&self, kind: CargoType) -> i32 {
        match kind {
            CargoType::Ironium => self.ironium,
            CargoType::Boranium => self.boranium,
            CargoType::Germanium => self.germanium,
            CargoType::Colonists => self.colonists,
            CargoType::Fuel => 0,
        }
    }

    fn slot_mut(&mut self, kind: CargoType) -> Option<&mut i32> {
        match kind {
            CargoType::Ironium => Some(&mut self.ironium),
            CargoType::Boranium => Some(&mut self.boranium),
            CargoType::Germanium => Some(&mut self.germanium),
            CargoType::Colonists => Some(&mut self.colonists),
            CargoType::Fuel => None,
        }
    }

    pub fn with(mut self, kind: CargoType, amount: i32) -> Self {
        if let Some(slot) = self.slot_mut(kind) {
            *slot += amount;
        }
        self
    }

    /// Minerals only; colonists are dropped.
    pub fn minerals(&self) -> Cargo {
        Cargo {
            colonists: 0,
            ..*self
        }
    }

    /// Each component multiplied by `factor`, truncated toward zero.
    #[allow(clippy::cast_possible_truncation)]
    pub fn scaled(&self, factor: f64) -> Cargo {
        let scale = |value: i32| (f64::from(value) * factor) as i32;
        Cargo::new(
            scale(self.ironium),
            scale(self.boranium),
            scale(self.germanium),
            scale(self.colonists),
        )
    }
}

impl std::ops::Add for Cargo {
    type Output = Cargo;

    fn add(self, rhs: Cargo) -> Cargo {
        Cargo::new(
            self.ironium + rhs.ironium,
            self.boranium + rhs.boranium,
            self.germanium + rhs.germanium,
            self.colonists + rhs.colonists,
        )
    }
}

impl std::ops::AddAssign for Cargo {
    fn add_assign(&mut self, rhs: Cargo) {
        *self = *self + rhs;
    }
}

/// A capacity or an available amount. `Unlimited` compares as always sufficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capacity {
    Limited(i32),
    Unlimited,
}

impl Capacity {
    pub fn is_unlimited(self) -> bool {
        matches!(self, Capacity::Unlimited)
    }

    /// Bound `amount` by this capacity.
    pub fn clamp(self, amount: i32) -> i32 {
        match self {
            Capacity::Limited(limit) => amount.min(limit),
            Capacity::Unlimited => amount,
        }
    }

    pub fn covers(self, amount: i32) -> bool {
        match self {
            Capacity::Limited(limit) => amount <= limit,
            Capacity::Unlimited => true,
        }
    }

    /// Room left after `used`, never negative.
    pub fn headroom(self, used: i32) -> Capacity {
        match self {
            Capacity::Limited(limit) => Capacity::Limited((limit - used).max(0)),
            Capacity::Unlimited => Capacity::Unlimited,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TransferError {
    #[error("cannot give up {requested} {kind}: only {available} held")]
    Insufficient {
        kind: CargoType,
        requested: i32,
        available: i32,
    },
    #[error("no room for {requested} {kind}: only {free} free")]
    NoRoom {
        kind: CargoType,
        requested: i32,
        free: i32,
    },
    #[error("negative amount {0}")]
    NegativeAmount(i32),
}

/// Anything that can store typed cargo and fuel.
pub trait CargoHolder {
    fn cargo(&self) -> Cargo;

    fn cargo_capacity(&self) -> Capacity;

    fn fuel(&self) -> i32;

    fn fuel_capacity(&self) -> Capacity;

    fn cargo_mut(&mut self) -> &mut Cargo;

    /// `None` for holders whose fuel is not tracked (a starbase tank, or no tank).
    fn fuel_mut(&mut self) -> Option<&mut i32>;

    /// Amount of `kind` that could be taken from this holder.
    fn available(&self, kind: CargoType) -> Capacity {
        match kind {
            CargoType::Fuel if self.fuel_capacity().is_unlimited() => Capacity::Unlimited,
            CargoType::Fuel => Capacity::Limited(self.fuel()),
            _ => Capacity::Limited(self.cargo().get(kind)),
        }
    }

    /// Room left for `kind`. Hold types share one pool.
    fn free_capacity(&self, kind: CargoType) -> Capacity {
        match kind {
            CargoType::Fuel => self.fuel_capacity().headroom(self.fuel()),
            _ => self.cargo_capacity().headroom(self.cargo().total()),
        }
    }

    /// True iff every negative entry of `delta` (and `fuel_delta`) can be given up.
    fn can_transfer(&self, delta: &Cargo, fuel_delta: i32) -> bool {
        let cargo = self.cargo();
        let cargo_ok = CargoType::HOLD.iter().all(|&kind| {
            let change = delta.get(kind);
            change >= 0 || cargo.get(kind) >= -change
        });
        let fuel_ok = fuel_delta >= 0 || self.available(CargoType::Fuel).covers(-fuel_delta);
        cargo_ok && fuel_ok
    }

    fn add(&mut self, kind: CargoType, amount: i32) -> Result<(), TransferError> {
        if amount < 0 {
            return Err(TransferError::NegativeAmount(amount));
        }
        let free = self.free_capacity(kind);
        if !free.covers(amount) {
            return Err(TransferError::NoRoom {
                kind,
                requested: amount,
                free: free.clamp(i32::MAX),
            });
        }
        match kind {
            CargoType::Fuel => {
                if let Some(fuel) = self.fuel_mut() {
                    *fuel += amount;
                }
            }
            _ => {
                let updated = self.cargo().with(kind, amount);
                *self.cargo_mut() = updated;
            }
        }
        Ok(())
    }

    fn subtract(&mut self, kind: CargoType, amount: i32) -> Result<(), TransferError> {
        if amount < 0 {
            return Err(TransferError::NegativeAmount(amount));
        }
        let available = self.available(kind);
        if !available.covers(amount) {
            return Err(TransferError::Insufficient {
                kind,
                requested: amount,
                available: available.clamp(i32::MAX),
            });
        }
        match kind {
            CargoType::Fuel => {
                if let Some(fuel) = self.fuel_mut() {
                    *fuel -= amount;
                }
            }
            _ => {
                let updated = self.cargo().with(kind, -amount);
                *self.cargo_mut() = updated;
            }
        }
        Ok(())
    }
}

/// Move `amount` of `kind` from `from` to `to`, checking both sides first.
pub fn transfer(
    from: &mut dyn CargoHolder,
    to: &mut dyn CargoHolder,
    kind: CargoType,
    amount: i32,
) -> Result<(), TransferError> {
    if amount < 0 {
        return Err(TransferError::NegativeAmount(amount));
    }
    if amount == 0 {
        return Ok(());
    }
    let available = from.available(kind);
    if !available.covers(amount) {
        return Err(TransferError::Insufficient {
            kind,
            requested: amount,
            available: available.clamp(i32::MAX),
        });
    }
    let free = to.free_capacity(kind);
    if !free.covers(amount) {
        return Err(TransferError::NoRoom {
            kind,
            requested: amount,
            free: free.clamp(i32::MAX),
        });
    }
    from.subtract(kind, amount)?;
    to.add(kind, amount)
}

impl CargoHolder for Fleet {
    fn cargo(&self) -> Cargo {
        self.cargo
    }

    fn cargo_capacity(&self) -> Capacity {
        Capacity::Limited(self.spec.cargo_capacity)
    }

    fn fuel(&self) -> i32 {
        self.fuel
    }

    fn fuel_capacity(&self) -> Capacity {
        Capacity::Limited(self.spec.fuel_capacity)
    }

    fn cargo_mut(&mut self) -> &mut Cargo {
        &mut self.cargo
    }

    fn fuel_mut(&mut self) -> Option<&mut i32> {
        Some(&mut self.fuel)
    }
}

impl CargoHolder for Planet {
    fn cargo(&self) -> Cargo {
        self.cargo
    }

    fn cargo_capacity(&self) -> Capacity {
        Capacity::Unlimited
    }

    fn fuel(&self) -> i32 {
        0
    }

    fn fuel_capacity(&self) -> Capacity {
        if self.has_starbase {
            Capacity::Unlimited
        } else {
            Capacity::Limited(0)
        }
    }

    fn cargo_mut(&mut self) -> &mut Cargo {
        &mut self.cargo
    }

    fn fuel_mut(&mut self) -> Option<&mut i32> {
        None
    }
}

impl CargoHolder for Salvage {
    fn cargo(&self) -> Cargo {
        self.cargo
    }

    fn cargo_capacity(&self) -> Capacity {
        Capacity::Unlimited
    }

    fn fuel(&self) -> i32 {
        0
    }

    fn fuel_capacity(&self) -> Capacity {
        Capacity::Limited(0)
    }

    fn cargo_mut(&mut self) -> &mut Cargo {
        &mut self.cargo
    }

    fn fuel_mut(&mut self) -> Option<&mut i32> {
        None
    }
}

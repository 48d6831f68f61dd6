use std::fmt;

use uuid::Uuid;

use crate::error::WorldError;

/// Host-scoped 32-bit object identifier. Simulators reuse these freely
/// across objects and over time; a LocalId is only meaningful relative to
/// one host, and only until the object leaves that host.
pub type LocalId = u32;

/// Dense index assigned to a simulator host. Index 0 is reserved/invalid,
/// which lets packed keys treat "never indexed" as falsy.
pub type HostIndex = u32;

/// Stable 128-bit object identifier, assigned once and never reused for
/// the object's entire existence.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GlobalId(Uuid);

impl GlobalId {
    pub fn new(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generates a fresh identifier for a locally-created object.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Debug for GlobalId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "GlobalId({})", self.0)
    }
}

impl fmt::Display for GlobalId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Handle identifying a region/simulator collaborator. The registry never
/// dereferences regions; it only compares and stores these.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct RegionId(pub u64);

/// Classification of a world object, fixed at creation. Picks the concrete
/// object behavior (and which drawable the renderer builds).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum TypeCode {
    Primitive,
    Avatar,
    Grass,
    Tree,
    ParticleSystem,
}

impl TypeCode {
    /// Parses the wire classification byte. Unknown codes are a
    /// malformed-create: the entry carrying them gets dropped and counted.
    pub fn from_wire(code: u8) -> Result<Self, WorldError> {
        match code {
            1 => Ok(Self::Primitive),
            2 => Ok(Self::Avatar),
            3 => Ok(Self::Grass),
            4 => Ok(Self::Tree),
            5 => Ok(Self::ParticleSystem),
            other => Err(WorldError::UnsupportedTypeCode(other)),
        }
    }

    pub fn to_wire(self) -> u8 {
        match self {
            Self::Primitive => 1,
            Self::Avatar => 2,
            Self::Grass => 3,
            Self::Tree => 4,
            Self::ParticleSystem => 5,
        }
    }

    pub fn is_avatar(self) -> bool {
        self == Self::Avatar
    }
}

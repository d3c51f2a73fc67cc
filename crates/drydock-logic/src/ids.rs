//! Id newtypes. Relations between assemblies, targets and containers are
//! expressed through these rather than references.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

id_type!(
    /// Stable identity of one dry-dock assembly.
    AssemblyId,
    "assembly"
);
id_type!(
    /// A movable structure (ship, station, projection) made of blocks.
    ContainerId,
    "container"
);
id_type!(
    /// One tool block of an assembly.
    ToolId,
    "tool"
);
id_type!(
    /// Stable identity of a target inside its assembly's pool.
    TargetId,
    "target"
);

/// Grid position of a block inside its container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The six face-adjacent positions.
    pub fn neighbors(&self) -> [BlockPos; 6] {
        let BlockPos { x, y, z } = *self;
        [
            BlockPos::new(x + 1, y, z),
            BlockPos::new(x - 1, y, z),
            BlockPos::new(x, y + 1, z),
            BlockPos::new(x, y - 1, z),
            BlockPos::new(x, y, z + 1),
            BlockPos::new(x, y, z - 1),
        ]
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.x, self.y, self.z)
    }
}

/// A block in a container. Also names the inventory that block carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BlockKey {
    pub container: ContainerId,
    pub pos: BlockPos,
}

impl BlockKey {
    pub fn new(container: ContainerId, pos: BlockPos) -> Self {
        Self { container, pos }
    }
}

impl fmt::Display for BlockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.container, self.pos)
    }
}

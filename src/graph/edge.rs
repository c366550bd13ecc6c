use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use serde::Serialize;

/// Why one generated type depends on another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EdgeKind {
    /// Referenced by a stored member.
    Field,
    /// Referenced as a supertype, superinterface or type-variable bound.
    Hierarchy,
    /// Referenced only from generated executable logic.
    Code,
}

impl EdgeKind {
    pub const ALL: [EdgeKind; 3] = [EdgeKind::Field, EdgeKind::Hierarchy, EdgeKind::Code];

    fn bit(self) -> u8 {
        match self {
            EdgeKind::Field => 0b001,
            EdgeKind::Hierarchy => 0b010,
            EdgeKind::Code => 0b100,
        }
    }
}

/// The set of kinds carried by one ordered pair of vertices. Repeated
/// discoveries merge by union.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct EdgeKinds(u8);

impl EdgeKinds {
    pub const EMPTY: EdgeKinds = EdgeKinds(0);
    pub const ALL: EdgeKinds = EdgeKinds(0b111);

    pub fn contains(self, kind: EdgeKind) -> bool {
        self.0 & kind.bit() != 0
    }

    pub fn intersects(self, other: EdgeKinds) -> bool {
        self.0 & other.0 != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn insert(&mut self, kind: EdgeKind) {
        self.0 |= kind.bit();
    }

    /// An empty filter accepts every kind.
    pub fn or_all(self) -> EdgeKinds {
        if self.is_empty() { EdgeKinds::ALL } else { self }
    }

    pub fn iter(self) -> impl Iterator<Item = EdgeKind> {
        EdgeKind::ALL.into_iter().filter(move |k| self.contains(*k))
    }
}

impl From<EdgeKind> for EdgeKinds {
    fn from(kind: EdgeKind) -> Self {
        EdgeKinds(kind.bit())
    }
}

impl FromIterator<EdgeKind> for EdgeKinds {
    fn from_iter<I: IntoIterator<Item = EdgeKind>>(iter: I) -> Self {
        let mut kinds = EdgeKinds::EMPTY;
        for kind in iter {
            kinds.insert(kind);
        }
        kinds
    }
}

impl BitOr for EdgeKinds {
    type Output = EdgeKinds;

    fn bitor(self, rhs: EdgeKinds) -> EdgeKinds {
        EdgeKinds(self.0 | rhs.0)
    }
}

impl BitOr for EdgeKind {
    type Output = EdgeKinds;

    fn bitor(self, rhs: EdgeKind) -> EdgeKinds {
        EdgeKinds::from(self) | EdgeKinds::from(rhs)
    }
}

impl BitOrAssign for EdgeKinds {
    fn bitor_assign(&mut self, rhs: EdgeKinds) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for EdgeKinds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl Serialize for EdgeKinds {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

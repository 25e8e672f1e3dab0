//! Quadrant and direction labels.
//!
//! A quadrant names one of the four children of a cell (and, equivalently, one of its
//! four corners). A direction names one of its four sides.
//!
//! ```text
//!              N
//!      NW ----------- NE
//!       |  NW  |  NE  |
//!     W |------+------| E
//!       |  SW  |  SE  |
//!      SW ----------- SE
//!              S
//! ```
//!
//! The neighbor tables used by [`find_neighbor`](crate::core::forest::Forest::find_neighbor)
//! live here as total matches over `(Quadrant, Direction)`.

use std::{fmt, str::FromStr};

use super::forest::ForestError;

// =============================================================================
// QUADRANT
// =============================================================================

/// One of the four quadrants (or corners) of a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Quadrant {
    /// North-west.
    NW,
    /// North-east.
    NE,
    /// South-west.
    SW,
    /// South-east.
    SE,
}

impl Quadrant {
    /// All quadrants in storage order (`children[q.index()]`).
    pub const ALL: [Self; 4] = [Self::NW, Self::NE, Self::SW, Self::SE];

    /// Counterclockwise order starting at the south-west corner.
    ///
    /// Used for leaf enumeration, point-location descent and corner listings.
    pub const COUNTERCLOCKWISE: [Self; 4] = [Self::SW, Self::SE, Self::NE, Self::NW];

    /// Storage index of this quadrant.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::NW => 0,
            Self::NE => 1,
            Self::SW => 2,
            Self::SE => 3,
        }
    }

    /// Offset of this quadrant within a 2×2 subdivision, as `(column, row)` with
    /// the origin in the south-west.
    #[inline]
    #[must_use]
    pub const fn offset(self) -> (usize, usize) {
        match self {
            Self::SW => (0, 0),
            Self::SE => (1, 0),
            Self::NW => (0, 1),
            Self::NE => (1, 1),
        }
    }

    /// Returns `true` if this quadrant touches side `direction` of its parent.
    #[inline]
    #[must_use]
    pub const fn touches(self, direction: Direction) -> bool {
        matches!(
            (self, direction),
            (Self::NW | Self::NE, Direction::N)
                | (Self::SW | Self::SE, Direction::S)
                | (Self::NE | Self::SE, Direction::E)
                | (Self::NW | Self::SW, Direction::W)
        )
    }

    /// The sibling across side `direction`, when that sibling lies inside the same
    /// parent.
    ///
    /// Returns `None` when `self` touches side `direction` of the parent, in which case
    /// the neighbor is outside the parent and [`Quadrant::exterior_neighbor`] applies.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quadforest::core::quadrant::{Direction, Quadrant};
    ///
    /// assert_eq!(Quadrant::SW.interior_neighbor(Direction::N), Some(Quadrant::NW));
    /// assert_eq!(Quadrant::NW.interior_neighbor(Direction::N), None);
    /// ```
    #[must_use]
    pub const fn interior_neighbor(self, direction: Direction) -> Option<Self> {
        match (self, direction) {
            (Self::SW, Direction::N) => Some(Self::NW),
            (Self::SE, Direction::N) => Some(Self::NE),
            (Self::NW, Direction::S) => Some(Self::SW),
            (Self::NE, Direction::S) => Some(Self::SE),
            (Self::SW, Direction::E) => Some(Self::SE),
            (Self::NW, Direction::E) => Some(Self::NE),
            (Self::SE, Direction::W) => Some(Self::SW),
            (Self::NE, Direction::W) => Some(Self::NW),
            (Self::NW | Self::NE, Direction::N)
            | (Self::SW | Self::SE, Direction::S)
            | (Self::NE | Self::SE, Direction::E)
            | (Self::NW | Self::SW, Direction::W) => None,
        }
    }

    /// The child of the parent's neighbor across `direction` that is adjacent to
    /// `self`: the inverse of [`Quadrant::interior_neighbor`] for that direction.
    ///
    /// Returns `None` when the neighbor lies inside the same parent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use quadforest::core::quadrant::{Direction, Quadrant};
    ///
    /// // A north-west child looking north sees the south-west child of the
    /// // parent's northern neighbor.
    /// assert_eq!(Quadrant::NW.exterior_neighbor(Direction::N), Some(Quadrant::SW));
    /// assert_eq!(Quadrant::SW.exterior_neighbor(Direction::N), None);
    /// ```
    #[must_use]
    pub const fn exterior_neighbor(self, direction: Direction) -> Option<Self> {
        match (self, direction) {
            (Self::NW, Direction::N) => Some(Self::SW),
            (Self::NE, Direction::N) => Some(Self::SE),
            (Self::SW, Direction::S) => Some(Self::NW),
            (Self::SE, Direction::S) => Some(Self::NE),
            (Self::SE, Direction::E) => Some(Self::SW),
            (Self::NE, Direction::E) => Some(Self::NW),
            (Self::SW, Direction::W) => Some(Self::SE),
            (Self::NW, Direction::W) => Some(Self::NE),
            (Self::SW | Self::SE, Direction::N)
            | (Self::NW | Self::NE, Direction::S)
            | (Self::SW | Self::NW, Direction::E)
            | (Self::SE | Self::NE, Direction::W) => None,
        }
    }

    /// Short label (`"NW"`, `"NE"`, `"SW"`, `"SE"`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NW => "NW",
            Self::NE => "NE",
            Self::SW => "SW",
            Self::SE => "SE",
        }
    }
}

impl fmt::Display for Quadrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Quadrant {
    type Err = ForestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NW" => Ok(Self::NW),
            "NE" => Ok(Self::NE),
            "SW" => Ok(Self::SW),
            "SE" => Ok(Self::SE),
            _ => Err(ForestError::InvalidQuadrant {
                found: s.to_string(),
            }),
        }
    }
}

// =============================================================================
// DIRECTION
// =============================================================================

/// One of the four sides of a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    /// North (`+y`).
    N,
    /// South (`-y`).
    S,
    /// East (`+x`).
    E,
    /// West (`-x`).
    W,
}

impl Direction {
    /// All directions in storage order (`edges[d.index()]`).
    pub const ALL: [Self; 4] = [Self::N, Self::S, Self::E, Self::W];

    /// Storage index of this direction.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::N => 0,
            Self::S => 1,
            Self::E => 2,
            Self::W => 3,
        }
    }

    /// The direction pointing the other way.
    #[inline]
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::N => Self::S,
            Self::S => Self::N,
            Self::E => Self::W,
            Self::W => Self::E,
        }
    }

    /// Corners bounding this side, oriented counterclockwise around the cell.
    ///
    /// `S: SW→SE`, `E: SE→NE`, `N: NE→NW`, `W: NW→SW`.
    #[inline]
    #[must_use]
    pub const fn endpoints(self) -> (Quadrant, Quadrant) {
        match self {
            Self::S => (Quadrant::SW, Quadrant::SE),
            Self::E => (Quadrant::SE, Quadrant::NE),
            Self::N => (Quadrant::NE, Quadrant::NW),
            Self::W => (Quadrant::NW, Quadrant::SW),
        }
    }

    /// Single-letter label.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::N => 'N',
            Self::S => 'S',
            Self::E => 'E',
            Self::W => 'W',
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl TryFrom<char> for Direction {
    type Error = ForestError;

    /// Parses `'N'`, `'S'`, `'E'` or `'W'` (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::InvalidDirection`] for any other character.
    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c.to_ascii_uppercase() {
            'N' => Ok(Self::N),
            'S' => Ok(Self::S),
            'E' => Ok(Self::E),
            'W' => Ok(Self::W),
            _ => Err(ForestError::InvalidDirection {
                found: c.to_string(),
            }),
        }
    }
}

impl FromStr for Direction {
    type Err = ForestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::try_from(c).map_err(|_| ForestError::InvalidDirection {
                found: s.to_string(),
            }),
            _ => Err(ForestError::InvalidDirection {
                found: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quadrant_indices_are_a_permutation() {
        let mut seen = [false; 4];
        for q in Quadrant::ALL {
            assert!(!seen[q.index()]);
            seen[q.index()] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn interior_and_exterior_tables_partition_every_pair() {
        for q in Quadrant::ALL {
            for d in Direction::ALL {
                let interior = q.interior_neighbor(d);
                let exterior = q.exterior_neighbor(d);
                assert_ne!(
                    interior.is_some(),
                    exterior.is_some(),
                    "({q}, {d}) must be exactly one of interior/exterior"
                );
                assert_eq!(exterior.is_some(), q.touches(d));
            }
        }
    }

    #[test]
    fn exterior_table_is_the_inverse_of_the_interior_table() {
        for d in Direction::ALL {
            for q in Quadrant::ALL {
                if let Some(sibling) = q.interior_neighbor(d) {
                    // The sibling across `d` sees `q` as the adjacent child when it
                    // looks back across `d` from the neighboring parent.
                    assert_eq!(sibling.exterior_neighbor(d), Some(q));
                }
            }
        }
    }

    #[test]
    fn interior_neighbor_is_symmetric() {
        for q in Quadrant::ALL {
            for d in Direction::ALL {
                if let Some(n) = q.interior_neighbor(d) {
                    assert_eq!(n.interior_neighbor(d.opposite()), Some(q));
                }
            }
        }
    }

    #[test]
    fn direction_parsing() {
        assert_eq!(Direction::try_from('n').unwrap(), Direction::N);
        assert_eq!("W".parse::<Direction>().unwrap(), Direction::W);
        assert!(matches!(
            Direction::try_from('X'),
            Err(ForestError::InvalidDirection { .. })
        ));
        assert!(matches!(
            "NE".parse::<Direction>(),
            Err(ForestError::InvalidDirection { .. })
        ));
        assert!(matches!(
            "".parse::<Direction>(),
            Err(ForestError::InvalidDirection { .. })
        ));
    }

    #[test]
    fn quadrant_parsing() {
        assert_eq!("sw".parse::<Quadrant>().unwrap(), Quadrant::SW);
        assert!(matches!(
            "M".parse::<Quadrant>(),
            Err(ForestError::InvalidQuadrant { .. })
        ));
    }

    #[test]
    fn edge_endpoints_run_counterclockwise() {
        let order = Quadrant::COUNTERCLOCKWISE;
        for d in Direction::ALL {
            let (a, b) = d.endpoints();
            let ia = order.iter().position(|&q| q == a).unwrap();
            let ib = order.iter().position(|&q| q == b).unwrap();
            assert_eq!((ia + 1) % 4, ib, "{d} edge must run counterclockwise");
        }
    }

    #[test]
    fn direction_opposite_is_an_involution() {
        for d in Direction::ALL {
            assert_ne!(d, d.opposite());
            assert_eq!(d, d.opposite().opposite());
        }
    }
}

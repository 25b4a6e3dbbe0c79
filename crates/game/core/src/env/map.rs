use crate::state::Position;

/// Read-only map geometry used for path planning.
pub trait Pathable: Send + Sync {
    fn bounds(&self) -> MapBounds;

    /// Tile at `position`, or `None` outside the map.
    fn tile(&self, position: Position) -> Option<TileInfo>;

    fn contains(&self, position: Position) -> bool {
        self.bounds().contains(position)
    }

    /// Terrain allows standing on the tile (creatures are not considered).
    fn is_passable(&self, position: Position) -> bool {
        self.contains(position) && self.tile(position).is_some_and(|tile| tile.passable)
    }

    /// A creature currently stands on the tile.
    fn is_occupied(&self, position: Position) -> bool {
        self.tile(position).is_some_and(|tile| tile.occupied)
    }
}

/// Coordinate domain of a map.
///
/// `x` and `y` are half-open (`min..max`), `z` is inclusive (`min_z..=max_z`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapBounds {
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
    pub min_z: i32,
    pub max_z: i32,
}

impl MapBounds {
    pub const fn new(width: i32, height: i32, min_z: i32, max_z: i32) -> Self {
        Self {
            min_x: 0,
            max_x: width,
            min_y: 0,
            max_y: height,
            min_z,
            max_z,
        }
    }

    /// Single-level map of the given size.
    pub const fn flat(width: i32, height: i32) -> Self {
        Self::new(width, height, 0, 0)
    }

    pub fn contains(&self, position: Position) -> bool {
        position.x >= self.min_x
            && position.x < self.max_x
            && position.y >= self.min_y
            && position.y < self.max_y
            && position.z >= self.min_z
            && position.z <= self.max_z
    }

    /// Nearest in-bounds position.
    pub fn clamp(&self, position: Position) -> Position {
        Position {
            x: position.x.clamp(self.min_x, (self.max_x - 1).max(self.min_x)),
            y: position.y.clamp(self.min_y, (self.max_y - 1).max(self.min_y)),
            z: position.z.clamp(self.min_z, self.max_z.max(self.min_z)),
        }
    }
}

impl Default for MapBounds {
    /// 132×132 tiles over 21 levels.
    fn default() -> Self {
        Self::new(132, 132, -10, 10)
    }
}

/// Passability and occupancy of a single tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileInfo {
    pub passable: bool,
    pub occupied: bool,
}

impl TileInfo {
    pub const FLOOR: Self = Self {
        passable: true,
        occupied: false,
    };

    pub const WALL: Self = Self {
        passable: false,
        occupied: false,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bounds() {
        let bounds = MapBounds::default();
        assert!(bounds.contains(Position::new(0, 0, -10)));
        assert!(bounds.contains(Position::new(131, 131, 10)));
        assert!(!bounds.contains(Position::new(132, 0, 0)));
        assert!(!bounds.contains(Position::new(0, 0, 11)));
        assert!(!bounds.contains(Position::new(-1, 0, 0)));
    }

    #[test]
    fn clamp_pulls_into_bounds() {
        let bounds = MapBounds::flat(10, 10);
        assert_eq!(
            bounds.clamp(Position::new(-4, 14, 3)),
            Position::new(0, 9, 0)
        );
    }
}

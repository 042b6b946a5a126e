//! Grid coordinate arithmetic, direction conversion and ray rasterization.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Coords {
    pub x: i32,
    pub y: i32,
}

impl Coords {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

impl fmt::Display for Coords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub fn contains(self, at: Coords) -> bool {
        at.x >= 0 && at.y >= 0 && at.x < self.width && at.y < self.height
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// 8-way compass direction on a screen-oriented grid (y grows downwards,
/// angles grow clockwise, 0 degrees points east).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Direction {
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
    North,
    NorthEast,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
        Direction::North,
        Direction::NorthEast,
    ];

    pub fn angle_degrees(self) -> f64 {
        match self {
            Direction::East => 0.0,
            Direction::SouthEast => 45.0,
            Direction::South => 90.0,
            Direction::SouthWest => 135.0,
            Direction::West => 180.0,
            Direction::NorthWest => 225.0,
            Direction::North => 270.0,
            Direction::NorthEast => 315.0,
        }
    }

    /// Nearest 45-degree sector for an arbitrary angle.
    pub fn from_angle(degrees: f64) -> Self {
        let normalized = degrees.rem_euclid(360.0);
        let sector = ((normalized + 22.5) / 45.0).floor() as usize % 8;
        Self::ALL[sector]
    }

    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::East => (1, 0),
            Direction::SouthEast => (1, 1),
            Direction::South => (0, 1),
            Direction::SouthWest => (-1, 1),
            Direction::West => (-1, 0),
            Direction::NorthWest => (-1, -1),
            Direction::North => (0, -1),
            Direction::NorthEast => (1, -1),
        }
    }

    pub fn from_offset(dx: i32, dy: i32) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|direction| direction.offset() == (dx, dy))
    }

    pub fn rotated(self, delta_degrees: f64) -> Self {
        Self::from_angle(self.angle_degrees() + delta_degrees)
    }
}

/// Bresenham rasterization of the segment between two cells, inclusive of
/// both endpoints.
pub fn line(from: Coords, to: Coords) -> Vec<Coords> {
    let dx = (to.x - from.x).abs();
    let dy = -(to.y - from.y).abs();
    let sx = if from.x < to.x { 1 } else { -1 };
    let sy = if from.y < to.y { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (from.x, from.y);
    let mut cells = Vec::new();
    loop {
        cells.push(Coords::new(x, y));
        if x == to.x && y == to.y {
            break;
        }
        let doubled = 2 * err;
        if doubled >= dy {
            err += dy;
            x += sx;
        }
        if doubled <= dx {
            err += dx;
            y += sy;
        }
    }
    cells
}

/// Last cell of a ray cast from `from` along `angle_degrees` for `distance`
/// steps. A zero distance projects back onto `from`.
pub fn project(from: Coords, angle_degrees: f64, distance: i32) -> Coords {
    let radians = angle_degrees.to_radians();
    let to = Coords::new(
        from.x + (radians.cos() * f64::from(distance)).round() as i32,
        from.y + (radians.sin() * f64::from(distance)).round() as i32,
    );
    line(from, to).last().copied().unwrap_or(from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn angles_round_trip_through_sectors() {
        for direction in Direction::ALL {
            assert_eq!(Direction::from_angle(direction.angle_degrees()), direction);
        }
        assert_eq!(Direction::from_angle(10.0), Direction::East);
        assert_eq!(Direction::from_angle(-10.0), Direction::East);
        assert_eq!(Direction::from_angle(100.0), Direction::South);
        assert_eq!(Direction::from_angle(361.0), Direction::East);
    }

    #[test]
    fn offsets_round_trip() {
        for direction in Direction::ALL {
            let (dx, dy) = direction.offset();
            assert_eq!(Direction::from_offset(dx, dy), Some(direction));
        }
        assert_eq!(Direction::from_offset(2, 0), None);
        assert_eq!(Direction::from_offset(0, 0), None);
    }

    #[test]
    fn rotation_wraps_around() {
        assert_eq!(Direction::East.rotated(45.0), Direction::SouthEast);
        assert_eq!(Direction::East.rotated(-45.0), Direction::NorthEast);
        assert_eq!(Direction::North.rotated(90.0), Direction::East);
    }

    #[test]
    fn line_includes_both_endpoints() {
        let cells = line(Coords::new(0, 0), Coords::new(3, 1));
        assert_eq!(cells.first(), Some(&Coords::new(0, 0)));
        assert_eq!(cells.last(), Some(&Coords::new(3, 1)));
        assert_eq!(cells.len(), 4);
    }

    #[test]
    fn single_step_projection_hits_the_neighbor_ring() {
        let origin = Coords::new(5, 5);
        assert_eq!(project(origin, 0.0, 1), Coords::new(6, 5));
        assert_eq!(project(origin, 90.0, 1), Coords::new(5, 6));
        assert_eq!(project(origin, 225.0, 1), Coords::new(4, 4));
        assert_eq!(project(origin, 30.0, 1), Coords::new(6, 6));
        assert_eq!(project(origin, 12.0, 1), Coords::new(6, 5));
    }
}

use std::ops::{Add, Mul, Sub};

/// Center point of a grid cell, in arena pixels.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
pub struct Pos {
    pub x: i32,
    pub y: i32,
}

#[macro_export]
macro_rules! pos {
    ($x:expr, $y:expr) => {
        Pos { x: $x, y: $y }
    };
}

impl Pos {
    pub fn distance_sq(self, other: Self) -> i64 {
        let dx = (self.x - other.x) as i64;
        let dy = (self.y - other.y) as i64;
        dx * dx + dy * dy
    }

    /// orders by row first, which is how cells read on screen.
    pub fn row_major(self) -> (i32, i32) {
        (self.y, self.x)
    }
}

impl Add for Pos {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        pos!(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Pos {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        pos!(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<i32> for Pos {
    type Output = Self;
    fn mul(self, rhs: i32) -> Self::Output {
        pos!(self.x * rhs, self.y * rhs)
    }
}

/// the 8 unit offsets of the moore neighborhood.
pub fn moore_offsets() -> impl Iterator<Item = Pos> {
    (-1..=1)
        .flat_map(|y| (-1..=1).map(move |x| pos!(x, y)))
        .filter(|p| *p != pos!(0, 0))
}

#[test]
fn test_moore_offsets() {
    let offsets: Vec<_> = moore_offsets().collect();
    assert_eq!(offsets.len(), 8);
    assert!(!offsets.contains(&pos!(0, 0)));
    assert!(offsets.contains(&pos!(-1, -1)));
    assert!(offsets.contains(&pos!(1, 1)));
}

#[test]
fn test_arithmetic() {
    assert_eq!(pos!(3, 4) + pos!(1, -1), pos!(4, 3));
    assert_eq!(pos!(3, 4) - pos!(1, -1), pos!(2, 5));
    assert_eq!(pos!(1, -2) * 7, pos!(7, -14));
    assert_eq!(pos!(0, 0).distance_sq(pos!(3, 4)), 25);
}

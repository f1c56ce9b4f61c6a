use std::collections::HashSet;

use metrohash::MetroBuildHasher;

use crate::{Pos, World};

#[derive(Debug, Clone, Default)]
pub struct HashedWorld {
    cells: HashSet<Pos, MetroBuildHasher>,
}

impl World for HashedWorld {
    fn contains(&self, pos: Pos) -> bool {
        self.cells.contains(&pos)
    }

    fn add(&mut self, pos: Pos) {
        self.cells.insert(pos);
    }

    fn remove(&mut self, pos: Pos) {
        self.cells.remove(&pos);
    }

    fn clear(&mut self) {
        self.cells.clear();
    }

    fn len(&self) -> usize {
        self.cells.len()
    }

    fn actives(&self) -> Vec<Pos> {
        let mut actives: Vec<_> = self.cells.iter().copied().collect();
        actives.sort_by_key(|p| p.row_major());
        actives
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pos;

    #[test]
    fn add_is_idempotent() {
        let mut world = HashedWorld::default();
        world.add(pos!(3, 3));
        world.add(pos!(3, 3));
        assert_eq!(world.len(), 1);
        assert!(world.contains(pos!(3, 3)));
    }

    #[test]
    fn remove_absent_is_noop() {
        let mut world = HashedWorld::default();
        world.add(pos!(3, 3));
        world.remove(pos!(10, 3));
        assert_eq!(world.actives(), vec![pos!(3, 3)]);
        world.remove(pos!(3, 3));
        assert!(world.is_empty());
    }

    #[test]
    fn clear_and_snapshot() {
        let mut world = HashedWorld::default();
        world.add(pos!(10, 3));
        world.add(pos!(3, 10));
        world.add(pos!(3, 3));
        assert_eq!(world.actives(), vec![pos!(3, 3), pos!(10, 3), pos!(3, 10)]);

        let snapshot = world.clone();
        world.clear();
        assert!(world.is_empty());
        assert_eq!(snapshot.len(), 3);
    }
}

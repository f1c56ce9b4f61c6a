use crate::Pos;

/// The set of currently alive cells. Membership is the only notion of alive.
pub trait World: Default + Clone + Send + 'static {
    fn contains(&self, pos: Pos) -> bool;
    /// does nothing when `pos` is already alive.
    fn add(&mut self, pos: Pos);
    /// does nothing when `pos` is not alive.
    fn remove(&mut self, pos: Pos);
    fn clear(&mut self);
    fn len(&self) -> usize;
    fn actives(&self) -> Vec<Pos>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub use hashed_world::HashedWorld;
mod hashed_world;

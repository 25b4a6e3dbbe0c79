//! In-memory grid world implementing [`Pathable`] and [`Perceivable`].
use std::collections::HashSet;

use super::{MapBounds, Pathable, Perceivable, TileInfo};
use crate::state::{EntityId, EntityInfo, Position};
use crate::WorldError;

/// Grid map with blocked tiles and a list of entities.
///
/// Every in-bounds tile is floor unless marked as a wall. Entities are kept
/// in insertion order so perception is deterministic.
#[derive(Clone, Debug, Default)]
pub struct GridMap {
    bounds: MapBounds,
    walls: HashSet<Position>,
    entities: Vec<EntityInfo>,
}

impl GridMap {
    pub fn new(bounds: MapBounds) -> Self {
        Self {
            bounds,
            walls: HashSet::new(),
            entities: Vec::new(),
        }
    }

    pub fn add_wall(&mut self, position: Position) {
        self.walls.insert(position);
    }

    /// Walls every tile of the inclusive lateral rectangle on level `z`.
    pub fn add_wall_rect(&mut self, from: Position, to: Position) {
        for x in from.x.min(to.x)..=from.x.max(to.x) {
            for y in from.y.min(to.y)..=from.y.max(to.y) {
                self.walls.insert(Position::new(x, y, from.z));
            }
        }
    }

    pub fn remove_wall(&mut self, position: Position) {
        self.walls.remove(&position);
    }

    /// Adds an entity, replacing any previous entity with the same id.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`] if the entity is placed outside the map.
    pub fn insert_entity(&mut self, entity: EntityInfo) -> Result<(), WorldError> {
        if !self.bounds.contains(entity.position) {
            return Err(WorldError::OutOfBounds(entity.position));
        }
        match self.entities.iter_mut().find(|e| e.id == entity.id) {
            Some(existing) => *existing = entity,
            None => self.entities.push(entity),
        }
        Ok(())
    }

    pub fn remove_entity(&mut self, id: EntityId) -> Option<EntityInfo> {
        let index = self.entities.iter().position(|e| e.id == id)?;
        Some(self.entities.remove(index))
    }

    /// Moves an entity and marks it as moving (audible) for this turn.
    ///
    /// # Errors
    ///
    /// Fails if the entity is unknown or the destination is outside the map.
    pub fn move_entity(&mut self, id: EntityId, to: Position) -> Result<(), WorldError> {
        if !self.bounds.contains(to) {
            return Err(WorldError::OutOfBounds(to));
        }
        let entity = self
            .entities
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(WorldError::UnknownEntity(id))?;
        entity.moving = entity.position != to;
        entity.position = to;
        Ok(())
    }

    /// Clears every entity's moving flag; call once per turn.
    pub fn settle(&mut self) {
        for entity in &mut self.entities {
            entity.moving = false;
        }
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut EntityInfo> {
        self.entities.iter_mut().find(|e| e.id == id)
    }
}

impl Pathable for GridMap {
    fn bounds(&self) -> MapBounds {
        self.bounds
    }

    fn tile(&self, position: Position) -> Option<TileInfo> {
        if !self.bounds.contains(position) {
            return None;
        }
        Some(TileInfo {
            passable: !self.walls.contains(&position),
            occupied: self.entities.iter().any(|e| e.position == position),
        })
    }
}

impl Perceivable for GridMap {
    fn entities(&self) -> Vec<EntityInfo> {
        self.entities.clone()
    }

    fn entity(&self, id: EntityId) -> Option<EntityInfo> {
        self.entities.iter().find(|e| e.id == id).cloned()
    }
}

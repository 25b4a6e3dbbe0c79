//! A* pathfinding with a per-agent result cache.
mod astar;
mod cache;
mod path;

pub use astar::search;
pub use cache::{PathCache, PathCacheEntry, PathCacheSnapshot};
pub use path::{
    DIAGONAL_COST, LEVEL_CHANGE_MULTIPLIER, ORTHOGONAL_COST, Path, PathRequest, heuristic,
    step_cost,
};

use game_core::{Pathable, Position};
use tracing::debug;

use crate::config::PathfindingConfig;
use crate::error::PathError;

/// Path planner owned by exactly one agent.
#[derive(Clone, Debug)]
pub struct Pathfinder {
    config: PathfindingConfig,
    cache: PathCache,
}

impl Pathfinder {
    pub fn new(config: PathfindingConfig) -> Self {
        let cache = PathCache::new(
            config.max_cache_size,
            config.cache_timeout_ms,
            config.eviction_keep_ratio,
        );
        Self { config, cache }
    }

    pub fn config(&self) -> &PathfindingConfig {
        &self.config
    }

    /// A request using this planner's default diagonal and cost settings.
    pub fn request(&self, start: Position, end: Position) -> PathRequest {
        PathRequest::new(start, end)
            .allow_diagonal(self.config.allow_diagonal)
            .max_cost(self.config.default_max_cost)
    }

    /// Finds a path, consulting the cache first.
    ///
    /// Cache entries are keyed by `(start, end)` only; a live entry is
    /// returned regardless of the request's other options. Only successful
    /// searches are cached.
    ///
    /// # Errors
    ///
    /// Returns the [`PathError`] describing why no path was produced.
    pub fn find_path<M>(&mut self, map: &M, request: PathRequest, now: u64) -> Result<Path, PathError>
    where
        M: Pathable + ?Sized,
    {
        if let Some(path) = self.cache.lookup(request.start, request.end, now) {
            debug!(target: "npc_ai::pathfinding", start = %request.start, end = %request.end, "cache hit");
            return Ok(path);
        }
        debug!(target: "npc_ai::pathfinding", start = %request.start, end = %request.end, "cache miss");

        let path = search(map, &request, self.config.max_expansions)?;
        self.cache.insert(request.start, request.end, path.clone(), now);
        Ok(path)
    }

    /// Shorthand for [`find_path`](Self::find_path) with default options.
    pub fn path_to<M>(&mut self, map: &M, start: Position, end: Position, now: u64) -> Result<Path, PathError>
    where
        M: Pathable + ?Sized,
    {
        let request = self.request(start, end);
        self.find_path(map, request, now)
    }

    pub fn is_reachable<M>(&mut self, map: &M, start: Position, end: Position, now: u64) -> bool
    where
        M: Pathable + ?Sized,
    {
        self.path_to(map, start, end, now).is_ok()
    }

    pub fn maintain_cache(&mut self, now: u64) {
        self.cache.maintain(now);
    }

    /// Forgets a cached route, e.g. once the map changed under it.
    pub fn invalidate(&mut self, start: Position, end: Position) -> bool {
        self.cache.invalidate(start, end)
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn cache_entry(&self, start: Position, end: Position) -> Option<&PathCacheEntry> {
        self.cache.get(start, end)
    }

    pub fn cache(&self) -> &PathCache {
        &self.cache
    }

    pub fn snapshot(&self) -> PathCacheSnapshot {
        self.cache.snapshot()
    }

    pub fn restore(&mut self, snapshot: PathCacheSnapshot) {
        self.cache.restore(snapshot);
    }
}

impl Default for Pathfinder {
    fn default() -> Self {
        Self::new(PathfindingConfig::default())
    }
}

//! Multi-agent registry.
//!
//! A [`Fleet`] holds every agent behind its own [`Mutex`], so one agent's
//! ingestion never blocks another's and a fusion pass has exclusive access
//! to the destination map for its full duration.  Fusion copies the source
//! map under the source's lock, releases it, and only then locks the
//! destination; two agent locks are never held at once.
//!
//! # Example
//!
//! ```rust
//! use occumap_runtime::Fleet;
//! use occumap_types::{GridDims, Position};
//!
//! let dims = GridDims::new(6, 6);
//! let mut fleet = Fleet::new();
//! let a = fleet.create_agent("alpha", Position::new(1, 1), dims).unwrap();
//! let b = fleet.create_agent("bravo", Position::new(4, 4), dims).unwrap();
//!
//! fleet.ingest_all(&[(a, [[0; 3]; 3]), (b, [[1; 3]; 3])]).unwrap();
//! fleet.synchronize().unwrap();
//!
//! let alpha = fleet.snapshot(a).unwrap();
//! assert_eq!(alpha.recency().get(Position::new(4, 4)), Some(Some(1.0)));
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use occumap_perception::{FusionReport, IngestReport, MapLayers};
use occumap_types::{Action, GridDims, MapError, ObservationWindow, Position};
use rayon::prelude::*;
use tracing::{debug, info};
use uuid::Uuid;

use crate::agent::Agent;
use crate::config::MapperConfig;

// ────────────────────────────────────────────────────────────────────────────
// Handles
// ────────────────────────────────────────────────────────────────────────────

/// Opaque reference to an agent registered in a [`Fleet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AgentHandle(Uuid);

impl AgentHandle {
    pub fn id(&self) -> Uuid {
        self.0
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Fleet
// ────────────────────────────────────────────────────────────────────────────

/// Registry of independently locked agents.
#[derive(Default)]
pub struct Fleet {
    config: MapperConfig,
    agents: HashMap<Uuid, Arc<Mutex<Agent>>>,
    /// Creation order, so whole-fleet passes are deterministic.
    order: Vec<Uuid>,
}

impl Fleet {
    /// Empty fleet using the default configuration for new agents.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty fleet whose agents are built from `config`.
    pub fn with_config(config: MapperConfig) -> Result<Self, MapError> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::default()
        })
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Handles of every agent, in creation order.
    pub fn handles(&self) -> Vec<AgentHandle> {
        self.order.iter().copied().map(AgentHandle).collect()
    }

    /// Create and register a new agent.
    pub fn create_agent(
        &mut self,
        name: impl Into<String>,
        position: Position,
        dims: GridDims,
    ) -> Result<AgentHandle, MapError> {
        let agent = Agent::with_config(name, position, dims, self.config.clone())?;
        let id = agent.id();
        self.agents.insert(id, Arc::new(Mutex::new(agent)));
        self.order.push(id);
        Ok(AgentHandle(id))
    }

    /// Run `f` with exclusive access to one agent.
    pub fn with_agent<R>(
        &self,
        handle: AgentHandle,
        f: impl FnOnce(&mut Agent) -> R,
    ) -> Result<R, MapError> {
        let mut guard = self.lock(handle)?;
        Ok(f(&mut guard))
    }

    pub fn step(&self, handle: AgentHandle, action: Action) -> Result<Position, MapError> {
        self.with_agent(handle, |a| a.step(action))
    }

    pub fn ingest_observation(
        &self,
        handle: AgentHandle,
        window: &ObservationWindow,
    ) -> Result<IngestReport, MapError> {
        self.with_agent(handle, |a| a.ingest_observation(window))
    }

    /// Owned copy of one agent's map.
    pub fn snapshot(&self, handle: AgentHandle) -> Result<MapLayers, MapError> {
        self.with_agent(handle, |a| a.snapshot())
    }

    /// Ingest one window per agent, in parallel across agents.
    ///
    /// Windows addressed to the same agent are serialised by that agent's
    /// lock; their relative order is unspecified.
    ///
    /// Every handle is checked before any window is applied, so an unknown
    /// handle rejects the whole batch with no agent touched.
    pub fn ingest_all(
        &self,
        batch: &[(AgentHandle, ObservationWindow)],
    ) -> Result<Vec<IngestReport>, MapError> {
        if let Some((missing, _)) = batch.iter().find(|(h, _)| !self.agents.contains_key(&h.0)) {
            return Err(MapError::UnknownAgent(missing.0));
        }
        batch
            .par_iter()
            .map(|(handle, window)| self.ingest_observation(*handle, window))
            .collect()
    }

    /// Fuse `src`'s map into `dst`.  Fusing an agent with itself is a no-op.
    pub fn fuse(&self, dst: AgentHandle, src: AgentHandle) -> Result<FusionReport, MapError> {
        if dst == src {
            self.lock(dst)?;
            return Ok(FusionReport::default());
        }
        let source = self.snapshot(src)?;
        let report = self.with_agent(dst, |a| a.fuse_from(&source))??;
        debug!(dst = %dst.0, src = %src.0, adopted = report.adopted, "fleet fusion");
        Ok(report)
    }

    /// Fuse every agent's map into every other agent.
    ///
    /// All sources are snapshotted first, so the result does not depend on
    /// the order in which destinations are visited.  Afterwards every agent
    /// holds, per cell, the values of whichever agent observed it last; on
    /// equal recency an agent keeps its own values.
    pub fn synchronize(&self) -> Result<usize, MapError> {
        let snapshots = self
            .order
            .iter()
            .map(|id| Ok((*id, self.snapshot(AgentHandle(*id))?)))
            .collect::<Result<Vec<_>, MapError>>()?;

        let mut adopted = 0;
        for dst in &self.order {
            let mut agent = self.lock(AgentHandle(*dst))?;
            for (src, layers) in &snapshots {
                if src != dst {
                    adopted += agent.fuse_from(layers)?.adopted;
                }
            }
        }
        info!(agents = self.order.len(), adopted, "fleet synchronized");
        Ok(adopted)
    }

    fn lock(&self, handle: AgentHandle) -> Result<MutexGuard<'_, Agent>, MapError> {
        let cell = self
            .agents
            .get(&handle.0)
            .ok_or(MapError::UnknownAgent(handle.0))?;
        cell.lock()
            .map_err(|_| MapError::AgentUnavailable(format!("agent {} lock poisoned", handle.0)))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn dims() -> GridDims {
        GridDims::new(5, 5)
    }

    #[test]
    fn create_and_step() {
        let mut fleet = Fleet::new();
        let h = fleet.create_agent("a", Position::new(0, 0), dims()).unwrap();
        assert_eq!(fleet.len(), 1);
        assert_eq!(fleet.step(h, Action::Right).unwrap(), Position::new(0, 1));
        assert_eq!(fleet.with_agent(h, |a| a.time()).unwrap(), 1);
    }

    #[test]
    fn unknown_handle_is_an_error() {
        let fleet = Fleet::new();
        let ghost = AgentHandle(Uuid::new_v4());
        assert_eq!(
            fleet.step(ghost, Action::Up).unwrap_err(),
            MapError::UnknownAgent(ghost.id())
        );
    }

    #[test]
    fn invalid_agent_is_not_registered() {
        let mut fleet = Fleet::new();
        assert!(fleet.create_agent("bad", Position::new(9, 9), dims()).is_err());
        assert!(fleet.is_empty());
    }

    #[test]
    fn self_fusion_is_noop() {
        let mut fleet = Fleet::new();
        let h = fleet.create_agent("a", Position::new(2, 2), dims()).unwrap();
        fleet.ingest_observation(h, &[[1; 3]; 3]).unwrap();
        let before = fleet.snapshot(h).unwrap();
        assert_eq!(fleet.fuse(h, h).unwrap().adopted, 0);
        assert_eq!(fleet.snapshot(h).unwrap(), before);
    }

    #[test]
    fn fuse_pulls_fresher_cells() {
        let mut fleet = Fleet::new();
        let a = fleet.create_agent("a", Position::new(1, 1), dims()).unwrap();
        let b = fleet.create_agent("b", Position::new(3, 3), dims()).unwrap();
        fleet.ingest_observation(b, &[[0; 3]; 3]).unwrap();

        let report = fleet.fuse(a, b).unwrap();
        assert_eq!(report.adopted, 9);
        let a_map = fleet.snapshot(a).unwrap();
        let b_map = fleet.snapshot(b).unwrap();
        assert_eq!(a_map.static_grid().as_slice(), b_map.static_grid().as_slice());
        // Source is untouched.
        assert_eq!(fleet.fuse(b, a).unwrap().adopted, 0);
    }

    #[test]
    fn mismatched_agents_cannot_fuse() {
        let mut fleet = Fleet::new();
        let a = fleet.create_agent("a", Position::new(0, 0), dims()).unwrap();
        let b = fleet
            .create_agent("b", Position::new(0, 0), GridDims::new(4, 4))
            .unwrap();
        assert!(matches!(
            fleet.fuse(a, b),
            Err(MapError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn parallel_ingestion_touches_each_agent_once() {
        let mut fleet = Fleet::new();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                fleet
                    .create_agent(format!("agent-{i}"), Position::new(2, 2), dims())
                    .unwrap()
            })
            .collect();
        let batch: Vec<_> = handles.iter().map(|h| (*h, [[0; 3]; 3])).collect();

        let reports = fleet.ingest_all(&batch).unwrap();
        assert_eq!(reports.len(), 8);
        assert!(reports.iter().all(|r| r.updated == 9));
        for h in handles {
            assert_eq!(fleet.with_agent(h, |a| a.time()).unwrap(), 1);
        }
    }

    #[test]
    fn batch_with_unknown_handle_applies_nothing() {
        let mut fleet = Fleet::new();
        let a = fleet.create_agent("a", Position::new(2, 2), dims()).unwrap();
        let ghost = AgentHandle(Uuid::new_v4());

        let err = fleet
            .ingest_all(&[(a, [[0; 3]; 3]), (ghost, [[0; 3]; 3])])
            .unwrap_err();
        assert_eq!(err, MapError::UnknownAgent(ghost.id()));
        assert_eq!(fleet.with_agent(a, |agent| agent.time()).unwrap(), 0);
        assert!(!fleet.snapshot(a).unwrap().recency().is_initialized());
    }

    #[test]
    fn synchronize_keeps_local_values_on_ties() {
        let mut fleet = Fleet::new();
        let a = fleet.create_agent("a", Position::new(2, 2), dims()).unwrap();
        let b = fleet.create_agent("b", Position::new(2, 2), dims()).unwrap();
        fleet.ingest_observation(a, &[[0; 3]; 3]).unwrap();
        fleet.ingest_observation(b, &[[1; 3]; 3]).unwrap();

        assert_eq!(fleet.synchronize().unwrap(), 0);
        let centre = Position::new(2, 2);
        let a_static = fleet.snapshot(a).unwrap().static_grid().get(centre).unwrap();
        let b_static = fleet.snapshot(b).unwrap().static_grid().get(centre).unwrap();
        assert!(a_static < 0.5);
        assert!(b_static > 0.5);
    }

    #[test]
    fn synchronize_converges_all_agents() {
        let mut fleet = Fleet::new();
        let a = fleet.create_agent("a", Position::new(1, 1), dims()).unwrap();
        let b = fleet.create_agent("b", Position::new(3, 3), dims()).unwrap();
        let c = fleet.create_agent("c", Position::new(1, 3), dims()).unwrap();
        fleet.ingest_observation(a, &[[0; 3]; 3]).unwrap();
        fleet.step(b, Action::Observe).unwrap();
        fleet.ingest_observation(b, &[[1; 3]; 3]).unwrap();
        fleet.ingest_observation(c, &[[-1; 3]; 3]).unwrap();

        fleet.synchronize().unwrap();

        let maps: Vec<_> = [a, b, c].iter().map(|h| fleet.snapshot(*h).unwrap()).collect();
        assert_eq!(maps[0].recency().as_slice(), maps[1].recency().as_slice());
        assert_eq!(maps[1].recency().as_slice(), maps[2].recency().as_slice());
        assert_eq!(maps[0].static_grid().as_slice(), maps[2].static_grid().as_slice());
        assert_eq!(fleet.synchronize().unwrap(), 0);
    }
}

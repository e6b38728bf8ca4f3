//! Simulation engine - main entry point for running vessel resource ticks

use hecs::{Entity, World};
use std::collections::HashMap;
use vesselflow_logic::capability::{probe_backend, Capability};
use vesselflow_logic::oracle::{ResourceBackend, ResourceOracle, VesselId};
use vesselflow_logic::processor::ProcessorSpec;

use crate::components::*;
use crate::snapshot::SnapshotStore;
use crate::subsystem::{FlowRecord, HostServices, ResourceSubsystem};
use crate::systems::*;

/// Main simulation engine
pub struct SimulationEngine {
    /// ECS world containing vessels and processors
    pub world: World,
    /// Simulation time in seconds since start
    sim_time: f64,
    /// Fixed at construction from the startup probe
    capability: Capability,
    backend: ResourceBackend<ResourceSubsystem>,
    vessels: HashMap<VesselId, Entity>,
    next_vessel_id: u64,
    time_scale: f64,
}

impl SimulationEngine {
    /// Probe the host once and build an engine around the result
    pub fn new(host: &HostServices) -> Self {
        let (capability, backend) = probe_backend(|| ResourceSubsystem::locate(host));
        log::info!("Resource model: {}", capability.name());
        Self {
            world: World::new(),
            sim_time: 0.0,
            capability,
            backend,
            vessels: HashMap::new(),
            next_vessel_id: 1,
            time_scale: 1.0,
        }
    }

    pub fn capability(&self) -> Capability {
        self.capability
    }

    /// Spawn a vessel carrying `pool`
    pub fn spawn_vessel(&mut self, name: impl Into<String>, pool: ResourcePool) -> VesselId {
        let id = self.allocate_id(None);
        self.insert_vessel(Vessel::new(id, name), pool);
        id
    }

    /// Mount a processor on a vessel. Returns `None` for unknown vessels and
    /// for a label already mounted on that vessel.
    pub fn add_processor(&mut self, vessel: VesselId, spec: ProcessorSpec) -> Option<Entity> {
        if !self.vessels.contains_key(&vessel) {
            return None;
        }
        if self.has_processor(vessel, &spec.label) {
            log::warn!("{} already has a processor labelled '{}'", vessel, spec.label);
            return None;
        }
        Some(
            self.world
                .spawn((Processor::new(spec, self.sim_time), Mounted { vessel })),
        )
    }

    fn has_processor(&self, vessel: VesselId, label: &str) -> bool {
        self.world
            .query::<(&Processor, &Mounted)>()
            .iter()
            .any(|(_, (p, m))| m.vessel == vessel && p.spec.label == label)
    }

    /// Update the simulation by delta_seconds
    pub fn update(&mut self, delta_seconds: f64) {
        let scaled_delta = delta_seconds * self.time_scale;
        self.sim_time += scaled_delta;

        if self.capability.uses_settlement() {
            processing_system(&mut self.world, &mut self.backend, self.sim_time);
        } else {
            unconstrained_system(&mut self.world, &self.vessels, self.sim_time);
        }
    }

    /// Current amount of `resource` on `vessel`, from whichever store is active
    pub fn stock(&self, vessel: VesselId, resource: &str) -> f64 {
        match &self.backend {
            ResourceBackend::Live(subsystem) => subsystem.available(vessel, resource),
            ResourceBackend::Null(_) => self
                .vessels
                .get(&vessel)
                .and_then(|e| self.world.get::<&ResourcePool>(*e).ok())
                .map_or(0.0, |pool| pool.amount(resource)),
        }
    }

    /// Last achieved throttle factor for every processor on `vessel`
    pub fn processor_factors(&self, vessel: VesselId) -> Vec<(String, f64)> {
        self.world
            .query::<(&Processor, &Mounted)>()
            .iter()
            .filter(|(_, (_, mounted))| mounted.vessel == vessel)
            .map(|(_, (p, _))| (p.spec.label.clone(), p.last_factor))
            .collect()
    }

    /// Flows recorded by the resource subsystem since the last drain
    pub fn attribution(&self) -> &[FlowRecord] {
        match self.backend.live() {
            Some(subsystem) => subsystem.attribution(),
            None => &[],
        }
    }

    pub fn drain_attribution(&mut self) -> Vec<FlowRecord> {
        self.backend
            .live_mut()
            .map(|s| s.drain_attribution())
            .unwrap_or_default()
    }

    /// Park a vessel: remove it from the world and return its snapshot
    pub fn unload_vessel(&mut self, vessel: VesselId) -> Option<SnapshotStore> {
        let entity = self.vessels.remove(&vessel)?;
        let mut snapshot = SnapshotStore::new();
        snapshot.set_u64("vessel.id", vessel.0);
        if let Ok(v) = self.world.get::<&Vessel>(entity) {
            snapshot.set_string("vessel.name", v.name.as_str());
        }

        let pool = match &mut self.backend {
            ResourceBackend::Live(subsystem) => subsystem.detach(vessel),
            ResourceBackend::Null(_) => self.world.remove_one::<ResourcePool>(entity).ok(),
        };
        for (name, stock) in pool.iter().flat_map(|p| p.iter()) {
            snapshot.set_f64(format!("stock.{name}.amount"), stock.amount);
            snapshot.set_f64(format!("stock.{name}.capacity"), stock.capacity);
        }

        let mounted: Vec<Entity> = self
            .world
            .query::<(&Processor, &Mounted)>()
            .iter()
            .filter(|(_, (_, m))| m.vessel == vessel)
            .map(|(e, (p, _))| {
                let label = &p.spec.label;
                snapshot.set_f64(format!("processor.{label}.last_update"), p.last_update);
                snapshot.set_bool(format!("processor.{label}.enabled"), p.enabled);
                e
            })
            .collect();
        for e in mounted.into_iter().chain([entity]) {
            if let Err(err) = self.world.despawn(e) {
                log::warn!("Unloading {}: {}", vessel, err);
            }
        }

        log::info!("Unloaded {} at t={:.1}s", vessel, self.sim_time);
        Some(snapshot)
    }

    /// Restore a parked vessel with the given processor definitions.
    ///
    /// Each processor resumes from its saved timestamp, so the next update
    /// settles the whole time the vessel was parked. A timestamp later than
    /// the current clock (a snapshot from another session) resumes from now.
    /// Specs repeating an earlier label are skipped.
    pub fn load_vessel(&mut self, snapshot: &SnapshotStore, specs: &[ProcessorSpec]) -> VesselId {
        let saved = snapshot
            .contains("vessel.id")
            .then(|| VesselId(snapshot.get_u64("vessel.id", 0)));
        let id = self.allocate_id(saved);
        let name = snapshot.get_string("vessel.name", "Unnamed");

        let mut pool = ResourcePool::new();
        let resources: Vec<String> = snapshot
            .keys_with_prefix("stock.")
            .filter_map(|k| k.strip_prefix("stock.")?.strip_suffix(".amount"))
            .map(str::to_string)
            .collect();
        for resource in resources {
            pool.insert(
                resource.as_str(),
                Stock::new(
                    snapshot.get_f64(&format!("stock.{resource}.amount"), 0.0),
                    snapshot.get_f64(&format!("stock.{resource}.capacity"), 0.0),
                ),
            );
        }
        self.insert_vessel(Vessel::new(id, name), pool);

        for spec in specs {
            let label = &spec.label;
            if self.has_processor(id, label) {
                log::warn!("{} already has a processor labelled '{}'", id, label);
                continue;
            }
            let mut processor = Processor::new(spec.clone(), self.sim_time);
            processor.last_update = snapshot
                .get_f64(&format!("processor.{label}.last_update"), self.sim_time)
                .min(self.sim_time);
            processor.enabled = snapshot.get_bool(&format!("processor.{label}.enabled"), true);
            self.world.spawn((processor, Mounted { vessel: id }));
        }

        log::info!("Loaded {} at t={:.1}s", id, self.sim_time);
        id
    }

    pub fn vessel_ids(&self) -> Vec<VesselId> {
        let mut ids: Vec<VesselId> = self.vessels.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Set time scale (1.0 = real-time, 2.0 = 2x speed, etc.)
    pub fn set_time_scale(&mut self, scale: f64) {
        self.time_scale = scale.max(0.0);
    }

    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    /// Get current simulation time in seconds
    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    fn allocate_id(&mut self, preferred: Option<VesselId>) -> VesselId {
        let id = match preferred {
            Some(id) if !self.vessels.contains_key(&id) => id,
            _ => VesselId(self.next_vessel_id),
        };
        self.next_vessel_id = self.next_vessel_id.max(id.0 + 1);
        id
    }

    fn insert_vessel(&mut self, vessel: Vessel, pool: ResourcePool) {
        let id = vessel.id;
        let entity = match &mut self.backend {
            ResourceBackend::Live(subsystem) => {
                subsystem.attach(id, pool);
                self.world.spawn((vessel,))
            }
            ResourceBackend::Null(_) => self.world.spawn((vessel, pool)),
        };
        self.vessels.insert(id, entity);
    }
}

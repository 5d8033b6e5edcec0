//! World session: terrain, edit log, observer and the generation worker

use std::path::Path;
use std::time::Duration;

use crate::core::config::WorldConfig;
use crate::core::types::{Result, Vec3, VoxelCoord};
use crate::generation::{GenerationRequest, GenerationResponse};
use crate::physics::{pick, round_half_up, MovementInput, MovementIntegrator, PickHit};
use crate::streaming::GenerationWorker;
use crate::terrain::noise::NoiseField;
use crate::terrain::voxel_type::VoxelType;
use crate::voxel::chunk::ChunkCoord;
use crate::voxel::edit::{Override, OverrideLog};
use super::event::VoxelEvent;
use super::hotbar::Hotbar;
use super::persist::SavePayload;

/// One running world.
///
/// Movement and edits run synchronously on the caller's thread; window
/// generation runs on the worker and is republished whenever the observer
/// crosses into another chunk.
pub struct World {
    config: WorldConfig,
    field: NoiseField,
    overrides: OverrideLog,
    observer: MovementIntegrator,
    worker: GenerationWorker,
    /// Newest generation result, patched by every edit since
    published: Option<GenerationResponse>,
    /// Edits recorded after the newest request took its snapshot
    pending_edits: Vec<Override>,
    /// Chunk the newest request is centred on
    requested_center: Option<ChunkCoord>,
    hotbar: Hotbar,
    events: Vec<VoxelEvent>,
}

impl World {
    /// Start a session and request the first window
    pub fn new(config: WorldConfig) -> Result<Self> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(fastrand::f64);
        let field = NoiseField::new(seed, config.terrain.clone());
        let observer = MovementIntegrator::new(config.movement.clone(), config.spawn_position);
        let worker = GenerationWorker::new(config.worker_threads)?;
        log::info!(
            "World started: seed {}, view distance {}, chunk size {}",
            seed, config.view_distance, config.chunk_size
        );

        let mut world = Self {
            config,
            field,
            overrides: OverrideLog::new(),
            observer,
            worker,
            published: None,
            pending_edits: Vec::new(),
            requested_center: None,
            hotbar: Hotbar::default(),
            events: Vec::new(),
        };
        world.request_generation()?;
        Ok(world)
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn seed(&self) -> f64 {
        self.field.seed()
    }

    pub fn field(&self) -> &NoiseField {
        &self.field
    }

    pub fn overrides(&self) -> &OverrideLog {
        &self.overrides
    }

    pub fn observer(&self) -> &MovementIntegrator {
        &self.observer
    }

    /// Mode changes and teleports go through here
    pub fn observer_mut(&mut self) -> &mut MovementIntegrator {
        &mut self.observer
    }

    /// Current window snapshot for the renderer
    pub fn published(&self) -> Option<&GenerationResponse> {
        self.published.as_ref()
    }

    pub fn hotbar(&self) -> &Hotbar {
        &self.hotbar
    }

    pub fn hotbar_mut(&mut self) -> &mut Hotbar {
        &mut self.hotbar
    }

    /// Version of the newest generation request
    pub fn generation_version(&self) -> u64 {
        self.worker.latest_version()
    }

    /// The newest request has not been answered yet
    pub fn is_generating(&self) -> bool {
        self.worker.is_pending()
    }

    /// Submit a request centred on the observer's chunk
    pub fn request_generation(&mut self) -> Result<u64> {
        let center = ChunkCoord::from_world_pos(self.observer.position(), self.config.chunk_size);
        let request = GenerationRequest {
            version: 0,
            view_distance: self.config.view_distance,
            chunk_size: self.config.chunk_size,
            center,
            field: self.field.clone(),
            overrides: self.overrides.snapshot(),
            capacity_factors: self.config.capacity_factors,
            capacity_headroom: self.config.capacity_headroom,
        };
        let version = self.worker.submit(request)?;
        self.requested_center = Some(center);
        self.pending_edits.clear();
        log::debug!("Requested generation v{} around {:?}", version, center);
        Ok(version)
    }

    fn publish(&mut self, mut response: GenerationResponse) {
        for entry in &self.pending_edits {
            response.apply_edit(entry);
        }
        log::debug!(
            "Published generation v{} around {:?} ({} late edits)",
            response.version,
            response.center,
            self.pending_edits.len()
        );
        if response.version >= self.worker.latest_version() {
            self.pending_edits.clear();
        }
        self.published = Some(response);
    }

    /// Publish a finished window if one arrived (non-blocking)
    pub fn poll_generation(&mut self) -> bool {
        match self.worker.poll() {
            Some(response) => {
                self.publish(response);
                true
            }
            None => false,
        }
    }

    /// Block until the newest window is published or `timeout` elapses
    pub fn wait_for_generation(&mut self, timeout: Duration) -> bool {
        match self.worker.wait(timeout) {
            Some(response) => {
                self.publish(response);
                true
            }
            None => false,
        }
    }

    /// Advance the observer and keep the window centred on it
    pub fn tick(&mut self, input: &MovementInput, dt: f32) -> Result<()> {
        self.observer.tick(input, dt, &self.field, &self.overrides);

        let chunk = ChunkCoord::from_world_pos(self.observer.position(), self.config.chunk_size);
        if self.requested_center != Some(chunk) {
            self.request_generation()?;
        }
        self.poll_generation();
        Ok(())
    }

    /// Effective voxel at `coord`: the last edit there, else the terrain
    pub fn voxel_at(&self, coord: VoxelCoord) -> Option<VoxelType> {
        match self.overrides.resolve(coord) {
            Some(entry) => entry.placed.then_some(entry.voxel_type),
            None => self.field.generated_at(coord),
        }
    }

    fn in_bounds(&self, coord: VoxelCoord) -> bool {
        coord.y >= self.config.floor_y && coord.y <= self.config.ceiling_y
    }

    /// Cells occupied by the observer's body
    fn inside_observer(&self, coord: VoxelCoord) -> bool {
        let pos = self.observer.position();
        coord.x == round_half_up(pos.x)
            && coord.z == round_half_up(pos.z)
            && (coord.y == round_half_up(pos.y) || coord.y == round_half_up(pos.y - 1.0))
    }

    /// Record an edit and patch the published window
    fn commit(&mut self, entry: Override) {
        let coord = entry.coord();
        if entry.placed {
            self.overrides.record_placement(coord, entry.voxel_type);
        } else {
            self.overrides.record_removal(coord, entry.voxel_type);
        }
        if let Some(published) = self.published.as_mut() {
            published.apply_edit(&entry);
        }
        if self.worker.is_pending() {
            self.pending_edits.push(entry);
        }
    }

    /// Remove the voxel at `coord`, returning its type.
    ///
    /// Bedrock stays put. Breaking at or below the terrain surface exposes the
    /// neighbouring underground cells as filled voxels.
    pub fn break_voxel(&mut self, coord: VoxelCoord) -> Option<VoxelType> {
        if !self.in_bounds(coord) {
            return None;
        }
        let voxel_type = self.voxel_at(coord)?;
        if !voxel_type.is_breakable() {
            self.fill_adjacent(coord);
            return None;
        }

        self.commit(Override::removed(coord, voxel_type));
        self.fill_adjacent(coord);
        self.events.push(VoxelEvent::Broken { coord, voxel_type });
        log::debug!("Broke {} at {:?}", voxel_type, coord);
        Some(voxel_type)
    }

    /// Put a voxel at `coord`. Rejected out of bounds, into an occupied cell,
    /// or inside the observer.
    pub fn place_voxel(&mut self, coord: VoxelCoord, voxel_type: VoxelType) -> bool {
        if !self.in_bounds(coord) || self.voxel_at(coord).is_some() || self.inside_observer(coord) {
            return false;
        }
        self.commit(Override::placed(coord, voxel_type));
        self.events.push(VoxelEvent::Placed { coord, voxel_type });
        log::debug!("Placed {} at {:?}", voxel_type, coord);
        true
    }

    /// Fill the untouched underground neighbours of a broken cell
    fn fill_adjacent(&mut self, coord: VoxelCoord) {
        let column = self.field.column(coord.x, coord.z);
        if coord.y > column.surface_y {
            return;
        }

        let params = self.field.params();
        let fill = if column.is_stone || coord.y < params.baseline - params.deep_stone_depth {
            VoxelType::Stone
        } else if column.offset < params.lowland_offset {
            VoxelType::Sand
        } else {
            VoxelType::Dirt
        };

        const NEIGHBOURS: [VoxelCoord; 6] = [
            VoxelCoord::X,
            VoxelCoord::NEG_X,
            VoxelCoord::Y,
            VoxelCoord::NEG_Y,
            VoxelCoord::Z,
            VoxelCoord::NEG_Z,
        ];
        for offset in NEIGHBOURS {
            let n = coord + offset;
            if n.y < self.config.floor_y
                || n.y >= self.field.surface_height(n.x, n.z)
                || self.overrides.contains(n)
            {
                continue;
            }
            let ty = if n.y == self.config.floor_y { VoxelType::Bedrock } else { fill };
            self.commit(Override::placed(n, ty));
        }
    }

    /// Voxel under the crosshair looking along `direction`
    pub fn pick_target(&self, direction: Vec3) -> Option<PickHit> {
        pick(self.observer.position(), direction, self.config.reach, &self.field, &self.overrides)
    }

    /// Break whatever is under the crosshair
    pub fn break_target(&mut self, direction: Vec3) -> Option<VoxelType> {
        let hit = self.pick_target(direction)?;
        self.break_voxel(hit.coord)
    }

    /// Place the selected hotbar type against the face under the crosshair
    pub fn place_target(&mut self, direction: Vec3) -> bool {
        match self.pick_target(direction) {
            Some(hit) => self.place_voxel(hit.adjacent(), self.hotbar.selected_type()),
            None => false,
        }
    }

    /// Edit events since the last drain
    pub fn drain_events(&mut self) -> Vec<VoxelEvent> {
        std::mem::take(&mut self.events)
    }

    /// Fresh terrain from `seed` (random when None), all edits discarded
    pub fn new_world(&mut self, seed: Option<f64>) -> Result<f64> {
        let seed = seed.unwrap_or_else(fastrand::f64);
        self.field = NoiseField::new(seed, self.config.terrain.clone());
        self.overrides.clear();

        let mut position = self.observer.position();
        position.y = self.config.new_world_height;
        self.reset_session(position)?;
        log::info!("New world with seed {}", seed);
        Ok(seed)
    }

    fn reset_session(&mut self, position: Vec3) -> Result<()> {
        self.observer.set_position(position);
        self.published = None;
        self.pending_edits.clear();
        self.events.clear();
        self.request_generation()?;
        Ok(())
    }

    pub fn save_payload(&self) -> SavePayload {
        SavePayload {
            overrides: self.overrides.entries().to_vec(),
            seed: self.field.seed(),
            observer_position: self.observer.position(),
        }
    }

    /// Replace the session with a saved one
    pub fn load_payload(&mut self, payload: SavePayload) -> Result<()> {
        self.field = NoiseField::new(payload.seed, self.config.terrain.clone());
        self.overrides = OverrideLog::from_entries(payload.overrides);
        self.reset_session(payload.observer_position)?;
        log::info!("Loaded world with seed {} ({} overrides)", payload.seed, self.overrides.len());
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        self.save_payload().save(path)
    }

    pub fn load(&mut self, path: &Path) -> Result<()> {
        let payload = SavePayload::load(path)?;
        self.load_payload(payload)
    }
}

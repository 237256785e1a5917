//! Application driving the physics tick and its reports

use octvis_engine::debug::{collect_octant_boxes, OctantBox};
use octvis_engine::prelude::*;

use crate::scene::{spawn_scene, SpawnedScene};

/// Number of bodies whose collisions are recorded for highlighting
const WATCHED_BODIES: usize = 8;

/// Runs the simulation on every fixed tick and publishes a report per tick
pub struct PhysicsApp {
    physics: PhysicsSystem,
    scene_config: SceneConfig,
    scene: SpawnedScene,
    recorder: CollisionDebugRecorder,
    log_sink: LogReportSink,
    history: ReportHistory,
    max_fixed_ticks: Option<u64>,
}

impl PhysicsApp {
    /// Create the app; `max_fixed_ticks` ends the run after that many ticks
    pub fn new(physics: PhysicsConfig, scene: SceneConfig, max_fixed_ticks: Option<u64>) -> Self {
        Self {
            physics: PhysicsSystem::new(physics),
            scene_config: scene,
            scene: SpawnedScene::default(),
            recorder: CollisionDebugRecorder::new(),
            log_sink: LogReportSink::default(),
            history: ReportHistory::default(),
            max_fixed_ticks,
        }
    }

    fn octant_summary(&self) -> Option<(usize, usize)> {
        let octree = self.physics.octree()?;
        let boxes: Vec<OctantBox> = collect_octant_boxes(octree);
        let occupied = boxes.iter().filter(|b| b.is_occupied()).count();
        Some((boxes.len(), occupied))
    }
}

impl Application for PhysicsApp {
    fn on_start(&mut self, ctx: &mut AppContext<'_>) -> Result<(), AppError> {
        self.scene = spawn_scene(ctx.world, &self.scene_config);
        for &entity in self.scene.spheres.iter().take(WATCHED_BODIES) {
            self.recorder.track(ctx.world, entity);
        }
        log::info!(
            "Physics app started: {} bodies, {} broad phase",
            self.scene.body_count(),
            self.physics.broad_phase_name()
        );
        Ok(())
    }

    fn on_fixed_update(&mut self, ctx: &mut AppContext<'_>) -> Result<(), AppError> {
        self.recorder.begin_tick();
        let stats = self.physics.fixed_update(ctx.world, ctx.timing.fixed_delta_time);

        let report = TickReport::from_stats(ctx.timing.fixed_ticks + 1, self.physics.broad_phase_name(), &stats);
        self.log_sink.publish(&report);
        self.history.publish(&report);

        let highlighted = self.recorder.colliding_count();
        if highlighted > 0 {
            log::trace!("{highlighted} watched bodies colliding");
        }

        if self.max_fixed_ticks.is_some_and(|max| report.fixed_tick >= max) {
            ctx.request_quit();
        }
        Ok(())
    }

    fn on_finish(&mut self, ctx: &mut AppContext<'_>) -> Result<(), AppError> {
        let average = self.history.average_collision_ms().unwrap_or_default();
        log::info!(
            "Finished after {} fixed ticks; average collision time {average:.4} ms over the last {} ticks",
            ctx.timing.fixed_ticks,
            self.history.len()
        );
        if let Some((nodes, occupied)) = self.octant_summary() {
            log::info!("Octree: {occupied} of {nodes} octants occupied");
        }
        for &entity in self.scene.spheres.iter().take(WATCHED_BODIES) {
            log::debug!("Body {}: {:?}", entity.id(), self.recorder.highlight(entity));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_stops_after_tick_limit() {
        let config = SandboxConfig {
            scene: SceneConfig {
                sphere_count: 12,
                box_count: 12,
                ..SceneConfig::default()
            },
            ..SandboxConfig::default()
        };
        let mut engine = Engine::new(&config.timing).unwrap();
        engine.add_application(PhysicsApp::new(config.physics.clone(), config.scene.clone(), Some(5)));

        let frames = engine.run_frames(1_000, config.timing.fixed_delta_time * 1.5).unwrap();
        assert!(frames < 1_000);
        assert_eq!(engine.timing().fixed_ticks, 5);
        assert_eq!(engine.world().entity_count(), 24);
    }
}

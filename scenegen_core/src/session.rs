//! Dataset session: sampling policy, frame tasks and bookkeeping.
//!
//! A session schedules one [`FrameTask`] per requested frame. Each task
//! is a small state machine that rejection-samples an object layout,
//! then a camera pose, requests a capture, writes the ground truth
//! record, and parks on a delay before the next frame starts. One
//! sampling attempt runs per host tick, so the editor stays responsive
//! through the whole batch.
//!
//! Rejected samples are not errors. Budget exhaustion is not an error
//! either: the frame keeps its last proposed configuration, the fact is
//! logged and counted in [`SessionStats`].

use crate::camera::SceneCamera;
use crate::error::SceneError;
use crate::geometry::{self, WorkingVolume};
use crate::object::{Placeable, SceneObject};
use crate::record::FrameRecord;
use crate::runner::{DelayTask, RunnerStatus, Step, Task, TaskRunner};
use nalgebra::Vector3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use scenegen_host::{EditorHost, Pose};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Parameters of a dataset session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Master seed; fully determines every proposed pose
    pub seed: u64,

    /// Number of frames to produce
    pub frames: usize,

    /// Attempts allowed per frame for the object layout
    pub object_attempts: u32,

    /// Attempts allowed per frame for the camera pose
    pub camera_attempts: u32,

    /// Maximum pivot-to-pivot distance between any object pair
    pub max_separation: f64,

    /// Safety margin subtracted from the narrow FOV axis when checking
    /// that every object is in frame, degrees
    pub fov_margin_deg: f64,

    /// Minimum required off-center angle of the farthest object,
    /// degrees; keeps compositions from collapsing into the frame center
    pub min_angle_deg: f64,

    /// Capture resolution in pixels
    pub resolution: (u32, u32),

    /// Render settle time granted to each capture
    pub settle: Duration,

    /// Pause between consecutive frames
    pub frame_gap: Duration,

    /// Region objects and camera are staged into
    pub volume: WorkingVolume,

    /// Directory receiving `img_NNNN.jpg` / `params_NNNN.json` pairs
    pub output_dir: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            frames: 500,
            object_attempts: 10,
            camera_attempts: 15,
            max_separation: 1000.0,
            fov_margin_deg: 5.0,
            min_angle_deg: 10.0,
            resolution: (2048, 2048),
            settle: Duration::from_millis(200),
            frame_gap: Duration::from_millis(1500),
            volume: WorkingVolume {
                anchor: Vector3::new(67170.0, 40950.0, -36400.0),
                object_std: Vector3::new(500.0, 500.0, 0.0),
                camera_offset: Vector3::new(0.0, 0.0, 750.0),
                camera_std: Vector3::new(1250.0, 1250.0, 375.0),
            },
            output_dir: PathBuf::from("out"),
        }
    }
}

/// Everything the frame tasks mutate: the staged actors and the RNG.
///
/// Shared between tasks through `Rc<RefCell<..>>`; sound because the
/// runner never has two tasks current at once.
pub struct Stage {
    /// Objects randomized every frame
    pub objects: Vec<SceneObject>,

    /// The capturing camera
    pub camera: SceneCamera,

    /// Session RNG, seeded from [`SessionConfig::seed`]
    pub rng: ChaCha8Rng,
}

impl Stage {
    /// Builds a stage around spawned actors and a seed.
    pub fn new(objects: Vec<SceneObject>, camera: SceneCamera, seed: u64) -> Self {
        Self {
            objects,
            camera,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

/// Sampling outcome of a single frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameStats {
    /// Frame index
    pub frame: usize,

    /// Object layout attempts used
    pub object_attempts: u32,

    /// Whether the final object layout passed validation
    pub object_accepted: bool,

    /// Camera pose attempts used
    pub camera_attempts: u32,

    /// Whether the final camera pose passed validation
    pub camera_accepted: bool,
}

/// Aggregated outcome of a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    /// Frames that ran to completion
    pub frames_completed: usize,

    /// Captures requested from the host
    pub captures_requested: usize,

    /// Frames whose object budget ran out
    pub object_exhaustions: usize,

    /// Frames whose camera budget ran out
    pub camera_exhaustions: usize,

    /// Per-frame details, in frame order
    pub frames: Vec<FrameStats>,
}

/// Proposes a fresh layout for every object and validates it.
///
/// Every object gets a position drawn from the working volume and a
/// uniform heading. The layout is accepted when no pair of objects
/// overlaps and no pair sits farther apart than `max_separation`.
fn propose_object_layout(
    config: &SessionConfig,
    host: &mut dyn EditorHost,
    stage: &mut Stage,
) -> Result<bool, SceneError> {
    let Stage { objects, rng, .. } = stage;

    for object in objects.iter_mut() {
        let pose = Pose::new(
            config.volume.sample_object_position(rng),
            geometry::sample_yaw(rng),
        );
        object.move_to(host, pose)?;
    }

    for i in 0..objects.len() {
        for j in (i + 1)..objects.len() {
            if objects[i].overlaps(host, &objects[j], 0.0)? {
                return Ok(false);
            }
            if objects[i].distance_to(host, &objects[j])? > config.max_separation {
                return Ok(false);
            }
        }
    }
    Ok(true)
}

/// Proposes a camera pose aimed at the objects and validates framing.
///
/// The camera teleports to a drawn position and aims at the object
/// centroid. The pose is accepted when the farthest object sits inside
/// the narrow FOV axis minus the margin, but no closer to the frame
/// center than `min_angle_deg`.
fn propose_camera_pose(
    config: &SessionConfig,
    host: &mut dyn EditorHost,
    stage: &mut Stage,
) -> Result<bool, SceneError> {
    let Stage { objects, camera, rng } = stage;

    let position = config.volume.sample_camera_position(rng);
    camera.move_to(host, position, None)?;

    let targets: Vec<Vector3<f64>> = objects.iter().map(|o| o.pose().position).collect();
    camera.look_at_centroid(host, &targets)?;

    let (hfov, vfov) = camera.field_of_view();
    let in_frame_limit = hfov.min(vfov) - config.fov_margin_deg;
    let max_angle = targets
        .iter()
        .map(|t| camera.angle_to(t))
        .fold(0.0, f64::max);

    Ok(max_angle <= in_frame_limit && max_angle >= config.min_angle_deg)
}

/// Phases of one frame's pipeline.
enum FramePhase {
    /// Rejection-sampling the object layout, one attempt per tick
    Objects,

    /// Rejection-sampling the camera pose, one attempt per tick
    Camera,

    /// Issue the capture and write the ground truth record
    Capture,

    /// Back from the inter-frame delay; close out the frame
    Settled,
}

/// One frame's sampling-and-capture sequence.
pub struct FrameTask {
    name: String,
    frame: usize,
    phase: FramePhase,
    attempts: u32,
    config: Rc<SessionConfig>,
    stage: Rc<RefCell<Stage>>,
    stats: Rc<RefCell<SessionStats>>,
    frame_stats: FrameStats,
}

impl FrameTask {
    fn new(
        frame: usize,
        config: Rc<SessionConfig>,
        stage: Rc<RefCell<Stage>>,
        stats: Rc<RefCell<SessionStats>>,
    ) -> Self {
        Self {
            name: format!("frame_{:04}", frame),
            frame,
            phase: FramePhase::Objects,
            attempts: 0,
            config,
            stage,
            stats,
            frame_stats: FrameStats {
                frame,
                object_attempts: 0,
                object_accepted: false,
                camera_attempts: 0,
                camera_accepted: false,
            },
        }
    }
}

impl Task for FrameTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn step(&mut self, host: &mut dyn EditorHost) -> Result<Step, SceneError> {
        match self.phase {
            FramePhase::Objects => {
                self.attempts += 1;
                let accepted =
                    propose_object_layout(&self.config, host, &mut self.stage.borrow_mut())?;
                debug!(
                    frame = self.frame,
                    attempt = self.attempts,
                    accepted,
                    "sampled object layout"
                );

                if accepted || self.attempts >= self.config.object_attempts {
                    if !accepted {
                        warn!(
                            frame = self.frame,
                            attempts = self.attempts,
                            "object layout budget exhausted, keeping last layout"
                        );
                        self.stats.borrow_mut().object_exhaustions += 1;
                    }
                    self.frame_stats.object_attempts = self.attempts;
                    self.frame_stats.object_accepted = accepted;
                    self.attempts = 0;
                    self.phase = FramePhase::Camera;
                }
                Ok(Step::Continue)
            }

            FramePhase::Camera => {
                self.attempts += 1;
                let accepted =
                    propose_camera_pose(&self.config, host, &mut self.stage.borrow_mut())?;
                debug!(
                    frame = self.frame,
                    attempt = self.attempts,
                    accepted,
                    "sampled camera pose"
                );

                if accepted || self.attempts >= self.config.camera_attempts {
                    if !accepted {
                        warn!(
                            frame = self.frame,
                            attempts = self.attempts,
                            "camera pose budget exhausted, keeping last pose"
                        );
                        self.stats.borrow_mut().camera_exhaustions += 1;
                    }
                    self.frame_stats.camera_attempts = self.attempts;
                    self.frame_stats.camera_accepted = accepted;
                    self.attempts = 0;
                    self.phase = FramePhase::Capture;
                }
                Ok(Step::Continue)
            }

            FramePhase::Capture => {
                let image_path = self
                    .config
                    .output_dir
                    .join(format!("img_{:04}.jpg", self.frame));
                let record_path = self
                    .config
                    .output_dir
                    .join(format!("params_{:04}.json", self.frame));

                // The record snapshots the commanded state right after the
                // request goes out, not after the render completes.
                {
                    let mut stage = self.stage.borrow_mut();
                    let Stage { objects, camera, .. } = &mut *stage;
                    camera.capture(host, &image_path, self.config.resolution, self.config.settle)?;
                    let record = FrameRecord::snapshot(
                        camera,
                        objects.iter().map(|o| o as &dyn Placeable),
                    );
                    record.write_to_file(&record_path)?;
                }
                self.stats.borrow_mut().captures_requested += 1;
                info!(frame = self.frame, image = %image_path.display(), "frame captured");

                self.phase = FramePhase::Settled;
                Ok(Step::Delegate(Box::new(DelayTask::new(
                    format!("frame_{:04}_gap", self.frame),
                    self.config.frame_gap,
                ))))
            }

            FramePhase::Settled => {
                let mut stats = self.stats.borrow_mut();
                stats.frames_completed += 1;
                stats.frames.push(self.frame_stats.clone());
                Ok(Step::Done)
            }
        }
    }
}

/// A scheduled dataset run.
///
/// Construction creates the output directory and enqueues one
/// [`FrameTask`] per frame; the embedding then calls [`Session::tick`]
/// once per host tick until it reports [`RunnerStatus::Finished`].
pub struct Session {
    runner: TaskRunner,
    stage: Rc<RefCell<Stage>>,
    stats: Rc<RefCell<SessionStats>>,
}

impl Session {
    /// Schedules a session over an already spawned stage.
    pub fn new(stage: Stage, config: SessionConfig) -> Result<Self, SceneError> {
        std::fs::create_dir_all(&config.output_dir)?;
        info!(
            frames = config.frames,
            seed = config.seed,
            output = %config.output_dir.display(),
            "session scheduled"
        );

        let config = Rc::new(config);
        let stage = Rc::new(RefCell::new(stage));
        let stats = Rc::new(RefCell::new(SessionStats::default()));

        let mut runner = TaskRunner::new();
        for frame in 0..config.frames {
            runner.push(Box::new(FrameTask::new(
                frame,
                Rc::clone(&config),
                Rc::clone(&stage),
                Rc::clone(&stats),
            )));
        }

        Ok(Self { runner, stage, stats })
    }

    /// Advances the session by one step. Call once per host tick.
    pub fn tick(&mut self, host: &mut dyn EditorHost) -> Result<RunnerStatus, SceneError> {
        self.runner.tick(host)
    }

    /// The shared stage, for inspection after (or between) ticks.
    pub fn stage(&self) -> &Rc<RefCell<Stage>> {
        &self.stage
    }

    /// Snapshot of the bookkeeping so far.
    pub fn stats(&self) -> SessionStats {
        self.stats.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraIntrinsics;
    use scenegen_host::{MeshAsset, SimHost};

    const CUBE: &str = "/Game/Shapes/Shape_Cube.Shape_Cube";

    fn test_host() -> SimHost {
        let mut host = SimHost::new();
        host.register_mesh(CUBE, MeshAsset::new(50.0, 50.0, 50.0));
        host
    }

    fn test_config(out: &str) -> SessionConfig {
        SessionConfig {
            frames: 3,
            settle: Duration::from_millis(20),
            frame_gap: Duration::from_millis(50),
            resolution: (64, 64),
            volume: WorkingVolume {
                anchor: Vector3::new(0.0, 0.0, 0.0),
                object_std: Vector3::new(400.0, 400.0, 0.0),
                camera_offset: Vector3::new(0.0, 0.0, 750.0),
                camera_std: Vector3::new(1250.0, 1250.0, 375.0),
            },
            output_dir: std::env::temp_dir().join(out),
            ..SessionConfig::default()
        }
    }

    fn test_stage(host: &mut SimHost, seed: u64) -> Stage {
        let objects = vec![
            SceneObject::spawn(host, CUBE, "A", None).unwrap(),
            SceneObject::spawn(host, CUBE, "B", None).unwrap(),
        ];
        let camera = SceneCamera::spawn(host, "Cam", CameraIntrinsics::default()).unwrap();
        Stage::new(objects, camera, seed)
    }

    fn drive(host: &mut SimHost, session: &mut Session) -> SessionStats {
        loop {
            host.tick(Duration::from_millis(16));
            if session.tick(host).unwrap() == RunnerStatus::Finished {
                return session.stats();
            }
        }
    }

    #[test]
    fn test_accepted_object_layouts_satisfy_constraints() {
        let mut host = test_host();
        let config = test_config("scenegen_session_obj");
        let mut stage = test_stage(&mut host, 7);

        let mut accepted_layouts = 0;
        for _ in 0..200 {
            if !propose_object_layout(&config, &mut host, &mut stage).unwrap() {
                continue;
            }
            accepted_layouts += 1;
            let (a, b) = (&stage.objects[0], &stage.objects[1]);
            assert!(!a.overlaps(&host, b, 0.0).unwrap());
            assert!(a.distance_to(&host, b).unwrap() <= config.max_separation);
        }
        assert!(accepted_layouts > 0, "sampler never accepted a layout");
    }

    #[test]
    fn test_accepted_camera_poses_satisfy_framing() {
        let mut host = test_host();
        let config = test_config("scenegen_session_cam");
        let mut stage = test_stage(&mut host, 11);

        // Fix a valid object layout, then sample the camera repeatedly.
        stage.objects[0]
            .move_to(&mut host, Pose::at(Vector3::new(-300.0, 0.0, 0.0)))
            .unwrap();
        stage.objects[1]
            .move_to(&mut host, Pose::at(Vector3::new(300.0, 0.0, 0.0)))
            .unwrap();

        let (hfov, vfov) = stage.camera.field_of_view();
        let limit = hfov.min(vfov) - config.fov_margin_deg;

        let mut accepted_poses = 0;
        for _ in 0..300 {
            if !propose_camera_pose(&config, &mut host, &mut stage).unwrap() {
                continue;
            }
            accepted_poses += 1;
            let max_angle = stage
                .objects
                .iter()
                .map(|o| stage.camera.angle_to(&o.pose().position))
                .fold(0.0, f64::max);
            assert!(max_angle <= limit);
            assert!(max_angle >= config.min_angle_deg);
        }
        assert!(accepted_poses > 0, "sampler never accepted a camera pose");
    }

    #[test]
    fn test_session_produces_one_artifact_pair_per_frame() {
        let mut host = test_host();
        let config = test_config("scenegen_session_e2e");
        let _ = std::fs::remove_dir_all(&config.output_dir);
        let output_dir = config.output_dir.clone();

        let stage = test_stage(&mut host, 42);
        let mut session = Session::new(stage, config).unwrap();
        let stats = drive(&mut host, &mut session);

        assert_eq!(stats.frames_completed, 3);
        assert_eq!(stats.captures_requested, 3);
        assert_eq!(host.capture_count(), 3);
        assert_eq!(stats.frames.len(), 3);

        let mut camera_positions = Vec::new();
        for frame in 0..3 {
            let record_path = output_dir.join(format!("params_{:04}.json", frame));
            let record: FrameRecord =
                serde_json::from_str(&std::fs::read_to_string(&record_path).unwrap()).unwrap();
            assert_eq!(record.actors.len(), 2);
            camera_positions.push((
                record.camera.location.x,
                record.camera.location.y,
                record.camera.location.z,
            ));
        }
        // Re-staging every frame must command distinct camera poses.
        for i in 0..camera_positions.len() {
            for j in (i + 1)..camera_positions.len() {
                assert_ne!(camera_positions[i], camera_positions[j]);
            }
        }

        let _ = std::fs::remove_dir_all(&output_dir);
    }

    #[test]
    fn test_budget_exhaustion_still_completes_the_frame() {
        let mut host = test_host();
        let mut config = test_config("scenegen_session_exhaust");
        let _ = std::fs::remove_dir_all(&config.output_dir);
        let output_dir = config.output_dir.clone();
        config.frames = 1;
        // Two objects can never be 0 units apart without overlapping.
        config.max_separation = 0.0;

        let object_budget = config.object_attempts;
        let stage = test_stage(&mut host, 3);
        let mut session = Session::new(stage, config).unwrap();
        let stats = drive(&mut host, &mut session);

        assert_eq!(stats.frames_completed, 1);
        assert_eq!(stats.object_exhaustions, 1);
        assert_eq!(stats.frames[0].object_attempts, object_budget);
        assert!(!stats.frames[0].object_accepted);
        // The frame still produced its artifact pair.
        assert_eq!(stats.captures_requested, 1);
        assert!(output_dir.join("params_0000.json").exists());

        let _ = std::fs::remove_dir_all(&output_dir);
    }

    #[test]
    fn test_same_seed_commands_identical_poses() {
        let run = |out: &str| -> String {
            let mut host = test_host();
            let mut config = test_config(out);
            let _ = std::fs::remove_dir_all(&config.output_dir);
            config.frames = 2;
            let output_dir = config.output_dir.clone();

            let stage = test_stage(&mut host, 123);
            let mut session = Session::new(stage, config).unwrap();
            drive(&mut host, &mut session);

            let records = (0..2)
                .map(|frame| {
                    std::fs::read_to_string(output_dir.join(format!("params_{:04}.json", frame)))
                        .unwrap()
                })
                .collect::<Vec<_>>()
                .join("\n");
            let _ = std::fs::remove_dir_all(&output_dir);
            records
        };

        assert_eq!(run("scenegen_session_det_a"), run("scenegen_session_det_b"));
    }
}

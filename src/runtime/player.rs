use crate::config::show::ShowConfig;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::clock::ManualClock;
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{KineticaError, KineticaResult};
use crate::render::backend::{FrameRGBA, RenderSettings};
use crate::render::cpu::CpuRenderer;
use crate::runtime::host::Host;
use crate::scene::navigator::{Navigator, Route};
use crate::scene::registry::SceneRegistry;

/// Summary of one [`Player::play`] run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlayStats {
    /// Frames simulated and handed to the sink.
    pub frames_rendered: u64,
    /// Drawables on the surface when the last frame was captured.
    pub final_children: usize,
    /// Simulated time covered, from the first frame to the last.
    pub duration_ms: f64,
}

/// Headless, deterministic playback of registered scenes.
///
/// Time comes from a [`ManualClock`] advanced by exactly one frame duration per frame,
/// so a given config (seed included) always produces the same frames.
pub struct Player {
    clock: ManualClock,
    host: Host,
    navigator: Navigator,
    renderer: CpuRenderer,
    fps: Fps,
}

impl Player {
    /// Player over the built-in scenes.
    pub fn new(config: &ShowConfig) -> KineticaResult<Self> {
        Self::with_registry(config, SceneRegistry::builtin(config))
    }

    pub fn with_registry(config: &ShowConfig, registry: SceneRegistry) -> KineticaResult<Self> {
        config.validate()?;
        let clock = ManualClock::new(0.0);
        let host = Host::from_config(clock.clock(), config);
        let navigator = Navigator::new(registry, config.auto_advance_ms);
        Ok(Self {
            clock,
            host,
            navigator,
            renderer: CpuRenderer::new(RenderSettings::default()),
            fps: config.fps,
        })
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn fps(&self) -> Fps {
        self.fps
    }

    /// Current playback time.
    pub fn now_ms(&self) -> f64 {
        self.host.clock().now_ms()
    }

    /// Run `scene_id` for `frames` frames, pushing each rendered frame into `sink`.
    ///
    /// The scene is torn down afterwards, including when the sink or renderer fails.
    #[tracing::instrument(skip(self, sink))]
    pub fn play(
        &mut self,
        scene_id: &str,
        frames: u64,
        sink: &mut dyn FrameSink,
    ) -> KineticaResult<PlayStats> {
        if frames == 0 {
            return Err(KineticaError::validation("play needs at least one frame"));
        }
        self.ensure_scene(scene_id)?;

        let canvas = self.host.surface().canvas();
        sink.begin(SinkConfig {
            width: canvas.width,
            height: canvas.height,
            fps: self.fps,
            background: self.host.surface().background(),
        })?;

        let result = self.run(scene_id, frames, |renderer, host, idx| {
            let frame = renderer.render_surface(host.surface())?;
            sink.push_frame(idx, &frame)
        });
        // Finalize the sink even when playback failed; report the playback error first.
        let ended = sink.end();
        let stats = result?;
        ended?;
        tracing::debug!(frames = stats.frames_rendered, "playback finished");
        Ok(stats)
    }

    /// Simulate frames `0..=frame` of `scene_id` and rasterize only the last one.
    #[tracing::instrument(skip(self))]
    pub fn render_frame(&mut self, scene_id: &str, frame: FrameIndex) -> KineticaResult<FrameRGBA> {
        let frames = frame
            .0
            .checked_add(1)
            .ok_or_else(|| KineticaError::validation(format!("frame {} is out of range", frame.0)))?;
        let mut last = None;
        self.run(scene_id, frames, |renderer, host, idx| {
            if idx == frame {
                last = Some(renderer.render_surface(host.surface())?);
            }
            Ok(())
        })?;
        last.ok_or_else(|| KineticaError::render("requested frame was not rendered"))
    }

    fn run(
        &mut self,
        scene_id: &str,
        frames: u64,
        mut on_frame: impl FnMut(&mut CpuRenderer, &Host, FrameIndex) -> KineticaResult<()>,
    ) -> KineticaResult<PlayStats> {
        self.ensure_scene(scene_id)?;

        let start_ms = self.now_ms();
        let frame_ms = self.fps.frame_duration_ms();
        self.navigator
            .navigate(&self.host, Route::Scene(scene_id.to_owned()))?;

        let mut stats = PlayStats::default();
        let mut result = Ok(());
        for i in 0..frames {
            self.clock.set(start_ms + self.fps.frame_start_ms(FrameIndex(i)));
            self.host.step();
            result = on_frame(&mut self.renderer, &self.host, FrameIndex(i));
            if result.is_err() {
                break;
            }
            stats.frames_rendered += 1;
            stats.final_children = self.host.surface().child_count();
        }
        stats.duration_ms = self.now_ms() - start_ms;

        // Leave the next run a fresh frame delta.
        self.clock.advance(frame_ms);
        self.navigator.navigate(&self.host, Route::Selection)?;
        result.map(|()| stats)
    }

    fn ensure_scene(&self, scene_id: &str) -> KineticaResult<()> {
        if self.navigator.registry().get(scene_id).is_none() {
            return Err(KineticaError::validation(format!(
                "unknown scene \"{scene_id}\""
            )));
        }
        Ok(())
    }
}

impl std::fmt::Debug for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("now_ms", &self.now_ms())
            .field("fps", &self.fps)
            .field("navigator", &self.navigator)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/runtime/player.rs"]
mod tests;

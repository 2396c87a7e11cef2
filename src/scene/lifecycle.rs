use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::foundation::clock::Clock;
use crate::foundation::core::Canvas;
use crate::foundation::error::{KineticaError, KineticaResult};
use crate::runtime::host::Host;
use crate::surface::display_list::Surface;
use crate::timing::bus::{Subscription, TimingBus, TimingFire};
use crate::timing::driver::{FrameDriver, FrameTick, TickerId};
use crate::timing::timers::{Scheduler, TimerScope, Timers};

/// Scene-specific behavior plugged into a [`Scene`].
pub trait Composition {
    /// Build shapes and register per-frame and per-band callbacks through `cx`.
    fn on_setup(&mut self, cx: &mut SceneCx<'_>) -> KineticaResult<()>;

    /// Release entity-level resources. Runs after every callback is detached.
    fn on_destroy(&mut self) {}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SceneState {
    Uninitialized,
    Active,
    /// Terminal.
    Destroyed,
}

/// Handles a scene holds while active.
#[derive(Debug)]
struct Bound {
    surface: Surface,
    timing: TimingBus,
    driver: FrameDriver,
    timers: Timers,
    scope: TimerScope,
}

/// Setup-time access to the host, recording everything that must be undone on teardown.
pub struct SceneCx<'a> {
    host: &'a Host,
    tickers: &'a mut Vec<TickerId>,
    subscriptions: &'a mut Vec<Subscription>,
    scheduler: Scheduler,
}

impl SceneCx<'_> {
    pub fn surface(&self) -> &Surface {
        self.host.surface()
    }

    pub fn clock(&self) -> &Clock {
        self.host.clock()
    }

    pub fn canvas(&self) -> Canvas {
        self.host.surface().canvas()
    }

    /// Run `callback` every frame until the scene is destroyed.
    pub fn add_ticker(&mut self, callback: impl FnMut(&FrameTick) + 'static) -> TickerId {
        let id = self.host.driver().add(callback);
        self.tickers.push(id);
        id
    }

    /// Subscribe to a timing band until the scene is destroyed.
    pub fn on_timing(
        &mut self,
        name: &str,
        callback: impl FnMut(&TimingFire) + 'static,
    ) -> KineticaResult<()> {
        let sub = self.host.timing().on(name, callback)?;
        self.subscriptions.push(sub);
        Ok(())
    }

    /// Delayed callbacks cancelled when the scene is destroyed.
    pub fn scheduler(&self) -> Scheduler {
        self.scheduler.clone()
    }

    /// Random stream seeded from the host seed.
    pub fn rng(&self) -> SmallRng {
        SmallRng::seed_from_u64(self.host.seed())
    }
}

/// Lifetime owner of one composition: uninitialized, then active, then destroyed.
///
/// Everything registered through [`SceneCx`] is detached on [`destroy`](Self::destroy),
/// which also runs when the scene is dropped.
pub struct Scene {
    id: String,
    composition: Box<dyn Composition>,
    state: SceneState,
    tickers: Vec<TickerId>,
    subscriptions: Vec<Subscription>,
    bound: Option<Bound>,
}

impl Scene {
    pub fn new(id: impl Into<String>, composition: impl Composition + 'static) -> Self {
        Self {
            id: id.into(),
            composition: Box::new(composition),
            state: SceneState::Uninitialized,
            tickers: Vec::new(),
            subscriptions: Vec::new(),
            bound: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> SceneState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == SceneState::Active
    }

    /// Clear the surface, start the timing bus and run the composition's setup.
    ///
    /// If the composition fails, the scene is torn down and ends up destroyed.
    #[tracing::instrument(skip(self, host), fields(scene = %self.id))]
    pub fn setup(&mut self, host: &Host) -> KineticaResult<()> {
        if self.state != SceneState::Uninitialized {
            return Err(KineticaError::lifecycle(format!(
                "scene \"{}\" cannot be set up from state {:?}",
                self.id, self.state
            )));
        }

        host.surface().remove_children();
        host.timing().start();
        let scope = host.timers().new_scope();
        self.bound = Some(Bound {
            surface: host.surface().clone(),
            timing: host.timing().clone(),
            driver: host.driver().clone(),
            timers: host.timers().clone(),
            scope,
        });
        self.state = SceneState::Active;

        let mut cx = SceneCx {
            host,
            tickers: &mut self.tickers,
            subscriptions: &mut self.subscriptions,
            scheduler: Scheduler::new(host.timers(), scope),
        };
        let result = self.composition.on_setup(&mut cx);
        drop(cx);
        if let Err(err) = result {
            tracing::debug!(error = %err, "scene setup failed, tearing down");
            self.destroy();
            return Err(err);
        }
        tracing::debug!(
            tickers = self.tickers.len(),
            subscriptions = self.subscriptions.len(),
            "scene active"
        );
        Ok(())
    }

    /// Detach tickers and band subscriptions, stop the bus, clear the surface, cancel
    /// pending delayed callbacks, then run the composition's teardown. Safe to repeat.
    #[tracing::instrument(skip(self), fields(scene = %self.id))]
    pub fn destroy(&mut self) {
        match self.state {
            SceneState::Destroyed => return,
            SceneState::Uninitialized => {
                self.state = SceneState::Destroyed;
                return;
            }
            SceneState::Active => {}
        }
        self.state = SceneState::Destroyed;

        if let Some(bound) = self.bound.take() {
            for id in self.tickers.drain(..) {
                bound.driver.remove(id);
            }
            for sub in self.subscriptions.drain(..) {
                sub.unsubscribe();
            }
            bound.timing.stop();
            bound.surface.remove_children();
            let cancelled = bound.timers.cancel_scope(bound.scope);
            tracing::debug!(cancelled_timers = cancelled, "scene detached");
        }
        self.composition.on_destroy();
    }
}

impl Drop for Scene {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("tickers", &self.tickers.len())
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/lifecycle.rs"]
mod tests;

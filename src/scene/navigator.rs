use std::fmt;

use crate::foundation::error::KineticaResult;
use crate::runtime::host::Host;
use crate::scene::lifecycle::Scene;
use crate::scene::registry::SceneRegistry;

/// Where the show currently is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    /// Scene list; no scene is active.
    Selection,
    Scene(String),
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Selection => f.write_str("/"),
            Self::Scene(id) => write!(f, "/scene/{id}"),
        }
    }
}

/// Owns the active scene and moves between the selection screen and scenes.
///
/// On the first visit to the selection screen a countdown starts; once it runs out,
/// [`update`](Self::update) opens the first registered scene. Opening any scene marks
/// the session as visited, after which the countdown never starts again.
pub struct Navigator {
    registry: SceneRegistry,
    route: Route,
    active: Option<Scene>,
    visited: bool,
    auto_advance_ms: f64,
    deadline_ms: Option<f64>,
}

impl Navigator {
    /// Starts on [`Route::Selection`] without a countdown; call
    /// [`navigate`](Self::navigate) to enter it.
    pub fn new(registry: SceneRegistry, auto_advance_ms: f64) -> Self {
        Self {
            registry,
            route: Route::Selection,
            active: None,
            visited: false,
            auto_advance_ms,
            deadline_ms: None,
        }
    }

    pub fn registry(&self) -> &SceneRegistry {
        &self.registry
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn active_scene(&self) -> Option<&Scene> {
        self.active.as_ref()
    }

    pub fn has_visited_scene(&self) -> bool {
        self.visited
    }

    /// Time left before auto-advance, if a countdown is running.
    pub fn countdown_remaining_ms(&self, now_ms: f64) -> Option<f64> {
        self.deadline_ms.map(|d| (d - now_ms).max(0.0))
    }

    /// Tear down the active scene and go to `route`.
    ///
    /// An unknown scene id lands on the selection screen. A scene whose setup fails is
    /// already torn down when the error is returned.
    #[tracing::instrument(skip(self, host, route), fields(route = %route))]
    pub fn navigate(&mut self, host: &Host, route: Route) -> KineticaResult<()> {
        if let Some(mut scene) = self.active.take() {
            scene.destroy();
        }
        self.deadline_ms = None;

        let id = match route {
            Route::Selection => {
                self.enter_selection(host);
                return Ok(());
            }
            Route::Scene(id) => id,
        };
        let Some(entry) = self.registry.get(&id) else {
            tracing::warn!(scene = %id, "unknown scene id, showing selection");
            self.enter_selection(host);
            return Ok(());
        };

        self.visited = true;
        let mut scene = entry.instantiate();
        if let Err(err) = scene.setup(host) {
            self.route = Route::Selection;
            return Err(err);
        }
        tracing::debug!(scene = %id, "scene opened");
        self.active = Some(scene);
        self.route = Route::Scene(id);
        Ok(())
    }

    /// Explicit scene choice.
    pub fn select(&mut self, host: &Host, id: &str) -> KineticaResult<()> {
        self.navigate(host, Route::Scene(id.to_owned()))
    }

    fn enter_selection(&mut self, host: &Host) {
        self.route = Route::Selection;
        if !self.visited && !self.registry.is_empty() {
            let deadline = host.clock().now_ms() + self.auto_advance_ms;
            self.deadline_ms = Some(deadline);
            tracing::debug!(deadline_ms = deadline, "auto-advance countdown started");
        }
    }

    /// Auto-advance when the countdown has run out. Returns `true` if a scene was opened.
    pub fn update(&mut self, host: &Host) -> KineticaResult<bool> {
        let due = self
            .deadline_ms
            .is_some_and(|d| host.clock().now_ms() >= d);
        if !due || self.route != Route::Selection {
            return Ok(false);
        }
        let Some(first) = self.registry.first().map(|e| e.id.clone()) else {
            return Ok(false);
        };
        tracing::debug!(scene = %first, "auto-advancing");
        self.navigate(host, Route::Scene(first))?;
        Ok(true)
    }
}

impl fmt::Debug for Navigator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Navigator")
            .field("route", &self.route)
            .field("visited", &self.visited)
            .field("deadline_ms", &self.deadline_ms)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/navigator.rs"]
mod tests;

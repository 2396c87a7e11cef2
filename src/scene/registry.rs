use std::fmt;
use std::rc::Rc;

use crate::config::show::ShowConfig;
use crate::foundation::color::Color;
use crate::scene::lifecycle::Scene;
use crate::scenes::bouncing::BouncingShapes;
use crate::scenes::hex_grid::HexagonGrid;

type SceneFactory = Rc<dyn Fn() -> Scene>;

/// One selectable scene.
#[derive(Clone)]
pub struct SceneEntry {
    pub id: String,
    pub name: String,
    pub description: String,
    pub accent: Color,
    factory: SceneFactory,
}

impl SceneEntry {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        accent: Color,
        factory: impl Fn() -> Scene + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            accent,
            factory: Rc::new(factory),
        }
    }

    /// Fresh, uninitialized scene.
    pub fn instantiate(&self) -> Scene {
        (self.factory)()
    }
}

impl fmt::Debug for SceneEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneEntry")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("accent", &self.accent)
            .finish_non_exhaustive()
    }
}

/// Ordered list of scenes. Ids are expected to be unique; lookups return the first match.
#[derive(Clone, Debug, Default)]
pub struct SceneRegistry {
    entries: Vec<SceneEntry>,
}

impl SceneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// `bouncing-shapes` then `hexagon-grid`, tuned by `config`.
    pub fn builtin(config: &ShowConfig) -> Self {
        let mut registry = Self::new();

        let bouncing = config.bouncing.clone();
        registry.register(SceneEntry::new(
            "bouncing-shapes",
            "Bouncing Shapes",
            "Circles, rectangles & triangles bouncing with decorators",
            Color(0xff6b6b),
            move || Scene::new("bouncing-shapes", BouncingShapes::new(bouncing.clone())),
        ));

        let hex = config.hex_grid.clone();
        registry.register(SceneEntry::new(
            "hexagon-grid",
            "Hexagon Grid",
            "A tessellated grid with a traveling color wave and ripple pulses",
            Color(0x21918c),
            move || Scene::new("hexagon-grid", HexagonGrid::new(hex.clone())),
        ));

        registry
    }

    pub fn register(&mut self, entry: SceneEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[SceneEntry] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&SceneEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn first(&self) -> Option<&SceneEntry> {
        self.entries.first()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

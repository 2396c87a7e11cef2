//! Kinetica renders animated shape compositions.
//!
//! Shapes carry a chain of decorators (border, fill, opacity, fading glow) that is folded
//! into a render context on every draw. A timing bus fans named periodic signals out of a
//! single frame driver, scenes own their shapes and callbacks through a strict
//! setup/teardown lifecycle, and a navigator moves between a selection screen and the
//! registered scenes.
//!
//! Everything runs on one thread against an injectable [`Clock`]. The headless
//! [`Player`] drives a [`ManualClock`] frame by frame and rasterizes the [`Surface`]
//! with `vello_cpu`, so a run is reproducible for a given seed:
//!
//! - Load a [`ShowConfig`]
//! - Create a [`Player`]
//! - [`Player::play`] a scene into a [`FrameSink`] or grab a single frame with
//!   [`Player::render_frame`]
#![forbid(unsafe_code)]

mod foundation;

pub(crate) mod config;
pub(crate) mod encode;
pub(crate) mod render;
pub(crate) mod runtime;
pub(crate) mod scene;
pub(crate) mod scenes;
pub(crate) mod shape;
pub(crate) mod surface;
pub(crate) mod timing;

pub use crate::foundation::clock::{Clock, ManualClock, SystemTimeSource, TimeSource};
pub use crate::foundation::color::Color;
pub use crate::foundation::core::{
    Affine, BezPath, Canvas, Fps, FrameIndex, Point, Vec2,
};
pub use crate::foundation::error::{KineticaError, KineticaResult};

pub use crate::config::show::ShowConfig;
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, is_ffmpeg_on_path};
pub use crate::encode::sink::{FrameSink, InMemorySink, PngSequenceSink, SinkConfig, write_png};
pub use crate::render::backend::{FrameRGBA, RenderSettings};
pub use crate::render::cpu::CpuRenderer;
pub use crate::runtime::host::Host;
pub use crate::runtime::player::{PlayStats, Player};
pub use crate::scene::lifecycle::{Composition, Scene, SceneCx, SceneState};
pub use crate::scene::navigator::{Navigator, Route};
pub use crate::scene::registry::{SceneEntry, SceneRegistry};
pub use crate::scenes::bouncing::{BouncingConfig, BouncingShapes, BouncingState, EdgeStyle};
pub use crate::scenes::hex_grid::{HexCell, HexGridConfig, HexState, HexagonGrid};
pub use crate::scenes::palette;
pub use crate::shape::arena::{ShapeArena, ShapeId};
pub use crate::shape::context::RenderContext;
pub use crate::shape::decorator::{Decorator, DecoratorKind, Glow, OpacityScale};
pub use crate::shape::geometry::{Geometry, LineBinding, LineGeometry, ShapeKind};
pub use crate::shape::model::{DecoratorId, Shape};
pub use crate::surface::display_list::Surface;
pub use crate::surface::graphic::{DrawCommand, Graphic, GraphicData};
pub use crate::timing::bus::{Subscription, TimingBand, TimingBus, TimingFire};
pub use crate::timing::driver::{FrameDriver, FrameTick, TickerId};
pub use crate::timing::timers::{Scheduler, TimerId, TimerScope, Timers};

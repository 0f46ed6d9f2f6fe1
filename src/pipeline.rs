//! Fixed-function pipeline state.

use crate::gl;

/// Specifies the polygon rasterization method.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum PolygonMode {
    /// Vertices are drawn as points of the given size.
    Point(f32),

    /// Boundary edges are drawn as lines of the given width.
    Line(f32),

    /// The interior of the polygon is filled.
    #[default]
    Fill,
}

impl PolygonMode {
    pub(crate) fn as_gl_enum(self) -> u32 {
        match self {
            PolygonMode::Point(_) => gl::POINT,
            PolygonMode::Line(_) => gl::LINE,
            PolygonMode::Fill => gl::FILL,
        }
    }
}

/// Specifies depth buffer testing.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum DepthTest {
    /// Depth testing is disabled.
    Off,

    /// Passes if the incoming depth value is less than the stored one.
    #[default]
    LessThan,

    /// Passes if the incoming depth value is less than or equal to the
    /// stored one.
    LessEqual,

    /// Depth test always passes.
    Always,
}

impl DepthTest {
    pub(crate) fn as_gl_enum_if_enabled(self) -> Option<u32> {
        match self {
            DepthTest::Off => None,
            DepthTest::LessThan => Some(gl::LESS),
            DepthTest::LessEqual => Some(gl::LEQUAL),
            DepthTest::Always => Some(gl::ALWAYS),
        }
    }
}

/// Specifies the winding order of front facing triangles.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum FrontFace {
    /// Front-facing triangles are clockwise wound.
    Clockwise,

    /// Front-facing triangles are counter-clockwise wound.
    #[default]
    CounterClockwise,
}

impl FrontFace {
    pub(crate) fn as_gl_enum(self) -> u32 {
        match self {
            FrontFace::Clockwise => gl::CW,
            FrontFace::CounterClockwise => gl::CCW,
        }
    }
}

/// Hardware culling mode.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Culling {
    /// Disable culling.
    #[default]
    None,

    /// Cull the front-facing triangles.
    Front,

    /// Cull the back-facing triangles.
    Back,
}

impl Culling {
    pub(crate) fn as_gl_enum_if_enabled(self) -> Option<u32> {
        match self {
            Culling::None => None,
            Culling::Front => Some(gl::FRONT),
            Culling::Back => Some(gl::BACK),
        }
    }
}

/// Viewport region to render to.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Viewport {
    /// The whole target framebuffer.
    #[default]
    Max,

    /// A sub-rectangle, origin bottom-left.
    Subset { x: u32, y: u32, w: u32, h: u32 },
}

/// Fixed-function state parameters.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct State {
    /// Front face winding order.
    pub front_face: FrontFace,

    /// Hardware face culling mode.
    pub culling: Culling,

    /// Hardware depth testing mode.
    pub depth_test: DepthTest,

    /// Specifies the polygon rasterization method.
    pub polygon_mode: PolygonMode,

    /// Specifies region to render to.
    pub viewport: Viewport,
}

impl State {
    /// Same state with depth testing disabled, for screen-space passes.
    pub fn without_depth(self) -> Self {
        State { depth_test: DepthTest::Off, ..self }
    }
}

//! Textured cube with hand-rolled camera and object controls.

use crate::buffer::{self, Accessor, Format};
use crate::context::Context;
use crate::draw_call::{DrawCall, Primitive};
use crate::error::Result;
use crate::framebuffer::ClearOp;
use crate::input::{Key, KeyAction, Mods, MouseButton};
use crate::mesh::Mesh;
use crate::pipeline::{DepthTest, PolygonMode, State};
use crate::plugin::{Plugin, RenderPlugin};
use crate::program::{Invocation, Program, Uniform};
use crate::texture::{Sampler, Texture2};
use glam::{Mat4, Vec3};

const INIT_CAMERA_DOLLY: f32 = 5.0;
const INIT_CAMERA_FOVY: f32 = 45.0;
const MIN_CAMERA_PITCH: f32 = -89.99;
const MAX_CAMERA_PITCH: f32 = 89.99;
const MAX_PATTERN_FREQ: i32 = 15;

/// Pixels of mouse travel per unit of change.
const SENSITIVITY: f32 = 50.0;

/// Position (xyz) and texture coordinate (uv) per vertex. The cube is
/// unwrapped onto a cross-shaped atlas, so the seam vertices are duplicated.
#[rustfmt::skip]
const VERTICES: [f32; 70] = [
    -0.5, -0.5, -0.5,   0.25, 0.25,
     0.5, -0.5, -0.5,   0.5,  0.25,
    -0.5,  0.5, -0.5,   0.25, 1.0,
     0.5,  0.5, -0.5,   0.5,  1.0,
    -0.5, -0.5,  0.5,   0.25, 0.5,
     0.5, -0.5,  0.5,   0.5,  0.5,
    -0.5,  0.5,  0.5,   0.25, 0.75,
     0.5,  0.5,  0.5,   0.5,  0.75,
    -0.5, -0.5, -0.5,   0.0,  0.5,
    -0.5,  0.5, -0.5,   0.0,  0.75,
     0.5, -0.5, -0.5,   0.75, 0.5,
     0.5,  0.5, -0.5,   0.75, 0.75,
    -0.5, -0.5, -0.5,   1.0,  0.5,
    -0.5,  0.5, -0.5,   1.0,  0.75,
];

#[rustfmt::skip]
const INDICES: [u32; 36] = [
    12, 13, 10,  10, 13, 11, // back
     5,  7,  4,   4,  7,  6, // front
     1,  5,  0,   0,  5,  4, // bottom
     7,  3,  6,   6,  3,  2, // top
     4,  6,  8,   8,  6,  9, // left
    10, 11,  5,   5, 11,  7, // right
];

/// What mouse drags act on.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum ControlMode {
    Camera,
    Object,
}

/// Which object transform mouse drags edit.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum TransformMode {
    Translate,
    Rotate,
    Scale,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct CameraParams {
    dolly: f32,
    fovy: f32,
    pitch: f32,
    yaw: f32,
}

impl Default for CameraParams {
    fn default() -> Self {
        CameraParams { dolly: INIT_CAMERA_DOLLY, fovy: INIT_CAMERA_FOVY, pitch: 0.0, yaw: 0.0 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct ObjectParams {
    translate: Vec3,
    /// Euler angles in degrees.
    rotate: Vec3,
    scale: Vec3,
}

impl Default for ObjectParams {
    fn default() -> Self {
        ObjectParams { translate: Vec3::ZERO, rotate: Vec3::ZERO, scale: Vec3::ONE }
    }
}

pub struct HelloCube {
    mesh: Mesh,
    program: Program,
    texture: Texture2,
    background: [f32; 3],
    aspect: f32,
    control: ControlMode,
    transform: TransformMode,
    camera: CameraParams,
    object: ObjectParams,
    wireframe: bool,
    show_texture: bool,
    pattern_freq: i32,
}

/// Pressed state of the left, middle and right mouse buttons.
#[derive(Clone, Copy, Debug, Default)]
struct Buttons {
    left: bool,
    middle: bool,
    right: bool,
}

impl Buttons {
    fn of(ctx: &Context) -> Self {
        Buttons {
            left: ctx.is_mouse_button_pressed(MouseButton::Left),
            middle: ctx.is_mouse_button_pressed(MouseButton::Middle),
            right: ctx.is_mouse_button_pressed(MouseButton::Right),
        }
    }
}

impl CameraParams {
    fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh_gl(self.fovy.to_radians(), aspect, 0.1, 100.0)
    }

    fn view(&self) -> Mat4 {
        Mat4::from_translation(Vec3::new(0.0, 0.0, -self.dolly))
            * Mat4::from_rotation_y(self.yaw.to_radians())
            * Mat4::from_rotation_x(self.pitch.to_radians())
    }

    fn drag(&mut self, buttons: Buttons, dx: f32, dy: f32) {
        if buttons.left {
            self.yaw -= dx;
            self.pitch = (self.pitch - dy).clamp(MIN_CAMERA_PITCH, MAX_CAMERA_PITCH);
        } else if buttons.middle {
            self.fovy = (self.fovy + dy).clamp(1.0, 90.0);
        } else if buttons.right {
            self.dolly = (self.dolly + dy).clamp(0.1, 100.0);
        }
    }
}

impl ObjectParams {
    fn model(&self) -> Mat4 {
        Mat4::from_translation(self.translate)
            * Mat4::from_rotation_z(self.rotate.z.to_radians())
            * Mat4::from_rotation_y(self.rotate.y.to_radians())
            * Mat4::from_rotation_x(self.rotate.x.to_radians())
            * Mat4::from_scale(self.scale)
    }

    fn drag(&mut self, mode: TransformMode, buttons: Buttons, dx: f32, dy: f32) {
        // Each button edits a different pair of axes; rotation keeps the
        // screen direction of the vertical drag.
        let delta = match (mode, buttons.left, buttons.middle, buttons.right) {
            (TransformMode::Rotate, true, _, _) => Vec3::new(dy, dx, 0.0),
            (TransformMode::Rotate, false, true, _) => Vec3::new(dx, 0.0, dy),
            (TransformMode::Rotate, false, false, true) => Vec3::new(0.0, dx, dy),
            (_, true, _, _) => Vec3::new(dx, -dy, 0.0),
            (_, false, true, _) => Vec3::new(dx, 0.0, -dy),
            (_, false, false, true) => Vec3::new(0.0, dx, -dy),
            _ => return,
        };
        match mode {
            TransformMode::Translate => self.translate += delta,
            TransformMode::Rotate => self.rotate += delta,
            TransformMode::Scale => self.scale = (self.scale + delta).max(Vec3::splat(0.1)),
        }
    }
}

impl Plugin for HelloCube {
    const NAME: &'static str = "HelloCube";
    const PATH: &'static str = "PCVC/HelloCube";
    const IDX: u32 = 104;

    fn create(ctx: &mut Context) -> Result<Self> {
        let factory = ctx.factory();
        let vbo = factory.buffer(buffer::Kind::Array, &VERTICES);
        let ibo = factory.buffer(buffer::Kind::Index, &INDICES);
        let stride = 5 * std::mem::size_of::<f32>();
        let mesh = factory.mesh(
            &[
                (0, Accessor::new(vbo.clone(), Format::F32(3), 0, stride)),
                (1, Accessor::new(vbo, Format::F32(2), 3 * std::mem::size_of::<f32>(), stride)),
            ],
            Some(Accessor::new(ibo, Format::U32(1), 0, 0)),
            DrawCall::elements(Primitive::Triangles, INDICES.len()),
        );
        let program = ctx.load_program("cube.vert", "cube.frag")?;
        let texture = ctx.load_texture("texture.png", Sampler::default())?;

        Ok(HelloCube {
            mesh,
            program,
            texture,
            background: [0.2, 0.2, 0.2],
            aspect: ctx.aspect(),
            control: ControlMode::Camera,
            transform: TransformMode::Translate,
            camera: CameraParams::default(),
            object: ObjectParams::default(),
            wireframe: false,
            show_texture: false,
            pattern_freq: 0,
        })
    }
}

impl RenderPlugin for HelloCube {
    fn render(&mut self, ctx: &mut Context) -> Result<()> {
        let factory = ctx.factory();
        let framebuffer = ctx.default_framebuffer();
        factory.clear(&framebuffer, ClearOp::color_depth(self.background));

        let state = State {
            depth_test: DepthTest::LessThan,
            polygon_mode: if self.wireframe { PolygonMode::Line(1.0) } else { PolygonMode::Fill },
            ..State::default()
        };
        let uniforms = [
            ("proj", Uniform::from(self.camera.projection(self.aspect))),
            ("view", Uniform::from(self.camera.view())),
            ("model", Uniform::from(self.object.model())),
            ("showTexture", Uniform::from(self.show_texture)),
            ("patternFreq", Uniform::from(self.pattern_freq)),
        ];
        let textures = [("tex", &self.texture)];
        let invocation = Invocation { program: &self.program, uniforms: &uniforms, textures: &textures };
        factory.draw(&framebuffer, &state, &self.mesh, &invocation);
        Ok(())
    }

    fn resize(&mut self, _ctx: &mut Context, width: u32, height: u32) -> Result<()> {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
            debug!("HelloCube aspect {:.3}", self.aspect);
        }
        Ok(())
    }

    fn keyboard(&mut self, _ctx: &mut Context, key: Key, action: KeyAction, _mods: Mods) -> Result<()> {
        if action == KeyAction::Release {
            return Ok(());
        }
        match key {
            Key::Tab if action == KeyAction::Press => {
                self.control = match self.control {
                    ControlMode::Camera => ControlMode::Object,
                    ControlMode::Object => ControlMode::Camera,
                };
                info!("mouse controls the {:?}", self.control);
            }
            Key::Key1 => self.transform = TransformMode::Translate,
            Key::Key2 => self.transform = TransformMode::Rotate,
            Key::Key3 => self.transform = TransformMode::Scale,
            Key::W if action == KeyAction::Press => self.wireframe = !self.wireframe,
            Key::T if action == KeyAction::Press => self.show_texture = !self.show_texture,
            Key::Up => self.pattern_freq = (self.pattern_freq + 1).min(MAX_PATTERN_FREQ),
            Key::Down => self.pattern_freq = (self.pattern_freq - 1).max(0),
            Key::C => self.camera = CameraParams::default(),
            Key::O => self.object = ObjectParams::default(),
            _ => {}
        }
        Ok(())
    }

    fn mouse_move(&mut self, ctx: &mut Context, _x: f64, _y: f64) -> Result<()> {
        let (dx, dy) = ctx.cursor_delta();
        let (dx, dy) = (dx as f32 / SENSITIVITY, dy as f32 / SENSITIVITY);
        let buttons = Buttons::of(ctx);
        match self.control {
            ControlMode::Camera => self.camera.drag(buttons, dx, dy),
            ControlMode::Object => self.object.drag(self.transform, buttons, dx, dy),
        }
        Ok(())
    }

    fn gui(&mut self, _ctx: &mut Context, ui: &mut egui::Ui) -> Result<()> {
        ui.horizontal(|ui| {
            ui.label("Background");
            ui.color_edit_button_rgb(&mut self.background);
        });
        ui.horizontal(|ui| {
            ui.label("Mouse moves");
            ui.radio_value(&mut self.control, ControlMode::Camera, "camera");
            ui.radio_value(&mut self.control, ControlMode::Object, "object");
        });

        egui::CollapsingHeader::new("Camera").default_open(true).show(ui, |ui| {
            ui.add(egui::Slider::new(&mut self.camera.fovy, 1.0..=90.0).text("FoVy"));
            ui.add(egui::Slider::new(&mut self.camera.dolly, 0.1..=100.0).logarithmic(true).text("Dolly"));
            ui.add(egui::Slider::new(&mut self.camera.pitch, MIN_CAMERA_PITCH..=MAX_CAMERA_PITCH).text("Pitch"));
            ui.add(egui::DragValue::new(&mut self.camera.yaw).prefix("Yaw "));
            if ui.button("Reset camera").clicked() {
                self.camera = CameraParams::default();
            }
        });

        egui::CollapsingHeader::new("Object").default_open(true).show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.radio_value(&mut self.transform, TransformMode::Translate, "translate");
                ui.radio_value(&mut self.transform, TransformMode::Rotate, "rotate");
                ui.radio_value(&mut self.transform, TransformMode::Scale, "scale");
            });
            if ui.button("Reset object").clicked() {
                self.object = ObjectParams::default();
            }
        });

        ui.checkbox(&mut self.wireframe, "Wireframe");
        ui.checkbox(&mut self.show_texture, "Texture");
        ui.add(egui::Slider::new(&mut self.pattern_freq, 0..=MAX_PATTERN_FREQ).text("Pattern frequency"));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEFT: Buttons = Buttons { left: true, middle: false, right: false };
    const MIDDLE: Buttons = Buttons { left: false, middle: true, right: false };
    const RIGHT: Buttons = Buttons { left: false, middle: false, right: true };

    #[test]
    fn indices_stay_within_the_vertex_list() {
        let vertex_count = VERTICES.len() / 5;
        assert!(INDICES.iter().all(|&i| (i as usize) < vertex_count));
    }

    #[test]
    fn default_view_backs_away_by_the_dolly() {
        let view = CameraParams::default().view();
        let eye_origin = view.transform_point3(Vec3::ZERO);
        assert!((eye_origin - Vec3::new(0.0, 0.0, -INIT_CAMERA_DOLLY)).length() < 1e-6);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut camera = CameraParams::default();
        camera.drag(LEFT, 0.0, -1000.0);
        assert_eq!(camera.pitch, MAX_CAMERA_PITCH);
        camera.drag(LEFT, 0.0, 1000.0);
        assert_eq!(camera.pitch, MIN_CAMERA_PITCH);
    }

    #[test]
    fn camera_buttons_edit_separate_parameters() {
        let mut camera = CameraParams::default();
        camera.drag(MIDDLE, 0.0, 2.0);
        assert_eq!(camera.fovy, INIT_CAMERA_FOVY + 2.0);
        camera.drag(RIGHT, 0.0, 1.0);
        assert_eq!(camera.dolly, INIT_CAMERA_DOLLY + 1.0);
        camera.drag(Buttons::default(), 5.0, 5.0);
        assert_eq!(camera.yaw, 0.0);
    }

    #[test]
    fn translate_drag_moves_in_screen_plane() {
        let mut object = ObjectParams::default();
        object.drag(TransformMode::Translate, LEFT, 1.0, 2.0);
        assert_eq!(object.translate, Vec3::new(1.0, -2.0, 0.0));
        object.drag(TransformMode::Translate, RIGHT, 1.0, 1.0);
        assert_eq!(object.translate, Vec3::new(1.0, -1.0, -1.0));
    }

    #[test]
    fn rotate_drag_swaps_axes_for_left_button() {
        let mut object = ObjectParams::default();
        object.drag(TransformMode::Rotate, LEFT, 3.0, 4.0);
        assert_eq!(object.rotate, Vec3::new(4.0, 3.0, 0.0));
    }

    #[test]
    fn scale_never_collapses() {
        let mut object = ObjectParams::default();
        object.drag(TransformMode::Scale, LEFT, -10.0, 10.0);
        assert_eq!(object.scale, Vec3::new(0.1, 0.1, 1.0));
    }

    #[test]
    fn model_applies_scale_before_translation() {
        let object = ObjectParams {
            translate: Vec3::new(1.0, 0.0, 0.0),
            rotate: Vec3::ZERO,
            scale: Vec3::splat(2.0),
        };
        let p = object.model().transform_point3(Vec3::new(0.5, 0.0, 0.0));
        assert!((p - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-6);
    }
}

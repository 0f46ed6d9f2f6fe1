//! Object picking through an id attachment of an off-screen framebuffer.
//!
//! The scene is drawn into three color attachments (shaded color, object id
//! and view-space normal) plus depth. A full-screen quad then shows one of
//! them. Ctrl+Left picks the object under the cursor, Ctrl+Right drags it in
//! the view plane and Ctrl+Middle along the view direction.

use crate::buffer::{self, Accessor, Format};
use crate::camera::OrbitCamera;
use crate::context::Context;
use crate::draw_call::{DrawCall, Primitive};
use crate::error::Result;
use crate::factory::Factory;
use crate::framebuffer::{ClearOp, Framebuffer};
use crate::input::{Key, KeyAction, Mods, MouseButton, MouseButtonAction};
use crate::mesh::Mesh;
use crate::pipeline::{DepthTest, PolygonMode, State};
use crate::plugin::{Plugin, RenderPlugin};
use crate::program::{Invocation, Program, Uniform};
use crate::texture;
use glam::{Mat4, Vec3};
use std::cell::RefCell;
use std::f32::consts::{PI, TAU};
use std::mem;
use std::rc::Rc;

const INIT_CAMERA_DOLLY: f32 = 5.0;
const FOVY: f32 = 45.0;
const Z_NEAR: f32 = 0.01;
const Z_FAR: f32 = 20.0;

/// World units per pixel of drag.
const MOVE_SPEED: f32 = 0.01;

/// The selection box is this much larger than the unit cube.
const SELECTION_SCALE: f32 = 1.2;

/// Attachment holding the object id as a float.
const ID_ATTACHMENT: usize = 1;

const ATTACHMENTS: [texture::Format; 3] = [
    texture::Format::Rgba8,
    texture::Format::R32F,
    texture::Format::Rgb32F,
];

/// What the final quad shows, indexed by its `showMode` uniform.
const VIEWS: [&str; 4] = ["Color", "Object id", "Normals", "Depth"];

/// Interleaved position and normal vertices with triangle indices.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Geometry {
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

impl Geometry {
    const FLOATS_PER_VERTEX: usize = 6;

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / Self::FLOATS_PER_VERTEX
    }

    fn push(&mut self, position: Vec3, normal: Vec3) {
        self.vertices.extend_from_slice(&position.to_array());
        self.vertices.extend_from_slice(&normal.to_array());
    }

    /// Unit cube centred on the origin with flat face normals.
    pub fn cube() -> Self {
        let mut geometry = Geometry::default();
        for axis in 0..3 {
            for sign in [-1.0f32, 1.0] {
                let mut normal = Vec3::ZERO;
                normal[axis] = sign;
                let mut tangent = Vec3::ZERO;
                tangent[(axis + 1) % 3] = 1.0;
                let mut bitangent = Vec3::ZERO;
                bitangent[(axis + 2) % 3] = 1.0;
                // Keep the winding counter-clockwise seen from outside.
                if sign < 0.0 {
                    mem::swap(&mut tangent, &mut bitangent);
                }
                let base = geometry.vertex_count() as u32;
                let center = normal * 0.5;
                for (s, t) in [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)] {
                    geometry.push(center + tangent * s + bitangent * t, normal);
                }
                geometry.indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
            }
        }
        geometry
    }

    /// Sphere of radius 0.5 built from `stacks` latitude bands.
    pub fn sphere(stacks: u32, slices: u32) -> Self {
        let mut geometry = Geometry::default();
        for stack in 0..=stacks {
            let theta = PI * stack as f32 / stacks as f32;
            for slice in 0..=slices {
                let phi = TAU * slice as f32 / slices as f32;
                let normal = Vec3::new(theta.sin() * phi.cos(), theta.sin() * phi.sin(), theta.cos());
                geometry.push(normal * 0.5, normal);
            }
        }
        geometry.indices = grid_indices(stacks, slices);
        geometry
    }

    /// Torus around the z axis fitting inside the unit cube.
    pub fn torus(rings: u32, sides: u32) -> Self {
        const MAJOR: f32 = 0.35;
        const MINOR: f32 = 0.15;
        let mut geometry = Geometry::default();
        for ring in 0..=rings {
            let phi = TAU * ring as f32 / rings as f32;
            let center = Vec3::new(phi.cos(), phi.sin(), 0.0) * MAJOR;
            for side in 0..=sides {
                let theta = TAU * side as f32 / sides as f32;
                let normal = Vec3::new(theta.cos() * phi.cos(), theta.cos() * phi.sin(), theta.sin());
                geometry.push(center + normal * MINOR, normal);
            }
        }
        geometry.indices = grid_indices(rings, sides);
        geometry
    }
}

/// Two triangles per cell of a `(rows + 1) x (columns + 1)` vertex grid.
fn grid_indices(rows: u32, columns: u32) -> Vec<u32> {
    let stride = columns + 1;
    let mut indices = Vec::with_capacity((rows * columns * 6) as usize);
    for row in 0..rows {
        for column in 0..columns {
            let a = row * stride + column;
            let b = a + stride;
            indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
        }
    }
    indices
}

#[rustfmt::skip]
const BOX_CORNERS: [f32; 24] = [
    -0.5, -0.5, -0.5,   0.5, -0.5, -0.5,   0.5,  0.5, -0.5,  -0.5,  0.5, -0.5,
    -0.5, -0.5,  0.5,   0.5, -0.5,  0.5,   0.5,  0.5,  0.5,  -0.5,  0.5,  0.5,
];

#[rustfmt::skip]
const BOX_EDGES: [u32; 24] = [
    0, 1,  1, 2,  2, 3,  3, 0,
    4, 5,  5, 6,  6, 7,  7, 4,
    0, 4,  1, 5,  2, 6,  3, 7,
];

#[rustfmt::skip]
const QUAD: [f32; 8] = [
    -1.0, -1.0,
     1.0, -1.0,
    -1.0,  1.0,
     1.0,  1.0,
];

/// How a drag moves the picked object.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MoveMode {
    None,
    /// In the view plane.
    Xy,
    /// Along the view direction.
    Z,
}

impl MoveMode {
    /// Ctrl+Right starts a view-plane move, Ctrl+Middle a depth move; every
    /// other button event ends the move.
    pub fn from_button(button: MouseButton, action: MouseButtonAction, mods: Mods) -> Self {
        match (button, action) {
            (MouseButton::Right, MouseButtonAction::Press) if mods.control() => MoveMode::Xy,
            (MouseButton::Middle, MouseButtonAction::Press) if mods.control() => MoveMode::Z,
            _ => MoveMode::None,
        }
    }

    /// World-space offset for a drag of `(dx, dy)` pixels seen through `view`.
    pub fn offset(self, view: &Mat4, dx: f32, dy: f32) -> Vec3 {
        let right = view.row(0).truncate();
        let up = view.row(1).truncate();
        let forward = view.row(2).truncate();
        match self {
            MoveMode::None => Vec3::ZERO,
            MoveMode::Xy => (right * dx - up * dy) * MOVE_SPEED,
            MoveMode::Z => forward * dy * MOVE_SPEED,
        }
    }
}

/// Index of the object whose id was read back, if any. Ids start at 1.
pub fn picked_index(value: f32, object_count: usize) -> Option<usize> {
    let id = value.round();
    if id >= 1.0 && (id as usize) <= object_count {
        Some(id as usize - 1)
    } else {
        None
    }
}

/// Window cursor position to framebuffer texel, whose rows count upwards.
pub fn cursor_texel((x, y): (f64, f64), (width, height): (u32, u32)) -> Option<(i32, i32)> {
    if x < 0.0 || y < 0.0 || x >= width as f64 || y >= height as f64 {
        return None;
    }
    Some((x as i32, height as i32 - 1 - y as i32))
}

struct Object {
    name: &'static str,
    mesh: Mesh,
    model: Mat4,
    color: Vec3,
}

struct Programs {
    scene: Program,
    selection: Program,
    quad: Program,
}

impl Programs {
    fn load(ctx: &Context) -> Result<Self> {
        Ok(Programs {
            scene: ctx.load_program("scene.vert", "scene.frag")?,
            selection: ctx.load_program("box.vert", "box.frag")?,
            quad: ctx.load_program("quad.vert", "quad.frag")?,
        })
    }
}

pub struct Picking {
    camera: Rc<RefCell<OrbitCamera>>,
    programs: Programs,
    objects: Vec<Object>,
    selection_box: Mesh,
    quad: Mesh,
    fbo: Option<Framebuffer>,
    aspect: f32,
    show_attachment: i32,
    picked: Option<usize>,
    move_mode: MoveMode,
}

fn upload(factory: &Factory, geometry: &Geometry) -> Mesh {
    let vbo = factory.buffer(buffer::Kind::Array, &geometry.vertices);
    let ibo = factory.buffer(buffer::Kind::Index, &geometry.indices);
    let stride = Geometry::FLOATS_PER_VERTEX * mem::size_of::<f32>();
    factory.mesh(
        &[
            (0, Accessor::new(vbo.clone(), Format::F32(3), 0, stride)),
            (1, Accessor::new(vbo, Format::F32(3), 3 * mem::size_of::<f32>(), stride)),
        ],
        Some(Accessor::new(ibo, Format::U32(1), 0, 0)),
        DrawCall::elements(Primitive::Triangles, geometry.indices.len()),
    )
}

impl Picking {
    /// Recompiles the shaders. On failure the old programs stay in use.
    fn reload(&mut self, ctx: &Context) {
        match Programs::load(ctx) {
            Ok(programs) => {
                self.programs = programs;
                info!("reloaded shaders");
            }
            Err(err) => error!("shader reload failed, keeping the old programs: {}", err),
        }
    }

    fn projection(&self) -> Mat4 {
        Mat4::perspective_rh_gl(FOVY.to_radians(), self.aspect, Z_NEAR, Z_FAR)
    }

    fn pick(&mut self, ctx: &Context) {
        let Some(fbo) = self.fbo.as_ref() else {
            return;
        };
        let Some((x, y)) = cursor_texel(ctx.cursor(), fbo.dimensions()) else {
            return;
        };
        let value = ctx.factory().read_value(fbo, ID_ATTACHMENT, x, y);
        self.picked = picked_index(value, self.objects.len());
        match self.picked {
            Some(index) => info!("picked {}", self.objects[index].name),
            None => debug!("nothing under the cursor at ({}, {})", x, y),
        }
    }

    fn draw_scene(&self, factory: &Factory, fbo: &Framebuffer) {
        factory.clear(fbo, ClearOp::color_depth([0.0, 0.0, 0.0]));
        let proj = Uniform::from(self.projection());
        let view = Uniform::from(self.camera.borrow().view_mx());
        let state = State { depth_test: DepthTest::LessThan, ..State::default() };

        for (index, object) in self.objects.iter().enumerate() {
            let uniforms = [
                ("projMx", proj),
                ("viewMx", view),
                ("modelMx", Uniform::from(object.model)),
                ("color", Uniform::from(object.color)),
                ("objectId", Uniform::from((index + 1) as f32)),
            ];
            let invocation = Invocation { program: &self.programs.scene, uniforms: &uniforms, textures: &[] };
            factory.draw(fbo, &state, &object.mesh, &invocation);
        }

        if let Some(object) = self.picked.and_then(|index| self.objects.get(index)) {
            let model = object.model * Mat4::from_scale(Vec3::splat(SELECTION_SCALE));
            let uniforms = [("projMx", proj), ("viewMx", view), ("modelMx", Uniform::from(model))];
            let invocation = Invocation { program: &self.programs.selection, uniforms: &uniforms, textures: &[] };
            let state = State { polygon_mode: PolygonMode::Line(2.0), ..state };
            factory.draw(fbo, &state, &self.selection_box, &invocation);
        }
    }

    fn draw_quad(&self, factory: &Factory, target: &Framebuffer, fbo: &Framebuffer) {
        factory.clear(target, ClearOp::color_depth([0.0, 0.0, 0.0]));
        let (Some(color), Some(id), Some(normal), Some(depth)) =
            (fbo.color(0), fbo.color(1), fbo.color(2), fbo.depth())
        else {
            return;
        };
        let uniforms = [("showMode", Uniform::from(self.show_attachment))];
        let textures = [("tex", color), ("idTex", id), ("normalTex", normal), ("depthTex", depth)];
        let invocation = Invocation { program: &self.programs.quad, uniforms: &uniforms, textures: &textures };
        factory.draw(target, &State::default().without_depth(), &self.quad, &invocation);
    }
}

impl Plugin for Picking {
    const NAME: &'static str = "Picking";
    const PATH: &'static str = "PCVC/Picking";
    const IDX: u32 = 101;

    fn create(ctx: &mut Context) -> Result<Self> {
        let camera = Rc::new(RefCell::new(OrbitCamera::new(INIT_CAMERA_DOLLY)));
        ctx.register_camera(&camera)?;
        let programs = Programs::load(ctx)?;

        let factory = ctx.factory();
        let cube = upload(factory, &Geometry::cube());
        let objects = vec![
            Object {
                name: "base plate",
                mesh: cube.clone(),
                model: Mat4::from_translation(Vec3::new(0.0, 0.0, -0.6))
                    * Mat4::from_scale(Vec3::new(5.0, 5.0, 0.01)),
                color: Vec3::splat(0.6),
            },
            Object {
                name: "cube",
                mesh: cube,
                model: Mat4::from_translation(Vec3::new(-0.5, 1.3, 0.0)),
                color: Vec3::new(0.9, 0.3, 0.2),
            },
            Object {
                name: "sphere",
                mesh: upload(factory, &Geometry::sphere(32, 64)),
                model: Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0)) * Mat4::from_scale(Vec3::splat(1.1)),
                color: Vec3::new(0.2, 0.4, 0.9),
            },
            Object {
                name: "torus",
                mesh: upload(factory, &Geometry::torus(48, 24)),
                model: Mat4::from_translation(Vec3::new(-1.0, -0.6, 0.0)),
                color: Vec3::new(0.3, 0.8, 0.3),
            },
        ];

        let corners = factory.buffer(buffer::Kind::Array, &BOX_CORNERS);
        let edges = factory.buffer(buffer::Kind::Index, &BOX_EDGES);
        let selection_box = factory.mesh(
            &[(0, Accessor::new(corners, Format::F32(3), 0, 0))],
            Some(Accessor::new(edges, Format::U32(1), 0, 0)),
            DrawCall::elements(Primitive::Lines, BOX_EDGES.len()),
        );
        let corners = factory.buffer(buffer::Kind::Array, &QUAD);
        let quad = factory.mesh(
            &[(0, Accessor::new(corners, Format::F32(2), 0, 0))],
            None,
            DrawCall::arrays(Primitive::TriangleStrip, 4),
        );

        Ok(Picking {
            camera,
            programs,
            objects,
            selection_box,
            quad,
            fbo: None,
            aspect: ctx.aspect(),
            show_attachment: 0,
            picked: None,
            move_mode: MoveMode::None,
        })
    }
}

impl RenderPlugin for Picking {
    fn render(&mut self, ctx: &mut Context) -> Result<()> {
        let factory = ctx.factory();
        let target = ctx.default_framebuffer();
        match self.fbo.as_ref() {
            Some(fbo) => {
                self.draw_scene(factory, fbo);
                self.draw_quad(factory, &target, fbo);
            }
            None => factory.clear(&target, ClearOp::color_depth([0.0, 0.0, 0.0])),
        }
        Ok(())
    }

    fn resize(&mut self, ctx: &mut Context, width: u32, height: u32) -> Result<()> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.aspect = width as f32 / height as f32;
        // Drop the old attachments before allocating the new ones.
        self.fbo = None;
        self.fbo = Some(ctx.factory().framebuffer(width, height, &ATTACHMENTS, true)?);
        Ok(())
    }

    fn keyboard(&mut self, ctx: &mut Context, key: Key, action: KeyAction, _mods: Mods) -> Result<()> {
        if action != KeyAction::Press {
            return Ok(());
        }
        match key {
            Key::R => self.reload(ctx),
            Key::Key1 | Key::Key2 | Key::Key3 | Key::Key4 => {
                if let Some(digit) = key.digit() {
                    self.show_attachment = i32::from(digit) - 1;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn mouse_button(
        &mut self,
        ctx: &mut Context,
        button: MouseButton,
        action: MouseButtonAction,
        mods: Mods,
    ) -> Result<()> {
        if button == MouseButton::Left && action == MouseButtonAction::Press && mods.control() {
            self.pick(ctx);
        }
        self.move_mode = MoveMode::from_button(button, action, mods);
        Ok(())
    }

    fn mouse_move(&mut self, ctx: &mut Context, _x: f64, _y: f64) -> Result<()> {
        let Some(object) = self.picked.and_then(|index| self.objects.get_mut(index)) else {
            return Ok(());
        };
        if self.move_mode == MoveMode::None {
            return Ok(());
        }
        let (dx, dy) = ctx.cursor_delta();
        let view = self.camera.borrow().view_mx();
        let offset = self.move_mode.offset(&view, dx as f32, dy as f32);
        object.model = Mat4::from_translation(offset) * object.model;
        Ok(())
    }

    fn gui(&mut self, ctx: &mut Context, ui: &mut egui::Ui) -> Result<()> {
        let shown = usize::try_from(self.show_attachment)
            .ok()
            .and_then(|index| VIEWS.get(index))
            .copied()
            .unwrap_or("?");
        egui::ComboBox::from_label("Attachment")
            .selected_text(shown)
            .show_ui(ui, |ui| {
                for (index, name) in (0..).zip(VIEWS) {
                    ui.selectable_value(&mut self.show_attachment, index, name);
                }
            });

        let picked = self
            .picked
            .and_then(|index| self.objects.get(index))
            .map_or("nothing", |object| object.name);
        ui.horizontal(|ui| {
            ui.label(format!("Picked: {}", picked));
            if self.picked.is_some() && ui.button("Deselect").clicked() {
                self.picked = None;
                self.move_mode = MoveMode::None;
            }
        });
        ui.label("Ctrl+left click picks. Ctrl+right drag moves in the view plane, Ctrl+middle drag in depth.");

        if ui.button("Reload shaders").clicked() {
            self.reload(ctx);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_indices_valid(geometry: &Geometry) {
        let count = geometry.vertex_count() as u32;
        assert_eq!(geometry.indices.len() % 3, 0);
        assert!(geometry.indices.iter().all(|&i| i < count));
    }

    #[test]
    fn cube_has_four_vertices_per_face() {
        let cube = Geometry::cube();
        assert_eq!(cube.vertex_count(), 24);
        assert_eq!(cube.indices.len(), 36);
        assert_indices_valid(&cube);
    }

    #[test]
    fn cube_faces_wind_outwards() {
        let cube = Geometry::cube();
        let vertex = |i: u32| {
            let start = i as usize * Geometry::FLOATS_PER_VERTEX;
            let v = &cube.vertices[start..start + 6];
            (Vec3::new(v[0], v[1], v[2]), Vec3::new(v[3], v[4], v[5]))
        };
        for triangle in cube.indices.chunks(3) {
            let (a, normal) = vertex(triangle[0]);
            let (b, _) = vertex(triangle[1]);
            let (c, _) = vertex(triangle[2]);
            assert!((b - a).cross(c - a).dot(normal) > 0.0);
        }
    }

    #[test]
    fn sphere_vertices_lie_on_radius() {
        let sphere = Geometry::sphere(8, 16);
        assert_eq!(sphere.vertex_count(), 9 * 17);
        assert_indices_valid(&sphere);
        for vertex in sphere.vertices.chunks(6) {
            let position = Vec3::from_slice(&vertex[..3]);
            assert!((position.length() - 0.5).abs() < 1e-5);
        }
    }

    #[test]
    fn torus_fits_in_unit_cube() {
        let torus = Geometry::torus(12, 8);
        assert_indices_valid(&torus);
        for vertex in torus.vertices.chunks(6) {
            assert!(vertex[..3].iter().all(|c| c.abs() <= 0.5 + 1e-5));
        }
    }

    #[test]
    fn picked_index_ignores_background_and_unknown_ids() {
        assert_eq!(picked_index(0.0, 4), None);
        assert_eq!(picked_index(-1.0, 4), None);
        assert_eq!(picked_index(1.0, 4), Some(0));
        assert_eq!(picked_index(3.9999, 4), Some(3));
        assert_eq!(picked_index(5.0, 4), None);
    }

    #[test]
    fn cursor_rows_are_flipped() {
        assert_eq!(cursor_texel((0.0, 0.0), (100, 50)), Some((0, 49)));
        assert_eq!(cursor_texel((99.5, 49.5), (100, 50)), Some((99, 0)));
        assert_eq!(cursor_texel((100.0, 10.0), (100, 50)), None);
        assert_eq!(cursor_texel((-1.0, 10.0), (100, 50)), None);
    }

    #[test]
    fn move_mode_needs_control() {
        let ctrl = Mods::CONTROL;
        let press = MouseButtonAction::Press;
        assert_eq!(MoveMode::from_button(MouseButton::Right, press, ctrl), MoveMode::Xy);
        assert_eq!(MoveMode::from_button(MouseButton::Middle, press, ctrl), MoveMode::Z);
        assert_eq!(MoveMode::from_button(MouseButton::Right, press, Mods::empty()), MoveMode::None);
        assert_eq!(
            MoveMode::from_button(MouseButton::Right, MouseButtonAction::Release, ctrl),
            MoveMode::None,
        );
    }

    #[test]
    fn identity_view_moves_along_world_axes() {
        let view = Mat4::IDENTITY;
        assert_eq!(MoveMode::Xy.offset(&view, 100.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(MoveMode::Xy.offset(&view, 0.0, 100.0), Vec3::new(0.0, -1.0, 0.0));
        assert_eq!(MoveMode::Z.offset(&view, 0.0, 100.0), Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(MoveMode::None.offset(&view, 5.0, 5.0), Vec3::ZERO);
    }

    #[test]
    fn view_plane_move_follows_camera_rotation() {
        let view = Mat4::from_rotation_y(std::f32::consts::FRAC_PI_2);
        let offset = MoveMode::Xy.offset(&view, 100.0, 0.0);
        let screen = view.transform_vector3(offset);
        assert!((screen - Vec3::new(1.0, 0.0, 0.0)).length() < 1e-5);
    }
}

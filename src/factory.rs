//! Factory.

use crate::buffer::{self, Accessor, Buffer};
use crate::draw_call::{DrawCall, Kind};
use crate::error::{Error, Result, Stage};
use crate::framebuffer::{ClearColor, ClearDepth, ClearOp, ColorAttachments, Framebuffer, MAX_COLOR_ATTACHMENTS};
use crate::gl;
use crate::mesh::{Mesh, MAX_ATTRIBUTES};
use crate::pipeline::{PolygonMode, State, Viewport};
use crate::pixels::Pixels;
use crate::program::{Invocation, Program, Uniform, MAX_TEXTURES};
use crate::queue::{self, Queue};
use crate::texture::{self, Sampler, Texture2};
use std::{ffi, mem, os, ptr};

/// Creates every GL object and deletes the ones that have been dropped.
#[derive(Clone)]
pub struct Factory {
    /// Function pointers to the OpenGL backend.
    backend: gl::Backend,

    /// Dropped objects arrive here and are deleted by `collect`.
    queue: Queue<queue::Object>,
}

impl Factory {
    /// Constructor.
    pub fn new<F>(query_proc_address: F) -> Self
        where F: FnMut(&str) -> *const os::raw::c_void
    {
        Self {
            backend: gl::Backend::load(query_proc_address),
            queue: Queue::new(),
        }
    }

    /// A factory with no GL context behind it.
    ///
    /// State resets and garbage collection become no-ops; every other
    /// operation panics when it reaches the driver.
    pub fn headless() -> Self {
        Self::new(|_| ptr::null())
    }

    /// Returns `true` if no GL context is loaded.
    pub fn is_headless(&self) -> bool {
        !self.backend.is_loaded()
    }

    /// Number of dropped objects waiting for `collect`.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Deletes every object whose last handle has been dropped.
    pub fn collect(&self) {
        let mut count = 0;
        while let Some(object) = self.queue.next() {
            count += 1;
            if self.is_headless() {
                continue;
            }
            match object {
                queue::Object::Buffer(id) => self.backend.delete_buffer(id),
                queue::Object::VertexArray(id) => self.backend.delete_vertex_array(id),
                queue::Object::Texture(id) => self.backend.delete_texture(id),
                queue::Object::Framebuffer(id) => self.backend.delete_framebuffer(id),
                queue::Object::Program(id) => self.backend.delete_program(id),
            }
        }
        if count > 0 {
            debug!("collected {} GL objects", count);
        }
    }

    /// Resets the state plugins are allowed to change.
    ///
    /// Unbinds the program, vertex array and framebuffer, disables depth
    /// testing and face culling, and restores filled polygons.
    pub fn restore_default_state(&self) {
        if self.is_headless() {
            return;
        }
        self.backend.bind_framebuffer(0);
        self.backend.use_program(0);
        self.backend.bind_vertex_array(0);
        self.backend.active_texture(0);
        self.backend.bind_texture(gl::TEXTURE_2D, 0);
        self.backend.disable(gl::DEPTH_TEST);
        self.backend.disable(gl::CULL_FACE);
        self.backend.disable(gl::BLEND);
        self.backend.disable(gl::SCISSOR_TEST);
        self.backend.polygon_mode(gl::FRONT_AND_BACK, gl::FILL);
    }

    /// Clear the attachments of a framebuffer.
    pub fn clear(&self, framebuffer: &Framebuffer, op: ClearOp) {
        self.backend.bind_framebuffer(framebuffer.id());
        let mut ops = 0;
        match op.color {
            ClearColor::Yes { r, g, b, a } => {
                self.backend.clear_color(r, g, b, a);
                ops |= gl::COLOR_BUFFER_BIT;
            }
            ClearColor::No => {}
        }
        match op.depth {
            ClearDepth::Yes { z } => {
                self.backend.clear_depth(z);
                ops |= gl::DEPTH_BUFFER_BIT;
            }
            ClearDepth::No => {}
        }
        if ops != 0 {
            self.backend.clear(ops);
        }
    }

    /// Create a GPU buffer initialized with `data`.
    pub fn buffer<T: Copy>(&self, kind: buffer::Kind, data: &[T]) -> Buffer {
        let id = self.backend.gen_buffer();
        let size = mem::size_of_val(data);
        let target = kind.as_gl_enum();
        self.backend.bind_buffer(id, target);
        self.backend.buffer_data(target, size, data.as_ptr() as *const _, gl::STATIC_DRAW);
        self.backend.bind_buffer(0, target);
        Buffer::new(id, kind, size, self.queue.tx())
    }

    /// Binds vertex attributes and indices into a [`Mesh`].
    ///
    /// `attributes` pairs a shader location with the accessor feeding it.
    pub fn mesh(
        &self,
        attributes: &[(u8, Accessor)],
        indices: Option<Accessor>,
        draw_call: DrawCall,
    ) -> Mesh {
        let id = self.backend.gen_vertex_array();
        let mut bound: [Option<Accessor>; MAX_ATTRIBUTES] = Default::default();

        self.backend.bind_vertex_array(id);
        if let Some(ref accessor) = indices {
            self.backend.bind_buffer(accessor.buffer().id(), gl::ELEMENT_ARRAY_BUFFER);
        }
        for (location, accessor) in attributes {
            let Some(slot) = bound.get_mut(*location as usize) else {
                warn!("ignoring vertex attribute at location {}", location);
                continue;
            };
            self.backend.bind_buffer(accessor.buffer().id(), gl::ARRAY_BUFFER);
            self.backend.enable_vertex_attrib_array(*location);
            self.backend.vertex_attrib_pointer(
                *location,
                accessor.format().size() as _,
                accessor.format().gl_data_type(),
                accessor.format().norm(),
                accessor.stride() as _,
                accessor.offset(),
            );
            *slot = Some(accessor.clone());
        }
        self.backend.bind_vertex_array(0);
        self.backend.bind_buffer(0, gl::ARRAY_BUFFER);

        Mesh::new(id, bound, indices, draw_call, self.queue.tx())
    }

    fn shader(&self, stage: Stage, source: &str) -> Result<u32> {
        let source = ffi::CString::new(source).map_err(|_| Error::ShaderCompile {
            stage,
            log: "source contains a NUL byte".to_owned(),
        })?;
        let ty = match stage {
            Stage::Vertex => gl::VERTEX_SHADER,
            Stage::Fragment => gl::FRAGMENT_SHADER,
        };
        let id = self.backend.create_shader(ty);
        self.backend.shader_source(id, &source);
        if let Err(log) = self.backend.compile_shader(id) {
            self.backend.delete_shader(id);
            return Err(Error::ShaderCompile { stage, log });
        }
        Ok(id)
    }

    /// Compile and link a GLSL program from vertex and fragment sources.
    pub fn program(&self, vertex: &str, fragment: &str) -> Result<Program> {
        let vs = self.shader(Stage::Vertex, vertex)?;
        let fs = match self.shader(Stage::Fragment, fragment) {
            Ok(fs) => fs,
            Err(err) => {
                self.backend.delete_shader(vs);
                return Err(err);
            }
        };
        let id = self.backend.create_program();
        self.backend.attach_shader(id, vs);
        self.backend.attach_shader(id, fs);
        let linked = self.backend.link_program(id);
        // Attached shaders are freed together with the program.
        self.backend.delete_shader(vs);
        self.backend.delete_shader(fs);
        if let Err(log) = linked {
            self.backend.delete_program(id);
            return Err(Error::ProgramLink { log });
        }
        Ok(Program::new(id, self.queue.tx()))
    }

    /// Create a 2D texture backed by uninitialized GPU memory.
    pub fn texture2(&self, width: u32, height: u32, format: texture::Format, sampler: Sampler) -> Texture2 {
        let id = self.backend.gen_texture();
        let (transfer_format, transfer_type) = format.transfer_enums();
        self.backend.bind_texture(gl::TEXTURE_2D, id);
        self.backend.tex_image_2d(
            gl::TEXTURE_2D,
            format.as_gl_enum(),
            width,
            height,
            transfer_format,
            transfer_type,
            ptr::null(),
        );
        self.backend.bind_texture(gl::TEXTURE_2D, 0);
        Texture2::new(id, width, height, format, false, sampler, self.queue.tx())
    }

    /// Create an RGBA8 texture holding `pixels`.
    pub fn texture2_from_pixels(&self, pixels: &Pixels, sampler: Sampler, mipmap: bool) -> Texture2 {
        let id = self.backend.gen_texture();
        self.backend.bind_texture(gl::TEXTURE_2D, id);
        self.backend.pixel_store(gl::UNPACK_ALIGNMENT, 1);
        self.backend.tex_image_2d(
            gl::TEXTURE_2D,
            gl::RGBA8,
            pixels.width(),
            pixels.height(),
            gl::RGBA,
            gl::UNSIGNED_BYTE,
            pixels.data().as_ptr() as *const _,
        );
        if mipmap {
            self.backend.generate_mipmap(gl::TEXTURE_2D);
        }
        self.backend.bind_texture(gl::TEXTURE_2D, 0);
        Texture2::new(
            id,
            pixels.width(),
            pixels.height(),
            texture::Format::Rgba8,
            mipmap,
            sampler,
            self.queue.tx(),
        )
    }

    /// The window's implicit framebuffer.
    pub fn default_framebuffer(&self, width: u32, height: u32) -> Framebuffer {
        Framebuffer::implicit(width, height)
    }

    /// Create an off-screen render target.
    ///
    /// One texture is created per entry of `color_formats` (at most
    /// [`MAX_COLOR_ATTACHMENTS`]), plus a `Depth32F` texture if `depth` is set.
    pub fn framebuffer(
        &self,
        width: u32,
        height: u32,
        color_formats: &[texture::Format],
        depth: bool,
    ) -> Result<Framebuffer> {
        if color_formats.len() > MAX_COLOR_ATTACHMENTS {
            warn!(
                "framebuffer requested {} color attachments, using the first {}",
                color_formats.len(),
                MAX_COLOR_ATTACHMENTS,
            );
        }
        let id = self.backend.gen_framebuffer();
        self.backend.bind_framebuffer(id);

        let mut colors = ColorAttachments::new();
        let mut draw_buffers = Vec::with_capacity(MAX_COLOR_ATTACHMENTS);
        for (index, format) in color_formats.iter().take(MAX_COLOR_ATTACHMENTS).enumerate() {
            let texture = self.texture2(width, height, *format, Sampler::nearest_clamped());
            let attachment = gl::COLOR_ATTACHMENT0 + index as u32;
            self.backend.framebuffer_texture2d(attachment, texture.id());
            draw_buffers.push(attachment);
            colors.push(texture);
        }
        let depth = if depth {
            let texture = self.texture2(width, height, texture::Format::Depth32F, Sampler::nearest_clamped());
            self.backend.framebuffer_texture2d(gl::DEPTH_ATTACHMENT, texture.id());
            Some(texture)
        } else {
            None
        };
        if draw_buffers.is_empty() {
            self.backend.draw_buffers(&[gl::NONE]);
        } else {
            self.backend.draw_buffers(&draw_buffers);
        }

        let status = self.backend.check_framebuffer_status();
        self.backend.bind_framebuffer(0);
        let framebuffer = Framebuffer::new(id, width, height, colors, depth, self.queue.tx());
        if status != gl::FRAMEBUFFER_COMPLETE {
            return Err(Error::IncompleteFramebuffer(status));
        }
        Ok(framebuffer)
    }

    fn bind_texture_unit(&self, unit: u32, texture: &Texture2) {
        let sampler = texture.sampler();
        self.backend.active_texture(unit);
        self.backend.bind_texture(gl::TEXTURE_2D, texture.id());
        self.backend.tex_parameteri(
            gl::TEXTURE_2D,
            gl::TEXTURE_MAG_FILTER,
            sampler.mag_filter.as_gl_enum(false),
        );
        self.backend.tex_parameteri(
            gl::TEXTURE_2D,
            gl::TEXTURE_MIN_FILTER,
            sampler.min_filter.as_gl_enum(texture.mipmap()),
        );
        self.backend.tex_parameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_S, sampler.wrap_s.as_gl_enum());
        self.backend.tex_parameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_T, sampler.wrap_t.as_gl_enum());
    }

    fn uniform_location(&self, program: &Program, name: &str) -> Option<i32> {
        let cname = ffi::CString::new(name).ok()?;
        match self.backend.get_uniform_location(program.id(), &cname) {
            -1 => None,
            location => Some(location),
        }
    }

    /// Perform a draw call with the mesh's own draw call.
    pub fn draw(&self, framebuffer: &Framebuffer, state: &State, mesh: &Mesh, invocation: &Invocation) {
        self.draw_with(framebuffer, state, mesh, &mesh.draw_call(), invocation)
    }

    /// Perform a draw call.
    pub fn draw_with(
        &self,
        framebuffer: &Framebuffer,
        state: &State,
        mesh: &Mesh,
        draw_call: &DrawCall,
        invocation: &Invocation,
    ) {
        self.backend.bind_framebuffer(framebuffer.id());
        match state.viewport {
            Viewport::Max => {
                let (w, h) = framebuffer.dimensions();
                self.backend.viewport(0, 0, w, h)
            }
            Viewport::Subset { x, y, w, h } => {
                self.backend.viewport(x, y, w, h);
            }
        }
        if let Some(opt) = state.culling.as_gl_enum_if_enabled() {
            self.backend.enable(gl::CULL_FACE);
            self.backend.cull_face(opt);
            self.backend.front_face(state.front_face.as_gl_enum());
        } else {
            self.backend.disable(gl::CULL_FACE);
        }
        if let Some(func) = state.depth_test.as_gl_enum_if_enabled() {
            self.backend.enable(gl::DEPTH_TEST);
            self.backend.depth_func(func);
        } else {
            self.backend.disable(gl::DEPTH_TEST);
        }
        self.backend.polygon_mode(gl::FRONT_AND_BACK, state.polygon_mode.as_gl_enum());
        match state.polygon_mode {
            PolygonMode::Point(size) => self.backend.point_size(size),
            PolygonMode::Line(width) => self.backend.line_width(width),
            PolygonMode::Fill => {}
        }

        let program = invocation.program;
        self.backend.use_program(program.id());
        for (name, value) in invocation.uniforms {
            let Some(location) = self.uniform_location(program, name) else {
                continue;
            };
            match *value {
                Uniform::Int(v) => self.backend.uniform1i(location, v),
                Uniform::Float(v) => self.backend.uniform1f(location, v),
                Uniform::Vec3(v) => self.backend.uniform3f(location, v),
                Uniform::Vec4(v) => self.backend.uniform4f(location, v),
                Uniform::Mat4(ref v) => self.backend.uniform_matrix4f(location, v),
            }
        }
        if invocation.textures.len() > MAX_TEXTURES {
            warn!("only the first {} textures of an invocation are bound", MAX_TEXTURES);
        }
        for (unit, (name, texture)) in invocation.textures.iter().take(MAX_TEXTURES).enumerate() {
            self.bind_texture_unit(unit as u32, texture);
            if let Some(location) = self.uniform_location(program, name) {
                self.backend.uniform1i(location, unit as i32);
            }
        }

        self.backend.bind_vertex_array(mesh.id());
        let mode = draw_call.primitive.as_gl_enum();
        match draw_call.kind {
            Kind::Arrays => {
                self.backend.draw_arrays(mode, draw_call.offset, draw_call.count);
            }
            Kind::Elements => match mesh.indices() {
                Some(accessor) => {
                    let format = accessor.format();
                    let offset = accessor.offset()
                        + draw_call.offset * format.size() * index_size(format.gl_data_type());
                    self.backend.draw_elements(mode, offset, draw_call.count, format.gl_data_type());
                }
                None => warn!("indexed draw call on a mesh without indices"),
            },
        }
        self.backend.bind_vertex_array(0);
        self.backend.use_program(0);
    }

    fn bind_read_buffer(&self, framebuffer: &Framebuffer, attachment: usize) {
        self.backend.bind_framebuffer(framebuffer.id());
        if framebuffer.is_default() {
            self.backend.read_buffer(gl::BACK);
        } else {
            self.backend.read_buffer(gl::COLOR_ATTACHMENT0 + attachment as u32);
        }
        self.backend.pixel_store(gl::PACK_ALIGNMENT, 1);
    }

    /// Read back an RGBA8 region of a color attachment, bottom row first.
    ///
    /// `attachment` is ignored for the default framebuffer, which reads the
    /// back buffer.
    pub fn read_pixels(
        &self,
        framebuffer: &Framebuffer,
        attachment: usize,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    ) -> Result<Pixels> {
        let mut data = vec![0u8; width as usize * height as usize * 4];
        self.bind_read_buffer(framebuffer, attachment);
        self.backend.read_pixels(x, y, width, height, gl::RGBA, gl::UNSIGNED_BYTE, data.as_mut_ptr() as *mut _);
        self.backend.bind_framebuffer(0);
        Pixels::new(width, height, data)
    }

    /// Read the red channel of one texel as a float.
    ///
    /// `y` counts from the bottom of the framebuffer.
    pub fn read_value(&self, framebuffer: &Framebuffer, attachment: usize, x: i32, y: i32) -> f32 {
        let mut value = 0f32;
        self.bind_read_buffer(framebuffer, attachment);
        self.backend.read_pixels(x, y, 1, 1, gl::RED, gl::FLOAT, &mut value as *mut f32 as *mut _);
        self.backend.bind_framebuffer(0);
        value
    }
}

fn index_size(ty: u32) -> usize {
    match ty {
        gl::UNSIGNED_BYTE => 1,
        gl::UNSIGNED_SHORT => 2,
        _ => 4,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headless_factory_tolerates_state_resets() {
        let factory = Factory::headless();
        assert!(factory.is_headless());
        factory.restore_default_state();
        factory.collect();
        assert_eq!(factory.pending(), 0);
    }

    #[test]
    fn headless_collect_drains_dropped_handles() {
        let factory = Factory::headless();
        let buffer = Buffer::new(9, buffer::Kind::Array, 0, factory.queue.tx());
        drop(buffer);
        assert_eq!(factory.pending(), 1);
        factory.collect();
        assert_eq!(factory.pending(), 0);
    }
}

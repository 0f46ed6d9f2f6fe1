//! Raw OpenGL entry points.

#![allow(dead_code)]

use std::{ffi, os, ptr, rc};

// Import OpenGL bindings.
include!(concat!(env!("OUT_DIR"), "/gl_bindings.rs"));

/// Shared handle to the loaded OpenGL function table.
#[derive(Clone)]
pub struct Backend {
    gl: rc::Rc<Gl>,
}

impl Backend {
    /// Constructor.
    ///
    /// Entry points the loader cannot resolve are only reported when called.
    pub fn load<F>(mut func: F) -> Self
        where F: FnMut(&str) -> *const os::raw::c_void
    {
        let gl = rc::Rc::new(Gl::load_with(|sym| func(sym)));
        Backend { gl }
    }

    /// Returns `false` when the loader resolved no entry points, as with a
    /// headless factory.
    pub fn is_loaded(&self) -> bool {
        self.gl.Clear.is_loaded()
    }

    // Error checking

    /// Corresponds to `glGetError` plus an error check.
    pub fn check_error(&self) {
        let error = unsafe { self.gl.GetError() };
        if error != NO_ERROR {
            error!(target: "gl", "0x{:x}", error);
        }
    }

    // Pipeline state operations

    /// Corresponds to `glClear`.
    pub fn clear(&self, ops: u32) {
        trace!(target: "gl", "glClear{:?}", (ops,));
        unsafe {
            self.gl.Clear(ops);
        }
        self.check_error();
    }

    /// Corresponds to `glClearColor`.
    pub fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        trace!(target: "gl", "glClearColor{:?}", (r, g, b, a));
        unsafe {
            self.gl.ClearColor(r, g, b, a);
        }
        self.check_error();
    }

    /// Corresponds to `glClearDepth`.
    pub fn clear_depth(&self, z: f64) {
        trace!(target: "gl", "glClearDepth{:?}", (z,));
        unsafe {
            self.gl.ClearDepth(z);
        }
        self.check_error();
    }

    /// Corresponds to `glEnable`.
    pub fn enable(&self, state: u32) {
        trace!(target: "gl", "glEnable{:?}", (state,));
        unsafe {
            self.gl.Enable(state);
        }
        self.check_error();
    }

    /// Corresponds to `glDisable`.
    pub fn disable(&self, state: u32) {
        trace!(target: "gl", "glDisable{:?}", (state,));
        unsafe {
            self.gl.Disable(state);
        }
        self.check_error();
    }

    /// Corresponds to `glCullFace`.
    pub fn cull_face(&self, opt: u32) {
        trace!(target: "gl", "glCullFace{:?}", (opt,));
        unsafe {
            self.gl.CullFace(opt);
        }
        self.check_error();
    }

    /// Corresponds to `glFrontFace`.
    pub fn front_face(&self, opt: u32) {
        trace!(target: "gl", "glFrontFace{:?}", (opt,));
        unsafe {
            self.gl.FrontFace(opt);
        }
        self.check_error();
    }

    /// Corresponds to `glDepthFunc`.
    pub fn depth_func(&self, opt: u32) {
        trace!(target: "gl", "glDepthFunc{:?}", (opt,));
        unsafe {
            self.gl.DepthFunc(opt);
        }
        self.check_error();
    }

    /// Corresponds to `glPolygonMode`.
    pub fn polygon_mode(&self, face: u32, mode: u32) {
        trace!(target: "gl", "glPolygonMode{:?}", (face, mode));
        unsafe {
            self.gl.PolygonMode(face, mode);
        }
        self.check_error();
    }

    /// Corresponds to `glLineWidth`.
    pub fn line_width(&self, width: f32) {
        trace!(target: "gl", "glLineWidth{:?}", (width,));
        unsafe {
            self.gl.LineWidth(width);
        }
        self.check_error();
    }

    /// Corresponds to `glPointSize`.
    pub fn point_size(&self, size: f32) {
        trace!(target: "gl", "glPointSize{:?}", (size,));
        unsafe {
            self.gl.PointSize(size);
        }
        self.check_error();
    }

    /// Corresponds to `glViewport`.
    pub fn viewport(&self, x: u32, y: u32, w: u32, h: u32) {
        trace!(target: "gl", "glViewport{:?}", (x, y, w, h));
        unsafe {
            self.gl.Viewport(x as _, y as _, w as _, h as _);
        }
        self.check_error();
    }

    /// Corresponds to `glPixelStorei`.
    pub fn pixel_store(&self, param: u32, value: i32) {
        trace!(target: "gl", "glPixelStorei{:?}", (param, value));
        unsafe {
            self.gl.PixelStorei(param, value);
        }
        self.check_error();
    }

    // Buffer operations

    /// Corresponds to `glGenBuffers(1)`.
    pub fn gen_buffer(&self) -> u32 {
        let mut id: u32 = 0;
        unsafe {
            trace!(target: "gl", "glGenBuffers(1) ");
            self.gl.GenBuffers(1, &mut id as *mut _)
        };
        trace!(target: "gl", " => {}", id);
        self.check_error();
        id
    }

    /// Corresponds to `glDeleteBuffers(1)`.
    pub fn delete_buffer(&self, id: u32) {
        trace!(target: "gl", "glDeleteBuffers{:?}", (1, id));
        unsafe {
            self.gl.DeleteBuffers(1, &id as *const _);
        }
        self.check_error();
    }

    /// Corresponds to `glBindBuffer`.
    pub fn bind_buffer(&self, id: u32, ty: u32) {
        unsafe {
            trace!(target: "gl", "glBindBuffer{:?}", (ty, id));
            self.gl.BindBuffer(ty, id);
        }
        self.check_error();
    }

    /// Corresponds to `glBufferData`.
    pub fn buffer_data(&self, ty: u32, len: usize, ptr: *const os::raw::c_void, usage: u32) {
        unsafe {
            trace!(target: "gl", "glBufferData{:?}", (ty, len, ptr, usage));
            self.gl.BufferData(ty, len as _, ptr, usage);
        }
        self.check_error();
    }

    // Vertex array operations

    /// Corresponds to `glGenVertexArrays(1)`.
    pub fn gen_vertex_array(&self) -> u32 {
        let mut id: u32 = 0;
        unsafe {
            trace!(target: "gl", "glGenVertexArrays(1) ");
            self.gl.GenVertexArrays(1, &mut id as *mut _);
            trace!(target: "gl", "=> {}", id);
        }
        self.check_error();
        id
    }

    /// Corresponds to `glDeleteVertexArrays(1)`.
    pub fn delete_vertex_array(&self, id: u32) {
        trace!(target: "gl", "glDeleteVertexArrays{:?}", (1, id));
        unsafe {
            self.gl.DeleteVertexArrays(1, &id as *const _);
        }
        self.check_error();
    }

    /// Corresponds to `glBindVertexArray`.
    pub fn bind_vertex_array(&self, id: u32) {
        unsafe {
            trace!(target: "gl", "glBindVertexArray{:?}", (id,));
            self.gl.BindVertexArray(id);
        }
        self.check_error();
    }

    /// Corresponds to `glVertexAttribPointer`.
    pub fn vertex_attrib_pointer(&self, id: u8, sz: i32, ty: u32, norm: bool, stride: i32, off: usize) {
        unsafe {
            trace!(target: "gl", "glVertexAttribPointer{:?}", (id, sz, ty, norm, stride, off));
            self.gl.VertexAttribPointer(
                id as _,
                sz,
                ty,
                if norm { TRUE } else { FALSE },
                stride,
                off as *const _,
            );
        }
        self.check_error();
    }

    /// Corresponds to `glEnableVertexAttribArray`.
    pub fn enable_vertex_attrib_array(&self, idx: u8) {
        unsafe {
            trace!(target: "gl", "glEnableVertexAttribArray{:?}", (idx,));
            self.gl.EnableVertexAttribArray(idx as _);
        }
        self.check_error();
    }

    // Framebuffer operations.

    /// Corresponds to `glGenFramebuffers(1)`.
    pub fn gen_framebuffer(&self) -> u32 {
        trace!(target: "gl", "glGenFramebuffers(1)");
        let mut id = 0;
        unsafe {
            self.gl.GenFramebuffers(1, &mut id as *mut _);
        }
        self.check_error();
        id
    }

    /// Corresponds to `glDeleteFramebuffers(1)`.
    pub fn delete_framebuffer(&self, id: u32) {
        trace!(target: "gl", "glDeleteFramebuffers{:?}", (1, id));
        unsafe {
            self.gl.DeleteFramebuffers(1, &id as *const _);
        }
        self.check_error();
    }

    /// Corresponds to `glBindFramebuffer`.
    pub fn bind_framebuffer(&self, id: u32) {
        trace!(target: "gl", "glBindFramebuffer{:?} ", (FRAMEBUFFER, id));
        unsafe {
            self.gl.BindFramebuffer(FRAMEBUFFER, id);
        }
        self.check_error();
    }

    /// Corresponds to `glFramebufferTexture2D`.
    ///
    /// `attachment` is the full attachment point, e.g. `COLOR_ATTACHMENT0 + 1`
    /// or `DEPTH_ATTACHMENT`.
    pub fn framebuffer_texture2d(&self, attachment: u32, texture: u32) {
        trace!(
            target: "gl",
            "glFramebufferTexture2D{:?}",
            (FRAMEBUFFER, attachment, TEXTURE_2D, texture, 0),
        );
        unsafe {
            self.gl.FramebufferTexture2D(FRAMEBUFFER, attachment, TEXTURE_2D, texture, 0);
        }
        self.check_error();
    }

    /// Corresponds to `glCheckFramebufferStatus`.
    pub fn check_framebuffer_status(&self) -> u32 {
        let status = unsafe {
            trace!(target: "gl", "glCheckFramebufferStatus{:?} ", (FRAMEBUFFER,));
            self.gl.CheckFramebufferStatus(FRAMEBUFFER)
        };
        trace!(target: "gl", "=> 0x{:x}", status);
        self.check_error();
        status
    }

    /// Corresponds to `glDrawBuffers`.
    pub fn draw_buffers(&self, buffers: &[u32]) {
        trace!(target: "gl", "glDrawBuffers{:?}", (buffers.len(), buffers));
        unsafe {
            self.gl.DrawBuffers(buffers.len() as _, buffers.as_ptr());
        }
        self.check_error();
    }

    /// Corresponds to `glReadBuffer`.
    pub fn read_buffer(&self, mode: u32) {
        trace!(target: "gl", "glReadBuffer{:?}", (mode,));
        unsafe {
            self.gl.ReadBuffer(mode);
        }
        self.check_error();
    }

    /// Corresponds to `glReadPixels`.
    pub fn read_pixels(
        &self,
        x: i32,
        y: i32,
        w: u32,
        h: u32,
        format: u32,
        ty: u32,
        ptr: *mut os::raw::c_void,
    ) {
        trace!(target: "gl", "glReadPixels{:?}", (x, y, w, h, format, ty, ptr));
        unsafe {
            self.gl.ReadPixels(x, y, w as _, h as _, format, ty, ptr);
        }
        self.check_error();
    }

    // Program operations

    /// Corresponds to `glCreateShader`.
    pub fn create_shader(&self, ty: u32) -> u32 {
        let id = unsafe {
            trace!(target: "gl", "glCreateShader{:?} ", (ty,));
            self.gl.CreateShader(ty)
        };
        trace!(target: "gl", "=> {}", id);
        self.check_error();
        id
    }

    /// Corresponds to `glDeleteShader`.
    pub fn delete_shader(&self, id: u32) {
        trace!(target: "gl", "glDeleteShader{:?}", (id,));
        unsafe {
            self.gl.DeleteShader(id);
        }
        self.check_error();
    }

    /// Corresponds to `glShaderSource`.
    pub fn shader_source(&self, id: u32, source: &ffi::CStr) {
        unsafe {
            trace!(target: "gl", "glShaderSource{:?}", (id, source));
            let ptr = source.as_ptr();
            self.gl.ShaderSource(id, 1, &ptr as *const _, ptr::null());
        }
        self.check_error();
    }

    /// Corresponds to `glCompileShader`.
    ///
    /// Returns the info log on failure.
    pub fn compile_shader(&self, id: u32) -> Result<(), String> {
        let mut status = 0i32;
        unsafe {
            trace!(target: "gl", "glCompileShader{:?}", (id,));
            self.gl.CompileShader(id);
            self.check_error();
            self.gl.GetShaderiv(id, COMPILE_STATUS, &mut status as *mut _);
            self.check_error();
        }
        if status == 0 {
            Err(self.shader_info_log(id))
        } else {
            Ok(())
        }
    }

    /// Corresponds to `glGetShaderInfoLog`.
    pub fn shader_info_log(&self, id: u32) -> String {
        let mut len = 0i32;
        unsafe {
            self.gl.GetShaderiv(id, INFO_LOG_LENGTH, &mut len as *mut _);
        }
        let mut log = vec![0u8; len.max(1) as usize];
        let mut written = 0i32;
        unsafe {
            self.gl.GetShaderInfoLog(
                id,
                log.len() as _,
                &mut written as *mut _,
                log.as_mut_ptr() as *mut _,
            );
        }
        self.check_error();
        log.truncate(written.max(0) as usize);
        String::from_utf8_lossy(&log).into_owned()
    }

    /// Corresponds to `glCreateProgram`.
    pub fn create_program(&self) -> u32 {
        let id = unsafe {
            trace!(target: "gl", "glCreateProgram() ");
            self.gl.CreateProgram()
        };
        trace!(target: "gl", "=> {}", id);
        self.check_error();
        id
    }

    /// Corresponds to `glDeleteProgram`.
    pub fn delete_program(&self, id: u32) {
        trace!(target: "gl", "glDeleteProgram{:?}", (id,));
        unsafe {
            self.gl.DeleteProgram(id);
        }
        self.check_error();
    }

    /// Corresponds to `glAttachShader`.
    pub fn attach_shader(&self, program: u32, shader: u32) {
        unsafe {
            trace!(target: "gl", "glAttachShader{:?}", (program, shader));
            self.gl.AttachShader(program, shader);
        }
        self.check_error();
    }

    /// Corresponds to `glLinkProgram`.
    ///
    /// Returns the info log on failure.
    pub fn link_program(&self, id: u32) -> Result<(), String> {
        let mut status = 0i32;
        unsafe {
            trace!(target: "gl", "glLinkProgram{:?}", (id,));
            self.gl.LinkProgram(id);
            self.check_error();
            trace!(target: "gl", "glGetProgramiv{:?} ", (id, LINK_STATUS));
            self.gl.GetProgramiv(id, LINK_STATUS, &mut status as *mut _);
            trace!(target: "gl", "=> {}", status);
            self.check_error();
        }
        if status == 0 {
            Err(self.program_info_log(id))
        } else {
            Ok(())
        }
    }

    /// Corresponds to `glGetProgramInfoLog`.
    pub fn program_info_log(&self, id: u32) -> String {
        let mut len = 0i32;
        unsafe {
            self.gl.GetProgramiv(id, INFO_LOG_LENGTH, &mut len as *mut _);
        }
        let mut log = vec![0u8; len.max(1) as usize];
        let mut written = 0i32;
        unsafe {
            self.gl.GetProgramInfoLog(
                id,
                log.len() as _,
                &mut written as *mut _,
                log.as_mut_ptr() as *mut _,
            );
        }
        self.check_error();
        log.truncate(written.max(0) as usize);
        String::from_utf8_lossy(&log).into_owned()
    }

    /// Corresponds to `glUseProgram`.
    pub fn use_program(&self, id: u32) {
        unsafe {
            trace!(target: "gl", "glUseProgram{:?}", (id,));
            self.gl.UseProgram(id);
        }
        self.check_error();
    }

    /// Corresponds to `glGetUniformLocation`.
    pub fn get_uniform_location(&self, id: u32, name: &ffi::CStr) -> i32 {
        let index;
        unsafe {
            trace!(target: "gl", "glGetUniformLocation{:?} ", (id, name));
            index = self.gl.GetUniformLocation(id, name.as_ptr());
            trace!(target: "gl", "=> {}", index);
        }
        self.check_error();
        index
    }

    /// Corresponds to `glUniform1i`.
    pub fn uniform1i(&self, location: i32, value: i32) {
        trace!(target: "gl", "glUniform1i{:?}", (location, value));
        unsafe {
            self.gl.Uniform1i(location, value);
        }
        self.check_error();
    }

    /// Corresponds to `glUniform1f`.
    pub fn uniform1f(&self, location: i32, value: f32) {
        trace!(target: "gl", "glUniform1f{:?}", (location, value));
        unsafe {
            self.gl.Uniform1f(location, value);
        }
        self.check_error();
    }

    /// Corresponds to `glUniform3fv(1)`.
    pub fn uniform3f(&self, location: i32, value: [f32; 3]) {
        trace!(target: "gl", "glUniform3fv{:?}", (location, value));
        unsafe {
            self.gl.Uniform3fv(location, 1, value.as_ptr());
        }
        self.check_error();
    }

    /// Corresponds to `glUniform4fv(1)`.
    pub fn uniform4f(&self, location: i32, value: [f32; 4]) {
        trace!(target: "gl", "glUniform4fv{:?}", (location, value));
        unsafe {
            self.gl.Uniform4fv(location, 1, value.as_ptr());
        }
        self.check_error();
    }

    /// Corresponds to `glUniformMatrix4fv(1, GL_FALSE)`.
    pub fn uniform_matrix4f(&self, location: i32, value: &[f32; 16]) {
        trace!(target: "gl", "glUniformMatrix4fv{:?}", (location, value));
        unsafe {
            self.gl.UniformMatrix4fv(location, 1, FALSE, value.as_ptr());
        }
        self.check_error();
    }

    // Texture operations

    /// Corresponds to `glGenTextures(1)`.
    pub fn gen_texture(&self) -> u32 {
        let mut id = 0;
        unsafe {
            trace!(target: "gl", "glGenTextures(1) ");
            self.gl.GenTextures(1, &mut id as *mut _);
            trace!(target: "gl", "=> {}", id);
        }
        self.check_error();
        id
    }

    /// Corresponds to `glDeleteTextures(1)`.
    pub fn delete_texture(&self, id: u32) {
        trace!(target: "gl", "glDeleteTextures{:?}", (1, id));
        unsafe {
            self.gl.DeleteTextures(1, &id as *const _);
        }
        self.check_error();
    }

    /// Corresponds to `glBindTexture`.
    pub fn bind_texture(&self, ty: u32, id: u32) {
        unsafe {
            trace!(target: "gl", "glBindTexture{:?}", (ty, id));
            self.gl.BindTexture(ty, id);
        }
        self.check_error();
    }

    /// Corresponds to `glActiveTexture(GL_TEXTURE0 + index)`.
    pub fn active_texture(&self, index: u32) {
        unsafe {
            trace!(target: "gl", "glActiveTexture{:?}", (index,));
            self.gl.ActiveTexture(TEXTURE0 + index);
        }
        self.check_error();
    }

    /// Corresponds to `glTexParameteri`.
    pub fn tex_parameteri(&self, ty: u32, param: u32, value: u32) {
        unsafe {
            trace!(target: "gl", "glTexParameteri{:?}", (ty, param, value));
            self.gl.TexParameteri(ty, param, value as i32);
        }
        self.check_error();
    }

    /// Corresponds to `glTexImage2D`.
    pub fn tex_image_2d(
        &self,
        target: u32,
        internal_format: u32,
        width: u32,
        height: u32,
        format: u32,
        ty: u32,
        data: *const os::raw::c_void,
    ) {
        unsafe {
            trace!(target: "gl",
                "glTexImage2D{:?}",
                (target, 0, internal_format, width, height, 0, format, ty, data),
            );
            self.gl.TexImage2D(
                target,
                0,
                internal_format as _,
                width as _,
                height as _,
                0,
                format,
                ty,
                data,
            );
        }
        self.check_error();
    }

    /// Corresponds to `glGenerateMipmap`.
    pub fn generate_mipmap(&self, target: u32) {
        unsafe {
            trace!(target: "gl", "glGenerateMipmap{:?}", (target,));
            self.gl.GenerateMipmap(target);
        }
        self.check_error();
    }

    // Draw call operations

    /// Corresponds to `glDrawArrays`.
    pub fn draw_arrays(&self, mode: u32, offset: usize, count: usize) {
        unsafe {
            trace!(target: "gl", "glDrawArrays{:?}", (mode, offset, count));
            self.gl.DrawArrays(mode, offset as _, count as _);
        }
        self.check_error();
    }

    /// Corresponds to `glDrawElements`.
    pub fn draw_elements(&self, mode: u32, offset: usize, count: usize, ty: u32) {
        unsafe {
            trace!(target: "gl", "glDrawElements{:?}", (mode, count, ty, offset));
            self.gl.DrawElements(mode, count as _, ty, offset as *const _);
        }
        self.check_error();
    }
}

//! The subset of the OpenGL API used by the mesh and shader wrappers.
//!
//! [`GLMesh`](super::gl_mesh::GLMesh) and [`Shader`](super::shader::Shader)
//! never call into the `gl` crate directly, they go through a
//! [`GLBackend`]. [`NativeGL`] forwards every call to the loaded
//! driver functions, so a current context must exist (see
//! `gl::load_with()`) before any of them are used.

use std::convert::TryInto;
use std::ffi::CStr;

use gl::types::{GLenum, GLint, GLsizei, GLuint};

use crate::glm;

#[cfg(test)]
pub mod recording;

pub trait GLBackend {
    fn gen_vertex_array(&self) -> GLuint;
    fn gen_buffer(&self) -> GLuint;
    fn bind_vertex_array(&self, vao: GLuint);
    fn bind_buffer(&self, target: GLenum, buffer: GLuint);
    fn buffer_data_f32(&self, target: GLenum, data: &[f32], usage: GLenum);
    fn buffer_data_u32(&self, target: GLenum, data: &[u32], usage: GLenum);
    fn vertex_attrib_pointer(
        &self,
        index: GLuint,
        size: GLint,
        data_type: GLenum,
        normalized: bool,
        stride: GLsizei,
        offset: usize,
    );
    fn enable_vertex_attrib_array(&self, index: GLuint);
    fn draw_elements(&self, mode: GLenum, count: GLsizei, index_type: GLenum, offset: usize);
    fn delete_buffer(&self, buffer: GLuint);
    fn delete_vertex_array(&self, vao: GLuint);

    fn create_program(&self) -> GLuint;
    fn create_shader(&self, kind: GLenum) -> GLuint;
    fn shader_source(&self, shader: GLuint, source: &CStr);
    fn compile_shader(&self, shader: GLuint);
    fn get_shader_iv(&self, shader: GLuint, pname: GLenum) -> GLint;
    fn get_shader_info_log(&self, shader: GLuint) -> String;
    fn attach_shader(&self, program: GLuint, shader: GLuint);
    fn detach_shader(&self, program: GLuint, shader: GLuint);
    fn delete_shader(&self, shader: GLuint);
    fn link_program(&self, program: GLuint);
    fn validate_program(&self, program: GLuint);
    fn get_program_iv(&self, program: GLuint, pname: GLenum) -> GLint;
    fn get_program_info_log(&self, program: GLuint) -> String;
    fn get_uniform_location(&self, program: GLuint, name: &CStr) -> GLint;
    fn uniform_matrix4fv(&self, location: GLint, value: &glm::Mat4);
    fn use_program(&self, program: GLuint);
    fn delete_program(&self, program: GLuint);
}

/// Forwards to the driver through the `gl` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeGL;

/// Trims the info log at the length reported by the driver.
fn info_log_to_string(log: &[u8], length: GLsizei) -> String {
    let length: usize = length.max(0).try_into().unwrap_or(0);
    String::from_utf8_lossy(&log[..length.min(log.len())]).to_string()
}

impl GLBackend for NativeGL {
    fn gen_vertex_array(&self) -> GLuint {
        let mut vao: GLuint = 0;
        unsafe {
            gl::GenVertexArrays(1, &mut vao);
        }
        vao
    }

    fn gen_buffer(&self) -> GLuint {
        let mut buffer: GLuint = 0;
        unsafe {
            gl::GenBuffers(1, &mut buffer);
        }
        buffer
    }

    fn bind_vertex_array(&self, vao: GLuint) {
        unsafe {
            gl::BindVertexArray(vao);
        }
    }

    fn bind_buffer(&self, target: GLenum, buffer: GLuint) {
        unsafe {
            gl::BindBuffer(target, buffer);
        }
    }

    fn buffer_data_f32(&self, target: GLenum, data: &[f32], usage: GLenum) {
        unsafe {
            gl::BufferData(
                target,
                std::mem::size_of_val(data) as gl::types::GLsizeiptr,
                data.as_ptr() as *const gl::types::GLvoid,
                usage,
            );
        }
    }

    fn buffer_data_u32(&self, target: GLenum, data: &[u32], usage: GLenum) {
        unsafe {
            gl::BufferData(
                target,
                std::mem::size_of_val(data) as gl::types::GLsizeiptr,
                data.as_ptr() as *const gl::types::GLvoid,
                usage,
            );
        }
    }

    fn vertex_attrib_pointer(
        &self,
        index: GLuint,
        size: GLint,
        data_type: GLenum,
        normalized: bool,
        stride: GLsizei,
        offset: usize,
    ) {
        let normalized = if normalized { gl::TRUE } else { gl::FALSE };
        unsafe {
            gl::VertexAttribPointer(
                index,
                size,
                data_type,
                normalized,
                stride,
                offset as *const gl::types::GLvoid,
            );
        }
    }

    fn enable_vertex_attrib_array(&self, index: GLuint) {
        unsafe {
            gl::EnableVertexAttribArray(index);
        }
    }

    fn draw_elements(&self, mode: GLenum, count: GLsizei, index_type: GLenum, offset: usize) {
        unsafe {
            gl::DrawElements(mode, count, index_type, offset as *const gl::types::GLvoid);
        }
    }

    fn delete_buffer(&self, buffer: GLuint) {
        unsafe {
            gl::DeleteBuffers(1, &buffer);
        }
    }

    fn delete_vertex_array(&self, vao: GLuint) {
        unsafe {
            gl::DeleteVertexArrays(1, &vao);
        }
    }

    fn create_program(&self) -> GLuint {
        unsafe { gl::CreateProgram() }
    }

    fn create_shader(&self, kind: GLenum) -> GLuint {
        unsafe { gl::CreateShader(kind) }
    }

    fn shader_source(&self, shader: GLuint, source: &CStr) {
        unsafe {
            gl::ShaderSource(shader, 1, &source.as_ptr(), std::ptr::null());
        }
    }

    fn compile_shader(&self, shader: GLuint) {
        unsafe {
            gl::CompileShader(shader);
        }
    }

    fn get_shader_iv(&self, shader: GLuint, pname: GLenum) -> GLint {
        let mut value: GLint = 0;
        unsafe {
            gl::GetShaderiv(shader, pname, &mut value);
        }
        value
    }

    fn get_shader_info_log(&self, shader: GLuint) -> String {
        let max_length = self.get_shader_iv(shader, gl::INFO_LOG_LENGTH);
        let mut log: Vec<u8> = vec![0; max_length.max(0).try_into().unwrap_or(0)];
        let mut length: GLsizei = 0;
        unsafe {
            gl::GetShaderInfoLog(
                shader,
                max_length,
                &mut length,
                log.as_mut_ptr() as *mut gl::types::GLchar,
            );
        }
        info_log_to_string(&log, length)
    }

    fn attach_shader(&self, program: GLuint, shader: GLuint) {
        unsafe {
            gl::AttachShader(program, shader);
        }
    }

    fn detach_shader(&self, program: GLuint, shader: GLuint) {
        unsafe {
            gl::DetachShader(program, shader);
        }
    }

    fn delete_shader(&self, shader: GLuint) {
        unsafe {
            gl::DeleteShader(shader);
        }
    }

    fn link_program(&self, program: GLuint) {
        unsafe {
            gl::LinkProgram(program);
        }
    }

    fn validate_program(&self, program: GLuint) {
        unsafe {
            gl::ValidateProgram(program);
        }
    }

    fn get_program_iv(&self, program: GLuint, pname: GLenum) -> GLint {
        let mut value: GLint = 0;
        unsafe {
            gl::GetProgramiv(program, pname, &mut value);
        }
        value
    }

    fn get_program_info_log(&self, program: GLuint) -> String {
        let max_length = self.get_program_iv(program, gl::INFO_LOG_LENGTH);
        let mut log: Vec<u8> = vec![0; max_length.max(0).try_into().unwrap_or(0)];
        let mut length: GLsizei = 0;
        unsafe {
            gl::GetProgramInfoLog(
                program,
                max_length,
                &mut length,
                log.as_mut_ptr() as *mut gl::types::GLchar,
            );
        }
        info_log_to_string(&log, length)
    }

    fn get_uniform_location(&self, program: GLuint, name: &CStr) -> GLint {
        unsafe { gl::GetUniformLocation(program, name.as_ptr()) }
    }

    fn uniform_matrix4fv(&self, location: GLint, value: &glm::Mat4) {
        unsafe {
            gl::UniformMatrix4fv(location, 1, gl::FALSE, value.as_ptr());
        }
    }

    fn use_program(&self, program: GLuint) {
        unsafe {
            gl::UseProgram(program);
        }
    }

    fn delete_program(&self, program: GLuint) {
        unsafe {
            gl::DeleteProgram(program);
        }
    }
}

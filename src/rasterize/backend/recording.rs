//! A [`GLBackend`] that records every state changing call instead of
//! talking to a driver. It carries a tiny fake compiler so that the
//! shader build pipeline can be exercised without a context.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::ffi::CStr;
use std::rc::Rc;

use gl::types::{GLenum, GLint, GLsizei, GLuint};

use super::GLBackend;
use crate::glm;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    GenVertexArray(GLuint),
    GenBuffer(GLuint),
    BindVertexArray(GLuint),
    BindBuffer(GLenum, GLuint),
    BufferDataF32(GLenum, Vec<f32>, GLenum),
    BufferDataU32(GLenum, Vec<u32>, GLenum),
    VertexAttribPointer {
        index: GLuint,
        size: GLint,
        data_type: GLenum,
        normalized: bool,
        stride: GLsizei,
        offset: usize,
    },
    EnableVertexAttribArray(GLuint),
    DrawElements {
        mode: GLenum,
        count: GLsizei,
        index_type: GLenum,
        offset: usize,
    },
    DeleteBuffer(GLuint),
    DeleteVertexArray(GLuint),
    CreateProgram(GLuint),
    CreateShader(GLenum, GLuint),
    CompileShader(GLuint),
    AttachShader(GLuint, GLuint),
    DetachShader(GLuint, GLuint),
    DeleteShader(GLuint),
    LinkProgram(GLuint),
    ValidateProgram(GLuint),
    GetUniformLocation(GLuint, String),
    UniformMatrix4fv(GLint, [f32; 16]),
    UseProgram(GLuint),
    DeleteProgram(GLuint),
}

#[derive(Debug, Default)]
pub struct RecordingState {
    pub calls: Vec<Call>,
    /// Objects that were generated/created and not yet deleted.
    pub live: HashSet<GLuint>,

    pub fail_vertex_array: bool,
    pub fail_buffer: bool,
    pub fail_program: bool,
    pub fail_shader: bool,
    pub fail_fragment_shader: bool,
    pub fail_link: bool,
    pub fail_validate: bool,

    next_handle: GLuint,
    shader_kinds: HashMap<GLuint, GLenum>,
    shader_sources: HashMap<GLuint, String>,
    compiled: HashMap<GLuint, bool>,
    attached: HashMap<GLuint, Vec<GLuint>>,
    linked: HashMap<GLuint, bool>,
    validated: HashMap<GLuint, bool>,
    uniforms: HashMap<GLuint, Vec<String>>,
}

impl RecordingState {
    fn new_handle(&mut self) -> GLuint {
        self.next_handle += 1;
        self.live.insert(self.next_handle);
        self.next_handle
    }

    fn release(&mut self, handle: GLuint) {
        self.live.remove(&handle);
    }
}

/// Cheap to clone, every clone shares the same recording.
#[derive(Debug, Default, Clone)]
pub struct RecordingGL {
    state: Rc<RefCell<RecordingState>>,
}

impl RecordingGL {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state<R>(&self, f: impl FnOnce(&mut RecordingState) -> R) -> R {
        f(&mut *self.state.borrow_mut())
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.state.borrow().calls.iter().filter(|call| pred(*call)).count()
    }

    pub fn live_objects(&self) -> usize {
        self.state.borrow().live.len()
    }

    fn record(&self, call: Call) {
        self.state.borrow_mut().calls.push(call);
    }
}

/// Accepts anything that has a `#version` line, a `main` and balanced
/// braces/parentheses.
fn fake_compile(source: &str) -> Result<(), String> {
    if source.trim().is_empty() {
        return Err("0:1(1): error: syntax error, unexpected end of file".to_string());
    }
    if !source.contains("#version") {
        return Err("0:1(1): error: missing #version directive".to_string());
    }
    if !source.contains("void main") {
        return Err("0:0(0): error: no function main() defined".to_string());
    }
    let balance = |open: char, close: char| {
        source.chars().filter(|c| *c == open).count()
            == source.chars().filter(|c| *c == close).count()
    };
    if !balance('{', '}') || !balance('(', ')') {
        return Err("0:1(1): error: syntax error, unexpected end of file".to_string());
    }
    Ok(())
}

/// Names of `uniform <type> <name>;` declarations in declaration order.
fn declared_uniforms(source: &str) -> Vec<String> {
    source
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with("uniform "))
        .filter_map(|line| line.trim_end_matches(';').split_whitespace().nth(2))
        .map(str::to_string)
        .collect()
}

impl GLBackend for RecordingGL {
    fn gen_vertex_array(&self) -> GLuint {
        let mut state = self.state.borrow_mut();
        let vao = if state.fail_vertex_array {
            0
        } else {
            state.new_handle()
        };
        state.calls.push(Call::GenVertexArray(vao));
        vao
    }

    fn gen_buffer(&self) -> GLuint {
        let mut state = self.state.borrow_mut();
        let buffer = if state.fail_buffer {
            0
        } else {
            state.new_handle()
        };
        state.calls.push(Call::GenBuffer(buffer));
        buffer
    }

    fn bind_vertex_array(&self, vao: GLuint) {
        self.record(Call::BindVertexArray(vao));
    }

    fn bind_buffer(&self, target: GLenum, buffer: GLuint) {
        self.record(Call::BindBuffer(target, buffer));
    }

    fn buffer_data_f32(&self, target: GLenum, data: &[f32], usage: GLenum) {
        self.record(Call::BufferDataF32(target, data.to_vec(), usage));
    }

    fn buffer_data_u32(&self, target: GLenum, data: &[u32], usage: GLenum) {
        self.record(Call::BufferDataU32(target, data.to_vec(), usage));
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
        self.record(Call::VertexAttribPointer {
            index,
            size,
            data_type,
            normalized,
            stride,
            offset,
        });
    }

    fn enable_vertex_attrib_array(&self, index: GLuint) {
        self.record(Call::EnableVertexAttribArray(index));
    }

    fn draw_elements(&self, mode: GLenum, count: GLsizei, index_type: GLenum, offset: usize) {
        self.record(Call::DrawElements {
            mode,
            count,
            index_type,
            offset,
        });
    }

    fn delete_buffer(&self, buffer: GLuint) {
        let mut state = self.state.borrow_mut();
        state.release(buffer);
        state.calls.push(Call::DeleteBuffer(buffer));
    }

    fn delete_vertex_array(&self, vao: GLuint) {
        let mut state = self.state.borrow_mut();
        state.release(vao);
        state.calls.push(Call::DeleteVertexArray(vao));
    }

    fn create_program(&self) -> GLuint {
        let mut state = self.state.borrow_mut();
        let program = if state.fail_program {
            0
        } else {
            state.new_handle()
        };
        state.calls.push(Call::CreateProgram(program));
        program
    }

    fn create_shader(&self, kind: GLenum) -> GLuint {
        let mut state = self.state.borrow_mut();
        let shader = if state.fail_shader
            || (kind == gl::FRAGMENT_SHADER && state.fail_fragment_shader)
        {
            0
        } else {
            let shader = state.new_handle();
            state.shader_kinds.insert(shader, kind);
            shader
        };
        state.calls.push(Call::CreateShader(kind, shader));
        shader
    }

    fn shader_source(&self, shader: GLuint, source: &CStr) {
        self.state
            .borrow_mut()
            .shader_sources
            .insert(shader, source.to_string_lossy().to_string());
    }

    fn compile_shader(&self, shader: GLuint) {
        let mut state = self.state.borrow_mut();
        let source = state.shader_sources.get(&shader).cloned().unwrap_or_default();
        let compiled = fake_compile(&source).is_ok();
        state.compiled.insert(shader, compiled);
        state.calls.push(Call::CompileShader(shader));
    }

    fn get_shader_iv(&self, shader: GLuint, pname: GLenum) -> GLint {
        let state = self.state.borrow();
        match pname {
            gl::COMPILE_STATUS => {
                let compiled = state.compiled.get(&shader).copied().unwrap_or(false);
                if compiled {
                    gl::TRUE.into()
                } else {
                    gl::FALSE.into()
                }
            }
            _ => 0,
        }
    }

    fn get_shader_info_log(&self, shader: GLuint) -> String {
        let state = self.state.borrow();
        let source = state.shader_sources.get(&shader).cloned().unwrap_or_default();
        fake_compile(&source).err().unwrap_or_default()
    }

    fn attach_shader(&self, program: GLuint, shader: GLuint) {
        let mut state = self.state.borrow_mut();
        state.attached.entry(program).or_default().push(shader);
        state.calls.push(Call::AttachShader(program, shader));
    }

    fn detach_shader(&self, program: GLuint, shader: GLuint) {
        let mut state = self.state.borrow_mut();
        if let Some(attached) = state.attached.get_mut(&program) {
            attached.retain(|s| *s != shader);
        }
        state.calls.push(Call::DetachShader(program, shader));
    }

    fn delete_shader(&self, shader: GLuint) {
        let mut state = self.state.borrow_mut();
        state.release(shader);
        state.calls.push(Call::DeleteShader(shader));
    }

    fn link_program(&self, program: GLuint) {
        let mut state = self.state.borrow_mut();
        let attached = state.attached.get(&program).cloned().unwrap_or_default();
        let has_stage = |kind: GLenum| {
            attached.iter().any(|shader| {
                state.shader_kinds.get(shader) == Some(&kind)
                    && state.compiled.get(shader).copied().unwrap_or(false)
            })
        };
        let linked =
            !state.fail_link && has_stage(gl::VERTEX_SHADER) && has_stage(gl::FRAGMENT_SHADER);
        let uniforms = attached
            .iter()
            .filter_map(|shader| state.shader_sources.get(shader))
            .flat_map(|source| declared_uniforms(source))
            .collect();
        state.linked.insert(program, linked);
        state.uniforms.insert(program, uniforms);
        state.calls.push(Call::LinkProgram(program));
    }

    fn validate_program(&self, program: GLuint) {
        let mut state = self.state.borrow_mut();
        let validated = !state.fail_validate;
        state.validated.insert(program, validated);
        state.calls.push(Call::ValidateProgram(program));
    }

    fn get_program_iv(&self, program: GLuint, pname: GLenum) -> GLint {
        let state = self.state.borrow();
        let flag = match pname {
            gl::LINK_STATUS => state.linked.get(&program).copied().unwrap_or(false),
            gl::VALIDATE_STATUS => state.validated.get(&program).copied().unwrap_or(false),
            _ => return 0,
        };
        if flag {
            gl::TRUE.into()
        } else {
            gl::FALSE.into()
        }
    }

    fn get_program_info_log(&self, program: GLuint) -> String {
        let state = self.state.borrow();
        if !state.linked.get(&program).copied().unwrap_or(false) {
            "error: linking with uncompiled/unspecialized shader".to_string()
        } else if !state.validated.get(&program).copied().unwrap_or(true) {
            "error: program validation failed".to_string()
        } else {
            String::new()
        }
    }

    fn get_uniform_location(&self, program: GLuint, name: &CStr) -> GLint {
        let mut state = self.state.borrow_mut();
        let name = name.to_string_lossy().to_string();
        let location = state
            .uniforms
            .get(&program)
            .and_then(|uniforms| uniforms.iter().position(|u| *u == name))
            .map(|pos| pos as GLint)
            .unwrap_or(-1);
        state.calls.push(Call::GetUniformLocation(program, name));
        location
    }

    fn uniform_matrix4fv(&self, location: GLint, value: &glm::Mat4) {
        let mut data = [0.0; 16];
        data.copy_from_slice(value.as_slice());
        self.record(Call::UniformMatrix4fv(location, data));
    }

    fn use_program(&self, program: GLuint) {
        self.record(Call::UseProgram(program));
    }

    fn delete_program(&self, program: GLuint) {
        let mut state = self.state.borrow_mut();
        state.release(program);
        state.calls.push(Call::DeleteProgram(program));
    }
}

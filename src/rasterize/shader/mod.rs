use std::ffi::CString;
use std::fs::File;
use std::io::prelude::*;
use std::path::Path;

use gl::types::{GLenum, GLint, GLuint};
use thiserror::Error;

use super::backend::{GLBackend, NativeGL};
use super::Rasterize;
use crate::glm;

pub mod builtins;

/// Location returned by the driver for a uniform that is not active
/// in the program.
pub const UNIFORM_NOT_FOUND: GLint = -1;

const MODEL_UNIFORM: &str = "model";
const PROJECTION_UNIFORM: &str = "projection";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    fn gl_kind(self) -> GLenum {
        match self {
            ShaderStage::Vertex => gl::VERTEX_SHADER,
            ShaderStage::Fragment => gl::FRAGMENT_SHADER,
        }
    }

    fn compile_error(self, log: String) -> ShaderError {
        match self {
            ShaderStage::Vertex => ShaderError::VertexCompile(log),
            ShaderStage::Fragment => ShaderError::FragmentCompile(log),
        }
    }
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShaderStage::Vertex => write!(f, "vertex"),
            ShaderStage::Fragment => write!(f, "fragment"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ShaderError {
    #[error("shader program couldn't be created")]
    ProgramAllocation,
    #[error("{0} shader object couldn't be created")]
    ShaderAllocation(ShaderStage),
    #[error("vertex shader compile error with log: {0}")]
    VertexCompile(String),
    #[error("fragment shader compile error with log: {0}")]
    FragmentCompile(String),
    #[error("program link error with log: {0}")]
    Link(String),
    #[error("program validation error with log: {0}")]
    Validate(String),
}

/// A linked vertex + fragment shader program along with the cached
/// locations of its `model` and `projection` uniforms.
///
/// An instance that was never built, failed to build or was released
/// has program id 0; [`Shader::use_shader()`] then unbinds any program.
pub struct Shader<B: GLBackend = NativeGL> {
    gl: B,
    program_id: GLuint,
    uniform_model: GLint,
    uniform_projection: GLint,
}

/// Reads the entire file, every line terminated by `\n`.
///
/// A file that cannot be read is logged and results in an empty
/// string, the build then fails when compiling that stage.
pub fn read_file(path: &Path) -> String {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(err) => {
            tracing::error!("failed to read {}! file doesn't exist: {}", path.display(), err);
            return String::new();
        }
    };

    let mut content = String::new();
    if let Err(err) = file.read_to_string(&mut content) {
        tracing::error!("failed to read {}: {}", path.display(), err);
        return String::new();
    }

    content.lines().fold(String::new(), |mut acc, line| {
        acc.push_str(line);
        acc.push('\n');
        acc
    })
}

impl<B: GLBackend> Shader<B> {
    pub fn new(gl: B) -> Self {
        Self {
            gl,
            program_id: 0,
            uniform_model: 0,
            uniform_projection: 0,
        }
    }

    /// Shorthand for [`Shader::new()`] followed by
    /// [`Shader::create_from_source()`].
    pub fn from_strings(
        gl: B,
        vertex_code: &str,
        fragment_code: &str,
    ) -> Result<Self, ShaderError> {
        let mut shader = Self::new(gl);
        shader.create_from_source(vertex_code, fragment_code)?;
        Ok(shader)
    }

    /// Shorthand for [`Shader::new()`] followed by
    /// [`Shader::create_from_files()`].
    pub fn from_files(
        gl: B,
        vertex_shader_path: &Path,
        fragment_shader_path: &Path,
    ) -> Result<Self, ShaderError> {
        let mut shader = Self::new(gl);
        shader.create_from_files(vertex_shader_path, fragment_shader_path)?;
        Ok(shader)
    }

    pub fn create_from_source(
        &mut self,
        vertex_code: &str,
        fragment_code: &str,
    ) -> Result<(), ShaderError> {
        self.build(vertex_code, fragment_code)
    }

    pub fn create_from_files(
        &mut self,
        vertex_shader_path: &Path,
        fragment_shader_path: &Path,
    ) -> Result<(), ShaderError> {
        let vertex_code = read_file(vertex_shader_path);
        let fragment_code = read_file(fragment_shader_path);
        self.build(&vertex_code, &fragment_code)
    }

    fn build(&mut self, vertex_code: &str, fragment_code: &str) -> Result<(), ShaderError> {
        if self.program_id != 0 {
            tracing::debug!(program = self.program_id, "rebuilding shader, releasing previous program");
            self.release();
        }

        let program = self.gl.create_program();
        if program == 0 {
            tracing::error!("error creating shader program");
            return Err(ShaderError::ProgramAllocation);
        }

        match self.link(program, vertex_code, fragment_code) {
            Ok(()) => {
                self.program_id = program;
                self.uniform_model = self.uniform_location(MODEL_UNIFORM);
                self.uniform_projection = self.uniform_location(PROJECTION_UNIFORM);
                tracing::debug!(
                    program,
                    model = self.uniform_model,
                    projection = self.uniform_projection,
                    "shader program built"
                );
                Ok(())
            }
            Err(err) => {
                self.gl.delete_program(program);
                Err(err)
            }
        }
    }

    /// Compiles both stages into `program`, links and validates it.
    /// The stage objects never outlive this call.
    fn link(&self, program: GLuint, vertex_code: &str, fragment_code: &str) -> Result<(), ShaderError> {
        let vertex_shader = self.compile_stage(ShaderStage::Vertex, vertex_code)?;
        let fragment_shader = match self.compile_stage(ShaderStage::Fragment, fragment_code) {
            Ok(shader) => shader,
            Err(err) => {
                self.gl.delete_shader(vertex_shader);
                return Err(err);
            }
        };

        self.gl.attach_shader(program, vertex_shader);
        self.gl.attach_shader(program, fragment_shader);
        self.gl.link_program(program);

        // the linked program keeps its own copy of the executables
        for shader in [vertex_shader, fragment_shader].iter() {
            self.gl.detach_shader(program, *shader);
            self.gl.delete_shader(*shader);
        }

        if self.gl.get_program_iv(program, gl::LINK_STATUS) != GLint::from(gl::TRUE) {
            let log = self.gl.get_program_info_log(program);
            tracing::error!("error linking program: '{}'", log);
            return Err(ShaderError::Link(log));
        }

        self.gl.validate_program(program);
        if self.gl.get_program_iv(program, gl::VALIDATE_STATUS) != GLint::from(gl::TRUE) {
            let log = self.gl.get_program_info_log(program);
            tracing::error!("error validating program: '{}'", log);
            return Err(ShaderError::Validate(log));
        }

        Ok(())
    }

    fn compile_stage(&self, stage: ShaderStage, code: &str) -> Result<GLuint, ShaderError> {
        let code = CString::new(code).map_err(|err| {
            let log = format!("source contains a nul byte at {}", err.nul_position());
            tracing::error!("error compiling the {} shader: '{}'", stage, log);
            stage.compile_error(log)
        })?;

        let shader = self.gl.create_shader(stage.gl_kind());
        if shader == 0 {
            tracing::error!("error creating {} shader", stage);
            return Err(ShaderError::ShaderAllocation(stage));
        }

        self.gl.shader_source(shader, &code);
        self.gl.compile_shader(shader);

        if self.gl.get_shader_iv(shader, gl::COMPILE_STATUS) != GLint::from(gl::TRUE) {
            let log = self.gl.get_shader_info_log(shader);
            tracing::error!("error compiling the {} shader: '{}'", stage, log);
            self.gl.delete_shader(shader);
            return Err(stage.compile_error(log));
        }

        Ok(shader)
    }

    fn uniform_location(&self, name: &str) -> GLint {
        match CString::new(name) {
            Ok(name) => self.gl.get_uniform_location(self.program_id, &name),
            Err(_) => UNIFORM_NOT_FOUND,
        }
    }

    pub fn use_shader(&self) {
        self.gl.use_program(self.program_id);
    }

    pub fn get_model_location(&self) -> GLint {
        self.uniform_model
    }

    pub fn get_projection_location(&self) -> GLint {
        self.uniform_projection
    }

    /// Caller must ensure shader is active.
    pub fn set_model(&self, model: &glm::Mat4) {
        if self.is_built() {
            self.gl.uniform_matrix4fv(self.uniform_model, model);
        }
    }

    /// Caller must ensure shader is active.
    pub fn set_projection(&self, projection: &glm::Mat4) {
        if self.is_built() {
            self.gl.uniform_matrix4fv(self.uniform_projection, projection);
        }
    }

    pub fn get_id(&self) -> GLuint {
        self.program_id
    }

    pub fn is_built(&self) -> bool {
        self.program_id != 0
    }

    pub fn release(&mut self) {
        if self.program_id != 0 {
            self.gl.delete_program(self.program_id);
            tracing::trace!(program = self.program_id, "shader program released");
            self.program_id = 0;
        }

        self.uniform_model = 0;
        self.uniform_projection = 0;
    }
}

impl<B: GLBackend> Rasterize for Shader<B> {
    fn cleanup_opengl(&mut self) {
        self.release();
    }
}

impl<B: GLBackend> Drop for Shader<B> {
    fn drop(&mut self) {
        self.cleanup_opengl();
    }
}

use thiserror::Error;

use crate::glm;
use crate::rasterize::backend::{GLBackend, NativeGL};
use crate::rasterize::drawable::Drawable;
use crate::rasterize::gl_mesh::GLMesh;
use crate::rasterize::shader::Shader;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SceneError {
    #[error("no shader at index {0}")]
    NoSuchShader(usize),
    #[error("object {0} couldn't be drawn")]
    Draw(usize),
}

/// A mesh along with the transform it is drawn with.
pub struct SceneObject<B: GLBackend = NativeGL> {
    pub mesh: GLMesh<B>,
    pub model: glm::Mat4,
}

/// Owns everything that is drawn by the render loop. Dropping the
/// context frees all the GPU resources it holds.
pub struct RenderContext<B: GLBackend = NativeGL> {
    gl: B,
    objects: Vec<SceneObject<B>>,
    shaders: Vec<Shader<B>>,
}

impl<B: GLBackend> RenderContext<B> {
    pub fn new(gl: B) -> Self {
        Self {
            gl,
            objects: Vec::new(),
            shaders: Vec::new(),
        }
    }

    pub fn add_object(&mut self, mesh: GLMesh<B>, model: glm::Mat4) -> usize {
        self.objects.push(SceneObject { mesh, model });
        self.objects.len() - 1
    }

    pub fn add_shader(&mut self, shader: Shader<B>) -> usize {
        self.shaders.push(shader);
        self.shaders.len() - 1
    }

    pub fn objects(&self) -> &[SceneObject<B>] {
        &self.objects
    }

    pub fn objects_mut(&mut self) -> &mut [SceneObject<B>] {
        &mut self.objects
    }

    pub fn shaders(&self) -> &[Shader<B>] {
        &self.shaders
    }

    /// Draw every object with the shader at `shader_index`. The shader
    /// is unbound once all objects are drawn.
    pub fn render(&self, shader_index: usize, projection: &glm::Mat4) -> Result<(), SceneError> {
        let shader = self
            .shaders
            .get(shader_index)
            .ok_or(SceneError::NoSuchShader(shader_index))?;

        shader.use_shader();
        shader.set_projection(projection);

        let drawn = self
            .objects
            .iter()
            .enumerate()
            .try_for_each(|(index, object)| {
                shader.set_model(&object.model);
                object
                    .mesh
                    .draw(&mut ())
                    .map_err(|_| SceneError::Draw(index))
            });

        self.gl.use_program(0);

        drawn
    }
}

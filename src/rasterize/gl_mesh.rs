use std::convert::TryInto;

use gl::types::{GLint, GLuint};
use thiserror::Error;

use super::backend::{GLBackend, NativeGL};
use super::drawable::Drawable;
use super::Rasterize;

/// Number of floats that make up a single vertex position.
pub const FLOATS_PER_VERTEX: usize = 3;

/// Attribute location of the vertex position in the shaders.
pub const POSITION_ATTRIBUTE: GLuint = 0;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MeshError {
    #[error("vertex array or buffer object couldn't be generated")]
    Allocation,
    #[error("{0} floats cannot be split into vertices of 3 floats")]
    VertexStride(usize),
    #[error("index {index} is out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MeshHandles {
    vao: GLuint,
    vbo: GLuint,
    ibo: GLuint,
    index_count: usize,
}

/// Vertex positions and triangle indices stored on the GPU.
///
/// The vertex array, vertex buffer and index buffer are either all
/// allocated or none of them are, there is no way to observe a
/// partially set up mesh.
pub struct GLMesh<B: GLBackend = NativeGL> {
    gl: B,
    handles: Option<MeshHandles>,
}

impl<B: GLBackend> GLMesh<B> {
    pub fn new(gl: B) -> Self {
        Self { gl, handles: None }
    }

    /// Create a mesh and upload the given data right away.
    pub fn from_data(gl: B, vertices: &[f32], indices: &[u32]) -> Result<Self, MeshError> {
        let mut mesh = Self::new(gl);
        mesh.create(vertices, indices)?;
        Ok(mesh)
    }

    /// Upload `vertices` (tightly packed xyz positions) and `indices`
    /// (triangle list) to the GPU.
    ///
    /// Any previously uploaded data is released first.
    pub fn create(&mut self, vertices: &[f32], indices: &[u32]) -> Result<(), MeshError> {
        if vertices.len() % FLOATS_PER_VERTEX != 0 {
            return Err(MeshError::VertexStride(vertices.len()));
        }
        let vertex_count = vertices.len() / FLOATS_PER_VERTEX;
        if let Some(&index) = indices
            .iter()
            .find(|&&index| index as usize >= vertex_count)
        {
            return Err(MeshError::IndexOutOfRange {
                index,
                vertex_count,
            });
        }

        if self.handles.is_some() {
            tracing::debug!("mesh recreated, releasing previous buffers");
            self.release();
        }

        let vao = self.gl.gen_vertex_array();
        let ibo = self.gl.gen_buffer();
        let vbo = self.gl.gen_buffer();

        if vao == 0 || vbo == 0 || ibo == 0 {
            tracing::error!(vao, vbo, ibo, "vao, vbo, or ibo couldn't be initialized");
            // give back whatever did get allocated
            if ibo != 0 {
                self.gl.delete_buffer(ibo);
            }
            if vbo != 0 {
                self.gl.delete_buffer(vbo);
            }
            if vao != 0 {
                self.gl.delete_vertex_array(vao);
            }
            return Err(MeshError::Allocation);
        }

        self.gl.bind_vertex_array(vao);

        self.gl.bind_buffer(gl::ELEMENT_ARRAY_BUFFER, ibo);
        self.gl
            .buffer_data_u32(gl::ELEMENT_ARRAY_BUFFER, indices, gl::STATIC_DRAW);

        self.gl.bind_buffer(gl::ARRAY_BUFFER, vbo);
        self.gl
            .buffer_data_f32(gl::ARRAY_BUFFER, vertices, gl::STATIC_DRAW);

        // positions at attribute location 0, tightly packed
        self.gl.vertex_attrib_pointer(
            POSITION_ATTRIBUTE,
            FLOATS_PER_VERTEX as GLint,
            gl::FLOAT,
            false,
            0,
            0,
        );
        self.gl.enable_vertex_attrib_array(POSITION_ATTRIBUTE);

        self.gl.bind_buffer(gl::ARRAY_BUFFER, 0);
        self.gl.bind_vertex_array(0);
        // element buffer binding is part of the vao state, only unbind
        // it once the vao is no longer bound
        self.gl.bind_buffer(gl::ELEMENT_ARRAY_BUFFER, 0);

        tracing::trace!(vao, vbo, ibo, vertex_count, index_count = indices.len(), "mesh created");

        self.handles = Some(MeshHandles {
            vao,
            vbo,
            ibo,
            index_count: indices.len(),
        });

        Ok(())
    }

    /// Draw the mesh as a list of triangles. Nothing is drawn if the
    /// mesh was never created or has been released.
    pub fn render(&self) {
        let handles = match self.handles {
            Some(handles) => handles,
            None => return,
        };

        self.gl.bind_vertex_array(handles.vao);
        self.gl.bind_buffer(gl::ELEMENT_ARRAY_BUFFER, handles.ibo);
        self.gl.draw_elements(
            gl::TRIANGLES,
            handles.index_count.try_into().unwrap_or(gl::types::GLsizei::MAX),
            gl::UNSIGNED_INT,
            0,
        );
        self.gl.bind_vertex_array(0);
        self.gl.bind_buffer(gl::ELEMENT_ARRAY_BUFFER, 0);
    }

    /// Free the GPU buffers. Calling this on an empty mesh does nothing.
    pub fn release(&mut self) {
        if let Some(handles) = self.handles.take() {
            self.gl.delete_buffer(handles.ibo);
            self.gl.delete_buffer(handles.vbo);
            self.gl.delete_vertex_array(handles.vao);
            tracing::trace!(vao = handles.vao, "mesh released");
        }
    }

    pub fn is_created(&self) -> bool {
        self.handles.is_some()
    }

    pub fn vao(&self) -> GLuint {
        self.handles.map_or(0, |handles| handles.vao)
    }

    pub fn vbo(&self) -> GLuint {
        self.handles.map_or(0, |handles| handles.vbo)
    }

    pub fn ibo(&self) -> GLuint {
        self.handles.map_or(0, |handles| handles.ibo)
    }

    pub fn index_count(&self) -> usize {
        self.handles.map_or(0, |handles| handles.index_count)
    }
}

impl<B: GLBackend> Rasterize for GLMesh<B> {
    fn cleanup_opengl(&mut self) {
        self.release();
    }
}

impl<B: GLBackend> Drop for GLMesh<B> {
    fn drop(&mut self) {
        self.cleanup_opengl();
    }
}

impl<B: GLBackend> Drawable for GLMesh<B> {
    type ExtraData = ();
    type Error = ();

    fn draw(&self, _extra_data: &mut Self::ExtraData) -> Result<(), Self::Error> {
        self.render();
        Ok(())
    }
}

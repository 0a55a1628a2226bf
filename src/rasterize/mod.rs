pub mod backend;
pub mod drawable;
pub mod gl_mesh;
pub mod primitives;
pub mod shader;

/// Any struct/enum that stores any OpenGL related memory (buffers,
/// vertex arrays, programs) must implement [`Rasterize`] to ensure
/// appropriate cleanup can be done.
///
/// [`Rasterize::cleanup_opengl()`] frees the GPU side data and leaves
/// the value empty, so it must be safe to call any number of times.
/// [`Drop::drop()`] of the implementor calls it once more, which is
/// then a no-op if the data was already cleaned up. A good approach is
/// to have the OpenGL handles wrapped by an [`Option`] that is taken
/// by [`Rasterize::cleanup_opengl()`].
pub trait Rasterize {
    fn cleanup_opengl(&mut self);
}

//! Builtin geometry, xyz positions and triangle list indices.

use lazy_static::lazy_static;

lazy_static! {
    static ref TRIANGLE_VERTICES: Vec<f32> = vec![
        -1.0, -1.0, 0.0,
        1.0, -1.0, 0.0,
        0.0, 1.0, 0.0,
    ];
    static ref TRIANGLE_INDICES: Vec<u32> = vec![0, 1, 2];
    // square base tilted into the screen, apex at the top
    static ref PYRAMID_VERTICES: Vec<f32> = vec![
        -1.0, -1.0, 0.0,
        0.0, -1.0, 1.0,
        1.0, -1.0, 0.0,
        0.0, 1.0, 0.0,
    ];
    static ref PYRAMID_INDICES: Vec<u32> = vec![
        0, 3, 1,
        1, 3, 2,
        2, 3, 0,
        0, 1, 2,
    ];
}

pub fn get_triangle_vertices() -> &'static [f32] {
    &TRIANGLE_VERTICES
}

pub fn get_triangle_indices() -> &'static [u32] {
    &TRIANGLE_INDICES
}

pub fn get_pyramid_vertices() -> &'static [f32] {
    &PYRAMID_VERTICES
}

pub fn get_pyramid_indices() -> &'static [u32] {
    &PYRAMID_INDICES
}

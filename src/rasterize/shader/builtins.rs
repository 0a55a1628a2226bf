//! Builtin shaders, the GLSL is embedded into the binary.

use paste::paste;

use super::{Shader, ShaderError};
use crate::rasterize::backend::GLBackend;

macro_rules! load_builtin_shader {
    ( $get_shader:ident ; $get_vert_code:ident ; $get_frag_code:ident ; $vert_location:tt ; $frag_location:tt ) => {
        pub fn $get_vert_code() -> &'static str {
            include_str!($vert_location)
        }

        pub fn $get_frag_code() -> &'static str {
            include_str!($frag_location)
        }

        pub fn $get_shader<B: GLBackend>(gl: B) -> Result<Shader<B>, ShaderError> {
            Shader::from_strings(gl, $get_vert_code(), $get_frag_code())
        }
    };
}

macro_rules! load_builtin_shader_easy {
    ( $name:ident ; $vert_location:tt ; $frag_location:tt ) => {
        paste! {
            load_builtin_shader!([<get_ $name _shader>]; [<get_ $name _vert_code>]; [<get_ $name _frag_code>]; $vert_location; $frag_location);
        }
    }
}

load_builtin_shader_easy!(
    triangle;
    "../../../shaders/triangle.vert";
    "../../../shaders/triangle.frag"
);

load_builtin_shader_easy!(
    pyramid;
    "../../../shaders/pyramid.vert";
    "../../../shaders/pyramid.frag"
);

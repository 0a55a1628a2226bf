use glfw::{Action, Context, Key};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use gl_course::{
    glm,
    inputs::{InputArguments, InputError, SceneKind},
    rasterize::{
        backend::NativeGL,
        gl_mesh::{GLMesh, MeshError},
        primitives,
        shader::{builtins, Shader, ShaderError},
    },
    scene::{RenderContext, SceneError},
};

#[derive(Debug, Error)]
enum AppError {
    #[error("glfw initialisation failed: {0}")]
    GlfwInit(String),
    #[error("glfw window creation failed")]
    WindowCreation,
    #[error(transparent)]
    Shader(#[from] ShaderError),
    #[error(transparent)]
    Mesh(#[from] MeshError),
    #[error(transparent)]
    Scene(#[from] SceneError),
}

fn main() {
    let args = match InputArguments::read_cli() {
        Ok(args) => args,
        Err(InputError::Cli(err)) => err.exit(),
        Err(err) => {
            eprintln!("error: {}", err);
            std::process::exit(1);
        }
    };

    let filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    if let Err(err) = run(&args) {
        tracing::error!("{}", err);
        std::process::exit(1);
    }
}

fn build_shader(args: &InputArguments) -> Result<Shader, ShaderError> {
    match args.shader_files() {
        Some((vert, frag)) => {
            tracing::info!("loading shaders from {} and {}", vert.display(), frag.display());
            Shader::from_files(NativeGL, vert, frag)
        }
        None => match args.scene {
            SceneKind::Triangle => builtins::get_triangle_shader(NativeGL),
            SceneKind::Pyramid => builtins::get_pyramid_shader(NativeGL),
        },
    }
}

fn build_scene(args: &InputArguments) -> Result<RenderContext, AppError> {
    let mut context = RenderContext::new(NativeGL);

    let (vertices, indices) = match args.scene {
        SceneKind::Triangle => (
            primitives::get_triangle_vertices(),
            primitives::get_triangle_indices(),
        ),
        SceneKind::Pyramid => (
            primitives::get_pyramid_vertices(),
            primitives::get_pyramid_indices(),
        ),
    };

    context.add_object(
        GLMesh::from_data(NativeGL, vertices, indices)?,
        glm::Mat4::identity(),
    );
    if args.scene == SceneKind::Pyramid {
        // a second pyramid above the first one
        context.add_object(
            GLMesh::from_data(NativeGL, vertices, indices)?,
            glm::Mat4::identity(),
        );
    }

    context.add_shader(build_shader(args)?);

    Ok(context)
}

/// Model matrix of the `index`th pyramid at time `time` (seconds).
fn pyramid_model(index: usize, time: f32) -> glm::Mat4 {
    let offset = glm::vec3(time.sin() * 0.5, index as f32 - 0.5, -2.5);
    let model = glm::translation(&offset);
    let model = glm::rotate_y(&model, time);
    glm::scale(&model, &glm::vec3(0.4, 0.4, 1.0))
}

fn run(args: &InputArguments) -> Result<(), AppError> {
    let mut glfw =
        glfw::init(glfw::FAIL_ON_ERRORS).map_err(|err| AppError::GlfwInit(format!("{:?}", err)))?;

    glfw.window_hint(glfw::WindowHint::ContextVersion(3, 3));
    glfw.window_hint(glfw::WindowHint::OpenGlProfile(
        glfw::OpenGlProfileHint::Core,
    ));
    glfw.window_hint(glfw::WindowHint::OpenGlForwardCompat(true));

    let (mut window, events) = glfw
        .create_window(
            args.width,
            args.height,
            "GL Course",
            glfw::WindowMode::Windowed,
        )
        .ok_or(AppError::WindowCreation)?;

    window.set_key_polling(true);
    window.set_framebuffer_size_polling(true);
    window.make_current();

    gl::load_with(|symbol| window.get_proc_address(symbol));

    let (buffer_width, buffer_height) = window.get_framebuffer_size();
    unsafe {
        gl::Viewport(0, 0, buffer_width, buffer_height);
        gl::Enable(gl::DEPTH_TEST);
    }

    let mut context = build_scene(args)?;
    let mut aspect = buffer_width as f32 / buffer_height.max(1) as f32;

    tracing::info!(
        scene = ?args.scene,
        width = buffer_width,
        height = buffer_height,
        "starting render loop"
    );

    while !window.should_close() {
        glfw.poll_events();

        glfw::flush_messages(&events).for_each(|(_, event)| match event {
            glfw::WindowEvent::Key(Key::Escape, _, Action::Press, _) => {
                window.set_should_close(true);
            }
            glfw::WindowEvent::FramebufferSize(width, height) => {
                unsafe {
                    gl::Viewport(0, 0, width, height);
                }
                aspect = width as f32 / height.max(1) as f32;
            }
            _ => {}
        });

        unsafe {
            gl::ClearColor(0.0, 0.0, 0.0, 1.0);
            gl::Clear(gl::COLOR_BUFFER_BIT | gl::DEPTH_BUFFER_BIT);
        }

        let projection = match args.scene {
            SceneKind::Triangle => glm::Mat4::identity(),
            SceneKind::Pyramid => {
                let time = glfw.get_time() as f32;
                context
                    .objects_mut()
                    .iter_mut()
                    .enumerate()
                    .for_each(|(index, object)| object.model = pyramid_model(index, time));
                glm::perspective(aspect, 45.0_f32.to_radians(), 0.1, 100.0)
            }
        };

        context.render(0, &projection)?;

        window.swap_buffers();
    }

    Ok(())
}

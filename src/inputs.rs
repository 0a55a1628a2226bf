use clap::value_t;
use clap::{App, Arg};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, Error)]
pub enum InputError {
    #[error(transparent)]
    Cli(#[from] clap::Error),
    #[error("couldn't read config {}: {source}", .path.display())]
    ConfigIo {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("couldn't parse config {}: {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("vertex and fragment shader paths must be given together")]
    IncompleteShaderPair,
    #[error("unknown scene `{0}`")]
    UnknownScene(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SceneKind {
    Triangle,
    Pyramid,
}

impl FromStr for SceneKind {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "triangle" => Ok(SceneKind::Triangle),
            "pyramid" => Ok(SceneKind::Pyramid),
            _ => Err(InputError::UnknownScene(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputArguments {
    pub width: u32,
    pub height: u32,
    pub scene: SceneKind,
    /// Shaders are loaded from these files instead of the builtin
    /// ones, both must be given.
    pub vertex_shader: Option<PathBuf>,
    pub fragment_shader: Option<PathBuf>,
    pub verbose: bool,
}

impl Default for InputArguments {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            scene: SceneKind::Pyramid,
            vertex_shader: None,
            fragment_shader: None,
            verbose: false,
        }
    }
}

impl InputArguments {
    fn get_app() -> App<'static, 'static> {
        App::new("gl_course")
            .version(env!("CARGO_PKG_VERSION"))
            .about("Renders a triangle or a pyramid with OpenGL")
            .arg(
                Arg::with_name("width")
                    .long("width")
                    .short("w")
                    .help("Window width")
                    .requires("height")
                    .takes_value(true),
            )
            .arg(
                Arg::with_name("height")
                    .long("height")
                    .help("Window height")
                    .requires("width")
                    .takes_value(true),
            )
            .arg(
                Arg::with_name("scene")
                    .long("scene")
                    .short("s")
                    .help("Geometry to render")
                    .takes_value(true)
                    .possible_values(&["triangle", "pyramid"]),
            )
            .arg(
                Arg::with_name("vertex-shader")
                    .long("vertex-shader")
                    .alias("vs")
                    .help("Vertex shader file path")
                    .requires("fragment-shader")
                    .takes_value(true)
                    .value_name("path"),
            )
            .arg(
                Arg::with_name("fragment-shader")
                    .long("fragment-shader")
                    .alias("fs")
                    .help("Fragment shader file path")
                    .requires("vertex-shader")
                    .takes_value(true)
                    .value_name("path"),
            )
            .arg(
                Arg::with_name("config")
                    .long("config")
                    .short("c")
                    .help("JSON config file, command line arguments take precedence")
                    .takes_value(true)
                    .value_name("path"),
            )
            .arg(
                Arg::with_name("verbose")
                    .long("verbose")
                    .short("v")
                    .help("Debug logging"),
            )
    }

    fn from_matches(matches: clap::ArgMatches) -> Result<Self, InputError> {
        let mut args = match matches.value_of("config") {
            Some(path) => Self::read_config(Path::new(path))?,
            None => Self::default(),
        };

        if matches.is_present("width") {
            args.width = value_t!(matches, "width", u32)?;
            args.height = value_t!(matches, "height", u32)?;
        }
        if let Some(scene) = matches.value_of("scene") {
            args.scene = scene.parse()?;
        }
        if let Some(path) = matches.value_of("vertex-shader") {
            args.vertex_shader = Some(PathBuf::from(path));
        }
        if let Some(path) = matches.value_of("fragment-shader") {
            args.fragment_shader = Some(PathBuf::from(path));
        }
        if matches.is_present("verbose") {
            args.verbose = true;
        }

        if args.vertex_shader.is_some() != args.fragment_shader.is_some() {
            return Err(InputError::IncompleteShaderPair);
        }

        Ok(args)
    }

    pub fn read_config(path: &Path) -> Result<Self, InputError> {
        let json = std::fs::read_to_string(path).map_err(|source| InputError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| InputError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn read_cli() -> Result<Self, InputError> {
        Self::from_matches(Self::get_app().get_matches_safe()?)
    }

    pub fn from_args<I, T>(args: I) -> Result<Self, InputError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self::from_matches(Self::get_app().get_matches_from_safe(args)?)
    }

    /// Vertex and fragment shader paths if shaders should be loaded
    /// from files.
    pub fn shader_files(&self) -> Option<(&Path, &Path)> {
        match (&self.vertex_shader, &self.fragment_shader) {
            (Some(vert), Some(frag)) => Some((vert.as_path(), frag.as_path())),
            _ => None,
        }
    }
}

//! rslabel command line front-end.
//!
//! Renders the Source Image and index composites of a raw scene to PNG,
//! converts painted label images into a class-id `.npy` array, and prints or
//! writes the configuration.

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::path::{Path, PathBuf};

    use clap::{Parser, Subcommand};
    use serde::de::DeserializeOwned;
    use web_time::Duration;

    use rslabel::constants::SOURCE_IMAGE_LAYER;
    use rslabel::keybindings::keys_to_display;
    use rslabel::{
        AppConfig, Editor, EditorError, IndexKind, NormType, RawScene, SatelliteType, export,
    };
    use rslabel_raster::npy::load_band_file;

    /// Satellite imagery labelling tool.
    #[derive(Parser, Debug)]
    #[command(author, version, about)]
    pub struct Cli {
        /// Configuration file (defaults to the user config directory)
        #[arg(short, long, global = true)]
        config: Option<PathBuf>,

        #[command(subcommand)]
        command: Command,
    }

    #[derive(Subcommand, Debug)]
    enum Command {
        /// Render a raw scene's Source Image and composites to PNG
        Render {
            /// Bands as `key=path.npy`, e.g. `b4=red.npy`
            #[arg(required = true, value_parser = parse_band_arg)]
            bands: Vec<(String, PathBuf)>,

            /// Satellite product of the bands
            #[arg(short, long, default_value = "sentinels2l2a", value_parser = parse_serde::<SatelliteType>)]
            satellite: SatelliteType,

            /// Source Image normalization (overrides the config)
            #[arg(short, long, value_parser = parse_serde::<NormType>)]
            norm: Option<NormType>,

            /// Index composites to render (ndvi, ndwi, agriculture)
            #[arg(long = "composite", value_parser = parse_serde::<IndexKind>)]
            composites: Vec<IndexKind>,

            /// Discretize every composite into this many colours
            #[arg(short, long)]
            kmeans: Option<usize>,

            /// Output directory
            #[arg(short = 'd', long, default_value = ".")]
            out_dir: PathBuf,
        },
        /// Convert painted label images into a class-id `.npy` array
        Export {
            /// One image per drawing layer, in channel order
            #[arg(required = true)]
            layers: Vec<PathBuf>,

            /// Output file
            #[arg(short, long, default_value = "labels.npy")]
            out: PathBuf,
        },
        /// Print the keybinding table
        Keys,
        /// Write the current configuration
        Config {
            /// Destination (defaults to the config path)
            #[arg(short, long)]
            out: Option<PathBuf>,
        },
    }

    fn parse_band_arg(arg: &str) -> Result<(String, PathBuf), String> {
        let (key, path) = arg
            .split_once('=')
            .ok_or_else(|| format!("expected key=path, got '{}'", arg))?;
        Ok((key.trim().to_string(), PathBuf::from(path)))
    }

    /// Parse a value by its serialized name.
    fn parse_serde<T: DeserializeOwned>(arg: &str) -> Result<T, String> {
        serde_json::from_value(serde_json::Value::String(arg.to_string()))
            .map_err(|e| e.to_string())
    }

    fn load_config(path: Option<&Path>) -> AppConfig {
        let loaded = match path {
            Some(path) => AppConfig::load_from_path(path),
            None => AppConfig::load_from_default_path(),
        };
        loaded.unwrap_or_default()
    }

    pub fn main() {
        let cli = Cli::parse();
        let config = load_config(cli.config.as_deref());

        env_logger::Builder::new()
            .filter_level(config.preferences.log_level.to_level_filter())
            .parse_default_env()
            .init();

        if let Err(e) = run(cli, config) {
            log::error!("{}", e);
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }

    fn run(cli: Cli, mut config: AppConfig) -> Result<(), EditorError> {
        match cli.command {
            Command::Render {
                bands,
                satellite,
                norm,
                composites,
                kmeans,
                out_dir,
            } => {
                if let Some(norm) = norm {
                    config.preferences.default_normalization = norm;
                }
                render(&config, satellite, &bands, &composites, kmeans, &out_dir)
            }
            Command::Export { layers, out } => export_labels(&config, &layers, &out),
            Command::Keys => {
                for binding in config.key_bindings().bindings() {
                    println!(
                        "{:<20} {}",
                        binding.display_name,
                        keys_to_display(&binding.keys)
                    );
                }
                Ok(())
            }
            Command::Config { out } => {
                match out.or_else(AppConfig::default_path) {
                    Some(path) => config.save_to_path(&path)?,
                    None => println!("{}", config.to_json().map_err(rslabel::ConfigError::from)?),
                }
                Ok(())
            }
        }
    }

    fn render(
        config: &AppConfig,
        satellite: SatelliteType,
        bands: &[(String, PathBuf)],
        composites: &[IndexKind],
        kmeans: Option<usize>,
        out_dir: &Path,
    ) -> Result<(), EditorError> {
        let loaded = bands
            .iter()
            .map(|(key, path)| Ok((key.as_str(), load_band_file(path)?)))
            .collect::<Result<Vec<_>, EditorError>>()?;
        let (width, height) = loaded
            .first()
            .map_or((0, 0), |(_, band)| (band.width(), band.height()));

        let mut scene = RawScene::new(satellite, width, height);
        for (key, band) in loaded {
            scene.insert_band(key, band)?;
        }

        let timeout = Duration::from_millis(config.preferences.worker_timeout_ms);
        let mut editor = Editor::new(config)?;
        editor.load_scene(scene, composites)?;
        editor.finish_pending(timeout);

        if let Some(k) = kmeans {
            for kind in composites {
                editor.discretize(kind.name(), Some(k))?;
                editor.finish_pending(timeout);
            }
        }

        std::fs::create_dir_all(out_dir)?;
        let names = std::iter::once(SOURCE_IMAGE_LAYER).chain(composites.iter().map(|k| k.name()));
        for name in names {
            let buffer = editor
                .registry()
                .buffer(name)
                .ok_or_else(|| EditorError::unknown_layer(name))?;
            let path = out_dir.join(format!("{}.png", name.replace(' ', "_")));
            buffer.image().save(&path)?;
            println!("Saved {}", path.display());
        }
        Ok(())
    }

    fn export_labels(config: &AppConfig, layers: &[PathBuf], out: &Path) -> Result<(), EditorError> {
        let mut editor = Editor::new(config)?;
        let mut names = Vec::with_capacity(layers.len());
        for (i, path) in layers.iter().enumerate() {
            let name = format!("{} {}", rslabel::constants::DRAWING_LAYER_PREFIX, i + 1);
            editor.add_image_layer(&name, &std::fs::read(path)?)?;
            names.push(name);
        }

        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        let labels = editor.export(&names)?;
        export::write_npy(out, &labels)?;
        println!("Saved {} ({:?})", out.display(), labels.shape());
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    cli::main();
}

// No command line on the web; the library is driven by the host page.
#[cfg(target_arch = "wasm32")]
fn main() {}

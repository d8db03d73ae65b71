use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use catalog::{RawCategory, RawFloor};
use clap::{Parser, Subcommand};
use foundation::Rgb;
use foundation::math::Vec3;
use gpu::path_layer::PathLayer;
use gpu::path_point::PathPointStyle;
use gpu::recording::RecordingEngine;
use scene::{ModelHierarchyManager, ViewerConfig};
use serde::Serialize;
use serde::de::DeserializeOwned;
use streaming::JsonFileLoader;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect category trees and model hierarchies")]
struct Args {
    /// Viewer config file (JSON). MODELTREE_* variables override it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Normalize a nested category response
    Normalize {
        file: PathBuf,

        /// Added to the raw depth of each root
        #[arg(long, allow_hyphen_values = true)]
        depth_offset: Option<i64>,
    },

    /// Assemble a flat category list linked by parentId
    Flat {
        file: PathBuf,

        #[arg(long, allow_hyphen_values = true)]
        depth_offset: Option<i64>,
    },

    /// Deduplicate a floor list by floorId
    Floors { file: PathBuf },

    /// Load a model hierarchy and apply visibility operations in order:
    /// --hide-all, --hide, --show, --expand
    Hierarchy {
        file: PathBuf,

        #[arg(long)]
        hide_all: bool,

        /// Node to hide (repeatable)
        #[arg(long = "hide")]
        hide: Vec<String>,

        /// Node to show (repeatable)
        #[arg(long = "show")]
        show: Vec<String>,

        /// Node to expand; later values collapse earlier ones
        #[arg(long = "expand")]
        expand: Vec<String>,
    },

    /// Draw path markers from a list of [x, y, z] positions
    Path {
        file: PathBuf,

        #[arg(long)]
        radius: Option<f64>,

        /// Marker color, e.g. "#1e90ff"
        #[arg(long)]
        color: Option<String>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NodeReport<'a> {
    id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent: Option<&'a str>,
    visible: bool,
    expanded: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PathReport {
    segments: usize,
    live_meshes: usize,
    live_geometries: usize,
    live_materials: usize,
    released: usize,
    invalid_disposals: usize,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    match args.command {
        Command::Normalize { file, depth_offset } => {
            let raw: Vec<RawCategory> = read_json(&file)?;
            let mut options = config.normalize_options();
            if let Some(offset) = depth_offset {
                options.depth_offset = offset;
            }
            print_json(&catalog::normalize_with(&raw, options)?)?;
        }
        Command::Flat { file, depth_offset } => {
            let raw: Vec<RawCategory> = read_json(&file)?;
            let mut options = config.normalize_options();
            if let Some(offset) = depth_offset {
                options.depth_offset = offset;
            }
            print_json(&catalog::assemble_flat(&raw, options)?)?;
        }
        Command::Floors { file } => {
            let raw: Vec<RawFloor> = read_json(&file)?;
            let floors = catalog::dedupe_floors(&raw);
            info!(read = raw.len(), kept = floors.len(), "deduplicated floors");
            print_json(&floors)?;
        }
        Command::Hierarchy {
            file,
            hide_all,
            hide,
            show,
            expand,
        } => hierarchy(config, &file, hide_all, &hide, &show, &expand).await?,
        Command::Path {
            file,
            radius,
            color,
        } => {
            let positions: Vec<[f64; 3]> = read_json(&file)?;
            let mut style = PathPointStyle::default();
            if let Some(radius) = radius {
                style.radius = radius;
            }
            if let Some(color) = color {
                style.color =
                    Rgb::parse(&color).ok_or_else(|| format!("invalid color: {color}"))?;
            }
            print_json(&draw_path(&positions, style)?)?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<ViewerConfig, Box<dyn Error>> {
    let base = match path {
        Some(path) => ViewerConfig::from_json_file(path)?,
        None => ViewerConfig::default(),
    };
    Ok(base.with_overrides(|key| std::env::var(key).ok())?)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, Box<dyn Error>> {
    let payload = fs::read_to_string(path).map_err(|e| format!("read {path:?}: {e}"))?;
    Ok(serde_json::from_str(&payload).map_err(|e| format!("parse {path:?}: {e}"))?)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn hierarchy(
    config: ViewerConfig,
    file: &Path,
    hide_all: bool,
    hide: &[String],
    show: &[String],
    expand: &[String],
) -> Result<(), Box<dyn Error>> {
    let loader = JsonFileLoader::new(".");
    let mut viewer = ModelHierarchyManager::mount(RecordingEngine::new("modeltree"), config);
    viewer.load(&loader, &file.to_string_lossy()).await?;

    if hide_all {
        viewer.hide_all();
    }
    for id in hide {
        if !viewer.hide(id) {
            eprintln!("unknown node: {id}");
        }
    }
    for id in show {
        if !viewer.show(id) {
            eprintln!("unknown node: {id}");
        }
    }
    for id in expand {
        if !viewer.expand(id) {
            eprintln!("cannot expand: {id}");
        }
    }

    if let Some(index) = viewer.index() {
        let report: Vec<NodeReport<'_>> = index
            .nodes()
            .map(|node| NodeReport {
                id: node.id.as_str(),
                parent: node.parent.as_ref().map(|p| p.as_str()),
                visible: node.visible,
                expanded: viewer.is_expanded(node.id.as_str()),
            })
            .collect();
        print_json(&report)?;
    }

    let engine = viewer.unmount();
    info!(calls = engine.calls().len(), "engine calls issued");
    Ok(())
}

fn draw_path(positions: &[[f64; 3]], style: PathPointStyle) -> Result<PathReport, Box<dyn Error>> {
    let mut engine = RecordingEngine::new("modeltree");
    let mut layer = PathLayer::new();
    let positions: Vec<Vec3> = positions
        .iter()
        .map(|[x, y, z]| Vec3::new(*x, *y, *z))
        .collect();
    if let Err(e) = layer.draw(&mut engine, &positions, style) {
        layer.clear(&mut engine);
        return Err(e.into());
    }

    let segments = layer.len();
    let live_meshes = engine.live_meshes();
    let live_geometries = engine.live_geometries();
    let live_materials = engine.live_materials();
    let released = layer.clear(&mut engine);

    Ok(PathReport {
        segments,
        live_meshes,
        live_geometries,
        live_materials,
        released,
        invalid_disposals: engine.invalid_disposals(),
    })
}

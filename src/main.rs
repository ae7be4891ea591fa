use std::path::PathBuf;

use anyhow::{bail, Context};
use canvaskit::{init_logging, Config, ElementId, Scene, SceneFile, BUILD_DATE, VERSION};

const USAGE: &str = "usage: canvaskit [--config <file>] [--json] <scene.json>";

struct Args {
    scene: PathBuf,
    config: Option<PathBuf>,
    json: bool,
}

fn parse_args() -> anyhow::Result<Option<Args>> {
    let mut scene = None;
    let mut config = None;
    let mut json = false;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--version" | "-V" => {
                println!("canvaskit {} (built {})", VERSION, BUILD_DATE);
                return Ok(None);
            }
            "--help" | "-h" => {
                println!("{}", USAGE);
                return Ok(None);
            }
            "--json" => json = true,
            "--config" => {
                let path = args.next().context("--config needs a file")?;
                config = Some(PathBuf::from(path));
            }
            other if other.starts_with('-') => bail!("unknown option {}\n{}", other, USAGE),
            other => scene = Some(PathBuf::from(other)),
        }
    }

    let scene = scene.with_context(|| USAGE.to_string())?;
    Ok(Some(Args {
        scene,
        config,
        json,
    }))
}

fn print_outline(scene: &Scene, id: ElementId, depth: usize) {
    let tree = scene.tree();
    let Some(element) = tree.get(id) else {
        return;
    };
    let bounds = tree.bounds_of(id).unwrap_or_default();
    println!(
        "{:indent$}{} [{}] {}x{} at ({}, {})",
        "",
        element.name(),
        element.element_type,
        bounds.width,
        bounds.height,
        bounds.x,
        bounds.y,
        indent = depth * 2
    );
    for child in tree.children(id) {
        print_outline(scene, *child, depth + 1);
    }
}

fn main() -> anyhow::Result<()> {
    init_logging()?;

    let Some(args) = parse_args()? else {
        return Ok(());
    };

    let config = match &args.config {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::load_or_default().context("Failed to load default config")?,
    };

    let file = SceneFile::load_from_file(&args.scene)
        .with_context(|| format!("Failed to open {}", args.scene.display()))?;
    tracing::info!(
        "Loaded '{}' ({} elements)",
        file.metadata.name,
        file.scene.element_count()
    );

    let scene = Scene::from_document(&file.scene, config.scene_options())
        .context("Scene document is invalid")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&scene.document())?);
        return Ok(());
    }

    print_outline(&scene, scene.tree().root(), 0);
    let connections = scene.render_connections();
    if !connections.is_empty() {
        println!("{} connection(s)", connections.len());
        for connection in connections {
            println!(
                "  {} -> {} ({:.1}, {:.1}) -> ({:.1}, {:.1})",
                connection.source,
                connection.target,
                connection.path.start.x,
                connection.path.start.y,
                connection.path.end.x,
                connection.path.end.y
            );
        }
    }

    Ok(())
}

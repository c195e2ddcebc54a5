#![deny(unsafe_code)]
//! CLI binary for spriteforge.
//!
//! Subcommands:
//! - `pack <inputs...>`: lay out or atlas-pack PNG sprites, write PNG + metadata
//! - `animate <inputs...>`: same, with an animation timeline as metadata
//! - `pixelate <input>`: low-resolution pixel-art restyle of one image
//! - `list`: print layouts, formats, heuristics, and engines
//!
//! Logging goes to stderr; set `RUST_LOG` (e.g. `RUST_LOG=spriteforge_core=debug`)
//! or pass `-v` for debug output.

mod error;

use clap::{Args, Parser, Subcommand};
use error::CliError;
use spriteforge_core::{
    AnimationFormat, ExportOptions, LayoutMode, MetadataFormat, PackHeuristic, PixelArtPipeline,
    SpriteImage,
};
use spriteforge_export::snapshot::{read_sprite, write_png};
use spriteforge_export::{export_animation, export_sprites, EngineTarget, ExportBundle};
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "spriteforge", about = "Sprite sheet packing and pixel-art export")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

/// Options shared by `pack` and `animate`.
#[derive(Args)]
struct SheetArgs {
    /// Input PNG files, in order.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Sheet layout (horizontal, vertical, grid).
    #[arg(short, long)]
    layout: Option<String>,

    /// Pack into a dense atlas instead of a formula layout.
    #[arg(long)]
    atlas: bool,

    /// Packing heuristic for --atlas (bssf, blsf, baf).
    #[arg(long)]
    heuristic: Option<String>,

    /// Padding in pixels around each sprite.
    #[arg(short, long)]
    padding: Option<u32>,

    /// Keep exact dimensions instead of rounding up to powers of two.
    #[arg(long)]
    no_power_of_two: bool,

    /// Maximum atlas width and height.
    #[arg(long)]
    max_size: Option<u32>,

    /// Apply the pixel-art pass (quantize + outline) to the composed sheet.
    #[arg(long)]
    pixel_art: bool,

    /// Palette size for --pixel-art.
    #[arg(long)]
    palette_size: Option<u32>,

    /// Add Floyd-Steinberg dithering to --pixel-art.
    #[arg(long)]
    dither: bool,

    /// Output image path.
    #[arg(short, long, default_value = "spritesheet.png")]
    output: PathBuf,

    /// Metadata output path (defaults to the image path with the format's extension).
    #[arg(short, long)]
    metadata: Option<PathBuf>,

    /// Base options as a JSON object; flags override it.
    #[arg(long, default_value = "{}")]
    options: String,
}

#[derive(Subcommand)]
enum Command {
    /// Lay out or pack sprites and write the sheet plus metadata.
    Pack {
        #[command(flatten)]
        sheet: SheetArgs,

        /// Metadata format (json, atlas, xml, text).
        #[arg(short, long)]
        format: Option<String>,

        /// Target engine (phaser, godot, unity, unreal); decides the format.
        #[arg(short, long)]
        engine: Option<String>,
    },
    /// Lay out sprites as animation frames and write a timeline.
    Animate {
        #[command(flatten)]
        sheet: SheetArgs,

        /// Frames per second.
        #[arg(long)]
        fps: Option<u32>,

        /// Play once instead of looping.
        #[arg(long)]
        no_loop: bool,

        /// Timeline format (json, spine).
        #[arg(short, long, default_value = "json")]
        format: String,
    },
    /// Restyle one image as low-resolution pixel art.
    Pixelate {
        /// Input PNG file.
        input: PathBuf,

        /// Number of levels per channel.
        #[arg(long, default_value_t = 16)]
        palette_size: u32,

        /// Output width (defaults to the input width).
        #[arg(short = 'W', long)]
        width: Option<u32>,

        /// Output height (defaults to the input height).
        #[arg(short = 'H', long)]
        height: Option<u32>,

        /// Dither the result.
        #[arg(long)]
        dither: bool,

        /// Output file path.
        #[arg(short, long, default_value = "pixelated.png")]
        output: PathBuf,
    },
    /// List layouts, metadata formats, heuristics, and engines.
    List,
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .with(filter)
        .init();
}

/// Builds export options: `--options` JSON first, then explicit flags.
fn build_options(sheet: &SheetArgs) -> Result<ExportOptions, CliError> {
    let base: serde_json::Value = serde_json::from_str(&sheet.options)
        .map_err(|e| CliError::Input(format!("invalid --options JSON: {e}")))?;
    let mut options = ExportOptions::from_json(&base);

    if let Some(layout) = &sheet.layout {
        options.layout = LayoutMode::from_name(layout);
    }
    if let Some(heuristic) = &sheet.heuristic {
        options.heuristic = PackHeuristic::from_name(heuristic);
    }
    if let Some(padding) = sheet.padding {
        options.padding = padding;
    }
    if let Some(max_size) = sheet.max_size {
        options.max_size = max_size;
    }
    if let Some(palette_size) = sheet.palette_size {
        options.palette_size = palette_size;
    }
    options.atlas |= sheet.atlas;
    options.pixel_art |= sheet.pixel_art;
    options.dither |= sheet.dither;
    if sheet.no_power_of_two {
        options.power_of_two = false;
    }
    options.image_name = file_name(&sheet.output);
    Ok(options)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn load_sprites(inputs: &[PathBuf]) -> Result<Vec<SpriteImage>, CliError> {
    let sprites = inputs
        .iter()
        .map(|path| read_sprite(path).map_err(CliError::from))
        .collect::<Result<Vec<_>, _>>()?;
    tracing::debug!(count = sprites.len(), "loaded sprites");
    Ok(sprites)
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), CliError> {
    std::fs::write(path, bytes).map_err(|e| CliError::from(e).with_path(path))
}

/// Writes the image and metadata files, returning the metadata path.
fn write_bundle(bundle: &ExportBundle, sheet: &SheetArgs) -> Result<PathBuf, CliError> {
    write_file(&sheet.output, &bundle.image)?;
    let meta_path = sheet
        .metadata
        .clone()
        .unwrap_or_else(|| sheet.output.with_extension(bundle.metadata_extension));
    write_file(&meta_path, bundle.metadata.as_bytes())?;
    Ok(meta_path)
}

fn report(
    json: bool,
    sprites: usize,
    bundle: &ExportBundle,
    sheet: &SheetArgs,
    meta: &Path,
) -> Result<(), CliError> {
    if json {
        let info = serde_json::json!({
            "sprites": sprites,
            "width": bundle.width,
            "height": bundle.height,
            "image": sheet.output.display().to_string(),
            "metadata": meta.display().to_string(),
            "snippet": bundle.snippet,
        });
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        eprintln!(
            "packed {sprites} sprite(s) into {}x{} -> {} + {}",
            bundle.width,
            bundle.height,
            sheet.output.display(),
            meta.display()
        );
        if let Some(snippet) = &bundle.snippet {
            println!("{snippet}");
        }
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::List => {
            let layouts = LayoutMode::list_names();
            let formats = MetadataFormat::list_names();
            let animation_formats = AnimationFormat::list_names();
            let heuristics = PackHeuristic::list_names();
            let engines = EngineTarget::list_engines();
            if cli.json {
                let info = serde_json::json!({
                    "layouts": layouts,
                    "formats": formats,
                    "animation_formats": animation_formats,
                    "heuristics": heuristics,
                    "engines": engines,
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("Layouts:");
                println!("  {}", layouts.join(", "));
                println!("Metadata formats:");
                println!("  {}", formats.join(", "));
                println!("Animation formats:");
                println!("  {}", animation_formats.join(", "));
                println!("Heuristics:");
                println!("  {}", heuristics.join(", "));
                println!("Engines:");
                for name in engines {
                    println!("  {name}");
                }
            }
        }
        Command::Pack {
            sheet,
            format,
            engine,
        } => {
            let mut options = build_options(&sheet)?;
            if let Some(format) = format {
                options.format = format;
            }
            if engine.is_some() {
                options.engine = engine;
            }
            let sprites = load_sprites(&sheet.inputs)?;
            let bundle = export_sprites(&sprites, &options)?;
            let meta = write_bundle(&bundle, &sheet)?;
            report(cli.json, sprites.len(), &bundle, &sheet, &meta)?;
        }
        Command::Animate {
            sheet,
            fps,
            no_loop,
            format,
        } => {
            let mut options = build_options(&sheet)?;
            if let Some(fps) = fps {
                options.fps = fps;
            }
            if no_loop {
                options.looping = false;
            }
            let sprites = load_sprites(&sheet.inputs)?;
            let format = AnimationFormat::from_name(&format);
            let bundle = export_animation(&sprites, &options, format)?;
            let meta = write_bundle(&bundle, &sheet)?;
            report(cli.json, sprites.len(), &bundle, &sheet, &meta)?;
        }
        Command::Pixelate {
            input,
            palette_size,
            width,
            height,
            dither: with_dither,
            output,
        } => {
            let sprite = read_sprite(&input)?;
            let target_w = width.unwrap_or(sprite.width());
            let target_h = height.unwrap_or(sprite.height());
            let pipeline = PixelArtPipeline {
                palette_size,
                dither: with_dither,
                outline: true,
            };
            let pixels = pipeline.pixelate(sprite.pixels().clone(), target_w, target_h)?;
            write_png(&pixels, &output)?;

            if cli.json {
                let info = serde_json::json!({
                    "input": input.display().to_string(),
                    "width": target_w,
                    "height": target_h,
                    "palette_size": palette_size,
                    "output": output.display().to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                eprintln!(
                    "pixelated {} ({target_w}x{target_h}, palette {palette_size}) -> {}",
                    input.display(),
                    output.display()
                );
            }
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = serde_json::json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}

//! Slice an image into an interlocking jigsaw and write the pieces, a
//! display board and a printable sheet.

use std::path::{Path, PathBuf};

use clap::{ArgGroup, Parser};
use jigprint_core::{
    GenerationError, ImageGenerator, PIECE_COUNT_MENU, Puzzle, PuzzleConfig, RandomJoints,
    decode_payload,
};
use jigprint_export::{BoardMetadata, to_board_svg, to_print_html};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Slice an image into an interlocking N x N jigsaw puzzle.
///
/// The source is either an image file or a base64 payload as returned by
/// an image generation service (optionally a `data:` URL).
#[derive(Parser)]
#[command(version)]
#[command(group(ArgGroup::new("source").required(true).args(["image", "payload"])))]
struct Args {
    /// Source image file (PNG, JPEG, BMP or WebP).
    #[arg(long, value_name = "PATH")]
    image: Option<PathBuf>,

    /// File holding a base64 image payload from a generator.
    #[arg(long, value_name = "PATH")]
    payload: Option<PathBuf>,

    /// Prompt the image was generated from. Used as the board and sheet title.
    #[arg(long, default_value = "")]
    prompt: String,

    /// Total number of pieces. Must be a perfect square of at least 4.
    #[arg(long, default_value_t = PuzzleConfig::DEFAULT_PIECE_COUNT)]
    pieces: u32,

    /// Width of the cut-line stroke in pixels.
    #[arg(long, default_value_t = PuzzleConfig::DEFAULT_STROKE_WIDTH)]
    stroke_width: f32,

    /// Full configuration as JSON; replaces `--pieces` and `--stroke-width`.
    #[arg(long, value_name = "JSON", conflicts_with_all = ["pieces", "stroke_width"])]
    config_json: Option<String>,

    /// Seed for the joint topology. Random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Directory to write piece PNGs, `board.svg` and `print.html` into.
    #[arg(short, long, value_name = "DIR")]
    out_dir: PathBuf,

    /// Size of one board cell in SVG user units.
    #[arg(long, default_value_t = 100.0)]
    cell_size: f64,

    /// Print slice diagnostics as JSON on stdout.
    #[arg(long)]
    json: bool,
}

/// Serves a base64 payload stored on disk, whatever the prompt.
struct PayloadFile<'a>(&'a Path);

impl ImageGenerator for PayloadFile<'_> {
    fn generate(&self, _prompt: &str) -> Result<Vec<u8>, GenerationError> {
        let payload = std::fs::read_to_string(self.0)
            .map_err(|e| GenerationError::Upstream(format!("{}: {e}", self.0.display())))?;
        decode_payload(&payload)
    }
}

fn config_from(args: &Args) -> Result<PuzzleConfig, Box<dyn std::error::Error>> {
    let config = match &args.config_json {
        Some(json) => {
            serde_json::from_str(json).map_err(|e| format!("--config-json: {e}"))?
        }
        None => PuzzleConfig {
            piece_count: args.pieces,
            stroke_width: args.stroke_width,
            ..PuzzleConfig::default()
        },
    };
    config.validate()?;
    if !PIECE_COUNT_MENU.contains(&config.piece_count) {
        warn!(
            piece_count = config.piece_count,
            menu = ?PIECE_COUNT_MENU,
            "piece count is not one of the usual choices"
        );
    }
    Ok(config)
}

fn joints(seed: Option<u64>) -> RandomJoints<StdRng> {
    RandomJoints(match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    })
}

fn slice(args: &Args, config: &PuzzleConfig) -> Result<Puzzle, Box<dyn std::error::Error>> {
    let joints = joints(args.seed);
    if let Some(path) = &args.payload {
        let generator = PayloadFile(path);
        return Ok(jigprint_core::puzzle_from_prompt_with(
            &generator,
            &args.prompt,
            config,
            joints,
        )?);
    }
    let Some(path) = &args.image else {
        return Err("one of --image or --payload is required".into());
    };
    info!(path = %path.display(), "reading image");
    let image_bytes = std::fs::read(path)?;
    Ok(jigprint_core::process_with(&image_bytes, config, joints)?)
}

fn write_outputs(
    args: &Args,
    puzzle: &Puzzle,
    piece_count: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(&args.out_dir)?;

    for piece in puzzle.pieces() {
        let path = args.out_dir.join(format!("piece_{}.png", piece.id()));
        std::fs::write(&path, piece.image().png())?;
    }

    let description = format!("{piece_count} piece jigsaw");
    let metadata = BoardMetadata {
        title: (!args.prompt.is_empty()).then_some(args.prompt.as_str()),
        description: Some(&description),
    };
    let board = to_board_svg(puzzle.pieces(), puzzle.side(), args.cell_size, &metadata)?;
    std::fs::write(args.out_dir.join("board.svg"), board)?;

    let sheet = to_print_html(puzzle.pieces(), puzzle.side(), &args.prompt)?;
    std::fs::write(args.out_dir.join("print.html"), sheet)?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = config_from(&args)?;
    let puzzle = slice(&args, &config)?;

    let d = puzzle.diagnostics();
    info!(
        pieces = d.piece_count,
        width = d.image.width,
        height = d.image.height,
        total = ?d.total,
        "sliced"
    );

    write_outputs(&args, &puzzle, config.piece_count)?;
    info!(dir = %args.out_dir.display(), "wrote pieces, board.svg and print.html");

    if args.json {
        println!("{}", serde_json::to_string_pretty(d)?);
    }
    Ok(())
}

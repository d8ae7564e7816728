//! GoRecall command line.
//!
//! ## Usage
//!
//! - `gorecall split <FILE>` - Split an SGF file into leaf sequences and store them
//! - `gorecall list` - List stored sequences matching the current filter
//! - `gorecall show` - Pick a sequence and print its board and comments
//! - `gorecall validate --key <KEY> "<moves>"` - Check a recalled sequence
//! - `gorecall convert <FILE>` - Turn a reviewed game into training games
//!
//! Preferences given to `show` are remembered in the store directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use gorecall::Error;
use gorecall::board::{Color, Orientation, project, render};
use gorecall::config::{ColorChoice, Settings};
use gorecall::constants::DEFAULT_STORE_DIR;
use gorecall::convert::review_to_training;
use gorecall::select::{VariationMode, filter_indices, select};
use gorecall::sgf::{parse_game, to_sgf};
use gorecall::split::import;
use gorecall::store::{FileStore, SequenceStore, load_catalog, save_catalog};
use gorecall::validate::{parse_recall, validate};
use gorecall::walk::{Walk, WalkOptions, walk};

/// GoRecall: train recall of Go sequences from SGF files
#[derive(Parser)]
#[command(name = "gorecall")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding stored sequences, the catalog and settings
    #[arg(long, global = true, default_value = DEFAULT_STORE_DIR)]
    store: PathBuf,

    /// Seed for random choices (variation, color, orientation)
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split an SGF file into one stored sequence per leaf
    Split {
        file: PathBuf,
    },
    /// List stored sequences
    List {
        /// Only sequences starting at this coordinate (ignored if none match)
        #[arg(long)]
        start_pos: Option<String>,
        /// Only sequences carrying this tag (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// Pick a stored sequence and show it
    Show {
        /// Show this sequence instead of selecting one
        #[arg(long)]
        key: Option<String>,
        /// Selection mode: fixed, random or sequential
        #[arg(long)]
        mode: Option<VariationMode>,
        /// Position in the filtered catalog for fixed mode
        #[arg(long)]
        index: Option<usize>,
        /// Prefer sequences starting at this coordinate
        #[arg(long)]
        start_pos: Option<String>,
        /// Required tags, also used as stop tags (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Forget previously selected tags
        #[arg(long)]
        clear_tags: bool,
        /// Number of moves to show
        #[arg(long)]
        moves: Option<usize>,
        /// Color of the first move: black, white or random
        #[arg(long)]
        player: Option<ColorChoice>,
        /// Show the board in a random orientation
        #[arg(long, conflicts_with = "fixed_orientation")]
        random_orientation: bool,
        /// Show the board in its recorded orientation
        #[arg(long)]
        fixed_orientation: bool,
        /// Print the rendering as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check recalled moves against a stored sequence
    Validate {
        #[arg(long)]
        key: String,
        /// Recalled coordinates in order, e.g. "pd dd pq" ("pass" allowed)
        recall: String,
        /// Color of the first move
        #[arg(long, default_value = "black")]
        player: Color,
    },
    /// Convert a reviewed game into training games, one per side variation
    Convert {
        file: PathBuf,
        /// Output file (default: training_<name> next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut rng = cli
        .seed
        .map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);

    match cli.command {
        Commands::Split { file } => run_split(&cli.store, &file),
        Commands::List { start_pos, tags } => run_list(&cli.store, start_pos, tags),
        Commands::Show {
            key,
            mode,
            index,
            start_pos,
            tags,
            clear_tags,
            moves,
            player,
            random_orientation,
            fixed_orientation,
            json,
        } => {
            let mut settings = Settings::load(&cli.store)?;
            if let Some(mode) = mode {
                settings.variation_mode = mode;
            }
            if let Some(index) = index {
                settings.selector.fixed_index = index;
            }
            if start_pos.is_some() {
                settings.start_pos = start_pos;
            }
            if clear_tags {
                settings.selected_tags.clear();
            }
            settings.selected_tags.extend(tags);
            if moves.is_some() {
                settings.move_number = moves;
            }
            if let Some(player) = player {
                settings.color_choice = player;
            }
            if random_orientation {
                settings.randomize_orientation = true;
            }
            if fixed_orientation {
                settings.randomize_orientation = false;
            }
            run_show(&cli.store, key, settings, json, &mut rng)
        }
        Commands::Validate {
            key,
            recall,
            player,
        } => run_validate(&cli.store, &key, &recall, player, &mut rng),
        Commands::Convert { file, output } => run_convert(&file, output),
    }
}

fn source_name(file: &Path) -> String {
    file.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown")
        .to_string()
}

fn run_split(store_dir: &Path, file: &Path) -> anyhow::Result<()> {
    let text = fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let source = source_name(file);

    let mut store = FileStore::open(store_dir)?;
    let catalog = import(&mut store, &text, &source)
        .with_context(|| format!("Failed to split {}", file.display()))?;
    save_catalog(store_dir, &catalog)?;

    // A new catalog makes previous tag selections meaningless.
    let mut settings = Settings::load(store_dir)?;
    settings.selected_tags.clear();
    settings.last_source = Some(source.clone());
    settings.save(store_dir)?;

    println!("Stored {} sequences from {source}", catalog.len());
    Ok(())
}

fn run_list(store_dir: &Path, start_pos: Option<String>, tags: Vec<String>) -> anyhow::Result<()> {
    let catalog = load_catalog(store_dir)?;
    let mut filter = Settings::load(store_dir)?.filter();
    if start_pos.is_some() {
        filter.start_pos = start_pos;
    }
    if !tags.is_empty() {
        filter.tags = tags.into_iter().collect();
    }

    for i in filter_indices(&catalog, &filter) {
        let entry = &catalog[i];
        let tags: Vec<&str> = entry.tags.iter().map(String::as_str).collect();
        println!(
            "{i:>4}  {:<28} {:<4} {}",
            entry.key,
            entry.first_move.as_deref().unwrap_or("-"),
            tags.join(",")
        );
    }
    Ok(())
}

fn load_walk(
    store_dir: &Path,
    key: &str,
    options: &WalkOptions,
    rng: &mut fastrand::Rng,
) -> anyhow::Result<Walk> {
    let store = FileStore::open(store_dir)?;
    let sequence = store.get(key)?.ok_or_else(|| Error::NotFound {
        key: key.to_string(),
    })?;
    Ok(walk(&sequence.into_root(), options, rng))
}

fn run_show(
    store_dir: &Path,
    key: Option<String>,
    mut settings: Settings,
    json: bool,
    rng: &mut fastrand::Rng,
) -> anyhow::Result<()> {
    let key = match key {
        Some(key) => key,
        None => {
            let catalog = load_catalog(store_dir)?;
            if catalog.is_empty() {
                bail!("no sequences stored; run `gorecall split <FILE>` first");
            }
            let Some(i) = select(
                &catalog,
                &settings.filter(),
                settings.variation_mode,
                &mut settings.selector,
                rng,
            ) else {
                bail!("no sequence matches the selected start position and tags");
            };
            catalog[i].key.clone()
        }
    };

    let options = WalkOptions {
        start_filter: settings.start_pos.clone(),
        stop_tags: settings.selected_tags.clone(),
        start_player: Some(settings.color_choice.resolve(rng)),
        ..Default::default()
    };
    let replay = load_walk(store_dir, &key, &options, rng)?;
    let limit = settings.move_number.unwrap_or(replay.moves.len());
    let orientation = settings
        .randomize_orientation
        .then(|| Orientation::random(rng));
    settings.save(store_dir)?;
    info!(key = %key, limit, ?orientation, "showing sequence");

    if json {
        let rendering = render(&replay, limit, orientation);
        println!("{}", serde_json::to_string_pretty(&rendering)?);
        return Ok(());
    }

    let projection = project(replay.size, &replay.setup, &replay.moves, limit, orientation);
    println!("{key}");
    print!("{}", projection.board);
    println!(
        "Showing {} of {} moves",
        limit.min(projection.total_moves),
        projection.total_moves
    );
    for (i, comment) in replay.comments.iter().enumerate().take(limit) {
        if !comment.trim().is_empty() {
            println!("{:>3}: {comment}", i + 1);
        }
    }
    Ok(())
}

fn run_validate(
    store_dir: &Path,
    key: &str,
    recall: &str,
    player: Color,
    rng: &mut fastrand::Rng,
) -> anyhow::Result<()> {
    let options = WalkOptions {
        start_player: Some(player),
        ..Default::default()
    };
    let replay = load_walk(store_dir, key, &options, rng)?;
    let projection = project(replay.size, &replay.setup, &replay.moves, replay.moves.len(), None);
    let recalled = parse_recall(recall, player)?;
    let result = validate(&recalled, &projection.board, projection.total_moves);
    println!("{result}");
    Ok(())
}

fn run_convert(file: &Path, output: Option<PathBuf>) -> anyhow::Result<()> {
    let text = fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let review = parse_game(&text).with_context(|| format!("Failed to parse {}", file.display()))?;
    let training = review_to_training(&review);

    let output = output
        .unwrap_or_else(|| file.with_file_name(format!("training_{}", source_name(file))));
    fs::write(&output, to_sgf(&[training]))
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!("Wrote {}", output.display());
    Ok(())
}

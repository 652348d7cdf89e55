//! Strata command line front end.
//!
//! - `strata sniff` prints the layer definitions recognised in a file.
//! - `strata compose` imports files into an in-memory collection, shows
//!   every imported layer and prints the merged style document.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use strata_engine::{EngineConfig, LayerEngine, MemoryStore, RecomputeMode, Viewport, Warning};
use strata_style::{BoundingBox, LngLat};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "strata")]
#[command(about = "Layered map style composition")]
struct Args {
	/// Verbose logging
	#[arg(short, long, global = true)]
	verbose: bool,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Print the layer definitions recognised in FILE (stdin when omitted)
	Sniff {
		file: Option<PathBuf>,
		/// URL the bytes came from; enables tile-template recognition
		#[arg(long)]
		url: Option<String>,
	},
	/// Import FILES and print the merged style document
	Compose {
		#[arg(required = true)]
		files: Vec<PathBuf>,
		/// Engine configuration (TOML)
		#[arg(short, long, value_name = "PATH")]
		config: Option<PathBuf>,
		/// Report consistency warnings on stderr
		#[arg(short, long)]
		warnings: bool,
		/// Viewport as `west,south,east,north,zoom` for warnings
		#[arg(long, value_name = "W,S,E,N,Z")]
		viewport: Option<String>,
	},
}

fn main() -> anyhow::Result<()> {
	let args = Args::parse();
	setup_tracing(args.verbose);

	match args.command {
		Command::Sniff { file, url } => sniff(file.as_deref(), url.as_deref()),
		Command::Compose {
			files,
			config,
			warnings,
			viewport,
		} => compose(&files, config.as_deref(), warnings, viewport.as_deref()),
	}
}

fn sniff(file: Option<&Path>, url: Option<&str>) -> anyhow::Result<()> {
	let bytes = match file {
		Some(path) => std::fs::read(path).with_context(|| format!("reading {}", path.display()))?,
		None => {
			let mut buffer = Vec::new();
			std::io::stdin().read_to_end(&mut buffer).context("reading stdin")?;
			buffer
		}
	};
	let definitions = strata_engine::sniff(&bytes, url)?;
	println!("{}", serde_json::to_string_pretty(&definitions)?);
	Ok(())
}

fn compose(files: &[PathBuf], config: Option<&Path>, warnings: bool, viewport: Option<&str>) -> anyhow::Result<()> {
	let config = match config {
		Some(path) => EngineConfig::load(path)?,
		None => EngineConfig::default(),
	};
	let mut engine = LayerEngine::open(MemoryStore::new(), config)?.with_recompute_mode(RecomputeMode::Inline);

	for path in files {
		let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
		let source = path.to_string_lossy();
		let batch = engine
			.import(&bytes, Some(source.as_ref()))
			.with_context(|| format!("importing {}", path.display()))?;
		for error in batch.rejected() {
			tracing::warn!(file = %path.display(), %error, "definition rejected");
		}
		let accepted: Vec<String> = batch
			.results
			.iter()
			.filter_map(|result| result.layer().map(|layer| layer.id().to_owned()))
			.collect();
		for id in &accepted {
			engine.show(id)?;
		}
		info!(file = %path.display(), layers = accepted.len(), "imported");
	}

	let snapshot = engine.snapshot();
	println!("{}", serde_json::to_string_pretty(&snapshot.style)?);

	if warnings {
		if let Some(viewport) = viewport {
			engine.set_viewport(parse_viewport(viewport)?, std::time::Instant::now());
			engine.poll_warnings(std::time::Instant::now() + engine.config().warning_debounce());
		}
		for warning in engine.warnings().iter() {
			eprintln!("warning: {}", describe(warning));
		}
	}
	Ok(())
}

fn parse_viewport(input: &str) -> anyhow::Result<Viewport> {
	let values = input
		.split(',')
		.map(|part| part.trim().parse::<f64>())
		.collect::<Result<Vec<_>, _>>()
		.with_context(|| format!("invalid viewport {input:?}"))?;
	let &[west, south, east, north, zoom] = values.as_slice() else {
		anyhow::bail!("viewport needs five numbers, got {}", values.len());
	};
	Ok(Viewport {
		bounds: BoundingBox::new(LngLat::new(west, south), LngLat::new(east, north)),
		zoom,
	})
}

fn describe(warning: &Warning) -> String {
	match warning {
		Warning::EmptyStyle => "no visible layer renders anything".to_owned(),
		Warning::MinZoomTooLow { target_zoom } => format!("zoom in to {target_zoom} to see the visible layers"),
		Warning::OutOfBounds { bounds } => format!(
			"visible layers only cover {},{} to {},{}",
			bounds.sw.lon, bounds.sw.lat, bounds.ne.lon, bounds.ne.lat
		),
		Warning::MultipleOpaque { layers } => format!("several opaque layers are visible: {}", layers.join(", ")),
		Warning::ZeroOpacity { layer, sublayers } => {
			format!("layer {layer} has fully transparent parts: {}", sublayers.join(", "))
		}
	}
}

fn setup_tracing(verbose: bool) {
	use tracing_subscriber::EnvFilter;

	let filter = EnvFilter::try_from_env("STRATA_LOG").unwrap_or_else(|_| {
		if verbose {
			EnvFilter::new("strata=debug,strata_engine=debug,strata_style=debug,info")
		} else {
			EnvFilter::new("warn")
		}
	});
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.init();
}

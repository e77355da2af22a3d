use std::fs::File;
use std::io;
use std::io::BufWriter;
use std::io::Read;
use std::io::Write;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use owo_colors::OwoColorize;
use resfilter_cli::FilterCli;
use resfilter_core::DelimiterSet;
use resfilter_core::FilterError;
use resfilter_core::FilterFile;
use resfilter_core::InterpolatingReader;
use resfilter_core::Interpolator;
use resfilter_core::PrefixedObjectValueSource;
use resfilter_core::PropertiesValueSource;
use resfilter_core::SingleResponseValueSource;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Prefixes for the `[project]` table when `recognized_prefixes` is empty.
const DEFAULT_PROJECT_PREFIXES: [&str; 2] = ["project.", "pom."];
const SESSION_PREFIX: &str = "session.";
const SETTINGS_PREFIX: &str = "settings.";
const LOCAL_REPOSITORY_EXPRESSION: &str = "localRepository";

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = FilterCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	init_tracing(args.verbose, use_color);

	if let Err(e) = run(&args) {
		match e.downcast::<FilterError>() {
			Ok(filter_err) => {
				let report: miette::Report = (*filter_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

/// Logs go to stderr so they never mix with filtered output. `RUST_LOG` wins
/// over `--verbose`.
fn init_tracing(verbose: bool, use_color: bool) {
	let default_level = if verbose { "debug" } else { "warn" };
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

	tracing_subscriber::registry()
		.with(filter)
		.with(
			tracing_subscriber::fmt::layer()
				.with_writer(io::stderr)
				.with_ansi(use_color)
				.with_target(false),
		)
		.init();
}

fn resolve_root(args: &FilterCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

fn load_filter_file(args: &FilterCli) -> Result<FilterFile, FilterError> {
	if let Some(config_path) = &args.config {
		tracing::debug!(path = %config_path.display(), "loading explicit config");
		return FilterFile::load_file(config_path);
	}

	let root = resolve_root(args);
	match FilterFile::resolve_path(&root) {
		Some(config_path) => {
			tracing::debug!(path = %config_path.display(), "resolved config");
			FilterFile::load_file(&config_path)
		}
		None => {
			tracing::debug!(root = %root.display(), "no config file found");
			Ok(FilterFile::default())
		}
	}
}

fn build_interpolator(args: &FilterCli, file: FilterFile) -> Result<Interpolator, FilterError> {
	let mut builder = file.config_builder()?;
	if !args.delimiters.is_empty() {
		builder = builder.delimiters(DelimiterSet::parse_all(&args.delimiters)?);
	}
	if let Some(escape_string) = &args.escape_string {
		builder = builder.escape_string(escape_string.clone());
	}
	if args.preserve_escape_string {
		builder = builder.preserve_escape_string(true);
	}
	if args.escape_windows_paths {
		builder = builder.escape_windows_paths(true);
	}
	if args.multi_line {
		builder = builder.support_multi_line_filtering(true);
	}
	if let Some(line_ending) = args.line_ending {
		builder = builder.line_ending(line_ending.into());
	}
	let config = builder.build()?;

	let mut properties = file.properties();
	properties.extend(args.defines.iter().cloned());
	tracing::debug!(properties = properties.len(), "collected properties");

	let mut interpolator = Interpolator::new(config);
	interpolator.add_source(PropertiesValueSource::new(properties));

	if let Some(project) = file.project {
		let prefixes = if file.recognized_prefixes.is_empty() {
			DEFAULT_PROJECT_PREFIXES.iter().map(ToString::to_string).collect()
		} else {
			file.recognized_prefixes
		};
		interpolator.add_source(PrefixedObjectValueSource::with_prefixes(prefixes, project, true));
	}
	if let Some(session) = file.session {
		interpolator.add_source(PrefixedObjectValueSource::new(SESSION_PREFIX, session));
	}
	if let Some(settings) = file.settings {
		interpolator.add_source(PrefixedObjectValueSource::new(SETTINGS_PREFIX, settings));
	}
	if let Some(local_repository) = file.local_repository {
		interpolator.add_source(SingleResponseValueSource::new(
			LOCAL_REPOSITORY_EXPRESSION,
			local_repository,
		));
	}

	Ok(interpolator)
}

fn run(args: &FilterCli) -> Result<(), Box<dyn std::error::Error>> {
	let file = load_filter_file(args)?;
	let interpolator = build_interpolator(args, file)?;

	let input: Box<dyn Read> = match &args.input {
		Some(path) if path.as_os_str() != "-" => Box::new(File::open(path).map_err(FilterError::Io)?),
		_ => Box::new(io::stdin().lock()),
	};

	let mut reader = InterpolatingReader::new(input, interpolator);
	let mut writer = BufWriter::new(io::stdout().lock());
	io::copy(&mut reader, &mut writer).map_err(FilterError::Io)?;
	writer.flush().map_err(FilterError::Io)?;

	Ok(())
}

//! Command-line interface for streamdoc
//!
//! Usage:
//!   streamdoc convert `<path>` [--to `<format>`] [--config `<file>`] [--pending]
//!   streamdoc stream `<path>` [--chunk-size `<n>`] [--delay-ms `<ms>`] [--to `<format>`] [--config `<file>`]
//!   streamdoc formats

use clap::{Arg, ArgAction, ArgMatches, Command};
use std::process;
use std::time::Duration;
use streamdoc::editor::{MountPolicy, StreamEditor};
use streamdoc::formats::treeviz::to_treeviz_str;
use streamdoc::registry::FormatRegistry;
use streamdoc::settings::{Loader, StreamdocConfig};
use streamdoc::stream::{replay_chunks, Mode};
use streamdoc::SvgChartEngine;

const OUTPUT_FORMATS: [&str; 3] = ["markdown", "html", "treeviz"];

fn main() {
    let matches = Command::new("streamdoc")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert and replay Markdown documents with embedded charts")
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log debug output to stderr")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("convert")
                .about("Parse a Markdown file, mount its charts and write it out")
                .arg(path_arg())
                .arg(to_arg())
                .arg(config_arg())
                .arg(
                    Arg::new("pending")
                        .long("pending")
                        .help("Keep charts as formatted configuration instead of mounting them")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("stream")
                .about("Replay a Markdown file chunk by chunk, then mount its charts")
                .arg(path_arg())
                .arg(to_arg())
                .arg(config_arg())
                .arg(
                    Arg::new("chunk-size")
                        .long("chunk-size")
                        .help("Characters per chunk (default from config)")
                        .value_parser(clap::value_parser!(u64).range(1..)),
                )
                .arg(
                    Arg::new("delay-ms")
                        .long("delay-ms")
                        .help("Delay between chunks in milliseconds (default from config)")
                        .value_parser(clap::value_parser!(u64)),
                ),
        )
        .subcommand(Command::new("formats").about("List available document formats"))
        .get_matches();

    init_tracing(matches.get_flag("verbose"));

    match matches.subcommand() {
        Some(("convert", sub)) => handle_convert_command(sub),
        Some(("stream", sub)) => handle_stream_command(sub),
        Some(("formats", _)) => handle_formats_command(),
        _ => {
            eprintln!("Unknown command; see --help");
            process::exit(2);
        }
    }
}

fn path_arg() -> Arg {
    Arg::new("path")
        .help("Path to the Markdown file")
        .required(true)
        .index(1)
}

fn to_arg() -> Arg {
    Arg::new("to")
        .long("to")
        .short('t')
        .help("Output format")
        .value_parser(OUTPUT_FORMATS)
        .default_value("markdown")
}

fn config_arg() -> Arg {
    Arg::new("config")
        .long("config")
        .short('c')
        .help("TOML file layered over the built-in defaults")
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(matches: &ArgMatches) -> StreamdocConfig {
    let mut loader = Loader::new();
    if let Some(path) = matches.get_one::<String>("config") {
        loader = loader.with_file(path);
    }
    loader.build().unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        process::exit(1);
    })
}

fn read_source(matches: &ArgMatches) -> String {
    let path = matches
        .get_one::<String>("path")
        .map(String::as_str)
        .unwrap_or_default();
    std::fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{}': {}", path, e);
        process::exit(1);
    })
}

fn output_format(matches: &ArgMatches) -> &str {
    matches
        .get_one::<String>("to")
        .map(String::as_str)
        .unwrap_or("markdown")
}

fn render(editor: &StreamEditor, format: &str) -> String {
    match format {
        "html" => editor.to_markup(),
        "treeviz" => to_treeviz_str(editor.document()),
        _ => editor.to_portable_text(),
    }
}

fn handle_convert_command(matches: &ArgMatches) {
    let config = load_config(matches);
    let source = read_source(matches);

    let mut options = config.editor_options();
    options.mount_policy = MountPolicy::Eager;
    let mut editor = StreamEditor::new(options, SvgChartEngine::default());

    if matches.get_flag("pending") {
        editor.set_mode(Mode::Streaming);
        editor.append(&source);
    } else {
        editor.set_full_text(&source);
    }

    println!("{}", render(&editor, output_format(matches)));
}

fn handle_stream_command(matches: &ArgMatches) {
    let config = load_config(matches);
    let source = read_source(matches);
    let chunk_size = matches
        .get_one::<u64>("chunk-size")
        .map(|n| *n as usize)
        .unwrap_or(config.stream.chunk_size);
    let delay = matches
        .get_one::<u64>("delay-ms")
        .map(|ms| Duration::from_millis(*ms))
        .unwrap_or_else(|| config.stream.delay());

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap_or_else(|e| {
            eprintln!("Failed to start runtime: {}", e);
            process::exit(1);
        });

    let mut editor = StreamEditor::new(config.editor_options(), SvgChartEngine::default());
    runtime.block_on(replay(&mut editor, &source, chunk_size, delay, config.stream.tick()));

    println!("{}", render(&editor, output_format(matches)));
}

/// Feed `source` in chunks while streaming, then tick until every chart is mounted
async fn replay(
    editor: &mut StreamEditor,
    source: &str,
    chunk_size: usize,
    delay: Duration,
    tick: Duration,
) {
    let chunks = replay_chunks(source, chunk_size);
    let mut next = 0;
    let mut ticker = tokio::time::interval(tick);
    let feed = tokio::time::sleep(Duration::ZERO);
    tokio::pin!(feed);

    editor.set_mode(Mode::Streaming);
    loop {
        if next == chunks.len() && editor.mode() == Mode::Streaming {
            editor.set_mode(Mode::Interactive);
            tracing::debug!(chunks = chunks.len(), "stream finished");
        }
        if next == chunks.len() && editor.pending_mounts() == 0 {
            break;
        }

        tokio::select! {
            _ = &mut feed, if next < chunks.len() => {
                editor.append(chunks[next]);
                next += 1;
                feed.as_mut().reset(tokio::time::Instant::now() + delay);
            }
            _ = ticker.tick() => {
                let step = editor.tick();
                tracing::trace!(?step, "tick");
            }
        }
    }
}

fn handle_formats_command() {
    let registry = FormatRegistry::with_defaults();
    println!("Available formats:\n");
    for name in registry.list_formats() {
        if let Ok(format) = registry.get(&name) {
            let mut caps = Vec::new();
            if format.supports_parsing() {
                caps.push("parse");
            }
            if format.supports_serialization() {
                caps.push("serialize");
            }
            println!("  {} ({})", name, caps.join(", "));
            println!("    {}", format.description());
        }
    }
}

use crate::catalog;
use crate::config::load_config;
use crate::editor::CircuitEditor;
use crate::route_dump::{dump_string, write_route_dump};
use crate::scene::{instantiate, parse_scene};
use anyhow::Result;
use clap::Parser;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "wirelay",
    version,
    about = "Routes the wires of a schematic scene and dumps the result as JSON"
)]
pub struct Args {
    /// Input scene file (.wsc) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output JSON file. Defaults to stdout if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Config JSON/JSON5 file (theme, router and editor sections)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Print routing statistics to stderr
    #[arg(long = "stats")]
    pub stats: bool,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    let input = read_input(args.input.as_deref())?;
    let scene = parse_scene(&input)?;

    let mut editor = CircuitEditor::new(catalog::standard_logic(), config);
    instantiate(&scene, &mut editor)?;
    editor.route()?;

    if args.stats {
        print_stats(&editor);
    }

    match args.output.as_deref() {
        Some(path) => write_route_dump(path, &editor)?,
        None => println!("{}", dump_string(&editor)?),
    }
    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path.as_os_str() != "-" => Ok(std::fs::read_to_string(path)?),
        _ => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

fn print_stats(editor: &CircuitEditor) {
    let router = editor.router();
    let mut points = 0usize;
    let mut segments = 0usize;
    for (_, path) in router.edges() {
        points += path.len();
        segments += path.len().saturating_sub(1);
    }
    eprintln!(
        "routed {} nets across {} components: {} points, {} segments",
        router.edge_count(),
        router.node_count(),
        points,
        segments
    );
}

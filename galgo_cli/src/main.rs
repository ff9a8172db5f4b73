use std::env;
use std::path::PathBuf;

use galgo_pipeline::generate_project;

const DEFAULT_OUT_DIR: &str = "generated";

fn main() {
    env_logger::init();
    let args: Vec<String> = env::args().collect();

    let Some(command) = args.get(1).map(String::as_str) else {
        print_usage();
        std::process::exit(2);
    };

    let result = match command {
        "gen" => gen_command(&args),
        _ => {
            print_usage();
            std::process::exit(2);
        }
    };

    if let Err(err) = result {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  galgo_cli gen --project <dir> [--symbols <file>] [--out <dir>]");
    eprintln!();
    eprintln!("Scans <dir> for project.godot and *.tscn files, joins them with the");
    eprintln!("compiled symbol snapshot, and writes generated sources to --out");
    eprintln!("(default: <dir>/{DEFAULT_OUT_DIR}).");
}

fn gen_command(args: &[String]) -> Result<(), String> {
    let Some(project) = parse_flag_value(args, "--project") else {
        print_usage();
        std::process::exit(2);
    };
    let project = PathBuf::from(project);
    let symbols = parse_flag_value(args, "--symbols").map(PathBuf::from);
    let out = parse_flag_value(args, "--out")
        .map(PathBuf::from)
        .unwrap_or_else(|| project.join(DEFAULT_OUT_DIR));

    let output = generate_project(&project, symbols.as_deref(), &out)
        .map_err(|err| format!("generation failed: {err}"))?;

    for diagnostic in &output.diagnostics {
        eprintln!("{diagnostic}");
    }
    println!("generated {} file(s) in {}", output.artifacts.len(), out.display());
    Ok(())
}

fn parse_flag_value(args: &[String], flag: &str) -> Option<String> {
    let idx = args.iter().position(|a| a == flag)?;
    args.get(idx + 1).cloned()
}

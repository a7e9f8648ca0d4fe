//! Resource pack mesh optimizer
//!
//! Merges coplanar element faces in every block and item model of a pack
//! and writes the result to a new archive.
//!
//! Usage:
//!     packmesher [OPTIONS] [PACK]
//!
//! Options:
//!     -c, --config <FILE>       Config file (default: config.json)
//!     -o, --output <FILE>       Output archive (default: target/output.zip)
//!     --no-mesh                 Skip the face merge pass
//!     --no-uv                   Skip UV region merging
//!     --regions <FILE>          Write per-model UV region tables as JSON
//!     --max-depth <DEPTH>       Octree max depth (default: 6)
//!     --min-elements <N>        Items per octree leaf before it splits (default: 8)
//!     --save-config             Write the effective config file and exit
//!     -h, --help                Show this help message

use std::env;
use std::path::PathBuf;
use std::time::Instant;

use packmesher::core::{Config, logging};
use packmesher::pack::optimize_pack;

fn print_help() {
    eprintln!("packmesher - Resource pack mesh optimizer");
    eprintln!();
    eprintln!("Usage: packmesher [OPTIONS] [PACK]");
    eprintln!();
    eprintln!("Without PACK, uses inputJavaPack from the config or the only .zip in the");
    eprintln!("current directory.");
    eprintln!();
    eprintln!("Options:");
    eprintln!("    -c, --config <FILE>       Config file (default: config.json)");
    eprintln!("    -o, --output <FILE>       Output archive (default: target/output.zip)");
    eprintln!("    --no-mesh                 Skip the face merge pass");
    eprintln!("    --no-uv                   Skip UV region merging");
    eprintln!("    --regions <FILE>          Write per-model UV region tables as JSON");
    eprintln!("    --max-depth <DEPTH>       Octree max depth (default: 6)");
    eprintln!("    --min-elements <N>        Items per octree leaf before it splits (default: 8)");
    eprintln!("    --save-config             Write the effective config file and exit");
    eprintln!("    -h, --help                Show this help message");
    eprintln!();
    eprintln!("Example:");
    eprintln!("    packmesher my_pack.zip -o build/my_pack.zip");
    eprintln!("    RUST_LOG=debug packmesher --no-uv --regions target/regions.json");
}

#[derive(Debug)]
struct Args {
    pack: Option<PathBuf>,
    config: PathBuf,
    output: PathBuf,
    no_mesh: bool,
    no_uv: bool,
    regions: Option<PathBuf>,
    max_depth: Option<u8>,
    min_elements: Option<usize>,
    save_config: bool,
}

fn parse_args() -> Result<Args, String> {
    let args: Vec<String> = env::args().skip(1).collect();

    let mut parsed = Args {
        pack: None,
        config: PathBuf::from(Config::FILE_NAME),
        output: PathBuf::from("target/output.zip"),
        no_mesh: false,
        no_uv: false,
        regions: None,
        max_depth: None,
        min_elements: None,
        save_config: false,
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-c" | "--config" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing value for --config".to_string());
                }
                parsed.config = PathBuf::from(&args[i]);
            }
            "-o" | "--output" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing value for --output".to_string());
                }
                parsed.output = PathBuf::from(&args[i]);
            }
            "--regions" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing value for --regions".to_string());
                }
                parsed.regions = Some(PathBuf::from(&args[i]));
            }
            "--no-mesh" => parsed.no_mesh = true,
            "--no-uv" => parsed.no_uv = true,
            "--save-config" => parsed.save_config = true,
            "--max-depth" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing value for --max-depth".to_string());
                }
                parsed.max_depth = Some(args[i].parse().map_err(|_| format!("Invalid max-depth: {}", args[i]))?);
            }
            "--min-elements" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing value for --min-elements".to_string());
                }
                parsed.min_elements = Some(args[i].parse().map_err(|_| format!("Invalid min-elements: {}", args[i]))?);
            }
            arg if arg.starts_with('-') => {
                return Err(format!("Unknown option: {}", arg));
            }
            path => {
                if parsed.pack.is_some() {
                    return Err("Multiple packs specified".to_string());
                }
                parsed.pack = Some(PathBuf::from(path));
            }
        }
        i += 1;
    }

    Ok(parsed)
}

fn run(args: &Args) -> packmesher::core::Result<()> {
    let mut config = Config::load_or_default(&args.config)?;
    if args.no_mesh {
        config.process_mesh = false;
    }
    if args.no_uv {
        config.process_uv = false;
    }
    if let Some(pack) = &args.pack {
        config.input_java_pack = Some(pack.clone());
    }

    if args.save_config {
        config.save(&args.config)?;
        log::info!("Saved config to {}", args.config.display());
        return Ok(());
    }

    let base_dir = env::current_dir()?;
    let input = config.resolve_input(&base_dir)?;

    let mut optimize = config.optimize_config();
    if let Some(max_depth) = args.max_depth {
        optimize.max_depth = max_depth;
    }
    if let Some(min_elements) = args.min_elements {
        optimize.min_elements_per_region = min_elements;
    }

    log::info!("Input: {}", input.display());
    log::info!("Output: {}", args.output.display());
    log::info!("Mesh merging: {}, UV merging: {}", optimize.process_mesh, optimize.process_uv);

    let report = optimize_pack(&input, &args.output, &optimize)?;
    if let Some(path) = &args.regions {
        report.write_regions(path)?;
        log::info!("Wrote UV regions for {} models to {}", report.uv_regions.len(), path.display());
    }
    log::info!(
        "Summary: {} entries, {} models, {} rewritten, {} UV regions",
        report.entries, report.models, report.rewritten, report.stats.regions_out
    );
    Ok(())
}

fn main() {
    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            print_help();
            std::process::exit(1);
        }
    };

    logging::init();
    log::info!("PackMesher v{}", env!("CARGO_PKG_VERSION"));

    let start = Instant::now();
    if let Err(e) = run(&args) {
        log::error!("{}", e);
        std::process::exit(1);
    }
    log::info!("Done in {:.2}s", start.elapsed().as_secs_f64());
}

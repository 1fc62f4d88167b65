use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use crunch_core::{pack_atlas, timing, BuildOutcome, Config, StringEncoding};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(
    name = "crunch",
    about = "Pack PNG sprites into power-of-two texture atlases",
    version
)]
struct Cli {
    /// Output path prefix; the directory part is the output directory and
    /// the file part (extension stripped) is the atlas name
    output: String,

    /// Comma-separated inputs, each a directory or a .png file
    inputs: String,

    /// Use default settings (--xml --premultiply --trim --unique)
    #[arg(short = 'd', long = "default")]
    use_default: bool,

    /// Save the atlas data as a .xml file
    #[arg(short, long)]
    xml: bool,

    /// Save the atlas data as a .bin file
    #[arg(short, long)]
    binary: bool,

    /// Save the atlas data as a .json file
    #[arg(short, long)]
    json: bool,

    /// Premultiply the pixels of the bitmaps by their alpha channel
    #[arg(short, long)]
    premultiply: bool,

    /// Trim excess transparency off the bitmaps
    #[arg(short, long)]
    trim: bool,

    /// Print to the console as the packer works
    #[arg(short, long)]
    verbose: bool,

    /// Ignore the stored hash, forcing the packer to repack
    #[arg(short, long)]
    force: bool,

    /// Remove duplicate bitmaps from the atlas
    #[arg(short, long)]
    unique: bool,

    /// Rotate bitmaps 90 degrees clockwise when packing
    #[arg(short, long)]
    rotate: bool,

    /// Max atlas size (4096, 2048, 1024, 512, 256, 128 or 64)
    #[arg(short, long, default_value_t = 4096)]
    size: u32,

    /// Padding between images (0 to 16)
    #[arg(long, default_value_t = 1)]
    pad: u32,

    /// Binary manifest string encoding: n (null-terminated), p (int16
    /// prefixed) or 7 (7-bit prefixed)
    #[arg(long, alias = "bs", default_value = "n", value_parser = parse_binstr)]
    binstr: StringEncoding,

    /// Hash inputs by modification time instead of file contents
    #[arg(long, alias = "tm")]
    time: bool,

    /// Pack each subdirectory separately and stitch the manifests
    #[arg(long, alias = "sp")]
    split: bool,

    /// Omit the trailing 0 from the page name when there is only one page
    #[arg(long, alias = "nz")]
    nozero: bool,
}

fn parse_binstr(s: &str) -> Result<StringEncoding, String> {
    s.parse()
        .map_err(|_| format!("invalid string encoding: {s} (expected n, p or 7)"))
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Help and version print to stdout and exit 0; everything else
            // is a usage error.
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    init_tracing(cli.verbose);
    timing::start("total");
    let result = run(&cli);
    timing::stop("total");

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }

    if cli.verbose {
        println!("time measured:");
        for (label, dur) in timing::report() {
            println!("\t{}: {:.3} ms", label, dur.as_secs_f64() * 1000.0);
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let (out_dir, name) = split_output(&cli.output);
    let inputs: Vec<PathBuf> = cli
        .inputs
        .split(',')
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .collect();

    let cfg = Config {
        out_dir: out_dir.clone(),
        name,
        inputs,
        xml: cli.xml || cli.use_default,
        binary: cli.binary,
        json: cli.json,
        premultiply: cli.premultiply || cli.use_default,
        trim: cli.trim || cli.use_default,
        verbose: cli.verbose,
        force: cli.force,
        unique: cli.unique || cli.use_default,
        rotate: cli.rotate,
        size: cli.size,
        pad: cli.pad,
        binstr: cli.binstr,
        check_time: cli.time,
        split: cli.split,
        nozero: cli.nozero,
        args: std::env::args().skip(1).collect(),
    };
    cfg.validate()?;

    if cfg.verbose {
        print_options(&cfg);
    }

    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("create output directory {}", out_dir.display()))?;

    match pack_atlas(&cfg)? {
        BuildOutcome::Packed => debug!("atlas written"),
        BuildOutcome::Unchanged => debug!("atlas up to date"),
    }
    Ok(())
}

/// Splits the output prefix into directory and atlas name, dropping any
/// extension from the name ("bin/atlases/atlas" -> "bin/atlases" + "atlas").
fn split_output(output: &str) -> (PathBuf, String) {
    let path = Path::new(output);
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let out_dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    (out_dir, name)
}

fn print_options(cfg: &Config) {
    println!("options...");
    println!("\t--xml: {}", cfg.xml);
    println!("\t--binary: {}", cfg.binary);
    println!("\t--json: {}", cfg.json);
    println!("\t--premultiply: {}", cfg.premultiply);
    println!("\t--trim: {}", cfg.trim);
    println!("\t--verbose: {}", cfg.verbose);
    println!("\t--force: {}", cfg.force);
    println!("\t--unique: {}", cfg.unique);
    println!("\t--rotate: {}", cfg.rotate);
    println!("\t--size: {}", cfg.size);
    println!("\t--pad: {}", cfg.pad);
    println!("\t--binstr: {}", cfg.binstr.wire_id());
    println!("\t--time: {}", cfg.check_time);
    println!("\t--split: {}", cfg.split);
    println!("\t--nozero: {}", cfg.nozero);
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .try_init();
}

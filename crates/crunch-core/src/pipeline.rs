//! The incremental build controller.
//!
//! Computes the input hash, decides whether any work is needed, drives the
//! page packers, and emits PNGs and manifests. In split mode every immediate
//! subdirectory of the first directory input becomes its own sub-build whose
//! manifests are stitched into one aggregate document at the end.

use crate::binary;
use crate::bitmap::Bitmap;
use crate::config::Config;
use crate::error::{CrunchError, Result};
use crate::hash;
use crate::manifest;
use crate::packer::Packer;
use crate::timing;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};
use walkdir::WalkDir;

/// What a build (or sub-build) did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    /// New pages and manifests were written.
    Packed,
    /// The stored hash matched; outputs were left untouched.
    Unchanged,
}

/// Runs one full build according to `cfg`.
#[instrument(skip_all, fields(name = %cfg.name))]
pub fn pack_atlas(cfg: &Config) -> Result<BuildOutcome> {
    cfg.validate()?;
    if cfg.split {
        split_build(cfg)
    } else {
        single_build(cfg, &cfg.name, "", &cfg.inputs)
    }
}

fn single_build(cfg: &Config, name: &str, prefix: &str, inputs: &[PathBuf]) -> Result<BuildOutcome> {
    // Hash the invocation and every input; extension-less inputs are
    // directories and get a recursive png walk.
    timing::start("hashing");
    let mut new_hash = 0u64;
    for tok in &cfg.args {
        hash::hash_string(&mut new_hash, tok);
    }
    for input in inputs {
        if input.extension().is_some() {
            hash::hash_file(&mut new_hash, input, cfg.check_time)?;
        } else {
            hash::hash_files(&mut new_hash, input, cfg.check_time)?;
        }
    }
    timing::stop("hashing");
    debug!(hash = new_hash, "computed input hash");

    let hash_path = cfg.out_dir.join(format!("{name}.hash"));
    if let Some(old_hash) = hash::load_hash(&hash_path) {
        if !cfg.force && old_hash == new_hash {
            println!("atlas is unchanged: {name}");
            return Ok(BuildOutcome::Unchanged);
        }
    }

    remove_stale_outputs(cfg, name);

    if cfg.verbose {
        println!("loading images...");
    }
    timing::start("loading");
    let mut arena: Vec<Bitmap> = Vec::new();
    for input in inputs {
        if input.extension().is_some() {
            load_file(cfg, input, prefix, &mut arena)?;
        } else {
            load_dir(cfg, input, prefix, &mut arena)?;
        }
    }
    timing::stop("loading");
    debug!(count = arena.len(), "loaded bitmaps");

    // Stable ascending area sort; the packer consumes from the back.
    let mut queue: Vec<usize> = (0..arena.len()).collect();
    queue.sort_by_key(|&i| arena[i].width() as u64 * arena[i].height() as u64);

    timing::start("packing");
    let mut packers: Vec<Packer> = Vec::new();
    while !queue.is_empty() {
        if cfg.verbose {
            println!("packing {} images...", queue.len());
        }
        let mut page = Packer::new(cfg.size, cfg.size, cfg.pad);
        page.pack(&mut queue, &arena, cfg);
        if page.bitmaps.is_empty() {
            let back = *queue.last().expect("queue is non-empty when a page is empty");
            return Err(CrunchError::PackingImpossible {
                name: arena[back].name.clone(),
            });
        }
        if cfg.verbose {
            println!(
                "finished packing: {}{} ({} x {})",
                name,
                packers.len(),
                page.width,
                page.height
            );
        }
        packers.push(page);
    }
    timing::stop("packing");

    let page_name = |i: usize| -> String {
        if packers.len() == 1 && cfg.nozero {
            name.to_string()
        } else {
            format!("{name}{i}")
        }
    };

    timing::start("saving png");
    for (i, page) in packers.iter().enumerate() {
        let path = cfg.out_dir.join(format!("{}.png", page_name(i)));
        if cfg.verbose {
            println!("writing png: {}", path.display());
        }
        page.save_png(&path, &arena)?;
    }
    timing::stop("saving png");

    if cfg.binary {
        timing::start("saving bin");
        write_binary_manifest(cfg, name, &page_name, &packers, &arena)?;
        timing::stop("saving bin");
    }
    if cfg.xml {
        timing::start("saving xml");
        write_xml_manifest(cfg, name, &page_name, &packers, &arena)?;
        timing::stop("saving xml");
    }
    if cfg.json {
        timing::start("saving json");
        write_json_manifest(cfg, name, &page_name, &packers, &arena)?;
        timing::stop("saving json");
    }

    hash::save_hash(&hash_path, new_hash)?;
    Ok(BuildOutcome::Packed)
}

/// Deletes every output a previous run with this name could have produced,
/// so a failed build never leaves a stale manifest behind.
fn remove_stale_outputs(cfg: &Config, name: &str) {
    let mut stale: Vec<PathBuf> = ["hash", "bin", "xml", "json"]
        .iter()
        .map(|ext| cfg.out_dir.join(format!("{name}.{ext}")))
        .collect();
    for i in 0..16 {
        stale.push(cfg.out_dir.join(format!("{name}{i}.png")));
    }
    if cfg.nozero {
        stale.push(cfg.out_dir.join(format!("{name}.png")));
    }
    for path in stale {
        let _ = fs::remove_file(path);
    }
}

fn load_file(cfg: &Config, path: &Path, prefix: &str, arena: &mut Vec<Bitmap>) -> Result<()> {
    if cfg.verbose {
        println!("\t{}", path.display());
    }
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    arena.push(Bitmap::load(
        path,
        format!("{prefix}{stem}"),
        cfg.premultiply,
        cfg.trim,
    )?);
    Ok(())
}

fn load_dir(cfg: &Config, root: &Path, prefix: &str, arena: &mut Vec<Bitmap>) -> Result<()> {
    for entry in WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !entry.file_type().is_file() || !path.extension().is_some_and(|e| e == "png") {
            continue;
        }
        if cfg.verbose {
            println!("\t{}", path.display());
        }
        let rel = path.strip_prefix(root).unwrap_or(path);
        arena.push(Bitmap::load(
            path,
            format!("{prefix}{}", atlas_key(rel)),
            cfg.premultiply,
            cfg.trim,
        )?);
    }
    Ok(())
}

/// Atlas-path key for a file relative to its input root: subdirectory
/// segments joined by `/`, extension stripped.
fn atlas_key(rel: &Path) -> String {
    rel.with_extension("")
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn write_binary_manifest(
    cfg: &Config,
    name: &str,
    page_name: &dyn Fn(usize) -> String,
    packers: &[Packer],
    arena: &[Bitmap],
) -> Result<()> {
    let path = cfg.out_dir.join(format!("{name}.bin"));
    if cfg.verbose {
        println!("writing bin: {}", path.display());
    }
    let mut out = BufWriter::new(File::create(&path)?);
    // Sub-builds write bodies only; the stitcher adds the one header.
    if !cfg.split {
        manifest::write_bin_header(&mut out, cfg.trim, cfg.rotate, cfg.binstr)?;
    }
    binary::write_i16(&mut out, packers.len() as i16)?;
    for (i, page) in packers.iter().enumerate() {
        manifest::write_bin_page(
            &mut out,
            &page_name(i),
            page,
            arena,
            cfg.trim,
            cfg.rotate,
            cfg.binstr,
        )?;
    }
    out.flush()?;
    Ok(())
}

fn write_xml_manifest(
    cfg: &Config,
    name: &str,
    page_name: &dyn Fn(usize) -> String,
    packers: &[Packer],
    arena: &[Bitmap],
) -> Result<()> {
    let path = cfg.out_dir.join(format!("{name}.xml"));
    if cfg.verbose {
        println!("writing xml: {}", path.display());
    }
    let mut out = BufWriter::new(File::create(&path)?);
    if !cfg.split {
        out.write_all(manifest::xml_wrapper_open(cfg.trim, cfg.rotate).as_bytes())?;
    }
    for (i, page) in packers.iter().enumerate() {
        manifest::write_xml_page(&mut out, &page_name(i), page, arena, cfg.trim, cfg.rotate)?;
    }
    if !cfg.split {
        out.write_all(manifest::XML_WRAPPER_CLOSE.as_bytes())?;
    }
    out.flush()?;
    Ok(())
}

fn write_json_manifest(
    cfg: &Config,
    name: &str,
    page_name: &dyn Fn(usize) -> String,
    packers: &[Packer],
    arena: &[Bitmap],
) -> Result<()> {
    let path = cfg.out_dir.join(format!("{name}.json"));
    if cfg.verbose {
        println!("writing json: {}", path.display());
    }
    let mut out = BufWriter::new(File::create(&path)?);
    if !cfg.split {
        out.write_all(manifest::json_wrapper_open(cfg.trim, cfg.rotate).as_bytes())?;
    }
    for (i, page) in packers.iter().enumerate() {
        manifest::write_json_page(&mut out, &page_name(i), page, arena, cfg.trim, cfg.rotate)?;
        if i + 1 < packers.len() {
            out.write_all(b",\n")?;
        }
    }
    if !cfg.split {
        out.write_all(manifest::JSON_WRAPPER_CLOSE.as_bytes())?;
    }
    out.flush()?;
    Ok(())
}

fn split_build(cfg: &Config) -> Result<BuildOutcome> {
    let root = cfg
        .inputs
        .iter()
        .find(|p| p.extension().is_none())
        .ok_or_else(|| {
            CrunchError::InvalidConfig("split mode requires a directory input".into())
        })?;

    let mut subdirs: Vec<PathBuf> = fs::read_dir(root)?
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .map(|e| e.path())
        .collect();
    subdirs.sort();
    debug!(count = subdirs.len(), "split build over subdirectories");

    let mut any_packed = false;
    for sub in &subdirs {
        let sub_name = sub
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = format!("{}_{}", cfg.name, sub_name);
        let prefix = format!("{sub_name}/");
        let label = format!("{sub_name}/");
        timing::start(&label);
        let outcome = single_build(cfg, &name, &prefix, std::slice::from_ref(sub))?;
        timing::stop(&label);
        if outcome == BuildOutcome::Packed {
            any_packed = true;
        }
    }

    if !any_packed {
        println!("atlas is unchanged: {}", cfg.name);
        return Ok(BuildOutcome::Unchanged);
    }

    // The aggregate documents are rebuilt from whatever per-subtree parts
    // exist, including parts from sub-builds skipped this run.
    for ext in ["bin", "xml", "json"] {
        let _ = fs::remove_file(cfg.out_dir.join(format!("{}.{ext}", cfg.name)));
    }
    if cfg.binary {
        stitch_binary(cfg)?;
    }
    if cfg.xml {
        stitch_xml(cfg)?;
    }
    if cfg.json {
        stitch_json(cfg)?;
    }
    Ok(BuildOutcome::Packed)
}

/// Per-subtree output files for one format, in sorted order.
fn scan_parts(out_dir: &Path, name: &str, ext: &str) -> Result<Vec<PathBuf>> {
    let needle = format!("{name}_");
    let mut parts: Vec<PathBuf> = fs::read_dir(out_dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.is_file()
                && p.extension().is_some_and(|e| e == ext)
                && p.file_stem()
                    .and_then(|s| s.to_str())
                    .is_some_and(|s| s.starts_with(&needle))
        })
        .collect();
    parts.sort();
    Ok(parts)
}

fn stitch_binary(cfg: &Config) -> Result<()> {
    let parts = scan_parts(&cfg.out_dir, &cfg.name, "bin")?;
    let path = cfg.out_dir.join(format!("{}.bin", cfg.name));
    if cfg.verbose {
        println!("writing bin: {}", path.display());
    }
    // Each part leads with its page count; the stitched document gets one
    // header and the summed count.
    let mut total: i16 = 0;
    let mut bodies: Vec<Vec<u8>> = Vec::new();
    for part in &parts {
        let bytes = fs::read(part)?;
        if bytes.len() < 2 {
            continue;
        }
        total += i16::from_le_bytes([bytes[0], bytes[1]]);
        bodies.push(bytes[2..].to_vec());
    }
    let mut out = BufWriter::new(File::create(&path)?);
    manifest::write_bin_header(&mut out, cfg.trim, cfg.rotate, cfg.binstr)?;
    binary::write_i16(&mut out, total)?;
    for body in &bodies {
        out.write_all(body)?;
    }
    out.flush()?;
    Ok(())
}

fn stitch_xml(cfg: &Config) -> Result<()> {
    let parts = scan_parts(&cfg.out_dir, &cfg.name, "xml")?;
    let path = cfg.out_dir.join(format!("{}.xml", cfg.name));
    if cfg.verbose {
        println!("writing xml: {}", path.display());
    }
    let mut doc = manifest::xml_wrapper_open(cfg.trim, cfg.rotate);
    for part in &parts {
        doc.push_str(&fs::read_to_string(part)?);
    }
    doc.push_str(manifest::XML_WRAPPER_CLOSE);
    fs::write(&path, doc)?;
    Ok(())
}

fn stitch_json(cfg: &Config) -> Result<()> {
    let parts = scan_parts(&cfg.out_dir, &cfg.name, "json")?;
    let path = cfg.out_dir.join(format!("{}.json", cfg.name));
    if cfg.verbose {
        println!("writing json: {}", path.display());
    }
    let mut bodies: Vec<String> = Vec::new();
    for part in &parts {
        let body = fs::read_to_string(part)?;
        if !body.trim().is_empty() {
            bodies.push(body);
        }
    }
    let mut doc = manifest::json_wrapper_open(cfg.trim, cfg.rotate);
    doc.push_str(&bodies.join(",\n"));
    doc.push_str(manifest::JSON_WRAPPER_CLOSE);
    fs::write(&path, doc)?;
    Ok(())
}

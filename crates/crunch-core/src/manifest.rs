//! Atlas manifest emitters.
//!
//! Each function writes the *body* for one packed page; the surrounding
//! document (the `<atlas>` wrapper, the JSON `textures` object, the binary
//! header and page count) belongs to the build controller, which lets split
//! builds stitch per-subtree bodies together by concatenation.

use crate::binary::{write_i16, write_str, write_u8};
use crate::bitmap::Bitmap;
use crate::config::StringEncoding;
use crate::packer::Packer;
use std::io::{self, Write};

/// Leading bytes of every binary manifest.
pub const BIN_MAGIC: &[u8; 4] = b"crch";
/// Wire format version.
pub const BIN_VERSION: i16 = 0;

/// Writes the binary manifest header: magic, version, trim/rotate flags and
/// the string encoding id. The page count follows separately.
pub fn write_bin_header<W: Write>(
    out: &mut W,
    trim: bool,
    rotate: bool,
    enc: StringEncoding,
) -> io::Result<()> {
    out.write_all(BIN_MAGIC)?;
    write_i16(out, BIN_VERSION)?;
    write_u8(out, trim as u8)?;
    write_u8(out, rotate as u8)?;
    write_u8(out, enc.wire_id())
}

/// Writes one page as a binary texture record.
pub fn write_bin_page<W: Write>(
    out: &mut W,
    page_name: &str,
    page: &Packer,
    arena: &[Bitmap],
    trim: bool,
    rotate: bool,
    enc: StringEncoding,
) -> io::Result<()> {
    write_str(out, page_name, enc)?;
    write_i16(out, page.bitmaps.len() as i16)?;
    for (i, &bi) in page.bitmaps.iter().enumerate() {
        let b = &arena[bi];
        let p = &page.points[i];
        write_str(out, &b.name, enc)?;
        write_i16(out, p.x as i16)?;
        write_i16(out, p.y as i16)?;
        write_i16(out, b.width() as i16)?;
        write_i16(out, b.height() as i16)?;
        if trim {
            write_i16(out, b.frame_x as i16)?;
            write_i16(out, b.frame_y as i16)?;
            write_i16(out, b.frame_w as i16)?;
            write_i16(out, b.frame_h as i16)?;
        }
        if rotate {
            write_u8(out, p.rotated as u8)?;
        }
    }
    Ok(())
}

/// Opening of the XML document, including the build-wide trim/rotate flags.
pub fn xml_wrapper_open(trim: bool, rotate: bool) -> String {
    format!("<atlas>\n<trim>{trim}</trim>\n<rotate>{rotate}</rotate>\n")
}

pub const XML_WRAPPER_CLOSE: &str = "</atlas>";

/// Writes one page as a `<tex>` element.
pub fn write_xml_page<W: Write>(
    out: &mut W,
    page_name: &str,
    page: &Packer,
    arena: &[Bitmap],
    trim: bool,
    rotate: bool,
) -> io::Result<()> {
    writeln!(out, "\t<tex n=\"{page_name}\">")?;
    for (i, &bi) in page.bitmaps.iter().enumerate() {
        let b = &arena[bi];
        let p = &page.points[i];
        write!(
            out,
            "\t\t<img n=\"{}\" x=\"{}\" y=\"{}\" w=\"{}\" h=\"{}\" ",
            b.name,
            p.x,
            p.y,
            b.width(),
            b.height()
        )?;
        if trim {
            write!(
                out,
                "fx=\"{}\" fy=\"{}\" fw=\"{}\" fh=\"{}\" ",
                b.frame_x, b.frame_y, b.frame_w, b.frame_h
            )?;
        }
        if rotate {
            write!(out, "r=\"{}\" ", p.rotated as u8)?;
        }
        writeln!(out, "/>")?;
    }
    writeln!(out, "\t</tex>")
}

/// Opening of the JSON document, including the build-wide trim/rotate flags.
pub fn json_wrapper_open(trim: bool, rotate: bool) -> String {
    format!("{{\n\t\"trim\":{trim},\n\t\"rotate\":{rotate},\n\t\"textures\":[\n")
}

pub const JSON_WRAPPER_CLOSE: &str = "\n\t]\n}";

/// Writes one page as a JSON object. No trailing comma or newline; the
/// caller joins pages with `",\n"`.
pub fn write_json_page<W: Write>(
    out: &mut W,
    page_name: &str,
    page: &Packer,
    arena: &[Bitmap],
    trim: bool,
    rotate: bool,
) -> io::Result<()> {
    writeln!(out, "\t\t{{")?;
    writeln!(out, "\t\t\t\"name\":\"{page_name}\",")?;
    writeln!(out, "\t\t\t\"images\":[")?;
    let n = page.bitmaps.len();
    for (i, &bi) in page.bitmaps.iter().enumerate() {
        let b = &arena[bi];
        let p = &page.points[i];
        write!(
            out,
            "\t\t\t\t{{ \"n\":\"{}\", \"x\":{}, \"y\":{}, \"w\":{}, \"h\":{}",
            b.name,
            p.x,
            p.y,
            b.width(),
            b.height()
        )?;
        if trim {
            write!(
                out,
                ", \"fx\":{}, \"fy\":{}, \"fw\":{}, \"fh\":{}",
                b.frame_x, b.frame_y, b.frame_w, b.frame_h
            )?;
        }
        if rotate {
            write!(out, ", \"r\":{}", p.rotated)?;
        }
        write!(out, " }}")?;
        if i + 1 < n {
            write!(out, ",")?;
        }
        writeln!(out)?;
    }
    writeln!(out, "\t\t\t]")?;
    write!(out, "\t\t}}")
}

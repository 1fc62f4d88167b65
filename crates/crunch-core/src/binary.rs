//! Fixed-width little-endian primitives for the binary manifest.

use crate::config::StringEncoding;
use std::io::{self, Read, Write};

pub fn write_i16<W: Write>(w: &mut W, v: i16) -> io::Result<()> {
    w.write_all(&v.to_le_bytes())
}

pub fn write_u8<W: Write>(w: &mut W, v: u8) -> io::Result<()> {
    w.write_all(&[v])
}

/// Writes `s` using the selected string encoding.
pub fn write_str<W: Write>(w: &mut W, s: &str, enc: StringEncoding) -> io::Result<()> {
    match enc {
        StringEncoding::NullTerminated => {
            w.write_all(s.as_bytes())?;
            write_u8(w, 0)
        }
        StringEncoding::LengthPrefixed => {
            write_i16(w, s.len() as i16)?;
            w.write_all(s.as_bytes())
        }
        StringEncoding::SevenBitPrefixed => {
            // 7 bits per byte, LSB first, high bit set on all but the last.
            let mut v = s.len() as u32;
            while v > 0x7F {
                write_u8(w, (v as u8) | 0x80)?;
                v >>= 7;
            }
            write_u8(w, v as u8)?;
            w.write_all(s.as_bytes())
        }
    }
}

pub fn read_i16<R: Read>(r: &mut R) -> io::Result<i16> {
    let mut buf = [0u8; 2];
    r.read_exact(&mut buf)?;
    Ok(i16::from_le_bytes(buf))
}

pub fn read_u8<R: Read>(r: &mut R) -> io::Result<u8> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf)?;
    Ok(buf[0])
}

/// Reads a string written by [`write_str`] with the same encoding.
pub fn read_str<R: Read>(r: &mut R, enc: StringEncoding) -> io::Result<String> {
    let bytes = match enc {
        StringEncoding::NullTerminated => {
            let mut bytes = Vec::new();
            loop {
                let b = read_u8(r)?;
                if b == 0 {
                    break;
                }
                bytes.push(b);
            }
            bytes
        }
        StringEncoding::LengthPrefixed => {
            let len = read_i16(r)?.max(0) as usize;
            let mut bytes = vec![0u8; len];
            r.read_exact(&mut bytes)?;
            bytes
        }
        StringEncoding::SevenBitPrefixed => {
            let mut len: u32 = 0;
            let mut shift = 0;
            loop {
                let b = read_u8(r)?;
                len |= ((b & 0x7F) as u32) << shift;
                if b & 0x80 == 0 {
                    break;
                }
                shift += 7;
            }
            let mut bytes = vec![0u8; len as usize];
            r.read_exact(&mut bytes)?;
            bytes
        }
    };
    String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

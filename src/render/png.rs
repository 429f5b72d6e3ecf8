//! render/png: minimal PNG codec for non-interlaced images.
//!
//! Encoder: 8-bit RGBA only, filter type 0 on every scanline.
//! Decoder: every standard color type and bit depth (gray 1/2/4/8/16, RGB 8/16,
//! palette 1/2/4/8 with optional tRNS, gray+alpha 8/16, RGBA 8/16), all five
//! scanline filters, output always 8-bit RGBA. Interlaced (Adam7) images are
//! rejected.
//!
//! Chunk framing: [len u32 BE][type 4][data][crc32(type+data) u32 BE].

use anyhow::{anyhow, Context, Result};
use byteorder::{BigEndian, ByteOrder};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::{Read, Write};

pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

/// Decoding refuses anything larger (64 Mpx).
pub const MAX_DECODE_PIXELS: u64 = 1 << 26;

const COLOR_GRAY: u8 = 0;
const COLOR_RGB: u8 = 2;
const COLOR_PALETTE: u8 = 3;
const COLOR_GRAY_ALPHA: u8 = 4;
const COLOR_RGBA: u8 = 6;

/// Decoded image, always 4 bytes per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

#[derive(Debug, Clone, Copy)]
struct Header {
    width: u32,
    height: u32,
    depth: u8,
    color: u8,
}

impl Header {
    fn parse(data: &[u8]) -> Result<Self> {
        if data.len() != 13 {
            return Err(anyhow!("bad IHDR length {}", data.len()));
        }
        let width = BigEndian::read_u32(&data[0..4]);
        let height = BigEndian::read_u32(&data[4..8]);
        let (depth, color, interlace) = (data[8], data[9], data[12]);

        if width == 0 || height == 0 {
            return Err(anyhow!("empty image {}x{}", width, height));
        }
        if width as u64 * height as u64 > MAX_DECODE_PIXELS {
            return Err(anyhow!(
                "image {}x{} exceeds {} pixels",
                width,
                height,
                MAX_DECODE_PIXELS
            ));
        }
        let depth_ok = match color {
            COLOR_GRAY => matches!(depth, 1 | 2 | 4 | 8 | 16),
            COLOR_PALETTE => matches!(depth, 1 | 2 | 4 | 8),
            COLOR_RGB | COLOR_GRAY_ALPHA | COLOR_RGBA => matches!(depth, 8 | 16),
            other => return Err(anyhow!("unsupported color type {}", other)),
        };
        if !depth_ok {
            return Err(anyhow!("invalid bit depth {} for color type {}", depth, color));
        }
        if interlace != 0 {
            return Err(anyhow!("interlaced PNG not supported"));
        }
        Ok(Self {
            width,
            height,
            depth,
            color,
        })
    }

    fn channels(&self) -> usize {
        match self.color {
            COLOR_GRAY | COLOR_PALETTE => 1,
            COLOR_GRAY_ALPHA => 2,
            COLOR_RGB => 3,
            _ => 4,
        }
    }

    /// Bytes per scanline, without the filter byte.
    fn stride(&self) -> usize {
        let bits = self.width as usize * self.channels() * self.depth as usize;
        (bits + 7) / 8
    }

    /// Filter unit: bytes per complete pixel, at least 1.
    fn filter_bpp(&self) -> usize {
        ((self.channels() * self.depth as usize) / 8).max(1)
    }
}

fn chunk_crc(kind: &[u8; 4], data: &[u8]) -> u32 {
    let mut h = crc32fast::Hasher::new();
    h.update(kind);
    h.update(data);
    h.finalize()
}

fn write_chunk(out: &mut Vec<u8>, kind: &[u8; 4], data: &[u8]) {
    let mut tmp4 = [0u8; 4];
    BigEndian::write_u32(&mut tmp4, data.len() as u32);
    out.extend_from_slice(&tmp4);
    out.extend_from_slice(kind);
    out.extend_from_slice(data);
    BigEndian::write_u32(&mut tmp4, chunk_crc(kind, data));
    out.extend_from_slice(&tmp4);
}

pub fn encode_rgba(width: u32, height: u32, rgba: &[u8]) -> Result<Vec<u8>> {
    let stride = width as usize * 4;
    if rgba.len() != stride * height as usize {
        return Err(anyhow!(
            "rgba buffer is {} B, expected {} B for {}x{}",
            rgba.len(),
            stride * height as usize,
            width,
            height
        ));
    }

    let mut ihdr = [0u8; 13];
    BigEndian::write_u32(&mut ihdr[0..4], width);
    BigEndian::write_u32(&mut ihdr[4..8], height);
    ihdr[8] = 8; // bit depth
    ihdr[9] = COLOR_RGBA;
    // compression, filter, interlace = 0

    let mut z = ZlibEncoder::new(Vec::new(), Compression::default());
    for row in rgba.chunks_exact(stride) {
        z.write_all(&[0u8])?;
        z.write_all(row)?;
    }
    let idat = z.finish().context("zlib finish")?;

    let mut out = Vec::with_capacity(idat.len() + 64);
    out.extend_from_slice(&PNG_SIGNATURE);
    write_chunk(&mut out, b"IHDR", &ihdr);
    write_chunk(&mut out, b"IDAT", &idat);
    write_chunk(&mut out, b"IEND", &[]);
    Ok(out)
}

/// Transparency from a tRNS chunk.
#[derive(Debug)]
enum Trns {
    None,
    /// Alpha per palette entry; missing entries are opaque.
    Palette(Vec<u8>),
    /// Raw sample value(s) that become fully transparent.
    Key([u16; 3]),
}

pub fn decode_rgba(bytes: &[u8]) -> Result<RgbaImage> {
    if bytes.len() < PNG_SIGNATURE.len() || bytes[..8] != PNG_SIGNATURE {
        return Err(anyhow!("not a PNG file"));
    }

    let mut pos = 8usize;
    let mut header: Option<Header> = None;
    let mut palette: Vec<[u8; 3]> = Vec::new();
    let mut trns_raw: Option<Vec<u8>> = None;
    let mut idat: Vec<u8> = Vec::new();
    let mut seen_end = false;

    while pos + 12 <= bytes.len() {
        let len = BigEndian::read_u32(&bytes[pos..pos + 4]) as usize;
        let kind: [u8; 4] = [bytes[pos + 4], bytes[pos + 5], bytes[pos + 6], bytes[pos + 7]];
        let data_start = pos + 8;
        let data_end = data_start
            .checked_add(len)
            .filter(|&e| e + 4 <= bytes.len())
            .ok_or_else(|| anyhow!("truncated PNG chunk {}", String::from_utf8_lossy(&kind)))?;
        let data = &bytes[data_start..data_end];
        let crc = BigEndian::read_u32(&bytes[data_end..data_end + 4]);
        if crc != chunk_crc(&kind, data) {
            return Err(anyhow!("CRC mismatch in chunk {}", String::from_utf8_lossy(&kind)));
        }
        pos = data_end + 4;

        match &kind {
            b"IHDR" => header = Some(Header::parse(data)?),
            b"PLTE" => {
                if data.is_empty() || data.len() % 3 != 0 || data.len() > 256 * 3 {
                    return Err(anyhow!("bad PLTE length {}", data.len()));
                }
                palette = data.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect();
            }
            b"tRNS" => trns_raw = Some(data.to_vec()),
            b"IDAT" => idat.extend_from_slice(data),
            b"IEND" => {
                seen_end = true;
                break;
            }
            _ => {}
        }
    }

    let hdr = header.ok_or_else(|| anyhow!("missing IHDR"))?;
    if !seen_end {
        return Err(anyhow!("missing IEND"));
    }
    if hdr.color == COLOR_PALETTE && palette.is_empty() {
        return Err(anyhow!("palette image without PLTE"));
    }
    let trns = parse_trns(&hdr, trns_raw.as_deref())?;

    // sizes are bounded by MAX_DECODE_PIXELS, so plain usize math cannot overflow
    let stride = hdr.stride();
    let expected = (stride + 1) * hdr.height as usize;

    // grows with the actual stream, not with what the header claims
    let mut raw = Vec::new();
    ZlibDecoder::new(&idat[..])
        .take(expected as u64)
        .read_to_end(&mut raw)
        .context("inflate IDAT")?;
    if raw.len() < expected {
        return Err(anyhow!("IDAT too short: {} B, expected {} B", raw.len(), expected));
    }

    let plain = unfilter(&raw, stride, hdr.filter_bpp(), hdr.height as usize)?;

    let mut pixels = Vec::with_capacity(hdr.width as usize * hdr.height as usize * 4);
    for row in plain.chunks_exact(stride) {
        expand_row(&hdr, row, &palette, &trns, &mut pixels)?;
    }

    Ok(RgbaImage {
        width: hdr.width,
        height: hdr.height,
        pixels,
    })
}

fn parse_trns(hdr: &Header, data: Option<&[u8]>) -> Result<Trns> {
    let Some(data) = data else {
        return Ok(Trns::None);
    };
    match hdr.color {
        COLOR_PALETTE => Ok(Trns::Palette(data.to_vec())),
        COLOR_GRAY if data.len() == 2 => {
            let g = BigEndian::read_u16(data);
            Ok(Trns::Key([g, g, g]))
        }
        COLOR_RGB if data.len() == 6 => Ok(Trns::Key([
            BigEndian::read_u16(&data[0..2]),
            BigEndian::read_u16(&data[2..4]),
            BigEndian::read_u16(&data[4..6]),
        ])),
        _ => Err(anyhow!(
            "bad tRNS chunk ({} B) for color type {}",
            data.len(),
            hdr.color
        )),
    }
}

/// i-th sample of a scanline at the given bit depth.
#[inline]
fn sample(row: &[u8], i: usize, depth: u8) -> u16 {
    match depth {
        16 => BigEndian::read_u16(&row[i * 2..i * 2 + 2]),
        8 => row[i] as u16,
        _ => {
            let bit = i * depth as usize;
            let shift = 8 - depth as usize - bit % 8;
            let mask = (1u16 << depth) - 1;
            (row[bit / 8] as u16 >> shift) & mask
        }
    }
}

/// Scale a sample of `depth` bits to 8 bits.
#[inline]
fn to_u8(v: u16, depth: u8) -> u8 {
    match depth {
        16 => (v >> 8) as u8,
        8 => v as u8,
        _ => (v as u32 * 255 / ((1u32 << depth) - 1)) as u8,
    }
}

fn expand_row(
    hdr: &Header,
    row: &[u8],
    palette: &[[u8; 3]],
    trns: &Trns,
    out: &mut Vec<u8>,
) -> Result<()> {
    let d = hdr.depth;
    let n = hdr.channels();
    for x in 0..hdr.width as usize {
        let s = |c: usize| sample(row, x * n + c, d);
        match hdr.color {
            COLOR_PALETTE => {
                let idx = s(0) as usize;
                let rgb = palette
                    .get(idx)
                    .ok_or_else(|| anyhow!("palette index {} out of range ({})", idx, palette.len()))?;
                let a = match trns {
                    Trns::Palette(alpha) => alpha.get(idx).copied().unwrap_or(255),
                    _ => 255,
                };
                out.extend_from_slice(&[rgb[0], rgb[1], rgb[2], a]);
            }
            COLOR_GRAY => {
                let g = s(0);
                let a = match trns {
                    Trns::Key(k) if k[0] == g => 0,
                    _ => 255,
                };
                let g = to_u8(g, d);
                out.extend_from_slice(&[g, g, g, a]);
            }
            COLOR_GRAY_ALPHA => {
                let g = to_u8(s(0), d);
                out.extend_from_slice(&[g, g, g, to_u8(s(1), d)]);
            }
            COLOR_RGB => {
                let (r, g, b) = (s(0), s(1), s(2));
                let a = match trns {
                    Trns::Key(k) if *k == [r, g, b] => 0,
                    _ => 255,
                };
                out.extend_from_slice(&[to_u8(r, d), to_u8(g, d), to_u8(b, d), a]);
            }
            _ => {
                out.extend_from_slice(&[to_u8(s(0), d), to_u8(s(1), d), to_u8(s(2), d), to_u8(s(3), d)]);
            }
        }
    }
    Ok(())
}

fn unfilter(raw: &[u8], stride: usize, bpp: usize, rows: usize) -> Result<Vec<u8>> {
    let mut out = vec![0u8; stride * rows];
    for r in 0..rows {
        let line = &raw[r * (stride + 1)..(r + 1) * (stride + 1)];
        let filter = line[0];
        let src = &line[1..];
        let (done, rest) = out.split_at_mut(r * stride);
        let prev: Option<&[u8]> = if r == 0 { None } else { Some(&done[(r - 1) * stride..]) };
        let cur = &mut rest[..stride];

        for i in 0..stride {
            let a = if i >= bpp { cur[i - bpp] as i16 } else { 0 };
            let b = prev.map(|p| p[i] as i16).unwrap_or(0);
            let c = if i >= bpp {
                prev.map(|p| p[i - bpp] as i16).unwrap_or(0)
            } else {
                0
            };
            let pred = match filter {
                0 => 0,
                1 => a,
                2 => b,
                3 => (a + b) / 2,
                4 => paeth(a, b, c),
                other => return Err(anyhow!("bad filter type {} on row {}", other, r)),
            };
            cur[i] = src[i].wrapping_add(pred as u8);
        }
    }
    Ok(out)
}

#[inline]
fn paeth(a: i16, b: i16, c: i16) -> i16 {
    let p = a + b - c;
    let pa = (p - a).abs();
    let pb = (p - b).abs();
    let pc = (p - c).abs();
    if pa <= pb && pa <= pc {
        a
    } else if pb <= pc {
        b
    } else {
        c
    }
}

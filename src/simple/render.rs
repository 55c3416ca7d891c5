//! Raster sketch output.
//!
//! Draws atoms and bonds onto an RGB canvas from the molecule's 2D
//! coordinates and encodes it as a PNG. The encoder writes stored
//! (uncompressed) deflate blocks, which every PNG reader accepts and
//! which keeps the output byte-exact across platforms. GIF and JPEG are
//! not produced by this engine.

use petgraph::graph::NodeIndex;

use crate::engine::{ImageFormat, RenderOptions};
use crate::error::EngineError;
use crate::molecule::Molecule;

const MARGIN_FRACTION: f64 = 0.1;

/// 64M pixels, 192 MiB of RGB data.
const MAX_PIXELS: usize = 1 << 26;

pub fn render(mol: &Molecule, options: &RenderOptions) -> Result<Vec<u8>, EngineError> {
    if options.format != ImageFormat::Png {
        return Err(EngineError::Unsupported {
            msg: format!("image format {}", options.format.as_str()),
        });
    }
    if options.width == 0 || options.height == 0 {
        return Err(EngineError::Render {
            msg: "zero-sized canvas".to_string(),
        });
    }
    if options.width as usize * options.height as usize > MAX_PIXELS {
        return Err(EngineError::Render {
            msg: format!("canvas {}x{} too large", options.width, options.height),
        });
    }

    let mut canvas = Canvas::new(options.width, options.height, options.background_rgb);
    draw(mol, &mut canvas);
    Ok(encode_png(&canvas))
}

struct Canvas {
    width: u32,
    height: u32,
    /// RGB, row-major
    pixels: Vec<u8>,
}

impl Canvas {
    fn new(width: u32, height: u32, background_rgb: u32) -> Self {
        let r = (background_rgb >> 16) as u8;
        let g = (background_rgb >> 8) as u8;
        let b = background_rgb as u8;
        let count = width as usize * height as usize;
        let mut pixels = Vec::with_capacity(count * 3);
        for _ in 0..count {
            pixels.extend_from_slice(&[r, g, b]);
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    fn put(&mut self, x: i64, y: i64, rgb: [u8; 3]) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let at = (y as usize * self.width as usize + x as usize) * 3;
        self.pixels[at..at + 3].copy_from_slice(&rgb);
    }

    fn line(&mut self, from: (i64, i64), to: (i64, i64), rgb: [u8; 3]) {
        // Bresenham
        let (mut x0, mut y0) = from;
        let (x1, y1) = to;
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.put(x0, y0, rgb);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    fn blot(&mut self, center: (i64, i64), rgb: [u8; 3]) {
        for dy in -1..=1 {
            for dx in -1..=1 {
                self.put(center.0 + dx, center.1 + dy, rgb);
            }
        }
    }
}

const BOND_COLOR: [u8; 3] = [32, 32, 32];

fn element_color(atomic_num: u8) -> [u8; 3] {
    match atomic_num {
        7 => [48, 80, 248],  // N
        8 => [255, 13, 13],  // O
        16 => [255, 200, 50], // S
        9 | 17 => [31, 240, 31], // F, Cl
        35 => [166, 41, 41], // Br
        15 => [255, 128, 0], // P
        _ => [64, 64, 64],
    }
}

fn draw(mol: &Molecule, canvas: &mut Canvas) {
    let placed: Vec<(NodeIndex, [f64; 2])> = mol
        .atoms()
        .filter_map(|n| mol.position(n).map(|p| (n, p)))
        .collect();
    if placed.is_empty() {
        return;
    }

    let mut min = [f64::INFINITY, f64::INFINITY];
    let mut max = [f64::NEG_INFINITY, f64::NEG_INFINITY];
    for &(_, p) in &placed {
        for d in 0..2 {
            min[d] = min[d].min(p[d]);
            max[d] = max[d].max(p[d]);
        }
    }
    let spread = [(max[0] - min[0]).max(1e-9), (max[1] - min[1]).max(1e-9)];
    let margin = (canvas.width.min(canvas.height) as f64) * MARGIN_FRACTION;
    let avail = [
        canvas.width as f64 - 2.0 * margin,
        canvas.height as f64 - 2.0 * margin,
    ];
    let scale = (avail[0] / spread[0]).min(avail[1] / spread[1]).max(0.0);

    let to_pixel = |p: [f64; 2]| -> (i64, i64) {
        let x = margin + (p[0] - min[0]) * scale + (avail[0] - spread[0] * scale) / 2.0;
        // image y axis points down
        let y = margin + (max[1] - p[1]) * scale + (avail[1] - spread[1] * scale) / 2.0;
        (x.round() as i64, y.round() as i64)
    };

    for e in mol.bonds() {
        if let Some((a, b)) = mol.bond_endpoints(e) {
            match (mol.position(a), mol.position(b)) {
                (Some(pa), Some(pb)) => canvas.line(to_pixel(pa), to_pixel(pb), BOND_COLOR),
                _ => {}
            }
        }
    }
    for &(n, p) in &placed {
        canvas.blot(to_pixel(p), element_color(mol.atom(n).atomic_num));
    }
}

// --- PNG encoding ---

fn encode_png(canvas: &Canvas) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]);

    let mut ihdr = Vec::with_capacity(13);
    ihdr.extend_from_slice(&canvas.width.to_be_bytes());
    ihdr.extend_from_slice(&canvas.height.to_be_bytes());
    // 8-bit, color type 2 (truecolor), deflate, no interlace
    ihdr.extend_from_slice(&[8, 2, 0, 0, 0]);
    push_chunk(&mut out, b"IHDR", &ihdr);

    let row_bytes = canvas.width as usize * 3;
    let mut raw = Vec::with_capacity((row_bytes + 1) * canvas.height as usize);
    for row in canvas.pixels.chunks(row_bytes) {
        raw.push(0); // filter: none
        raw.extend_from_slice(row);
    }
    push_chunk(&mut out, b"IDAT", &zlib_stored(&raw));

    push_chunk(&mut out, b"IEND", &[]);
    out
}

fn push_chunk(out: &mut Vec<u8>, kind: &[u8; 4], data: &[u8]) {
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(kind);
    out.extend_from_slice(data);
    let mut crc = Crc32::new();
    crc.update(kind);
    crc.update(data);
    out.extend_from_slice(&crc.finish().to_be_bytes());
}

/// Zlib stream holding only stored deflate blocks.
fn zlib_stored(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + data.len() / 65535 * 5 + 16);
    out.extend_from_slice(&[0x78, 0x01]);
    let mut chunks = data.chunks(65535).peekable();
    if data.is_empty() {
        out.extend_from_slice(&[0x01, 0x00, 0x00, 0xff, 0xff]);
    }
    while let Some(chunk) = chunks.next() {
        let last = chunks.peek().is_none();
        out.push(if last { 0x01 } else { 0x00 });
        let len = chunk.len() as u16;
        out.extend_from_slice(&len.to_le_bytes());
        out.extend_from_slice(&(!len).to_le_bytes());
        out.extend_from_slice(chunk);
    }
    out.extend_from_slice(&adler32(data).to_be_bytes());
    out
}

fn adler32(data: &[u8]) -> u32 {
    const MOD: u32 = 65521;
    let mut a: u32 = 1;
    let mut b: u32 = 0;
    for &byte in data {
        a = (a + byte as u32) % MOD;
        b = (b + a) % MOD;
    }
    (b << 16) | a
}

struct Crc32 {
    state: u32,
}

impl Crc32 {
    fn new() -> Self {
        Self { state: 0xffff_ffff }
    }

    fn update(&mut self, data: &[u8]) {
        for &byte in data {
            self.state ^= byte as u32;
            for _ in 0..8 {
                let low = self.state & 1;
                self.state >>= 1;
                if low != 0 {
                    self.state ^= 0xedb8_8320;
                }
            }
        }
    }

    fn finish(self) -> u32 {
        self.state ^ 0xffff_ffff
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simple::layout;
    use crate::simple::smiles;

    fn options() -> RenderOptions {
        RenderOptions {
            format: ImageFormat::Png,
            width: 64,
            height: 48,
            background_rgb: 0xffffff,
        }
    }

    fn be_u32(bytes: &[u8]) -> u32 {
        u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    #[test]
    fn emits_valid_png_framing() {
        let mut mol = smiles::parse("CCO").unwrap();
        layout::assign_2d(&mut mol);
        let png = render(&mol, &options()).unwrap();

        assert_eq!(&png[0..8], &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]);
        assert_eq!(&png[12..16], b"IHDR");
        assert_eq!(be_u32(&png[16..20]), 64);
        assert_eq!(be_u32(&png[20..24]), 48);
        assert_eq!(&png[png.len() - 8..png.len() - 4], b"IEND");
    }

    #[test]
    fn crc_matches_known_vector() {
        // CRC-32 of "123456789"
        let mut crc = Crc32::new();
        crc.update(b"123456789");
        assert_eq!(crc.finish(), 0xcbf4_3926);
    }

    #[test]
    fn adler_matches_known_vector() {
        // adler32 of "Wikipedia"
        assert_eq!(adler32(b"Wikipedia"), 0x11e6_0398);
    }

    #[test]
    fn stored_deflate_roundtrip_lengths() {
        let data = vec![7u8; 70000];
        let z = zlib_stored(&data);
        // 2 header + 2 blocks of (5 + payload) + 4 adler
        assert_eq!(z.len(), 2 + 5 + 65535 + 5 + (70000 - 65535) + 4);
        assert_eq!(z[0], 0x78);
        assert_eq!(z[2], 0x00); // first block is not final
    }

    #[test]
    fn background_fills_canvas() {
        let mol = Molecule::new();
        let mut opts = options();
        opts.background_rgb = 0x123456;
        let png = render(&mol, &opts).unwrap();
        // raw scanline data sits uncompressed in the IDAT stored block
        let needle = [0x12u8, 0x34, 0x56, 0x12, 0x34, 0x56];
        assert!(png.windows(6).any(|w| w == needle));
    }

    #[test]
    fn unsupported_formats_are_refused() {
        let mol = Molecule::new();
        for format in [ImageFormat::Gif, ImageFormat::Jpg] {
            let opts = RenderOptions {
                format,
                ..options()
            };
            assert!(matches!(
                render(&mol, &opts),
                Err(EngineError::Unsupported { .. })
            ));
        }
    }

    #[test]
    fn oversized_canvas_is_refused() {
        let mol = Molecule::new();
        let mut opts = options();
        opts.width = 100_000;
        opts.height = 100_000;
        assert!(matches!(
            render(&mol, &opts),
            Err(EngineError::Render { .. })
        ));
    }

    #[test]
    fn drawing_touches_the_canvas() {
        let mut mol = smiles::parse("CCO").unwrap();
        layout::assign_2d(&mut mol);
        let blank = render(&Molecule::new(), &options()).unwrap();
        let drawn = render(&mol, &options()).unwrap();
        assert_ne!(blank, drawn);
    }
}

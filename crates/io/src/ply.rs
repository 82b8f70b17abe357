use bevmap_core::{Colors, PointCloud};
use std::fs;
use std::io::{self, BufWriter, Write as _};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlyFormat {
    Ascii,
    BinaryLittleEndian,
}

/// Scalar property type as declared in the PLY header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PropType {
    Char,
    Uchar,
    Short,
    Ushort,
    Int,
    Uint,
    Float,
    Double,
}

impl PropType {
    fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "char" | "int8" => PropType::Char,
            "uchar" | "uint8" => PropType::Uchar,
            "short" | "int16" => PropType::Short,
            "ushort" | "uint16" => PropType::Ushort,
            "int" | "int32" => PropType::Int,
            "uint" | "uint32" => PropType::Uint,
            "float" | "float32" => PropType::Float,
            "double" | "float64" => PropType::Double,
            _ => return None,
        })
    }

    fn byte_size(self) -> usize {
        match self {
            PropType::Char | PropType::Uchar => 1,
            PropType::Short | PropType::Ushort => 2,
            PropType::Int | PropType::Uint | PropType::Float => 4,
            PropType::Double => 8,
        }
    }

    fn is_float(self) -> bool {
        matches!(self, PropType::Float | PropType::Double)
    }

    fn read_le(self, b: &[u8]) -> f64 {
        match self {
            PropType::Char => b[0] as i8 as f64,
            PropType::Uchar => b[0] as f64,
            PropType::Short => i16::from_le_bytes([b[0], b[1]]) as f64,
            PropType::Ushort => u16::from_le_bytes([b[0], b[1]]) as f64,
            PropType::Int => i32::from_le_bytes([b[0], b[1], b[2], b[3]]) as f64,
            PropType::Uint => u32::from_le_bytes([b[0], b[1], b[2], b[3]]) as f64,
            PropType::Float => f32::from_le_bytes([b[0], b[1], b[2], b[3]]) as f64,
            PropType::Double => {
                f64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]])
            }
        }
    }

    /// Color channel value to a byte: float channels are unit-range, integer
    /// channels are taken verbatim and clamped.
    fn to_color_byte(self, v: f64) -> u8 {
        if self.is_float() {
            Colors::unit_to_u8(v as f32)
        } else {
            v.clamp(0.0, 255.0) as u8
        }
    }
}

/// Parsed header information.
struct PlyHeader {
    format: PlyFormat,
    vertex_count: usize,
    property_names: Vec<String>,
    property_types: Vec<PropType>,
    header_end_offset: usize,
}

impl PlyHeader {
    fn position(&self, name: &str) -> Option<usize> {
        self.property_names.iter().position(|n| n == name)
    }

    fn byte_offset(&self, prop_idx: usize) -> usize {
        self.property_types[..prop_idx]
            .iter()
            .map(|t| t.byte_size())
            .sum()
    }

    fn stride(&self) -> usize {
        self.byte_offset(self.property_types.len())
    }
}

fn invalid(msg: impl Into<String>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg.into())
}

fn parse_ply_header(data: &[u8]) -> io::Result<PlyHeader> {
    let marker = b"end_header";
    let header_end =
        find_bytes(data, marker).ok_or_else(|| invalid("missing end_header in PLY file"))?;
    let header_end_offset = data[header_end..]
        .iter()
        .position(|&b| b == b'\n')
        .map(|p| header_end + p + 1)
        .unwrap_or(data.len());

    let header_text = std::str::from_utf8(&data[..header_end])
        .map_err(|_| invalid("PLY header not valid UTF-8"))?;

    let mut format = None;
    let mut vertex_count: usize = 0;
    let mut property_names: Vec<String> = Vec::new();
    let mut property_types: Vec<PropType> = Vec::new();
    let mut in_vertex_element = false;
    let mut seen_ply_magic = false;

    for line in header_text.lines() {
        let line = line.trim();

        if !seen_ply_magic {
            if line == "ply" {
                seen_ply_magic = true;
                continue;
            }
            return Err(invalid("file does not start with 'ply'"));
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts.first().copied() {
            Some("format") => {
                format = Some(match parts.get(1).copied() {
                    Some("ascii") => PlyFormat::Ascii,
                    Some("binary_little_endian") => PlyFormat::BinaryLittleEndian,
                    _ => {
                        return Err(io::Error::new(
                            io::ErrorKind::Unsupported,
                            format!("unsupported PLY format: {}", line),
                        ));
                    }
                });
            }
            Some("element") if parts.get(1) == Some(&"vertex") => {
                in_vertex_element = true;
                let count = parts.get(2).ok_or_else(|| invalid("invalid element vertex line"))?;
                vertex_count = count
                    .parse::<usize>()
                    .map_err(|e| invalid(format!("invalid vertex count: {}", e)))?;
            }
            Some("element") => in_vertex_element = false,
            Some("property") if in_vertex_element => {
                if parts.get(1) == Some(&"list") {
                    return Err(io::Error::new(
                        io::ErrorKind::Unsupported,
                        "list properties on vertices are not supported",
                    ));
                }
                if parts.len() >= 3 {
                    let ptype = PropType::parse(parts[1]).ok_or_else(|| {
                        io::Error::new(
                            io::ErrorKind::Unsupported,
                            format!("unsupported property type: {}", parts[1]),
                        )
                    })?;
                    property_types.push(ptype);
                    property_names.push(parts[2].to_string());
                }
            }
            _ => {}
        }
    }

    let format = format.ok_or_else(|| invalid("PLY format line missing"))?;

    Ok(PlyHeader {
        format,
        vertex_count,
        property_names,
        property_types,
        header_end_offset,
    })
}

fn find_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Reads the vertex element of a PLY file.
///
/// Colors are picked up from `red green blue` properties; `uchar` channels
/// are used as-is, float channels are treated as unit-range.
pub fn read_ply(path: impl AsRef<Path>) -> io::Result<PointCloud> {
    let data = fs::read(&path)?;
    let header = parse_ply_header(&data)?;

    let (idx_x, idx_y, idx_z) = match (
        header.position("x"),
        header.position("y"),
        header.position("z"),
    ) {
        (Some(ix), Some(iy), Some(iz)) => (ix, iy, iz),
        _ => return Err(invalid("PLY file missing required x, y, z properties")),
    };

    let color_idx = match (
        header.position("red"),
        header.position("green"),
        header.position("blue"),
    ) {
        (Some(r), Some(g), Some(b)) => Some([r, g, b]),
        _ => None,
    };

    let vertex_count = header.vertex_count;
    let body = &data[header.header_end_offset..];
    let stride = header.stride();

    // Header counts are untrusted; size buffers from what the body can hold.
    let capacity = match header.format {
        PlyFormat::Ascii => vertex_count.min(body.split(|&b| b == b'\n').count()),
        PlyFormat::BinaryLittleEndian => {
            let needed = vertex_count.checked_mul(stride).ok_or_else(|| {
                invalid(format!("PLY declares too many vertices: {}", vertex_count))
            })?;
            if body.len() < needed {
                return Err(invalid(format!(
                    "PLY binary body too short: need {} bytes, got {}",
                    needed,
                    body.len()
                )));
            }
            vertex_count
        }
    };

    let mut x = Vec::with_capacity(capacity);
    let mut y = Vec::with_capacity(capacity);
    let mut z = Vec::with_capacity(capacity);
    let mut colors = color_idx.map(|_| Colors::with_capacity(capacity));

    let mut push_vertex = |value: &dyn Fn(usize) -> io::Result<f64>| -> io::Result<()> {
        x.push(value(idx_x)? as f32);
        y.push(value(idx_y)? as f32);
        z.push(value(idx_z)? as f32);
        if let (Some(idx), Some(colors)) = (color_idx, colors.as_mut()) {
            let mut rgb = [0u8; 3];
            for (channel, &prop) in rgb.iter_mut().zip(&idx) {
                *channel = header.property_types[prop].to_color_byte(value(prop)?);
            }
            colors.push(rgb);
        }
        Ok(())
    };

    match header.format {
        PlyFormat::Ascii => {
            let body = std::str::from_utf8(body)
                .map_err(|_| invalid("PLY body not valid UTF-8"))?;
            let mut lines = body.lines().map(str::trim).filter(|l| !l.is_empty());
            for _ in 0..vertex_count {
                let line = lines.next().ok_or_else(|| {
                    invalid(format!("PLY body ends before {} vertices", vertex_count))
                })?;
                let parts: Vec<&str> = line.split_whitespace().collect();
                if parts.len() < header.property_names.len() {
                    return Err(invalid(format!(
                        "vertex line has {} fields, expected {}",
                        parts.len(),
                        header.property_names.len()
                    )));
                }
                push_vertex(&|idx: usize| -> io::Result<f64> {
                    parts[idx]
                        .parse::<f64>()
                        .map_err(|e| invalid(format!("failed to parse number: {}", e)))
                })?;
            }
        }
        PlyFormat::BinaryLittleEndian => {
            let offsets: Vec<usize> = (0..header.property_types.len())
                .map(|i| header.byte_offset(i))
                .collect();
            for vi in 0..vertex_count {
                let row = &body[vi * stride..(vi + 1) * stride];
                push_vertex(&|idx: usize| -> io::Result<f64> {
                    Ok(header.property_types[idx].read_le(&row[offsets[idx]..]))
                })?;
            }
        }
    }

    let mut cloud = PointCloud::from_xyz(x, y, z);
    cloud.colors = colors;
    Ok(cloud)
}

/// Write a PLY file in ASCII format.
pub fn write_ply(path: impl AsRef<Path>, cloud: &PointCloud) -> io::Result<()> {
    let mut out = header_text(cloud, "ascii");

    for i in 0..cloud.len() {
        out.push_str(&format!("{} {} {}", cloud.x[i], cloud.y[i], cloud.z[i]));
        if let Some([r, g, b]) = cloud.color(i) {
            out.push_str(&format!(" {} {} {}", r, g, b));
        }
        out.push('\n');
    }

    fs::write(path, out)
}

/// Write a PLY file in binary_little_endian format.
pub fn write_ply_binary(path: impl AsRef<Path>, cloud: &PointCloud) -> io::Result<()> {
    let file = fs::File::create(path)?;
    let mut w = BufWriter::new(file);
    w.write_all(header_text(cloud, "binary_little_endian").as_bytes())?;

    for i in 0..cloud.len() {
        w.write_all(&cloud.x[i].to_le_bytes())?;
        w.write_all(&cloud.y[i].to_le_bytes())?;
        w.write_all(&cloud.z[i].to_le_bytes())?;
        if let Some(rgb) = cloud.color(i) {
            w.write_all(&rgb)?;
        }
    }

    w.flush()
}

fn header_text(cloud: &PointCloud, format: &str) -> String {
    let mut out = String::new();
    out.push_str("ply\n");
    out.push_str(&format!("format {} 1.0\n", format));
    out.push_str(&format!("element vertex {}\n", cloud.len()));
    out.push_str("property float x\n");
    out.push_str("property float y\n");
    out.push_str("property float z\n");
    if cloud.has_colors() {
        out.push_str("property uchar red\n");
        out.push_str("property uchar green\n");
        out.push_str("property uchar blue\n");
    }
    out.push_str("end_header\n");
    out
}

use bevmap_core::{Colors, PointCloud};
use std::fs;
use std::io::{self, BufWriter, Write as _};
use std::path::Path;

/// Reads a PCD file (ASCII or binary format).
///
/// Positions come from the `x y z` fields. Colors are read from an `rgb` or
/// `rgba` field holding `0x00RRGGBB`, stored either as a float bit pattern
/// (`TYPE F`, PCL's convention) or as an unsigned integer.
pub fn read_pcd(path: impl AsRef<Path>) -> io::Result<PointCloud> {
    let raw = fs::read(path)?;
    let header = parse_header(&raw)?;
    let layout = FieldLayout::resolve(&header.fields)?;

    match header.data_format {
        DataFormat::Ascii => read_pcd_ascii(&raw[header.data_offset..], &header, &layout),
        DataFormat::Binary => read_pcd_binary(&raw[header.data_offset..], &header, &layout),
    }
}

/// Writes a PCD file in ASCII format.
pub fn write_pcd(path: impl AsRef<Path>, cloud: &PointCloud) -> io::Result<()> {
    let mut out = header_text(cloud, "ascii");

    for i in 0..cloud.len() {
        out.push_str(&format!("{} {} {}", cloud.x[i], cloud.y[i], cloud.z[i]));
        if let Some(rgb) = cloud.color(i) {
            out.push_str(&format!(" {}", pack_rgb(rgb)));
        }
        out.push('\n');
    }

    fs::write(path, out)
}

/// Writes a PCD file in binary format.
pub fn write_pcd_binary(path: impl AsRef<Path>, cloud: &PointCloud) -> io::Result<()> {
    let file = fs::File::create(path)?;
    let mut w = BufWriter::new(file);
    w.write_all(header_text(cloud, "binary").as_bytes())?;

    for i in 0..cloud.len() {
        w.write_all(&cloud.x[i].to_le_bytes())?;
        w.write_all(&cloud.y[i].to_le_bytes())?;
        w.write_all(&cloud.z[i].to_le_bytes())?;
        if let Some(rgb) = cloud.color(i) {
            w.write_all(&pack_rgb(rgb).to_le_bytes())?;
        }
    }

    w.flush()
}

fn header_text(cloud: &PointCloud, data: &str) -> String {
    let (fields, size, ty, count) = if cloud.has_colors() {
        ("x y z rgb", "4 4 4 4", "F F F U", "1 1 1 1")
    } else {
        ("x y z", "4 4 4", "F F F", "1 1 1")
    };

    let mut out = String::new();
    out.push_str("# .PCD v0.7 - Point Cloud Data file format\n");
    out.push_str("VERSION 0.7\n");
    out.push_str(&format!("FIELDS {}\n", fields));
    out.push_str(&format!("SIZE {}\n", size));
    out.push_str(&format!("TYPE {}\n", ty));
    out.push_str(&format!("COUNT {}\n", count));
    out.push_str(&format!("WIDTH {}\n", cloud.len()));
    out.push_str("HEIGHT 1\n");
    out.push_str("VIEWPOINT 0 0 0 1 0 0 0\n");
    out.push_str(&format!("POINTS {}\n", cloud.len()));
    out.push_str(&format!("DATA {}\n", data));
    out
}

fn pack_rgb(rgb: [u8; 3]) -> u32 {
    ((rgb[0] as u32) << 16) | ((rgb[1] as u32) << 8) | rgb[2] as u32
}

fn unpack_rgb(packed: u32) -> [u8; 3] {
    [
        ((packed >> 16) & 0xff) as u8,
        ((packed >> 8) & 0xff) as u8,
        (packed & 0xff) as u8,
    ]
}

// --- Internal helpers ---

#[derive(Debug, PartialEq)]
enum DataFormat {
    Ascii,
    Binary,
}

#[derive(Debug, Clone)]
struct PcdField {
    name: String,
    size: usize,
    kind: char,
    count: usize,
}

struct PcdHeader {
    fields: Vec<PcdField>,
    num_points: usize,
    data_format: DataFormat,
    /// Byte offset just past the newline ending the DATA line.
    data_offset: usize,
}

/// Byte offsets and token positions of the fields we care about.
struct FieldLayout {
    point_size: usize,
    xyz: [FieldSlot; 3],
    rgb: Option<FieldSlot>,
}

#[derive(Debug, Clone, Copy)]
struct FieldSlot {
    byte_offset: usize,
    token_index: usize,
    size: usize,
    kind: char,
}

impl FieldLayout {
    fn resolve(fields: &[PcdField]) -> io::Result<Self> {
        let mut slots = Vec::with_capacity(fields.len());
        let mut byte_offset = 0;
        let mut token_index = 0;
        for f in fields {
            slots.push(FieldSlot {
                byte_offset,
                token_index,
                size: f.size,
                kind: f.kind,
            });
            byte_offset = f
                .size
                .checked_mul(f.count)
                .and_then(|n| byte_offset.checked_add(n))
                .ok_or_else(|| invalid("PCD point size overflows"))?;
            token_index += f.count;
        }

        let find = |name: &str| fields.iter().position(|f| f.name == name).map(|i| slots[i]);

        let xyz = match (find("x"), find("y"), find("z")) {
            (Some(x), Some(y), Some(z)) => [x, y, z],
            _ => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "PCD file missing x, y, z fields",
                ));
            }
        };

        for slot in &xyz {
            if slot.kind != 'F' || !(slot.size == 4 || slot.size == 8) {
                return Err(io::Error::new(
                    io::ErrorKind::Unsupported,
                    format!(
                        "unsupported PCD coordinate type {}{}",
                        slot.kind, slot.size
                    ),
                ));
            }
        }

        let rgb = find("rgb").or_else(|| find("rgba"));
        if let Some(slot) = rgb {
            if slot.size != 4 {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("PCD color field must be 4 bytes, got {}", slot.size),
                ));
            }
        }

        let fits = |slot: &FieldSlot| {
            slot.byte_offset
                .checked_add(slot.size)
                .is_some_and(|end| end <= byte_offset)
        };
        if !xyz.iter().all(fits) || !rgb.iter().all(fits) {
            return Err(invalid("PCD field COUNT leaves no room for x, y, z or rgb"));
        }

        Ok(Self {
            point_size: byte_offset,
            xyz,
            rgb,
        })
    }
}

/// Finds the byte offset just past the newline ending the DATA line.
fn find_data_line_end(raw: &[u8]) -> Option<usize> {
    let data_marker = b"DATA";
    for i in 0..raw.len().saturating_sub(data_marker.len() - 1) {
        if (i == 0 || raw[i - 1] == b'\n') && raw[i..].starts_with(data_marker) {
            if let Some(offset) = raw[i..].iter().position(|&b| b == b'\n') {
                return Some(i + offset + 1);
            }
            return Some(raw.len());
        }
    }
    None
}

fn invalid(msg: impl Into<String>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg.into())
}

fn parse_header(raw: &[u8]) -> io::Result<PcdHeader> {
    let data_offset = find_data_line_end(raw).ok_or_else(|| invalid("PCD file missing DATA line"))?;
    let text = std::str::from_utf8(&raw[..data_offset])
        .map_err(|_| invalid("PCD header is not valid UTF-8"))?;

    let mut names: Vec<String> = Vec::new();
    let mut sizes: Vec<usize> = Vec::new();
    let mut kinds: Vec<char> = Vec::new();
    let mut counts: Vec<usize> = Vec::new();
    let mut width: Option<usize> = None;
    let mut height: usize = 1;
    let mut points: Option<usize> = None;
    let mut data_format = None;

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let mut parts = trimmed.split_whitespace();
        let key = parts.next().unwrap_or_default();
        let values: Vec<&str> = parts.collect();

        match key {
            "FIELDS" | "COLUMNS" => names = values.iter().map(|s| s.to_string()).collect(),
            "SIZE" => sizes = parse_list(&values, "SIZE")?,
            "TYPE" => {
                kinds = values
                    .iter()
                    .map(|s| s.chars().next().unwrap_or('F').to_ascii_uppercase())
                    .collect()
            }
            "COUNT" => counts = parse_list(&values, "COUNT")?,
            "WIDTH" => width = Some(parse_one(&values, "WIDTH")?),
            "HEIGHT" => height = parse_one(&values, "HEIGHT")?,
            "POINTS" => points = Some(parse_one(&values, "POINTS")?),
            "DATA" => {
                data_format = Some(match values.first().copied() {
                    Some("ascii") => DataFormat::Ascii,
                    Some("binary") => DataFormat::Binary,
                    Some(other) => {
                        return Err(io::Error::new(
                            io::ErrorKind::Unsupported,
                            format!("unsupported PCD DATA format: {}", other),
                        ));
                    }
                    None => return Err(invalid("PCD DATA line has no format")),
                });
            }
            _ => {}
        }
    }

    if names.is_empty() {
        names = vec!["x".to_string(), "y".to_string(), "z".to_string()];
    }

    let fields = names
        .into_iter()
        .enumerate()
        .map(|(i, name)| PcdField {
            name,
            size: sizes.get(i).copied().unwrap_or(4),
            kind: kinds.get(i).copied().unwrap_or('F'),
            count: counts.get(i).copied().unwrap_or(1),
        })
        .collect();

    let num_points = match (points, width) {
        (Some(p), _) => p,
        (None, Some(w)) => w
            .checked_mul(height)
            .ok_or_else(|| invalid("PCD WIDTH * HEIGHT overflows"))?,
        (None, None) => return Err(invalid("PCD file missing POINTS/WIDTH header")),
    };

    let data_format = data_format.ok_or_else(|| invalid("PCD file missing DATA line"))?;

    Ok(PcdHeader {
        fields,
        num_points,
        data_format,
        data_offset,
    })
}

fn parse_one(values: &[&str], key: &str) -> io::Result<usize> {
    values
        .first()
        .ok_or_else(|| invalid(format!("PCD {} line has no value", key)))?
        .parse::<usize>()
        .map_err(|e| invalid(format!("invalid {} value: {}", key, e)))
}

fn parse_list(values: &[&str], key: &str) -> io::Result<Vec<usize>> {
    values
        .iter()
        .map(|v| {
            v.parse::<usize>()
                .map_err(|e| invalid(format!("invalid {} value: {}", key, e)))
        })
        .collect()
}

fn read_pcd_ascii(body: &[u8], header: &PcdHeader, layout: &FieldLayout) -> io::Result<PointCloud> {
    let content = std::str::from_utf8(body)
        .map_err(|e| invalid(format!("invalid UTF-8 in PCD body: {}", e)))?;

    // Header counts are untrusted; cap by the body line count.
    let capacity = header.num_points.min(content.lines().count());
    let mut x = Vec::with_capacity(capacity);
    let mut y = Vec::with_capacity(capacity);
    let mut z = Vec::with_capacity(capacity);
    let mut colors = layout.rgb.map(|_| Colors::with_capacity(capacity));

    for line in content.lines() {
        if x.len() >= header.num_points {
            break;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = trimmed.split_whitespace().collect();
        let token = |slot: &FieldSlot| -> io::Result<&str> {
            parts.get(slot.token_index).copied().ok_or_else(|| {
                invalid(format!(
                    "PCD row has {} values, field at column {} missing",
                    parts.len(),
                    slot.token_index
                ))
            })
        };
        let coord = |slot: &FieldSlot| -> io::Result<f32> {
            token(slot)?
                .parse::<f32>()
                .map_err(|e| invalid(format!("failed to parse PCD coordinate: {}", e)))
        };

        x.push(coord(&layout.xyz[0])?);
        y.push(coord(&layout.xyz[1])?);
        z.push(coord(&layout.xyz[2])?);

        if let (Some(slot), Some(colors)) = (layout.rgb.as_ref(), colors.as_mut()) {
            let text = token(slot)?;
            let packed = match slot.kind {
                'F' => text.parse::<f32>().map(f32::to_bits).ok(),
                _ => text.parse::<u32>().ok(),
            }
            .ok_or_else(|| invalid(format!("failed to parse PCD color value: {}", text)))?;
            colors.push(unpack_rgb(packed));
        }
    }

    if x.len() < header.num_points {
        log::warn!(
            "PCD header declares {} points but the ascii body holds {}",
            header.num_points,
            x.len()
        );
    }

    let mut cloud = PointCloud::from_xyz(x, y, z);
    cloud.colors = colors;
    Ok(cloud)
}

fn read_pcd_binary(
    body: &[u8],
    header: &PcdHeader,
    layout: &FieldLayout,
) -> io::Result<PointCloud> {
    let num_points = header.num_points;
    let expected_size = num_points
        .checked_mul(layout.point_size)
        .ok_or_else(|| invalid(format!("PCD declares too many points: {}", num_points)))?;

    if body.len() < expected_size {
        return Err(invalid(format!(
            "binary PCD data too short: have {} bytes, expected {} ({} points x {} bytes)",
            body.len(),
            expected_size,
            num_points,
            layout.point_size
        )));
    }

    let mut x = Vec::with_capacity(num_points);
    let mut y = Vec::with_capacity(num_points);
    let mut z = Vec::with_capacity(num_points);
    let mut colors = layout.rgb.map(|_| Colors::with_capacity(num_points));

    for row in body.chunks_exact(layout.point_size).take(num_points) {
        let coord = |slot: &FieldSlot| -> f32 {
            let b = &row[slot.byte_offset..slot.byte_offset + slot.size];
            match slot.size {
                8 => f64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]) as f32,
                _ => f32::from_le_bytes([b[0], b[1], b[2], b[3]]),
            }
        };

        x.push(coord(&layout.xyz[0]));
        y.push(coord(&layout.xyz[1]));
        z.push(coord(&layout.xyz[2]));

        if let (Some(slot), Some(colors)) = (layout.rgb.as_ref(), colors.as_mut()) {
            let b = &row[slot.byte_offset..slot.byte_offset + 4];
            colors.push(unpack_rgb(u32::from_le_bytes([b[0], b[1], b[2], b[3]])));
        }
    }

    let mut cloud = PointCloud::from_xyz(x, y, z);
    cloud.colors = colors;
    Ok(cloud)
}

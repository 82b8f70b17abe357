use las::Read as _;
use bevmap_core::{Colors, PointCloud};
use std::io;
use std::path::Path;

/// Reads positions and, when the point format carries them, colors.
///
/// LAS colors are 16-bit. They are reduced to 8 bits by dropping the low
/// byte, unless every channel already fits in a byte (writers that store
/// 8-bit values unscaled).
pub fn read_las(path: impl AsRef<Path>) -> io::Result<PointCloud> {
    let mut reader = las::Reader::from_path(path.as_ref())
        .map_err(|e| io::Error::other(format!("failed to open LAS file: {}", e)))?;

    let mut x = Vec::new();
    let mut y = Vec::new();
    let mut z = Vec::new();
    let mut rgb16: Vec<[u16; 3]> = Vec::new();
    let mut all_colored = true;

    for point_result in reader.points() {
        let point = point_result.map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("failed to read LAS point: {}", e),
            )
        })?;
        x.push(point.x as f32);
        y.push(point.y as f32);
        z.push(point.z as f32);
        match point.color {
            Some(c) => rgb16.push([c.red, c.green, c.blue]),
            None => all_colored = false,
        }
    }

    let mut cloud = PointCloud::from_xyz(x, y, z);
    if all_colored && !rgb16.is_empty() {
        cloud.colors = Some(reduce_colors(&rgb16));
    }

    Ok(cloud)
}

fn reduce_colors(rgb16: &[[u16; 3]]) -> Colors {
    let eight_bit = rgb16.iter().flatten().all(|&c| c <= u8::MAX as u16);
    let mut colors = Colors::with_capacity(rgb16.len());
    for c in rgb16 {
        colors.push(c.map(|v| if eight_bit { v as u8 } else { (v >> 8) as u8 }));
    }
    colors
}

#[cfg(test)]
mod tests {
    use super::*;
    use las::{Write as _, Writer};

    fn write_las(path: &Path, format: u8, points: &[([f64; 3], Option<[u16; 3]>)]) {
        let mut builder = las::Builder::from((1, 2));
        builder.point_format = las::point::Format::new(format).unwrap();
        let header = builder.into_header().unwrap();
        let mut writer = Writer::from_path(path, header).unwrap();
        for (pos, color) in points {
            let mut p = las::point::Point::default();
            p.x = pos[0];
            p.y = pos[1];
            p.z = pos[2];
            p.color = color.map(|[red, green, blue]| las::Color { red, green, blue });
            writer.write(p).unwrap();
        }
    }

    #[test]
    fn las_read_nonexistent() {
        let result = read_las("/tmp/nonexistent_file_that_does_not_exist_12345.las");
        assert!(result.is_err());
    }

    #[test]
    fn las_roundtrip_without_color() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        write_las(
            tmp.path(),
            0,
            &[([1.0, 2.0, 3.0], None), ([4.0, 5.0, 6.0], None)],
        );

        let cloud = read_las(tmp.path()).unwrap();
        assert_eq!(cloud.len(), 2);
        assert!((cloud.x[0] - 1.0).abs() < 0.01);
        assert!((cloud.y[0] - 2.0).abs() < 0.01);
        assert!((cloud.z[0] - 3.0).abs() < 0.01);
        assert!((cloud.x[1] - 4.0).abs() < 0.01);
        assert!(cloud.colors.is_none());
    }

    #[test]
    fn las_sixteen_bit_colors_are_reduced() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        write_las(
            tmp.path(),
            2,
            &[
                ([0.0, 0.0, 0.0], Some([65535, 0, 32768])),
                ([1.0, 1.0, 0.0], Some([256, 512, 0])),
            ],
        );

        let cloud = read_las(tmp.path()).unwrap();
        assert_eq!(cloud.color(0), Some([255, 0, 128]));
        assert_eq!(cloud.color(1), Some([1, 2, 0]));
    }

    #[test]
    fn eight_bit_colors_kept_verbatim() {
        let colors = reduce_colors(&[[200, 100, 0], [255, 1, 2]]);
        assert_eq!(colors.get(0), [200, 100, 0]);
        assert_eq!(colors.get(1), [255, 1, 2]);
    }
}

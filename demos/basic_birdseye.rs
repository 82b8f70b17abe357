use bevmap::bev::write_png;
use bevmap::cloud::{Colors, PointCloud};
use bevmap::filters::crop_height_band;
use bevmap::{generate_birdseye, BevConfig};

fn main() {
    // Synthetic room: a floor with a ring of gray walls and a ceiling
    let mut x = Vec::new();
    let mut y = Vec::new();
    let mut z = Vec::new();
    let mut colors = Colors::with_capacity(0);

    for i in 0..200 {
        for j in 0..120 {
            let (px, py) = (i as f32 * 0.05, j as f32 * 0.05);
            let wall = i == 0 || i == 199 || j == 0 || j == 119;
            x.push(px);
            y.push(py);
            z.push(if wall { 1.0 } else { 0.0 });
            colors.push(if wall { [80, 80, 80] } else { [200, 180, 140] });

            // ceiling, removed by the height band
            x.push(px);
            y.push(py);
            z.push(2.8);
            colors.push([255, 255, 255]);
        }
    }
    let cloud = PointCloud::from_xyz_rgb(x, y, z, colors);
    println!("Original cloud: {} points", cloud.len());

    let band = crop_height_band(&cloud, -0.5, 1.5);
    println!("Inside the height band [-0.5, 1.5]: {} points", band.len());

    let config = BevConfig {
        min_z: -0.5,
        max_z: 1.5,
        ..Default::default()
    };
    let bev = generate_birdseye(&cloud, &config).expect("projection failed");
    println!(
        "Bird's-eye view: {}x{} px, {} points clipped",
        bev.stats.width, bev.stats.height, bev.stats.clipped_points
    );

    let path = std::env::temp_dir().join("room_birdseye.png");
    write_png(&path, &bev.image).expect("failed to write PNG");
    println!("Wrote {}", path.display());
}

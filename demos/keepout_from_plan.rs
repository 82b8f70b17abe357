use bevmap::keepout::{save_pgm, save_png};
use bevmap::{EditSession, KeepoutPlan};
use image::{GrayImage, Luma, Rgb, RgbImage};

const PLAN: &str = "
view: { alpha: 0.6, x_shift: 4, y_shift: 0, rotation_deg: 2, scale: 1.0 }
zones:
  - [[20, 20], [70, 20], [70, 50], [20, 50]]
  - [[120, 60], [150, 90], [110, 95]]
";

fn main() {
    // Free space bounded by walls, the way map_server writes it
    let mut map = GrayImage::from_pixel(200, 120, Luma([254]));
    for x in 0..200 {
        map.put_pixel(x, 0, Luma([0]));
        map.put_pixel(x, 119, Luma([0]));
    }

    // Portrait BEV: it gets rotated to match the landscape map
    let bev = RgbImage::from_fn(60, 100, |x, y| {
        if (x + y) % 10 == 0 {
            Rgb([60, 60, 60])
        } else {
            Rgb([220, 210, 190])
        }
    });

    let plan = KeepoutPlan::from_yaml_str(PLAN).expect("invalid plan");
    let session = EditSession::new(map, &bev).replay(plan.events());
    println!("Baked {} keepout zones", session.zones());

    let occupied = session.keepout().pixels().filter(|p| p.0[0] == 0).count();
    println!("Occupied cells after baking: {}", occupied);

    let dir = std::env::temp_dir();
    let keepout = dir.join("demo_keepout.pgm");
    let preview = dir.join("demo_keepout_preview.png");
    save_pgm(&keepout, session.keepout()).expect("failed to write PGM");
    save_png(&preview, &session.render_preview().expect("preview failed"))
        .expect("failed to write preview");
    println!("Wrote {} and {}", keepout.display(), preview.display());
}

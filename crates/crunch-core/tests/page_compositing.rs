use crunch_core::bitmap::Bitmap;
use crunch_core::model::Placement;
use crunch_core::packer::Packer;
use image::{Rgba, RgbaImage};
use std::fs;
use std::path::PathBuf;

fn temp_png(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!("crunch-page-{tag}-{}.png", std::process::id()))
}

/// 2x3 bitmap with a unique red value per pixel (10*y + x).
fn gradient() -> Bitmap {
    let mut img = RgbaImage::new(2, 3);
    for y in 0..3 {
        for x in 0..2 {
            img.put_pixel(x, y, Rgba([(10 * y + x) as u8, 0, 0, 255]));
        }
    }
    Bitmap::from_rgba("g", img, false, false)
}

#[test]
fn rotated_and_plain_placements_composite_onto_a_transparent_page() {
    let arena = vec![gradient()];
    let mut page = Packer::new(8, 4, 0);
    page.bitmaps = vec![0, 0];
    page.points = vec![
        // Rotated: occupies 3x2 at (1,0).
        Placement {
            x: 1,
            y: 0,
            dup_of: None,
            rotated: true,
        },
        // Plain: occupies 2x3 at (5,0).
        Placement {
            x: 5,
            y: 0,
            dup_of: None,
            rotated: false,
        },
    ];

    let path = temp_png("rotated");
    page.save_png(&path, &arena).unwrap();
    let canvas = image::open(&path).unwrap().to_rgba8();
    assert_eq!(canvas.dimensions(), (8, 4));

    // Rotated copy: source (x, y) lands at (1 + 2 - y, 0 + x).
    assert_eq!(canvas.get_pixel(3, 0).0, [0, 0, 0, 255]); // src (0,0)
    assert_eq!(canvas.get_pixel(3, 1).0, [1, 0, 0, 255]); // src (1,0)
    assert_eq!(canvas.get_pixel(1, 0).0, [20, 0, 0, 255]); // src (0,2)
    assert_eq!(canvas.get_pixel(1, 1).0, [21, 0, 0, 255]); // src (1,2)

    // Plain copy keeps its orientation.
    assert_eq!(canvas.get_pixel(5, 0).0, [0, 0, 0, 255]);
    assert_eq!(canvas.get_pixel(6, 2).0, [21, 0, 0, 255]);

    // Untouched pixels stay fully transparent.
    assert_eq!(canvas.get_pixel(0, 0).0, [0, 0, 0, 0]);
    assert_eq!(canvas.get_pixel(7, 3).0, [0, 0, 0, 0]);

    let _ = fs::remove_file(&path);
}

#[test]
fn duplicate_placements_draw_no_pixels() {
    let arena = vec![gradient(), gradient()];
    let mut page = Packer::new(8, 4, 0);
    page.bitmaps = vec![0, 1];
    page.points = vec![
        Placement {
            x: 0,
            y: 0,
            dup_of: None,
            rotated: false,
        },
        Placement {
            x: 0,
            y: 0,
            dup_of: Some(0),
            rotated: false,
        },
    ];

    let path = temp_png("dup");
    page.save_png(&path, &arena).unwrap();
    let canvas = image::open(&path).unwrap().to_rgba8();
    let visible = canvas.pixels().filter(|p| p[3] > 0).count();
    assert_eq!(visible, 2 * 3, "only the primary copy is drawn");

    let _ = fs::remove_file(&path);
}

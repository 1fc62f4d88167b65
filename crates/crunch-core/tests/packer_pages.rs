use crunch_core::bitmap::Bitmap;
use crunch_core::config::Config;
use crunch_core::model::Rect;
use crunch_core::packer::Packer;
use image::{Rgba, RgbaImage};

fn solid(name: &str, w: u32, h: u32, color: [u8; 4]) -> Bitmap {
    Bitmap::from_rgba(name, RgbaImage::from_pixel(w, h, Rgba(color)), false, false)
}

fn sorted_queue(arena: &[Bitmap]) -> Vec<usize> {
    let mut queue: Vec<usize> = (0..arena.len()).collect();
    queue.sort_by_key(|&i| arena[i].width() as u64 * arena[i].height() as u64);
    queue
}

/// Padded footprint of every non-duplicate placement, rotation applied.
fn placed_rects(page: &Packer, arena: &[Bitmap]) -> Vec<Rect> {
    page.bitmaps
        .iter()
        .zip(&page.points)
        .filter(|(_, p)| p.dup_of.is_none())
        .map(|(&bi, p)| {
            let (w, h) = if p.rotated {
                (arena[bi].height(), arena[bi].width())
            } else {
                (arena[bi].width(), arena[bi].height())
            };
            Rect::new(p.x, p.y, w + page.pad, h + page.pad)
        })
        .collect()
}

fn is_pow2(v: u32) -> bool {
    v != 0 && (v & (v - 1)) == 0
}

#[test]
fn seventeen_squares_fill_two_pages() {
    let arena: Vec<Bitmap> = (0..17)
        .map(|i| solid(&format!("r{i}"), 300, 300, [255, 0, 0, 255]))
        .collect();
    let mut queue = sorted_queue(&arena);
    let cfg = Config::default();

    let mut first = Packer::new(1024, 1024, 0);
    first.pack(&mut queue, &arena, &cfg);
    assert_eq!(first.bitmaps.len(), 9);
    assert_eq!(queue.len(), 8);

    let mut second = Packer::new(1024, 1024, 0);
    second.pack(&mut queue, &arena, &cfg);
    assert_eq!(second.bitmaps.len(), 8);
    assert!(queue.is_empty());

    for page in [&first, &second] {
        let rects = placed_rects(page, &arena);
        for i in 0..rects.len() {
            for j in (i + 1)..rects.len() {
                assert!(!rects[i].intersects(&rects[j]));
            }
        }
        for r in &rects {
            assert!(r.right() <= page.width && r.bottom() <= page.height);
        }
        assert!(is_pow2(page.width) && is_pow2(page.height));
    }
}

#[test]
fn equal_area_bitmaps_keep_insertion_order() {
    // The area sort must be stable: equal-area images are consumed from the
    // back of the queue, so the page sees them in reverse insertion order.
    let arena = vec![
        solid("a", 10, 10, [1, 0, 0, 255]),
        solid("b", 10, 10, [2, 0, 0, 255]),
        solid("c", 10, 10, [3, 0, 0, 255]),
    ];
    let mut queue = sorted_queue(&arena);
    let mut page = Packer::new(64, 64, 0);
    page.pack(&mut queue, &arena, &Config::default());
    assert_eq!(page.bitmaps, vec![2, 1, 0]);
}

#[test]
fn duplicates_share_the_primary_placement() {
    let arena = vec![
        solid("one", 32, 32, [9, 9, 9, 255]),
        solid("two", 32, 32, [9, 9, 9, 255]),
        solid("other", 32, 32, [1, 1, 1, 255]),
    ];
    let mut queue = sorted_queue(&arena);
    let cfg = Config {
        unique: true,
        ..Config::default()
    };
    let mut page = Packer::new(128, 128, 1);
    page.pack(&mut queue, &arena, &cfg);

    assert_eq!(page.points.len(), 3);
    let dup_count = page.points.iter().filter(|p| p.dup_of.is_some()).count();
    assert_eq!(dup_count, 1, "exactly one of the identical pair is folded");

    let dup_idx = page.points.iter().position(|p| p.dup_of.is_some()).unwrap();
    let primary = page.points[dup_idx].dup_of.unwrap();
    assert_eq!(page.points[dup_idx].x, page.points[primary].x);
    assert_eq!(page.points[dup_idx].y, page.points[primary].y);
    assert!(arena[page.bitmaps[dup_idx]].equals(&arena[page.bitmaps[primary]]));
}

#[test]
fn fingerprint_collision_without_equal_pixels_is_not_deduped() {
    let a = solid("a", 8, 8, [5, 5, 5, 255]);
    let b = solid("b", 8, 8, [6, 6, 6, 255]);
    assert_ne!(a.hash_value, b.hash_value);
    let arena = vec![a, b];
    let mut queue = sorted_queue(&arena);
    let cfg = Config {
        unique: true,
        ..Config::default()
    };
    let mut page = Packer::new(64, 64, 0);
    page.pack(&mut queue, &arena, &cfg);
    assert!(page.points.iter().all(|p| p.dup_of.is_none()));
}

#[test]
fn page_shrinks_to_power_of_two_floor() {
    let arena = vec![solid("s", 32, 32, [0, 0, 0, 255])];
    let mut queue = sorted_queue(&arena);

    let mut flush = Packer::new(4096, 4096, 0);
    flush.pack(&mut queue, &arena, &Config::default());
    assert_eq!((flush.width, flush.height), (32, 32));

    let mut queue = sorted_queue(&arena);
    let mut padded = Packer::new(4096, 4096, 1);
    padded.pack(&mut queue, &arena, &Config::default());
    // 33 pixels of used extent round up to the next power of two.
    assert_eq!((padded.width, padded.height), (64, 64));
}

#[test]
fn oversize_bitmap_leaves_page_empty() {
    let arena = vec![solid("wide", 65, 1, [0, 0, 0, 255])];
    let mut queue = sorted_queue(&arena);
    let mut page = Packer::new(64, 64, 0);
    page.pack(&mut queue, &arena, &Config::default());
    assert!(page.points.is_empty());
    assert_eq!(queue.len(), 1, "the oversize image stays in the queue");
}

#[test]
fn rotation_packs_crossed_strips_on_one_page() {
    let arena = vec![
        solid("wide", 100, 50, [1, 2, 3, 255]),
        solid("tall", 50, 100, [4, 5, 6, 255]),
    ];
    let mut queue = sorted_queue(&arena);
    let cfg = Config {
        rotate: true,
        ..Config::default()
    };
    let mut page = Packer::new(128, 128, 0);
    page.pack(&mut queue, &arena, &cfg);

    assert!(queue.is_empty(), "both strips fit one page");
    assert_eq!(page.points.len(), 2);
    assert_eq!(
        page.points.iter().filter(|p| p.rotated).count(),
        1,
        "one strip is turned to line up with the other"
    );
    let rects = placed_rects(&page, &arena);
    assert!(!rects[0].intersects(&rects[1]));
    for r in &rects {
        assert!(r.right() <= page.width && r.bottom() <= page.height);
    }
}

#[test]
fn pad_sixteen_inflates_footprints() {
    let arena = vec![
        solid("a", 10, 10, [1, 0, 0, 255]),
        solid("b", 20, 10, [2, 0, 0, 255]),
    ];
    let mut queue = sorted_queue(&arena);
    let mut page = Packer::new(256, 256, 16);
    page.pack(&mut queue, &arena, &Config::default());
    let rects = placed_rects(&page, &arena);
    assert!(rects.iter().any(|r| (r.w, r.h) == (36, 26)));
    assert!(rects.iter().any(|r| (r.w, r.h) == (26, 26)));
    assert!(!rects[0].intersects(&rects[1]));
}

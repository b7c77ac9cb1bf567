use rand::{SeedableRng, rngs::StdRng};

use super::*;
use crate::layout::zones::BODY_ZONE;

fn planner() -> ImageLayoutPlanner {
    ImageLayoutPlanner::new(Size::new(720.0, 540.0), 0.36)
}

fn pool(sizes: &[Option<(u32, u32)>]) -> UserImagePool {
    UserImagePool::from_images(
        sizes
            .iter()
            .enumerate()
            .map(|(i, &source_px)| UserImage {
                path: PathBuf::from(format!("/img/{i}.png")),
                source_px,
            })
            .collect(),
    )
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn empty_pool_has_no_pair() {
    assert_eq!(pool(&[]).pair_for_slide(0), None);
    assert!(
        planner()
            .plan_slide(&pool(&[]), 0, true, BODY_ZONE, &mut StdRng::seed_from_u64(1))
            .is_none()
    );
}

#[test]
fn single_image_fills_both_slots_on_every_slide() {
    let p = pool(&[Some((400, 300))]);
    for i in 0..4 {
        assert_eq!(p.pair_for_slide(i), Some((0, 0)));
    }
    let mut rng = StdRng::seed_from_u64(3);
    let (_, placed) = planner()
        .plan_slide(&p, 2, false, BODY_ZONE, &mut rng)
        .unwrap();
    assert_eq!(placed.len(), 2);
    assert_eq!(placed[0].slot, ImageSlot::Large);
    assert_eq!(placed[1].slot, ImageSlot::Small);
    assert_eq!(placed[0].path, placed[1].path);
}

#[test]
fn pairs_rotate_and_wrap_around_the_pool() {
    let p = pool(&[Some((1, 1)), Some((1, 1)), Some((1, 1))]);
    assert_eq!(p.pair_for_slide(0), Some((0, 1)));
    assert_eq!(p.pair_for_slide(1), Some((2, 0)));
    assert_eq!(p.pair_for_slide(2), Some((1, 2)));
    assert_eq!(p.pair_for_slide(3), Some((0, 1)));

    let two = pool(&[Some((1, 1)), Some((1, 1))]);
    assert_eq!(two.pair_for_slide(5), Some((0, 1)));
}

#[test]
fn orientation_tables_follow_image_shape() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..200 {
        let o = pick_orientation(Some((1600, 900)), &mut rng);
        assert!(LANDSCAPE_BIAS.contains(&o));
        let o = pick_orientation(Some((900, 1600)), &mut rng);
        assert!(PORTRAIT_BIAS.contains(&o));
    }

    let mut seen = std::collections::HashSet::new();
    for _ in 0..400 {
        seen.insert(pick_orientation(None, &mut rng));
    }
    assert_eq!(seen.len(), 4);
}

#[test]
fn seeded_rng_gives_repeatable_layouts() {
    let p = pool(&[Some((800, 600)), Some((300, 900))]);
    let run = |seed| {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..6)
            .map(|i| {
                planner()
                    .plan_slide(&p, i, i == 0, BODY_ZONE, &mut rng)
                    .unwrap()
                    .0
                    .orientation
            })
            .collect::<Vec<_>>()
    };
    assert_eq!(run(11), run(11));
}

#[test]
fn carved_zones_match_the_layout_tables() {
    let pl = planner();

    let top = pl.carve(Orientation::Top, true, BODY_ZONE);
    assert_eq!(top.large_image_zone, Some(Zone::new(0.06, 0.10, 0.88, 0.30)));
    assert_eq!(top.small_image_zone, Some(Zone::new(0.68, 0.38, 0.24, 0.16)));
    assert!(approx(top.text_zone.top, 0.50) && approx(top.text_zone.bottom(), 0.92));
    assert!(approx(top.text_zone.left, BODY_ZONE.left));

    let bottom = pl.carve(Orientation::Bottom, false, BODY_ZONE);
    assert!(approx(bottom.text_zone.top, 0.10) && approx(bottom.text_zone.bottom(), 0.58));

    let left = pl.carve(Orientation::Left, false, BODY_ZONE);
    assert_eq!(left.large_image_zone, Some(Zone::new(0.05, 0.08, 0.45, 0.82)));
    assert!(approx(left.text_zone.left, 0.53) && approx(left.text_zone.right(), 0.93));

    let right = pl.carve(Orientation::Right, true, BODY_ZONE);
    assert_eq!(right.small_image_zone, Some(Zone::new(0.50, 0.62, 0.16, 0.22)));
    assert!(approx(right.text_zone.left, 0.07) && approx(right.text_zone.right(), 0.47));
}

#[test]
fn text_zone_keeps_a_readable_minimum() {
    let narrow = Zone::new(0.45, 0.40, 0.10, 0.10);
    for o in Orientation::ALL {
        for has_title in [true, false] {
            let plan = planner().carve(o, has_title, narrow);
            let z = plan.text_zone;
            assert!(z.width >= 0.36 - 1e-9 && z.height >= 0.36 - 1e-9, "{o:?} {z:?}");
            assert!(z.is_within_unit(), "{o:?} {z:?}");
        }
    }
}

#[test]
fn crop_to_fill_trims_the_longer_side() {
    // 2:1 source into a 1:1 box: half is visible.
    let c = crop_to_fill(200.0, 100.0, 50.0, 50.0);
    assert!(approx(c.left, 0.25) && approx(c.right, 0.25));
    assert_eq!((c.top, c.bottom), (0.0, 0.0));

    let c = crop_to_fill(100.0, 400.0, 300.0, 300.0);
    assert!(approx(c.top, 0.375) && approx(c.bottom, 0.375));
    assert_eq!((c.left, c.right), (0.0, 0.0));

    // Extreme ratios stop at the per-side limit.
    let c = crop_to_fill(10_000.0, 1.0, 1.0, 1.0);
    assert_eq!(c.left, MAX_CROP_PER_SIDE);
}

#[test]
fn crop_to_fill_is_zero_for_matching_or_degenerate_sizes() {
    assert!(crop_to_fill(1600.0, 900.0, 320.0, 180.0).is_none());
    assert!(crop_to_fill(0.0, 900.0, 320.0, 180.0).is_none());
    assert!(crop_to_fill(100.0, 100.0, 320.0, f64::NAN).is_none());
}

#[test]
fn placements_use_absolute_zone_aspect() {
    // Large Top zone with title is 0.88x0.30 of 720x540: 633.6 x 162.
    let p = pool(&[Some((1000, 1000))]);
    let pl = planner();
    let plan = pl.carve(Orientation::Top, true, BODY_ZONE);
    let placed = pl.place(
        ImageSlot::Large,
        p.get(0).unwrap(),
        plan.large_image_zone.unwrap(),
        (1000, 1000),
    );
    let visible = 162.0 / 633.6;
    assert!(approx(placed.crop.top, (1.0 - visible) / 2.0));
    assert_eq!(placed.crop.left, 0.0);
}

#[test]
fn undecodable_images_leave_their_slot_empty() {
    let mut rng = StdRng::seed_from_u64(5);
    let p = pool(&[None, Some((640, 480))]);
    let (plan, placed) = planner()
        .plan_slide(&p, 0, true, BODY_ZONE, &mut rng)
        .unwrap();
    assert_eq!(placed.len(), 1);
    assert_eq!(placed[0].slot, ImageSlot::Small);
    assert!(plan.large_image_zone.is_none());
    assert!(plan.small_image_zone.is_some());

    assert!(
        planner()
            .plan_slide(&pool(&[None]), 0, true, BODY_ZONE, &mut rng)
            .is_none()
    );
}

#[test]
fn prepare_drops_missing_files_and_keeps_undecodable_ones() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("a.png");
    image::RgbImage::from_pixel(8, 4, image::Rgb([1, 2, 3]))
        .save(&good)
        .unwrap();
    let bad = dir.path().join("b.png");
    std::fs::write(&bad, b"not an image").unwrap();
    let missing = dir.path().join("c.png");

    let p = UserImagePool::prepare(&[good.clone(), missing, bad.clone()]);
    assert_eq!(p.len(), 2);
    assert_eq!(p.get(0).unwrap().source_px, Some((8, 4)));
    assert_eq!(p.get(1).unwrap().path, bad);
    assert_eq!(p.get(1).unwrap().source_px, None);
}

use image::{Rgba, RgbaImage};

use super::*;

fn layer(name: &str, pixels: &[((u32, u32), [u8; 4])]) -> Layer {
    let mut img = RgbaImage::new(64, 64);
    for &((x, y), px) in pixels {
        img.put_pixel(x, y, Rgba(px));
    }
    Layer::new(name, img)
}

fn c(x: u8, y: u8) -> Coord {
    Coord::new(x, y)
}

#[test]
fn day_numbers_follow_the_second_token() {
    assert_eq!(parse_day_number("Day 1"), Some(1));
    assert_eq!(parse_day_number("Day 51"), Some(51));
    assert_eq!(parse_day_number("Day 7 (redo)"), Some(7));
    assert_eq!(parse_day_number("Day -1"), Some(-1));
    assert_eq!(parse_day_number("Day 0"), Some(0));
    assert_eq!(parse_day_number("Day x"), None);
    assert_eq!(parse_day_number("Day  3"), None);
    assert_eq!(parse_day_number("day 3"), None);
    assert_eq!(parse_day_number("Days 3"), None);
    assert_eq!(parse_day_number("Temples"), None);
}

#[test]
fn only_fully_opaque_cells_are_painted() {
    let l = layer(
        "Day 1",
        &[
            ((0, 0), [10, 0, 0, 255]),
            ((1, 1), [20, 0, 0, 254]),
            ((2, 2), [30, 0, 0, 0]),
            ((3, 3), [0, 0, 0, 255]),
        ],
    );
    assert_eq!(extract_day(&l), vec![c(0, 0), c(3, 3)]);
}

#[test]
fn paint_order_is_descending_red() {
    let l = layer(
        "Day 1",
        &[
            ((5, 0), [1, 0, 0, 255]),
            ((0, 9), [200, 0, 0, 255]),
            ((9, 9), [50, 99, 99, 255]),
            ((2, 4), [120, 0, 0, 255]),
        ],
    );
    let order = extract_day(&l);
    assert_eq!(order, vec![c(0, 9), c(2, 4), c(9, 9), c(5, 0)]);

    let reds: Vec<u8> = order.iter().map(|&p| l.pixel(p)[0]).collect();
    assert!(reds.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn equal_red_keeps_reverse_scan_order() {
    let l = layer(
        "Day 1",
        &[
            ((0, 1), [7, 0, 0, 255]),
            ((0, 2), [7, 0, 0, 255]),
            ((1, 0), [7, 0, 0, 255]),
        ],
    );
    assert_eq!(extract_day(&l), vec![c(1, 0), c(0, 2), c(0, 1)]);
}

#[test]
fn days_assemble_in_numeric_not_document_order() {
    let doc = Document::from_layers(vec![
        layer("Day 10", &[((9, 9), [1, 0, 0, 255])]),
        layer("Background", &[((0, 0), [1, 1, 1, 255])]),
        layer("Day 2", &[((2, 2), [1, 0, 0, 255]), ((3, 3), [2, 0, 0, 255])]),
    ]);
    let (days, reports) = DayRoutes::from_document(&doc);
    assert_eq!(days.len(), 2);
    assert_eq!(
        reports.iter().map(|r| r.layer_name.as_str()).collect::<Vec<_>>(),
        ["Day 10", "Day 2"]
    );
    assert_eq!(reports[1].pixels, 2);

    let route = Route::assemble(&days);
    assert_eq!(route.pixels, vec![c(3, 3), c(2, 2), c(9, 9)]);
    assert_eq!(route.day_index, vec![0, 2, 3]);
    assert!(route.duplicates.is_empty());
}

#[test]
fn negative_days_come_before_day_one() {
    let doc = Document::from_layers(vec![
        layer("Day 1", &[((1, 1), [1, 0, 0, 255])]),
        layer("Day -1", &[((5, 5), [1, 0, 0, 255])]),
    ]);
    let (days, reports) = DayRoutes::from_document(&doc);
    assert_eq!(
        reports.iter().map(|r| r.day).collect::<Vec<_>>(),
        vec![1, -1]
    );
    assert_eq!(days.iter().map(|(d, _)| d).collect::<Vec<_>>(), vec![-1, 1]);

    let route = Route::assemble(&days);
    assert_eq!(route.pixels, vec![c(5, 5), c(1, 1)]);
    assert_eq!(route.day_index, vec![0, 1, 2]);
}

#[test]
fn repeated_day_number_keeps_the_later_layer() {
    let doc = Document::from_layers(vec![
        layer("Day 1", &[((0, 0), [1, 0, 0, 255])]),
        layer("Day 1 copy", &[((5, 5), [1, 0, 0, 255])]),
    ]);
    let (days, reports) = DayRoutes::from_document(&doc);
    assert_eq!(reports.len(), 2);
    assert_eq!(days.iter().collect::<Vec<_>>(), vec![(1, &[c(5, 5)][..])]);
}

#[test]
fn duplicates_are_reported_once_per_repeat() {
    let days = DayRoutes::from_days([
        (1, vec![c(0, 0), c(1, 1)]),
        (2, vec![c(1, 1), c(2, 2)]),
        (3, vec![c(1, 1), c(0, 0)]),
    ]);
    let route = Route::assemble(&days);
    assert_eq!(route.len(), 6);
    assert_eq!(route.duplicates, vec![c(1, 1), c(1, 1), c(0, 0)]);
    assert_eq!(route.position(c(1, 1)), Some(1));
    assert_eq!(route.position(c(2, 2)), Some(3));
    assert_eq!(route.position(c(9, 9)), None);
}

#[test]
fn day_index_is_cumulative_and_ends_at_route_length() {
    let days = DayRoutes::from_days([
        (1, vec![c(0, 0)]),
        (2, vec![]),
        (3, vec![c(1, 0), c(2, 0), c(3, 0)]),
    ]);
    let route = Route::assemble(&days);
    assert_eq!(route.day_index, vec![0, 1, 1, 4]);
    assert!(route.day_index.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(*route.day_index.last().unwrap(), route.len());
}

#[test]
fn empty_document_gives_a_lone_sentinel() {
    let (days, reports) = DayRoutes::from_document(&Document::default());
    assert!(days.is_empty());
    assert!(reports.is_empty());
    let route = Route::assemble(&days);
    assert!(route.is_empty());
    assert_eq!(route.day_index, vec![0]);
}

use super::*;

fn layer_with(name: &str, w: u32, h: u32, at: (u32, u32), px: [u8; 4]) -> Layer {
    let mut img = RgbaImage::new(w, h);
    img.put_pixel(at.0, at.1, image::Rgba(px));
    Layer::new(name, img)
}

#[test]
fn pixel_outside_extent_is_transparent() {
    let layer = layer_with("Day 1", 2, 2, (1, 1), [9, 8, 7, 255]);
    assert_eq!(layer.pixel(Coord::new(1, 1)).0, [9, 8, 7, 255]);
    assert_eq!(layer.pixel(Coord::new(0, 0)).0, [0, 0, 0, 0]);
    assert_eq!(layer.pixel(Coord::new(2, 0)), TRANSPARENT);
    assert_eq!(layer.pixel(Coord::new(63, 63)), TRANSPARENT);
}

#[test]
fn from_layers_takes_largest_extent() {
    let doc = Document::from_layers(vec![
        layer_with("a", 4, 2, (0, 0), [0; 4]),
        layer_with("b", 1, 9, (0, 0), [0; 4]),
    ]);
    assert_eq!((doc.width, doc.height), (4, 9));
    assert_eq!(doc.layers.len(), 2);

    let empty = Document::from_layers(vec![]);
    assert_eq!((empty.width, empty.height), (0, 0));
}

#[test]
fn layers_named_matches_exactly() {
    let doc = Document::from_layers(vec![
        layer_with("Temples", 1, 1, (0, 0), [0; 4]),
        layer_with("Temples copy", 1, 1, (0, 0), [0; 4]),
        layer_with("Temples", 1, 1, (0, 0), [0; 4]),
    ]);
    assert_eq!(doc.layers_named("Temples").count(), 2);
    assert_eq!(doc.layers_named("temples").count(), 0);
}

#[test]
fn extension_check_is_exact() {
    assert!(has_document_extension(Path::new("art/shikoku.xcf")));
    assert!(!has_document_extension(Path::new("art/shikoku.XCF")));
    assert!(!has_document_extension(Path::new("art/shikoku.png")));
    assert!(!has_document_extension(Path::new("art/shikoku")));
}

#[test]
fn load_rejects_wrong_extension_without_touching_disk() {
    let err = Document::load(Path::new("does/not/exist.png")).unwrap_err();
    assert!(matches!(err, RouteError::Usage(_)));
}

#[test]
fn load_missing_file_is_an_error() {
    let err = Document::load(Path::new("target/definitely-missing.xcf")).unwrap_err();
    assert!(err.to_string().contains("definitely-missing.xcf"));
}

#[test]
fn sanitized_names_are_file_safe() {
    assert_eq!(sanitize_file_stem("Day 12"), "Day_12");
    assert_eq!(sanitize_file_stem("a/b\\c"), "a_b_c");
    assert_eq!(sanitize_file_stem(""), "layer");
}

#[test]
fn dump_layers_writes_pngs() {
    let dir = std::path::PathBuf::from("target").join("unit_dump_layers");
    let _ = std::fs::remove_dir_all(&dir);

    let doc = Document::from_layers(vec![layer_with("Day 1", 3, 2, (2, 1), [1, 2, 3, 255])]);
    let written = doc.dump_layers(&dir).unwrap();
    assert_eq!(written.len(), 1);
    assert!(written[0].ends_with("000-Day_1.png"));

    let back = image::open(&written[0]).unwrap().to_rgba8();
    assert_eq!(back.dimensions(), (3, 2));
    assert_eq!(back.get_pixel(2, 1).0, [1, 2, 3, 255]);
}

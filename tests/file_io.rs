use egui::{Color32, Pos2};
use image::ImageFormat;
use painter::{BrushModel, Canvas, CanvasError, PixelBuffer, Settings, Size};

fn create_drawn_canvas() -> Canvas {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut canvas = Canvas::new(Size::new(32, 24).unwrap());
    let brush = BrushModel::new();
    canvas.pointer_down(Pos2::new(8.0, 8.0), &brush).unwrap();
    canvas.pointer_move(Pos2::new(24.0, 16.0), &brush).unwrap();
    canvas.pointer_up(Pos2::new(24.0, 16.0), &brush).unwrap();
    canvas
}

#[test]
fn test_png_save_and_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("drawing.png");
    let mut canvas = create_drawn_canvas();

    assert!(canvas.has_unsaved_changes());
    canvas.save(&path).unwrap();
    assert!(canvas.is_saved());
    assert!(!canvas.has_unsaved_changes());

    let reopened = PixelBuffer::open(&path).unwrap();
    assert_eq!(&reopened, canvas.image());
}

#[test]
fn test_jpeg_save() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("drawing.jpg");
    let mut canvas = create_drawn_canvas();
    canvas.save(&path).unwrap();

    let reopened = PixelBuffer::open(&path).unwrap();
    assert_eq!(reopened.size(), canvas.image().size());
}

#[test]
fn test_save_to_unwritable_path_fails_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("drawing.png");
    let mut canvas = create_drawn_canvas();
    let before = canvas.image().clone();

    let err = canvas.save_as(&path, ImageFormat::Png).unwrap_err();
    assert!(matches!(err, CanvasError::Io { .. }));
    assert!(!canvas.is_saved());
    assert_eq!(canvas.image(), &before);
}

#[test]
fn test_any_change_clears_saved_flag() {
    let dir = tempfile::tempdir().unwrap();
    let mut canvas = create_drawn_canvas();
    canvas.save(dir.path().join("a.png")).unwrap();

    canvas.undo();
    assert!(!canvas.is_saved());

    canvas.save(dir.path().join("b.png")).unwrap();
    canvas
        .pointer_down(Pos2::new(2.0, 2.0), &BrushModel::new())
        .unwrap();
    assert!(!canvas.is_saved());
}

#[test]
fn test_open_replaces_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("source.png");
    PixelBuffer::new(Size::new(64, 64).unwrap(), Color32::BLUE)
        .save(&path)
        .unwrap();

    let mut canvas = create_drawn_canvas();
    canvas.open(&path).unwrap();

    assert!(!canvas.is_edited());
    assert_eq!(canvas.image().size(), Size::new(24, 24).unwrap());
    assert_eq!(canvas.image().pixel(12, 12), Some(Color32::BLUE));
}

#[test]
fn test_failed_open_leaves_document_alone() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("not-an-image.png");
    std::fs::write(&path, b"definitely not a png").unwrap();

    let mut canvas = create_drawn_canvas();
    let before = canvas.image().clone();
    let history = canvas.history().len();

    assert!(matches!(canvas.open(&path), Err(CanvasError::Io { .. })));
    assert!(matches!(
        canvas.open(dir.path().join("nothing-here.png")),
        Err(CanvasError::Io { .. })
    ));
    assert_eq!(canvas.image(), &before);
    assert_eq!(canvas.history().len(), history);
}

#[test]
fn test_canvas_from_settings_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(
        &path,
        r#"{ "canvas": { "width": 10, "height": 5, "background": [0, 0, 0, 255] },
             "brush": { "size": 1, "mode": "StraightLine" } }"#,
    )
    .unwrap();

    let settings = Settings::load(&path).unwrap();
    let mut canvas = Canvas::with_config(&settings.canvas).unwrap();
    assert_eq!(canvas.image().pixel(0, 0), Some(Color32::BLACK));

    canvas
        .pointer_down(Pos2::new(0.0, 2.0), &settings.brush)
        .unwrap();
    canvas
        .pointer_up(Pos2::new(9.0, 2.0), &settings.brush)
        .unwrap();
    for x in 0..10 {
        assert_eq!(canvas.image().pixel(x, 2), Some(Color32::RED));
    }
    assert_eq!(canvas.image().pixel(5, 3), Some(Color32::BLACK));
}

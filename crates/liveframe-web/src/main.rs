//! Headless demo (native): runs an editing session against an in-memory page
//! and prints the resulting markup.

#[cfg(feature = "native")]
fn main() {
    use kurbo::{Point, Rect};
    use liveframe_core::{Document, Editor, EditorConfig, EditorEvent, Key, MemoryDocument};
    use liveframe_web::headless::HeadlessManipulator;

    env_logger::init();
    log::info!("Starting LiveFrame demo");

    let config = match std::env::args().nth(1) {
        Some(path) => match std::fs::read_to_string(&path).map(|json| EditorConfig::from_json(&json)) {
            Ok(Ok(config)) => config,
            Ok(Err(e)) => {
                log::warn!("Invalid config {}: {}", path, e);
                EditorConfig::default()
            }
            Err(e) => {
                log::warn!("Cannot read {}: {}", path, e);
                EditorConfig::default()
            }
        },
        None => EditorConfig::default(),
    };

    let doc = MemoryDocument::new().with_viewport(800.0, 600.0);
    let Some(body) = doc.body() else {
        return;
    };
    let page = doc.append_element(body, "main");
    doc.set_layout(page, Rect::new(0.0, 0.0, 1600.0, 1200.0));
    let heading = doc.append_element(page, "h1");
    doc.append_text(heading, "Quarterly report");
    doc.set_layout(heading, Rect::new(40.0, 40.0, 640.0, 100.0));

    let mut editor = pollster::block_on(Editor::initialize(doc, config, async {
        Ok(HeadlessManipulator::new())
    }));
    editor.fit_to_viewport();
    if let Some(snapshot) = editor.snapshot() {
        log::info!("Content scaled by {}", snapshot.scale);
    }

    editor.handle_event(EditorEvent::PointerDown {
        target: Some(heading),
        client: Point::new(30.0, 30.0),
    });
    editor.handle_event(EditorEvent::DoubleClick { target: Some(heading) });
    editor.handle_event(EditorEvent::KeyDown { key: Key::Enter });
    editor.toggle_bold();
    editor.set_text_color("#1d4ed8");

    editor.arm_text_insert();
    editor.handle_event(EditorEvent::PointerDown {
        target: None,
        client: Point::new(60.0, 300.0),
    });

    println!("{}", editor.serialize_document());
    editor.teardown();
}

#[cfg(not(feature = "native"))]
fn main() {
    eprintln!("Native feature not enabled. Use `cargo run --features native`");
}

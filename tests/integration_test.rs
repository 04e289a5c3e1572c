use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use farmdash::{App, AppEvent, Focus, GenderFilter, PipelineError, SelectionOverrides, Views};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::widgets::Widget;
use std::sync::mpsc;
use tempfile::TempDir;

mod common;

fn new_app() -> App {
    let (tx, _rx) = mpsc::channel();
    App::new(tx)
}

fn press(app: &mut App, code: KeyCode) -> Option<AppEvent> {
    app.event(&AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)))
}

fn ok_views(app: &App) -> &Views {
    match app.views() {
        Some(Ok(views)) => views,
        Some(Err(e)) => panic!("derivation failed: {}", e),
        None => panic!("nothing loaded"),
    }
}

fn screen_text(app: &mut App, width: u16, height: u16) -> String {
    let area = Rect::new(0, 0, width, height);
    let mut buf = Buffer::empty(area);
    app.render(area, &mut buf);
    buf.content().iter().map(|cell| cell.symbol()).collect()
}

#[test]
fn test_open_derives_default_views() {
    let dir = TempDir::new().unwrap();
    let mut app = new_app();
    app.open(&common::kadapa_farmers(dir.path()));

    assert!(app.pipeline().is_loaded());
    assert!(app.load_error().is_none());
    assert!(!app.error_modal.active);
    let views = ok_views(&app);
    assert_eq!(views.selection.village.as_deref(), Some("Pulivendula"));
    assert_eq!(app.village_cursor(), 0);
    // One unreadable area cell
    let status = app.status().unwrap_or_default();
    assert!(status.contains("1 unreadable"), "{}", status);
}

#[test]
fn test_keyboard_selection_flow() {
    let dir = TempDir::new().unwrap();
    let mut app = new_app();
    app.open(&common::kadapa_farmers(dir.path()));

    // Untick Groundnut
    assert_eq!(app.focus, Focus::Crops);
    press(&mut app, KeyCode::Char(' '));
    let views = ok_views(&app);
    assert_eq!(views.selection.crops, vec!["Paddy", "Cotton"]);
    assert_eq!(
        views.village_options,
        vec!["Rayachoti", "Pulivendula", "Badvel"]
    );
    assert_eq!(views.selection.village.as_deref(), Some("Pulivendula"));
    assert_eq!(app.village_cursor(), 1);

    // Males only: Pulivendula has no male Paddy/Cotton farmer
    press(&mut app, KeyCode::Tab);
    assert_eq!(app.focus, Focus::Gender);
    press(&mut app, KeyCode::Right);
    let views = ok_views(&app);
    assert_eq!(views.selection.gender, GenderFilter::M);
    assert_eq!(views.village_options, vec!["Rayachoti"]);
    assert_eq!(views.selection.village.as_deref(), Some("Rayachoti"));

    // Every crop again; the village sticks
    press(&mut app, KeyCode::Char('a'));
    let views = ok_views(&app);
    assert_eq!(views.selection.crops, vec!["Groundnut", "Paddy", "Cotton"]);
    assert_eq!(views.village_options, vec!["Pulivendula", "Rayachoti"]);
    assert_eq!(views.selection.village.as_deref(), Some("Rayachoti"));
    assert_eq!(app.village_cursor(), 1);

    // Pick Pulivendula from the list
    press(&mut app, KeyCode::Tab);
    assert_eq!(app.focus, Focus::Village);
    press(&mut app, KeyCode::Up);
    press(&mut app, KeyCode::Enter);
    let views = ok_views(&app);
    assert_eq!(views.selection.village.as_deref(), Some("Pulivendula"));
    let names: Vec<&str> = views
        .area_by_farmer
        .iter()
        .map(|b| b.farmer.as_str())
        .collect();
    assert_eq!(names, vec!["Ravi", "Mahesh"]);

    // Clearing crops empties every filtered view
    press(&mut app, KeyCode::Char('n'));
    let views = ok_views(&app);
    assert!(views.selection.crops.is_empty());
    assert_eq!(views.filtered_rows, 0);
    assert!(views.selection.village.is_none());
    assert_eq!(views.farmers.len(), 7);
}

#[test]
fn test_table_scrolling_is_clamped() {
    let dir = TempDir::new().unwrap();
    let mut app = new_app();
    app.open(&common::kadapa_farmers(dir.path()));

    for _ in 0..3 {
        press(&mut app, KeyCode::BackTab);
    }
    assert_eq!(app.focus, Focus::Gender);
    press(&mut app, KeyCode::BackTab);
    assert_eq!(app.focus, Focus::Crops);
    press(&mut app, KeyCode::BackTab);
    assert_eq!(app.focus, Focus::Tables);

    press(&mut app, KeyCode::PageDown);
    assert_eq!(app.table_offset(), 6);
    press(&mut app, KeyCode::Up);
    assert_eq!(app.table_offset(), 5);
    press(&mut app, KeyCode::Home);
    assert_eq!(app.table_offset(), 0);
    press(&mut app, KeyCode::End);
    assert_eq!(app.table_offset(), 6);
}

#[test]
fn test_schema_error_keeps_table_and_repeats() {
    let dir = TempDir::new().unwrap();
    let mut app = new_app();
    app.open(&common::missing_mobile(dir.path()));

    assert!(app.pipeline().is_loaded());
    assert!(app.error_modal.active);
    assert!(app.error_modal.message.contains("\"Mobile No\""));
    let first = match app.views() {
        Some(Err(PipelineError::Schema(e))) => e.clone(),
        _ => panic!("expected schema error"),
    };

    // Keys are swallowed until the modal is dismissed
    press(&mut app, KeyCode::Tab);
    assert_eq!(app.focus, Focus::Crops);
    press(&mut app, KeyCode::Esc);
    assert!(!app.error_modal.active);

    press(&mut app, KeyCode::Tab);
    press(&mut app, KeyCode::Right);
    match app.views() {
        Some(Err(PipelineError::Schema(e))) => assert_eq!(*e, first),
        _ => panic!("expected the same schema error"),
    }

    press(&mut app, KeyCode::Char('e'));
    app.event(&AppEvent::ExportCharts);
    assert_eq!(app.status(), Some("Nothing to export"));
}

#[test]
fn test_failed_open_leaves_nothing_loaded() {
    let dir = TempDir::new().unwrap();
    let mut app = new_app();
    app.open(&common::three_farmers(dir.path()));
    assert!(app.pipeline().is_loaded());

    let missing = dir.path().join("missing.xlsx");
    app.open(&missing);
    assert!(!app.pipeline().is_loaded());
    assert!(app.views().is_none());
    assert!(app.error_modal.active);
    let message = app.load_error().unwrap_or_default();
    assert!(message.contains("missing.xlsx"), "{}", message);
    assert_eq!(app.path(), Some(missing.as_path()));

    press(&mut app, KeyCode::Enter);
    app.open(&common::three_farmers(dir.path()));
    assert!(app.pipeline().is_loaded());
    assert!(app.load_error().is_none());
}

#[test]
fn test_initial_selection_applies_to_first_table_only() {
    let dir = TempDir::new().unwrap();
    let path = common::three_farmers(dir.path());
    let mut app = new_app();
    app.set_initial_selection(SelectionOverrides {
        crops: vec!["Wheat".to_string()],
        gender: GenderFilter::M,
        village: None,
    });

    app.open(&path);
    let views = ok_views(&app);
    assert_eq!(views.selection.crops, vec!["Wheat"]);
    assert_eq!(views.selection.village.as_deref(), Some("B"));

    app.open(&path);
    let views = ok_views(&app);
    assert_eq!(views.selection.crops, vec!["Rice", "Wheat"]);
    assert_eq!(views.selection.gender, GenderFilter::All);
}

#[test]
fn test_quit_and_help_keys() {
    let mut app = new_app();
    press(&mut app, KeyCode::Char('?'));
    assert!(app.show_help);
    // 'q' closes help before it quits
    assert!(press(&mut app, KeyCode::Char('q')).is_none());
    assert!(!app.show_help);
    assert!(matches!(
        press(&mut app, KeyCode::Char('q')),
        Some(AppEvent::Exit)
    ));
    assert!(matches!(
        press(&mut app, KeyCode::Char('e')),
        Some(AppEvent::ExportCharts)
    ));
}

#[test]
fn test_render_loaded_dashboard() {
    let dir = TempDir::new().unwrap();
    let mut app = new_app();
    let empty = screen_text(&mut app, 160, 50);
    assert!(empty.contains("Farmer Information Dashboard"));

    app.open(&common::kadapa_farmers(dir.path()));
    let text = screen_text(&mut app, 160, 50);
    assert!(text.contains("Farmers Information Table"));
    assert!(text.contains("Pulivendula"));
    assert!(text.contains("Groundnut"));
    assert!(text.contains("Farmers Count"));
}

#[test]
fn test_render_small_terminal_does_not_panic() {
    let dir = TempDir::new().unwrap();
    let mut app = new_app();
    app.open(&common::kadapa_farmers(dir.path()));
    press(&mut app, KeyCode::Char('?'));
    screen_text(&mut app, 20, 6);
    press(&mut app, KeyCode::Esc);
    press(&mut app, KeyCode::Char('o'));
    screen_text(&mut app, 20, 6);
}

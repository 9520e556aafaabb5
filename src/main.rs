use anyhow::Result;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;
use glam::DVec2;
use map_sketch::app::{App, Tool};
use map_sketch::map::BaseMap;
use map_sketch::{data, ui};
use ratatui::DefaultTerminal;
use std::path::Path;
use std::time::Duration;

fn main() -> Result<()> {
    // Initialize terminal
    let mut terminal = ratatui::init();
    terminal.clear()?;

    // Enable mouse capture
    execute!(std::io::stdout(), EnableMouseCapture)?;

    // Run the app
    let result = run(&mut terminal);

    // Disable mouse capture and restore terminal
    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    result
}

/// Mouse cell position → document pixel coordinates inside the map border.
fn cell_to_pixels(column: u16, row: u16) -> DVec2 {
    DVec2::new(
        column.saturating_sub(1) as f64 * 2.0,
        row.saturating_sub(1) as f64 * 4.0,
    )
}

/// Handle mouse events: wheel zoom, middle-button pan, left-button gestures
fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let doc = cell_to_pixels(mouse.column, mouse.row);

    match mouse.kind {
        // Scroll wheel zooms towards the cursor
        MouseEventKind::ScrollUp => {
            app.mouse_moved(doc);
            app.zoom_in_at_cursor();
        }
        MouseEventKind::ScrollDown => {
            app.mouse_moved(doc);
            app.zoom_out_at_cursor();
        }
        // Left button drives the active tool
        MouseEventKind::Down(MouseButton::Left) => app.press(doc),
        MouseEventKind::Drag(MouseButton::Left) => app.drag(doc),
        MouseEventKind::Up(MouseButton::Left) => app.release(doc),
        // Middle button always pans regardless of tool
        MouseEventKind::Down(MouseButton::Middle) => {
            let previous = app.tool;
            app.set_tool(Tool::Pan);
            app.press(doc);
            app.tool = previous;
        }
        MouseEventKind::Drag(MouseButton::Middle) => app.drag(doc),
        MouseEventKind::Up(MouseButton::Middle) => app.release(doc),
        MouseEventKind::Moved => app.mouse_moved(doc),
        _ => {}
    }
}

fn run(terminal: &mut DefaultTerminal) -> Result<()> {
    let data_dir = Path::new("data");

    let maps = match data::load_map_catalog(&data_dir.join("maps.json")) {
        Ok(maps) => maps,
        Err(_) => data::default_maps(),
    };

    let mut basemap = BaseMap::new();
    if data_dir.exists() {
        let _ = data::load_basemap(&mut basemap, data_dir);
    }
    if !basemap.has_data() {
        data::generate_simple_world(&mut basemap);
    }

    let size = terminal.size()?;
    let mut app = App::new(maps, basemap, size.width as usize, size.height as usize);

    // Main loop
    loop {
        terminal.draw(|frame| ui::render(frame, &app))?;

        // Handle events with ~60fps target
        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key) => {
                    // Only handle key press events (not release)
                    if key.kind == KeyEventKind::Press {
                        match key.code {
                            KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,

                            // Pan with hjkl or arrow keys
                            KeyCode::Left | KeyCode::Char('h') => app.pan_by_pixels(-10.0, 0.0),
                            KeyCode::Right | KeyCode::Char('l') => app.pan_by_pixels(10.0, 0.0),
                            KeyCode::Up | KeyCode::Char('k') => app.pan_by_pixels(0.0, -6.0),
                            KeyCode::Down | KeyCode::Char('j') => app.pan_by_pixels(0.0, 6.0),

                            // Zoom
                            KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in_at_cursor(),
                            KeyCode::Char('-') | KeyCode::Char('_') => app.zoom_out_at_cursor(),

                            // Tools
                            KeyCode::Char('p') => app.set_tool(Tool::Pan),
                            KeyCode::Char('z') => app.set_tool(Tool::ZoomBox),
                            KeyCode::Char('d') => app.set_tool(Tool::Draw),
                            KeyCode::Char('m') => app.set_tool(Tool::Move),
                            KeyCode::Char('r') => app.set_tool(Tool::Rotate),
                            KeyCode::Char('x') => app.set_tool(Tool::Delete),

                            KeyCode::Char('c') => app.cycle_color(),
                            KeyCode::Tab => app.next_map(),
                            KeyCode::Char('0') => app.reset_view(),

                            _ => {}
                        }
                    }
                }
                Event::Mouse(mouse) => {
                    handle_mouse(&mut app, mouse);
                }
                Event::Resize(width, height) => {
                    app.resize(width as usize, height as usize);
                }
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

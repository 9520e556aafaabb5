use crate::app::{App, Gesture};
use crate::braille::BrailleCanvas;
use crate::geo::{format_latitude, format_longitude};
use crate::map::geometry::draw_dashed_line;
use crate::map::renderer::{new_canvas, render_map_frame, render_shape, ShapeLayer};
use crate::map::{Lod, ViewState};
use glam::DVec2;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
    Frame,
};

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Split into map area and status bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Map
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    render_map(frame, app, chunks[0]);
    render_status_bar(frame, app, chunks[1]);
}

fn render_map(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            format!(" {} ", app.current_map().name),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Braille gives 2x4 resolution per character
    let mut view = app.view.clone();
    view.set_size(inner.width as usize * 2, inner.height as usize * 4);

    let basemap = app.basemap.render(&view, &app.projection);
    let map_frame = render_map_frame(&view);

    let mut shapes: Vec<ShapeLayer> = app
        .shapes
        .iter()
        .filter(|(_, s)| !s.hidden)
        .map(|(id, s)| render_shape(s, &view, app.selected == Some(id)))
        .collect();

    // The working clone of an in-flight move/rotate draws on top,
    // unselected so it reads as a preview
    match &app.gesture {
        Gesture::Move { working, .. } | Gesture::Rotate { working, .. } => {
            shapes.push(render_shape(working, &view, false));
        }
        _ => {}
    }

    let cursor_pos = app.mouse_pos.and_then(|p| {
        let cx = (p.x as i64 / 2) as u16;
        let cy = (p.y as i64 / 4) as u16;
        if p.x >= 0.0 && p.y >= 0.0 && cx < inner.width && cy < inner.height {
            Some((cx, cy))
        } else {
            None
        }
    });

    let widget = MapWidget {
        basemap,
        map_frame,
        shapes,
        preview: render_preview(app, &view),
        cursor_pos,
    };
    frame.render_widget(widget, inner);
}

/// Dashed overlay for gestures that are not yet committed: the freehand
/// stroke being drawn, or the zoom box.
fn render_preview(app: &App, view: &ViewState) -> Option<BrailleCanvas> {
    match &app.gesture {
        Gesture::Draw { xs, ys } => {
            let mut canvas = new_canvas(view);
            for i in 1..xs.len() {
                draw_dashed_line(
                    &mut canvas,
                    xs[i - 1] as i32,
                    ys[i - 1] as i32,
                    xs[i] as i32,
                    ys[i] as i32,
                );
            }
            // Rubber band from the last vertex to the cursor
            if let (Some(m), Some(&lx), Some(&ly)) = (app.mouse_pos, xs.last(), ys.last()) {
                draw_dashed_line(&mut canvas, lx as i32, ly as i32, m.x as i32, m.y as i32);
            }
            Some(canvas)
        }
        Gesture::ZoomBox { start, current } => {
            let mut canvas = new_canvas(view);
            let (x0, y0) = (start.x as i32, start.y as i32);
            let (x1, y1) = (current.x as i32, current.y as i32);
            draw_dashed_line(&mut canvas, x0, y0, x1, y0);
            draw_dashed_line(&mut canvas, x1, y0, x1, y1);
            draw_dashed_line(&mut canvas, x1, y1, x0, y1);
            draw_dashed_line(&mut canvas, x0, y1, x0, y0);
            Some(canvas)
        }
        _ => None,
    }
}

/// Custom widget compositing the braille layers back to front.
struct MapWidget {
    basemap: BrailleCanvas,
    map_frame: BrailleCanvas,
    shapes: Vec<ShapeLayer>,
    preview: Option<BrailleCanvas>,
    cursor_pos: Option<(u16, u16)>,
}

impl MapWidget {
    /// Render a braille canvas layer with a specific color
    fn render_layer(canvas: &BrailleCanvas, color: Color, area: Rect, buf: &mut Buffer) {
        for (row_idx, row_str) in canvas.rows().enumerate() {
            if row_idx >= area.height as usize {
                break;
            }
            let y = area.y + row_idx as u16;

            for (col_idx, ch) in row_str.chars().enumerate() {
                if col_idx >= area.width as usize {
                    break;
                }
                // Skip empty braille characters (U+2800)
                if ch == '\u{2800}' {
                    continue;
                }
                let x = area.x + col_idx as u16;
                buf[(x, y)].set_char(ch).set_fg(color);
            }
        }
    }
}

impl Widget for MapWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // 1. Map frame (DarkGray - at back)
        Self::render_layer(&self.map_frame, Color::DarkGray, area, buf);

        // 2. Coastlines (Gray)
        Self::render_layer(&self.basemap, Color::Gray, area, buf);

        // 3. Annotations: fill in the shape's color, outline on top
        for layer in &self.shapes {
            Self::render_layer(&layer.fill, layer.color, area, buf);
            let outline_color = if layer.selected {
                Color::Red
            } else {
                Color::White
            };
            Self::render_layer(&layer.outline, outline_color, area, buf);
        }

        // 4. Gesture preview (Red dashes - on top)
        if let Some(preview) = &self.preview {
            Self::render_layer(preview, Color::Red, area, buf);
        }

        // Render cursor marker
        if let Some((cx, cy)) = self.cursor_pos {
            let x = area.x + cx;
            let y = area.y + cy;
            if x < area.x + area.width && y < area.y + area.height {
                buf[(x, y)].set_char('╋').set_fg(Color::Red);
            }
        }
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let coords = match app.cursor_map_pos() {
        Some(m) => {
            let g = app.projection.inverse(DVec2::new(m.x, m.y));
            format!("{} {}", format_latitude(g.lat), format_longitude(g.lon))
        }
        None => String::new(),
    };

    let status = Line::from(vec![
        Span::styled(" Tool: ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.tool.label(), Style::default().fg(Color::Yellow)),
        Span::styled(" | Zoom: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("{:.1}x", app.view.zoom),
            Style::default().fg(Color::Yellow),
        ),
        Span::styled(" (", Style::default().fg(Color::DarkGray)),
        Span::styled(
            Lod::from_zoom(app.view.zoom).label(),
            Style::default().fg(Color::Magenta),
        ),
        Span::styled(") ", Style::default().fg(Color::DarkGray)),
        Span::styled("■ ", Style::default().fg(app.current_color())),
        Span::styled("| ", Style::default().fg(Color::DarkGray)),
        Span::styled(coords, Style::default().fg(Color::Cyan)),
        Span::styled(
            " | p/z/d/m/r/x:tools c:color Tab:map hjkl:pan +/-:zoom 0:reset q:quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let paragraph = Paragraph::new(status);
    frame.render_widget(paragraph, area);
}

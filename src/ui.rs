pub mod screen;

use rand::Rng;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Gauge, Paragraph, Widget},
};

use crate::app::App;
use crate::session::SessionView;
use crate::util::progress_ratio;
use screen::current_screen;

const HORIZONTAL_MARGIN: u16 = 2;
const VERTICAL_MARGIN: u16 = 1;

/// Position and size of the phase currently on screen, if it has one.
fn progress(view: &SessionView) -> Option<(usize, usize)> {
    match view {
        SessionView::Learning {
            position, total, ..
        }
        | SessionView::MultipleChoice {
            position, total, ..
        }
        | SessionView::Writing {
            position, total, ..
        } => Some((*position, *total)),
        SessionView::Idle | SessionView::Results(_) => None,
    }
}

impl<R: Rng> Widget for &App<R> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let view = self.view();
        let screen = current_screen(view.phase());
        let answered = self.machine.is_answered();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(1),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(area);

        let header = Block::default()
            .borders(Borders::ALL)
            .title(Span::styled(
                screen.title(),
                Style::default().add_modifier(Modifier::BOLD),
            ));
        match progress(&view) {
            Some((position, total)) => Gauge::default()
                .block(header)
                .gauge_style(Style::default().fg(Color::Cyan))
                .ratio(progress_ratio(position, total))
                .label(format!("{} / {total}", position + 1))
                .render(chunks[0], buf),
            None => header.render(chunks[0], buf),
        }

        screen.render_body(&view, &self.ui, chunks[1], buf);

        if let Some(status) = &self.ui.status {
            Paragraph::new(Span::styled(
                status.as_str(),
                Style::default().fg(Color::Yellow),
            ))
            .alignment(Alignment::Center)
            .render(chunks[2], buf);
        }

        Paragraph::new(Span::styled(
            screen.legend(answered),
            Style::default()
                .add_modifier(Modifier::ITALIC)
                .add_modifier(Modifier::DIM),
        ))
        .alignment(Alignment::Center)
        .render(chunks[3], buf);
    }
}

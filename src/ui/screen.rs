use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::app::UiState;
use crate::evaluate::Feedback;
use crate::score::SessionResults;
use crate::session::{Phase, SessionView};
use crate::vocabulary::VocabularyItem;

/// A UI Screen boundary: one per session phase
pub trait Screen {
    fn title(&self) -> &'static str;
    fn legend(&self, answered: bool) -> &'static str;
    fn render_body(&self, view: &SessionView, ui: &UiState, area: Rect, buf: &mut Buffer);
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn dim() -> Style {
    Style::default().add_modifier(Modifier::DIM)
}

fn italic() -> Style {
    Style::default().add_modifier(Modifier::ITALIC)
}

/// A `width` x `height` rectangle centered in `area`, clamped to fit.
fn centered(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Terminal cells for `len` plus `pad`, saturating at `u16::MAX`.
fn cells(len: usize, pad: u16) -> u16 {
    u16::try_from(len).unwrap_or(u16::MAX).saturating_add(pad)
}

/// Splits a sample sentence into its sentences, one per line.
pub fn example_lines(sentence: Option<&str>) -> Vec<String> {
    let Some(sentence) = sentence else {
        return vec!["[No Sample Sentence]".to_string()];
    };

    let mut lines = Vec::new();
    let mut current = String::new();
    let mut chars = sentence.chars().peekable();
    while let Some(c) = chars.next() {
        let ends_sentence =
            matches!(c, '.' | '?' | '!') && chars.peek().is_some_and(|next| next.is_whitespace());
        if ends_sentence {
            lines.push(current.trim().to_string());
            current.clear();
        } else {
            current.push(c);
        }
    }
    lines.push(current.trim().trim_end_matches('.').to_string());

    lines
        .into_iter()
        .filter(|line| !line.is_empty())
        .map(|line| format!("{line}."))
        .collect()
}

fn feedback_line(feedback: &Feedback) -> Line<'static> {
    if feedback.correct {
        Line::from(Span::styled("Correct!", bold().fg(Color::Green)))
    } else {
        Line::from(Span::styled(
            format!("Incorrect. The correct answer is: {}", feedback.correct_answer),
            bold().fg(Color::Red),
        ))
    }
}

pub struct IdleScreen;

impl Screen for IdleScreen {
    fn title(&self) -> &'static str {
        "Wortschatz"
    }

    fn legend(&self, _answered: bool) -> &'static str {
        "(enter) start / (esc)ape"
    }

    fn render_body(&self, _view: &SessionView, ui: &UiState, area: Rect, buf: &mut Buffer) {
        let text = Text::from(vec![
            Line::from(Span::styled("Learn German vocabulary", bold())),
            Line::from(""),
            Line::from(Span::styled(format!("Source: {}", ui.source_label), dim())),
            Line::from(Span::styled(
                format!("Words per session: {}", ui.word_count),
                dim(),
            )),
            Line::from(""),
            Line::from(Span::styled("Press Enter to start", italic())),
        ]);
        Paragraph::new(text)
            .alignment(Alignment::Center)
            .render(centered(area.width, 6, area), buf);
    }
}

pub struct LearningScreen;

impl LearningScreen {
    fn card_lines(item: &VocabularyItem) -> Vec<Line<'static>> {
        let german = if item.german.is_empty() {
            "[No German Word]".to_string()
        } else {
            item.german.clone()
        };
        let english = if item.english.is_empty() {
            "[No Translation]".to_string()
        } else {
            item.english.clone()
        };

        let mut lines = vec![
            Line::from(Span::styled(german, bold().fg(Color::Cyan))),
            Line::from(Span::styled(english, italic())),
            Line::from(""),
        ];
        lines.extend(
            example_lines(item.sample_sentence.as_deref())
                .into_iter()
                .map(|l| Line::from(Span::styled(l, dim()))),
        );
        lines
    }
}

impl Screen for LearningScreen {
    fn title(&self) -> &'static str {
        "Learn"
    }

    fn legend(&self, _answered: bool) -> &'static str {
        "(enter) next / (p)lay pronunciation / (esc)ape"
    }

    fn render_body(&self, view: &SessionView, _ui: &UiState, area: Rect, buf: &mut Buffer) {
        let SessionView::Learning { item, .. } = view else {
            return;
        };
        let lines = Self::card_lines(item);
        let widest = lines.iter().map(|l| l.width()).max().unwrap_or(0);
        let card = centered(cells(widest, 4), cells(lines.len(), 2), area);

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL))
            .render(card, buf);
    }
}

pub struct MultipleChoiceScreen;

impl Screen for MultipleChoiceScreen {
    fn title(&self) -> &'static str {
        "Multiple choice"
    }

    fn legend(&self, answered: bool) -> &'static str {
        if answered {
            "(enter) next / (esc)ape"
        } else {
            "(1-4) choose / (esc)ape"
        }
    }

    fn render_body(&self, view: &SessionView, ui: &UiState, area: Rect, buf: &mut Buffer) {
        let SessionView::MultipleChoice { exercise, .. } = view else {
            return;
        };

        let mut lines = vec![
            Line::from(Span::styled(exercise.prompt_sentence.clone(), bold())),
            Line::from(""),
        ];
        for (idx, option) in exercise.options.iter().enumerate() {
            let style = match &ui.feedback {
                Some(_) if *option == exercise.correct_answer => bold().fg(Color::Green),
                Some(_) if ui.selected == Some(idx) => bold().fg(Color::Red),
                Some(_) => dim(),
                None => Style::default(),
            };
            lines.push(Line::from(Span::styled(format!("{}) {}", idx + 1, option), style)));
        }
        if let Some(feedback) = &ui.feedback {
            lines.push(Line::from(""));
            lines.push(feedback_line(feedback));
        }

        let height = cells(lines.len(), 0);
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(centered(area.width, height, area), buf);
    }
}

pub struct WritingScreen;

impl Screen for WritingScreen {
    fn title(&self) -> &'static str {
        "Writing"
    }

    fn legend(&self, answered: bool) -> &'static str {
        if answered {
            "(enter) next / (esc)ape"
        } else {
            "type the German word / (enter) check / (esc)ape"
        }
    }

    fn render_body(&self, view: &SessionView, ui: &UiState, area: Rect, buf: &mut Buffer) {
        let SessionView::Writing { exercise, .. } = view else {
            return;
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(0),
                Constraint::Length(1), // prompt
                Constraint::Length(1), // padding
                Constraint::Length(3), // input box
                Constraint::Length(1), // feedback
                Constraint::Min(0),
            ])
            .split(area);

        Paragraph::new(Line::from(vec![
            Span::styled("Translate: ", dim()),
            Span::styled(exercise.prompt.clone(), bold()),
        ]))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

        let cursor = if ui.feedback.is_some() { "" } else { "_" };
        let box_width = cells(ui.input.width().max(exercise.correct_answer.width()), 6);
        Paragraph::new(format!("{}{cursor}", ui.input))
            .block(Block::default().borders(Borders::ALL).title("German"))
            .render(centered(box_width.max(24), 3, chunks[3]), buf);

        if let Some(feedback) = &ui.feedback {
            Paragraph::new(feedback_line(feedback))
                .alignment(Alignment::Center)
                .render(chunks[4], buf);
        }
    }
}

pub struct ResultsScreen;

impl ResultsScreen {
    fn score_line(label: &str, correct: usize, total: usize, pct: Option<f64>) -> Line<'static> {
        let pct = pct.map_or(String::from("-"), |p| format!("{p:.0}%"));
        Line::from(vec![
            Span::styled(format!("{label}: "), dim()),
            Span::styled(format!("{correct} / {total}"), bold()),
            Span::styled(format!("  ({pct})"), dim()),
        ])
    }

    fn lines(results: &SessionResults) -> Vec<Line<'static>> {
        let mut lines = vec![
            Line::from(vec![
                Span::styled("Words learned: ", dim()),
                Span::styled(results.word_count.to_string(), bold()),
            ]),
            Self::score_line(
                "Multiple choice",
                results.mc_correct,
                results.mc_total,
                results.mc_percentage(),
            ),
            Self::score_line(
                "Writing",
                results.writing_correct,
                results.writing_total,
                results.writing_percentage(),
            ),
        ];
        if results.is_perfect() {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "Perfect session!",
                bold().fg(Color::Yellow),
            )));
        }
        lines
    }
}

impl Screen for ResultsScreen {
    fn title(&self) -> &'static str {
        "Results"
    }

    fn legend(&self, _answered: bool) -> &'static str {
        "(r)estart / (n)ew session / (esc)ape"
    }

    fn render_body(&self, view: &SessionView, _ui: &UiState, area: Rect, buf: &mut Buffer) {
        let SessionView::Results(results) = view else {
            return;
        };
        let lines = Self::lines(results);
        let height = cells(lines.len(), 0);
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .render(centered(area.width, height, area), buf);
    }
}

/// Helper to construct the appropriate screen for the current phase
pub fn current_screen(phase: Phase) -> Box<dyn Screen> {
    match phase {
        Phase::Idle => Box::new(IdleScreen),
        Phase::Learning => Box::new(LearningScreen),
        Phase::MultipleChoice => Box::new(MultipleChoiceScreen),
        Phase::Writing => Box::new(WritingScreen),
        Phase::Results => Box::new(ResultsScreen),
    }
}

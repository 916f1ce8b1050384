use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rand::rngs::StdRng;
use rand::Rng;
use tracing::{error, info};

use crate::audio::{AudioPlayer, AudioRef};
use crate::error::SessionError;
use crate::evaluate::Feedback;
use crate::exercise::MAX_OPTIONS;
use crate::session::{Phase, SessionMachine, SessionView};
use crate::vocabulary::VocabularySource;

/// What the event loop should do after a key was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// Presentation state that lives outside the session engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UiState {
    pub word_count: usize,
    pub source_label: String,
    /// Writing answer being typed.
    pub input: String,
    /// Option picked in the current multiple-choice item.
    pub selected: Option<usize>,
    pub feedback: Option<Feedback>,
    pub status: Option<String>,
}

/// The terminal front end: turns key presses into session commands.
pub struct App<R: Rng = StdRng> {
    pub machine: SessionMachine<R>,
    pub ui: UiState,
    source: Box<dyn VocabularySource>,
    player: Box<dyn AudioPlayer>,
}

impl<R: Rng> App<R> {
    pub fn new(
        machine: SessionMachine<R>,
        source: Box<dyn VocabularySource>,
        player: Box<dyn AudioPlayer>,
        word_count: usize,
        source_label: String,
    ) -> Self {
        Self {
            machine,
            ui: UiState {
                word_count,
                source_label,
                ..UiState::default()
            },
            source,
            player,
        }
    }

    pub fn view(&self) -> SessionView {
        self.machine.current_view()
    }

    /// Fetches vocabulary and starts a session. Failures end up in the
    /// status line; the machine stays idle.
    pub fn start(&mut self) {
        self.clear_answer();
        match self
            .machine
            .start_session_from(self.source.as_mut(), Some(self.ui.word_count))
        {
            Ok(_) => self.ui.status = None,
            Err(SessionError::EmptyVocabulary) => {
                self.ui.status = Some("No vocabulary words were received. Try another deck.".into())
            }
            Err(err) => self.ui.status = Some(format!("Error: {err}")),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Control {
        if key.code == KeyCode::Esc
            || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c'))
        {
            return Control::Quit;
        }

        let outcome = match self.machine.phase() {
            Phase::Idle => {
                if key.code == KeyCode::Enter {
                    self.start();
                }
                Ok(())
            }
            Phase::Learning => self.on_learning_key(key.code),
            Phase::MultipleChoice => self.on_mc_key(key.code),
            Phase::Writing => self.on_writing_key(key.code),
            Phase::Results => {
                match key.code {
                    KeyCode::Char('r') => {
                        self.machine.restart();
                        self.clear_answer();
                    }
                    KeyCode::Char('n') => self.start(),
                    _ => {}
                }
                Ok(())
            }
        };

        if let Err(err) = outcome {
            error!(error = %err, "command rejected by session");
            self.ui.status = Some(err.to_string());
        }
        Control::Continue
    }

    fn on_learning_key(&mut self, code: KeyCode) -> Result<(), SessionError> {
        match code {
            KeyCode::Enter | KeyCode::Right | KeyCode::Char(' ') => {
                self.ui.status = None;
                self.machine.advance_learning()?;
            }
            KeyCode::Char('p') => {
                if let SessionView::Learning { item, .. } = self.view() {
                    let outcome = self.player.play(&AudioRef::parse(item.audio_ref.as_deref()));
                    info!(word = %item.german, outcome = ?outcome, "pronunciation requested");
                    self.ui.status = Some(outcome.message());
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn on_mc_key(&mut self, code: KeyCode) -> Result<(), SessionError> {
        if self.machine.is_answered() {
            if matches!(code, KeyCode::Enter | KeyCode::Right) {
                self.clear_answer();
                self.machine.advance_mc()?;
            }
            return Ok(());
        }

        let SessionView::MultipleChoice { exercise, .. } = self.view() else {
            return Ok(());
        };
        if let KeyCode::Char(c) = code {
            let choice = c
                .to_digit(10)
                .map(|d| d as usize)
                .filter(|d| (1..=MAX_OPTIONS).contains(d))
                .and_then(|d| exercise.options.get(d - 1).map(|option| (d - 1, option)));
            if let Some((index, option)) = choice {
                self.ui.feedback = Some(self.machine.submit_mc_answer(option)?);
                self.ui.selected = Some(index);
            }
        }
        Ok(())
    }

    fn on_writing_key(&mut self, code: KeyCode) -> Result<(), SessionError> {
        if self.machine.is_answered() {
            if code == KeyCode::Enter {
                self.clear_answer();
                self.machine.advance_writing()?;
            }
            return Ok(());
        }

        match code {
            KeyCode::Char(c) => self.ui.input.push(c),
            KeyCode::Backspace => {
                self.ui.input.pop();
            }
            KeyCode::Enter => {
                self.ui.feedback = Some(self.machine.submit_writing_answer(&self.ui.input)?);
            }
            _ => {}
        }
        Ok(())
    }

    fn clear_answer(&mut self) {
        self.ui.input.clear();
        self.ui.selected = None;
        self.ui.feedback = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SilentPlayer;
    use crate::vocabulary::VocabularyItem;

    fn app_with(words: Vec<VocabularyItem>) -> App {
        App::new(
            SessionMachine::seeded(5),
            Box::new(words),
            Box::new(SilentPlayer::default()),
            10,
            "test".into(),
        )
    }

    fn press(app: &mut App, code: KeyCode) -> Control {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_str(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn enter_starts_a_session() {
        let mut app = app_with(vec![VocabularyItem::new("das Haus", "the house")]);
        assert_eq!(app.machine.phase(), Phase::Idle);

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.machine.phase(), Phase::Learning);
        assert_eq!(app.ui.status, None);
    }

    #[test]
    fn empty_source_reports_status() {
        let mut app = app_with(Vec::new());
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.machine.phase(), Phase::Idle);
        assert!(app.ui.status.as_deref().unwrap().contains("No vocabulary"));
    }

    #[test]
    fn full_session_through_keys() {
        let mut app = app_with(vec![VocabularyItem::new("das Haus", "the house")]);
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.machine.phase(), Phase::MultipleChoice);

        press(&mut app, KeyCode::Char('1'));
        assert_eq!(app.ui.selected, Some(0));
        assert!(app.ui.feedback.as_ref().unwrap().correct);

        // A second pick is ignored once answered.
        press(&mut app, KeyCode::Char('1'));
        assert_eq!(app.machine.score().mc_correct(), 1);

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.machine.phase(), Phase::Writing);
        assert_eq!(app.ui.feedback, None);

        type_str(&mut app, "DAS HAUZ");
        press(&mut app, KeyCode::Backspace);
        type_str(&mut app, "S");
        assert_eq!(app.ui.input, "DAS HAUS");
        press(&mut app, KeyCode::Enter);
        assert!(app.ui.feedback.as_ref().unwrap().correct);

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.machine.phase(), Phase::Results);
        assert!(app.machine.results().unwrap().is_perfect());

        press(&mut app, KeyCode::Char('r'));
        assert_eq!(app.machine.phase(), Phase::Idle);
    }

    #[test]
    fn out_of_range_option_is_ignored() {
        let mut app = app_with(vec![
            VocabularyItem::new("eins", "one"),
            VocabularyItem::new("zwei", "two"),
        ]);
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.machine.phase(), Phase::MultipleChoice);

        press(&mut app, KeyCode::Char('3'));
        press(&mut app, KeyCode::Char('9'));
        assert!(!app.machine.is_answered());
    }

    #[test]
    fn play_reports_through_status() {
        let mut app = app_with(vec![
            VocabularyItem::new("das Haus", "the house").with_audio("https://audio.example/haus.mp3")
        ]);
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('p'));
        assert_eq!(app.ui.status.as_deref(), Some("Playing pronunciation"));
        assert_eq!(app.machine.phase(), Phase::Learning);
    }

    #[test]
    fn new_session_from_results() {
        let mut app = app_with(vec![VocabularyItem::new("das Haus", "the house")]);
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Enter); // needs an answer first
        assert_eq!(app.machine.phase(), Phase::MultipleChoice);
        press(&mut app, KeyCode::Char('1'));
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Enter); // submit empty writing answer
        assert!(!app.ui.feedback.as_ref().unwrap().correct);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.machine.phase(), Phase::Results);

        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.machine.phase(), Phase::Learning);
        assert_eq!(app.machine.score().mc_correct(), 0);
    }

    #[test]
    fn escape_and_ctrl_c_quit() {
        let mut app = app_with(Vec::new());
        assert_eq!(press(&mut app, KeyCode::Esc), Control::Quit);
        assert_eq!(
            app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Control::Quit
        );
        assert_eq!(press(&mut app, KeyCode::Char('x')), Control::Continue);
    }
}

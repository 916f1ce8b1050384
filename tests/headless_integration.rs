use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use wortschatz::{
    app::{App, Control},
    audio::{AudioRef, AudioPlayer, PlaybackOutcome},
    runtime::{AppEvent, ChannelEventSource, Runner},
    vocabulary::{BundledDeck, VocabularyItem},
    Phase, SessionMachine,
};

/// Player that only remembers what it was asked to play.
#[derive(Default)]
struct Recorder(std::rc::Rc<std::cell::RefCell<Vec<AudioRef>>>);

impl AudioPlayer for Recorder {
    fn play(&mut self, audio: &AudioRef) -> PlaybackOutcome {
        self.0.borrow_mut().push(audio.clone());
        PlaybackOutcome::Started
    }
}

// Drives the app like the binary's loop would, but without a terminal.
fn drive(app: &mut App, runner: &Runner<ChannelEventSource>, max_steps: usize) -> Control {
    for _ in 0..max_steps {
        if let AppEvent::Key(key) = runner.step() {
            if app.handle_key(key) == Control::Quit {
                return Control::Quit;
            }
        }
    }
    Control::Continue
}

fn keys(codes: &[KeyCode]) -> Vec<AppEvent> {
    codes.iter().map(|&code| AppEvent::key(code)).collect()
}

#[test]
fn headless_session_over_bundled_deck() {
    let mut app = App::new(
        SessionMachine::seeded(11),
        Box::new(BundledDeck::default()),
        Box::new(Recorder::default()),
        2,
        "deck: german_basics".into(),
    );

    // Learn both words, then answer every quiz item.
    let mut events = keys(&[KeyCode::Enter, KeyCode::Enter, KeyCode::Right]);
    events.extend(keys(&[
        KeyCode::Char('1'),
        KeyCode::Enter,
        KeyCode::Char('2'),
        KeyCode::Enter,
    ]));
    let (source, _tx) = ChannelEventSource::scripted(events);
    let runner = Runner::new(source, Duration::from_millis(5));

    assert_eq!(drive(&mut app, &runner, 10), Control::Continue);
    assert_eq!(app.machine.phase(), Phase::Writing);
    assert_eq!(app.machine.state().vocabulary.len(), 2);

    // Type the right answer for whichever prompt comes first.
    let answer = app.machine.state().writing_exercises[0].correct_answer.clone();
    let mut events: Vec<AppEvent> = answer
        .to_ascii_uppercase()
        .chars()
        .map(|c| AppEvent::key(KeyCode::Char(c)))
        .collect();
    events.extend(keys(&[
        KeyCode::Enter,
        KeyCode::Enter,
        KeyCode::Char('x'),
        KeyCode::Enter,
        KeyCode::Enter,
    ]));
    let (source, _tx) = ChannelEventSource::scripted(events);
    let runner = Runner::new(source, Duration::from_millis(5));
    drive(&mut app, &runner, answer.chars().count() + 10);

    let results = app.machine.results().unwrap();
    assert_eq!(results.word_count, 2);
    assert_eq!(results.mc_total, 2);
    assert_eq!(results.writing_correct, 1);
    assert_eq!(results.writing_total, 2);
    assert!(results.mc_correct <= 2);
}

#[test]
fn pronunciation_and_quit() {
    let played = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
    let mut app = App::new(
        SessionMachine::seeded(1),
        Box::new(vec![
            VocabularyItem::new("der Hund", "the dog").with_audio("[sound:hund.mp3]"),
            VocabularyItem::new("die Katze", "the cat"),
        ]),
        Box::new(Recorder(played.clone())),
        10,
        "test".into(),
    );

    let (source, tx) = ChannelEventSource::scripted(keys(&[
        KeyCode::Enter,
        KeyCode::Char('p'),
        KeyCode::Char(' '),
        KeyCode::Char('p'),
    ]));
    let runner = Runner::new(source, Duration::from_millis(5));
    drive(&mut app, &runner, 6);

    assert_eq!(app.machine.phase(), Phase::Learning);
    assert_eq!(
        *played.borrow(),
        vec![
            AudioRef::AnkiPlaceholder {
                filename: "hund.mp3".into()
            },
            AudioRef::Unavailable,
        ]
    );

    tx.send(AppEvent::Key(KeyEvent::new(
        KeyCode::Char('c'),
        KeyModifiers::CONTROL,
    )))
    .unwrap();
    assert_eq!(drive(&mut app, &runner, 3), Control::Quit);
}

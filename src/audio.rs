use tracing::{debug, warn};
use webbrowser::Browser;

/// What an item's `audio_ref` points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioRef {
    /// A pronunciation recording reachable over http(s).
    Url(String),
    /// Legacy Anki media reference, `[sound:NAME]`. The file itself is not
    /// available to us.
    AnkiPlaceholder { filename: String },
    Unavailable,
}

impl AudioRef {
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
            return AudioRef::Unavailable;
        };

        if raw.starts_with("http://") || raw.starts_with("https://") {
            AudioRef::Url(raw.to_string())
        } else if let Some(name) = raw
            .strip_prefix("[sound:")
            .and_then(|rest| rest.strip_suffix(']'))
        {
            AudioRef::AnkiPlaceholder {
                filename: name.to_string(),
            }
        } else {
            AudioRef::Unavailable
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackOutcome {
    Started,
    Failed(String),
    Unavailable(String),
}

impl PlaybackOutcome {
    /// One-line status for the presentation layer.
    pub fn message(&self) -> String {
        match self {
            PlaybackOutcome::Started => "Playing pronunciation".to_string(),
            PlaybackOutcome::Failed(reason) => format!("Could not play audio: {reason}"),
            PlaybackOutcome::Unavailable(reason) => reason.clone(),
        }
    }
}

pub trait AudioPlayer {
    fn play(&mut self, audio: &AudioRef) -> PlaybackOutcome;
}

/// Hands pronunciation URLs to the system browser.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserPlayer;

impl AudioPlayer for BrowserPlayer {
    fn play(&mut self, audio: &AudioRef) -> PlaybackOutcome {
        match audio {
            AudioRef::Url(url) => {
                if !Browser::is_available() {
                    return PlaybackOutcome::Unavailable("No browser available for playback".into());
                }
                debug!(%url, "opening pronunciation");
                match webbrowser::open(url) {
                    Ok(()) => PlaybackOutcome::Started,
                    Err(err) => {
                        warn!(error = %err, "audio playback failed");
                        PlaybackOutcome::Failed(err.to_string())
                    }
                }
            }
            AudioRef::AnkiPlaceholder { filename } => PlaybackOutcome::Unavailable(format!(
                "Pronunciation file: {filename} (direct playback not available)"
            )),
            AudioRef::Unavailable => {
                PlaybackOutcome::Unavailable("No pronunciation available for this word".into())
            }
        }
    }
}

/// Records requests instead of playing them.
#[derive(Debug, Default, Clone)]
pub struct SilentPlayer {
    pub played: Vec<AudioRef>,
}

impl AudioPlayer for SilentPlayer {
    fn play(&mut self, audio: &AudioRef) -> PlaybackOutcome {
        self.played.push(audio.clone());
        match audio {
            AudioRef::Url(_) => PlaybackOutcome::Started,
            _ => PlaybackOutcome::Unavailable("No pronunciation available for this word".into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_urls() {
        assert_eq!(
            AudioRef::parse(Some("https://audio.example/haus.mp3")),
            AudioRef::Url("https://audio.example/haus.mp3".into())
        );
        assert_eq!(
            AudioRef::parse(Some(" http://audio.example/a.mp3 ")),
            AudioRef::Url("http://audio.example/a.mp3".into())
        );
    }

    #[test]
    fn parses_anki_placeholders() {
        assert_eq!(
            AudioRef::parse(Some("[sound:haus.mp3]")),
            AudioRef::AnkiPlaceholder {
                filename: "haus.mp3".into()
            }
        );
    }

    #[test]
    fn anything_else_is_unavailable() {
        assert_eq!(AudioRef::parse(None), AudioRef::Unavailable);
        assert_eq!(AudioRef::parse(Some("")), AudioRef::Unavailable);
        assert_eq!(AudioRef::parse(Some("haus.mp3")), AudioRef::Unavailable);
        assert_eq!(AudioRef::parse(Some("[sound:haus.mp3")), AudioRef::Unavailable);
    }

    #[test]
    fn browser_player_never_plays_placeholders() {
        let outcome = BrowserPlayer.play(&AudioRef::AnkiPlaceholder {
            filename: "haus.mp3".into(),
        });
        assert_eq!(
            outcome.message(),
            "Pronunciation file: haus.mp3 (direct playback not available)"
        );
        assert_eq!(
            BrowserPlayer.play(&AudioRef::Unavailable),
            PlaybackOutcome::Unavailable("No pronunciation available for this word".into())
        );
    }

    #[test]
    fn silent_player_records_requests() {
        let mut player = SilentPlayer::default();
        assert_eq!(
            player.play(&AudioRef::Url("https://a/b.mp3".into())),
            PlaybackOutcome::Started
        );
        assert_eq!(player.played.len(), 1);
    }
}

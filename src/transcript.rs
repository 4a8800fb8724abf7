/*!
 * Speech-to-text boundary.
 *
 * The scoring core only ever sees a final transcript string. Capability
 * detection happens once, here, and interim results never leave the
 * assembler.
 */

use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Whether a speech-to-text provider is present
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SpeechCapability {
    Unsupported,
    Available { provider: String },
}

impl SpeechCapability {
    /// Pick the first named provider, if any
    pub fn detect<I, S>(providers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let found = providers
            .into_iter()
            .map(|p| p.as_ref().trim().to_string())
            .find(|p| !p.is_empty());

        match found {
            Some(provider) => {
                debug!("Speech input available via {}", provider);
                Self::Available { provider }
            }
            None => Self::Unsupported,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available { .. })
    }
}

/// One result delivered by a speech provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub text: String,
    /// Interim segments may still be revised by the provider
    pub is_final: bool,
}

impl TranscriptSegment {
    pub fn interim(text: &str) -> Self {
        Self {
            text: text.to_string(),
            is_final: false,
        }
    }

    pub fn final_text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            is_final: true,
        }
    }
}

/// Collects provider segments into one candidate text
#[derive(Debug, Clone, Default)]
pub struct TranscriptAssembler {
    finalized: Vec<String>,
    interim: Option<String>,
}

impl TranscriptAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept a segment. A final segment replaces the pending interim one.
    pub fn push(&mut self, segment: TranscriptSegment) {
        let text = segment.text.trim();
        if segment.is_final {
            self.interim = None;
            if !text.is_empty() {
                self.finalized.push(text.to_string());
            }
        } else {
            self.interim = (!text.is_empty()).then(|| text.to_string());
        }
    }

    /// Text to show while the user is still speaking
    pub fn preview(&self) -> String {
        let mut parts: Vec<&str> = self.finalized.iter().map(String::as_str).collect();
        if let Some(interim) = &self.interim {
            parts.push(interim);
        }
        parts.join(" ")
    }

    /// Finalized text so far
    pub fn final_transcript(&self) -> String {
        self.finalized.join(" ")
    }

    pub fn has_pending_interim(&self) -> bool {
        self.interim.is_some()
    }

    /// Stop listening and hand over the finalized transcript.
    ///
    /// A trailing interim segment is dropped.
    pub fn finish(self) -> Option<String> {
        if let Some(interim) = &self.interim {
            warn!("Dropping unconfirmed speech segment: '{}'", interim);
        }
        let transcript = self.final_transcript();
        (!transcript.is_empty()).then_some(transcript)
    }

    pub fn reset(&mut self) {
        self.finalized.clear();
        self.interim = None;
    }
}

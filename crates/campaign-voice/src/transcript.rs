use campaign_types::{Speaker, TranscriptEntry};

/// Append-only transcript of the current call.
///
/// Entries keep strict arrival order. Nothing is reordered or merged, so a
/// provider that streams partial and then final text for one utterance shows
/// both lines.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
    next_seq: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a line and returns its sequence number.
    pub fn append(&mut self, speaker: Speaker, text: impl Into<String>) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(TranscriptEntry {
            speaker,
            text: text.into(),
            seq,
        });
        seq
    }

    /// Empties the transcript. Sequence numbers keep counting so a number is
    /// never reused.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Renders each entry as a display line.
    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(ToString::to_string).collect()
    }

    pub fn render(&self) -> String {
        self.lines().join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_preserves_arrival_order() {
        let mut transcript = Transcript::new();
        for i in 0..10_000 {
            let speaker = if i % 2 == 0 { Speaker::User } else { Speaker::Assistant };
            transcript.append(speaker, format!("line {i}"));
        }

        assert_eq!(transcript.len(), 10_000);
        for (i, entry) in transcript.entries().iter().enumerate() {
            assert_eq!(entry.seq, i as u64);
            assert_eq!(entry.text, format!("line {i}"));
        }
    }

    #[test]
    fn duplicate_partial_lines_are_kept() {
        let mut transcript = Transcript::new();
        transcript.append(Speaker::User, "Hel");
        transcript.append(Speaker::User, "Hello");
        assert_eq!(transcript.lines(), vec!["You: Hel", "You: Hello"]);
    }

    #[test]
    fn clear_empties_but_keeps_counting() {
        let mut transcript = Transcript::new();
        transcript.append(Speaker::System, "Call started...");
        transcript.append(Speaker::User, "Hello");
        transcript.clear();
        assert!(transcript.is_empty());

        let seq = transcript.append(Speaker::Assistant, "Hi");
        assert_eq!(seq, 2);
        assert_eq!(transcript.render(), "Assistant: Hi");
    }
}

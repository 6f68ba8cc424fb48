use serde::{Deserialize, Serialize};
use std::fmt;

/// Relationship between a printed word and the attribute it is displayed in.
#[derive(Copy, Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StimulusType {
    Congruent,
    Incongruent,
    Neutral,
}

impl StimulusType {
    pub const ALL: [StimulusType; 3] = [
        StimulusType::Congruent,
        StimulusType::Incongruent,
        StimulusType::Neutral,
    ];

    /// Classifies a realized word/attribute pair.
    ///
    /// A pair is congruent when the attribute names the word's meaning,
    /// incongruent when the word names some other attribute in the
    /// vocabulary, and neutral when the word names no attribute at all.
    pub fn classify<S: AsRef<str>>(
        word: &str,
        display_attribute: &str,
        attribute_vocabulary: &[S],
    ) -> Self {
        if same_name(word, display_attribute) {
            StimulusType::Congruent
        } else if attribute_vocabulary
            .iter()
            .any(|attribute| same_name(attribute.as_ref(), word))
        {
            StimulusType::Incongruent
        } else {
            StimulusType::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StimulusType::Congruent => "congruent",
            StimulusType::Incongruent => "incongruent",
            StimulusType::Neutral => "neutral",
        }
    }
}

impl fmt::Display for StimulusType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Word meanings and attribute names compare without regard to case,
/// so the word `Red` means the attribute `red`.
pub fn same_name(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

/// One presented word/attribute pair awaiting an answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stimulus {
    pub word: String,
    pub display_attribute: String,
    pub stimulus_type: StimulusType,
    pub correct_answer: String,
    /// Monotonic timestamp (ns) that anchors reaction-time measurement.
    pub presented_at_ns: u64,
}

impl Stimulus {
    pub fn is_correct(&self, selected: &str) -> bool {
        same_name(selected, &self.correct_answer)
    }
}

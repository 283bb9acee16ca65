//! Progressive on-screen text timing for a single scene.
//!
//! The reveal is paced to the narration: it never takes longer than the text
//! would take to speak, nor longer than the usable share of the scene.

use serde::{Deserialize, Serialize};

use crate::config::TimingConfig;
use crate::scenes::count_words;

/// One step of a progressive text reveal. Times are seconds from scene start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextReveal {
    pub fragment: String,
    pub start_time: f64,
    pub end_time: f64,
    /// Everything revealed up to and including this step.
    pub cumulative_text: String,
}

/// Character-by-character reveal using the default constants.
pub fn calculate_text_reveals(text: &str, scene_duration_seconds: f64) -> Vec<TextReveal> {
    text_reveals_with(text, scene_duration_seconds, &TimingConfig::default())
}

/// Word-by-word reveal using the default constants.
pub fn calculate_word_reveals(text: &str, scene_duration_seconds: f64) -> Vec<TextReveal> {
    word_reveals_with(text, scene_duration_seconds, &TimingConfig::default())
}

/// Character mode: each character gets the reveal window divided by the
/// character count, clamped to the configured per-character bounds.
pub fn text_reveals_with(
    text: &str,
    scene_duration_seconds: f64,
    config: &TimingConfig,
) -> Vec<TextReveal> {
    let char_count = text.chars().count();
    if char_count == 0 {
        return Vec::new();
    }
    let window = reveal_window(
        text,
        scene_duration_seconds,
        config.char_reveal_utilization,
        config,
    );
    let per_char = (window / char_count as f64)
        .max(config.char_reveal_min_seconds)
        .min(config.char_reveal_max_seconds);

    let mut cumulative = String::with_capacity(text.len());
    text.chars()
        .enumerate()
        .map(|(idx, ch)| {
            cumulative.push(ch);
            let start_time = idx as f64 * per_char;
            TextReveal {
                fragment: ch.to_string(),
                start_time,
                end_time: start_time + per_char,
                cumulative_text: cumulative.clone(),
            }
        })
        .collect()
}

/// Word mode: the reveal window is divided evenly across the words.
pub fn word_reveals_with(
    text: &str,
    scene_duration_seconds: f64,
    config: &TimingConfig,
) -> Vec<TextReveal> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return Vec::new();
    }
    let window = reveal_window(
        text,
        scene_duration_seconds,
        config.word_reveal_utilization,
        config,
    );
    let per_word = window / words.len() as f64;

    let mut cumulative = String::with_capacity(text.len());
    words
        .iter()
        .enumerate()
        .map(|(idx, word)| {
            if idx > 0 {
                cumulative.push(' ');
            }
            cumulative.push_str(word);
            let start_time = idx as f64 * per_word;
            TextReveal {
                fragment: (*word).to_string(),
                start_time,
                end_time: start_time + per_word,
                cumulative_text: cumulative.clone(),
            }
        })
        .collect()
}

fn reveal_window(
    text: &str,
    scene_duration_seconds: f64,
    utilization: f64,
    config: &TimingConfig,
) -> f64 {
    // `max` also maps a NaN duration to zero.
    let budget = (scene_duration_seconds * utilization).max(0.0);
    match count_words(text) {
        0 => budget,
        words => budget.min(config.speaking_seconds(words)),
    }
}

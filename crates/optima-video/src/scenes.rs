//! Sentence-aligned partitioning of a narration script into timed scenes.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::TimingConfig;

/// Separator placed between sentences that share a scene.
pub const SENTENCE_JOINER: &str = ". ";

/// One scene of a narration script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneBreak {
    /// Whole sentences assigned to this scene, joined with `". "`.
    pub text: String,
    pub duration_seconds: f64,
    pub estimated_word_count: usize,
}

/// Scene breaks together with the figures they were derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenePlan {
    pub scenes: Vec<SceneBreak>,
    pub total_words: usize,
    pub estimated_speaking_time: f64,
    /// Per-scene cap: `min(max_scene_seconds, target / 2)`.
    pub max_scene_seconds: f64,
    /// Number of scenes the script was divided for. `scenes` may be shorter
    /// when sentences run out.
    pub target_scene_count: usize,
    pub total_duration: f64,
}

impl ScenePlan {
    /// Start offset of every scene, in seconds from the beginning.
    pub fn start_offsets(&self) -> Vec<f64> {
        self.scenes
            .iter()
            .scan(0.0, |elapsed, scene| {
                let start = *elapsed;
                *elapsed += scene.duration_seconds;
                Some(start)
            })
            .collect()
    }
}

/// Splits `script` into scenes using the default timing constants.
///
/// An empty script yields no scenes. Every returned scene lasts at least five
/// seconds.
pub fn calculate_scene_breaks(script: &str, target_duration_seconds: f64) -> Vec<SceneBreak> {
    plan_scenes(script, target_duration_seconds, &TimingConfig::default()).scenes
}

/// Splits `script` into scenes and reports the intermediate figures.
pub fn plan_scenes(script: &str, target_duration_seconds: f64, config: &TimingConfig) -> ScenePlan {
    let sentences = split_sentences(script);
    let total_words = count_words(script);
    let estimated_speaking_time = config.speaking_seconds(total_words);
    let max_scene_seconds = config.max_scene_seconds.min(target_duration_seconds / 2.0);
    let target_scene_count = scene_count(
        estimated_speaking_time,
        max_scene_seconds,
        config.min_scene_count,
        sentences.len(),
    );

    let scenes: Vec<SceneBreak> = if sentences.is_empty() {
        Vec::new()
    } else {
        let sentences_per_scene = sentences.len().div_ceil(target_scene_count);
        sentences
            .chunks(sentences_per_scene)
            .map(|chunk| {
                let text = chunk.join(SENTENCE_JOINER);
                let estimated_word_count = count_words(&text);
                SceneBreak {
                    duration_seconds: scene_duration(estimated_word_count, config),
                    estimated_word_count,
                    text,
                }
            })
            .collect()
    };

    let total_duration: f64 = scenes.iter().map(|scene| scene.duration_seconds).sum();
    debug!(
        sentences = sentences.len(),
        total_words,
        target_scene_count,
        scenes = scenes.len(),
        "planned scenes"
    );
    ScenePlan {
        scenes,
        total_words,
        estimated_speaking_time,
        max_scene_seconds,
        target_scene_count,
        total_duration,
    }
}

/// Duration of a scene holding `words` words, floored at the minimum.
pub fn scene_duration(words: usize, config: &TimingConfig) -> f64 {
    config.speaking_seconds(words).max(config.min_scene_seconds)
}

/// Sentences delimited by `.`, `!` or `?`, trimmed, empty fragments dropped.
pub fn split_sentences(script: &str) -> Vec<&str> {
    script
        .split(['.', '!', '?'])
        .map(str::trim)
        .filter(|sentence| !sentence.is_empty())
        .collect()
}

pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

fn scene_count(
    estimated_speaking_time: f64,
    max_scene_seconds: f64,
    min_scene_count: usize,
    sentence_count: usize,
) -> usize {
    let min_scene_count = min_scene_count.max(1);
    let one_per_sentence = sentence_count.max(min_scene_count);
    let ratio = estimated_speaking_time / max_scene_seconds;
    if max_scene_seconds > 0.0 && ratio.is_finite() {
        // More scenes than sentences cannot be filled.
        (ratio.ceil() as usize)
            .max(min_scene_count)
            .min(one_per_sentence)
    } else {
        // Degenerate target: one sentence per scene.
        one_per_sentence
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn script_of(sentences: usize, words_per_sentence: usize) -> String {
        (0..sentences)
            .map(|_| vec!["word"; words_per_sentence].join(" "))
            .collect::<Vec<_>>()
            .join(". ")
            + "."
    }

    #[test]
    fn empty_script_has_no_scenes() {
        assert!(calculate_scene_breaks("", 30.0).is_empty());
        assert!(calculate_scene_breaks("  \n ", 30.0).is_empty());
        assert!(calculate_scene_breaks("...!?", 30.0).is_empty());
    }

    #[test]
    fn short_script_gets_two_floor_duration_scenes() {
        let scenes = calculate_scene_breaks("One. Two. Three. Four.", 20.0);
        assert!(scenes.len() >= 2);
        assert!(scenes.iter().all(|scene| scene.duration_seconds >= 5.0));
        let rebuilt = scenes
            .iter()
            .map(|scene| scene.text.as_str())
            .collect::<Vec<_>>()
            .join(SENTENCE_JOINER);
        assert_eq!(rebuilt, "One. Two. Three. Four");
        assert_eq!(scenes[0].text, "One. Two");
        assert_eq!(scenes[0].estimated_word_count, 2);
    }

    #[test]
    fn three_hundred_words_in_sixty_seconds_targets_four_scenes() {
        let script = script_of(30, 10);
        let plan = plan_scenes(&script, 60.0, &TimingConfig::default());
        assert_eq!(plan.total_words, 300);
        assert_eq!(plan.estimated_speaking_time, 120.0);
        assert_eq!(plan.max_scene_seconds, 30.0);
        assert_eq!(plan.target_scene_count, 4);
        assert_eq!(plan.scenes.len(), 4);
        let counts: Vec<usize> = plan.scenes.iter().map(|s| s.estimated_word_count).collect();
        assert_eq!(counts, vec![80, 80, 80, 60]);
        assert_eq!(plan.scenes[0].duration_seconds, 32.0);
        assert_eq!(plan.total_duration, 120.0);
    }

    #[test]
    fn long_target_is_capped_at_thirty_seconds_per_scene() {
        let plan = plan_scenes(&script_of(40, 10), 600.0, &TimingConfig::default());
        assert_eq!(plan.max_scene_seconds, 30.0);
        assert_eq!(plan.target_scene_count, 6);
        assert_eq!(plan.scenes.len(), 6);
    }

    #[test]
    fn scenes_may_be_fewer_than_target_when_sentences_run_out() {
        let plan = plan_scenes("Alpha. Beta. Gamma.", 20.0, &TimingConfig::default());
        assert_eq!(plan.target_scene_count, 2);
        assert_eq!(plan.scenes.len(), 2);
        assert_eq!(plan.scenes[1].text, "Gamma");

        let single = plan_scenes("Only one sentence here", 20.0, &TimingConfig::default());
        assert_eq!(single.scenes.len(), 1);
        assert!(single.scenes.len() <= single.target_scene_count);
    }

    #[test]
    fn sentences_are_never_split() {
        let script = "First thought here! Is this second? Third one. Fourth and last.";
        let scenes = calculate_scene_breaks(script, 10.0);
        let sentences = split_sentences(script);
        for scene in &scenes {
            for part in scene.text.split(SENTENCE_JOINER) {
                assert!(sentences.contains(&part), "{part:?} is not a whole sentence");
            }
        }
    }

    #[test]
    fn zero_words_fall_back_to_floor() {
        let config = TimingConfig::default();
        assert_eq!(scene_duration(0, &config), 5.0);
        assert_eq!(scene_duration(25, &config), 10.0);
    }

    #[test]
    fn degenerate_targets_do_not_panic() {
        let script = "A b. C d. E f.";
        for target in [0.0, -10.0, f64::NAN, f64::INFINITY] {
            let scenes = calculate_scene_breaks(script, target);
            assert!(!scenes.is_empty(), "target {target}");
            assert!(scenes.iter().all(|s| s.duration_seconds >= 5.0));
        }
        let zero = plan_scenes(script, 0.0, &TimingConfig::default());
        assert_eq!(zero.scenes.len(), 3);
    }

    #[test]
    fn tiny_target_reports_at_most_one_scene_per_sentence() {
        let plan = plan_scenes("A b. C d. E f.", 1e-300, &TimingConfig::default());
        assert_eq!(plan.target_scene_count, 3);
        assert_eq!(plan.scenes.len(), 3);

        let short = plan_scenes("Just one.", 1e-9, &TimingConfig::default());
        assert_eq!(short.target_scene_count, 2);
        assert_eq!(short.scenes.len(), 1);
    }

    #[test]
    fn start_offsets_accumulate_durations() {
        let plan = plan_scenes(&script_of(30, 10), 60.0, &TimingConfig::default());
        assert_eq!(plan.start_offsets(), vec![0.0, 32.0, 64.0, 96.0]);
    }
}

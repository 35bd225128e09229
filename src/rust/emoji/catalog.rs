//! Static emoji names and emotion groups. Independent of any trained model.

/// Emotion reported when an emoji belongs to no group.
pub const DEFAULT_EMOTION: &str = "neutral";

/// Name reported for emojis missing from [`EMOJI_NAMES`].
pub const DEFAULT_EMOJI_NAME: &str = "Emoji";

/// Most emojis returned for one emotion.
pub const MAX_SUGGESTIONS: usize = 5;

pub const EMOJI_NAMES: &[(&str, &str)] = &[
    ("😢", "Crying Face"),
    ("❤️", "Red Heart"),
    ("😊", "Smiling Face"),
    ("😟", "Worried Face"),
    ("😠", "Angry Face"),
    ("🎉", "Party Popper"),
    ("🤩", "Star-Struck"),
    ("😌", "Relieved Face"),
    ("😲", "Astonished Face"),
    ("😐", "Neutral Face"),
    ("😴", "Sleeping Face"),
    ("😡", "Enraged Face"),
    ("😭", "Loudly Crying"),
    ("😔", "Pensive Face"),
    ("😞", "Disappointed Face"),
    ("💔", "Broken Heart"),
    ("😥", "Sad but Relieved"),
    ("😪", "Sleepy Face"),
    ("🥺", "Pleading Face"),
    ("😩", "Weary Face"),
    ("😍", "Heart Eyes"),
    ("💕", "Two Hearts"),
    ("😘", "Kissing Heart"),
    ("💖", "Sparkling Heart"),
    ("😁", "Beaming Face"),
    ("😄", "Grinning Face"),
    ("🙂", "Slightly Smiling"),
    ("😃", "Grinning Face with Big Eyes"),
    ("😰", "Anxious Face"),
    ("😨", "Fearful Face"),
    ("😧", "Anguished Face"),
    ("🤬", "Face with Symbols"),
    ("😤", "Face with Steam"),
    ("🎊", "Confetti Ball"),
    ("🥳", "Partying Face"),
    ("🎈", "Balloon"),
    ("🤗", "Hugging Face"),
    ("😆", "Grinning Squinting"),
    ("😮‍💨", "Face Exhaling"),
    ("😮", "Face with Open Mouth"),
    ("😯", "Hushed Face"),
    ("🤯", "Exploding Head"),
    ("😑", "Expressionless"),
    ("😶", "Face Without Mouth"),
    ("🥱", "Yawning Face"),
];

/// Emotion groups in lookup order. An emoji listed under several emotions
/// belongs to the first one.
pub const EMOTION_GROUPS: &[(&str, &[&str])] = &[
    ("sadness", &["😢", "😭", "😔", "😞", "😥"]),
    ("love", &["❤️", "😍", "💕", "😘", "💖"]),
    ("happiness", &["😊", "😁", "😄", "🙂", "😃"]),
    ("worry", &["😟", "😰", "😨", "😧"]),
    ("anger", &["😠", "😡", "🤬", "😤"]),
    ("fun", &["🎉", "🎊", "🥳", "🎈"]),
    ("enthusiasm", &["🤩", "😁", "🤗", "😆"]),
    ("relief", &["😌", "😮‍💨", "😊"]),
    ("surprise", &["😲", "😮", "😯", "🤯"]),
    ("neutral", &["😐", "😑", "😶"]),
    ("boredom", &["😴", "🥱", "😪"]),
];

pub fn emoji_name(emoji: &str) -> &'static str {
    EMOJI_NAMES
        .iter()
        .find(|(e, _)| *e == emoji)
        .map(|(_, name)| *name)
        .unwrap_or(DEFAULT_EMOJI_NAME)
}

/// Emojis of an emotion group; empty for unknown emotions.
pub fn emotion_emojis(emotion: &str) -> &'static [&'static str] {
    EMOTION_GROUPS
        .iter()
        .find(|(name, _)| *name == emotion)
        .map(|(_, emojis)| *emojis)
        .unwrap_or(&[])
}

/// First emotion whose group contains `emoji`, else [`DEFAULT_EMOTION`].
pub fn detect_emotion(emoji: &str) -> &'static str {
    EMOTION_GROUPS
        .iter()
        .find(|(_, emojis)| emojis.contains(&emoji))
        .map(|(name, _)| *name)
        .unwrap_or(DEFAULT_EMOTION)
}

/// Emojis to offer for `emotion`: its group, or just `top_emoji` when the group
/// is empty, capped at [`MAX_SUGGESTIONS`].
pub fn expand_emotion(top_emoji: &str, emotion: &str) -> Vec<String> {
    let group = emotion_emojis(emotion);
    if group.is_empty() {
        return vec![top_emoji.to_string()];
    }
    group
        .iter()
        .take(MAX_SUGGESTIONS)
        .map(|e| e.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_emotion() {
        assert_eq!(detect_emotion("😭"), "sadness");
        assert_eq!(detect_emotion("😡"), "anger");
        // listed under happiness and relief
        assert_eq!(detect_emotion("😊"), "happiness");
        assert_eq!(detect_emotion("🦀"), DEFAULT_EMOTION);
    }

    #[test]
    fn test_names() {
        assert_eq!(emoji_name("😴"), "Sleeping Face");
        assert_eq!(emoji_name("❤️"), "Red Heart");
        assert_eq!(emoji_name("🦀"), "Emoji");
    }

    #[test]
    fn test_expansion_is_capped() {
        for (emotion, _) in EMOTION_GROUPS {
            let expanded = expand_emotion("x", emotion);
            assert!(!expanded.is_empty());
            assert!(expanded.len() <= MAX_SUGGESTIONS);
        }
    }

    #[test]
    fn test_empty_group_falls_back_to_top_emoji() {
        assert!(emotion_emojis("hate").is_empty());
        assert_eq!(expand_emotion("🦀", "hate"), vec!["🦀".to_string()]);
    }

    #[test]
    fn test_every_grouped_emoji_has_a_name() {
        for (_, emojis) in EMOTION_GROUPS {
            for emoji in *emojis {
                assert_ne!(emoji_name(emoji), DEFAULT_EMOJI_NAME, "{} has no name", emoji);
            }
        }
    }
}

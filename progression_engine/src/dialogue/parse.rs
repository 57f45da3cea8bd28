//! Lenient decoding of raw dialogue service output.

use case_rules::Emotion;
use serde_json::Value;

use super::Analysis;
use crate::error::DialogueError;
use crate::trust::sanitize_raw_delta;

/// Decode an analyzer payload such as `{"trustChange": 5, "newEmotion": "openness"}`.
///
/// Markdown fences and prose around the object are ignored; the first JSON
/// object in the text is used. `trustChange` must be numeric and `newEmotion`
/// one of the known tags. Out-of-range deltas become 0.
pub fn parse_analysis(raw: &str) -> Result<Analysis, DialogueError> {
    let start = raw
        .find('{')
        .ok_or_else(|| DialogueError::malformed("no JSON object in analyzer output"))?;

    let value = serde_json::Deserializer::from_str(&raw[start..])
        .into_iter::<Value>()
        .next()
        .ok_or_else(|| DialogueError::malformed("empty analyzer output"))?
        .map_err(|e| DialogueError::malformed(e.to_string()))?;

    let delta = value
        .get("trustChange")
        .and_then(Value::as_f64)
        .ok_or_else(|| DialogueError::malformed("trustChange missing or not a number"))?;

    let emotion = value
        .get("newEmotion")
        .and_then(Value::as_str)
        .ok_or_else(|| DialogueError::malformed("newEmotion missing"))?;
    let emotion = Emotion::parse(emotion)
        .ok_or_else(|| DialogueError::malformed(format!("unknown emotion '{}'", emotion)))?;

    let force_block = value
        .get("shouldBlock")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    Ok(Analysis {
        trust_delta: sanitize_raw_delta(delta),
        emotion,
        force_block,
    })
}

/// Tidy a generated reply: drop a leading `Name:` speaker tag, trim trailing
/// spaces and collapse runs of blank lines.
pub fn clean_reply(raw: &str, display_name: &str) -> String {
    let mut text = raw.trim();

    for name in [display_name, display_name.split_whitespace().next().unwrap_or("")] {
        if name.is_empty() {
            continue;
        }
        if let Some(rest) = text.strip_prefix(name) {
            if let Some(rest) = rest.trim_start().strip_prefix(':') {
                text = rest.trim_start();
                break;
            }
        }
    }

    let mut lines: Vec<&str> = Vec::new();
    for line in text.lines().map(str::trim_end) {
        if line.is_empty() && lines.last().map_or(true, |l| l.is_empty()) {
            continue;
        }
        lines.push(line);
    }
    while lines.last() == Some(&"") {
        lines.pop();
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_object() {
        let analysis = parse_analysis(r#"{"trustChange": 7, "newEmotion": "openness"}"#).unwrap();
        assert_eq!(analysis.trust_delta, 7);
        assert_eq!(analysis.emotion, Emotion::Openness);
        assert!(!analysis.force_block);
    }

    #[test]
    fn test_fenced_object_with_prose() {
        let raw = "Вот анализ:\n```json\n{\"trustChange\": -12.4, \"newEmotion\": \"angry\", \"shouldBlock\": true}\n```\nГотово.";
        let analysis = parse_analysis(raw).unwrap();
        assert_eq!(analysis.trust_delta, -12);
        assert_eq!(analysis.emotion, Emotion::Angry);
        assert!(analysis.force_block);
    }

    #[test]
    fn test_out_of_range_delta_is_zero() {
        let analysis = parse_analysis(r#"{"trustChange": 500, "newEmotion": "sad"}"#).unwrap();
        assert_eq!(analysis.trust_delta, 0);
    }

    #[test]
    fn test_rejects_bad_payloads() {
        assert!(parse_analysis("no json here").is_err());
        assert!(parse_analysis(r#"{"trustChange": "five", "newEmotion": "sad"}"#).is_err());
        assert!(parse_analysis(r#"{"trustChange": 5, "newEmotion": "bored"}"#).is_err());
        assert!(parse_analysis(r#"{"newEmotion": "sad"}"#).is_err());
        assert!(parse_analysis(r#"{"trustChange": 5"#).is_err());
    }

    #[test]
    fn test_clean_reply_strips_speaker() {
        assert_eq!(
            clean_reply("Анна Соколова: Я ничего не знаю.", "Анна Соколова"),
            "Я ничего не знаю."
        );
        assert_eq!(clean_reply("Анна : Нет.", "Анна Соколова"), "Нет.");
        assert_eq!(clean_reply("Аннушка, нет.", "Анна Соколова"), "Аннушка, нет.");
    }

    #[test]
    fn test_clean_reply_collapses_blank_lines() {
        let raw = "  Первая строка   \n\n\n\nВторая строка\n";
        assert_eq!(clean_reply(raw, "Борис Титов"), "Первая строка\n\nВторая строка");
    }
}

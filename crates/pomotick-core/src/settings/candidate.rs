//! Raw, unvalidated settings input and its normalization rules.

use serde_json::{Map, Value};

use super::{
    Settings, DEFAULT_CYCLES_BEFORE_LONG, DEFAULT_LONG_BREAK_MIN, DEFAULT_SHORT_BREAK_MIN,
    DEFAULT_WORK_MIN,
};

/// Settings as submitted by a form, a CLI flag or a stored payload.
///
/// Each field holds whatever value arrived, so `"abc"`, `0` and `"12"` are all
/// representable until [`SettingsCandidate::normalize`] decides what to keep.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsCandidate {
    pub work: Option<Value>,
    pub short_break: Option<Value>,
    pub long_break: Option<Value>,
    pub cycles_before_long: Option<Value>,
    pub sound_enabled: Option<Value>,
    pub auto_start: Option<Value>,
}

impl SettingsCandidate {
    /// Read the stored field names from a JSON object.
    ///
    /// `shortBreak` and `longBreak` are accepted as aliases of `short` and
    /// `long`. Non-object values produce an empty candidate.
    pub fn from_value(value: &Value) -> Self {
        let Some(map) = value.as_object() else {
            return Self::default();
        };
        Self {
            work: field(map, &["work"]),
            short_break: field(map, &["short", "shortBreak"]),
            long_break: field(map, &["long", "longBreak"]),
            cycles_before_long: field(map, &["cyclesBeforeLong"]),
            sound_enabled: field(map, &["sound", "soundEnabled"]),
            auto_start: field(map, &["autoStart"]),
        }
    }

    /// Normalize a submitted form.
    ///
    /// Numeric fields that are missing, non-numeric or not positive fall back
    /// to their defaults. Booleans are coerced by truthiness, so an absent
    /// toggle counts as off.
    pub fn normalize(&self) -> Settings {
        Settings {
            work: positive_or(self.work.as_ref(), DEFAULT_WORK_MIN),
            short_break: positive_or(self.short_break.as_ref(), DEFAULT_SHORT_BREAK_MIN),
            long_break: positive_or(self.long_break.as_ref(), DEFAULT_LONG_BREAK_MIN),
            cycles_before_long: positive_or(
                self.cycles_before_long.as_ref(),
                DEFAULT_CYCLES_BEFORE_LONG,
            ),
            sound_enabled: truthy(self.sound_enabled.as_ref()),
            auto_start: truthy(self.auto_start.as_ref()),
        }
    }

    /// Merge present fields over `base`, normalizing each one.
    ///
    /// Unlike [`normalize`](Self::normalize), absent fields keep the value
    /// from `base`. Invalid numeric fields still fall back to the defaults.
    pub fn merge_over(&self, base: &Settings) -> Settings {
        Settings {
            work: merge_positive(self.work.as_ref(), base.work, DEFAULT_WORK_MIN),
            short_break: merge_positive(
                self.short_break.as_ref(),
                base.short_break,
                DEFAULT_SHORT_BREAK_MIN,
            ),
            long_break: merge_positive(
                self.long_break.as_ref(),
                base.long_break,
                DEFAULT_LONG_BREAK_MIN,
            ),
            cycles_before_long: merge_positive(
                self.cycles_before_long.as_ref(),
                base.cycles_before_long,
                DEFAULT_CYCLES_BEFORE_LONG,
            ),
            sound_enabled: self
                .sound_enabled
                .as_ref()
                .map_or(base.sound_enabled, |v| truthy(Some(v))),
            auto_start: self
                .auto_start
                .as_ref()
                .map_or(base.auto_start, |v| truthy(Some(v))),
        }
    }
}

impl From<&Settings> for SettingsCandidate {
    fn from(settings: &Settings) -> Self {
        Self {
            work: Some(Value::from(settings.work)),
            short_break: Some(Value::from(settings.short_break)),
            long_break: Some(Value::from(settings.long_break)),
            cycles_before_long: Some(Value::from(settings.cycles_before_long)),
            sound_enabled: Some(Value::Bool(settings.sound_enabled)),
            auto_start: Some(Value::Bool(settings.auto_start)),
        }
    }
}

/// Parse the leading base-10 integer of `s`, the way form inputs are read.
///
/// Leading whitespace and a sign are allowed; parsing stops at the first
/// non-digit, so `"12abc"` is 12 and `"3.7"` is 3. Returns `None` when no
/// digit leads the string or the number does not fit in an `i64`.
pub fn parse_int_prefix(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }
    let magnitude: i64 = rest[..digits_len].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

fn field(map: &Map<String, Value>, names: &[&str]) -> Option<Value> {
    names.iter().find_map(|name| map.get(*name).cloned())
}

fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => parse_int_prefix(s),
        _ => None,
    }
}

fn positive(value: &Value) -> Option<u32> {
    as_integer(value)
        .filter(|n| *n > 0)
        .and_then(|n| u32::try_from(n).ok())
}

fn positive_or(value: Option<&Value>, default: u32) -> u32 {
    value.and_then(positive).unwrap_or(default)
}

fn merge_positive(value: Option<&Value>, base: u32, default: u32) -> u32 {
    match value {
        Some(v) => positive(v).unwrap_or(default),
        None => base,
    }
}

fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn invalid_fields_fall_back_while_valid_fields_pass() {
        let candidate = SettingsCandidate::from_value(&json!({
            "work": "abc",
            "short": 7,
            "long": "20",
            "cyclesBeforeLong": 0,
            "sound": true,
            "autoStart": false
        }));
        let settings = candidate.normalize();
        assert_eq!(settings.work, 25);
        assert_eq!(settings.cycles_before_long, 4);
        assert_eq!(settings.short_break, 7);
        assert_eq!(settings.long_break, 20);
        assert!(settings.sound_enabled);
        assert!(!settings.auto_start);
    }

    #[test]
    fn numeric_strings_parse_like_form_inputs() {
        assert_eq!(parse_int_prefix("12abc"), Some(12));
        assert_eq!(parse_int_prefix("  42"), Some(42));
        assert_eq!(parse_int_prefix("3.7"), Some(3));
        assert_eq!(parse_int_prefix("-8"), Some(-8));
        assert_eq!(parse_int_prefix("+9"), Some(9));
        assert_eq!(parse_int_prefix("abc"), None);
        assert_eq!(parse_int_prefix(""), None);
        assert_eq!(parse_int_prefix("-"), None);
        assert_eq!(parse_int_prefix("99999999999999999999"), None);
    }

    #[test]
    fn fractional_numbers_truncate() {
        let candidate = SettingsCandidate {
            work: Some(json!(30.9)),
            ..SettingsCandidate::default()
        };
        assert_eq!(candidate.normalize().work, 30);
    }

    #[test]
    fn negative_and_oversized_values_fall_back() {
        let candidate = SettingsCandidate {
            work: Some(json!(-5)),
            short_break: Some(json!(u64::MAX)),
            long_break: Some(json!(0.4)),
            ..SettingsCandidate::default()
        };
        let settings = candidate.normalize();
        assert_eq!(settings.work, 25);
        assert_eq!(settings.short_break, 5);
        assert_eq!(settings.long_break, 15);
    }

    #[test]
    fn booleans_coerce_by_truthiness() {
        let candidate = SettingsCandidate::from_value(&json!({
            "sound": "yes",
            "autoStart": 0
        }));
        let settings = candidate.normalize();
        assert!(settings.sound_enabled);
        assert!(!settings.auto_start);

        assert!(!SettingsCandidate::default().normalize().sound_enabled);
    }

    #[test]
    fn aliases_are_accepted() {
        let candidate = SettingsCandidate::from_value(&json!({"shortBreak": 3, "longBreak": 9}));
        let settings = candidate.normalize();
        assert_eq!(settings.short_break, 3);
        assert_eq!(settings.long_break, 9);
    }

    #[test]
    fn merge_keeps_base_for_missing_fields() {
        let base = Settings {
            work: 40,
            auto_start: true,
            ..Settings::default()
        };
        let merged = SettingsCandidate::from_value(&json!({"short": 2})).merge_over(&base);
        assert_eq!(merged.work, 40);
        assert_eq!(merged.short_break, 2);
        assert!(merged.auto_start);
    }

    #[test]
    fn settings_round_trip_through_candidate() {
        let settings = Settings {
            work: 45,
            short_break: 10,
            long_break: 30,
            cycles_before_long: 3,
            sound_enabled: false,
            auto_start: true,
        };
        assert_eq!(SettingsCandidate::from(&settings).normalize(), settings);
    }

    proptest! {
        #[test]
        fn normalized_durations_are_always_positive(
            work in any::<i64>(),
            short in ".*",
            cycles in any::<f64>(),
        ) {
            let candidate = SettingsCandidate {
                work: Some(json!(work)),
                short_break: Some(json!(short)),
                cycles_before_long: serde_json::Number::from_f64(cycles).map(Value::Number),
                ..SettingsCandidate::default()
            };
            let settings = candidate.normalize();
            prop_assert!(settings.work > 0);
            prop_assert!(settings.short_break > 0);
            prop_assert!(settings.long_break > 0);
            prop_assert!(settings.cycles_before_long >= 1);
        }
    }
}

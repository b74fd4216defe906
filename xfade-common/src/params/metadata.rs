//! Crossfade parameter metadata definitions

use super::{CrossfadeSettings, ParamMetadata};

fn validate_bool(key: &str, s: &str) -> Result<(), String> {
    s.trim()
        .parse::<bool>()
        .map(|_| ())
        .map_err(|_| format!("{}: expected true or false, got {:?}", key, s))
}

fn validate_range(key: &str, s: &str, min: f64, max: f64) -> Result<(), String> {
    let v: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("{}: invalid number format", key))?;
    if !(min..=max).contains(&v) {
        return Err(format!("{}: value {} out of range [{}, {}]", key, v, min, max));
    }
    Ok(())
}

impl CrossfadeSettings {
    /// Get metadata for every crossfade parameter
    ///
    /// # Example: Validating a Parameter
    ///
    /// ```rust
    /// # use xfade_common::params::CrossfadeSettings;
    /// let length = CrossfadeSettings::metadata()
    ///     .iter()
    ///     .find(|m| m.key == "length")
    ///     .unwrap();
    ///
    /// assert!((length.validator)("5").is_ok());
    /// assert!((length.validator)("20").is_err());
    /// ```
    pub fn metadata() -> &'static [ParamMetadata] {
        &[
            ParamMetadata {
                key: "automatic",
                data_type: "bool",
                default_value: "true",
                description: "Crossfade on automatic track advance",
                validation_range: "true|false",
                validator: |s| validate_bool("automatic", s),
            },
            ParamMetadata {
                key: "length",
                data_type: "f64",
                default_value: "5.0",
                description: "Automatic crossfade overlap (seconds)",
                validation_range: "1.0-15.0",
                validator: |s| validate_range("length", s, 1.0, 15.0),
            },
            ParamMetadata {
                key: "manual",
                data_type: "bool",
                default_value: "true",
                description: "Crossfade on manual seek or track change",
                validation_range: "true|false",
                validator: |s| validate_bool("manual", s),
            },
            ParamMetadata {
                key: "manual_length",
                data_type: "f64",
                default_value: "0.2",
                description: "Manual crossfade overlap (seconds)",
                validation_range: "0.1-3.0",
                validator: |s| validate_range("manual_length", s, 0.1, 3.0),
            },
            ParamMetadata {
                key: "trim_leading",
                data_type: "bool",
                default_value: "false",
                description: "Drop silence at the start of each track",
                validation_range: "true|false",
                validator: |s| validate_bool("trim_leading", s),
            },
            ParamMetadata {
                key: "trim_trailing",
                data_type: "bool",
                default_value: "false",
                description: "Drop silence at the end of each track",
                validation_range: "true|false",
                validator: |s| validate_bool("trim_trailing", s),
            },
            ParamMetadata {
                key: "trim_length",
                data_type: "f64",
                default_value: "1.0",
                description: "Most silence trimmed at either end (seconds)",
                validation_range: "0.0-10.0",
                validator: |s| validate_range("trim_length", s, 0.0, 10.0),
            },
            ParamMetadata {
                key: "trim_level",
                data_type: "f64",
                default_value: "0.015625",
                description: "Peak amplitude below which a frame counts as silent",
                validation_range: "0.0-1.0",
                validator: |s| validate_range("trim_level", s, 0.0, 1.0),
            },
        ]
    }
}

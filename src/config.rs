use std::{
    fmt,
    path::Path,
    str::FromStr,
};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Straight (non-premultiplied) sRGB colour, components in 0..=1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Self = Self { r: 1.0, g: 1.0, b: 1.0 };
    /// `#ff4444`
    pub const ALERT_RED: Self = Self { r: 1.0, g: 68.0 / 255.0, b: 68.0 / 255.0 };

    /// Parses `#rgb` or `#rrggbb` (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.trim().trim_start_matches('#');
        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| Error::InvalidColor(hex.to_string()));
        if !digits.is_ascii() {
            return Err(Error::InvalidColor(hex.to_string()));
        }
        let (r, g, b) = match digits.len() {
            3 => {
                let expand = |i: usize| channel(&digits[i..=i].repeat(2));
                (expand(0)?, expand(1)?, expand(2)?)
            },
            6 => (channel(&digits[0..2])?, channel(&digits[2..4])?, channel(&digits[4..6])?),
            _ => return Err(Error::InvalidColor(hex.to_string())),
        };
        Ok(Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        })
    }

    pub fn to_rgba(self, alpha: f32) -> [f32; 4] {
        [self.r, self.g, self.b, alpha]
    }

    pub fn to_hex(self) -> String {
        let byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("#{:02x}{:02x}{:02x}", byte(self.r), byte(self.g), byte(self.b))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl TryFrom<String> for Color {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

/// Half-open sampling interval `[min, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub min: f32,
    pub max: f32,
}

impl Span {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Uniform sample. A degenerate span always yields `min`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        if self.max <= self.min {
            self.min
        } else {
            rng.gen_range(self.min..self.max)
        }
    }

    pub fn contains(&self, value: f32) -> bool {
        if self.max <= self.min {
            value == self.min
        } else {
            value >= self.min && value < self.max
        }
    }

    fn check(&self, field: &'static str, floor: f32, ceil: f32) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(Error::invalid(field, "bounds must be finite"));
        }
        if self.min > self.max {
            return Err(Error::invalid(field, format!("min {} exceeds max {}", self.min, self.max)));
        }
        if self.min < floor || self.max > ceil {
            return Err(Error::invalid(field, format!("must lie within [{floor}, {ceil}]")));
        }
        Ok(())
    }
}

/// Upper bound on `count`; far beyond anything a background needs.
pub const MAX_PARTICLES: usize = 100_000;

/// Visual parameters of one particle field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FieldConfig {
    pub count: usize,
    pub color: Color,
    pub size_range: Span,
    pub speed_range: Span,
    pub opacity_range: Span,
    pub twinkle_rate_range: Span,
    /// Particles with a larger radius also draw a cross-hair sparkle.
    pub sparkle_threshold: f32,
    pub twinkle_amplitude: f32,
    pub opacity_floor: f32,
    /// Distance above the top edge a particle respawns at, and below the
    /// bottom edge it has to fall before it is recycled.
    pub margin: f32,
    /// Glow radius for the largest particle; smaller ones scale down.
    pub glow_blur: f32,
    /// Sparkle arm length as a multiple of the radius.
    pub sparkle_reach: f32,
    pub sparkle_line_width: f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self::starry()
    }
}

impl FieldConfig {
    /// White starfield.
    pub fn starry() -> Self {
        Self {
            count: 150,
            color: Color::WHITE,
            size_range: Span::new(1.0, 4.0),
            speed_range: Span::new(0.5, 2.5),
            opacity_range: Span::new(0.2, 1.0),
            twinkle_rate_range: Span::new(0.01, 0.03),
            sparkle_threshold: 2.0,
            twinkle_amplitude: 0.3,
            opacity_floor: 0.1,
            margin: 10.0,
            glow_blur: 10.0,
            sparkle_reach: 2.0,
            sparkle_line_width: 0.5,
        }
    }

    /// Sparser, smaller and slower red field.
    pub fn alert() -> Self {
        Self {
            count: 80,
            color: Color::ALERT_RED,
            size_range: Span::new(0.5, 3.0),
            speed_range: Span::new(0.3, 1.8),
            opacity_range: Span::new(0.2, 0.8),
            twinkle_rate_range: Span::new(0.008, 0.023),
            sparkle_threshold: 1.5,
            twinkle_amplitude: 0.2,
            opacity_floor: 0.1,
            margin: 10.0,
            glow_blur: 8.0,
            sparkle_reach: 1.5,
            sparkle_line_width: 0.3,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.count == 0 {
            return Err(Error::invalid("count", "must be at least 1"));
        }
        if self.count > MAX_PARTICLES {
            return Err(Error::invalid("count", format!("must be at most {MAX_PARTICLES}, got {}", self.count)));
        }
        self.size_range.check("size_range", 0.0, f32::MAX)?;
        self.speed_range.check("speed_range", 0.0, f32::MAX)?;
        self.opacity_range.check("opacity_range", 0.0, 1.0)?;
        self.twinkle_rate_range.check("twinkle_rate_range", f32::MIN, f32::MAX)?;

        let non_negative = [
            ("sparkle_threshold", self.sparkle_threshold),
            ("twinkle_amplitude", self.twinkle_amplitude),
            ("margin", self.margin),
            ("glow_blur", self.glow_blur),
            ("sparkle_reach", self.sparkle_reach),
            ("sparkle_line_width", self.sparkle_line_width),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::invalid(field, format!("must be a finite, non-negative number, got {value}")));
            }
        }
        if !(0.0..=1.0).contains(&self.opacity_floor) {
            return Err(Error::invalid("opacity_floor", "must lie within [0, 1]"));
        }
        Ok(())
    }

    /// Keys missing from the document keep their starry defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }
}

/// The two built-in looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Starry,
    Alert,
}

impl Preset {
    pub fn config(self) -> FieldConfig {
        match self {
            Preset::Starry => FieldConfig::starry(),
            Preset::Alert => FieldConfig::alert(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Preset::Starry => "starry",
            Preset::Alert => "alert",
        }
    }
}

impl FromStr for Preset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "starry" | "white" => Ok(Preset::Starry),
            "alert" | "red" => Ok(Preset::Alert),
            _ => Err(Error::UnknownPreset(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn presets_are_valid() {
        FieldConfig::starry().validate().unwrap();
        FieldConfig::alert().validate().unwrap();
        assert_eq!(FieldConfig::starry().count, 150);
        assert_eq!(FieldConfig::alert().count, 80);
    }

    #[test]
    fn parses_hex_colors() {
        assert_eq!(Color::from_hex("#ffffff").unwrap(), Color::WHITE);
        assert_eq!(Color::from_hex("#ff4444").unwrap(), Color::ALERT_RED);
        assert_eq!(Color::from_hex("fff").unwrap(), Color::WHITE);
        assert_eq!(Color::ALERT_RED.to_hex(), "#ff4444");
        assert!(matches!(Color::from_hex("#ff44"), Err(Error::InvalidColor(_))));
        assert!(matches!(Color::from_hex("#gg0000"), Err(Error::InvalidColor(_))));
    }

    #[test]
    fn span_sampling_stays_half_open() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let span = Span::new(0.5, 3.0);
        for _ in 0..10_000 {
            let v = span.sample(&mut rng);
            assert!(span.contains(v), "{v} escaped {span:?}");
        }
        let point = Span::new(2.0, 2.0);
        assert_eq!(point.sample(&mut rng), 2.0);
        assert!(point.contains(2.0));
    }

    #[test]
    fn rejects_bad_configs() {
        let mut config = FieldConfig::alert();
        config.count = 0;
        assert!(matches!(config.validate(), Err(Error::InvalidConfig { field: "count", .. })));

        let mut config = FieldConfig::alert();
        config.size_range = Span::new(3.0, 0.5);
        assert!(matches!(config.validate(), Err(Error::InvalidConfig { field: "size_range", .. })));

        let mut config = FieldConfig::alert();
        config.opacity_range = Span::new(0.2, 1.5);
        assert!(matches!(config.validate(), Err(Error::InvalidConfig { field: "opacity_range", .. })));

        let mut config = FieldConfig::alert();
        config.margin = f32::NAN;
        assert!(matches!(config.validate(), Err(Error::InvalidConfig { field: "margin", .. })));
    }

    #[test]
    fn toml_overrides_fall_back_to_starry() {
        let config = FieldConfig::from_toml_str(
            r##"
            count = 12
            color = "#ff4444"
            size_range = { min = 0.5, max = 3.0 }
            "##,
        )
        .unwrap();
        assert_eq!(config.count, 12);
        assert_eq!(config.color, Color::ALERT_RED);
        assert_eq!(config.size_range, Span::new(0.5, 3.0));
        assert_eq!(config.speed_range, FieldConfig::starry().speed_range);
    }

    #[test]
    fn toml_errors_surface() {
        assert!(matches!(FieldConfig::from_toml_str("count = \"many\""), Err(Error::ConfigParse(_))));
        assert!(matches!(FieldConfig::from_toml_str("colour = \"#fff\""), Err(Error::ConfigParse(_))));
        assert!(matches!(FieldConfig::from_toml_str("count = 0"), Err(Error::InvalidConfig { .. })));
        assert!(matches!(
            FieldConfig::from_toml_str("count = 9000000000000"),
            Err(Error::InvalidConfig { field: "count", .. })
        ));
        assert!(FieldConfig::from_toml_str(&format!("count = {MAX_PARTICLES}")).is_ok());
    }

    #[test]
    fn preset_names() {
        assert_eq!("starry".parse::<Preset>().unwrap(), Preset::Starry);
        assert_eq!("RED".parse::<Preset>().unwrap(), Preset::Alert);
        assert!(matches!("blue".parse::<Preset>(), Err(Error::UnknownPreset(_))));
        assert_eq!(Preset::Alert.config(), FieldConfig::alert());
    }
}

use std::fmt;

use serde::{
    de::{MapAccess, Visitor},
    ser::SerializeMap,
    Deserialize, Deserializer, Serialize, Serializer,
};

macro_rules! code_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

code_newtype!(ModelRange);
code_newtype!(TypeCode);
code_newtype!(ColorId);

pub const FALLBACK_LANGUAGE: &str = "en";

/// Language code to display string, in the order the catalog service sent
/// them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalizedText(Vec<(String, String)>);

impl LocalizedText {
    fn lookup(&self, lang: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(code, _)| code == lang)
            .map(|(_, text)| text.as_str())
    }

    /// Looks up `lang`, then English, then the first entry the service sent.
    pub fn get(&self, lang: &str) -> &str {
        self.lookup(lang)
            .or_else(|| self.lookup(FALLBACK_LANGUAGE))
            .or_else(|| self.0.first().map(|(_, text)| text.as_str()))
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(code, _)| code.as_str())
    }

    fn insert(&mut self, lang: String, text: String) {
        match self.0.iter_mut().find(|(code, _)| *code == lang) {
            Some(entry) => entry.1 = text,
            None => self.0.push((lang, text)),
        }
    }
}

impl Serialize for LocalizedText {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (lang, text) in &self.0 {
            map.serialize_entry(lang, text)?;
        }
        map.end()
    }
}

struct LocalizedTextVisitor;

impl<'de> Visitor<'de> for LocalizedTextVisitor {
    type Value = LocalizedText;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of language codes to strings")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut text = LocalizedText::default();
        while let Some((lang, value)) = access.next_entry::<String, Option<String>>()? {
            if let Some(value) = value {
                text.insert(lang, value);
            }
        }
        Ok(text)
    }
}

impl<'de> Deserialize<'de> for LocalizedText {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(LocalizedTextVisitor)
    }
}

/// The catalog sends `null` for fields it has no value for.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl<const N: usize> From<[(&str, &str); N]> for LocalizedText {
    fn from(entries: [(&str, &str); N]) -> Self {
        let mut text = Self::default();
        for (lang, value) in entries {
            text.insert(lang.to_string(), value.to_string());
        }
        text
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VehicleKey {
    pub model_range: ModelRange,
    pub type_code: TypeCode,
}

impl fmt::Display for VehicleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.model_range, self.type_code)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColorKey {
    pub vehicle: VehicleKey,
    pub color: ColorId,
}

impl fmt::Display for ColorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.vehicle, self.color)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub model_range: ModelRange,
    pub type_code: TypeCode,
    #[serde(default, deserialize_with = "null_as_default")]
    pub localized_name: LocalizedText,
    #[serde(default, deserialize_with = "null_as_default")]
    pub series: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_type: Option<String>,
    #[serde(
        default,
        rename = "wltpCO2Emissions",
        skip_serializing_if = "Option::is_none"
    )]
    pub wltp_co2_emissions: Option<LocalizedText>,
    #[serde(default, rename = "wltpCO2Class", skip_serializing_if = "Option::is_none")]
    pub wltp_co2_class: Option<LocalizedText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wltp_fuel_consumption: Option<LocalizedText>,
}

impl Vehicle {
    pub fn key(&self) -> VehicleKey {
        VehicleKey {
            model_range: self.model_range.clone(),
            type_code: self.type_code.clone(),
        }
    }

    pub fn display_name(&self, lang: &str) -> &str {
        let name = self.localized_name.get(lang);
        if name.is_empty() {
            self.model_range.as_str()
        } else {
            name
        }
    }

    /// Label/value rows for the optional descriptive attributes.
    pub fn attributes(&self, lang: &str) -> Vec<(&'static str, String)> {
        let mut rows = Vec::new();
        if !self.series.is_empty() {
            rows.push(("Series", self.series.clone()));
        }
        if let Some(engine) = self.engine_type.as_deref().filter(|e| !e.is_empty()) {
            rows.push(("Engine", engine.to_string()));
        }
        let localized = [
            ("CO2 emissions (WLTP)", &self.wltp_co2_emissions),
            ("CO2 class (WLTP)", &self.wltp_co2_class),
            ("Fuel consumption (WLTP)", &self.wltp_fuel_consumption),
        ];
        for (label, value) in localized {
            if let Some(text) = value.as_ref().map(|t| t.get(lang)).filter(|t| !t.is_empty()) {
                rows.push((label, text.to_string()));
            }
        }
        rows
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorOption {
    #[serde(rename = "p0ID")]
    pub p0_id: ColorId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub hex_code: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub main_color: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub effect: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub localized_name: LocalizedText,
    #[serde(rename = "SortIndex", default, deserialize_with = "null_as_default")]
    pub sort_index: f64,
}

impl ColorOption {
    pub fn key_for(&self, vehicle: &VehicleKey) -> ColorKey {
        ColorKey {
            vehicle: vehicle.clone(),
            color: self.p0_id.clone(),
        }
    }

    pub fn display_name(&self, lang: &str) -> &str {
        let name = self.localized_name.get(lang);
        if name.is_empty() {
            self.p0_id.as_str()
        } else {
            name
        }
    }

    /// "{effect} {mainColor}", skipping empty parts.
    pub fn finish_label(&self) -> String {
        [self.effect.as_str(), self.main_color.as_str()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn swatch_rgb(&self) -> Option<[u8; 3]> {
        parse_hex_rgb(&self.hex_code)
    }
}

/// Accepts `#RRGGBB`, `RRGGBB` and `#RGB`.
pub fn parse_hex_rgb(raw: &str) -> Option<[u8; 3]> {
    let hex = raw.trim().trim_start_matches('#');
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        6 => {
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
            Some([channel(0)?, channel(2)?, channel(4)?])
        }
        3 => {
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
            Some([channel(0)?, channel(1)?, channel(2)?])
        }
        _ => None,
    }
}

/// Stable ascending sort by `SortIndex`.
pub fn sort_colors(colors: &mut [ColorOption]) {
    colors.sort_by(|a, b| a.sort_index.total_cmp(&b.sort_index));
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedImage {
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub environment: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub view_angle: String,
}

impl RenderedImage {
    pub fn caption(&self, vehicle_name: Option<&str>) -> String {
        let name = vehicle_name.filter(|n| !n.is_empty()).unwrap_or("BMW");
        format!("{name} - {} - {}", self.environment, self.view_angle)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<RenderedImage>,
}

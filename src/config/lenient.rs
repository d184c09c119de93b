use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;

/// A switch written as `true`/`false` or `1`/`0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Flag {
    Bool(bool),
    Int(i64),
}

impl Default for Flag {
    fn default() -> Self {
        Self::Bool(false)
    }
}

impl Flag {
    pub fn is_on(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Int(i) => *i != 0,
        }
    }
}

impl From<bool> for Flag {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Float(f64),
    Text(String),
}

impl Scalar {
    fn number(self) -> Result<f64, String> {
        match self {
            Self::Float(x) => Ok(x),
            Self::Text(s) => s.trim().parse::<f64>().map_err(|e| format!("{:?}: {}", s, e)),
        }
    }
}

/// Numbers that older documents quote as strings, e.g. `angle: "1.0"`.
pub fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f32, D::Error> {
    Scalar::deserialize(deserializer)?
        .number()
        .map(|x| x as f32)
        .map_err(serde::de::Error::custom)
}

/// Whole numbers that may be quoted; fractions are truncated.
pub fn whole<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    Scalar::deserialize(deserializer)?
        .number()
        .map(|x| x as i64)
        .map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Doc {
        flag: Flag,
        #[serde(deserialize_with = "number")]
        angle: f32,
        #[serde(deserialize_with = "whole")]
        level: i64,
    }

    #[test]
    fn accepts_quoted_and_bare() {
        let doc = serde_yaml::from_str::<Doc>("flag: 1\nangle: \"1.5\"\nlevel: 3").unwrap();
        assert!(doc.flag.is_on());
        assert_eq!(doc.angle, 1.5);
        assert_eq!(doc.level, 3);
        let doc = serde_yaml::from_str::<Doc>("flag: false\nangle: 2\nlevel: \"4\"").unwrap();
        assert!(!doc.flag.is_on());
        assert_eq!(doc.angle, 2.0);
        assert_eq!(doc.level, 4);
    }

    #[test]
    fn rejects_garbage() {
        assert!(serde_yaml::from_str::<Doc>("flag: 0\nangle: fast\nlevel: 1").is_err());
    }
}

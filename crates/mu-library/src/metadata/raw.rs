use std::path::PathBuf;

use serde::de::{Deserialize, Deserializer, Error as _};
use serde_json::value::RawValue as JsonText;

/// Valor tal cual llega de la herramienta externa: texto o número JSON.
///
/// Los números conservan los dígitos del documento (`1.10` sigue siendo
/// `"1.10"`, `3.0` sigue siendo `"3.0"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    Text(String),
    Number(String),
}

impl RawValue {
    pub fn into_text(self) -> String {
        match self {
            RawValue::Text(s) | RawValue::Number(s) => s,
        }
    }
}

impl<'de> Deserialize<'de> for RawValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Box::<JsonText>::deserialize(deserializer)?;
        let src = raw.get().trim();

        match src.as_bytes().first() {
            Some(b'"') => serde_json::from_str(src).map(RawValue::Text).map_err(D::Error::custom),
            Some(b'-' | b'0'..=b'9') => Ok(RawValue::Number(src.to_owned())),
            _ => Err(D::Error::custom(format!("expected text or number, got `{src}`"))),
        }
    }
}

/// Texto de un campo, vacío si no vino.
pub(crate) fn text(value: Option<RawValue>) -> String {
    value
        .map(RawValue::into_text)
        .map(|s| s.trim().to_owned())
        .unwrap_or_default()
}

/// Texto de un campo opcional; un valor vacío cuenta como ausente.
pub(crate) fn optional(value: Option<RawValue>) -> Option<String> {
    Some(text(value)).filter(|s| !s.is_empty())
}

/// Resultado sin validar de una llamada al extractor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawMetadataRecord {
    /// Archivo escaneado del que sale el registro; lo rellena el coordinador.
    pub source: PathBuf,
    /// Ruta del archivo (absoluta o relativa a la raíz) o referencia de la herramienta.
    pub id: String,
    pub album: String,
    pub artist: String,
    pub duration: String,
    pub title: String,

    pub date: Option<String>,
    pub position: Option<String>,

    /// Sustituto de `album` cuando el archivo no lo trae (p. ej. MP4 con `Product`).
    pub product: Option<String>,
    /// Sustituto de `position`.
    pub track_number: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(json: &str) -> Option<RawValue> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn numbers_are_rendered_as_text() {
        assert_eq!(text(decode("3")), "3");
        assert_eq!(text(decode("-7")), "-7");
        assert_eq!(text(decode("245.61")), "245.61");
        assert_eq!(text(decode("18446744073709551615")), "18446744073709551615");
    }

    #[test]
    fn numbers_keep_their_original_digits() {
        assert_eq!(text(decode("1.10")), "1.10");
        assert_eq!(text(decode("3.0")), "3.0");
        assert_eq!(text(decode("2007.0")), "2007.0");
        assert_eq!(text(decode("1e3")), "1e3");
    }

    #[test]
    fn numbers_inside_a_document_keep_their_digits() {
        #[derive(serde::Deserialize)]
        struct Doc {
            #[serde(rename = "Title", default)]
            title: Option<RawValue>,
            #[serde(rename = "Album", default)]
            album: Option<RawValue>,
        }

        let doc: Doc = serde_json::from_str(r#"{ "Title": 1.10, "Album": 2.0 }"#).unwrap();
        assert_eq!(text(doc.title), "1.10");
        assert_eq!(text(doc.album), "2.0");
    }

    #[test]
    fn text_is_kept_and_trimmed() {
        assert_eq!(text(decode(r#""  Abbey Road ""#)), "Abbey Road");
        assert_eq!(text(decode(r#""3/12""#)), "3/12");
        assert_eq!(text(decode(r#""café""#)), "café");
    }

    #[test]
    fn null_and_empty_are_absent() {
        assert_eq!(text(decode("null")), "");
        assert_eq!(optional(decode("null")), None);
        assert_eq!(optional(decode(r#""""#)), None);
        assert_eq!(optional(decode("7")), Some("7".to_owned()));
    }

    #[test]
    fn other_json_types_are_rejected() {
        assert!(serde_json::from_str::<RawValue>("true").is_err());
        assert!(serde_json::from_str::<RawValue>("[1, 2]").is_err());
        assert!(serde_json::from_str::<RawValue>(r#"{"a": 1}"#).is_err());
    }
}

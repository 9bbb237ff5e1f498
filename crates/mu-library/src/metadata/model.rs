use serde::{Deserialize, Serialize};

/// Metadatos validados de una canción. Inmutables una vez en la biblioteca.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Metadata {
    /// Ruta relativa a la raíz de la biblioteca, con separadores `/`.
    pub id: String,
    pub album: String,
    pub artist: String,
    pub duration: String,
    pub title: String,

    #[serde(rename = "year", default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(rename = "track", default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_wire_names() {
        let m = Metadata {
            id: "Foo/a.mp3".into(),
            album: "Foo".into(),
            artist: "Bar".into(),
            duration: "3:25".into(),
            title: "One".into(),
            date: None,
            position: Some("1".into()),
        };

        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["track"], "1");
        assert!(json.get("year").is_none());
        assert!(json.get("position").is_none());
    }
}

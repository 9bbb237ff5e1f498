use std::path::{Component, Path};

use super::model::Metadata;
use super::raw::RawMetadataRecord;
use crate::error::{LibraryError, Result};

/// Normaliza y valida un registro del extractor.
///
/// 1. Campos sustitutos: `product` ocupa el lugar de un `album` vacío y
///    `track_number` el de una `position` ausente.
/// 2. `id`, `title`, `artist` y `album` son obligatorios.
/// 3. `id` se reescribe relativo a `root`.
pub fn validate(mut raw: RawMetadataRecord, root: &Path) -> Result<Metadata> {
    if raw.album.is_empty() {
        if let Some(product) = raw.product.take().filter(|p| !p.is_empty()) {
            raw.album = product;
        }
    }
    if raw.position.is_none() {
        raw.position = raw.track_number.take().filter(|p| !p.is_empty());
    }

    let missing: Vec<&'static str> = [
        ("id", &raw.id),
        ("title", &raw.title),
        ("artist", &raw.artist),
        ("album", &raw.album),
    ]
    .into_iter()
    .filter(|(_, value)| value.is_empty())
    .map(|(name, _)| name)
    .collect();

    if !missing.is_empty() {
        return Err(LibraryError::InvalidMetadata {
            path: describe(&raw),
            missing,
        });
    }

    let id = relative_id(&raw.id, root)?;

    Ok(Metadata {
        id,
        album: raw.album,
        artist: raw.artist,
        duration: raw.duration,
        title: raw.title,
        date: raw.date,
        position: raw.position,
    })
}

/// Nombre del archivo para los mensajes de error: el escaneado si se conoce,
/// si no el `id` que dio la herramienta.
fn describe(raw: &RawMetadataRecord) -> String {
    if raw.source.as_os_str().is_empty() {
        raw.id.clone()
    } else {
        raw.source.display().to_string()
    }
}

/// `id` relativo a `root` con separadores `/`. Las rutas absolutas deben
/// estar bajo `root`; las relativas no pueden salir de ella.
fn relative_id(id: &str, root: &Path) -> Result<String> {
    let path_error = || LibraryError::PathError { path: id.to_owned() };

    let path = Path::new(id);
    let relative = if path.is_absolute() {
        path.strip_prefix(root).map_err(|_| path_error())?
    } else {
        path
    };

    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy()),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(path_error());
            }
        }
    }

    if parts.is_empty() {
        return Err(path_error());
    }

    Ok(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(id: &str, album: &str) -> RawMetadataRecord {
        RawMetadataRecord {
            id: id.into(),
            album: album.into(),
            artist: "Bar".into(),
            duration: "1:00".into(),
            title: "One".into(),
            ..Default::default()
        }
    }

    #[cfg(unix)]
    const ROOT: &str = "/music";
    #[cfg(windows)]
    const ROOT: &str = r"C:\music";

    fn abs(rel: &str) -> String {
        Path::new(ROOT).join(rel).to_string_lossy().into_owned()
    }

    #[test]
    fn product_replaces_an_empty_album() {
        let mut r = raw(&abs("a.m4a"), "");
        r.product = Some("Foo".into());

        let m = validate(r, Path::new(ROOT)).unwrap();
        assert_eq!(m.album, "Foo");
    }

    #[test]
    fn product_does_not_override_an_album() {
        let mut r = raw(&abs("a.m4a"), "Real");
        r.product = Some("Foo".into());
        assert_eq!(validate(r, Path::new(ROOT)).unwrap().album, "Real");
    }

    #[test]
    fn missing_album_and_product_is_invalid() {
        match validate(raw(&abs("a.m4a"), ""), Path::new(ROOT)) {
            Err(LibraryError::InvalidMetadata { missing, .. }) => {
                assert_eq!(missing, vec!["album"])
            }
            other => panic!("expected InvalidMetadata, got {other:?}"),
        }
    }

    #[test]
    fn reports_every_missing_field() {
        let r = RawMetadataRecord {
            id: abs("x.mp3"),
            ..Default::default()
        };
        match validate(r, Path::new(ROOT)) {
            Err(LibraryError::InvalidMetadata { path, missing }) => {
                assert_eq!(path, abs("x.mp3"));
                assert_eq!(missing, vec!["title", "artist", "album"]);
            }
            other => panic!("expected InvalidMetadata, got {other:?}"),
        }
    }

    #[test]
    fn missing_id_names_the_scanned_file() {
        let scanned = Path::new(ROOT).join("Foo").join("a.flac");
        let r = RawMetadataRecord {
            source: scanned.clone(),
            ..raw("", "Foo")
        };

        match validate(r, Path::new(ROOT)) {
            Err(LibraryError::InvalidMetadata { path, missing }) => {
                assert_eq!(path, scanned.display().to_string());
                assert_eq!(missing, vec!["id"]);
            }
            other => panic!("expected InvalidMetadata, got {other:?}"),
        }
    }

    #[test]
    fn track_number_fills_a_missing_position() {
        let mut r = raw(&abs("a.m4a"), "Foo");
        r.track_number = Some("4".into());
        assert_eq!(validate(r, Path::new(ROOT)).unwrap().position.as_deref(), Some("4"));
    }

    #[test]
    fn id_becomes_relative_to_root() {
        let m = validate(raw(&abs("Foo/Disc 1/a.mp3"), "Foo"), Path::new(ROOT)).unwrap();
        assert_eq!(m.id, "Foo/Disc 1/a.mp3");
    }

    #[test]
    fn relative_ids_are_kept() {
        let m = validate(raw("./Foo/a.mp3", "Foo"), Path::new(ROOT)).unwrap();
        assert_eq!(m.id, "Foo/a.mp3");
    }

    #[test]
    fn ids_outside_the_root_are_rejected() {
        #[cfg(unix)]
        let outside = "/elsewhere/a.mp3";
        #[cfg(windows)]
        let outside = r"D:\elsewhere\a.mp3";

        for id in [outside, "../a.mp3", "Foo/../../a.mp3"] {
            match validate(raw(id, "Foo"), Path::new(ROOT)) {
                Err(LibraryError::PathError { path }) => assert_eq!(path, id),
                other => panic!("expected PathError for {id}, got {other:?}"),
            }
        }
    }

    #[test]
    fn the_root_itself_is_not_a_song() {
        assert!(matches!(
            validate(raw(ROOT, "Foo"), Path::new(ROOT)),
            Err(LibraryError::PathError { .. })
        ));
    }
}

use std::cmp::Ordering;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{Level, info, instrument};

use crate::error::{LibraryError, Result};
use crate::metadata::Metadata;

pub type Songs = HashMap<String, Arc<Metadata>>;
pub type Albums = HashMap<String, Vec<Arc<Metadata>>>;
pub type Artists = HashMap<String, Vec<Arc<Metadata>>>;

/// Instantánea inmutable de la biblioteca.
///
/// `songs`, `albums` y `artists` son tres vistas del mismo conjunto de
/// canciones: cada `Arc<Metadata>` aparece una vez en `songs`, una vez en el
/// álbum de su campo `album` y una vez en el artista de su campo `artist`.
#[derive(Debug, Clone, Default)]
pub struct LibraryIndex {
    root: PathBuf,
    songs: Songs,
    albums: Albums,
    artists: Artists,
}

impl LibraryIndex {
    pub fn empty(root: impl Into<PathBuf>) -> Self {
        LibraryIndex {
            root: root.into(),
            ..Default::default()
        }
    }

    /// Construye el índice en una sola pasada.
    ///
    /// Un `id` repetido aborta la construcción con `DuplicateId`. Las
    /// canciones de cada álbum quedan ordenadas por `position`
    /// (ver [`compare_positions`]).
    #[instrument(level = Level::DEBUG, skip_all, fields(root = %root.as_ref().display()))]
    pub fn build(
        root: impl AsRef<Path>,
        records: impl IntoIterator<Item = Metadata>,
    ) -> Result<Self> {
        let mut index = LibraryIndex::empty(root.as_ref());

        for record in records {
            let song = Arc::new(record);

            match index.songs.entry(song.id.clone()) {
                Entry::Occupied(_) => return Err(LibraryError::DuplicateId { id: song.id.clone() }),
                Entry::Vacant(slot) => {
                    slot.insert(song.clone());
                }
            }

            index.albums.entry(song.album.clone()).or_default().push(song.clone());
            index.artists.entry(song.artist.clone()).or_default().push(song);
        }

        for tracks in index.albums.values_mut() {
            tracks.sort_by(|a, b| track_order(a, b));
        }

        info!(
            songs = index.songs.len(),
            albums = index.albums.len(),
            artists = index.artists.len(),
            "library index built"
        );

        Ok(index)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn songs(&self) -> &Songs {
        &self.songs
    }

    /// Álbumes con sus canciones en orden de pista.
    pub fn albums(&self) -> &Albums {
        &self.albums
    }

    pub fn artists(&self) -> &Artists {
        &self.artists
    }

    pub fn size(&self) -> usize {
        self.songs.len()
    }

    pub fn song(&self, id: &str) -> Option<&Arc<Metadata>> {
        self.songs.get(id)
    }

    /// Ruta absoluta del archivo de la canción `id`.
    pub fn lookup(&self, id: &str) -> Result<PathBuf> {
        let song = self.song(id).ok_or_else(|| LibraryError::NotFound { id: id.to_owned() })?;
        Ok(self.absolute(&song.id))
    }

    /// Ruta del archivo del que se extrae la portada de un álbum: su primera pista.
    pub fn album_cover_path(&self, album: &str) -> Result<PathBuf> {
        let first = self
            .albums
            .get(album)
            .and_then(|tracks| tracks.first())
            .ok_or_else(|| LibraryError::NotFound { id: album.to_owned() })?;
        Ok(self.absolute(&first.id))
    }

    fn absolute(&self, id: &str) -> PathBuf {
        id.split('/').fold(self.root.clone(), |path, part| path.join(part))
    }
}

fn track_order(a: &Metadata, b: &Metadata) -> Ordering {
    compare_positions(a.position.as_deref(), b.position.as_deref()).then_with(|| a.id.cmp(&b.id))
}

/// Compara posiciones de pista como texto con conciencia numérica.
///
/// - Se ignoran los ceros a la izquierda: `"2" < "10"` y `"02" == "2"` en valor.
/// - Un prefijo numérico manda sobre el resto (`"3/12" < "10/12"`); lo que
///   sigue se compara como texto.
/// - Las posiciones con número van antes que las que sólo tienen texto.
/// - Una posición vacía o ausente va siempre al final.
pub fn compare_positions(a: Option<&str>, b: Option<&str>) -> Ordering {
    let a = a.map(str::trim).filter(|s| !s.is_empty());
    let b = b.map(str::trim).filter(|s| !s.is_empty());

    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => compare_text(a, b),
    }
}

fn compare_text(a: &str, b: &str) -> Ordering {
    let (a_digits, a_rest) = split_digits(a);
    let (b_digits, b_rest) = split_digits(b);

    match (a_digits.is_empty(), b_digits.is_empty()) {
        (false, false) => compare_digits(a_digits, b_digits)
            .then_with(|| a_rest.cmp(b_rest))
            .then_with(|| a.cmp(b)),
        (false, true) => Ordering::Less,
        (true, false) => Ordering::Greater,
        (true, true) => a.cmp(b),
    }
}

fn split_digits(s: &str) -> (&str, &str) {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s.split_at(end)
}

/// Compara dos cadenas de dígitos sin límite de longitud.
fn compare_digits(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(id: &str, album: &str, artist: &str, title: &str, position: Option<&str>) -> Metadata {
        Metadata {
            id: id.into(),
            album: album.into(),
            artist: artist.into(),
            duration: "1:00".into(),
            title: title.into(),
            date: None,
            position: position.map(Into::into),
        }
    }

    fn titles(index: &LibraryIndex, album: &str) -> Vec<String> {
        index.albums()[album].iter().map(|m| m.title.clone()).collect()
    }

    #[test]
    fn positions_sort_numerically_with_empty_last() {
        let index = LibraryIndex::build(
            "/music",
            vec![
                song("x/ten.mp3", "X", "A", "ten", Some("10")),
                song("x/two.mp3", "X", "A", "two", Some("2")),
                song("x/none.mp3", "X", "A", "none", Some("")),
            ],
        )
        .unwrap();

        assert_eq!(titles(&index, "X"), ["two", "ten", "none"]);
    }

    #[test]
    fn missing_position_also_sorts_last() {
        let index = LibraryIndex::build(
            "/music",
            vec![
                song("x/a.mp3", "X", "A", "unset", None),
                song("x/b.mp3", "X", "A", "first", Some("1")),
            ],
        )
        .unwrap();

        assert_eq!(titles(&index, "X"), ["first", "unset"]);
    }

    #[test]
    fn compare_positions_cases() {
        use Ordering::*;

        let cases = [
            (Some("2"), Some("10"), Less),
            (Some("002"), Some("10"), Less),
            (Some("02"), Some("2"), Less),
            (Some("3/12"), Some("10/12"), Less),
            (Some("1"), Some("A1"), Less),
            (Some("B"), Some("A"), Greater),
            (Some("99999999999999999999999"), Some("100000000000000000000000"), Less),
            (Some(""), Some("1"), Greater),
            (None, Some("1"), Greater),
            (Some("  "), None, Equal),
        ];

        for (a, b, expected) in cases {
            assert_eq!(compare_positions(a, b), expected, "{a:?} vs {b:?}");
            assert_eq!(compare_positions(b, a), expected.reverse(), "{b:?} vs {a:?}");
        }
    }

    #[test]
    fn equal_positions_are_ordered_by_id() {
        let index = LibraryIndex::build(
            "/music",
            vec![
                song("x/b.mp3", "X", "A", "b", None),
                song("x/a.mp3", "X", "A", "a", None),
            ],
        )
        .unwrap();

        assert_eq!(titles(&index, "X"), ["a", "b"]);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let result = LibraryIndex::build(
            "/music",
            vec![
                song("a.mp3", "X", "A", "one", None),
                song("a.mp3", "Y", "B", "other", None),
            ],
        );

        match result {
            Err(LibraryError::DuplicateId { id }) => assert_eq!(id, "a.mp3"),
            other => panic!("expected DuplicateId, got {other:?}"),
        }
    }

    #[test]
    fn views_are_consistent() {
        let index = LibraryIndex::build(
            "/music",
            vec![
                song("1.mp3", "X", "A", "1", Some("1")),
                song("2.mp3", "X", "B", "2", Some("2")),
                song("3.mp3", "Y", "A", "3", None),
                song("4.mp3", "Z", "C", "4", Some("9")),
            ],
        )
        .unwrap();

        for (id, song) in index.songs() {
            assert_eq!(id, &song.id);
            let in_album = index.albums()[&song.album]
                .iter()
                .filter(|m| Arc::ptr_eq(m, song))
                .count();
            let in_artist = index.artists()[&song.artist]
                .iter()
                .filter(|m| Arc::ptr_eq(m, song))
                .count();
            assert_eq!((in_album, in_artist), (1, 1), "{id}");
        }

        for (album, tracks) in index.albums() {
            for m in tracks {
                assert_eq!(&m.album, album);
                assert!(Arc::ptr_eq(&index.songs()[&m.id], m));
            }
        }

        for (artist, tracks) in index.artists() {
            for m in tracks {
                assert_eq!(&m.artist, artist);
                assert!(Arc::ptr_eq(&index.songs()[&m.id], m));
            }
        }

        let album_total: usize = index.albums().values().map(Vec::len).sum();
        let artist_total: usize = index.artists().values().map(Vec::len).sum();
        assert_eq!(album_total, index.size());
        assert_eq!(artist_total, index.size());
    }

    #[test]
    fn lookup_resolves_against_the_root() {
        let root = Path::new("/music");
        let records = vec![song("Foo/a.mp3", "Foo", "Bar", "One", Some("1"))];
        let index = LibraryIndex::build(root, records).unwrap();

        assert_eq!(index.lookup("Foo/a.mp3").unwrap(), root.join("Foo").join("a.mp3"));
        assert_eq!(index.album_cover_path("Foo").unwrap(), root.join("Foo").join("a.mp3"));

        assert!(matches!(index.lookup("nope.mp3"), Err(LibraryError::NotFound { .. })));
        assert!(matches!(index.album_cover_path("Nope"), Err(LibraryError::NotFound { .. })));
    }

    #[test]
    fn empty_index_has_no_songs() {
        let index = LibraryIndex::empty("/music");
        assert_eq!(index.size(), 0);
        assert!(index.albums().is_empty());
        assert!(index.artists().is_empty());
    }
}

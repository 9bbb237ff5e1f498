use std::io::{self, Read};

use serde::{Deserialize, Serialize};

/// Bytes que se leen del principio de cada archivo para detectar su tipo.
pub const SNIFF_LEN: usize = 8 * 1024;

/// Marcas ISO-BMFF (`ftyp`) que identifican un contenedor MP4 sólo de audio.
const MP4_AUDIO_BRANDS: &[[u8; 4]] = &[*b"M4A ", *b"M4B ", *b"M4P ", *b"F4A "];

/// Tipos de audio soportados
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Flac,
    Mp4Audio,
    Mp3,
    Wav,
}

impl MediaKind {
    pub const ALL: &'static [MediaKind] = &[
        MediaKind::Flac,
        MediaKind::Mp4Audio,
        MediaKind::Mp3,
        MediaKind::Wav,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Flac => "flac",
            MediaKind::Mp4Audio => "m4a",
            MediaKind::Mp3 => "mp3",
            MediaKind::Wav => "wav",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            MediaKind::Flac => "audio/flac",
            MediaKind::Mp4Audio => "audio/mp4",
            MediaKind::Mp3 => "audio/mpeg",
            MediaKind::Wav => "audio/wav",
        }
    }

    /// Traduce un MIME detectado por `infer` a un tipo soportado, si lo es.
    fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "audio/flac" | "audio/x-flac" => Some(MediaKind::Flac),
            "audio/m4a" | "audio/x-m4a" | "audio/mp4" => Some(MediaKind::Mp4Audio),
            "audio/mpeg" | "audio/mp3" => Some(MediaKind::Mp3),
            "audio/wav" | "audio/x-wav" => Some(MediaKind::Wav),
            _ => None,
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Resultado de clasificar un flujo de bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Supported(MediaKind),
    /// `mime` es el tipo detectado cuando el contenido es reconocible.
    Unsupported { mime: Option<&'static str> },
}

impl Classification {
    pub fn kind(&self) -> Option<MediaKind> {
        match self {
            Classification::Supported(kind) => Some(*kind),
            Classification::Unsupported { .. } => None,
        }
    }

    /// Audio reconocible pero fuera de la lista de tipos soportados.
    pub fn is_audio_like(&self) -> bool {
        matches!(self, Classification::Unsupported { mime: Some(m) } if m.starts_with("audio/"))
    }
}

/// Clasifica el contenido de `reader` leyendo como mucho [`SNIFF_LEN`] bytes.
///
/// Un error de lectura se devuelve tal cual; nunca se confunde con
/// `Unsupported`.
pub fn classify<R: Read + ?Sized>(reader: &mut R) -> io::Result<Classification> {
    let mut buf = [0u8; SNIFF_LEN];
    let n = read_prefix(reader, &mut buf)?;
    Ok(classify_bytes(&buf[..n]))
}

pub fn classify_bytes(buf: &[u8]) -> Classification {
    if let Some(kind) = sniff(buf) {
        return Classification::Supported(kind);
    }

    match infer::get(buf) {
        Some(t) => match MediaKind::from_mime(t.mime_type()) {
            Some(kind) => Classification::Supported(kind),
            None => Classification::Unsupported {
                mime: Some(t.mime_type()),
            },
        },
        None => Classification::Unsupported { mime: None },
    }
}

fn read_prefix<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break, // EOF
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

fn sniff(buf: &[u8]) -> Option<MediaKind> {
    match buf {
        [b'f', b'L', b'a', b'C', ..] => Some(MediaKind::Flac),
        [b'I', b'D', b'3', ..] => Some(MediaKind::Mp3),
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'A', b'V', b'E', ..] => Some(MediaKind::Wav),
        [_, _, _, _, b'f', b't', b'y', b'p', b0, b1, b2, b3, ..]
            if MP4_AUDIO_BRANDS.contains(&[*b0, *b1, *b2, *b3]) =>
        {
            Some(MediaKind::Mp4Audio)
        }
        [0xFF, b, ..] if is_mpeg_frame_sync(*b) => Some(MediaKind::Mp3),
        _ => None,
    }
}

/// Segundo byte de una cabecera MPEG de audio: 3 bits de sync y capa != 0
/// (capa 0 es ADTS/AAC).
fn is_mpeg_frame_sync(b: u8) -> bool {
    b & 0xE0 == 0xE0 && b & 0x06 != 0
}

//! TrueType faces embedded into exported PDFs.
//!
//! The standard PDF fonts only reach the Windows-1252 repertoire. Answers in
//! other scripts need a real font file, taken from `INTAKE_PDF_FONT` or found
//! among the usual system locations.

use std::path::Path;
use std::sync::Arc;

use ttf_parser::Face;

use crate::export::ExportError;

/// Regular and bold faces known to cover Latin and Hebrew.
const SYSTEM_FACES: &[(&str, Option<&str>)] = &[
    (
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        Some("/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf"),
    ),
    (
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        Some("/usr/share/fonts/TTF/DejaVuSans-Bold.ttf"),
    ),
    (
        "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
        Some("/usr/share/fonts/dejavu-sans-fonts/DejaVuSans-Bold.ttf"),
    ),
    ("/System/Library/Fonts/Supplemental/Arial Unicode.ttf", None),
    ("/Library/Fonts/Arial Unicode.ttf", None),
    ("C:\\Windows\\Fonts\\arial.ttf", Some("C:\\Windows\\Fonts\\arialbd.ttf")),
];

#[derive(Clone, Debug)]
pub struct FontFace {
    name: String,
    data: Arc<Vec<u8>>,
}

impl FontFace {
    pub fn load(path: &Path) -> Result<Self, ExportError> {
        let data = std::fs::read(path)
            .map_err(|e| ExportError::Font(format!("{}: {e}", path.display())))?;
        Face::parse(&data, 0).map_err(|e| ExportError::Font(format!("{}: {e}", path.display())))?;

        let name: String = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_default()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
            .collect();
        Ok(Self {
            name: if name.is_empty() { "EmbeddedFont".into() } else { name },
            data: Arc::new(data),
        })
    }

    /// PostScript-style name written as the PDF `BaseFont`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn face(&self) -> Result<Face<'_>, ExportError> {
        Face::parse(&self.data, 0).map_err(|e| ExportError::Font(format!("{}: {e}", self.name)))
    }
}

#[derive(Clone, Debug)]
pub struct FontSet {
    pub regular: FontFace,
    pub bold: Option<FontFace>,
}

impl FontSet {
    pub fn load(regular: &Path, bold: Option<&Path>) -> Result<Self, ExportError> {
        Ok(Self {
            regular: FontFace::load(regular)?,
            bold: bold.map(FontFace::load).transpose()?,
        })
    }

    /// First usable face among the system locations.
    pub fn discover() -> Option<Self> {
        for (regular, bold) in SYSTEM_FACES {
            let regular = Path::new(regular);
            if !regular.exists() {
                continue;
            }
            let bold = bold.map(Path::new).filter(|path| path.exists());
            match Self::load(regular, bold) {
                Ok(set) => {
                    tracing::debug!(font = %regular.display(), "using system font for PDF export");
                    return Some(set);
                }
                Err(err) => tracing::warn!(error = %err, "skipping unreadable system font"),
            }
        }
        None
    }

    pub fn bold(&self) -> &FontFace {
        self.bold.as_ref().unwrap_or(&self.regular)
    }

    pub fn has_bold(&self) -> bool {
        self.bold.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreadable_font_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.ttf");
        assert!(matches!(FontFace::load(&missing), Err(ExportError::Font(_))));

        let garbage = dir.path().join("garbage.ttf");
        std::fs::write(&garbage, b"not a font").unwrap();
        assert!(matches!(FontSet::load(&garbage, None), Err(ExportError::Font(_))));
    }

    #[test]
    fn discovered_faces_cover_hebrew() {
        let Some(fonts) = FontSet::discover() else {
            eprintln!("no system font found, skipping");
            return;
        };
        let face = fonts.regular.face().unwrap();
        assert!("סטודיו".chars().all(|c| face.glyph_index(c).is_some()));
        assert!(!fonts.regular.name().is_empty());
    }
}

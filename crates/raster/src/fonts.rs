//! Font resolution.
//!
//! A `FontLibrary` wraps a `fontdb` database seeded with the bundled DejaVu
//! faces. System fonts and a user font directory can be layered on top. A
//! `TextLine` names its font the way a stylesheet does (`"Georgia, serif"`);
//! each family is tried in order, generic families map onto the bundled
//! faces, and anything unresolved falls back to DejaVu Sans.

use log::debug;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

const SANS_FAMILY: &str = "DejaVu Sans";
const SERIF_FAMILY: &str = "DejaVu Serif";
const MONO_FAMILY: &str = "DejaVu Sans Mono";

static SANS: &[u8] = include_bytes!("../fonts/DejaVuSans.ttf");
static SERIF: &[u8] = include_bytes!("../fonts/DejaVuSerif.ttf");
static MONO: &[u8] = include_bytes!("../fonts/DejaVuSansMono.ttf");

type FontData = Arc<dyn AsRef<[u8]> + Send + Sync>;

/// The bytes of one resolved face.
pub struct FontFace {
    data: FontData,
    index: u32,
    family: String,
}

impl FontFace {
    pub fn family(&self) -> &str {
        &self.family
    }

    pub(crate) fn parse(&self) -> Option<ttf_parser::Face<'_>> {
        ttf_parser::Face::parse((*self.data).as_ref(), self.index).ok()
    }
}

impl fmt::Debug for FontFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontFace")
            .field("family", &self.family)
            .field("index", &self.index)
            .finish()
    }
}

pub struct FontLibrary {
    db: fontdb::Database,
    faces: RwLock<HashMap<fontdb::ID, Arc<FontFace>>>,
    lookups: RwLock<HashMap<String, Option<fontdb::ID>>>,
    fallback: Arc<FontFace>,
}

impl fmt::Debug for FontLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontLibrary")
            .field("faces", &self.db.len())
            .finish()
    }
}

impl Default for FontLibrary {
    fn default() -> Self {
        Self::bundled()
    }
}

/// Splits a stylesheet family list into bare names.
fn family_names(spec: &str) -> Vec<&str> {
    spec.split(',')
        .map(|name| name.trim().trim_matches(|c| c == '"' || c == '\''))
        .filter(|name| !name.is_empty())
        .collect()
}

fn to_family(name: &str) -> fontdb::Family<'_> {
    match name.to_ascii_lowercase().as_str() {
        "serif" => fontdb::Family::Serif,
        "sans-serif" => fontdb::Family::SansSerif,
        "monospace" => fontdb::Family::Monospace,
        "cursive" => fontdb::Family::Cursive,
        "fantasy" => fontdb::Family::Fantasy,
        _ => fontdb::Family::Name(name),
    }
}

impl FontLibrary {
    /// Only the bundled faces. Rendering is identical on every host.
    pub fn bundled() -> Self {
        let mut db = fontdb::Database::new();
        for data in [SANS, SERIF, MONO] {
            db.load_font_source(fontdb::Source::Binary(Arc::new(data)));
        }
        db.set_sans_serif_family(SANS_FAMILY);
        db.set_serif_family(SERIF_FAMILY);
        db.set_monospace_family(MONO_FAMILY);
        db.set_cursive_family(SERIF_FAMILY);
        db.set_fantasy_family(SANS_FAMILY);

        Self {
            db,
            faces: RwLock::new(HashMap::new()),
            lookups: RwLock::new(HashMap::new()),
            fallback: Arc::new(FontFace {
                data: Arc::new(SANS),
                index: 0,
                family: SANS_FAMILY.to_string(),
            }),
        }
    }

    /// Adds the host's installed fonts, so named families like `Poppins`
    /// resolve when present.
    pub fn with_system_fonts(mut self) -> Self {
        let before = self.db.len();
        self.db.load_system_fonts();
        debug!("Loaded {} system font faces", self.db.len() - before);
        self
    }

    /// Adds every font file found under `dir`.
    pub fn with_font_dir(mut self, dir: &Path) -> Self {
        let before = self.db.len();
        self.db.load_fonts_dir(dir);
        debug!(
            "Loaded {} font faces from {}",
            self.db.len() - before,
            dir.display()
        );
        self
    }

    pub fn face_count(&self) -> usize {
        self.db.len()
    }

    pub fn fallback(&self) -> Arc<FontFace> {
        Arc::clone(&self.fallback)
    }

    /// Resolves a stylesheet family list to a face. Unknown or missing
    /// families yield the fallback face.
    pub fn resolve(&self, spec: Option<&str>) -> Arc<FontFace> {
        let Some(spec) = spec.map(str::trim).filter(|s| !s.is_empty()) else {
            return self.fallback();
        };
        self.lookup(spec)
            .and_then(|id| self.load(id))
            .unwrap_or_else(|| self.fallback())
    }

    fn lookup(&self, spec: &str) -> Option<fontdb::ID> {
        if let Some(hit) = self
            .lookups
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(spec)
        {
            return *hit;
        }

        let names = family_names(spec);
        let mut families: Vec<fontdb::Family<'_>> = names.iter().map(|n| to_family(n)).collect();
        families.push(fontdb::Family::SansSerif);
        let id = self.db.query(&fontdb::Query {
            families: &families,
            weight: fontdb::Weight::NORMAL,
            stretch: fontdb::Stretch::Normal,
            style: fontdb::Style::Normal,
        });
        if id.is_none() {
            debug!("No face matches '{}', using {}", spec, SANS_FAMILY);
        }

        self.lookups
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(spec.to_string(), id);
        id
    }

    fn load(&self, id: fontdb::ID) -> Option<Arc<FontFace>> {
        if let Some(face) = self
            .faces
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
        {
            return Some(Arc::clone(face));
        }

        let info = self.db.face(id)?;
        let data: FontData = match &info.source {
            fontdb::Source::Binary(data) => Arc::clone(data),
            _ => self
                .db
                .with_face_data(id, |data, _| Arc::new(data.to_vec()) as FontData)?,
        };
        let face = Arc::new(FontFace {
            data,
            index: info.index,
            family: info
                .families
                .first()
                .map(|(name, _)| name.clone())
                .unwrap_or_default(),
        });
        if face.parse().is_none() {
            debug!("Font face '{}' failed to parse", face.family);
            return None;
        }

        self.faces
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::clone(&face));
        Some(face)
    }
}

//! System font lookup for text elements.
//!
//! The face database is scanned once per process. Each face is parsed and
//! leaked into `'static` storage at most once, keyed by its database id, so
//! glyph layout never re-reads font files and families that fall back to the
//! same face share it. Nothing is bundled: on a machine without fonts every
//! lookup yields `None` and the renderer skips text.

use fontdb::{Database, Family, Query, Stretch, Style, Weight, ID};
use rusttype::Font;
use slidekit_document::FontSpec;
use std::collections::HashMap;
use std::sync::{Mutex, OnceLock, PoisonError};

type StaticFont = &'static Font<'static>;

#[derive(Clone, PartialEq, Eq, Hash)]
struct FaceKey {
    family: String,
    bold: bool,
    italic: bool,
}

impl From<&FontSpec> for FaceKey {
    fn from(spec: &FontSpec) -> Self {
        Self {
            family: spec.family.trim().to_string(),
            bold: spec.bold,
            italic: spec.italic,
        }
    }
}

#[derive(Default)]
struct Cache {
    by_key: HashMap<FaceKey, Option<StaticFont>>,
    by_face: HashMap<ID, Option<StaticFont>>,
}

/// Lazily populated font registry.
pub struct FontLibrary {
    db: Database,
    cache: Mutex<Cache>,
    fallback: OnceLock<Option<ID>>,
}

impl FontLibrary {
    fn scan() -> Self {
        let mut db = Database::new();
        db.load_system_fonts();
        tracing::debug!("Font database loaded with {} faces", db.len());
        Self {
            db,
            cache: Mutex::new(Cache::default()),
            fallback: OnceLock::new(),
        }
    }

    pub fn face_count(&self) -> usize {
        self.db.len()
    }

    /// Font for `spec`. Unknown families share one fallback face: the
    /// regular sans face, or whatever face parses first.
    pub fn resolve(&self, spec: &FontSpec) -> Option<StaticFont> {
        let key = FaceKey::from(spec);
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(hit) = cache.by_key.get(&key) {
            return *hit;
        }

        let font = self
            .query(&key.family, key.bold, key.italic)
            .and_then(|id| self.load(&mut cache, id))
            .or_else(|| self.fallback_id().and_then(|id| self.load(&mut cache, id)));
        if font.is_none() {
            tracing::warn!("No usable font for family '{}'", key.family);
        }
        cache.by_key.insert(key, font);
        font
    }

    fn fallback_id(&self) -> Option<ID> {
        *self.fallback.get_or_init(|| {
            self.query("Sans", false, false).or_else(|| {
                self.db
                    .faces()
                    .map(|face| face.id)
                    .find(|id| self.parse(*id).is_some())
            })
        })
    }

    fn load(&self, cache: &mut Cache, id: ID) -> Option<StaticFont> {
        *cache
            .by_face
            .entry(id)
            .or_insert_with(|| self.parse(id).map(|font| &*Box::leak(Box::new(font))))
    }

    fn query(&self, family: &str, bold: bool, italic: bool) -> Option<ID> {
        let family = match family {
            "" | "Sans" => Family::SansSerif,
            "Serif" => Family::Serif,
            "Monospace" => Family::Monospace,
            name => Family::Name(name),
        };
        self.db.query(&Query {
            families: &[family],
            weight: if bold { Weight::BOLD } else { Weight::NORMAL },
            stretch: Stretch::Normal,
            style: if italic { Style::Italic } else { Style::Normal },
        })
    }

    fn parse(&self, id: ID) -> Option<Font<'static>> {
        let (data, index) = self
            .db
            .with_face_data(id, |data, index| (data.to_vec(), index))?;
        Font::try_from_vec_and_index(data, index)
    }
}

/// The process-wide library, scanned on first use.
pub fn fonts() -> &'static FontLibrary {
    static LIBRARY: OnceLock<FontLibrary> = OnceLock::new();
    LIBRARY.get_or_init(FontLibrary::scan)
}

pub fn font_for(spec: &FontSpec) -> Option<StaticFont> {
    fonts().resolve(spec)
}

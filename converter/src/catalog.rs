use crate::source::DifficultyRecord;
use std::collections::HashSet;

/// A selectable mania chart set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogEntry {
    pub set_id: i32,
    pub label: String,
}

/// A chart set and its mania difficulties, display fields taken from the first one.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartSetRecord<'a> {
    pub id: i32,
    pub title: &'a str,
    pub title_unicode: &'a str,
    pub artist: &'a str,
    pub artist_unicode: &'a str,
    pub source: &'a str,
    pub creator: &'a str,
    pub difficulties: Vec<&'a DifficultyRecord>,
}

impl<'a> ChartSetRecord<'a> {
    /// First mania difficulty in listing order, `None` for an empty record.
    pub fn representative(&self) -> Option<&'a DifficultyRecord> {
        self.difficulties.first().copied()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CatalogStats {
    pub chart_sets: usize,
    pub difficulties: usize,
    pub mania_difficulties: usize,
}

/// Index of the listing by chart set.
pub struct Catalog {
    difficulties: Vec<DifficultyRecord>,
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new(difficulties: Vec<DifficultyRecord>) -> Self {
        let mut seen = HashSet::new();
        let entries = difficulties
            .iter()
            .filter(|d| d.is_mania())
            .filter(|d| seen.insert(d.beatmap_set_id))
            .map(|d| CatalogEntry {
                set_id: d.beatmap_set_id,
                label: format!("{} {} - {}", d.beatmap_set_id, d.artist, d.title),
            })
            .collect();

        Catalog {
            difficulties,
            entries,
        }
    }

    /// Mania chart sets in first-seen order.
    pub fn list_mania_sets(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn contains(&self, set_id: i32) -> bool {
        self.entries.iter().any(|e| e.set_id == set_id)
    }

    /// Mania difficulties of a set, in listing order.
    pub fn difficulties_of(&self, set_id: i32) -> Vec<&DifficultyRecord> {
        self.difficulties
            .iter()
            .filter(|d| d.beatmap_set_id == set_id && d.is_mania())
            .collect()
    }

    pub fn chart_set(&self, set_id: i32) -> Option<ChartSetRecord<'_>> {
        let difficulties = self.difficulties_of(set_id);
        let first = *difficulties.first()?;
        Some(ChartSetRecord {
            id: set_id,
            title: &first.title,
            title_unicode: &first.title_unicode,
            artist: &first.artist,
            artist_unicode: &first.artist_unicode,
            source: &first.source,
            creator: &first.creator,
            difficulties,
        })
    }

    pub fn stats(&self) -> CatalogStats {
        CatalogStats {
            chart_sets: self.entries.len(),
            difficulties: self.difficulties.len(),
            mania_difficulties: self.difficulties.iter().filter(|d| d.is_mania()).count(),
        }
    }
}

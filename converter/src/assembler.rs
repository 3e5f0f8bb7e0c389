use crate::bundle::{OutputChartSet, OutputDifficulty, OutputNote};
use crate::error::Result;
use crate::source::DifficultyRecord;

/// Renako plays 4-lane charts only.
pub const TARGET_COLUMNS: f32 = 4.0;
pub const COLUMN_TOLERANCE: f32 = 0.1;

pub fn is_supported_column_count(circle_size: f32) -> bool {
    (circle_size - TARGET_COLUMNS).abs() <= COLUMN_TOLERANCE
}

/// A chart set ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledBundle {
    pub chart_set: OutputChartSet,
    pub difficulties: Vec<OutputDifficulty>,
    /// Ids of difficulties rejected by the column filter.
    pub skipped: Vec<i32>,
}

/// Pair the descriptor with every difficulty that passes the column filter.
///
/// `notes_for` is only called for included difficulties.
pub fn assemble<F>(
    chart_set: OutputChartSet,
    difficulties: &[&DifficultyRecord],
    mut notes_for: F,
) -> Result<AssembledBundle>
where
    F: FnMut(&DifficultyRecord) -> Result<Vec<OutputNote>>,
{
    let mut included = Vec::new();
    let mut skipped = Vec::new();

    for record in difficulties {
        if !is_supported_column_count(record.circle_size) {
            log::warn!(
                "Beatmap {} has circle size {}, skipping.",
                record.beatmap_id,
                record.circle_size
            );
            skipped.push(record.beatmap_id);
            continue;
        }

        let notes = notes_for(record)?;
        log::debug!("Beatmap {}: {} notes", record.beatmap_id, notes.len());

        included.push(OutputDifficulty {
            id: record.beatmap_id,
            chart_set_id: chart_set.id,
            creator: record.creator.clone(),
            difficulty_name: record.difficulty.clone(),
            difficulty_rating: record.no_mod_rating().unwrap_or(0.0),
            background_path: chart_set.background_path.clone(),
            notes,
        });
    }

    Ok(AssembledBundle {
        chart_set,
        difficulties: included,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::tests::chart_set;
    use crate::bundle::{NoteLane, NoteType};
    use crate::source::tests::record;
    use crate::source::Ruleset;

    fn one_note(record: &DifficultyRecord) -> Result<Vec<OutputNote>> {
        Ok(vec![OutputNote {
            lane: NoteLane::Lane1,
            start_time: record.beatmap_id,
            end_time: record.beatmap_id,
            kind: NoteType::BasicNote,
        }])
    }

    #[test]
    fn test_column_filter_bounds() {
        assert!(is_supported_column_count(4.0));
        assert!(is_supported_column_count(4.05));
        assert!(is_supported_column_count(4.1));
        assert!(is_supported_column_count(3.9));
        assert!(!is_supported_column_count(4.2));
        assert!(!is_supported_column_count(7.0));
    }

    #[test]
    fn test_assemble_filters_and_links() {
        let a = record(1, 42, Ruleset::Mania, 4.05);
        let b = record(2, 42, Ruleset::Mania, 4.2);
        let mut c = record(3, 42, Ruleset::Mania, 4.1);
        c.star_ratings.clear();

        let mut mapped = Vec::new();
        let bundle = assemble(chart_set(), &[&a, &b, &c], |r| {
            mapped.push(r.beatmap_id);
            one_note(r)
        })
        .unwrap();

        assert_eq!(mapped, vec![1, 3]);
        assert_eq!(bundle.skipped, vec![2]);
        let ids: Vec<i32> = bundle.difficulties.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![1, 3]);

        let first = &bundle.difficulties[0];
        assert_eq!(first.chart_set_id, 42);
        assert_eq!(first.difficulty_rating, 3.5);
        assert_eq!(first.background_path, "bg.jpg");
        assert_eq!(first.difficulty_name, "Diff 1");
        assert_eq!(bundle.difficulties[1].difficulty_rating, 0.0);
    }

    #[test]
    fn test_assemble_can_be_empty() {
        let wide = record(1, 42, Ruleset::Mania, 7.0);
        let bundle = assemble(chart_set(), &[&wide], one_note).unwrap();
        assert!(bundle.difficulties.is_empty());
        assert_eq!(bundle.chart_set.id, 42);
    }
}

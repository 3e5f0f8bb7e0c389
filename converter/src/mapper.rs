use crate::bundle::{NoteLane, NoteType, OutputNote};
use crate::error::Result;
use crate::osu_file::RawPlayableObject;
use crate::source::DifficultyRecord;

/// Column count of a mania difficulty, taken from its circle size.
pub fn column_count(record: &DifficultyRecord) -> u8 {
    record.circle_size.round().clamp(0.0, u8::MAX as f32) as u8
}

/// Convert decoded hit objects into Renako notes, keeping source order.
///
/// Hold notes collapse to basic notes at their start time. Objects without a
/// mania column are dropped.
pub fn map_objects(record: &DifficultyRecord, objects: &[RawPlayableObject]) -> Result<Vec<OutputNote>> {
    let columns = column_count(record);
    let mut notes = Vec::with_capacity(objects.len());

    for object in objects {
        let Some(column) = object.column(columns) else {
            continue;
        };
        let lane = NoteLane::try_from(column)?;
        let start_time = object.start_time();

        // TODO: emit NoteType::HoldNote with the real end time once Renako plays holds
        notes.push(OutputNote {
            lane,
            start_time,
            end_time: start_time,
            kind: NoteType::BasicNote,
        });
    }

    Ok(notes)
}

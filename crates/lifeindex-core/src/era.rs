use crate::records::EraRecord;

/// The era in force at `age`: greatest `start_age <= age`.
///
/// Input order does not matter except on a `start_age` tie, where the record
/// appearing later in `eras` wins.
pub fn locate_era(age: u32, eras: &[EraRecord]) -> Option<&EraRecord> {
    let mut current: Option<&EraRecord> = None;
    for era in eras.iter().filter(|e| e.start_age <= age) {
        if current.is_none_or(|c| era.start_age >= c.start_age) {
            current = Some(era);
        }
    }
    current
}

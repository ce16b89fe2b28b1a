use std::cmp::Ordering;

use accesslens_types::{LogRow, SortDirection, SortField, SortSpec};

use crate::parser::coerce_int;

/// Order rows in place. The sort is stable, so rows with equal keys keep
/// their input order in either direction.
pub fn sort_rows(rows: &mut [LogRow], spec: SortSpec) {
    rows.sort_by(|a, b| {
        let ord = compare(a, b, spec.field);
        match spec.direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });
}

/// Ascending comparison on a single field
pub fn compare(a: &LogRow, b: &LogRow, field: SortField) -> Ordering {
    match field {
        SortField::Ip => a.ip.as_bytes().cmp(b.ip.as_bytes()),
        SortField::Status => a.status.cmp(&b.status),
        SortField::Bytes => coerce_int(&a.bytes).cmp(&coerce_int(&b.bytes)),
        SortField::File => a.file.cmp(&b.file),
        SortField::Time => a.epoch.unwrap_or(0).cmp(&b.epoch.unwrap_or(0)),
    }
}

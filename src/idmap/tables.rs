//! Rewrite constants that name rows of a flat definition table.

use super::{IdChange, IdMapping, IdUpdateReport, Lookup};
use crate::matching::RecordCost;
use crate::model::{ConstantsFile, Record};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Remap every constant whose value is an id in `old` to the id of its
/// counterpart in `new`.
///
/// Constants whose record disappeared get `lost_id`. Values that name no
/// old record are left alone and listed as unknown.
pub fn remap_record_ids(
    file: &mut ConstantsFile,
    old: &[Record],
    new: &[Record],
    cost: &RecordCost,
    lost_id: i64,
) -> IdUpdateReport {
    let mapping = IdMapping::build(old, new, cost);
    debug!(
        old = old.len(),
        new = new.len(),
        matched = mapping.alignment().matched_count(),
        "aligned record table"
    );

    let by_id: HashMap<i64, usize> = old.iter().enumerate().map(|(i, r)| (r.id, i)).collect();
    let mut report = IdUpdateReport::default();

    for constant in file.constants_mut() {
        let value = constant.value();
        let Some(&index) = by_id.get(&value) else {
            report.unknown.push(constant.name().to_string());
            continue;
        };
        match mapping.lookup(index) {
            Lookup::Mapped(n) => {
                let id = new[n].id;
                if id == value {
                    report.unchanged.push(constant.name().to_string());
                } else {
                    constant.set_value(id);
                    report.changed.push(IdChange {
                        name: constant.name().to_string(),
                        old: value,
                        new: Some(id),
                    });
                }
            }
            Lookup::Lost => {
                warn!(name = constant.name(), id = value, "lost id");
                constant.set_value(lost_id);
                report.lost.push(IdChange {
                    name: constant.name().to_string(),
                    old: value,
                    new: None,
                });
            }
        }
    }
    report
}

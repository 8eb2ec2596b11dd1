//! Rewrite constants holding packed widget ids.

use super::{IdChange, IdMapping, IdUpdateReport, Lookup};
use crate::matching::WidgetCost;
use crate::model::{pack_id, unpack_id, ConstantsFile, WidgetNode};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// Child mapping of one widget group.
#[derive(Debug, Clone)]
pub struct WidgetGroupMapping {
    group: i64,
    mapping: IdMapping,
}

impl WidgetGroupMapping {
    pub fn build(group: i64, old: &[WidgetNode], new: &[WidgetNode]) -> Self {
        let mapping = IdMapping::build(old, new, &WidgetCost);
        debug!(
            group,
            old = old.len(),
            new = new.len(),
            cost = mapping.alignment().cost(),
            "aligned widget group"
        );
        Self { group, mapping }
    }

    pub fn group(&self) -> i64 {
        self.group
    }

    pub fn lookup(&self, child: i64) -> Option<Lookup> {
        let index = usize::try_from(child).ok()?;
        (index < self.mapping.old_len()).then(|| self.mapping.lookup(index))
    }
}

/// Groups named by the file's constants, skipping negative sentinels.
pub fn referenced_groups(file: &ConstantsFile) -> BTreeSet<i64> {
    file.constants()
        .filter(|c| c.value() >= 0)
        .map(|c| unpack_id(c.value()).0)
        .collect()
}

/// Rewrite packed ids through the per-group mappings.
///
/// A constant whose group has no mapping, or whose child is outside the
/// old group, is left alone and listed as unknown.
pub fn remap_widget_ids(
    file: &mut ConstantsFile,
    mappings: &BTreeMap<i64, WidgetGroupMapping>,
    lost_id: i64,
) -> IdUpdateReport {
    let mut report = IdUpdateReport::default();

    for constant in file.constants_mut() {
        let value = constant.value();
        if value < 0 {
            report.unknown.push(constant.name().to_string());
            continue;
        }
        let (group, child) = unpack_id(value);
        let Some(lookup) = mappings.get(&group).and_then(|m| m.lookup(child)) else {
            report.unknown.push(constant.name().to_string());
            continue;
        };
        match lookup {
            Lookup::Mapped(n) => {
                let packed = pack_id(group, n as i64);
                if packed == value {
                    report.unchanged.push(constant.name().to_string());
                } else {
                    constant.set_value(packed);
                    report.changed.push(IdChange {
                        name: constant.name().to_string(),
                        old: value,
                        new: Some(packed),
                    });
                }
            }
            Lookup::Lost => {
                warn!(name = constant.name(), group, child, "lost widget");
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

use crate::scanner::{Pair, TAG_EXTENSION};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Prefix for staging names used by the two-phase rename.
const STAGING_PREFIX: &str = "tagprep_tmp_";

/// One pair mapped to its target index and file names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedRename {
    pub index: usize,
    pub pair: Pair,
    pub image_target: PathBuf,
    pub tag_target: PathBuf,
}

/// A dense, collision-free numeric naming for a set of pairs. Indices run
/// `start_index..start_index + N` with no gaps or duplicates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenamePlan {
    pub entries: Vec<PlannedRename>,
}

/// One completed rename, original name to final name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenamedFile {
    pub from: PathBuf,
    pub to: PathBuf,
}

/// Outcome of applying a plan. Per-pair I/O failures are recorded in
/// `errors` and the batch continues; an unresolvable collision sets
/// `conflict` and stops the stage, leaving earlier renames applied and
/// later pairs untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenameReport {
    pub renamed: Vec<RenamedFile>,
    pub errors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflict: Option<PathBuf>,
}

impl RenameReport {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty() && self.conflict.is_none()
    }
}

/// Sort key for assigning indices. All-numeric base names order by value so
/// that an already-renumbered dataset maps onto itself (rerun idempotence);
/// everything else orders lexicographically, case-insensitive, with the raw
/// name as tie-breaker for determinism.
fn compare_base_names(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a
            .to_lowercase()
            .cmp(&b.to_lowercase())
            .then_with(|| a.cmp(b)),
    }
}

/// Assign dense target indices to `pairs` under the deterministic sort
/// order. Pure; nothing touches the filesystem until the plan is applied.
pub fn plan_renames(pairs: &[Pair], dir: &Path, start_index: usize) -> RenamePlan {
    let mut sorted: Vec<Pair> = pairs.to_vec();
    sorted.sort_by(|a, b| compare_base_names(&a.base_name, &b.base_name));

    let entries = sorted
        .into_iter()
        .enumerate()
        .map(|(i, pair)| {
            let index = start_index + i;
            let image_target = dir.join(format!("{}.{}", index, pair.image.extension));
            let tag_target = dir.join(format!("{}.{}", index, TAG_EXTENSION));
            PlannedRename {
                index,
                pair,
                image_target,
                tag_target,
            }
        })
        .collect();

    RenamePlan { entries }
}

/// A single pair's pending move: both members travel together.
struct PairMove {
    image: RenamedFile,
    tag: RenamedFile,
}

/// A staged pair waiting for phase two, with the original names kept for
/// reporting.
struct StagedMove {
    step: PairMove,
    original_image: PathBuf,
    original_tag: PathBuf,
}

impl PairMove {
    /// Rename both members as one logical step. If the tag half fails after
    /// the image half succeeded, the image half is renamed back before the
    /// error is returned.
    fn perform(&self) -> Result<(), String> {
        let image_moved = if self.image.from == self.image.to {
            false
        } else {
            fs::rename(&self.image.from, &self.image.to).map_err(|e| {
                format!(
                    "failed to rename {} -> {}: {}",
                    self.image.from.display(),
                    self.image.to.display(),
                    e
                )
            })?;
            true
        };

        if self.tag.from != self.tag.to {
            if let Err(e) = fs::rename(&self.tag.from, &self.tag.to) {
                let mut message = format!(
                    "failed to rename {} -> {}: {}",
                    self.tag.from.display(),
                    self.tag.to.display(),
                    e
                );
                if image_moved {
                    // Roll the image half back so the pair is never split
                    // across old and new naming.
                    if let Err(rollback) = fs::rename(&self.image.to, &self.image.from) {
                        message.push_str(&format!(
                            "; rollback of {} failed: {}",
                            self.image.to.display(),
                            rollback
                        ));
                    }
                }
                return Err(message);
            }
        }

        Ok(())
    }
}

/// Apply a plan with two-phase collision handling.
///
/// Phase one renames each pair straight to its final names when they are
/// free, and stages a pair through temporary names when a final name is
/// still occupied by a later member of the batch. Phase two moves staged
/// pairs from their temporary names to the final ones. A target occupied by
/// a file outside the batch is an unresolvable conflict.
pub fn apply_plan(plan: &RenamePlan) -> RenameReport {
    let mut report = RenameReport::default();

    // Paths still waiting to be renamed away; a target occupied by one of
    // these will free up before phase two.
    let mut pending: HashSet<PathBuf> = plan
        .entries
        .iter()
        .flat_map(|e| [e.pair.image.path.clone(), e.pair.tag.path.clone()])
        .collect();

    let mut staged: Vec<StagedMove> = Vec::new();

    for entry in &plan.entries {
        let image_from = &entry.pair.image.path;
        let tag_from = &entry.pair.tag.path;

        if image_from == &entry.image_target && tag_from == &entry.tag_target {
            // Already carries its target names; rerun no-op.
            pending.remove(image_from);
            pending.remove(tag_from);
            continue;
        }

        let mut needs_staging = false;
        let mut conflict = None;
        for (from, target) in [(image_from, &entry.image_target), (tag_from, &entry.tag_target)] {
            if from == target || !target.exists() {
                continue;
            }
            if pending.contains(target) {
                needs_staging = true;
            } else {
                conflict = Some(target.clone());
            }
        }

        if let Some(target) = conflict {
            report.conflict = Some(target);
            return report;
        }

        let outcome = if needs_staging {
            let image_temp = staging_name(&entry.image_target, entry.index, &entry.pair.image.extension);
            let tag_temp = staging_name(&entry.tag_target, entry.index, TAG_EXTENSION);
            // A foreign file squatting on a staging name cannot be worked
            // around either.
            for temp in [&image_temp, &tag_temp] {
                if temp.exists() {
                    report.conflict = Some(temp.clone());
                    return report;
                }
            }
            let step = PairMove {
                image: RenamedFile {
                    from: image_from.clone(),
                    to: image_temp.clone(),
                },
                tag: RenamedFile {
                    from: tag_from.clone(),
                    to: tag_temp.clone(),
                },
            };
            step.perform().map(|()| {
                staged.push(StagedMove {
                    step: PairMove {
                        image: RenamedFile {
                            from: image_temp,
                            to: entry.image_target.clone(),
                        },
                        tag: RenamedFile {
                            from: tag_temp,
                            to: entry.tag_target.clone(),
                        },
                    },
                    original_image: image_from.clone(),
                    original_tag: tag_from.clone(),
                });
            })
        } else {
            let step = PairMove {
                image: RenamedFile {
                    from: image_from.clone(),
                    to: entry.image_target.clone(),
                },
                tag: RenamedFile {
                    from: tag_from.clone(),
                    to: entry.tag_target.clone(),
                },
            };
            step.perform().map(|()| {
                report.renamed.push(RenamedFile {
                    from: image_from.clone(),
                    to: entry.image_target.clone(),
                });
                report.renamed.push(RenamedFile {
                    from: tag_from.clone(),
                    to: entry.tag_target.clone(),
                });
            })
        };

        match outcome {
            Ok(()) => {
                pending.remove(image_from);
                pending.remove(tag_from);
            },
            Err(e) => report.errors.push(e),
        }
    }

    // Phase two: staged pairs move from temporary to final names. The
    // occupants of those names were batch members and have been renamed
    // away in phase one.
    for staged_move in staged {
        let step = &staged_move.step;
        for target in [&step.image.to, &step.tag.to] {
            if target.exists() {
                report.conflict = Some(target.clone());
                return report;
            }
        }
        match step.perform() {
            Ok(()) => {
                // Report original -> final, not the staging hop.
                report.renamed.push(RenamedFile {
                    from: staged_move.original_image.clone(),
                    to: step.image.to.clone(),
                });
                report.renamed.push(RenamedFile {
                    from: staged_move.original_tag.clone(),
                    to: step.tag.to.clone(),
                });
            },
            Err(e) => report.errors.push(e),
        }
    }

    report
}

fn staging_name(target: &Path, index: usize, extension: &str) -> PathBuf {
    let parent = target.parent().unwrap_or_else(|| Path::new("."));
    parent.join(format!("{}{}.{}", STAGING_PREFIX, index, extension))
}

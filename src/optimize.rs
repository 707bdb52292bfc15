//! Write batching.
//!
//! Merges runs of consecutive constant writes into a single write. Runs after
//! the module is fully assembled since it depends on final adjacency.

use log::debug;

use crate::output::{OutputModule, RenderOp};

/// Batch the writes of the module's render function, if it has one.
pub fn optimize_module_writes(module: &mut OutputModule) {
    if let Some(body) = module.render_body_mut() {
        let before = count_writes(body);
        optimize_writes(body);
        debug!(
            "[Translator] Batched {} write(s) into {}",
            before,
            count_writes(body)
        );
    }
}

/// Merge every maximal run of two or more adjacent writes, recursing into blocks.
pub fn optimize_writes(ops: &mut Vec<RenderOp>) {
    let mut merged: Vec<RenderOp> = Vec::with_capacity(ops.len());

    for mut op in ops.drain(..) {
        if let RenderOp::Block { body, .. } = &mut op {
            optimize_writes(body);
        }

        if let RenderOp::Write(text) = &op {
            if let Some(RenderOp::Write(batch)) = merged.last_mut() {
                batch.push_str(text);
                continue;
            }
        }
        merged.push(op);
    }

    *ops = merged;
}

fn count_writes(ops: &[RenderOp]) -> usize {
    ops.iter()
        .map(|op| match op {
            RenderOp::Write(_) => 1,
            RenderOp::Block { body, .. } => count_writes(body),
            RenderOp::Code(_) => 0,
        })
        .sum()
}

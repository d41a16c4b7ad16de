//! Positional comment reattachment.
//!
//! The parser keeps comments outside the tree, keyed by byte position: leading
//! comments by the start of the token that follows them, trailing comments by
//! the end of the token before them. The printer only emits a comment when it
//! reaches a node boundary with that exact position, so a comment keyed to a
//! position that no longer starts or ends a node would be dropped silently.
//!
//! [`reattach`] moves every such comment to the closest surviving boundary.
//! This is a positional heuristic: a comment that sat at the edge of content
//! that was restructured can end up next to a neighbouring node instead.
//! Anchoring comments to stable node identities assigned at parse time would
//! survive restructuring; swc spans are positions, not identities.

use std::collections::BTreeSet;

use swc_core::{
    common::{
        comments::{Comment, Comments, SingleThreadedComments},
        BytePos, Span,
    },
    ecma::{
        ast::{Module, Program, Script},
        visit::{Visit, VisitWith},
    },
};
use tracing::debug;

/// Re-anchors comments whose position is not a boundary of any node in
/// `program`. Returns the number of comment groups moved.
pub fn reattach(program: &Program, comments: &SingleThreadedComments) -> usize {
    let anchors = Anchors::collect(program);

    let (mut leading_keys, mut trailing_keys) = {
        let (leading, trailing) = comments.borrow_all();
        (
            leading.keys().copied().collect::<Vec<_>>(),
            trailing.keys().copied().collect::<Vec<_>>(),
        )
    };
    leading_keys.sort();
    trailing_keys.sort();

    let mut moved = 0;

    // Descending, so groups prepended onto the same start keep source order.
    for pos in leading_keys.into_iter().rev() {
        if anchors.starts.contains(&pos) {
            continue;
        }
        let Some(group) = comments.take_leading(pos) else {
            continue;
        };
        if let Some(&next) = anchors.starts.range(pos..).next() {
            prepend_leading(comments, next, group);
        } else if let Some(&prev) = anchors.ends.range(..=pos).next_back() {
            comments.add_trailing_comments(prev, group);
        } else {
            comments.add_leading_comments(pos, group);
            continue;
        }
        moved += 1;
    }

    for pos in trailing_keys {
        if anchors.ends.contains(&pos) {
            continue;
        }
        let Some(group) = comments.take_trailing(pos) else {
            continue;
        };
        if let Some(&prev) = anchors.ends.range(..=pos).next_back() {
            comments.add_trailing_comments(prev, group);
        } else if let Some(&next) = anchors.starts.range(pos..).next() {
            prepend_leading(comments, next, group);
        } else {
            comments.add_trailing_comments(pos, group);
            continue;
        }
        moved += 1;
    }

    debug!(moved, "reattached comments");
    moved
}

fn prepend_leading(comments: &SingleThreadedComments, pos: BytePos, mut group: Vec<Comment>) {
    if let Some(existing) = comments.take_leading(pos) {
        group.extend(existing);
    }
    comments.add_leading_comments(pos, group);
}

/// Node boundaries the printer can hang comments on.
#[derive(Default)]
struct Anchors {
    /// Node starts, plus the position of each node's closing token.
    starts: BTreeSet<BytePos>,
    ends: BTreeSet<BytePos>,
}

impl Anchors {
    fn collect(program: &Program) -> Self {
        let mut anchors = Anchors::default();
        program.visit_with(&mut anchors);
        anchors
    }
}

impl Visit for Anchors {
    // The module span covers the whole file; its edges are not anchors.
    fn visit_module(&mut self, n: &Module) {
        n.body.visit_with(self);
    }

    fn visit_script(&mut self, n: &Script) {
        n.body.visit_with(self);
    }

    fn visit_span(&mut self, n: &Span) {
        if n.is_dummy() {
            return;
        }
        self.starts.insert(n.lo);
        if n.hi > n.lo {
            self.starts.insert(n.hi - BytePos(1));
        }
        self.ends.insert(n.hi);
    }
}

use swc_core::{
    common::{
        comments::{CommentKind, SingleThreadedComments},
        sync::Lrc,
        BytePos, SourceMap, Span,
    },
    ecma::{
        ast::{EsVersion, Program},
        codegen::{text_writer::JsWriter, Config, Emitter},
    },
};

use crate::error::{Error, Result};

/// Renders `program` back to source, emitting comments at their anchors.
pub fn emit(
    program: &Program,
    comments: &SingleThreadedComments,
    cm: Lrc<SourceMap>,
) -> Result<String> {
    let own_line = own_line_blocks(comments, &cm);

    let mut buf = vec![];
    {
        let mut emitter = Emitter {
            cfg: Config::default().with_target(EsVersion::EsNext),
            cm: cm.clone(),
            comments: Some(comments),
            wr: JsWriter::new(cm, "\n", &mut buf, None),
        };
        emitter
            .emit_program(program)
            .map_err(|e| Error::Emit(e.to_string()))?;
    }
    let text = String::from_utf8(buf).map_err(|e| Error::Emit(e.to_string()))?;
    Ok(break_after_blocks(text, &own_line))
}

/// Leading block comments that were followed by a line break in the source,
/// rendered as `/*...*/`, in source order.
fn own_line_blocks(comments: &SingleThreadedComments, cm: &SourceMap) -> Vec<String> {
    let (leading, _) = comments.borrow_all();
    let mut blocks: Vec<(BytePos, String)> = leading
        .iter()
        .flat_map(|(&anchor, group)| group.iter().map(move |c| (anchor, c)))
        .filter(|(anchor, c)| {
            if c.kind != CommentKind::Block || c.span.hi > *anchor {
                return false;
            }
            let gap = Span::new(c.span.hi, *anchor);
            cm.with_snippet_of_span(gap, |text| text.contains('\n'))
                .unwrap_or(false)
        })
        .map(|(_, c)| (c.span.lo, format!("/*{}*/", c.text)))
        .collect();
    blocks.sort_by_key(|(lo, _)| *lo);
    blocks.into_iter().map(|(_, text)| text).collect()
}

/// The writer always follows a block comment with a space. Where the comment
/// opens its line, that space becomes a line break at the same indentation.
fn break_after_blocks(mut text: String, blocks: &[String]) -> String {
    let mut cursor = 0;
    for block in blocks {
        let needle = format!("{block} ");
        let Some(found) = text[cursor..].find(&needle) else {
            continue;
        };
        let at = cursor + found;
        let line_start = text[..at].rfind('\n').map_or(0, |i| i + 1);
        let indent = text[line_start..at].to_string();
        let space = at + block.len();
        if indent.chars().all(|c| c == ' ' || c == '\t') {
            text.replace_range(space..space + 1, &format!("\n{indent}"));
            cursor = space + 1 + indent.len();
        } else {
            cursor = space + 1;
        }
    }
    text
}

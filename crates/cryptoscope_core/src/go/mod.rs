//! Go front-end: tree-sitter parsing and lowering into [`Tree`].
//!
//! The concrete syntax tree produced by `tree-sitter-go` is lowered into the
//! engine's closed node set. Lowering also resolves names: import aliases are
//! mapped to package paths, local variables are bound to symbols using
//! lexical block scoping, and every declaration, assignment, parameter and
//! read of a variable is recorded as a usage in source order.
//!
//! Source with syntax errors still lowers. Tree-sitter recovers around the
//! broken region and [`Tree::has_errors`] reports that recovery happened.

mod lower;

use std::cell::RefCell;

use tree_sitter::Parser;
#[cfg(feature = "tracing")]
use tracing::warn;

use crate::error::ParseError;
use crate::tree::Tree;

// `tree_sitter::Parser` is not `Send`, so each worker thread keeps its own.
thread_local! {
    static PARSER: RefCell<Option<Parser>> = const { RefCell::new(None) };
}

/// Parses Go source and lowers it into a [`Tree`].
///
/// Fails only when the grammar cannot be loaded or the parser yields no
/// tree at all. Syntax errors are tolerated.
pub fn parse(source: &str) -> Result<Tree, ParseError> {
    let parsed = PARSER.with(|cell| {
        let mut slot = cell.borrow_mut();
        if slot.is_none() {
            *slot = Some(new_parser()?);
        }
        Ok::<_, ParseError>(slot.as_mut().and_then(|parser| parser.parse(source, None)))
    })?;

    let Some(parsed) = parsed else {
        return Err(ParseError::Cancelled);
    };

    let tree = lower::lower(&parsed, source);

    #[cfg(feature = "tracing")]
    if tree.has_errors() {
        warn!(nodes = tree.len(), "source contains syntax errors; scanning the recovered tree");
    }

    Ok(tree)
}

fn new_parser() -> Result<Parser, ParseError> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_go::LANGUAGE.into())
        .map_err(|err| ParseError::Language(err.to_string()))?;
    Ok(parser)
}

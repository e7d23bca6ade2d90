//! Finds `uniform <type> <name> < annotations > = <default>;` blocks in shader
//! text and turns them into `UniformDecl`s. The matching is a small hand-written
//! scanner so callers only depend on the text-in, declarations-out contract of
//! `extract_schema`.
//!
//! Types:
//!
//! - `Cursor` walks a borrowed source by byte offset. Every delimiter the
//!   scanner cares about is ASCII, so slicing at cursor positions never splits a
//!   UTF-8 sequence.
//!
//! Functions:
//!
//! - `extract_schema` collects `#define` constants, scans every `uniform`
//!   keyword, and keeps declarations in source order (a repeated name replaces
//!   the earlier declaration).
//! - `parse_uniform_block` matches a single block starting right after the
//!   keyword; a block that does not match is skipped without partial recovery.
use tracing::debug;

use crate::annotations::{parse_annotations, resolve_range_bounds};
use crate::defines::{collect_defines, Defines};
use crate::{UniformDecl, UniformKind};

const UNIFORM_KEYWORD: &str = "uniform";

pub fn extract_schema(source: &str) -> Vec<UniformDecl> {
    let defines = collect_defines(source);
    let mut decls: Vec<UniformDecl> = Vec::new();
    let mut search_from = 0;

    while let Some(start) = find_keyword(source, search_from, UNIFORM_KEYWORD) {
        let after_keyword = start + UNIFORM_KEYWORD.len();
        let mut cursor = Cursor::at(source, after_keyword);
        match parse_uniform_block(&mut cursor, &defines) {
            Some(decl) => {
                if decls.iter().any(|existing| existing.name == decl.name) {
                    debug!(name = %decl.name, "uniform declared twice; keeping the last declaration");
                    decls.retain(|existing| existing.name != decl.name);
                }
                decls.push(decl);
                search_from = cursor.pos;
            }
            None => search_from = after_keyword,
        }
    }

    decls
}

fn parse_uniform_block(cursor: &mut Cursor<'_>, defines: &Defines) -> Option<UniformDecl> {
    if cursor.skip_whitespace() == 0 {
        return None;
    }
    let type_token = cursor.word()?;
    if cursor.skip_whitespace() == 0 {
        return None;
    }
    let name = cursor.word()?;
    cursor.skip_whitespace();
    if !cursor.eat(b'<') {
        return None;
    }
    let annotations = cursor.take_until(b'>')?;
    cursor.eat(b'>');
    cursor.skip_whitespace();
    if !cursor.eat(b'=') {
        return None;
    }
    let default = cursor.take_until(b';')?;
    if default.is_empty() {
        return None;
    }
    cursor.eat(b';');

    let mut metadata = parse_annotations(annotations);
    resolve_range_bounds(&mut metadata, defines);

    Some(UniformDecl {
        kind: UniformKind::from_token(type_token),
        name: name.to_string(),
        metadata,
        default: default.trim().to_string(),
    })
}

/// Offset of the next `keyword` at or after `from` that starts a word.
pub(crate) fn find_keyword(source: &str, from: usize, keyword: &str) -> Option<usize> {
    let mut offset = from;
    while let Some(found) = source.get(offset..)?.find(keyword) {
        let start = offset + found;
        let boundary = start == 0 || !is_word_byte(source.as_bytes()[start - 1]);
        if boundary {
            return Some(start);
        }
        offset = start + keyword.len();
    }
    None
}

pub(crate) fn is_word_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

pub(crate) struct Cursor<'a> {
    src: &'a str,
    pub(crate) pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn at(src: &'a str, pos: usize) -> Self {
        Self { src, pos }
    }

    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    pub(crate) fn is_done(&self) -> bool {
        self.pos >= self.src.len()
    }

    /// Skips any whitespace, newlines included, and returns how much was skipped.
    pub(crate) fn skip_whitespace(&mut self) -> usize {
        self.skip_while(|byte| byte.is_ascii_whitespace())
    }

    fn skip_while(&mut self, pred: impl Fn(u8) -> bool) -> usize {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.pos += 1;
        }
        self.pos - start
    }

    pub(crate) fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub(crate) fn word(&mut self) -> Option<&'a str> {
        self.take_while(is_word_byte)
    }

    /// Takes a non-empty run of bytes matching `pred`.
    pub(crate) fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> Option<&'a str> {
        let src = self.src;
        let start = self.pos;
        self.skip_while(pred);
        (self.pos > start).then(|| &src[start..self.pos])
    }

    /// Takes everything up to (not including) `delim`; `None` when `delim` never appears.
    pub(crate) fn take_until(&mut self, delim: u8) -> Option<&'a str> {
        let src = self.src;
        let start = self.pos;
        let len = src.as_bytes()[start..]
            .iter()
            .position(|&byte| byte == delim)?;
        self.pos += len;
        Some(&src[start..self.pos])
    }

    pub(crate) fn advance(&mut self) {
        if let Some(ch) = self.src[self.pos..].chars().next() {
            self.pos += ch.len_utf8();
        }
    }
}

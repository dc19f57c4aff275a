//! Lexer for command templates.
//!
//! The grammar is fixed: `$file{PATH}`, `$folder{PATH}`, `$N` with `N >= 1`, `$timeout` and `$seed`.
//! Any other `$` is kept as text so that shell variables survive expansion untouched.

use logos::{Lexer, Logos};
use thiserror::Error;

use crate::error::PlanError;

const FILE_OPEN: &str = "$file{";
const FOLDER_OPEN: &str = "$folder{";

#[derive(Error, Default, Debug, Clone, PartialEq, Eq)]
pub enum LexingError {
	#[error("missing closing brace")]
	Unterminated,
	#[error("empty path")]
	EmptyPath,
	#[error("position out of range")]
	Overflow,
	#[default]
	#[error("unrecognized input")]
	Other,
}

fn braced<'a>(lex: &mut Lexer<'a, Segment<'a>>, open: &str) -> Result<&'a str, LexingError> {
	let body = lex.slice()[open.len()..]
		.strip_suffix('}')
		.ok_or(LexingError::Unterminated)?;
	let path = body.trim();
	if path.is_empty() {
		return Err(LexingError::EmptyPath);
	}
	Ok(path)
}

fn position<'a>(lex: &mut Lexer<'a, Segment<'a>>) -> Result<usize, LexingError> {
	lex.slice()[1..].parse().map_err(|_| LexingError::Overflow)
}

// The closing brace is optional so that an unterminated placeholder still lexes as one
// token and reports where it starts. Prefixes of the keywords lex as text, which keeps
// every partial match accepting.
#[derive(Logos, Debug, PartialEq, Eq, Clone, Copy)]
#[logos(error = LexingError)]
pub enum Segment<'a> {
	#[regex(r"[^$]+", |lex| lex.slice())]
	#[regex(r"\$(t(i(m(e(o(u)?)?)?)?)?|s(e(e)?)?|f(i(l(e)?)?|o(l(d(e(r)?)?)?)?)?)?", |lex| lex.slice())]
	Text(&'a str),
	#[regex(r"\$file\{[^}]*\}?", |lex| braced(lex, FILE_OPEN))]
	File(&'a str),
	#[regex(r"\$folder\{[^}]*\}?", |lex| braced(lex, FOLDER_OPEN))]
	Folder(&'a str),
	#[regex(r"\$[1-9][0-9]*", position)]
	Positional(usize),
	#[token("$timeout")]
	Timeout,
	#[token("$seed")]
	Seed,
}

pub fn parse(template: &str) -> Result<Vec<Segment<'_>>, PlanError> {
	let mut lexer = Segment::lexer(template);
	let mut segments = Vec::new();
	while let Some(token) = lexer.next() {
		let segment = token.map_err(|error| {
			tracing::debug!(%error, offset = lexer.span().start, "malformed placeholder");
			PlanError::MalformedPlaceholder {
				placeholder: lexer.slice().to_string(),
				offset: lexer.span().start,
				template: template.to_string(),
			}
		})?;
		segments.push(segment);
	}
	Ok(segments)
}

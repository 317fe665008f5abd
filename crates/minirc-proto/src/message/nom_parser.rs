//! Nom-based IRC message parser.
//!
//! Zero-copy parsing of the line grammar
//! `[":" prefix SPACE] command SPACE params`, where `params` is zero or
//! more space-separated tokens with an optional trailing parameter
//! introduced by ` :`.

use nom::{
    bytes::complete::take_while1,
    character::complete::{char, space0},
    combinator::opt,
    sequence::preceded,
    IResult,
};

/// Parse the message prefix (the part after `:` and before the first space).
fn parse_prefix(input: &str) -> IResult<&str, &str> {
    preceded(char(':'), take_while1(|c| c != ' '))(input)
}

/// Parse the command name: an alphabetic verb or a three-digit numeric.
fn parse_command(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric())(input)
}

/// Parse parameters from the remaining input after the command.
///
/// Regular parameters are space-separated; a parameter starting with `:`
/// is the trailing parameter and swallows the rest of the line. Runs of
/// spaces are treated as a single separator.
fn parse_params(input: &str) -> Vec<&str> {
    let mut params: Vec<&str> = Vec::new();
    let mut rest = input;

    while rest.as_bytes().first() == Some(&b' ') {
        while rest.as_bytes().first() == Some(&b' ') {
            rest = &rest[1..];
        }

        if rest.is_empty() || rest.starts_with('\r') || rest.starts_with('\n') {
            break;
        }

        if let Some(stripped) = rest.strip_prefix(':') {
            let end = stripped.find(['\r', '\n']).unwrap_or(stripped.len());
            params.push(&stripped[..end]);
            break;
        }

        let end = rest.find([' ', '\r', '\n']).unwrap_or(rest.len());
        params.push(&rest[..end]);
        rest = &rest[end..];
    }

    params
}

/// A parsed IRC message with borrowed string slices.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ParsedMessage<'a> {
    /// Raw prefix string (without the leading `:`), if present.
    pub prefix: Option<&'a str>,
    /// The command name, verbatim.
    pub command: &'a str,
    /// Command parameters, including the trailing one.
    pub params: Vec<&'a str>,
}

impl<'a> ParsedMessage<'a> {
    pub fn parse(input: &'a str) -> Option<ParsedMessage<'a>> {
        parse_message(input).ok().map(|(_, m)| m)
    }
}

fn parse_message(input: &str) -> IResult<&str, ParsedMessage<'_>> {
    let (input, prefix) = opt(parse_prefix)(input)?;
    let (input, _) = space0(input)?;
    let (input, command) = parse_command(input)?;
    let params = parse_params(input);

    Ok((
        "",
        ParsedMessage {
            prefix,
            command,
            params,
        },
    ))
}

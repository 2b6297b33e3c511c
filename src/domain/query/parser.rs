//! Selector parser (C2).
//!
//! ```text
//! selector   ::= step (combinator step)*
//! combinator ::= ">" | <whitespace-descendant>
//! step       ::= type_token predicate* pseudo*
//! type_token ::= "*" | NAME
//! predicate  ::= "[" NAME OP value "]"
//! OP         ::= "=" | "!=" | "~=" | "^=" | "$="
//! value      ::= QUOTED_STRING | BAREWORD
//! pseudo     ::= ":" NAME ("(" INT ")")?
//! ```
//!
//! Implemented as a PEG grammar ([`selector.pest`]) rather than hand-rolled,
//! per the design notes: the grammar is small (~20 rules) and a generator
//! gives accurate error locations for free.

use super::ast::{Combinator, Op, Predicate, Pseudo, Selector, StepGroup, TypeToken};
use crate::domain::error::Error;
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "domain/query/selector.pest"]
struct SelectorParser;

/// Parse a selector string into an AST.
///
/// Returns [`Error::QueryParse`] on any unrecognized pseudo, a missing
/// `:nth` argument, unclosed brackets/quotes, or an invalid operator.
pub fn parse(input: &str) -> Result<Selector, Error> {
    let mut pairs = SelectorParser::parse(Rule::selector, input)
        .map_err(|e| Error::query_parse(e.to_string()))?;
    let selector_pair = pairs.next().expect("selector rule always produces one pair");

    let mut steps = Vec::new();
    let mut pending_combinator = None;
    for pair in selector_pair.into_inner() {
        match pair.as_rule() {
            Rule::step => {
                let step = parse_step(pair)?;
                steps.push(StepGroup {
                    combinator: pending_combinator.take(),
                    step,
                });
            }
            Rule::combinator => {
                pending_combinator = Some(parse_combinator(pair));
            }
            Rule::EOI => {}
            other => unreachable!("unexpected top-level selector rule: {other:?}"),
        }
    }
    Ok(Selector { steps })
}

fn parse_combinator(pair: Pair<Rule>) -> Combinator {
    let inner = pair.into_inner().next().expect("combinator has one child");
    match inner.as_rule() {
        Rule::child_combinator => Combinator::Child,
        Rule::descendant_combinator => Combinator::Descendant,
        other => unreachable!("unexpected combinator rule: {other:?}"),
    }
}

fn parse_step(pair: Pair<Rule>) -> Result<super::ast::Step, Error> {
    let mut type_token = TypeToken::Any;
    let mut predicates = Vec::new();
    let mut pseudos = Vec::new();

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::type_token => {
                let text = inner.as_str();
                type_token = if text == "*" {
                    TypeToken::Any
                } else {
                    TypeToken::Named(text.to_string())
                };
            }
            Rule::predicate => predicates.push(parse_predicate(inner)?),
            Rule::pseudo => pseudos.push(parse_pseudo(inner)?),
            other => unreachable!("unexpected step rule: {other:?}"),
        }
    }

    Ok(super::ast::Step {
        type_token,
        predicates,
        pseudos,
    })
}

fn parse_predicate(pair: Pair<Rule>) -> Result<Predicate, Error> {
    let mut inner = pair.into_inner();
    let attr = inner
        .next()
        .expect("predicate has an attribute name")
        .as_str()
        .to_string();
    let op_str = inner.next().expect("predicate has an operator").as_str();
    let op = match op_str {
        "=" => Op::Eq,
        "!=" => Op::Ne,
        "~=" => Op::Contains,
        "^=" => Op::StartsWith,
        "$=" => Op::EndsWith,
        other => return Err(Error::query_parse(format!("invalid operator '{other}'"))),
    };
    let value_pair = inner.next().expect("predicate has a value");
    let value = parse_value(value_pair);
    Ok(Predicate { attr, op, value })
}

fn parse_value(pair: Pair<Rule>) -> String {
    let inner = pair
        .into_inner()
        .next()
        .expect("value has one child (quoted_string or bareword)");
    match inner.as_rule() {
        Rule::quoted_string => unescape_quoted(inner.as_str()),
        Rule::bareword => inner.as_str().to_string(),
        other => unreachable!("unexpected value rule: {other:?}"),
    }
}

fn unescape_quoted(raw: &str) -> String {
    // raw includes the surrounding quote characters.
    let inner = &raw[1..raw.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn parse_pseudo(pair: Pair<Rule>) -> Result<Pseudo, Error> {
    let mut inner = pair.into_inner();
    let name = inner.next().expect("pseudo has a name").as_str();
    let arg = inner.next().map(|p| {
        p.as_str()
            .parse::<usize>()
            .expect("int rule only matches ASCII digits")
    });

    match name {
        "first" => Ok(Pseudo::First),
        "last" => Ok(Pseudo::Last),
        "nth" => match arg {
            Some(n) => Ok(Pseudo::Nth(n)),
            None => Err(Error::query_parse(
                "':nth' requires an integer argument, e.g. ':nth(0)'".to_string(),
            )),
        },
        other => Err(Error::query_parse(format!("unrecognized pseudo ':{other}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_type_selector() {
        let selector = parse("function").unwrap();
        assert_eq!(selector.steps.len(), 1);
        assert_eq!(selector.steps[0].combinator, None);
        assert_eq!(
            selector.steps[0].step.type_token,
            TypeToken::Named("function".to_string())
        );
    }

    #[test]
    fn parses_predicate_with_quoted_value() {
        let selector = parse("function[name='тест']").unwrap();
        let predicate = &selector.steps[0].step.predicates[0];
        assert_eq!(predicate.attr, "name");
        assert_eq!(predicate.op, Op::Eq);
        assert_eq!(predicate.value, "тест");
    }

    #[test]
    fn parses_pseudo_first() {
        let selector = parse("smallstmt[type='Return']:first").unwrap();
        assert_eq!(selector.steps[0].step.pseudos, vec![Pseudo::First]);
    }

    #[test]
    fn parses_descendant_and_child_combinators() {
        let selector = parse("class method > smallstmt").unwrap();
        assert_eq!(selector.steps.len(), 3);
        assert_eq!(selector.steps[1].combinator, Some(Combinator::Descendant));
        assert_eq!(selector.steps[2].combinator, Some(Combinator::Child));
    }

    #[test]
    fn rejects_nth_without_argument() {
        let err = parse(":nth()").unwrap_err();
        assert!(matches!(err, Error::QueryParse { .. }));
    }

    #[test]
    fn rejects_unknown_pseudo() {
        let err = parse("function:bogus").unwrap_err();
        assert!(matches!(err, Error::QueryParse { .. }));
    }
}

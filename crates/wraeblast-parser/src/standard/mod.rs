//! Standard-format parser
//!
//! Parses canonical filter text into an [`ItemFilter`]. Each block's parse
//! tree is reduced straight into a [`Rule`]; nothing is patched afterwards.

use crate::error::{ParseError, Result};
use pest::iterators::Pair;
use pest::Parser;
use wraeblast_core::ast::{
    Action, ActionArg, ActionKind, Condition, ConditionKind, ConditionValue, ItemFilter, Operator,
    Rule, Visibility,
};
use wraeblast_core::types::Color;

mod grammar {
    #[derive(pest_derive::Parser)]
    #[grammar = "standard/filter.pest"]
    pub struct FilterGrammar;
}

use grammar::{FilterGrammar, Rule as Token};

/// A literal value as it appeared in filter text
#[derive(Debug, Clone, PartialEq)]
enum Literal {
    Bool(bool),
    Number(i64),
    Quoted(String),
    Word(String),
}

impl Literal {
    fn text(&self) -> String {
        match self {
            Literal::Bool(true) => "True".to_string(),
            Literal::Bool(false) => "False".to_string(),
            Literal::Number(n) => n.to_string(),
            Literal::Quoted(s) | Literal::Word(s) => s.clone(),
        }
    }

    fn is_name(&self) -> bool {
        matches!(self, Literal::Quoted(_) | Literal::Word(_))
    }
}

/// Parser for the canonical filter format
pub struct StandardParser;

impl StandardParser {
    /// Parse filter text. Any grammar or validation failure aborts the whole parse.
    pub fn parse(text: &str) -> Result<ItemFilter> {
        let mut pairs = FilterGrammar::parse(Token::filter, text)
            .map_err(|e| ParseError::Grammar(e.to_string()))?;
        let filter = pairs
            .next()
            .ok_or_else(|| ParseError::Grammar("empty parse tree".to_string()))?;

        let mut rules = Vec::new();
        for pair in filter.into_inner() {
            match pair.as_rule() {
                Token::block => rules.push(Self::parse_block(pair)?),
                Token::condition | Token::action => {
                    log::debug!(
                        "discarding statement outside of a block on line {}",
                        pair.as_span().start_pos().line_col().0
                    );
                }
                _ => {}
            }
        }

        Ok(ItemFilter::from_rules(rules))
    }

    fn parse_block(block: Pair<Token>) -> Result<Rule> {
        let mut inner = block.into_inner();
        let visibility = inner
            .next()
            .filter(|p| p.as_rule() == Token::visibility)
            .ok_or_else(|| ParseError::Grammar("block without visibility".to_string()))?;
        let visibility: Visibility = visibility.as_str().parse()?;

        let mut rule = Rule::new(visibility);
        for statement in inner {
            match statement.as_rule() {
                Token::condition => rule.add_condition(Self::parse_condition(statement)?),
                Token::action => rule.add_action(Self::parse_action(statement)?),
                _ => {}
            }
        }
        Ok(rule)
    }

    fn parse_condition(pair: Pair<Token>) -> Result<Condition> {
        let line = pair.as_span().start_pos().line_col().0;
        let mut kind = None;
        let mut op = Operator::default();
        let mut literals = Vec::new();

        for part in pair.into_inner() {
            match part.as_rule() {
                Token::condition_kind => kind = Some(part.as_str().parse::<ConditionKind>()),
                Token::operator => op = part.as_str().parse().map_err(|e| invalid(line, e))?,
                _ => literals.push(literal(part, line)?),
            }
        }

        let kind = kind
            .ok_or_else(|| ParseError::Grammar(format!("condition without keyword on line {}", line)))?
            .map_err(|e| invalid(line, e))?;
        let value = condition_value(&literals);
        Condition::new(kind, op, value).map_err(|e| invalid(line, e))
    }

    fn parse_action(pair: Pair<Token>) -> Result<Action> {
        let line = pair.as_span().start_pos().line_col().0;
        let mut parts = pair.into_inner();
        let kind: ActionKind = parts
            .next()
            .ok_or_else(|| ParseError::Grammar(format!("action without keyword on line {}", line)))?
            .as_str()
            .parse()
            .map_err(|e| invalid(line, e))?;

        let literals = parts
            .map(|part| literal(part, line))
            .collect::<Result<Vec<_>>>()?;

        let args = if kind.is_color() && is_channel_list(&literals) {
            let channels: Vec<i64> = literals
                .iter()
                .filter_map(|l| match l {
                    Literal::Number(n) => Some(*n),
                    _ => None,
                })
                .collect();
            vec![ActionArg::Color(
                Color::from_channels(&channels).map_err(|e| invalid(line, e))?,
            )]
        } else {
            literals.iter().map(action_arg).collect()
        };

        Action::new(kind, args).map_err(|e| invalid(line, e))
    }
}

fn invalid(line: usize, error: impl std::fmt::Display) -> ParseError {
    ParseError::InvalidStatement {
        line,
        message: error.to_string(),
    }
}

fn literal(pair: Pair<Token>, line: usize) -> Result<Literal> {
    let text = pair.as_str();
    match pair.as_rule() {
        Token::boolean => Ok(Literal::Bool(text == "True")),
        Token::number => text
            .parse()
            .map(Literal::Number)
            .map_err(|e| invalid(line, format!("{}: {}", text, e))),
        Token::string => Ok(Literal::Quoted(
            pair.into_inner()
                .next()
                .map(|inner| inner.as_str().to_string())
                .unwrap_or_default(),
        )),
        Token::socket_group | Token::word => Ok(Literal::Word(text.to_string())),
        other => Err(ParseError::Grammar(format!(
            "unexpected token {:?} on line {}",
            other, line
        ))),
    }
}

fn is_channel_list(literals: &[Literal]) -> bool {
    (literals.len() == 3 || literals.len() == 4)
        && literals.iter().all(|l| matches!(l, Literal::Number(_)))
}

/// Fold the literals of a condition line into a single value.
///
/// No literal means the condition only tests for presence. A number
/// followed by names is a match count, as in `HasExplicitMod >=2 "Tyrannical"`.
fn condition_value(literals: &[Literal]) -> ConditionValue {
    match literals {
        [] => ConditionValue::Bool(true),
        [Literal::Bool(b)] => ConditionValue::Bool(*b),
        [Literal::Number(n)] => ConditionValue::Int(*n),
        [single] => ConditionValue::String(single.text()),
        [Literal::Number(count), names @ ..] if names.iter().all(Literal::is_name) => {
            ConditionValue::CountedNames {
                count: *count,
                names: names.iter().map(Literal::text).collect(),
            }
        }
        many => ConditionValue::Strings(many.iter().map(Literal::text).collect()),
    }
}

fn action_arg(literal: &Literal) -> ActionArg {
    match literal {
        Literal::Number(n) => ActionArg::Int(*n),
        other => ActionArg::String(other.text()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_rule() {
        let filter = StandardParser::parse("Show\n    ItemLevel >= 65\n    SetFontSize 45\n").unwrap();
        assert_eq!(filter.rules.len(), 1);
        let rule = &filter.rules[0];
        assert_eq!(rule.visibility, Visibility::Show);
        assert_eq!(rule.conditions[&ConditionKind::ItemLevel].op, Operator::Ge);
        assert_eq!(
            rule.actions[&ActionKind::SetFontSize].args,
            vec![ActionArg::Int(45)]
        );
    }

    #[test]
    fn test_condition_without_value_is_true() {
        let filter = StandardParser::parse("Show\n    StackSize\n").unwrap();
        let condition = &filter.rules[0].conditions[&ConditionKind::StackSize];
        assert_eq!(condition.value, ConditionValue::Bool(true));
    }

    #[test]
    fn test_condition_value_folding() {
        assert_eq!(condition_value(&[]), ConditionValue::Bool(true));
        assert_eq!(
            condition_value(&[Literal::Word("Rare".into()), Literal::Word("Unique".into())]),
            ConditionValue::Strings(vec!["Rare".into(), "Unique".into()])
        );
        assert_eq!(
            condition_value(&[Literal::Quoted("Exalted Orb".into())]),
            ConditionValue::String("Exalted Orb".into())
        );
        assert_eq!(
            condition_value(&[Literal::Number(2), Literal::Quoted("Tyrannical".into())]),
            ConditionValue::CountedNames {
                count: 2,
                names: vec!["Tyrannical".into()]
            }
        );
        // numbers after the first stay plain names
        assert_eq!(
            condition_value(&[Literal::Number(2), Literal::Number(3)]),
            ConditionValue::Strings(vec!["2".into(), "3".into()])
        );
    }

    #[test]
    fn test_prefix_keywords() {
        let filter = StandardParser::parse(
            "Show\n    CorruptedMods 1\n    Corrupted True\n    PlayAlertSoundPositional 2 100\n",
        )
        .unwrap();
        let rule = &filter.rules[0];
        assert!(rule.conditions.contains_key(&ConditionKind::CorruptedMods));
        assert!(rule.conditions.contains_key(&ConditionKind::Corrupted));
        assert!(rule.actions.contains_key(&ActionKind::PlayAlertSoundPositional));
    }
}

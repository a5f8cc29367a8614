//! Indentation rules keyed by transition and token
//!
//! A rule says how a line is placed relative to an anchor. Which anchor
//! applies depends on the transition: `Before` rules anchor on whatever the
//! line's first token pairs with, `After` rules on the token ending the
//! previous line (or the opener enclosing a statement list), and `Element`
//! rules on the bracket enclosing a comma separated list.

use crate::grammar::Category;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Before,
    After,
    Element,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Matcher {
    Token(&'static str),
    Category(Category),
}

impl Matcher {
    fn matches(&self, name: &str, category: Category) -> bool {
        match self {
            Matcher::Token(token) => *token == name,
            Matcher::Category(c) => *c == category,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Anchor line indentation plus this many basic units
    Basic(usize),
    /// Anchor line indentation plus the continuation units
    Continuation,
    /// Same indentation as the anchor line
    Inherit,
    /// Column of the anchor token itself
    AlignAnchor,
    /// Column of the first token after the anchor, when it shares the
    /// anchor's line; one basic unit past the anchor line otherwise
    AlignNext,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndentRule {
    pub transition: Transition,
    pub matcher: Matcher,
    pub action: Action,
}

const fn rule(transition: Transition, matcher: Matcher, action: Action) -> IndentRule {
    IndentRule {
        transition,
        matcher,
        action,
    }
}

use Action::*;
use Matcher::{Category as C, Token as T};
use Transition::*;

/// Token rules come before category rules so the specific one wins
pub static SAS_RULES: &[IndentRule] = &[
    rule(Before, C(Category::Closer), Inherit),
    rule(Before, T("then"), Basic(1)),
    rule(Before, T("%then"), Basic(1)),
    rule(Before, T(","), AlignAnchor),
    rule(Before, T(";"), Inherit),
    rule(Before, C(Category::BinaryOperator), Continuation),
    rule(After, T("dataequal"), Basic(0)),
    rule(After, T("%macro"), Basic(1)),
    rule(After, T("proc"), Basic(1)),
    rule(After, T("data"), Basic(1)),
    rule(After, T("do"), Basic(1)),
    rule(After, T("%do"), Basic(1)),
    rule(After, T("select"), Basic(1)),
    rule(After, T("then"), Basic(1)),
    rule(After, T("else"), Basic(1)),
    rule(After, T("%then"), Basic(1)),
    rule(After, T("%else"), Basic(1)),
    rule(After, T("("), Basic(1)),
    rule(After, C(Category::Opener), Basic(1)),
    rule(After, C(Category::BinaryOperator), Continuation),
    rule(After, C(Category::Closer), Continuation),
    rule(After, C(Category::Atom), Continuation),
    rule(Element, T(","), AlignNext),
];

/// First rule matching the transition and token
pub fn find(transition: Transition, name: &str, category: Category) -> Option<Action> {
    find_in(SAS_RULES, transition, name, category)
}

pub fn find_in(
    rules: &[IndentRule],
    transition: Transition,
    name: &str,
    category: Category,
) -> Option<Action> {
    rules
        .iter()
        .find(|r| r.transition == transition && r.matcher.matches(name, category))
        .map(|r| r.action)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_rule_beats_category() {
        assert_eq!(find(After, "dataequal", Category::Opener), Some(Basic(0)));
        assert_eq!(find(After, "output", Category::Opener), Some(Basic(1)));
        assert_eq!(find(Before, "then", Category::BinaryOperator), Some(Basic(1)));
        assert_eq!(find(Before, "+", Category::BinaryOperator), Some(Continuation));
    }

    #[test]
    fn test_transitions_are_separate() {
        assert_eq!(find(Before, "end", Category::Closer), Some(Inherit));
        assert_eq!(find(After, "end", Category::Closer), Some(Continuation));
        assert_eq!(find(Element, ",", Category::Separator), Some(AlignNext));
        assert_eq!(find(Element, ";", Category::Separator), None);
    }
}

//! Geometry expression language.
//!
//! Every position and size attribute of a node is a short expression:
//!
//! ```text
//! value    := literal | relation
//! literal  := NUMBER [unit]            unit ∈ { %, vw, vh, px }
//! relation := "at" ID | "after" ID | NUMBER "%" "of" ID
//! ```
//!
//! Literals are absolute: pixels pass through, percentages scale the outer
//! extent. Relations read another node's resolved geometry and are flagged
//! relative, since that geometry already carries its ancestors' offsets.
//!
//! Parsing is strict and happens when a node record is materialized.
//! Evaluation never fails: a reference to a node that does not exist
//! evaluates to zero and recovers once the node appears.

use std::fmt;

use crate::error::{UiError, UiResult};
use crate::layout::Rect;

/// Axis an expression is evaluated on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// X position / width.
    Horizontal,
    /// Y position / height.
    Vertical,
}

impl Axis {
    /// Position of `rect` on this axis.
    #[must_use]
    pub const fn position(self, rect: &Rect) -> f32 {
        match self {
            Self::Horizontal => rect.x,
            Self::Vertical => rect.y,
        }
    }

    /// Extent of `rect` on this axis.
    #[must_use]
    pub const fn extent(self, rect: &Rect) -> f32 {
        match self {
            Self::Horizontal => rect.width,
            Self::Vertical => rect.height,
        }
    }
}

/// Unit attached to a literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Unit {
    /// Absolute pixels.
    #[default]
    Pixels,
    /// Percentage of the outer extent.
    Percent,
    /// Viewport width. Parsed, evaluates to zero.
    ViewWidth,
    /// Viewport height. Parsed, evaluates to zero.
    ViewHeight,
}

/// A parsed geometry expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A number with an optional unit.
    Literal {
        /// The numeric value.
        value: f32,
        /// Its unit.
        unit: Unit,
    },
    /// `at id`: the target's position.
    At(String),
    /// `after id`: the target's far edge.
    After(String),
    /// `N% of id`: a fraction of the target's extent.
    Of {
        /// The percentage, `50` for `50%`.
        percent: f32,
        /// Referenced node id.
        target: String,
    },
}

/// Result of evaluating an expression.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Resolved {
    /// Pixel value.
    pub value: f32,
    /// True when the value was derived from another node's geometry and
    /// must not be offset by the parent's position.
    pub relative: bool,
}

impl Resolved {
    const ZERO: Self = Self {
        value: 0.0,
        relative: false,
    };

    const fn absolute(value: f32) -> Self {
        Self {
            value,
            relative: false,
        }
    }

    const fn relative(value: f32) -> Self {
        Self {
            value,
            relative: true,
        }
    }
}

/// Read access to resolved node geometry by string id.
pub trait GeometryLookup {
    /// Returns the resolved box of the first node with `id`, if any.
    fn lookup(&self, id: &str) -> Option<Rect>;
}

impl Expr {
    /// Parses an expression. Blank input means "attribute not set".
    ///
    /// # Errors
    ///
    /// Returns [`UiError::Expression`] when the text does not follow the grammar.
    pub fn parse(text: &str) -> UiResult<Option<Self>> {
        let tokens = tokenize(text)?;
        let expr = match tokens.as_slice() {
            [] => return Ok(None),
            [Token::Number(value)] => Self::Literal {
                value: *value,
                unit: Unit::Pixels,
            },
            [Token::Number(value), Token::Unit(unit)] => Self::Literal {
                value: *value,
                unit: *unit,
            },
            [Token::Keyword(Keyword::At), Token::Ident(target)] => Self::At(target.clone()),
            [Token::Keyword(Keyword::After), Token::Ident(target)] => Self::After(target.clone()),
            [Token::Number(percent), Token::Unit(Unit::Percent), Token::Keyword(Keyword::Of), Token::Ident(target)] => {
                Self::Of {
                    percent: *percent,
                    target: target.clone(),
                }
            }
            [.., Token::Keyword(Keyword::Of), Token::Ident(_)] => {
                return Err(UiError::expression(text, "`of` requires a leading percent literal"));
            }
            _ => return Err(UiError::expression(text, "unrecognized expression")),
        };
        Ok(Some(expr))
    }

    /// The node id this expression references, if it is a relation.
    #[must_use]
    pub fn target(&self) -> Option<&str> {
        match self {
            Self::Literal { .. } => None,
            Self::At(target) | Self::After(target) | Self::Of { target, .. } => Some(target),
        }
    }

    /// Returns a copy whose reference (if any) is scoped under `prefix`.
    ///
    /// `at sibling` becomes `at {prefix}{separator}sibling`, which is how
    /// template nodes keep referring to each other once spliced.
    #[must_use]
    pub fn scoped(&self, prefix: &str, separator: &str) -> Self {
        let scope = |target: &str| format!("{prefix}{separator}{target}");
        match self {
            Self::Literal { .. } => self.clone(),
            Self::At(target) => Self::At(scope(target)),
            Self::After(target) => Self::After(scope(target)),
            Self::Of { percent, target } => Self::Of {
                percent: *percent,
                target: scope(target),
            },
        }
    }

    /// Evaluates the expression on `axis` against the `outer` extent.
    #[must_use]
    pub fn resolve<L: GeometryLookup + ?Sized>(&self, outer: f32, axis: Axis, nodes: &L) -> Resolved {
        match self {
            Self::Literal { value, unit } => match unit {
                Unit::Pixels => Resolved::absolute(*value),
                Unit::Percent => Resolved::absolute(value / 100.0 * outer),
                Unit::ViewWidth | Unit::ViewHeight => Resolved::ZERO,
            },
            Self::At(target) => Self::with_target(target, nodes, |rect| axis.position(rect)),
            Self::After(target) => {
                Self::with_target(target, nodes, |rect| axis.position(rect) + axis.extent(rect))
            }
            Self::Of { percent, target } => {
                Self::with_target(target, nodes, |rect| percent / 100.0 * axis.extent(rect))
            }
        }
    }

    fn with_target<L: GeometryLookup + ?Sized>(target: &str, nodes: &L, f: impl FnOnce(&Rect) -> f32) -> Resolved {
        match nodes.lookup(target) {
            Some(rect) => Resolved::relative(f(&rect)),
            None => {
                tracing::trace!(target_id = target, "unresolved node reference, using 0");
                Resolved::ZERO
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal { value, unit } => {
                let suffix = match unit {
                    Unit::Pixels => "",
                    Unit::Percent => "%",
                    Unit::ViewWidth => "vw",
                    Unit::ViewHeight => "vh",
                };
                write!(f, "{value}{suffix}")
            }
            Self::At(target) => write!(f, "at {target}"),
            Self::After(target) => write!(f, "after {target}"),
            Self::Of { percent, target } => write!(f, "{percent}% of {target}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Keyword {
    At,
    After,
    Of,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f32),
    Unit(Unit),
    Keyword(Keyword),
    Ident(String),
}

fn tokenize(text: &str) -> UiResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        // A reference takes the whole next word, so ids may hold any
        // character a source id can except whitespace.
        if matches!(tokens.last(), Some(Token::Keyword(_))) {
            let mut end = start;
            while let Some(&(i, n)) = chars.peek() {
                if n.is_whitespace() {
                    break;
                }
                end = i + n.len_utf8();
                chars.next();
            }
            tokens.push(Token::Ident(text[start..end].to_string()));
            continue;
        }

        if c == '%' {
            chars.next();
            tokens.push(Token::Unit(Unit::Percent));
            continue;
        }

        let signed = (c == '-' || c == '+')
            && text[start + 1..].chars().next().is_some_and(|n| n.is_ascii_digit() || n == '.');
        if c.is_ascii_digit() || c == '.' || signed {
            let mut end = start + c.len_utf8();
            chars.next();
            while let Some(&(i, n)) = chars.peek() {
                if n.is_ascii_digit() || n == '.' {
                    end = i + n.len_utf8();
                    chars.next();
                } else {
                    break;
                }
            }
            let literal = &text[start..end];
            let value = literal
                .parse::<f32>()
                .map_err(|_| UiError::expression(text, format!("bad number {literal:?}")))?;
            tokens.push(Token::Number(value));
            continue;
        }

        if c.is_alphabetic() || c == '_' {
            let mut end = start + c.len_utf8();
            chars.next();
            while let Some(&(i, n)) = chars.peek() {
                if n.is_alphanumeric() || n == '_' || n == '-' {
                    end = i + n.len_utf8();
                    chars.next();
                } else {
                    break;
                }
            }
            let word = &text[start..end];
            let after_number = matches!(tokens.last(), Some(Token::Number(_)));
            tokens.push(match word {
                "at" => Token::Keyword(Keyword::At),
                "after" => Token::Keyword(Keyword::After),
                "of" => Token::Keyword(Keyword::Of),
                "vw" if after_number => Token::Unit(Unit::ViewWidth),
                "vh" if after_number => Token::Unit(Unit::ViewHeight),
                "px" if after_number => Token::Unit(Unit::Pixels),
                _ => Token::Ident(word.to_string()),
            });
            continue;
        }

        return Err(UiError::expression(text, format!("unexpected character {c:?}")));
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct Fixed(HashMap<&'static str, Rect>);

    impl GeometryLookup for Fixed {
        fn lookup(&self, id: &str) -> Option<Rect> {
            self.0.get(id).copied()
        }
    }

    fn nodes() -> Fixed {
        let mut map = HashMap::new();
        map.insert("a", Rect::new(10.0, 5.0, 20.0, 40.0));
        Fixed(map)
    }

    fn eval(text: &str, outer: f32, axis: Axis) -> Resolved {
        Expr::parse(text).unwrap().unwrap().resolve(outer, axis, &nodes())
    }

    #[test]
    fn test_literals() {
        assert_eq!(eval("25", 200.0, Axis::Horizontal), Resolved::absolute(25.0));
        assert_eq!(eval("25px", 200.0, Axis::Horizontal), Resolved::absolute(25.0));
        assert_eq!(eval("-8", 200.0, Axis::Horizontal), Resolved::absolute(-8.0));
        assert_eq!(eval("50%", 200.0, Axis::Horizontal), Resolved::absolute(100.0));
        assert_eq!(eval("-50%", 40.0, Axis::Vertical), Resolved::absolute(-20.0));
        assert_eq!(eval("12.5 %", 80.0, Axis::Vertical), Resolved::absolute(10.0));
    }

    #[test]
    fn test_percent_law() {
        for outer in [0.0_f32, 1.0, 33.0, 640.0, 1920.0] {
            for p in [0.0_f32, 1.0, 25.0, 50.0, 99.0, 100.0] {
                let got = eval(&format!("{p}%"), outer, Axis::Horizontal);
                assert!((got.value - p / 100.0 * outer).abs() < 1e-3);
                assert!(!got.relative);
            }
        }
    }

    #[test]
    fn test_relations() {
        assert_eq!(eval("after a", 0.0, Axis::Horizontal), Resolved::relative(30.0));
        assert_eq!(eval("after a", 0.0, Axis::Vertical), Resolved::relative(45.0));
        assert_eq!(eval("at a", 0.0, Axis::Horizontal), Resolved::relative(10.0));
        assert_eq!(eval("at a", 0.0, Axis::Vertical), Resolved::relative(5.0));
        assert_eq!(eval("50% of a", 999.0, Axis::Vertical), Resolved::relative(20.0));
        assert_eq!(eval("50% of a", 999.0, Axis::Horizontal), Resolved::relative(10.0));
    }

    #[test]
    fn test_unresolved_target_is_zero() {
        assert_eq!(eval("after ghost", 100.0, Axis::Horizontal), Resolved::ZERO);
        assert_eq!(eval("30% of ghost", 100.0, Axis::Horizontal), Resolved::ZERO);
    }

    #[test]
    fn test_viewport_units_are_zero() {
        assert_eq!(eval("50vw", 100.0, Axis::Horizontal), Resolved::ZERO);
        assert_eq!(eval("10vh", 100.0, Axis::Vertical), Resolved::ZERO);
    }

    #[test]
    fn test_blank_is_unset() {
        assert_eq!(Expr::parse("").unwrap(), None);
        assert_eq!(Expr::parse("   ").unwrap(), None);
    }

    #[test]
    fn test_malformed() {
        assert!(Expr::parse("of a").is_err());
        assert!(Expr::parse("50 of a").is_err());
        assert!(Expr::parse("at").is_err());
        assert!(Expr::parse("10 20").is_err());
        assert!(Expr::parse("50$").is_err());
        assert!(Expr::parse("after a b").is_err());
    }

    #[test]
    fn test_ids_with_separators() {
        let expr = Expr::parse("after panel__row-2").unwrap().unwrap();
        assert_eq!(expr.target(), Some("panel__row-2"));
    }

    #[test]
    fn test_ids_with_dots_and_leading_digits() {
        assert_eq!(Expr::parse("at row.1").unwrap().unwrap(), Expr::At("row.1".to_string()));
        assert_eq!(Expr::parse("after 2col").unwrap().unwrap(), Expr::After("2col".to_string()));
        assert_eq!(
            Expr::parse("25% of grid.3").unwrap().unwrap(),
            Expr::Of {
                percent: 25.0,
                target: "grid.3".to_string()
            }
        );
        assert_eq!(
            Expr::parse("at 2col").unwrap().unwrap().scoped("card", "__").to_string(),
            "at card__2col"
        );
        assert!(Expr::parse("at row.1 extra").is_err());
    }

    #[test]
    fn test_scoped() {
        let expr = Expr::parse("25% of label").unwrap().unwrap();
        assert_eq!(expr.scoped("card", "__").to_string(), "25% of card__label");

        let literal = Expr::parse("10%").unwrap().unwrap();
        assert_eq!(literal.scoped("card", "__"), literal);
    }
}

// Copyright 2022 RisingLight Project Authors. Licensed under Apache-2.0.

//! Constant folding of `OFFSET` / `LIMIT` expressions.
//!
//! Lowering only ever sees integer bounds. This pass runs before it and rejects any bound that
//! cannot be evaluated at plan time, e.g. `LIMIT $1`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A bound expression as it comes out of the binder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundExpr {
    Literal(i64),
    /// A query parameter, only known at execution time.
    Parameter(usize),
    Add(Box<BoundExpr>, Box<BoundExpr>),
    Mul(Box<BoundExpr>, Box<BoundExpr>),
}

impl fmt::Display for BoundExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(v) => write!(f, "{v}"),
            Self::Parameter(i) => write!(f, "${i}"),
            Self::Add(l, r) => write!(f, "({l} + {r})"),
            Self::Mul(l, r) => write!(f, "({l} * {r})"),
        }
    }
}

/// The error type of bound folding.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BoundError {
    #[error("bound must be a compile-time constant: {0}")]
    NotConstant(String),
    #[error("bound must not be negative: {0}")]
    Negative(i64),
    #[error("bound overflows: {0}")]
    Overflow(String),
}

/// Folded `OFFSET` and `LIMIT` of a logical order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bound {
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

impl Bound {
    /// No offset and no limit.
    pub const NONE: Bound = Bound {
        offset: None,
        limit: None,
    };

    pub const fn new(offset: Option<usize>, limit: Option<usize>) -> Self {
        Bound { offset, limit }
    }

    pub const fn limit(limit: usize) -> Self {
        Bound::new(None, Some(limit))
    }

    /// Returns true if either an offset or a limit is present.
    pub const fn is_bounded(&self) -> bool {
        self.offset.is_some() || self.limit.is_some()
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |v: Option<usize>| v.map_or_else(|| "none".to_string(), |v| v.to_string());
        write!(f, "offset: {}, limit: {}", show(self.offset), show(self.limit))
    }
}

/// Fold the optional offset and limit expressions into a [`Bound`].
pub fn fold_bound(
    offset: Option<&BoundExpr>,
    limit: Option<&BoundExpr>,
) -> Result<Bound, BoundError> {
    let fold = |expr: Option<&BoundExpr>| expr.map(fold_expr).transpose();
    Ok(Bound::new(fold(offset)?, fold(limit)?))
}

fn fold_expr(expr: &BoundExpr) -> Result<usize, BoundError> {
    // report the whole bound, not the parameter buried in it
    let value = eval(expr).map_err(|e| match e {
        BoundError::NotConstant(_) => BoundError::NotConstant(expr.to_string()),
        e => e,
    })?;
    usize::try_from(value).map_err(|_| BoundError::Negative(value))
}

fn eval(expr: &BoundExpr) -> Result<i64, BoundError> {
    match expr {
        BoundExpr::Literal(v) => Ok(*v),
        BoundExpr::Parameter(_) => Err(BoundError::NotConstant(expr.to_string())),
        BoundExpr::Add(l, r) => eval(l)?
            .checked_add(eval(r)?)
            .ok_or_else(|| BoundError::Overflow(expr.to_string())),
        BoundExpr::Mul(l, r) => eval(l)?
            .checked_mul(eval(r)?)
            .ok_or_else(|| BoundError::Overflow(expr.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(v: i64) -> Box<BoundExpr> {
        Box::new(BoundExpr::Literal(v))
    }

    #[test]
    fn fold_literals() {
        let limit = BoundExpr::Mul(lit(5), lit(2));
        let offset = BoundExpr::Add(lit(1), lit(2));
        assert_eq!(
            fold_bound(Some(&offset), Some(&limit)),
            Ok(Bound::new(Some(3), Some(10)))
        );
        assert_eq!(fold_bound(None, None), Ok(Bound::NONE));
    }

    #[test]
    fn zero_limit_is_not_absent() {
        let bound = fold_bound(None, Some(&BoundExpr::Literal(0))).unwrap();
        assert_eq!(bound, Bound::limit(0));
        assert!(bound.is_bounded());
    }

    #[test]
    fn reject_parameter() {
        let limit = BoundExpr::Add(lit(1), Box::new(BoundExpr::Parameter(1)));
        assert_eq!(
            fold_bound(None, Some(&limit)),
            Err(BoundError::NotConstant("(1 + $1)".into()))
        );
    }

    #[test]
    fn reject_nested_parameter_in_offset() {
        let offset = BoundExpr::Mul(
            Box::new(BoundExpr::Add(Box::new(BoundExpr::Parameter(2)), lit(1))),
            lit(3),
        );
        let err = fold_bound(Some(&offset), Some(&BoundExpr::Literal(10))).unwrap_err();
        assert_eq!(err, BoundError::NotConstant("(($2 + 1) * 3)".into()));
        assert_eq!(
            err.to_string(),
            "bound must be a compile-time constant: (($2 + 1) * 3)"
        );
    }

    #[test]
    fn reject_negative_and_overflow() {
        assert_eq!(
            fold_bound(Some(&BoundExpr::Literal(-1)), None),
            Err(BoundError::Negative(-1))
        );
        let huge = BoundExpr::Mul(lit(i64::MAX), lit(2));
        assert!(matches!(
            fold_bound(None, Some(&huge)),
            Err(BoundError::Overflow(_))
        ));
    }
}

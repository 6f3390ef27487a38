/// A minimal s-expression builder for SMT-LIB terms, handed to `rsmt2`
/// through the `Expr2Smt`/`Sym2Smt`/`Sort2Smt` print traits rather than
/// building strings by hand at every call site.
use std::io::Write;

use rsmt2::print::{Expr2Smt, Sort2Smt, Sym2Smt};
use rsmt2::SmtRes;

#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    Atom(String),
    App(String, Vec<Term>),
}

impl Term {
    pub fn atom(s: impl Into<String>) -> Term {
        Term::Atom(s.into())
    }

    pub fn app(head: impl Into<String>, args: Vec<Term>) -> Term {
        let head = head.into();
        if args.is_empty() {
            Term::Atom(head)
        } else {
            Term::App(head, args)
        }
    }

    pub fn to_smt_string(&self) -> String {
        match self {
            Term::Atom(s) => s.clone(),
            Term::App(head, args) => {
                let inner: Vec<String> = args.iter().map(Term::to_smt_string).collect();
                format!("({head} {})", inner.join(" "))
            }
        }
    }

    pub fn and(terms: Vec<Term>) -> Term {
        match terms.len() {
            0 => Term::atom("true"),
            1 => terms.into_iter().next().unwrap(),
            _ => Term::app("and", terms),
        }
    }

    pub fn not(term: Term) -> Term {
        Term::app("not", vec![term])
    }

    pub fn eq(a: Term, b: Term) -> Term {
        Term::app("=", vec![a, b])
    }

    pub fn ite(cond: Term, then: Term, els: Term) -> Term {
        Term::app("ite", vec![cond, then, els])
    }
}

impl Expr2Smt<()> for Term {
    fn expr_to_smt2<W: Write>(&self, w: &mut W, _: ()) -> SmtRes<()> {
        write!(w, "{}", self.to_smt_string())?;
        Ok(())
    }
}

/// A bare SMT-LIB sort expression ("Int", "Bool", "(Array $addr Int)", ...).
#[derive(Debug, Clone, PartialEq)]
pub struct Sort(pub String);

impl Sort {
    pub fn of(s: impl Into<String>) -> Self {
        Sort(s.into())
    }
}

impl Sort2Smt for Sort {
    fn sort_to_smt2<W: Write>(&self, w: &mut W) -> SmtRes<()> {
        write!(w, "{}", self.0)?;
        Ok(())
    }
}

/// A plain identifier used as a declared constant/function symbol name.
#[derive(Debug, Clone, PartialEq)]
pub struct Sym(pub String);

impl Sym2Smt<()> for Sym {
    fn sym_to_smt2<W: Write>(&self, w: &mut W, _: ()) -> SmtRes<()> {
        write!(w, "{}", self.0)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nullary_app_collapses_to_atom() {
        assert_eq!(Term::app("x", vec![]), Term::Atom("x".into()));
    }

    #[test]
    fn to_smt_string_renders_nested_application() {
        let t = Term::app("+", vec![Term::atom("a"), Term::atom("b")]);
        assert_eq!(t.to_smt_string(), "(+ a b)");
    }

    #[test]
    fn and_of_single_term_is_unwrapped() {
        let t = Term::and(vec![Term::atom("p")]);
        assert_eq!(t, Term::Atom("p".into()));
    }
}

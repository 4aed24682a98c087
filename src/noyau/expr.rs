// src/noyau/expr.rs
//
// AST de l’expression restreinte.
// - Nombre    : littéral exact (rationnel)
// - Constante : nom résolu dans l’environnement (pi, e, ...)
// - Appel     : fonction unaire de la liste blanche
// - Neg       : moins unaire
// - Add/Sub/Mul/Div/Pow : opérateurs binaires
//
// Aucun autre noeud n’existe : pas de variable, pas d’attribut, pas d’instruction.

use num_rational::BigRational;
use num_traits::One;

use std::fmt;

use super::environnement::{Constante, Fonction};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expr {
    Nombre(BigRational),
    Constante(Constante),

    Appel(Fonction, Box<Expr>),
    Neg(Box<Expr>),

    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    Pow(Box<Expr>, Box<Expr>),
}

impl Expr {
    /// Nombre de noeuds (garde-fou pour les tests de robustesse).
    pub fn taille(&self) -> usize {
        use Expr::*;
        match self {
            Nombre(_) | Constante(_) => 1,
            Appel(_, x) | Neg(x) => 1 + x.taille(),
            Add(a, b) | Sub(a, b) | Mul(a, b) | Div(a, b) | Pow(a, b) => {
                1 + a.taille() + b.taille()
            }
        }
    }

    fn priorite(&self) -> u8 {
        use Expr::*;
        match self {
            Add(..) | Sub(..) => 1,
            Mul(..) | Div(..) => 2,
            Neg(_) => 3,
            Pow(..) => 4,
            Nombre(r) if !r.denom().is_one() => 2, // affiché n/d
            _ => 5,
        }
    }
}

/// Affichage entièrement parenthésé là où la priorité l’exige.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Expr::*;

        fn enfant(f: &mut fmt::Formatter<'_>, e: &Expr, min: u8) -> fmt::Result {
            if e.priorite() < min {
                write!(f, "({e})")
            } else {
                write!(f, "{e}")
            }
        }

        match self {
            Nombre(r) => {
                if r.denom().is_one() {
                    write!(f, "{}", r.numer())
                } else {
                    write!(f, "{}/{}", r.numer(), r.denom())
                }
            }
            Constante(c) => write!(f, "{c}"),
            Appel(fun, x) => write!(f, "{fun}({x})"),
            Neg(x) => {
                f.write_str("-")?;
                enfant(f, x, 4)
            }
            Add(a, b) => {
                enfant(f, a, 1)?;
                f.write_str(" + ")?;
                enfant(f, b, 2)
            }
            Sub(a, b) => {
                enfant(f, a, 1)?;
                f.write_str(" - ")?;
                enfant(f, b, 2)
            }
            Mul(a, b) => {
                enfant(f, a, 2)?;
                f.write_str("*")?;
                enfant(f, b, 3)
            }
            Div(a, b) => {
                enfant(f, a, 2)?;
                f.write_str("/")?;
                enfant(f, b, 3)
            }
            Pow(a, b) => {
                enfant(f, a, 5)?;
                f.write_str("**")?;
                enfant(f, b, 3)
            }
        }
    }
}

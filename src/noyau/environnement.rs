//! Environnement restreint : nom -> constante | fonction unaire.
//!
//! Construit une seule fois, en lecture seule ensuite (partageable entre threads).
//! Tout nom absent d’ici est refusé dès l’analyse.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

/// Constantes mathématiques exposées par le noyau.
///
/// `eps` n’en fait volontairement pas partie : ce n’est pas une constante
/// mathématique et elle dépend de la précision de travail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Constante {
    Pi,
    E,
    Phi,
    Euler,
    Catalan,
    Apery,
    Ln2,
    Ln10,
    Degree,
}

impl Constante {
    pub const TOUTES: [Constante; 9] = [
        Constante::Pi,
        Constante::E,
        Constante::Phi,
        Constante::Euler,
        Constante::Catalan,
        Constante::Apery,
        Constante::Ln2,
        Constante::Ln10,
        Constante::Degree,
    ];

    pub fn nom(self) -> &'static str {
        match self {
            Constante::Pi => "pi",
            Constante::E => "e",
            Constante::Phi => "phi",
            Constante::Euler => "euler",
            Constante::Catalan => "catalan",
            Constante::Apery => "apery",
            Constante::Ln2 => "ln2",
            Constante::Ln10 => "ln10",
            Constante::Degree => "degree",
        }
    }
}

/// Fonctions unaires autorisées.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Fonction {
    Sqrt,
    Exp,
    Ln,
    Log,
    Log10,
    Sin,
    Cos,
    Tan,
    Sinh,
    Cosh,
    Tanh,
    Asin,
    Acos,
    Atan,
    Asinh,
    Acosh,
    Atanh,
}

impl Fonction {
    pub const TOUTES: [Fonction; 17] = [
        Fonction::Sqrt,
        Fonction::Exp,
        Fonction::Ln,
        Fonction::Log,
        Fonction::Log10,
        Fonction::Sin,
        Fonction::Cos,
        Fonction::Tan,
        Fonction::Sinh,
        Fonction::Cosh,
        Fonction::Tanh,
        Fonction::Asin,
        Fonction::Acos,
        Fonction::Atan,
        Fonction::Asinh,
        Fonction::Acosh,
        Fonction::Atanh,
    ];

    pub fn nom(self) -> &'static str {
        match self {
            Fonction::Sqrt => "sqrt",
            Fonction::Exp => "exp",
            Fonction::Ln => "ln",
            Fonction::Log => "log",
            Fonction::Log10 => "log10",
            Fonction::Sin => "sin",
            Fonction::Cos => "cos",
            Fonction::Tan => "tan",
            Fonction::Sinh => "sinh",
            Fonction::Cosh => "cosh",
            Fonction::Tanh => "tanh",
            Fonction::Asin => "asin",
            Fonction::Acos => "acos",
            Fonction::Atan => "atan",
            Fonction::Asinh => "asinh",
            Fonction::Acosh => "acosh",
            Fonction::Atanh => "atanh",
        }
    }
}

impl fmt::Display for Constante {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.nom())
    }
}

impl fmt::Display for Fonction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.nom())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Symbole {
    Constante(Constante),
    Fonction(Fonction),
}

#[derive(Debug)]
pub struct Environnement {
    symboles: BTreeMap<&'static str, Symbole>,
}

static ENVIRONNEMENT: OnceLock<Environnement> = OnceLock::new();

impl Environnement {
    /// Environnement standard (fonctions de la liste blanche + constantes).
    pub fn standard() -> &'static Environnement {
        ENVIRONNEMENT.get_or_init(Environnement::construire)
    }

    fn construire() -> Environnement {
        let mut symboles = BTreeMap::new();
        for f in Fonction::TOUTES {
            symboles.insert(f.nom(), Symbole::Fonction(f));
        }
        for c in Constante::TOUTES {
            symboles.insert(c.nom(), Symbole::Constante(c));
        }
        Environnement { symboles }
    }

    pub fn resoudre(&self, nom: &str) -> Option<Symbole> {
        self.symboles.get(nom).copied()
    }

    /// Noms disponibles (ordre alphabétique), pour l’aide de l’UI.
    pub fn noms(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.symboles.keys().copied()
    }
}

//! Erreurs du noyau.
//!
//! Chaque erreur porte son contexte (expression, base, nombre de chiffres) pour que
//! l’appelant sache précisément quelle combinaison a échoué.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ErreurChiffres {
    /// Lecture impossible, nom hors environnement, construction interdite,
    /// ou erreur de domaine pendant l’évaluation.
    #[error("expression invalide {expression:?} : {raison}")]
    ExpressionInvalide { expression: String, raison: String },

    /// Base < 2.
    #[error("base invalide : {0} (attendu ≥ 2)")]
    BaseInvalide(u32),

    /// Nombre de chiffres nul ou au-delà du plafond.
    #[error("nombre de chiffres invalide : {nb} (attendu entre 1 et {max})")]
    NombreChiffresInvalide { nb: usize, max: usize },

    /// Chiffre hors de [0, base) à l’entrée de la trajectoire.
    #[error("chiffre {chiffre} hors de [0, {base}) à la position {position}")]
    ChiffreInvalide {
        chiffre: u32,
        base: u32,
        position: usize,
    },
}

impl ErreurChiffres {
    #[inline]
    pub fn expression(expression: &str, raison: impl Into<String>) -> Self {
        Self::ExpressionInvalide {
            expression: expression.to_string(),
            raison: raison.into(),
        }
    }
}

pub type Resultat<T> = Result<T, ErreurChiffres>;

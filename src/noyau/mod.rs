//! Noyau numérique : expression -> réel -> chiffres en base b -> trajectoire
//!
//! Organisation interne :
//! - jetons.rs        : tokenisation (littéraux exacts, `**`/`^`, π)
//! - analyse.rs       : descente récursive -> Expr (noms résolus)
//! - expr.rs          : AST restreint
//! - environnement.rs : liste blanche nom -> constante / fonction
//! - fixe.rs          : virgule fixe binaire + fonctions transcendantes
//! - constantes.rs    : constantes (π, e, γ, ...) + cache par précision
//! - reel.rs          : réel décimal tronqué à N chiffres significatifs
//! - eval.rs          : interpréteur d’arbre (précision en paramètre)
//! - chiffres.rs      : plan de précision + extraction en base b
//! - format.rs        : bloc de chiffres + noms d’artefacts
//! - trajectoire.rs   : chiffres -> polyligne
//! - lot.rs           : expressions × bases × nombres de chiffres
//! - erreur.rs / reglages.rs

pub mod analyse;
pub mod chiffres;
pub mod constantes;
pub mod environnement;
pub mod erreur;
pub mod eval;
pub mod expr;
pub mod fixe;
pub mod format;
pub mod jetons;
pub mod lot;
pub mod reel;
pub mod reglages;
pub mod trajectoire;

#[cfg(test)]
mod tests_scientifiques;

#[cfg(test)]
mod tests_fuzz_safe;

// API publique
pub use chiffres::{extract_digits, extract_digits_avec, SequenceChiffres};
pub use erreur::{ErreurChiffres, Resultat};
pub use eval::{analyser_expression, evaluate, evaluate_detaille};
pub use format::{format_bloc, nom_artefact, titre};
pub use lot::{executer_lot, RapportLot};
pub use reglages::Reglages;
pub use trajectoire::{map_to_trajectory, Trajectoire};

//! src/app/etat.rs
//!
//! État UI (sans vue, sans calcul).
//!
//! Rôle : contenir l’état de l’explorateur (entrées, rapport du dernier lot,
//! sélection, erreur) et offrir des opérations simples sans logique d’affichage.
//!
//! Contrats :
//! - Aucun calcul ici : le noyau est appelé depuis vue.rs.
//! - Les champs texte sont découpés ici (listes), les valeurs invalides
//!   restent au noyau qui les signale et les retire.
//! - Bornes sur la saisie (chiffres par ligne).

use explorateur_chiffres::noyau::RapportLot;

/// Entrées de départ : π en base 10 sur 1000 chiffres.
const EXPRESSIONS_DEFAUT: &str = "pi";
const BASES_DEFAUT: &str = "10";
const NB_CHIFFRES_DEFAUT: &str = "1000";

/// Garde-fou sur l’affichage du bloc.
const PAR_LIGNE_MAX: usize = 400;

#[derive(Clone, Debug)]
pub struct AppChiffres {
    // --- entrées utilisateur ---
    pub expressions: String, // séparées par ';' ou retour ligne
    pub bases: String,       // ex: "2, 10, 16"
    pub nb_chiffres: String, // ex: "100 1000"
    pub chiffres_par_ligne: usize,

    // --- sorties ---
    pub rapport: Option<RapportLot>,
    pub selection: usize,
    pub erreur: String,
    pub message: String, // retour de sauvegarde

    // --- UX ---
    pub focus_entree: bool,
}

impl Default for AppChiffres {
    fn default() -> Self {
        Self {
            expressions: EXPRESSIONS_DEFAUT.to_string(),
            bases: BASES_DEFAUT.to_string(),
            nb_chiffres: NB_CHIFFRES_DEFAUT.to_string(),
            chiffres_par_ligne: explorateur_chiffres::noyau::reglages::CHIFFRES_PAR_LIGNE,
            rapport: None,
            selection: 0,
            erreur: String::new(),
            message: String::new(),
            focus_entree: true,
        }
    }
}

impl AppChiffres {
    /* ------------------------ Actions “boutons” (état seulement) ------------------------ */

    /// AC : remise à zéro totale (entrées par défaut + résultats effacés).
    pub fn reset_total(&mut self) {
        *self = Self::default();
    }

    /// C : effacer seulement les expressions.
    pub fn clear_entree(&mut self) {
        self.expressions.clear();
        self.focus_entree = true;
    }

    /// CLR : effacer rapport + erreur + message (sans toucher aux entrées).
    pub fn clear_resultats(&mut self) {
        self.rapport = None;
        self.selection = 0;
        self.erreur.clear();
        self.message.clear();
        self.focus_entree = true;
    }

    /// Erreur de saisie : le dernier rapport est conservé.
    pub fn set_erreur(&mut self, msg: impl Into<String>) {
        self.erreur = msg.into();
        self.message.clear();
        self.focus_entree = true;
    }

    pub fn set_rapport(&mut self, rapport: RapportLot) {
        self.erreur.clear();
        self.message.clear();
        // premier succès sélectionné d’office
        self.selection = rapport
            .resultats
            .iter()
            .position(|r| r.resultat.is_ok())
            .unwrap_or(0);
        self.rapport = Some(rapport);
        self.focus_entree = true;
    }

    pub fn set_chiffres_par_ligne(&mut self, n: usize) {
        self.chiffres_par_ligne = n.clamp(1, PAR_LIGNE_MAX);
    }

    /* ------------------------ Lecture des champs ------------------------ */

    pub fn liste_expressions(&self) -> Vec<String> {
        self.expressions
            .split([';', '\n'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn liste_bases(&self) -> Result<Vec<u32>, String> {
        lire_entiers(&self.bases, "base")
    }

    pub fn liste_nb_chiffres(&self) -> Result<Vec<usize>, String> {
        lire_entiers(&self.nb_chiffres, "nombre de chiffres")
    }
}

/// "2, 10 16" -> [2, 10, 16]. Un morceau illisible est une erreur de saisie.
fn lire_entiers<T: std::str::FromStr>(texte: &str, quoi: &str) -> Result<Vec<T>, String> {
    let mut out = Vec::new();
    for morceau in texte
        .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .filter(|s| !s.is_empty())
    {
        let v = morceau
            .parse::<T>()
            .map_err(|_| format!("{quoi} illisible : {morceau:?}"))?;
        out.push(v);
    }
    if out.is_empty() {
        return Err(format!("{quoi} : liste vide"));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listes_lues() {
        let mut app = AppChiffres::default();
        app.expressions = "pi; e\n sqrt(2) ;;".to_string();
        app.bases = "2, 10  16".to_string();
        app.nb_chiffres = "100".to_string();

        assert_eq!(app.liste_expressions(), vec!["pi", "e", "sqrt(2)"]);
        assert_eq!(app.liste_bases(), Ok(vec![2, 10, 16]));
        assert_eq!(app.liste_nb_chiffres(), Ok(vec![100]));
    }

    #[test]
    fn saisie_illisible() {
        let mut app = AppChiffres::default();
        app.bases = "10, -3".to_string();
        assert!(app.liste_bases().unwrap_err().contains("illisible"));
        app.nb_chiffres = " ".to_string();
        assert!(app.liste_nb_chiffres().unwrap_err().contains("vide"));
    }

    #[test]
    fn bornes_et_remise_a_zero() {
        let mut app = AppChiffres::default();
        app.set_chiffres_par_ligne(0);
        assert_eq!(app.chiffres_par_ligne, 1);
        app.set_chiffres_par_ligne(10_000);
        assert_eq!(app.chiffres_par_ligne, PAR_LIGNE_MAX);

        app.expressions = "e".into();
        app.reset_total();
        assert_eq!(app.expressions, EXPRESSIONS_DEFAUT);
        assert!(app.rapport.is_none());
    }
}

//! Réglages du noyau (valeurs par défaut + garde-fous).

/// Précision de la première passe : assez pour connaître l’ordre de grandeur.
pub const PRECISION_GROSSIERE: usize = 15;

/// Chiffres décimaux de garde ajoutés par le noyau à virgule fixe.
pub const CHIFFRES_GARDE: usize = 20;

/// Largeur d’une ligne du bloc de chiffres.
pub const CHIFFRES_PAR_LIGNE: usize = 100;

/// Garde-fou : plafond du nombre de chiffres demandés (anti-gel).
pub const CHIFFRES_MAX: usize = 1_000_000;

/// Garde-fou : plafond d’un exposant entier (x**n exact).
pub const EXPOSANT_MAX: u64 = 1_000_000;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reglages {
    pub precision_grossiere: usize,
    pub chiffres_garde: usize,
    pub chiffres_par_ligne: usize,
    pub chiffres_max: usize,
    pub exposant_max: u64,
}

impl Default for Reglages {
    fn default() -> Self {
        Self {
            precision_grossiere: PRECISION_GROSSIERE,
            chiffres_garde: CHIFFRES_GARDE,
            chiffres_par_ligne: CHIFFRES_PAR_LIGNE,
            chiffres_max: CHIFFRES_MAX,
            exposant_max: EXPOSANT_MAX,
        }
    }
}

impl Reglages {
    /// Ligne vide ou nulle : on retombe sur la largeur par défaut.
    pub fn avec_chiffres_par_ligne(mut self, n: usize) -> Self {
        self.chiffres_par_ligne = if n == 0 { CHIFFRES_PAR_LIGNE } else { n };
        self
    }
}

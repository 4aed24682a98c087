// src/noyau/lot.rs
//
// Traitement par lot : expressions × bases × nombres de chiffres.
//
// - bases < 2 et nombres de chiffres hors [1, max] : signalés puis retirés
//   avant tout calcul
// - une combinaison qui échoue donne une entrée Err (avec son contexte) et
//   n’arrête pas les autres

use tracing::{error, info, warn};

use super::chiffres::{extract_digits_avec, verifier_base, verifier_nb_chiffres, Extraction};
use super::erreur::{ErreurChiffres, Resultat};
use super::format::format_bloc;
use super::reglages::Reglages;
use super::trajectoire::{map_to_trajectory, Trajectoire};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Combinaison {
    pub expression: String,
    pub base: u32,
    pub nb_chiffres: usize,
}

#[derive(Clone, Debug)]
pub struct Succes {
    pub extraction: Extraction,
    /// Bloc lisible, `Reglages::chiffres_par_ligne` chiffres par ligne.
    pub bloc: String,
    pub trajectoire: Trajectoire,
}

#[derive(Clone, Debug)]
pub struct ResultatCombinaison {
    pub combinaison: Combinaison,
    pub resultat: Resultat<Succes>,
}

#[derive(Clone, Debug, Default)]
pub struct RapportLot {
    /// Valeurs retirées avant calcul (base ou nombre de chiffres invalide).
    pub rejets: Vec<ErreurChiffres>,
    pub resultats: Vec<ResultatCombinaison>,
}

impl RapportLot {
    pub fn nb_succes(&self) -> usize {
        self.resultats.iter().filter(|r| r.resultat.is_ok()).count()
    }

    pub fn nb_echecs(&self) -> usize {
        self.resultats.len() - self.nb_succes()
    }
}

/// Garde les bases valides, renvoie les erreurs des autres.
pub fn filtrer_bases(bases: &[u32]) -> (Vec<u32>, Vec<ErreurChiffres>) {
    let mut gardees = Vec::new();
    let mut rejets = Vec::new();
    for &b in bases {
        match verifier_base(b) {
            Ok(()) => gardees.push(b),
            Err(e) => {
                warn!(base = b, "base ignorée : {e}");
                rejets.push(e);
            }
        }
    }
    (gardees, rejets)
}

pub fn filtrer_nb_chiffres(
    nbs: &[usize],
    reglages: &Reglages,
) -> (Vec<usize>, Vec<ErreurChiffres>) {
    let mut gardes = Vec::new();
    let mut rejets = Vec::new();
    for &n in nbs {
        match verifier_nb_chiffres(n, reglages) {
            Ok(()) => gardes.push(n),
            Err(e) => {
                warn!(nb_chiffres = n, "nombre de chiffres ignoré : {e}");
                rejets.push(e);
            }
        }
    }
    (gardes, rejets)
}

/// Une combinaison : extraction puis trajectoire.
pub fn executer_combinaison(reglages: &Reglages, c: &Combinaison) -> Resultat<Succes> {
    let extraction = extract_digits_avec(reglages, &c.expression, c.base, c.nb_chiffres)?;
    let trajectoire = map_to_trajectory(extraction.sequence.chiffres(), c.base)?;
    let bloc = format_bloc(&extraction.sequence, reglages.chiffres_par_ligne);
    Ok(Succes {
        extraction,
        bloc,
        trajectoire,
    })
}

pub fn executer_lot(
    reglages: &Reglages,
    expressions: &[String],
    bases: &[u32],
    nb_chiffres: &[usize],
) -> RapportLot {
    let (bases, mut rejets) = filtrer_bases(bases);
    let (nbs, rejets_nb) = filtrer_nb_chiffres(nb_chiffres, reglages);
    rejets.extend(rejets_nb);

    let mut resultats = Vec::new();

    for expression in expressions {
        for &base in &bases {
            for &nb in &nbs {
                let combinaison = Combinaison {
                    expression: expression.clone(),
                    base,
                    nb_chiffres: nb,
                };
                let resultat = executer_combinaison(reglages, &combinaison);

                match &resultat {
                    Ok(_) => info!(expression = %expression, base, nb, "combinaison calculée"),
                    Err(e) => error!(expression = %expression, base, nb, "combinaison ignorée : {e}"),
                }

                resultats.push(ResultatCombinaison {
                    combinaison,
                    resultat,
                });
            }
        }
    }

    RapportLot { rejets, resultats }
}

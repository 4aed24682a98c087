// src/noyau/chiffres.rs
//
// Planification de précision + extraction de chiffres en base quelconque.
//
// Deux passes : la précision nécessaire dépend de l’ordre de grandeur du
// résultat, inconnu avant une première évaluation grossière.
//
// 1) évaluation grossière (15 chiffres significatifs)
// 2) nb10 = ceil(N·log10(base))
// 3) décalage = floor(log10|x|) + 1 (0 sur [0.1, 1), négatif en dessous)
// 4) réévaluation à nb10 + décalage chiffres significatifs
// 5) partie fractionnaire de |x| -> N chiffres en base `base`
//
// Les derniers chiffres d’une longue suite peuvent être faux : la valeur est
// tronquée à la précision de travail, la conversion ne peut pas faire mieux.
// Une expression purement rationnelle (sans pas transcendant) est convertie
// depuis sa valeur exacte.

use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive, Zero};
use tracing::debug;

use super::erreur::{ErreurChiffres, Resultat};
use super::eval::{evaluate_detaille, Evaluation};
use super::reel::Reel;
use super::reglages::Reglages;

/// Suite de chiffres (partie fractionnaire, poids fort en tête), chacun dans [0, base).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SequenceChiffres {
    base: u32,
    chiffres: Vec<u32>,
}

impl SequenceChiffres {
    /// Construction vérifiée : chaque chiffre doit être dans [0, base).
    pub fn nouvelle(base: u32, chiffres: Vec<u32>) -> Resultat<Self> {
        verifier_base(base)?;
        if let Some((position, &chiffre)) = chiffres.iter().enumerate().find(|(_, &c)| c >= base) {
            return Err(ErreurChiffres::ChiffreInvalide {
                chiffre,
                base,
                position,
            });
        }
        Ok(Self { base, chiffres })
    }

    pub fn base(&self) -> u32 {
        self.base
    }

    pub fn chiffres(&self) -> &[u32] {
        &self.chiffres
    }

    pub fn len(&self) -> usize {
        self.chiffres.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chiffres.is_empty()
    }
}

/// Plan de précision d’une extraction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlanPrecision {
    pub valeur_grossiere: Reel,
    pub nb_chiffres_base10: usize,
    pub decalage: i64,
    pub precision_finale: usize,
}

/// Résultat complet (séquence + contexte pour l’affichage).
#[derive(Clone, Debug)]
pub struct Extraction {
    pub sequence: SequenceChiffres,
    pub plan: PlanPrecision,
    pub valeur: Reel,
    pub partie_imaginaire_ecartee: bool,
}

/* ------------------------ Validation ------------------------ */

pub fn verifier_base(base: u32) -> Resultat<()> {
    if base < 2 {
        return Err(ErreurChiffres::BaseInvalide(base));
    }
    Ok(())
}

pub fn verifier_nb_chiffres(nb: usize, reglages: &Reglages) -> Resultat<()> {
    if nb == 0 || nb > reglages.chiffres_max {
        return Err(ErreurChiffres::NombreChiffresInvalide {
            nb,
            max: reglages.chiffres_max,
        });
    }
    Ok(())
}

/* ------------------------ Plan ------------------------ */

/// ceil(nb·log10(base)) : chiffres décimaux portant autant d’information
/// que `nb` chiffres en base `base`.
pub fn nb_chiffres_base10(nb: usize, base: u32) -> usize {
    (nb as f64 * (base as f64).log10()).ceil() as usize
}

/// Décalage d’ordre de grandeur : chiffres de la partie entière si |x| ≥ 1,
/// 0 sur [0.1, 1), moins le nombre de zéros après la virgule en dessous.
pub fn decalage(valeur: &Reel) -> i64 {
    valeur.ordre_grandeur()
}

pub fn planifier(
    expr: &str,
    base: u32,
    nb: usize,
    reglages: &Reglages,
) -> Resultat<PlanPrecision> {
    let grossiere = evaluate_detaille(expr, reglages.precision_grossiere, reglages)?;
    Ok(plan_depuis(grossiere.valeur, base, nb))
}

fn plan_depuis(valeur_grossiere: Reel, base: u32, nb: usize) -> PlanPrecision {
    let nb10 = nb_chiffres_base10(nb, base);
    let decalage = decalage(&valeur_grossiere);
    let precision_finale = (nb10 as i64 + decalage).max(1) as usize;

    PlanPrecision {
        valeur_grossiere,
        nb_chiffres_base10: nb10,
        decalage,
        precision_finale,
    }
}

/* ------------------------ Extraction ------------------------ */

/// `extractDigits(expr, base, nb)` avec les réglages par défaut.
pub fn extract_digits(expr: &str, base: u32, nb: usize) -> Resultat<SequenceChiffres> {
    extract_digits_avec(&Reglages::default(), expr, base, nb).map(|e| e.sequence)
}

pub fn extract_digits_avec(
    reglages: &Reglages,
    expr: &str,
    base: u32,
    nb: usize,
) -> Resultat<Extraction> {
    verifier_base(base)?;
    verifier_nb_chiffres(nb, reglages)?;

    let plan = planifier(expr, base, nb, reglages)?;
    debug!(
        expression = expr,
        base,
        nb,
        nb10 = plan.nb_chiffres_base10,
        decalage = plan.decalage,
        precision = plan.precision_finale,
        "plan de précision"
    );

    let Evaluation {
        valeur,
        partie_imaginaire_ecartee,
        exacte,
        ..
    } = evaluate_detaille(expr, plan.precision_finale, reglages)?;

    let chiffres = match exacte {
        Some(r) => {
            let r = r.abs();
            let num = r.numer() % r.denom();
            conversion_radix(num, r.denom(), base, nb)
        }
        None => chiffres_en_base(&valeur, base, nb),
    };

    Ok(Extraction {
        sequence: SequenceChiffres { base, chiffres },
        plan,
        valeur,
        partie_imaginaire_ecartee,
    })
}

/// Chiffres de la partie fractionnaire de |valeur| en base `base`.
pub fn chiffres_en_base(valeur: &Reel, base: u32, nb: usize) -> Vec<u32> {
    if base == 10 {
        // Chemin direct : décimales de l’écriture, complétées par des zéros.
        let mut chiffres: Vec<u32> = valeur
            .decimales()
            .bytes()
            .take(nb)
            .map(|c| u32::from(c - b'0'))
            .collect();
        chiffres.resize(nb, 0);
        return chiffres;
    }

    let (num, den) = valeur.fraction_abs();
    conversion_radix(num, &den, base, nb)
}

/// Conversion de num/den ∈ [0, 1) : multiplier par la base, garder la partie
/// entière, recommencer. On avance par paquets de c chiffres (base^c tient
/// dans un u64), ce qui donne exactement les mêmes chiffres.
fn conversion_radix(mut num: BigInt, den: &BigInt, base: u32, nb: usize) -> Vec<u32> {
    let paquet = chiffres_par_paquet(base);
    let mut chiffres = Vec::with_capacity(nb);

    while chiffres.len() < nb {
        if num.is_zero() {
            chiffres.resize(nb, 0);
            break;
        }

        let c = paquet.min(nb - chiffres.len());
        let facteur = BigInt::from(base).pow(c as u32);
        num *= facteur;
        let q = &num / den;
        num -= &q * den;

        // q < base^c ≤ u64::MAX
        let mut q = q.to_u64().unwrap_or(0);
        let debut = chiffres.len();
        chiffres.resize(debut + c, 0);
        for i in (0..c).rev() {
            chiffres[debut + i] = (q % base as u64) as u32;
            q /= base as u64;
        }
    }

    chiffres
}

/// Plus grand c tel que base^c tienne dans un u64.
fn chiffres_par_paquet(base: u32) -> usize {
    let mut c = 1;
    let mut p = base as u64;
    while let Some(suivant) = p.checked_mul(base as u64) {
        p = suivant;
        c += 1;
    }
    c
}

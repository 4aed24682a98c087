// src/noyau/constantes.rs
//
// Constantes en virgule fixe binaire (x·2^bits, tronqué) + cache.
//
// - π      : Machin, π = 16·atan(1/5) - 4·atan(1/239)
// - e      : Σ 1/k!
// - φ      : (1 + √5)/2
// - ln2    : 18·atanh(1/26) - 2·atanh(1/4801) + 8·atanh(1/8749)
// - ln10   : 3·ln2 + 2·atanh(1/9)
// - degré  : π/180
// - γ      : Brent–McMillan (B1)
// - Catalan: π/8·ln(2+√3) + 3/8·Σ 1/((2k+1)²·C(2k,k))
// - Apéry  : ζ(3) = 5/2·Σ (-1)^(k-1) / (k³·C(2k,k))
//
// Toutes les séries n’utilisent que des divisions par de petits entiers.

use num_bigint::BigInt;
use num_traits::Zero;
use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

use super::environnement::Constante;
use super::fixe::{self, GARDE_BITS};

/* ------------------------ Séries arctan / atanh de 1/q ------------------------ */

/// atan(1/q)·2^w (alternée) ou atanh(1/q)·2^w.
fn serie_inv_q(q: u64, w: u64, alternee: bool) -> BigInt {
    let q2 = q * q;
    let mut puissance = fixe::un(w) / q;
    let mut somme = puissance.clone();
    let mut k: u64 = 1;

    loop {
        puissance /= q2;
        if puissance.is_zero() {
            break;
        }
        let terme = &puissance / (2 * k + 1);
        if alternee && k % 2 == 1 {
            somme -= terme;
        } else {
            somme += terme;
        }
        k += 1;
    }

    somme
}

fn atan_inv(q: u64, w: u64) -> BigInt {
    serie_inv_q(q, w, true)
}

fn atanh_inv(q: u64, w: u64) -> BigInt {
    serie_inv_q(q, w, false)
}

/* ------------------------ Calculs ------------------------ */

fn pi_calcul(w: u64) -> BigInt {
    atan_inv(5, w) * 16 - atan_inv(239, w) * 4
}

fn e_calcul(w: u64) -> BigInt {
    let mut terme = fixe::un(w);
    let mut somme = terme.clone();
    let mut k: u64 = 1;
    loop {
        terme /= k;
        if terme.is_zero() {
            break;
        }
        somme += &terme;
        k += 1;
    }
    somme
}

fn phi_calcul(w: u64) -> BigInt {
    let racine5 = fixe::racine(&(BigInt::from(5) << w), w);
    (fixe::un(w) + racine5) >> 1u32
}

fn ln2_calcul(w: u64) -> BigInt {
    atanh_inv(26, w) * 18 - atanh_inv(4801, w) * 2 + atanh_inv(8749, w) * 8
}

fn ln10_calcul(w: u64) -> Result<BigInt, String> {
    Ok(valeur(Constante::Ln2, w)? * 3 + atanh_inv(9, w) * 2)
}

fn degre_calcul(w: u64) -> Result<BigInt, String> {
    Ok(valeur(Constante::Pi, w)? / 180u32)
}

/// Brent–McMillan : γ = U/V, avec n tel que e^(-4n) < 2^-w.
fn euler_calcul(w: u64) -> Result<BigInt, String> {
    let n = ((w as f64) * std::f64::consts::LN_2 / 4.0).ceil() as u64 + 1;
    let nb_termes = (3.5912 * n as f64).ceil() as u64 + 1;
    let n2 = n * n;

    let ln_n = fixe::ln(&(BigInt::from(n) << w), w)?;
    let mut a = -ln_n;
    let mut b = fixe::un(w);
    let mut u = a.clone();
    let mut v = b.clone();

    for k in 1..=nb_termes {
        b = b * n2 / (k * k);
        a = (a * n2 / k + &b) / k;
        u += &a;
        v += &b;
    }

    fixe::div(&u, &v, w)
}

fn catalan_calcul(w: u64) -> Result<BigInt, String> {
    // Σ t_k/(2k+1)², t_0 = 1, t_(k+1) = t_k·(k+1)/(2(2k+1))
    let mut t = fixe::un(w);
    let mut somme = BigInt::zero();
    let mut k: u64 = 0;
    while !t.is_zero() {
        somme += &t / ((2 * k + 1) * (2 * k + 1));
        t = t * (k + 1) / (2 * (2 * k + 1));
        k += 1;
    }

    let deux_plus_racine3 = (BigInt::from(2) << w) + fixe::racine(&(BigInt::from(3) << w), w);
    let l = fixe::ln(&deux_plus_racine3, w)?;
    let pi = valeur(Constante::Pi, w)?;
    Ok(fixe::mul(&pi, &l, w) / 8u32 + somme * 3 / 8u32)
}

fn apery_calcul(w: u64) -> BigInt {
    // u_k = 1/C(2k,k) : u_1 = 1/2, u_(k+1) = u_k·(k+1)/(2(2k+1))
    let mut u = fixe::un(w) / 2u32;
    let mut somme = BigInt::zero();
    let mut k: u64 = 1;
    while !u.is_zero() {
        let terme = &u / (k * k * k);
        if k % 2 == 1 {
            somme += terme;
        } else {
            somme -= terme;
        }
        u = u * (k + 1) / (2 * (2 * k + 1));
        k += 1;
    }
    somme * 5 / 2u32
}

fn calculer(c: Constante, w: u64) -> Result<BigInt, String> {
    Ok(match c {
        Constante::Pi => pi_calcul(w),
        Constante::E => e_calcul(w),
        Constante::Phi => phi_calcul(w),
        Constante::Ln2 => ln2_calcul(w),
        Constante::Ln10 => ln10_calcul(w)?,
        Constante::Degree => degre_calcul(w)?,
        Constante::Euler => euler_calcul(w)?,
        Constante::Catalan => catalan_calcul(w)?,
        Constante::Apery => apery_calcul(w),
    })
}

/* ------------------------ Cache ------------------------ */

/// Par constante : la valeur la plus précise déjà calculée (bits, valeur).
/// Une précision inférieure s’obtient par simple troncature.
static CACHE: OnceLock<Mutex<HashMap<Constante, (u64, BigInt)>>> = OnceLock::new();

fn cache() -> &'static Mutex<HashMap<Constante, (u64, BigInt)>> {
    CACHE.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Valeur de `c` en virgule fixe à `bits` bits (tronquée).
pub fn valeur(c: Constante, bits: u64) -> Result<BigInt, String> {
    {
        let guard = cache().lock().unwrap_or_else(|e| e.into_inner());
        if let Some((b, v)) = guard.get(&c) {
            if *b >= bits {
                return Ok(v >> (*b - bits));
            }
        }
    }

    // Calcul hors verrou : γ et Catalan rappellent valeur() (ln2, π).
    let w = bits + GARDE_BITS;
    let v = calculer(c, w)? >> GARDE_BITS;

    let mut guard = cache().lock().unwrap_or_else(|e| e.into_inner());
    let plus_precis = guard.get(&c).map_or(true, |(b, _)| *b < bits);
    if plus_precis {
        guard.insert(c, (bits, v.clone()));
    }
    Ok(v)
}

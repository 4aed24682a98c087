// src/noyau/reel.rs
//
// Réel à précision arbitraire, côté décimal.
//
// valeur = mantisse · 10^(-echelle), mantisse tronquée (vers 0) à `precision`
// chiffres significatifs. L’échelle peut être négative pour les grands nombres
// (2.2e4 à 2 chiffres => mantisse 22, echelle -3).
//
// Un Reel ne change jamais de précision : une autre précision = une nouvelle
// évaluation de l’expression source.

use num_bigint::BigInt;
use num_traits::{Signed, Zero};

use std::fmt;

fn pow10(n: usize) -> BigInt {
    BigInt::from(10).pow(n as u32)
}

/// Nombre de chiffres décimaux de |x| (0 pour 0).
pub fn nb_chiffres(x: &BigInt) -> usize {
    if x.is_zero() {
        return 0;
    }
    let a = x.abs();
    let b = a.bits();

    // |x| ∈ [2^(b-1), 2^b) : estimation puis ajustement exact
    let mut d = ((b - 1) as f64 * std::f64::consts::LOG10_2) as usize + 1;
    while d > 1 && pow10(d - 1) > a {
        d -= 1;
    }
    while pow10(d) <= a {
        d += 1;
    }
    d
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reel {
    mantisse: BigInt,
    echelle: i64,
    precision: usize,
}

impl Reel {
    pub fn zero(precision: usize) -> Self {
        Self {
            mantisse: BigInt::zero(),
            echelle: 0,
            precision,
        }
    }

    /// Construit depuis d·10^(-echelle) calculé avec des chiffres de garde :
    /// arrondi au plus proche à precision + garde/2 chiffres (absorbe le bruit
    /// des derniers ulps), puis troncature à `precision` chiffres significatifs.
    pub fn depuis_decimal(d: BigInt, echelle: i64, precision: usize, garde: usize) -> Self {
        let precision = precision.max(1);
        if d.is_zero() {
            return Self::zero(precision);
        }

        let mut m = d;
        let mut e = echelle;

        // garde < 2 : troncature seule
        let cible = precision + garde / 2;
        let k = nb_chiffres(&m);
        if garde >= 2 && k > cible {
            let j = k - cible;
            let p = pow10(j);
            let demi = &p / 2u32;
            let neg = m.is_negative();
            let q = (m.abs() + demi) / p;
            m = if neg { -q } else { q };
            e -= j as i64;
        }

        let k = nb_chiffres(&m);
        if k > precision {
            let j = k - precision;
            m /= pow10(j);
            e -= j as i64;
        }

        Self {
            mantisse: m,
            echelle: e,
            precision,
        }
    }

    pub fn precision(&self) -> usize {
        self.precision
    }

    pub fn mantisse(&self) -> &BigInt {
        &self.mantisse
    }

    pub fn echelle(&self) -> i64 {
        self.echelle
    }

    pub fn est_zero(&self) -> bool {
        self.mantisse.is_zero()
    }

    pub fn est_negatif(&self) -> bool {
        self.mantisse.is_negative()
    }

    /// floor(log10|x|) + 1 : chiffres de la partie entière si |x| ≥ 1,
    /// 0 sur [0.1, 1), moins le nombre de zéros après la virgule en dessous.
    /// Vaut 0 pour x = 0.
    pub fn ordre_grandeur(&self) -> i64 {
        if self.est_zero() {
            return 0;
        }
        nb_chiffres(&self.mantisse) as i64 - self.echelle
    }

    pub fn partie_entiere_abs(&self) -> BigInt {
        let a = self.mantisse.abs();
        if self.echelle <= 0 {
            a * pow10((-self.echelle) as usize)
        } else {
            a / pow10(self.echelle as usize)
        }
    }

    /// Partie fractionnaire de |x|, exacte : (numérateur, dénominateur = 10^echelle).
    pub fn fraction_abs(&self) -> (BigInt, BigInt) {
        if self.echelle <= 0 {
            return (BigInt::zero(), BigInt::from(1));
        }
        let den = pow10(self.echelle as usize);
        (self.mantisse.abs() % &den, den)
    }

    /// Chiffres décimaux après la virgule de |x|, zéros finaux élidés
    /// ("" si la partie fractionnaire est nulle).
    pub fn decimales(&self) -> String {
        if self.echelle <= 0 || self.est_zero() {
            return String::new();
        }
        let e = self.echelle as usize;
        let mut s = self.mantisse.abs().to_str_radix(10);
        if s.len() < e {
            s.insert_str(0, &"0".repeat(e - s.len()));
        }
        let frac = &s[s.len() - e..];
        frac.trim_end_matches('0').to_string()
    }

    /// Approximation flottante (affichage, ordre de grandeur).
    pub fn to_f64(&self) -> f64 {
        format!("{}e{}", self.mantisse, -self.echelle)
            .parse::<f64>()
            .unwrap_or(f64::NAN)
    }
}

/// Écriture positionnelle : "-3.1415", "0.5", "22000.0".
impl fmt::Display for Reel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.est_negatif() {
            f.write_str("-")?;
        }
        let dec = self.decimales();
        let dec = if dec.is_empty() { "0" } else { dec.as_str() };
        write!(f, "{}.{}", self.partie_entiere_abs(), dec)
    }
}

// src/noyau/fixe.rs
//
// Virgule fixe binaire : un réel x est porté par l’entier x·2^bits tronqué vers 0.
//
// Toutes les fonctions prennent `bits` en paramètre (aucune précision globale).
// Chaque fonction transcendante travaille en interne avec des bits de garde puis
// revient à `bits` par troncature : l’erreur finale reste de quelques ulps.
//
// Réductions d’argument :
// - exp  : x = n·ln2 + r, r / 2^s, Taylor, puis s élévations au carré
// - ln   : x = m·2^k, s racines carrées, série atanh
// - trig : x = n·π/2 + r, r / 2^s, Taylor sin+cos, s duplications, quadrant
// - atan : s demi-angles a / (1 + √(1+a²)), série alternée

use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

use super::constantes;
use super::environnement::Constante;

/// Bits de garde ajoutés par chaque fonction.
pub const GARDE_BITS: u64 = 32;

/// Garde-fou : taille (en bits) d’un résultat de exp (≈ 1,2 million de chiffres).
const EXP_BITS_MAX: u64 = 4_000_000;

/* ------------------------ Base ------------------------ */

pub fn un(bits: u64) -> BigInt {
    BigInt::one() << bits
}

/// x >> n, tronqué vers 0 (>> seul arrondit vers -∞ pour les négatifs).
pub fn tronquer(x: BigInt, n: u64) -> BigInt {
    if x.is_negative() {
        -((-x) >> n)
    } else {
        x >> n
    }
}

pub fn changer_echelle(x: &BigInt, de: u64, vers: u64) -> BigInt {
    if vers >= de {
        x << (vers - de)
    } else {
        tronquer(x.clone(), de - vers)
    }
}

pub fn depuis_rationnel(r: &BigRational, bits: u64) -> BigInt {
    (r.numer() << bits) / r.denom()
}

pub fn mul(a: &BigInt, b: &BigInt, bits: u64) -> BigInt {
    tronquer(a * b, bits)
}

pub fn div(a: &BigInt, b: &BigInt, bits: u64) -> Result<BigInt, String> {
    if b.is_zero() {
        return Err("division par zéro".into());
    }
    Ok((a << bits) / b)
}

/// √x pour x ≥ 0 (un x négatif donne 0 : le domaine est traité par l’appelant).
pub fn racine(x: &BigInt, bits: u64) -> BigInt {
    if !x.is_positive() {
        return BigInt::zero();
    }
    (x << bits).sqrt()
}

/// Estimation flottante (ordre de grandeur, plans de garde).
pub fn vers_f64(x: &BigInt, bits: u64) -> f64 {
    let n = x.bits();
    if n <= 64 {
        let v = x.to_f64().unwrap_or(0.0);
        return v * 2f64.powi(-(bits.min(i32::MAX as u64) as i32));
    }
    let haut = (x >> (n - 64)).to_f64().unwrap_or(0.0);
    let e = (n - 64) as i64 - bits as i64;
    haut * 2f64.powi(e.clamp(i32::MIN as i64, i32::MAX as i64) as i32)
}

/// Nombre de réductions : ~√bits / 2 (compromis série / réductions).
fn nb_reductions(bits: u64) -> u64 {
    (((bits as f64).sqrt() / 2.0) as u64).clamp(2, 400)
}

/// |x| ≤ 1 en virgule fixe ?
fn au_plus_un(x: &BigInt, bits: u64) -> bool {
    x.abs() <= un(bits)
}

/* ------------------------ exp / ln ------------------------ */

pub fn exp(x: &BigInt, bits: u64) -> Result<BigInt, String> {
    if x.is_zero() {
        return Ok(un(bits));
    }

    // n ≈ x / ln2 : borne la taille du résultat avant tout calcul lourd
    let estimation = vers_f64(x, bits) / std::f64::consts::LN_2;
    if estimation > EXP_BITS_MAX as f64 {
        return Err("exp : dépassement de capacité".into());
    }
    if estimation < -((bits + 2 * GARDE_BITS) as f64) {
        // exp(x) < 2^-bits : tronqué, c’est exactement 0
        return Ok(BigInt::zero());
    }

    let s = nb_reductions(bits);
    let n_max = estimation.max(0.0).ceil() as u64 + 2;
    let w = bits + GARDE_BITS + s + n_max + 64 - n_max.leading_zeros() as u64;

    let xw = changer_echelle(x, bits, w);
    let ln2 = constantes::valeur(Constante::Ln2, w)?;

    // n = arrondi(x / ln2), r = x - n·ln2, |r| ≤ ln2/2
    let n = Integer::div_floor(&((&xw << 1u32) + &ln2), &(&ln2 << 1u32));
    let r = &xw - &n * &ln2;
    let n = n.to_i64().ok_or("exp : dépassement de capacité")?;

    let r = tronquer(r, s);
    let mut terme = un(w);
    let mut somme = un(w);
    let mut k: u64 = 1;
    loop {
        terme = mul(&terme, &r, w) / k;
        if terme.is_zero() {
            break;
        }
        somme += &terme;
        k += 1;
    }

    for _ in 0..s {
        somme = mul(&somme, &somme, w);
    }

    // résultat = somme·2^n, ramené de w à bits
    let decalage = n - (w - bits) as i64;
    Ok(if decalage >= 0 {
        somme << decalage as u64
    } else {
        tronquer(somme, (-decalage) as u64)
    })
}

pub fn ln(x: &BigInt, bits: u64) -> Result<BigInt, String> {
    if !x.is_positive() {
        return Err("ln : argument nul".into());
    }

    let s = nb_reductions(bits);
    let w = bits + GARDE_BITS + s;
    let xw = changer_echelle(x, bits, w);
    if xw.is_zero() {
        return Err("ln : argument nul".into());
    }

    // x = m·2^k avec m ∈ [1/2, 1)
    let k = xw.bits() as i64 - w as i64;
    let mut m = if k >= 0 {
        &xw >> k as u64
    } else {
        &xw << (-k) as u64
    };

    for _ in 0..s {
        m = racine(&m, w);
    }

    // ln m = 2·atanh(z), z = (m-1)/(m+1)
    let u = un(w);
    let z = div(&(&m - &u), &(&m + &u), w)?;
    let z2 = mul(&z, &z, w);
    let mut terme = z.clone();
    let mut somme = z;
    let mut j: u64 = 1;
    loop {
        terme = mul(&terme, &z2, w);
        if terme.is_zero() {
            break;
        }
        somme += &terme / (2 * j + 1);
        j += 1;
    }

    let ln_m = somme << (s + 1);
    let ln2 = constantes::valeur(Constante::Ln2, w)?;
    Ok(tronquer(ln_m + ln2 * k, w - bits))
}

/// x^y pour x > 0, via exp(y·ln x) avec garde proportionnelle à la taille du résultat.
pub fn puissance(x: &BigInt, y: &BigInt, bits: u64) -> Result<BigInt, String> {
    if !x.is_positive() {
        return Err("puissance : base non positive".into());
    }
    let taille = vers_f64(y, bits) * vers_f64(x, bits).log2();
    if taille > EXP_BITS_MAX as f64 {
        return Err("puissance : dépassement de capacité".into());
    }
    let garde_y = vers_f64(y, bits).abs().max(1.0).log2().ceil() as u64;
    let w = bits + GARDE_BITS + garde_y + taille.max(0.0).ceil() as u64;

    let xw = changer_echelle(x, bits, w);
    let yw = changer_echelle(y, bits, w);
    let l = ln(&xw, w)?;
    let r = exp(&mul(&yw, &l, w), w)?;
    Ok(tronquer(r, w - bits))
}

/* ------------------------ Trigonométrie ------------------------ */

/// (sin x, cos x).
pub fn sin_cos(x: &BigInt, bits: u64) -> Result<(BigInt, BigInt), String> {
    let s = nb_reductions(bits);
    let w = bits + GARDE_BITS + 2 * s;

    // π/2 doit couvrir la partie entière de x (sin(1e10) reste exact)
    let partie_entiere = x.bits().saturating_sub(bits);
    let wr = w + partie_entiere;
    let xr = changer_echelle(x, bits, wr);
    let demi_pi = constantes::valeur(Constante::Pi, wr)? >> 1u32;

    let n = Integer::div_floor(&((&xr << 1u32) + &demi_pi), &(&demi_pi << 1u32));
    let r = changer_echelle(&(&xr - &n * &demi_pi), wr, w);
    let quadrant = Integer::mod_floor(&n, &BigInt::from(4))
        .to_u8()
        .unwrap_or(0);

    let r = tronquer(r, s);
    let r2 = mul(&r, &r, w);

    // sin : r - r³/3! + ...
    let mut terme = r.clone();
    let mut sin = r;
    let mut k: u64 = 1;
    loop {
        terme = -(mul(&terme, &r2, w) / ((2 * k) * (2 * k + 1)));
        if terme.is_zero() {
            break;
        }
        sin += &terme;
        k += 1;
    }

    // cos : 1 - r²/2! + ...
    let mut terme = un(w);
    let mut cos = un(w);
    let mut k: u64 = 1;
    loop {
        terme = -(mul(&terme, &r2, w) / ((2 * k - 1) * (2 * k)));
        if terme.is_zero() {
            break;
        }
        cos += &terme;
        k += 1;
    }

    for _ in 0..s {
        let s2 = mul(&sin, &cos, w) << 1u32;
        let c2 = mul(&cos, &cos, w) - mul(&sin, &sin, w);
        sin = s2;
        cos = c2;
    }

    let (sin, cos) = match quadrant {
        1 => (cos, -sin),
        2 => (-sin, -cos),
        3 => (-cos, sin),
        _ => (sin, cos),
    };

    Ok((tronquer(sin, w - bits), tronquer(cos, w - bits)))
}

pub fn tan(x: &BigInt, bits: u64) -> Result<BigInt, String> {
    let w = bits + GARDE_BITS;
    let (s, c) = sin_cos(&changer_echelle(x, bits, w), w)?;
    if c.is_zero() {
        return Err("tan : pôle".into());
    }
    Ok(tronquer(div(&s, &c, w)?, GARDE_BITS))
}

pub fn atan(x: &BigInt, bits: u64) -> Result<BigInt, String> {
    let s = nb_reductions(bits) / 2 + 1;
    let w = bits + GARDE_BITS + s;
    let u = un(w);

    let xw = changer_echelle(x, bits, w);
    let negatif = xw.is_negative();
    let mut a = xw.abs();

    // |x| > 1 : atan(x) = π/2 - atan(1/x)
    let inverse = a > u;
    if inverse {
        a = div(&u, &a, w)?;
    }

    for _ in 0..s {
        let h = &u + racine(&(&u + mul(&a, &a, w)), w);
        a = div(&a, &h, w)?;
    }

    let a2 = mul(&a, &a, w);
    let mut terme = a.clone();
    let mut somme = a;
    let mut k: u64 = 1;
    loop {
        terme = -mul(&terme, &a2, w);
        if terme.is_zero() {
            break;
        }
        somme += &terme / (2 * k + 1);
        k += 1;
    }

    let mut r = somme << s;
    if inverse {
        r = (constantes::valeur(Constante::Pi, w)? >> 1u32) - r;
    }
    if negatif {
        r = -r;
    }
    Ok(tronquer(r, w - bits))
}

/// asin sur [-1, 1].
pub fn asin(x: &BigInt, bits: u64) -> Result<BigInt, String> {
    if !au_plus_un(x, bits) {
        return Err("asin : argument hors de [-1, 1]".into());
    }
    let w = bits + GARDE_BITS;
    let xw = changer_echelle(x, bits, w);
    let u = un(w);

    if xw.abs() == u {
        let demi_pi = constantes::valeur(Constante::Pi, bits)? >> 1u32;
        return Ok(if xw.is_negative() { -demi_pi } else { demi_pi });
    }

    // asin x = atan(x / √(1 - x²))
    let c = racine(&(&u - mul(&xw, &xw, w)), w);
    let t = div(&xw, &c, w)?;
    Ok(tronquer(atan(&t, w)?, GARDE_BITS))
}

/// acos sur [-1, 1].
pub fn acos(x: &BigInt, bits: u64) -> Result<BigInt, String> {
    let demi_pi = constantes::valeur(Constante::Pi, bits)? >> 1u32;
    Ok(demi_pi - asin(x, bits)?)
}

/* ------------------------ Hyperboliques ------------------------ */

/// (e^|x|, e^-|x|), la seconde par division (jamais nulle avant l’inversion).
fn exp_pair(x: &BigInt, bits: u64) -> Result<(BigInt, BigInt), String> {
    let e = exp(&x.abs(), bits)?;
    let inv = div(&un(bits), &e, bits)?;
    Ok((e, inv))
}

pub fn sinh(x: &BigInt, bits: u64) -> Result<BigInt, String> {
    let w = bits + GARDE_BITS;
    let (e, inv) = exp_pair(&changer_echelle(x, bits, w), w)?;
    let r = tronquer((e - inv) >> 1u32, GARDE_BITS);
    Ok(if x.is_negative() { -r } else { r })
}

pub fn cosh(x: &BigInt, bits: u64) -> Result<BigInt, String> {
    let w = bits + GARDE_BITS;
    let (e, inv) = exp_pair(&changer_echelle(x, bits, w), w)?;
    Ok(tronquer((e + inv) >> 1u32, GARDE_BITS))
}

pub fn tanh(x: &BigInt, bits: u64) -> Result<BigInt, String> {
    // |x| grand : tanh = ±(1 - ε), ε sous la résolution
    let seuil = BigInt::from(bits / 2 + 2) << bits;
    let r = if x.abs() > seuil {
        un(bits) - 1u32
    } else {
        let w = bits + GARDE_BITS;
        let u = un(w);
        let e2 = exp(&(changer_echelle(&x.abs(), bits, w) << 1u32), w)?;
        tronquer(div(&(&e2 - &u), &(&e2 + &u), w)?, GARDE_BITS)
    };
    Ok(if x.is_negative() { -r } else { r })
}

pub fn asinh(x: &BigInt, bits: u64) -> Result<BigInt, String> {
    let w = bits + GARDE_BITS;
    let a = changer_echelle(&x.abs(), bits, w);
    let h = &a + racine(&(mul(&a, &a, w) + un(w)), w);
    let r = tronquer(ln(&h, w)?, GARDE_BITS);
    Ok(if x.is_negative() { -r } else { r })
}

/// acosh(|x|) pour |x| ≥ 1 (le signe est traité par l’appelant).
pub fn acosh(x: &BigInt, bits: u64) -> Result<BigInt, String> {
    let w = bits + GARDE_BITS;
    let a = changer_echelle(&x.abs(), bits, w);
    if a < un(w) {
        return Err("acosh : argument < 1".into());
    }
    let h = &a + racine(&(mul(&a, &a, w) - un(w)), w);
    Ok(tronquer(ln(&h, w)?, GARDE_BITS))
}

/// ½·ln|(1+x)/(1-x)| : atanh sur ]-1, 1[, partie réelle au-delà.
pub fn atanh(x: &BigInt, bits: u64) -> Result<BigInt, String> {
    let w = bits + GARDE_BITS;
    let xw = changer_echelle(x, bits, w);
    let u = un(w);
    let num = (&u + &xw).abs();
    let den = (&u - &xw).abs();
    if num.is_zero() || den.is_zero() {
        return Err("atanh : pôle en ±1".into());
    }
    let q = div(&num, &den, w)?;
    Ok(tronquer(ln(&q, w)? >> 1u32, GARDE_BITS))
}

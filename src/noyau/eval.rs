//! Noyau — évaluation (interpréteur d’arbre)
//!
//! tokenize -> analyse (noms résolus) -> Expr -> évaluation à `precision` chiffres
//!
//! - Les sous-arbres de littéraux (+ - * / puissances entières) restent des
//!   rationnels exacts ; le premier pas transcendant passe en virgule fixe.
//! - Un résultat complexe n’est jamais propagé : la partie réelle est gardée
//!   au noeud qui le produit, et un avertissement est émis une fois par évaluation.
//! - Un résultat approché est recalculé avec plus de chiffres jusqu’à ce que
//!   deux passes donnent le même Reel ; un résultat exact est tronqué tel quel.
//! - La précision est un paramètre : aucun état global n’est modifié.

use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};
use tracing::warn;

use super::analyse::analyser;
use super::constantes;
use super::environnement::{Constante, Environnement, Fonction};
use super::erreur::{ErreurChiffres, Resultat};
use super::expr::Expr;
use super::fixe::{self, GARDE_BITS};
use super::jetons::{format_tokens, tokenize};
use super::reel::{nb_chiffres, Reel};
use super::reglages::Reglages;

/// Garde-fou : taille (bits) d’un rationnel exact issu d’une puissance.
const EXACT_BITS_MAX: u64 = 8_000_000;

/// Plafond des chiffres fractionnaires ajoutés d’une passe à l’autre : en
/// dessous de 10^-4096, un résultat approché vaut zéro.
const SUPPLEMENT_MAX: usize = 4096;

/// Supplément minimal entre deux passes.
const CHIFFRES_PAR_PASSE: usize = 20;

#[derive(Clone, Debug)]
pub struct Evaluation {
    pub valeur: Reel,
    /// Vrai si une partie imaginaire a été écartée en cours de route.
    pub partie_imaginaire_ecartee: bool,
    /// Valeur rationnelle exacte quand l’expression n’a aucun pas transcendant.
    pub exacte: Option<BigRational>,
    /// Démarche (affichage) : jetons et arbre.
    pub jetons: String,
    pub arbre: String,
}

/// Lecture seule : jetons + AST, noms résolus dans l’environnement standard.
pub fn analyser_expression(expr_str: &str) -> Resultat<Expr> {
    let jetons = tokenize(expr_str.trim()).map_err(|r| ErreurChiffres::expression(expr_str, r))?;
    analyser(&jetons, Environnement::standard()).map_err(|r| ErreurChiffres::expression(expr_str, r))
}

/// `evaluate(expr, precision)` : valeur tronquée à `precision` chiffres significatifs.
pub fn evaluate(expr_str: &str, precision: usize) -> Resultat<Reel> {
    evaluate_detaille(expr_str, precision, &Reglages::default()).map(|e| e.valeur)
}

pub fn evaluate_detaille(
    expr_str: &str,
    precision: usize,
    reglages: &Reglages,
) -> Resultat<Evaluation> {
    if precision == 0 {
        return Err(ErreurChiffres::NombreChiffresInvalide {
            nb: 0,
            max: reglages.chiffres_max,
        });
    }

    let s = expr_str.trim();
    let jetons = tokenize(s).map_err(|r| ErreurChiffres::expression(expr_str, r))?;
    let arbre =
        analyser(&jetons, Environnement::standard()).map_err(|r| ErreurChiffres::expression(expr_str, r))?;

    let garde = reglages.chiffres_garde;
    let mut supplement: usize = 0;
    let mut precedente: Option<Reel> = None;

    loop {
        let frac = precision + garde + supplement;
        let bits = (frac as f64 * std::f64::consts::LOG2_10).ceil() as u64 + GARDE_BITS;

        let mut ctx = Contexte {
            bits,
            exposant_max: reglages.exposant_max,
            complexe: false,
        };
        let v = ctx
            .eval(&arbre)
            .map_err(|r| ErreurChiffres::expression(expr_str, r))?;

        let (valeur, exacte) = match v {
            Valeur::Exact(r) => (reel_exact(&r, precision), Some(r)),
            Valeur::Approche(x) => {
                let d = fixe::tronquer(x * pow10(frac), bits);
                let k = nb_chiffres(&d);
                let valeur = Reel::depuis_decimal(d, frac as i64, precision, garde);

                // Deux passes successives identiques : les chiffres ne dépendent
                // plus de la précision de travail. Zéro n’est jamais stable.
                let stable = !valeur.est_zero() && precedente.as_ref() == Some(&valeur);
                if !stable && supplement < SUPPLEMENT_MAX {
                    supplement = supplement_suivant(supplement, k, precision + garde);
                    precedente = Some(valeur);
                    continue;
                }
                (valeur, None)
            }
        };

        if ctx.complexe {
            warn!(
                expression = expr_str,
                precision, "résultat complexe : partie imaginaire écartée"
            );
        }

        return Ok(Evaluation {
            valeur,
            partie_imaginaire_ecartee: ctx.complexe,
            exacte,
            jetons: format_tokens(&jetons),
            arbre: arbre.to_string(),
        });
    }
}

/// Chiffres fractionnaires à ajouter pour la passe suivante.
///
/// `k` : chiffres décimaux obtenus à la passe courante, `cible` : chiffres voulus.
/// Un zéro est sondé de plus en plus bas (64, 256, 1024, ...) ; sinon on comble
/// les zéros en tête et on double au moins le supplément, car un petit terme
/// intermédiaire multiplié par un grand perd ses chiffres en virgule fixe.
fn supplement_suivant(supplement: usize, k: usize, cible: usize) -> usize {
    let suivant = if k == 0 {
        if supplement == 0 {
            64
        } else {
            supplement * 4
        }
    } else {
        let manque = cible.saturating_sub(k);
        (supplement + manque)
            .max(supplement * 2)
            .max(supplement + CHIFFRES_PAR_PASSE)
    };
    suivant.min(SUPPLEMENT_MAX)
}

/// Rationnel exact -> Reel tronqué, sans arrondi : la valeur n’a aucun bruit.
/// L’échelle suit l’ordre de grandeur de |r|, si petit soit-il.
fn reel_exact(r: &BigRational, precision: usize) -> Reel {
    if r.is_zero() {
        return Reel::zero(precision);
    }
    // |r| > 10^-(zeros + 1)
    let zeros = nb_chiffres(r.denom()).saturating_sub(nb_chiffres(r.numer()));
    let frac = precision + zeros + 1;
    let d = (r.numer() * pow10(frac)) / r.denom();
    Reel::depuis_decimal(d, frac as i64, precision, 0)
}

fn pow10(n: usize) -> BigInt {
    BigInt::from(10).pow(n as u32)
}

/* ------------------------ Interpréteur ------------------------ */

enum Valeur {
    Exact(BigRational),
    /// Virgule fixe à `Contexte::bits`.
    Approche(BigInt),
}

struct Contexte {
    bits: u64,
    exposant_max: u64,
    complexe: bool,
}

impl Contexte {
    fn approche(&self, v: Valeur) -> BigInt {
        match v {
            Valeur::Exact(r) => fixe::depuis_rationnel(&r, self.bits),
            Valeur::Approche(x) => x,
        }
    }

    /// Partie réelle d’un résultat complexe : on note, on continue.
    fn partie_reelle(&mut self, x: BigInt) -> BigInt {
        self.complexe = true;
        x
    }

    fn eval(&mut self, e: &Expr) -> Result<Valeur, String> {
        use Expr::*;

        Ok(match e {
            Nombre(r) => Valeur::Exact(r.clone()),
            Constante(c) => Valeur::Approche(constantes::valeur(*c, self.bits)?),

            Neg(x) => match self.eval(x)? {
                Valeur::Exact(r) => Valeur::Exact(-r),
                Valeur::Approche(a) => Valeur::Approche(-a),
            },

            Add(a, b) => match (self.eval(a)?, self.eval(b)?) {
                (Valeur::Exact(x), Valeur::Exact(y)) => Valeur::Exact(x + y),
                (x, y) => Valeur::Approche(self.approche(x) + self.approche(y)),
            },

            Sub(a, b) => match (self.eval(a)?, self.eval(b)?) {
                (Valeur::Exact(x), Valeur::Exact(y)) => Valeur::Exact(x - y),
                (x, y) => Valeur::Approche(self.approche(x) - self.approche(y)),
            },

            Mul(a, b) => match (self.eval(a)?, self.eval(b)?) {
                (Valeur::Exact(x), Valeur::Exact(y)) => Valeur::Exact(x * y),
                (x, y) => {
                    let (x, y) = (self.approche(x), self.approche(y));
                    Valeur::Approche(fixe::mul(&x, &y, self.bits))
                }
            },

            Div(a, b) => match (self.eval(a)?, self.eval(b)?) {
                (Valeur::Exact(x), Valeur::Exact(y)) => {
                    if y.is_zero() {
                        return Err("division par zéro".into());
                    }
                    Valeur::Exact(x / y)
                }
                (x, y) => {
                    let (x, y) = (self.approche(x), self.approche(y));
                    Valeur::Approche(fixe::div(&x, &y, self.bits)?)
                }
            },

            Pow(a, b) => {
                let base = self.eval(a)?;
                let exposant = self.eval(b)?;
                self.puissance(base, exposant)?
            }

            Appel(f, x) => {
                let x = self.eval(x)?;
                let x = self.approche(x);
                Valeur::Approche(self.appel(*f, &x)?)
            }
        })
    }

    fn puissance(&mut self, base: Valeur, exposant: Valeur) -> Result<Valeur, String> {
        let bits = self.bits;

        // Exposant entier exact : rationnel exact si la base l’est aussi.
        if let Valeur::Exact(n) = &exposant {
            if n.is_integer() {
                let n = n
                    .to_integer()
                    .to_i64()
                    .filter(|n| n.unsigned_abs() <= self.exposant_max)
                    .ok_or("exposant entier trop grand")?;
                if let Valeur::Exact(r) = &base {
                    return Ok(Valeur::Exact(rational_pow_int(r, n)?));
                }
            }
        }

        let x = self.approche(base);
        let y = self.approche(exposant);

        if x.is_zero() {
            return if y.is_positive() {
                Ok(Valeur::Approche(BigInt::zero()))
            } else if y.is_zero() {
                Ok(Valeur::Approche(fixe::un(bits)))
            } else {
                Err("0 élevé à une puissance négative".into())
            };
        }

        let module = fixe::puissance(&x.abs(), &y, bits)?;
        if x.is_positive() {
            return Ok(Valeur::Approche(module));
        }

        // Base négative : entier => signe (-1)^n, sinon partie réelle |x|^y·cos(πy)
        let reste = &y % fixe::un(bits);
        if reste.is_zero() {
            let impair = (&y >> bits).is_odd();
            return Ok(Valeur::Approche(if impair { -module } else { module }));
        }

        let pi = constantes::valeur(Constante::Pi, bits)?;
        let (_, cos) = fixe::sin_cos(&fixe::mul(&pi, &y, bits), bits)?;
        let reel = fixe::mul(&module, &cos, bits);
        Ok(Valeur::Approche(self.partie_reelle(reel)))
    }

    fn appel(&mut self, f: Fonction, x: &BigInt) -> Result<BigInt, String> {
        let bits = self.bits;
        let un = fixe::un(bits);

        Ok(match f {
            Fonction::Sqrt => {
                if x.is_negative() {
                    // √x = i·√|x| : partie réelle nulle
                    self.partie_reelle(BigInt::zero())
                } else {
                    fixe::racine(x, bits)
                }
            }

            Fonction::Exp => fixe::exp(x, bits)?,

            Fonction::Ln | Fonction::Log => self.ln_reel(x)?,

            Fonction::Log10 => {
                let l = self.ln_reel(x)?;
                let ln10 = constantes::valeur(Constante::Ln10, bits)?;
                fixe::div(&l, &ln10, bits)?
            }

            Fonction::Sin => fixe::sin_cos(x, bits)?.0,
            Fonction::Cos => fixe::sin_cos(x, bits)?.1,
            Fonction::Tan => fixe::tan(x, bits)?,

            Fonction::Sinh => fixe::sinh(x, bits)?,
            Fonction::Cosh => fixe::cosh(x, bits)?,
            Fonction::Tanh => fixe::tanh(x, bits)?,

            Fonction::Asin => {
                if x.abs() <= un {
                    fixe::asin(x, bits)?
                } else {
                    // asin(x) = ±π/2 - i·ln(...)
                    let demi_pi = constantes::valeur(Constante::Pi, bits)? >> 1u32;
                    let r = if x.is_negative() { -demi_pi } else { demi_pi };
                    self.partie_reelle(r)
                }
            }

            Fonction::Acos => {
                if x.abs() <= un {
                    fixe::acos(x, bits)?
                } else if x.is_positive() {
                    self.partie_reelle(BigInt::zero())
                } else {
                    let pi = constantes::valeur(Constante::Pi, bits)?;
                    self.partie_reelle(pi)
                }
            }

            Fonction::Atan => fixe::atan(x, bits)?,
            Fonction::Asinh => fixe::asinh(x, bits)?,

            Fonction::Acosh => {
                if *x >= un {
                    fixe::acosh(x, bits)?
                } else if *x > -un {
                    // ]-1, 1[ : acosh(x) = i·acos(x)
                    self.partie_reelle(BigInt::zero())
                } else {
                    // x ≤ -1 : ln(|x| + √(x²-1)) + iπ
                    let r = fixe::acosh(x, bits)?;
                    self.partie_reelle(r)
                }
            }

            Fonction::Atanh => {
                let r = fixe::atanh(x, bits)?;
                if x.abs() > un {
                    self.partie_reelle(r)
                } else {
                    r
                }
            }
        })
    }

    /// ln|x|, avec note complexe si x < 0 (ln(-a) = ln a + iπ).
    fn ln_reel(&mut self, x: &BigInt) -> Result<BigInt, String> {
        if x.is_zero() {
            return Err("ln(0) : argument nul".into());
        }
        let l = fixe::ln(&x.abs(), self.bits)?;
        Ok(if x.is_negative() {
            self.partie_reelle(l)
        } else {
            l
        })
    }
}

/* ------------------------ Outils ------------------------ */

/// r^n exact (carrés successifs), avec garde-fou de taille.
fn rational_pow_int(base: &BigRational, exp: i64) -> Result<BigRational, String> {
    if exp == 0 {
        return Ok(BigRational::one());
    }
    if base.is_zero() {
        return if exp > 0 {
            Ok(BigRational::zero())
        } else {
            Err("0 élevé à une puissance négative".into())
        };
    }

    let taille = base.numer().bits().max(base.denom().bits());
    if taille.saturating_mul(exp.unsigned_abs()) > EXACT_BITS_MAX {
        return Err("puissance : dépassement de capacité".into());
    }

    let mut e = exp.unsigned_abs();
    let mut acc = BigRational::one();
    let mut b = base.clone();

    while e > 0 {
        if (e & 1) == 1 {
            acc *= b.clone();
        }
        e >>= 1;
        if e > 0 {
            b *= b.clone();
        }
    }

    Ok(if exp < 0 { acc.recip() } else { acc })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(s: &str, precision: usize) -> String {
        evaluate(s, precision)
            .unwrap_or_else(|e| panic!("evaluate({s:?}) erreur: {e}"))
            .to_string()
    }

    fn detail(s: &str, precision: usize) -> Evaluation {
        evaluate_detaille(s, precision, &Reglages::default())
            .unwrap_or_else(|e| panic!("evaluate({s:?}) erreur: {e}"))
    }

    fn assert_expression_invalide(s: &str) {
        match evaluate(s, 15) {
            Err(ErreurChiffres::ExpressionInvalide { expression, .. }) => {
                assert_eq!(expression, s)
            }
            autre => panic!("attendu ExpressionInvalide pour {s:?}, obtenu {autre:?}"),
        }
    }

    #[test]
    fn constantes_et_troncature() {
        assert_eq!(ok("pi", 11), "3.1415926535");
        assert_eq!(ok("e", 20), "2.7182818284590452353");
        assert_eq!(ok("phi", 10), "1.618033988");
    }

    #[test]
    fn litteraux_exacts() {
        assert_eq!(ok("0.5", 5), "0.5");
        assert_eq!(ok("1/8", 30), "0.125");
        assert_eq!(ok("2**-1", 5), "0.5");
        assert_eq!(ok("-2**2", 5), "-4.0");
        assert_eq!(ok("(1/3)*3", 40), "1.0");
        assert_eq!(ok("10**20 + 1", 25), "100000000000000000001.0");
    }

    #[test]
    fn fonctions_classiques() {
        assert_eq!(ok("sqrt(2)", 20), "1.4142135623730950488");
        assert_eq!(ok("sin(1)", 15), "0.841470984807896");
        assert_eq!(ok("log10(2)", 15), "0.301029995663981");
        assert_eq!(ok("exp(10)", 15), "22026.4657948067");
        assert_eq!(ok("exp(-10)", 10), "0.00004539992976");
        assert_eq!(ok("sin(pi/6)", 20), "0.5");
        assert_eq!(ok("4*atan(1)", 20), "3.1415926535897932384");
        assert_eq!(ok("2**0.5", 15), "1.41421356237309");
    }

    #[test]
    fn tres_petit_resultat_sonde() {
        let r = evaluate("exp(-100)", 10).unwrap();
        assert_eq!(r.mantisse(), &BigInt::from(3720075976u64));
        assert_eq!(r.ordre_grandeur(), -43);

        assert!(evaluate("sin(0)", 10).unwrap().est_zero());
        assert!(evaluate("1 - 1", 10).unwrap().est_zero());
    }

    #[test]
    fn petit_terme_multiplie_par_un_grand() {
        assert_eq!(ok("exp(-50)*exp(50)", 30), "1.0");
        assert_eq!(ok("exp(-200)*exp(200)", 20), "1.0");
        assert_eq!(ok("sqrt(10**-40)*10**20", 20), "1.0");
        assert_eq!(ok("exp(-100)*10**43", 10), "0.3720075976");
    }

    #[test]
    fn rationnels_minuscules() {
        let r = evaluate("1e-50", 15).unwrap();
        assert_eq!(r.ordre_grandeur(), -49);
        assert_eq!(r.to_string(), format!("0.{}1", "0".repeat(49)));
        assert_eq!(ok("3*10**-40", 5), format!("0.{}3", "0".repeat(39)));

        // exact : tronqué, jamais arrondi vers le haut
        assert_eq!(ok("1 - 10**-30", 15), format!("0.{}", "9".repeat(15)));
    }

    #[test]
    fn complexe_partie_reelle() {
        let d = detail("sqrt(-4)", 10);
        assert!(d.partie_imaginaire_ecartee);
        assert!(d.valeur.est_zero());

        let d = detail("log(-e)", 10);
        assert!(d.partie_imaginaire_ecartee);
        assert_eq!(d.valeur.to_string(), "1.0");

        let d = detail("asin(2)", 10);
        assert!(d.partie_imaginaire_ecartee);
        assert_eq!(d.valeur.to_string(), "1.570796326");

        let d = detail("(-8)**(1/3)", 10);
        assert!(d.partie_imaginaire_ecartee);
        assert_eq!(d.valeur.to_string(), "1.0");

        // partie réelle prise au noeud, pas en fin de calcul
        let d = detail("sqrt(-1)**2", 10);
        assert!(d.partie_imaginaire_ecartee);
        assert!(d.valeur.est_zero());
        assert_eq!(detail("exp(sqrt(-1)*pi)", 10).valeur.to_string(), "1.0");

        assert!(!detail("sqrt(4)", 10).partie_imaginaire_ecartee);
        assert_eq!(ok("(-2)**3", 10), "-8.0");
    }

    #[test]
    fn erreurs_de_domaine() {
        assert_expression_invalide("1/0");
        assert_expression_invalide("ln(0)");
        assert_expression_invalide("atanh(1)");
        assert_expression_invalide("0**-1");
        assert_expression_invalide("2**10000000");
    }

    #[test]
    fn erreurs_de_syntaxe() {
        assert_expression_invalide("2 +");
        assert_expression_invalide("");
        assert_expression_invalide("__import__(os)");
        assert_expression_invalide("eps");
        assert_expression_invalide("pi; 1");
    }

    #[test]
    fn precision_nulle_refusee() {
        assert!(matches!(
            evaluate("pi", 0),
            Err(ErreurChiffres::NombreChiffresInvalide { nb: 0, .. })
        ));
    }

    #[test]
    fn demarche_renseignee() {
        assert_eq!(
            detail("1/3 + 2**-2", 5).exacte,
            Some(BigRational::new(BigInt::from(7), BigInt::from(12)))
        );
        assert_eq!(detail("pi/pi", 5).exacte, None);

        let d = detail("2^3 + pi", 10);
        assert_eq!(d.jetons, "2 ** 3 + pi");
        assert_eq!(d.arbre, "2**3 + pi");
        assert_eq!(d.valeur.to_string(), "11.14159265");
    }
}

//! Tests fuzz safe : robustesse + déterminisme + limites contrôlées.
//!
//! But : marteler le pipeline sans brûler la machine.
//! - RNG déterministe (seed fixe)
//! - profondeur bornée, exposants littéraux petits
//! - budget temps global
//! - on accepte certaines erreurs attendues (division par zéro, ln(0), pôle...)
//! - invariant clé : jamais de panique, et une erreur est toujours ExpressionInvalide

use std::time::{Duration, Instant};

use super::{evaluate, extract_digits, map_to_trajectory, ErreurChiffres};

/* ------------------------ RNG déterministe minimal ------------------------ */

#[derive(Clone)]
struct Rng {
    state: u64,
}
impl Rng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }
    fn next_u32(&mut self) -> u32 {
        // LCG simple (déterministe)
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.state >> 32) as u32
    }
    fn pick(&mut self, n: u32) -> u32 {
        if n == 0 {
            0
        } else {
            self.next_u32() % n
        }
    }
    fn coin(&mut self) -> bool {
        (self.next_u32() & 1) == 1
    }
}

/* ------------------------ Budget anti-gel ------------------------ */

fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

/* ------------------------ Helpers fuzz ------------------------ */

fn is_erreur_attendue(e: &ErreurChiffres) -> bool {
    // Liste blanche : erreurs de domaine *normales* pour un fuzz.
    match e {
        ErreurChiffres::ExpressionInvalide { raison, .. } => {
            raison.contains("division par zéro")
                || raison.contains("ln(0)")
                || raison.contains("pôle")
                || raison.contains("puissance négative")
                || raison.contains("dépassement")
        }
        _ => false,
    }
}

/* ------------------------ Génération d’expressions (bornée) ------------------------ */

const CONSTANTES: [&str; 9] = [
    "pi", "e", "phi", "euler", "catalan", "apery", "ln2", "ln10", "degree",
];

const FONCTIONS: [&str; 17] = [
    "sqrt", "exp", "ln", "log", "log10", "sin", "cos", "tan", "sinh", "cosh", "tanh", "asin",
    "acos", "atan", "asinh", "acosh", "atanh",
];

fn gen_nombre(rng: &mut Rng) -> String {
    // entiers, décimaux, notation scientifique, zéro compris
    let a = rng.pick(8);
    match rng.pick(4) {
        0 => format!("{a}"),
        1 => format!("{a}.{}", rng.pick(100)),
        2 => format!("{a}e-{}", rng.pick(3)),
        _ => format!("{a}/{}", rng.pick(7) + 1),
    }
}

fn gen_atom(rng: &mut Rng) -> String {
    if rng.coin() {
        gen_nombre(rng)
    } else {
        CONSTANTES[rng.pick(CONSTANTES.len() as u32) as usize].to_string()
    }
}

fn gen_expr(rng: &mut Rng, depth: usize) -> String {
    if depth == 0 {
        return gen_atom(rng);
    }

    match rng.pick(8) {
        0 => gen_atom(rng),
        1 => format!("({}+{})", gen_expr(rng, depth - 1), gen_expr(rng, depth - 1)),
        2 => format!("({}-{})", gen_expr(rng, depth - 1), gen_expr(rng, depth - 1)),
        3 => format!("({}*{})", gen_expr(rng, depth - 1), gen_expr(rng, depth - 1)),
        4 => format!("({}/{})", gen_expr(rng, depth - 1), gen_expr(rng, depth - 1)),
        // exposant littéral petit : pas de tour de puissances
        5 => format!("({})**{}", gen_expr(rng, depth - 1), rng.pick(7) as i32 - 3),
        6 => format!("-{}", gen_expr(rng, depth - 1)),
        _ => {
            let f = FONCTIONS[rng.pick(FONCTIONS.len() as u32) as usize];
            // argument sans fonction imbriquée : exp(exp(...)) resterait borné
            // mais coûteux
            format!("{f}({})", gen_expr(rng, 0))
        }
    }
}

/// Texte quelconque : lettres, chiffres, opérateurs et caractères interdits.
fn gen_bruit(rng: &mut Rng) -> String {
    const ALPHABET: &[u8] = b"0123456789.+-*/^()eipsqrtxlogn_ ,=[]'\"!#;:";
    let n = rng.pick(24) as usize;
    (0..n)
        .map(|_| ALPHABET[rng.pick(ALPHABET.len() as u32) as usize] as char)
        .collect()
}

/* ------------------------ Helper somme balancée anti pile ------------------------ */

fn somme_balancee(terme: &str, n: usize) -> String {
    let mut items: Vec<String> = (0..n).map(|_| terme.to_string()).collect();
    while items.len() > 1 {
        let mut next = Vec::new();
        let mut i = 0;
        while i < items.len() {
            if i + 1 < items.len() {
                next.push(format!("({}+{})", items[i], items[i + 1]));
                i += 2;
            } else {
                next.push(items[i].clone());
                i += 1;
            }
        }
        items = next;
    }
    items.pop().unwrap_or_else(|| "0".to_string())
}

/* ------------------------ Tests ------------------------ */

#[test]
fn fuzz_safe_determinisme_et_erreurs_attendues() {
    let t0 = Instant::now();
    let max = Duration::from_secs(5);

    let mut rng = Rng::new(0xC0FFEE_u64);

    let mut seen_ok = 0usize;
    let mut seen_err = 0usize;

    for _ in 0..150 {
        budget(t0, max);

        let expr = gen_expr(&mut rng, 4);
        let precision = 30;

        match evaluate(&expr, precision) {
            Ok(v) => {
                // Même expression => même valeur (déterminisme)
                assert_eq!(evaluate(&expr, precision).ok(), Some(v.clone()), "expr={expr:?}");
                assert!(v.precision() == precision);
                seen_ok += 1;
            }
            Err(e) => {
                assert!(
                    is_erreur_attendue(&e),
                    "erreur non attendue: expr={expr:?} err={e}"
                );
                seen_err += 1;
            }
        }
    }

    // On veut voir un mix des deux, sinon le fuzz ne “balaye” rien.
    assert!(seen_ok > 50, "trop peu de succès: {seen_ok}");
    assert!(seen_err > 0, "aucune erreur vue: fuzz trop “sage”");
}

#[test]
fn fuzz_safe_bruit_jamais_de_panique() {
    let t0 = Instant::now();
    let max = Duration::from_secs(3);

    let mut rng = Rng::new(0xBADC0DE_u64);

    for _ in 0..400 {
        budget(t0, max);

        let texte = gen_bruit(&mut rng);
        // Seul ExpressionInvalide est permis : jamais de panique, jamais d’autre variante.
        if let Err(e) = evaluate(&texte, 12) {
            assert!(
                matches!(e, ErreurChiffres::ExpressionInvalide { .. }),
                "texte={texte:?} err={e:?}"
            );
        }
    }
}

#[test]
fn fuzz_safe_extraction_invariants() {
    let t0 = Instant::now();
    let max = Duration::from_secs(5);

    let mut rng = Rng::new(0x5EED_u64);

    for _ in 0..60 {
        budget(t0, max);

        let expr = gen_expr(&mut rng, 3);
        let base = rng.pick(60) + 2;
        let nb = rng.pick(80) as usize + 1;

        match extract_digits(&expr, base, nb) {
            Ok(seq) => {
                assert_eq!(seq.len(), nb, "expr={expr:?} base={base}");
                assert!(seq.chiffres().iter().all(|&c| c < base));

                let t = map_to_trajectory(seq.chiffres(), base).unwrap();
                assert_eq!(t.points().len(), nb + 1);

                // déterminisme bit à bit
                let bis = extract_digits(&expr, base, nb).unwrap();
                assert_eq!(seq, bis);
                assert_eq!(t, map_to_trajectory(bis.chiffres(), base).unwrap());
            }
            Err(e) => {
                assert!(
                    is_erreur_attendue(&e),
                    "erreur non attendue: expr={expr:?} err={e}"
                );
            }
        }
    }
}

#[test]
fn fuzz_safe_somme_balancee_anti_pile() {
    let t0 = Instant::now();
    let max = Duration::from_millis(500);

    let expr = somme_balancee("1/2", 800);
    budget(t0, max);

    let v = evaluate(&expr, 10).unwrap_or_else(|e| panic!("err: {e}"));
    budget(t0, max);

    // 800*(1/2) = 400
    assert_eq!(v.to_string(), "400.0");
}

#[test]
fn fuzz_safe_imbrication_refusee_sans_panique() {
    // Au-delà de la profondeur maximale : erreur propre, pas de débordement de pile.
    let expr = format!("{}1{}", "(".repeat(5000), ")".repeat(5000));
    assert!(matches!(
        evaluate(&expr, 10),
        Err(ErreurChiffres::ExpressionInvalide { .. })
    ));

    let expr = format!("{}1", "-".repeat(5000));
    assert!(matches!(
        evaluate(&expr, 10),
        Err(ErreurChiffres::ExpressionInvalide { .. })
    ));
}

//! Tests scientifiques (campagne) : valeurs connues + invariants + limites contrôlées.
//!
//! But : vérifier les chiffres sans faire chauffer la machine.
//! - budget temps global par test
//! - tailles bornées (nombre de chiffres, profondeur)
//!
//! Notes :
//! - Les valeurs de référence sont les développements décimaux publiés.
//! - Deux bases b et b^k demandées avec le même contenu d’information
//!   (N·k chiffres contre N) travaillent à la même précision : les chiffres
//!   doivent se regrouper exactement.

use std::time::{Duration, Instant};

use super::{evaluate, extract_digits, format_bloc, map_to_trajectory};

fn decimales(expr: &str, nb: usize) -> String {
    extract_digits(expr, 10, nb)
        .unwrap_or_else(|e| panic!("expr={expr:?} err={e}"))
        .chiffres()
        .iter()
        .map(|c| c.to_string())
        .collect()
}

fn valeur(expr: &str, precision: usize) -> String {
    evaluate(expr, precision)
        .unwrap_or_else(|e| panic!("expr={expr:?} err={e}"))
        .to_string()
}

/// Budget global anti-gel.
fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

/* ------------------------ Constantes connues ------------------------ */

#[test]
fn sci_constantes_cinquante_decimales() {
    let t0 = Instant::now();
    let max = Duration::from_secs(3);

    let cas = [
        ("pi", "14159265358979323846264338327950288419716939937510"),
        ("e", "71828182845904523536028747135266249775724709369995"),
        ("phi", "61803398874989484820458683436563811772030917980576"),
        ("euler", "57721566490153286060651209008240243104215933593992"),
        ("catalan", "91596559417721901505460351493238411077414937428167"),
        ("apery", "20205690315959428539973816151144999076498629234049"),
        ("ln2", "69314718055994530941723212145817656807550013436025"),
        ("ln10", "30258509299404568401799145468436420760110148862877"),
        ("sqrt(2)", "41421356237309504880168872420969807856967187537694"),
        ("degree", "01745329251994329576923690768488612713442871888541"),
    ];

    for (expr, attendu) in cas {
        assert_eq!(decimales(expr, 50), attendu, "expr={expr:?}");
        budget(t0, max);
    }
}

#[test]
fn sci_rationnels_periodiques() {
    // 99...9 (100 chiffres)/7 + 1/7 = 10^100/7, et 10^100 ≡ 4 (mod 7)
    let big = "9".repeat(100);
    assert_eq!(
        decimales(&format!("{big}/7 + 1/7"), 18),
        "571428571428571428"
    );
    assert_eq!(decimales("1/7", 12), "142857142857");
    assert_eq!(decimales("22/7", 6), "142857");
}

/* ------------------------ Identités numériques ------------------------ */

#[test]
fn sci_identites_a_quarante_chiffres() {
    let t0 = Instant::now();
    let max = Duration::from_secs(3);

    let cas = [
        ("sin(1.3)**2 + cos(1.3)**2", "1.0"),
        ("cosh(2)**2 - sinh(2)**2", "1.0"),
        ("exp(ln(7))", "7.0"),
        ("asin(sin(0.5))", "0.5"),
        ("tanh(atanh(0.3))", "0.3"),
        ("log10(1000)", "3.0"),
        ("sqrt(2)**2", "2.0"),
        ("tan(pi/4)", "1.0"),
        ("acos(0)*2/pi", "1.0"),
        ("atan(1)*4 - pi", "0.0"),
        ("asinh(sinh(1.5))", "1.5"),
        ("acosh(cosh(1.5))", "1.5"),
        ("180*degree - pi", "0.0"),
        ("phi**2 - phi", "1.0"),
    ];

    for (expr, attendu) in cas {
        assert_eq!(valeur(expr, 40), attendu, "expr={expr:?}");
        budget(t0, max);
    }
}

#[test]
fn sci_troncature_coherente_entre_precisions() {
    let court = valeur("e*pi", 20);
    let long = valeur("e*pi", 35);
    assert!(long.starts_with(&court), "{court} / {long}");
}

/* ------------------------ Invariants d’extraction ------------------------ */

#[test]
fn sci_bases_puissances_regroupees() {
    // 160 chiffres binaires et 40 hexadécimaux : même précision, mêmes bits.
    let bin = extract_digits("pi", 2, 160).unwrap();
    let hex = extract_digits("pi", 16, 40).unwrap();

    for (i, h) in hex.chiffres().iter().enumerate() {
        let quatre = &bin.chiffres()[4 * i..4 * i + 4];
        let v = quatre.iter().fold(0, |acc, b| acc * 2 + b);
        assert_eq!(v, *h, "chiffre hexadécimal {i}");
    }

    // idem base 3 / base 9
    let b3 = extract_digits("e", 3, 60).unwrap();
    let b9 = extract_digits("e", 9, 30).unwrap();
    for (i, n) in b9.chiffres().iter().enumerate() {
        assert_eq!(b3.chiffres()[2 * i] * 3 + b3.chiffres()[2 * i + 1], *n);
    }
}

#[test]
fn sci_longueur_et_domaine_toutes_bases() {
    let t0 = Instant::now();
    let max = Duration::from_secs(5);

    for base in 2u32..=40 {
        for expr in ["e", "pi/100", "exp(7)", "-sqrt(3)"] {
            let s = extract_digits(expr, base, 50).unwrap();
            assert_eq!(s.len(), 50, "expr={expr:?} base={base}");
            assert!(s.chiffres().iter().all(|&c| c < base));
        }
        budget(t0, max);
    }
}

#[test]
fn sci_extraction_longue_sous_budget() {
    let t0 = Instant::now();
    let max = Duration::from_secs(20);

    let s = extract_digits("pi", 10, 10_000).unwrap();
    budget(t0, max);

    assert_eq!(s.len(), 10_000);
    let debut: String = s.chiffres()[..20].iter().map(|c| c.to_string()).collect();
    assert_eq!(debut, "14159265358979323846");

    // décimales 9991 à 10000 de π
    let fin: String = s.chiffres()[9_990..].iter().map(|c| c.to_string()).collect();
    assert_eq!(fin, "5256375678");

    let bloc = format_bloc(&s, 100);
    assert_eq!(bloc.lines().count(), 100);
}

/* ------------------------ Trajectoire ------------------------ */

#[test]
fn sci_trajectoire_pi_base_dix() {
    let s = extract_digits("pi", 10, 1000).unwrap();
    let t = map_to_trajectory(s.chiffres(), 10).unwrap();
    assert_eq!(t.points().len(), 1001);

    // chaque pas est de longueur 1
    for w in t.points().windows(2) {
        let d = (w[1].x - w[0].x).hypot(w[1].y - w[0].y);
        assert!((d - 1.0).abs() < 1e-9);
    }

    let (min, max) = t.bornes();
    let fin = t.dernier_point();
    assert!(min.x <= fin.x && fin.x <= max.x);
    assert!(min.y <= fin.y && fin.y <= max.y);
}

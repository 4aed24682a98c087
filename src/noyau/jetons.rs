// src/noyau/jetons.rs

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::One;

/// Garde-fou : |exposant| d’un littéral scientifique (1e400 => refusé au-delà).
const EXPOSANT_LITTERAL_MAX: u32 = 100_000;

#[derive(Clone, Debug, PartialEq)]
pub enum Tok {
    Num(BigRational),

    // Constantes + fonctions : l’analyse décidera via l’environnement.
    Ident(String),

    Plus,
    Minus,
    Star,
    Slash,
    Pow, // ** ou ^ (synonyme, jamais un ou exclusif)

    LPar,
    RPar,
}

/// Tokenize une chaîne en jetons.
/// Supporte:
/// - entiers (12), décimaux (0.5, .5, 3.), scientifiques (1e-3, 2.5E+4) -> Num exact
/// - opérateurs + - * / ** ^
/// - parenthèses ( )
/// - π (équivaut à ident("pi"))
/// - identifiants [a-zA-Z_][a-zA-Z0-9_]* (sensibles à la casse)
///
/// Tout autre caractère est refusé ici : pas d’affectation, pas d’attribut,
/// pas d’appel à plusieurs arguments.
pub fn tokenize(s: &str) -> Result<Vec<Tok>, String> {
    let mut out = Vec::new();
    let chars: Vec<char> = s.chars().collect();
    let mut i: usize = 0;

    while i < chars.len() {
        let c = chars[i];

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        match c {
            '(' => {
                out.push(Tok::LPar);
                i += 1;
                continue;
            }
            ')' => {
                out.push(Tok::RPar);
                i += 1;
                continue;
            }
            '+' => {
                out.push(Tok::Plus);
                i += 1;
                continue;
            }
            '-' => {
                out.push(Tok::Minus);
                i += 1;
                continue;
            }
            '*' => {
                // ** = puissance, * = produit
                if i + 1 < chars.len() && chars[i + 1] == '*' {
                    out.push(Tok::Pow);
                    i += 2;
                } else {
                    out.push(Tok::Star);
                    i += 1;
                }
                continue;
            }
            '/' => {
                if i + 1 < chars.len() && chars[i + 1] == '/' {
                    return Err("opérateur '//' non supporté".into());
                }
                out.push(Tok::Slash);
                i += 1;
                continue;
            }
            '^' => {
                out.push(Tok::Pow);
                i += 1;
                continue;
            }
            'π' => {
                out.push(Tok::Ident("pi".to_string()));
                i += 1;
                continue;
            }
            ',' => return Err("',' interdit : fonctions à un seul argument".into()),
            '=' => return Err("'=' interdit : pas d’affectation".into()),
            _ => {}
        }

        // Identifiants ASCII : [a-zA-Z_][a-zA-Z0-9_]*
        if c.is_ascii_alphabetic() || c == '_' {
            let start = i;
            i += 1;
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect();
            out.push(Tok::Ident(word));
            continue;
        }

        // Nombre : chiffres [. chiffres] [e [+-] chiffres], ou .chiffres
        let debut_nombre = c.is_ascii_digit()
            || (c == '.' && i + 1 < chars.len() && chars[i + 1].is_ascii_digit());
        if debut_nombre {
            let (rat, next) = lire_nombre(&chars, i)?;
            out.push(Tok::Num(rat));
            i = next;
            continue;
        }

        if c == '.' {
            return Err("'.' interdit hors d’un nombre (pas d’accès d’attribut)".into());
        }

        return Err(format!("caractère inattendu: '{c}'"));
    }

    Ok(out)
}

/// Lit un littéral à partir de `i` ; renvoie la valeur exacte et l’indice suivant.
fn lire_nombre(chars: &[char], mut i: usize) -> Result<(BigRational, usize), String> {
    let mut mantisse = String::new();
    let mut nb_decimales: u32 = 0;

    while i < chars.len() && chars[i].is_ascii_digit() {
        mantisse.push(chars[i]);
        i += 1;
    }

    if i < chars.len() && chars[i] == '.' {
        i += 1;
        while i < chars.len() && chars[i].is_ascii_digit() {
            mantisse.push(chars[i]);
            nb_decimales += 1;
            i += 1;
        }
    }

    let mut exposant: i64 = 0;
    if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
        i += 1;
        let mut negatif = false;
        if i < chars.len() && (chars[i] == '+' || chars[i] == '-') {
            negatif = chars[i] == '-';
            i += 1;
        }
        let start_e = i;
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
        if start_e == i {
            // "2e" ou "2e+" : ni un exposant, ni un produit implicite
            return Err("exposant scientifique incomplet".into());
        }
        let e_str: String = chars[start_e..i].iter().collect();
        let e: u32 = e_str
            .parse()
            .ok()
            .filter(|e| *e <= EXPOSANT_LITTERAL_MAX)
            .ok_or("exposant scientifique trop grand")?;
        exposant = if negatif { -(e as i64) } else { e as i64 };
    }

    if mantisse.is_empty() {
        return Err("nombre invalide".into());
    }
    let n = BigInt::parse_bytes(mantisse.as_bytes(), 10).ok_or("nombre invalide")?;

    // valeur = n * 10^(exposant - nb_decimales)
    let puissance = exposant - nb_decimales as i64;
    let dix = BigInt::from(10);
    let rat = if puissance >= 0 {
        BigRational::from_integer(n * dix.pow(puissance as u32))
    } else {
        BigRational::new(n, dix.pow((-puissance) as u32))
    };

    Ok((rat, i))
}

/// Format utilitaire (debug) : liste de jetons en texte.
pub fn format_tokens(tokens: &[Tok]) -> String {
    fn format_rat(r: &BigRational) -> String {
        let n = r.numer();
        let d = r.denom();
        if d.is_one() {
            format!("{n}")
        } else {
            format!("{n}/{d}")
        }
    }

    let mut out = Vec::new();
    for t in tokens {
        let s = match t {
            Tok::Num(r) => format_rat(r),
            Tok::Ident(name) => name.clone(),

            Tok::Plus => "+".to_string(),
            Tok::Minus => "-".to_string(),
            Tok::Star => "*".to_string(),
            Tok::Slash => "/".to_string(),
            Tok::Pow => "**".to_string(),

            Tok::LPar => "(".to_string(),
            Tok::RPar => ")".to_string(),
        };
        out.push(s);
    }
    out.join(" ")
}

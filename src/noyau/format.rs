// src/noyau/format.rs
//
// Mise en forme pour les collaborateurs d’affichage / sauvegarde :
// - bloc de chiffres lisible (lignes de largeur fixe)
// - nom d’artefact déterministe <expr>_<base:02>_<n:06>.<ext>
// - titre court pour l’affichage (π, φ, √2)

use super::chiffres::SequenceChiffres;

/// Largeur d’un chiffre écrit en décimal : nombre de chiffres de (base - 1),
/// soit ceil(log10(base)) pour base > 10.
pub fn largeur_chiffre(base: u32) -> usize {
    base.saturating_sub(1).max(1).to_string().len()
}

/// Bloc de chiffres, `par_ligne` chiffres par ligne (0 => une seule ligne).
///
/// - base ≤ 10 : chiffres collés
/// - base > 10 : chaque chiffre complété à droite à `largeur_chiffre(base)`
///   et séparé par une espace
pub fn format_bloc(seq: &SequenceChiffres, par_ligne: usize) -> String {
    let chiffres = seq.chiffres();
    if chiffres.is_empty() {
        return String::new();
    }
    let par_ligne = if par_ligne == 0 { chiffres.len() } else { par_ligne };

    let base = seq.base();
    let largeur = largeur_chiffre(base);

    let lignes: Vec<String> = chiffres
        .chunks(par_ligne)
        .map(|ligne| {
            if base <= 10 {
                ligne.iter().map(|c| c.to_string()).collect()
            } else {
                let cases: Vec<String> =
                    ligne.iter().map(|c| format!("{c:<largeur$}")).collect();
                cases.join(" ").trim_end().to_string()
            }
        })
        .collect();

    lignes.join("\n")
}

/// Nom de fichier déterministe pour le triplet (expression, base, nombre de chiffres).
/// Les caractères hors [A-Za-z0-9._-] de l’expression deviennent '_'.
pub fn nom_artefact(expr: &str, base: u32, nb: usize, extension: &str) -> String {
    let propre: String = expr
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{propre}_{base:02}_{nb:06}.{extension}")
}

/// Titre court : symbole pour les constantes usuelles, √n pour sqrt(n) / sqrtn.
pub fn titre(expr: &str) -> String {
    let e = expr.trim();
    match e {
        "pi" | "π" => return "π".to_string(),
        "phi" => return "φ".to_string(),
        "euler" => return "γ".to_string(),
        "apery" => return "ζ(3)".to_string(),
        _ => {}
    }

    if let Some(reste) = e.strip_prefix("sqrt") {
        let interieur = reste
            .strip_prefix('(')
            .and_then(|r| r.strip_suffix(')'))
            .unwrap_or(reste);
        if !interieur.is_empty() && interieur.chars().all(|c| c.is_ascii_digit()) {
            return format!("√{interieur}");
        }
    }

    e.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(base: u32, chiffres: &[u32]) -> SequenceChiffres {
        SequenceChiffres::nouvelle(base, chiffres.to_vec()).unwrap()
    }

    #[test]
    fn largeurs() {
        assert_eq!(largeur_chiffre(2), 1);
        assert_eq!(largeur_chiffre(10), 1);
        assert_eq!(largeur_chiffre(11), 2);
        assert_eq!(largeur_chiffre(100), 2);
        assert_eq!(largeur_chiffre(101), 3);
    }

    #[test]
    fn bloc_petite_base_colle() {
        let s = seq(10, &[1, 4, 1, 5, 9, 2, 6]);
        assert_eq!(format_bloc(&s, 3), "141\n592\n6");
        assert_eq!(format_bloc(&s, 100), "1415926");
    }

    #[test]
    fn bloc_grande_base_separe() {
        let s = seq(16, &[2, 4, 3, 15, 6, 10]);
        assert_eq!(format_bloc(&s, 4), "2  4  3  15\n6  10");
        let s = seq(1000, &[7, 42, 999]);
        assert_eq!(format_bloc(&s, 0), "7   42  999");
    }

    #[test]
    fn bloc_lignes_de_cent_par_defaut() {
        let s = seq(2, &[1; 250]);
        let bloc = format_bloc(&s, crate::noyau::reglages::CHIFFRES_PAR_LIGNE);
        let lignes: Vec<&str> = bloc.lines().collect();
        assert_eq!(lignes.len(), 3);
        assert_eq!(lignes[0].len(), 100);
        assert_eq!(lignes[2].len(), 50);
    }

    #[test]
    fn noms_artefacts() {
        assert_eq!(nom_artefact("pi", 10, 10001, "png"), "pi_10_010001.png");
        assert_eq!(nom_artefact("sqrt(2)/2", 3, 5, "txt"), "sqrt_2__2_03_000005.txt");
        assert_eq!(nom_artefact(" e ", 123, 7, "txt"), "e_123_000007.txt");
    }

    #[test]
    fn titres() {
        assert_eq!(titre("pi"), "π");
        assert_eq!(titre("phi"), "φ");
        assert_eq!(titre("sqrt2"), "√2");
        assert_eq!(titre("sqrt(13)"), "√13");
        assert_eq!(titre("sqrt(x)"), "sqrt(x)");
        assert_eq!(titre("e*2"), "e*2");
    }
}

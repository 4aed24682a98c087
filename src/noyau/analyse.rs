// src/noyau/analyse.rs
//
// Descente récursive : jetons -> Expr
//
// Grammaire (priorité croissante) :
//   somme     := produit (('+' | '-') produit)*
//   produit   := unaire (('*' | '/') unaire)*
//   unaire    := ('+' | '-') unaire | puissance
//   puissance := atome ('**' unaire)?          (associative à droite)
//   atome     := Num | Const | Fonc '(' somme ')' | '(' somme ')'
//
// Donc -2**2 = -(2**2) et 2**-1 est accepté, comme en Python.
// Les noms sont résolus ICI : un nom inconnu ne va jamais jusqu’à l’évaluation.

use super::environnement::{Environnement, Symbole};
use super::expr::Expr;
use super::jetons::Tok;

/// Garde-fou : profondeur de l’arbre (anti débordement de pile, à l’analyse
/// comme à l’évaluation). Une chaîne a + b + c compte comme une imbrication.
const PROFONDEUR_MAX: usize = 1000;

struct Analyseur<'a> {
    jetons: &'a [Tok],
    pos: usize,
    env: &'a Environnement,
    profondeur: usize,
}

/// Construit l’AST d’une suite de jetons, en résolvant chaque nom dans `env`.
pub fn analyser(jetons: &[Tok], env: &Environnement) -> Result<Expr, String> {
    if jetons.is_empty() {
        return Err("Entrée vide".into());
    }

    let mut a = Analyseur {
        jetons,
        pos: 0,
        env,
        profondeur: 0,
    };

    let e = a.somme()?;
    match a.courant() {
        None => Ok(e),
        Some(Tok::RPar) => Err("parenthèse fermante sans ouvrante".into()),
        Some(t) => Err(format!("opérateur attendu avant {t:?}")),
    }
}

impl<'a> Analyseur<'a> {
    fn courant(&self) -> Option<&'a Tok> {
        self.jetons.get(self.pos)
    }

    fn avancer(&mut self) -> Option<&'a Tok> {
        let t = self.jetons.get(self.pos);
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn entrer(&mut self) -> Result<(), String> {
        self.profondeur += 1;
        if self.profondeur > PROFONDEUR_MAX {
            return Err("expression trop imbriquée".into());
        }
        Ok(())
    }

    fn sortir(&mut self) {
        self.profondeur -= 1;
    }

    fn somme(&mut self) -> Result<Expr, String> {
        let mut gauche = self.produit()?;
        let mut chaine = 0;
        let r = loop {
            let op = match self.courant() {
                Some(Tok::Plus) => Tok::Plus,
                Some(Tok::Minus) => Tok::Minus,
                _ => break Ok(gauche),
            };
            self.avancer();
            if let Err(e) = self.entrer() {
                break Err(e);
            }
            chaine += 1;
            let droite = match self.produit() {
                Ok(d) => d,
                Err(e) => break Err(e),
            };
            gauche = if op == Tok::Plus {
                Expr::Add(Box::new(gauche), Box::new(droite))
            } else {
                Expr::Sub(Box::new(gauche), Box::new(droite))
            };
        };
        self.profondeur -= chaine;
        r
    }

    fn produit(&mut self) -> Result<Expr, String> {
        let mut gauche = self.unaire()?;
        let mut chaine = 0;
        let r = loop {
            let op = match self.courant() {
                Some(Tok::Star) => Tok::Star,
                Some(Tok::Slash) => Tok::Slash,
                _ => break Ok(gauche),
            };
            self.avancer();
            if let Err(e) = self.entrer() {
                break Err(e);
            }
            chaine += 1;
            let droite = match self.unaire() {
                Ok(d) => d,
                Err(e) => break Err(e),
            };
            gauche = if op == Tok::Star {
                Expr::Mul(Box::new(gauche), Box::new(droite))
            } else {
                Expr::Div(Box::new(gauche), Box::new(droite))
            };
        };
        self.profondeur -= chaine;
        r
    }

    fn unaire(&mut self) -> Result<Expr, String> {
        self.entrer()?;
        let e = match self.courant() {
            Some(Tok::Minus) => {
                self.avancer();
                self.unaire().map(|x| Expr::Neg(Box::new(x)))
            }
            Some(Tok::Plus) => {
                self.avancer();
                self.unaire()
            }
            _ => self.puissance(),
        };
        self.sortir();
        e
    }

    fn puissance(&mut self) -> Result<Expr, String> {
        let base = self.atome()?;
        if let Some(Tok::Pow) = self.courant() {
            self.avancer();
            let exposant = self.unaire()?;
            return Ok(Expr::Pow(Box::new(base), Box::new(exposant)));
        }
        Ok(base)
    }

    fn atome(&mut self) -> Result<Expr, String> {
        match self.avancer() {
            None => Err("expression incomplète".into()),

            Some(Tok::Num(r)) => Ok(Expr::Nombre(r.clone())),

            Some(Tok::LPar) => {
                self.entrer()?;
                let e = self.somme()?;
                self.sortir();
                self.attendre_fermante()?;
                Ok(e)
            }

            Some(Tok::Ident(nom)) => match self.env.resoudre(nom) {
                None => Err(format!("nom inconnu: {nom:?}")),

                Some(Symbole::Constante(c)) => {
                    if let Some(Tok::LPar) = self.courant() {
                        return Err(format!("{nom} est une constante, pas une fonction"));
                    }
                    Ok(Expr::Constante(c))
                }

                Some(Symbole::Fonction(f)) => {
                    if !matches!(self.avancer(), Some(Tok::LPar)) {
                        return Err(format!("{nom} doit être appelée : {nom}(...)"));
                    }
                    if let Some(Tok::RPar) = self.courant() {
                        return Err(format!("{nom}() sans argument"));
                    }
                    self.entrer()?;
                    let x = self.somme()?;
                    self.sortir();
                    self.attendre_fermante()?;
                    Ok(Expr::Appel(f, Box::new(x)))
                }
            },

            Some(Tok::RPar) => Err("parenthèse fermante inattendue".into()),
            Some(t) => Err(format!("opérande attendu, trouvé {t:?}")),
        }
    }

    fn attendre_fermante(&mut self) -> Result<(), String> {
        match self.avancer() {
            Some(Tok::RPar) => Ok(()),
            None => Err("parenthèses non fermées".into()),
            Some(t) => Err(format!("')' attendue, trouvé {t:?}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noyau::environnement::{Constante, Fonction};
    use crate::noyau::jetons::tokenize;

    fn ok(s: &str) -> Expr {
        let jetons = tokenize(s).unwrap_or_else(|e| panic!("tokenize({s:?}) erreur: {e}"));
        analyser(&jetons, Environnement::standard())
            .unwrap_or_else(|e| panic!("analyser({s:?}) erreur: {e}"))
    }

    fn err(s: &str) -> String {
        let jetons = tokenize(s).unwrap_or_else(|e| panic!("tokenize({s:?}) erreur: {e}"));
        match analyser(&jetons, Environnement::standard()) {
            Ok(e) => panic!("analyser({s:?}) aurait dû échouer, obtenu {e}"),
            Err(msg) => msg,
        }
    }

    #[test]
    fn priorites_python() {
        assert_eq!(ok("-2**2").to_string(), "-2**2");
        assert!(matches!(ok("-2**2"), Expr::Neg(_)));
        assert!(matches!(ok("2**-1"), Expr::Pow(_, _)));
        assert_eq!(ok("1 + 2*3").to_string(), "1 + 2*3");
        assert_eq!(ok("(1 + 2)*3").to_string(), "(1 + 2)*3");
    }

    #[test]
    fn puissance_associative_a_droite() {
        match ok("2**3**2") {
            Expr::Pow(_, exposant) => assert!(matches!(*exposant, Expr::Pow(_, _))),
            e => panic!("attendu Pow, obtenu {e:?}"),
        }
    }

    #[test]
    fn appels_et_constantes() {
        assert_eq!(
            ok("sin(pi)"),
            Expr::Appel(Fonction::Sin, Box::new(Expr::Constante(Constante::Pi)))
        );
        assert_eq!(ok("sqrt(5*pi/e)").to_string(), "sqrt(5*pi/e)");
    }

    #[test]
    fn noms_refuses_a_l_analyse() {
        assert!(err("x + 1").contains("nom inconnu"));
        assert!(err("eps").contains("nom inconnu"));
        assert!(err("pi(2)").contains("constante"));
        assert!(err("sin + 1").contains("appelée"));
        assert!(err("sin()").contains("sans argument"));
    }

    #[test]
    fn syntaxe_incomplete() {
        assert!(err("2 +").contains("incomplète"));
        assert!(err("(1 + 2").contains("non fermées"));
        assert!(err("1 + 2)").contains("fermante"));
        assert!(err("2 3").contains("opérateur attendu"));
        assert!(err("*2").contains("opérande attendu"));
    }

    #[test]
    fn imbrication_bornee() {
        let s = format!("{}1{}", "(".repeat(2000), ")".repeat(2000));
        assert!(err(&s).contains("trop imbriquée"));

        // une longue chaîne d’opérateurs donne un arbre aussi profond
        let s = format!("{}1", "1+".repeat(1500));
        assert!(err(&s).contains("trop imbriquée"));
        let s = format!("{}1", "1*".repeat(300));
        assert_eq!(ok(&s).taille(), 601);
    }
}

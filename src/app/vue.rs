// src/app/vue.rs
//
// Vue (UI egui) — natif + web
// ---------------------------
// Objectifs :
// - Même AppChiffres (etat.rs) pour natif + wasm
// - Clavier : Enter calcule (quand un champ d’une ligne a le focus)
// - Aperçu en direct : chaque expression est analysée pendant la frappe
// - Tracé : polyligne échantillonnée, rampe rouge -> jaune -> bleu,
//   légende des directions en médaillon
// - Natif seulement : sauvegarde du bloc dans out/<nom>.txt

use eframe::egui;
use egui::{Align2, Color32, FontId, Pos2, Rect, Stroke, Vec2};

use super::etat::AppChiffres;
use explorateur_chiffres::noyau::environnement::Environnement;
use explorateur_chiffres::noyau::lot::{Combinaison, ResultatCombinaison, Succes};
use explorateur_chiffres::noyau::trajectoire::{
    couleur_rampe, pas_affichage, Directions, Trajectoire,
};
use explorateur_chiffres::noyau::{analyser_expression, executer_lot, titre, Reglages};

/// Longueur maximale de la valeur affichée (le bloc porte tous les chiffres).
const VALEUR_APERCU_MAX: usize = 80;

/// Hauteur du tracé.
const HAUTEUR_TRACE: f32 = 380.0;

impl AppChiffres {
    /// UI principale : à appeler depuis eframe::App::update(...)
    pub fn ui(&mut self, ui: &mut egui::Ui) {
        ui.spacing_mut().item_spacing = egui::vec2(6.0, 6.0);

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.heading("Explorateur de chiffres");
                ui.add_space(6.0);

                self.ui_entree(ui);

                ui.add_space(8.0);
                ui.separator();
                ui.add_space(8.0);

                self.ui_rapport(ui);
            });
    }

    fn ui_entree(&mut self, ui: &mut egui::Ui) {
        ui.label("Expressions (séparées par ';' ou une ligne chacune) :")
            .on_hover_text(noms_disponibles());

        let resp = ui.add(
            egui::TextEdit::multiline(&mut self.expressions)
                .desired_width(ui.available_width())
                .desired_rows(2)
                .hint_text("Ex: pi; sqrt(2); exp(-10); (1+sqrt(5))/2")
                .id_source("expressions_edit")
                .code_editor(),
        );
        if self.focus_entree {
            resp.request_focus();
            self.focus_entree = false;
        }

        self.ui_apercu(ui);

        ui.add_space(6.0);

        let mut lancer = false;
        egui::Grid::new("parametres_lot")
            .num_columns(2)
            .spacing([8.0, 6.0])
            .show(ui, |ui| {
                ui.label("Bases :");
                let r = ui.add(
                    egui::TextEdit::singleline(&mut self.bases)
                        .hint_text("2, 10, 16")
                        .id_source("bases_edit"),
                );
                lancer |= r.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                ui.end_row();

                ui.label("Chiffres :");
                let r = ui.add(
                    egui::TextEdit::singleline(&mut self.nb_chiffres)
                        .hint_text("100, 10000")
                        .id_source("nb_chiffres_edit"),
                );
                lancer |= r.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                ui.end_row();

                ui.label("Par ligne :");
                let mut n = self.chiffres_par_ligne as u32;
                let r = ui.add(
                    egui::DragValue::new(&mut n)
                        .speed(1)
                        .range(1..=400)
                        .suffix(" chiffres"),
                );
                if r.changed() {
                    // pris en compte au prochain calcul
                    self.set_chiffres_par_ligne(n as usize);
                }
                ui.end_row();
            });

        ui.add_space(6.0);

        ui.horizontal(|ui| {
            let calc = ui.add_sized([96.0, 30.0], egui::Button::new("Calculer"));
            lancer |= calc.clicked();

            ui.separator();

            // Contrat: C = expressions seulement ; CLR = résultats seulement ; AC = tout
            if bouton(ui, "C", "Efface seulement les expressions") {
                self.clear_entree();
            }
            if bouton(ui, "CLR", "Efface résultats + erreur") {
                self.clear_resultats();
            }
            if bouton(ui, "AC", "Remise à zéro totale") {
                self.reset_total();
            }
        });

        if lancer {
            self.calculer_lot();
        }

        if !self.erreur.is_empty() {
            ui.add_space(6.0);
            ui.colored_label(ui.visuals().error_fg_color, &self.erreur);
        }
    }

    /// Analyse en direct : arbre lu, ou raison du refus.
    fn ui_apercu(&self, ui: &mut egui::Ui) {
        for expr in self.liste_expressions() {
            match analyser_expression(&expr) {
                Ok(arbre) => {
                    ui.small(format!("✓ {arbre}"));
                }
                Err(e) => {
                    ui.colored_label(ui.visuals().warn_fg_color, format!("✗ {e}"));
                }
            }
        }
    }

    fn calculer_lot(&mut self) {
        let expressions = self.liste_expressions();
        if expressions.is_empty() {
            self.set_erreur("Entrée vide");
            return;
        }
        let bases = match self.liste_bases() {
            Ok(b) => b,
            Err(e) => return self.set_erreur(e),
        };
        let nbs = match self.liste_nb_chiffres() {
            Ok(n) => n,
            Err(e) => return self.set_erreur(e),
        };

        let reglages = Reglages::default().avec_chiffres_par_ligne(self.chiffres_par_ligne);
        let rapport = executer_lot(&reglages, &expressions, &bases, &nbs);
        self.set_rapport(rapport);
    }

    fn ui_rapport(&mut self, ui: &mut egui::Ui) {
        let Some(rapport) = &self.rapport else {
            ui.monospace("aucun calcul");
            return;
        };

        for rejet in &rapport.rejets {
            ui.colored_label(ui.visuals().warn_fg_color, format!("ignoré : {rejet}"));
        }

        // Sélection de la combinaison affichée
        let mut choix = None;
        ui.horizontal_wrapped(|ui| {
            for (i, r) in rapport.resultats.iter().enumerate() {
                let c = &r.combinaison;
                let libelle = format!("{} · b{} · {}", titre(&c.expression), c.base, c.nb_chiffres);
                let libelle = if r.resultat.is_ok() {
                    egui::RichText::new(libelle)
                } else {
                    egui::RichText::new(libelle).color(ui.visuals().error_fg_color)
                };
                if ui.selectable_label(self.selection == i, libelle).clicked() {
                    choix = Some(i);
                }
            }
        });

        let Some(selection) = rapport.resultats.get(choix.unwrap_or(self.selection)) else {
            return;
        };

        ui.add_space(6.0);
        let mut message = None;
        match &selection.resultat {
            Ok(succes) => {
                message = self.ui_succes(ui, selection, succes);
            }
            Err(e) => {
                ui.colored_label(ui.visuals().error_fg_color, e.to_string());
            }
        }

        if let Some(i) = choix {
            self.selection = i;
            self.message.clear();
        }
        if let Some(m) = message {
            self.message = m;
        }
        if !self.message.is_empty() {
            ui.label(&self.message);
        }
    }

    /// Détail d’une combinaison réussie ; renvoie un message si une sauvegarde a eu lieu.
    fn ui_succes(
        &self,
        ui: &mut egui::Ui,
        r: &ResultatCombinaison,
        succes: &Succes,
    ) -> Option<String> {
        let c = &r.combinaison;
        let ex = &succes.extraction;
        let mut message = None;

        let mut valeur = ex.valeur.to_string();
        if valeur.len() > VALEUR_APERCU_MAX {
            valeur.truncate(VALEUR_APERCU_MAX);
            valeur.push('…');
        }
        ui.label("Valeur :");
        champ_monospace(ui, "valeur_out", &valeur, 1);
        ui.small(format!("≈ {:e}", ex.valeur.to_f64()));

        if ex.partie_imaginaire_ecartee {
            ui.colored_label(
                ui.visuals().warn_fg_color,
                "résultat complexe : partie imaginaire écartée",
            );
        }

        egui::CollapsingHeader::new("Plan de précision")
            .default_open(false)
            .show(ui, |ui| {
                let p = &ex.plan;
                ui.monospace(format!("valeur grossière : {}", p.valeur_grossiere));
                ui.monospace(format!("chiffres base 10 : {}", p.nb_chiffres_base10));
                ui.monospace(format!("décalage         : {}", p.decalage));
                ui.monospace(format!("précision finale : {}", p.precision_finale));
            });

        let bloc = &succes.bloc;

        ui.horizontal(|ui| {
            ui.label(format!("Chiffres en base {} :", c.base));
            #[cfg(not(target_arch = "wasm32"))]
            if ui.button("Sauvegarder").clicked() {
                message = Some(sauvegarder(c, bloc));
            }
        });

        egui::ScrollArea::vertical()
            .id_salt("bloc_scroll")
            .max_height(200.0)
            .show(ui, |ui| {
                champ_monospace(ui, "bloc_out", bloc, 4);
            });

        ui.add_space(8.0);
        ui.label(format!("Trajectoire ({} points) :", succes.trajectoire.points().len()));
        dessiner_trajectoire(ui, &succes.trajectoire);

        message
    }
}

/// Infobulle : constantes et fonctions connues.
fn noms_disponibles() -> String {
    let noms: Vec<&str> = Environnement::standard().noms().collect();
    format!("Noms connus : {}", noms.join(", "))
}

fn bouton(ui: &mut egui::Ui, label: &str, tip: &str) -> bool {
    ui.add_sized([56.0, 30.0], egui::Button::new(label))
        .on_hover_text(tip)
        .clicked()
}

fn champ_monospace(ui: &mut egui::Ui, id: &str, contenu: &str, rows: usize) {
    // Affichage lecture seule “stable”, sans TextEdit interactif.
    egui::Frame::group(ui.style())
        .fill(ui.visuals().extreme_bg_color)
        .show(ui, |ui| {
            ui.push_id(id, |ui| {
                ui.set_min_width(ui.available_width());
                ui.set_min_height(rows as f32 * ui.text_style_height(&egui::TextStyle::Monospace));
                ui.monospace(contenu);
            });
        });
}

/* ------------------------ Tracé ------------------------ */

/// Rampe rouge -> jaune pâle -> bleu (début -> fin).
fn couleur(t: f32) -> Color32 {
    const ROUGE: [f32; 3] = [215.0, 48.0, 39.0];
    const JAUNE: [f32; 3] = [255.0, 255.0, 191.0];
    const BLEU: [f32; 3] = [69.0, 117.0, 180.0];

    let (a, b, u) = if t < 0.5 {
        (ROUGE, JAUNE, t * 2.0)
    } else {
        (JAUNE, BLEU, (t - 0.5) * 2.0)
    };
    let m = |i: usize| (a[i] + (b[i] - a[i]) * u).round() as u8;
    Color32::from_rgb(m(0), m(1), m(2))
}

fn dessiner_trajectoire(ui: &mut egui::Ui, t: &Trajectoire) {
    let taille = Vec2::new(ui.available_width(), HAUTEUR_TRACE);
    let (resp, painter) = ui.allocate_painter(taille, egui::Sense::hover());
    let cadre = resp.rect.shrink(12.0);

    painter.rect_filled(resp.rect, 4.0, ui.visuals().extreme_bg_color);

    // Même échelle en x et y, trajectoire centrée
    let (min, max) = t.bornes();
    let largeur = (max.x - min.x).max(1.0);
    let hauteur = (max.y - min.y).max(1.0);
    let echelle = (cadre.width() as f64 / largeur).min(cadre.height() as f64 / hauteur);
    let centre = ((min.x + max.x) / 2.0, (min.y + max.y) / 2.0);
    let vers_ecran = |x: f64, y: f64| {
        Pos2::new(
            cadre.center().x + ((x - centre.0) * echelle) as f32,
            cadre.center().y - ((y - centre.1) * echelle) as f32,
        )
    };

    let points = t.points();
    let n = points.len().saturating_sub(1);
    let pas = pas_affichage(n);

    let mut i = 0;
    while i < n {
        let j = (i + pas).min(n);
        let (a, b) = (points[i], points[j]);
        painter.line_segment(
            [vers_ecran(a.x, a.y), vers_ecran(b.x, b.y)],
            Stroke::new(1.2, couleur(couleur_rampe(i, n))),
        );
        i = j;
    }

    let fin = t.dernier_point();
    painter.circle_filled(vers_ecran(0.0, 0.0), 3.0, couleur(0.0));
    painter.circle_filled(vers_ecran(fin.x, fin.y), 3.0, couleur(1.0));

    dessiner_legende(ui, &painter, resp.rect, t.base());
}

/// Médaillon : une branche par direction, numérotée tant que c’est lisible.
fn dessiner_legende(ui: &egui::Ui, painter: &egui::Painter, zone: Rect, base: u32) {
    let Ok(directions) = Directions::pour_base(base) else {
        return;
    };

    let rayon = 34.0;
    let centre = Pos2::new(zone.right() - rayon - 18.0, zone.top() + rayon + 18.0);
    let trait_ = Stroke::new(1.0, ui.visuals().text_color());

    painter.circle_stroke(centre, rayon + 10.0, Stroke::new(0.5, ui.visuals().weak_text_color()));
    for (i, d) in directions.vecteurs().iter().enumerate() {
        let bout = Pos2::new(centre.x + d.x as f32 * rayon, centre.y - d.y as f32 * rayon);
        painter.line_segment([centre, bout], trait_);
        if base <= 16 {
            let etiquette = Pos2::new(
                centre.x + d.x as f32 * (rayon + 8.0),
                centre.y - d.y as f32 * (rayon + 8.0),
            );
            painter.text(
                etiquette,
                Align2::CENTER_CENTER,
                i.to_string(),
                FontId::monospace(9.0),
                ui.visuals().text_color(),
            );
        }
    }
}

/* ------------------------ Sauvegarde (natif) ------------------------ */

#[cfg(not(target_arch = "wasm32"))]
fn sauvegarder(c: &Combinaison, bloc: &str) -> String {
    use explorateur_chiffres::noyau::nom_artefact;

    let dossier = std::path::Path::new("out");
    let chemin = dossier.join(nom_artefact(&c.expression, c.base, c.nb_chiffres, "txt"));

    let ecrit = std::fs::create_dir_all(dossier).and_then(|_| std::fs::write(&chemin, bloc));
    match ecrit {
        Ok(()) => {
            tracing::info!(chemin = %chemin.display(), "bloc sauvegardé");
            format!("sauvegardé : {}", chemin.display())
        }
        Err(e) => {
            tracing::error!(chemin = %chemin.display(), "sauvegarde impossible : {e}");
            format!("sauvegarde impossible : {e}")
        }
    }
}

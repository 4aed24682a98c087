// src/app.rs
//
// Explorateur de chiffres — module App (racine)
// ---------------------------------------------
// Rôle:
// - Déclarer les sous-modules (etat.rs + vue.rs)
// - Ré-exporter AppChiffres (pour main.rs: use crate::app::AppChiffres;)
// - Fournir l’impl eframe::App (compatible NATIF + WEB)
//
// Important:
// - Enter est géré dans vue.rs (quand un champ a le focus).

pub mod etat;
pub mod vue;

pub use etat::AppChiffres;

use eframe::egui;

impl eframe::App for AppChiffres {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ESC = effacer seulement les expressions (comme bouton "C").
        let esc = ctx.input(|i| i.key_pressed(egui::Key::Escape));
        if esc {
            self.clear_entree();
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            self.ui(ui);
        });
    }
}

//! Explorateur de chiffres — noyau numérique.
//!
//! Expression restreinte -> réel à précision arbitraire -> chiffres en base b
//! -> trajectoire dans le plan. L’application eframe (src/main.rs) n’en est
//! qu’un client.

pub mod noyau;

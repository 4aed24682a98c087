// src/noyau/trajectoire.rs
//
// Trajectoire : chaque chiffre d est un pas unité dans la direction d d’un
// b-gone régulier. Direction 0 vers le haut, puis sens horaire :
//   angle(i) = π/2 - 2πi/b
// N chiffres => N+1 points, le point 0 à l’origine.

use std::f64::consts::{FRAC_PI_2, TAU};

use super::erreur::{ErreurChiffres, Resultat};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGINE: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Vecteur unité de la direction `i` en base `base`.
pub fn direction(i: u32, base: u32) -> Point {
    let angle = FRAC_PI_2 - TAU * f64::from(i) / f64::from(base);
    Point::new(angle.cos(), angle.sin())
}

/// Les `base` vecteurs unité, dans l’ordre des chiffres.
#[derive(Clone, Debug, PartialEq)]
pub struct Directions {
    base: u32,
    pas: Vec<Point>,
}

impl Directions {
    pub fn pour_base(base: u32) -> Resultat<Self> {
        if base < 2 {
            return Err(ErreurChiffres::BaseInvalide(base));
        }
        let pas = (0..base).map(|i| direction(i, base)).collect();
        Ok(Self { base, pas })
    }

    pub fn base(&self) -> u32 {
        self.base
    }

    pub fn vecteurs(&self) -> &[Point] {
        &self.pas
    }

    pub fn get(&self, chiffre: u32) -> Option<Point> {
        self.pas.get(chiffre as usize).copied()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Trajectoire {
    base: u32,
    points: Vec<Point>,
}

impl Trajectoire {
    pub fn base(&self) -> u32 {
        self.base
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn dernier_point(&self) -> Point {
        self.points.last().copied().unwrap_or(Point::ORIGINE)
    }

    /// Boîte englobante (min, max), pour le cadrage du tracé.
    pub fn bornes(&self) -> (Point, Point) {
        let mut min = Point::ORIGINE;
        let mut max = Point::ORIGINE;
        for p in &self.points {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        (min, max)
    }
}

/// `mapToTrajectory(digits, base)` : somme cumulée des pas choisis par les chiffres.
pub fn map_to_trajectory(chiffres: &[u32], base: u32) -> Resultat<Trajectoire> {
    let directions = Directions::pour_base(base)?;

    let mut points = Vec::with_capacity(chiffres.len() + 1);
    let mut courant = Point::ORIGINE;
    points.push(courant);

    for (position, &chiffre) in chiffres.iter().enumerate() {
        let pas = directions
            .get(chiffre)
            .ok_or(ErreurChiffres::ChiffreInvalide {
                chiffre,
                base,
                position,
            })?;
        courant.x += pas.x;
        courant.y += pas.y;
        points.push(courant);
    }

    Ok(Trajectoire { base, points })
}

/// Pas d’échantillonnage du tracé : un point sur max(1, n/1000).
pub fn pas_affichage(nb_chiffres: usize) -> usize {
    (nb_chiffres / 1000).max(1)
}

/// Position du point `i` (sur n chiffres) dans la rampe de couleurs, dans [0, 1].
pub fn couleur_rampe(i: usize, nb_chiffres: usize) -> f32 {
    if nb_chiffres == 0 {
        return 0.0;
    }
    (i as f32 / nb_chiffres as f32).clamp(0.0, 1.0)
}

//! K-means clustering over 2D points (k-means++ seeding, Lloyd iterations).
//!
//! Used offline to split building locations into green zones. Seeded, so a
//! given input always produces the same labels.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::ClusterError;

pub type Point = [f64; 2];

#[derive(Debug, Clone)]
pub struct KMeans {
    pub k: usize,
    pub max_iter: usize,
    /// Convergence threshold on the summed squared centroid shift.
    pub tol: f64,
    pub seed: u64,
}

impl Default for KMeans {
    fn default() -> Self {
        Self { k: 2, max_iter: 300, tol: 1e-4, seed: 42 }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct KMeansFit {
    pub centroids: Vec<Point>,
    /// Cluster index per input point, in input order.
    pub labels: Vec<usize>,
    /// Sum of squared distances to the assigned centroid.
    pub inertia: f64,
    pub iterations: usize,
}

fn dist2(a: &Point, b: &Point) -> f64 {
    (a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)
}

fn nearest(p: &Point, centroids: &[Point]) -> (usize, f64) {
    centroids
        .iter()
        .enumerate()
        .map(|(i, c)| (i, dist2(p, c)))
        .fold((0, f64::INFINITY), |best, cur| if cur.1 < best.1 { cur } else { best })
}

impl KMeans {
    pub fn new(k: usize) -> Self {
        Self { k, ..Self::default() }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn fit(&self, points: &[Point]) -> Result<KMeansFit, ClusterError> {
        if self.k == 0 {
            return Err(ClusterError::ZeroClusters);
        }
        if points.len() < self.k {
            return Err(ClusterError::TooFewPoints { k: self.k, n: points.len() });
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut centroids = self.init_plus_plus(points, &mut rng);
        let mut labels = vec![0usize; points.len()];
        let mut iterations = 0;

        while iterations < self.max_iter {
            iterations += 1;

            for (label, p) in labels.iter_mut().zip(points) {
                *label = nearest(p, &centroids).0;
            }

            let mut sums = vec![[0.0f64; 2]; self.k];
            let mut counts = vec![0usize; self.k];
            for (&label, p) in labels.iter().zip(points) {
                sums[label][0] += p[0];
                sums[label][1] += p[1];
                counts[label] += 1;
            }

            let mut shift = 0.0;
            for c in 0..self.k {
                // An emptied cluster keeps its previous centroid.
                if counts[c] == 0 {
                    continue;
                }
                let n = counts[c] as f64;
                let updated = [sums[c][0] / n, sums[c][1] / n];
                shift += dist2(&centroids[c], &updated);
                centroids[c] = updated;
            }

            if shift <= self.tol {
                break;
            }
        }

        let mut inertia = 0.0;
        for (label, p) in labels.iter_mut().zip(points) {
            let (idx, d) = nearest(p, &centroids);
            *label = idx;
            inertia += d;
        }

        Ok(KMeansFit { centroids, labels, inertia, iterations })
    }

    /// k-means++: each further centroid is drawn with probability proportional
    /// to its squared distance from the nearest centroid chosen so far.
    fn init_plus_plus(&self, points: &[Point], rng: &mut StdRng) -> Vec<Point> {
        let mut centroids = Vec::with_capacity(self.k);
        centroids.push(points[rng.gen_range(0..points.len())]);

        let mut d2: Vec<f64> = points.iter().map(|p| dist2(p, &centroids[0])).collect();
        while centroids.len() < self.k {
            let total: f64 = d2.iter().sum();
            let next = if total > 0.0 {
                let mut target = rng.gen_range(0.0..total);
                let mut chosen = points.len() - 1;
                for (i, &w) in d2.iter().enumerate() {
                    if target < w {
                        chosen = i;
                        break;
                    }
                    target -= w;
                }
                chosen
            } else {
                // All points coincide with existing centroids.
                rng.gen_range(0..points.len())
            };

            let c = points[next];
            for (d, p) in d2.iter_mut().zip(points) {
                *d = d.min(dist2(p, &c));
            }
            centroids.push(c);
        }
        centroids
    }
}

//! Кластеризация записей по (sales, profit) методом k-средних

use ndarray::{s, Array2, ArrayView1};
use rand::Rng;

use crate::error::{AnalyticsError, Result};
use crate::preprocessing::FeatureEngineer;
use crate::types::{BusinessRecord, ClusterAssignment, ElbowPoint};

pub const MAX_ITERATIONS: usize = 100;

/// Итерация Ллойда со случайной инициализацией из точек данных
pub struct KMeans {
    k: usize,
    max_iterations: usize,
}

/// Результат одного прогона k-means
#[derive(Debug, Clone)]
pub struct KMeansFit {
    pub labels: Vec<usize>,
    pub centroids: Array2<f64>,
    pub iterations: usize,
    pub converged: bool,
}

impl KMeans {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            max_iterations: MAX_ITERATIONS,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    /// Требует 1 <= k <= points.nrows()
    pub fn fit<R: Rng + ?Sized>(&self, points: &Array2<f64>, rng: &mut R) -> KMeansFit {
        // Различные индексы без возвращения: дубликатов центроидов не бывает
        let initial = rand::seq::index::sample(rng, points.nrows(), self.k);
        let mut centroids = Array2::zeros((self.k, points.ncols()));
        for (c, idx) in initial.iter().enumerate() {
            centroids.row_mut(c).assign(&points.row(idx));
        }

        self.fit_from(points, centroids)
    }

    /// Итерация от заданных начальных центроидов (k = число строк)
    pub fn fit_from(&self, points: &Array2<f64>, initial: Array2<f64>) -> KMeansFit {
        let mut centroids = initial;
        let mut labels: Option<Vec<usize>> = None;
        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.max_iterations {
            iterations += 1;

            let next_labels = assign(points, &centroids);
            if labels.as_ref() == Some(&next_labels) {
                converged = true;
                break;
            }

            centroids = update_centroids(points, &next_labels, &centroids);
            labels = Some(next_labels);
        }

        let labels = match labels {
            Some(labels) => labels,
            None => assign(points, &centroids),
        };

        tracing::debug!(
            "k-means k={} finished after {} iterations (converged: {})",
            centroids.nrows(),
            iterations,
            converged
        );

        KMeansFit {
            labels,
            centroids,
            iterations,
            converged,
        }
    }
}

impl KMeansFit {
    /// Сумма квадратов расстояний до назначенных центроидов
    pub fn inertia(&self, points: &Array2<f64>) -> f64 {
        self.labels
            .iter()
            .enumerate()
            .map(|(i, &c)| squared_distance(points.row(i), self.centroids.row(c)))
            .sum()
    }

    /// Центроиды плюс ещё один: точка, дальше всех от своего центроида.
    /// Старт для k+1 не хуже текущего решения по инерции.
    pub fn grown_centroids(&self, points: &Array2<f64>) -> Array2<f64> {
        let farthest = self
            .labels
            .iter()
            .enumerate()
            .map(|(i, &c)| (i, squared_distance(points.row(i), self.centroids.row(c))))
            .fold((0, f64::NEG_INFINITY), |best, cur| if cur.1 > best.1 { cur } else { best })
            .0;

        let k = self.centroids.nrows();
        let mut grown = Array2::zeros((k + 1, self.centroids.ncols()));
        grown.slice_mut(s![..k, ..]).assign(&self.centroids);
        grown.row_mut(k).assign(&points.row(farthest));
        grown
    }
}

/// Ближайший центроид; при равенстве побеждает меньший индекс
fn assign(points: &Array2<f64>, centroids: &Array2<f64>) -> Vec<usize> {
    points
        .rows()
        .into_iter()
        .map(|point| {
            let mut best = 0;
            let mut best_dist = f64::INFINITY;
            for (c, centroid) in centroids.rows().into_iter().enumerate() {
                let dist = squared_distance(point, centroid);
                if dist < best_dist {
                    best_dist = dist;
                    best = c;
                }
            }
            best
        })
        .collect()
}

/// Новый буфер центроидов; пустой кластер сохраняет прежний центроид
fn update_centroids(points: &Array2<f64>, labels: &[usize], previous: &Array2<f64>) -> Array2<f64> {
    let mut sums = Array2::<f64>::zeros(previous.raw_dim());
    let mut counts = vec![0usize; previous.nrows()];

    for (point, &c) in points.rows().into_iter().zip(labels) {
        let mut row = sums.row_mut(c);
        row += &point;
        counts[c] += 1;
    }

    let mut next = previous.clone();
    for (c, &count) in counts.iter().enumerate() {
        if count > 0 {
            let mean = sums.row(c).mapv(|v| v / count as f64);
            next.row_mut(c).assign(&mean);
        }
    }
    next
}

fn squared_distance(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum()
}

pub struct ClusteringEngine;

impl ClusteringEngine {
    /// k-means по (sales, profit). k больше числа записей урезается до n.
    pub fn cluster<R: Rng + ?Sized>(
        records: &[BusinessRecord],
        k: usize,
        rng: &mut R,
    ) -> Result<Vec<ClusterAssignment>> {
        if k == 0 {
            return Err(AnalyticsError::Validation("k must be at least 1".to_string()));
        }
        AnalyticsError::require("clustering", 1, records.len())?;

        let k = k.min(records.len()).max(1);
        let points = FeatureEngineer::sales_profit_points(records);
        let fit = KMeans::new(k).fit(&points, rng);

        Ok(records
            .iter()
            .zip(&fit.labels)
            .map(|(record, &c)| ClusterAssignment {
                cluster_id: c,
                sales: record.sales,
                profit: record.profit,
                centroid_sales: fit.centroids[[c, 0]],
                centroid_profit: fit.centroids[[c, 1]],
            })
            .collect())
    }

    /// Кривая инерции для k = 1..=min(max_k, n). Выбор "колена" за вызывающим.
    pub fn elbow<R: Rng + ?Sized>(
        records: &[BusinessRecord],
        max_k: usize,
        rng: &mut R,
    ) -> Result<Vec<ElbowPoint>> {
        if max_k == 0 {
            return Err(AnalyticsError::Validation("max_k must be at least 1".to_string()));
        }
        AnalyticsError::require("elbow scan", 1, records.len())?;

        let points = FeatureEngineer::sales_profit_points(records);
        let upper = max_k.min(records.len());

        // Для каждого k: независимый случайный старт и старт от лучшего решения k-1,
        // берётся меньшая инерция. Так кривая не возрастает.
        let mut curve = Vec::with_capacity(upper);
        let mut previous: Option<KMeansFit> = None;
        for k in 1..=upper {
            let mut best = KMeans::new(k).fit(&points, rng);
            let mut inertia = best.inertia(&points);

            if let Some(prev) = &previous {
                let warm = KMeans::new(k).fit_from(&points, prev.grown_centroids(&points));
                let warm_inertia = warm.inertia(&points);
                if warm_inertia < inertia {
                    best = warm;
                    inertia = warm_inertia;
                }
            }

            curve.push(ElbowPoint { k, inertia });
            previous = Some(best);
        }

        Ok(curve)
    }

    /// Количество различных кластеров в назначениях
    pub fn distinct_clusters(assignments: &[ClusterAssignment]) -> usize {
        let mut ids: Vec<usize> = assignments.iter().map(|a| a.cluster_id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn record(sales: f64, profit: f64) -> BusinessRecord {
        BusinessRecord {
            period: format!("{}", sales),
            sales,
            expenses: sales - profit,
            profit,
            customers: 1.0,
            marketing_spend: 1.0,
        }
    }

    fn separated_records() -> Vec<BusinessRecord> {
        vec![
            record(10.0, 1.0),
            record(11.0, 1.5),
            record(10.5, 0.5),
            record(100.0, 50.0),
            record(101.0, 51.0),
            record(99.0, 49.0),
        ]
    }

    #[test]
    fn test_cluster_output_shape() {
        let records = separated_records();
        let mut rng = StdRng::seed_from_u64(7);

        for k in 1..=records.len() {
            let assignments = ClusteringEngine::cluster(&records, k, &mut rng).unwrap();
            assert_eq!(assignments.len(), records.len());
            assert!(assignments.iter().all(|a| a.cluster_id < k));
        }
    }

    #[test]
    fn test_cluster_is_deterministic_with_seed() {
        let records = separated_records();
        let first = ClusteringEngine::cluster(&records, 3, &mut StdRng::seed_from_u64(42)).unwrap();
        let second = ClusteringEngine::cluster(&records, 3, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_separated_groups_up_to_permutation() {
        let records = separated_records();

        for seed in 0..10 {
            let assignments = ClusteringEngine::cluster(&records, 2, &mut StdRng::seed_from_u64(seed)).unwrap();
            // Метки могут быть переставлены, сравниваем только разбиение
            let low = assignments[0].cluster_id;
            let high = assignments[3].cluster_id;
            assert_ne!(low, high, "seed {}", seed);
            assert!(assignments[..3].iter().all(|a| a.cluster_id == low));
            assert!(assignments[3..].iter().all(|a| a.cluster_id == high));
        }
    }

    #[test]
    fn test_centroids_are_inlined() {
        let records = separated_records();
        let assignments = ClusteringEngine::cluster(&records, 2, &mut StdRng::seed_from_u64(1)).unwrap();
        let a = &assignments[4];
        assert!((a.centroid_sales - 100.0).abs() < 1e-9);
        assert!((a.centroid_profit - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_k_clamped_to_record_count() {
        let records = vec![record(1.0, 1.0), record(2.0, 2.0)];
        let assignments = ClusteringEngine::cluster(&records, 5, &mut StdRng::seed_from_u64(3)).unwrap();
        assert_eq!(assignments.len(), 2);
        assert!(assignments.iter().all(|a| a.cluster_id < 2));
        assert_eq!(ClusteringEngine::distinct_clusters(&assignments), 2);
    }

    #[test]
    fn test_invalid_inputs() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(ClusteringEngine::cluster(&separated_records(), 0, &mut rng).is_err());
        assert!(ClusteringEngine::cluster(&[], 2, &mut rng).is_err());
        assert!(ClusteringEngine::elbow(&[], 3, &mut rng).is_err());
        assert!(ClusteringEngine::elbow(&separated_records(), 0, &mut rng).is_err());
    }

    #[test]
    fn test_single_cluster_centroid_is_mean() {
        let records = vec![record(0.0, 0.0), record(2.0, 4.0), record(4.0, 8.0)];
        let assignments = ClusteringEngine::cluster(&records, 1, &mut StdRng::seed_from_u64(9)).unwrap();
        for a in &assignments {
            assert_eq!(a.cluster_id, 0);
            assert!((a.centroid_sales - 2.0).abs() < 1e-12);
            assert!((a.centroid_profit - 4.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_tie_prefers_lowest_centroid_index() {
        let points = Array2::from_shape_vec((1, 2), vec![1.0, 0.0]).unwrap();
        let centroids = Array2::from_shape_vec((2, 2), vec![2.0, 0.0, 0.0, 0.0]).unwrap();
        assert_eq!(assign(&points, &centroids), vec![0]);
    }

    #[test]
    fn test_empty_cluster_keeps_previous_centroid() {
        let points = Array2::from_shape_vec((2, 2), vec![0.0, 0.0, 2.0, 2.0]).unwrap();
        let previous = Array2::from_shape_vec((2, 2), vec![1.0, 1.0, 50.0, 50.0]).unwrap();
        let next = update_centroids(&points, &[0, 0], &previous);
        assert_eq!(next.row(0).to_vec(), vec![1.0, 1.0]);
        assert_eq!(next.row(1).to_vec(), vec![50.0, 50.0]);
    }

    #[test]
    fn test_elbow_curve() {
        let records = vec![record(1.0, 1.0), record(5.0, 2.0), record(9.0, 7.0)];
        let curve = ClusteringEngine::elbow(&records, 8, &mut StdRng::seed_from_u64(11)).unwrap();

        assert_eq!(curve.iter().map(|p| p.k).collect::<Vec<_>>(), vec![1, 2, 3]);
        for pair in curve.windows(2) {
            assert!(pair[1].inertia <= pair[0].inertia + 1e-9);
        }
        assert!(curve[2].inertia.abs() < 1e-12);
        assert!(curve.iter().all(|p| p.inertia >= 0.0));
    }

    #[test]
    fn test_grown_centroids_add_farthest_point() {
        let points = Array2::from_shape_vec((3, 2), vec![0.0, 0.0, 1.0, 0.0, 10.0, 0.0]).unwrap();
        let fit = KMeans::new(1).fit(&points, &mut StdRng::seed_from_u64(2));
        let grown = fit.grown_centroids(&points);

        assert_eq!(grown.nrows(), 2);
        assert_eq!(grown.row(0), fit.centroids.row(0));
        assert_eq!(grown.row(1).to_vec(), vec![10.0, 0.0]);

        let warm = KMeans::new(2).fit_from(&points, grown);
        assert!(warm.inertia(&points) <= fit.inertia(&points));
    }

    #[test]
    fn test_fit_reports_convergence() {
        let records = separated_records();
        let points = FeatureEngineer::sales_profit_points(&records);
        let fit = KMeans::new(2).fit(&points, &mut StdRng::seed_from_u64(5));
        assert!(fit.converged);
        assert!(fit.iterations <= MAX_ITERATIONS);

        let capped = KMeans::new(2).with_max_iterations(1).fit(&points, &mut StdRng::seed_from_u64(5));
        assert_eq!(capped.iterations, 1);
        assert_eq!(capped.labels.len(), records.len());
    }
}

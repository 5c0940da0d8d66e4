//! Cell/point field conversion by incidence counting.
//!
//! Both directions use plain arithmetic means; triangle areas do not weigh
//! in.

/// Averages, for every point, the values of the triangles incident on it.
///
/// Points without incident triangles get `0.0`.
#[must_use]
pub fn cell_to_point(triangles: &[[usize; 3]], point_count: usize, cell_values: &[f64]) -> Vec<f64> {
    let mut sums = vec![0.0; point_count];
    let mut counts = vec![0_u32; point_count];

    for (triangle, value) in triangles.iter().zip(cell_values) {
        for &id in triangle {
            sums[id] += value;
            counts[id] += 1;
        }
    }

    for (sum, count) in sums.iter_mut().zip(&counts) {
        if *count > 0 {
            *sum /= f64::from(*count);
        }
    }
    sums
}

/// Averages, for every triangle, the values of its three vertices.
#[must_use]
pub fn point_to_cell(triangles: &[[usize; 3]], point_values: &[f64]) -> Vec<f64> {
    triangles
        .iter()
        .map(|v| (point_values[v[0]] + point_values[v[1]] + point_values[v[2]]) / 3.0)
        .collect()
}

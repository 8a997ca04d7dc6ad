// SPDX-License-Identifier: MIT
//
// Copyright (c) 2025 Alexandre Severino
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

use std::sync::Arc;

use approx::assert_abs_diff_eq;
use polycell::{
    cell::{CanonicalPolyhedron, Cell3D, CellError, Polyhedron, PolyhedronOptions, PolyhedronState},
    geometry::Point3,
    numeric::degeneracy::Degeneracy,
};

const CUBE_FACES: [usize; 31] = [
    6, 4, 0, 2, 3, 1, 4, 4, 5, 7, 6, 4, 0, 1, 5, 4, 4, 2, 6, 7, 3, 4, 0, 4, 6, 2, 4, 1, 3, 7, 5,
];

fn cube_points() -> Vec<Point3<f64>> {
    (0..8)
        .map(|i| Point3::<f64>::new([(i & 1) as f64, ((i >> 1) & 1) as f64, ((i >> 2) & 1) as f64]))
        .collect()
}

fn cube() -> Arc<CanonicalPolyhedron<f64>> {
    let mut cell = Polyhedron::new();
    cell.set_faces(&CUBE_FACES);
    cell.freeze(&cube_points()).unwrap()
}

/// Corner tetrahedron stored at sparse global ids 7, 3, 5 and 9.
fn sparse_tetra() -> (Vec<Point3<f64>>, Vec<usize>) {
    let mut points = vec![Point3::<f64>::new([5.0, 5.0, 5.0]); 10];
    points[7] = Point3::<f64>::new([0.0, 0.0, 0.0]);
    points[3] = Point3::<f64>::new([1.0, 0.0, 0.0]);
    points[5] = Point3::<f64>::new([0.0, 1.0, 0.0]);
    points[9] = Point3::<f64>::new([0.0, 0.0, 1.0]);
    let faces = vec![4, 3, 7, 5, 3, 3, 7, 3, 9, 3, 3, 5, 9, 3, 5, 7, 9];
    (points, faces)
}

fn tet_volume(p: &[Point3<f64>], [a, b, c, d]: [usize; 4]) -> f64 {
    let u = [p[b][0] - p[a][0], p[b][1] - p[a][1], p[b][2] - p[a][2]];
    let v = [p[c][0] - p[a][0], p[c][1] - p[a][1], p[c][2] - p[a][2]];
    let w = [p[d][0] - p[a][0], p[d][1] - p[a][1], p[d][2] - p[a][2]];
    let det = u[0] * (v[1] * w[2] - v[2] * w[1]) - u[1] * (v[0] * w[2] - v[2] * w[0])
        + u[2] * (v[0] * w[1] - v[1] * w[0]);
    det.abs() / 6.0
}

fn triangle_area(p: &[Point3<f64>], [a, b, c]: [usize; 3]) -> f64 {
    let u = [p[b][0] - p[a][0], p[b][1] - p[a][1], p[b][2] - p[a][2]];
    let v = [p[c][0] - p[a][0], p[c][1] - p[a][1], p[c][2] - p[a][2]];
    let n = [
        u[1] * v[2] - u[2] * v[1],
        u[2] * v[0] - u[0] * v[2],
        u[0] * v[1] - u[1] * v[0],
    ];
    (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt() / 2.0
}

#[test]
fn sparse_ids_are_canonicalized() {
    let (points, faces) = sparse_tetra();
    let mut cell = Polyhedron::new();
    cell.set_faces(&faces);
    let cell = cell.freeze(&points).unwrap();

    assert_eq!(cell.point_ids(), &[7, 5, 3, 9]);
    assert_eq!(cell.points()[1], Point3::<f64>::new([0.0, 1.0, 0.0]));
    assert_eq!(cell.faces(), faces);
    assert_eq!(cell.canonical_faces().get(0), Some(&[0, 1, 2][..]));

    assert_eq!(cell.number_of_points(), 4);
    assert_eq!(cell.number_of_faces(), 4);
    assert_eq!(cell.number_of_edges(), 6);
    assert!(cell.edge_face_counts().iter().all(|&n| n == 2));
    let edge = cell.edge(0).unwrap();
    assert!(edge.point_ids.iter().all(|id| [7, 5, 3, 9].contains(id)));

    assert_abs_diff_eq!(cell.volume(), 1.0 / 6.0, epsilon = 1e-12);
    let tets = cell.triangulate().unwrap();
    assert_eq!(tets.len(), 4);
    assert_abs_diff_eq!(tets.volume(), 1.0 / 6.0, epsilon = 1e-12);
}

#[test]
fn freeze_is_idempotent() {
    let points = cube_points();
    let mut cell = Polyhedron::new();
    assert_eq!(cell.state(), PolyhedronState::Uninitialized);
    assert_eq!(cell.freeze(&points).unwrap_err(), CellError::NoFaces);

    cell.set_faces(&CUBE_FACES);
    assert_eq!(cell.state(), PolyhedronState::FacesSet);
    let first = cell.freeze(&points).unwrap();
    let again = cell.freeze(&points).unwrap();
    assert!(Arc::ptr_eq(&first, &again));
    assert_eq!(cell.state(), PolyhedronState::Canonical);

    cell.set_faces(&CUBE_FACES);
    assert_eq!(cell.state(), PolyhedronState::FacesSet);
    cell.initialize(&points).unwrap();
    let rebuilt = cell.canonical().unwrap();
    assert!(!Arc::ptr_eq(&first, rebuilt));
    assert_eq!(first.point_ids(), rebuilt.point_ids());
    assert_eq!(first.canonical_faces(), rebuilt.canonical_faces());
    assert_eq!(first.boundary_triangles(), rebuilt.boundary_triangles());

    cell.invalidate();
    assert_eq!(cell.state(), PolyhedronState::FacesSet);
}

#[test]
fn position_inside_and_outside() {
    let cell = cube();

    let x = Point3::<f64>::new([0.25, 0.5, 0.75]);
    let pos = cell.evaluate_position(&x).unwrap();
    assert!(pos.inside);
    assert_eq!(pos.dist2, 0.0);
    assert_eq!(pos.closest_point, x);
    for i in 0..3 {
        assert_abs_diff_eq!(pos.pcoords[i], x[i], epsilon = 1e-12);
    }
    assert_abs_diff_eq!(pos.weights.iter().sum::<f64>(), 1.0, epsilon = 1e-9);
    let back = cell.evaluate_location(&pos.weights);
    for i in 0..3 {
        assert_abs_diff_eq!(back[i], x[i], epsilon = 1e-9);
    }

    let pos = cell.evaluate_position(&Point3::<f64>::new([2.0, 0.5, 0.5])).unwrap();
    assert!(!pos.inside);
    assert_abs_diff_eq!(pos.dist2, 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(pos.closest_point[0], 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(pos.closest_point[1], 0.5, epsilon = 1e-12);
    assert_abs_diff_eq!(pos.closest_point[2], 0.5, epsilon = 1e-12);
    assert_abs_diff_eq!(pos.pcoords[0], 2.0, epsilon = 1e-12);
}

#[test]
fn parametric_center_weights() {
    let cell = cube();
    assert_eq!(cell.parametric_center(), [0.5; 3]);
    let w = cell.interpolate_functions(&cell.parametric_center()).unwrap();
    assert_eq!(w.len(), 8);
    assert_abs_diff_eq!(w.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
    assert!(w.iter().all(|&wi| wi > 0.0));
    let x = cell.evaluate_location(&w);
    for i in 0..3 {
        assert_abs_diff_eq!(x[i], 0.5, epsilon = 1e-12);
    }
}

#[test]
fn weight_derivatives_reproduce_the_frame() {
    let cell = cube();
    let n = cell.number_of_points();
    let d = cell.interpolate_derivs(&[0.4, 0.3, 0.6]).unwrap();
    assert_eq!(d.len(), 3 * n);
    for k in 0..3 {
        let block = &d[k * n..(k + 1) * n];
        assert_abs_diff_eq!(block.iter().sum::<f64>(), 0.0, epsilon = 1e-8);
        for m in 0..3 {
            let dx: f64 = block.iter().zip(cell.points()).map(|(w, p)| w * p[m]).sum();
            let expected = if k == m { 1.0 } else { 0.0 };
            assert_abs_diff_eq!(dx, expected, epsilon = 1e-6);
        }
    }
}

#[test]
fn global_fields_are_reordered() {
    let (points, faces) = sparse_tetra();
    let mut cell = Polyhedron::new();
    cell.set_faces(&faces);
    let cell = cell.freeze(&points).unwrap();

    let global: Vec<f64> = (0..10).flat_map(|i| [i as f64, 10.0 * i as f64]).collect();
    assert_eq!(
        cell.local_values(&global, 2).unwrap(),
        vec![7.0, 70.0, 5.0, 50.0, 3.0, 30.0, 9.0, 90.0]
    );
    assert_eq!(
        cell.local_values(&global[..5], 1),
        Err(CellError::ValueCount { expected: 10, actual: 5 })
    );
}

#[test]
fn line_hits_nearest_face() {
    let cell = cube();
    let a = Point3::<f64>::new([-1.0, 0.5, 0.25]);
    let b = Point3::<f64>::new([2.0, 0.5, 0.25]);
    let hit = cell.intersect_with_line(&a, &b, 1e-9).unwrap();
    assert_abs_diff_eq!(hit.t, 1.0 / 3.0, epsilon = 1e-12);
    assert_abs_diff_eq!(hit.x[0], 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(hit.pcoords[2], 0.25, epsilon = 1e-12);

    let miss = cell.intersect_with_line(&Point3::<f64>::new([-1.0, 2.0, 0.5]), &Point3::<f64>::new([2.0, 2.0, 0.5]), 1e-9);
    assert!(miss.is_none());
}

#[test]
fn contour_is_a_cross_section() {
    let cell = cube();
    let scalars: Vec<f64> = cell.points().iter().map(|p| p[0]).collect();
    let contour = cell.contour(0.3, &scalars).unwrap();

    assert!(!contour.triangles.is_empty());
    for p in &contour.points {
        assert_abs_diff_eq!(p[0], 0.3, epsilon = 1e-12);
    }
    let area: f64 = contour
        .triangles
        .iter()
        .map(|&t| triangle_area(&contour.points, t))
        .sum();
    assert_abs_diff_eq!(area, 1.0, epsilon = 1e-9);

    assert!(cell.contour(2.0, &scalars).unwrap().triangles.is_empty());
    assert_eq!(
        cell.contour(0.3, &scalars[..3]),
        Err(CellError::ValueCount { expected: 8, actual: 3 })
    );
}

#[test]
fn clip_splits_volume() {
    let cell = cube();
    let scalars: Vec<f64> = cell.points().iter().map(|p| p[0]).collect();

    let high = cell.clip(0.3, &scalars, false).unwrap();
    let low = cell.clip(0.3, &scalars, true).unwrap();
    let volume = |c: &polycell::cell::polyhedron::ClippedCell<f64>| -> f64 {
        c.tetras.iter().map(|&t| tet_volume(&c.points, t)).sum()
    };
    assert_abs_diff_eq!(volume(&high), 0.7, epsilon = 1e-9);
    assert_abs_diff_eq!(volume(&low), 0.3, epsilon = 1e-9);
    assert!(high.points.iter().all(|p| p[0] >= 0.3 - 1e-12));
    assert!(low.points.iter().all(|p| p[0] <= 0.3 + 1e-12));

    let whole = cell.clip(-1.0, &scalars, false).unwrap();
    assert_abs_diff_eq!(volume(&whole), 1.0, epsilon = 1e-9);
    assert!(cell.clip(-1.0, &scalars, true).unwrap().tetras.is_empty());
}

#[test]
fn gradient_of_linear_field() {
    let cell = cube();
    let values: Vec<f64> = cell
        .points()
        .iter()
        .map(|p| 2.0 * p[0] + 3.0 * p[1] - p[2])
        .collect();
    let g = cell.derivatives(&[0.3, 0.6, 0.2], &values, 1).unwrap();
    assert_eq!(g.len(), 3);
    assert_abs_diff_eq!(g[0], 2.0, epsilon = 1e-9);
    assert_abs_diff_eq!(g[1], 3.0, epsilon = 1e-9);
    assert_abs_diff_eq!(g[2], -1.0, epsilon = 1e-9);
}

#[test]
fn boundary_nearest_face() {
    let cell = cube();
    let (face, inside) = cell.cell_boundary(&[0.5, 0.4, 0.05]);
    assert_eq!(face, vec![0, 2, 3, 1]);
    assert!(inside);

    let (face, inside) = cell.cell_boundary(&[1.5, 0.5, 0.5]);
    assert_eq!(face, vec![1, 3, 7, 5]);
    assert!(!inside);
}

#[test]
fn ray_casting_classifies() {
    let cell = cube();
    assert!(cell.is_inside(&Point3::<f64>::new([0.3, 0.4, 0.6])));
    assert!(!cell.is_inside(&Point3::<f64>::new([1.5, 0.5, 0.5])));
    assert!(!cell.is_inside(&Point3::<f64>::new([0.5, -0.2, 0.5])));
    assert!(cell.contains(&Point3::<f64>::new([0.9, 0.1, 0.5])));
}

#[test]
fn manifold_validation() {
    let points = cube_points();
    // Cube without its last face.
    let mut open = CUBE_FACES[..26].to_vec();
    open[0] = 5;

    let mut cell = Polyhedron::new();
    cell.set_faces(&open);
    assert!(cell.freeze(&points).is_ok());

    let mut cell = Polyhedron::with_options(PolyhedronOptions::default().with_validate_manifold(true));
    cell.set_faces(&open);
    assert!(matches!(
        cell.freeze(&points),
        Err(CellError::NonManifold { uses: 1, .. })
    ));

    cell.set_faces(&CUBE_FACES);
    assert!(cell.freeze(&points).is_ok());
}

#[test]
fn malformed_face_lists() {
    let points = cube_points();
    let cases: [&[usize]; 4] = [&[2, 3, 0, 1, 2], &[1, 2, 0, 1], &[1, 4, 0, 1, 2], &[0]];
    for blob in cases {
        let mut cell = Polyhedron::<f64>::new();
        cell.set_faces(blob);
        let err = cell.freeze(&points).unwrap_err();
        assert!(
            matches!(err, CellError::MalformedFaces { .. } | CellError::NoFaces),
            "{blob:?}: {err}"
        );
    }

    let mut cell = Polyhedron::<f64>::new();
    cell.set_faces(&[1, 3, 0, 1, 2]);
    assert_eq!(
        cell.freeze(&points[..2]).unwrap_err(),
        CellError::MissingPoint { id: 2, points: 2 }
    );
}

#[test]
fn flat_cell_has_no_tetrahedra() {
    let points = vec![
        Point3::<f64>::new([0.0, 0.0, 0.0]),
        Point3::<f64>::new([1.0, 0.0, 0.0]),
        Point3::<f64>::new([0.0, 1.0, 0.0]),
        Point3::<f64>::new([1.0, 1.0, 0.0]),
    ];
    let faces = [4, 3, 0, 2, 1, 3, 0, 1, 3, 3, 1, 3, 2, 3, 2, 0, 3];
    let mut cell = Polyhedron::new();
    cell.set_faces(&faces);
    let cell = cell.freeze(&points).unwrap();

    assert_abs_diff_eq!(cell.volume(), 0.0, epsilon = 1e-12);
    assert!(cell.triangulate().unwrap().is_empty());
    assert!(!cell.contains(&Point3::<f64>::new([0.5, 0.5, 1.0])));
}

#[test]
fn degeneracy_policies_agree_on_cube() {
    for degeneracy in [Degeneracy::ExactZero, Degeneracy::Relative(1e-12), Degeneracy::Exact] {
        let mut cell = Polyhedron::with_options(PolyhedronOptions::default().with_degeneracy(degeneracy));
        cell.set_faces(&CUBE_FACES);
        let cell = cell.freeze(&cube_points()).unwrap();
        assert_eq!(cell.triangulate().unwrap().len(), 12);
        assert!(cell.contains(&Point3::<f64>::new([0.2, 0.7, 0.4])));
    }
}

#[test]
fn snapshot_is_shared_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<CanonicalPolyhedron<f64>>();

    let cell = cube();
    std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let cell = Arc::clone(&cell);
                s.spawn(move || {
                    let x = Point3::<f64>::new([0.1 + 0.2 * i as f64, 0.5, 0.5]);
                    cell.evaluate_position(&x).map(|p| p.inside)
                })
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), Ok(true));
        }
    });
    assert_eq!(cell.triangulate().unwrap().len(), 12);
}

/// Octagonal U in the xy plane (notch `[1, 2] x [1, 3]`) extruded over
/// `z` in `[0, 1]`. Corners `0..8` at `z = 0`, `8..16` at `z = 1`.
fn u_prism() -> Arc<CanonicalPolyhedron<f64>> {
    let outline = [
        (0.0, 0.0),
        (3.0, 0.0),
        (3.0, 3.0),
        (2.0, 3.0),
        (2.0, 1.0),
        (1.0, 1.0),
        (1.0, 3.0),
        (0.0, 3.0),
    ];
    let points: Vec<Point3<f64>> = [0.0, 1.0]
        .iter()
        .flat_map(|&z| outline.iter().map(move |&(x, y)| Point3::<f64>::new([x, y, z])))
        .collect();

    let mut faces = vec![10, 8, 7, 6, 5, 4, 3, 2, 1, 0, 8];
    faces.extend(8..16);
    for i in 0..8 {
        let j = (i + 1) % 8;
        faces.extend([4, i, j, j + 8, i + 8]);
    }

    let mut cell = Polyhedron::with_options(PolyhedronOptions::default().with_validate_manifold(true));
    cell.set_faces(&faces);
    cell.freeze(&points).unwrap()
}

#[test]
fn non_star_shaped_cell_is_decomposed() {
    let cell = u_prism();
    assert_abs_diff_eq!(cell.volume(), 7.0, epsilon = 1e-12);

    let tets = cell.triangulate().unwrap();
    assert!(!tets.is_empty());
    assert_eq!(tets.apex, None);
    assert!(tets.points.len() > cell.number_of_points());
    assert!(tets.iter().all(|t| t.signed_volume() > 0.0));
    assert_abs_diff_eq!(tets.volume(), 7.0, epsilon = 1e-9);
}

#[test]
fn notch_is_outside() {
    let cell = u_prism();
    assert!(cell.contains(&Point3::<f64>::new([0.5, 2.5, 0.5])));
    assert!(cell.contains(&Point3::<f64>::new([2.5, 2.5, 0.5])));
    assert!(cell.contains(&Point3::<f64>::new([1.5, 0.5, 0.5])));
    assert!(!cell.contains(&Point3::<f64>::new([1.5, 2.5, 0.5])));

    let pos = cell.evaluate_position(&Point3::<f64>::new([1.5, 2.5, 0.5])).unwrap();
    assert!(!pos.inside);
    assert_abs_diff_eq!(pos.dist2, 0.25, epsilon = 1e-12);
}

#[test]
fn non_convex_weights_reproduce_points() {
    let cell = u_prism();
    for x in [[0.5, 2.5, 0.5], [2.5, 0.5, 0.25], [1.5, 0.5, 0.75]] {
        let x = Point3::<f64>::new(x);
        let w = cell.interpolation_weights(&x).unwrap();
        assert_abs_diff_eq!(w.iter().sum::<f64>(), 1.0, epsilon = 1e-9);
        let y = cell.evaluate_location(&w);
        for i in 0..3 {
            assert_abs_diff_eq!(y[i], x[i], epsilon = 1e-9);
        }
    }
}

#[test]
fn non_convex_clip_and_contour() {
    let cell = u_prism();
    let scalars: Vec<f64> = cell.points().iter().map(|p| p[0]).collect();

    let volume = |c: &polycell::cell::polyhedron::ClippedCell<f64>| -> f64 {
        c.tetras.iter().map(|&t| tet_volume(&c.points, t)).sum()
    };
    let high = cell.clip(1.5, &scalars, false).unwrap();
    let low = cell.clip(1.5, &scalars, true).unwrap();
    assert_abs_diff_eq!(volume(&high), 3.5, epsilon = 1e-9);
    assert_abs_diff_eq!(volume(&low), 3.5, epsilon = 1e-9);
    assert_abs_diff_eq!(volume(&high) + volume(&low), cell.volume(), epsilon = 1e-9);

    let contour = cell.contour(1.5, &scalars).unwrap();
    let area: f64 = contour
        .triangles
        .iter()
        .map(|&t| triangle_area(&contour.points, t))
        .sum();
    assert_abs_diff_eq!(area, 1.0, epsilon = 1e-9);
    assert!(contour.points.iter().all(|p| p[1] <= 1.0 + 1e-12));
}

#[test]
fn non_convex_gradient() {
    let cell = u_prism();
    let values: Vec<f64> = cell
        .points()
        .iter()
        .map(|p| 2.0 * p[0] + 3.0 * p[1] - p[2])
        .collect();
    // (2.5, 2.0, 0.5) in the right arm
    let g = cell.derivatives(&[2.5 / 3.0, 2.0 / 3.0, 0.5], &values, 1).unwrap();
    assert_abs_diff_eq!(g[0], 2.0, epsilon = 1e-9);
    assert_abs_diff_eq!(g[1], 3.0, epsilon = 1e-9);
    assert_abs_diff_eq!(g[2], -1.0, epsilon = 1e-9);
}

use approx::assert_relative_eq;
use dense_expr::{
    diagmat, eglue, glue, strans, strans2, unique, Cube, DiagOperand, DiagSpan, DiagViewMut,
    Element, ExprError, Glue, GlueCube, Mat, MatFixed, Minus, Operand, Plus, PreferAt, Proxy,
    Schur,
};
use num_complex::Complex64;
use num_traits::FromPrimitive;
use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::StandardNormal;

fn make_random(n_rows: usize, n_cols: usize, seed: u64) -> Mat<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    Mat::from_fn(n_rows, n_cols, |_, _| rng.sample(StandardNormal))
}

fn make_seq<T: Element + FromPrimitive>(n_rows: usize, n_cols: usize) -> Mat<T> {
    Mat::from_fn(n_rows, n_cols, |r, c| {
        T::from_usize(r * 31 + c * 7 + 1).unwrap_or_else(T::one)
    })
}

fn naive_transpose<T: Element>(a: &Mat<T>) -> Mat<T> {
    Mat::from_fn(a.n_cols(), a.n_rows(), |r, c| a.at(c, r))
}

// ============================================================================
// Element-wise evaluator
// ============================================================================

#[test]
fn test_elementwise_matches_scalar_reference() {
    let a = make_random(7, 5, 1);
    let b = make_random(7, 5, 2);
    let out = Mat::from_expr(&glue::schur(&a, &b).unwrap());
    for r in 0..7 {
        for c in 0..5 {
            assert_relative_eq!(out.at(r, c), a.at(r, c) * b.at(r, c), epsilon = 1e-14);
        }
    }
}

#[test]
fn test_unrolling_is_transparent() {
    // odd and even counts on both sides of the small-fixed threshold
    for n in [0usize, 1, 2, 3, 4, 5, 16, 17, 33] {
        let a = make_random(n, 1, 10 + n as u64);
        let b = make_random(n, 1, 20 + n as u64);
        let out = Mat::from_expr(&glue::minus(&a, &b).unwrap());
        assert!(out.is_size(n, 1));
        for i in 0..n {
            assert_eq!(out.as_slice()[i], a.as_slice()[i] - b.as_slice()[i], "n = {n}");
        }
    }
}

#[test]
fn test_fixed_operands_above_threshold() {
    let a = MatFixed::<f64, 3, 6>::from_fn(|r, c| (r + 3 * c) as f64);
    let b = MatFixed::<f64, 3, 6>::from_fn(|r, c| (r * c) as f64 + 0.5);
    let fixed = Mat::from_expr(&Glue::<_, _, Plus>::new(&a, &b).unwrap());
    let dynamic = Mat::from_expr(
        &Glue::<_, _, Plus>::new(&Mat::from_expr(&a), &Mat::from_expr(&b)).unwrap(),
    );
    assert_eq!(fixed, dynamic);
}

#[test]
fn test_forced_coordinate_access_agrees() {
    for (r, c) in [(1, 9), (9, 1), (6, 6), (5, 8)] {
        let a = make_random(r, c, 3);
        let b = make_random(r, c, 4);
        let flat = Mat::from_expr(&glue::div(&a, &b).unwrap());
        let coord = Mat::from_expr(&glue::div(PreferAt(&a), PreferAt(&b)).unwrap());
        assert_eq!(flat, coord, "shape {r}x{c}");
    }
}

#[test]
fn test_mixed_transpose_operand() {
    let a = make_random(4, 6, 5);
    let b = make_random(6, 4, 6);
    let bt = b.t();
    let out = Mat::from_expr(&glue::plus(&a, &bt).unwrap());
    for r in 0..4 {
        for c in 0..6 {
            assert_relative_eq!(out.at(r, c), a.at(r, c) + b.at(c, r), epsilon = 1e-14);
        }
    }
}

#[test]
fn test_inplace_ops_match_out_of_place() {
    let a = make_random(5, 3, 7);
    let b = make_random(5, 3, 8);
    let base = make_random(5, 3, 9);
    let x = Glue::<_, _, Minus>::new(&a, &b).unwrap();
    let value = Mat::from_expr(&x);

    let mut out = base.clone();
    eglue::apply_inplace_schur(&mut out, &x).unwrap();
    for i in 0..15 {
        assert_relative_eq!(
            out.as_slice()[i],
            base.as_slice()[i] * value.as_slice()[i],
            epsilon = 1e-14
        );
    }

    let mut out = base.clone();
    eglue::apply_inplace_div(&mut out, &x).unwrap();
    for i in 0..15 {
        assert_relative_eq!(
            out.as_slice()[i],
            base.as_slice()[i] / value.as_slice()[i],
            epsilon = 1e-12
        );
    }
}

#[test]
fn test_shape_mismatch_is_rejected_before_evaluation() {
    let a = make_random(3, 4, 1);
    let b = make_random(4, 3, 2);
    assert!(matches!(
        glue::plus(&a, &b),
        Err(ExprError::ShapeMismatch { op: "addition", .. })
    ));

    let x = glue::plus(&a, &a).unwrap();
    let mut out = make_random(4, 3, 3);
    let before = out.clone();
    let err = eglue::apply_inplace_plus(&mut out, &x).unwrap_err();
    assert!(err.to_string().starts_with("addition"));
    assert_eq!(out, before);
}

#[test]
fn test_cube_elementwise() {
    let a = Cube::from_fn(3, 4, 5, |r, c, s| (r + c * s) as f64 + 1.0);
    let b = Cube::from_fn(3, 4, 5, |r, c, s| (r * c + s) as f64 + 2.0);
    let x = GlueCube::<_, _, Schur>::new(&a, &b).unwrap();
    let out = Cube::from_expr(&x);
    for s in 0..5 {
        for c in 0..4 {
            for r in 0..3 {
                assert_eq!(out.at(r, c, s), a.at(r, c, s) * b.at(r, c, s));
            }
        }
    }

    let mut acc = out.clone();
    eglue::apply_cube_inplace_div(&mut acc, &x).unwrap();
    assert!(acc.as_slice().iter().all(|&v| (v - 1.0).abs() < 1e-12));
}

// ============================================================================
// Transpose
// ============================================================================

#[test]
fn test_transpose_matches_naive_for_many_shapes() {
    for (r, c) in [
        (1, 1),
        (1, 8),
        (8, 1),
        (2, 2),
        (3, 3),
        (4, 4),
        (5, 5),
        (2, 7),
        (7, 2),
        (13, 9),
    ] {
        let a = make_random(r, c, (r * 100 + c) as u64);
        let mut out = Mat::new();
        strans::apply_noalias(&mut out, &a);
        assert_eq!(out, naive_transpose(&a), "shape {r}x{c}");
    }
}

#[test]
fn test_transpose_involution() {
    for (r, c) in [(1, 6), (6, 1), (1, 1), (2, 2), (3, 3), (4, 4), (5, 5), (6, 6), (3, 8)] {
        let a = make_random(r, c, 42);
        let mut once = Mat::new();
        let mut twice = Mat::new();
        strans::apply_noalias(&mut once, &a);
        strans::apply_noalias(&mut twice, &once);
        assert_eq!(twice, a, "shape {r}x{c}");
    }
}

#[test]
fn test_inplace_transpose_matches_noalias() {
    for (r, c) in [(1, 5), (5, 1), (3, 3), (4, 4), (7, 7), (3, 5), (8, 2)] {
        let a = make_random(r, c, 77);
        let mut expect = Mat::new();
        strans::apply(&mut expect, Operand::Distinct(&a));

        let mut out = a.clone();
        strans::apply(&mut out, Operand::Output);
        assert_eq!(out, expect, "shape {r}x{c}");
    }
}

#[test]
fn test_scaled_transpose() {
    for (r, c) in [(1, 7), (7, 1), (3, 3), (6, 6), (4, 9)] {
        let a = make_random(r, c, 5);
        let mut noalias = Mat::new();
        strans2::apply_noalias(&mut noalias, &a, 0.75);
        let plain = naive_transpose(&a);
        for i in 0..a.n_elem() {
            assert_relative_eq!(noalias.as_slice()[i], 0.75 * plain.as_slice()[i]);
        }

        let mut inplace = a.clone();
        strans2::apply(&mut inplace, Operand::Output, 0.75);
        for i in 0..a.n_elem() {
            assert_relative_eq!(inplace.as_slice()[i], noalias.as_slice()[i]);
        }
    }
}

#[test]
fn test_conjugate_transpose() {
    let a = Mat::from_fn(3, 2, |r, c| Complex64::new(r as f64 + 0.5, -(c as f64) - 1.0));
    let h = a.ht().eval();
    assert!(h.is_size(2, 3));
    for r in 0..2 {
        for c in 0..3 {
            assert_eq!(h.at(r, c), a.at(c, r).conj());
        }
    }
    assert_eq!(a.st().eval(), naive_transpose(&a));
}

#[test]
fn test_integer_transpose() {
    let a: Mat<i64> = make_seq(4, 3);
    let mut out = Mat::new();
    strans::apply_noalias(&mut out, &a);
    assert_eq!(out, naive_transpose(&a));
}

// ============================================================================
// Diagonal view
// ============================================================================

#[test]
fn test_diag_view_roundtrip() {
    let mut m = Mat::<f64>::zeros(4, 4);
    let mut d = DiagViewMut::new(&mut m, DiagSpan::new(1, 0, 3)).unwrap();
    d.fill(7.0);
    let values: Vec<f64> = (0..3).map(|i| d[i]).collect();
    assert_eq!(values, vec![7.0, 7.0, 7.0]);
    for r in 0..4 {
        for c in 0..4 {
            let expect = if r == c + 1 { 7.0 } else { 0.0 };
            assert_eq!(m.at(r, c), expect);
        }
    }
}

#[test]
fn test_diag_self_alias_matches_snapshot() {
    let mut m = make_random(3, 3, 9);
    let snapshot = m.clone();
    let mut d = DiagViewMut::new(&mut m, DiagSpan::new(1, 1, 2)).unwrap();
    d.assign_diag(DiagOperand::Output(DiagSpan::new(0, 0, 2)))
        .unwrap();

    let mut expect = snapshot.clone();
    {
        let src = snapshot.diag(0).unwrap();
        let mut dst = DiagViewMut::new(&mut expect, DiagSpan::new(1, 1, 2)).unwrap();
        dst.assign(&Mat::from_fn(2, 1, |i, _| src.at(i))).unwrap();
    }
    assert_eq!(m, expect);
}

#[test]
fn test_diag_errors() {
    let mut m = Mat::<f64>::zeros(3, 3);
    let v = Mat::<f64>::ones(3, 1);
    let mut d = m.diag_mut(1).unwrap();
    assert_eq!(d.n_elem(), 2);
    assert!(matches!(
        d.assign(&v),
        Err(ExprError::ShapeMismatch { .. })
    ));

    let d = m.diag(0).unwrap();
    assert!(matches!(
        d.get(3),
        Err(ExprError::OutOfRange { index: 3, len: 3, .. })
    ));
    assert!(m.diag(3).is_err());
    assert!(m.diag(-3).is_err());
}

#[test]
fn test_diag_in_expression() {
    let m = make_random(5, 5, 3);
    let v = make_random(5, 1, 4);
    let d = m.diag(0).unwrap();
    let out = Mat::from_expr(&glue::plus(&d, &v).unwrap());
    assert!(out.is_size(5, 1));
    for i in 0..5 {
        assert_relative_eq!(out.at(i, 0), m.at(i, i) + v.at(i, 0), epsilon = 1e-14);
    }

    let row = Mat::from_expr(&d.t());
    assert!(row.is_size(1, 5));
    assert_eq!(row.n_elem(), d.n_elem());
}

// ============================================================================
// Diagonal matrix and unique
// ============================================================================

#[test]
fn test_diagmat_roundtrip_with_diag_view() {
    let v = make_random(4, 1, 12);
    let mut m = Mat::new();
    diagmat::apply(&mut m, &v).unwrap();
    assert!(m.is_size(4, 4));
    assert_eq!(m.diag(0).unwrap().to_mat(), v);

    let mut bad = Mat::new();
    assert!(matches!(
        diagmat::apply(&mut bad, &make_random(2, 3, 1)),
        Err(ExprError::NotSquare { .. })
    ));
}

#[test]
fn test_unique_properties() {
    let mut rng = StdRng::seed_from_u64(5);
    let x = Mat::from_fn(6, 7, |_, _| rng.gen_range(0..10) as f64);
    let mut out = Mat::new();
    unique::apply(&mut out, &x).unwrap();

    assert!(out.is_colvec());
    let u = out.as_slice();
    assert!(u.windows(2).all(|w| w[0] < w[1]));
    for v in x.as_slice() {
        assert!(u.contains(v));
    }

    let mut via_at = Mat::new();
    unique::apply(&mut via_at, &PreferAt(&x)).unwrap();
    assert_eq!(via_at, out);
}

#[test]
fn test_unique_of_expression_and_row() {
    let a = Mat::from_col_major(1, 4, vec![1.0, 2.0, 1.0, 2.0]).unwrap();
    let b = Mat::from_col_major(1, 4, vec![1.0, 0.0, 1.0, 1.0]).unwrap();
    let sum = glue::plus(&a, &b).unwrap();
    assert_eq!(sum.n_rows(), 1);
    let mut out = Mat::new();
    unique::apply(&mut out, &sum).unwrap();
    assert!(out.is_size(1, 2));
    assert_eq!(out.as_slice(), &[2.0, 3.0]);
}

#[test]
fn test_unique_rejects_complex() {
    let x = Mat::<Complex64>::zeros(2, 2);
    let mut out = Mat::new();
    assert!(matches!(
        unique::apply(&mut out, &x),
        Err(ExprError::UnsupportedElementType(_))
    ));
}

//! Numerical behavior of cached transforms through the bundled scalar
//! engine: unnormalized round trips, packed half-spectra, and the
//! cosine/sine-family inverse pairings.

use planfft::{Complex, PlanCache, R2rKind, ScalarEngine, Sign};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn f64_cache() -> PlanCache<f64, ScalarEngine<f64>> {
    PlanCache::new(ScalarEngine::new())
}

fn signal(len: usize) -> Vec<f64> {
    (0..len)
        .map(|i| (i as f64 * 0.37).sin() + 0.5 * (i as f64 * 1.1).cos())
        .collect()
}

fn complex_signal(len: usize) -> Vec<Complex<f64>> {
    (0..len)
        .map(|i| Complex::new((i as f64 * 0.37).sin(), (i as f64 * 0.61).cos()))
        .collect()
}

#[test]
fn c2c_roundtrip_scales_by_len_1d() {
    let cache = f64_cache();
    for &n in &[1, 2, 7, 16, 48] {
        let input = complex_signal(n);
        let mut spectrum = vec![Complex::zero(); n];
        let mut back = vec![Complex::zero(); n];
        cache
            .transform_c2c(&[n], Sign::Forward, &input, &mut spectrum)
            .unwrap();
        cache
            .transform_c2c(&[n], Sign::Inverse, &spectrum, &mut back)
            .unwrap();
        let scale = n as f64;
        for (x, y) in input.iter().zip(&back) {
            assert!((x.re * scale - y.re).abs() < 1e-9, "n={n}");
            assert!((x.im * scale - y.im).abs() < 1e-9, "n={n}");
        }
    }
}

#[test]
fn c2c_roundtrip_2d_and_3d() {
    let cache = f64_cache();
    for extents in [vec![4, 6], vec![3, 4, 5]] {
        let len: usize = extents.iter().product();
        let input = complex_signal(len);
        let mut spectrum = vec![Complex::zero(); len];
        let mut back = vec![Complex::zero(); len];
        cache
            .transform_c2c(&extents, Sign::Forward, &input, &mut spectrum)
            .unwrap();
        cache
            .transform_c2c(&extents, Sign::Inverse, &spectrum, &mut back)
            .unwrap();
        let scale = len as f64;
        for (x, y) in input.iter().zip(&back) {
            assert!((x.re * scale - y.re).abs() < 1e-9);
            assert!((x.im * scale - y.im).abs() < 1e-9);
        }
    }
}

#[test]
fn f32_roundtrip_within_single_precision() {
    let cache = PlanCache::new(ScalarEngine::<f32>::new());
    let n = 16;
    let input: Vec<Complex<f32>> = (0..n)
        .map(|i| Complex::new((i as f32 * 0.37).sin(), (i as f32 * 0.61).cos()))
        .collect();
    let mut spectrum = vec![Complex::zero(); n];
    let mut back = vec![Complex::zero(); n];
    cache
        .transform_c2c(&[n], Sign::Forward, &input, &mut spectrum)
        .unwrap();
    cache
        .transform_c2c(&[n], Sign::Inverse, &spectrum, &mut back)
        .unwrap();
    for (x, y) in input.iter().zip(&back) {
        assert!((x.re * n as f32 - y.re).abs() < 1e-3);
        assert!((x.im * n as f32 - y.im).abs() < 1e-3);
    }
}

#[test]
fn r2c_matches_c2c_on_kept_bins() {
    let cache = f64_cache();
    let n = 12;
    let real = signal(n);
    let complexified: Vec<Complex<f64>> = real.iter().map(|&x| Complex::new(x, 0.0)).collect();

    let mut packed = vec![Complex::zero(); n / 2 + 1];
    let mut full = vec![Complex::zero(); n];
    cache.transform_r2c(&[n], &real, &mut packed).unwrap();
    cache
        .transform_c2c(&[n], Sign::Forward, &complexified, &mut full)
        .unwrap();

    for (k, bin) in packed.iter().enumerate() {
        assert!((bin.re - full[k].re).abs() < 1e-9, "bin {k}");
        assert!((bin.im - full[k].im).abs() < 1e-9, "bin {k}");
    }
}

#[test]
fn r2c_c2r_roundtrip_1d_and_2d() {
    let cache = f64_cache();
    for extents in [vec![9], vec![16], vec![6, 10]] {
        let len: usize = extents.iter().product();
        let spectrum_len = len / extents.last().unwrap() * (extents.last().unwrap() / 2 + 1);
        let real = signal(len);
        let mut packed = vec![Complex::zero(); spectrum_len];
        let mut back = vec![0.0f64; len];
        cache.transform_r2c(&extents, &real, &mut packed).unwrap();
        cache.transform_c2r(&extents, &packed, &mut back).unwrap();
        let scale = len as f64;
        for (x, y) in real.iter().zip(&back) {
            assert!((x * scale - y).abs() < 1e-9, "extents {extents:?}");
        }
    }
}

#[test]
fn dct2_dct3_are_an_inverse_pair() {
    let cache = f64_cache();
    let n = 10;
    let input = signal(n);
    let mut mid = vec![0.0f64; n];
    let mut back = vec![0.0f64; n];
    cache
        .transform_r2r(&[n], &[R2rKind::Dct2], &input, &mut mid)
        .unwrap();
    cache
        .transform_r2r(&[n], &[R2rKind::Dct3], &mid, &mut back)
        .unwrap();
    let scale = 2.0 * n as f64;
    for (x, y) in input.iter().zip(&back) {
        assert!((x * scale - y).abs() < 1e-9);
    }
}

#[test]
fn dst1_is_self_inverse() {
    let cache = f64_cache();
    let n = 9;
    let input = signal(n);
    let mut mid = vec![0.0f64; n];
    let mut back = vec![0.0f64; n];
    cache
        .transform_r2r(&[n], &[R2rKind::Dst1], &input, &mut mid)
        .unwrap();
    cache
        .transform_r2r(&[n], &[R2rKind::Dst1], &mid, &mut back)
        .unwrap();
    let scale = 2.0 * (n as f64 + 1.0);
    for (x, y) in input.iter().zip(&back) {
        assert!((x * scale - y).abs() < 1e-9);
    }
}

#[test]
fn dct4_is_self_inverse() {
    let cache = f64_cache();
    let n = 8;
    let input = signal(n);
    let mut mid = vec![0.0f64; n];
    let mut back = vec![0.0f64; n];
    cache
        .transform_r2r(&[n], &[R2rKind::Dct4], &input, &mut mid)
        .unwrap();
    cache
        .transform_r2r(&[n], &[R2rKind::Dct4], &mid, &mut back)
        .unwrap();
    let scale = 2.0 * n as f64;
    for (x, y) in input.iter().zip(&back) {
        assert!((x * scale - y).abs() < 1e-9);
    }
}

#[test]
fn mixed_kind_2d_r2r() {
    // DCT-II rows and DST-II columns round-trip against DCT-III / DST-III.
    let cache = f64_cache();
    let (n0, n1) = (4, 6);
    let input = signal(n0 * n1);
    let mut mid = vec![0.0f64; n0 * n1];
    let mut back = vec![0.0f64; n0 * n1];
    cache
        .transform_r2r(&[n0, n1], &[R2rKind::Dct2, R2rKind::Dst2], &input, &mut mid)
        .unwrap();
    cache
        .transform_r2r(&[n0, n1], &[R2rKind::Dct3, R2rKind::Dst3], &mid, &mut back)
        .unwrap();
    let scale = (2.0 * n0 as f64) * (2.0 * n1 as f64);
    for (x, y) in input.iter().zip(&back) {
        assert!((x * scale - y).abs() < 1e-9);
    }
}

#[test]
fn random_3d_signal_roundtrips() {
    let cache = f64_cache();
    let mut rng = StdRng::seed_from_u64(0x5eed_cafe);
    let extents = [3usize, 5, 4];
    let len: usize = extents.iter().product();
    let input: Vec<Complex<f64>> = (0..len)
        .map(|_| Complex::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)))
        .collect();
    let mut spectrum = vec![Complex::zero(); len];
    let mut back = vec![Complex::zero(); len];
    cache
        .transform_c2c(&extents, Sign::Forward, &input, &mut spectrum)
        .unwrap();
    cache
        .transform_c2c(&extents, Sign::Inverse, &spectrum, &mut back)
        .unwrap();
    let scale = len as f64;
    for (x, y) in input.iter().zip(&back) {
        assert!((x.re * scale - y.re).abs() < 1e-9);
        assert!((x.im * scale - y.im).abs() < 1e-9);
    }
}

proptest! {
    #[test]
    fn c2c_roundtrip_recovers_any_signal(
        values in prop::collection::vec((-1.0f64..1.0, -1.0f64..1.0), 1..48)
    ) {
        let cache = f64_cache();
        let n = values.len();
        let input: Vec<Complex<f64>> =
            values.iter().map(|&(re, im)| Complex::new(re, im)).collect();
        let mut spectrum = vec![Complex::zero(); n];
        let mut back = vec![Complex::zero(); n];
        cache.transform_c2c(&[n], Sign::Forward, &input, &mut spectrum).unwrap();
        cache.transform_c2c(&[n], Sign::Inverse, &spectrum, &mut back).unwrap();
        let scale = n as f64;
        for (x, y) in input.iter().zip(&back) {
            prop_assert!((x.re * scale - y.re).abs() < 1e-8);
            prop_assert!((x.im * scale - y.im).abs() < 1e-8);
        }
    }

    #[test]
    fn r2c_c2r_roundtrip_recovers_any_signal(
        values in prop::collection::vec(-1.0f64..1.0, 1..48)
    ) {
        let cache = f64_cache();
        let n = values.len();
        let mut packed = vec![Complex::zero(); n / 2 + 1];
        let mut back = vec![0.0f64; n];
        cache.transform_r2c(&[n], &values, &mut packed).unwrap();
        cache.transform_c2r(&[n], &packed, &mut back).unwrap();
        let scale = n as f64;
        for (x, y) in values.iter().zip(&back) {
            prop_assert!((x * scale - y).abs() < 1e-8);
        }
    }
}

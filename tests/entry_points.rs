use approx::assert_abs_diff_eq;
use proptest::prelude::*;
use rand_montecarlo::params::params;
use rand_montecarlo::*;

fn deterministic() -> impl Strategy<Value = Algorithm> {
    prop::sample::select(Algorithm::ALL.into_iter().filter(|a| a.is_deterministic()).collect::<Vec<_>>())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test] fn same_inputs_same_sequence(algorithm in deterministic(), seed in any::<i64>(), n in 1u64 .. 700) {
        let a = generate_numbers(n, algorithm.tag(), Some(seed), &Params::new()).unwrap();
        let b = generate_numbers(n, algorithm.tag(), Some(seed), &Params::new()).unwrap();
        prop_assert_eq!(n as usize, a.len());
        prop_assert_eq!(a, b);
    }

    #[test] fn values_in_unit_interval(algorithm in deterministic(), seed in any::<i64>()) {
        let xs = generate_numbers(1000, algorithm.tag(), Some(seed), &Params::new()).unwrap();
        for x in xs {
            prop_assert!(x.is_finite());
            if algorithm == Algorithm::Mersenne {
                prop_assert!((0.0 ..= 1.0).contains(&x));
            } else {
                prop_assert!((0.0 .. 1.0).contains(&x), "{} produced {}", algorithm, x);
            }
        }
    }
}

#[test] fn physical_noise_in_unit_interval() {
    let xs = generate_numbers(500, "physical_noise", Some(1), &Params::new()).unwrap();
    assert!(xs.iter().all(|x| (0.0 .. 1.0).contains(x)));
}

#[test] fn mersenne_twist_boundary() {
    let xs = generate_numbers(625, "mersenne", Some(2024), &Params::new()).unwrap();
    let mut reference = MersenneTwister::new(2024);
    let raw: Vec<u32> = (0 .. 625).map(|_| reference.next_raw()).collect();
    assert_eq!(raw[623] as f64 / 4294967295.0, xs[623]);
    assert_eq!(raw[624] as f64 / 4294967295.0, xs[624]);
    // Exactly one more twist has happened: one word consumed from the second block.
    assert_eq!(1, reference.index());
}

#[test] fn lcg_parameters_flow_through() {
    let p = params([("a", 5.0.into()), ("c", 3.0.into()), ("m", 16.0.into())]);
    let xs = generate_numbers(3, "lcg_additive", Some(7), &p).unwrap();
    // 7 -> 6 -> 1 -> 8
    assert_eq!(vec![6.0 / 16.0, 1.0 / 16.0, 8.0 / 16.0], xs);
    let ys = generate_numbers(2, "lcg_multiplicative", Some(7), &p).unwrap();
    // 7 -> 3 -> 15
    assert_eq!(vec![3.0 / 16.0, 15.0 / 16.0], ys);
}

#[test] fn transform_entry_point() {
    let z = transform("normal", &[0.5, 0.5], &Params::new()).unwrap();
    let r = (-2.0 * 0.5f64.ln()).sqrt();
    assert_abs_diff_eq!(r * std::f64::consts::PI.cos(), z[0], epsilon = 1e-9);
    assert_abs_diff_eq!(r * std::f64::consts::PI.sin(), z[1], epsilon = 1e-9);

    let err = transform("normal", &[0.5], &Params::new()).unwrap_err();
    assert_eq!(ErrorKind::InvalidInput, err.kind());

    let u = generate_numbers(1000, "xorshift32", Some(3), &Params::new()).unwrap();
    let k = transform("binomial", &u, &params([("n", 12.0.into()), ("p", 0.3.into())])).unwrap();
    assert_eq!(u.len(), k.len());
    assert!(k.iter().all(|x| x.fract() == 0.0 && (0.0 ..= 12.0).contains(x)));

    let g = transform("gamma", &u, &params([("alpha", 3.0.into()), ("beta", 2.0.into())])).unwrap();
    assert!(g.len() <= u.len() / 2);
    let mean = g.iter().sum::<f64>() / g.len() as f64;
    assert!(mean > 0.0 && mean.is_finite());

    let err = transform("gamma", &u, &params([("alpha", 0.5.into())])).unwrap_err();
    assert_eq!(ErrorKind::Configuration, err.kind());
}

#[test] fn integration_preconditions() {
    let compiler = |_: &str| -> std::result::Result<Polynomial, EvalError> { Ok(Polynomial::new(vec![1.0])) };
    let err = monte_carlo_integration(&compiler, &IntegrationRequest::new("1", 5.0, 5.0)).unwrap_err();
    assert_eq!(ErrorKind::InvalidRange, err.kind());
    let err = monte_carlo_integration(&compiler, &IntegrationRequest::new("1", -f64::MAX, f64::MAX)).unwrap_err();
    assert_eq!(ErrorKind::InvalidRange, err.kind());
    let err = monte_carlo_integration(&compiler, &IntegrationRequest::new("1", 0.0, 5.0).n_points(0)).unwrap_err();
    assert_eq!(ErrorKind::InvalidCount, err.kind());

    let record = monte_carlo_integration(&compiler, &IntegrationRequest::new("1", 0.0, 5.0).seed(8)).unwrap();
    assert_eq!(5.0, record.result);
    assert_eq!(0.0, record.error);
    assert_eq!(10_000, record.n_points);
}

#[test] fn session_extends_rather_than_discards() {
    let config = GeneratorConfig::parse("quadratic_residue", Some(5735), Params::new()).unwrap();
    let mut session = DistributionSession::new(&config).unwrap();
    let f = Polynomial::new(vec![0.0, 1.0]);
    session.integrate(&f, 0.0, 1.0, 10, "x").unwrap();
    let head = session.handle().cached().to_vec();
    session.integrate(&f, 0.0, 1.0, 40, "x").unwrap();
    assert_eq!(40, session.handle().cached().len());
    assert_eq!(&head[..], &session.handle().cached()[.. 10]);
    assert_eq!(0.8902, head[0]);
}

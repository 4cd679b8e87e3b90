use glam::DVec3;
use rand::Rng;
use rand_distr::StandardNormal;
use sierpinski_mesh::*;

fn random_base() -> DVec3 {
    let x: f64 = rand::thread_rng().sample(StandardNormal);
    let y: f64 = rand::thread_rng().sample(StandardNormal);
    let z: f64 = rand::thread_rng().sample(StandardNormal);

    DVec3::new(x, y, z) * 5.0
}

#[test]
fn test_default_config() {
    let config = MeshConfig::default();
    assert_eq!(config.base, DVec3::ZERO);
    assert_eq!(config.scale, DEFAULT_SCALE);
    assert_eq!(config.levels, DEFAULT_LEVELS);

    let mesh = config.generate().unwrap();
    assert_eq!(mesh.vertices().len(), 36 * 16);
}

#[test]
fn test_translation_invariance() {
    let base = random_base();
    let at_origin = generate_mesh(0.5, 2).unwrap();
    let moved = MeshConfig::new(0.5, 2).with_base(base).generate().unwrap();

    for (a, b) in at_origin.positions().zip(moved.positions()) {
        assert!((a + base).abs_diff_eq(b, 1e-9), "{} + {} != {}", a, base, b);
    }
}

#[test]
fn test_quarters_recompose() {
    let base: DVec3 = rand::thread_rng().gen::<DVec3>() * 4.0 - 2.0;
    let scale = 0.8;
    let levels = 3;

    let points = subdivide(base, scale, levels);
    let quarter = points.len() / 4;

    let rebuilt: Vec<DVec3> = child_bases(base, scale)
        .into_iter()
        .flat_map(|child| subdivide(child, scale * 0.5, levels - 1))
        .collect();

    assert_eq!(points.len(), quarter * 4);
    assert_eq!(points, rebuilt);
}

#[test]
fn test_every_vertex_inside_root() {
    let base = random_base();
    let root = Tetrahedron::generate(base, 1.0);
    let mesh = MeshConfig::new(1.0, 4).with_base(base).generate().unwrap();

    assert!(mesh.positions().all(|p| root.contains_point(p, 1e-9)));
}

#[test]
fn test_repeatable() {
    let first = generate_mesh(0.2, 4).unwrap();
    let second = generate_mesh(0.2, 4).unwrap();

    let bits = |m: &Mesh| m.vertices().iter().map(|v| v.to_bits()).collect::<Vec<_>>();
    assert_eq!(bits(&first), bits(&second));
    assert_eq!(first.indices(), second.indices());
}

#[test]
fn test_error_propagates() {
    let err = MeshConfig::new(0.2, 12).generate().unwrap_err();
    assert_eq!(err, MeshError::LevelsTooDeep { levels: 12, max: DEFAULT_MAX_LEVELS });
}

use anyhow::{Context, Result};
use clap::Parser;
use glam::DVec3;
use log::info;

use sierpinski_mesh::{MeshConfig, DEFAULT_LEVELS, DEFAULT_MAX_LEVELS, DEFAULT_SCALE};

#[derive(Parser, Debug)]
#[command(name = "sierpinski")]
#[command(about = "Generate Sierpinski tetrahedron vertex and index buffers", long_about = None)]
struct Cli {
    /// Recursion depth, each level multiplies the tetrahedron count by 4
    #[arg(short, long, default_value_t = DEFAULT_LEVELS)]
    levels: u32,

    /// Size of the outermost tetrahedron
    #[arg(short, long, default_value_t = DEFAULT_SCALE)]
    scale: f64,

    /// Centre of the outermost tetrahedron, as x,y,z
    #[arg(long, value_parser = parse_point, default_value = "0,0,0")]
    base: DVec3,

    /// Refuse depths above this
    #[arg(long, default_value_t = DEFAULT_MAX_LEVELS)]
    max_levels: u32,

    /// Also build a shared-vertex mesh and report its size
    #[arg(long)]
    shared: bool,

    /// Distance under which vertices are merged with --shared
    #[arg(long, default_value_t = 1e-9)]
    epsilon: f64,
}

fn parse_point(s: &str) -> Result<DVec3, String> {
    let coords = s
        .split(',')
        .map(|c| c.trim().parse::<f64>().map_err(|e| format!("{c:?}: {e}")))
        .collect::<Result<Vec<_>, _>>()?;

    match coords.as_slice() {
        &[x, y, z] => Ok(DVec3::new(x, y, z)),
        _ => Err(format!("expected 3 coordinates, got {}", coords.len())),
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let config = MeshConfig::new(cli.scale, cli.levels)
        .with_base(cli.base)
        .with_max_levels(cli.max_levels);

    info!("generating {config:?}");

    let mesh = config
        .generate()
        .with_context(|| format!("Failed to generate mesh at depth {}", cli.levels))?;

    println!("Tetrahedra: {}", mesh.tetrahedron_count());
    println!("Triangles:  {}", mesh.triangle_count());
    println!("Vertices:   {}", mesh.vertex_count());
    println!("Floats:     {}", mesh.vertices().len());
    println!("Indices:    {}", mesh.indices().len());

    if let Some(bounds) = mesh.bounds() {
        println!("Bounds:     {} .. {}", bounds.min(), bounds.max());
        println!("Extent:     {}", bounds.size());
    }

    if cli.shared {
        let shared = mesh.to_shared(cli.epsilon);
        println!(
            "Shared:     {} positions, {} indices",
            shared.positions().len(),
            shared.indices().len()
        );
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_point() {
        assert_eq!(parse_point("0,0,0"), Ok(DVec3::ZERO));
        assert_eq!(parse_point("1.5,-2,3e-1"), Ok(DVec3::new(1.5, -2.0, 0.3)));
        assert_eq!(parse_point(" 1 , 2 ,3 "), Ok(DVec3::new(1.0, 2.0, 3.0)));
    }

    #[test]
    fn test_parse_point_arity() {
        assert_eq!(
            parse_point("1,2"),
            Err("expected 3 coordinates, got 2".to_string())
        );
        assert_eq!(
            parse_point("1,2,3,4"),
            Err("expected 3 coordinates, got 4".to_string())
        );
    }

    #[test]
    fn test_parse_point_bad_number() {
        let err = parse_point("1,x,3").unwrap_err();
        assert!(err.starts_with("\"x\""), "{err}");
        assert!(parse_point("").is_err());
    }

    #[test]
    fn test_cli_base() {
        let cli = Cli::try_parse_from(["sierpinski", "--base", "1,2,3", "-l", "1"]).unwrap();
        assert_eq!(cli.base, DVec3::new(1.0, 2.0, 3.0));
        assert_eq!(cli.levels, 1);

        let cli = Cli::try_parse_from(["sierpinski"]).unwrap();
        assert_eq!(cli.base, DVec3::ZERO);
        assert_eq!(cli.scale, DEFAULT_SCALE);

        assert!(Cli::try_parse_from(["sierpinski", "--base", "1,2"]).is_err());
    }
}

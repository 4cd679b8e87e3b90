use sierpinski_mesh::*;

fn main() {
    let mesh = generate_mesh(DEFAULT_SCALE, 2).expect("generate mesh");

    for triangle in mesh.triangles().take(4) {
        println!("{:?}", triangle);
    }

    let (vertices, indices) = mesh.into_buffers();
    println!("{} floats, {} indices", vertices.len(), indices.len());
}

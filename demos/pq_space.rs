//! PQ space demo: rank a pool of encoded vectors against a query code.
//!
//! Builds a synthetic codebook whose lookup tables are derived from real
//! random sub-vectors, then drives distances through the same three-call
//! contract a graph index would use.
//!
//! ```bash
//! cargo run --example pq_space
//! ```

use rand::prelude::*;

use fathom::{CodebookSet, PqSpace, Space};

const NORM_LEN: usize = 256;
const PROD_LEN: usize = 256 * 256;
const SUB_DIM: usize = 4;
const CODE_LENGTH: usize = 16;

fn main() {
    println!("fathom PQ space demo");
    println!("====================\n");

    let mut rng = StdRng::seed_from_u64(1);

    // 256 sub-quantizer centroids; every code byte indexes one of these.
    let centroids: Vec<[f32; SUB_DIM]> = (0..256)
        .map(|_| {
            let mut c = [0.0_f32; SUB_DIM];
            for x in &mut c {
                *x = rng.gen::<f32>() * 2.0 - 1.0 + 0.1;
            }
            c
        })
        .collect();

    // Derive the two lookup regions from the centroids: squared norms per
    // byte, inner products per byte pair.
    let mut lookup = vec![0.0_f32; NORM_LEN + PROD_LEN];
    for (v, c) in centroids.iter().enumerate() {
        lookup[v] = c.iter().map(|x| x * x).sum();
    }
    for (a, ca) in centroids.iter().enumerate() {
        for (b, cb) in centroids.iter().enumerate() {
            lookup[NORM_LEN + ((a << 8) | b)] =
                ca.iter().zip(cb.iter()).map(|(x, y)| x * y).sum();
        }
    }

    let flat: Vec<f32> = centroids.iter().flatten().copied().collect();
    let codebook = CodebookSet::new(
        flat,
        vec![256, SUB_DIM],
        lookup,
        vec![NORM_LEN + PROD_LEN],
        CODE_LENGTH,
    )
    .expect("valid codebook");

    let space = PqSpace::new(codebook);
    println!("code length: {} bytes per vector\n", space.data_size());

    // The index-side view: one function pointer, one context, raw codes.
    let dist = space.dist_func();
    let ctx = space.dist_func_context();

    let query: Vec<u8> = (0..CODE_LENGTH).map(|_| rng.gen()).collect();
    space.prepare(&query).expect("query code is well-formed");

    // A pool of candidates: a few perturbations of the query plus noise.
    let mut pool: Vec<(String, Vec<u8>)> = Vec::new();
    pool.push(("query itself".into(), query.clone()));
    for flips in [1usize, 2, 4, 8] {
        let mut code = query.clone();
        for _ in 0..flips {
            let pos = rng.gen_range(0..CODE_LENGTH);
            code[pos] = rng.gen();
        }
        pool.push((format!("{} byte(s) perturbed", flips), code));
    }
    for i in 0..3 {
        let code: Vec<u8> = (0..CODE_LENGTH).map(|_| rng.gen()).collect();
        pool.push((format!("random #{}", i + 1), code));
    }

    let mut ranked: Vec<(i32, &str)> = pool
        .iter()
        .map(|(label, code)| (dist(&query, code, ctx), label.as_str()))
        .collect();
    ranked.sort();

    println!("{:>8}  candidate", "dist");
    println!("{}", "-".repeat(40));
    for (d, label) in ranked {
        println!("{:>8}  {}", d, label);
    }
}

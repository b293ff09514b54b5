use std::env;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use rand_mt::Mt64;

fn main() {
    let out_dir = env::var_os("OUT_DIR").unwrap();
    let lookup_file = Path::new(&out_dir).join("lookup.rs");
    let zobrist_file = Path::new(&out_dir).join("zobrist_keys.rs");

    let tables = AttackTables::process();

    let mut file = File::create(lookup_file).unwrap();
    writeln!(&mut file, "impl Bitboard {{").unwrap();
    inject_array(
        &mut file,
        "pub const KNIGHT_ATTACKS: [Bitboard; 64]",
        &tables.knight_attacks,
        Some("Bitboard"),
    );
    inject_array(
        &mut file,
        "pub const KING_ATTACKS: [Bitboard; 64]",
        &tables.king_attacks,
        Some("Bitboard"),
    );
    inject_2d_array(
        &mut file,
        "pub const RAYS: [[Bitboard; 64]; 8]",
        tables.rays.iter().map(|r| r.to_vec()).collect(),
        Some("Bitboard"),
    );
    writeln!(&mut file, "}}").unwrap();

    // Keys are generated from a fixed seed so hashes are stable across builds
    file = File::create(zobrist_file).unwrap();
    writeln!(&mut file, "impl ZobristHasher {{").unwrap();
    inject_array(
        &mut file,
        "pub const ZOBRIST_KEYS: [u64; 781]",
        &zobrist_keys(),
        None,
    );
    writeln!(&mut file, "}}").unwrap();

    println!("cargo:rerun-if-changed=build.rs");
}

fn inject_array<T: ToString>(file: &mut File, declaration: &str, array: &[T], constructor: Option<&str>) {
    writeln!(file, "{} = [", declaration).unwrap();
    for value in array {
        write!(file, "{}, ", match constructor {
            Some(c) => c.to_owned() + "(" + &value.to_string() + ")",
            None => value.to_string()
        }).unwrap();
    }
    writeln!(file, "];").unwrap();
}

fn inject_2d_array<T: ToString>(file: &mut File, declaration: &str, array: Vec<Vec<T>>, constructor: Option<&str>) {
    writeln!(file, "{} = [", declaration).unwrap();
    for slice in array {
        write!(file, "[").unwrap();
        for value in slice {
            write!(file, "{}, ", match constructor {
                Some(c) => c.to_owned() + "(" + &value.to_string() + ")",
                None => value.to_string()
            }).unwrap();
        }
        writeln!(file, "], ").unwrap();
    }
    writeln!(file, "];").unwrap();
}

const NOT_A_FILE: u64 = !0x0101010101010101;
const NOT_H_FILE: u64 = !0x8080808080808080;
const NOT_AB_FILES: u64 = !0x0303030303030303;
const NOT_GH_FILES: u64 = !0xc0c0c0c0c0c0c0c0;

struct AttackTables {
    pub knight_attacks: Vec<u64>,
    pub king_attacks: Vec<u64>,
    pub rays: [[u64; 64]; 8],
}

impl AttackTables {
    pub fn process() -> AttackTables {
        let knight_shifts: [fn(u64) -> u64; 8] = [
            |bb| (bb << 10) & NOT_AB_FILES,
            |bb| (bb >> 10) & NOT_GH_FILES,
            |bb| (bb << 17) & NOT_A_FILE,
            |bb| (bb >> 17) & NOT_H_FILE,
            |bb| (bb << 15) & NOT_H_FILE,
            |bb| (bb >> 15) & NOT_A_FILE,
            |bb| (bb << 6) & NOT_GH_FILES,
            |bb| (bb >> 6) & NOT_AB_FILES,
        ];
        let king_shifts: [fn(u64) -> u64; 8] = [
            |bb| (bb >> 1) & NOT_H_FILE,
            |bb| (bb << 1) & NOT_A_FILE,
            |bb| (bb << 7) & NOT_H_FILE,
            |bb| (bb >> 7) & NOT_A_FILE,
            |bb| (bb << 9) & NOT_A_FILE,
            |bb| (bb >> 9) & NOT_H_FILE,
            |bb| bb << 8,
            |bb| bb >> 8,
        ];
        AttackTables {
            knight_attacks: Self::leaper_attacks(&knight_shifts),
            king_attacks: Self::leaper_attacks(&king_shifts),
            rays: Self::process_rays(),
        }
    }

    fn leaper_attacks(shifts: &[fn(u64) -> u64; 8]) -> Vec<u64> {
        (0..64)
            .map(|sq| {
                let origin = 1u64 << sq;
                shifts.iter().fold(0u64, |attacks, shift| attacks | shift(origin))
            })
            .collect()
    }

    // Even indices grow towards h8, odd indices towards a1.
    // Order: east, west, north, south, north-west, south-east, north-east, south-west
    fn process_rays() -> [[u64; 64]; 8] {
        let shifts: [fn(u64) -> u64; 8] = [
            |b| (b << 1) & NOT_A_FILE,
            |b| (b >> 1) & NOT_H_FILE,
            |b| b << 8,
            |b| b >> 8,
            |b| (b << 7) & NOT_H_FILE,
            |b| (b >> 7) & NOT_A_FILE,
            |b| (b << 9) & NOT_A_FILE,
            |b| (b >> 9) & NOT_H_FILE,
        ];

        let mut results = [[0u64; 64]; 8];
        for sq in 0..64 {
            for (i, shift) in shifts.iter().enumerate() {
                let mut ray = 0u64;
                let mut current = shift(1u64 << sq);
                while current != 0 {
                    ray |= current;
                    current = shift(current);
                }
                results[i][sq] = ray;
            }
        }
        results
    }
}

fn zobrist_keys() -> [u64; 781] {
    let mut rng = Mt64::new(0x7e55e7a);
    [0u64; 781].map(|_| rng.next_u64())
}
